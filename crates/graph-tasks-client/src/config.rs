//! Client configuration discovery and loading.
//!
//! Checks locations in precedence order:
//! 1. `$GRAPH_TASKS_CONFIG` (explicit path)
//! 2. `./.graph-tasks.toml` (project-local)
//! 3. `~/.config/graph-tasks.toml` (user-global)
//!
//! Environment variables override file values afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::TokenSource;
use crate::error::{ClientError, ClientResult};

const CONFIG_ENV_VAR: &str = "GRAPH_TASKS_CONFIG";
const CONFIG_FILENAME: &str = ".graph-tasks.toml";
const GLOBAL_CONFIG_DIR: &str = ".config";
const GLOBAL_CONFIG_FILENAME: &str = "graph-tasks.toml";

/// Default Graph endpoint.
pub const DEFAULT_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
/// Tag prepended to converted task titles.
pub const DEFAULT_TITLE_PREFIX: &str = "[Planner] ";
/// Display-name substrings ranking To-Do lists during search, highest first.
pub const DEFAULT_LIST_PRIORITY: [&str; 3] = ["Planner", "Work", "Tasks"];

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Task conversion and search settings shared by the MCP server and CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TaskSettings {
    /// Prefix added to converted task titles when requested.
    pub title_prefix: String,
    /// Display-name substrings ordering lists for title search.
    pub list_priority: Vec<String>,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            list_priority: DEFAULT_LIST_PRIORITY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Resolved Graph client configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Graph API root, e.g. `https://graph.microsoft.com/v1.0`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static bearer token. Prefer `token-command` for anything long-lived.
    #[serde(default)]
    pub access_token: Option<String>,

    /// External command printing a bearer token on stdout, e.g.
    /// `["az", "account", "get-access-token", "--resource-type", "ms-graph", "--query", "accessToken", "-o", "tsv"]`.
    #[serde(default)]
    pub token_command: Option<Vec<String>>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub tasks: TaskSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            token_command: None,
            timeout_secs: default_timeout_secs(),
            tasks: TaskSettings::default(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("token_command", &self.token_command)
            .field("timeout_secs", &self.timeout_secs)
            .field("tasks", &self.tasks)
            .finish()
    }
}

impl ClientConfig {
    /// Load from the first discovered config file, then apply environment overrides.
    ///
    /// A missing, unreadable, or malformed file falls back to defaults with a warning.
    pub fn load() -> Self {
        let mut config = match Self::find_config_file() {
            Some(path) => match Self::load_from_path(&path) {
                Ok(config) => {
                    tracing::debug!(?path, "Loaded client config");
                    config
                }
                Err(e) => {
                    tracing::warn!(?path, error = %e, "Failed to load client config, using defaults");
                    Self::default()
                }
            },
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Parse a config file at an explicit path.
    pub fn load_from_path(path: &Path) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config_error(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ClientError::config_error(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Search for a config file in precedence order.
    pub fn find_config_file() -> Option<PathBuf> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            let explicit = PathBuf::from(explicit);
            if explicit.is_file() {
                return Some(explicit);
            }
            tracing::warn!(path = ?explicit, "{} does not point to a file", CONFIG_ENV_VAR);
        }

        let local = PathBuf::from(CONFIG_FILENAME);
        if local.is_file() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let global = home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME);
            if global.is_file() {
                return Some(global);
            }
        }

        None
    }

    /// Apply `GRAPH_TASKS_BASE_URL`, `GRAPH_ACCESS_TOKEN` and `GRAPH_TASKS_TIMEOUT_SECS`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GRAPH_TASKS_BASE_URL").filter(|s| !s.is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup("GRAPH_ACCESS_TOKEN").filter(|s| !s.is_empty()) {
            self.access_token = Some(token);
        }
        if let Some(raw) = lookup("GRAPH_TASKS_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring non-numeric GRAPH_TASKS_TIMEOUT_SECS")
                }
            }
        }
    }

    /// Build the token source. A static token wins over a token command.
    pub fn token_source(&self) -> ClientResult<TokenSource> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.trim().is_empty()) {
            return Ok(TokenSource::Static(token.trim().to_string()));
        }
        match self.token_command.as_deref() {
            Some([program, args @ ..]) => Ok(TokenSource::Command {
                program: program.clone(),
                args: args.to_vec(),
            }),
            _ => Err(ClientError::config_error(
                "No Graph credentials configured. Set GRAPH_ACCESS_TOKEN, or access-token / \
                 token-command in .graph-tasks.toml",
            )),
        }
    }
}
