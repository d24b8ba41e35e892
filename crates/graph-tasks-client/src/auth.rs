//! Bearer token acquisition.
//!
//! Credentials are owned by an external auth manager. This module only knows
//! how to ask for a token: either a fixed string, or an external command whose
//! trimmed stdout is the token. The command runs once per session (one tool
//! invocation or CLI command) and the result is never cached beyond it, so
//! expiry stays the command's concern.

use tokio::process::Command;

use crate::error::{ClientError, ClientResult};

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum TokenSource {
    /// A fixed token, typically from `GRAPH_ACCESS_TOKEN`.
    Static(String),
    /// An external command printing a token on stdout.
    Command { program: String, args: Vec<String> },
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(_) => f.write_str("Static(<redacted>)"),
            Self::Command { program, args } => f
                .debug_struct("Command")
                .field("program", program)
                .field("args", args)
                .finish(),
        }
    }
}

impl TokenSource {
    /// Produce a bearer token for the next request.
    pub async fn access_token(&self) -> ClientResult<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Command { program, args } => {
                let output = Command::new(program)
                    .args(args)
                    .output()
                    .await
                    .map_err(|e| {
                        ClientError::AuthError(format!(
                            "failed to run token command '{}': {}",
                            program, e
                        ))
                    })?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(ClientError::AuthError(format!(
                        "token command '{}' exited with {}: {}",
                        program,
                        output.status,
                        stderr.trim()
                    )));
                }

                let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if token.is_empty() {
                    return Err(ClientError::AuthError(format!(
                        "token command '{}' printed no token",
                        program
                    )));
                }
                Ok(token)
            }
        }
    }
}
