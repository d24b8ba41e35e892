//! Build-time generation of the typed Graph request client.
//!
//! Generation is delegated to an external OpenAPI-to-client CLI
//! (`openapi-zod-client` by default). This module prepares its input,
//! runs it, and patches its output in place:
//!
//! 1. create the output directory,
//! 2. trim the OpenAPI document to the configured path prefixes,
//! 3. run the generator command,
//! 4. apply the [`PatchSet`] to the generated file.
//!
//! Every failure aborts the run with a [`CodegenError`] carrying context.
//! Re-running overwrites previous output.

pub mod postprocess;
pub mod trim;

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

pub use postprocess::{PatchSet, Rewrite, RuleReport};
pub use trim::{trim_paths, TrimmedSpec, DEFAULT_PATH_PREFIXES};

/// File name of the generated client inside the output directory.
pub const DEFAULT_OUTPUT_FILE: &str = "graph-client.ts";
/// File name of the trimmed OpenAPI document inside the output directory.
pub const TRIMMED_SPEC_FILE: &str = "openapi.trimmed.yaml";
/// Placeholder replaced with the (trimmed) OpenAPI document path.
pub const SPEC_PLACEHOLDER: &str = "{spec}";
/// Placeholder replaced with the generated file path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Error during client generation.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to launch generator '{program}': {source}")]
    ToolLaunch {
        program: String,
        source: std::io::Error,
    },

    #[error("generator '{program}' exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("invalid OpenAPI document '{}': {reason}", path.display())]
    InvalidSpec { path: PathBuf, reason: String },

    #[error("generator command is empty")]
    EmptyCommand,
}

/// `npx openapi-zod-client {spec} -o {output}`
pub fn default_command() -> Vec<String> {
    ["npx", "openapi-zod-client", SPEC_PLACEHOLDER, "-o", OUTPUT_PLACEHOLDER]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Inputs of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenAPI YAML document.
    pub spec_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_file: String,
    /// Keep only paths under these prefixes. Empty disables trimming.
    pub path_prefixes: Vec<String>,
    /// Program and arguments; `{spec}` and `{output}` are substituted.
    pub command: Vec<String>,
    pub patches: PatchSet,
}

impl GeneratorConfig {
    pub fn new(spec_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec_path: spec_path.into(),
            output_dir: output_dir.into(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            path_prefixes: DEFAULT_PATH_PREFIXES.iter().map(|s| s.to_string()).collect(),
            command: default_command(),
            patches: PatchSet::default(),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_file: PathBuf,
    /// Trimmed document written for the generator, when trimming ran.
    pub trimmed_spec: Option<PathBuf>,
    pub paths_kept: Option<usize>,
    pub rules: Vec<RuleReport>,
}

impl GenerationReport {
    /// Rules that matched nothing.
    pub fn unapplied_rules(&self) -> impl Iterator<Item = &RuleReport> {
        self.rules.iter().filter(|r| r.applied == 0)
    }
}

/// Runs the external generator and patches its output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientGenerator;

impl ClientGenerator {
    pub fn generate(config: &GeneratorConfig) -> Result<GenerationReport, CodegenError> {
        std::fs::create_dir_all(&config.output_dir).map_err(|e| CodegenError::Io {
            path: config.output_dir.clone(),
            source: e,
        })?;

        let (spec_for_tool, trimmed_spec, paths_kept) = if config.path_prefixes.is_empty() {
            (config.spec_path.clone(), None, None)
        } else {
            let trimmed = write_trimmed_spec(config)?;
            (trimmed.0.clone(), Some(trimmed.0), Some(trimmed.1))
        };

        let output_file = config.output_path();
        run_generator(&config.command, &spec_for_tool, &output_file)?;

        let generated = std::fs::read_to_string(&output_file).map_err(|e| CodegenError::Io {
            path: output_file.clone(),
            source: e,
        })?;
        let (patched, rules) = config.patches.apply(&generated);
        std::fs::write(&output_file, patched).map_err(|e| CodegenError::Io {
            path: output_file.clone(),
            source: e,
        })?;

        info!(output = %output_file.display(), "Generated Graph client");
        Ok(GenerationReport {
            output_file,
            trimmed_spec,
            paths_kept,
            rules,
        })
    }
}

/// Trim the document and write it next to the output. Returns its path and kept path count.
fn write_trimmed_spec(config: &GeneratorConfig) -> Result<(PathBuf, usize), CodegenError> {
    let source = std::fs::read_to_string(&config.spec_path).map_err(|e| CodegenError::Io {
        path: config.spec_path.clone(),
        source: e,
    })?;
    let trimmed =
        trim_paths(&source, &config.path_prefixes).map_err(|reason| CodegenError::InvalidSpec {
            path: config.spec_path.clone(),
            reason,
        })?;
    debug!(kept = trimmed.kept, dropped = trimmed.dropped, "Trimmed OpenAPI paths");

    let path = config.output_dir.join(TRIMMED_SPEC_FILE);
    std::fs::write(&path, trimmed.yaml).map_err(|e| CodegenError::Io {
        path: path.clone(),
        source: e,
    })?;
    Ok((path, trimmed.kept))
}

/// Substitute placeholders and run the command, failing on non-zero exit.
fn run_generator(command: &[String], spec: &Path, output: &Path) -> Result<(), CodegenError> {
    let (program, args) = command.split_first().ok_or(CodegenError::EmptyCommand)?;
    let spec = spec.display().to_string();
    let output_path = output.display().to_string();
    let args: Vec<String> = args
        .iter()
        .map(|arg| {
            arg.replace(SPEC_PLACEHOLDER, &spec)
                .replace(OUTPUT_PLACEHOLDER, &output_path)
        })
        .collect();

    info!(program = %program, args = ?args, "Running client generator");
    let result = Command::new(program)
        .args(&args)
        .output()
        .map_err(|e| CodegenError::ToolLaunch {
            program: program.clone(),
            source: e,
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(CodegenError::ToolFailed {
            program: program.clone(),
            status: result.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }
    Ok(())
}
