//! OpenAPI document trimming.
//!
//! The full Graph description is far larger than the handful of Planner and
//! To-Do endpoints the client needs. Trimming keeps only `paths` entries under
//! the given prefixes; `components` are left intact for the generator to prune.

use serde_yaml::{Mapping, Value};

/// Path prefixes covering the Planner and To-Do endpoints.
pub const DEFAULT_PATH_PREFIXES: [&str; 3] = ["/planner/", "/me/planner/", "/me/todo/"];

/// A trimmed OpenAPI document.
#[derive(Debug, Clone)]
pub struct TrimmedSpec {
    pub yaml: String,
    pub kept: usize,
    pub dropped: usize,
}

/// Keep only the `paths` entries whose key starts with one of `prefixes`.
///
/// Errors are plain reasons; the caller attaches the file path.
pub fn trim_paths(yaml: &str, prefixes: &[String]) -> Result<TrimmedSpec, String> {
    let mut document: Value = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    let paths = document
        .get_mut("paths")
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| "document has no `paths` mapping".to_string())?;

    let total = paths.len();
    let retained: Mapping = paths
        .iter()
        .filter(|(key, _)| {
            key.as_str()
                .is_some_and(|path| prefixes.iter().any(|p| path.starts_with(p.as_str())))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let kept = retained.len();
    if kept == 0 {
        return Err(format!(
            "no paths match prefixes [{}]",
            prefixes.join(", ")
        ));
    }
    *paths = retained;

    let yaml = serde_yaml::to_string(&document).map_err(|e| e.to_string())?;
    Ok(TrimmedSpec {
        yaml,
        kept,
        dropped: total - kept,
    })
}
