//! Subcommand handlers

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use treetrace_core::TraceConfig;

pub mod replay;
pub mod run;

/// Config file consulted when `--config` is not given
pub const DEFAULT_CONFIG: &str = "treetrace.toml";

/// Load the file named on the command line, or the default file when it exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<TraceConfig>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG);
            if !fallback.exists() {
                return Ok(None);
            }
            fallback
        }
    };
    let config = TraceConfig::load(&path)
        .with_context(|| format!("failed to load config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "using configuration");
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use treetrace_core::ExportFormat;

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(error.to_string().contains("absent.toml"));
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.toml");
        std::fs::write(&path, "[export]\nformat = \"json\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.export.format, ExportFormat::Json);
    }
}
