//! TOML configuration
//!
//! ```toml
//! [roles]
//! left = "l"
//! right = "r"
//! parent = "up"
//! key = "val"
//! root = "head"
//!
//! [export]
//! format = "json"
//! path = "history.json"
//! ```
//!
//! Both sections are optional. A `[roles]` section replaces the standard
//! role map as a whole, so it must bind every required role.

use crate::error::ConfigurationError;
use crate::export::ExportConfig;
use crate::roles::FieldRoleMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of one tracing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Field names of the traced structure
    pub roles: FieldRoleMap,
    /// Output settings
    pub export: ExportConfig,
}

impl TraceConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(text).map_err(|e| ConfigurationError::Malformed {
            message: e.to_string(),
        })
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(self).map_err(|e| ConfigurationError::Malformed {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::roles::Role;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_document_is_default() {
        let config = TraceConfig::from_toml_str("").unwrap();
        assert_eq!(config, TraceConfig::default());
        assert_eq!(config.roles.root(), "root");
        assert_eq!(config.export.format, ExportFormat::Js);
    }

    #[test]
    fn test_custom_roles_and_export() {
        let config = TraceConfig::from_toml_str(
            r#"
            [roles]
            left = "l"
            right = "r"
            parent = "up"
            key = "val"
            root = "head"
            max = "biggest"

            [export]
            format = "json"
            variable = "STEPS"
            pretty = false
            "#,
        )
        .unwrap();
        assert_eq!(config.roles.left(), "l");
        assert_eq!(config.roles.field(Role::Max), Some("biggest"));
        assert_eq!(config.roles.field(Role::Min), None);
        assert_eq!(config.export.format, ExportFormat::Json);
        assert_eq!(config.export.variable, "STEPS");
        assert_eq!(config.export.path, Path::new("tree_data.js"));
        assert!(!config.export.pretty);
    }

    #[test]
    fn test_incomplete_roles_are_rejected() {
        let error = TraceConfig::from_toml_str("[roles]\nleft = \"l\"\n").unwrap_err();
        assert_matches!(error, ConfigurationError::Malformed { .. });
        assert!(error.to_string().contains("right"));
    }

    #[test]
    fn test_unknown_sections_are_rejected() {
        assert!(TraceConfig::from_toml_str("[colors]\nroot = \"red\"\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let error = TraceConfig::load(Path::new("/nonexistent/treetrace.toml")).unwrap_err();
        assert_matches!(error, ConfigurationError::Unreadable { .. });
    }

    #[test]
    fn test_toml_output_loads_back() {
        let config = TraceConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(TraceConfig::from_toml_str(&text).unwrap(), config);
    }
}
