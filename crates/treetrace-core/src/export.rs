//! Exported history document
//!
//! The document is a JSON array of history entries. It is written either as
//! plain JSON or as a script bundle (`const TREE_HISTORY = [...];`) that a
//! browser visualizer can load directly. Both forms parse back.

use crate::error::ExportError;
use crate::tracer::HistoryEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Variable name used by script bundles unless configured otherwise
pub const DEFAULT_VARIABLE: &str = "TREE_HISTORY";

/// File written unless configured otherwise
pub const DEFAULT_PATH: &str = "tree_data.js";

/// Output encoding of a history document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `const <variable> = <array>;`
    #[default]
    Js,
    /// The bare JSON array
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Js => f.write_str("js"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

/// Export settings, the `[export]` section of a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output encoding
    pub format: ExportFormat,
    /// Variable name of script bundles
    pub variable: String,
    /// Destination file
    pub path: PathBuf,
    /// Indent the JSON
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Js,
            variable: DEFAULT_VARIABLE.to_string(),
            path: PathBuf::from(DEFAULT_PATH),
            pretty: true,
        }
    }
}

/// Ordered history of one tracer, ready for a downstream visualizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryDocument {
    entries: Vec<HistoryEntry>,
}

impl HistoryDocument {
    /// Wrap recorded entries
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    /// Recorded entries in order
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as a JSON array
    pub fn to_json(&self, pretty: bool) -> Result<String, ExportError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Encode as a script bundle assigning the array to `variable`
    pub fn to_script(&self, variable: &str, pretty: bool) -> Result<String, ExportError> {
        if !is_identifier(variable) {
            return Err(ExportError::Malformed(format!(
                "`{variable}` is not a valid variable name"
            )));
        }
        Ok(format!("const {variable} = {};\n", self.to_json(pretty)?))
    }

    /// Encode according to `options`
    pub fn render(&self, options: &ExportConfig) -> Result<String, ExportError> {
        match options.format {
            ExportFormat::Js => self.to_script(&options.variable, options.pretty),
            ExportFormat::Json => self.to_json(options.pretty),
        }
    }

    /// Write to `path`, encoded according to `options`
    pub fn write_to(&self, path: &Path, options: &ExportConfig) -> Result<(), ExportError> {
        let text = self.render(options)?;
        std::fs::write(path, text)?;
        tracing::info!(
            path = %path.display(),
            entries = self.len(),
            format = %options.format,
            "exported history"
        );
        Ok(())
    }

    /// Parse either encoding
    pub fn parse(text: &str) -> Result<Self, ExportError> {
        let text = text.trim();
        if text.starts_with('[') {
            return Ok(serde_json::from_str(text)?);
        }
        let body = script_body(text).ok_or_else(|| {
            ExportError::Malformed("expected a JSON array or a `const NAME = [...];` bundle".into())
        })?;
        Ok(serde_json::from_str(body)?)
    }

    /// Read and parse a document from `path`
    pub fn read(path: &Path) -> Result<Self, ExportError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

/// JSON payload of a `const|let|var NAME = <json>;` bundle
fn script_body(text: &str) -> Option<&str> {
    let rest = ["const ", "let ", "var "]
        .iter()
        .find_map(|keyword| text.strip_prefix(keyword))?;
    let (name, value) = rest.split_once('=')?;
    if !is_identifier(name.trim()) {
        return None;
    }
    let value = value.trim();
    Some(value.strip_suffix(';').unwrap_or(value).trim_end())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeId;
    use crate::serializer::{ForestSnapshot, NodeRecord};
    use crate::tracer::ActiveNode;
    use assert_matches::assert_matches;
    use indexmap::IndexMap;

    fn document() -> HistoryDocument {
        let leaf = NodeRecord {
            identity: NodeId::from(1),
            display_label: "10".into(),
            left: None,
            right: None,
            parent_identity: None,
            extra_attributes: IndexMap::new(),
        };
        HistoryDocument::new(vec![
            HistoryEntry {
                identity: ActiveNode::None,
                action: "entering insert".into(),
                method: Some("insert".into()),
                snapshot: ForestSnapshot::default(),
            },
            HistoryEntry {
                identity: ActiveNode::Node(NodeId::from(1)),
                action: "set root to 10".into(),
                method: Some("insert".into()),
                snapshot: ForestSnapshot {
                    main: Some(leaf),
                    floating: Vec::new(),
                },
            },
        ])
    }

    #[test]
    fn test_json_shape() {
        let value: serde_json::Value =
            serde_json::from_str(&document().to_json(false).unwrap()).unwrap();
        let steps = value.as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["identity"], "N/A");
        assert_eq!(steps[0]["snapshot"], serde_json::json!([null]));
        assert_eq!(steps[1]["identity"], 1);
        assert_eq!(steps[1]["snapshot"][0]["displayLabel"], "10");
        assert_eq!(steps[1]["snapshot"][0]["parentIdentity"], serde_json::Value::Null);
        assert!(steps[1]["snapshot"][0]["extraAttributes"].is_object());
    }

    #[test]
    fn test_script_bundle_parses_back() {
        let doc = document();
        let script = doc.to_script(DEFAULT_VARIABLE, true).unwrap();
        assert!(script.starts_with("const TREE_HISTORY = ["));
        assert!(script.trim_end().ends_with("];"));
        assert_eq!(HistoryDocument::parse(&script).unwrap(), doc);
        assert_eq!(HistoryDocument::parse(&doc.to_json(true).unwrap()).unwrap(), doc);
    }

    #[test]
    fn test_render_follows_options() {
        let options = ExportConfig {
            format: ExportFormat::Json,
            pretty: false,
            ..ExportConfig::default()
        };
        assert!(document().render(&options).unwrap().starts_with("[{"));
        assert!(document().render(&ExportConfig::default()).unwrap().starts_with("const "));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_matches!(HistoryDocument::parse("{}"), Err(ExportError::Malformed(_)));
        assert_matches!(HistoryDocument::parse("const = [];"), Err(ExportError::Malformed(_)));
        assert_matches!(HistoryDocument::parse("[{]"), Err(ExportError::Json(_)));
        assert_matches!(document().to_script("tree data", false), Err(ExportError::Malformed(_)));
    }
}
