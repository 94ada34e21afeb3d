//! Structural roles and their binding to concrete field names
//!
//! A [`FieldRoleMap`] is built once per tracer, validated at construction,
//! and shared read-only by every wrapper the tracer creates.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract structural role of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Left child reference of a node
    Left,
    /// Right child reference of a node
    Right,
    /// Parent reference of a node
    Parent,
    /// Display key of a node
    Key,
    /// Root reference of a tree
    Root,
    /// Cached minimum reference of a tree
    Min,
    /// Cached maximum reference of a tree
    Max,
}

impl Role {
    /// Roles every role map must bind
    pub const REQUIRED: [Role; 5] = [Role::Left, Role::Right, Role::Parent, Role::Key, Role::Root];

    /// Every role, in declaration order
    pub const ALL: [Role; 7] = [
        Role::Left,
        Role::Right,
        Role::Parent,
        Role::Key,
        Role::Root,
        Role::Min,
        Role::Max,
    ];

    /// Lowercase role name
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Left => "left",
            Role::Right => "right",
            Role::Parent => "parent",
            Role::Key => "key",
            Role::Root => "root",
            Role::Min => "min",
            Role::Max => "max",
        }
    }

    /// Whether the role is a node-to-node reference
    pub fn is_edge(self) -> bool {
        matches!(self, Role::Left | Role::Right | Role::Parent)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownRole { name: s.to_string() })
    }
}

/// Unvalidated role bindings, as read from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleMapConfig {
    /// Field holding the left child
    pub left: Option<String>,
    /// Field holding the right child
    pub right: Option<String>,
    /// Field holding the parent
    pub parent: Option<String>,
    /// Field holding the display key
    pub key: Option<String>,
    /// Tree field holding the root
    pub root: Option<String>,
    /// Tree field caching the minimum node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Tree field caching the maximum node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl RoleMapConfig {
    /// Bindings using the conventional field names
    pub fn standard() -> Self {
        Self {
            left: Some("left".into()),
            right: Some("right".into()),
            parent: Some("parent".into()),
            key: Some("key".into()),
            root: Some("root".into()),
            min: None,
            max: None,
        }
    }

    fn slot(&self, role: Role) -> Option<&String> {
        match role {
            Role::Left => self.left.as_ref(),
            Role::Right => self.right.as_ref(),
            Role::Parent => self.parent.as_ref(),
            Role::Key => self.key.as_ref(),
            Role::Root => self.root.as_ref(),
            Role::Min => self.min.as_ref(),
            Role::Max => self.max.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<String> {
        match role {
            Role::Left => &mut self.left,
            Role::Right => &mut self.right,
            Role::Parent => &mut self.parent,
            Role::Key => &mut self.key,
            Role::Root => &mut self.root,
            Role::Min => &mut self.min,
            Role::Max => &mut self.max,
        }
    }
}

/// Validated, immutable mapping from roles to field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoleMapConfig", into = "RoleMapConfig")]
pub struct FieldRoleMap {
    left: String,
    right: String,
    parent: String,
    key: String,
    root: String,
    min: Option<String>,
    max: Option<String>,
}

impl FieldRoleMap {
    /// Role map for structures using the conventional field names
    pub fn standard() -> Self {
        Self {
            left: "left".into(),
            right: "right".into(),
            parent: "parent".into(),
            key: "key".into(),
            root: "root".into(),
            min: None,
            max: None,
        }
    }

    /// Build from `(role, field)` pairs; role names are parsed and validated.
    pub fn from_pairs<I, R, F>(pairs: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (R, F)>,
        R: AsRef<str>,
        F: Into<String>,
    {
        let mut config = RoleMapConfig::default();
        for (role, field) in pairs {
            let role: Role = role.as_ref().parse()?;
            *config.slot_mut(role) = Some(field.into());
        }
        Self::try_from(config)
    }

    /// Field bound to `role`, if any
    pub fn field(&self, role: Role) -> Option<&str> {
        match role {
            Role::Left => Some(&self.left),
            Role::Right => Some(&self.right),
            Role::Parent => Some(&self.parent),
            Role::Key => Some(&self.key),
            Role::Root => Some(&self.root),
            Role::Min => self.min.as_deref(),
            Role::Max => self.max.as_deref(),
        }
    }

    /// Left child field
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Right child field
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Parent field
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Key field
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Root field of the tree
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Role of a node field, if it is structural
    pub fn node_role(&self, field: &str) -> Option<Role> {
        [Role::Left, Role::Right, Role::Parent, Role::Key]
            .into_iter()
            .find(|role| self.field(*role) == Some(field))
    }

    /// Role of a tree field, if it is structural
    pub fn tree_role(&self, field: &str) -> Option<Role> {
        [Role::Root, Role::Min, Role::Max]
            .into_iter()
            .find(|role| self.field(*role) == Some(field))
    }

    /// Whether `field` is one of the four structural node fields
    pub fn is_structural(&self, field: &str) -> bool {
        self.node_role(field).is_some()
    }

    /// Fail unless every role in `roles` is bound
    pub fn require(&self, roles: &[Role]) -> Result<(), ConfigurationError> {
        match roles.iter().find(|role| self.field(**role).is_none()) {
            Some(role) => Err(ConfigurationError::MissingRole {
                role: role.as_str(),
            }),
            None => Ok(()),
        }
    }

    /// Configured tree roles as `(role, field)` pairs
    pub fn tree_fields(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        [Role::Root, Role::Min, Role::Max]
            .into_iter()
            .filter_map(|role| self.field(role).map(|field| (role, field)))
    }
}

impl Default for FieldRoleMap {
    fn default() -> Self {
        Self::standard()
    }
}

fn ensure_distinct(
    roles: &[Role],
    config: &RoleMapConfig,
) -> Result<(), ConfigurationError> {
    let bound: Vec<(Role, &String)> = roles
        .iter()
        .filter_map(|role| config.slot(*role).map(|field| (*role, field)))
        .collect();
    for (i, (first, field)) in bound.iter().enumerate() {
        if let Some((second, _)) = bound[i + 1..].iter().find(|(_, other)| *other == *field) {
            return Err(ConfigurationError::DuplicateField {
                field: field.to_string(),
                first: first.as_str(),
                second: second.as_str(),
            });
        }
    }
    Ok(())
}

impl TryFrom<RoleMapConfig> for FieldRoleMap {
    type Error = ConfigurationError;

    fn try_from(config: RoleMapConfig) -> Result<Self, Self::Error> {
        for role in Role::ALL {
            if config.slot(role).is_some_and(|field| field.trim().is_empty()) {
                return Err(ConfigurationError::EmptyField {
                    role: role.as_str(),
                });
            }
        }
        ensure_distinct(&[Role::Left, Role::Right, Role::Parent, Role::Key], &config)?;
        ensure_distinct(&[Role::Root, Role::Min, Role::Max], &config)?;

        let required = |role: Role| {
            config
                .slot(role)
                .cloned()
                .ok_or(ConfigurationError::MissingRole {
                    role: role.as_str(),
                })
        };
        Ok(Self {
            left: required(Role::Left)?,
            right: required(Role::Right)?,
            parent: required(Role::Parent)?,
            key: required(Role::Key)?,
            root: required(Role::Root)?,
            min: config.min.clone(),
            max: config.max.clone(),
        })
    }
}

impl From<FieldRoleMap> for RoleMapConfig {
    fn from(map: FieldRoleMap) -> Self {
        Self {
            left: Some(map.left),
            right: Some(map.right),
            parent: Some(map.parent),
            key: Some(map.key),
            root: Some(map.root),
            min: map.min,
            max: map.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_standard_map_resolves_roles() {
        let roles = FieldRoleMap::standard();
        assert_eq!(roles.node_role("left"), Some(Role::Left));
        assert_eq!(roles.node_role("height"), None);
        assert_eq!(roles.tree_role("root"), Some(Role::Root));
        assert_eq!(roles.field(Role::Max), None);
    }

    #[test]
    fn test_custom_names() {
        let roles = FieldRoleMap::from_pairs([
            ("left", "l"),
            ("right", "r"),
            ("parent", "up"),
            ("key", "val"),
            ("root", "head"),
        ])
        .unwrap();
        assert_eq!(roles.key(), "val");
        assert_eq!(roles.node_role("r"), Some(Role::Right));
        assert_eq!(roles.tree_role("head"), Some(Role::Root));
        assert!(!roles.is_structural("left"));
    }

    #[test]
    fn test_missing_required_role_fails() {
        let err = FieldRoleMap::from_pairs([
            ("left", "left"),
            ("right", "right"),
            ("key", "key"),
            ("root", "root"),
        ])
        .unwrap_err();
        assert_matches!(err, ConfigurationError::MissingRole { role: "parent" });
    }

    #[test]
    fn test_unknown_role_fails() {
        let err = FieldRoleMap::from_pairs([("sibling", "next")]).unwrap_err();
        assert_matches!(err, ConfigurationError::UnknownRole { .. });
    }

    #[test]
    fn test_duplicate_and_empty_fields_fail() {
        let mut config = RoleMapConfig::standard();
        config.right = Some("left".into());
        assert_matches!(
            FieldRoleMap::try_from(config),
            Err(ConfigurationError::DuplicateField { first: "left", second: "right", .. })
        );

        let mut config = RoleMapConfig::standard();
        config.key = Some("  ".into());
        assert_matches!(
            FieldRoleMap::try_from(config),
            Err(ConfigurationError::EmptyField { role: "key" })
        );
    }

    #[test]
    fn test_require_optional_roles() {
        let roles = FieldRoleMap::standard();
        assert!(roles.require(&Role::REQUIRED).is_ok());
        assert_matches!(
            roles.require(&[Role::Min]),
            Err(ConfigurationError::MissingRole { role: "min" })
        );
    }

    #[test]
    fn test_deserializes_through_validation() {
        let roles: FieldRoleMap = toml::from_str(
            r#"
            left = "l"
            right = "r"
            parent = "parent"
            key = "val"
            root = "head"
            max = "max_node"
            "#,
        )
        .unwrap();
        assert_eq!(roles.field(Role::Max), Some("max_node"));

        let incomplete = toml::from_str::<FieldRoleMap>(r#"left = "l""#);
        assert!(incomplete.is_err());
    }
}
