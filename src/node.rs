//! Metadata tree model and its JSON rendering.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::error::MetadataError;

/// Prefix of the message carried by a failure report.
const FAILURE_PREFIX: &str = "Failed to fetch metadata";

/// A node of the instance metadata tree.
///
/// Serializes as a JSON string, `null`, or an object whose keys keep the
/// order the service listed them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataNode {
    /// Raw body of a value endpoint.
    Value(String),
    /// A listed key whose value endpoint answered 404.
    Absent,
    /// Children in listing order, directory names without the trailing `/`.
    Directory(Vec<(String, MetadataNode)>),
}

impl MetadataNode {
    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&MetadataNode> {
        match self {
            MetadataNode::Directory(entries) => entries
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    /// The leaf value, if this node is a present leaf.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            MetadataNode::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is a listed key that had no value.
    pub fn is_absent(&self) -> bool {
        matches!(self, MetadataNode::Absent)
    }

    /// Children of a directory node, in listing order.
    pub fn entries(&self) -> Option<&[(String, MetadataNode)]> {
        match self {
            MetadataNode::Directory(entries) => Some(entries),
            _ => None,
        }
    }
}

impl Serialize for MetadataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataNode::Value(value) => serializer.serialize_str(value),
            MetadataNode::Absent => serializer.serialize_none(),
            MetadataNode::Directory(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, node) in entries {
                    map.serialize_entry(key, node)?;
                }
                map.end()
            }
        }
    }
}

/// What one invocation prints: the resolved tree or a failure record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The resolved tree, or the one-entry map for a single key.
    Metadata(MetadataNode),
    /// Description of why the fetch failed.
    Failure(String),
}

impl Report {
    /// Whether the fetch failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Report::Failure(_))
    }

    /// Render as JSON indented with four spaces.
    pub fn to_json_pretty(&self) -> Result<String, MetadataError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl From<Result<MetadataNode, MetadataError>> for Report {
    fn from(result: Result<MetadataNode, MetadataError>) -> Self {
        match result {
            Ok(node) => Report::Metadata(node),
            Err(err) => Report::Failure(format!("{FAILURE_PREFIX}: {err}")),
        }
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Report::Metadata(node) => node.serialize(serializer),
            Report::Failure(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}
