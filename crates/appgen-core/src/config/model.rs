//! App config types and parsing

use anyhow::{Context, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use url::Url;

/// Marker that flags a string leaf as remote-fetched content.
/// Everything after the marker is a path relative to the repository base URL.
pub const REMOTE_MARKER: &str = "repo://";

/// The declarative app config, loaded once at startup and immutable afterwards
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Prompt specs; a trailing `?` marks a yes/no confirmation
    #[serde(default)]
    pub prompts: Vec<String>,

    /// The file/directory tree to materialize
    pub structure: TreeNode,

    /// Base URL that `repo://` leaves are resolved against
    pub repository: Url,

    /// Grunt task-runner configuration
    #[serde(default)]
    pub grunt: GruntSection,

    /// Bower packages; each may be made optional via a `pkg-<name>` prompt
    #[serde(default)]
    pub bower: Vec<String>,

    /// Npm packages, installed together with the derived grunt plugins
    #[serde(default)]
    pub npm: Vec<String>,
}

impl AppConfig {
    /// Load and parse an app config from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read app config {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse app config {}", path.display()))
    }
}

/// Grunt section of the app config
///
/// Both mappings keep YAML document order: `config` keys determine the order
/// of the derived plugin package list, `tasks` the order of registrations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GruntSection {
    /// Task-category name -> arbitrary configuration value
    #[serde(default)]
    pub config: serde_yaml::Mapping,

    /// Task name -> ordered list of job names
    #[serde(default)]
    pub tasks: serde_yaml::Mapping,
}

/// One node of the declarative project tree
///
/// String leaves are classified once at load time: a leaf containing the
/// `repo://` marker becomes `Remote` (carrying the path after the marker),
/// any other string becomes `Inline`. Mappings become directories, preserving
/// YAML entry order.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// A directory with named child nodes, in declaration order
    Directory(Vec<(String, TreeNode)>),
    /// A file written verbatim from the config string (never templated)
    Inline(String),
    /// A file fetched from the repository; payload is the remote-relative path
    Remote(String),
}

impl TreeNode {
    /// Classify a string leaf as inline or remote content
    pub fn classify(spec: &str) -> Self {
        match spec.find(REMOTE_MARKER) {
            Some(idx) => TreeNode::Remote(spec[idx + REMOTE_MARKER.len()..].to_string()),
            None => TreeNode::Inline(spec.to_string()),
        }
    }

    /// Number of file leaves in this subtree
    ///
    /// Computed up front by the materializer; the overall write phase is done
    /// only once exactly this many leaf writes have completed.
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Directory(entries) => {
                entries.iter().map(|(_, child)| child.leaf_count()).sum()
            }
            TreeNode::Inline(_) | TreeNode::Remote(_) => 1,
        }
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = TreeNode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a file spec string or a mapping of names to nodes")
            }

            fn visit_str<E>(self, value: &str) -> Result<TreeNode, E>
            where
                E: de::Error,
            {
                Ok(TreeNode::classify(value))
            }

            fn visit_map<A>(self, mut map: A) -> Result<TreeNode, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, node)) = map.next_entry::<String, TreeNode>()? {
                    entries.push((name, node));
                }
                Ok(TreeNode::Directory(entries))
            }
        }

        deserializer.deserialize_any(NodeVisitor)
    }
}
