//! Node and query types handed to postprocessors.
//!
//! # Key Types
//!
//! - [`TextNode`]: a retrieved chunk of text with an identity and metadata
//! - [`NodeWithScore`]: a node plus its (optional) relevance score
//! - [`QueryBundle`]: the query a postprocessor ranks against
//! - [`MetadataMode`]: which metadata is rendered into node content
//!
//! Nodes are shared through `Arc<TextNode>`: a reranker hands back the same
//! node it received and only replaces the score.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which metadata keys are rendered by [`TextNode::content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataMode {
    /// Render every metadata key.
    All,
    /// Render keys not listed in `excluded_embed_metadata_keys`.
    #[default]
    Embed,
    /// Render keys not listed in `excluded_llm_metadata_keys`.
    Llm,
    /// Render the text only.
    None,
}

/// A text-bearing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    /// Stable identity of the node.
    pub id: String,

    /// Text content.
    pub text: String,

    /// Arbitrary metadata, kept ordered so rendering is deterministic.
    #[serde(default)]
    pub metadata: BTreeMap<String, JsonValue>,

    /// Metadata keys hidden from [`MetadataMode::Embed`].
    #[serde(default)]
    pub excluded_embed_metadata_keys: Vec<String>,

    /// Metadata keys hidden from [`MetadataMode::Llm`].
    #[serde(default)]
    pub excluded_llm_metadata_keys: Vec<String>,
}

impl TextNode {
    /// Create a node with no metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
            excluded_embed_metadata_keys: Vec::new(),
            excluded_llm_metadata_keys: Vec::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Hide a metadata key from the embed rendering.
    pub fn exclude_from_embed(mut self, key: impl Into<String>) -> Self {
        self.excluded_embed_metadata_keys.push(key.into());
        self
    }

    /// Hide a metadata key from the LLM rendering.
    pub fn exclude_from_llm(mut self, key: impl Into<String>) -> Self {
        self.excluded_llm_metadata_keys.push(key.into());
        self
    }

    /// Render metadata as `key: value` lines for the given mode.
    ///
    /// String values are rendered without JSON quotes.
    pub fn metadata_str(&self, mode: MetadataMode) -> String {
        let excluded: &[String] = match mode {
            MetadataMode::All => &[],
            MetadataMode::Embed => &self.excluded_embed_metadata_keys,
            MetadataMode::Llm => &self.excluded_llm_metadata_keys,
            MetadataMode::None => return String::new(),
        };

        self.metadata
            .iter()
            .filter(|(key, _)| !excluded.contains(*key))
            .map(|(key, value)| match value {
                JsonValue::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Node content as seen by a model: metadata block, blank line, text.
    ///
    /// Without any rendered metadata this is just the text.
    pub fn content(&self, mode: MetadataMode) -> String {
        let metadata = self.metadata_str(mode);
        if metadata.is_empty() {
            self.text.clone()
        } else {
            format!("{}\n\n{}", metadata, self.text)
        }
    }
}

/// A node paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWithScore {
    /// The node, shared by reference.
    pub node: Arc<TextNode>,

    /// Relevance score, `None` until something scores the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl NodeWithScore {
    /// Wrap a node with no score.
    pub fn new(node: TextNode) -> Self {
        Self {
            node: Arc::new(node),
            score: None,
        }
    }

    /// Wrap a node with a score.
    pub fn with_score(node: TextNode, score: f64) -> Self {
        Self {
            node: Arc::new(node),
            score: Some(score),
        }
    }

    /// Same node, new score.
    pub fn rescored(&self, score: f64) -> Self {
        Self {
            node: Arc::clone(&self.node),
            score: Some(score),
        }
    }

    /// Node identity.
    pub fn node_id(&self) -> &str {
        &self.node.id
    }

    /// Node content for the given metadata mode.
    pub fn content(&self, mode: MetadataMode) -> String {
        self.node.content(mode)
    }
}

/// The query a postprocessor ranks against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBundle {
    /// The raw query string.
    pub query_str: String,
}

impl QueryBundle {
    /// Create a query bundle from a query string.
    pub fn new(query_str: impl Into<String>) -> Self {
        Self {
            query_str: query_str.into(),
        }
    }
}

impl From<&str> for QueryBundle {
    fn from(query_str: &str) -> Self {
        Self::new(query_str)
    }
}

impl From<String> for QueryBundle {
    fn from(query_str: String) -> Self {
        Self { query_str }
    }
}
