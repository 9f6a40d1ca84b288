//! EdgeQuake Rerank - Remote reranking of retrieved nodes
//!
//! This crate provides a node postprocessor for retrieval pipelines:
//! - Take the nodes a retriever returned and the user's query
//! - Send the node texts and the query to a remote rerank model
//! - Keep the `top_n` nodes the model ranked highest, with its scores
//!
//! # Clients
//!
//! | Client | Backend | Notes |
//! |--------|---------|-------|
//! | Bedrock | AWS Bedrock Agent Runtime `Rerank` | Amazon / Cohere rerank models (feature `bedrock`) |
//! | HTTP | Jina, Cohere, Aliyun REST | Bearer API key |
//! | Mock | In-process | Testing (no API calls) |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use edgequake_rerank::{
//!     BedrockRerankClient, NodePostprocessor, NodeWithScore, RerankConfig, Reranker, TextNode,
//! };
//!
//! let client = Arc::new(BedrockRerankClient::from_env().await?);
//! let reranker = Reranker::new(client, RerankConfig::default().with_top_n(2))?;
//!
//! let nodes = vec![
//!     NodeWithScore::new(TextNode::new("1", "first 1")),
//!     NodeWithScore::new(TextNode::new("2", "last 1")),
//! ];
//! let top = reranker.postprocess_nodes_with_query_str(nodes, "last").await?;
//! ```
//!
//! # See Also
//!
//! - [`crate::reranker`] for the postprocessor and wire types
//! - [`crate::providers`] for client implementations
//! - [`crate::traits`] for the client and postprocessor traits

pub mod error;
pub mod providers;
pub mod reranker;
pub mod schema;
pub mod traits;

pub use error::{RerankError, Result};
#[cfg(feature = "bedrock")]
pub use providers::bedrock::BedrockRerankClient;
pub use providers::http::{HttpRerankClient, HttpRerankConfig};
pub use providers::mock::MockRerankClient;
pub use reranker::{
    ModelConfiguration, RerankConfig, RerankRequest, RerankResponse, RerankResult, Reranker,
};
pub use schema::{MetadataMode, NodeWithScore, QueryBundle, TextNode};
pub use traits::{NodePostprocessor, RerankClient};
