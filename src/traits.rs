//! Rerank client and node postprocessor traits.
//!
//! # WHY: Two Seams
//!
//! - [`RerankClient`] is the remote boundary. The reranker gets one injected
//!   at construction, so tests swap in [`MockRerankClient`](crate::providers::mock::MockRerankClient)
//!   and deployments pick Bedrock or an HTTP endpoint without code changes.
//! - [`NodePostprocessor`] is the host boundary. A retrieval pipeline holds
//!   `Arc<dyn NodePostprocessor>` and does not care which postprocessor it runs.
//!
//! ```ascii
//!   host pipeline
//!        │  postprocess_nodes(nodes, query)
//!        ▼
//! ┌──────────────────┐   RerankRequest    ┌──────────────────┐
//! │ NodePostprocessor│ ─────────────────► │   RerankClient   │
//! │   (Reranker)     │ ◄───────────────── │ Bedrock/HTTP/Mock│
//! └──────────────────┘   RerankResponse   └──────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::reranker::{RerankRequest, RerankResponse};
use crate::schema::{NodeWithScore, QueryBundle};

/// A remote (or simulated) rerank service.
///
/// Implementations issue exactly one service call per [`rerank`](RerankClient::rerank)
/// and return results in the order the service produced them.
#[async_trait]
pub trait RerankClient: Send + Sync {
    /// Get the name of this client.
    fn name(&self) -> &str;

    /// Score `request.documents` against `request.query`.
    async fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse>;
}

/// Postprocesses retrieved nodes before they reach the LLM.
#[async_trait]
pub trait NodePostprocessor: Send + Sync {
    /// Get the name of this postprocessor.
    fn name(&self) -> &str;

    /// Postprocess `nodes` for `query`.
    ///
    /// Postprocessors that need a query fail with
    /// [`RerankError::InvalidRequest`](crate::RerankError::InvalidRequest) when it is `None`.
    async fn postprocess_nodes(
        &self,
        nodes: Vec<NodeWithScore>,
        query: Option<&QueryBundle>,
    ) -> Result<Vec<NodeWithScore>>;

    /// Postprocess with a plain query string.
    ///
    /// Convenience method that wraps the string in a [`QueryBundle`].
    async fn postprocess_nodes_with_query_str(
        &self,
        nodes: Vec<NodeWithScore>,
        query_str: &str,
    ) -> Result<Vec<NodeWithScore>> {
        let bundle = QueryBundle::new(query_str);
        self.postprocess_nodes(nodes, Some(&bundle)).await
    }
}

