//! Node reranker backed by a remote rerank client.
//!
//! # Algorithm
//!
//! ```ascii
//! nodes [n0, n1, n2, n3]   query "last"   top_n = 2
//!        │
//!        ▼  render content (metadata mode), clamp top_n to len(nodes)
//! RerankRequest { documents: [t0, t1, t2, t3], numberOfResults: 2 }
//!        │
//!        ▼  one client call
//! RerankResponse { results: [(2, 0.9), (3, 0.8)] }
//!        │
//!        ▼  map index → node, replace score, keep service order
//! [n2(0.9), n3(0.8)]
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::config::RerankConfig;
use super::result::{ModelConfiguration, RerankRequest, RerankResponse};
use crate::error::{RerankError, Result};
use crate::schema::{NodeWithScore, QueryBundle};
use crate::traits::{NodePostprocessor, RerankClient};

/// Reranks nodes through an injected [`RerankClient`].
///
/// The reranker holds no mutable state: `top_n` is clamped per call and the
/// configured value never changes.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use edgequake_rerank::{BedrockRerankClient, NodePostprocessor, RerankConfig, Reranker};
///
/// let client = Arc::new(BedrockRerankClient::from_env().await?);
/// let reranker = Reranker::new(client, RerankConfig::default().with_top_n(3))?;
/// let top = reranker.postprocess_nodes_with_query_str(nodes, "rust async").await?;
/// ```
pub struct Reranker {
    client: Arc<dyn RerankClient>,
    config: RerankConfig,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("client", &self.client.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Reranker {
    /// Create a reranker around a pre-built client.
    pub fn new(client: Arc<dyn RerankClient>, config: RerankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// Configured maximum number of results.
    pub fn top_n(&self) -> usize {
        self.config.top_n
    }

    /// Model being used.
    pub fn model(&self) -> &str {
        &self.config.model_id
    }

    /// Full configuration.
    pub fn config(&self) -> &RerankConfig {
        &self.config
    }

    /// Rerank `nodes` against `query`.
    ///
    /// Returns at most `min(top_n, nodes.len())` nodes in the order the
    /// service returned them, each carrying the service's score. An empty
    /// input returns an empty output without calling the client.
    #[instrument(
        skip(self, nodes, query),
        fields(provider = %self.client.name(), model = %self.config.model_id, nodes = nodes.len())
    )]
    pub async fn rerank(&self, nodes: Vec<NodeWithScore>, query: &str) -> Result<Vec<NodeWithScore>> {
        if nodes.is_empty() {
            debug!("No nodes to rerank, skipping remote call");
            return Ok(Vec::new());
        }

        let request = self.build_request(&nodes, query);
        debug!(
            top_n = request.number_of_results,
            "Rerank start: {} documents",
            request.documents.len()
        );

        let response = self.client.rerank(&request).await?;
        let reranked = Self::map_results(&nodes, response, request.number_of_results)?;

        debug!("Rerank end: {} nodes kept", reranked.len());
        Ok(reranked)
    }

    /// Build the request for one call. `numberOfResults` is clamped to the
    /// number of nodes.
    pub fn build_request(&self, nodes: &[NodeWithScore], query: &str) -> RerankRequest {
        RerankRequest {
            query: query.to_string(),
            documents: nodes
                .iter()
                .map(|n| n.content(self.config.metadata_mode))
                .collect(),
            number_of_results: self.config.top_n.min(nodes.len()),
            model_configuration: ModelConfiguration {
                model_id: self.config.model_id.clone(),
                additional_model_request_fields: self.config.additional_model_request_fields.clone(),
            },
        }
    }

    /// Map service results back onto the input nodes.
    ///
    /// Out-of-range or repeated indices make the response malformed. Results
    /// past `requested` are dropped.
    fn map_results(
        nodes: &[NodeWithScore],
        response: RerankResponse,
        requested: usize,
    ) -> Result<Vec<NodeWithScore>> {
        let returned = response.results.len();
        if returned > requested {
            warn!(
                "Rerank service returned {} results for {} requested, truncating",
                returned, requested
            );
        } else if returned < requested {
            warn!(
                "Rerank service returned {} results for {} requested",
                returned, requested
            );
        }

        let mut seen = vec![false; nodes.len()];
        let mut reranked = Vec::with_capacity(returned.min(requested));
        for result in response.results.into_iter().take(requested) {
            let node = nodes.get(result.index).ok_or_else(|| {
                RerankError::MalformedResponse(format!(
                    "Rerank index {} out of range for {} nodes",
                    result.index,
                    nodes.len()
                ))
            })?;
            if std::mem::replace(&mut seen[result.index], true) {
                return Err(RerankError::MalformedResponse(format!(
                    "Rerank index {} returned more than once",
                    result.index
                )));
            }
            reranked.push(node.rescored(result.relevance_score));
        }

        Ok(reranked)
    }
}

#[async_trait]
impl NodePostprocessor for Reranker {
    fn name(&self) -> &str {
        "reranker"
    }

    async fn postprocess_nodes(
        &self,
        nodes: Vec<NodeWithScore>,
        query: Option<&QueryBundle>,
    ) -> Result<Vec<NodeWithScore>> {
        let query = query
            .ok_or_else(|| RerankError::InvalidRequest("Missing query bundle".to_string()))?;
        self.rerank(nodes, &query.query_str).await
    }
}
