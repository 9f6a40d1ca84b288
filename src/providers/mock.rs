//! Mock rerank client for testing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MockRerankClient                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  add_response() / add_error()  ─► queued, consumed in order │
//! │  requests()                    ─► every request received    │
//! │  (queue empty)                 ─► term-overlap scoring      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{RerankError, Result};
use crate::reranker::{RerankRequest, RerankResponse, RerankResult};
use crate::traits::RerankClient;

/// Deterministic rerank client that records every request.
///
/// Queued outcomes are returned first, in insertion order. Once the queue is
/// empty the client scores documents by query term overlap, so it still
/// behaves like a ranker in pipeline tests.
///
/// # Example
///
/// ```
/// use edgequake_rerank::providers::mock::MockRerankClient;
/// use edgequake_rerank::{RerankResponse, RerankResult};
///
/// let client = MockRerankClient::new();
/// client.add_response_sync(RerankResponse::new(vec![RerankResult::new(0, 0.9)]));
/// assert_eq!(client.call_count_sync(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRerankClient {
    outcomes: Arc<Mutex<VecDeque<Result<RerankResponse>>>>,
    requests: Arc<Mutex<Vec<RerankRequest>>>,
}

impl MockRerankClient {
    /// Create a mock client with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub async fn add_response(&self, response: RerankResponse) {
        self.outcomes.lock().await.push_back(Ok(response));
    }

    /// Queue a failure.
    pub async fn add_error(&self, error: RerankError) {
        self.outcomes.lock().await.push_back(Err(error));
    }

    /// Queue a response from a JSON payload, as a remote service would send it.
    ///
    /// Malformed payloads are queued as the parse error.
    pub async fn add_json_response(&self, payload: serde_json::Value) {
        let outcome = RerankResponse::from_json(&payload);
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Queue a response from synchronous code.
    ///
    /// Dropped if the queue is locked by a running call.
    pub fn add_response_sync(&self, response: RerankResponse) {
        if let Ok(mut outcomes) = self.outcomes.try_lock() {
            outcomes.push_back(Ok(response));
        }
    }

    /// All requests received so far.
    pub async fn requests(&self) -> Vec<RerankRequest> {
        self.requests.lock().await.clone()
    }

    /// The most recent request.
    pub async fn last_request(&self) -> Option<RerankRequest> {
        self.requests.lock().await.last().cloned()
    }

    /// Number of calls received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// Number of calls received so far, from synchronous code.
    pub fn call_count_sync(&self) -> usize {
        self.requests.try_lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Score documents by the share of query terms they contain.
    fn term_overlap(request: &RerankRequest) -> RerankResponse {
        let query_lower = request.query.to_lowercase();
        let query_terms: HashSet<&str> = query_lower.split_whitespace().collect();
        let max_terms = query_terms.len().max(1);

        let mut results: Vec<RerankResult> = request
            .documents
            .iter()
            .enumerate()
            .map(|(idx, doc)| {
                let doc_lower = doc.to_lowercase();
                let doc_terms: HashSet<&str> = doc_lower.split_whitespace().collect();
                let overlap = query_terms.intersection(&doc_terms).count();
                RerankResult::new(idx, overlap as f64 / max_terms as f64)
            })
            .collect();

        // Stable sort: ties keep input order.
        results.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(request.number_of_results);

        RerankResponse::new(results)
    }
}

#[async_trait]
impl RerankClient for MockRerankClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse> {
        self.requests.lock().await.push(request.clone());

        match self.outcomes.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => Ok(Self::term_overlap(request)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reranker::ModelConfiguration;

    fn request(query: &str, documents: &[&str], number_of_results: usize) -> RerankRequest {
        RerankRequest {
            query: query.to_string(),
            documents: documents.iter().map(|d| d.to_string()).collect(),
            number_of_results,
            model_configuration: ModelConfiguration {
                model_id: "mock-rerank".to_string(),
                additional_model_request_fields: None,
            },
        }
    }

    #[tokio::test]
    async fn test_queued_responses_in_order() {
        let client = MockRerankClient::new();
        client
            .add_response(RerankResponse::new(vec![RerankResult::new(1, 0.5)]))
            .await;
        client.add_error(RerankError::Timeout).await;

        let req = request("q", &["a", "b"], 1);
        let first = client.rerank(&req).await.unwrap();
        assert_eq!(first.results, vec![RerankResult::new(1, 0.5)]);
        assert!(matches!(
            client.rerank(&req).await,
            Err(RerankError::Timeout)
        ));
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_term_overlap_fallback() {
        let client = MockRerankClient::new();
        let req = request(
            "capital of France",
            &[
                "Tokyo is the capital of Japan.",
                "The capital of France is Paris.",
                "Bananas are yellow.",
            ],
            2,
        );

        let response = client.rerank(&req).await.unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].index, 1);
        assert!(response.results[0].relevance_score > response.results[1].relevance_score);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let client = MockRerankClient::new();
        let req = request("q", &["a"], 1);
        client.rerank(&req).await.unwrap();
        assert_eq!(client.last_request().await, Some(req));
    }

    #[tokio::test]
    async fn test_json_response_malformed_is_error() {
        let client = MockRerankClient::new();
        client
            .add_json_response(serde_json::json!({"results": [{"index": 0}]}))
            .await;
        let err = client.rerank(&request("q", &["a"], 1)).await.unwrap_err();
        assert!(matches!(err, RerankError::MalformedResponse(_)));
    }
}
