//! Rerank request and result types.
//!
//! These are the provider-neutral wire shapes that cross the
//! [`RerankClient`](crate::traits::RerankClient) seam. Each client binds them
//! to its own API (Bedrock SDK types, Jina/Cohere JSON, ...).
//!
//! ```ascii
//! RerankRequest                          RerankResponse
//! ├── query: String                      └── results: [RerankResult]
//! ├── documents: [String]                      ├── index: usize
//! ├── numberOfResults: usize                   └── relevanceScore: f64
//! └── modelConfiguration
//!     ├── modelId: String
//!     └── additionalModelRequestFields?
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{RerankError, Result};

/// Model selection forwarded to the rerank service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfiguration {
    /// Model identifier (or a full ARN for Bedrock).
    pub model_id: String,

    /// Extra model-specific request fields, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_model_request_fields: Option<Map<String, JsonValue>>,
}

/// One rerank call: a query, the candidate texts and how many results to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankRequest {
    /// Query to rank against.
    pub query: String,

    /// Candidate document texts, in input order.
    pub documents: Vec<String>,

    /// Number of results requested. Never larger than `documents.len()`.
    pub number_of_results: usize,

    /// Model configuration.
    pub model_configuration: ModelConfiguration,
}

/// Result from reranking a document.
///
/// # Fields
///
/// - `index`: Position of the document in the original input list
/// - `relevance_score`: Relevance score assigned by the service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerankResult {
    /// Index of the document in the original list.
    pub index: usize,
    /// Relevance score (higher is more relevant).
    #[serde(alias = "relevance_score")]
    pub relevance_score: f64,
}

impl RerankResult {
    /// Create a result.
    pub fn new(index: usize, relevance_score: f64) -> Self {
        Self {
            index,
            relevance_score,
        }
    }
}

/// Response of a rerank call.
///
/// `results` keeps the order the service produced. Nothing here re-sorts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResponse {
    /// Results in service order.
    pub results: Vec<RerankResult>,
}

impl RerankResponse {
    /// Create a response from results in service order.
    pub fn new(results: Vec<RerankResult>) -> Self {
        Self { results }
    }

    /// Parse a JSON rerank payload.
    ///
    /// Accepts `{"results": [...]}` and the DashScope `{"output": {"results": [...]}}`
    /// envelope. Each entry needs an unsigned `index` and a numeric
    /// `relevanceScore` (or `relevance_score`).
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let results = value
            .get("results")
            .or_else(|| value.get("output").and_then(|o| o.get("results")))
            .ok_or_else(|| {
                RerankError::MalformedResponse("Missing results in rerank response".to_string())
            })?
            .as_array()
            .ok_or_else(|| {
                RerankError::MalformedResponse("Rerank results is not an array".to_string())
            })?;

        let mut parsed = Vec::with_capacity(results.len());
        for (position, result) in results.iter().enumerate() {
            let index = result
                .get("index")
                .and_then(|i| i.as_u64())
                .ok_or_else(|| {
                    RerankError::MalformedResponse(format!(
                        "Missing or invalid index in rerank result {}",
                        position
                    ))
                })?;
            let score = result
                .get("relevanceScore")
                .or_else(|| result.get("relevance_score"))
                .and_then(|s| s.as_f64())
                .ok_or_else(|| {
                    RerankError::MalformedResponse(format!(
                        "Missing relevanceScore in rerank result {}",
                        position
                    ))
                })?;

            let index = usize::try_from(index).map_err(|_| {
                RerankError::MalformedResponse(format!("Rerank index {} overflows usize", index))
            })?;
            parsed.push(RerankResult::new(index, score));
        }

        Ok(Self { results: parsed })
    }
}
