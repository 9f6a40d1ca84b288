//! Reranker configuration types.
//!
//! # Architecture
//!
//! ```ascii
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         RerankConfig                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ top_n: usize            ─────► Max results per call (clamped)   │
//! │ model_id: String        ─────► Rerank model / ARN               │
//! │ metadata_mode           ─────► Node rendering sent to the model │
//! │ additional_model_request_fields ─► Passed through to the model  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! - `BEDROCK_RERANK_MODEL`: Model ID (default: `amazon.rerank-v1:0`)
//! - `BEDROCK_RERANK_TOP_N`: Default result count (default: `2`)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{RerankError, Result};
use crate::schema::MetadataMode;

/// Default rerank model on Bedrock.
pub const DEFAULT_MODEL_ID: &str = "amazon.rerank-v1:0";

/// Default number of results kept per call.
pub const DEFAULT_TOP_N: usize = 2;

/// Configuration for a [`Reranker`](super::Reranker).
///
/// # Example
///
/// ```
/// use edgequake_rerank::RerankConfig;
///
/// let config = RerankConfig::default()
///     .with_top_n(5)
///     .with_model("cohere.rerank-v3-5:0");
/// assert_eq!(config.top_n, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Maximum number of results returned per call.
    pub top_n: usize,
    /// Rerank model ID (or full ARN).
    pub model_id: String,
    /// Which node metadata is rendered into the text sent to the model.
    pub metadata_mode: MetadataMode,
    /// Extra model request fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_model_request_fields: Option<Map<String, JsonValue>>,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            model_id: DEFAULT_MODEL_ID.to_string(),
            metadata_mode: MetadataMode::Embed,
            additional_model_request_fields: None,
        }
    }
}

impl RerankConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("BEDROCK_RERANK_MODEL") {
            if !model.trim().is_empty() {
                config.model_id = model.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var("BEDROCK_RERANK_TOP_N") {
            config.top_n = raw.trim().parse().map_err(|_| {
                RerankError::ConfigError(format!(
                    "BEDROCK_RERANK_TOP_N must be a positive integer, got '{}'",
                    raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the top N results to return.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the model ID.
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the metadata rendering mode.
    pub fn with_metadata_mode(mut self, mode: MetadataMode) -> Self {
        self.metadata_mode = mode;
        self
    }

    /// Set extra model request fields.
    pub fn with_additional_model_request_fields(mut self, fields: Map<String, JsonValue>) -> Self {
        self.additional_model_request_fields = Some(fields);
        self
    }

    /// Check the config can be used.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(RerankError::ConfigError(
                "top_n must be a positive integer".to_string(),
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(RerankError::ConfigError(
                "model_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
