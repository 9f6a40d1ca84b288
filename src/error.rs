//! Rerank error types.
//!
//! # Error Handling Philosophy
//!
//! The reranker never retries on its own. Remote failures are classified and
//! handed back to the caller unchanged, so the host decides whether to retry,
//! fall back to the retrieval order, or surface the failure.
//!
//! # Common Errors and Solutions
//!
//! | Error | Cause | Solution |
//! |-------|-------|----------|
//! | `AuthError` | Missing IAM permission / bad API key | Grant `bedrock:Rerank` or check the key |
//! | `RateLimited` | Throttled by the service | Back off and retry later |
//! | `ModelNotFound` | Model not enabled in the region | Enable model access or change region |
//! | `MalformedResponse` | Service answered with missing/bad fields | Report upstream; do not retry |
//! | `Timeout` | Network slow | Increase timeout or retry |

use thiserror::Error;

/// Result type for rerank operations.
pub type Result<T> = std::result::Result<T, RerankError>;

/// Errors that can occur while reranking.
#[derive(Debug, Error)]
pub enum RerankError {
    /// API error from the rerank endpoint.
    #[error("API error: {0}")]
    ApiError(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication or authorization error.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Model not found or not enabled.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The service answered, but the payload could not be mapped back to nodes.
    #[error("Malformed rerank response: {0}")]
    MalformedResponse(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Provider-specific error.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Timeout error.
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for RerankError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RerankError::Timeout
        } else if err.is_connect() {
            RerankError::NetworkError(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            RerankError::MalformedResponse(err.to_string())
        } else {
            RerankError::NetworkError(err.to_string())
        }
    }
}

impl RerankError {
    /// Check if a caller-side retry could succeed.
    ///
    /// The reranker itself never retries; this only classifies.
    ///
    /// # Example
    ///
    /// ```
    /// use edgequake_rerank::RerankError;
    ///
    /// assert!(RerankError::Timeout.is_recoverable());
    /// assert!(!RerankError::AuthError("denied".to_string()).is_recoverable());
    /// ```
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::Timeout | Self::RateLimited(_) => true,
            Self::ApiError(msg) => {
                msg.contains("500") || msg.contains("502") || msg.contains("503")
            }
            Self::ProviderError(_) => true,
            Self::InvalidRequest(_)
            | Self::AuthError(_)
            | Self::ModelNotFound(_)
            | Self::MalformedResponse(_)
            | Self::SerializationError(_)
            | Self::ConfigError(_) => false,
        }
    }

    /// Get a user-friendly description of the error with suggested action.
    pub fn user_description(&self) -> String {
        match self {
            Self::NetworkError(_) => {
                "Unable to reach the rerank endpoint. Check your network connection.".to_string()
            }
            Self::Timeout => "Rerank request timed out. The service may be overloaded.".to_string(),
            Self::RateLimited(_) => "Rate limited by the rerank service. Retry later.".to_string(),
            Self::AuthError(_) => {
                "Authentication failed. Check your credentials and rerank permissions.".to_string()
            }
            Self::ModelNotFound(model) => {
                format!(
                    "Rerank model '{}' not found. Check the model id and that access is enabled in this region.",
                    model
                )
            }
            Self::InvalidRequest(msg) => format!("Invalid request: {}. Check your parameters.", msg),
            Self::MalformedResponse(msg) => {
                format!("The rerank service returned an unusable response: {}", msg)
            }
            Self::ConfigError(msg) => format!("Configuration error: {}.", msg),
            Self::ApiError(_) | Self::ProviderError(_) => "Rerank service error.".to_string(),
            Self::SerializationError(_) => "Failed to encode or decode rerank payload.".to_string(),
        }
    }
}
