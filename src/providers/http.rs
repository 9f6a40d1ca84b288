//! HTTP rerank client.
//!
//! Talks to JSON rerank endpoints (Jina, Cohere, Aliyun DashScope).
//!
//! # Supported Providers
//!
//! | Provider | API | Request shape |
//! |----------|-----|---------------|
//! | Jina AI | REST | `{model, query, documents, top_n}` |
//! | Cohere | REST | `{model, query, documents, top_n}` |
//! | Aliyun | REST | `{model, input: {query, documents}, parameters: {top_n}}` |
//!
//! The model name comes from the request's [`ModelConfiguration`](crate::reranker::ModelConfiguration),
//! so the same client serves any model the endpoint hosts.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{RerankError, Result};
use crate::reranker::{RerankRequest, RerankResponse};
use crate::traits::RerankClient;

/// Connection settings for an HTTP rerank endpoint.
///
/// # Example
///
/// ```
/// use edgequake_rerank::providers::http::HttpRerankConfig;
///
/// let config = HttpRerankConfig::cohere("your-api-key");
/// assert!(config.base_url.contains("cohere.com"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRerankConfig {
    /// Rerank endpoint URL.
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for HttpRerankConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jina.ai/v1/rerank".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpRerankConfig {
    /// Jina AI rerank endpoint.
    pub fn jina(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.jina.ai/v1/rerank".to_string(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Cohere v2 rerank endpoint.
    pub fn cohere(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.cohere.com/v2/rerank".to_string(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Aliyun DashScope rerank endpoint.
    pub fn aliyun(api_key: impl Into<String>) -> Self {
        Self {
            base_url:
                "https://dashscope.aliyuncs.com/api/v1/services/rerank/text-rerank/text-rerank"
                    .to_string(),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Custom endpoint.
    pub fn custom(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestFormat {
    /// Standard format: {"query": "...", "documents": [...], "top_n": n}
    Standard,
    /// Aliyun format: {"input": {"query": "...", "documents": [...]}}
    Aliyun,
}

/// HTTP rerank client.
///
/// ```ascii
/// ┌──────────────────┐    HTTP     ┌─────────────────┐
/// │  HttpRerankClient│ ─────────►  │  Provider API   │
/// │                  │             │  (Jina/Cohere)  │
/// └────────┬─────────┘             └────────┬────────┘
///          │   RerankRequest                │  JSON Response
///          │   - query                      │  - results[]
///          │   - documents                  │    - index
///          │   - numberOfResults → top_n    │    - relevance_score
///          └────────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct HttpRerankClient {
    client: Client,
    config: HttpRerankConfig,
    request_format: RequestFormat,
}

impl HttpRerankClient {
    /// Create a client for the given endpoint.
    pub fn new(config: HttpRerankConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RerankError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            request_format: Self::detect_format(&config.base_url),
            config,
        })
    }

    /// Create a Jina client.
    pub fn jina(api_key: impl Into<String>) -> Result<Self> {
        Self::new(HttpRerankConfig::jina(api_key))
    }

    /// Create a Cohere client.
    pub fn cohere(api_key: impl Into<String>) -> Result<Self> {
        Self::new(HttpRerankConfig::cohere(api_key))
    }

    /// Create an Aliyun client.
    pub fn aliyun(api_key: impl Into<String>) -> Result<Self> {
        Self::new(HttpRerankConfig::aliyun(api_key))
    }

    fn detect_format(base_url: &str) -> RequestFormat {
        if base_url.contains("dashscope.aliyuncs.com") {
            RequestFormat::Aliyun
        } else {
            RequestFormat::Standard
        }
    }

    fn build_payload(&self, request: &RerankRequest) -> serde_json::Value {
        let model = &request.model_configuration.model_id;
        let mut payload = match self.request_format {
            RequestFormat::Standard => serde_json::json!({
                "model": model,
                "query": request.query,
                "documents": request.documents,
                "top_n": request.number_of_results,
            }),
            RequestFormat::Aliyun => serde_json::json!({
                "model": model,
                "input": {
                    "query": request.query,
                    "documents": request.documents,
                },
                "parameters": {
                    "top_n": request.number_of_results,
                },
            }),
        };

        if let (Some(extra), Some(object)) = (
            &request.model_configuration.additional_model_request_fields,
            payload.as_object_mut(),
        ) {
            for (key, value) in extra {
                object.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        payload
    }

    /// Error body text, or a marker naming why it could not be read.
    fn body_or_marker<E: std::fmt::Display>(body: std::result::Result<String, E>) -> String {
        body.unwrap_or_else(|e| format!("<unreadable body: {e}>"))
    }

    fn map_status(status: reqwest::StatusCode, body: String) -> RerankError {
        let message = format!("Rerank API error ({}): {}", status.as_u16(), body);
        match status.as_u16() {
            401 | 403 => RerankError::AuthError(message),
            404 => RerankError::ModelNotFound(message),
            400 | 422 => RerankError::InvalidRequest(message),
            429 => RerankError::RateLimited(message),
            _ => RerankError::ApiError(message),
        }
    }
}

#[async_trait]
impl RerankClient for HttpRerankClient {
    fn name(&self) -> &str {
        if self.config.base_url.contains("jina.ai") {
            "jina"
        } else if self.config.base_url.contains("cohere.com") {
            "cohere"
        } else if self.config.base_url.contains("aliyuncs.com") {
            "aliyun"
        } else {
            "http"
        }
    }

    #[instrument(skip(self, request), fields(provider = %self.name(), model = %request.model_configuration.model_id))]
    async fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse> {
        let payload = self.build_payload(request);

        debug!(
            "Rerank request: {} documents, top_n: {}",
            request.documents.len(),
            request.number_of_results
        );

        let mut http_request = self
            .client
            .post(&self.config.base_url)
            .header("Content-Type", "application/json");

        if let Some(ref api_key) = self.config.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = http_request.json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = Self::body_or_marker(response.text().await);
            return Err(Self::map_status(status, error_text));
        }

        let body: serde_json::Value = response.json().await?;
        RerankResponse::from_json(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reranker::ModelConfiguration;
    use serde_json::json;

    fn request(extra: Option<serde_json::Map<String, serde_json::Value>>) -> RerankRequest {
        RerankRequest {
            query: "last".to_string(),
            documents: vec!["first 1".to_string(), "last 1".to_string()],
            number_of_results: 1,
            model_configuration: ModelConfiguration {
                model_id: "jina-reranker-v2-base-multilingual".to_string(),
                additional_model_request_fields: extra,
            },
        }
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(HttpRerankClient::jina("k").unwrap().name(), "jina");
        assert_eq!(HttpRerankClient::cohere("k").unwrap().name(), "cohere");
        assert_eq!(HttpRerankClient::aliyun("k").unwrap().name(), "aliyun");
        let custom = HttpRerankClient::new(HttpRerankConfig::custom("http://localhost:8080/rerank"))
            .unwrap();
        assert_eq!(custom.name(), "http");
    }

    #[test]
    fn test_standard_payload() {
        let client = HttpRerankClient::jina("k").unwrap();
        let payload = client.build_payload(&request(None));
        assert_eq!(payload["model"], "jina-reranker-v2-base-multilingual");
        assert_eq!(payload["query"], "last");
        assert_eq!(payload["top_n"], 1);
        assert_eq!(payload["documents"][1], "last 1");
    }

    #[test]
    fn test_aliyun_payload() {
        let client = HttpRerankClient::aliyun("k").unwrap();
        let payload = client.build_payload(&request(None));
        assert_eq!(payload["input"]["query"], "last");
        assert_eq!(payload["parameters"]["top_n"], 1);
        assert!(payload.get("top_n").is_none());
    }

    #[test]
    fn test_extra_fields_do_not_override() {
        let client = HttpRerankClient::cohere("k").unwrap();
        let mut extra = serde_json::Map::new();
        extra.insert("max_tokens_per_doc".to_string(), json!(4096));
        extra.insert("top_n".to_string(), json!(99));

        let payload = client.build_payload(&request(Some(extra)));
        assert_eq!(payload["max_tokens_per_doc"], 4096);
        assert_eq!(payload["top_n"], 1);
    }

    #[test]
    fn test_status_mapping() {
        let err = HttpRerankClient::map_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, RerankError::RateLimited(_)));
        let err = HttpRerankClient::map_status(reqwest::StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(err, RerankError::AuthError(_)));
        let err =
            HttpRerankClient::map_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, String::new());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_unreadable_error_body_is_marked() {
        let body = HttpRerankClient::body_or_marker(Err::<String, _>("connection reset"));
        assert_eq!(body, "<unreadable body: connection reset>");

        let err = HttpRerankClient::map_status(reqwest::StatusCode::BAD_GATEWAY, body);
        assert!(err.to_string().contains("<unreadable body: connection reset>"));
        assert_eq!(
            HttpRerankClient::body_or_marker(Ok::<_, String>("quota".to_string())),
            "quota"
        );
    }
}
