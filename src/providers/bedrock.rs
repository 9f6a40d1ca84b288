//! AWS Bedrock Agent Runtime rerank client.
//!
//! Implements [`RerankClient`] with the Bedrock Agent Runtime `Rerank` API,
//! which serves the hosted rerank models (Amazon Rerank, Cohere Rerank).
//!
//! # Feature Gate
//!
//! This module is only available when the `bedrock` feature is enabled
//! (on by default).
//!
//! # Environment Variables
//!
//! - `AWS_REGION` / `AWS_DEFAULT_REGION`: AWS region (default: `us-east-1`)
//! - Standard AWS credential chain (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`,
//!   `AWS_SESSION_TOKEN`, `AWS_PROFILE`, IAM roles, etc.)
//!
//! # Request Mapping
//!
//! ```ascii
//! RerankRequest.query          ─► queries[0]   {type: TEXT, textQuery.text}
//! RerankRequest.documents[i]   ─► sources[i]   {type: INLINE, inlineDocumentSource:
//!                                               {type: TEXT, textDocument.text}}
//! RerankRequest.numberOfResults ─► rerankingConfiguration
//! ModelConfiguration.modelId    ─►   .bedrockRerankingConfiguration
//!                                    {numberOfResults, modelConfiguration.modelArn}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use edgequake_rerank::{BedrockRerankClient, RerankConfig, Reranker};
//!
//! let client = Arc::new(BedrockRerankClient::from_env().await?);
//! let reranker = Reranker::new(client, RerankConfig::default())?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagentruntime::config::interceptors::AfterDeserializationInterceptorContextRef;
use aws_sdk_bedrockagentruntime::config::{ConfigBag, Intercept, RuntimeComponents};
use aws_sdk_bedrockagentruntime::error::{BoxError, BuildError, DisplayErrorContext, SdkError};
use aws_sdk_bedrockagentruntime::operation::rerank::RerankError as SdkRerankError;
use aws_sdk_bedrockagentruntime::types::{
    BedrockRerankingConfiguration, BedrockRerankingModelConfiguration, RerankDocument,
    RerankDocumentType, RerankQuery, RerankQueryContentType, RerankSource, RerankSourceType,
    RerankTextDocument, RerankingConfiguration, RerankingConfigurationType,
};
use aws_sdk_bedrockagentruntime::Client;
use aws_smithy_types::Document;
use tracing::{debug, instrument};

use crate::error::{RerankError, Result};
use crate::reranker::{RerankRequest, RerankResponse, RerankResult};
use crate::traits::RerankClient;

/// Default AWS region for Bedrock
const DEFAULT_REGION: &str = "us-east-1";

/// Rerank client for the Bedrock Agent Runtime `Rerank` API.
#[derive(Debug, Clone)]
pub struct BedrockRerankClient {
    client: Client,
    region: String,
}

impl BedrockRerankClient {
    /// Create a client from an existing AWS SDK config.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        Self {
            client: Client::new(sdk_config),
            region,
        }
    }

    /// Wrap a pre-built SDK client.
    ///
    /// `region` is used to derive foundation-model ARNs.
    pub fn from_client(client: Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// Create a client from environment variables (async).
    ///
    /// Uses the standard AWS credential chain and reads
    /// `AWS_REGION` / `AWS_DEFAULT_REGION` for the region.
    pub async fn from_env() -> Result<Self> {
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|_| DEFAULT_REGION.to_string());

        let sdk_config = aws_config::from_env()
            .region(aws_config::Region::new(region.clone()))
            .load()
            .await;

        Ok(Self {
            client: Client::new(&sdk_config),
            region,
        })
    }

    /// Region requests are sent to.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Foundation-model ARN for `model_id` in `region`.
    ///
    /// Model ids that already are ARNs are returned unchanged.
    pub fn model_arn(region: &str, model_id: &str) -> String {
        if model_id.starts_with("arn:") {
            model_id.to_string()
        } else {
            format!("arn:aws:bedrock:{}::foundation-model/{}", region, model_id)
        }
    }

    /// Convert a `serde_json::Value` to an `aws_smithy_types::Document`.
    ///
    /// Smithy `Document` does not implement serde traits.
    fn json_to_document(value: &serde_json::Value) -> Document {
        match value {
            serde_json::Value::Null => Document::Null,
            serde_json::Value::Bool(b) => Document::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Document::Number(aws_smithy_types::Number::PosInt(u))
                } else if let Some(i) = n.as_i64() {
                    Document::Number(aws_smithy_types::Number::NegInt(i))
                } else if let Some(f) = n.as_f64() {
                    Document::Number(aws_smithy_types::Number::Float(f))
                } else {
                    Document::Null
                }
            }
            serde_json::Value::String(s) => Document::String(s.clone()),
            serde_json::Value::Array(arr) => {
                Document::Array(arr.iter().map(Self::json_to_document).collect())
            }
            serde_json::Value::Object(obj) => Document::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Self::json_to_document(v)))
                    .collect(),
            ),
        }
    }

    /// Request shapes the SDK refuses to build never succeed on retry.
    fn build_error(what: &str, err: BuildError) -> RerankError {
        RerankError::InvalidRequest(format!("Failed to build {what}: {err}"))
    }

    fn build_query(query: &str) -> Result<RerankQuery> {
        RerankQuery::builder()
            .r#type(RerankQueryContentType::Text)
            .text_query(RerankTextDocument::builder().text(query).build())
            .build()
            .map_err(|e| Self::build_error("rerank query", e))
    }

    fn build_source(text: &str) -> Result<RerankSource> {
        let document = RerankDocument::builder()
            .r#type(RerankDocumentType::Text)
            .text_document(RerankTextDocument::builder().text(text).build())
            .build()
            .map_err(|e| Self::build_error("rerank document", e))?;

        RerankSource::builder()
            .r#type(RerankSourceType::Inline)
            .inline_document_source(document)
            .build()
            .map_err(|e| Self::build_error("rerank source", e))
    }

    fn build_reranking_configuration(
        &self,
        request: &RerankRequest,
    ) -> Result<RerankingConfiguration> {
        let number_of_results = i32::try_from(request.number_of_results).map_err(|_| {
            RerankError::InvalidRequest(format!(
                "numberOfResults {} exceeds i32",
                request.number_of_results
            ))
        })?;

        let additional_fields = request
            .model_configuration
            .additional_model_request_fields
            .as_ref()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::json_to_document(v)))
                    .collect::<HashMap<String, Document>>()
            });

        let model_configuration = BedrockRerankingModelConfiguration::builder()
            .model_arn(Self::model_arn(
                &self.region,
                &request.model_configuration.model_id,
            ))
            .set_additional_model_request_fields(additional_fields)
            .build()
            .map_err(|e| Self::build_error("model configuration", e))?;

        let bedrock_configuration = BedrockRerankingConfiguration::builder()
            .number_of_results(number_of_results)
            .model_configuration(model_configuration)
            .build();

        RerankingConfiguration::builder()
            .r#type(RerankingConfigurationType::BedrockRerankingModel)
            .bedrock_reranking_configuration(bedrock_configuration)
            .build()
            .map_err(|e| Self::build_error("reranking configuration", e))
    }

    /// Convert one SDK result, rejecting negative indices.
    fn convert_result(index: i32, relevance_score: f32) -> Result<RerankResult> {
        let index = usize::try_from(index).map_err(|_| {
            RerankError::MalformedResponse(format!("Negative rerank index {}", index))
        })?;
        Ok(RerankResult::new(index, f64::from(relevance_score)))
    }

    /// Classify a Bedrock SDK failure.
    fn map_sdk_error<R: std::fmt::Debug>(err: SdkError<SdkRerankError, R>) -> RerankError {
        let message = format!("Bedrock Rerank API error: {}", DisplayErrorContext(&err));
        match &err {
            SdkError::ServiceError(service) => {
                let e = service.err();
                if e.is_throttling_exception() {
                    RerankError::RateLimited(message)
                } else if e.is_access_denied_exception() {
                    RerankError::AuthError(message)
                } else if e.is_validation_exception() {
                    RerankError::InvalidRequest(message)
                } else if e.is_resource_not_found_exception() {
                    RerankError::ModelNotFound(message)
                } else {
                    RerankError::ProviderError(message)
                }
            }
            SdkError::TimeoutError(_) => RerankError::Timeout,
            SdkError::DispatchFailure(_) => RerankError::NetworkError(message),
            SdkError::ResponseError(_) => RerankError::MalformedResponse(message),
            _ => RerankError::ProviderError(message),
        }
    }
}

/// Validates a successful Rerank response body against [`RerankResponse::from_json`].
///
/// The SDK deserializer defaults missing required members to zero, so a
/// result without `index` or `relevanceScore` would read as index 0 / score 0.
/// The body is only buffered once deserialization has run, hence the
/// after-deserialization hook. A failure surfaces as `SdkError::ResponseError`.
#[derive(Debug)]
struct ValidateRerankBody;

impl ValidateRerankBody {
    fn check(body: &[u8]) -> Result<()> {
        let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            RerankError::MalformedResponse(format!("Rerank response is not JSON: {e}"))
        })?;
        RerankResponse::from_json(&value).map(|_| ())
    }
}

impl Intercept for ValidateRerankBody {
    fn name(&self) -> &'static str {
        "ValidateRerankBody"
    }

    fn read_after_deserialization(
        &self,
        context: &AfterDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> std::result::Result<(), BoxError> {
        let response = context.response();
        if !response.status().is_success() {
            return Ok(());
        }
        match response.body().bytes() {
            Some(body) => Self::check(body).map_err(Into::into),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RerankClient for BedrockRerankClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    #[instrument(skip(self, request), fields(provider = "bedrock", model = %request.model_configuration.model_id))]
    async fn rerank(&self, request: &RerankRequest) -> Result<RerankResponse> {
        let mut call = self
            .client
            .rerank()
            .queries(Self::build_query(&request.query)?)
            .reranking_configuration(self.build_reranking_configuration(request)?);

        for document in &request.documents {
            call = call.sources(Self::build_source(document)?);
        }

        debug!(
            "Sending Bedrock Rerank request: {} sources, numberOfResults: {}",
            request.documents.len(),
            request.number_of_results
        );

        let output = call
            .customize()
            .interceptor(ValidateRerankBody)
            .send()
            .await
            .map_err(Self::map_sdk_error)?;

        let results = output
            .results()
            .iter()
            .map(|r| Self::convert_result(r.index(), r.relevance_score()))
            .collect::<Result<Vec<_>>>()?;

        Ok(RerankResponse::new(results))
    }
}
