//! Rerank client implementations.

pub mod http;
pub use http::{HttpRerankClient, HttpRerankConfig};

pub mod mock;
pub use mock::MockRerankClient;

// AWS Bedrock Agent Runtime (feature-gated)
#[cfg(feature = "bedrock")]
pub mod bedrock;
#[cfg(feature = "bedrock")]
pub use bedrock::BedrockRerankClient;
