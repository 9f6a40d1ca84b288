//! Reranking of retrieved nodes.
//!
//! This module turns a list of scored nodes and a query into a shorter,
//! reordered list using a remote rerank model.
//!
//! # Architecture
//!
//! ```ascii
//!                    ┌─────────────────────────────┐
//!                    │    Nodes + QueryBundle      │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                                   ▼
//!     ┌─────────────────────────────────────────────────────┐
//!     │                      Reranker                        │
//!     │  postprocess_nodes(nodes, query) → Vec<NodeWithScore>│
//!     └──────────────────────────┬──────────────────────────┘
//!                                │ RerankRequest
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌──────────────┐      ┌──────────────┐        ┌──────────────┐
//! │   Bedrock    │      │     HTTP     │        │     Mock     │
//! │ Agent Runtime│      │ (Jina,Cohere)│        │   (tests)    │
//! └──────────────┘      └──────────────┘        └──────────────┘
//! ```
//!
//! # Module Structure
//!
//! ```ascii
//! reranker/
//! ├── mod.rs           ─► This file (re-exports)
//! ├── config.rs        ─► RerankConfig
//! ├── result.rs        ─► RerankRequest, RerankResponse, RerankResult
//! └── postprocessor.rs ─► Reranker
//! ```
//!
//! # Enforces
//!
//! - Never request more results than nodes supplied
//! - Service order is kept; indices are mapped back, never re-sorted
//! - Empty input short-circuits without a remote call

mod config;
mod postprocessor;
mod result;

pub use config::{RerankConfig, DEFAULT_MODEL_ID, DEFAULT_TOP_N};
pub use postprocessor::Reranker;
pub use result::{ModelConfiguration, RerankRequest, RerankResponse, RerankResult};
