//! rfpdeck: RFP field extraction, summarization, and slide-deck rendering
//!
//! Turns a request-for-proposal document into four labeled fields (Goals,
//! Deliverables, Timeline, Evaluation Criteria), a condensed summary, and a
//! slide deck built from the fields.
//!
//! # Core Concepts
//!
//! - **Entity classifier**: buckets named-entity annotations into the four fields
//! - **Summarizer gate**: passes short text through, summarizes the rest
//! - **Backends**: NER and summarization engines behind async traits,
//!   constructed once and injected
//!
//! # Example
//!
//! ```
//! use rfpdeck::{Annotation, EntityClassifier, MockNer};
//! use std::sync::Arc;
//!
//! # tokio_test_block(async {
//! let ner = MockNer::with_annotations(vec![Annotation::new("Acme Corp", "ORG")]);
//! let classifier = EntityClassifier::new(Arc::new(ner));
//! let fields = classifier.classify_fields("Acme Corp seeks bids.").await;
//! assert_eq!(fields.goals, "Acme Corp");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

mod annotation;
pub mod backend;
pub mod classify;
pub mod config;
pub mod document;
pub mod pipeline;
pub mod render;
pub mod summarize;

pub use annotation::Annotation;
pub use backend::{
    CollaboratorError, HttpInferenceBackend, InferenceConfig, MockNer, MockSummarizer, NerBackend,
    SummarizationBackend, SummaryRequest,
};
pub use classify::{Bucket, EntityClassifier, ExtractionOutcome, ExtractionResult};
pub use config::{Config, ConfigError};
pub use document::{DocumentError, DocumentKind, DocumentLoader, TextExtractor};
pub use pipeline::{RfpPipeline, RfpReport};
pub use render::{DeckFormat, DeckRenderer, RenderError};
pub use summarize::{SummarizerGate, SummaryBounds, SummaryOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
