//! Inference collaborators — the NER and summarization engines
//!
//! Defines the backend traits and the shared error type. Implementations:
//! - `HttpInferenceBackend`: Hugging Face Inference API compatible server (production)
//! - `MockNer` / `MockSummarizer`: preconfigured responses (testing, substitute wiring)
//!
//! Backends are expensive to construct. Build them once at startup and
//! hand them to the classifier and gate as `Arc<dyn …>`.

mod http;
mod mock;

pub use http::{HttpInferenceBackend, InferenceConfig};
pub use mock::{MockNer, MockSummarizer};

use crate::annotation::Annotation;
use async_trait::async_trait;
use std::time::Duration;

/// Errors from collaborator invocations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("backend not available: {0}")]
    Unavailable(String),
    #[error("invocation failed: {0}")]
    InvocationFailed(String),
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),
}

impl CollaboratorError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Parameters for one summarization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Upper bound on summary length, in model tokens
    pub max_length: usize,
    /// Lower bound on summary length, in model tokens
    pub min_length: usize,
    /// Greedy decoding (no sampling)
    pub deterministic: bool,
}

/// Named-entity recognition capability.
#[async_trait]
pub trait NerBackend: Send + Sync {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Tag `text`, returning annotations in document order.
    async fn annotate(&self, text: &str) -> Result<Vec<Annotation>, CollaboratorError>;
}

/// Abstractive summarization capability.
#[async_trait]
pub trait SummarizationBackend: Send + Sync {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Produce a single summary of `text` within the request bounds.
    async fn summarize(
        &self,
        text: &str,
        request: &SummaryRequest,
    ) -> Result<String, CollaboratorError>;
}

/// Await a collaborator call, converting an elapsed deadline into
/// `CollaboratorError::Timeout`. `None` waits indefinitely.
pub(crate) async fn with_deadline<T, F>(
    deadline: Option<Duration>,
    call: F,
) -> Result<T, CollaboratorError>
where
    F: std::future::Future<Output = Result<T, CollaboratorError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| CollaboratorError::Timeout(limit))?,
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_passes_through_fast_results() {
        let result = with_deadline(Some(Duration::from_secs(5)), async { Ok::<_, CollaboratorError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn deadline_elapsed_becomes_timeout() {
        let limit = Duration::from_millis(10);
        let result: Result<(), _> = with_deadline(Some(limit), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err, CollaboratorError::Timeout(limit));
    }

    #[tokio::test]
    async fn no_deadline_propagates_errors_unchanged() {
        let result: Result<(), _> = with_deadline(None, async {
            Err(CollaboratorError::InvocationFailed("boom".to_string()))
        })
        .await;
        assert_eq!(
            result,
            Err(CollaboratorError::InvocationFailed("boom".to_string()))
        );
    }
}
