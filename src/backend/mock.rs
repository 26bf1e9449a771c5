//! Mock backends for testing — return preconfigured responses.

use super::{CollaboratorError, NerBackend, SummarizationBackend, SummaryRequest};
use crate::annotation::Annotation;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock NER backend.
pub struct MockNer {
    response: Result<Vec<Annotation>, CollaboratorError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockNer {
    /// A backend that returns `annotations` on every call.
    pub fn with_annotations(annotations: Vec<Annotation>) -> Self {
        Self {
            response: Ok(annotations),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A backend that returns no annotations.
    pub fn empty() -> Self {
        Self::with_annotations(Vec::new())
    }

    /// A backend that fails every call with `error`.
    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `annotate` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NerBackend for MockNer {
    fn id(&self) -> &str {
        "mock-ner"
    }

    async fn annotate(&self, _text: &str) -> Result<Vec<Annotation>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// Mock summarization backend.
///
/// Records the last request so tests can assert on the bounds and
/// decoding mode the gate passed through.
pub struct MockSummarizer {
    response: Result<String, CollaboratorError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<SummaryRequest>>,
}

impl MockSummarizer {
    /// A backend that returns `summary` on every call.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            response: Ok(summary.into()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A backend that fails every call with `error`.
    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `summarize` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The request passed on the most recent call.
    pub fn last_request(&self) -> Option<SummaryRequest> {
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SummarizationBackend for MockSummarizer {
    fn id(&self) -> &str {
        "mock-summarizer"
    }

    async fn summarize(
        &self,
        _text: &str,
        request: &SummaryRequest,
    ) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap_or_else(|e| e.into_inner()) = Some(*request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}
