//! Summarizer gate — length-gated abstractive summarization
//!
//! Short inputs (fewer than `min_tokens` whitespace-delimited tokens) are
//! returned byte-for-byte without touching the backend. Longer inputs get
//! one deterministic summarization call bounded by `SummaryBounds`.

use crate::backend::{with_deadline, CollaboratorError, SummarizationBackend, SummaryRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Inputs shorter than this many tokens pass through unchanged.
pub const DEFAULT_MIN_TOKENS: usize = 50;

/// Returned in place of a summary when the backend fails.
pub const SUMMARY_ERROR_PLACEHOLDER: &str = "Error generating summary.";

/// Summary length bounds, in model tokens. Not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
    pub max_length: usize,
    pub min_length: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            max_length: 130,
            min_length: 30,
        }
    }
}

/// What a summarization call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    /// Input was below the length gate and is returned as-is
    Passthrough(String),
    /// Backend-produced summary
    Summarized(String),
    /// The backend call failed or timed out
    Failed(CollaboratorError),
}

impl SummaryOutcome {
    /// Collapse into plain text; failures become `SUMMARY_ERROR_PLACEHOLDER`.
    pub fn into_text(self) -> String {
        match self {
            Self::Passthrough(text) | Self::Summarized(text) => text,
            Self::Failed(_) => SUMMARY_ERROR_PLACEHOLDER.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Short status word for reports.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Passthrough(_) => "passthrough",
            Self::Summarized(_) => "summarized",
            Self::Failed(_) => "failed",
        }
    }
}

/// Number of whitespace-delimited tokens in `text`.
///
/// Separators are Unicode whitespace plus the ASCII information separators
/// U+001C..=U+001F (file, group, record and unit separator).
pub fn token_count(text: &str) -> usize {
    text.split(is_token_separator).filter(|t| !t.is_empty()).count()
}

fn is_token_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Decides whether to summarize, and does so.
pub struct SummarizerGate {
    backend: Arc<dyn SummarizationBackend>,
    min_tokens: usize,
    timeout: Option<Duration>,
}

impl SummarizerGate {
    pub fn new(backend: Arc<dyn SummarizationBackend>) -> Self {
        Self {
            backend,
            min_tokens: DEFAULT_MIN_TOKENS,
            timeout: None,
        }
    }

    /// Change the passthrough threshold.
    pub fn with_min_tokens(mut self, min_tokens: usize) -> Self {
        self.min_tokens = min_tokens;
        self
    }

    /// Bound each summarization call. Elapsed calls fail with `CollaboratorError::Timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn min_tokens(&self) -> usize {
        self.min_tokens
    }

    /// Summarize `text` within `bounds`, or pass it through if it is short.
    pub async fn summarize(&self, text: &str, bounds: SummaryBounds) -> SummaryOutcome {
        let tokens = token_count(text);
        if tokens < self.min_tokens {
            debug!(tokens, min_tokens = self.min_tokens, "below length gate, passing through");
            return SummaryOutcome::Passthrough(text.to_string());
        }

        let request = SummaryRequest {
            max_length: bounds.max_length,
            min_length: bounds.min_length,
            deterministic: true,
        };
        debug!(
            backend = self.backend.id(),
            tokens,
            max_length = request.max_length,
            min_length = request.min_length,
            "summarizing"
        );

        match with_deadline(self.timeout, self.backend.summarize(text, &request)).await {
            Ok(summary) => SummaryOutcome::Summarized(summary),
            Err(e) => {
                warn!(backend = self.backend.id(), error = %e, "summarization failed");
                SummaryOutcome::Failed(e)
            }
        }
    }

    /// `summarize` with default bounds, collapsed to plain text.
    pub async fn summarize_text(&self, text: &str) -> String {
        self.summarize(text, SummaryBounds::default()).await.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockSummarizer;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn token_count_splits_on_any_whitespace() {
        assert_eq!(token_count(""), 0);
        assert_eq!(token_count("   \n\t "), 0);
        assert_eq!(token_count("one  two\nthree\tfour"), 4);
    }

    #[test]
    fn information_separators_split_tokens() {
        assert_eq!(token_count("a\u{1c}b\u{1d}c\u{1e}d\u{1f}e"), 5);
        assert_eq!(token_count("\u{1f}\u{1c}"), 0);
        assert_eq!(token_count("line\u{85}next\u{2028}para"), 3);
    }

    #[tokio::test]
    async fn short_text_passes_through_untouched() {
        let backend = Arc::new(MockSummarizer::with_summary("unused"));
        let gate = SummarizerGate::new(backend.clone());
        let text = format!("  {}  \n", words(49));

        let outcome = gate.summarize(&text, SummaryBounds::default()).await;
        assert_eq!(outcome, SummaryOutcome::Passthrough(text.clone()));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn empty_text_passes_through() {
        let gate = SummarizerGate::new(Arc::new(MockSummarizer::with_summary("unused")));
        assert_eq!(gate.summarize_text("").await, "");
    }

    #[tokio::test]
    async fn threshold_text_is_summarized_deterministically() {
        let backend = Arc::new(MockSummarizer::with_summary("A concise summary."));
        let gate = SummarizerGate::new(backend.clone());

        let outcome = gate.summarize(&words(50), SummaryBounds::default()).await;
        assert_eq!(
            outcome,
            SummaryOutcome::Summarized("A concise summary.".to_string())
        );
        assert_eq!(backend.calls(), 1);
        assert_eq!(
            backend.last_request(),
            Some(SummaryRequest {
                max_length: 130,
                min_length: 30,
                deterministic: true,
            })
        );
    }

    #[tokio::test]
    async fn custom_bounds_reach_backend() {
        let backend = Arc::new(MockSummarizer::with_summary("s"));
        let gate = SummarizerGate::new(backend.clone());
        let bounds = SummaryBounds {
            max_length: 60,
            min_length: 5,
        };

        gate.summarize(&words(80), bounds).await;
        let request = backend.last_request().unwrap();
        assert_eq!(request.max_length, 60);
        assert_eq!(request.min_length, 5);
    }

    #[tokio::test]
    async fn backend_failure_becomes_placeholder() {
        let gate = SummarizerGate::new(Arc::new(MockSummarizer::failing(
            CollaboratorError::InvocationFailed("boom".to_string()),
        )));

        let outcome = gate.summarize(&words(100), SummaryBounds::default()).await;
        assert!(outcome.is_failed());
        assert_eq!(outcome.into_text(), "Error generating summary.");
    }

    #[tokio::test]
    async fn slow_backend_times_out_to_placeholder() {
        let backend = MockSummarizer::with_summary("late").with_delay(Duration::from_millis(500));
        let gate = SummarizerGate::new(Arc::new(backend))
            .with_timeout(Some(Duration::from_millis(10)));

        match gate.summarize(&words(60), SummaryBounds::default()).await {
            SummaryOutcome::Failed(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn min_tokens_is_adjustable() {
        let backend = Arc::new(MockSummarizer::with_summary("s"));
        let gate = SummarizerGate::new(backend.clone()).with_min_tokens(3);

        assert_eq!(gate.summarize_text("a b").await, "a b");
        assert_eq!(gate.summarize_text("a b c").await, "s");
        assert_eq!(backend.calls(), 1);
    }
}
