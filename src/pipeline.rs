//! RFP processing pipeline
//!
//! Document text → (classifier ∥ summarizer gate) → report.
//! The two stages read the same text and never each other's output, so they
//! run concurrently. Rendering is left to the caller.

use crate::backend::{CollaboratorError, HttpInferenceBackend, NerBackend, SummarizationBackend};
use crate::classify::{EntityClassifier, ExtractionOutcome, ExtractionResult};
use crate::config::Config;
use crate::document::{DocumentError, DocumentKind, DocumentLoader, PdftotextExtractor};
use crate::summarize::{SummarizerGate, SummaryBounds, SummaryOutcome};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfpReport {
    /// The four extracted fields
    pub fields: ExtractionResult,
    /// Summary, passthrough text, or the summary error placeholder
    pub summary: String,
    /// `extracted`, `no-entities`, or `failed`
    pub extraction_status: &'static str,
    /// `summarized`, `passthrough`, or `failed`
    pub summary_status: &'static str,
}

impl RfpReport {
    fn from_outcomes(extraction: ExtractionOutcome, summary: SummaryOutcome) -> Self {
        Self {
            extraction_status: extraction.status(),
            summary_status: summary.status(),
            fields: extraction.into_result(),
            summary: summary.into_text(),
        }
    }

    /// True when either backend call failed.
    pub fn has_failures(&self) -> bool {
        self.extraction_status == "failed" || self.summary_status == "failed"
    }
}

pub struct RfpPipeline {
    classifier: EntityClassifier,
    gate: SummarizerGate,
    bounds: SummaryBounds,
    loader: DocumentLoader,
}

impl RfpPipeline {
    pub fn new(classifier: EntityClassifier, gate: SummarizerGate) -> Self {
        Self {
            classifier,
            gate,
            bounds: SummaryBounds::default(),
            loader: DocumentLoader::default(),
        }
    }

    /// Wire a pipeline from already-constructed backend handles.
    pub fn from_backends(
        ner: Arc<dyn NerBackend>,
        summarizer: Arc<dyn SummarizationBackend>,
        config: &Config,
    ) -> Self {
        let timeout = config.inference.timeout();
        let classifier = EntityClassifier::new(ner).with_timeout(timeout);
        let gate = SummarizerGate::new(summarizer)
            .with_timeout(timeout)
            .with_min_tokens(config.summary.min_tokens);

        let mut pdf = PdftotextExtractor::new();
        if let Some(binary) = &config.pdftotext {
            pdf = pdf.with_binary(binary.clone());
        }
        let loader = DocumentLoader::new().with_extractor(DocumentKind::Pdf, Arc::new(pdf));

        Self::new(classifier, gate)
            .with_bounds(config.summary.bounds())
            .with_loader(loader)
    }

    /// Build the HTTP inference backend once and share it between both stages.
    pub fn from_config(config: &Config) -> Result<Self, CollaboratorError> {
        let backend = Arc::new(HttpInferenceBackend::new(config.inference.clone())?);
        Ok(Self::from_backends(backend.clone(), backend, config))
    }

    pub fn with_bounds(mut self, bounds: SummaryBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_loader(mut self, loader: DocumentLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn classifier(&self) -> &EntityClassifier {
        &self.classifier
    }

    pub fn gate(&self) -> &SummarizerGate {
        &self.gate
    }

    pub fn bounds(&self) -> SummaryBounds {
        self.bounds
    }

    pub fn loader(&self) -> &DocumentLoader {
        &self.loader
    }

    /// Classify and summarize `text`.
    pub async fn process(&self, text: &str) -> RfpReport {
        let (extraction, summary) = tokio::join!(
            self.classifier.classify(text),
            self.gate.summarize(text, self.bounds),
        );
        let report = RfpReport::from_outcomes(extraction, summary);
        info!(
            extraction = report.extraction_status,
            summary = report.summary_status,
            "processed document"
        );
        report
    }

    /// Load a document from disk and process its text.
    pub async fn process_document(&self, path: &Path) -> Result<RfpReport, DocumentError> {
        let text = self.loader.load(path).await?;
        Ok(self.process(&text).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotation;
    use crate::backend::{MockNer, MockSummarizer};
    use std::time::Duration;

    fn pipeline(ner: MockNer, summarizer: MockSummarizer) -> RfpPipeline {
        RfpPipeline::from_backends(Arc::new(ner), Arc::new(summarizer), &Config::default())
    }

    fn long_text() -> String {
        "The county invites proposals for a records system. ".repeat(10)
    }

    #[tokio::test]
    async fn report_combines_both_stages() {
        let p = pipeline(
            MockNer::with_annotations(vec![Annotation::new("Hennepin County", "ORG")]),
            MockSummarizer::with_summary("County wants a records system."),
        );

        let report = p.process(&long_text()).await;
        assert_eq!(report.fields.goals, "Hennepin County");
        assert_eq!(report.summary, "County wants a records system.");
        assert_eq!(report.extraction_status, "extracted");
        assert_eq!(report.summary_status, "summarized");
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn one_failing_stage_does_not_affect_the_other() {
        let p = pipeline(
            MockNer::failing(CollaboratorError::Unavailable("down".to_string())),
            MockSummarizer::with_summary("ok"),
        );

        let report = p.process(&long_text()).await;
        assert_eq!(report.fields, ExtractionResult::errors());
        assert_eq!(report.summary, "ok");
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn stages_run_concurrently() {
        let delay = Duration::from_millis(300);
        let p = pipeline(
            MockNer::empty().with_delay(delay),
            MockSummarizer::with_summary("s").with_delay(delay),
        );

        let started = std::time::Instant::now();
        p.process(&long_text()).await;
        assert!(started.elapsed() < delay * 2, "stages should overlap");
    }

    #[tokio::test]
    async fn config_bounds_and_gate_reach_stages() {
        let summarizer = Arc::new(MockSummarizer::with_summary("s"));
        let mut config = Config::default();
        config.summary.max_length = 40;
        config.summary.min_length = 10;
        config.summary.min_tokens = 5;

        let p = RfpPipeline::from_backends(Arc::new(MockNer::empty()), summarizer.clone(), &config);
        let report = p.process("one two three four five").await;

        assert_eq!(report.summary_status, "summarized");
        let request = summarizer.last_request().unwrap();
        assert_eq!((request.max_length, request.min_length), (40, 10));
    }

    #[tokio::test]
    async fn report_serializes_fields_with_fixed_keys() {
        let p = pipeline(MockNer::empty(), MockSummarizer::with_summary("unused"));
        let report = p.process("short text").await;

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["fields"]["Timeline"], "No timeline detected.");
        assert_eq!(value["summary"], "short text");
        assert_eq!(value["extraction_status"], "no-entities");
        assert_eq!(value["summary_status"], "passthrough");
    }
}
