//! Entity classifier — partitions NER annotations into the four RFP fields
//!
//! One NER call per document. Each annotation lands in at most one bucket,
//! decided by a fixed first-match rule:
//!
//! | rule                                   | bucket              |
//! |----------------------------------------|---------------------|
//! | label `ORG` or `PRODUCT`               | Goals               |
//! | label `DATE`                           | Timeline            |
//! | label `MONEY` or `PERCENT`             | Deliverables        |
//! | text contains "evaluation" (any case)  | Evaluation Criteria |
//! | anything else                          | discarded           |
//!
//! Buckets keep annotation order and keep duplicates.

use crate::annotation::Annotation;
use crate::backend::{with_deadline, CollaboratorError, NerBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const GOAL_LABELS: &[&str] = &["ORG", "PRODUCT"];
const TIMELINE_LABELS: &[&str] = &["DATE"];
const DELIVERABLE_LABELS: &[&str] = &["MONEY", "PERCENT"];
const EVALUATION_MARKER: &str = "evaluation";

/// Separator between entries of a non-empty field.
pub const FIELD_SEPARATOR: &str = " | ";

/// One of the four output fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Goals,
    Deliverables,
    Timeline,
    EvaluationCriteria,
}

impl Bucket {
    /// All buckets, in output order.
    pub const ALL: [Bucket; 4] = [
        Bucket::Goals,
        Bucket::Deliverables,
        Bucket::Timeline,
        Bucket::EvaluationCriteria,
    ];

    /// The record key for this bucket.
    pub fn key(self) -> &'static str {
        match self {
            Self::Goals => "Goals",
            Self::Deliverables => "Deliverables",
            Self::Timeline => "Timeline",
            Self::EvaluationCriteria => "Evaluation Criteria",
        }
    }

    /// Text used when no annotation landed in this bucket.
    pub fn empty_placeholder(self) -> &'static str {
        match self {
            Self::Goals => "No specific goals detected.",
            Self::Deliverables => "No specific deliverables detected.",
            Self::Timeline => "No timeline detected.",
            Self::EvaluationCriteria => "No evaluation criteria detected.",
        }
    }

    /// Text used when the NER call failed.
    pub fn error_placeholder(self) -> &'static str {
        match self {
            Self::Goals => "Error extracting Goals.",
            Self::Deliverables => "Error extracting Deliverables.",
            Self::Timeline => "Error extracting Timeline.",
            Self::EvaluationCriteria => "Error extracting Evaluation Criteria.",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Goals => 0,
            Self::Deliverables => 1,
            Self::Timeline => 2,
            Self::EvaluationCriteria => 3,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Assign an annotation to its bucket, or `None` to discard it.
///
/// Label rules are checked before the text rule, so an `ORG` whose text
/// mentions "evaluation" is still a goal.
pub fn bucket_for(annotation: &Annotation) -> Option<Bucket> {
    if annotation.has_label(GOAL_LABELS) {
        Some(Bucket::Goals)
    } else if annotation.has_label(TIMELINE_LABELS) {
        Some(Bucket::Timeline)
    } else if annotation.has_label(DELIVERABLE_LABELS) {
        Some(Bucket::Deliverables)
    } else if annotation.text.to_lowercase().contains(EVALUATION_MARKER) {
        Some(Bucket::EvaluationCriteria)
    } else {
        None
    }
}

/// Annotation texts grouped by bucket, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    entries: [Vec<String>; 4],
}

impl Buckets {
    /// Partition `annotations`, discarding those that match no rule.
    pub fn partition(annotations: &[Annotation]) -> Self {
        let mut buckets = Self::default();
        for annotation in annotations {
            if let Some(bucket) = bucket_for(annotation) {
                buckets.entries[bucket.index()].push(annotation.text.clone());
            }
        }
        buckets
    }

    pub fn entries(&self, bucket: Bucket) -> &[String] {
        &self.entries[bucket.index()]
    }

    /// True when every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Vec::is_empty)
    }

    /// Join each bucket, substituting the empty placeholder where needed.
    pub fn to_result(&self) -> ExtractionResult {
        let field = |bucket: Bucket| {
            let entries = self.entries(bucket);
            if entries.is_empty() {
                bucket.empty_placeholder().to_string()
            } else {
                entries.join(FIELD_SEPARATOR)
            }
        };
        ExtractionResult {
            goals: field(Bucket::Goals),
            deliverables: field(Bucket::Deliverables),
            timeline: field(Bucket::Timeline),
            evaluation_criteria: field(Bucket::EvaluationCriteria),
            classified: Some(self.clone()),
        }
    }
}

/// The four-field record. All four fields are always populated.
///
/// Equality compares the four fields only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "Goals")]
    pub goals: String,
    #[serde(rename = "Deliverables")]
    pub deliverables: String,
    #[serde(rename = "Timeline")]
    pub timeline: String,
    #[serde(rename = "Evaluation Criteria")]
    pub evaluation_criteria: String,
    /// Per-entity texts behind the joined fields, kept when the record was
    /// built by classification. Entity text may itself contain the separator.
    #[serde(skip)]
    pub(crate) classified: Option<Buckets>,
}

impl PartialEq for ExtractionResult {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for ExtractionResult {}

impl ExtractionResult {
    fn filled(text: impl Fn(Bucket) -> &'static str) -> Self {
        Self {
            goals: text(Bucket::Goals).to_string(),
            deliverables: text(Bucket::Deliverables).to_string(),
            timeline: text(Bucket::Timeline).to_string(),
            evaluation_criteria: text(Bucket::EvaluationCriteria).to_string(),
            classified: None,
        }
    }

    /// Every field set to its empty placeholder.
    pub fn placeholders() -> Self {
        Self::filled(Bucket::empty_placeholder)
    }

    /// Every field set to its error placeholder.
    pub fn errors() -> Self {
        Self::filled(Bucket::error_placeholder)
    }

    pub fn get(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Goals => &self.goals,
            Bucket::Deliverables => &self.deliverables,
            Bucket::Timeline => &self.timeline,
            Bucket::EvaluationCriteria => &self.evaluation_criteria,
        }
    }

    /// The individual entries of `bucket`'s field.
    ///
    /// Classified records yield one entry per entity, even when an entity's
    /// text contains `FIELD_SEPARATOR`. Records built any other way (or
    /// whose field was edited since) are split on the separator.
    pub fn entries(&self, bucket: Bucket) -> Vec<&str> {
        let field = self.get(bucket);
        match &self.classified {
            Some(buckets) => {
                let entries = buckets.entries(bucket);
                if entries.is_empty() && field == bucket.empty_placeholder() {
                    return vec![field];
                }
                if !entries.is_empty() && entries.join(FIELD_SEPARATOR) == field {
                    return entries.iter().map(String::as_str).collect();
                }
                field.split(FIELD_SEPARATOR).collect()
            }
            None => field.split(FIELD_SEPARATOR).collect(),
        }
    }

    /// `(key, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b.key(), self.get(b)))
    }
}

/// What a classification call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// At least one annotation landed in a bucket
    Extracted(ExtractionResult),
    /// The backend answered, but nothing matched any bucket
    NoEntities,
    /// The backend call failed or timed out
    Failed(CollaboratorError),
}

impl ExtractionOutcome {
    /// Collapse into the four-field record, using placeholders for the
    /// degenerate and failure cases.
    pub fn into_result(self) -> ExtractionResult {
        match self {
            Self::Extracted(result) => result,
            Self::NoEntities => ExtractionResult::placeholders(),
            Self::Failed(_) => ExtractionResult::errors(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Short status word for reports.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Extracted(_) => "extracted",
            Self::NoEntities => "no-entities",
            Self::Failed(_) => "failed",
        }
    }
}

/// Classifies a document's entities into the four RFP fields.
pub struct EntityClassifier {
    backend: Arc<dyn NerBackend>,
    timeout: Option<Duration>,
}

impl EntityClassifier {
    pub fn new(backend: Arc<dyn NerBackend>) -> Self {
        Self {
            backend,
            timeout: None,
        }
    }

    /// Bound each NER call. Elapsed calls fail with `CollaboratorError::Timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run NER once over `text` and bucket the result. Never retries.
    pub async fn classify(&self, text: &str) -> ExtractionOutcome {
        let annotations = match with_deadline(self.timeout, self.backend.annotate(text)).await {
            Ok(annotations) => annotations,
            Err(e) => {
                warn!(backend = self.backend.id(), error = %e, "entity extraction failed");
                return ExtractionOutcome::Failed(e);
            }
        };

        let buckets = Buckets::partition(&annotations);
        debug!(
            backend = self.backend.id(),
            annotations = annotations.len(),
            goals = buckets.entries(Bucket::Goals).len(),
            deliverables = buckets.entries(Bucket::Deliverables).len(),
            timeline = buckets.entries(Bucket::Timeline).len(),
            criteria = buckets.entries(Bucket::EvaluationCriteria).len(),
            "classified annotations"
        );

        if buckets.is_empty() {
            ExtractionOutcome::NoEntities
        } else {
            ExtractionOutcome::Extracted(buckets.to_result())
        }
    }

    /// `classify` collapsed to the placeholder-compatible record.
    pub async fn classify_fields(&self, text: &str) -> ExtractionResult {
        self.classify(text).await.into_result()
    }
}
