//! Named-entity annotations produced by an NER backend
//!
//! Annotations arrive in document order. Field names accept both the
//! canonical form (`text`, `label`) and the token-classification wire form
//! (`word`, `entity_group`), so backend responses deserialize directly.

use serde::{Deserialize, Serialize};

/// A (text, label) pair recognized in a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Surface string as it appears in the document
    #[serde(alias = "word")]
    pub text: String,
    /// Category tag (`ORG`, `DATE`, `MONEY`, ...). Open-ended.
    #[serde(alias = "entity_group", alias = "entity")]
    pub label: String,
    /// Backend confidence, when reported. Never used for classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Character offset of the match start in the source text, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    /// Character offset of the match end (exclusive), when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Annotation {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            score: None,
            start: None,
            end: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Whether the label is one of `labels` (exact, case-sensitive).
    pub fn has_label(&self, labels: &[&str]) -> bool {
        labels.contains(&self.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_token_classification_wire_names() {
        let json = r#"{"entity_group":"ORG","word":"Acme Corp","score":0.998,"start":0,"end":9}"#;
        let annotation: Annotation = serde_json::from_str(json).unwrap();

        assert_eq!(annotation.text, "Acme Corp");
        assert_eq!(annotation.label, "ORG");
        assert_eq!(annotation.score, Some(0.998));
        assert_eq!(annotation.start, Some(0));
        assert_eq!(annotation.end, Some(9));
    }

    #[test]
    fn deserializes_canonical_names_without_optional_fields() {
        let annotation: Annotation =
            serde_json::from_str(r#"{"text":"2024-01-01","label":"DATE"}"#).unwrap();
        assert_eq!(annotation, Annotation::new("2024-01-01", "DATE"));
    }

    #[test]
    fn has_label_is_case_sensitive() {
        let annotation = Annotation::new("Acme", "ORG");
        assert!(annotation.has_label(&["ORG", "PRODUCT"]));
        assert!(!annotation.has_label(&["org"]));
    }

    #[test]
    fn serializes_without_absent_optionals() {
        let json = serde_json::to_string(&Annotation::new("$10M", "MONEY")).unwrap();
        assert_eq!(json, r#"{"text":"$10M","label":"MONEY"}"#);
    }
}
