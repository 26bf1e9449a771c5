//! Shared fixtures for integration tests
//!
//! A small RFP corpus plus the annotations a token-classification model
//! would plausibly return for it.

#![allow(dead_code)]

use rfpdeck::Annotation;
use std::io::Write;
use std::path::PathBuf;

/// A realistic RFP body, comfortably above the 50-token summarization gate.
pub const SAMPLE_RFP: &str = "\
REQUEST FOR PROPOSALS: Municipal Records Digitization

The City of Northfield, in partnership with Acme Corp, invites qualified vendors \
to submit proposals for digitizing and indexing approximately 400,000 pages of \
historical municipal records. Proposals are due by 2025-03-14, and the selected \
vendor must complete the work by December 31, 2025. The total budget shall not \
exceed $250,000, with a 10% holdback released upon final acceptance. Submissions \
will be scored by an independent evaluation panel on technical approach, cost, \
and prior experience with public-sector archives.";

/// A short note, below the summarization gate.
pub const SHORT_NOTE: &str = "Addendum 1: the pre-bid meeting moves to Room 204.";

/// An annotation for the first occurrence of `text` in `SAMPLE_RFP`, with
/// character offsets as a token-classification model reports them.
pub fn spanned(text: &str, label: &str) -> Annotation {
    let byte_start = SAMPLE_RFP.find(text).expect("fixture text occurs in SAMPLE_RFP");
    let start = SAMPLE_RFP[..byte_start].chars().count();
    Annotation::new(text, label).with_span(start, start + text.chars().count())
}

/// Annotations for `SAMPLE_RFP`, in document order.
pub fn sample_annotations() -> Vec<Annotation> {
    vec![
        spanned("City of Northfield", "ORG").with_score(0.98),
        spanned("Acme Corp", "ORG").with_score(0.99),
        spanned("2025-03-14", "DATE"),
        spanned("December 31, 2025", "DATE"),
        spanned("$250,000", "MONEY"),
        spanned("10%", "PERCENT"),
        spanned("independent evaluation panel", "MISC"),
        Annotation::new("Northfield", "LOC"),
    ]
}

/// Write `content` to `name` inside a fresh temp dir.
pub fn write_document(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create document");
    file.write_all(content.as_bytes()).expect("write document");
    (dir, path)
}
