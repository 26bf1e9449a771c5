//! Slide-deck rendering
//!
//! The extracted fields become a deck: one title slide, then one slide per
//! field in record order. Multi-entry fields become one bullet per entity.
//! Binary presentation formats are out of scope; renderers here emit text
//! formats that downstream tools (Marp, reveal.js, pandoc) turn into slides.

use crate::classify::{Bucket, ExtractionResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Title of the opening slide.
pub const DECK_TITLE: &str = "RFP Response";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slide {
    pub title: String,
    pub body: Vec<String>,
}

/// Renderer-independent deck layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck {
    pub title: String,
    pub slides: Vec<Slide>,
}

impl Deck {
    pub fn from_fields(fields: &ExtractionResult) -> Self {
        let slides = Bucket::ALL
            .into_iter()
            .map(|bucket| Slide {
                title: bucket.key().to_string(),
                body: fields.entries(bucket).into_iter().map(str::to_string).collect(),
            })
            .collect();
        Self {
            title: DECK_TITLE.to_string(),
            slides,
        }
    }
}

/// Turns an extraction record into a presentation artifact.
pub trait DeckRenderer: Send + Sync {
    fn id(&self) -> &str;

    /// Extension for files holding this renderer's output, without the dot.
    fn file_extension(&self) -> &str;

    fn render(&self, fields: &ExtractionResult) -> Result<Vec<u8>, RenderError>;
}

/// Marp-compatible Markdown slides separated by `---`.
pub struct MarkdownDeckRenderer;

impl DeckRenderer for MarkdownDeckRenderer {
    fn id(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }

    fn render(&self, fields: &ExtractionResult) -> Result<Vec<u8>, RenderError> {
        let deck = Deck::from_fields(fields);
        let mut out = format!("---\nmarp: true\n---\n\n# {}\n", deck.title);
        for slide in &deck.slides {
            out.push_str("\n---\n\n");
            out.push_str(&format!("## {}\n\n", slide.title));
            match slide.body.as_slice() {
                [single] => {
                    out.push_str(single);
                    out.push('\n');
                }
                entries => {
                    for entry in entries {
                        out.push_str(&format!("- {}\n", entry));
                    }
                }
            }
        }
        Ok(out.into_bytes())
    }
}

/// Pretty-printed JSON deck.
pub struct JsonDeckRenderer;

impl DeckRenderer for JsonDeckRenderer {
    fn id(&self) -> &str {
        "json"
    }

    fn file_extension(&self) -> &str {
        "json"
    }

    fn render(&self, fields: &ExtractionResult) -> Result<Vec<u8>, RenderError> {
        let mut bytes = serde_json::to_vec_pretty(&Deck::from_fields(fields))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Built-in output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeckFormat {
    #[default]
    Markdown,
    Json,
}

impl DeckFormat {
    pub fn renderer(self) -> Box<dyn DeckRenderer> {
        match self {
            Self::Markdown => Box::new(MarkdownDeckRenderer),
            Self::Json => Box::new(JsonDeckRenderer),
        }
    }
}

impl FromStr for DeckFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown deck format '{}' (expected markdown or json)", other)),
        }
    }
}

impl fmt::Display for DeckFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markdown => f.write_str("markdown"),
            Self::Json => f.write_str("json"),
        }
    }
}
