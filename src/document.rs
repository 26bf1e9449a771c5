//! Document ingestion — turn an uploaded file into plain text
//!
//! PDF parsing is delegated to poppler's `pdftotext`, run as a subprocess
//! with the document on stdin. Everything that is not a PDF is read as
//! (lossy) UTF-8 text.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Errors from document loading.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("text extractor not available: {0}")]
    ExtractorUnavailable(String),
    #[error("text extraction failed: {0}")]
    ExtractionFailed(String),
}

/// Coarse document format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            _ => Self::Text,
        }
    }
}

/// Converts raw document bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn id(&self) -> &str;

    async fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError>;
}

/// Reads bytes as UTF-8, replacing invalid sequences.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn id(&self) -> &str {
        "plain-text"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Runs `pdftotext - -` on the document bytes.
pub struct PdftotextExtractor {
    binary: String,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self {
            binary: "pdftotext".to_string(),
        }
    }

    /// Use a specific `pdftotext` executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PdftotextExtractor {
    fn id(&self) -> &str {
        "pdftotext"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<String, DocumentError> {
        let mut child = Command::new(&self.binary)
            .args(["-enc", "UTF-8", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    DocumentError::ExtractorUnavailable(format!("{} not found in PATH", self.binary))
                }
                _ => DocumentError::ExtractorUnavailable(format!("cannot spawn {}: {}", self.binary, e)),
            })?;

        // Feed stdin from a separate task so a full stdout pipe cannot deadlock us.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DocumentError::ExtractionFailed("stdin not captured".to_string()))?;
        let input = bytes.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DocumentError::ExtractionFailed(e.to_string()))?;
        if let Ok(Err(e)) = writer.await {
            debug!(error = %e, "pdftotext closed stdin early");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocumentError::ExtractionFailed(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Dispatches documents to an extractor by kind.
#[derive(Clone)]
pub struct DocumentLoader {
    pdf: Arc<dyn TextExtractor>,
    text: Arc<dyn TextExtractor>,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self {
            pdf: Arc::new(PdftotextExtractor::new()),
            text: Arc::new(PlainTextExtractor),
        }
    }
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extractor used for `kind`.
    pub fn with_extractor(mut self, kind: DocumentKind, extractor: Arc<dyn TextExtractor>) -> Self {
        match kind {
            DocumentKind::Pdf => self.pdf = extractor,
            DocumentKind::Text => self.text = extractor,
        }
        self
    }

    fn extractor(&self, kind: DocumentKind) -> &dyn TextExtractor {
        match kind {
            DocumentKind::Pdf => self.pdf.as_ref(),
            DocumentKind::Text => self.text.as_ref(),
        }
    }

    /// Read `path` and extract its text.
    ///
    /// A document with no text (e.g. a scanned PDF) is returned as-is; the
    /// classifier and gate handle it with placeholders and passthrough.
    pub async fn load(&self, path: &Path) -> Result<String, DocumentError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let kind = DocumentKind::detect(path);
        let extractor = self.extractor(kind);
        debug!(path = %path.display(), ?kind, extractor = extractor.id(), bytes = bytes.len(), "loading document");

        let text = extractor.extract(&bytes).await?;
        if text.trim().is_empty() {
            warn!(path = %path.display(), extractor = extractor.id(), "document contains no text");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        (dir, path)
    }

    struct FixedExtractor(&'static str);

    #[async_trait]
    impl TextExtractor for FixedExtractor {
        fn id(&self) -> &str {
            "fixed"
        }

        async fn extract(&self, _bytes: &[u8]) -> Result<String, DocumentError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn detects_kind_by_extension() {
        assert_eq!(DocumentKind::detect(Path::new("rfp.pdf")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::detect(Path::new("RFP.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::detect(Path::new("rfp.txt")), DocumentKind::Text);
        assert_eq!(DocumentKind::detect(Path::new("rfp")), DocumentKind::Text);
    }

    #[tokio::test]
    async fn loads_plain_text() {
        let (_dir, path) = temp_file("rfp.txt", b"Acme Corp seeks proposals.");
        let text = DocumentLoader::new().load(&path).await.unwrap();
        assert_eq!(text, "Acme Corp seeks proposals.");
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let (_dir, path) = temp_file("rfp.txt", b"caf\xff bid");
        let text = DocumentLoader::new().load(&path).await.unwrap();
        assert_eq!(text, "caf\u{fffd} bid");
    }

    #[tokio::test]
    async fn whitespace_only_document_loads_unchanged() {
        let (_dir, path) = temp_file("blank.md", b"  \n\t ");
        let text = DocumentLoader::new().load(&path).await.unwrap();
        assert_eq!(text, "  \n\t ");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = DocumentLoader::new()
            .load(Path::new("/nonexistent/rfp.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }

    #[tokio::test]
    async fn pdf_goes_to_pdf_extractor() {
        let (_dir, path) = temp_file("rfp.pdf", b"%PDF-1.7 fake");
        let loader = DocumentLoader::new()
            .with_extractor(DocumentKind::Pdf, Arc::new(FixedExtractor("from pdf")));
        assert_eq!(loader.load(&path).await.unwrap(), "from pdf");
    }

    #[tokio::test]
    async fn missing_pdftotext_binary_is_unavailable() {
        let extractor = PdftotextExtractor::new().with_binary("rfpdeck-no-such-pdftotext");
        let err = extractor.extract(b"%PDF-1.7").await.unwrap_err();
        assert!(matches!(err, DocumentError::ExtractorUnavailable(_)));
    }
}
