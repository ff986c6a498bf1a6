//! PDF validation and text extraction through a scoped temporary file.

use std::io::Write;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::{BackendError, PdfBackend};

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("not a PDF file: {0}")]
    NotPdf(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether `filename` has a `.pdf` extension (any case).
pub fn has_pdf_extension(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Extension and magic bytes both say PDF.
pub fn is_pdf(filename: &str, data: &[u8]) -> bool {
    has_pdf_extension(filename) && data.starts_with(PDF_MAGIC)
}

/// Stages uploaded bytes into a temp file and hands it to a [`PdfBackend`].
#[derive(Clone)]
pub struct TextExtractor {
    backend: Arc<dyn PdfBackend>,
}

impl TextExtractor {
    pub fn new(backend: Arc<dyn PdfBackend>) -> Self {
        Self { backend }
    }

    /// Extract plain text from an uploaded PDF.
    ///
    /// The temp file is removed when this returns, whether extraction
    /// succeeded or not.
    pub fn extract(&self, filename: &str, data: &[u8]) -> Result<String, ExtractionError> {
        if !is_pdf(filename, data) {
            return Err(ExtractionError::NotPdf(filename.to_string()));
        }

        let mut temp = tempfile::Builder::new()
            .prefix("law_text")
            .suffix(".pdf")
            .tempfile()?;
        temp.write_all(data)?;
        temp.flush()?;

        let text = self.backend.extract_text(temp.path())?;
        tracing::debug!(filename, chars = text.len(), "extracted PDF text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FakePdfBackend, MINIMAL_PDF};

    #[test]
    fn test_has_pdf_extension() {
        assert!(has_pdf_extension("act.pdf"));
        assert!(has_pdf_extension("ACT.PDF"));
        assert!(has_pdf_extension("dir/act.v2.pdf"));
        assert!(!has_pdf_extension("act.pdf.txt"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension(""));
    }

    #[test]
    fn test_is_pdf_requires_magic_bytes() {
        assert!(is_pdf("a.pdf", MINIMAL_PDF));
        assert!(!is_pdf("a.pdf", b"plain text"));
        assert!(!is_pdf("a.txt", MINIMAL_PDF));
    }

    #[test]
    fn test_extract_rejects_non_pdf_without_calling_backend() {
        let backend = Arc::new(FakePdfBackend::new("text"));
        let extractor = TextExtractor::new(backend.clone());

        let err = extractor.extract("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, ExtractionError::NotPdf(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_extract_removes_temp_file_on_success() {
        let backend = Arc::new(FakePdfBackend::new("Article 1. Scope."));
        let extractor = TextExtractor::new(backend.clone());

        let text = extractor.extract("act.pdf", MINIMAL_PDF).unwrap();
        assert_eq!(text, "Article 1. Scope.");

        let seen = backend.last_path().unwrap();
        assert!(backend.saw_file_contents(MINIMAL_PDF));
        assert!(!seen.exists());
        let name = seen.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("law_text"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_extract_removes_temp_file_on_failure() {
        let backend = Arc::new(FakePdfBackend::failing("corrupt xref"));
        let extractor = TextExtractor::new(backend.clone());

        let err = extractor.extract("act.pdf", MINIMAL_PDF).unwrap_err();
        assert!(matches!(err, ExtractionError::Backend(_)));
        assert!(!backend.last_path().unwrap().exists());
    }
}
