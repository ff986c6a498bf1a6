//! Hand-rolled test doubles for the storage and PDF seams.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use lawtextdb_index::SearchRecord;

use crate::backend::{BackendError, PdfBackend};
use crate::repository::{RepositoryError, SearchRepository};

/// Smallest byte string that passes the PDF signature check.
pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n%%EOF\n";

/// A [`PdfBackend`] that returns canned text (or a canned error) and records
/// what it was handed.
pub struct FakePdfBackend {
    response: Result<String, String>,
    call_count: AtomicUsize,
    last_path: Mutex<Option<PathBuf>>,
    last_contents: Mutex<Option<Vec<u8>>>,
}

impl FakePdfBackend {
    /// Always succeed with `text`.
    pub fn new(text: &str) -> Self {
        Self::with_response(Ok(text.to_string()))
    }

    /// Always fail with an extraction error carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self::with_response(Err(message.to_string()))
    }

    fn with_response(response: Result<String, String>) -> Self {
        Self {
            response,
            call_count: AtomicUsize::new(0),
            last_path: Mutex::new(None),
            last_contents: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Path of the file passed to the most recent call.
    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path.lock().ok().and_then(|p| p.clone())
    }

    /// Whether the file existed with exactly `expected` bytes during the call.
    pub fn saw_file_contents(&self, expected: &[u8]) -> bool {
        self.last_contents
            .lock()
            .ok()
            .and_then(|c| c.clone())
            .is_some_and(|c| c == expected)
    }
}

impl PdfBackend for FakePdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_path.lock() {
            *last = Some(path.to_path_buf());
        }
        let contents = std::fs::read(path)?;
        if let Ok(mut last) = self.last_contents.lock() {
            *last = Some(contents);
        }
        self.response
            .clone()
            .map_err(BackendError::ExtractionError)
    }
}

/// A [`SearchRepository`] whose every call fails.
pub struct FailingSearchIndex;

impl FailingSearchIndex {
    fn error() -> RepositoryError {
        RepositoryError::Other("search index unavailable".to_string())
    }
}

impl SearchRepository for FailingSearchIndex {
    fn find_by_name(&self, _name: &str) -> Result<Vec<SearchRecord>, RepositoryError> {
        Err(Self::error())
    }

    fn find_by_raw_text(&self, _text: &str) -> Result<Vec<SearchRecord>, RepositoryError> {
        Err(Self::error())
    }

    fn save(&self, _record: &SearchRecord) -> Result<(), RepositoryError> {
        Err(Self::error())
    }

    fn delete_by_law_text_id(&self, _law_text_id: i64) -> Result<(), RepositoryError> {
        Err(Self::error())
    }

    fn delete_all(&self) -> Result<(), RepositoryError> {
        Err(Self::error())
    }
}
