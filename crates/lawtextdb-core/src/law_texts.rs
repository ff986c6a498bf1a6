//! Law text ingestion, lookup, search, and moderation.
//!
//! Writes go to the primary store first and to the search index second, as
//! two independent steps. A failure after the first write leaves the law
//! text in the primary store without a search record; nothing is rolled
//! back. Outward-facing methods degrade to empty values or message strings
//! instead of returning errors.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lawtextdb_index::SearchRecord;
use lawtextdb_store::LawText;
use thiserror::Error;

use crate::auth::AuthService;
use crate::extract::{ExtractionError, TextExtractor, is_pdf};
use crate::repository::{LawTextRepository, RepositoryError, SearchRepository};

pub const ACCEPTED_MESSAGE: &str = "Successfully accepted law text";
pub const DELETED_MESSAGE: &str = "Successfully deleted law text";
pub const AUTH_FAILED_MESSAGE: &str = "Could not authenticate admin user";
pub const NOT_FOUND_MESSAGE: &str = "Could not find law text with given id";
pub const ACCEPT_FAILED_MESSAGE: &str = "Could not accept law text";
pub const DELETE_FAILED_MESSAGE: &str = "Could not delete law text";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("not a PDF upload: {0}")]
    NotPdf(String),
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A file received from a client.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

pub struct LawTextService {
    law_texts: Arc<dyn LawTextRepository>,
    search: Arc<dyn SearchRepository>,
    auth: Arc<AuthService>,
    extractor: TextExtractor,
}

impl LawTextService {
    pub fn new(
        law_texts: Arc<dyn LawTextRepository>,
        search: Arc<dyn SearchRepository>,
        auth: Arc<AuthService>,
        extractor: TextExtractor,
    ) -> Self {
        Self {
            law_texts,
            search,
            auth,
            extractor,
        }
    }

    pub fn get_all(&self) -> Vec<LawText> {
        self.law_texts.find_all().unwrap_or_else(|e| {
            tracing::error!(error = %e, "listing law texts failed");
            Vec::new()
        })
    }

    pub fn get_by_id(&self, id: i64) -> Option<LawText> {
        self.law_texts.find_by_id(id).unwrap_or_else(|e| {
            tracing::error!(id, error = %e, "law text lookup failed");
            None
        })
    }

    pub fn get_accepted(&self) -> Vec<LawText> {
        self.by_accepted(true)
    }

    pub fn get_not_accepted(&self) -> Vec<LawText> {
        self.by_accepted(false)
    }

    fn by_accepted(&self, accepted: bool) -> Vec<LawText> {
        self.law_texts.find_by_accepted(accepted).unwrap_or_else(|e| {
            tracing::error!(accepted, error = %e, "filtering law texts failed");
            Vec::new()
        })
    }

    /// The stored file base64-encoded, or an empty string.
    pub fn get_for_display(&self, id: i64) -> String {
        self.get_by_id(id)
            .and_then(|t| t.file)
            .map(|bytes| STANDARD.encode(bytes))
            .unwrap_or_default()
    }

    /// Store a client-supplied record as-is. The search index is not touched.
    pub fn add_law_text(&self, law_text: LawText) -> LawText {
        match self.law_texts.save(&law_text) {
            Ok(stored) => {
                tracing::info!(id = stored.id, name = %stored.name, "stored law text");
                stored
            }
            Err(e) => {
                tracing::error!(error = %e, "storing law text failed");
                LawText::default()
            }
        }
    }

    /// Ingest an uploaded PDF, returning the empty placeholder on any failure.
    pub fn add_law_text_file(&self, file: &UploadedFile) -> LawText {
        match self.ingest(file) {
            Ok(law_text) => law_text,
            Err(IngestError::NotPdf(name)) => {
                tracing::warn!(filename = %name, "rejected non-PDF upload");
                LawText::default()
            }
            Err(e) => {
                tracing::error!(filename = %file.filename, error = %e, "law text ingestion failed");
                LawText::default()
            }
        }
    }

    /// Persist the upload, extract its text, then index it.
    ///
    /// Nothing is written for non-PDF input. Later failures leave earlier
    /// writes in place.
    pub fn ingest(&self, file: &UploadedFile) -> Result<LawText, IngestError> {
        if !is_pdf(&file.filename, &file.data) {
            return Err(IngestError::NotPdf(file.filename.clone()));
        }

        let mut law_text = LawText::from_upload(file.filename.clone(), file.data.clone());
        law_text.id = self.law_texts.next_id()?;
        self.law_texts.insert(&law_text)?;
        tracing::info!(id = law_text.id, name = %law_text.name, "stored uploaded law text");

        let raw_text = self.extractor.extract(&file.filename, &file.data)?;

        self.search
            .save(&SearchRecord::new(&law_text.name, raw_text, law_text.id))?;
        tracing::info!(id = law_text.id, "indexed law text");

        Ok(law_text)
    }

    /// Mark a law text accepted. Requires a valid token.
    pub fn accept_law_text(&self, id: i64, username: &str, token: &str) -> String {
        if !self.auth.check_token_valid(username, token) {
            return AUTH_FAILED_MESSAGE.to_string();
        }
        match self.law_texts.mark_accepted(id) {
            Ok(true) => {
                tracing::info!(id, username, "accepted law text");
                ACCEPTED_MESSAGE.to_string()
            }
            Ok(false) => NOT_FOUND_MESSAGE.to_string(),
            Err(e) => {
                tracing::error!(id, error = %e, "accepting law text failed");
                ACCEPT_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Delete a law text and its search record. Requires a valid token.
    pub fn delete_law_text(&self, id: i64, username: &str, token: &str) -> String {
        if !self.auth.check_token_valid(username, token) {
            return AUTH_FAILED_MESSAGE.to_string();
        }
        let removed = match self.law_texts.delete(id) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(id, error = %e, "deleting law text failed");
                return DELETE_FAILED_MESSAGE.to_string();
            }
        };
        if let Err(e) = self.search.delete_by_law_text_id(id) {
            tracing::error!(id, error = %e, "deleting search record failed");
        }
        if removed {
            tracing::info!(id, username, "deleted law text");
            DELETED_MESSAGE.to_string()
        } else {
            NOT_FOUND_MESSAGE.to_string()
        }
    }

    /// Purge both stores and reset the id sequence.
    pub fn delete_all_law_texts(&self) -> Result<(), RepositoryError> {
        self.law_texts.delete_all()?;
        self.search.delete_all()?;
        self.law_texts.reset_sequence()?;
        tracing::info!("deleted all law texts");
        Ok(())
    }

    /// Law texts whose name matches `name`, one entry per search hit.
    pub fn get_law_text_by_name(&self, name: &str) -> Vec<Option<LawText>> {
        match self.search.find_by_name(name) {
            Ok(hits) => self.resolve(&hits),
            Err(e) => {
                tracing::error!(query = name, error = %e, "name search failed");
                Vec::new()
            }
        }
    }

    /// Law texts whose extracted text matches `text`, one entry per search hit.
    pub fn get_law_text_by_raw_text(&self, text: &str) -> Vec<Option<LawText>> {
        match self.search.find_by_raw_text(text) {
            Ok(hits) => self.resolve(&hits),
            Err(e) => {
                tracing::error!(query = text, error = %e, "text search failed");
                Vec::new()
            }
        }
    }

    /// Map each hit to its primary record; dangling hits become `None`.
    fn resolve(&self, hits: &[SearchRecord]) -> Vec<Option<LawText>> {
        hits.iter()
            .map(|hit| self.get_by_id(hit.law_text_id))
            .collect()
    }
}
