//! Services behind the lawtextdb HTTP API.
//!
//! [`AuthService`] owns users and login tokens. [`LawTextService`] owns the
//! write path to both the primary store and the search index, and uses a
//! [`TextExtractor`] over a pluggable [`PdfBackend`] to pull text out of
//! uploaded PDFs.

pub mod auth;
pub mod backend;
pub mod config_file;
pub mod extract;
pub mod law_texts;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod repository;

use std::sync::Arc;

use lawtextdb_index::SearchIndex;
use lawtextdb_store::PrimaryStore;

// Re-export for convenience
pub use auth::{AuthError, AuthService};
pub use backend::{BackendError, PdfBackend};
pub use extract::{ExtractionError, TextExtractor, is_pdf};
pub use law_texts::{IngestError, LawTextService, UploadedFile};
pub use lawtextdb_index::SearchRecord;
pub use lawtextdb_store::LawText;
pub use repository::{
    CredentialRepository, LawTextRepository, RepositoryError, SearchRepository,
};

/// The two services wired over one primary store and one search index.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<AuthService>,
    pub law_texts: Arc<LawTextService>,
}

impl Services {
    pub fn new(
        store: Arc<PrimaryStore>,
        index: Arc<SearchIndex>,
        backend: Arc<dyn PdfBackend>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(store.clone()));
        let law_texts = Arc::new(LawTextService::new(
            store,
            index,
            auth.clone(),
            TextExtractor::new(backend),
        ));
        Self { auth, law_texts }
    }
}
