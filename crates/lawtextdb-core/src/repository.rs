//! Storage seams used by the services.
//!
//! The services only see these traits; the production implementations are
//! [`PrimaryStore`] (law texts, sequence, credentials) and [`SearchIndex`].

use lawtextdb_index::{IndexError, SearchIndex, SearchRecord};
use lawtextdb_store::{LawText, PrimaryStore, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("primary store: {0}")]
    Store(#[from] StoreError),
    #[error("search index: {0}")]
    Index(#[from] IndexError),
    #[error("{0}")]
    Other(String),
}

/// Authoritative law text storage plus the id sequence.
pub trait LawTextRepository: Send + Sync {
    fn find_all(&self) -> Result<Vec<LawText>, RepositoryError>;
    fn find_by_id(&self, id: i64) -> Result<Option<LawText>, RepositoryError>;
    fn find_by_accepted(&self, accepted: bool) -> Result<Vec<LawText>, RepositoryError>;
    /// Upsert under a positive id; otherwise insert under the next free id.
    fn save(&self, law_text: &LawText) -> Result<LawText, RepositoryError>;
    /// Insert with an id already drawn from [`next_id`](Self::next_id).
    fn insert(&self, law_text: &LawText) -> Result<(), RepositoryError>;
    fn mark_accepted(&self, id: i64) -> Result<bool, RepositoryError>;
    fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
    fn delete_all(&self) -> Result<(), RepositoryError>;
    fn next_id(&self) -> Result<i64, RepositoryError>;
    fn reset_sequence(&self) -> Result<(), RepositoryError>;
}

/// Secondary text index of uploaded law texts.
pub trait SearchRepository: Send + Sync {
    fn find_by_name(&self, name: &str) -> Result<Vec<SearchRecord>, RepositoryError>;
    fn find_by_raw_text(&self, text: &str) -> Result<Vec<SearchRecord>, RepositoryError>;
    fn save(&self, record: &SearchRecord) -> Result<(), RepositoryError>;
    fn delete_by_law_text_id(&self, law_text_id: i64) -> Result<(), RepositoryError>;
    fn delete_all(&self) -> Result<(), RepositoryError>;
}

/// Users and their login tokens.
pub trait CredentialRepository: Send + Sync {
    /// Returns `false` if the username already exists.
    fn insert_user(&self, username: &str, password_hash: &str) -> Result<bool, RepositoryError>;
    fn password_hash(&self, username: &str) -> Result<Option<String>, RepositoryError>;
    fn insert_token(&self, username: &str, token: &str) -> Result<(), RepositoryError>;
    fn token_exists(&self, username: &str, token: &str) -> Result<bool, RepositoryError>;
    fn delete_token(&self, username: &str, token: &str) -> Result<(), RepositoryError>;
}

impl LawTextRepository for PrimaryStore {
    fn find_all(&self) -> Result<Vec<LawText>, RepositoryError> {
        Ok(PrimaryStore::find_all(self)?)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<LawText>, RepositoryError> {
        Ok(PrimaryStore::find_by_id(self, id)?)
    }

    fn find_by_accepted(&self, accepted: bool) -> Result<Vec<LawText>, RepositoryError> {
        Ok(PrimaryStore::find_by_accepted(self, accepted)?)
    }

    fn save(&self, law_text: &LawText) -> Result<LawText, RepositoryError> {
        Ok(PrimaryStore::save(self, law_text)?)
    }

    fn insert(&self, law_text: &LawText) -> Result<(), RepositoryError> {
        Ok(PrimaryStore::insert(self, law_text)?)
    }

    fn mark_accepted(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(PrimaryStore::mark_accepted(self, id)?)
    }

    fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(PrimaryStore::delete(self, id)?)
    }

    fn delete_all(&self) -> Result<(), RepositoryError> {
        PrimaryStore::delete_all(self)?;
        Ok(())
    }

    fn next_id(&self) -> Result<i64, RepositoryError> {
        Ok(PrimaryStore::next_id(self)?)
    }


    fn reset_sequence(&self) -> Result<(), RepositoryError> {
        Ok(PrimaryStore::reset_sequence(self)?)
    }
}

impl CredentialRepository for PrimaryStore {
    fn insert_user(&self, username: &str, password_hash: &str) -> Result<bool, RepositoryError> {
        Ok(PrimaryStore::insert_user(self, username, password_hash)?)
    }

    fn password_hash(&self, username: &str) -> Result<Option<String>, RepositoryError> {
        Ok(PrimaryStore::password_hash(self, username)?)
    }

    fn insert_token(&self, username: &str, token: &str) -> Result<(), RepositoryError> {
        Ok(PrimaryStore::insert_token(self, username, token)?)
    }

    fn token_exists(&self, username: &str, token: &str) -> Result<bool, RepositoryError> {
        Ok(PrimaryStore::token_exists(self, username, token)?)
    }

    fn delete_token(&self, username: &str, token: &str) -> Result<(), RepositoryError> {
        Ok(PrimaryStore::delete_token(self, username, token)?)
    }
}

impl SearchRepository for SearchIndex {
    fn find_by_name(&self, name: &str) -> Result<Vec<SearchRecord>, RepositoryError> {
        Ok(SearchIndex::find_by_name(self, name)?)
    }

    fn find_by_raw_text(&self, text: &str) -> Result<Vec<SearchRecord>, RepositoryError> {
        Ok(SearchIndex::find_by_raw_text(self, text)?)
    }

    fn save(&self, record: &SearchRecord) -> Result<(), RepositoryError> {
        Ok(SearchIndex::save(self, record)?)
    }

    fn delete_by_law_text_id(&self, law_text_id: i64) -> Result<(), RepositoryError> {
        Ok(SearchIndex::delete_by_law_text_id(self, law_text_id)?)
    }

    fn delete_all(&self) -> Result<(), RepositoryError> {
        Ok(SearchIndex::delete_all(self)?)
    }
}
