//! Primary store for law texts, users, and login tokens.
//!
//! Backed by a single SQLite database (WAL mode). The store is the source of
//! truth for documents; the search index in `lawtextdb-index` only mirrors it.
//! Ids for new documents come from a named sequence that can be reset when
//! the collection is purged.

mod codec;
mod credentials;
mod db;
mod law_texts;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use db::SCHEMA_VERSION;

/// Name of the sequence that assigns law text ids.
pub const LAW_TEXT_SEQUENCE: &str = "law_text_sequence";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store connection poisoned")]
    Poisoned,
}

/// A legal text document as held in the primary store.
///
/// `Default` is the empty placeholder returned to clients whenever an upload
/// or insert cannot be completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawText {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Original uploaded bytes, base64 in JSON.
    #[serde(default, with = "codec::base64_bytes")]
    pub file: Option<Vec<u8>>,
    #[serde(default)]
    pub accepted: bool,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: u64,
}

impl LawText {
    /// A not-yet-persisted law text built from an uploaded file.
    pub fn from_upload(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            file: Some(data),
            accepted: false,
            created_at: now_secs(),
        }
    }
}

pub(crate) fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Handle to an opened primary store.
pub struct PrimaryStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl PrimaryStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        db::init_database(&conn)?;
        tracing::info!(path = %path.display(), "opened primary store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        db::init_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> Result<Option<String>, StoreError> {
        db::get_metadata(&*self.conn()?, "schema_version")
    }

    // ── Law texts ───────────────────────────────────────────────────────

    pub fn find_all(&self) -> Result<Vec<LawText>, StoreError> {
        law_texts::find_all(&*self.conn()?)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<LawText>, StoreError> {
        law_texts::find_by_id(&*self.conn()?, id)
    }

    pub fn find_by_accepted(&self, accepted: bool) -> Result<Vec<LawText>, StoreError> {
        law_texts::find_by_accepted(&*self.conn()?, accepted)
    }

    /// Store a law text.
    ///
    /// A positive id upserts that row. A non-positive id inserts a new row
    /// under the next free sequence value, never touching existing rows.
    pub fn save(&self, law_text: &LawText) -> Result<LawText, StoreError> {
        let conn = self.conn()?;
        let mut stored = law_text.clone();
        if stored.created_at == 0 {
            stored.created_at = now_secs();
        }
        if stored.id <= 0 {
            stored.id = next_free_id(&conn)?;
            law_texts::insert(&conn, &stored)?;
        } else {
            law_texts::upsert(&conn, &stored)?;
        }
        Ok(stored)
    }

    /// Insert a law text with an already assigned id. Fails if the id exists.
    pub fn insert(&self, law_text: &LawText) -> Result<(), StoreError> {
        law_texts::insert(&*self.conn()?, law_text)
    }

    /// Set `accepted = true`. Returns `false` if no such id exists.
    pub fn mark_accepted(&self, id: i64) -> Result<bool, StoreError> {
        law_texts::mark_accepted(&*self.conn()?, id)
    }

    /// Returns `false` if no such id existed.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        law_texts::delete(&*self.conn()?, id)
    }

    pub fn delete_all(&self) -> Result<usize, StoreError> {
        law_texts::delete_all(&*self.conn()?)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        law_texts::count(&*self.conn()?)
    }

    // ── Sequences ───────────────────────────────────────────────────────

    /// Advance the law text sequence to the next id not already in use.
    pub fn next_id(&self) -> Result<i64, StoreError> {
        next_free_id(&*self.conn()?)
    }

    /// Current value of the law text sequence (0 when never advanced).
    pub fn current_id(&self) -> Result<i64, StoreError> {
        db::current_sequence(&*self.conn()?, LAW_TEXT_SEQUENCE)
    }

    pub fn reset_sequence(&self) -> Result<(), StoreError> {
        db::reset_sequence(&*self.conn()?, LAW_TEXT_SEQUENCE)
    }

    // ── Users and tokens ────────────────────────────────────────────────

    /// Insert a user. Returns `false` if the username is taken.
    pub fn insert_user(&self, username: &str, password_hash: &str) -> Result<bool, StoreError> {
        credentials::insert_user(&*self.conn()?, username, password_hash)
    }

    pub fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        credentials::password_hash(&*self.conn()?, username)
    }

    pub fn insert_token(&self, username: &str, token: &str) -> Result<(), StoreError> {
        credentials::insert_token(&*self.conn()?, username, token)
    }

    pub fn token_exists(&self, username: &str, token: &str) -> Result<bool, StoreError> {
        credentials::token_exists(&*self.conn()?, username, token)
    }

    pub fn delete_token(&self, username: &str, token: &str) -> Result<(), StoreError> {
        credentials::delete_token(&*self.conn()?, username, token)
    }
}

/// Skips sequence values taken by law texts saved under explicit ids.
fn next_free_id(conn: &Connection) -> Result<i64, StoreError> {
    loop {
        let id = db::next_sequence(conn, LAW_TEXT_SEQUENCE)?;
        if !law_texts::exists(conn, id)? {
            return Ok(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_assigns_sequential_ids() {
        let store = PrimaryStore::open_in_memory().unwrap();
        let a = store.save(&LawText::from_upload("a.pdf", vec![1])).unwrap();
        let b = store.save(&LawText::from_upload("b.pdf", vec![2])).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.current_id().unwrap(), 2);
    }

    #[test]
    fn save_keeps_explicit_id_and_overwrites() {
        let store = PrimaryStore::open_in_memory().unwrap();
        let mut text = LawText {
            id: 42,
            name: "Civil Code".into(),
            ..Default::default()
        };
        store.save(&text).unwrap();
        text.name = "Civil Code (amended)".into();
        store.save(&text).unwrap();

        let all = store.find_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Civil Code (amended)");
        // The sequence is untouched by explicit ids.
        assert_eq!(store.current_id().unwrap(), 0);
    }

    #[test]
    fn sequence_skips_explicitly_saved_ids() {
        let store = PrimaryStore::open_in_memory().unwrap();
        for (id, name) in [(1, "Explicit One"), (2, "Explicit Two")] {
            store
                .save(&LawText {
                    id,
                    name: name.into(),
                    ..Default::default()
                })
                .unwrap();
        }

        let auto = store
            .save(&LawText {
                name: "Auto".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(auto.id, 3);
        assert_eq!(store.next_id().unwrap(), 4);

        let names: Vec<String> = store.find_all().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Explicit One", "Explicit Two", "Auto"]);
    }

    #[test]
    fn open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lawtexts.db");
        {
            let store = PrimaryStore::open(&path).unwrap();
            store.save(&LawText::from_upload("x.pdf", vec![])).unwrap();
        }
        let store = PrimaryStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(
            store.schema_version().unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
    }

    #[test]
    fn law_text_json_uses_camel_case_and_base64() {
        let text = LawText {
            id: 3,
            name: "act.pdf".into(),
            file: Some(b"%PDF-".to_vec()),
            accepted: true,
            created_at: 10,
        };
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["createdAt"], 10);
        assert_eq!(json["file"], "JVBERi0=");

        let back: LawText = serde_json::from_value(json).unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn law_text_json_fields_are_optional() {
        let parsed: LawText = serde_json::from_str(r#"{"name":"LawText1"}"#).unwrap();
        assert_eq!(parsed.id, 0);
        assert_eq!(parsed.name, "LawText1");
        assert!(parsed.file.is_none());
        assert!(!parsed.accepted);
    }
}
