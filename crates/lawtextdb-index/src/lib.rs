//! Search index over law texts.
//!
//! A Tantivy index holding one denormalized record per uploaded law text:
//! its name, the text extracted from the PDF, and the id of the owning row in
//! the primary store. The index is never authoritative; callers resolve hits
//! back through the primary store.
//!
//! Queries are handed to Tantivy's query parser as-is, so tokenization and
//! matching follow Tantivy's defaults. Hits are returned in the order Tantivy
//! ranks them.

mod query;
mod schema;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tantivy::directory::MmapDirectory;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Term};
use thiserror::Error;

use schema::IndexFields;

/// Heap budget for the single indexing thread.
const WRITER_MEMORY_BYTES: usize = 50_000_000;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index error: {0}")]
    Index(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("index writer poisoned")]
    Poisoned,
}

impl From<tantivy::TantivyError> for IndexError {
    fn from(e: tantivy::TantivyError) -> Self {
        IndexError::Index(e.to_string())
    }
}

impl From<tantivy::directory::error::OpenDirectoryError> for IndexError {
    fn from(e: tantivy::directory::error::OpenDirectoryError) -> Self {
        IndexError::Index(e.to_string())
    }
}

/// Denormalized search copy of a law text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub id: String,
    pub name: String,
    pub raw_text: String,
    /// Id of the owning law text in the primary store.
    pub law_text_id: i64,
}

impl SearchRecord {
    pub fn new(name: impl Into<String>, raw_text: impl Into<String>, law_text_id: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.into(),
            raw_text: raw_text.into(),
            law_text_id,
        }
    }
}

/// Handle to an opened search index.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: IndexFields,
    path: Option<PathBuf>,
}

impl SearchIndex {
    /// Open the index directory at `path`, creating it if missing.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        std::fs::create_dir_all(path)?;
        let directory = MmapDirectory::open(path)?;
        let index = Index::open_or_create(directory, schema::build_schema())?;
        let this = Self::from_index(index, Some(path.to_path_buf()))?;
        tracing::info!(path = %path.display(), docs = this.count(), "opened search index");
        Ok(this)
    }

    /// Create a throwaway in-RAM index.
    pub fn open_in_ram() -> Result<Self, IndexError> {
        Self::from_index(Index::create_in_ram(schema::build_schema()), None)
    }

    fn from_index(index: Index, path: Option<PathBuf>) -> Result<Self, IndexError> {
        let fields = IndexFields::resolve(&index.schema())?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
            path,
        })
    }

    /// Get the path to the index directory, `None` for RAM indexes.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records currently visible to searches.
    pub fn count(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Add a record and make it visible to subsequent searches.
    pub fn save(&self, record: &SearchRecord) -> Result<(), IndexError> {
        self.write(|writer, fields| {
            writer.add_document(fields.to_document(record))?;
            Ok(())
        })
    }

    /// Remove every record that points at `law_text_id`.
    pub fn delete_by_law_text_id(&self, law_text_id: i64) -> Result<(), IndexError> {
        self.write(|writer, fields| {
            writer.delete_term(Term::from_field_i64(fields.law_text_id, law_text_id));
            Ok(())
        })
    }

    pub fn delete_all(&self) -> Result<(), IndexError> {
        self.write(|writer, _| {
            writer.delete_all_documents()?;
            Ok(())
        })
    }

    pub fn find_by_name(&self, name: &str) -> Result<Vec<SearchRecord>, IndexError> {
        query::find_by_field(&self.index, &self.reader, &self.fields, self.fields.name, name)
    }

    pub fn find_by_raw_text(&self, text: &str) -> Result<Vec<SearchRecord>, IndexError> {
        query::find_by_field(
            &self.index,
            &self.reader,
            &self.fields,
            self.fields.raw_text,
            text,
        )
    }

    /// Run `op` against the writer, commit, and reload the reader.
    fn write(
        &self,
        op: impl FnOnce(&mut IndexWriter, &IndexFields) -> Result<(), IndexError>,
    ) -> Result<(), IndexError> {
        let mut writer = self.writer.lock().map_err(|_| IndexError::Poisoned)?;
        if let Err(e) = op(&mut writer, &self.fields) {
            writer.rollback()?;
            return Err(e);
        }
        writer.commit()?;
        self.reader.reload()?;
        Ok(())
    }
}
