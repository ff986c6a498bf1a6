//! Tantivy schema for search records.

use tantivy::TantivyDocument;
use tantivy::doc;
use tantivy::schema::*;

use crate::{IndexError, SearchRecord};

pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("id", STRING | STORED);
    schema_builder.add_text_field("name", TEXT | STORED);
    schema_builder.add_text_field("raw_text", TEXT | STORED);
    schema_builder.add_i64_field("law_text_id", INDEXED | STORED | FAST);
    schema_builder.build()
}

/// Resolved field handles, looked up once per opened index.
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    pub id: Field,
    pub name: Field,
    pub raw_text: Field,
    pub law_text_id: Field,
}

impl IndexFields {
    pub fn resolve(schema: &Schema) -> Result<Self, IndexError> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| IndexError::Index(e.to_string()))
        };
        Ok(Self {
            id: field("id")?,
            name: field("name")?,
            raw_text: field("raw_text")?,
            law_text_id: field("law_text_id")?,
        })
    }

    pub fn to_document(&self, record: &SearchRecord) -> TantivyDocument {
        doc!(
            self.id => record.id.as_str(),
            self.name => record.name.as_str(),
            self.raw_text => record.raw_text.as_str(),
            self.law_text_id => record.law_text_id
        )
    }

    pub fn from_document(&self, doc: &TantivyDocument) -> SearchRecord {
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        SearchRecord {
            id: text(self.id),
            name: text(self.name),
            raw_text: text(self.raw_text),
            law_text_id: doc
                .get_first(self.law_text_id)
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
        }
    }
}
