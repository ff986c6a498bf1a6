//! Single-field Tantivy queries.

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Field;
use tantivy::{Index, IndexReader, TantivyDocument};

use crate::schema::IndexFields;
use crate::{IndexError, SearchRecord};

/// Search `field` for `query_str` and return every hit in rank order.
///
/// The query string is not rewritten. Syntax the parser cannot handle is
/// parsed leniently instead of failing the request.
pub fn find_by_field(
    index: &Index,
    reader: &IndexReader,
    fields: &IndexFields,
    field: Field,
    query_str: &str,
) -> Result<Vec<SearchRecord>, IndexError> {
    let query_parser = QueryParser::for_index(index, vec![field]);
    let (query, errors) = query_parser.parse_query_lenient(query_str);
    if !errors.is_empty() {
        tracing::debug!(query = query_str, errors = errors.len(), "lenient query parse");
    }

    let searcher = reader.searcher();
    let limit = (searcher.num_docs() as usize).max(1);
    let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

    let mut records = Vec::with_capacity(top_docs.len());
    for (_score, doc_address) in top_docs {
        let doc = searcher.doc::<TantivyDocument>(doc_address)?;
        records.push(fields.from_document(&doc));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_schema;

    fn build_test_index() -> (Index, IndexReader, IndexFields) {
        let index = Index::create_in_ram(build_schema());
        let fields = IndexFields::resolve(&index.schema()).unwrap();
        let mut writer = index.writer(15_000_000).unwrap();

        for (name, text, id) in [
            ("Data Protection Act", "personal data shall be processed lawfully", 1),
            ("Data Retention Rules", "data data data retention", 2),
            ("Road Traffic Act", "speed limits on motorways", 3),
        ] {
            writer
                .add_document(fields.to_document(&SearchRecord::new(name, text, id)))
                .unwrap();
        }
        writer.commit().unwrap();

        let reader = index
            .reader_builder()
            .reload_policy(tantivy::ReloadPolicy::Manual)
            .try_into()
            .unwrap();

        (index, reader, fields)
    }

    #[test]
    fn test_hits_ranked_by_score() {
        let (index, reader, fields) = build_test_index();
        let hits = find_by_field(&index, &reader, &fields, fields.raw_text, "data").unwrap();
        let ids: Vec<i64> = hits.iter().map(|r| r.law_text_id).collect();
        // Higher term frequency ranks first.
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_no_hits() {
        let (index, reader, fields) = build_test_index();
        let hits = find_by_field(&index, &reader, &fields, fields.name, "maritime").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_malformed_query_does_not_fail() {
        let (index, reader, fields) = build_test_index();
        let hits = find_by_field(&index, &reader, &fields, fields.name, "Road AND (").unwrap();
        assert!(hits.iter().all(|r| r.law_text_id == 3));
    }

    #[test]
    fn test_empty_query() {
        let (index, reader, fields) = build_test_index();
        let hits = find_by_field(&index, &reader, &fields, fields.name, "").unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_record_fields_round_trip() {
        let (index, reader, fields) = build_test_index();
        let hits = find_by_field(&index, &reader, &fields, fields.name, "traffic").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Road Traffic Act");
        assert_eq!(hits[0].raw_text, "speed limits on motorways");
        assert_eq!(hits[0].id.len(), 32);
    }
}
