//! SQL for the `law_texts` table.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::{LawText, StoreError};

const COLUMNS: &str = "id, name, file, accepted, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<LawText> {
    Ok(LawText {
        id: row.get(0)?,
        name: row.get(1)?,
        file: row.get(2)?,
        accepted: row.get(3)?,
        created_at: row.get::<_, i64>(4)?.max(0) as u64,
    })
}

pub fn find_all(conn: &Connection) -> Result<Vec<LawText>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!("SELECT {COLUMNS} FROM law_texts ORDER BY id"))?;
    let rows = stmt.query_map([], from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<LawText>, StoreError> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {COLUMNS} FROM law_texts WHERE id = ?1"))?;
    Ok(stmt.query_row(params![id], from_row).optional()?)
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM law_texts WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?)
}

pub fn find_by_accepted(conn: &Connection, accepted: bool) -> Result<Vec<LawText>, StoreError> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM law_texts WHERE accepted = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![accepted], from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn insert(conn: &Connection, law_text: &LawText) -> Result<(), StoreError> {
    conn.execute(
        &format!("INSERT INTO law_texts ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
        params![
            law_text.id,
            law_text.name,
            law_text.file,
            law_text.accepted,
            law_text.created_at as i64
        ],
    )?;
    Ok(())
}

pub fn upsert(conn: &Connection, law_text: &LawText) -> Result<(), StoreError> {
    conn.execute(
        &format!(
            "INSERT INTO law_texts ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, file = excluded.file, \
             accepted = excluded.accepted, created_at = excluded.created_at"
        ),
        params![
            law_text.id,
            law_text.name,
            law_text.file,
            law_text.accepted,
            law_text.created_at as i64
        ],
    )?;
    Ok(())
}

pub fn mark_accepted(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE law_texts SET accepted = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool, StoreError> {
    let changed = conn.execute("DELETE FROM law_texts WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

pub fn delete_all(conn: &Connection) -> Result<usize, StoreError> {
    Ok(conn.execute("DELETE FROM law_texts", [])?)
}

pub fn count(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM law_texts", [], |row| row.get(0))?)
}
