//! Schema, metadata, and sequence operations.

use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};

use crate::StoreError;

pub const SCHEMA_VERSION: &str = "1";

/// Initialize the database with the required schema.
/// Sets WAL mode and NORMAL synchronous for performance.
pub fn init_database(conn: &Connection) -> Result<(), StoreError> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_secs(5))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS law_texts (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            file BLOB,
            accepted INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tokens (
            username TEXT NOT NULL,
            token TEXT NOT NULL,
            PRIMARY KEY (username, token)
        );

        CREATE TABLE IF NOT EXISTS sequences (
            name TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_law_texts_accepted ON law_texts(accepted);
        "#,
    )?;

    set_metadata(conn, "schema_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Get a metadata value by key.
pub fn get_metadata(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
    let mut stmt = conn.prepare_cached("SELECT value FROM metadata WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set a metadata value (upsert).
pub fn set_metadata(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Advance a named sequence and return its new value. First call yields 1.
pub fn next_sequence(conn: &Connection, name: &str) -> Result<i64, StoreError> {
    let value = conn.query_row(
        "INSERT INTO sequences (name, value) VALUES (?1, 1) \
         ON CONFLICT(name) DO UPDATE SET value = value + 1 \
         RETURNING value",
        params![name],
        |row| row.get(0),
    )?;
    Ok(value)
}

pub fn current_sequence(conn: &Connection, name: &str) -> Result<i64, StoreError> {
    let value = conn
        .query_row(
            "SELECT value FROM sequences WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or(0))
}

pub fn reset_sequence(conn: &Connection, name: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO sequences (name, value) VALUES (?1, 0) \
         ON CONFLICT(name) DO UPDATE SET value = 0",
        params![name],
    )?;
    Ok(())
}
