//! SQL for the `users` and `tokens` tables.

use rusqlite::{Connection, OptionalExtension, params};

use crate::StoreError;

pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
) -> Result<bool, StoreError> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (username, password_hash) VALUES (?1, ?2)",
        params![username, password_hash],
    )?;
    Ok(inserted > 0)
}

pub fn password_hash(conn: &Connection, username: &str) -> Result<Option<String>, StoreError> {
    let mut stmt = conn.prepare_cached("SELECT password_hash FROM users WHERE username = ?1")?;
    Ok(stmt.query_row(params![username], |row| row.get(0)).optional()?)
}

pub fn insert_token(conn: &Connection, username: &str, token: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR IGNORE INTO tokens (username, token) VALUES (?1, ?2)",
        params![username, token],
    )?;
    Ok(())
}

pub fn token_exists(conn: &Connection, username: &str, token: &str) -> Result<bool, StoreError> {
    let mut stmt =
        conn.prepare_cached("SELECT COUNT(*) > 0 FROM tokens WHERE username = ?1 AND token = ?2")?;
    Ok(stmt.query_row(params![username, token], |row| row.get(0))?)
}

pub fn delete_token(conn: &Connection, username: &str, token: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM tokens WHERE username = ?1 AND token = ?2",
        params![username, token],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_user_once() {
        let conn = setup_db();
        assert!(insert_user(&conn, "alice", "hash-1").unwrap());
        assert!(!insert_user(&conn, "alice", "hash-2").unwrap());
        assert_eq!(
            password_hash(&conn, "alice").unwrap().as_deref(),
            Some("hash-1")
        );
        assert!(password_hash(&conn, "bob").unwrap().is_none());
    }

    #[test]
    fn test_token_pair_must_match() {
        let conn = setup_db();
        insert_token(&conn, "alice", "t1").unwrap();

        assert!(token_exists(&conn, "alice", "t1").unwrap());
        assert!(!token_exists(&conn, "bob", "t1").unwrap());
        assert!(!token_exists(&conn, "alice", "t2").unwrap());
    }

    #[test]
    fn test_multiple_tokens_per_user() {
        let conn = setup_db();
        insert_token(&conn, "alice", "t1").unwrap();
        insert_token(&conn, "alice", "t2").unwrap();

        delete_token(&conn, "alice", "t1").unwrap();
        assert!(!token_exists(&conn, "alice", "t1").unwrap());
        assert!(token_exists(&conn, "alice", "t2").unwrap());
    }

    #[test]
    fn test_delete_token_is_idempotent() {
        let conn = setup_db();
        delete_token(&conn, "nobody", "nothing").unwrap();
        insert_token(&conn, "alice", "t1").unwrap();
        delete_token(&conn, "alice", "t1").unwrap();
        delete_token(&conn, "alice", "t1").unwrap();
        assert!(!token_exists(&conn, "alice", "t1").unwrap());
    }
}
