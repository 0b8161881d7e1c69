use super::{ResponseStore, StoreError};
use crate::response::Response;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;

/// Relational store backed by the `attendees` table
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA busy_timeout=5000;",
        )?;
        Self::from_connection(conn)
    }

    /// Store over a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::create_tables(&conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn create_tables(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS attendees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                ageRange TEXT NOT NULL,
                age TEXT NOT NULL,
                local TEXT NOT NULL,
                country TEXT NOT NULL,
                state TEXT NOT NULL,
                christFollower TEXT NOT NULL,
                faithDecision TEXT NOT NULL,
                howYouFoundUs TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    // Recover from mutex poisoning; the connection itself is still usable
    fn with_conn<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError>,
    {
        let mut guard = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl ResponseStore for SqliteStore {
    fn insert(&self, response: &Response) -> Result<(), StoreError> {
        let fields = response.to_fields();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO attendees (name, ageRange, age, local, country, state, \
                 christFollower, faithDecision, howYouFoundUs) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6],
                    fields[7], fields[8],
                ],
            )?;
            Ok(())
        })
    }

    fn scan_all(&self) -> Result<Vec<Response>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, ageRange, age, local, country, state, christFollower, \
                 faithDecision, howYouFoundUs FROM attendees ORDER BY id ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut responses = Vec::new();
            while let Some(row) = rows.next()? {
                let mut fields = Vec::with_capacity(9);
                for i in 0..9 {
                    fields.push(row.get::<_, String>(i)?);
                }
                let response = Response::from_fields(&fields).map_err(StoreError::Corrupt)?;
                responses.push(response);
            }
            Ok(responses)
        })
    }

    fn delete_all(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM attendees", [])?;
            // Restart row ids at 1
            tx.execute("DELETE FROM sqlite_sequence WHERE name = 'attendees'", [])?;
            tx.commit()?;
            Ok(())
        })
    }
}
