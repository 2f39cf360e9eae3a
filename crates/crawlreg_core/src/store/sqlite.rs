//! SQLite-backed document store.
//!
//! Documents are kept as whole JSON bodies in the `documents` table, one row
//! per kind.
//!
//! # Invariants
//! - The schema is created before `open*` returns; the applied version is
//!   mirrored to `PRAGMA user_version`.
//! - A database stamped with a newer version than `SCHEMA_VERSION` is refused
//!   rather than written to.

use super::{DocumentKind, DocumentStore, StoreError, StoreResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    kind TEXT PRIMARY KEY NOT NULL
        CHECK (kind IN ('organizations', 'configurations')),
    body TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        open_with("file", || Connection::open(path))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        open_with("memory", Connection::open_in_memory)
    }
}

fn open_with(
    mode: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<SqliteStore> {
    let started_at = Instant::now();
    info!("event=db_open module=store status=start mode={mode}");

    let outcome = connect()
        .map_err(StoreError::from)
        .and_then(|mut conn| ensure_schema(&mut conn).map(|()| conn));

    match outcome {
        Ok(conn) => {
            info!(
                "event=db_open module=store status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(SqliteStore { conn })
        }
        Err(err) => {
            error!(
                "event=db_open module=store status=error mode={mode} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn ensure_schema(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;

    let current = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!("event=db_migrate module=store status=ok from={current} to={SCHEMA_VERSION}");
    Ok(())
}

impl DocumentStore for SqliteStore {
    fn read_raw(&self, kind: DocumentKind) -> StoreResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE kind = ?1;",
                [kind.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn write_raw(&self, kind: DocumentKind, body: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO documents (kind, body) VALUES (?1, ?2)
             ON CONFLICT(kind) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![kind.as_str(), body],
        )?;
        Ok(())
    }
}
