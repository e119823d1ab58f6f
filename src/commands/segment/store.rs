use rusqlite::{Connection, OptionalExtension, params};

use crate::error::PersistenceError;
use crate::model::Segment;
use crate::util::now_utc_string;

pub const DB_SCHEMA_VERSION: &str = "0.1.0";

pub fn configure_connection(connection: &Connection) -> Result<(), PersistenceError> {
    connection.pragma_update(None, "journal_mode", "WAL")?;
    connection.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<(), PersistenceError> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS segments (
          id INTEGER NOT NULL,
          batch_id TEXT NOT NULL,
          title TEXT NOT NULL,
          parent TEXT,
          start_index INTEGER NOT NULL,
          end_index INTEGER NOT NULL,
          content TEXT NOT NULL,
          outline_number TEXT NOT NULL,
          parent_outline_number TEXT,
          tables_json TEXT NOT NULL,
          created_at TEXT NOT NULL,
          PRIMARY KEY (batch_id, id)
        );

        CREATE INDEX IF NOT EXISTS idx_segments_batch ON segments(batch_id);
        ",
    )?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

pub fn insert_segments(
    connection: &mut Connection,
    segments: &[Segment],
) -> Result<usize, PersistenceError> {
    let tx = connection.transaction()?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO segments(
              id, batch_id, title, parent, start_index, end_index,
              content, outline_number, parent_outline_number, tables_json, created_at
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
        )?;

        let created_at = now_utc_string();
        for segment in segments {
            let tables_json = serde_json::to_string(&segment.tables)?;
            statement.execute(params![
                segment.id as i64,
                &segment.batch_id,
                &segment.title,
                &segment.parent,
                segment.start_index as i64,
                segment.end_index as i64,
                &segment.content,
                &segment.outline_number,
                &segment.parent_outline_number,
                tables_json,
                &created_at,
            ])?;
        }
    }

    tx.commit()?;
    Ok(segments.len())
}

/// Reads one batch back in outline/position order, regardless of how rows
/// ended up ordered in storage.
pub fn select_segments_by_batch(
    connection: &Connection,
    batch_id: &str,
) -> Result<Vec<Segment>, PersistenceError> {
    let mut statement = connection.prepare(
        "
        SELECT id, batch_id, title, parent, start_index, end_index,
               content, outline_number, parent_outline_number, tables_json
        FROM segments
        WHERE batch_id = ?1
        ORDER BY start_index
        ",
    )?;

    let mut rows = statement.query([batch_id])?;
    let mut segments = Vec::new();

    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let start_index: i64 = row.get(4)?;
        let end_index: i64 = row.get(5)?;
        let tables_json: String = row.get(9)?;
        let tables: Vec<Vec<Vec<String>>> = serde_json::from_str(&tables_json)?;

        segments.push(Segment {
            id: id as u64,
            batch_id: row.get(1)?,
            title: row.get(2)?,
            parent: row.get(3)?,
            start_index: start_index as usize,
            end_index: end_index as usize,
            content: row.get(6)?,
            outline_number: row.get(7)?,
            parent_outline_number: row.get(8)?,
            tables,
        });
    }

    Ok(segments)
}

pub fn count_batches(connection: &Connection) -> Result<i64, PersistenceError> {
    let count = connection
        .query_row("SELECT COUNT(DISTINCT batch_id) FROM segments", [], |row| {
            row.get(0)
        })
        .optional()?
        .unwrap_or(0);
    Ok(count)
}

pub fn count_segments(connection: &Connection) -> Result<i64, PersistenceError> {
    let count = connection
        .query_row("SELECT COUNT(*) FROM segments", [], |row| row.get(0))
        .optional()?
        .unwrap_or(0);
    Ok(count)
}
