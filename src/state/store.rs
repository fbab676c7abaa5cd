use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::blob::{jpeg, record};
use super::data::GenerationRecord;

/// Errors worth reporting upward from the store layer.
///
/// Only connectivity-level problems surface here; everything that goes wrong
/// inside a blob (bad root table, missing markers) is absorbed where it
/// happens and shows up as a skipped row or a missing thumbnail instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open history database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

/// The RecordStore is a read-only query layer over a history database.
///
/// It owns the connection exclusively; dropping the store releases the
/// handle. One logical reader issues one query at a time — there is no
/// locking here beyond what SQLite provides for its own statements.
pub struct RecordStore {
    conn: Connection,
    db_path: PathBuf,
}

impl RecordStore {
    /// Open a history database read-only.
    ///
    /// The file is never created and never written; a missing or unreadable
    /// file is the one failure callers should hear about (and then degrade
    /// to an empty listing).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open { path: db_path.clone(), source })?;

        Ok(RecordStore { conn, db_path })
    }

    /// Path this store was opened from
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Total number of generations in the database; 0 when the table is
    /// missing or unreadable.
    pub fn count(&self) -> usize {
        self.conn
            .query_row("SELECT COUNT(*) FROM generation_history", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n.max(0) as usize)
            .unwrap_or(0)
    }

    /// Fetch one page of generations, newest first.
    ///
    /// Rows whose blob cannot be decoded (invalid root table, vtable out of
    /// range) are skipped; one corrupt row never costs the rest of the page.
    pub fn fetch(&self, offset: usize, limit: usize) -> Vec<GenerationRecord> {
        let mut stmt = match self.conn.prepare(
            "SELECT rowid, lineage, logical_time, payload FROM generation_history \
             ORDER BY rowid DESC LIMIT ?1 OFFSET ?2",
        ) {
            Ok(stmt) => stmt,
            Err(e) => {
                eprintln!("⚠️  History query failed: {}", e);
                return Vec::new();
            }
        };

        let rows = stmt.query_map([limit as i64, offset as i64], |row| {
            let id: i64 = row.get(0)?;
            let lineage: i64 = row.get(1)?;
            let logical_time: i64 = row.get(2)?;
            let payload: Vec<u8> = row.get(3)?;
            Ok((id, lineage, logical_time, payload))
        });

        match rows {
            Ok(iter) => iter
                .filter_map(|r| r.ok())
                .filter_map(|(id, lineage, logical_time, payload)| {
                    record::decode_generation(id, lineage, logical_time, &payload)
                })
                .collect(),
            Err(e) => {
                eprintln!("⚠️  History query failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetch the thumbnail for a record by its preview ID.
    ///
    /// The reduced-resolution tier is tried first: when it has a matching
    /// row, its marker-scan result is returned without ever touching the
    /// full-resolution tier (the smaller blob decodes faster). Only a
    /// missing reduced-tier row falls through to the full-size table.
    /// All failure shapes resolve to None.
    pub fn fetch_thumbnail(&self, preview_id: i64) -> Option<Vec<u8>> {
        if let Some(blob) = self.tier_blob("thumbnail_history", preview_id) {
            return jpeg::extract_jpeg(&blob);
        }
        let blob = self.tier_blob("image_history", preview_id)?;
        jpeg::extract_jpeg(&blob)
    }

    /// Query one thumbnail tier. A missing table or missing row are both
    /// normal ("no row"), not errors.
    fn tier_blob(&self, table: &str, preview_id: i64) -> Option<Vec<u8>> {
        let sql = format!("SELECT payload FROM {} WHERE preview_id = ?1", table);
        let mut stmt = self.conn.prepare(&sql).ok()?;
        stmt.query_row([preview_id], |row| row.get::<_, Vec<u8>>(0))
            .optional()
            .ok()?
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}
