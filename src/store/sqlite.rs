//! SQLite-backed aggregate store.
//!
//! One row per patient: the whole aggregate serialized as a JSON document
//! plus a bare version column. The compare-and-swap is a single conditional
//! `UPDATE ... WHERE version = ?` — SQLite's statement atomicity gives the
//! all-or-nothing commit the aggregate contract requires.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{CasOutcome, RecordStore, StoreError};
use crate::models::record::PatientRecord;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        configure_pragmas(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn configure_pragmas(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_initial.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql)
                .map_err(|e| StoreError::MigrationFailed {
                    version,
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, i64>(0)
    })
    .unwrap_or(0)
}

impl RecordStore for SqliteStore {
    fn get(&self, patient_id: Uuid) -> Result<Option<PatientRecord>, StoreError> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT doc FROM patient_records WHERE patient_id = ?1",
            params![patient_id.to_string()],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert(&self, record: &PatientRecord) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let doc = serde_json::to_string(record)?;
        let result = conn.execute(
            "INSERT INTO patient_records (patient_id, version, doc) VALUES (?1, ?2, ?3)",
            params![record.patient_id.to_string(), record.version as i64, doc],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::ConstraintViolation(format!(
                    "patient {} already registered",
                    record.patient_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn compare_and_swap(
        &self,
        expected_version: u64,
        record: &PatientRecord,
    ) -> Result<CasOutcome, StoreError> {
        let conn = self.lock()?;
        let doc = serde_json::to_string(record)?;
        let changed = conn.execute(
            "UPDATE patient_records
             SET version = ?1, doc = ?2, updated_at = datetime('now')
             WHERE patient_id = ?3 AND version = ?4",
            params![
                record.version as i64,
                doc,
                record.patient_id.to_string(),
                expected_version as i64
            ],
        )?;

        if changed > 0 {
            return Ok(CasOutcome::Committed);
        }

        // Lost the race (or the row never existed) — report what is stored.
        let actual = conn.query_row(
            "SELECT version FROM patient_records WHERE patient_id = ?1",
            params![record.patient_id.to_string()],
            |row| row.get::<_, i64>(0),
        );
        match actual {
            Ok(actual) => Ok(CasOutcome::VersionMismatch {
                actual: actual as u64,
            }),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::ConstraintViolation(
                format!("patient {} not registered", record.patient_id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<PatientRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT doc FROM patient_records ORDER BY patient_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for doc in rows {
            records.push(serde_json::from_str(&doc?)?);
        }
        Ok(records)
    }
}
