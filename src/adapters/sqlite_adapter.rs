//! SQLite result cache.
//!
//! Stores the latest `AnalysisResult` per scenario as a JSON payload.

use crate::domain::error::RetrocastError;
use crate::domain::result::AnalysisResult;
use crate::ports::config_port::ConfigPort;
use crate::ports::result_port::ResultPort;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};

pub const DEFAULT_POOL_SIZE: i64 = 4;

pub struct SqliteResultStore {
    pool: Pool<SqliteConnectionManager>,
}

fn storage_err(e: impl std::fmt::Display) -> RetrocastError {
    RetrocastError::Storage {
        reason: e.to_string(),
    }
}

impl SqliteResultStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, RetrocastError> {
        let db_path = config
            .get_path("storage", "db_path")
            .ok_or_else(|| RetrocastError::ConfigMissing {
                section: "storage".into(),
                key: "db_path".into(),
            })?;

        let pool_size = config.get_int("storage", "pool_size", DEFAULT_POOL_SIZE);
        if !(1..=64).contains(&pool_size) {
            return Err(RetrocastError::ConfigInvalid {
                section: "storage".into(),
                key: "pool_size".into(),
                reason: format!("must be between 1 and 64, got {pool_size}"),
            });
        }

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size as u32)
            .build(manager)
            .map_err(storage_err)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, RetrocastError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(storage_err)?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn initialize_schema(&self) -> Result<(), RetrocastError> {
        let conn = self.pool.get().map_err(storage_err)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS analysis_results (
                scenario_id TEXT PRIMARY KEY,
                run_date TEXT NOT NULL,
                total_signals INTEGER NOT NULL,
                payload TEXT NOT NULL
            );",
        )
        .map_err(storage_err)?;
        Ok(())
    }
}

impl ResultPort for SqliteResultStore {
    fn save(&self, result: &AnalysisResult) -> Result<(), RetrocastError> {
        let payload = serde_json::to_string(result)?;
        let conn = self.pool.get().map_err(storage_err)?;
        conn.execute(
            "INSERT OR REPLACE INTO analysis_results (scenario_id, run_date, total_signals, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                result.scenario_id,
                result.run_date,
                result.total_signals as i64,
                payload
            ],
        )
        .map_err(storage_err)?;
        tracing::debug!(scenario_id = %result.scenario_id, "cached analysis result");
        Ok(())
    }

    fn latest(&self, scenario_id: &str) -> Result<Option<AnalysisResult>, RetrocastError> {
        let conn = self.pool.get().map_err(storage_err)?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM analysis_results WHERE scenario_id = ?1",
                params![scenario_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_err)?;

        payload
            .map(|json| serde_json::from_str(&json).map_err(RetrocastError::from))
            .transpose()
    }
}
