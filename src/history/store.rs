//! SQLite-backed prediction history. One row per prediction with its inputs.

use crate::predictor::PredictionResult;
use crate::query::Query;
use crate::risk::RiskLevel;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: String,
    /// Unix millis
    pub created_at: i64,
    pub query: Query,
    pub risk: RiskLevel,
    pub confidence: u8,
    pub details: String,
}

pub struct PredictionLog {
    conn: Mutex<Connection>,
}

impl PredictionLog {
    /// Open or create DB at path.
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS risk_predictions (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                depth REAL NOT NULL,
                magnitude REAL NOT NULL,
                days_since_last INTEGER NOT NULL,
                risk_level TEXT NOT NULL,
                confidence INTEGER NOT NULL,
                prediction_details TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_predictions_created ON risk_predictions(created_at);
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record one prediction; returns the generated id.
    pub fn insert(&self, query: &Query, result: &PredictionResult) -> Result<String, rusqlite::Error> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().timestamp_millis();
        self.conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .execute(
                "INSERT INTO risk_predictions (id, created_at, latitude, longitude, depth, magnitude, \
                 days_since_last, risk_level, confidence, prediction_details) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    created_at,
                    query.latitude,
                    query.longitude,
                    query.depth,
                    query.magnitude,
                    query.days_since_last_eq,
                    result.risk.as_str(),
                    result.confidence,
                    result.details,
                ],
            )?;
        Ok(id)
    }

    /// Most recent predictions, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(
            "SELECT id, created_at, latitude, longitude, depth, magnitude, days_since_last, \
             risk_level, confidence, prediction_details \
             FROM risk_predictions ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            let level: String = row.get(7)?;
            let risk = level
                .parse::<RiskLevel>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
            Ok(HistoryRecord {
                id: row.get(0)?,
                created_at: row.get(1)?,
                query: Query {
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    depth: row.get(4)?,
                    magnitude: row.get(5)?,
                    days_since_last_eq: row.get(6)?,
                },
                risk,
                confidence: row.get(8)?,
                details: row.get(9)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Retention: delete predictions older than the given unix millis
    pub fn prune_before(&self, ts: i64) -> Result<u64, rusqlite::Error> {
        let n = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .execute("DELETE FROM risk_predictions WHERE created_at < ?1", params![ts])?;
        Ok(n as u64)
    }
}
