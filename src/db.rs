//! Persistence: JSON model checkpoints and an SQLite history of finished games.

use crate::error::{Result, SnakeError};
use crate::network::Net;
use chrono::Local;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckpointMeta {
    /// Games finished when the checkpoint was taken.
    pub game: u32,
    /// Score that triggered the save.
    pub record: u32,
    pub saved_at: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub meta: CheckpointMeta,
    pub model: Net,
}

impl Checkpoint {
    pub fn new(game: u32, record: u32, model: Net) -> Self {
        Self {
            meta: CheckpointMeta { game, record, saved_at: Local::now().to_rfc3339() },
            model,
        }
    }
}

/// Write the checkpoint as JSON, creating parent directories.
pub fn save_checkpoint(path: &Path, checkpoint: &Checkpoint) -> Result<()> {
    let io_err = |source: std::io::Error| SnakeError::CheckpointIo { path: path.to_path_buf(), source };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let json = serde_json::to_string(checkpoint)
        .map_err(|source| SnakeError::CheckpointFormat { path: path.to_path_buf(), source })?;
    fs::write(path, json).map_err(io_err)
}

pub fn load_checkpoint(path: &Path) -> Result<Checkpoint> {
    let content = fs::read_to_string(path)
        .map_err(|source| SnakeError::CheckpointIo { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| SnakeError::CheckpointFormat { path: path.to_path_buf(), source })
}

/// One finished game.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub game: u32,
    pub score: u32,
    pub record: u32,
    pub mean_score: f64,
    pub epsilon: f64,
    pub steps: u64,
}

/// Append-only game history. Display data only; training never reads it back.
pub struct EpisodeLog {
    conn: Connection,
}

impl EpisodeLog {
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS episodes (
                id INTEGER PRIMARY KEY,
                game INTEGER NOT NULL,
                score INTEGER NOT NULL,
                record INTEGER NOT NULL,
                mean_score REAL NOT NULL,
                epsilon REAL NOT NULL,
                steps INTEGER NOT NULL,
                finished_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn insert(&self, r: &EpisodeRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO episodes (game, score, record, mean_score, epsilon, steps, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                r.game,
                r.score,
                r.record,
                r.mean_score,
                r.epsilon,
                r.steps as i64,
                Local::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM episodes", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    pub fn best_score(&self) -> Result<Option<u32>> {
        Ok(self
            .conn
            .query_row("SELECT MAX(score) FROM episodes", [], |row| row.get::<_, Option<u32>>(0))?)
    }

    /// Most recent `limit` games, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<EpisodeRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT game, score, record, mean_score, epsilon, steps
             FROM episodes ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(EpisodeRecord {
                game: row.get(0)?,
                score: row.get(1)?,
                record: row.get(2)?,
                mean_score: row.get(3)?,
                epsilon: row.get(4)?,
                steps: row.get::<_, i64>(5)? as u64,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
