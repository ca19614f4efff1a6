//! Append-only scrape attempt log.

use std::path::{Path, PathBuf};

use rusqlite::{params, Row};

use super::{connect, parse_datetime, Result};
use crate::models::{AttemptOutcome, ScrapeAttempt};

/// SQLite-backed attempt log. Entries are never updated or deleted.
pub struct AttemptRepository {
    db_path: PathBuf,
}

impl AttemptRepository {
    /// Create a new attempt repository.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<rusqlite::Connection> {
        connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS scrape_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                site_id TEXT NOT NULL,
                url TEXT NOT NULL,
                outcome TEXT NOT NULL,
                message TEXT,
                latency_ms INTEGER NOT NULL,
                identity TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_attempts_site_created
                ON scrape_attempts(site_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_attempts_outcome
                ON scrape_attempts(site_id, outcome);
        "#,
        )?;
        Ok(())
    }

    /// Append one attempt entry and return its ID.
    pub fn log(&self, attempt: &ScrapeAttempt) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO scrape_attempts (
                site_id, url, outcome, message, latency_ms, identity, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                attempt.site_id,
                attempt.url,
                attempt.outcome.as_str(),
                attempt.message,
                attempt.latency_ms as i64,
                attempt.identity,
                attempt.created_at.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent attempts for a site, newest first.
    pub fn recent(&self, site_id: &str, limit: usize) -> Result<Vec<ScrapeAttempt>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM scrape_attempts
            WHERE site_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;
        let attempts = stmt
            .query_map(params![site_id, limit as i64], row_to_attempt)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attempts)
    }

    /// Attempt counts per outcome category for a site.
    pub fn outcome_counts(&self, site_id: &str) -> Result<Vec<(String, i64)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT outcome, COUNT(*) FROM scrape_attempts
            WHERE site_id = ?
            GROUP BY outcome
            ORDER BY outcome
            "#,
        )?;
        let counts = stmt
            .query_map(params![site_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}

fn row_to_attempt(row: &Row) -> rusqlite::Result<ScrapeAttempt> {
    Ok(ScrapeAttempt {
        id: row.get("id")?,
        site_id: row.get("site_id")?,
        url: row.get("url")?,
        outcome: AttemptOutcome::from_str(&row.get::<_, String>("outcome")?)
            .unwrap_or(AttemptOutcome::Error),
        message: row.get("message")?,
        latency_ms: row.get::<_, i64>("latency_ms")? as u64,
        identity: row.get("identity")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}
