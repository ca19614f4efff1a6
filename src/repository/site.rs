//! Site configuration store.
//!
//! Configurations are owned by an external editor; this subsystem reads
//! them and writes back only the last-run timestamp.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{connect, parse_datetime, parse_datetime_opt, to_option, Result};
use crate::models::SiteConfig;

/// SQLite-backed site configuration repository.
pub struct SiteConfigRepository {
    db_path: PathBuf,
}

impl SiteConfigRepository {
    /// Create a new site configuration repository.
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
            CREATE TABLE IF NOT EXISTS sites (
                site_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                config TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_run_at TEXT
            );
        "#,
        )?;
        Ok(())
    }

    /// Fetch the active configuration for a site.
    pub fn get(&self, site_id: &str) -> Result<Option<SiteConfig>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM sites WHERE site_id = ?")?;
        to_option(stmt.query_row(params![site_id], row_to_config))
    }

    /// All configured sites.
    pub fn get_all(&self) -> Result<Vec<SiteConfig>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM sites ORDER BY site_id")?;
        let sites = stmt
            .query_map([], row_to_config)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sites)
    }

    /// Save a configuration (insert or replace by site ID).
    pub fn save(&self, config: &SiteConfig) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO sites (site_id, name, config, created_at, last_run_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(site_id) DO UPDATE SET
                name = excluded.name,
                config = excluded.config,
                last_run_at = excluded.last_run_at
            "#,
            params![
                config.site_id,
                config.name,
                serde_json::to_string(config)?,
                config.created_at.to_rfc3339(),
                config.last_run_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Stamp the last batch run for a site. Best effort; callers may ignore
    /// the result.
    pub fn update_last_run(&self, site_id: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE sites SET last_run_at = ? WHERE site_id = ?",
            params![timestamp.to_rfc3339(), site_id],
        )?;
        Ok(())
    }
}

fn row_to_config(row: &rusqlite::Row) -> rusqlite::Result<SiteConfig> {
    // The config column is the serialized SiteConfig; identity and
    // timestamps come from their own columns so they stay queryable.
    let mut config: SiteConfig =
        serde_json::from_str(&row.get::<_, String>("config")?).unwrap_or_else(|_| {
            SiteConfig::new(&row.get::<_, String>("site_id").unwrap_or_default())
        });
    config.site_id = row.get("site_id")?;
    config.name = row.get("name")?;
    config.created_at = parse_datetime(&row.get::<_, String>("created_at")?);
    config.last_run_at = parse_datetime_opt(row.get::<_, Option<String>>("last_run_at")?);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let repo = SiteConfigRepository::new(&dir.path().join("test.db")).unwrap();

        let mut config = SiteConfig::new("vitrina");
        config.name = "Vitrina Autos".to_string();
        config.delay_seconds = 3.5;
        config.user_agents = vec!["TestAgent/1.0".to_string()];
        config
            .headers
            .insert("Accept-Language".to_string(), "es-MX".to_string());
        config.media_hosts = vec!["vitrina.mx".to_string()];
        repo.save(&config).unwrap();

        let loaded = repo.get("vitrina").unwrap().unwrap();
        assert_eq!(loaded.name, "Vitrina Autos");
        assert_eq!(loaded.delay_seconds, 3.5);
        assert_eq!(loaded.user_agents, vec!["TestAgent/1.0".to_string()]);
        assert_eq!(
            loaded.headers.get("Accept-Language").map(String::as_str),
            Some("es-MX")
        );
        assert!(loaded.last_run_at.is_none());

        assert!(repo.get("desconocido").unwrap().is_none());
    }

    #[test]
    fn test_update_last_run() {
        let dir = tempdir().unwrap();
        let repo = SiteConfigRepository::new(&dir.path().join("test.db")).unwrap();
        repo.save(&SiteConfig::new("vitrina")).unwrap();

        let stamp = Utc::now();
        repo.update_last_run("vitrina", stamp).unwrap();

        let loaded = repo.get("vitrina").unwrap().unwrap();
        let recorded = loaded.last_run_at.unwrap();
        assert_eq!(recorded.to_rfc3339(), stamp.to_rfc3339());
    }

    #[test]
    fn test_get_all_sorted() {
        let dir = tempdir().unwrap();
        let repo = SiteConfigRepository::new(&dir.path().join("test.db")).unwrap();
        repo.save(&SiteConfig::new("beta")).unwrap();
        repo.save(&SiteConfig::new("alfa")).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].site_id, "alfa");
    }
}
