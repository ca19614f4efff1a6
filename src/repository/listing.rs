//! Listing repository: URL-keyed upsert storage for extracted listings.

use std::path::{Path, PathBuf};

use rusqlite::{params, Row};

use super::{connect, parse_datetime, to_option, Result};
use crate::models::{ExtractedListing, Listing, NormalizationStatus};

/// SQLite-backed listing store. At most one row per source URL.
pub struct ListingRepository {
    db_path: PathBuf,
}

impl ListingRepository {
    /// Create a new listing repository.
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
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                site_id TEXT NOT NULL,
                source_url TEXT NOT NULL UNIQUE,
                title TEXT,
                price REAL,
                price_original TEXT NOT NULL DEFAULT '',
                year INTEGER,
                mileage INTEGER,
                mileage_original TEXT NOT NULL DEFAULT '',
                brand TEXT,
                model TEXT,
                color TEXT,
                vehicle_type TEXT,
                transmission TEXT,
                fuel_type TEXT,
                location TEXT,
                description TEXT,
                contact_email TEXT,
                contact_phone TEXT,
                images TEXT NOT NULL DEFAULT '[]',
                characteristics TEXT NOT NULL DEFAULT '{}',
                raw TEXT NOT NULL DEFAULT '{}',
                content_hash TEXT NOT NULL,
                normalization_status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_listings_site
                ON listings(site_id);
            CREATE INDEX IF NOT EXISTS idx_listings_normalization
                ON listings(normalization_status);
        "#,
        )?;
        Ok(())
    }

    /// Find a listing by its source URL (exact match).
    pub fn get_by_url(&self, source_url: &str) -> Result<Option<Listing>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM listings WHERE source_url = ?")?;
        to_option(stmt.query_row(params![source_url], row_to_listing))
    }

    /// Insert a new listing and return its row ID.
    pub fn insert(&self, listing: &Listing) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO listings (
                site_id, source_url, title, price, price_original,
                year, mileage, mileage_original, brand, model,
                color, vehicle_type, transmission, fuel_type, location,
                description, contact_email, contact_phone, images,
                characteristics, raw, content_hash, normalization_status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                      ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23,
                      ?24, ?25)
            "#,
            params![
                listing.site_id,
                listing.source_url,
                listing.title,
                listing.price,
                listing.price_original,
                listing.year,
                listing.mileage,
                listing.mileage_original,
                listing.brand,
                listing.model,
                listing.color,
                listing.vehicle_type,
                listing.transmission,
                listing.fuel_type,
                listing.location,
                listing.description,
                listing.contact_email,
                listing.contact_phone,
                serde_json::to_string(&listing.images)?,
                serde_json::to_string(&listing.characteristics)?,
                serde_json::to_string(&listing.raw)?,
                listing.content_hash,
                listing.normalization_status.as_str(),
                listing.created_at.to_rfc3339(),
                listing.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Update an existing listing's mutable fields, keyed by source URL.
    pub fn update(&self, listing: &Listing) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            UPDATE listings SET
                title = ?1, price = ?2, price_original = ?3, year = ?4,
                mileage = ?5, mileage_original = ?6, brand = ?7, model = ?8,
                color = ?9, vehicle_type = ?10, transmission = ?11,
                fuel_type = ?12, location = ?13, description = ?14,
                contact_email = ?15, contact_phone = ?16, images = ?17,
                characteristics = ?18, raw = ?19, content_hash = ?20,
                updated_at = ?21
            WHERE source_url = ?22
            "#,
            params![
                listing.title,
                listing.price,
                listing.price_original,
                listing.year,
                listing.mileage,
                listing.mileage_original,
                listing.brand,
                listing.model,
                listing.color,
                listing.vehicle_type,
                listing.transmission,
                listing.fuel_type,
                listing.location,
                listing.description,
                listing.contact_email,
                listing.contact_phone,
                serde_json::to_string(&listing.images)?,
                serde_json::to_string(&listing.characteristics)?,
                serde_json::to_string(&listing.raw)?,
                listing.content_hash,
                listing.updated_at.to_rfc3339(),
                listing.source_url,
            ],
        )?;
        Ok(())
    }

    /// Insert-or-update keyed solely on source URL.
    ///
    /// Returns the persisted listing and whether a new row was created.
    pub fn upsert(
        &self,
        site_id: &str,
        source_url: &str,
        extracted: ExtractedListing,
        content_hash: String,
    ) -> Result<(Listing, bool)> {
        match self.get_by_url(source_url)? {
            Some(mut existing) => {
                existing.refresh(extracted, content_hash);
                self.update(&existing)?;
                Ok((existing, false))
            }
            None => {
                let mut listing =
                    Listing::from_extracted(site_id, source_url, extracted, content_hash);
                listing.id = self.insert(&listing)?;
                Ok((listing, true))
            }
        }
    }

    /// Total number of persisted listings.
    pub fn count(&self) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of listings for one site.
    pub fn count_by_site(&self, site_id: &str) -> Result<i64> {
        let conn = self.connect()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM listings WHERE site_id = ?",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn row_to_listing(row: &Row) -> rusqlite::Result<Listing> {
    Ok(Listing {
        id: row.get("id")?,
        site_id: row.get("site_id")?,
        source_url: row.get("source_url")?,
        title: row.get("title")?,
        price: row.get("price")?,
        price_original: row.get("price_original")?,
        year: row.get("year")?,
        mileage: row.get("mileage")?,
        mileage_original: row.get("mileage_original")?,
        brand: row.get("brand")?,
        model: row.get("model")?,
        color: row.get("color")?,
        vehicle_type: row.get("vehicle_type")?,
        transmission: row.get("transmission")?,
        fuel_type: row.get("fuel_type")?,
        location: row.get("location")?,
        description: row.get("description")?,
        contact_email: row.get("contact_email")?,
        contact_phone: row.get("contact_phone")?,
        images: serde_json::from_str(&row.get::<_, String>("images")?).unwrap_or_default(),
        characteristics: serde_json::from_str(&row.get::<_, String>("characteristics")?)
            .unwrap_or_default(),
        raw: serde_json::from_str(&row.get::<_, String>("raw")?).unwrap_or_default(),
        content_hash: row.get("content_hash")?,
        normalization_status: NormalizationStatus::from_str(
            &row.get::<_, String>("normalization_status")?,
        )
        .unwrap_or(NormalizationStatus::Pending),
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}
