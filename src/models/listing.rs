//! Listing models for vehicle advertisement storage.
//!
//! Extracted listings are transient per-fetch records; persisted listings
//! are keyed by source URL and carry a content hash so downstream change
//! detection can tell whether a re-fetched page actually changed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalization state of a persisted listing.
///
/// Advanced by an external normalization process; this subsystem only ever
/// writes `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStatus {
    Pending,
    Normalized,
    Failed,
}

impl NormalizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Normalized => "normalized",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "normalized" => Some(Self::Normalized),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Best-effort extraction result for one listing page.
///
/// Every field is optional; a sparse result is valid output. Numeric fields
/// are either `None` or within their plausibility range. The `*_original`
/// fields preserve the untouched matched substring for audit even after
/// numeric parsing.
///
/// Maps use `BTreeMap` so the serialized form, and therefore the content
/// fingerprint, is stable for identical input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedListing {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub price_original: String,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub mileage_original: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub vehicle_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Deduplicated image URLs, capped at [`crate::extractor::MAX_IMAGES`].
    pub images: Vec<String>,
    /// Label/value pairs scanned from attribute tables on the page.
    pub characteristics: BTreeMap<String, String>,
    /// Full raw extracted bag for traceability.
    pub raw: BTreeMap<String, serde_json::Value>,
}

/// A persisted vehicle listing, keyed by source URL (unique).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Database row ID.
    pub id: i64,
    /// Site this listing was scraped from.
    pub site_id: String,
    /// Canonical URL of the source advertisement.
    pub source_url: String,
    pub title: Option<String>,
    pub price: Option<f64>,
    pub price_original: String,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub mileage_original: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub vehicle_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub images: Vec<String>,
    pub characteristics: BTreeMap<String, String>,
    pub raw: BTreeMap<String, serde_json::Value>,
    /// Digest of the extracted record at the time of the last fetch.
    pub content_hash: String,
    pub normalization_status: NormalizationStatus,
    /// When the listing was first seen.
    pub created_at: DateTime<Utc>,
    /// When the listing was last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Map an extraction result into a new persisted record.
    pub fn from_extracted(
        site_id: &str,
        source_url: &str,
        extracted: ExtractedListing,
        content_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Set by database
            site_id: site_id.to_string(),
            source_url: source_url.to_string(),
            title: extracted.title,
            price: extracted.price,
            price_original: extracted.price_original,
            year: extracted.year,
            mileage: extracted.mileage,
            mileage_original: extracted.mileage_original,
            brand: extracted.brand,
            model: extracted.model,
            color: extracted.color,
            vehicle_type: extracted.vehicle_type,
            transmission: extracted.transmission,
            fuel_type: extracted.fuel_type,
            location: extracted.location,
            description: extracted.description,
            contact_email: extracted.contact_email,
            contact_phone: extracted.contact_phone,
            images: extracted.images,
            characteristics: extracted.characteristics,
            raw: extracted.raw,
            content_hash,
            normalization_status: NormalizationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields with a fresh extraction result.
    ///
    /// Keeps `id`, `site_id`, `source_url`, `created_at` and the
    /// normalization status, stamps `updated_at`.
    pub fn refresh(&mut self, extracted: ExtractedListing, content_hash: String) {
        self.title = extracted.title;
        self.price = extracted.price;
        self.price_original = extracted.price_original;
        self.year = extracted.year;
        self.mileage = extracted.mileage;
        self.mileage_original = extracted.mileage_original;
        self.brand = extracted.brand;
        self.model = extracted.model;
        self.color = extracted.color;
        self.vehicle_type = extracted.vehicle_type;
        self.transmission = extracted.transmission;
        self.fuel_type = extracted.fuel_type;
        self.location = extracted.location;
        self.description = extracted.description;
        self.contact_email = extracted.contact_email;
        self.contact_phone = extracted.contact_phone;
        self.images = extracted.images;
        self.characteristics = extracted.characteristics;
        self.raw = extracted.raw;
        self.content_hash = content_hash;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extracted_starts_pending() {
        let extracted = ExtractedListing {
            title: Some("Toyota Corolla".to_string()),
            price: Some(350000.0),
            ..Default::default()
        };
        let listing = Listing::from_extracted(
            "vitrina",
            "https://example.com/anuncio/1",
            extracted,
            "abc123".to_string(),
        );
        assert_eq!(listing.normalization_status, NormalizationStatus::Pending);
        assert_eq!(listing.content_hash, "abc123");
        assert_eq!(listing.created_at, listing.updated_at);
    }

    #[test]
    fn test_refresh_keeps_identity() {
        let listing = Listing::from_extracted(
            "vitrina",
            "https://example.com/anuncio/1",
            ExtractedListing::default(),
            "old".to_string(),
        );
        let created_at = listing.created_at;

        let mut listing = listing;
        listing.refresh(
            ExtractedListing {
                title: Some("Nissan Versa 2021".to_string()),
                ..Default::default()
            },
            "new".to_string(),
        );

        assert_eq!(listing.source_url, "https://example.com/anuncio/1");
        assert_eq!(listing.created_at, created_at);
        assert_eq!(listing.content_hash, "new");
        assert_eq!(listing.title.as_deref(), Some("Nissan Versa 2021"));
    }

    #[test]
    fn test_normalization_status_round_trip() {
        for status in [
            NormalizationStatus::Pending,
            NormalizationStatus::Normalized,
            NormalizationStatus::Failed,
        ] {
            assert_eq!(
                NormalizationStatus::from_str(status.as_str()),
                Some(status)
            );
        }
        assert_eq!(NormalizationStatus::from_str("bogus"), None);
    }
}
