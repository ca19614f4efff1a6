//! Content fingerprinting for change detection.

use sha2::{Digest, Sha256};

use crate::models::ExtractedListing;

/// Compute the SHA-256 digest of an extraction result.
///
/// The digest is taken over the canonical JSON serialization; struct fields
/// serialize in declaration order and the listing's maps are ordered, so
/// identical extractions always produce identical digests.
pub fn content_hash(listing: &ExtractedListing) -> String {
    let serialized = serde_json::to_string(listing).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let listing = ExtractedListing {
            title: Some("Honda Civic 2019".to_string()),
            price: Some(280000.0),
            year: Some(2019),
            ..Default::default()
        };
        let first = content_hash(&listing);
        let second = content_hash(&listing);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64); // SHA-256 produces 64 hex chars
    }

    #[test]
    fn test_any_field_change_changes_hash() {
        let base = ExtractedListing {
            title: Some("Honda Civic 2019".to_string()),
            price: Some(280000.0),
            ..Default::default()
        };
        let mut changed = base.clone();
        changed.price = Some(279000.0);
        assert_ne!(content_hash(&base), content_hash(&changed));

        let mut changed = base.clone();
        changed.images = vec!["https://img.example.com/1.jpg".to_string()];
        assert_ne!(content_hash(&base), content_hash(&changed));
    }
}
