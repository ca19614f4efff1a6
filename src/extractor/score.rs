//! Confidence scoring for extraction results.

use crate::models::ExtractedListing;

use super::{plausible_mileage, plausible_price, plausible_year};

/// Number of required fields; a full score means all of title, price, year
/// and brand were found.
pub const MAX_SCORE: u32 = 4;

/// Scores below this are surfaced as low-confidence.
pub const LOW_CONFIDENCE_THRESHOLD: u32 = 3;

/// Compute the advisory quality score for an extraction result.
///
/// `score = presentCount({title, price, year, brand}) - penalties`, one
/// penalty point each for a present-but-implausible mileage, year, or price.
/// Clamped at 0.
pub fn quality_score(listing: &ExtractedListing) -> u32 {
    let mut score: i32 = 0;

    if listing.title.is_some() {
        score += 1;
    }
    if listing.price.is_some() {
        score += 1;
    }
    if listing.year.is_some() {
        score += 1;
    }
    if listing.brand.is_some() {
        score += 1;
    }

    // Defensive recheck of the plausibility ranges; extraction should never
    // let these through, but scoring does not trust that.
    if listing.mileage.is_some_and(|m| !plausible_mileage(m)) {
        score -= 1;
    }
    if listing.year.is_some_and(|y| !plausible_year(y)) {
        score -= 1;
    }
    if listing.price.is_some_and(|p| !plausible_price(p)) {
        score -= 1;
    }

    score.max(0) as u32
}

/// Whether a score should be flagged to downstream consumers.
pub fn is_low_confidence(score: u32) -> bool {
    score < LOW_CONFIDENCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_score() {
        let listing = ExtractedListing {
            title: Some("Toyota Corolla 2020".to_string()),
            price: Some(350000.0),
            year: Some(2020),
            brand: Some("Toyota".to_string()),
            ..Default::default()
        };
        assert_eq!(quality_score(&listing), 4);
        assert!(!is_low_confidence(quality_score(&listing)));
    }

    #[test]
    fn test_missing_fields_lower_score() {
        let listing = ExtractedListing {
            title: Some("Camioneta seminueva".to_string()),
            price: Some(250000.0),
            ..Default::default()
        };
        assert_eq!(quality_score(&listing), 2);
        assert!(is_low_confidence(quality_score(&listing)));
    }

    #[test]
    fn test_implausible_values_penalized() {
        let listing = ExtractedListing {
            title: Some("Ford Focus".to_string()),
            price: Some(350000.0),
            year: Some(1980),
            brand: Some("Ford".to_string()),
            mileage: Some(12),
            ..Default::default()
        };
        // 4 present - 2 penalties (year out of range, mileage below 50).
        assert_eq!(quality_score(&listing), 2);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let listing = ExtractedListing {
            mileage: Some(1),
            ..Default::default()
        };
        assert_eq!(quality_score(&listing), 0);
    }
}
