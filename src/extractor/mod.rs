//! Heuristic field extraction for vehicle listing pages.
//!
//! Turns raw HTML into a best-effort [`ExtractedListing`]. Every field runs
//! an ordered strategy cascade: structured markup first, labeled text and
//! global scans last. A syntactic match that fails its plausibility range is
//! discarded and the cascade moves on; a missing field is never an error.
//!
//! Year is the exception to first-match-wins: years recur all over a listing
//! page (title, attribute table, structured data), so every candidate is
//! collected and the most frequent one wins, ties broken toward the most
//! recent year.

mod brands;
mod fingerprint;
mod patterns;
mod score;

pub use brands::{extract_brand_model, BRANDS};
pub use fingerprint::content_hash;
pub use score::{is_low_confidence, quality_score, LOW_CONFIDENCE_THRESHOLD, MAX_SCORE};

use std::collections::{BTreeMap, HashSet};

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::models::{ExtractedListing, SiteConfig};
use patterns::{parse_mileage, parse_price};

/// Cap on extracted image URLs per listing.
pub const MAX_IMAGES: usize = 10;

/// Inclusive plausible price range, in domain currency units.
pub const PRICE_MIN: f64 = 10_000.0;
pub const PRICE_MAX: f64 = 15_000_000.0;

/// Inclusive plausible mileage range. The lower bound deliberately excludes
/// trivially wrong single-digit matches.
pub const MILEAGE_MIN: i64 = 50;
pub const MILEAGE_MAX: i64 = 500_000;

/// Inclusive plausible model-year range.
pub const YEAR_MIN: i32 = 1990;
pub const YEAR_MAX: i32 = 2025;

pub fn plausible_price(price: f64) -> bool {
    (PRICE_MIN..=PRICE_MAX).contains(&price)
}

pub fn plausible_mileage(mileage: i64) -> bool {
    (MILEAGE_MIN..=MILEAGE_MAX).contains(&mileage)
}

pub fn plausible_year(year: i32) -> bool {
    (YEAR_MIN..=YEAR_MAX).contains(&year)
}

/// Normalize whitespace and decode the entities that show up in listing
/// markup.
pub fn clean_text(s: &str) -> String {
    let decoded = s
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heuristic listing extractor.
///
/// Stateless; constructed once and injected wherever extraction happens so
/// tests can drive it directly.
#[derive(Debug, Default)]
pub struct ListingExtractor;

impl ListingExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a best-effort listing from page HTML.
    ///
    /// Always returns a (possibly sparse) result; the site config only
    /// contributes advisory selector hints and the media-host filter.
    pub fn extract(&self, html: &str, config: &SiteConfig) -> ExtractedListing {
        let document = Html::parse_document(html);

        let title = extract_title(&document, html, hinted_text(&document, config, "title"));
        let (price, price_original) =
            extract_price(html, hinted_text(&document, config, "price"));
        let year = extract_year(html);
        let (mileage, mileage_original) =
            extract_mileage(html, hinted_text(&document, config, "mileage"));

        // Brand matching only makes sense against a title.
        let (brand, model) = match title.as_deref() {
            Some(t) => extract_brand_model(t),
            None => (None, None),
        };

        let location = extract_location(html, hinted_text(&document, config, "location"));
        let images = extract_images(html, &config.media_hosts);
        let description = extract_description(&document, html);
        let characteristics = extract_characteristics(html);

        let color = characteristic(&characteristics, &["color"]);
        let transmission = characteristic(
            &characteristics,
            &["transmisión", "transmision", "transmission", "caja"],
        );
        let fuel_type = characteristic(&characteristics, &["combustible", "fuel"]);
        let vehicle_type = characteristic(
            &characteristics,
            &["tipo", "tipo de vehículo", "carrocería", "carroceria", "body"],
        );

        let contact_email = extract_email(html);
        let contact_phone = extract_phone(html);

        if price.is_none() {
            debug!("no plausible price match");
        }
        if year.is_none() {
            debug!("no plausible year match");
        }

        let mut listing = ExtractedListing {
            title,
            price,
            price_original,
            year,
            mileage,
            mileage_original,
            brand,
            model,
            color,
            vehicle_type,
            transmission,
            fuel_type,
            location,
            description,
            contact_email,
            contact_phone,
            images,
            characteristics,
            raw: BTreeMap::new(),
        };
        listing.raw = raw_bag(&listing);
        listing
    }
}

/// Resolve an advisory selector hint to cleaned element text.
fn hinted_text(document: &Html, config: &SiteConfig, field: &str) -> Option<String> {
    let selector_str = config.selector_hints.get(field)?;
    let selector = Selector::parse(selector_str).ok()?;
    let element = document.select(&selector).next()?;
    let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

fn valid_title(candidate: &str) -> bool {
    candidate.trim().chars().count() > 5
}

/// Title cascade: hinted selector, semantic heading, page title, structured
/// data.
fn extract_title(document: &Html, html: &str, hint: Option<String>) -> Option<String> {
    if let Some(hinted) = hint {
        if valid_title(&hinted) {
            return Some(hinted);
        }
    }

    for selector_str in ["h1", "title"] {
        let selector = Selector::parse(selector_str).unwrap();
        for element in document.select(&selector) {
            let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
            if valid_title(&text) {
                return Some(text);
            }
        }
    }

    for pattern in patterns::TITLE_STRUCTURED.iter() {
        if let Some(caps) = pattern.captures(html) {
            let text = clean_text(&caps[1]);
            if valid_title(&text) {
                return Some(text);
            }
        }
    }

    None
}

/// Price cascade. Returns the parsed price and the untouched matched text.
fn extract_price(html: &str, hint: Option<String>) -> (Option<f64>, String) {
    if let Some(hinted) = hint {
        if let Some(price) = parse_price(&hinted).filter(|p| plausible_price(*p)) {
            return (Some(price), hinted);
        }
    }

    for pattern in patterns::PRICE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(html) {
            let matched = caps[1].to_string();
            if let Some(price) = parse_price(&matched).filter(|p| plausible_price(*p)) {
                return (Some(price), matched);
            }
        }
    }

    (None, String::new())
}

/// Collect every year candidate across all patterns, then vote.
///
/// Most frequent value wins; ties break toward the larger year.
fn extract_year(html: &str) -> Option<i32> {
    let mut votes: BTreeMap<i32, usize> = BTreeMap::new();
    for pattern in patterns::YEAR_PATTERNS.iter() {
        for caps in pattern.captures_iter(html) {
            if let Ok(year) = caps[1].parse::<i32>() {
                if plausible_year(year) {
                    *votes.entry(year).or_insert(0) += 1;
                }
            }
        }
    }
    votes.into_iter().max_by_key(|&(year, count)| (count, year)).map(|(year, _)| year)
}

/// Mileage cascade. Returns the parsed value and the untouched matched text.
fn extract_mileage(html: &str, hint: Option<String>) -> (Option<i64>, String) {
    if let Some(hinted) = hint {
        if let Some(mileage) = parse_mileage(&hinted).filter(|m| plausible_mileage(*m)) {
            return (Some(mileage), hinted);
        }
    }

    for pattern in patterns::MILEAGE_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(html) {
            let matched = caps[1].to_string();
            if let Some(mileage) = parse_mileage(&matched).filter(|m| plausible_mileage(*m)) {
                return (Some(mileage), matched);
            }
        }
    }

    (None, String::new())
}

fn valid_location(candidate: &str) -> bool {
    let len = candidate.chars().count();
    (3..=100).contains(&len)
}

/// Location cascade: structured address, markup classes, labeled text.
fn extract_location(html: &str, hint: Option<String>) -> Option<String> {
    if let Some(hinted) = hint {
        if valid_location(&hinted) {
            return Some(hinted);
        }
    }

    // Locality plus region reads better than either alone.
    if let Some(caps) = patterns::LOCATION_PATTERNS[0].captures(html) {
        let mut location = clean_text(&caps[1]);
        if let Some(region) = patterns::LOCATION_PATTERNS[1]
            .captures(html)
            .map(|caps| clean_text(&caps[1]))
        {
            if !region.is_empty() && region != location {
                location = format!("{}, {}", location, region);
            }
        }
        if valid_location(&location) {
            return Some(location);
        }
    }

    for pattern in patterns::LOCATION_PATTERNS[1..].iter() {
        if let Some(caps) = pattern.captures(html) {
            let location = clean_text(&caps[1]);
            if valid_location(&location) {
                return Some(location);
            }
        }
    }

    None
}

/// Whether an image URL belongs to one of the site's media hosts.
fn on_media_host(url: &str, media_hosts: &[String]) -> bool {
    if media_hosts.is_empty() {
        return true;
    }
    let host = match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_lowercase)) {
        Some(host) => host,
        None => return false,
    };
    media_hosts
        .iter()
        .any(|allowed| host == allowed.to_lowercase() || host.ends_with(&format!(".{}", allowed.to_lowercase())))
}

/// Scan for listing photos: absolute image URLs, minus obvious non-listing
/// assets, restricted to the site's media hosts, deduplicated, capped.
fn extract_images(html: &str, media_hosts: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for found in patterns::IMAGE_URL.find_iter(html) {
        let url = found.as_str();
        let lowered = url.to_lowercase();
        if patterns::IMAGE_EXCLUDE_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
        {
            continue;
        }
        if !on_media_host(url, media_hosts) {
            continue;
        }
        if seen.insert(lowered) {
            images.push(url.to_string());
            if images.len() >= MAX_IMAGES {
                break;
            }
        }
    }

    images
}

/// Description: meta tags first, then structured data.
fn extract_description(document: &Html, html: &str) -> Option<String> {
    for selector_str in [
        r#"meta[property="og:description"]"#,
        r#"meta[name="description"]"#,
    ] {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(content) = document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("content"))
        {
            let text = clean_text(content);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    patterns::DESCRIPTION_STRUCTURED
        .captures(html)
        .map(|caps| clean_text(&caps[1]))
        .filter(|text| !text.is_empty())
}

/// Scan label/value markup shapes into the characteristics map.
fn extract_characteristics(html: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for pattern in patterns::CHARACTERISTIC_PATTERNS.iter() {
        for caps in pattern.captures_iter(html) {
            let key = clean_text(&caps[1]).to_lowercase();
            let value = clean_text(&caps[2]);
            if key.is_empty() || value.is_empty() {
                continue;
            }
            map.entry(key).or_insert(value);
        }
    }
    map
}

/// Look up the first matching characteristic key.
fn characteristic(map: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key).cloned())
}

fn extract_email(html: &str) -> Option<String> {
    patterns::EMAIL
        .find_iter(html)
        .map(|found| found.as_str().to_string())
        .find(|candidate| {
            let lowered = candidate.to_lowercase();
            !["png", "jpg", "jpeg", "gif", "webp", "svg"]
                .iter()
                .any(|ext| lowered.ends_with(ext))
        })
}

fn extract_phone(html: &str) -> Option<String> {
    patterns::PHONE
        .find_iter(html)
        .map(|found| found.as_str().trim().to_string())
        .find(|candidate| candidate.chars().filter(|c| c.is_ascii_digit()).count() >= 10)
}

/// Snapshot every extracted value into the raw bag for traceability.
fn raw_bag(listing: &ExtractedListing) -> BTreeMap<String, serde_json::Value> {
    let mut raw = BTreeMap::new();
    let mut put = |key: &str, value: serde_json::Value| {
        if !value.is_null() {
            raw.insert(key.to_string(), value);
        }
    };

    put("title", serde_json::json!(listing.title));
    put("price", serde_json::json!(listing.price));
    put("price_original", serde_json::json!(listing.price_original));
    put("year", serde_json::json!(listing.year));
    put("mileage", serde_json::json!(listing.mileage));
    put("mileage_original", serde_json::json!(listing.mileage_original));
    put("brand", serde_json::json!(listing.brand));
    put("model", serde_json::json!(listing.model));
    put("color", serde_json::json!(listing.color));
    put("vehicle_type", serde_json::json!(listing.vehicle_type));
    put("transmission", serde_json::json!(listing.transmission));
    put("fuel_type", serde_json::json!(listing.fuel_type));
    put("location", serde_json::json!(listing.location));
    put("description", serde_json::json!(listing.description));
    put("contact_email", serde_json::json!(listing.contact_email));
    put("contact_phone", serde_json::json!(listing.contact_phone));
    put("images", serde_json::json!(listing.images));
    put("characteristics", serde_json::json!(listing.characteristics));
    raw
}
