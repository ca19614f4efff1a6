//! Regex pattern cascades for heuristic field extraction.
//!
//! Each field gets an ordered list of patterns, tried against the raw page
//! text. Patterns only establish syntactic candidates; plausibility
//! validation happens in the caller so the cascades stay independently
//! testable.

use std::sync::LazyLock;

use regex::Regex;

/// Structured-data title, tried after the DOM strategies.
pub static TITLE_STRUCTURED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // og:title meta, either attribute order
        Regex::new(r#"(?i)<meta[^>]+property="og:title"[^>]+content="([^"]+)""#).unwrap(),
        Regex::new(r#"(?i)<meta[^>]+content="([^"]+)"[^>]+property="og:title""#).unwrap(),
        // JSON-LD vehicle name
        Regex::new(r#""name"\s*:\s*"([^"]{6,200})""#).unwrap(),
    ]
});

/// Price candidates, in priority order.
pub static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Money-amount markup: class names containing "price"/"precio"
        Regex::new(r#"(?i)class="[^"]*(?:price|precio)[^"]*"[^>]*>[^<0-9$]*\$?\s*([0-9][0-9.,]*)"#)
            .unwrap(),
        // Structured-data price fields
        Regex::new(r#""price"\s*:\s*"?([0-9][0-9.,]*)"#).unwrap(),
        // Currency-symbol-prefixed number
        Regex::new(r"\$\s*([0-9]{1,3}(?:[.,][0-9]{3})+(?:\.[0-9]{2})?|[0-9]{1,8})").unwrap(),
        // Labeled price text
        Regex::new(r"(?i)precio\D{0,40}?([0-9][0-9.,]*)").unwrap(),
    ]
});

/// Year candidates. All patterns contribute to the vote, not just the first.
pub static YEAR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Structured-data model year fields
        Regex::new(r#""(?:vehicleModelDate|productionDate|modelDate|yearOfManufacture)"\s*:\s*"?([0-9]{4})"#)
            .unwrap(),
        // Labeled year text
        Regex::new(r"(?i)(?:a[ñn]o|modelo|year)\D{0,10}([0-9]{4})").unwrap(),
        // Global 4-digit scan; the plausibility range discards street numbers etc.
        Regex::new(r"\b(19[0-9]{2}|20[0-9]{2})\b").unwrap(),
    ]
});

/// Mileage candidates, in priority order.
pub static MILEAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Attribute-table cells
        Regex::new(r"(?i)<td[^>]*>\s*([0-9][0-9.,]*)\s*(?:km|kms)\b").unwrap(),
        // Unit-suffixed numbers anywhere in the text
        Regex::new(r"(?i)([0-9][0-9.,]*)\s*(?:km|kms|kil[oó]metros)\b").unwrap(),
        // Labeled mileage text
        Regex::new(r"(?i)kilometraje\D{0,40}?([0-9][0-9.,]*)").unwrap(),
        // Structured-data odometer
        Regex::new(r#""mileageFromOdometer"\D{0,40}?([0-9][0-9.,]*)"#).unwrap(),
    ]
});

/// Location candidates, in priority order.
pub static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Structured-data address fields
        Regex::new(r#""addressLocality"\s*:\s*"([^"]+)""#).unwrap(),
        Regex::new(r#""addressRegion"\s*:\s*"([^"]+)""#).unwrap(),
        // Markup classes
        Regex::new(r#"(?i)class="[^"]*(?:location|ubicacion)[^"]*"[^>]*>([^<]+)<"#).unwrap(),
        // Labeled text
        Regex::new(r"(?i)(?:ubicaci[oó]n|location|se vende en|vendedor en)\s*:?\s*([^<\n]{3,100})")
            .unwrap(),
    ]
});

/// Absolute URLs ending in a common image extension.
pub static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^\s"'<>\\]+\.(?:jpe?g|png|webp|gif)"#).unwrap()
});

/// URL substrings that mark non-listing imagery.
pub const IMAGE_EXCLUDE_MARKERS: &[&str] = &["logo", "icon", "favicon", "sprite", "banner"];

/// Description sources after the DOM meta strategies.
pub static DESCRIPTION_STRUCTURED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""description"\s*:\s*"([^"]{20,2000})""#).unwrap());

/// Best-effort contact patterns.
pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

pub static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?52[\s.-]?)?(?:\(\d{2,3}\)|\d{2,3})?[\s.-]?\d{3,4}[\s.-]?\d{4}\b").unwrap()
});

/// Label/value shapes scanned into the characteristics map.
pub static CHARACTERISTIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // <th>Label</th><td>Value</td>
        Regex::new(r"(?is)<th[^>]*>\s*([^<:]{2,40}?)\s*:?\s*</th>\s*<td[^>]*>\s*([^<]{1,80}?)\s*</td>")
            .unwrap(),
        // <dt>Label</dt><dd>Value</dd>
        Regex::new(r"(?is)<dt[^>]*>\s*([^<:]{2,40}?)\s*:?\s*</dt>\s*<dd[^>]*>\s*([^<]{1,80}?)\s*</dd>")
            .unwrap(),
        // <b>Label:</b> Value
        Regex::new(r"(?i)<(?:b|strong)[^>]*>\s*([^<:]{2,40}?)\s*:\s*</(?:b|strong)>\s*([^<]{1,80})")
            .unwrap(),
    ]
});

/// Strip thousands separators and parse a price candidate.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.replace([',', ' ', '$'], "");
    // A trailing ".000"-style group is a thousands separator, not cents.
    let cleaned = if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };
    cleaned.parse::<f64>().ok()
}

/// Strip separators and parse a mileage candidate as an integer.
pub fn parse_mileage(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_thousands_comma() {
        assert_eq!(parse_price("350,000"), Some(350000.0));
        assert_eq!(parse_price("1,250,000"), Some(1250000.0));
    }

    #[test]
    fn test_parse_price_decimal() {
        assert_eq!(parse_price("89999.99"), Some(89999.99));
    }

    #[test]
    fn test_parse_price_dot_thousands() {
        assert_eq!(parse_price("1.250.000"), Some(1250000.0));
    }

    #[test]
    fn test_parse_mileage_strips_separators() {
        assert_eq!(parse_mileage("45,000"), Some(45000));
        assert_eq!(parse_mileage("45.000"), Some(45000));
        assert_eq!(parse_mileage("nada"), None);
    }

    #[test]
    fn test_price_pattern_matches_class_markup() {
        let html = r#"<span class="listing-price">$ 350,000</span>"#;
        let caps = PRICE_PATTERNS[0].captures(html).unwrap();
        assert_eq!(&caps[1], "350,000");
    }

    #[test]
    fn test_year_pattern_labeled() {
        let caps = YEAR_PATTERNS[1].captures("Año: 2018").unwrap();
        assert_eq!(&caps[1], "2018");
        let caps = YEAR_PATTERNS[1].captures("Modelo 2021").unwrap();
        assert_eq!(&caps[1], "2021");
    }

    #[test]
    fn test_mileage_pattern_with_unit() {
        let caps = MILEAGE_PATTERNS[1].captures("recorrido 45,000 km").unwrap();
        assert_eq!(&caps[1], "45,000");
    }

    #[test]
    fn test_image_url_pattern() {
        let html = r#"<img src="https://img.vitrina.mx/autos/123/front.jpg?w=640">"#;
        let m = IMAGE_URL.find(html).unwrap();
        assert_eq!(m.as_str(), "https://img.vitrina.mx/autos/123/front.jpg");
    }
}
