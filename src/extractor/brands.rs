//! Brand and model extraction from listing titles.
//!
//! Brand matching is earliest-position-wins over a fixed manufacturer list:
//! the manufacturer whose name starts at the smallest character index in the
//! lowercased title is selected, regardless of name length. The model is
//! whatever follows the brand once year-, displacement-, transmission-,
//! drivetrain- and fuel-like tokens are filtered out.

/// Known vehicle manufacturers, lowercase. Multi-word names included.
pub const BRANDS: &[&str] = &[
    "acura",
    "alfa romeo",
    "audi",
    "baic",
    "bmw",
    "buick",
    "byd",
    "cadillac",
    "changan",
    "chevrolet",
    "chirey",
    "chrysler",
    "cupra",
    "dodge",
    "fiat",
    "ford",
    "genesis",
    "gmc",
    "great wall",
    "honda",
    "hyundai",
    "infiniti",
    "isuzu",
    "jac",
    "jaguar",
    "jeep",
    "kia",
    "land rover",
    "lexus",
    "lincoln",
    "mazda",
    "mercedes benz",
    "mercedes-benz",
    "mg",
    "mini",
    "mitsubishi",
    "nissan",
    "peugeot",
    "porsche",
    "ram",
    "renault",
    "seat",
    "subaru",
    "suzuki",
    "tesla",
    "toyota",
    "volkswagen",
    "volvo",
];

/// Tokens that describe the car rather than the model name.
const TRANSMISSION_TOKENS: &[&str] = &[
    "automatico",
    "automático",
    "automatic",
    "automatica",
    "automática",
    "manual",
    "estandar",
    "estándar",
    "std",
    "cvt",
    "tiptronic",
];

const DRIVETRAIN_TOKENS: &[&str] = &["4x4", "4x2", "awd", "fwd", "rwd", "4wd", "2wd"];

const FUEL_TOKENS: &[&str] = &[
    "gasolina",
    "diesel",
    "diésel",
    "hibrido",
    "híbrido",
    "hybrid",
    "electrico",
    "eléctrico",
    "electric",
    "gas",
    "glp",
    "gnv",
];

/// Extract brand and model from a listing title.
///
/// Returns `(None, None)` when no known manufacturer appears in the title.
pub fn extract_brand_model(title: &str) -> (Option<String>, Option<String>) {
    let lowered = title.to_lowercase();

    // Earliest occurrence wins, not longest match.
    let mut best: Option<(usize, &str)> = None;
    for brand in BRANDS {
        if let Some(pos) = lowered.find(brand) {
            match best {
                Some((best_pos, _)) if best_pos <= pos => {}
                _ => best = Some((pos, brand)),
            }
        }
    }

    let (pos, brand) = match best {
        Some(found) => found,
        None => return (None, None),
    };

    // Model tokens keep the title's original casing. Lowercasing preserves
    // byte offsets for the character ranges seen in titles; fall back to the
    // lowered text if it did not.
    let after_brand = pos + brand.len();
    let rest = title.get(after_brand..).unwrap_or(&lowered[after_brand..]);

    let model = extract_model(rest);
    (Some(capitalize_words(brand)), model)
}

/// Take the text following the brand match and keep the first two tokens
/// that are not year or trim-descriptor noise.
fn extract_model(rest: &str) -> Option<String> {
    let tokens: Vec<&str> = rest
        .split(|c: char| c.is_whitespace() || c == '-' || c == ',')
        .filter(|t| !t.is_empty())
        .filter(|t| !is_filtered_token(&t.to_lowercase()))
        .take(2)
        .collect();

    if tokens.is_empty() {
        return None;
    }
    Some(tokens.join(" "))
}

/// True for tokens that look like a year, an engine displacement, or a
/// transmission/drivetrain/fuel descriptor.
fn is_filtered_token(token: &str) -> bool {
    if is_year_token(token) || is_displacement_token(token) {
        return true;
    }
    TRANSMISSION_TOKENS.contains(&token)
        || DRIVETRAIN_TOKENS.contains(&token)
        || FUEL_TOKENS.contains(&token)
}

/// Bare 4-digit year, e.g. "2020".
fn is_year_token(token: &str) -> bool {
    token.len() == 4
        && token.chars().all(|c| c.is_ascii_digit())
        && (token.starts_with("19") || token.starts_with("20"))
}

/// Engine-displacement-like token, e.g. "2.0", "1.6l", "3.5t".
fn is_displacement_token(token: &str) -> bool {
    let digits = token.trim_end_matches(['l', 't']);
    let mut parts = digits.splitn(2, '.');
    match (parts.next(), parts.next()) {
        (Some(whole), Some(frac)) => {
            !whole.is_empty()
                && whole.len() <= 2
                && !frac.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Capitalize the first letter of each whitespace-separated word.
fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_and_model_basic() {
        let (brand, model) = extract_brand_model("Toyota Corolla XLE 2020 Automático");
        assert_eq!(brand.as_deref(), Some("Toyota"));
        assert_eq!(model.as_deref(), Some("Corolla XLE"));
    }

    #[test]
    fn test_earliest_brand_wins() {
        // "Kia" starts before "Nissan"; position beats length or list order.
        let (brand, _) = extract_brand_model("Kia Rio mejor que Nissan Versa");
        assert_eq!(brand.as_deref(), Some("Kia"));

        let (brand, _) = extract_brand_model("Remato Nissan March, recibo Kia");
        assert_eq!(brand.as_deref(), Some("Nissan"));
    }

    #[test]
    fn test_multi_word_brand() {
        let (brand, model) = extract_brand_model("Alfa Romeo Giulia 2019");
        assert_eq!(brand.as_deref(), Some("Alfa Romeo"));
        assert_eq!(model.as_deref(), Some("Giulia"));
    }

    #[test]
    fn test_filters_descriptor_tokens() {
        let (_, model) = extract_brand_model("Mazda 3 2.5 2021 CVT gasolina");
        assert_eq!(model.as_deref(), Some("3"));
    }

    #[test]
    fn test_no_brand_in_title() {
        let (brand, model) = extract_brand_model("Camioneta seminueva excelente estado");
        assert_eq!(brand, None);
        assert_eq!(model, None);
    }

    #[test]
    fn test_year_and_displacement_tokens() {
        assert!(is_year_token("2020"));
        assert!(!is_year_token("202"));
        assert!(!is_year_token("20x0"));
        assert!(is_displacement_token("2.0"));
        assert!(is_displacement_token("1.6l"));
        assert!(!is_displacement_token("330i"));
        assert!(!is_displacement_token("xle"));
    }

    #[test]
    fn test_numeric_model_kept() {
        // Known limitation: alphanumeric trims like "330i" pass the filter
        // and are kept as model tokens.
        let (brand, model) = extract_brand_model("BMW 330i 2018");
        assert_eq!(brand.as_deref(), Some("Bmw"));
        assert_eq!(model.as_deref(), Some("330i"));
    }
}
