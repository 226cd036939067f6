use crate::core::district::find_district_in;
use crate::models::PartialFilters;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Integer followed by a guest or seat count word
static GUEST_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b([0-9]{1,5})\s*(?:гост\w*|человек\w*|чел\b|персон\w*|мест\w*|guests?\b|people\b|persons?\b|pax\b|seats?\b|qonaq\w*|nəfər\w*)",
    )
    .expect("guest count pattern")
});

/// Integer followed by a currency token, optionally after an "up to" qualifier
static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(?:до|не более|максимум|up to|max|under)\s*)?\b([0-9]{1,6})\s*(?:azn\b|ман(?:ат\w*)?\b|manat\w*|₼)",
    )
    .expect("price pattern")
});

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{4})-([0-9]{2})-([0-9]{2})\b").expect("iso date pattern")
});

static DOTTED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([0-9]{2})\.([0-9]{2})\.([0-9]{4})\b").expect("dotted date pattern")
});

/// Cuisine keywords, checked in order; the first hit wins
pub const CUISINE_KEYWORDS: &[(&str, &str)] = &[
    ("азербайджанск", "Azerbaijani"),
    ("национальн", "Azerbaijani"),
    ("azerbaijani", "Azerbaijani"),
    ("европейск", "European"),
    ("european", "European"),
    ("итальянск", "Italian"),
    ("italian", "Italian"),
    ("турецк", "Turkish"),
    ("turkish", "Turkish"),
    ("японск", "Japanese"),
    ("суши", "Japanese"),
    ("japanese", "Japanese"),
    ("грузинск", "Georgian"),
    ("georgian", "Georgian"),
];

/// Feature keywords; each keyword maps to exactly one canonical feature
pub const FEATURE_KEYWORDS: &[(&str, &str)] = &[
    ("озер", "Lakeside"),
    ("lake", "Lakeside"),
    ("детск", "Kids zone"),
    ("kids", "Kids zone"),
    ("сцен", "Stage"),
    ("stage", "Stage"),
    ("парковк", "Parking"),
    ("parking", "Parking"),
    ("террас", "Terrace"),
    ("terrace", "Terrace"),
    ("бассейн", "Pool"),
    ("pool", "Pool"),
    ("вид на море", "Sea view"),
    ("sea view", "Sea view"),
    ("живая музык", "Live music"),
    ("live music", "Live music"),
    ("караоке", "Karaoke"),
    ("karaoke", "Karaoke"),
    ("проектор", "Projector"),
    ("projector", "Projector"),
    ("wi-fi", "Wi-Fi"),
    ("wifi", "Wi-Fi"),
];

/// Extract filters from raw text with regexes and keyword tables
///
/// Each rule fires independently. The extractor never fails: text with no
/// recognizable signal yields empty `PartialFilters`.
pub fn extract_heuristic(text: &str) -> PartialFilters {
    let lowered = text.to_lowercase();

    PartialFilters {
        city: None,
        district: find_district_in(&lowered).map(str::to_string),
        date: extract_date(text),
        guest_count: extract_guest_count(text),
        price_per_guest_max: extract_price_ceiling(text),
        cuisine: extract_cuisine(&lowered).map(str::to_string),
        features: extract_features(&lowered).into_iter().map(str::to_string).collect(),
    }
}

/// First integer followed by a guest/seat word, if it is at least 1
pub fn extract_guest_count(text: &str) -> Option<u32> {
    GUEST_COUNT_RE
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|n| *n >= 1)
}

/// First integer followed by a currency token
pub fn extract_price_ceiling(text: &str) -> Option<f64> {
    PRICE_RE
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .map(f64::from)
}

/// First date in ISO or `DD.MM.YYYY` form that is a real calendar date
pub fn extract_date(text: &str) -> Option<String> {
    let iso = ISO_DATE_RE
        .captures_iter(text)
        .find_map(|c| calendar_date(&c[1], &c[2], &c[3]));
    iso.or_else(|| {
        DOTTED_DATE_RE
            .captures_iter(text)
            .find_map(|c| calendar_date(&c[3], &c[2], &c[1]))
    })
}

fn calendar_date(year: &str, month: &str, day: &str) -> Option<String> {
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Validate an ISO `YYYY-MM-DD` date string
pub fn parse_iso_date(text: &str) -> Option<String> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn extract_cuisine(lowered: &str) -> Option<&'static str> {
    CUISINE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, cuisine)| *cuisine)
}

fn extract_features(lowered: &str) -> Vec<&'static str> {
    FEATURE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, feature)| *feature)
        .collect()
}

/// Canonical name for a feature phrase, or the trimmed phrase itself
///
/// Only a phrase equal to a keyword or canonical name is rewritten; longer
/// phrases such as "Pool table" are distinct constraints and pass through.
pub fn canonical_feature(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_lowercase();
    let canonical = FEATURE_KEYWORDS
        .iter()
        .find(|(keyword, feature)| *keyword == lowered || feature.to_lowercase() == lowered)
        .map(|(_, feature)| feature.to_string());

    Some(canonical.unwrap_or_else(|| trimmed.to_string()))
}
