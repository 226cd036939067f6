/// Known district spellings and their canonical codes
///
/// Covers Cyrillic, Azerbaijani Latin and ASCII transliterations. Every
/// canonical code is listed as a spelling of itself.
pub const DISTRICT_SPELLINGS: &[(&str, &str)] = &[
    // Sabail
    ("сабаиль", "Sabail"),
    ("сабаил", "Sabail"),
    ("сабайыл", "Sabail"),
    ("səbail", "Sabail"),
    ("sabayil", "Sabail"),
    ("sabail", "Sabail"),
    // Khazar
    ("хазар", "Khazar"),
    ("xəzər", "Khazar"),
    ("xezer", "Khazar"),
    ("khazar", "Khazar"),
    // Nizami
    ("низами", "Nizami"),
    ("nizami", "Nizami"),
    // Yasamal
    ("ясамал", "Yasamal"),
    ("yasamal", "Yasamal"),
    // Binagadi
    ("бинагади", "Binagadi"),
    ("binəqədi", "Binagadi"),
    ("binagadi", "Binagadi"),
];

/// Canonical district codes
pub const CANONICAL_DISTRICTS: &[&str] = &["Sabail", "Khazar", "Nizami", "Yasamal", "Binagadi"];

/// Map a free-text district token to its canonical code
///
/// Case and surrounding whitespace are ignored. Text outside the table maps
/// to `None`.
pub fn normalize_district(text: &str) -> Option<&'static str> {
    let token = text.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    DISTRICT_SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == token)
        .map(|(_, code)| *code)
}

/// First known district spelling occurring anywhere in `lowered`
pub fn find_district_in(lowered: &str) -> Option<&'static str> {
    DISTRICT_SPELLINGS
        .iter()
        .find(|(spelling, _)| lowered.contains(spelling))
        .and_then(|(spelling, _)| normalize_district(spelling))
}
