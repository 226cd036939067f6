use crate::models::{Filters, DEFAULT_GUEST_COUNT};
use once_cell::sync::Lazy;
use regex::Regex;

/// Event and venue vocabulary, including district names in several scripts
pub const VENUE_KEYWORDS: &[&str] = &[
    "гость", "гостей", "банкет", "сцена", "парковк", "евент", "мероприят",
    "свадьб", "день рождения", "юбиле", "аренда", "площадк", "торжеств",
    "кейтеринг", "сабаи", "сабай", "хазар", "ясамал", "низами", "бинагади",
    "xezer", "xəzər", "khazar", "yasamal", "binagadi", "binəqədi", "nizami", "sabail", "sabayil",
    "бакин", "баку", "venue", "banquet", "wedding", "birthday party", "toy salonu",
];

/// Short stems that only count at the start of a word ("зал", not "сказал")
static WORD_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:зал|мест)").expect("word start pattern")
});

static COUNT_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[0-9]+\s*(?:гост|мест|guest|people|pax|seat|qonaq|nəfər)").expect("count pattern")
});

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[0-9]+\s*(?:azn\b|₼|манат|manat)").expect("currency pattern")
});

/// Which signal let a request bypass intent classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    ResolvedFilter,
    GuestCount,
    CountPattern,
    CurrencyPattern,
    Keyword,
}

impl GateReason {
    pub fn as_str(self) -> &'static str {
        match self {
            GateReason::ResolvedFilter => "resolved_filter",
            GateReason::GuestCount => "guest_count",
            GateReason::CountPattern => "count_pattern",
            GateReason::CurrencyPattern => "currency_pattern",
            GateReason::Keyword => "keyword",
        }
    }
}

/// First signal that marks the request as a venue search, if any
pub fn fast_path_reason(text: &str, filters: &Filters) -> Option<GateReason> {
    if filters.district.is_some()
        || filters.price_per_guest_max.is_some()
        || filters.cuisine.is_some()
        || !filters.features.is_empty()
    {
        return Some(GateReason::ResolvedFilter);
    }

    if filters.guest_count != DEFAULT_GUEST_COUNT {
        return Some(GateReason::GuestCount);
    }

    if COUNT_UNIT_RE.is_match(text) {
        return Some(GateReason::CountPattern);
    }

    if CURRENCY_RE.is_match(text) {
        return Some(GateReason::CurrencyPattern);
    }

    let lowered = text.to_lowercase();
    let keyword = WORD_START_RE.is_match(&lowered) || VENUE_KEYWORDS.iter().any(|kw| lowered.contains(kw));
    keyword.then_some(GateReason::Keyword)
}

/// Whether intent classification can be skipped for this request
pub fn is_fast_path(text: &str, filters: &Filters) -> bool {
    fast_path_reason(text, filters).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_passes() {
        let filters = Filters {
            district: Some("Khazar".into()),
            ..Default::default()
        };
        assert_eq!(fast_path_reason("что-нибудь", &filters), Some(GateReason::ResolvedFilter));
    }

    #[test]
    fn test_non_default_guest_count_passes() {
        let filters = Filters {
            guest_count: 30,
            ..Default::default()
        };
        assert_eq!(fast_path_reason("hmm", &filters), Some(GateReason::GuestCount));
    }

    #[test]
    fn test_text_patterns() {
        let filters = Filters::default();
        assert_eq!(fast_path_reason("на 1 гостя", &filters), Some(GateReason::CountPattern));
        assert_eq!(fast_path_reason("до 50 AZN", &filters), Some(GateReason::CurrencyPattern));
        assert_eq!(fast_path_reason("ищу банкетный зал", &filters), Some(GateReason::Keyword));
        assert_eq!(fast_path_reason("wedding in Xəzər", &filters), Some(GateReason::Keyword));
    }

    #[test]
    fn test_short_stems_match_whole_words_only() {
        let filters = Filters::default();
        assert_eq!(fast_path_reason("нужен зал", &filters), Some(GateReason::Keyword));
        assert_eq!(fast_path_reason("Места у воды есть?", &filters), Some(GateReason::Keyword));
        assert!(!is_fast_path("он сказал, что придёт вместе с другом", &filters));
        assert!(!is_fast_path("показал фото", &filters));
    }

    #[test]
    fn test_no_signal_defers() {
        assert!(!is_fast_path("сколько длина экватора?", &Filters::default()));
        assert!(!is_fast_path("what is the capital of France", &Filters::default()));
    }
}
