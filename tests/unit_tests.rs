// Unit tests for Evengo Match

use evengo_match::core::{
    build_link, build_query, extract_heuristic, fallback_text, is_fast_path, merge_filters,
    normalize_district, rank_venues, SHORTLIST_LIMIT,
};
use evengo_match::models::{Filters, PartialFilters, Venue};

fn venue(id: &str, capacity: [u32; 2], price_from: f64) -> Venue {
    Venue {
        id: id.to_string(),
        name: Some(format!("Venue {}", id)),
        district: Some("Khazar".to_string()),
        capacity: [Some(capacity[0]), Some(capacity[1])],
        price_per_guest: [Some(price_from), Some(price_from + 10.0)],
        features: vec![],
        cuisine: vec![],
        cover: None,
        base_rental_fee_azn: None,
    }
}

#[test]
fn test_district_spellings_share_a_code() {
    for spelling in ["Хазар", "xəzər", "XEZER", " Khazar "] {
        assert_eq!(normalize_district(spelling), Some("Khazar"), "{}", spelling);
    }
    assert_eq!(normalize_district("Narimanov"), None);
    assert_eq!(normalize_district(""), None);
}

#[test]
fn test_heuristic_extraction_of_full_request() {
    let partial = extract_heuristic("Хазар, 80 гостей, до 50 AZN, озеро и детская зона");

    assert_eq!(partial.district.as_deref(), Some("Khazar"));
    assert_eq!(partial.guest_count, Some(80));
    assert_eq!(partial.price_per_guest_max, Some(50.0));
    assert!(partial.features.contains("Lakeside"));
    assert!(partial.features.contains("Kids zone"));
}

#[test]
fn test_heuristic_extraction_of_plain_text_is_empty() {
    assert_eq!(extract_heuristic("сколько длина экватора?"), PartialFilters::default());
}

#[test]
fn test_merged_filters_default_guest_count() {
    let filters = merge_filters(PartialFilters::default(), None);
    assert_eq!(filters.guest_count, 1);
    assert_eq!(filters.requested_guests(), None);
}

#[test]
fn test_fast_path_signals() {
    assert!(is_fast_path("нужен зал на свадьбу", &Filters::default()));
    assert!(is_fast_path("50 гостей", &Filters::default()));
    assert!(!is_fast_path("расскажи анекдот", &Filters::default()));
}

#[test]
fn test_query_never_has_two_range_bands() {
    let filters = Filters {
        district: Some("Nizami".into()),
        guest_count: 40,
        price_per_guest_max: Some(25.0),
        cuisine: Some("Georgian".into()),
        ..Default::default()
    };

    let query = build_query(&filters, 50);

    assert_eq!(query.predicates().iter().filter(|p| p.is_range()).count(), 1);
}

#[test]
fn test_closer_capacity_ranks_first_for_80_guests() {
    let mut venues = vec![venue("wide", [90, 150], 20.0), venue("snug", [50, 100], 40.0)];

    rank_venues(&mut venues, Some(80));

    assert_eq!(venues[0].id, "snug");
}

#[test]
fn test_link_is_deterministic() {
    let filters = Filters {
        district: Some("Khazar".into()),
        guest_count: 80,
        price_per_guest_max: Some(50.0),
        features: ["Lakeside", "Kids zone"].iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    };

    let first = build_link("https://evengo.space/search", &filters);
    let second = build_link("https://evengo.space/search", &filters.clone());

    assert_eq!(first, second);
    assert_eq!(
        first,
        "https://evengo.space/search?district=Khazar&guest_count=80&price_per_guest_max=50&features=Kids%20zone,Lakeside"
    );
}

#[test]
fn test_fallback_has_one_line_per_venue_plus_link() {
    let link = "https://evengo.space/search?guest_count=1";

    for n in [0, 3, SHORTLIST_LIMIT] {
        let venues: Vec<_> = (0..n).map(|i| venue(&i.to_string(), [10, 100], 30.0)).collect();
        let text = fallback_text(&venues, link);

        assert_eq!(text.lines().count(), n + 1);
        assert_eq!(text.lines().last(), Some(format!("Смотреть все: {}", link).as_str()));
    }
}
