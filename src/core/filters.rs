use crate::models::{Filters, VenueRecord};
use std::collections::BTreeSet;

/// Drop venues whose cheapest per-guest price exceeds the ceiling
///
/// Venues without a listed price are kept.
#[inline]
pub fn within_price_ceiling(record: &VenueRecord, ceiling: Option<f64>) -> bool {
    match (ceiling, record.price_per_person_azn_from) {
        (Some(max), Some(from)) => from <= max,
        _ => true,
    }
}

/// Every requested feature must appear in facilities, services or tags
#[inline]
pub fn contains_features(record: &VenueRecord, requested: &BTreeSet<String>) -> bool {
    if requested.is_empty() {
        return true;
    }

    let offered = record.feature_union();
    requested.iter().all(|f| offered.contains(f.as_str()))
}

/// Cross-check capacity against the requested guest count
///
/// Guards against stale index results; venues without a listed maximum are
/// kept.
#[inline]
pub fn fits_capacity(record: &VenueRecord, guests: Option<u32>) -> bool {
    match (guests, record.capacity_max) {
        (Some(guests), Some(max)) => max >= guests,
        _ => true,
    }
}

/// All client-side predicates the store cannot evaluate
pub fn passes_residual_filters(record: &VenueRecord, filters: &Filters) -> bool {
    within_price_ceiling(record, filters.price_per_guest_max)
        && contains_features(record, &filters.features)
        && fits_capacity(record, filters.requested_guests())
}
