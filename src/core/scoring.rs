use crate::models::Venue;
use std::cmp::Ordering;

/// Ranking key of a venue: (capacity distance, cheapest price)
///
/// Distance is `|midpoint - guests|` of the capacity range, zero when no
/// guest count is requested. A missing price sorts last.
#[inline]
pub fn rank_key(venue: &Venue, guests: Option<u32>) -> (f64, f64) {
    let [lo, hi] = venue.capacity;
    let midpoint = (f64::from(lo.unwrap_or(0)) + f64::from(hi.unwrap_or(0))) / 2.0;

    let distance = match guests {
        Some(guests) => (midpoint - f64::from(guests)).abs(),
        None => 0.0,
    };

    let price = venue.price_per_guest[0].unwrap_or(f64::INFINITY);

    (distance, price)
}

/// Order venues by ranking key, ascending
///
/// The sort is stable, so ties keep their fetch order.
pub fn rank_venues(venues: &mut [Venue], guests: Option<u32>) {
    venues.sort_by(|a, b| {
        let (da, pa) = rank_key(a, guests);
        let (db, pb) = rank_key(b, guests);
        da.partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| pa.partial_cmp(&pb).unwrap_or(Ordering::Equal))
    });
}
