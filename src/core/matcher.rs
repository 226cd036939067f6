use crate::core::{filters::passes_residual_filters, scoring::rank_venues};
use crate::models::{Filters, Venue, VenueRecord};
use crate::services::{with_timeout, Predicate, ServiceError, VenueQuery, VenueStore};
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of venues in a shortlist
pub const SHORTLIST_LIMIT: usize = 7;

/// Default number of documents read per query
pub const DEFAULT_CANDIDATE_CAP: usize = 50;

/// Result of the matching process
#[derive(Debug, Default)]
pub struct MatchResult {
    /// Ranked shortlist, at most [`SHORTLIST_LIMIT`] venues
    pub venues: Vec<Venue>,
    pub total_candidates: usize,
    /// Set when the filtered query failed and the base query was used
    pub degraded: bool,
    /// Last store error, when no query succeeded
    pub error: Option<ServiceError>,
}

impl MatchResult {
    /// Empty but valid result: the store answered and nothing fit
    pub fn is_no_match(&self) -> bool {
        self.venues.is_empty() && self.error.is_none()
    }
}

/// Build the index-safe store query for a filter set
///
/// At most one range band (capacity) goes to the store together with
/// equality and array-contains predicates. Price, features and the capacity
/// cross-check run client-side.
pub fn build_query(filters: &Filters, candidate_cap: usize) -> VenueQuery {
    let mut query = VenueQuery::unfiltered(candidate_cap);

    if let Some(guests) = filters.requested_guests() {
        query = query.with(Predicate::CapacityBand { guests });
    }

    if let Some(district) = &filters.district {
        query = query.with(Predicate::Equals {
            field: "district",
            value: district.clone(),
        });
    }

    if let Some(cuisine) = &filters.cuisine {
        query = query.with(Predicate::ArrayContains {
            field: "cuisine",
            value: cuisine.clone(),
        });
    }

    query
}

/// Filter, rank and cap fetched documents
///
/// `reapply` re-evaluates the store predicates client-side, for candidates
/// that came from the unfiltered fallback query.
pub fn shortlist(filters: &Filters, records: Vec<VenueRecord>, reapply: Option<&VenueQuery>) -> Vec<Venue> {
    let mut venues: Vec<Venue> = records
        .into_iter()
        .filter(|r| reapply.map_or(true, |q| q.matches(r)))
        .filter(|r| passes_residual_filters(r, filters))
        .map(VenueRecord::into_venue)
        .collect();

    rank_venues(&mut venues, filters.requested_guests());
    venues.truncate(SHORTLIST_LIMIT);
    venues
}

/// Venue matching orchestrator
///
/// # Pipeline Stages
/// 1. Index-safe store query (capacity band, district, cuisine)
/// 2. Residual filtering (price, features, capacity cross-check)
/// 3. Ranking by capacity distance, then price
/// 4. Truncation to the shortlist size
#[derive(Clone)]
pub struct VenueMatcher {
    store: Arc<dyn VenueStore>,
    candidate_cap: usize,
    timeout: Duration,
}

impl VenueMatcher {
    pub fn new(store: Arc<dyn VenueStore>, candidate_cap: usize, timeout: Duration) -> Self {
        Self {
            store,
            candidate_cap: candidate_cap.max(1),
            timeout,
        }
    }

    /// Find the shortlist for resolved filters; never fails
    pub async fn find_venues(&self, filters: &Filters) -> MatchResult {
        let query = build_query(filters, self.candidate_cap);

        match with_timeout(self.timeout, self.store.query(&query)).await {
            Ok(records) => {
                let total_candidates = records.len();
                let venues = shortlist(filters, records, None);
                tracing::debug!("Matched {} of {} candidates", venues.len(), total_candidates);
                MatchResult {
                    venues,
                    total_candidates,
                    degraded: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Venue query failed ({}), retrying with base query: {}", e.kind(), e);
                self.find_with_base_query(filters, &query).await
            }
        }
    }

    async fn find_with_base_query(&self, filters: &Filters, original: &VenueQuery) -> MatchResult {
        let base = VenueQuery::unfiltered(self.candidate_cap);

        match with_timeout(self.timeout, self.store.query(&base)).await {
            Ok(records) => {
                let total_candidates = records.len();
                MatchResult {
                    venues: shortlist(filters, records, Some(original)),
                    total_candidates,
                    degraded: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Base venue query failed ({}), returning no venues: {}", e.kind(), e);
                MatchResult {
                    degraded: true,
                    error: Some(e),
                    ..Default::default()
                }
            }
        }
    }
}
