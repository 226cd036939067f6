// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Filters, PartialFilters, Venue, VenueRecord, VenueMedia, Intent, IntentKind, DEFAULT_GUEST_COUNT, MAX_DISPLAY_FEATURES};
pub use requests::{ChatRequest, MAX_TEXT_CHARS};
pub use responses::{ChatResponse, HealthResponse, SelftestResponse, OFFTOPIC_REPLY, DEGRADED_REPLY};
