//! Evengo Match - venue shortlists from free-text event requests
//!
//! This library turns a message such as "Хазар, 80 гостей, до 50 AZN" into
//! structured filters, decides whether it is a venue search, queries the
//! venue store and renders a short ranked list with a deep link to the
//! full search page.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_link, extract_heuristic, normalize_district, Pipeline, PipelineOptions};
pub use models::{ChatRequest, ChatResponse, Filters, Intent, IntentKind, Venue, VenueRecord};
pub use services::{CompletionService, ServiceError, VenueStore};
