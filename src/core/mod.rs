// Core pipeline exports
pub mod classifier;
pub mod district;
pub mod extractor;
pub mod filters;
pub mod formatter;
pub mod gate;
pub mod link;
pub mod matcher;
pub mod pipeline;
pub mod resolver;
pub mod scoring;

pub use classifier::{Classification, IntentClassifier};
pub use district::normalize_district;
pub use extractor::extract_heuristic;
pub use filters::passes_residual_filters;
pub use formatter::{fallback_text, ShortlistFormatter};
pub use gate::{fast_path_reason, is_fast_path, GateReason};
pub use link::build_link;
pub use matcher::{build_query, MatchResult, VenueMatcher, SHORTLIST_LIMIT};
pub use pipeline::{Pipeline, PipelineOptions};
pub use resolver::{merge_filters, FilterResolver, Resolution};
pub use scoring::rank_venues;
