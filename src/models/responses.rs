use serde::{Deserialize, Serialize};
use crate::models::domain::{Filters, IntentKind, Venue};

/// Fixed reply for requests outside the service's scope
pub const OFFTOPIC_REPLY: &str = "вопрос не относится задачам сервиса и ответить на него не могу";

/// Reply used when the request failed outside every documented fallback
pub const DEGRADED_REPLY: &str = "временная ошибка сервиса, попробуйте позже";

/// Response of the chat endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub intent: IntentKind,
    pub confidence: f64,
    pub filters_used: Option<Filters>,
    pub shortlist: Vec<Venue>,
    pub link: Option<String>,
    pub reply: String,
}

impl ChatResponse {
    pub fn off_topic(confidence: f64) -> Self {
        Self {
            intent: IntentKind::OffTopic,
            confidence,
            filters_used: None,
            shortlist: Vec::new(),
            link: None,
            reply: OFFTOPIC_REPLY.to_string(),
        }
    }

    pub fn degraded() -> Self {
        Self {
            confidence: 0.0,
            reply: DEGRADED_REPLY.to_string(),
            ..Self::off_topic(0.0)
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Dependency probe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelftestResponse {
    pub has_key: bool,
    pub completion: String,
    pub store: String,
}
