use crate::core::district::normalize_district;
use crate::core::extractor::{canonical_feature, extract_heuristic, parse_iso_date};
use crate::models::{Filters, PartialFilters, DEFAULT_GUEST_COUNT};
use crate::services::completion::extract_json;
use crate::services::{with_timeout, CompletionRequest, CompletionService, Message, ResponseSchema, ServiceError};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const EXTRACTOR_INSTRUCTION: &str = "Извлеки фильтры площадки из текста пользователя. \
Район, город, дату (YYYY-MM-DD), число гостей, максимальную цену на гостя в AZN, кухню и особенности площадки. \
Верни ТОЛЬКО JSON по схеме, без лишних полей.";

/// Wire shape of the semantic extractor's answer
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SemanticFilters {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    district: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    guest_count: Option<i64>,
    #[serde(default)]
    price_per_guest_max: Option<f64>,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    features: Option<Vec<String>>,
}

impl SemanticFilters {
    fn validate(self) -> Result<PartialFilters, ServiceError> {
        let guest_count = match self.guest_count {
            Some(n) if n < 1 || n > u32::MAX as i64 => {
                return Err(ServiceError::MalformedResponse(format!("guest_count out of range: {}", n)));
            }
            Some(n) => Some(n as u32),
            None => None,
        };

        if let Some(price) = self.price_per_guest_max {
            if !price.is_finite() || price < 0.0 {
                return Err(ServiceError::MalformedResponse(format!(
                    "price_per_guest_max out of range: {}",
                    price
                )));
            }
        }

        Ok(PartialFilters {
            city: self.city,
            district: self.district,
            date: self.date,
            guest_count,
            price_per_guest_max: self.price_per_guest_max,
            cuisine: self.cuisine,
            features: self.features.unwrap_or_default().into_iter().collect(),
        })
    }
}

fn filter_schema() -> ResponseSchema {
    ResponseSchema {
        name: "VenueFilters",
        schema: json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "district": {"type": "string"},
                "date": {"type": "string", "description": "YYYY-MM-DD"},
                "guest_count": {"type": "integer", "minimum": 1},
                "price_per_guest_max": {"type": "number", "minimum": 0},
                "cuisine": {"type": "string"},
                "features": {"type": "array", "items": {"type": "string"}}
            },
            "additionalProperties": false
        }),
        strict: false,
    }
}

/// Parse and validate raw semantic extractor output
pub fn parse_semantic_filters(raw: &str) -> Result<PartialFilters, ServiceError> {
    let payload: SemanticFilters = serde_json::from_str(extract_json(raw))?;
    payload.validate()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Merge heuristic and semantic filters into the canonical filter set
///
/// Semantic values win field by field; features are the union of both.
/// Empty strings, invalid dates and unknown districts are dropped.
pub fn merge_filters(heuristic: PartialFilters, semantic: Option<PartialFilters>) -> Filters {
    let semantic = semantic.unwrap_or_default();

    let district = non_empty(semantic.district)
        .and_then(|d| normalize_district(&d))
        .or_else(|| non_empty(heuristic.district).and_then(|d| normalize_district(&d)))
        .map(str::to_string);

    let date = non_empty(semantic.date)
        .and_then(|d| parse_iso_date(&d))
        .or_else(|| non_empty(heuristic.date).and_then(|d| parse_iso_date(&d)));

    let features: BTreeSet<String> = semantic
        .features
        .iter()
        .chain(&heuristic.features)
        .filter_map(|f| canonical_feature(f))
        .collect();

    Filters {
        city: non_empty(semantic.city).or_else(|| non_empty(heuristic.city)),
        district,
        date,
        guest_count: semantic
            .guest_count
            .or(heuristic.guest_count)
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_GUEST_COUNT),
        price_per_guest_max: semantic
            .price_per_guest_max
            .or(heuristic.price_per_guest_max)
            .filter(|p| p.is_finite() && *p >= 0.0),
        cuisine: non_empty(semantic.cuisine).or_else(|| non_empty(heuristic.cuisine)),
        features,
    }
}

/// Outcome of filter resolution
#[derive(Debug)]
pub struct Resolution {
    pub filters: Filters,
    /// Why the semantic extractor did not contribute, if it did not
    pub semantic_error: Option<ServiceError>,
}

impl Resolution {
    pub fn used_semantic(&self) -> bool {
        self.semantic_error.is_none()
    }
}

/// Resolves free text into [`Filters`]
///
/// The heuristic extractor always runs; the semantic extractor runs when a
/// completion service is configured and its failures fall back silently.
#[derive(Clone)]
pub struct FilterResolver {
    service: Option<Arc<dyn CompletionService>>,
    timeout: Duration,
}

impl FilterResolver {
    pub fn new(service: Option<Arc<dyn CompletionService>>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Heuristic-only resolver
    pub fn heuristic_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    pub async fn resolve(&self, text: &str) -> Resolution {
        let heuristic = extract_heuristic(text);

        match self.extract_semantic(text).await {
            Ok(semantic) => Resolution {
                filters: merge_filters(heuristic, Some(semantic)),
                semantic_error: None,
            },
            Err(e) => {
                tracing::warn!("Semantic filter extraction unavailable ({}), using heuristics: {}", e.kind(), e);
                Resolution {
                    filters: merge_filters(heuristic, None),
                    semantic_error: Some(e),
                }
            }
        }
    }

    async fn extract_semantic(&self, text: &str) -> Result<PartialFilters, ServiceError> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| ServiceError::CredentialMissing("no completion service configured".into()))?;

        let request = CompletionRequest {
            messages: vec![Message::system(EXTRACTOR_INSTRUCTION), Message::user(text)],
            schema: Some(filter_schema()),
        };

        let raw = with_timeout(self.timeout, service.complete(&request)).await?;
        parse_semantic_filters(&raw)
    }
}
