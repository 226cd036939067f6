use crate::core::{
    classifier::IntentClassifier,
    formatter::ShortlistFormatter,
    gate::fast_path_reason,
    link::{build_link, DEFAULT_LINK_BASE},
    matcher::{VenueMatcher, DEFAULT_CANDIDATE_CAP},
    resolver::FilterResolver,
};
use crate::models::{ChatRequest, ChatResponse, Filters, IntentKind};
use crate::services::{CompletionService, VenueStore};
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Tunables of the request pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub link_base: String,
    pub candidate_cap: usize,
    /// Minimum classifier confidence to act on `venue_search`
    pub min_search_confidence: f64,
    /// Confidence reported when the fast-path gate decides
    pub fast_path_confidence: f64,
    pub completion_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            link_base: DEFAULT_LINK_BASE.to_string(),
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            min_search_confidence: 0.5,
            fast_path_confidence: 0.9,
            completion_timeout: Duration::from_secs(20),
            store_timeout: Duration::from_secs(10),
        }
    }
}

/// Request pipeline: text in, shortlist response out
///
/// Built once at startup from the shared service handles. Each request runs
/// its external calls in sequence; every failure is replaced by the
/// component's default, so `respond` always produces a response.
#[derive(Clone)]
pub struct Pipeline {
    resolver: FilterResolver,
    classifier: IntentClassifier,
    matcher: VenueMatcher,
    formatter: ShortlistFormatter,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        completion: Option<Arc<dyn CompletionService>>,
        store: Arc<dyn VenueStore>,
        options: PipelineOptions,
    ) -> Self {
        let timeout = options.completion_timeout;

        Self {
            resolver: FilterResolver::new(completion.clone(), timeout),
            classifier: IntentClassifier::new(completion.clone(), timeout),
            matcher: VenueMatcher::new(store, options.candidate_cap, options.store_timeout),
            formatter: ShortlistFormatter::new(completion, timeout),
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub async fn respond(&self, request: ChatRequest) -> ChatResponse {
        let request = ChatRequest {
            text: request.text.trim().to_string(),
            locale: request.locale,
        };

        if let Err(errors) = request.validate() {
            tracing::info!("Rejecting request text: {}", errors);
            return ChatResponse::off_topic(1.0);
        }

        let text = request.text.as_str();
        let resolution = self.resolver.resolve(text).await;
        let filters = resolution.filters;

        if let Some(reason) = fast_path_reason(text, &filters) {
            tracing::info!("Fast path ({}), skipping intent classification", reason.as_str());
            return self
                .search(text, filters, self.options.fast_path_confidence, request.locale.as_deref())
                .await;
        }

        let classification = self.classifier.classify(text).await;
        let intent = classification.intent;

        if intent.kind == IntentKind::VenueSearch && intent.confidence >= self.options.min_search_confidence {
            return self
                .search(text, filters, intent.confidence, request.locale.as_deref())
                .await;
        }

        tracing::info!(
            "Not a venue search: {} ({:.2})",
            intent.kind.as_str(),
            intent.confidence
        );
        ChatResponse::off_topic(intent.confidence)
    }

    async fn search(&self, text: &str, filters: Filters, confidence: f64, locale: Option<&str>) -> ChatResponse {
        let result = self.matcher.find_venues(&filters).await;
        let link = build_link(&self.options.link_base, &filters);
        let rendering = self.formatter.render(text, &result.venues, &link, locale).await;

        if result.is_no_match() {
            tracing::info!("No venues matched, returning link only");
        }

        tracing::info!(
            "Venue search returned {} venues from {} candidates{}",
            result.venues.len(),
            result.total_candidates,
            if result.degraded { " (degraded)" } else { "" }
        );

        ChatResponse {
            intent: IntentKind::VenueSearch,
            confidence,
            filters_used: Some(filters),
            shortlist: result.venues,
            link: Some(link),
            reply: rendering.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OFFTOPIC_REPLY;
    use crate::services::MemoryVenueStore;

    fn pipeline() -> Pipeline {
        Pipeline::new(None, Arc::new(MemoryVenueStore::default()), PipelineOptions::default())
    }

    #[tokio::test]
    async fn test_empty_text_is_off_topic() {
        let response = pipeline().respond(ChatRequest::new("   ")).await;
        assert_eq!(response, ChatResponse::off_topic(1.0));
    }

    #[tokio::test]
    async fn test_no_match_still_links() {
        let response = pipeline().respond(ChatRequest::new("зал на 40 гостей")).await;

        assert_eq!(response.intent, IntentKind::VenueSearch);
        assert!(response.shortlist.is_empty());
        assert_eq!(
            response.link.as_deref(),
            Some("https://evengo.space/search?guest_count=40")
        );
        assert_ne!(response.reply, OFFTOPIC_REPLY);
    }
}
