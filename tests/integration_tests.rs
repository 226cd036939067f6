// Integration tests for Evengo Match

use async_trait::async_trait;
use evengo_match::core::{Pipeline, PipelineOptions};
use evengo_match::models::{ChatRequest, IntentKind, VenueRecord, OFFTOPIC_REPLY};
use evengo_match::services::{
    AppwriteClient, CompletionRequest, CompletionService, MemoryVenueStore, OpenAiClient, Predicate,
    ServiceError, VenueQuery, VenueStore,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn venue(id: &str, district: &str, capacity: [u32; 2], price_from: f64, features: &[&str]) -> VenueRecord {
    VenueRecord {
        id: Some(id.to_string()),
        name: Some(format!("Venue {}", id)),
        district: Some(district.to_string()),
        capacity_min: Some(capacity[0]),
        capacity_max: Some(capacity[1]),
        price_per_person_azn_from: Some(price_from),
        price_per_person_azn_to: Some(price_from + 15.0),
        facilities: features.iter().map(|f| f.to_string()).collect(),
        ..Default::default()
    }
}

fn seeded_store() -> Arc<dyn VenueStore> {
    Arc::new(MemoryVenueStore::new(vec![
        venue("far", "Khazar", [70, 150], 45.0, &["Lakeside", "Kids zone", "Stage"]),
        venue("close", "Khazar", [50, 100], 48.0, &["Lakeside", "Kids zone"]),
        venue("pricey", "Khazar", [60, 100], 80.0, &["Lakeside", "Kids zone"]),
        venue("no-kids", "Khazar", [60, 100], 30.0, &["Lakeside"]),
        venue("elsewhere", "Sabail", [60, 100], 30.0, &["Lakeside", "Kids zone"]),
    ]))
}

/// Completion stub answering by response schema name
struct ScriptedCompletion {
    filters: &'static str,
    intent: &'static str,
    reply: &'static str,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    fn new(filters: &'static str, intent: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            filters,
            intent,
            reply,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match request.schema.as_ref().map(|s| s.name) {
            Some("VenueFilters") => self.filters,
            Some("EventIntent") => self.intent,
            _ => self.reply,
        }
        .to_string())
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Completion stub that is always down
struct DownCompletion;

#[async_trait]
impl CompletionService for DownCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ServiceError> {
        Err(ServiceError::ServiceUnavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Err(ServiceError::ServiceUnavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_end_to_end_heuristic_request() {
    let pipeline = Pipeline::new(None, seeded_store(), PipelineOptions::default());

    let response = pipeline
        .respond(ChatRequest::new("Хазар, 80 гостей, до 50 AZN, озеро и детская зона"))
        .await;

    assert_eq!(response.intent, IntentKind::VenueSearch);
    assert_eq!(response.confidence, 0.9);
    assert_eq!(
        serde_json::to_value(response.filters_used.as_ref().unwrap()).unwrap(),
        json!({
            "district": "Khazar",
            "guest_count": 80,
            "price_per_guest_max": 50.0,
            "features": ["Kids zone", "Lakeside"]
        })
    );

    let ids: Vec<_> = response.shortlist.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["close", "far"]);

    assert_eq!(
        response.link.as_deref(),
        Some("https://evengo.space/search?district=Khazar&guest_count=80&price_per_guest_max=50&features=Kids%20zone,Lakeside")
    );
    assert!(response.reply.starts_with("1) Venue close — Khazar — 50–100 мест"));
    assert!(response.reply.ends_with(response.link.as_deref().unwrap()));
}

#[tokio::test]
async fn test_no_signal_without_services_is_off_topic() {
    let pipeline = Pipeline::new(None, seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("сколько длина экватора?")).await;

    assert_eq!(response.intent, IntentKind::OffTopic);
    assert_eq!(response.confidence, 1.0);
    assert!(response.shortlist.is_empty());
    assert!(response.link.is_none());
    assert!(response.filters_used.is_none());
    assert_eq!(response.reply, OFFTOPIC_REPLY);
}

#[tokio::test]
async fn test_over_long_text_is_off_topic() {
    let pipeline = Pipeline::new(None, seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("зал ".repeat(2000))).await;

    assert_eq!(response.intent, IntentKind::OffTopic);
    assert_eq!(response.confidence, 1.0);
}

#[tokio::test]
async fn test_classifier_decides_ambiguous_text() {
    let completion = ScriptedCompletion::new(
        "{}",
        r#"{"intent": "venue_search", "confidence": 0.7}"#,
        "Вот что нашлось",
    );
    let pipeline = Pipeline::new(Some(completion.clone()), seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("где отметить выпускной?")).await;

    assert_eq!(response.intent, IntentKind::VenueSearch);
    assert_eq!(response.confidence, 0.7);
    assert_eq!(response.reply, "Вот что нашлось");
    assert_eq!(response.shortlist.len(), 5);
    // extractor, classifier, generator
    assert_eq!(completion.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_other_intents_get_fixed_reply() {
    let completion = ScriptedCompletion::new(
        "{}",
        r#"{"intent": "booking_payment", "confidence": 0.85}"#,
        "unused",
    );
    let pipeline = Pipeline::new(Some(completion), seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("как внести предоплату?")).await;

    assert_eq!(response.intent, IntentKind::OffTopic);
    assert_eq!(response.confidence, 0.85);
    assert_eq!(response.reply, OFFTOPIC_REPLY);
}

#[tokio::test]
async fn test_low_confidence_search_is_off_topic() {
    let completion = ScriptedCompletion::new(
        "{}",
        r#"{"intent": "venue_search", "confidence": 0.3}"#,
        "unused",
    );
    let pipeline = Pipeline::new(Some(completion), seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("может быть что-то придумать?")).await;

    assert_eq!(response.intent, IntentKind::OffTopic);
    assert!(response.link.is_none());
}

#[tokio::test]
async fn test_semantic_filters_enable_fast_path() {
    let completion = ScriptedCompletion::new(
        r#"{"district": "Sabail", "guest_count": 70}"#,
        r#"{"intent": "off_topic", "confidence": 0.99}"#,
        "Подборка готова",
    );
    let pipeline = Pipeline::new(Some(completion.clone()), seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("что-нибудь уютное у бульвара")).await;

    assert_eq!(response.intent, IntentKind::VenueSearch);
    assert_eq!(response.confidence, 0.9);
    let ids: Vec<_> = response.shortlist.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["elsewhere"]);
    // classifier skipped
    assert_eq!(completion.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_completion_outage_keeps_heuristic_path() {
    let pipeline = Pipeline::new(Some(Arc::new(DownCompletion)), seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("Сабаиль, 60 гостей")).await;

    assert_eq!(response.intent, IntentKind::VenueSearch);
    assert_eq!(response.shortlist.len(), 1);
    assert!(response.reply.contains("Смотреть все: https://evengo.space/search?district=Sabail&guest_count=60"));
}

#[tokio::test]
async fn test_completion_outage_fails_closed_for_ambiguous_text() {
    let pipeline = Pipeline::new(Some(Arc::new(DownCompletion)), seeded_store(), PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("расскажи анекдот")).await;

    assert_eq!(response.intent, IntentKind::OffTopic);
    assert_eq!(response.confidence, 1.0);
}

#[tokio::test]
async fn test_openai_client_reads_output_items() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/responses")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "output": [{
                    "type": "message",
                    "content": [{"type": "output_text", "text": "{\"intent\":\"venue_search\",\"confidence\":0.8}"}]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = OpenAiClient::new(
        server.url(),
        "sk-test".to_string(),
        "gpt-4o-mini".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    let request = CompletionRequest {
        messages: vec![evengo_match::services::Message::user("привет")],
        schema: None,
    };
    let text = client.complete(&request).await.unwrap();

    assert_eq!(text, "{\"intent\":\"venue_search\",\"confidence\":0.8}");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_openai_client_maps_auth_failure() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("POST", "/responses")
        .with_status(401)
        .with_body("{\"error\": \"invalid key\"}")
        .create_async()
        .await;

    let client = OpenAiClient::new(
        server.url(),
        "sk-bad".to_string(),
        "gpt-4o-mini".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    let request = CompletionRequest {
        messages: vec![evengo_match::services::Message::user("привет")],
        schema: None,
    };
    let err = client.complete(&request).await.unwrap_err();

    assert_eq!(err.kind(), "credential_missing");
}

fn appwrite_client(url: String) -> AppwriteClient {
    AppwriteClient::new(
        url,
        "key".to_string(),
        "proj".to_string(),
        "db".to_string(),
        "venues".to_string(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_appwrite_store_decodes_documents() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/databases/db/collections/venues/documents".to_string()),
        )
        .match_header("x-appwrite-project", "proj")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "total": 2,
                "documents": [
                    {"$id": "a1", "name": "Lake House", "district": "Khazar", "capacity_min": 50, "capacity_max": 100},
                    {"data": {"id": "b2", "name": "Terrace", "district": "Khazar", "cuisine": ["Italian"]}}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = appwrite_client(server.url());
    let query = VenueQuery::unfiltered(50).with(Predicate::Equals {
        field: "district",
        value: "Khazar".to_string(),
    });

    let records = store.query(&query).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].clone().into_venue().id, "a1");
    assert_eq!(records[1].id.as_deref(), Some("b2"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_appwrite_store_missing_documents_is_malformed() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/databases/db/collections/venues/documents".to_string()),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{\"total\": 0}")
        .create_async()
        .await;

    let err = appwrite_client(server.url())
        .query(&VenueQuery::unfiltered(10))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "malformed_response");
}

#[tokio::test]
async fn test_store_outage_degrades_to_empty_shortlist() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock(
            "GET",
            mockito::Matcher::Regex(r"^/databases/db/collections/venues/documents".to_string()),
        )
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let store: Arc<dyn VenueStore> = Arc::new(appwrite_client(server.url()));
    let pipeline = Pipeline::new(None, store, PipelineOptions::default());

    let response = pipeline.respond(ChatRequest::new("Хазар, 80 гостей")).await;

    assert_eq!(response.intent, IntentKind::VenueSearch);
    assert!(response.shortlist.is_empty());
    assert_eq!(
        response.reply,
        "Смотреть все: https://evengo.space/search?district=Khazar&guest_count=80"
    );
}

#[tokio::test]
async fn test_sample_seed_file_loads() {
    let store = MemoryVenueStore::from_json_file("config/venues.sample.json").unwrap();
    assert_eq!(store.len(), 3);

    let pipeline = Pipeline::new(None, Arc::new(store), PipelineOptions::default());
    let response = pipeline.respond(ChatRequest::new("Ясамал, 60 гостей, терраса")).await;

    let ids: Vec<_> = response.shortlist.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["yasamal-garden"]);
}
