use actix_web::{web, HttpResponse, Responder};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use crate::core::Pipeline;
use crate::models::{ChatRequest, ChatResponse, HealthResponse, SelftestResponse};
use crate::services::{with_timeout, CompletionService, ServiceError, VenueStore};

const USAGE_HTML: &str = "<!doctype html><html><body>\
<p>POST JSON <code>{\"text\": \"...\", \"locale\": \"ru\"}</code> to this URL \
to get a venue shortlist.</p></body></html>";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub completion: Option<Arc<dyn CompletionService>>,
    pub store: Arc<dyn VenueStore>,
}

/// Configure all chat-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/selftest", web::get().to(selftest))
        .route("/chat", web::get().to(chat_usage))
        .route("/chat", web::post().to(chat));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn probe_status(result: Result<(), ServiceError>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!("Selftest probe failed: {}", e);
            e.kind().to_string()
        }
    }
}

/// Probe both external services
///
/// GET /api/v1/selftest
async fn selftest(state: web::Data<AppState>) -> impl Responder {
    let completion = match &state.completion {
        Some(service) => probe_status(with_timeout(PROBE_TIMEOUT, service.ping()).await),
        None => probe_status(Err(ServiceError::CredentialMissing("no completion api key".into()))),
    };
    let store = probe_status(with_timeout(PROBE_TIMEOUT, state.store.ping()).await);

    HttpResponse::Ok().json(SelftestResponse {
        has_key: state.completion.is_some(),
        completion,
        store,
    })
}

async fn chat_usage() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(USAGE_HTML)
}

/// Venue chat endpoint
///
/// POST /api/v1/chat
///
/// Request body:
/// ```json
/// {
///   "text": "Хазар, 80 гостей, до 50 AZN",
///   "locale": "ru"
/// }
/// ```
///
/// Always answers 200 with a [`ChatResponse`]; malformed bodies are treated
/// as empty text.
async fn chat(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let request = ChatRequest::from_body(&body);
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    let pipeline = state.pipeline.clone();
    let outcome = AssertUnwindSafe(pipeline.respond(request))
        .catch_unwind()
        .instrument(span)
        .await;

    let response = outcome.unwrap_or_else(|_| {
        tracing::error!(%request_id, "Chat pipeline panicked, returning degraded reply");
        ChatResponse::degraded()
    });

    HttpResponse::Ok().json(response)
}
