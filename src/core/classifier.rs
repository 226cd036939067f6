use crate::models::{Intent, IntentKind};
use crate::services::completion::extract_json;
use crate::services::{with_timeout, CompletionRequest, CompletionService, Message, ResponseSchema, ServiceError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const CLASSIFIER_INSTRUCTION: &str = "Ты классификатор намерений сервиса подбора площадок для мероприятий.\n\
Верни ТОЛЬКО JSON по схеме. Если в запросе есть признаки подбора площадки \
(район, число гостей, бюджет, кухня, особенности, дата), класс = venue_search.\n\
Вопросы об оплате, правилах, меню, логистике и подрядчиках относятся к своим классам, даже если в них есть числа.\n\
Любые вопросы, не связанные с мероприятиями, = off_topic.";

/// Few-shot anchors: (user text, intent, confidence)
const FEW_SHOT: &[(&str, IntentKind, f64)] = &[
    ("Сабаиль, 100 гостей, до 50 AZN, сцена и парковка", IntentKind::VenueSearch, 0.95),
    ("сколько длина экватора?", IntentKind::OffTopic, 0.99),
    ("Какую предоплату нужно внести за 3 дня до банкета?", IntentKind::BookingPayment, 0.9),
    ("сколько будет 12 умножить на 7?", IntentKind::OffTopic, 0.99),
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IntentPayload {
    intent: IntentKind,
    confidence: f64,
}

fn intent_schema() -> ResponseSchema {
    let kinds: Vec<&str> = IntentKind::ALL.iter().map(|k| k.as_str()).collect();

    ResponseSchema {
        name: "EventIntent",
        schema: json!({
            "type": "object",
            "properties": {
                "intent": {"type": "string", "enum": kinds},
                "confidence": {"type": "number", "minimum": 0, "maximum": 1}
            },
            "required": ["intent", "confidence"],
            "additionalProperties": false
        }),
        strict: true,
    }
}

/// Parse and validate raw classifier output
pub fn parse_intent(raw: &str) -> Result<Intent, ServiceError> {
    let payload: IntentPayload = serde_json::from_str(extract_json(raw))?;

    if !(0.0..=1.0).contains(&payload.confidence) {
        return Err(ServiceError::MalformedResponse(format!(
            "confidence out of range: {}",
            payload.confidence
        )));
    }

    Ok(Intent {
        kind: payload.intent,
        confidence: payload.confidence,
    })
}

/// Outcome of intent classification
#[derive(Debug)]
pub struct Classification {
    pub intent: Intent,
    /// Set when the fail-closed default was substituted
    pub fallback: Option<ServiceError>,
}

/// Semantic intent classifier; fails closed to off-topic
#[derive(Clone)]
pub struct IntentClassifier {
    service: Option<Arc<dyn CompletionService>>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(service: Option<Arc<dyn CompletionService>>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn classify(&self, text: &str) -> Classification {
        match self.try_classify(text).await {
            Ok(intent) => {
                tracing::debug!("Classified intent {} ({:.2})", intent.kind.as_str(), intent.confidence);
                Classification { intent, fallback: None }
            }
            Err(e) => {
                tracing::warn!("Intent classification unavailable ({}), defaulting to off_topic: {}", e.kind(), e);
                Classification {
                    intent: Intent::off_topic(),
                    fallback: Some(e),
                }
            }
        }
    }

    async fn try_classify(&self, text: &str) -> Result<Intent, ServiceError> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| ServiceError::CredentialMissing("no completion service configured".into()))?;

        let request = CompletionRequest {
            messages: build_messages(text),
            schema: Some(intent_schema()),
        };

        let raw = with_timeout(self.timeout, service.complete(&request)).await?;
        parse_intent(&raw)
    }
}

fn build_messages(text: &str) -> Vec<Message> {
    let mut messages = vec![Message::system(CLASSIFIER_INSTRUCTION)];

    for (example, kind, confidence) in FEW_SHOT {
        messages.push(Message::user(*example));
        messages.push(Message::assistant(
            json!({"intent": kind.as_str(), "confidence": confidence}).to_string(),
        ));
    }

    messages.push(Message::user(text));
    messages
}
