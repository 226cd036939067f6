use crate::core::{link::fmt_number, matcher::SHORTLIST_LIMIT};
use crate::models::Venue;
use crate::services::{with_timeout, CompletionRequest, CompletionService, Message, Role, ServiceError};
use std::sync::Arc;
use std::time::Duration;

const SHORTLIST_INSTRUCTION: &str = "Ты ассистент Evengo для подбора площадок и услуг для мероприятий в Азербайджане. \
Отвечай ТОЛЬКО по теме. Если запрос вне тематики, отвечай фиксированной фразой. \
Собери шорт-лист до 7 карточек: «Название — район — X–Y мест — ~цена/гость — краткая фича». \
В конце выведи ровно одну ссылку link.";

fn fmt_opt_u32(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

fn fmt_opt_price(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), fmt_number)
}

/// Deterministic shortlist text: one numbered line per venue, then the link
pub fn fallback_text(venues: &[Venue], link: &str) -> String {
    let mut lines: Vec<String> = venues
        .iter()
        .take(SHORTLIST_LIMIT)
        .enumerate()
        .map(|(i, v)| {
            format!(
                "{}) {} — {} — {}–{} мест — ~{}–{} AZN/гость",
                i + 1,
                v.name.as_deref().unwrap_or("?"),
                v.district.as_deref().unwrap_or("?"),
                fmt_opt_u32(v.capacity[0]),
                fmt_opt_u32(v.capacity[1]),
                fmt_opt_price(v.price_per_guest[0]),
                fmt_opt_price(v.price_per_guest[1]),
            )
        })
        .collect();

    lines.push(format!("Смотреть все: {}", link));
    lines.join("\n")
}

/// Rendered reply and why the fallback was used, if it was
#[derive(Debug)]
pub struct Rendering {
    pub text: String,
    pub fallback: Option<ServiceError>,
}

/// Renders shortlists, preferring the text generator
#[derive(Clone)]
pub struct ShortlistFormatter {
    service: Option<Arc<dyn CompletionService>>,
    timeout: Duration,
}

impl ShortlistFormatter {
    pub fn new(service: Option<Arc<dyn CompletionService>>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    pub async fn render(&self, text: &str, venues: &[Venue], link: &str, locale: Option<&str>) -> Rendering {
        match self.generate(text, venues, link, locale).await {
            Ok(reply) => Rendering { text: reply, fallback: None },
            Err(e) => {
                tracing::warn!("Shortlist generator unavailable ({}), using fallback text: {}", e.kind(), e);
                Rendering {
                    text: fallback_text(venues, link),
                    fallback: Some(e),
                }
            }
        }
    }

    async fn generate(
        &self,
        text: &str,
        venues: &[Venue],
        link: &str,
        locale: Option<&str>,
    ) -> Result<String, ServiceError> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| ServiceError::CredentialMissing("no completion service configured".into()))?;

        let items = serde_json::json!({ "items": venues }).to_string();
        let link_json = serde_json::json!({ "link": link }).to_string();

        let request = CompletionRequest {
            messages: vec![
                Message::system(SHORTLIST_INSTRUCTION),
                Message {
                    role: Role::User,
                    parts: vec![text.to_string(), format!("[locale={}]", locale.unwrap_or("auto"))],
                },
                Message::assistant(items),
                Message::assistant(link_json),
            ],
            schema: None,
        };

        let reply = with_timeout(self.timeout, service.complete(&request)).await?;
        let reply = reply.trim();

        if reply.is_empty() {
            return Err(ServiceError::MalformedResponse("generator returned empty text".into()));
        }

        Ok(reply.to_string())
    }
}
