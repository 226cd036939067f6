use crate::services::error::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Speaker of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One prompt message; a message may carry several text parts
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<String>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, parts: vec![text.into()] }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![text.into()] }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, parts: vec![text.into()] }
    }
}

/// JSON schema constraining a structured completion
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
    pub strict: bool,
}

/// Prompt sent to a completion service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub schema: Option<ResponseSchema>,
}

/// Text completion backend shared by the extractor, classifier and formatter
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return its output text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError>;

    /// Cheap reachability probe
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// Client for an OpenAI-compatible Responses API
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Serialize)]
struct ResponsesApiRequest<'a> {
    model: &'a str,
    input: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct ResponsesApiResponse {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentItem>,
}

#[derive(Deserialize, Debug)]
struct ContentItem {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesApiResponse {
    fn into_text(self) -> String {
        if let Some(text) = self.output_text {
            return text;
        }

        self.output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|c| c.kind.as_deref().map_or(true, |k| k == "output_text"))
            .filter_map(|c| c.text)
            .collect::<Vec<_>>()
            .join("")
    }
}

impl OpenAiClient {
    /// Create a new completion client
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        if api_key.trim().is_empty() {
            return Err(ServiceError::CredentialMissing("completion api key is empty".into()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::ServiceUnavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn encode_message(message: &Message) -> Value {
        // Assistant turns are replayed as model output
        let part_type = match message.role {
            Role::Assistant => "output_text",
            Role::System | Role::User => "input_text",
        };

        let content: Vec<Value> = message
            .parts
            .iter()
            .map(|text| json!({ "type": part_type, "text": text }))
            .collect();

        json!({ "role": message.role, "content": content })
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let body = ResponsesApiRequest {
            model: &self.model,
            input: request.messages.iter().map(Self::encode_message).collect(),
            text: request.schema.as_ref().map(|s| {
                json!({
                    "format": {
                        "type": "json_schema",
                        "name": s.name,
                        "schema": s.schema,
                        "strict": s.strict,
                    }
                })
            }),
        };

        let response = self
            .client
            .post(self.url("responses"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_status("completion", response.status()));
        }

        let parsed: ResponsesApiResponse = response.json().await?;
        let text = parsed.into_text();

        tracing::debug!("Completion returned {} chars", text.len());

        Ok(text)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_status("completion", response.status()));
        }

        Ok(())
    }
}

/// Extract a JSON document from model output, unwrapping markdown fences
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop an optional language tag on the opening fence
        let body = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest,
        };
        if let Some(end) = body.rfind("```") {
            return body[..end].trim();
        }
    }

    trimmed
}
