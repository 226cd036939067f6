use serde::{Deserialize, Serialize};
use validator::Validate;

/// Longest request text accepted by the chat endpoint
pub const MAX_TEXT_CHARS: u64 = 4000;

/// Free-text venue request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000))]
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub locale: Option<String>,
}

impl ChatRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: None,
        }
    }

    /// Decode a request body without ever failing
    ///
    /// Anything that is not a JSON object with a string `text` decodes to an
    /// empty request, which the pipeline answers as off-topic.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<ChatRequest>(body).unwrap_or_default()
    }
}
