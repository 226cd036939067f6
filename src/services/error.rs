use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failures of an external collaborator
///
/// None of these escape the pipeline: each call site maps them to its
/// documented default.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("credential missing: {0}")]
    CredentialMissing(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    /// Short machine-readable name, used in logs and the selftest probe
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::CredentialMissing(_) => "credential_missing",
            ServiceError::ServiceUnavailable(_) => "service_unavailable",
            ServiceError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Map a non-success HTTP status to the taxonomy
    pub fn from_status(service: &str, status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            ServiceError::CredentialMissing(format!("{} rejected credentials ({})", service, status))
        } else {
            ServiceError::ServiceUnavailable(format!("{} returned {}", service, status))
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::MalformedResponse(err.to_string())
        } else {
            ServiceError::ServiceUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::MalformedResponse(err.to_string())
    }
}

/// Run an external call under a hard deadline
pub async fn with_timeout<T, F>(duration: Duration, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(duration, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::ServiceUnavailable(format!(
            "timed out after {}ms",
            duration.as_millis()
        ))),
    }
}
