use crate::models::VenueRecord;
use crate::services::error::ServiceError;
use crate::services::store::{decode_record, Predicate, VenueQuery, VenueStore};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Appwrite API client for the venues collection
///
/// Translates a [`VenueQuery`] into Appwrite query strings and decodes the
/// returned documents into [`VenueRecord`]s.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    collection: String,
    client: Client,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collection: String,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::ServiceUnavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            collection,
            client,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collection
        )
    }

    /// Render a query as Appwrite query strings
    pub fn render_queries(query: &VenueQuery) -> Vec<String> {
        let mut queries = Vec::new();

        for predicate in query.predicates() {
            match predicate {
                Predicate::CapacityBand { guests } => {
                    queries.push(format!("lessThanEqual(\"capacity_min\", [{}])", guests));
                    queries.push(format!("greaterThanEqual(\"capacity_max\", [{}])", guests));
                }
                Predicate::Equals { field, value } => {
                    queries.push(format!("equal(\"{}\", [{}])", field, quote(value)));
                }
                Predicate::ArrayContains { field, value } => {
                    queries.push(format!("contains(\"{}\", [{}])", field, quote(value)));
                }
            }
        }

        queries.push(format!("limit({})", query.limit()));
        queries
    }

    async fn list_documents(&self, queries: &[String]) -> Result<Value, ServiceError> {
        let query_string = queries
            .iter()
            .map(|q| format!("queries[]={}", urlencoding::encode(q)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}?{}", self.documents_url(), query_string);

        tracing::debug!("Querying venues: {:?}", queries);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::warn!("Venue query failed: {} - {}", status, body);
            return Err(ServiceError::from_status("venue store", status));
        }

        Ok(response.json().await?)
    }
}

// Escaped JSON string literal, as Appwrite expects for string values
fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

#[async_trait]
impl VenueStore for AppwriteClient {
    async fn query(&self, query: &VenueQuery) -> Result<Vec<VenueRecord>, ServiceError> {
        let json = self.list_documents(&Self::render_queries(query)).await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| ServiceError::MalformedResponse("Missing documents array".into()))?;

        let records: Vec<VenueRecord> = documents
            .iter()
            .cloned()
            .filter_map(decode_record)
            .take(query.limit())
            .collect();

        tracing::debug!("Fetched {} venue documents (total: {})", records.len(), total);

        Ok(records)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.list_documents(&["limit(1)".to_string()]).await.map(|_| ())
    }
}
