//! JSON-over-HTTP plumbing shared by the remote trace source and the catalog

use super::SourceError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Request timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, SourceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = error_message(&text)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());
        tracing::warn!(status = status.as_u16(), %message, "service returned an error");
        return Err(SourceError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let value: Value = serde_json::from_str(&text)?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_member(&value).unwrap_or_else(|| "request rejected".to_string());
        return Err(SourceError::Rejected(message));
    }
    Ok(serde_json::from_value(value)?)
}

/// Human-readable reason from an error body: `error` (plus `details`), else the raw text
fn error_message(text: &str) -> Option<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => error_member(&value),
        Err(_) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

fn error_member(value: &Value) -> Option<String> {
    let error = value.get("error")?.as_str()?;
    match value.get("details").and_then(Value::as_str) {
        Some(details) => Some(format!("{error} ({details})")),
        None => Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_ignores_extra_slashes() {
        let client = ApiClient::new("http://localhost:5000/api/", DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("/trace"), "http://localhost:5000/api/trace");
        assert_eq!(
            client.url("algorithm/interval-coverage/trace"),
            "http://localhost:5000/api/algorithm/interval-coverage/trace"
        );
    }

    #[test]
    fn test_error_message_prefers_error_member() {
        assert_eq!(
            error_message(r#"{"success": false, "error": "Invalid input format", "details": "bad schema"}"#),
            Some("Invalid input format (bad schema)".to_string())
        );
        assert_eq!(
            error_message(r#"{"error": "Missing 'intervals' in request body"}"#),
            Some("Missing 'intervals' in request body".to_string())
        );
    }

    #[test]
    fn test_error_message_falls_back_to_text() {
        assert_eq!(
            error_message("upstream exploded\n"),
            Some("upstream exploded".to_string())
        );
        assert_eq!(error_message("   "), None);
        assert_eq!(error_message(r#"{"status": "bad"}"#), None);
    }
}
