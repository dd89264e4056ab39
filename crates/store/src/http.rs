//! HTTP implementation of the document backend.
//!
//! Speaks the store's v3 REST dialect: token auth, a mandatory
//! `User-Agent`, and JSON bodies. Error bodies are reduced to their
//! `message` field before they reach logs.

use std::time::Duration;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::backend::DocumentBackend;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::types::{DocumentPayload, RawDocument};

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = "Romeria-Website/1.0";

// Global HTTP client with connection pooling
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to build HTTP client")
});

/// Backend that talks to the real document store over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: StoreConfig,
}

impl HttpBackend {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .timeout(Duration::from_secs(self.config.timeout_secs));
        match self.config.token() {
            Some(token) => builder.header("Authorization", format!("token {token}")),
            None => builder,
        }
    }
}

impl DocumentBackend for HttpBackend {
    async fn create(&self, payload: &DocumentPayload) -> Result<RawDocument, StoreError> {
        let response = self
            .request(HTTP_CLIENT.post(self.config.issues_url()))
            .json(payload)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("body was not JSON: {e}")))?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), &body));
        }

        serde_json::from_value(body)
            .map_err(|e| StoreError::InvalidResponse(format!("unexpected document shape: {e}")))
    }

    async fn list(&self, label: &str) -> Result<Vec<RawDocument>, StoreError> {
        let response = self
            .request(HTTP_CLIENT.get(self.config.issues_url()).query(&[
                ("state", "open"),
                ("labels", label),
                ("sort", "created"),
                ("direction", "desc"),
                ("per_page", "100"),
            ]))
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(error_for_status(status.as_u16(), &body));
        }

        response
            .json::<Vec<RawDocument>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("unexpected list shape: {e}")))
    }
}

fn error_for_status(status: u16, body: &Value) -> StoreError {
    let detail = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no error detail in response")
        .to_string();
    match status {
        401 | 403 => StoreError::Auth { status },
        422 => StoreError::Validation { detail },
        _ => StoreError::Api { status, detail },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_routing() {
        let body = json!({ "message": "Validation Failed" });
        assert!(matches!(
            error_for_status(422, &body),
            StoreError::Validation { .. }
        ));
        assert_eq!(error_for_status(401, &body), StoreError::Auth { status: 401 });
        assert_eq!(error_for_status(403, &body), StoreError::Auth { status: 403 });
        assert_eq!(
            error_for_status(500, &body),
            StoreError::Api {
                status: 500,
                detail: "Validation Failed".into()
            }
        );
    }

    #[test]
    fn missing_message_gets_placeholder() {
        let err = error_for_status(500, &Value::Null);
        assert_eq!(
            err,
            StoreError::Api {
                status: 500,
                detail: "no error detail in response".into()
            }
        );
    }
}
