//! Collaborator gateways — the narrow interfaces the dispatch engine
//! consumes from the rest of the platform.
//!
//! Four external services, each behind a trait:
//! - **ProfileDirectory** — user id → display name/email, rendering only
//! - **SubjectCatalog** — subject id → name, rendering only
//! - **MeetingProvisioner** — session id → meeting room URL, idempotent
//!   per session id on the provider side
//! - **Notifier** — fire-and-forget event delivery
//!
//! None of these participate in the state machine; the store's conditional
//! writes are the only coordination mechanism.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::models::profile::Profile;
use crate::models::subject::Subject;

// ============================================================================
// Traits
// ============================================================================

#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn lookup(&self, user_id: Uuid) -> Result<Profile, GatewayError>;
}

#[async_trait]
pub trait SubjectCatalog: Send + Sync {
    async fn subject(&self, subject_id: Uuid) -> Result<Subject, GatewayError>;
}

#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    /// Obtain a meeting room URL for the session. The provider is assumed
    /// idempotent per session id: repeated calls return the same URL.
    async fn provision(&self, session_id: Uuid) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Fire-and-forget. Callers log failures; users never see them.
    async fn notify(
        &self,
        user_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), GatewayError>;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Invalid response: missing {0}")]
    MissingField(&'static str),
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// reqwest-backed implementation of all four gateway traits against the
/// configured base URLs.
#[derive(Debug, Clone)]
pub struct HttpGateways {
    client: Client,
    profiles_url: String,
    subjects_url: String,
    meetings_url: String,
    notifications_url: String,
    max_retries: usize,
    retry_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
struct MeetingResponse {
    url: Option<String>,
}

impl HttpGateways {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            profiles_url: config.profiles_url.trim_end_matches('/').to_string(),
            subjects_url: config.subjects_url.trim_end_matches('/').to_string(),
            meetings_url: config.meetings_url.trim_end_matches('/').to_string(),
            notifications_url: config.notifications_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    async fn provision_once(&self, session_id: Uuid) -> Result<String, GatewayError> {
        let response = self
            .client
            .post(&self.meetings_url)
            .json(&serde_json::json!({ "sessionId": session_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: MeetingResponse = response.json().await?;
        body.url.ok_or(GatewayError::MissingField("url"))
    }
}

#[async_trait]
impl ProfileDirectory for HttpGateways {
    async fn lookup(&self, user_id: Uuid) -> Result<Profile, GatewayError> {
        let response = self
            .client
            .get(format!("{}/{}", self.profiles_url, user_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SubjectCatalog for HttpGateways {
    async fn subject(&self, subject_id: Uuid) -> Result<Subject, GatewayError> {
        let response = self
            .client
            .get(format!("{}/{}", self.subjects_url, subject_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl MeetingProvisioner for HttpGateways {
    async fn provision(&self, session_id: Uuid) -> Result<String, GatewayError> {
        // The provider is idempotent per session id, so retrying a flaky
        // call can never hand out a second room for the same session.
        let strategy = ExponentialBackoff::from_millis(self.retry_delay_ms)
            .map(jitter)
            .take(self.max_retries);

        Retry::spawn(strategy, || self.provision_once(session_id)).await
    }
}

#[async_trait]
impl Notifier for HttpGateways {
    async fn notify(
        &self,
        user_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.notifications_url)
            .json(&serde_json::json!({
                "userId": user_id,
                "event": event,
                "payload": payload,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> GatewayConfig {
        GatewayConfig {
            profiles_url: format!("{}/profiles", base),
            subjects_url: format!("{}/subjects", base),
            meetings_url: format!("{}/meetings", base),
            notifications_url: format!("{}/notify", base),
            request_timeout_seconds: 5,
            max_retries: 2,
            retry_delay_ms: 10,
        }
    }

    #[tokio::test]
    async fn test_provision_returns_url() {
        let server = MockServer::start().await;
        let session_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/meetings"))
            .and(body_partial_json(
                serde_json::json!({ "sessionId": session_id }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://meet.example.com/room-42"
            })))
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        let url = gateways.provision(session_id).await.unwrap();
        assert_eq!(url, "https://meet.example.com/room-42");
    }

    #[tokio::test]
    async fn test_provision_retries_transient_failure() {
        let server = MockServer::start().await;

        // First call fails, retry succeeds.
        Mock::given(method("POST"))
            .and(path("/meetings"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/meetings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://meet.example.com/room-7"
            })))
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        let url = gateways.provision(Uuid::new_v4()).await.unwrap();
        assert_eq!(url, "https://meet.example.com/room-7");
    }

    #[tokio::test]
    async fn test_provision_exhausts_retries() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/meetings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        let err = gateways.provision(Uuid::new_v4()).await.unwrap_err();
        match err {
            GatewayError::Api { code, .. } => assert_eq!(code, 500),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_provision_missing_url_field() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/meetings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"room": "nope"})),
            )
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        let err = gateways.provision(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingField("url")));
    }

    #[tokio::test]
    async fn test_profile_lookup() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/profiles/{}", user_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "displayName": "Ada Lovelace",
                "email": "ada@example.com"
            })))
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        let profile = gateways.lookup(user_id).await.unwrap();
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert_eq!(profile.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_subject_lookup_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such subject"))
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        let err = gateways.subject(Uuid::new_v4()).await.unwrap_err();
        match err {
            GatewayError::Api { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message, "no such subject");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notify_posts_envelope() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(body_partial_json(serde_json::json!({
                "userId": user_id,
                "event": "session_claimed",
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let gateways = HttpGateways::new(&test_config(&server.uri())).unwrap();
        gateways
            .notify(
                user_id,
                "session_claimed",
                serde_json::json!({"meetingUrl": "https://meet.example.com/x"}),
            )
            .await
            .unwrap();
    }
}
