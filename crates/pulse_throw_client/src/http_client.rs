//! HTTP client implementation for the Pulse third-party API.
//!
//! This module provides a reqwest-based implementation of the [`PulseClient`](crate::PulseClient) trait.
//! Requests are authorized with a bearer token obtained by exchanging the long-lived
//! refresh token issued by Pulse.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::json;

use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::utils::resolve_user_ids;
use crate::{DailySnapshot, DateRange, Profile, PulseClient, PulseError, Team, ThrowEvent};

/// Client for the Pulse API using reqwest.
///
/// Cloning is cheap and clones share the OAuth session.
#[derive(Clone, Debug)]
pub struct ReqwestPulseClient {
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    client: reqwest::Client,
    session: Arc<RwLock<Session>>,
    // Held across the token exchange so concurrent requests refresh only once.
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

#[derive(Debug)]
struct Session {
    refresh_token: SecretString,
    access_token: Option<AccessToken>,
    user_id: Option<String>,
    /// Bumped by every successful token exchange.
    generation: u64,
}

#[derive(Debug)]
struct AccessToken {
    secret: SecretString,
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

impl ReqwestPulseClient {
    /// Create a new, unauthenticated client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Pulse API (e.g. [`DEFAULT_BASE_URL`](crate::config::DEFAULT_BASE_URL))
    /// * `client_id` - API client id provided by Pulse
    /// * `client_secret` - API client secret provided by Pulse
    /// * `refresh_token` - API refresh token provided by Pulse
    pub fn new(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self::with_timeout(
            base_url,
            client_id,
            client_secret,
            refresh_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Like [`new`](Self::new) with a per-request timeout.
    pub fn with_timeout(
        base_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret,
            client,
            session: Arc::new(RwLock::new(Session {
                refresh_token,
                access_token: None,
                user_id: None,
                generation: 0,
            })),
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::with_timeout(
            &cfg.base_url,
            cfg.client_id.clone(),
            cfg.client_secret.clone(),
            cfg.refresh_token.clone(),
            cfg.timeout,
        )
    }

    /// Exchange the refresh token for an access token.
    ///
    /// The session owner's user id is taken from the token response the first time.
    /// If Pulse rotates the refresh token, the new one replaces the old.
    pub async fn authenticate(&self) -> Result<(), PulseError> {
        let url = format!("{}/oauth/token", self.base_url);
        let refresh_token = self.read_session().refresh_token.clone();
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
        ];
        let resp = self.client.post(&url).form(&form).send().await?;
        let status = resp.status();
        metrics::counter!(
            "pulse_token_requests_total",
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        if !status.is_success() {
            return Err(match self.error_from_response(resp).await {
                PulseError::InvalidInput(body) => PulseError::Auth(body),
                other => other,
            });
        }
        let token: TokenResponse = resp.json().await?;

        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        session.access_token = Some(AccessToken {
            secret: SecretString::new(token.access_token.into()),
            expires_at: token
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        });
        if let Some(rotated) = token.refresh_token {
            session.refresh_token = SecretString::new(rotated.into());
        }
        if session.user_id.is_none() {
            session.user_id = token.user_id;
        }
        session.generation += 1;
        tracing::info!(
            user_id = session.user_id.as_deref().unwrap_or_default(),
            expires_in = token.expires_in,
            "pulse: session authenticated"
        );
        Ok(())
    }

    /// Whether an access token has been obtained.
    pub fn is_authenticated(&self) -> bool {
        self.read_session().access_token.is_some()
    }

    /// User id of the owner of the session, known once authenticated.
    pub fn user_id(&self) -> Option<String> {
        self.read_session().user_id.clone()
    }

    fn read_session(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current access token, refreshed first if it has expired.
    ///
    /// Requests that find the same expired token wait for a single exchange; the
    /// refresh token may be rotated by it, so a second exchange would be rejected.
    async fn access_token(&self) -> Result<SecretString, PulseError> {
        let (expired, generation) = {
            let session = self.read_session();
            match &session.access_token {
                None => return Err(PulseError::Unauthenticated),
                Some(token) => (token.is_expired(), session.generation),
            }
        };
        if expired {
            let _refresh = self.refresh_lock.lock().await;
            let refreshed_meanwhile = self.read_session().generation != generation;
            if !refreshed_meanwhile {
                tracing::debug!("pulse: access token expired, refreshing");
                self.authenticate().await?;
            }
        }
        self.read_session()
            .access_token
            .as_ref()
            .map(|token| token.secret.clone())
            .ok_or(PulseError::Unauthenticated)
    }

    /// JSON payload shared by the range-based endpoints.
    fn range_payload(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<serde_json::Value, PulseError> {
        if !self.is_authenticated() {
            return Err(PulseError::Unauthenticated);
        }
        let (start, end) = range.resolve()?;
        let users = match self.user_id() {
            Some(owner) => resolve_user_ids(user_ids, &owner),
            None if !user_ids.is_empty() => user_ids.to_vec(),
            None => {
                return Err(PulseError::InvalidInput(
                    "no user ids given and the session user is unknown".into(),
                ));
            }
        };
        Ok(json!({
            "payload": {
                "pulseUserIds": users,
                "startDate": start.to_string(),
                "endDate": end.to_string(),
            }
        }))
    }

    /// POST to an API endpoint and unwrap the `data` field of the response.
    async fn post_data<T: DeserializeOwned>(
        &self,
        slug: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, PulseError> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", self.base_url, slug);
        let mut request = self.client.post(&url).bearer_auth(token.expose_secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(endpoint = slug, "pulse: request");
        let resp = request.send().await?;
        let status = resp.status();
        metrics::counter!(
            "pulse_api_requests_total",
            "endpoint" => slug.to_string(),
            "status" => status.as_u16().to_string()
        )
        .increment(1);
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }

        // Read body as text first so we can provide a helpful error message
        // when the returned JSON doesn't match the expected shape.
        let text = resp.text().await?;
        serde_json::from_str::<Envelope<T>>(&text)
            .map(|envelope| envelope.data)
            .map_err(|e| {
                let body_snippet: String = text.chars().take(512).collect();
                PulseError::Decode(format!("{slug}: {e} - body: {body_snippet}"))
            })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> PulseError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        tracing::warn!(status, body = %body_snippet, "pulse: request failed");

        match status {
            404 => PulseError::NotFound(body_snippet),
            401 | 403 => PulseError::Auth(body_snippet),
            400 | 422 => PulseError::InvalidInput(body_snippet),
            _ => PulseError::from_status(status, body_snippet),
        }
    }
}

impl fmt::Display for ReqwestPulseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.user_id() {
            Some(id) if !id.is_empty() => write!(f, "PulseClient({id})"),
            _ => write!(f, "PulseClient(<Unauthenticated>)"),
        }
    }
}

#[async_trait]
impl PulseClient for ReqwestPulseClient {
    async fn get_profile(&self) -> Result<Profile, PulseError> {
        self.post_data("user/get_profile", None).await
    }

    async fn get_team(&self) -> Result<Team, PulseError> {
        self.post_data("user/get_team", None).await
    }

    async fn get_snapshots(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<DailySnapshot>>, PulseError> {
        let payload = self.range_payload(range, user_ids)?;
        self.post_data("user/get_snapshots", Some(&payload)).await
    }

    async fn get_events(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<ThrowEvent>>, PulseError> {
        let payload = self.range_payload(range, user_ids)?;
        self.post_data("user/get_events", Some(&payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ReqwestPulseClient {
        ReqwestPulseClient::new(
            "http://localhost/",
            "cid",
            SecretString::new("secret".into()),
            SecretString::new("refresh".into()),
        )
    }

    #[test]
    fn new_client_is_unauthenticated() {
        let client = client();
        assert!(!client.is_authenticated());
        assert_eq!(client.user_id(), None);
        assert_eq!(client.to_string(), "PulseClient(<Unauthenticated>)");
        assert_eq!(client.base_url, "http://localhost");
    }

    #[test]
    fn range_payload_requires_authentication() {
        let client = client();
        let res = client.range_payload(DateRange::recent(), &[]);
        assert!(matches!(res, Err(PulseError::Unauthenticated)));
    }

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let res = client().get_profile().await;
        assert!(matches!(res, Err(PulseError::Unauthenticated)));
    }

    #[test]
    fn token_user_id_accepts_numbers() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"a","user_id":42}"#).expect("token");
        assert_eq!(token.user_id.as_deref(), Some("42"));
        assert_eq!(token.expires_in, None);
    }

    #[test]
    fn token_without_expiry_never_expires() {
        let token = AccessToken {
            secret: SecretString::new("a".into()),
            expires_at: None,
        };
        assert!(!token.is_expired());
        let stale = AccessToken {
            secret: SecretString::new("a".into()),
            expires_at: Some(Instant::now()),
        };
        assert!(stale.is_expired());
    }
}
