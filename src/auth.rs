//! Email/password authentication against the backend's auth API.

use crate::client::{error_message, join_dir};
use crate::config::Config;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use url::Url;
use uuid::Uuid;

const AUTH_PATH: &str = "auth/v1/";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const REFRESH_BUFFER_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("auth service unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("not signed in")]
    NotAuthenticated,

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh_at(Utc::now())
    }

    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_BUFFER_SECS) >= self.expires_at
    }
}

/// Token endpoint response. Sign-up omits the tokens when the project
/// requires email confirmation.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: Option<User>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        let access_token = self.access_token?;
        let refresh_token = self.refresh_token?;
        let user = self.user?;
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600)));
        Some(Session {
            access_token,
            refresh_token,
            expires_at,
            user,
        })
    }
}

/// Outcome of a sign-up.
#[derive(Debug)]
pub enum SignUp {
    SignedIn(Session),
    ConfirmationRequired,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
    base_url: Url,
    anon_key: String,
}

impl AuthClient {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Self::with_http(http, &config.backend_url, &config.anon_key)
    }

    pub fn with_http(http: Client, backend_url: &Url, anon_key: &str) -> Result<Self, AuthError> {
        let base_url = join_dir(backend_url, AUTH_PATH)
            .map_err(|err| AuthError::Rejected(format!("invalid backend url: {err}")))?;
        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.to_string(),
        })
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self.token_request("password", &body).await?;
        response
            .into_session()
            .ok_or_else(|| AuthError::Rejected("sign-in returned no session".into()))
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, AuthError> {
        let url = self.endpoint("signup")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let body: TokenResponse = response.json().await?;
        Ok(match body.into_session() {
            Some(session) => SignUp::SignedIn(session),
            None => SignUp::ConfirmationRequired,
        })
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response = self.token_request("refresh_token", &body).await?;
        response
            .into_session()
            .ok_or_else(|| AuthError::Rejected("refresh returned no session".into()))
    }

    /// Revokes the session on the backend.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("logout")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }

    async fn token_request(&self, grant_type: &str, body: &serde_json::Value) -> Result<TokenResponse, AuthError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        Ok(response.json().await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|err| AuthError::Rejected(format!("invalid auth url: {err}")))
    }
}

/// 4xx means the credentials or token were refused; anything else is the
/// service failing and says nothing about the session.
async fn failure(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let message = error_message(response).await;
    if status.is_client_error() {
        AuthError::Rejected(message)
    } else {
        AuthError::Unavailable {
            status: status.as_u16(),
            message,
        }
    }
}
