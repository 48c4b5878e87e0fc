//! Identity provider client.
//!
//! The trait is the seam the session logic talks to. `GoTrueClient` speaks the
//! GoTrue HTTP API (Supabase Auth); tests substitute their own implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::session::Session;
use crate::config::ProviderConfig;
use crate::errors::ProviderError;
use crate::models::User;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Trades a single-use authorization code for a session.
    async fn exchange_code(
        &self,
        config: &ProviderConfig,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, ProviderError>;

    /// Mints a new session from a refresh token.
    async fn refresh(&self, config: &ProviderConfig, refresh_token: &str) -> Result<Session, ProviderError>;

    /// Looks up the user an access token belongs to.
    async fn get_user(&self, config: &ProviderConfig, access_token: &str) -> Result<User, ProviderError>;

    /// Revokes the session behind an access token.
    async fn sign_out(&self, config: &ProviderConfig, access_token: &str) -> Result<(), ProviderError>;
}

/// Token endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl TokenResponse {
    pub fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3600)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for a GoTrue-compatible auth server.
#[derive(Debug, Clone, Default)]
pub struct GoTrueClient {
    http: reqwest::Client,
}

impl GoTrueClient {
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    fn endpoint(config: &ProviderConfig, path: &str) -> String {
        format!("{}/auth/v1/{}", config.url, path)
    }

    fn with_key(request: RequestBuilder, config: &ProviderConfig) -> RequestBuilder {
        request.header("apikey", &config.public_key)
    }

    async fn check(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.error_description.or(b.msg).or(b.error))
            .unwrap_or(text);
        Err(ProviderError::Rejected { status: status.as_u16(), message })
    }

    async fn token_grant(
        &self,
        config: &ProviderConfig,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, ProviderError> {
        let request = self
            .http
            .post(Self::endpoint(config, "token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let response = Self::check(Self::with_key(request, config).send().await?).await?;
        let token: TokenResponse = response.json().await?;
        debug!(user = %token.user.id, grant_type, "token issued");
        Ok(token.into_session(Utc::now()))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn exchange_code(
        &self,
        config: &ProviderConfig,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, ProviderError> {
        let body = serde_json::json!({
            "auth_code": code,
            "code_verifier": code_verifier,
        });
        self.token_grant(config, "pkce", body).await
    }

    async fn refresh(&self, config: &ProviderConfig, refresh_token: &str) -> Result<Session, ProviderError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.token_grant(config, "refresh_token", body).await
    }

    async fn get_user(&self, config: &ProviderConfig, access_token: &str) -> Result<User, ProviderError> {
        let request = self.http.get(Self::endpoint(config, "user")).bearer_auth(access_token);
        let response = Self::check(Self::with_key(request, config).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn sign_out(&self, config: &ProviderConfig, access_token: &str) -> Result<(), ProviderError> {
        let request = self.http.post(Self::endpoint(config, "logout")).bearer_auth(access_token);
        Self::check(Self::with_key(request, config).send().await?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_prefers_absolute_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let json = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "expires_at": 1735693200,
            "token_type": "bearer",
            "user": {"id": "u-1", "email": "dev@example.com", "aud": "authenticated"}
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        let session = token.into_session(now);
        assert_eq!(session.expires_at, Utc.timestamp_opt(1735693200, 0).unwrap());
        assert_eq!(session.user.email.as_deref(), Some("dev@example.com"));
    }

    #[test]
    fn token_response_falls_back_to_relative_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let json = r#"{"access_token": "at", "refresh_token": "rt", "expires_in": 60, "user": {"id": "u-1"}}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.into_session(now).expires_at, now + Duration::seconds(60));
    }
}
