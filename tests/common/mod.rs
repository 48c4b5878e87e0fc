#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tasktiles::auth::{IdentityProvider, Session};
use tasktiles::config::{AppConfig, ProviderConfig};
use tasktiles::errors::ProviderError;
use tasktiles::models::User;

pub const GOOD_CODE: &str = "good-code";
pub const CODE_ACCESS: &str = "access-from-code";
pub const REFRESHED_ACCESS: &str = "access-refreshed";
pub const GOOD_REFRESH: &str = "refresh-1";

pub fn configured() -> AppConfig {
    AppConfig {
        provider_url: Some("https://project.supabase.co".into()),
        public_key: Some("anon-key".into()),
        site_url: None,
    }
}

pub fn test_user() -> User {
    User { id: "user-1".into(), email: Some("dev@example.com".into()) }
}

fn session(access: &str, refresh: &str) -> Session {
    Session {
        access_token: access.into(),
        refresh_token: refresh.into(),
        expires_at: Utc::now() + Duration::hours(1),
        user: test_user(),
    }
}

fn rejected(status: u16, message: &str) -> ProviderError {
    ProviderError::Rejected { status, message: message.into() }
}

/// In-memory provider that accepts one code, one refresh token and the
/// access tokens it issued itself.
#[derive(Default)]
pub struct MockProvider {
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub sign_outs: AtomicUsize,
    pub last_verifier: Mutex<Option<String>>,
}

impl MockProvider {
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn exchange_code(
        &self,
        _config: &ProviderConfig,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, ProviderError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        *self.last_verifier.lock().unwrap() = code_verifier.map(str::to_string);
        if code == GOOD_CODE {
            Ok(session(CODE_ACCESS, GOOD_REFRESH))
        } else {
            Err(rejected(400, "invalid flow state"))
        }
    }

    async fn refresh(&self, _config: &ProviderConfig, refresh_token: &str) -> Result<Session, ProviderError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if refresh_token == GOOD_REFRESH {
            Ok(session(REFRESHED_ACCESS, "refresh-2"))
        } else {
            Err(rejected(400, "Invalid Refresh Token"))
        }
    }

    async fn get_user(&self, _config: &ProviderConfig, access_token: &str) -> Result<User, ProviderError> {
        match access_token {
            CODE_ACCESS | REFRESHED_ACCESS => Ok(test_user()),
            _ => Err(rejected(401, "invalid JWT")),
        }
    }

    async fn sign_out(&self, _config: &ProviderConfig, _access_token: &str) -> Result<(), ProviderError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
