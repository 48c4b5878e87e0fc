use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::cookies::{CookieOptions, CookieStore};
use crate::auth::provider::IdentityProvider;
use crate::config::ProviderConfig;
use crate::errors::{AuthError, ProviderError};
use crate::models::User;

pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";
pub const CODE_VERIFIER_COOKIE: &str = "sb-code-verifier";

/// Refresh tokens outlive the access token; the cookie keeps them for this long.
const REFRESH_TOKEN_MAX_AGE: i64 = 400 * 24 * 60 * 60;

/// A provider-issued session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    /// Seconds until the access token expires, never negative.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// Session handling over an arbitrary cookie store.
///
/// The same logic runs in the HTTP handlers (request cookies) and in the
/// terminal board (jar file).
pub struct SessionClient<'a, C: CookieStore + ?Sized> {
    config: &'a ProviderConfig,
    provider: &'a dyn IdentityProvider,
    cookies: &'a mut C,
    secure: bool,
}

impl<'a, C: CookieStore + ?Sized> SessionClient<'a, C> {
    pub fn new(config: &'a ProviderConfig, provider: &'a dyn IdentityProvider, cookies: &'a mut C) -> Self {
        Self { config, provider, cookies, secure: false }
    }

    /// Marks written cookies `Secure`.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    fn options(&self, max_age: i64) -> CookieOptions {
        CookieOptions { secure: self.secure, ..CookieOptions::with_max_age(max_age) }
    }

    /// Exchanges an authorization code for a session and stores it.
    ///
    /// The PKCE verifier cookie, if any, is sent along and then cleared.
    pub async fn exchange_code_for_session(&mut self, code: &str) -> Result<Session, AuthError> {
        let verifier = self.cookies.get(CODE_VERIFIER_COOKIE);
        let result = self.provider.exchange_code(self.config, code, verifier.as_deref()).await;
        if verifier.is_some() {
            let options = self.options(0);
            self.cookies.remove(CODE_VERIFIER_COOKIE, &options);
        }

        let session = result.map_err(AuthError::Exchange)?;
        self.set_session(&session);
        info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    /// Writes the session's tokens as cookies.
    pub fn set_session(&mut self, session: &Session) {
        let access = self.options(session.expires_in(Utc::now()));
        let refresh = self.options(REFRESH_TOKEN_MAX_AGE);
        self.cookies.set(ACCESS_TOKEN_COOKIE, &session.access_token, &access);
        self.cookies.set(REFRESH_TOKEN_COOKIE, &session.refresh_token, &refresh);
    }

    /// Remembers the PKCE verifier for the exchange that follows sign-in.
    pub fn store_code_verifier(&mut self, verifier: &str) {
        let options = CookieOptions { http_only: true, ..self.options(10 * 60) };
        self.cookies.set(CODE_VERIFIER_COOKIE, verifier, &options);
    }

    pub fn has_session(&self) -> bool {
        self.cookies.get(ACCESS_TOKEN_COOKIE).is_some() || self.cookies.get(REFRESH_TOKEN_COOKIE).is_some()
    }

    /// The signed-in user, refreshing the session first if the access token
    /// is gone or stale. `Ok(None)` means nobody is signed in.
    pub async fn get_user(&mut self) -> Result<Option<User>, AuthError> {
        let Some(token) = self.cookies.get(ACCESS_TOKEN_COOKIE) else {
            return Ok(self.refresh_session().await?.map(|s| s.user));
        };

        match self.provider.get_user(self.config, &token).await {
            Ok(user) => Ok(Some(user)),
            Err(ProviderError::Rejected { status: 401 | 403, .. }) => {
                debug!("access token rejected, refreshing");
                Ok(self.refresh_session().await?.map(|s| s.user))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Uses the refresh cookie to mint a new session.
    ///
    /// A rejected refresh token clears the session and yields `Ok(None)`.
    pub async fn refresh_session(&mut self) -> Result<Option<Session>, AuthError> {
        let Some(refresh_token) = self.cookies.get(REFRESH_TOKEN_COOKIE) else {
            return Ok(None);
        };

        match self.provider.refresh(self.config, &refresh_token).await {
            Ok(session) => {
                self.set_session(&session);
                debug!(user = %session.user.id, "session refreshed");
                Ok(Some(session))
            }
            Err(ProviderError::Rejected { status, message }) => {
                warn!(status, "refresh token rejected: {}", message);
                self.clear();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Revokes the provider session and clears the session cookies.
    ///
    /// Cookies are cleared even when the provider call fails.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        let token = self.cookies.get(ACCESS_TOKEN_COOKIE);
        self.clear();

        if let Some(token) = token {
            self.provider.sign_out(self.config, &token).await?;
        }
        info!("signed out");
        Ok(())
    }

    fn clear(&mut self) {
        let options = self.options(0);
        self.cookies.remove(ACCESS_TOKEN_COOKIE, &options);
        self.cookies.remove(REFRESH_TOKEN_COOKIE, &options);
    }
}
