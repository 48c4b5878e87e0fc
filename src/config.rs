//! Process configuration, read once at startup.

use crate::errors::AuthError;

pub const PROVIDER_URL_VAR: &str = "SUPABASE_URL";
pub const PUBLIC_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const SITE_URL_VAR: &str = "SITE_URL";

/// Everything the session bridge needs from the environment.
///
/// Missing values are kept as `None` rather than failing startup; the
/// requests that need them fail instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub provider_url: Option<String>,
    pub public_key: Option<String>,
    pub site_url: Option<String>,
}

/// Provider endpoint and key, both present.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Base URL without a trailing slash.
    pub url: String,
    pub public_key: String,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> AppConfig {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Could not load .env: {}", e);
            }
        }
        AppConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as
    /// missing.
    pub fn from_lookup<F>(lookup: F) -> AppConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        AppConfig {
            provider_url: read(PROVIDER_URL_VAR).map(|u| u.trim_end_matches('/').to_string()),
            public_key: read(PUBLIC_KEY_VAR),
            site_url: read(SITE_URL_VAR).map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    /// The provider settings, or a configuration error naming the first
    /// missing value.
    pub fn provider(&self) -> Result<ProviderConfig, AuthError> {
        let url = self
            .provider_url
            .clone()
            .ok_or(AuthError::Configuration { name: PROVIDER_URL_VAR })?;
        let public_key = self
            .public_key
            .clone()
            .ok_or(AuthError::Configuration { name: PUBLIC_KEY_VAR })?;
        Ok(ProviderConfig { url, public_key })
    }

    /// Where sign-in should come back to: the configured site URL, falling
    /// back to the origin the request arrived on.
    pub fn site_url_or<'a>(&'a self, origin: &'a str) -> &'a str {
        self.site_url.as_deref().unwrap_or(origin)
    }
}
