//! Typed errors for the session bridge.
//!
//! - `ProviderError`: a single call to the identity provider went wrong
//! - `AuthError`: what the sign-in flow reports to its caller

use thiserror::Error;

/// Failure of one request to the identity provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Errors surfaced by the sign-in flow and session lookups.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required environment value was not provided.
    #[error("missing required configuration value {name}")]
    Configuration { name: &'static str },

    #[error("provider URL is not a valid URL: {0}")]
    InvalidProviderUrl(String),

    /// The provider refused or failed to exchange the authorization code.
    #[error("authorization code exchange failed: {0}")]
    Exchange(#[source] ProviderError),

    /// Any other provider call (refresh, user lookup, logout) failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl AuthError {
    /// Indicator carried back to the sign-in page for this error.
    pub fn indicator(&self) -> SignInError {
        match self {
            AuthError::Configuration { .. } | AuthError::InvalidProviderUrl(_) => SignInError::ServerConfigError,
            AuthError::Exchange(_) | AuthError::Provider(_) => SignInError::AuthCallbackFailed,
        }
    }
}

/// Error codes the redirect endpoint hands to the sign-in page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    ServerConfigError,
    AuthCallbackFailed,
}

impl SignInError {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignInError::ServerConfigError => "server_config_error",
            SignInError::AuthCallbackFailed => "auth_callback_failed",
        }
    }

    pub fn parse(code: &str) -> Option<SignInError> {
        match code {
            "server_config_error" => Some(SignInError::ServerConfigError),
            "auth_callback_failed" => Some(SignInError::AuthCallbackFailed),
            _ => None,
        }
    }

    /// Message shown on the sign-in page.
    pub fn message(&self) -> &'static str {
        match self {
            SignInError::ServerConfigError => "Sign-in is not configured on this server.",
            SignInError::AuthCallbackFailed => "Sign-in did not complete. Please try again.",
        }
    }
}
