use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Url;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::errors::AuthError;

/// Path of the redirect endpoint, relative to the site URL.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// The one external identity option offered on the sign-in surface.
pub const OAUTH_PROVIDER: &str = "google";

/// PKCE verifier/challenge pair for one sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Pkce {
        // 64 characters from the unreserved set.
        let verifier = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Pkce::from_verifier(verifier)
    }

    pub fn from_verifier(verifier: String) -> Pkce {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Pkce { verifier, challenge }
    }
}

/// Where the provider sends the browser back to after sign-in.
pub fn callback_url(site_url: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), CALLBACK_PATH)
}

/// Provider authorize URL for the sign-in button.
pub fn authorize_url(config: &ProviderConfig, site_url: &str, challenge: &str) -> Result<Url, AuthError> {
    let redirect_to = callback_url(site_url);
    Url::parse_with_params(
        &format!("{}/auth/v1/authorize", config.url),
        &[
            ("provider", OAUTH_PROVIDER),
            ("redirect_to", redirect_to.as_str()),
            ("code_challenge", challenge),
            ("code_challenge_method", "s256"),
        ],
    )
    .map_err(|e| AuthError::InvalidProviderUrl(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc7636_challenge() {
        let pkce = Pkce::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".into());
        assert_eq!(pkce.challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn generated_verifier_length() {
        let pkce = Pkce::generate();
        assert_eq!(pkce.verifier.len(), 64);
        assert_ne!(Pkce::generate().verifier, pkce.verifier);
    }

    #[test]
    fn authorize_url_points_back_at_callback() {
        let config = ProviderConfig { url: "https://abc.supabase.co".into(), public_key: "anon".into() };
        let url = authorize_url(&config, "http://localhost:3000/", "xyz").unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("provider".into(), "google".into())));
        assert!(pairs.contains(&("redirect_to".into(), "http://localhost:3000/auth/callback".into())));
        assert!(pairs.contains(&("code_challenge".into(), "xyz".into())));
    }
}
