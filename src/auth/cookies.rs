//! Cookie adapter used by the session logic.
//!
//! The session code only ever reads, writes and clears named cookies. Each
//! execution context supplies its own storage: request/response headers on
//! the server, a jar file for the terminal board.

use std::collections::HashMap;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes written alongside a cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: String,
    /// Lifetime in seconds. `None` means a browser-session cookie.
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        CookieOptions {
            path: "/".to_string(),
            max_age: None,
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieOptions {
    pub fn with_max_age(max_age: i64) -> CookieOptions {
        CookieOptions { max_age: Some(max_age), ..CookieOptions::default() }
    }
}

/// Storage primitive behind the session logic.
pub trait CookieStore {
    fn get(&self, name: &str) -> Option<String>;

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions);

    /// Clears a cookie by overwriting it with an empty, already-expired value.
    fn remove(&mut self, name: &str, options: &CookieOptions) {
        let expired = CookieOptions { max_age: Some(0), ..options.clone() };
        self.set(name, "", &expired);
    }
}

/// Renders one `Set-Cookie` header value.
pub fn set_cookie_header(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut header = format!("{}={}; Path={}", name, value, options.path);
    if let Some(max_age) = options.max_age {
        header.push_str(&format!("; Max-Age={}", max_age.max(0)));
    }
    if options.http_only {
        header.push_str("; HttpOnly");
    }
    if options.secure {
        header.push_str("; Secure");
    }
    header.push_str("; SameSite=");
    header.push_str(options.same_site.as_str());
    header
}

/// Parses a `Cookie` request header into name/value pairs.
pub fn parse_cookie_header(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}

/// Cookies of one HTTP exchange: read from the request, written back as
/// `Set-Cookie` headers on the response.
#[derive(Debug, Default)]
pub struct RequestCookies {
    incoming: HashMap<String, String>,
    outgoing: Vec<(String, String, CookieOptions)>,
}

impl RequestCookies {
    pub fn from_headers(headers: &HeaderMap) -> RequestCookies {
        let mut incoming = HashMap::new();
        for value in headers.get_all(COOKIE) {
            if let Ok(raw) = value.to_str() {
                incoming.extend(parse_cookie_header(raw));
            }
        }
        RequestCookies { incoming, outgoing: Vec::new() }
    }

    /// Writes made so far, in order.
    pub fn writes(&self) -> &[(String, String, CookieOptions)] {
        &self.outgoing
    }

    /// Appends the pending writes to a response header map.
    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for (name, value, options) in &self.outgoing {
            match HeaderValue::from_str(&set_cookie_header(name, value, options)) {
                Ok(v) => {
                    headers.append(SET_COOKIE, v);
                }
                Err(e) => warn!(cookie = %name, "Dropping unencodable cookie: {}", e),
            }
        }
    }
}

impl CookieStore for RequestCookies {
    fn get(&self, name: &str) -> Option<String> {
        // A write earlier in this exchange wins over the request header.
        if let Some((_, value, options)) = self.outgoing.iter().rev().find(|(n, _, _)| n == name) {
            if value.is_empty() || options.max_age == Some(0) {
                return None;
            }
            return Some(value.clone());
        }
        self.incoming.get(name).filter(|v| !v.is_empty()).cloned()
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.outgoing.push((name.to_string(), value.to_string(), options.clone()));
    }
}
