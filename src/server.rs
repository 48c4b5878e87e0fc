//! HTTP side of the session bridge.
//!
//! Routes:
//!
//! | Method | Path             | Purpose                                      |
//! |--------|------------------|----------------------------------------------|
//! | GET    | `/auth/callback` | exchange `?code=` for a session, redirect    |
//! | GET    | `/login`         | sign-in page, shows `?error=` if recognised  |
//! | GET    | `/`              | who is signed in, per the request cookies    |
//! | POST   | `/auth/signout`  | revoke the session, clear cookies            |
//! | GET    | `/health`        | liveness                                     |
//!
//! The same router backs `tasktiles serve` and the localhost server the
//! terminal board starts for sign-in.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::auth::{authorize_url, CookieStore, IdentityProvider, Pkce, RequestCookies, Session, SessionClient, CALLBACK_PATH};
use crate::config::AppConfig;
use crate::errors::{AuthError, SignInError};
use crate::models::User;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn IdentityProvider>,
    sessions: Option<mpsc::UnboundedSender<Session>>,
}

impl AppState {
    pub fn new(config: AppConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { config: Arc::new(config), provider, sessions: None }
    }

    /// Also hand every completed sign-in to `tx`.
    pub fn with_session_sink(mut self, tx: mpsc::UnboundedSender<Session>) -> Self {
        self.sessions = Some(tx);
        self
    }
}

/// Result of the redirect endpoint: where to send the browser, and the
/// session if one was established.
#[derive(Debug)]
pub struct SignInRedirect {
    pub location: String,
    pub session: Option<Session>,
}

/// `<origin>/login`, with the error indicator if there is one.
pub fn login_location(origin: &str, error: Option<SignInError>) -> String {
    match error {
        Some(e) => format!("{}/login?error={}", origin, e.as_str()),
        None => format!("{}/login", origin),
    }
}

/// Handles the provider's redirect back to the app.
///
/// Configuration is checked before anything else, so a server without
/// provider settings fails every callback the same way whether or not a code
/// was supplied. No code means nothing to exchange and goes straight home.
pub async fn complete_sign_in<C: CookieStore + ?Sized>(
    config: &AppConfig,
    provider: &dyn IdentityProvider,
    cookies: &mut C,
    origin: &str,
    code: Option<&str>,
) -> SignInRedirect {
    match exchange(config, provider, cookies, origin, code).await {
        Ok(session) => SignInRedirect { location: format!("{}/", origin), session },
        Err(e) => {
            error!("Sign-in callback failed: {}", e);
            SignInRedirect { location: login_location(origin, Some(e.indicator())), session: None }
        }
    }
}

async fn exchange<C: CookieStore + ?Sized>(
    config: &AppConfig,
    provider: &dyn IdentityProvider,
    cookies: &mut C,
    origin: &str,
    code: Option<&str>,
) -> Result<Option<Session>, AuthError> {
    let provider_config = config.provider()?;
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let mut client = SessionClient::new(&provider_config, provider, cookies).secure(origin.starts_with("https://"));
    client.exchange_code_for_session(code).await.map(Some)
}

/// Origin the request was addressed to, from `Host` and `X-Forwarded-Proto`.
pub fn request_origin(headers: &HeaderMap) -> String {
    let host = headers.get(HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

/// Origin used for redirects: the configured site URL when there is one,
/// otherwise whatever the request says.
pub fn public_origin(config: &AppConfig, headers: &HeaderMap) -> String {
    let request = request_origin(headers);
    config.site_url_or(&request).trim_end_matches('/').to_string()
}

/// Build the axum router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/login", get(login_handler))
        .route(CALLBACK_PATH, get(callback_handler))
        .route("/auth/signout", post(signout_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginParams {
    error: Option<String>,
}

fn with_cookies(response: impl IntoResponse, cookies: &RequestCookies) -> Response {
    let mut response = response.into_response();
    cookies.apply_to(response.headers_mut());
    response
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let origin = public_origin(&state.config, &headers);
    let mut cookies = RequestCookies::from_headers(&headers);
    let outcome = complete_sign_in(
        &state.config,
        state.provider.as_ref(),
        &mut cookies,
        &origin,
        params.code.as_deref(),
    )
    .await;

    if let (Some(session), Some(tx)) = (outcome.session, &state.sessions) {
        if tx.send(session).is_err() {
            warn!("Session receiver dropped; sign-in not forwarded");
        }
    }
    with_cookies(Redirect::temporary(&outcome.location), &cookies)
}

async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LoginParams>,
) -> Response {
    let origin = public_origin(&state.config, &headers);
    let notice = params.error.as_deref().and_then(SignInError::parse);

    let provider_config = match state.config.provider() {
        Ok(c) => c,
        Err(e) => {
            warn!("Sign-in page unavailable: {}", e);
            return Html(render_login_page(None, Some(e.indicator()))).into_response();
        }
    };

    let pkce = Pkce::generate();
    let url = match authorize_url(&provider_config, &origin, &pkce.challenge) {
        Ok(url) => url,
        Err(e) => {
            warn!("Sign-in page unavailable: {}", e);
            return Html(render_login_page(None, Some(e.indicator()))).into_response();
        }
    };

    let mut cookies = RequestCookies::from_headers(&headers);
    SessionClient::new(&provider_config, state.provider.as_ref(), &mut cookies)
        .secure(origin.starts_with("https://"))
        .store_code_verifier(&pkce.verifier);
    with_cookies(Html(render_login_page(Some(url.as_str()), notice)), &cookies)
}

async fn home_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let origin = public_origin(&state.config, &headers);
    let provider_config = match state.config.provider() {
        Ok(c) => c,
        Err(e) => return Redirect::temporary(&login_location(&origin, Some(e.indicator()))).into_response(),
    };

    let mut cookies = RequestCookies::from_headers(&headers);
    let user = SessionClient::new(&provider_config, state.provider.as_ref(), &mut cookies)
        .secure(origin.starts_with("https://"))
        .get_user()
        .await;

    match user {
        Ok(Some(user)) => with_cookies(Html(render_home_page(&user)), &cookies),
        Ok(None) => with_cookies(Redirect::temporary(&login_location(&origin, None)), &cookies),
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            with_cookies(Redirect::temporary(&login_location(&origin, None)), &cookies)
        }
    }
}

async fn signout_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let origin = public_origin(&state.config, &headers);
    let mut cookies = RequestCookies::from_headers(&headers);
    if let Ok(provider_config) = state.config.provider() {
        let result = SessionClient::new(&provider_config, state.provider.as_ref(), &mut cookies)
            .secure(origin.starts_with("https://"))
            .sign_out()
            .await;
        if let Err(e) = result {
            warn!("Provider sign-out failed: {}", e);
        }
    }
    with_cookies(Redirect::to(&login_location(&origin, None)), &cookies)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_STYLE: &str = "body{font-family:system-ui,sans-serif;background:#f8fafc;}\
main{max-width:420px;margin:96px auto;padding:32px;background:#fff;border-radius:16px;text-align:center;}\
a.button{display:block;padding:12px;border-radius:8px;background:#111827;color:#fff;text-decoration:none;}\
p.error{color:#b91c1c;}";

/// Sign-in surface: one external provider option, plus the error notice.
pub fn render_login_page(authorize_url: Option<&str>, notice: Option<SignInError>) -> String {
    let notice = notice
        .map(|e| format!("<p class=\"error\">{}</p>", e.message()))
        .unwrap_or_default();
    let action = match authorize_url {
        Some(url) => format!("<a class=\"button\" href=\"{}\">Continue with Google</a>", escape_html(url)),
        None => String::new(),
    };
    format!(
        "<!doctype html><html><head><title>Task Manager</title><style>{}</style></head><body><main>\
         <h1>Task Manager</h1><p>Organize your work with focus and clarity</p>{}{}</main></body></html>",
        PAGE_STYLE, notice, action
    )
}

fn render_home_page(user: &User) -> String {
    format!(
        "<!doctype html><html><head><title>Task Manager</title><style>{}</style></head><body><main>\
         <h1>Tasks</h1><p>Signed in as <strong>{}</strong>.</p><p>You can return to the terminal.</p>\
         <form method=\"post\" action=\"/auth/signout\"><button type=\"submit\">Sign out</button></form>\
         </main></body></html>",
        PAGE_STYLE,
        escape_html(user.display_name())
    )
}

/// Runs the router on `bind` until Ctrl-C.
pub async fn serve(config: AppConfig, provider: Arc<dyn IdentityProvider>, bind: SocketAddr) -> Result<()> {
    if let Err(e) = config.provider() {
        warn!("{}; sign-in requests will fail until it is set", e);
    }

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    let addr = listener.local_addr().context("Failed to get server address")?;
    info!(%addr, "listening");

    let app = build_router(AppState::new(config, provider));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;
    Ok(())
}

/// Localhost server the terminal board starts for browser sign-in.
///
/// Completed sign-ins are queued for the board to pick up between key
/// events.
pub struct CallbackServer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    sessions: Option<mpsc::UnboundedReceiver<Session>>,
    addr: Option<SocketAddr>,
}

impl Default for CallbackServer {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackServer {
    pub fn new() -> Self {
        Self { shutdown_tx: None, sessions: None, addr: None }
    }

    /// Starts serving on `bind` and returns the base URL.
    ///
    /// The provider is told to redirect back to this server, regardless of
    /// any configured site URL. Must be called from within a tokio runtime.
    pub async fn start(
        &mut self,
        config: &AppConfig,
        provider: Arc<dyn IdentityProvider>,
        bind: SocketAddr,
    ) -> Result<String> {
        let listener = TcpListener::bind(bind)
            .await
            .context("Failed to bind callback server")?;
        let addr = listener.local_addr().context("Failed to get server address")?;
        let base_url = format!("http://{}", addr);

        let config = AppConfig { site_url: Some(base_url.clone()), ..config.clone() };
        let (tx, rx) = mpsc::unbounded_channel();
        let app = build_router(AppState::new(config, provider).with_session_sink(tx));

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("Callback server error: {}", e);
            }
        });

        info!(%addr, "callback server started");
        self.shutdown_tx = Some(shutdown_tx);
        self.sessions = Some(rx);
        self.addr = Some(addr);
        Ok(base_url)
    }

    pub fn is_running(&self) -> bool {
        self.addr.is_some()
    }

    pub fn base_url(&self) -> Option<String> {
        self.addr.map(|addr| format!("http://{}", addr))
    }

    /// Next completed sign-in, if one has arrived.
    pub fn try_recv_session(&mut self) -> Option<Session> {
        self.sessions.as_mut()?.try_recv().ok()
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.sessions = None;
        self.addr = None;
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_location_with_and_without_error() {
        assert_eq!(login_location("http://a.test", None), "http://a.test/login");
        assert_eq!(
            login_location("http://a.test", Some(SignInError::AuthCallbackFailed)),
            "http://a.test/login?error=auth_callback_failed"
        );
    }

    #[test]
    fn origin_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "tiles.example.com".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(request_origin(&headers), "https://tiles.example.com");
        assert_eq!(request_origin(&HeaderMap::new()), "http://localhost");
    }

    #[test]
    fn configured_site_url_beats_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, "evil.example".parse().unwrap());
        let config = AppConfig { site_url: Some("https://tiles.example.com/".into()), ..AppConfig::default() };
        assert_eq!(public_origin(&config, &headers), "https://tiles.example.com");
        assert_eq!(public_origin(&AppConfig::default(), &headers), "http://evil.example");
    }

    #[test]
    fn login_page_shows_notice_and_button() {
        let page = render_login_page(Some("https://p.test/auth?x=1&y=2"), Some(SignInError::ServerConfigError));
        assert!(page.contains("Sign-in is not configured"));
        assert!(page.contains("href=\"https://p.test/auth?x=1&amp;y=2\""));
        assert!(!render_login_page(None, None).contains("Continue with Google"));
    }
}
