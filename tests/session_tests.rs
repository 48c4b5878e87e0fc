mod common;

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

use common::{configured, MockProvider, CODE_ACCESS, GOOD_REFRESH, REFRESHED_ACCESS};
use tasktiles::auth::{CookieStore, RequestCookies, SessionClient};

fn request_cookies(raw: &str) -> RequestCookies {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(raw).unwrap());
    RequestCookies::from_headers(&headers)
}

#[tokio::test]
async fn valid_access_token_needs_no_refresh() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = request_cookies(&format!("sb-access-token={}", CODE_ACCESS));

    let user = SessionClient::new(&config, &provider, &mut cookies).get_user().await.unwrap();

    assert_eq!(user.unwrap().id, "user-1");
    assert_eq!(provider.refreshes(), 0);
    assert!(cookies.writes().is_empty());
}

#[tokio::test]
async fn missing_access_token_is_refreshed() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = request_cookies(&format!("sb-refresh-token={}", GOOD_REFRESH));

    let user = SessionClient::new(&config, &provider, &mut cookies).get_user().await.unwrap();

    assert!(user.is_some());
    assert_eq!(provider.refreshes(), 1);
    assert_eq!(cookies.get("sb-access-token").as_deref(), Some(REFRESHED_ACCESS));
    assert_eq!(cookies.get("sb-refresh-token").as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn stale_access_token_is_refreshed() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = request_cookies(&format!("sb-access-token=expired; sb-refresh-token={}", GOOD_REFRESH));

    let user = SessionClient::new(&config, &provider, &mut cookies).get_user().await.unwrap();

    assert!(user.is_some());
    assert_eq!(provider.refreshes(), 1);
    assert_eq!(cookies.get("sb-access-token").as_deref(), Some(REFRESHED_ACCESS));
}

#[tokio::test]
async fn rejected_refresh_clears_the_session() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = request_cookies("sb-refresh-token=revoked");

    let user = SessionClient::new(&config, &provider, &mut cookies).get_user().await.unwrap();

    assert!(user.is_none());
    assert!(cookies.get("sb-refresh-token").is_none());
    assert!(cookies
        .writes()
        .iter()
        .all(|(_, value, options)| value.is_empty() && options.max_age == Some(0)));
}

#[tokio::test]
async fn no_cookies_means_signed_out() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = RequestCookies::default();

    let mut client = SessionClient::new(&config, &provider, &mut cookies);
    assert!(!client.has_session());
    assert!(client.get_user().await.unwrap().is_none());
    assert_eq!(provider.refreshes(), 0);
}

#[tokio::test]
async fn sign_out_revokes_and_clears() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = request_cookies(&format!("sb-access-token={}; sb-refresh-token={}", CODE_ACCESS, GOOD_REFRESH));

    let mut client = SessionClient::new(&config, &provider, &mut cookies);
    client.sign_out().await.unwrap();
    assert!(!client.has_session());
    assert_eq!(provider.sign_outs(), 1);
}

#[tokio::test]
async fn sign_out_without_session_skips_provider() {
    let provider = MockProvider::default();
    let config = configured().provider().unwrap();
    let mut cookies = RequestCookies::default();

    SessionClient::new(&config, &provider, &mut cookies).sign_out().await.unwrap();
    assert_eq!(provider.sign_outs(), 0);
}
