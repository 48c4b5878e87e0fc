//! Session bridge between the hosted identity provider and this app.

pub mod cookies;
pub mod provider;
pub mod session;
pub mod signin;

pub use cookies::{CookieOptions, CookieStore, RequestCookies, SameSite};
pub use provider::{GoTrueClient, IdentityProvider};
pub use session::{Session, SessionClient};
pub use signin::{authorize_url, callback_url, Pkce, CALLBACK_PATH};
