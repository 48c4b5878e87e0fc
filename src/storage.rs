use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::cookies::{CookieOptions, CookieStore};

pub const COOKIE_JAR_VAR: &str = "TILES_COOKIE_JAR";

/// Returns the application's data directory, creating it if needed.
///
/// `~/.local/share/tasktiles` on Linux, `./tasktiles` if no data dir is known.
pub fn data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("tasktiles");
    if !p.exists() {
        let _ = fs::create_dir_all(&p);
    }
    p
}

/// Returns the path to the cookie jar file (`cookies.json`).
///
/// The path is determined in the following order:
/// 1. `TILES_COOKIE_JAR` environment variable.
/// 2. `cookies.json` inside [`data_dir`].
pub fn cookie_jar_path() -> PathBuf {
    std::env::var(COOKIE_JAR_VAR).map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = data_dir();
        p.push("cookies.json");
        p
    })
}

/// One stored cookie.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredCookie {
    pub value: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// `None` for cookies without a max-age.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_path() -> String {
    "/".to_string()
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && self.expires_at.map_or(true, |at| at > now)
    }
}

/// Cookie store backed by a JSON file. Every write is flushed to disk.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    cookies: BTreeMap<String, StoredCookie>,
}

impl FileCookieJar {
    /// Opens the jar at `path`. A missing or unreadable file is an empty jar.
    pub fn open(path: impl Into<PathBuf>) -> FileCookieJar {
        let path = path.into();
        let cookies = load_cookies(&path);
        FileCookieJar { path, cookies }
    }

    /// Opens the jar at [`cookie_jar_path`].
    pub fn open_default() -> FileCookieJar {
        FileCookieJar::open(cookie_jar_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of cookies that are currently live.
    pub fn names(&self) -> Vec<String> {
        let now = Utc::now();
        self.cookies
            .iter()
            .filter(|(_, c)| c.is_live(now))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Writes the jar to disk, dropping expired entries.
    pub fn save(&mut self) -> std::io::Result<()> {
        let now = Utc::now();
        self.cookies.retain(|_, c| c.is_live(now));
        let s = serde_json::to_string_pretty(&self.cookies)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }
}

impl CookieStore for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .filter(|c| c.is_live(Utc::now()))
            .map(|c| c.value.clone())
    }

    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let expires_at = options.max_age.map(|secs| Utc::now() + Duration::seconds(secs));
        let cookie = StoredCookie {
            value: value.to_string(),
            path: options.path.clone(),
            expires_at,
        };
        if cookie.is_live(Utc::now()) {
            self.cookies.insert(name.to_string(), cookie);
        } else {
            self.cookies.remove(name);
        }
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), "Failed to save cookie jar: {}", e);
        }
    }
}

fn load_cookies(path: &Path) -> BTreeMap<String, StoredCookie> {
    if !path.exists() {
        return BTreeMap::new();
    }
    let mut f = match OpenOptions::new().read(true).open(path) {
        Ok(f) => f,
        Err(_) => return BTreeMap::new(),
    };
    let mut s = String::new();
    if f.read_to_string(&mut s).is_err() {
        return BTreeMap::new();
    }
    serde_json::from_str(&s).unwrap_or_else(|e| {
        warn!(path = %path.display(), "Ignoring unreadable cookie jar: {}", e);
        BTreeMap::new()
    })
}

/// Deletes the cookie jar file.
pub fn delete_jar(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
