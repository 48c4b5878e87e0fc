use std::fs;

use tasktiles::auth::{CookieOptions, CookieStore};
use tasktiles::storage::{delete_jar, FileCookieJar};

fn jar_in(dir: &tempfile::TempDir) -> FileCookieJar {
    FileCookieJar::open(dir.path().join("cookies.json"))
}

#[test]
fn cookies_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let mut jar = jar_in(&dir);
    jar.set("sb-access-token", "abc", &CookieOptions::with_max_age(3600));
    jar.set("sb-refresh-token", "def", &CookieOptions::with_max_age(3600));

    let reopened = jar_in(&dir);
    assert_eq!(reopened.get("sb-access-token").as_deref(), Some("abc"));
    assert_eq!(reopened.names(), vec!["sb-access-token", "sb-refresh-token"]);
}

#[test]
fn remove_drops_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let mut jar = jar_in(&dir);
    jar.set("sb-access-token", "abc", &CookieOptions::with_max_age(3600));
    jar.remove("sb-access-token", &CookieOptions::default());

    assert!(jar.get("sb-access-token").is_none());
    assert!(jar_in(&dir).names().is_empty());
}

#[test]
fn expired_entries_read_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cookies.json"),
        r#"{
            "sb-access-token": {"value": "old", "path": "/", "expires_at": "2020-01-01T00:00:00Z"},
            "sb-refresh-token": {"value": "kept"}
        }"#,
    )
    .unwrap();

    let jar = jar_in(&dir);
    assert!(jar.get("sb-access-token").is_none());
    assert_eq!(jar.get("sb-refresh-token").as_deref(), Some("kept"));
}

#[test]
fn unreadable_jar_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cookies.json"), "not json").unwrap();
    assert!(jar_in(&dir).names().is_empty());
}

#[test]
fn delete_jar_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut jar = jar_in(&dir);
    jar.set("a", "1", &CookieOptions::default());
    assert!(jar.path().exists());

    delete_jar(jar.path()).unwrap();
    assert!(!jar.path().exists());
    // Deleting a missing jar is fine.
    delete_jar(jar.path()).unwrap();
}
