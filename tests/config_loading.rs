//! `Config::load_from` against real files and PORTAL_* variables.
//!
//! Everything lives in one test because the environment is process-wide.

use std::io::Write;
use transparency_portal::{Config, PortalError};

const ENV_KEYS: [&str; 6] = [
    "PORTAL_CONFIG",
    "PORTAL_ENV_FILE",
    "PORTAL_BASE_URL",
    "PORTAL_NEIGHBORHOOD_ID",
    "PORTAL_REFRESH_MS",
    "PORTAL_ERROR_HISTORY",
];

fn write_toml(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn load_from_files_and_environment() {
    let tmp = tempfile::tempdir().unwrap();
    let explicit = write_toml(
        tmp.path(),
        "explicit.toml",
        r#"
        [portal]
        base_url = "https://explicit.example/api"
        neighborhood_id = "explicit-001"
        refresh_ms = 30000
        "#,
    );
    let from_env = write_toml(
        tmp.path(),
        "from_env.toml",
        r#"
        [portal]
        base_url = "https://env.example/api"
        neighborhood_id = "env-001"
        "#,
    );

    unsafe {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        // Keep any developer .env out of the picture
        std::env::set_var("PORTAL_ENV_FILE", tmp.path().join("absent.env"));
        std::env::set_var("PORTAL_CONFIG", &from_env);
    }

    // An explicit path wins over PORTAL_CONFIG
    let config = Config::load_from(Some(explicit.as_path())).unwrap();
    assert_eq!(config.portal.base_url, "https://explicit.example/api");
    assert_eq!(config.portal.neighborhood_id, "explicit-001");
    assert_eq!(config.portal.refresh_ms, 30_000);

    // Without one, PORTAL_CONFIG is used
    let config = Config::load().unwrap();
    assert_eq!(config.portal.base_url, "https://env.example/api");

    // PORTAL_* overrides apply on top of the file, then get clamped
    unsafe {
        std::env::set_var("PORTAL_REFRESH_MS", "1234");
        std::env::set_var("PORTAL_ERROR_HISTORY", "500");
        std::env::set_var("PORTAL_NEIGHBORHOOD_ID", "override-007");
    }
    let config = Config::load_from(Some(explicit.as_path())).unwrap();
    assert_eq!(config.portal.refresh_ms, 1234);
    assert_eq!(config.portal.error_history, 100);
    assert_eq!(config.portal.neighborhood_id, "override-007");
    assert_eq!(config.portal.base_url, "https://explicit.example/api");

    unsafe {
        std::env::set_var("PORTAL_REFRESH_MS", "0");
        std::env::remove_var("PORTAL_ERROR_HISTORY");
        std::env::remove_var("PORTAL_NEIGHBORHOOD_ID");
    }
    let config = Config::load_from(Some(explicit.as_path())).unwrap();
    assert_eq!(config.portal.refresh_ms, 60_000);

    // A missing file falls back to defaults
    unsafe {
        std::env::remove_var("PORTAL_REFRESH_MS");
    }
    let config = Config::load_from(Some(tmp.path().join("missing.toml").as_path())).unwrap();
    assert_eq!(config.portal.base_url, "http://127.0.0.1:8080/api");
    assert_eq!(config.portal.neighborhood_id, "phx-west-001");
    assert_eq!(config.portal.refresh_ms, 60_000);
    assert!(config.corridor.is_none());

    // Any other read failure is reported instead of silently defaulting
    let err = Config::load_from(Some(tmp.path())).unwrap_err();
    assert!(matches!(err, PortalError::Config { .. }), "{err}");
    assert!(err.to_string().contains("Failed to read"));

    // Bad env values are still validated
    unsafe {
        std::env::set_var("PORTAL_BASE_URL", "ftp://nope");
    }
    assert!(Config::load_from(Some(explicit.as_path())).is_err());

    unsafe {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }
}
