// tests/config_tests.rs
use std::path::Path;

use envelope_secret_vault::db::open_default_secrets_db;
use envelope_secret_vault::error::CoreError;
use envelope_secret_vault::{AppContext, Config};

#[test]
fn test_empty_file_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert!(!config.keyring.reload_on_change);
    assert!(config.keyring.path.ends_with("keyring.json"));
    assert!(config.paths.secrets_db.ends_with("secrets.db"));
    assert_eq!(config.crypto.app_context, "catai");
    assert_eq!(config.app_context(), AppContext::default());
}

#[test]
fn test_values_from_file() {
    let config = Config::from_toml_str(
        r#"
        [keyring]
        path = "/etc/myapp/keyring.json"
        reload_on_change = true

        [paths]
        secrets_db = "/var/lib/myapp/secrets.db"

        [crypto]
        app_context = "myapp"
        "#,
    )
    .unwrap();

    assert_eq!(config.keyring.path, Path::new("/etc/myapp/keyring.json"));
    assert!(config.keyring.reload_on_change);
    assert_eq!(config.paths.secrets_db, Path::new("/var/lib/myapp/secrets.db"));
    assert_eq!(config.app_context().hkdf_info(1), "myapp-secrets-v1");
}

#[test]
fn test_partial_sections() {
    let config = Config::from_toml_str(
        r#"
        [crypto]
        "#,
    )
    .unwrap();
    assert_eq!(config.crypto.app_context, "catai");
}

#[test]
fn test_malformed_file_is_an_error() {
    assert!(matches!(
        Config::from_toml_str("[keyring\npath = 3"),
        Err(CoreError::Config(_))
    ));
    // keyring section without a path
    assert!(Config::from_toml_str("[keyring]\nreload_on_change = true").is_err());
}

#[test]
fn test_default_db_follows_env_override() {
    // The only test in this binary that touches the process-wide config.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("override").join("secrets.db");
    std::env::set_var("ESV_CONFIG", dir.path().join("absent.toml"));
    std::env::set_var("ESV_SECRETS_DB", &db_path);

    let config = envelope_secret_vault::load_config().unwrap();
    assert_eq!(config.paths.secrets_db, db_path);

    let conn = open_default_secrets_db().unwrap();
    assert!(db_path.exists());
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE name = 'user_api_keys'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 1);
}
