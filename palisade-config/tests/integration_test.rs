//! Integration tests for palisade-config

use palisade_config::*;
use std::io::Write;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

#[test]
fn test_load_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "secret = \"{}\"\n\n[csrf]\nprotector = \"random\"\nheader_name = \"X-Csrf\"\n\n[session]\ncookie_domain = \"example.com\"",
        SECRET
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_file(file.path()).unwrap();

    let config = manager.app_config().unwrap();
    assert_eq!(config.csrf.protector, ProtectorKind::Random);
    assert_eq!(config.csrf.header_name, "X-Csrf");
    assert_eq!(config.cookie_domain(), Some("example.com"));
}

#[test]
fn test_load_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"secret": "{}", "csrf": {{"enabled": false}}, "auth": {{"login_url": "/signin"}}}}"#,
        SECRET
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_file(file.path()).unwrap();

    let config = manager.app_config().unwrap();
    assert!(!config.csrf.enabled);
    assert_eq!(config.auth.login_url, "/signin");
}

#[test]
fn test_load_dotenv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".env");
    std::fs::write(
        &path,
        format!(
            "PALISADE_SECRET={}\nPALISADE_CSRF__COOKIE_NAME=csrf-cookie\nUNRELATED=1\n",
            SECRET
        ),
    )
    .unwrap();

    let manager = ConfigManager::with_prefix(ENV_PREFIX);
    manager.load_file(&path).unwrap();

    let config = manager.app_config().unwrap();
    assert_eq!(config.csrf.cookie_name, "csrf-cookie");
    assert!(!manager.has("unrelated"));
}

#[test]
fn test_missing_file() {
    let manager = ConfigManager::new();
    assert!(matches!(
        manager.load_file("/nonexistent/palisade.toml"),
        Err(ConfigError::LoadError(_))
    ));
}

#[test]
fn test_invalid_cookie_name_rejected() {
    let manager = ConfigManager::new();
    manager.set("secret", SECRET).unwrap();
    manager.set("csrf.cookie_name", "bad cookie").unwrap();

    assert!(matches!(
        manager.app_config(),
        Err(ConfigError::ValidationError(_))
    ));
}
