//! Root folder resolution and portal config loading

use coachflow_common::config::{
    resolve_root_folder, NoSubscriptionPolicy, PortalConfig, PORTAL_CONFIG_FILE, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::path::PathBuf;

#[test]
#[serial]
fn test_env_var_used_without_cli_arg() {
    std::env::set_var(ROOT_FOLDER_ENV, "/tmp/coachflow-env-root");
    let root = resolve_root_folder(None, ROOT_FOLDER_ENV);
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/tmp/coachflow-env-root"));
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    std::env::set_var(ROOT_FOLDER_ENV, "/tmp/coachflow-env-root");
    let root = resolve_root_folder(Some("/tmp/coachflow-cli-root"), ROOT_FOLDER_ENV);
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root, PathBuf::from("/tmp/coachflow-cli-root"));
}

#[test]
#[serial]
fn test_fallback_is_not_empty() {
    std::env::remove_var(ROOT_FOLDER_ENV);
    let root = resolve_root_folder(None, ROOT_FOLDER_ENV);
    assert!(!root.as_os_str().is_empty());
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = PortalConfig::load(dir.path()).unwrap();
    assert_eq!(config, PortalConfig::default());
}

#[test]
fn test_load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(PORTAL_CONFIG_FILE),
        r#"
        bind_addr = "0.0.0.0:8080"
        storage_base_url = "https://files.example.com/storage/v1"
        storage_signing_secret = "abc"
        no_subscription_policy = "hide_catalog"
        "#,
    )
    .unwrap();

    let config = PortalConfig::load(dir.path()).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.storage_signing_secret, "abc");
    assert_eq!(config.no_subscription_policy, NoSubscriptionPolicy::HideCatalog);
    assert_eq!(config.store_timeout_ms, 5000);
}

#[test]
fn test_load_rejects_non_http_storage_url() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(PORTAL_CONFIG_FILE),
        "storage_base_url = \"ftp://files\"\n",
    )
    .unwrap();

    assert!(PortalConfig::load(dir.path()).is_err());
}
