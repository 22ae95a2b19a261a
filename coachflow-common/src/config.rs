//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "COACHFLOW_ROOT";

/// Portal config file name inside the root folder
pub const PORTAL_CONFIG_FILE: &str = "coachflow.toml";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "coachflow.db";

/// What a caller without an active subscription sees in a catalog view.
///
/// App versions disagreed on this, so it is an explicit product setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSubscriptionPolicy {
    /// List every item as locked, each with an upgrade prompt
    #[default]
    ShowLocked,
    /// Hide the catalog entirely
    HideCatalog,
}

/// Member portal settings, read from `coachflow.toml`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PortalConfig {
    pub bind_addr: String,
    /// Deadline for each store call in a view
    pub store_timeout_ms: u64,
    pub storage_base_url: String,
    pub storage_signing_secret: String,
    pub signed_url_ttl_secs: u64,
    /// Buckets whose objects are opened through public, unsigned URLs
    pub public_buckets: Vec<String>,
    pub no_subscription_policy: NoSubscriptionPolicy,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5780".to_string(),
            store_timeout_ms: 5000,
            storage_base_url: "http://127.0.0.1:54321/storage/v1".to_string(),
            storage_signing_secret: String::new(),
            signed_url_ttl_secs: 3600,
            public_buckets: Vec::new(),
            no_subscription_policy: NoSubscriptionPolicy::ShowLocked,
        }
    }
}

impl PortalConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    /// Parse TOML text; missing keys take defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PortalConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `coachflow.toml` from `root_folder`, or defaults if absent
    pub fn load(root_folder: &Path) -> Result<Self> {
        let path = root_folder.join(PORTAL_CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.store_timeout_ms == 0 {
            return Err(Error::Config("store_timeout_ms must be greater than 0".to_string()));
        }
        if self.signed_url_ttl_secs == 0 {
            return Err(Error::Config("signed_url_ttl_secs must be greater than 0".to_string()));
        }
        if !(self.storage_base_url.starts_with("http://") || self.storage_base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "storage_base_url must be an http(s) URL: {}",
                self.storage_base_url
            )));
        }
        Ok(())
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(config_path) = user_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Per-user config file (`~/.config/coachflow/config.toml` on Linux)
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("coachflow").join("config.toml");
    path.exists().then_some(path)
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("coachflow"))
        .unwrap_or_else(|| PathBuf::from("./coachflow_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = PortalConfig::from_toml_str("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_overrides() {
        let config = PortalConfig::from_toml_str(
            r#"
            store_timeout_ms = 1500
            no_subscription_policy = "hide_catalog"
            public_buckets = ["user-images"]
            "#,
        )
        .unwrap();
        assert_eq!(config.store_timeout_ms, 1500);
        assert_eq!(config.no_subscription_policy, NoSubscriptionPolicy::HideCatalog);
        assert_eq!(config.signed_url_ttl_secs, 3600);
        assert_eq!(config.public_buckets, vec!["user-images".to_string()]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = PortalConfig::from_toml_str("store_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(PortalConfig::from_toml_str("no_subscription_policy = \"shrug\"").is_err());
    }

    #[test]
    fn test_cli_arg_wins() {
        let root = resolve_root_folder(Some("/srv/coachflow"), "COACHFLOW_TEST_UNSET_VAR");
        assert_eq!(root, PathBuf::from("/srv/coachflow"));
    }
}
