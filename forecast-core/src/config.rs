use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::ProviderId;

/// Per-provider overrides. Unset fields fall back to the provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Only sent by providers that require one (NWS).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default provider id, e.g. "proxy" or "nws".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [providers.nws]
    /// user_agent = "(my-app, me@example.com)"
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Default provider as a strongly-typed ProviderId; `proxy` when unset.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::Proxy),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Load config from the platform location, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider's settings; becomes the default if none is set.
    pub fn upsert_provider(&mut self, id: ProviderId, provider: ProviderConfig) {
        self.providers.insert(id.as_str().to_string(), provider);

        if self.default_provider.is_none() {
            self.default_provider = Some(id.to_string());
        }
    }

    /// Override the base URL for this run without touching the default provider.
    pub fn override_base_url(&mut self, id: ProviderId, base_url: String) {
        self.providers.entry(id.as_str().to_string()).or_default().base_url = Some(base_url);
    }

    pub fn provider_base_url(&self, id: ProviderId) -> Option<&str> {
        self.provider_config(id).and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn provider_user_agent(&self, id: ProviderId) -> Option<&str> {
        self.provider_config(id).and_then(|cfg| cfg.user_agent.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn default_provider_is_proxy_when_not_set() {
        let cfg = Config::default();
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::Proxy);
    }

    #[test]
    fn unknown_default_provider_errors() {
        let cfg = Config { default_provider: Some("openweather".into()), ..Default::default() };
        let err = cfg.default_provider_id().unwrap_err();

        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn upsert_sets_default_when_missing() {
        let mut cfg = Config::default();

        cfg.upsert_provider(
            ProviderId::Nws,
            ProviderConfig { base_url: None, user_agent: Some("(test, t@example.com)".into()) },
        );

        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::Nws);
        assert_eq!(cfg.provider_user_agent(ProviderId::Nws), Some("(test, t@example.com)"));
        assert_eq!(cfg.provider_base_url(ProviderId::Nws), None);
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_provider(ProviderId::Proxy, ProviderConfig::default());
        cfg.upsert_provider(ProviderId::Nws, ProviderConfig::default());

        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::Proxy);

        cfg.set_default_provider(ProviderId::Nws);
        assert_eq!(cfg.default_provider_id().unwrap(), ProviderId::Nws);
    }

    #[test]
    fn override_base_url_keeps_other_settings() {
        let mut cfg = Config::default();
        cfg.upsert_provider(
            ProviderId::Nws,
            ProviderConfig { base_url: None, user_agent: Some("ua".into()) },
        );

        cfg.override_base_url(ProviderId::Nws, "http://localhost:9000".into());

        assert_eq!(cfg.provider_base_url(ProviderId::Nws), Some("http://localhost:9000"));
        assert_eq!(cfg.provider_user_agent(ProviderId::Nws), Some("ua"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider(
            ProviderId::Proxy,
            ProviderConfig { base_url: Some("http://localhost:5001".into()), user_agent: None },
        );
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_provider_id().unwrap(), ProviderId::Proxy);
        assert_eq!(loaded.provider_base_url(ProviderId::Proxy), Some("http://localhost:5001"));
    }

    #[test]
    fn load_from_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.default_provider.is_none());
        assert!(cfg.providers.is_empty());
    }

    #[test]
    fn load_from_invalid_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_provider = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
