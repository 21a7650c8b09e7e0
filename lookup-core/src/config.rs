use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Environment variable that overrides `base_url` from the config file.
pub const BASE_URL_ENV: &str = "WEATHER_LOOKUP_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:8000"
/// debounce_ms = 300
/// min_query_chars = 2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the weather service; endpoints live under `/api/weather`.
    pub base_url: String,

    /// Quiet period before a suggestion fetch is sent.
    pub debounce_ms: u64,

    /// Shortest trimmed input that triggers suggestions.
    pub min_query_chars: usize,

    /// Identity cookie issued by the server, kept so history survives restarts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
            user_id: None,
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// `WEATHER_LOOKUP_BASE_URL` wins over the stored base URL.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                cfg.base_url = url;
            }
        }

        Ok(cfg)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Reject settings the controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.min_query_chars == 0 {
            bail!("min_query_chars must be at least 1");
        }
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
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

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-lookup", "weather-lookup")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Remember the server-issued identity. Returns `true` if it changed.
    pub fn remember_user_id(&mut self, user_id: Option<String>) -> bool {
        match user_id {
            Some(id) if self.user_id.as_deref() != Some(id.as_str()) => {
                self.user_id = Some(id);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("weather-lookup-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn defaults_match_page_behaviour() {
        let cfg = Config::default();
        assert_eq!(cfg.debounce(), Duration::from_millis(300));
        assert_eq!(cfg.min_query_chars, 2);
        assert!(cfg.user_id.is_none());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = Config::load_from(&scratch_path("missing")).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg: Config = toml::from_str(r#"base_url = "http://weather.local""#).unwrap();
        assert_eq!(cfg.base_url, "http://weather.local");
        assert_eq!(cfg.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }

    #[test]
    fn zero_min_query_chars_is_rejected_on_load() {
        let path = scratch_path("zero-min");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "min_query_chars = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("min_query_chars must be at least 1"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn save_then_load_keeps_user_id() {
        let path = scratch_path("save");
        let mut cfg = Config::default();
        cfg.debounce_ms = 150;
        assert!(cfg.remember_user_id(Some("abc-123".into())));

        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.debounce_ms, 150);
        assert_eq!(loaded.user_id.as_deref(), Some("abc-123"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn remember_user_id_reports_changes_only() {
        let mut cfg = Config::default();
        assert!(!cfg.remember_user_id(None));
        assert!(cfg.remember_user_id(Some("a".into())));
        assert!(!cfg.remember_user_id(Some("a".into())));
        assert!(cfg.remember_user_id(Some("b".into())));
    }
}
