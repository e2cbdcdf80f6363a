//! Runtime configuration loaded from `config.ron`.
//!
//! Lookup order: the path in `QA_CHAT_CONFIG`, then
//! `<config_dir>/qa_chat/config.ron`. A missing file means defaults; a broken
//! one means defaults plus a warning that is logged once the logger is up.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chat_engine::{ClientSettings, HtmlPolicy, DEFAULT_BASE_URL};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const CONFIG_ENV_VAR: &str = "QA_CHAT_CONFIG";
const CONFIG_FILENAME: &str = "config.ron";
const APP_DIR: &str = "qa_chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub base_url: String,
    pub health_interval_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub html_policy: HtmlPolicy,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
    pub storage_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_interval_secs: 30,
            request_timeout_secs: None,
            html_policy: HtmlPolicy::Faithful,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            log_file: PathBuf::from("./qa_chat.log"),
            storage_dir: None,
            export_dir: None,
        }
    }
}

impl ChatConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..ClientSettings::new(self.base_url.clone())
        }
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from(".qa_chat"))
        })
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        })
    }

    /// Replaces unusable values with defaults, returning one warning per fix.
    fn sanitize(mut self) -> (Self, Vec<String>) {
        let defaults = Self::default();
        let mut warnings = Vec::new();

        match url::Url::parse(self.base_url.trim()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                warnings.push(format!(
                    "Unsupported scheme {:?} in base_url; using {}",
                    url.scheme(),
                    defaults.base_url
                ));
                self.base_url = defaults.base_url.clone();
            }
            Err(err) => {
                warnings.push(format!(
                    "Invalid base_url {:?} ({}); using {}",
                    self.base_url, err, defaults.base_url
                ));
                self.base_url = defaults.base_url.clone();
            }
        }

        if self.health_interval_secs == 0 {
            warnings.push("health_interval_secs must be positive; using 30".to_string());
            self.health_interval_secs = defaults.health_interval_secs;
        }

        if LevelFilter::from_str(&self.log_level).is_err() {
            warnings.push(format!(
                "Unknown log_level {:?}; using info",
                self.log_level
            ));
            self.log_level = defaults.log_level;
        }

        (self, warnings)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
}

pub fn load() -> (ChatConfig, Vec<String>) {
    match default_config_path() {
        Some(path) => load_from(&path),
        None => (ChatConfig::default(), Vec::new()),
    }
}

pub fn load_from(path: &Path) -> (ChatConfig, Vec<String>) {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return (ChatConfig::default(), Vec::new());
        }
        Err(err) => {
            return (
                ChatConfig::default(),
                vec![format!("Failed to read config from {:?}: {}", path, err)],
            );
        }
    };

    match ron::from_str::<ChatConfig>(&content) {
        Ok(config) => config.sanitize(),
        Err(err) => (
            ChatConfig::default(),
            vec![format!("Failed to parse config from {:?}: {}", path, err)],
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chat_engine::{HtmlPolicy, DEFAULT_BASE_URL};
    use tempfile::TempDir;

    use super::{load_from, ChatConfig};

    #[test]
    fn missing_file_gives_defaults_without_warnings() {
        let temp = TempDir::new().unwrap();
        let (config, warnings) = load_from(&temp.path().join("config.ron"));

        assert_eq!(config, ChatConfig::default());
        assert!(warnings.is_empty());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.health_interval_secs, 30);
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ron");
        fs::write(
            &path,
            r#"(base_url: "http://localhost:8000", html_policy: Escaped, health_interval_secs: 5)"#,
        )
        .unwrap();

        let (config, warnings) = load_from(&path);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.html_policy, HtmlPolicy::Escaped);
        assert_eq!(config.health_interval_secs, 5);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn invalid_values_fall_back_with_warnings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ron");
        fs::write(
            &path,
            r#"(base_url: "ftp://example.com", health_interval_secs: 0, log_level: "loud")"#,
        )
        .unwrap();

        let (config, warnings) = load_from(&path);
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.health_interval_secs, 30);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn malformed_file_gives_defaults_and_warning() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ron");
        fs::write(&path, "(base_url: ").unwrap();

        let (config, warnings) = load_from(&path);
        assert_eq!(config, ChatConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn request_timeout_flows_into_client_settings() {
        let config = ChatConfig {
            request_timeout_secs: Some(12),
            ..ChatConfig::default()
        };
        let settings = config.client_settings();
        assert_eq!(settings.request_timeout, Some(std::time::Duration::from_secs(12)));
        assert_eq!(settings.connect_timeout, None);
    }
}
