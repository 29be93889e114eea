//! CLI configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux/macOS: `$XDG_CONFIG_HOME/mugshot/config.toml` (or `~/.config/...`)
//! - Windows: `%APPDATA%/mugshot/config.toml`
//!
//! The account and effect identifiers are compiled in and not configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mugshot_api::Endpoints;
use mugshot_workflow::{PollConfig, WorkflowSettings};
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Job API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Public base URL of uploaded files.
    #[serde(default = "default_content_base")]
    pub content_base: String,

    /// Where downloaded results are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

fn default_api_base() -> String {
    Endpoints::default().api_base
}

fn default_content_base() -> String {
    Endpoints::default().content_base
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_poll_interval_ms() -> u64 {
    PollConfig::default().interval.as_millis() as u64
}

fn default_max_poll_attempts() -> u32 {
    PollConfig::default().max_attempts
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            content_base: default_content_base(),
            output_dir: default_output_dir(),
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

impl Config {
    /// Loads from `path`, or from the platform config file when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::load_from(&config_path()?),
        }
    }

    /// Loads configuration from disk, or creates a default if not found.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_base: self.api_base.clone(),
            content_base: self.content_base.clone(),
        }
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            content_base: self.content_base.clone(),
            poll: PollConfig {
                interval: Duration::from_millis(self.poll_interval_ms),
                max_attempts: self.max_poll_attempts,
            },
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| anyhow::anyhow!("APPDATA environment variable not set"))?;
        Ok(PathBuf::from(appdata).join("mugshot").join("config.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let base = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("mugshot").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_fixed_contract() {
        let config = Config::default();
        assert_eq!(config.api_base, "https://api.chromastudio.ai");
        assert_eq!(config.content_base, "https://contents.maxstudio.ai");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.max_poll_attempts, 60);
        assert_eq!(config.workflow_settings().poll, PollConfig::default());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base = \"http://localhost:8080\"\npoll_interval_ms = 500\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.content_base, "https://contents.maxstudio.ai");
        assert_eq!(
            config.workflow_settings().poll.interval,
            Duration::from_millis(500)
        );
        assert_eq!(config.endpoints().api_base, "http://localhost:8080");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base = [").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
