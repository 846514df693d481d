//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the scenario file describing enabler jobs and events.
    pub scenario_path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("scenario_path", &self.scenario_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario_path: PathBuf::from("schedule.json"),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (ETA_*)
        figment = figment.merge(Env::prefixed("ETA_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for eta.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("eta"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_config_path_ends_with_eta() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "eta");
    }

    #[test]
    fn test_default_config_uses_working_dir_scenario() {
        let config = Config::default();
        assert_eq!(config.scenario_path, PathBuf::from("schedule.json"));
    }

    #[test]
    fn test_explicit_config_file_overrides_default() {
        let temp = tempfile::tempdir().unwrap();
        let config_file = temp.path().join("config.toml");
        std::fs::write(&config_file, "scenario_path = \"/srv/pipelines/nightly.json\"").unwrap();

        let config = Config::load_from(Some(&config_file)).unwrap();
        assert_eq!(
            config.scenario_path,
            PathBuf::from("/srv/pipelines/nightly.json")
        );
    }
}
