//! Configuration handling for the console

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::panels::PanelKind;

/// Environment variable overriding the fixture path
pub const FIXTURES_ENV: &str = "NAS_CONSOLE_FIXTURES";

const DEFAULT_LOG_FILTER: &str = "nas_console=info";

/// User configuration for the console
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// tracing filter directive, e.g. `nas_console=debug`
    pub log_filter: Option<String>,
    /// JSON fixture the data source reads
    pub fixture_path: Option<PathBuf>,
    /// Panel shown at startup, by key (`bond`, `user`, ...)
    pub initial_panel: Option<String>,
    /// Run the submit-time checks after every edit instead of on submit only
    pub validate_on_change: Option<bool>,
}

impl ConsoleConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "nas-console", "nas-console")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: ConsoleConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Fixture path: the environment override, then the config file, then
    /// `fixtures.json` in the platform data directory.
    pub fn fixture_path(&self) -> PathBuf {
        self.fixture_path_with(std::env::var(FIXTURES_ENV).ok())
    }

    fn fixture_path_with(&self, env_override: Option<String>) -> PathBuf {
        if let Some(path) = env_override.filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.fixture_path {
            return path.clone();
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("fixtures.json"))
            .unwrap_or_else(|| PathBuf::from("fixtures.json"))
    }

    /// Panel to open first; unknown keys fall back to the default panel
    pub fn initial_panel(&self) -> PanelKind {
        match self.initial_panel.as_deref() {
            Some(key) => PanelKind::from_key(key).unwrap_or_else(|| {
                tracing::warn!(key, "unknown initial panel in config");
                PanelKind::default()
            }),
            None => PanelKind::default(),
        }
    }

    pub fn validate_on_change(&self) -> bool {
        self.validate_on_change.unwrap_or(false)
    }
}
