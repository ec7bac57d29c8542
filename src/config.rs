use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    BACKEND_LATENCY_MS, CONVERSATION_PAGE_SIZE, DESKTOP_MIN_WIDTH, HOVER_ENTER_DELAY_MS,
    HOVER_EXIT_DELAY_MS, NOTIFICATION_TTL_SECS, SEARCH_DEBOUNCE_MS, VIRTUALIZATION_THRESHOLD,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub keybinding_mode: KeybindingMode,
    #[serde(default)]
    pub theme: ThemeVariant,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeybindingMode {
    #[default]
    Vim,
    Arrows,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    #[serde(rename = "high-contrast")]
    HighContrast,
}

/// Timing and layout of the conversation panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_hover_enter_delay_ms")]
    pub hover_enter_delay_ms: u64,
    #[serde(default = "default_hover_exit_delay_ms")]
    pub hover_exit_delay_ms: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    /// Lists with more conversations than this switch to the windowed renderer
    #[serde(default = "default_virtualization_threshold")]
    pub virtualization_threshold: usize,
    /// Terminal columns; at or below this the panel is a mobile drawer
    #[serde(default = "default_desktop_min_width")]
    pub desktop_min_width: u16,
    /// Disable to rely on the local filter alone
    #[serde(default = "default_true")]
    pub remote_search: bool,
    #[serde(default = "default_notification_ttl_secs")]
    pub notification_ttl_secs: u64,
}

impl PanelConfig {
    pub fn hover_enter_delay(&self) -> Duration {
        Duration::from_millis(self.hover_enter_delay_ms)
    }

    pub fn hover_exit_delay(&self) -> Duration {
        Duration::from_millis(self.hover_exit_delay_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }
}

/// Behaviour of the simulated conversation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Mean round-trip latency; each call is jittered around it
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Probability in 0.0..=1.0 that a call fails as unavailable
    #[serde(default)]
    pub failure_rate: f64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            keybinding_mode: KeybindingMode::default(),
            theme: ThemeVariant::default(),
            date_format: default_date_format(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            hover_enter_delay_ms: default_hover_enter_delay_ms(),
            hover_exit_delay_ms: default_hover_exit_delay_ms(),
            search_debounce_ms: default_search_debounce_ms(),
            virtualization_threshold: default_virtualization_threshold(),
            desktop_min_width: default_desktop_min_width(),
            remote_search: true,
            notification_ttl_secs: default_notification_ttl_secs(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            failure_rate: 0.0,
            page_size: default_page_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_date_format() -> String {
    "%b %d".to_string()
}

fn default_hover_enter_delay_ms() -> u64 {
    HOVER_ENTER_DELAY_MS
}

fn default_hover_exit_delay_ms() -> u64 {
    HOVER_EXIT_DELAY_MS
}

fn default_search_debounce_ms() -> u64 {
    SEARCH_DEBOUNCE_MS
}

fn default_virtualization_threshold() -> usize {
    VIRTUALIZATION_THRESHOLD
}

fn default_desktop_min_width() -> u16 {
    DESKTOP_MIN_WIDTH
}

fn default_notification_ttl_secs() -> u64 {
    NOTIFICATION_TTL_SECS
}

fn default_latency_ms() -> u64 {
    BACKEND_LATENCY_MS
}

fn default_page_size() -> usize {
    CONVERSATION_PAGE_SIZE
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("chatrail");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("Could not find data directory")?
            .join("chatrail");
        Ok(dir)
    }

    pub fn database_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("conversations.db"))
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        if !(0.0..=1.0).contains(&config.backend.failure_rate) {
            tracing::warn!(
                "backend.failure_rate {} out of range, clamping",
                config.backend.failure_rate
            );
            config.backend.failure_rate = config.backend.failure_rate.clamp(0.0, 1.0);
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path
            .parent()
            .context("Config path has no parent directory")?;

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        fs::create_dir_all(Self::data_dir()?)?;
        Ok(())
    }
}
