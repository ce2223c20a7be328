//! Configuration file support for diffnav
//!
//! Config file location: `~/.config/diffnav/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [ui]
//! view_mode = "unified"
//! scrollbar = true
//! file_panel_width = 32
//! time = "relative"
//! time_format = "%Y-%m-%d"
//!
//! [git]
//! commit_limit = 100
//! timeout_ms = 10000
//!
//! [render]
//! virtual_threshold = 500
//! ```

use crate::app::ViewMode;
use crate::views::VIRTUAL_THRESHOLD;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// How commit dates are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    #[default]
    Relative,
    Absolute,
    /// Absolute, using `ui.time_format`
    Custom,
}

/// UI configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Default view mode: "unified" or "split"
    pub view_mode: Option<String>,
    /// Show scrollbar next to the diff pane
    pub scrollbar: bool,
    /// Width of the left column holding the file list and commit pane
    pub file_panel_width: u16,
    pub time: TimeMode,
    /// strftime or `time` format description, used when `time = "custom"`
    pub time_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            view_mode: None,
            scrollbar: true,
            file_panel_width: 32,
            time: TimeMode::Relative,
            time_format: String::new(),
        }
    }
}

/// Git backend configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Commits loaded per log request
    pub commit_limit: usize,
    /// Time budget for a single git call
    pub timeout_ms: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            commit_limit: 100,
            timeout_ms: 10_000,
        }
    }
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

/// Renderer configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Content with more rows than this renders virtually
    pub virtual_threshold: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            virtual_threshold: VIRTUAL_THRESHOLD,
        }
    }
}

/// Root configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub git: GitConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG_CONFIG_HOME (if set)
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("diffnav").join("config.toml"));
        }

        // 2. ~/.config/diffnav/config.toml (XDG default, works on all platforms)
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("diffnav").join("config.toml"));
        }

        // 3. Platform-specific config dir (~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("diffnav").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Load config from XDG config path
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| {
                Self::parse(&content)
                    .map_err(|e| {
                        eprintln!("Warning: Failed to parse config: {}", e);
                        tracing::warn!(error = %e, "failed to parse config");
                        e
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Parse view mode string to ViewMode enum
    pub fn parse_view_mode(&self) -> Option<ViewMode> {
        self.ui.view_mode.as_ref().and_then(|s| match s.as_str() {
            "unified" => Some(ViewMode::Unified),
            "split" | "sbs" => Some(ViewMode::Split),
            _ => None,
        })
    }
}
