use config::{Config, File};
use serde::Deserialize;

use crate::error::PanelError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PanelConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphConfig {
    /// Similarity threshold used when graph mode is first entered.
    pub default_threshold: f64,
    /// Camera scale below which zoom events boost label fonts.
    pub zoom_boost_scale: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.35,
            zoom_boost_scale: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PanelConfig {
    /// Load from a TOML file. A missing file yields the defaults; a present
    /// but malformed one is an error.
    pub fn load(path: &str) -> Result<Self, PanelError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;
        Ok(s.try_deserialize()?)
    }
}
