use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_GATEWAY_URL;
use crate::prompt::{CommentLevel, Mode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_fps: f64,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default)]
    pub default_mode: Mode,
    #[serde(default)]
    pub default_comment_level: CommentLevel,
    /// Submit without a client key and let the gateway use its own.
    #[serde(default)]
    pub allow_server_key: bool,
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_fps: default_tick_rate(),
            gateway_url: default_gateway_url(),
            default_mode: Mode::default(),
            default_comment_level: CommentLevel::default(),
            allow_server_key: false,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/copycode/config.toml"))
}

pub fn load_config() -> AppConfig {
    let Some(path) = config_path() else {
        return AppConfig::default();
    };

    let Ok(contents) = fs::read_to_string(&path) else {
        return AppConfig::default();
    };

    parse_config(&contents)
}

fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!("ignoring invalid config.toml: {e}");
        AppConfig::default()
    })
}
