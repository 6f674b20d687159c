//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.mc-bridge/config.json`) and environment.
//! Every key has a default, so an empty object or a missing file is a valid config.

use crate::relay::{ColorStyle, DisplayColor};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level bridge config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway connection settings.
    #[serde(default)]
    pub websocket: WebSocketConfig,

    /// Which host events are relayed.
    #[serde(default)]
    pub features: FeaturesConfig,

    /// How inbound lines are rendered for the host.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Names and avatars used for outbound lines.
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Gateway endpoint and reconnect delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSocketConfig {
    /// Gateway URL (default "ws://127.0.0.1:8080"). Overridden by BRIDGE_WEBSOCKET_URL env.
    #[serde(default = "default_websocket_url")]
    pub url: String,

    /// Seconds to wait before reconnecting after the link drops (default 5). Fixed, no backoff.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay: u64,
}

fn default_websocket_url() -> String {
    "ws://127.0.0.1:8080".to_string()
}

fn default_reconnect_delay() -> u64 {
    5
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            url: default_websocket_url(),
            reconnect_delay: default_reconnect_delay(),
        }
    }
}

/// Feature toggles for host events. All default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesConfig {
    #[serde(default = "enabled")]
    pub join_leave_messages: bool,
    #[serde(default = "enabled")]
    pub death_messages: bool,
    #[serde(default = "enabled")]
    pub advancements: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            join_leave_messages: true,
            death_messages: true,
            advancements: true,
        }
    }
}

/// Display settings for lines received from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Color key used when a message has no or an unknown `userColor` (default "aqua").
    #[serde(default = "default_color_key")]
    pub default_color: String,

    /// "tagged" (default), "legacy" (§ codes), or "ansi".
    #[serde(default)]
    pub style: ColorStyle,
}

fn default_color_key() -> String {
    "aqua".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_color: default_color_key(),
            style: ColorStyle::default(),
        }
    }
}

/// Identity attached to outbound lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityConfig {
    /// Username for server-originated lines (join, leave, death).
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Avatar for server-originated lines.
    #[serde(default = "default_server_avatar_url")]
    pub server_avatar_url: String,

    /// Player avatars are this prefix followed by the player name.
    #[serde(default = "default_player_avatar_base_url")]
    pub player_avatar_base_url: String,
}

fn default_server_name() -> String {
    "Server".to_string()
}

fn default_server_avatar_url() -> String {
    "https://neonation.net/assets/server.png".to_string()
}

fn default_player_avatar_base_url() -> String {
    "https://mc-heads.net/avatar/".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            server_avatar_url: default_server_avatar_url(),
            player_avatar_base_url: default_player_avatar_base_url(),
        }
    }
}

/// Resolve the gateway URL: env BRIDGE_WEBSOCKET_URL overrides config.
pub fn resolve_websocket_url(config: &Config) -> String {
    std::env::var("BRIDGE_WEBSOCKET_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.websocket.url.trim().to_string())
}

/// Resolve `display.defaultColor`. Unknown keys fall back to aqua.
pub fn resolve_default_color(config: &Config) -> DisplayColor {
    let key = config.display.default_color.trim();
    DisplayColor::from_tag(key).unwrap_or_else(|| {
        log::warn!("unknown display.defaultColor {:?}, using aqua", key);
        DisplayColor::DEFAULT
    })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("BRIDGE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".mc-bridge").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, else the default path (or BRIDGE_CONFIG_PATH).
/// Missing file => default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
