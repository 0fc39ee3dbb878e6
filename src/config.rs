//! Configuration loading for Quoteboard.
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the Quoteboard home directory (~/.quoteboard).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".quoteboard"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.quoteboard/settings.json
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}. Run 'quoteboard setup' first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    match settings.avatar.source.as_str() {
        "qlogo" | "platform" => {}
        other => {
            return Err(Error::Config(format!(
                "avatar.source '{}' is not supported (expected 'qlogo' or 'platform')",
                other
            )));
        }
    }
    if settings.card.width == 0 || settings.card.height == 0 {
        return Err(Error::Config(
            "card.width and card.height must be non-zero".to_string(),
        ));
    }
    Ok(())
}

/// Load settings or return default if not found.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

/// Write settings back to ~/.quoteboard/settings.json.
pub fn write_settings(settings: &Settings) -> Result<()> {
    validate_settings(settings)?;
    let path = get_settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, content)?;
    tracing::info!("Wrote settings to {}", path.display());
    Ok(())
}

/// Resolve the data root: explicit override or <home>/data.
pub fn get_data_dir(settings: &Settings) -> Result<PathBuf> {
    if let Some(dir) = &settings.data_dir {
        return Ok(dir.clone());
    }
    Ok(get_home_dir()?.join("data"))
}

/// Channel configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ChannelConfig {
    pub bot_token: Option<String>,
}

/// Channels configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Channels {
    pub enabled: Vec<String>,
    #[serde(default)]
    pub telegram: ChannelConfig,
}

/// Avatar source configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AvatarConfig {
    /// "qlogo" builds a public qlogo URL from the author id;
    /// "platform" fetches the profile photo through the bot file API.
    #[serde(default = "default_avatar_source")]
    pub source: String,

    #[serde(default = "default_qlogo_size")]
    pub qlogo_size: u32,
}

fn default_avatar_source() -> String {
    "qlogo".to_string()
}

fn default_qlogo_size() -> u32 {
    640
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            source: default_avatar_source(),
            qlogo_size: default_qlogo_size(),
        }
    }
}

/// Rendered card layout configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CardConfig {
    #[serde(default = "default_card_width")]
    pub width: u32,

    #[serde(default = "default_card_height")]
    pub height: u32,

    #[serde(default = "default_bg_color")]
    pub bg_color: String,

    #[serde(default = "default_text_color")]
    pub text_color: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_card_width() -> u32 {
    1280
}

fn default_card_height() -> u32 {
    427
}

fn default_bg_color() -> String {
    "#000".to_string()
}

fn default_text_color() -> String {
    "#fff".to_string()
}

fn default_font_family() -> String {
    "-apple-system, BlinkMacSystemFont, 'Segoe UI', 'PingFang SC', 'Hiragino Sans GB', 'Microsoft YaHei', 'WenQuanYi Micro Hei', Arial, sans-serif".to_string()
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: default_card_width(),
            height: default_card_height(),
            bg_color: default_bg_color(),
            text_color: default_text_color(),
            font_family: default_font_family(),
        }
    }
}

/// Quoteboard settings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    /// Override for the data root; defaults to ~/.quoteboard/data.
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub channels: Channels,

    #[serde(default)]
    pub avatar: AvatarConfig,

    #[serde(default)]
    pub card: CardConfig,

    /// Plain message that triggers a random quote without a slash command.
    #[serde(default = "default_trigger_phrase")]
    pub trigger_phrase: String,
}

fn default_trigger_phrase() -> String {
    "quote!".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            channels: Channels::default(),
            avatar: AvatarConfig::default(),
            card: CardConfig::default(),
            trigger_phrase: default_trigger_phrase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
        assert_eq!(settings.avatar.source, "qlogo");
        assert_eq!(settings.card.width, 1280);
        assert_eq!(settings.card.height, 427);
    }

    #[test]
    fn rejects_unknown_avatar_source() {
        let mut settings = Settings::default();
        settings.avatar.source = "gravatar".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.channels.telegram.bot_token = Some("123:abc".to_string());
        settings.trigger_phrase = "quote me".to_string();

        let json = serde_json::to_string_pretty(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();

        assert_eq!(back.channels.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(back.trigger_phrase, "quote me");
        assert_eq!(back.card.bg_color, "#000");
    }
}
