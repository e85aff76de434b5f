//! Session configuration supplied by the menu
//!
//! Consumed once when a session starts: seeds the hero's display name, color
//! and skin, and the wager used for the earnings estimate on the end screen.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{Rgba, parse_hex};

/// Longest nickname the menu accepts (in characters)
pub const MAX_NICKNAME_CHARS: usize = 14;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("nickname is empty")]
    EmptyNickname,
    #[error("nickname has {0} characters, at most 14 allowed")]
    NicknameTooLong(usize),
    #[error("color `{0}` is not a hex color")]
    InvalidColor(String),
    #[error("wager {0} must be a positive finite amount")]
    InvalidWager(f64),
    #[error("config JSON is malformed: {0}")]
    Parse(String),
}

/// Skin strings starting with `data:` or `http` are images, anything else is text
pub fn is_image_ref(skin: &str) -> bool {
    skin.starts_with("data:") || skin.starts_with("http")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub nickname: String,
    /// Hex color, e.g. `#4ade80`
    pub color: String,
    /// Emoji, or an image reference (`data:` / `http` URL)
    pub avatar: String,
    /// Entry fee in SOL
    pub wager: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            nickname: "TrashPanda".to_string(),
            color: "#4ade80".to_string(),
            avatar: "🦝".to_string(),
            wager: 10.0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chars = self.nickname.chars().count();
        if chars == 0 {
            return Err(ConfigError::EmptyNickname);
        }
        if chars > MAX_NICKNAME_CHARS {
            return Err(ConfigError::NicknameTooLong(chars));
        }
        if parse_hex(&self.color).is_none() {
            return Err(ConfigError::InvalidColor(self.color.clone()));
        }
        if !self.wager.is_finite() || self.wager <= 0.0 {
            return Err(ConfigError::InvalidWager(self.wager));
        }
        Ok(())
    }

    /// Truncate the nickname the way the menu input does
    pub fn sanitized(mut self) -> Self {
        if self.nickname.chars().count() > MAX_NICKNAME_CHARS {
            self.nickname = self.nickname.chars().take(MAX_NICKNAME_CHARS).collect();
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = config.sanitized();
        config.validate()?;
        Ok(config)
    }

    /// Hero color; validated configs always parse
    pub fn rgba(&self) -> Rgba {
        parse_hex(&self.color).unwrap_or(crate::color::WHITE)
    }

    /// Whether the avatar is an image reference rather than an emoji
    pub fn avatar_is_image(&self) -> bool {
        is_image_ref(&self.avatar)
    }

    /// Earnings estimate shown on the end screen
    pub fn estimated_earnings(&self, score: u32) -> f64 {
        score as f64 / 100.0 * self.wager / 10.0
    }

    /// Load the menu's config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten());

        match json.map(|j| Self::from_json(&j)) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("Invalid stored config ({}), using defaults", e);
                Self::default()
            }
            None => {
                log::info!("No stored config, using defaults");
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "trash_wars_config";
}
