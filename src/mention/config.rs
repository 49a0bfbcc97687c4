// mentioncore/src/mention/config.rs
//
// Configuration types for the mention editor

use serde::{Deserialize, Serialize};

use super::error::{MentionError, MentionResult};

/// Horizontal panel offset used when the host cannot measure the caret
pub const DEFAULT_FALLBACK_LEFT: f64 = 20.0;

/// Text inserted after every committed token
pub const DEFAULT_SEPARATOR: &str = " ";

/// Mention editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Appended after the committed word
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Panel left coordinate when geometry is unavailable
    #[serde(default = "default_fallback_left")]
    pub fallback_left: f64,

    /// Panel top coordinate when geometry is unavailable.
    /// Unset by default: the host keeps the panel's previous vertical position.
    #[serde(default)]
    pub fallback_top: Option<f64>,

    /// Emit debug logs to the browser console
    #[serde(default)]
    pub debug_logging: bool,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_fallback_left() -> f64 {
    DEFAULT_FALLBACK_LEFT
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            fallback_left: DEFAULT_FALLBACK_LEFT,
            fallback_top: None,
            debug_logging: false,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling in defaults for missing fields
    pub fn from_json(json: &str) -> MentionResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MentionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: enable console debug logging
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Builder: set the vertical geometry fallback
    pub fn with_fallback_top(mut self, top: f64) -> Self {
        self.fallback_top = Some(top);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> MentionResult<()> {
        if !self.fallback_left.is_finite() {
            return Err(MentionError::InvalidConfig(
                "fallbackLeft must be a finite number".to_string(),
            ));
        }
        if let Some(top) = self.fallback_top {
            if !top.is_finite() {
                return Err(MentionError::InvalidConfig(
                    "fallbackTop must be a finite number".to_string(),
                ));
            }
        }
        if self.separator.contains('\n') {
            return Err(MentionError::InvalidConfig(
                "separator must not contain line breaks".to_string(),
            ));
        }
        Ok(())
    }
}
