//! Key events, key commands and command outcomes shared with the host editor

use serde::{Deserialize, Serialize};

/// Keys the mention core cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Space,
    Tab,
    Up,
    Down,
    Other,
}

impl Key {
    /// Map a legacy DOM `keyCode`
    pub fn from_key_code(code: u32) -> Self {
        match code {
            13 => Key::Enter,
            32 => Key::Space,
            9 => Key::Tab,
            38 => Key::Up,
            40 => Key::Down,
            _ => Key::Other,
        }
    }
}

/// Commands the host forwards to the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCommand {
    #[serde(rename = "selectUp")]
    SelectUp,
    #[serde(rename = "selectDown")]
    SelectDown,
    #[serde(rename = "autocomplete")]
    Commit,
}

impl KeyCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCommand::SelectUp => "selectUp",
            KeyCommand::SelectDown => "selectDown",
            KeyCommand::Commit => "autocomplete",
        }
    }

    /// Parse a host command name; unknown names belong to the host's own editor
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "selectUp" => Some(KeyCommand::SelectUp),
            "selectDown" => Some(KeyCommand::SelectDown),
            "autocomplete" => Some(KeyCommand::Commit),
            _ => None,
        }
    }
}

/// Whether the core consumed a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandOutcome {
    #[serde(rename = "handled")]
    Handled,
    #[serde(rename = "not-handled")]
    NotHandled,
}

impl CommandOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandOutcome::Handled => "handled",
            CommandOutcome::NotHandled => "not-handled",
        }
    }
}

/// Selection direction in the candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}
