//! Error types for the mention core

use std::fmt;
use wasm_bindgen::JsValue;

use super::annotation::AnnotationId;

/// Errors raised by the mention core
#[derive(Debug, Clone, PartialEq)]
pub enum MentionError {
    /// Caret sits against a submitted annotation; the token is frozen
    FrozenAnnotation(AnnotationId),
    /// Commit or selection change requested with no active match
    NoActiveMatch,
    /// Block key not present in the document
    UnknownBlock(String),
    /// Annotation id not present in the annotation table
    UnknownAnnotation(AnnotationId),
    /// Offset or span outside the block text
    OffsetOutOfBounds {
        block: String,
        offset: usize,
        len: usize,
    },
    /// Block key already present in the document
    DuplicateBlock(String),
    /// Editor configuration could not be decoded
    InvalidConfig(String),
    /// Candidate vocabulary could not be decoded
    InvalidCandidates(String),
}

impl MentionError {
    /// True for errors caused by an inconsistent document rather than caller misuse
    pub fn is_malformed_document(&self) -> bool {
        matches!(
            self,
            MentionError::UnknownBlock(_)
                | MentionError::UnknownAnnotation(_)
                | MentionError::OffsetOutOfBounds { .. }
        )
    }
}

impl fmt::Display for MentionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentionError::FrozenAnnotation(id) => {
                write!(f, "Annotation {} is submitted and cannot be edited", id)
            }
            MentionError::NoActiveMatch => write!(f, "No active match"),
            MentionError::UnknownBlock(key) => write!(f, "Unknown block: {}", key),
            MentionError::UnknownAnnotation(id) => write!(f, "Unknown annotation: {}", id),
            MentionError::OffsetOutOfBounds { block, offset, len } => write!(
                f,
                "Offset {} out of bounds for block {} (length {})",
                offset, block, len
            ),
            MentionError::DuplicateBlock(key) => write!(f, "Duplicate block: {}", key),
            MentionError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            MentionError::InvalidCandidates(msg) => write!(f, "Invalid candidates: {}", msg),
        }
    }
}

impl std::error::Error for MentionError {}

impl From<MentionError> for JsValue {
    fn from(err: MentionError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

pub type MentionResult<T> = std::result::Result<T, MentionError>;
