//! MatchScanner - Active trigger detection around the caret
//!
//! Given a block, the caret offset and the annotation table, decides whether
//! the caret sits inside an in-progress trigger token and, if so, builds the
//! [`MatchState`] the controller exposes to the presentation layer.

use serde::{Deserialize, Serialize};

use super::annotation::{AnnotationId, AnnotationTable};
use super::candidates::CandidateSource;
use super::document::{Block, Span};
use super::error::{MentionError, MentionResult};
use super::trigger::{TriggerKind, TriggerRegistry};

// ==================== TYPE DEFINITIONS ====================

/// In-flight completion state for the token under the caret.
///
/// Immutable: every transition builds a new value through the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    partial: String,
    start: usize,
    trigger: TriggerKind,
    candidates: Vec<String>,
    selected: usize,
    block_key: String,
    annotation: Option<AnnotationId>,
    screen_left: Option<f64>,
    screen_top: Option<f64>,
}

/// Result of scanning at the caret
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The caret is inside an editable trigger token
    Match(MatchState),
    /// The caret is against (or the token starts inside) a submitted annotation
    Frozen(AnnotationId),
    /// No trigger token at the caret
    NoMatch,
}

impl ScanOutcome {
    pub fn into_match(self) -> Option<MatchState> {
        match self {
            ScanOutcome::Match(state) => Some(state),
            _ => None,
        }
    }
}

// ==================== MATCH STATE ====================

impl MatchState {
    pub fn new(
        block_key: impl Into<String>,
        trigger: TriggerKind,
        start: usize,
        partial: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        Self {
            partial: partial.into(),
            start,
            trigger,
            candidates,
            selected: 0,
            block_key: block_key.into(),
            annotation: None,
            screen_left: None,
            screen_top: None,
        }
    }

    pub fn partial(&self) -> &str {
        &self.partial
    }

    /// Offset of the trigger literal
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn block_key(&self) -> &str {
        &self.block_key
    }

    pub fn annotation(&self) -> Option<AnnotationId> {
        self.annotation
    }

    pub fn screen_left(&self) -> Option<f64> {
        self.screen_left
    }

    pub fn screen_top(&self) -> Option<f64> {
        self.screen_top
    }

    pub fn selected_candidate(&self) -> Option<&str> {
        self.candidates.get(self.selected).map(String::as_str)
    }

    /// Characters typed so far, literal included
    pub fn token_span(&self) -> Span {
        let len = self.trigger.literal().chars().count() + self.partial.chars().count();
        Span::new(self.start, self.start + len)
    }

    /// Literal plus the selected candidate, or plus the raw partial when nothing matched
    pub fn resolved_word(&self) -> String {
        let body = self.selected_candidate().unwrap_or(&self.partial);
        format!("{}{}", self.trigger.literal(), body)
    }

    pub fn with_selected(&self, selected: usize) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }

    pub fn with_annotation(&self, id: AnnotationId) -> Self {
        Self {
            annotation: Some(id),
            ..self.clone()
        }
    }

    pub fn with_position(&self, left: Option<f64>, top: Option<f64>) -> Self {
        Self {
            screen_left: left,
            screen_top: top,
            ..self.clone()
        }
    }
}

// ==================== SCANNER ====================

/// Trigger detection over one block
#[derive(Debug, Clone, Default)]
pub struct MatchScanner {
    registry: TriggerRegistry,
}

impl MatchScanner {
    pub fn new(registry: TriggerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Scan `block` at `offset`.
    ///
    /// Specs are tried in registry order. A token whose first character is
    /// already submitted is skipped for that spec so the next spec gets a turn.
    pub fn scan(
        &self,
        block: &Block,
        offset: usize,
        annotations: &AnnotationTable,
        candidates: &CandidateSource,
    ) -> MentionResult<ScanOutcome> {
        if offset > block.len() {
            return Err(MentionError::OffsetOutOfBounds {
                block: block.key().to_string(),
                offset,
                len: block.len(),
            });
        }

        let key = block.key();
        if let Some(id) = annotations.annotation_before(key, offset) {
            if annotations.is_submitted_at(key, offset - 1) {
                return Ok(ScanOutcome::Frozen(id));
            }
        }

        let mut frozen = None;
        for spec in self.registry.specs() {
            let Some(span) = spec.active_at(block.text(), offset) else {
                continue;
            };
            if annotations.is_submitted_at(key, span.start) {
                frozen = annotations.annotation_at(key, span.start);
                continue;
            }

            let partial = block.slice(Span::new(span.start + spec.literal_len(), offset))?;
            let ranked = candidates.resolve(spec.source_key(), partial);
            return Ok(ScanOutcome::Match(MatchState::new(
                key,
                spec.kind(),
                span.start,
                partial,
                ranked,
            )));
        }

        Ok(frozen.map_or(ScanOutcome::NoMatch, ScanOutcome::Frozen))
    }
}

// ==================== TESTS ====================
