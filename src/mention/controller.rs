//! CompletionController - Active match, selection cycling and commit
//!
//! Owns the single in-flight [`MatchState`]. Every transition replaces the
//! state wholesale; nothing hands out a mutable reference to it.
//!
//! # Key policy
//! While a match is active:
//! - Enter and Tab commit
//! - Space commits only for hashtags (names and relations may contain spaces)
//! - Up / Down move the selection
//!
//! With no active match every key belongs to the host editor.

use serde::{Deserialize, Serialize};

use super::annotation::{AnnotationId, AnnotationMode, AnnotationTable};
use super::candidates::CandidateSource;
use super::config::EditorConfig;
use super::document::{Block, Caret, Document, Span};
use super::error::{MentionError, MentionResult};
use super::keys::{CommandOutcome, Direction, Key, KeyCommand};
use super::scanner::{MatchScanner, MatchState, ScanOutcome};
use super::trigger::{TriggerKind, TriggerRegistry};

// =============================================================================
// Geometry
// =============================================================================

/// Screen position of a character, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub left: f64,
    pub top: f64,
}

/// Host hook used to place the autocomplete panel
pub trait GeometryProvider {
    /// Position of the character at `offset` in `block`, or `None` when it is not rendered
    fn screen_rect_for_offset(&self, block: &Block, offset: usize) -> Option<ScreenPoint>;
}

/// Provider for hosts that cannot measure anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl GeometryProvider for NoGeometry {
    fn screen_rect_for_offset(&self, _block: &Block, _offset: usize) -> Option<ScreenPoint> {
        None
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Single-match completion controller
#[derive(Debug, Clone, Default)]
pub struct CompletionController {
    config: EditorConfig,
    scanner: MatchScanner,
    active: Option<MatchState>,
}

impl CompletionController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            scanner: MatchScanner::new(TriggerRegistry::new()),
            active: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn active_match(&self) -> Option<&MatchState> {
        self.active.as_ref()
    }

    /// Drop the active match (e.g. the editor lost focus)
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Re-scan after the host changed text or moved the caret.
    ///
    /// Always replaces or clears the previous match before returning, so a
    /// stale match can never be committed by the next key event.
    pub fn on_text_changed(
        &mut self,
        document: &Document,
        annotations: &mut AnnotationTable,
        caret: &Caret,
        candidates: &CandidateSource,
        geometry: &dyn GeometryProvider,
    ) -> MentionResult<ScanOutcome> {
        let previous = self.active.take();

        let block = document.block(&caret.block_key)?;
        let state = match self.scanner.scan(block, caret.offset, annotations, candidates)? {
            ScanOutcome::Match(state) => state,
            other => return Ok(other),
        };

        let key = block.key();
        let reused = previous
            .as_ref()
            .filter(|p| {
                p.block_key() == key && p.start() == state.start() && p.trigger() == state.trigger()
            })
            .and_then(MatchState::annotation)
            .filter(|id| annotations.mode(*id) == Ok(AnnotationMode::Filling));
        let id = match reused {
            Some(id) => id,
            None => match annotations.ensure_filling_range(key, caret.offset) {
                Ok(id) => id,
                Err(MentionError::FrozenAnnotation(id)) => return Ok(ScanOutcome::Frozen(id)),
                Err(e) => return Err(e),
            },
        };
        let span = filling_extent(annotations, key, id, state.token_span());
        match annotations.apply_range(key, id, span) {
            Ok(()) => {}
            Err(MentionError::FrozenAnnotation(id)) => return Ok(ScanOutcome::Frozen(id)),
            Err(e) => return Err(e),
        }

        let (left, top) = self.panel_position(geometry, block, state.start());
        let state = state.with_annotation(id).with_position(left, top);

        if self.config.debug_logging {
            console_debug!(
                "[CompletionController] {} match '{}' at {}:{} ({} candidates)",
                state.trigger().as_str(),
                state.partial(),
                key,
                state.start(),
                state.candidates().len()
            );
        }

        self.active = Some(state.clone());
        Ok(ScanOutcome::Match(state))
    }

    /// Move the highlighted candidate with wraparound.
    /// An empty candidate list is a successful no-op.
    pub fn move_selection(&mut self, direction: Direction) -> MentionResult<()> {
        let state = self.active.as_ref().ok_or(MentionError::NoActiveMatch)?;
        let len = state.candidates().len();
        if len == 0 {
            return Ok(());
        }

        let current = state.selected();
        let next = match direction {
            Direction::Up if current == 0 => len - 1,
            Direction::Up => current - 1,
            Direction::Down if current + 1 >= len => 0,
            Direction::Down => current + 1,
        };
        self.active = Some(state.with_selected(next));
        Ok(())
    }

    /// Replace the typed token with the resolved word plus separator.
    ///
    /// Promotes the filling annotation to submitted over the word (the
    /// separator stays unannotated) and returns the caret just after the separator.
    pub fn commit(
        &mut self,
        document: &mut Document,
        annotations: &mut AnnotationTable,
    ) -> MentionResult<Caret> {
        let state = self.active.take().ok_or(MentionError::NoActiveMatch)?;
        let block = state.block_key().to_string();

        let id = match state.annotation() {
            Some(id) => id,
            None => annotations.create_filling(),
        };
        if annotations.mode(id)? == AnnotationMode::Submitted {
            return Err(MentionError::FrozenAnnotation(id));
        }

        let word = state.resolved_word();
        let replacement = format!("{}{}", word, self.config.separator);
        let token = state.token_span();

        let edit = document.replace_range(&block, token, &replacement)?;
        annotations.apply_edit(&block, &edit);

        let word_span = Span::new(token.start, token.start + word.chars().count());
        annotations.promote(id, &block, word_span)?;
        annotations.collect_garbage();

        if self.config.debug_logging {
            console_debug!("[CompletionController] committed '{}' in {}", word, block);
        }

        Ok(Caret::new(block, edit.new_end()))
    }

    /// Which command (if any) a key press maps to right now
    pub fn key_binding_for(&self, key: Key) -> Option<KeyCommand> {
        let state = self.active.as_ref()?;
        match key {
            Key::Enter | Key::Tab => Some(KeyCommand::Commit),
            Key::Space if state.trigger() == TriggerKind::Hashtag => Some(KeyCommand::Commit),
            Key::Up => Some(KeyCommand::SelectUp),
            Key::Down => Some(KeyCommand::SelectDown),
            _ => None,
        }
    }

    /// Run a host command. `NotHandled` tells the host to apply its default behaviour.
    ///
    /// Returns the new caret when a commit moved it.
    pub fn handle_key_command(
        &mut self,
        command: KeyCommand,
        document: &mut Document,
        annotations: &mut AnnotationTable,
    ) -> MentionResult<(CommandOutcome, Option<Caret>)> {
        let result = match command {
            KeyCommand::SelectUp => self.move_selection(Direction::Up).map(|_| None),
            KeyCommand::SelectDown => self.move_selection(Direction::Down).map(|_| None),
            KeyCommand::Commit => self.commit(document, annotations).map(Some),
        };

        match result {
            Ok(caret) => Ok((CommandOutcome::Handled, caret)),
            Err(MentionError::NoActiveMatch) => Ok((CommandOutcome::NotHandled, None)),
            Err(e) => Err(e),
        }
    }

    fn panel_position(
        &self,
        geometry: &dyn GeometryProvider,
        block: &Block,
        offset: usize,
    ) -> (Option<f64>, Option<f64>) {
        match geometry.screen_rect_for_offset(block, offset) {
            Some(point) => (Some(point.left), Some(point.top)),
            None => (Some(self.config.fallback_left), self.config.fallback_top),
        }
    }
}

/// Token span widened over the characters `id` already carries past the caret
fn filling_extent(annotations: &AnnotationTable, block: &str, id: AnnotationId, token: Span) -> Span {
    let end = annotations
        .spans_of(block, id)
        .into_iter()
        .filter(|s| s.start <= token.end && s.end >= token.start)
        .map(|s| s.end)
        .fold(token.end, usize::max);
    Span::new(token.start, end)
}

// =============================================================================
// Tests
// =============================================================================
