//! MentionEngine - Native facade over the mention core
//!
//! Owns the document, the annotation table, the candidate vocabularies and
//! the completion controller. One `&mut self` call per host event:
//!
//! 1. `on_change` diffs the new block text, keeps annotations aligned and rescans
//! 2. `key_binding_for` tells the host whether a key belongs to the core
//! 3. `handle_key_command` moves the selection or commits
//! 4. `decorations` / `active_match` / `stats` feed the presentation layer
//!
//! The JS facade in `wasm.rs` wraps this type; everything here stays usable
//! (and testable) without a browser.

use serde::{Deserialize, Serialize};

use super::annotation::{AnnotationMode, AnnotationTable};
use super::candidates::CandidateSource;
use super::config::EditorConfig;
use super::controller::{CompletionController, GeometryProvider, NoGeometry};
use super::document::{Caret, Document};
use super::error::{MentionError, MentionResult};
use super::keys::{CommandOutcome, Key, KeyCommand};
use super::scanner::{MatchState, ScanOutcome};
use super::trigger::TriggerKind;

// =============================================================================
// Types
// =============================================================================

/// Counters for the editor session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorStats {
    pub scans: u64,
    pub matches: u64,
    pub commits: u64,
    pub frozen_hits: u64,
    /// Duration of the last scan in milliseconds
    pub last_scan_ms: f64,
}

/// What the autocomplete panel needs to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMatchView {
    pub screen_left: Option<f64>,
    pub screen_top: Option<f64>,
    pub candidates: Vec<String>,
    pub selected_index: usize,
    pub trigger: TriggerKind,
    pub partial: String,
}

impl From<&MatchState> for ActiveMatchView {
    fn from(state: &MatchState) -> Self {
        Self {
            screen_left: state.screen_left(),
            screen_top: state.screen_top(),
            candidates: state.candidates().to_vec(),
            selected_index: state.selected(),
            trigger: state.trigger(),
            partial: state.partial().to_string(),
        }
    }
}

/// Styled range for the host's decorator (character offsets)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub start: usize,
    pub end: usize,
    pub mode: AnnotationMode,
}

// =============================================================================
// MentionEngine
// =============================================================================

/// Mention editor state for one document
pub struct MentionEngine {
    config: EditorConfig,
    document: Document,
    annotations: AnnotationTable,
    candidates: CandidateSource,
    controller: CompletionController,
    geometry: Box<dyn GeometryProvider>,
    caret: Option<Caret>,
    stats: EditorStats,
}

impl Default for MentionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionEngine {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            controller: CompletionController::new(config.clone()),
            config,
            document: Document::new(),
            annotations: AnnotationTable::new(),
            candidates: CandidateSource::new(),
            geometry: Box::new(NoGeometry),
            caret: None,
            stats: EditorStats::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn annotations(&self) -> &AnnotationTable {
        &self.annotations
    }

    /// Replace the candidate vocabularies
    pub fn set_candidates(&mut self, candidates: CandidateSource) {
        if self.config.debug_logging {
            console_debug!("[MentionEngine] Hydrated {} candidates", candidates.len());
        }
        self.candidates = candidates;
    }

    pub fn set_geometry(&mut self, geometry: Box<dyn GeometryProvider>) {
        self.geometry = geometry;
    }

    // -------------------------------------------------------------------------
    // Blocks
    // -------------------------------------------------------------------------

    pub fn insert_block(&mut self, key: &str, text: &str) -> MentionResult<()> {
        self.document.insert_block(key, text)
    }

    /// Remove a block and everything anchored to it
    pub fn remove_block(&mut self, key: &str) -> MentionResult<()> {
        self.document.remove_block(key)?;
        self.annotations.remove_block(key);
        self.annotations.collect_garbage();

        if self.caret.as_ref().is_some_and(|c| c.block_key == key) {
            self.caret = None;
        }
        if self
            .controller
            .active_match()
            .is_some_and(|m| m.block_key() == key)
        {
            self.controller.clear();
        }
        Ok(())
    }

    pub fn text(&self, key: &str) -> MentionResult<&str> {
        self.document.text(key)
    }

    pub fn caret(&self) -> Option<&Caret> {
        self.caret.as_ref()
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Host reported new text and caret for a block.
    ///
    /// Returns the active match after rescanning, if any. A failed change
    /// leaves no active match behind.
    pub fn on_change(
        &mut self,
        key: &str,
        text: &str,
        offset: usize,
    ) -> MentionResult<Option<ActiveMatchView>> {
        let result = self.apply_change(key, text, offset);
        if result.is_err() {
            self.controller.clear();
        }
        result
    }

    fn apply_change(
        &mut self,
        key: &str,
        text: &str,
        offset: usize,
    ) -> MentionResult<Option<ActiveMatchView>> {
        let len = text.chars().count();
        if offset > len {
            return Err(MentionError::OffsetOutOfBounds {
                block: key.to_string(),
                offset,
                len,
            });
        }

        if let Some(edit) = self.document.set_block_text(key, text, offset)? {
            self.annotations.apply_edit(key, &edit);
        }
        let caret = Caret::new(key, offset);

        let start = instant::Instant::now();
        let outcome = self.controller.on_text_changed(
            &self.document,
            &mut self.annotations,
            &caret,
            &self.candidates,
            self.geometry.as_ref(),
        );
        self.stats.last_scan_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.stats.scans += 1;
        self.caret = Some(caret);

        let outcome = outcome?;
        self.annotations.collect_garbage();

        match outcome {
            ScanOutcome::Match(_) => self.stats.matches += 1,
            ScanOutcome::Frozen(id) => {
                self.stats.frozen_hits += 1;
                if self.config.debug_logging {
                    console_debug!("[MentionEngine] Caret against submitted annotation {}", id);
                }
            }
            ScanOutcome::NoMatch => {}
        }

        Ok(self.active_match())
    }

    pub fn active_match(&self) -> Option<ActiveMatchView> {
        self.controller.active_match().map(ActiveMatchView::from)
    }

    pub fn key_binding_for(&self, key: Key) -> Option<KeyCommand> {
        self.controller.key_binding_for(key)
    }

    /// Run a key command; a commit moves the caret after the inserted separator
    pub fn handle_key_command(&mut self, command: KeyCommand) -> MentionResult<CommandOutcome> {
        let (outcome, caret) = self.controller.handle_key_command(
            command,
            &mut self.document,
            &mut self.annotations,
        )?;

        if let Some(caret) = caret {
            self.stats.commits += 1;
            self.caret = Some(caret);
        }
        Ok(outcome)
    }

    /// Forget the active match (focus lost, selection change outside the editor)
    pub fn dismiss(&mut self) {
        self.controller.clear();
    }

    // -------------------------------------------------------------------------
    // Presentation
    // -------------------------------------------------------------------------

    /// Filling and submitted ranges of a block, sorted by start
    pub fn decorations(&self, key: &str) -> MentionResult<Vec<Decoration>> {
        self.document.block(key)?;
        let decorations = self
            .annotations
            .ranges(key)
            .iter()
            .filter_map(|r| {
                self.annotations.get(r.id).map(|a| Decoration {
                    start: r.span.start,
                    end: r.span.end,
                    mode: a.mode,
                })
            })
            .collect();
        Ok(decorations)
    }

    pub fn stats(&self) -> &EditorStats {
        &self.stats
    }
}

// =============================================================================
// Tests
// =============================================================================
