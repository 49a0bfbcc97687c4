//! AnnotationTable - Filling/submitted mention ranges per block
//!
//! Explicit replacement for a global entity registry: the table owns every
//! annotation and the character ranges it covers, and is passed by reference
//! to whoever needs it.
//!
//! # Lifecycle
//! `none -> filling -> submitted -> (garbage once no characters carry it)`
//!
//! - Filling annotations are provisional and may be widened or clipped.
//! - Submitted annotations are immutable; edits that touch their characters
//!   destroy the range instead of reshaping it.
//!
//! Ranges in a block never overlap: assigning characters to one annotation
//! takes them away from whichever filling annotation held them before.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::document::{Span, TextEdit};
use super::error::{MentionError, MentionResult};

// =============================================================================
// Types
// =============================================================================

/// Stable annotation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u32);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the annotation marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnnotationKind {
    Mention,
}

/// Editing state of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMode {
    /// Provisional, still being typed
    Filling,
    /// Committed, immutable
    Submitted,
}

impl AnnotationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationMode::Filling => "filling",
            AnnotationMode::Submitted => "submitted",
        }
    }
}

/// Annotation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub mode: AnnotationMode,
}

/// A run of characters carried by one annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRange {
    pub id: AnnotationId,
    pub span: Span,
}

// =============================================================================
// AnnotationTable
// =============================================================================

/// Owner of all annotations and their ranges
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    next_id: u32,
    entities: HashMap<AnnotationId, Annotation>,
    /// Block key -> ranges sorted by start, non-overlapping
    ranges: HashMap<String, Vec<AnnotatedRange>>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live annotations
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.entities.get(&id)
    }

    pub fn mode(&self, id: AnnotationId) -> MentionResult<AnnotationMode> {
        self.entities
            .get(&id)
            .map(|a| a.mode)
            .ok_or(MentionError::UnknownAnnotation(id))
    }

    /// Annotation carried by the character at `offset`
    pub fn annotation_at(&self, block: &str, offset: usize) -> Option<AnnotationId> {
        self.ranges(block)
            .iter()
            .find(|r| r.span.contains(offset))
            .map(|r| r.id)
    }

    /// Annotation carried by the character just before `offset`
    pub fn annotation_before(&self, block: &str, offset: usize) -> Option<AnnotationId> {
        offset
            .checked_sub(1)
            .and_then(|prev| self.annotation_at(block, prev))
    }

    /// True if the character at `offset` belongs to a submitted annotation
    pub fn is_submitted_at(&self, block: &str, offset: usize) -> bool {
        self.annotation_at(block, offset)
            .and_then(|id| self.get(id))
            .map(|a| a.mode == AnnotationMode::Submitted)
            .unwrap_or(false)
    }

    pub fn ranges(&self, block: &str) -> &[AnnotatedRange] {
        self.ranges.get(block).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Spans of a block carried by annotations in the given mode
    pub fn ranges_with_mode(&self, block: &str, mode: AnnotationMode) -> Vec<Span> {
        self.ranges(block)
            .iter()
            .filter(|r| self.get(r.id).map(|a| a.mode) == Some(mode))
            .map(|r| r.span)
            .collect()
    }

    /// Spans carried by one annotation in a block
    pub fn spans_of(&self, block: &str, id: AnnotationId) -> Vec<Span> {
        self.ranges(block)
            .iter()
            .filter(|r| r.id == id)
            .map(|r| r.span)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Reuse the filling annotation right before the caret or start a new one.
    ///
    /// A new annotation carries no characters until [`apply_range`](Self::apply_range)
    /// widens it. Fails with `FrozenAnnotation` when the previous character is submitted.
    pub fn ensure_filling_range(&mut self, block: &str, offset: usize) -> MentionResult<AnnotationId> {
        if let Some(id) = self.annotation_before(block, offset) {
            return match self.mode(id)? {
                AnnotationMode::Submitted => Err(MentionError::FrozenAnnotation(id)),
                AnnotationMode::Filling => Ok(id),
            };
        }
        Ok(self.create(AnnotationMode::Filling))
    }

    /// Start a new filling annotation that carries no characters yet
    pub fn create_filling(&mut self) -> AnnotationId {
        self.create(AnnotationMode::Filling)
    }

    /// Make `id` cover exactly `span` in `block`.
    ///
    /// Idempotent. Characters taken from other filling annotations are removed
    /// from them; touching a submitted annotation fails with `FrozenAnnotation`.
    pub fn apply_range(&mut self, block: &str, id: AnnotationId, span: Span) -> MentionResult<()> {
        let mode = self.mode(id)?;
        if self.spans_of(block, id) == [span] {
            return Ok(());
        }
        if mode == AnnotationMode::Submitted {
            return Err(MentionError::FrozenAnnotation(id));
        }
        self.check_unfrozen(block, span, id)?;
        self.assign(block, id, span);
        Ok(())
    }

    /// Replace a filling annotation with a new submitted one covering `span`.
    ///
    /// The old annotation is discarded; the returned id is the submitted one.
    pub fn promote(&mut self, id: AnnotationId, block: &str, span: Span) -> MentionResult<AnnotationId> {
        if self.mode(id)? == AnnotationMode::Submitted {
            return Err(MentionError::FrozenAnnotation(id));
        }
        self.check_unfrozen(block, span, id)?;

        self.discard(id);
        let submitted = self.create(AnnotationMode::Submitted);
        self.assign(block, submitted, span);
        Ok(submitted)
    }

    /// Keep ranges aligned with a text edit in `block`.
    ///
    /// Ranges after the edit shift, filling ranges that overlap it are clipped
    /// (or grow when text is inserted inside them), submitted ranges whose
    /// characters are touched are dropped.
    pub fn apply_edit(&mut self, block: &str, edit: &TextEdit) {
        let Some(list) = self.ranges.get_mut(block) else {
            return;
        };
        let entities = &self.entities;
        let shift = edit.shift();
        let old_end = edit.old_end();

        let updated: Vec<AnnotatedRange> = list
            .iter()
            .filter_map(|r| {
                let span = r.span;
                if span.end <= edit.start {
                    return Some(*r);
                }
                if span.start >= old_end {
                    let moved = Span::new(
                        (span.start as isize + shift) as usize,
                        (span.end as isize + shift) as usize,
                    );
                    return Some(AnnotatedRange { id: r.id, span: moved });
                }

                let submitted = entities
                    .get(&r.id)
                    .map(|a| a.mode == AnnotationMode::Submitted)
                    .unwrap_or(false);
                if submitted {
                    return None;
                }

                let keeps_left = span.start < edit.start;
                let keeps_right = span.end > old_end;
                let clipped = match (keeps_left, keeps_right) {
                    (true, true) => Span::new(span.start, (span.end as isize + shift) as usize),
                    (true, false) => Span::new(span.start, edit.start),
                    (false, true) => Span::new(edit.new_end(), (span.end as isize + shift) as usize),
                    (false, false) => return None,
                };
                Some(AnnotatedRange { id: r.id, span: clipped })
            })
            .collect();

        *list = normalize(updated);
    }

    /// Drop annotations that no longer carry any character. Returns how many were removed.
    pub fn collect_garbage(&mut self) -> usize {
        let live: HashSet<AnnotationId> = self
            .ranges
            .values()
            .flat_map(|list| list.iter().map(|r| r.id))
            .collect();
        let before = self.entities.len();
        self.entities.retain(|id, _| live.contains(id));
        self.ranges.retain(|_, list| !list.is_empty());
        before - self.entities.len()
    }

    /// Forget every range in a block (the host destroyed it)
    pub fn remove_block(&mut self, block: &str) {
        self.ranges.remove(block);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn create(&mut self, mode: AnnotationMode) -> AnnotationId {
        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        self.entities.insert(
            id,
            Annotation {
                id,
                kind: AnnotationKind::Mention,
                mode,
            },
        );
        id
    }

    fn discard(&mut self, id: AnnotationId) {
        self.entities.remove(&id);
        for list in self.ranges.values_mut() {
            list.retain(|r| r.id != id);
        }
    }

    fn check_unfrozen(&self, block: &str, span: Span, except: AnnotationId) -> MentionResult<()> {
        let frozen = self.ranges(block).iter().find(|r| {
            r.id != except
                && r.span.overlaps(&span)
                && self.get(r.id).map(|a| a.mode) == Some(AnnotationMode::Submitted)
        });
        match frozen {
            Some(r) => Err(MentionError::FrozenAnnotation(r.id)),
            None => Ok(()),
        }
    }

    fn assign(&mut self, block: &str, id: AnnotationId, span: Span) {
        let list = self.ranges.entry(block.to_string()).or_default();
        let mut updated = Vec::with_capacity(list.len() + 2);

        for r in list.iter().filter(|r| r.id != id) {
            if !r.span.overlaps(&span) {
                updated.push(*r);
                continue;
            }
            if r.span.start < span.start {
                updated.push(AnnotatedRange { id: r.id, span: Span::new(r.span.start, span.start) });
            }
            if r.span.end > span.end {
                updated.push(AnnotatedRange { id: r.id, span: Span::new(span.end, r.span.end) });
            }
        }
        if !span.is_empty() {
            updated.push(AnnotatedRange { id, span });
        }

        *list = normalize(updated);
    }
}

/// Sort by start and merge touching runs of the same annotation
fn normalize(mut ranges: Vec<AnnotatedRange>) -> Vec<AnnotatedRange> {
    ranges.retain(|r| !r.span.is_empty());
    ranges.sort_by_key(|r| (r.span.start, r.span.end));

    let mut merged: Vec<AnnotatedRange> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if last.id == r.id && last.span.end == r.span.start => {
                last.span.end = r.span.end;
            }
            _ => merged.push(r),
        }
    }
    merged
}

// =============================================================================
// Tests
// =============================================================================
