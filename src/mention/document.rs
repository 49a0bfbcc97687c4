//! Document model: ordered blocks, caret, spans and text edits
//!
//! All offsets are character offsets (Unicode scalar values) into a block's text.
//! The browser host speaks UTF-16; see [`utf16_to_char_offset`] and
//! [`char_to_utf16_offset`] for the boundary conversions.

use serde::{Deserialize, Serialize};

use super::error::{MentionError, MentionResult};

// =============================================================================
// Spans & Caret
// =============================================================================

/// Half-open character interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the character at `offset` lies inside the span
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// True if the two spans share at least one character
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Caret position: a block key plus a character offset inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caret {
    pub block_key: String,
    pub offset: usize,
}

impl Caret {
    pub fn new(block_key: impl Into<String>, offset: usize) -> Self {
        Self {
            block_key: block_key.into(),
            offset,
        }
    }
}

// =============================================================================
// Text Edits
// =============================================================================

/// A single contiguous replacement inside a block
///
/// `old_len` characters starting at `start` were replaced by `new_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub start: usize,
    pub old_len: usize,
    pub new_len: usize,
}

impl TextEdit {
    pub fn old_end(&self) -> usize {
        self.start + self.old_len
    }

    pub fn new_end(&self) -> usize {
        self.start + self.new_len
    }

    /// Net shift applied to everything after the edit
    pub fn shift(&self) -> isize {
        self.new_len as isize - self.old_len as isize
    }

    /// Diff two versions of a block's text into a single edit.
    ///
    /// The common suffix is capped so the inserted text never ends before the
    /// caret; ambiguous edits (typing a character equal to its neighbour) are
    /// attributed to the caret position. Returns `None` when the texts are identical.
    pub fn between(old: &str, new: &str, caret: usize) -> Option<TextEdit> {
        let old_len = old.chars().count();
        let new_len = new.chars().count();
        let min_len = old_len.min(new_len);

        let suffix = old
            .chars()
            .rev()
            .zip(new.chars().rev())
            .take_while(|(a, b)| a == b)
            .count()
            .min(new_len.saturating_sub(caret))
            .min(min_len);

        let prefix = old
            .chars()
            .zip(new.chars())
            .take_while(|(a, b)| a == b)
            .count()
            .min(min_len - suffix);

        let edit = TextEdit {
            start: prefix,
            old_len: old_len - prefix - suffix,
            new_len: new_len - prefix - suffix,
        };

        if edit.old_len == 0 && edit.new_len == 0 {
            None
        } else {
            Some(edit)
        }
    }
}

// =============================================================================
// Blocks
// =============================================================================

/// A paragraph-like unit of text with a stable key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    key: String,
    text: String,
    char_len: usize,
}

impl Block {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            key: key.into(),
            text,
            char_len,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Text covered by a character span
    pub fn slice(&self, span: Span) -> MentionResult<&str> {
        self.check_offset(span.end)?;
        let start = char_to_byte(&self.text, span.start);
        let end = char_to_byte(&self.text, span.end);
        Ok(&self.text[start..end])
    }

    fn check_offset(&self, offset: usize) -> MentionResult<()> {
        if offset > self.char_len {
            return Err(MentionError::OffsetOutOfBounds {
                block: self.key.clone(),
                offset,
                len: self.char_len,
            });
        }
        Ok(())
    }

    fn replace(&mut self, span: Span, replacement: &str) -> MentionResult<TextEdit> {
        self.check_offset(span.end)?;
        let start = char_to_byte(&self.text, span.start);
        let end = char_to_byte(&self.text, span.end);
        self.text.replace_range(start..end, replacement);

        let new_len = replacement.chars().count();
        self.char_len = self.char_len - span.len() + new_len;
        Ok(TextEdit {
            start: span.start,
            old_len: span.len(),
            new_len,
        })
    }
}

// =============================================================================
// Document
// =============================================================================

/// Ordered sequence of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single-block document
    pub fn with_block(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::new(key, text)],
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a new block at the end of the document
    pub fn insert_block(&mut self, key: impl Into<String>, text: impl Into<String>) -> MentionResult<()> {
        let block = Block::new(key, text);
        if self.position(block.key()).is_some() {
            return Err(MentionError::DuplicateBlock(block.key.clone()));
        }
        self.blocks.push(block);
        Ok(())
    }

    pub fn remove_block(&mut self, key: &str) -> MentionResult<Block> {
        let idx = self
            .position(key)
            .ok_or_else(|| MentionError::UnknownBlock(key.to_string()))?;
        Ok(self.blocks.remove(idx))
    }

    pub fn block(&self, key: &str) -> MentionResult<&Block> {
        self.blocks
            .iter()
            .find(|b| b.key == key)
            .ok_or_else(|| MentionError::UnknownBlock(key.to_string()))
    }

    pub fn text(&self, key: &str) -> MentionResult<&str> {
        self.block(key).map(Block::text)
    }

    /// Replace a span of a block's text in one step
    pub fn replace_range(&mut self, key: &str, span: Span, text: &str) -> MentionResult<TextEdit> {
        self.block_mut(key)?.replace(span, text)
    }

    /// Overwrite a block's text with the host's latest version and report what changed
    pub fn set_block_text(&mut self, key: &str, text: &str, caret: usize) -> MentionResult<Option<TextEdit>> {
        let block = self.block_mut(key)?;
        let edit = TextEdit::between(&block.text, text, caret);
        if edit.is_some() {
            *block = Block::new(key, text);
        }
        Ok(edit)
    }

    fn block_mut(&mut self, key: &str) -> MentionResult<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|b| b.key == key)
            .ok_or_else(|| MentionError::UnknownBlock(key.to_string()))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.key == key)
    }
}

// =============================================================================
// Offset conversions
// =============================================================================

/// Byte index of the `offset`-th character (clamped to the end of the text)
pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Character offset of a byte index that sits on a char boundary
pub(crate) fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Convert a UTF-16 code unit offset (what the browser reports) to a character offset
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.chars().enumerate() {
        if units >= utf16_offset {
            return idx;
        }
        units += ch.len_utf16();
    }
    text.chars().count()
}

/// Convert a character offset to a UTF-16 code unit offset
pub fn char_to_utf16_offset(text: &str, offset: usize) -> usize {
    text.chars().take(offset).map(char::len_utf16).sum()
}

// =============================================================================
// Tests
// =============================================================================
