//! TriggerRegistry - Ordered trigger patterns via Regex
//!
//! Detects in-progress trigger tokens:
//! - Hashtags: #tag
//! - Persons: @name or @first last (one internal space)
//! - Relations: <>words separated by spaces
//!
//! Specs are consulted in registry order; the first spec with an active
//! match at the caret wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::document::{byte_to_char, Span};

/// ASCII word characters, matching what browsers treat as `\w`
const WORD: &str = "[0-9A-Za-z_]";

// ==================== TYPE DEFINITIONS ====================

/// Kind of trigger token
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Hashtag,
    Person,
    Relation,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Hashtag => "hashtag",
            TriggerKind::Person => "person",
            TriggerKind::Relation => "relation",
        }
    }

    /// The literal that opens a token of this kind
    pub fn literal(&self) -> &'static str {
        match self {
            TriggerKind::Hashtag => "#",
            TriggerKind::Person => "@",
            TriggerKind::Relation => "<>",
        }
    }

    /// Vocabulary consulted for this kind
    pub fn source_key(&self) -> SourceKey {
        match self {
            TriggerKind::Hashtag => SourceKey::Tags,
            TriggerKind::Person => SourceKey::Persons,
            TriggerKind::Relation => SourceKey::Ideas,
        }
    }
}

/// Key into the candidate source
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKey {
    Tags,
    Persons,
    Ideas,
}

/// A trigger pattern paired with its literal and vocabulary
#[derive(Debug, Clone)]
pub struct TriggerSpec {
    kind: TriggerKind,
    pattern: Regex,
}

/// An active trigger token found at the caret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerMatch<'a> {
    pub spec: &'a TriggerSpec,
    /// Character span of the whole matched token, literal included
    pub span: Span,
}

// ==================== TRIGGER SPEC ====================

impl TriggerSpec {
    pub fn new(kind: TriggerKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn kind(&self) -> TriggerKind {
        self.kind
    }

    pub fn literal(&self) -> &'static str {
        self.kind.literal()
    }

    /// Literal length in characters
    pub fn literal_len(&self) -> usize {
        self.kind.literal().chars().count()
    }

    pub fn source_key(&self) -> SourceKey {
        self.kind.source_key()
    }

    /// All non-overlapping token spans in `text`, in character offsets
    pub fn find_all(&self, text: &str) -> Vec<Span> {
        self.pattern
            .find_iter(text)
            .map(|m| Span::new(byte_to_char(text, m.start()), byte_to_char(text, m.end())))
            .collect()
    }

    /// The token that is active at `offset`, if any.
    ///
    /// Active means the literal is fully typed before the caret and the caret
    /// sits no further than the slot right after the last matched character.
    pub fn active_at(&self, text: &str, offset: usize) -> Option<Span> {
        let literal_len = self.literal_len();
        self.find_all(text)
            .into_iter()
            .find(|span| span.start + literal_len <= offset && offset <= span.end)
    }
}

impl PartialEq for TriggerSpec {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.pattern.as_str() == other.pattern.as_str()
    }
}

impl Eq for TriggerSpec {}

// ==================== REGISTRY ====================

/// Ordered trigger table
#[derive(Debug, Clone)]
pub struct TriggerRegistry {
    specs: Vec<TriggerSpec>,
}

impl TriggerRegistry {
    /// Registry with the built-in hashtag, person and relation triggers, in that order
    pub fn new() -> Self {
        // #tag
        let hashtag = format!("#{w}*", w = WORD);
        // @name or @first last
        let person = format!("@{w}*[ ]?{w}*", w = WORD);
        // <>any number of space separated words
        let relation = format!("<>{w}*(?:[ ]?{w}*)*", w = WORD);

        let specs = [
            (TriggerKind::Hashtag, hashtag),
            (TriggerKind::Person, person),
            (TriggerKind::Relation, relation),
        ]
        .into_iter()
        .map(|(kind, pattern)| {
            TriggerSpec::new(kind, &pattern).expect("built-in trigger pattern must compile")
        })
        .collect();

        Self { specs }
    }

    pub fn specs(&self) -> &[TriggerSpec] {
        &self.specs
    }

    /// First spec (in registry order) with a token active at `offset`
    pub fn resolve(&self, text: &str, offset: usize) -> Option<TriggerMatch<'_>> {
        self.specs.iter().find_map(|spec| {
            spec.active_at(text, offset)
                .map(|span| TriggerMatch { spec, span })
        })
    }
}

impl Default for TriggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== TESTS ====================
