//! CandidateSource - Injected completion vocabularies
//!
//! Ranking policy is deliberately simple: exact prefix, case-insensitive,
//! then ascending lexicographic order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{MentionError, MentionResult};
use super::trigger::SourceKey;

/// Read-only vocabulary per trigger kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSource {
    vocab: HashMap<SourceKey, Vec<String>>,
}

impl CandidateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the vocabulary for one key
    pub fn with<I, S>(mut self, key: SourceKey, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocab
            .insert(key, items.into_iter().map(Into::into).collect());
        self
    }

    /// Parse `{ "tags": [...], "persons": [...], "ideas": [...] }`
    pub fn from_json(json: &str) -> MentionResult<Self> {
        serde_json::from_str(json).map_err(|e| MentionError::InvalidCandidates(e.to_string()))
    }

    /// Vocabulary for a key (empty if none was provided)
    pub fn get(&self, key: SourceKey) -> &[String] {
        self.vocab.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ranked candidates for a partial string
    pub fn resolve(&self, key: SourceKey, partial: &str) -> Vec<String> {
        filter_candidates(self.get(key), partial)
    }

    /// Total number of entries across all vocabularies
    pub fn len(&self) -> usize {
        self.vocab.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keep entries whose lowercase form starts with the lowercase partial, sorted ascending
pub fn filter_candidates(source: &[String], partial: &str) -> Vec<String> {
    let needle = partial.to_lowercase();
    let mut matches: Vec<String> = source
        .iter()
        .filter(|item| item.to_lowercase().starts_with(&needle))
        .cloned()
        .collect();
    matches.sort();
    matches
}
