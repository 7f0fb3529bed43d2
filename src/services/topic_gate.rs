// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keyword topic gate.
//!
//! Decides whether a question is in the fitness domain before anything is
//! sent to the completion oracle. Matching is a plain case-insensitive
//! substring test, so incidental matches ("asset" contains "set") are
//! accepted.

use crate::policy::FITNESS_KEYWORDS;

/// Allow-list based admission filter.
#[derive(Debug, Clone)]
pub struct TopicGate {
    keywords: Vec<String>,
}

impl Default for TopicGate {
    fn default() -> Self {
        Self::new(FITNESS_KEYWORDS.iter().copied())
    }
}

impl TopicGate {
    /// Build a gate from a keyword list. Keywords are lowercased; blanks dropped.
    pub fn new<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Self {
        let keywords = keywords
            .into_iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();
        Self { keywords }
    }

    /// Whether `text` mentions at least one allowed topic.
    pub fn is_in_domain(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let lowered = text.to_lowercase();
        self.keywords.iter().any(|kw| lowered.contains(kw.as_str()))
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}
