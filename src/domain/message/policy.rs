//! Content policy: forbidden-term check and metadata enrichment.
//!
//! Pure functions with no I/O. Rejection is definitional, so nothing here
//! is ever retried.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::domain::foundation::Timestamp;

use super::errors::MessageError;
use super::message::MessageMetadata;

/// Terms rejected by the default policy, matched case-insensitively
/// against whole whitespace-delimited tokens.
pub const DEFAULT_FORBIDDEN_TERMS: &[&str] = &["idiot", "stupid", "moron", "scam", "spam"];

static DEFAULT_POLICY: Lazy<ContentPolicy> = Lazy::new(ContentPolicy::default);

/// Static set of forbidden terms plus the enrichment step.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    forbidden: HashSet<String>,
}

impl ContentPolicy {
    /// Builds a policy from an explicit term list. Terms are lower-cased;
    /// blank entries are ignored.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let forbidden = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { forbidden }
    }

    /// Returns a copy of this policy with more forbidden terms.
    pub fn with_additional_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.forbidden.extend(
            terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    /// True if any whitespace token of `content`, lower-cased, is a forbidden term.
    pub fn contains_prohibited_terms(&self, content: &str) -> bool {
        content
            .split_whitespace()
            .any(|token| self.forbidden.contains(&token.to_lowercase()))
    }

    /// Rejects prohibited content, otherwise computes metadata stamped now (UTC).
    pub fn validate_and_enrich(&self, content: &str) -> Result<MessageMetadata, MessageError> {
        self.validate_and_enrich_at(content, Timestamp::now())
    }

    /// Same as [`validate_and_enrich`](Self::validate_and_enrich) with an explicit processing instant.
    pub fn validate_and_enrich_at(
        &self,
        content: &str,
        processed_at: Timestamp,
    ) -> Result<MessageMetadata, MessageError> {
        if self.contains_prohibited_terms(content) {
            return Err(MessageError::ProhibitedContent);
        }

        Ok(MessageMetadata {
            word_count: word_count(content),
            character_count: character_count(content),
            processed_at,
        })
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FORBIDDEN_TERMS)
    }
}

/// Validates `content` against the default policy and enriches it.
pub fn validate_and_enrich(content: &str) -> Result<MessageMetadata, MessageError> {
    DEFAULT_POLICY.validate_and_enrich(content)
}

/// Number of whitespace-delimited tokens.
pub fn word_count(content: &str) -> u32 {
    saturating_u32(content.split_whitespace().count())
}

/// Length of `content` in characters (Unicode scalar values), not bytes.
pub fn character_count(content: &str) -> u32 {
    saturating_u32(content.chars().count())
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
