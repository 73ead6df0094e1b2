//! Answer Table
//!
//! Canned answers keyed by prompt label, plus the fallback used when a
//! prompt has no entry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Answer written for a prompt with no table entry
pub const DEFAULT_FALLBACK_ANSWER: &str = "value";

/// Prompt label to answer mapping, fixed for the duration of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerTable {
    answers: HashMap<String, String>,
}

/// How an answer was chosen for a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The label had an entry in the table
    Matched,
    /// No entry; the fallback answer was used
    Fallback,
}

impl AnswerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, used while assembling a configuration
    pub fn with(mut self, label: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.insert(label.into(), answer.into());
        self
    }

    /// Exact-match lookup
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.answers.get(label).map(String::as_str)
    }

    /// Answer for `label`, or `fallback` when unknown
    pub fn resolve<'a>(&'a self, label: &str, fallback: &'a str) -> (&'a str, Resolution) {
        match self.lookup(label) {
            Some(answer) => (answer, Resolution::Matched),
            None => (fallback, Resolution::Fallback),
        }
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.answers.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            answers: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
