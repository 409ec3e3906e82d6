//! Sparse count tables
//!
//! All count lookups default to zero for unseen keys, so callers never have
//! to distinguish "missing" from "never observed".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Occurrence counts keyed by token, IP address, or hour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountTable {
    counts: HashMap<String, u64>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for `key`, zero when never seen
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, n: u64) {
        if let Some(count) = self.counts.get_mut(key) {
            *count += n;
        } else {
            self.counts.insert(key.to_string(), n);
        }
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Add every count from `other` into this table
    pub fn merge(&mut self, other: &CountTable) {
        for (key, n) in other.iter() {
            self.add(key, n);
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for CountTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = CountTable::new();
        for key in iter {
            table.increment(key.as_ref());
        }
        table
    }
}

/// Token multiset of a single email
///
/// Distinct tokens are enumerated in order of first occurrence, which makes
/// TF-IDF tie-breaking reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounts {
    order: Vec<String>,
    counts: HashMap<String, u64>,
    total: u64,
}

impl TokenCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str) {
        if let Some(count) = self.counts.get_mut(token) {
            *count += 1;
        } else {
            self.order.push(token.to_string());
            self.counts.insert(token.to_string(), 1);
        }
        self.total += 1;
    }

    pub fn count(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Total occurrences, repeated tokens included
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Distinct tokens in first-occurrence order
    pub fn distinct(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(token, count)` pairs in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order.iter().map(|t| (t.as_str(), self.counts[t]))
    }
}

impl<S: AsRef<str>> FromIterator<S> for TokenCounts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tokens = TokenCounts::new();
        for token in iter {
            tokens.add(token.as_ref());
        }
        tokens
    }
}
