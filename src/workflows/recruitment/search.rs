//! Prefix search over recruitment titles for autocomplete.
//!
//! The backing store is a primitive ordered set that only understands
//! lexicographic range queries with a numeric tie-break score, not native
//! prefix queries. "Starts with" is therefore emulated with a half-open
//! range `[prefix, prefix + SENTINEL)`, where the sentinel is the maximum
//! code unit and so sorts after every valid title character. One range scan
//! costs O(log N + limit) versus the O(N) of a naive substring sweep.

use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::RwLock;

/// Sorts after every character that can appear in a title, closing the range
/// exactly at the end of the prefix bucket.
const SEARCH_SENTINEL: char = '\u{FFFF}';

/// Scores never order members here; lexicographic member order does.
const DEFAULT_SCORE: f64 = 0.0;

/// Ordered-set primitive backing the index. Mirrors the sorted-set commands
/// of the external cache store: score-tagged insertion and a bounded
/// lexicographic range scan.
pub trait TitleIndexStore: Send + Sync {
    fn add(&self, member: &str, score: f64) -> Result<(), SearchStoreError>;
    /// Members in `[start, end)` in ascending lexicographic order, at most
    /// `limit` of them.
    fn range_by_lex(
        &self,
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<String>, SearchStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SearchStoreError {
    #[error("title index unavailable: {0}")]
    Unavailable(String),
}

/// Write-through secondary index over recruitment titles.
///
/// The index is a set, not a multiset: two recruitments sharing a title
/// collapse to one entry, and disambiguation happens at the detail-fetch
/// step, never here.
pub struct TitleSearchIndex<S> {
    store: S,
}

impl<S: TitleIndexStore> TitleSearchIndex<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn add(&self, title: &str) -> Result<(), SearchStoreError> {
        self.store.add(title, DEFAULT_SCORE)
    }

    /// Titles literally starting with `prefix`, ascending, at most `limit`.
    /// An empty prefix returns the first `limit` titles overall.
    pub fn find_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>, SearchStoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut range_end = String::with_capacity(prefix.len() + SEARCH_SENTINEL.len_utf8());
        range_end.push_str(prefix);
        range_end.push(SEARCH_SENTINEL);

        // Over-fetch to absorb any boundary false positives the range
        // primitive may return, then re-check client-side.
        let candidates = self.store.range_by_lex(prefix, &range_end, limit * 2)?;

        Ok(candidates
            .into_iter()
            .filter(|title| title.starts_with(prefix))
            .take(limit)
            .collect())
    }
}

/// In-process ordered set. Reads take a shared lock, so lookups stay safe
/// concurrent with write-through updates.
#[derive(Default)]
pub struct InMemoryTitleStore {
    titles: RwLock<BTreeSet<String>>,
}

impl TitleIndexStore for InMemoryTitleStore {
    fn add(&self, member: &str, _score: f64) -> Result<(), SearchStoreError> {
        let mut titles = self
            .titles
            .write()
            .map_err(|_| SearchStoreError::Unavailable("title index lock poisoned".to_string()))?;
        titles.insert(member.to_owned());
        Ok(())
    }

    fn range_by_lex(
        &self,
        start: &str,
        end: &str,
        limit: usize,
    ) -> Result<Vec<String>, SearchStoreError> {
        let titles = self
            .titles
            .read()
            .map_err(|_| SearchStoreError::Unavailable("title index lock poisoned".to_string()))?;
        Ok(titles
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end)))
            .take(limit)
            .cloned()
            .collect())
    }
}
