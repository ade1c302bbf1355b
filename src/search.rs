//! In-document text search
//!
//! Finds non-overlapping occurrences of a query and keeps a cyclic cursor
//! over them, one [`SearchState`] per document.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ReaderError, Result};

/// Char offsets of every non-overlapping occurrence of `query` in `text`
///
/// After a match at offset `o` the scan resumes at `o + len(query)`, so a
/// repeating pattern only reports the non-overlapping matches.
pub fn build_occurrences(text: &str, query: &str) -> Result<Vec<usize>> {
    if query.trim().is_empty() {
        return Err(ReaderError::EmptyQuery);
    }

    let mut occurrences = Vec::new();
    let mut search_pos = 0;
    // Running char count up to `counted_bytes`, to turn byte positions into char offsets
    let mut counted_bytes = 0;
    let mut counted_chars = 0;

    while let Some(pos) = text[search_pos..].find(query) {
        let absolute_pos = search_pos + pos;

        counted_chars += text[counted_bytes..absolute_pos].chars().count();
        counted_bytes = absolute_pos;
        occurrences.push(counted_chars);

        search_pos = absolute_pos + query.len();
    }

    Ok(occurrences)
}

/// A selected occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Char offset of the match
    pub offset: usize,
    /// Index of the match among all occurrences
    pub index: usize,
    /// Number of occurrences
    pub total: usize,
}

/// Occurrences of one query plus the cursor over them
#[derive(Debug, Clone)]
pub struct SearchState {
    query: String,
    occurrences: Vec<usize>,
    cursor: Option<usize>,
}

impl SearchState {
    /// Build the state for `query` and select the first occurrence
    pub fn new(text: &str, query: &str) -> Result<Self> {
        let occurrences = build_occurrences(text, query)?;
        let mut state = Self {
            query: query.to_string(),
            occurrences,
            cursor: None,
        };
        state.first();
        Ok(state)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn occurrences(&self) -> &[usize] {
        &self.occurrences
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Select the first occurrence, if any
    pub fn first(&mut self) -> Option<SearchHit> {
        self.cursor = if self.occurrences.is_empty() { None } else { Some(0) };
        self.current()
    }

    /// Move forward, wrapping from the last occurrence to the first
    pub fn next(&mut self) -> Option<SearchHit> {
        let last = self.occurrences.len().checked_sub(1)?;
        self.cursor = match self.cursor {
            Some(i) if i < last => Some(i + 1),
            _ => Some(0),
        };
        self.current()
    }

    /// Move backward, wrapping from the first occurrence to the last
    pub fn previous(&mut self) -> Option<SearchHit> {
        let last = self.occurrences.len().checked_sub(1)?;
        self.cursor = match self.cursor {
            Some(i) if i > 0 => Some(i - 1),
            _ => Some(last),
        };
        self.current()
    }

    /// Currently selected occurrence
    pub fn current(&self) -> Option<SearchHit> {
        let index = self.cursor?;
        let offset = *self.occurrences.get(index)?;
        Some(SearchHit {
            offset,
            index,
            total: self.occurrences.len(),
        })
    }
}

/// Search states keyed by document path
#[derive(Debug, Default)]
pub struct SearchIndex {
    states: HashMap<String, SearchState>,
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a new query against a document, replacing its previous state
    ///
    /// A blank query fails with [`ReaderError::EmptyQuery`] and leaves the
    /// existing state untouched.
    pub fn search(&mut self, document: &str, text: &str, query: &str) -> Result<Option<SearchHit>> {
        let state = SearchState::new(text, query)?;
        let hit = state.current();

        tracing::debug!(
            document,
            query,
            matches = state.occurrences().len(),
            "Built search occurrences"
        );

        self.states.insert(document.to_string(), state);
        Ok(hit)
    }

    /// Next occurrence for a document's active query
    pub fn next(&mut self, document: &str) -> Option<SearchHit> {
        self.states.get_mut(document)?.next()
    }

    /// Previous occurrence for a document's active query
    pub fn previous(&mut self, document: &str) -> Option<SearchHit> {
        self.states.get_mut(document)?.previous()
    }

    pub fn state(&self, document: &str) -> Option<&SearchState> {
        self.states.get(document)
    }

    /// Forget the query for a document
    pub fn clear(&mut self, document: &str) {
        self.states.remove(document);
    }
}
