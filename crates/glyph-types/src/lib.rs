//! Shared types for parsed manuscript transcriptions.
//!
//! A transcription parses into a [`Document`]: an ordered list of [`Line`]s,
//! each carrying the page it was found on, its locus label and its words.
//! Counting over any token stream goes through [`FrequencyTable`], whose
//! ranking is fully determined (count descending, then token ascending) so
//! that "top N" output never depends on hash iteration order.
//!
//! ```rust
//! use glyph_types::{FrequencyTable, PageId};
//!
//! let page = PageId::parse("f1r").unwrap();
//! assert_eq!(page.as_str(), "f1r");
//!
//! let table: FrequencyTable<&str> = ["b", "a", "b"].into_iter().collect();
//! assert_eq!(table.ranked(), vec![(&"b", 2), (&"a", 1)]);
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::hash::Hash;

/// Folio identifier of the form `f<digits>[r|v]<optional digit>`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PageId(String);

impl PageId {
    /// Validate a folio token such as `f1r`, `f116v` or `f67r2`.
    pub fn parse(token: &str) -> Option<Self> {
        let rest = token.strip_prefix('f')?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let mut tail = rest[digits..].chars();
        if !matches!(tail.next(), Some('r' | 'v')) {
            return None;
        }
        match (tail.next(), tail.next()) {
            (None, _) => {}
            (Some(c), None) if c.is_ascii_digit() => {}
            _ => return None,
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One retained transcription line. Always holds at least one word.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    page: Option<PageId>,
    locus: String,
    words: Vec<String>,
}

impl Line {
    /// Build a line, refusing an empty word list or empty words.
    pub fn new(page: Option<PageId>, locus: impl Into<String>, words: Vec<String>) -> Option<Self> {
        if words.is_empty() || words.iter().any(String::is_empty) {
            return None;
        }
        Some(Self {
            page,
            locus: locus.into(),
            words,
        })
    }

    /// Page marker in effect when the line was read, if any had been seen.
    pub fn page(&self) -> Option<&PageId> {
        self.page.as_ref()
    }

    pub fn locus(&self) -> &str {
        &self.locus
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn first_word(&self) -> &str {
        &self.words[0]
    }

    pub fn last_word(&self) -> &str {
        &self.words[self.words.len() - 1]
    }
}

/// Parsed transcription in source order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every word of every line, in reading order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines
            .iter()
            .flat_map(|line| line.words.iter().map(String::as_str))
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|line| line.words.len()).sum()
    }

    /// Distinct pages in order of first appearance.
    pub fn pages(&self) -> Vec<&PageId> {
        let mut out: Vec<&PageId> = Vec::new();
        for page in self.lines.iter().filter_map(Line::page) {
            if !out.contains(&page) {
                out.push(page);
            }
        }
        out
    }
}

/// Token counts with a deterministic ranking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrequencyTable<T: Eq + Hash> {
    counts: HashMap<T, u64>,
}

impl<T: Eq + Hash> Default for FrequencyTable<T> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash> FrequencyTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-aggregated `(token, count)` pairs, summing duplicates.
    pub fn from_counts(pairs: impl IntoIterator<Item = (T, u64)>) -> Self {
        let mut table = Self::new();
        for (token, count) in pairs {
            table.add(token, count);
        }
        table
    }

    pub fn add(&mut self, token: T, count: u64) {
        *self.counts.entry(token).or_insert(0) += count;
    }

    pub fn increment(&mut self, token: T) {
        self.add(token, 1);
    }

    /// Count for `token`, zero when absent.
    pub fn count<Q>(&self, token: &Q) -> u64
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn contains<Q>(&self, token: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.contains_key(token)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Unordered iteration; use [`FrequencyTable::ranked`] for anything reported.
    pub fn iter(&self) -> hash_map::Iter<'_, T, u64> {
        self.counts.iter()
    }

    pub fn keys(&self) -> hash_map::Keys<'_, T, u64> {
        self.counts.keys()
    }

    pub fn values(&self) -> hash_map::Values<'_, T, u64> {
        self.counts.values()
    }
}

impl<T: Eq + Hash + Ord> FrequencyTable<T> {
    /// Entries sorted by count descending, ties broken by ascending token.
    pub fn ranked(&self) -> Vec<(&T, u64)> {
        let mut entries: Vec<(&T, u64)> = self.counts.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The first `n` entries of [`FrequencyTable::ranked`].
    pub fn most_common(&self, n: usize) -> Vec<(&T, u64)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<T: Eq + Hash> FromIterator<T> for FrequencyTable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<T: Eq + Hash> Extend<T> for FrequencyTable<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for token in iter {
            self.increment(token);
        }
    }
}

impl<'a, T: Eq + Hash> IntoIterator for &'a FrequencyTable<T> {
    type Item = (&'a T, &'a u64);
    type IntoIter = hash_map::Iter<'a, T, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
