//! Frequency tables, Shannon entropy, n-grams and Zipf fit.
//!
//! Every function here is a pure reduction. Anything that depends on the
//! order of a table goes through [`FrequencyTable::ranked`] or sorts its
//! inputs first, so floating-point sums come out bit-identical across runs.

use std::hash::Hash;

use glyph_types::{Document, FrequencyTable};
use serde::Serialize;

use crate::error::MetricError;

/// Joins words before windowing; never appears inside a parsed word.
pub const NGRAM_SENTINEL: char = '.';

/// Count occurrences of each token.
pub fn frequency<T, I>(tokens: I) -> FrequencyTable<T>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    tokens.into_iter().collect()
}

/// Shannon entropy in bits of a table whose counts sum to `total`.
///
/// Returns `0.0` for an empty table or a zero total.
pub fn entropy<T: Eq + Hash>(table: &FrequencyTable<T>, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let mut counts: Vec<u64> = table.values().copied().filter(|c| *c > 0).collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let total = total as f64;
    counts
        .into_iter()
        .map(|c| {
            let c = c as f64;
            (c / total) * (total / c).log2()
        })
        .sum()
}

/// Character n-grams that never span two words.
///
/// Words are joined with [`NGRAM_SENTINEL`] and every window containing it is
/// dropped. `n == 0` yields nothing; words shorter than `n` contribute nothing.
pub fn ngrams<'a, I>(words: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }
    let mut joined: Vec<char> = Vec::new();
    for (idx, word) in words.into_iter().enumerate() {
        if idx > 0 {
            joined.push(NGRAM_SENTINEL);
        }
        joined.extend(word.chars());
    }
    joined
        .windows(n)
        .filter(|w| !w.contains(&NGRAM_SENTINEL))
        .map(|w| w.iter().collect())
        .collect()
}

pub fn letters<'a, I>(words: I) -> FrequencyTable<char>
where
    I: IntoIterator<Item = &'a str>,
{
    words.into_iter().flat_map(str::chars).collect()
}

/// Word lengths in chars.
pub fn word_lengths<'a, I>(words: I) -> FrequencyTable<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    words.into_iter().map(|w| w.chars().count()).collect()
}

/// One rank of a Zipf comparison.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ZipfPoint {
    pub rank: usize,
    pub frequency: u64,
    /// `frequency(rank 1) / rank`.
    pub expected: f64,
    /// `frequency / expected`, or `0` when `expected` is zero.
    pub ratio: f64,
}

/// Compare the top `top_k` ranks against the inverse-rank law anchored at rank 1.
pub fn zipf_fit<T: Eq + Hash + Ord>(table: &FrequencyTable<T>, top_k: usize) -> Vec<ZipfPoint> {
    let ranked = table.ranked();
    let head = ranked.first().map(|(_, c)| *c).unwrap_or(0) as f64;
    ranked
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(idx, (_, frequency))| {
            let rank = idx + 1;
            let expected = head / rank as f64;
            let ratio = if expected > 0.0 {
                frequency as f64 / expected
            } else {
                0.0
            };
            ZipfPoint {
                rank,
                frequency,
                expected,
                ratio,
            }
        })
        .collect()
}

/// All corpus-wide views and the summary numbers derived from them.
#[derive(Clone, Debug)]
pub struct CorpusStatistics {
    pub letters: FrequencyTable<char>,
    pub words: FrequencyTable<String>,
    pub bigrams: FrequencyTable<String>,
    pub trigrams: FrequencyTable<String>,
    pub word_lengths: FrequencyTable<usize>,
    pub total_words: u64,
    pub total_letters: u64,
    pub average_word_length: f64,
    pub letter_entropy: f64,
    pub word_entropy: f64,
}

impl CorpusStatistics {
    pub fn compute(doc: &Document) -> Result<Self, MetricError> {
        if doc.is_empty() {
            return Err(MetricError::EmptyCorpus);
        }

        let letters = letters(doc.words());
        let words = frequency(doc.words().map(str::to_string));
        let bigrams = frequency(ngrams(doc.words(), 2));
        let trigrams = frequency(ngrams(doc.words(), 3));
        let word_lengths = word_lengths(doc.words());

        let total_words = doc.word_count() as u64;
        let total_letters = letters.total();
        let letter_entropy = entropy(&letters, total_letters);
        let word_entropy = entropy(&words, total_words);

        Ok(Self {
            average_word_length: total_letters as f64 / total_words as f64,
            letters,
            words,
            bigrams,
            trigrams,
            word_lengths,
            total_words,
            total_letters,
            letter_entropy,
            word_entropy,
        })
    }
}
