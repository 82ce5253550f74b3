//! Line-structure metrics: adjacent-line overlap, vocabulary conditioned on
//! a line's leading character, and first/last word entropy.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use glyph_types::{Document, FrequencyTable};

use crate::error::MetricError;
use crate::frequency::entropy;

/// Default selector ("gallow") characters.
pub const DEFAULT_SELECTORS: [char; 4] = ['p', 'f', 't', 'k'];
/// Chars kept from a word after dropping its first char.
pub const ROOT_LEN: usize = 3;

/// `|A ∩ B| / |A ∪ B|` over the distinct words of two lines.
///
/// `None` when both are empty.
pub fn jaccard<S: AsRef<str>>(a: &[S], b: &[S]) -> Option<f64> {
    let set_a: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let set_b: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        return None;
    }
    let intersection = set_a.intersection(&set_b).count();
    Some(intersection as f64 / union as f64)
}

/// Jaccard index of every adjacent line pair, in document order.
pub fn jaccard_series(doc: &Document) -> Vec<f64> {
    doc.lines()
        .windows(2)
        .filter_map(|pair| jaccard(pair[0].words(), pair[1].words()))
        .collect()
}

/// Bucket a line falls into, by its first word's leading character.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum LineClass {
    Selector(char),
    Other,
}

impl fmt::Display for LineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineClass::Selector(c) => write!(f, "{c}"),
            LineClass::Other => f.write_str("other"),
        }
    }
}

/// Maps a lowercased leading character to its own class when it is a selector.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeadingCharClassifier {
    selectors: Vec<char>,
}

impl Default for LeadingCharClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTORS)
    }
}

impl LeadingCharClassifier {
    pub fn new(selectors: impl IntoIterator<Item = char>) -> Self {
        let mut selectors: Vec<char> = selectors.into_iter().map(lowercase).collect();
        selectors.sort_unstable();
        selectors.dedup();
        Self { selectors }
    }

    pub fn selectors(&self) -> &[char] {
        &self.selectors
    }

    pub fn classify(&self, word: &str) -> LineClass {
        match word.chars().next().map(lowercase) {
            Some(c) if self.selectors.contains(&c) => LineClass::Selector(c),
            _ => LineClass::Other,
        }
    }
}

fn lowercase(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Drop the first char and keep up to [`ROOT_LEN`] of the rest.
///
/// `None` for single-char words, which have no root.
pub fn root_of(word: &str) -> Option<String> {
    let root: String = word.chars().skip(1).take(ROOT_LEN).collect();
    (!root.is_empty()).then_some(root)
}

/// Root vocabulary of each line class.
///
/// Every word of a line, the first included, adds its root to the class of
/// that line. Classes with no roots are absent.
pub fn conditional_vocabulary<F>(
    doc: &Document,
    classify: F,
) -> BTreeMap<LineClass, FrequencyTable<String>>
where
    F: Fn(&str) -> LineClass,
{
    let mut vocab: BTreeMap<LineClass, FrequencyTable<String>> = BTreeMap::new();
    for line in doc.lines() {
        let class = classify(line.first_word());
        for root in line.words().iter().filter_map(|w| root_of(w)) {
            vocab.entry(class).or_default().increment(root);
        }
    }
    vocab
}

/// `|A ∩ B| / |A ∪ B|` over the keys of two tables; `None` when both are empty.
pub fn vocabulary_overlap<T: Eq + Hash>(a: &FrequencyTable<T>, b: &FrequencyTable<T>) -> Option<f64> {
    let keys_a: HashSet<&T> = a.keys().collect();
    let keys_b: HashSet<&T> = b.keys().collect();
    let union = keys_a.union(&keys_b).count();
    if union == 0 {
        return None;
    }
    Some(keys_a.intersection(&keys_b).count() as f64 / union as f64)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassOverlap {
    pub a: LineClass,
    pub b: LineClass,
    pub overlap: Option<f64>,
}

/// Overlap of every unordered pair of classes, in class order.
pub fn class_overlaps(vocab: &BTreeMap<LineClass, FrequencyTable<String>>) -> Vec<ClassOverlap> {
    let entries: Vec<(&LineClass, &FrequencyTable<String>)> = vocab.iter().collect();
    let mut out = Vec::new();
    for (i, (a, table_a)) in entries.iter().enumerate() {
        for (b, table_b) in &entries[i + 1..] {
            out.push(ClassOverlap {
                a: **a,
                b: **b,
                overlap: vocabulary_overlap(table_a, table_b),
            });
        }
    }
    out
}

/// Entropy of line-initial versus line-final words.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionalEntropy {
    pub first_entropy: f64,
    pub last_entropy: f64,
    pub first_top: Vec<(String, u64)>,
    pub last_top: Vec<(String, u64)>,
}

impl PositionalEntropy {
    /// Bits by which last words are less varied than first words.
    pub fn asymmetry(&self) -> f64 {
        self.first_entropy - self.last_entropy
    }
}

pub fn positional_entropy(doc: &Document, top_n: usize) -> Result<PositionalEntropy, MetricError> {
    if doc.is_empty() {
        return Err(MetricError::EmptyCorpus);
    }
    let first: FrequencyTable<&str> = doc.lines().iter().map(|l| l.first_word()).collect();
    let last: FrequencyTable<&str> = doc.lines().iter().map(|l| l.last_word()).collect();
    let total = doc.len() as u64;

    let top = |table: &FrequencyTable<&str>| -> Vec<(String, u64)> {
        table
            .most_common(top_n)
            .into_iter()
            .map(|(w, c)| (w.to_string(), c))
            .collect()
    };

    Ok(PositionalEntropy {
        first_entropy: entropy(&first, total),
        last_entropy: entropy(&last, total),
        first_top: top(&first),
        last_top: top(&last),
    })
}
