use glyph_morph::AffixRuleSet;

use crate::structure::LeadingCharClassifier;

/// How many entries each ranked table keeps in a report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Limits {
    pub letters: usize,
    pub words: usize,
    pub ngrams: usize,
    /// Ranks fed into the Zipf comparison.
    pub zipf_depth: usize,
    /// Ranks of the Zipf comparison written out.
    pub zipf_reported: usize,
    pub roots: usize,
    pub affixes: usize,
    pub positional_words: usize,
    pub positional_letters: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            letters: 30,
            words: 50,
            ngrams: 30,
            zipf_depth: 50,
            zipf_reported: 20,
            roots: 10,
            affixes: 20,
            positional_words: 10,
            positional_letters: 10,
        }
    }
}

/// Everything a report build needs besides the corpus.
#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    pub limits: Limits,
    pub classifier: LeadingCharClassifier,
    pub rules: AffixRuleSet,
}
