//! Token-weighted morphology over a word frequency table.
//!
//! Every count here is weighted by word frequency: a word seen 799 times adds
//! 799 to each affix bucket it falls into. Word iteration always follows the
//! table's ranking so example lists and families come out the same on every
//! run.
//!
//! Affix-pattern rules are data. [`AffixRuleSet::default`] carries the stock
//! rule list; [`AffixRuleSet::load`] reads a JSON list of the same shape so
//! rules can be added without touching the scanner.
//!
//! # Example
//! ```rust
//! use glyph_morph::{AffixRuleSet, affix_counts, affix_pattern_scan};
//! use glyph_types::FrequencyTable;
//!
//! let words = FrequencyTable::from_counts([("daiin".to_string(), 799), ("qokeey".to_string(), 3)]);
//! let affixes = affix_counts(&words, &[2, 3], &[2, 3]);
//! assert_eq!(affixes.prefixes.count("dai"), 799);
//!
//! let hits = affix_pattern_scan(&words, AffixRuleSet::default().rules());
//! assert_eq!(hits[0].name, "qo_prefix");
//! assert_eq!(hits[0].count, 3);
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glyph_types::FrequencyTable;
use serde::{Deserialize, Serialize};

/// Words shorter than this contribute no affixes.
pub const MIN_AFFIX_WORD_LEN: usize = 3;
/// Default affix lengths for [`affix_counts`].
pub const DEFAULT_AFFIX_LENGTHS: [usize; 2] = [2, 3];
/// Example words kept per affix-pattern rule.
pub const MAX_PATTERN_EXAMPLES: usize = 10;
/// Suffixes stripped when grouping words into root families.
pub const DEFAULT_FAMILY_SUFFIXES: [&str; 7] = ["dy", "aiin", "ey", "ol", "ar", "in", "al"];

/// Prefix and suffix tables produced by [`affix_counts`].
#[derive(Clone, Debug, Default)]
pub struct AffixCounts {
    pub prefixes: FrequencyTable<String>,
    pub suffixes: FrequencyTable<String>,
}

/// Add each word's count under its leading and trailing substrings.
///
/// Lengths are in chars and given separately for each side. A length longer
/// than the word is skipped for that word.
pub fn affix_counts(
    word_freq: &FrequencyTable<String>,
    prefix_lengths: &[usize],
    suffix_lengths: &[usize],
) -> AffixCounts {
    let mut out = AffixCounts::default();
    for (word, count) in word_freq.iter() {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() < MIN_AFFIX_WORD_LEN {
            continue;
        }
        let fits = |len: &&usize| **len > 0 && **len <= chars.len();
        for &len in prefix_lengths.iter().filter(fits) {
            out.prefixes.add(chars[..len].iter().collect(), *count);
        }
        for &len in suffix_lengths.iter().filter(fits) {
            out.suffixes.add(chars[chars.len() - len..].iter().collect(), *count);
        }
    }
    out
}

/// Which end of the word a rule inspects.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffixKind {
    Prefix,
    Suffix,
}

/// A named affix test with an optional same-side exclusion.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AffixRule {
    pub name: String,
    pub kind: AffixKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

impl AffixRule {
    pub fn prefix(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AffixKind::Prefix,
            value: value.to_string(),
            exclude: None,
        }
    }

    pub fn suffix(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: AffixKind::Suffix,
            value: value.to_string(),
            exclude: None,
        }
    }

    pub fn excluding(mut self, literal: &str) -> Self {
        self.exclude = Some(literal.to_string());
        self
    }

    /// True when the word carries the affix and not the exclusion.
    pub fn matches(&self, word: &str) -> bool {
        let has = |literal: &str| match self.kind {
            AffixKind::Prefix => word.starts_with(literal),
            AffixKind::Suffix => word.ends_with(literal),
        };
        has(self.value.as_str()) && !self.exclude.as_deref().is_some_and(has)
    }
}

/// Ordered list of affix rules.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffixRuleSet {
    rules: Vec<AffixRule>,
}

impl Default for AffixRuleSet {
    fn default() -> Self {
        Self::new(vec![
            AffixRule::prefix("qo_prefix", "qo"),
            AffixRule::prefix("ch_prefix", "ch").excluding("cho"),
            AffixRule::prefix("sh_prefix", "sh"),
            AffixRule::suffix("aiin_suffix", "aiin"),
            AffixRule::suffix("dy_suffix", "dy"),
            AffixRule::suffix("ey_suffix", "ey").excluding("eey"),
            AffixRule::suffix("ol_suffix", "ol"),
            AffixRule::suffix("ar_suffix", "ar"),
        ])
    }
}

impl AffixRuleSet {
    pub fn new(rules: Vec<AffixRule>) -> Self {
        Self { rules }
    }

    /// Load a rule list from a JSON array of `{name, kind, value, exclude?}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("open rule file {}", path.display()))?;
        let rules: Vec<AffixRule> = serde_json::from_str(&raw)
            .with_context(|| format!("parse rule file {}", path.display()))?;
        if let Some(rule) = rules.iter().find(|r| r.value.is_empty()) {
            anyhow::bail!("{}: rule {} has an empty affix", path.display(), rule.name);
        }
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[AffixRule] {
        &self.rules
    }
}

/// Weighted count and first-seen examples for one rule.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PatternMatch {
    pub name: String,
    pub count: u64,
    pub examples: Vec<String>,
}

/// Scan ranked words against each rule, in rule order.
pub fn affix_pattern_scan(
    word_freq: &FrequencyTable<String>,
    rules: &[AffixRule],
) -> Vec<PatternMatch> {
    let mut out: Vec<PatternMatch> = rules
        .iter()
        .map(|rule| PatternMatch {
            name: rule.name.clone(),
            count: 0,
            examples: Vec::new(),
        })
        .collect();

    for (word, count) in word_freq.ranked() {
        for (rule, hit) in rules.iter().zip(out.iter_mut()) {
            if rule.matches(word) {
                hit.count += count;
                if hit.examples.len() < MAX_PATTERN_EXAMPLES {
                    hit.examples.push(word.clone());
                }
            }
        }
    }
    out
}

/// Group words by the stem left after removing a known suffix.
///
/// A word joins a family only when at least two chars remain after the
/// suffix. A word can land in several families when several suffixes match.
pub fn root_families(
    word_freq: &FrequencyTable<String>,
    suffixes: &[&str],
) -> BTreeMap<String, Vec<String>> {
    let mut families: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (word, _) in word_freq.ranked() {
        for suffix in suffixes {
            if let Some(root) = word.strip_suffix(suffix)
                && root.chars().count() > 1
            {
                families
                    .entry(root.to_string())
                    .or_default()
                    .push(word.clone());
            }
        }
    }
    families
}

/// Weighted first, second and last letter tables.
#[derive(Clone, Debug, Default)]
pub struct PositionalLetters {
    pub first: FrequencyTable<char>,
    pub second: FrequencyTable<char>,
    pub last: FrequencyTable<char>,
}

/// Count letters by position; `second` and `last` need two-letter words.
pub fn positional_letters(word_freq: &FrequencyTable<String>) -> PositionalLetters {
    let mut out = PositionalLetters::default();
    for (word, count) in word_freq.iter() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        out.first.add(first, *count);
        if let Some(second) = chars.next() {
            out.second.add(second, *count);
            let last = chars.next_back().unwrap_or(second);
            out.last.add(last, *count);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, u64)]) -> FrequencyTable<String> {
        FrequencyTable::from_counts(pairs.iter().map(|(w, c)| (w.to_string(), *c)))
    }

    #[test]
    fn affixes_are_weighted_by_frequency() {
        let words = table(&[("daiin", 799)]);
        let affixes = affix_counts(&words, &DEFAULT_AFFIX_LENGTHS, &DEFAULT_AFFIX_LENGTHS);
        assert_eq!(affixes.prefixes.count("da"), 799);
        assert_eq!(affixes.prefixes.count("dai"), 799);
        assert_eq!(affixes.suffixes.count("in"), 799);
        assert_eq!(affixes.suffixes.count("iin"), 799);
        assert_eq!(affixes.prefixes.total(), 2 * 799);
    }

    #[test]
    fn short_words_have_no_affixes() {
        let words = table(&[("ol", 500), ("y", 10), ("dar", 2)]);
        let affixes = affix_counts(&words, &DEFAULT_AFFIX_LENGTHS, &DEFAULT_AFFIX_LENGTHS);
        assert!(!affixes.prefixes.contains("ol"));
        assert_eq!(affixes.prefixes.count("da"), 2);
        assert_eq!(affixes.suffixes.count("dar"), 2);
        assert_eq!(affixes.suffixes.len(), 2);
    }

    #[test]
    fn prefix_and_suffix_lengths_are_independent() {
        let words = table(&[("qokeedy", 6), ("chol", 2)]);
        let affixes = affix_counts(&words, &[1], &[2, 4]);
        assert_eq!(affixes.prefixes.count("q"), 6);
        assert_eq!(affixes.prefixes.count("c"), 2);
        assert_eq!(affixes.prefixes.len(), 2);
        assert_eq!(affixes.suffixes.count("dy"), 6);
        assert_eq!(affixes.suffixes.count("eedy"), 6);
        assert_eq!(affixes.suffixes.count("chol"), 2);
        assert!(!affixes.suffixes.contains("qo"));
    }

    #[test]
    fn exclusions_suppress_matches() {
        let rule = AffixRule::suffix("ey_suffix", "ey").excluding("eey");
        assert!(rule.matches("chey"));
        assert!(!rule.matches("qokeey"));
        let rule = AffixRule::prefix("ch_prefix", "ch").excluding("cho");
        assert!(rule.matches("chedy"));
        assert!(!rule.matches("chol"));
    }

    #[test]
    fn scan_keeps_rule_order_and_caps_examples() {
        let mut pairs: Vec<(String, u64)> = (0..15).map(|i| (format!("qo{i:02}dy"), 1)).collect();
        pairs.push(("chol".into(), 40));
        pairs.push(("chedy".into(), 30));
        let words = FrequencyTable::from_counts(pairs);

        let hits = affix_pattern_scan(&words, AffixRuleSet::default().rules());
        let names: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "qo_prefix",
                "ch_prefix",
                "sh_prefix",
                "aiin_suffix",
                "dy_suffix",
                "ey_suffix",
                "ol_suffix",
                "ar_suffix"
            ]
        );

        let qo = &hits[0];
        assert_eq!(qo.count, 15);
        assert_eq!(qo.examples.len(), MAX_PATTERN_EXAMPLES);
        assert_eq!(qo.examples[0], "qo00dy");

        let dy = &hits[4];
        assert_eq!(dy.count, 45);
        assert_eq!(dy.examples[0], "chedy");

        assert_eq!(hits[1].count, 30);
        assert_eq!(hits[6].count, 40);
    }

    #[test]
    fn families_require_a_real_stem() {
        let words = table(&[("okaiin", 5), ("okar", 3), ("ar", 9), ("dar", 1)]);
        let families = root_families(&words, &DEFAULT_FAMILY_SUFFIXES);
        assert_eq!(families.get("ok"), Some(&vec!["okaiin".to_string(), "okar".to_string()]));
        assert_eq!(families.get("okai"), Some(&vec!["okaiin".to_string()]));
        assert!(!families.contains_key("d"));
        assert!(!families.contains_key(""));
    }

    #[test]
    fn positional_letters_weight_by_count() {
        let words = table(&[("daiin", 4), ("s", 2), ("ol", 1)]);
        let letters = positional_letters(&words);
        assert_eq!(letters.first.count(&'d'), 4);
        assert_eq!(letters.first.count(&'s'), 2);
        assert_eq!(letters.second.count(&'a'), 4);
        assert_eq!(letters.second.count(&'l'), 1);
        assert_eq!(letters.last.count(&'n'), 4);
        assert_eq!(letters.last.count(&'l'), 1);
        assert_eq!(letters.last.total(), 5);
    }

    #[test]
    fn loads_rules_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"[{"name":"ok_prefix","kind":"prefix","value":"ok"},
               {"name":"y_suffix","kind":"suffix","value":"y","exclude":"dy"}]"#,
        )
        .unwrap();
        let set = AffixRuleSet::load(&path).unwrap();
        assert_eq!(set.rules().len(), 2);
        assert_eq!(set.rules()[1].exclude.as_deref(), Some("dy"));
        assert_eq!(
            set,
            AffixRuleSet::new(vec![
                AffixRule::prefix("ok_prefix", "ok"),
                AffixRule::suffix("y_suffix", "y").excluding("dy"),
            ])
        );

        std::fs::write(&path, r#"[{"name":"bad","kind":"prefix","value":""}]"#).unwrap();
        assert!(AffixRuleSet::load(&path).is_err());
        assert!(AffixRuleSet::load(dir.path().join("missing.json")).is_err());
    }
}
