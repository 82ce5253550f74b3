//! Serializable result records.
//!
//! Ranked tables are written as arrays of `{token, count}` in ranking order,
//! so the output order never depends on how a JSON map orders its keys.

use std::fs;
use std::hash::Hash;
use std::path::Path;

use anyhow::{Context, Result};
use glyph_morph::{
    DEFAULT_AFFIX_LENGTHS, DEFAULT_FAMILY_SUFFIXES, PatternMatch, affix_counts, affix_pattern_scan,
    positional_letters, root_families,
};
use glyph_types::{Document, FrequencyTable};
use ivtff_reader::ParseStats;
use serde::{Deserialize, Serialize};

use crate::config::{Limits, ReportOptions};
use crate::error::MetricError;
use crate::frequency::{CorpusStatistics, ZipfPoint, zipf_fit};
use crate::structure::{class_overlaps, conditional_vocabulary, jaccard_series, positional_entropy};
use crate::summary::SeriesSummary;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry<T> {
    pub token: T,
    pub count: u64,
}

/// The first `n` ranked entries of a table.
pub fn ranked_entries<T>(table: &FrequencyTable<T>, n: usize) -> Vec<RankedEntry<T>>
where
    T: Eq + Hash + Ord + Clone,
{
    table
        .most_common(n)
        .into_iter()
        .map(|(token, count)| RankedEntry {
            token: token.clone(),
            count,
        })
        .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct ParseSummary {
    pub lines_read: usize,
    pub lines_emitted: usize,
    pub page_markers: usize,
    pub skipped: usize,
    pub pages: usize,
}

impl ParseSummary {
    pub fn new(stats: ParseStats, doc: &Document) -> Self {
        Self {
            lines_read: stats.lines_read,
            lines_emitted: stats.lines_emitted,
            page_markers: stats.page_markers,
            skipped: stats.skipped,
            pages: doc.pages().len(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CorpusSummary {
    pub total_lines: usize,
    pub total_words: u64,
    pub unique_words: usize,
    pub total_letters: u64,
    pub unique_letters: usize,
    pub average_word_length: f64,
    pub letter_entropy: f64,
    pub word_entropy: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LengthBucket {
    pub length: usize,
    pub count: u64,
}

/// Descriptive statistics section of a report.
#[derive(Clone, Debug, Serialize)]
pub struct StatisticsReport {
    pub summary: CorpusSummary,
    pub letter_frequency: Vec<RankedEntry<char>>,
    pub word_frequency: Vec<RankedEntry<String>>,
    pub bigrams: Vec<RankedEntry<String>>,
    pub trigrams: Vec<RankedEntry<String>>,
    /// Ascending by length.
    pub word_length_distribution: Vec<LengthBucket>,
    pub zipf: Vec<ZipfPoint>,
}

impl StatisticsReport {
    pub fn build(doc: &Document, stats: &CorpusStatistics, limits: &Limits) -> Self {
        let mut lengths: Vec<LengthBucket> = stats
            .word_lengths
            .iter()
            .map(|(length, count)| LengthBucket {
                length: *length,
                count: *count,
            })
            .collect();
        lengths.sort_by_key(|b| b.length);

        let mut zipf = zipf_fit(&stats.words, limits.zipf_depth);
        zipf.truncate(limits.zipf_reported);

        Self {
            summary: CorpusSummary {
                total_lines: doc.len(),
                total_words: stats.total_words,
                unique_words: stats.words.len(),
                total_letters: stats.total_letters,
                unique_letters: stats.letters.len(),
                average_word_length: stats.average_word_length,
                letter_entropy: stats.letter_entropy,
                word_entropy: stats.word_entropy,
            },
            letter_frequency: ranked_entries(&stats.letters, limits.letters),
            word_frequency: ranked_entries(&stats.words, limits.words),
            bigrams: ranked_entries(&stats.bigrams, limits.ngrams),
            trigrams: ranked_entries(&stats.trigrams, limits.ngrams),
            word_length_distribution: lengths,
            zipf,
        }
    }
}

/// A series summary, or the reason it could not be computed.
///
/// Serialized inline: either the summary fields or a single `error` string.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryOutcome {
    Defined(SeriesSummary),
    Undefined { error: String },
}

impl SummaryOutcome {
    pub fn summary(&self) -> Option<&SeriesSummary> {
        match self {
            SummaryOutcome::Defined(summary) => Some(summary),
            SummaryOutcome::Undefined { .. } => None,
        }
    }
}

impl From<Result<SeriesSummary, MetricError>> for SummaryOutcome {
    fn from(result: Result<SeriesSummary, MetricError>) -> Self {
        match result {
            Ok(summary) => SummaryOutcome::Defined(summary),
            Err(err) => SummaryOutcome::Undefined {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct JaccardReport {
    pub pairs: usize,
    #[serde(flatten)]
    pub summary: SummaryOutcome,
    pub scores: Vec<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassVocabulary {
    pub class: String,
    pub total_roots: u64,
    pub distinct_roots: usize,
    pub top_roots: Vec<RankedEntry<String>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClassOverlapReport {
    pub a: String,
    pub b: String,
    /// Absent when neither class has any roots.
    pub overlap: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PositionalReport {
    pub first_word_entropy: f64,
    pub last_word_entropy: f64,
    pub asymmetry: f64,
    pub first_words: Vec<RankedEntry<String>>,
    pub last_words: Vec<RankedEntry<String>>,
}

/// Structural correlation section of a report.
#[derive(Clone, Debug, Serialize)]
pub struct StructureReport {
    pub jaccard: JaccardReport,
    pub selectors: String,
    pub conditional_vocabulary: Vec<ClassVocabulary>,
    pub class_overlap: Vec<ClassOverlapReport>,
    pub positional: PositionalReport,
}

impl StructureReport {
    /// Fails only for an empty corpus. A corpus without adjacent line pairs
    /// still builds; its Jaccard summary records why it is undefined.
    pub fn build(doc: &Document, options: &ReportOptions) -> Result<Self, MetricError> {
        if doc.is_empty() {
            return Err(MetricError::EmptyCorpus);
        }
        let scores = jaccard_series(doc);
        let summary = SummaryOutcome::from(SeriesSummary::of(&scores));

        let classifier = &options.classifier;
        let vocab = conditional_vocabulary(doc, |w| classifier.classify(w));
        let conditional_vocabulary = vocab
            .iter()
            .map(|(class, table)| ClassVocabulary {
                class: class.to_string(),
                total_roots: table.total(),
                distinct_roots: table.len(),
                top_roots: ranked_entries(table, options.limits.roots),
            })
            .collect();
        let class_overlap = class_overlaps(&vocab)
            .into_iter()
            .map(|o| ClassOverlapReport {
                a: o.a.to_string(),
                b: o.b.to_string(),
                overlap: o.overlap,
            })
            .collect();

        let pos = positional_entropy(doc, options.limits.positional_words)?;
        let to_entries = |top: &[(String, u64)]| -> Vec<RankedEntry<String>> {
            top.iter()
                .map(|(token, count)| RankedEntry {
                    token: token.clone(),
                    count: *count,
                })
                .collect()
        };

        Ok(Self {
            jaccard: JaccardReport {
                pairs: scores.len(),
                summary,
                scores,
            },
            selectors: classifier.selectors().iter().collect(),
            conditional_vocabulary,
            class_overlap,
            positional: PositionalReport {
                first_word_entropy: pos.first_entropy,
                last_word_entropy: pos.last_entropy,
                asymmetry: pos.asymmetry(),
                first_words: to_entries(&pos.first_top[..]),
                last_words: to_entries(&pos.last_top[..]),
            },
        })
    }
}

/// Morphology section of a report.
#[derive(Clone, Debug, Serialize)]
pub struct MorphologyReport {
    pub top_prefixes: Vec<RankedEntry<String>>,
    pub top_suffixes: Vec<RankedEntry<String>>,
    pub root_families_count: usize,
    pub patterns: Vec<PatternMatch>,
    pub first_letters: Vec<RankedEntry<char>>,
    pub second_letters: Vec<RankedEntry<char>>,
    pub last_letters: Vec<RankedEntry<char>>,
}

impl MorphologyReport {
    pub fn build(word_freq: &FrequencyTable<String>, options: &ReportOptions) -> Self {
        let limits = &options.limits;
        let affixes = affix_counts(word_freq, &DEFAULT_AFFIX_LENGTHS, &DEFAULT_AFFIX_LENGTHS);
        let letters = positional_letters(word_freq);
        Self {
            top_prefixes: ranked_entries(&affixes.prefixes, limits.affixes),
            top_suffixes: ranked_entries(&affixes.suffixes, limits.affixes),
            root_families_count: root_families(word_freq, &DEFAULT_FAMILY_SUFFIXES).len(),
            patterns: affix_pattern_scan(word_freq, options.rules.rules()),
            first_letters: ranked_entries(&letters.first, limits.positional_letters),
            second_letters: ranked_entries(&letters.second, limits.positional_letters),
            last_letters: ranked_entries(&letters.last, limits.positional_letters),
        }
    }
}

/// Full result record written by `glyphstat analyze`.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub parse: ParseSummary,
    pub statistics: StatisticsReport,
    pub structure: StructureReport,
    pub morphology: MorphologyReport,
}

impl AnalysisReport {
    pub fn build(
        source: impl Into<String>,
        parse: ParseSummary,
        doc: &Document,
        options: &ReportOptions,
    ) -> Result<Self, MetricError> {
        let stats = CorpusStatistics::compute(doc)?;
        let statistics = StatisticsReport::build(doc, &stats, &options.limits);
        let structure = StructureReport::build(doc, options)?;
        let morphology = MorphologyReport::build(&stats.words, options);
        Ok(Self {
            source: source.into(),
            parse,
            statistics,
            structure,
            morphology,
        })
    }
}

/// The slice of a previously written report that morphology can start from.
#[derive(Debug, Deserialize)]
struct PriorReport {
    statistics: PriorStatistics,
}

#[derive(Debug, Deserialize)]
struct PriorStatistics {
    word_frequency: Vec<RankedEntry<String>>,
}

/// Read the word frequency table back out of an `analyze` result file.
///
/// Only the entries that were written are available, so the table is
/// truncated to the report's word limit.
pub fn load_prior_word_frequency(path: impl AsRef<Path>) -> Result<FrequencyTable<String>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("open prior results {}", path.display()))?;
    let prior: PriorReport = serde_json::from_str(&raw)
        .with_context(|| format!("parse prior results {}", path.display()))?;
    Ok(FrequencyTable::from_counts(
        prior
            .statistics
            .word_frequency
            .into_iter()
            .map(|e| (e.token, e.count)),
    ))
}
