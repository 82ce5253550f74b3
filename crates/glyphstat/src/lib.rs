pub mod config;
pub mod error;
pub mod frequency;
pub mod report;
pub mod structure;
pub mod summary;

pub use config::{Limits, ReportOptions};
pub use error::MetricError;
pub use frequency::{
    CorpusStatistics, ZipfPoint, entropy, frequency, letters, ngrams, word_lengths, zipf_fit,
};
pub use report::{
    AnalysisReport, MorphologyReport, ParseSummary, StructureReport, SummaryOutcome,
};
pub use structure::{
    LeadingCharClassifier, LineClass, PositionalEntropy, class_overlaps, conditional_vocabulary,
    jaccard_series, positional_entropy, root_of, vocabulary_overlap,
};
pub use summary::SeriesSummary;
