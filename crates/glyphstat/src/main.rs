use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glyph_morph::AffixRuleSet;
use glyph_types::FrequencyTable;
use ivtff_reader::{LoadMode, Transcription};
use serde::Serialize;
use tracing::{Subscriber, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

use glyphstat::frequency::frequency;
use glyphstat::report::{SummaryOutcome, load_prior_word_frequency};
use glyphstat::{
    AnalysisReport, LeadingCharClassifier, Limits, MorphologyReport, ParseSummary, ReportOptions,
    StructureReport,
};

#[derive(Parser)]
#[command(name = "glyphstat", version)]
#[command(about = "Statistics and structural metrics over manuscript transcriptions")]
struct Cli {
    #[command(flatten)]
    options: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Descriptive statistics, structural metrics and morphology.
    Analyze { input: PathBuf },
    /// Adjacent-line overlap, selector vocabularies and line-end entropy.
    Structure { input: PathBuf },
    /// Affix tables and pattern counts.
    Morphology {
        #[arg(required_unless_present = "stats", conflicts_with = "stats")]
        input: Option<PathBuf>,
        /// Start from the word table of a previous `analyze` result.
        #[arg(long)]
        stats: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Write JSON here instead of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
    #[arg(long, global = true, env = "GLYPHSTAT_LOAD_MODE", default_value = "mmap", value_parser = parse_load_mode)]
    load_mode: LoadMode,
    /// Leading characters that get their own vocabulary class.
    #[arg(long, global = true, env = "GLYPHSTAT_SELECTORS", default_value = "pftk")]
    selectors: String,
    /// JSON list of affix-pattern rules replacing the built-in set.
    #[arg(long, global = true, env = "GLYPHSTAT_RULES")]
    rules: Option<PathBuf>,
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_LETTERS", default_value_t = Limits::default().letters)]
    top_letters: usize,
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_WORDS", default_value_t = Limits::default().words)]
    top_words: usize,
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_NGRAMS", default_value_t = Limits::default().ngrams)]
    top_ngrams: usize,
    /// Ranks compared against the inverse-rank law.
    #[arg(long, global = true, env = "GLYPHSTAT_ZIPF_DEPTH", default_value_t = Limits::default().zipf_depth)]
    zipf_depth: usize,
    #[arg(long, global = true, env = "GLYPHSTAT_ZIPF_REPORTED", default_value_t = Limits::default().zipf_reported)]
    zipf_reported: usize,
    /// Roots listed per line class.
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_ROOTS", default_value_t = Limits::default().roots)]
    top_roots: usize,
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_AFFIXES", default_value_t = Limits::default().affixes)]
    top_affixes: usize,
    /// Line-initial and line-final words listed.
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_POSITIONAL_WORDS", default_value_t = Limits::default().positional_words)]
    top_positional_words: usize,
    #[arg(long, global = true, env = "GLYPHSTAT_TOP_POSITIONAL_LETTERS", default_value_t = Limits::default().positional_letters)]
    top_positional_letters: usize,
}

impl CommonArgs {
    fn report_options(&self) -> Result<ReportOptions> {
        let rules = match &self.rules {
            Some(path) => {
                let rules = AffixRuleSet::load(path)?;
                info!("loaded {} affix rules from {}", rules.rules().len(), path.display());
                rules
            }
            None => AffixRuleSet::default(),
        };
        Ok(ReportOptions {
            limits: Limits {
                letters: self.top_letters,
                words: self.top_words,
                ngrams: self.top_ngrams,
                zipf_depth: self.zipf_depth,
                zipf_reported: self.zipf_reported,
                roots: self.top_roots,
                affixes: self.top_affixes,
                positional_words: self.top_positional_words,
                positional_letters: self.top_positional_letters,
            },
            classifier: LeadingCharClassifier::new(self.selectors.chars()),
            rules,
        })
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let options = cli.options.report_options()?;

    match &cli.command {
        Commands::Analyze { input } => {
            let tx = load(input, cli.options.load_mode)?;
            let parse = ParseSummary::new(tx.stats(), tx.document());
            let report =
                AnalysisReport::build(input.display().to_string(), parse, tx.document(), &options)
                    .with_context(|| format!("analyzing {}", input.display()))?;
            info!(
                "{} words, {} unique, word entropy {:.3} bits",
                report.statistics.summary.total_words,
                report.statistics.summary.unique_words,
                report.statistics.summary.word_entropy
            );
            emit(&report, cli.options.out.as_deref())?;
        }
        Commands::Structure { input } => {
            let tx = load(input, cli.options.load_mode)?;
            let report = StructureReport::build(tx.document(), &options)
                .with_context(|| format!("structural metrics for {}", input.display()))?;
            match &report.jaccard.summary {
                SummaryOutcome::Defined(summary) => info!(
                    "mean jaccard {:.4} over {} pairs",
                    summary.mean, report.jaccard.pairs
                ),
                SummaryOutcome::Undefined { error } => warn!("jaccard summary: {error}"),
            }
            emit(&report, cli.options.out.as_deref())?;
        }
        Commands::Morphology { input, stats } => {
            let words: FrequencyTable<String> = match (input, stats) {
                (_, Some(prior)) => load_prior_word_frequency(prior)?,
                (Some(input), None) => {
                    let doc = load(input, cli.options.load_mode)?.into_document();
                    frequency(doc.words().map(str::to_string))
                }
                (None, None) => anyhow::bail!("morphology needs a transcription or --stats"),
            };
            info!("morphology over {} distinct words", words.len());
            emit(&MorphologyReport::build(&words, &options), cli.options.out.as_deref())?;
        }
    }

    Ok(())
}

fn load(path: &Path, mode: LoadMode) -> Result<Transcription> {
    let start = Instant::now();
    let tx = Transcription::load_with_mode(path, mode)?;
    info!(
        "transcription loaded in {} ms (mode: {:?})",
        start.elapsed().as_millis(),
        mode
    );
    Ok(tx)
}

fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            info!("results saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        other => Err(format!("unknown load mode {other:?} (expected mmap or owned)")),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    log_subscriber(env_filter).init();
}

/// Stderr logger whose levels come entirely from `filter`.
fn log_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish()
}
