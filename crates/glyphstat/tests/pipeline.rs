use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use glyph_types::Document;
use glyphstat::{
    AnalysisReport, MetricError, ParseSummary, ReportOptions, StructureReport, SummaryOutcome,
};
use ivtff_reader::{Transcription, parse_transcription};
use tempfile::TempDir;

const SAMPLE: &str = "\
#=IVTFF Eva- 2.0
<f1r>      <! $I=H>
<f1r.1,@P0>  pchedy.qokeedy.daiin
<f1r.2,+P0>  daiin.chol.dy<->
<f1r.3,+P0>  tol.shey<!plant>.daiin
<f1v>
<f1v.1,@P0>  kol.chedy.daiin<$>
";

fn write_sample(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("sample.txt");
    fs::write(&path, contents).expect("write transcription");
    path
}

fn analyze(path: &Path) -> Result<AnalysisReport, MetricError> {
    let tx = Transcription::load(path).expect("load transcription");
    let parse = ParseSummary::new(tx.stats(), tx.document());
    AnalysisReport::build(path.display().to_string(), parse, tx.document(), &ReportOptions::default())
}

#[test]
fn analyzes_transcription_from_disk() {
    let dir = TempDir::new().unwrap();
    let report = analyze(&write_sample(&dir, SAMPLE)).expect("report");

    assert_eq!(report.parse.lines_emitted, 4);
    assert_eq!(report.parse.page_markers, 2);
    assert_eq!(report.parse.pages, 2);

    let summary = &report.statistics.summary;
    assert_eq!(summary.total_lines, 4);
    assert_eq!(summary.total_words, 12);
    assert_eq!(report.statistics.word_frequency[0].token, "daiin");
    assert_eq!(report.statistics.word_frequency[0].count, 4);

    let jaccard = &report.structure.jaccard;
    assert_eq!(jaccard.pairs, 3);
    assert!(jaccard.scores.iter().all(|s| (s - 0.2).abs() < 1e-12));
    let summary = jaccard.summary.summary().expect("three pairs have a summary");
    assert!((summary.mean - 0.2).abs() < 1e-12);

    let classes: Vec<&str> = report
        .structure
        .conditional_vocabulary
        .iter()
        .map(|c| c.class.as_str())
        .collect();
    assert_eq!(classes, ["k", "p", "t", "other"]);
    assert_eq!(report.structure.class_overlap.len(), 6);

    let positional = &report.structure.positional;
    assert!((positional.first_word_entropy - 2.0).abs() < 1e-12);
    assert_eq!(positional.last_words[0].token, "daiin");
    assert_eq!(positional.last_words[0].count, 3);
}

#[test]
fn report_serializes_ranked_tables_as_arrays() {
    let dir = TempDir::new().unwrap();
    let report = analyze(&write_sample(&dir, SAMPLE)).expect("report");
    let json = serde_json::to_value(&report).unwrap();

    assert!(json["statistics"]["word_frequency"].is_array());
    assert_eq!(json["statistics"]["word_frequency"][0]["token"], "daiin");
    assert_eq!(json["structure"]["selectors"], "fkpt");
    assert!(json["structure"]["jaccard"]["stdev"].is_f64());
    assert!(json["morphology"]["patterns"].is_array());
}

#[test]
fn markup_and_separators_are_resolved_before_counting() {
    let tx = parse_transcription("<f1r>\n<f1r.1,@P0> ab.cd,ef\n");
    let doc = tx.document();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.lines()[0].words(), ["ab", "cd", "ef"]);
}

#[test]
fn single_line_transcription_still_reports_statistics() {
    let dir = TempDir::new().unwrap();
    let report = analyze(&write_sample(&dir, "<f1r>\n<f1r.1> daiin.chol.dy\n")).expect("report");

    assert_eq!(report.statistics.summary.total_words, 3);
    assert_eq!(report.statistics.word_frequency.len(), 3);
    assert_eq!(report.structure.jaccard.pairs, 0);
    assert!(matches!(
        report.structure.jaccard.summary,
        SummaryOutcome::Undefined { .. }
    ));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json["structure"]["jaccard"]["error"],
        "mean of an empty series is undefined"
    );
}

#[test]
fn transcription_without_lines_fails_analysis() {
    let dir = TempDir::new().unwrap();
    let path = write_sample(&dir, "#=IVTFF Eva- 2.0\n<f1r>\n<f1r.1> <!only markup>\n");
    let err = analyze(&path).unwrap_err();
    assert_eq!(err, MetricError::EmptyCorpus);

    let err = StructureReport::build(&Document::default(), &ReportOptions::default()).unwrap_err();
    assert_eq!(err, MetricError::EmptyCorpus);
}

fn glyphstat() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_glyphstat"));
    for var in [
        "GLYPHSTAT_LOAD_MODE",
        "GLYPHSTAT_SELECTORS",
        "GLYPHSTAT_RULES",
        "GLYPHSTAT_TOP_LETTERS",
        "GLYPHSTAT_TOP_WORDS",
        "GLYPHSTAT_TOP_NGRAMS",
        "GLYPHSTAT_ZIPF_DEPTH",
        "GLYPHSTAT_ZIPF_REPORTED",
        "GLYPHSTAT_TOP_ROOTS",
        "GLYPHSTAT_TOP_AFFIXES",
        "GLYPHSTAT_TOP_POSITIONAL_WORDS",
        "GLYPHSTAT_TOP_POSITIONAL_LETTERS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn cli_morphology_reads_prior_analysis() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, SAMPLE);
    let analysis = dir.path().join("analysis.json");

    let status = glyphstat()
        .args(["analyze", "--load-mode", "owned", "--out"])
        .arg(&analysis)
        .arg(&input)
        .status()
        .expect("run analyze");
    assert!(status.success());

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&analysis).unwrap()).unwrap();
    assert_eq!(written["statistics"]["summary"]["total_words"], 12);

    let output = glyphstat()
        .args(["morphology", "--stats"])
        .arg(&analysis)
        .output()
        .expect("run morphology");
    assert!(output.status.success());
    let morphology: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(morphology["patterns"].as_array().map(Vec::len), Some(8));
    assert!(morphology["top_suffixes"].is_array());
}

#[test]
fn cli_honors_selector_override() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, SAMPLE);

    let output = glyphstat()
        .env("GLYPHSTAT_SELECTORS", "dp")
        .arg("structure")
        .arg(&input)
        .output()
        .expect("run structure");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["selectors"], "dp");
    assert_eq!(report["conditional_vocabulary"][0]["class"], "d");
}

#[test]
fn cli_fails_on_empty_corpus() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, "<f1r>\n");
    let output = glyphstat().arg("analyze").arg(&input).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_applies_every_table_limit() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, SAMPLE);

    let output = glyphstat()
        .env("GLYPHSTAT_TOP_AFFIXES", "1")
        .args([
            "analyze",
            "--top-letters",
            "2",
            "--zipf-reported",
            "1",
            "--top-roots",
            "1",
            "--top-positional-words",
            "1",
            "--top-positional-letters",
            "1",
        ])
        .arg(&input)
        .output()
        .expect("run analyze");
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let len = |value: &serde_json::Value| value.as_array().map(Vec::len);
    assert_eq!(len(&report["statistics"]["letter_frequency"]), Some(2));
    assert_eq!(len(&report["statistics"]["zipf"]), Some(1));
    assert_eq!(len(&report["structure"]["conditional_vocabulary"][0]["top_roots"]), Some(1));
    assert_eq!(len(&report["structure"]["positional"]["first_words"]), Some(1));
    assert_eq!(len(&report["morphology"]["top_prefixes"]), Some(1));
    assert_eq!(len(&report["morphology"]["first_letters"]), Some(1));
}

#[test]
fn cli_structure_tolerates_single_line() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir, "<f1r>\n<f1r.1> daiin.chol.dy\n");
    let output = glyphstat().arg("structure").arg(&input).output().unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["jaccard"]["pairs"], 0);
    assert!(report["jaccard"]["error"].is_string());
}
