//! Report output format tests: stable headings, deterministic rendering,
//! and parseable JSON.

use std::path::Path;

use tempfile::TempDir;

use codegauge::pipeline::Orchestrator;
use codegauge::{baseline, report, EngineConfig};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn fixture_run(temp: &TempDir) -> codegauge::AnalysisRun {
    write(
        temp.path(),
        "src/data/cfg.go",
        "package cfg\n\nvar endpoint = \"http://api.corp-internal.net/v1\"\n",
    );
    write(
        temp.path(),
        "src/presentation/screen.py",
        "class screen:\n    pass\n",
    );
    Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap()
}

#[test]
fn test_markdown_sections_are_stable_and_ordered() {
    let temp = TempDir::new().unwrap();
    let run = fixture_run(&temp);
    let doc = report::render(&run, None);

    let positions: Vec<usize> = [
        report::SUMMARY_HEADING,
        report::BY_PRIORITY_HEADING,
        report::BY_CATEGORY_HEADING,
        report::DETAILS_HEADING,
    ]
    .iter()
    .map(|heading| doc.find(heading).unwrap_or_else(|| panic!("missing {}", heading)))
    .collect();

    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted, "sections out of order");
}

#[test]
fn test_rendering_is_deterministic_across_runs() {
    let temp = TempDir::new().unwrap();
    let run_a = fixture_run(&temp);
    let doc_a = report::render(&run_a, None);

    let run_b = Orchestrator::new(EngineConfig::default())
        .unwrap()
        .run(temp.path())
        .unwrap();
    let doc_b = report::render(&run_b, None);

    assert_eq!(doc_a, doc_b);
}

#[test]
fn test_report_counts_match_run() {
    let temp = TempDir::new().unwrap();
    let run = fixture_run(&temp);
    let doc = report::render(&run, None);

    assert!(doc.contains(&format!("- Files analyzed: {}", run.files_analyzed)));
    assert!(doc.contains(&format!("- Total findings: {}", run.findings.len())));
}

#[test]
fn test_baseline_comparison_section_renders() {
    let temp = TempDir::new().unwrap();
    let run = fixture_run(&temp);

    let path = temp.path().join("baseline.json");
    baseline::save(&path, &run.findings, &run.metrics).unwrap();
    let stored = baseline::load(&path).unwrap().unwrap();
    let cmp = baseline::compare(&run.findings, &run.metrics, &stored);

    let doc = report::render(&run, Some(&cmp));
    assert!(doc.contains("### Baseline comparison"));
    assert!(doc.contains("New findings: 0"));
    assert!(doc.contains("Total findings: +0.0%"));
}

#[test]
fn test_json_output_parses_and_carries_findings() {
    let temp = TempDir::new().unwrap();
    let run = fixture_run(&temp);

    let json = report::render_json(&run, None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        value["findings"].as_array().unwrap().len(),
        run.findings.len()
    );
    assert_eq!(value["files_analyzed"], run.files_analyzed as u64);
    // Priorities serialize as their lowercase names
    assert!(value["findings"]
        .as_array()
        .unwrap()
        .iter()
        .all(|f| f["priority"].is_string()));
}
