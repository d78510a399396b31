//! Report generation.
//!
//! Three surfaces, mirroring how results are consumed:
//! - Markdown: the durable report document, deterministic for identical
//!   input so report diffs review cleanly in version control
//! - JSON: structured output for programmatic consumers
//! - console: a short colored summary after a run
//!
//! Section headings are stable strings; downstream tooling greps them.

use colored::*;
use serde::Serialize;

use crate::aggregate::AnalysisMetrics;
use crate::baseline::Comparison;
use crate::error::{Diagnostic, DiagnosticStage};
use crate::findings::{Category, Finding, Priority};
use crate::pipeline::AnalysisRun;

/// Fixed top-level section headings, in render order.
pub const SUMMARY_HEADING: &str = "## Summary";
pub const BY_PRIORITY_HEADING: &str = "## Findings by Priority";
pub const BY_CATEGORY_HEADING: &str = "## Findings by Category";
pub const DETAILS_HEADING: &str = "## Finding Details";

/// Render the Markdown report document.
pub fn render(run: &AnalysisRun, comparison: Option<&Comparison>) -> String {
    let mut doc = String::new();
    doc.push_str("# Code Quality Report\n\n");

    render_summary(&mut doc, run, comparison);
    render_by_priority(&mut doc, run, comparison);
    render_by_category(&mut doc, run);
    render_details(&mut doc, run, comparison);

    doc
}

fn render_summary(doc: &mut String, run: &AnalysisRun, comparison: Option<&Comparison>) {
    doc.push_str(SUMMARY_HEADING);
    doc.push_str("\n\n");

    doc.push_str(&format!("- Files analyzed: {}\n", run.files_analyzed));
    if run.files_skipped > 0 {
        let discovery = count_stage(&run.diagnostics, DiagnosticStage::Discovery);
        let parse = count_stage(&run.diagnostics, DiagnosticStage::Parse);
        doc.push_str(&format!(
            "- Files skipped: {} ({} unreadable, {} unparseable)\n",
            run.files_skipped, discovery, parse
        ));
    }
    doc.push_str(&format!("- Total findings: {}\n", run.findings.len()));

    for priority in Priority::all() {
        if let Some(count) = run.metrics.findings_by_priority.get(priority) {
            doc.push_str(&format!("- {}: {}\n", priority, count));
        }
    }

    doc.push_str(&format!(
        "- Average cyclomatic complexity: {:.2}\n",
        run.metrics.average_complexity
    ));
    doc.push_str(&format!(
        "- Average function length: {:.1} lines\n",
        run.metrics.average_function_length
    ));
    doc.push_str(&format!(
        "- Average type length: {:.1} lines\n",
        run.metrics.average_type_length
    ));

    if let Some(cmp) = comparison {
        doc.push_str("\n### Baseline comparison\n\n");
        doc.push_str(&format!("- New findings: {}\n", cmp.new_ids.len()));
        doc.push_str(&format!("- Resolved findings: {}\n", cmp.resolved_ids.len()));
        doc.push_str(&format!(
            "- Total findings: {}\n",
            cmp.total_findings.display()
        ));
        doc.push_str(&format!(
            "- Average complexity: {}\n",
            cmp.average_complexity.display()
        ));
        doc.push_str(&format!(
            "- Average function length: {}\n",
            cmp.average_function_length.display()
        ));
        doc.push_str(&format!(
            "- Average type length: {}\n",
            cmp.average_type_length.display()
        ));
    }

    if !run.diagnostics.is_empty() {
        doc.push_str("\n### Diagnostics\n\n");
        for diag in &run.diagnostics {
            doc.push_str(&format!("- {}\n", diag));
        }
    }

    doc.push('\n');
}

fn count_stage(diagnostics: &[Diagnostic], stage: DiagnosticStage) -> usize {
    diagnostics.iter().filter(|d| d.stage == stage).count()
}

/// Tag appended to findings not present in the baseline.
fn new_marker(finding: &Finding, comparison: Option<&Comparison>) -> &'static str {
    match comparison {
        Some(cmp) if cmp.new_ids.contains(&finding.id) => " **[new]**",
        _ => "",
    }
}

fn render_by_priority(doc: &mut String, run: &AnalysisRun, comparison: Option<&Comparison>) {
    doc.push_str(BY_PRIORITY_HEADING);
    doc.push_str("\n\n");

    for priority in Priority::all() {
        let group: Vec<&Finding> = run
            .findings
            .iter()
            .filter(|f| f.priority == *priority)
            .collect();
        if group.is_empty() {
            continue;
        }
        doc.push_str(&format!("### {} ({})\n\n", priority, group.len()));
        for finding in group {
            doc.push_str(&format!(
                "- `{}` {}{}\n",
                finding.location(),
                finding.title,
                new_marker(finding, comparison)
            ));
        }
        doc.push('\n');
    }
}

fn render_by_category(doc: &mut String, run: &AnalysisRun) {
    doc.push_str(BY_CATEGORY_HEADING);
    doc.push_str("\n\n");

    for category in Category::all() {
        let group: Vec<&Finding> = run
            .findings
            .iter()
            .filter(|f| f.category == *category)
            .collect();
        if group.is_empty() {
            continue;
        }
        doc.push_str(&format!("### {} ({})\n\n", category, group.len()));
        for finding in group {
            doc.push_str(&format!(
                "- `{}` {} ({})\n",
                finding.location(),
                finding.title,
                finding.priority
            ));
        }
        doc.push('\n');
    }
}

fn render_details(doc: &mut String, run: &AnalysisRun, comparison: Option<&Comparison>) {
    doc.push_str(DETAILS_HEADING);
    doc.push_str("\n\n");

    for finding in &run.findings {
        doc.push_str(&format!(
            "### {}{}\n\n",
            finding.title,
            new_marker(finding, comparison)
        ));
        doc.push_str(&format!("- Location: `{}`\n", finding.location()));
        doc.push_str(&format!("- Category: {}\n", finding.category));
        doc.push_str(&format!("- Priority: {}\n", finding.priority));
        doc.push_str(&format!("- Analyzer: {}\n", finding.analyzer_id));
        doc.push_str(&format!("- Effort: {}\n", finding.effort));
        if finding.auto_fixable {
            doc.push_str("- Auto-fixable: yes\n");
        }
        doc.push('\n');
        doc.push_str(&finding.description);
        doc.push_str("\n\n");

        if let Some(snippet) = &finding.code_snippet {
            doc.push_str("```\n");
            doc.push_str(snippet);
            doc.push_str("\n```\n\n");
        }
        if let Some(recommendation) = &finding.recommendation {
            doc.push_str(&format!("Recommendation: {}\n\n", recommendation));
        }
        if let (Some(before), Some(after)) = (&finding.before_example, &finding.after_example) {
            doc.push_str("Before:\n\n```\n");
            doc.push_str(before);
            doc.push_str("\n```\n\nAfter:\n\n```\n");
            doc.push_str(after);
            doc.push_str("\n```\n\n");
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    files_analyzed: usize,
    files_skipped: usize,
    metrics: &'a AnalysisMetrics,
    findings: &'a [Finding],
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<&'a Comparison>,
}

/// Render the run as pretty-printed JSON.
pub fn render_json(run: &AnalysisRun, comparison: Option<&Comparison>) -> anyhow::Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        files_analyzed: run.files_analyzed,
        files_skipped: run.files_skipped,
        metrics: &run.metrics,
        findings: &run.findings,
        diagnostics: &run.diagnostics,
        comparison,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Print the colored console summary after a run.
pub fn print_summary(run: &AnalysisRun, comparison: Option<&Comparison>) {
    println!();
    println!(
        "  {} v{}",
        "codegauge".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  Files analyzed: {}   skipped: {}",
        run.files_analyzed, run.files_skipped
    );

    print!("  Findings: {}", run.findings.len());
    for priority in Priority::all() {
        if let Some(count) = run.metrics.findings_by_priority.get(priority) {
            let label = format!("{} {}", count, priority);
            let colored_label = match priority {
                Priority::Critical => label.red().bold(),
                Priority::High => label.red(),
                Priority::Medium => label.yellow(),
                Priority::Low => label.normal(),
            };
            print!("  {}", colored_label);
        }
    }
    println!();

    if let Some(cmp) = comparison {
        let new = format!("{} new", cmp.new_ids.len());
        let resolved = format!("{} resolved", cmp.resolved_ids.len());
        println!(
            "  Baseline: {}  {}",
            if cmp.new_ids.is_empty() {
                new.green()
            } else {
                new.red()
            },
            resolved.green()
        );
    }

    if !run.diagnostics.is_empty() {
        println!(
            "  {}",
            format!("{} diagnostic(s), see report", run.diagnostics.len()).dimmed()
        );
    }
    println!();
}
