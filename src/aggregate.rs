//! Result aggregation: deduplication, ordering, and run metrics.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::analyzers::analyzer_order;
use crate::findings::{Category, Finding, Priority};

/// Raw structural samples gathered during analysis, across all functions
/// and types — not just the flagged ones. Metrics average over these.
#[derive(Debug, Clone, Default)]
pub struct StructuralSamples {
    pub complexities: Vec<u32>,
    pub function_lengths: Vec<usize>,
    pub type_lengths: Vec<usize>,
}

impl StructuralSamples {
    pub fn merge(&mut self, other: StructuralSamples) {
        self.complexities.extend(other.complexities);
        self.function_lengths.extend(other.function_lengths);
        self.type_lengths.extend(other.type_lengths);
    }
}

/// Aggregate counters for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub total_files: usize,
    pub total_findings: usize,
    pub findings_by_priority: BTreeMap<Priority, usize>,
    pub findings_by_category: BTreeMap<Category, usize>,
    pub average_complexity: f64,
    pub average_function_length: f64,
    pub average_type_length: f64,
}

fn average_u32(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

fn average_usize(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

/// Deduplicate findings by id and impose the final total order.
///
/// When several findings share an id (overlapping analyzers, repeated
/// passes), the highest-priority instance wins; ties break by registry
/// order of the producing analyzer, then by longer description.
pub fn aggregate(findings: Vec<Finding>) -> Vec<Finding> {
    let mut by_id: HashMap<String, Finding> = HashMap::with_capacity(findings.len());

    for finding in findings {
        match by_id.get(&finding.id) {
            Some(existing) if !supersedes(&finding, existing) => {}
            _ => {
                by_id.insert(finding.id.clone(), finding);
            }
        }
    }

    let mut result: Vec<Finding> = by_id.into_values().collect();
    sort_findings(&mut result);
    result
}

/// True when `candidate` should replace `existing` in the dedup map.
fn supersedes(candidate: &Finding, existing: &Finding) -> bool {
    let candidate_key = (
        candidate.priority,
        analyzer_order(&candidate.analyzer_id),
        std::cmp::Reverse(candidate.description.len()),
    );
    let existing_key = (
        existing.priority,
        analyzer_order(&existing.analyzer_id),
        std::cmp::Reverse(existing.description.len()),
    );
    candidate_key < existing_key
}

/// Total order: priority, category, file path, line, then title so that
/// two findings never compare equal unless they are the same finding.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (a.priority, a.category, &a.file_path, a.line, &a.title).cmp(&(
            b.priority,
            b.category,
            &b.file_path,
            b.line,
            &b.title,
        ))
    });
}

/// Compute run metrics over the final, deduplicated finding set.
pub fn metrics(
    findings: &[Finding],
    total_files: usize,
    samples: &StructuralSamples,
) -> AnalysisMetrics {
    let mut by_priority = BTreeMap::new();
    let mut by_category = BTreeMap::new();

    for finding in findings {
        *by_priority.entry(finding.priority).or_insert(0) += 1;
        *by_category.entry(finding.category).or_insert(0) += 1;
    }

    AnalysisMetrics {
        total_files,
        total_findings: findings.len(),
        findings_by_priority: by_priority,
        findings_by_category: by_category,
        average_complexity: average_u32(&samples.complexities),
        average_function_length: average_usize(&samples.function_lengths),
        average_type_length: average_usize(&samples.type_lengths),
    }
}
