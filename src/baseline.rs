//! Baseline persistence and cross-run comparison.
//!
//! A baseline is a named snapshot of a prior run: timestamp, metrics,
//! and the set of finding ids present at snapshot time. Finding bodies
//! ride along so known issues can be displayed, but ids are the
//! comparison key. Baselines are replaced wholesale, never patched.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::AnalysisMetrics;
use crate::findings::Finding;

/// A persisted snapshot of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub timestamp: DateTime<Utc>,
    pub metrics: AnalysisMetrics,
    #[serde(rename = "findingIds")]
    pub finding_ids: BTreeSet<String>,
    /// Full bodies of the snapshot findings, for "known issue" display.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
}

impl Baseline {
    /// Snapshot the current run.
    pub fn from_run(findings: &[Finding], metrics: &AnalysisMetrics) -> Self {
        Self {
            timestamp: Utc::now(),
            metrics: metrics.clone(),
            finding_ids: findings.iter().map(|f| f.id.clone()).collect(),
            findings: findings.to_vec(),
        }
    }

    pub fn contains(&self, finding_id: &str) -> bool {
        self.finding_ids.contains(finding_id)
    }
}

/// Load a baseline. A missing file is the normal first-run case, not an
/// error; a file that exists but does not parse is reported.
pub fn load(path: &Path) -> anyhow::Result<Option<Baseline>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("reading baseline {}", path.display()))
        }
    };
    let baseline = serde_json::from_str(&text)
        .with_context(|| format!("parsing baseline {}", path.display()))?;
    Ok(Some(baseline))
}

/// Write a new baseline, replacing any previous snapshot.
pub fn save(path: &Path, findings: &[Finding], metrics: &AnalysisMetrics) -> anyhow::Result<Baseline> {
    let baseline = Baseline::from_run(findings, metrics);
    let json = serde_json::to_string_pretty(&baseline)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing baseline {}", path.display()))?;
    Ok(baseline)
}

/// Relative change of one numeric metric against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub current: f64,
    pub baseline: f64,
    /// `(current - baseline) / baseline`; `None` when the baseline value
    /// is zero and the ratio is undefined.
    pub ratio: Option<f64>,
}

impl MetricDelta {
    fn compute(current: f64, baseline: f64) -> Self {
        let ratio = if baseline == 0.0 {
            None
        } else {
            Some((current - baseline) / baseline)
        };
        Self {
            current,
            baseline,
            ratio,
        }
    }

    /// Render as a signed percentage, or "n/a" for an undefined ratio.
    pub fn display(&self) -> String {
        match self.ratio {
            Some(r) => format!("{:+.1}%", r * 100.0),
            None => "n/a".to_string(),
        }
    }
}

/// The diff between the current run and a baseline. Transient; never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    /// Ids present now but not in the baseline.
    pub new_ids: BTreeSet<String>,
    /// Ids present in the baseline but resolved since.
    pub resolved_ids: BTreeSet<String>,
    pub total_findings: MetricDelta,
    pub average_complexity: MetricDelta,
    pub average_function_length: MetricDelta,
    pub average_type_length: MetricDelta,
}

impl Comparison {
    /// Nothing appeared and nothing was resolved.
    pub fn is_unchanged(&self) -> bool {
        self.new_ids.is_empty() && self.resolved_ids.is_empty()
    }
}

/// Diff the current findings and metrics against a baseline.
pub fn compare(
    current: &[Finding],
    current_metrics: &AnalysisMetrics,
    baseline: &Baseline,
) -> Comparison {
    let current_ids: BTreeSet<String> = current.iter().map(|f| f.id.clone()).collect();

    let new_ids = current_ids
        .difference(&baseline.finding_ids)
        .cloned()
        .collect();
    let resolved_ids = baseline
        .finding_ids
        .difference(&current_ids)
        .cloned()
        .collect();

    Comparison {
        new_ids,
        resolved_ids,
        total_findings: MetricDelta::compute(
            current_metrics.total_findings as f64,
            baseline.metrics.total_findings as f64,
        ),
        average_complexity: MetricDelta::compute(
            current_metrics.average_complexity,
            baseline.metrics.average_complexity,
        ),
        average_function_length: MetricDelta::compute(
            current_metrics.average_function_length,
            baseline.metrics.average_function_length,
        ),
        average_type_length: MetricDelta::compute(
            current_metrics.average_type_length,
            baseline.metrics.average_type_length,
        ),
    }
}
