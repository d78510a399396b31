//! Analysis pipeline: discovery, per-file analysis, and collection.
//!
//! Files are embarrassingly parallel: each worker parses one file and
//! runs the applicable analyzers over the immutable tree, returning an
//! owned outcome. The single collecting stage flattens outcomes after
//! the parallel section, so no worker ever touches shared mutable state.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::aggregate::{self, AnalysisMetrics, StructuralSamples};
use crate::analyzers::{self, Analyzer};
use crate::config::EngineConfig;
use crate::discovery::{self, FileInfo};
use crate::error::{ConfigurationError, Diagnostic, DiagnosticStage};
use crate::findings::Finding;
use crate::syntax::{self, cyclomatic_complexity, SyntaxTree};

/// Cooperative cancellation flag. Cancelling stops dispatch of new
/// file-analysis tasks; in-flight tasks finish and their results are
/// discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// The complete result of one pipeline run.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    /// Deduplicated findings in final report order.
    pub findings: Vec<Finding>,
    pub metrics: AnalysisMetrics,
    /// Recovered failures, in path order.
    pub diagnostics: Vec<Diagnostic>,
    /// Files that produced a tree and ran analyzers.
    pub files_analyzed: usize,
    /// Files discovered but skipped by a discovery or parse failure.
    pub files_skipped: usize,
    /// True when the run was cancelled before completing.
    pub cancelled: bool,
}

/// Per-file worker output. Owned by the worker until the collect stage.
struct FileOutcome {
    findings: Vec<Finding>,
    samples: StructuralSamples,
    diagnostics: Vec<Diagnostic>,
    analyzed: bool,
}

/// Runs the full pipeline over a root directory.
pub struct Orchestrator {
    config: EngineConfig,
    analyzers: Vec<Box<dyn Analyzer>>,
    cancel: CancelToken,
}

impl Orchestrator {
    /// Build an orchestrator, validating the analyzer allowlist up
    /// front. Configuration problems surface here, before any work.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        let analyzers = analyzers::select(&config, config.analyzers.as_deref())?;
        Ok(Self {
            config,
            analyzers,
            cancel: CancelToken::default(),
        })
    }

    /// Token for cancelling this orchestrator's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Analyze everything under `root`.
    pub fn run(&self, root: &Path) -> anyhow::Result<AnalysisRun> {
        self.run_many(std::slice::from_ref(&root.to_path_buf()))
    }

    /// Analyze everything under several roots as one run.
    ///
    /// With more than one root, relative paths are prefixed with the
    /// root's directory name so findings from different roots cannot
    /// collide on identical relative paths.
    pub fn run_many(&self, roots: &[std::path::PathBuf]) -> anyhow::Result<AnalysisRun> {
        for root in roots {
            if !root.is_dir() {
                return Err(ConfigurationError::InvalidRoot {
                    path: root.clone(),
                    reason: "not a directory".to_string(),
                }
                .into());
            }
        }
        let excludes = self.config.compile_excludes()?;

        let mut files = Vec::new();
        let mut diagnostics = Vec::new();
        for root in roots {
            let (mut root_files, root_diags) =
                discovery::discover(root, &self.config, &excludes);
            if roots.len() > 1 {
                let prefix = root
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                for file in &mut root_files {
                    file.relative_path = format!("{}/{}", prefix, file.relative_path);
                }
            }
            files.extend(root_files);
            diagnostics.extend(root_diags);
        }
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        tracing::info!(
            files = files.len(),
            analyzers = self.analyzers.len(),
            "discovery complete"
        );

        let outcomes: Vec<Option<FileOutcome>> = files
            .par_iter()
            .map(|file| {
                if self.cancel.is_cancelled() {
                    return None;
                }
                Some(self.analyze_file(file))
            })
            .collect();

        if self.cancel.is_cancelled() {
            tracing::warn!("run cancelled; discarding partial results");
            return Ok(AnalysisRun {
                findings: Vec::new(),
                metrics: aggregate::metrics(&[], 0, &StructuralSamples::default()),
                diagnostics: Vec::new(),
                files_analyzed: 0,
                files_skipped: files.len(),
                cancelled: true,
            });
        }

        // Collect stage: the only place results merge.
        let mut all_findings = Vec::new();
        let mut samples = StructuralSamples::default();
        let mut files_analyzed = 0;
        for outcome in outcomes.into_iter().flatten() {
            all_findings.extend(outcome.findings);
            samples.merge(outcome.samples);
            diagnostics.extend(outcome.diagnostics);
            if outcome.analyzed {
                files_analyzed += 1;
            }
        }

        diagnostics.sort_by(|a, b| (&a.path, &a.detail).cmp(&(&b.path, &b.detail)));
        let files_skipped = diagnostics
            .iter()
            .filter(|d| d.stage != DiagnosticStage::Analyzer)
            .count();

        let findings = aggregate::aggregate(all_findings);
        let metrics = aggregate::metrics(&findings, files_analyzed, &samples);

        tracing::info!(
            findings = findings.len(),
            skipped = files_skipped,
            "analysis complete"
        );

        Ok(AnalysisRun {
            findings,
            metrics,
            diagnostics,
            files_analyzed,
            files_skipped,
            cancelled: false,
        })
    }

    /// Parse one file and run every applicable analyzer. All failures
    /// are recovered into diagnostics; this never aborts the run.
    fn analyze_file(&self, file: &FileInfo) -> FileOutcome {
        let mut outcome = FileOutcome {
            findings: Vec::new(),
            samples: StructuralSamples::default(),
            diagnostics: Vec::new(),
            analyzed: false,
        };

        let Some(provider) = syntax::provider_for(&file.path) else {
            // Discovery only admits supported extensions; this is
            // unreachable in practice but cheap to tolerate.
            return outcome;
        };

        let source = match std::fs::read_to_string(&file.path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %file.relative_path, error = %e, "unreadable file");
                outcome
                    .diagnostics
                    .push(Diagnostic::discovery(&file.relative_path, e.to_string()));
                return outcome;
            }
        };

        let tree = match provider.parse(&file.relative_path, &source) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(path = %file.relative_path, error = %e, "parse failed");
                outcome
                    .diagnostics
                    .push(Diagnostic::parse(&file.relative_path, e.to_string()));
                return outcome;
            }
        };

        outcome.samples = collect_samples(&tree);
        outcome.analyzed = true;

        for analyzer in &self.analyzers {
            if !analyzer.applies_to(file) {
                continue;
            }
            match analyzer.analyze(file, &tree) {
                Ok(findings) => outcome.findings.extend(findings),
                Err(e) => {
                    tracing::warn!(
                        path = %file.relative_path,
                        analyzer = analyzer.id(),
                        error = %e,
                        "analyzer failed on file"
                    );
                    outcome.diagnostics.push(Diagnostic::analyzer(
                        &file.relative_path,
                        format!("{}: {}", analyzer.id(), e),
                    ));
                }
            }
        }

        outcome
    }
}

/// Gather raw structural samples for the metrics averages, over every
/// function and type in the file rather than only flagged ones.
fn collect_samples(tree: &SyntaxTree) -> StructuralSamples {
    let mut samples = StructuralSamples::default();
    for function in tree.functions() {
        samples.complexities.push(cyclomatic_complexity(function));
        samples.function_lengths.push(function.span.line_count());
    }
    for ty in tree.types() {
        samples.type_lengths.push(ty.span.line_count());
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_run_collects_findings_across_files() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "src/data/cfg.go",
            "package cfg\n\nvar api = \"http://api.corp-internal.net/v1\"\n",
        );
        write(
            temp.path(),
            "src/domain/names.py",
            "class parser:\n    pass\n",
        );

        let orchestrator = Orchestrator::new(EngineConfig::default()).unwrap();
        let run = orchestrator.run(temp.path()).unwrap();

        assert!(!run.cancelled);
        assert_eq!(run.files_analyzed, 2);
        assert!(run
            .findings
            .iter()
            .any(|f| f.title == "plaintext HTTP endpoint"));
        assert!(run
            .findings
            .iter()
            .any(|f| f.title.contains("not PascalCase")));
        assert_eq!(run.metrics.total_files, 2);
    }

    #[test]
    fn test_missing_root_is_configuration_error() {
        let orchestrator = Orchestrator::new(EngineConfig::default()).unwrap();
        let err = orchestrator
            .run(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[test]
    fn test_unknown_analyzer_rejected_before_work() {
        let config = EngineConfig {
            analyzers: Some(vec!["imaginary".to_string()]),
            ..Default::default()
        };
        assert!(matches!(
            Orchestrator::new(config),
            Err(ConfigurationError::UnknownAnalyzer(_))
        ));
    }

    #[test]
    fn test_allowlist_restricts_findings() {
        let temp = TempDir::new().unwrap();
        // Trips both naming and security when all analyzers run
        write(
            temp.path(),
            "src/cfg.py",
            "class cfg:\n    url = \"http://api.corp-internal.net\"\n",
        );

        let config = EngineConfig {
            analyzers: Some(vec!["naming".to_string()]),
            ..Default::default()
        };
        let run = Orchestrator::new(config).unwrap().run(temp.path()).unwrap();
        assert!(run.findings.iter().all(|f| f.analyzer_id == "naming"));
        assert!(!run.findings.is_empty());
    }

    #[test]
    fn test_cancelled_run_discards_results() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.go", "package a\n");

        let orchestrator = Orchestrator::new(EngineConfig::default()).unwrap();
        orchestrator.cancel_token().cancel();
        let run = orchestrator.run(temp.path()).unwrap();

        assert!(run.cancelled);
        assert!(run.findings.is_empty());
        assert_eq!(run.files_analyzed, 0);
    }

    #[test]
    fn test_skipped_file_surfaces_in_diagnostics() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "good.go", "package good\n");
        std::os::unix::fs::symlink(temp.path().join("gone.go"), temp.path().join("bad.go"))
            .unwrap();

        let orchestrator = Orchestrator::new(EngineConfig::default()).unwrap();
        let run = orchestrator.run(temp.path()).unwrap();

        assert_eq!(run.files_analyzed, 1);
        assert_eq!(run.files_skipped, 1);
        assert_eq!(run.diagnostics.len(), 1);
        assert_eq!(run.diagnostics[0].stage, DiagnosticStage::Discovery);
    }
}
