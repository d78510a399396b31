//! Codegauge - code quality analysis engine.
//!
//! Codegauge parses source files into syntax trees, runs a set of
//! independent pattern-detection analyzers over them, aggregates and
//! deduplicates the findings, compares them against a stored baseline,
//! and renders a Markdown report.
//!
//! # Architecture
//!
//! - `syntax`: language-agnostic typed tree, backed by tree-sitter
//! - `discovery`: directory walk, layer classification, test flagging
//! - `analyzers`: the analyzer contract and every concrete analyzer
//! - `pipeline`: orchestration, parallelism, failure isolation
//! - `aggregate`: deduplication, ordering, run metrics
//! - `baseline`: snapshot persistence and cross-run diffing
//! - `report`: Markdown/JSON/console output
//!
//! # Adding an Analyzer
//!
//! Implement the `Analyzer` trait in `src/analyzers/`, then register the
//! type in `analyzers::registry` and add its id to `ANALYZER_IDS`.

pub mod aggregate;
pub mod analyzers;
pub mod baseline;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod findings;
pub mod pipeline;
pub mod report;
pub mod syntax;

pub use aggregate::AnalysisMetrics;
pub use analyzers::{Analyzer, ANALYZER_IDS};
pub use baseline::{Baseline, Comparison};
pub use config::{AnalyzerConfig, EngineConfig};
pub use discovery::{FileInfo, Layer};
pub use error::{ConfigurationError, Diagnostic, DiagnosticStage};
pub use findings::{Category, Effort, Finding, Priority};
pub use pipeline::{AnalysisRun, CancelToken, Orchestrator};
pub use syntax::{Node, NodeKind, SyntaxTree};
