//! Error taxonomy for the analysis engine.
//!
//! Configuration problems are fatal and abort before any work begins.
//! Everything scoped to a single file or a single analyzer run is
//! recovered locally and surfaced as a [`Diagnostic`] on the run result,
//! never silently dropped.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal configuration errors. Any of these aborts the run before
/// discovery starts and maps to a non-zero exit code.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid root path {path:?}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("unknown analyzer id {0:?}")]
    UnknownAnalyzer(String),

    #[error("output directory {path:?} is not writable: {reason}")]
    UnwritableOutput { path: PathBuf, reason: String },

    #[error("invalid exclude pattern {pattern:?}: {reason}")]
    InvalidExclude { pattern: String, reason: String },

    #[error("invalid config file {path:?}: {reason}")]
    InvalidConfigFile { path: PathBuf, reason: String },
}

/// Pipeline stage a recovered failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStage {
    /// Unreadable file or directory during the walk.
    Discovery,
    /// File failed to produce a syntax tree.
    Parse,
    /// A single analyzer failed on a single file.
    Analyzer,
}

impl std::fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticStage::Discovery => write!(f, "discovery"),
            DiagnosticStage::Parse => write!(f, "parse"),
            DiagnosticStage::Analyzer => write!(f, "analyzer"),
        }
    }
}

/// A recovered, file- or analyzer-scoped failure.
///
/// Diagnostics ride along on the final result so the report can state how
/// many files were skipped and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: DiagnosticStage,
    /// Path the failure is attached to (relative where possible).
    pub path: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn discovery(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage: DiagnosticStage::Discovery,
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn parse(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage: DiagnosticStage::Parse,
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn analyzer(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            stage: DiagnosticStage::Analyzer,
            path: path.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.path, self.detail)
    }
}
