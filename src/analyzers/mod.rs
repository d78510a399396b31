//! Analyzer contract and the fixed registry of concrete analyzers.
//!
//! Every analyzer is an independent pass over one file's syntax tree.
//! The registry is assembled at build time and iterated explicitly by the
//! pipeline; there is no dynamic plugin loading.

mod architecture;
mod idioms;
mod naming;
mod persistence;
mod security;
mod state;
mod structural;

pub use architecture::ArchitectureAnalyzer;
pub use idioms::IdiomAnalyzer;
pub use naming::NamingAnalyzer;
pub use persistence::PersistenceAnalyzer;
pub use security::SecurityAnalyzer;
pub use state::StateAnalyzer;
pub use structural::{ComplexityAnalyzer, NestingAnalyzer, StructureAnalyzer};

use crate::config::EngineConfig;
use crate::discovery::FileInfo;
use crate::error::ConfigurationError;
use crate::findings::{Category, Finding};
use crate::syntax::SyntaxTree;

/// One pattern-detection pass.
///
/// Analyzers are pure with respect to their inputs: they read the file
/// info and tree, and their only output is the returned findings.
pub trait Analyzer: Send + Sync {
    /// Stable identifier, usable in an allowlist.
    fn id(&self) -> &'static str;

    /// Primary category this analyzer reports under. Individual findings
    /// may use a more specific category.
    fn category(&self) -> Category;

    /// Whether this analyzer wants the file at all. The default skips
    /// test files.
    fn applies_to(&self, file: &FileInfo) -> bool {
        !file.is_test
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>>;
}

/// Registry order. Also the dedup tie-break order: when two analyzers
/// produce the same finding id at the same priority, the one earlier in
/// this list wins.
pub const ANALYZER_IDS: &[&str] = &[
    "structure",
    "complexity",
    "nesting",
    "architecture",
    "naming",
    "state",
    "idioms",
    "persistence",
    "security",
];

/// Position of an analyzer id in the registry order. Unknown ids sort
/// last; they can only come from deserialized baselines.
pub fn analyzer_order(id: &str) -> usize {
    ANALYZER_IDS
        .iter()
        .position(|known| *known == id)
        .unwrap_or(ANALYZER_IDS.len())
}

/// Build the full registry from the engine configuration.
pub fn registry(config: &EngineConfig) -> Vec<Box<dyn Analyzer>> {
    let thresholds = &config.thresholds;
    vec![
        Box::new(StructureAnalyzer::new(thresholds.clone())),
        Box::new(ComplexityAnalyzer::new(thresholds.clone())),
        Box::new(NestingAnalyzer::new(thresholds.clone())),
        Box::new(ArchitectureAnalyzer::new(config.layers.clone())),
        Box::new(NamingAnalyzer::new()),
        Box::new(StateAnalyzer::new()),
        Box::new(IdiomAnalyzer::new()),
        Box::new(PersistenceAnalyzer::new()),
        Box::new(SecurityAnalyzer::new()),
    ]
}

/// Build the registry restricted to an allowlist of analyzer ids.
///
/// An unknown id is a configuration error: the caller asked for an
/// analyzer that does not exist, and silently running without it would
/// under-report.
pub fn select(
    config: &EngineConfig,
    allowlist: Option<&[String]>,
) -> Result<Vec<Box<dyn Analyzer>>, ConfigurationError> {
    let all = registry(config);
    let Some(allowed) = allowlist else {
        return Ok(all);
    };

    for id in allowed {
        if !ANALYZER_IDS.contains(&id.as_str()) {
            return Err(ConfigurationError::UnknownAnalyzer(id.clone()));
        }
    }

    Ok(all
        .into_iter()
        .filter(|a| allowed.iter().any(|id| id == a.id()))
        .collect())
}
