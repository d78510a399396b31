//! Engine configuration: thresholds, exclusions, and layer rules.
//!
//! Everything is overridable from an optional YAML config file; defaults
//! are named constants, not magic literals scattered through analyzers.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::discovery::Layer;
use crate::error::ConfigurationError;

/// Default thresholds.
pub mod defaults {
    /// Function bodies longer than this are flagged.
    pub const MAX_FUNCTION_LINES: usize = 50;
    /// Type declarations longer than this are flagged.
    pub const MAX_TYPE_LINES: usize = 300;
    /// Functions with more parameters than this are flagged.
    pub const MAX_PARAMETERS: usize = 5;
    /// Cyclomatic complexity above this is flagged.
    pub const MAX_COMPLEXITY: u32 = 10;
    /// Nesting depth above this is flagged.
    pub const MAX_NESTING_DEPTH: u32 = 4;
    /// How many leading lines discovery scans for a namespace declaration.
    pub const NAMESPACE_SCAN_LINES: usize = 30;
}

fn default_max_function_lines() -> usize {
    defaults::MAX_FUNCTION_LINES
}

fn default_max_type_lines() -> usize {
    defaults::MAX_TYPE_LINES
}

fn default_max_parameters() -> usize {
    defaults::MAX_PARAMETERS
}

fn default_max_complexity() -> u32 {
    defaults::MAX_COMPLEXITY
}

fn default_max_nesting_depth() -> u32 {
    defaults::MAX_NESTING_DEPTH
}

/// Per-run analyzer thresholds.
///
/// Passed into analyzers at construction so test runs can use isolated
/// overrides instead of globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_max_function_lines")]
    pub max_function_lines: usize,
    #[serde(default = "default_max_type_lines")]
    pub max_type_lines: usize,
    #[serde(default = "default_max_parameters")]
    pub max_parameters: usize,
    #[serde(default = "default_max_complexity")]
    pub max_complexity: u32,
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: u32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_function_lines: defaults::MAX_FUNCTION_LINES,
            max_type_lines: defaults::MAX_TYPE_LINES,
            max_parameters: defaults::MAX_PARAMETERS,
            max_complexity: defaults::MAX_COMPLEXITY,
            max_nesting_depth: defaults::MAX_NESTING_DEPTH,
        }
    }
}

/// One layer classification rule: a path substring and the layer it maps
/// to. Rules are ordered; the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRule {
    pub pattern: String,
    pub layer: Layer,
}

impl LayerRule {
    fn new(pattern: &str, layer: Layer) -> Self {
        Self {
            pattern: pattern.to_string(),
            layer,
        }
    }
}

/// Default layer rules, matching the directory conventions of layered
/// codebases. Test directories are classified first so `data/tests/`
/// does not read as a data-layer source.
pub fn default_layer_rules() -> Vec<LayerRule> {
    vec![
        LayerRule::new("test", Layer::Test),
        LayerRule::new("spec", Layer::Test),
        LayerRule::new("data", Layer::Data),
        LayerRule::new("repository", Layer::Data),
        LayerRule::new("persistence", Layer::Data),
        LayerRule::new("storage", Layer::Data),
        LayerRule::new("domain", Layer::Domain),
        LayerRule::new("usecase", Layer::Domain),
        LayerRule::new("model", Layer::Domain),
        LayerRule::new("service", Layer::Domain),
        LayerRule::new("presentation", Layer::Presentation),
        LayerRule::new("ui", Layer::Presentation),
        LayerRule::new("view", Layer::Presentation),
        LayerRule::new("controller", Layer::Presentation),
        LayerRule::new("handler", Layer::Presentation),
        LayerRule::new("framework", Layer::Framework),
        LayerRule::new("infra", Layer::Framework),
        LayerRule::new("platform", Layer::Framework),
    ]
}

fn default_exclude() -> Vec<String> {
    [
        "**/build/**",
        "**/target/**",
        "**/out/**",
        "**/dist/**",
        "**/node_modules/**",
        "**/vendor/**",
        "**/.git/**",
        "**/generated/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Full engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Analyzer-id allowlist; `None` runs every registered analyzer.
    pub analyzers: Option<Vec<String>>,
    /// Glob patterns excluded from discovery.
    pub exclude: Vec<String>,
    pub thresholds: AnalyzerConfig,
    /// Ordered layer classification rules, first match wins.
    pub layers: Vec<LayerRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analyzers: None,
            exclude: default_exclude(),
            thresholds: AnalyzerConfig::default(),
            layers: default_layer_rules(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::InvalidConfigFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        serde_yaml::from_str(&text).map_err(|e| ConfigurationError::InvalidConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Compile the exclusion globs.
    pub fn compile_excludes(&self) -> Result<GlobSet, ConfigurationError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let glob = Glob::new(pattern).map_err(|e| ConfigurationError::InvalidExclude {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| ConfigurationError::InvalidExclude {
                pattern: self.exclude.join(", "),
                reason: e.to_string(),
            })
    }
}
