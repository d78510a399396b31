//! Command-line interface for codegauge.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::baseline;
use crate::config::EngineConfig;
use crate::error::ConfigurationError;
use crate::pipeline::Orchestrator;
use crate::report;

/// Exit codes. Findings are not a failure condition; only configuration
/// errors exit non-zero. Gating on finding counts is the caller's
/// policy, typically CI wiring around this tool.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["codegauge.yaml", ".codegauge.yaml"];

/// Baseline file name inside the output directory.
const BASELINE_FILE: &str = "codegauge-baseline.json";

/// Report file name inside the output directory.
const REPORT_FILE: &str = "report.md";

/// Code quality analysis engine.
///
/// Codegauge parses source files into syntax trees, runs a set of
/// independent analyzers over them, deduplicates the findings, diffs
/// them against a stored baseline, and writes a Markdown report.
#[derive(Parser)]
#[command(name = "codegauge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more directories and write a report
    #[command(visible_alias = "check")]
    Analyze(AnalyzeArgs),
    /// Create a starter config file from a template
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path to a YAML config file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Comma-separated analyzer-id allowlist (default: all analyzers)
    #[arg(short, long)]
    pub analyzers: Option<String>,

    /// Additional exclusion globs, repeatable
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Output directory for the report and baseline
    #[arg(short, long, default_value = "codegauge-out")]
    pub output: PathBuf,

    /// Baseline file (default: <output>/codegauge-baseline.json)
    #[arg(short, long)]
    pub baseline: Option<PathBuf>,

    /// Replace the baseline with this run's findings
    #[arg(long)]
    pub update_baseline: bool,

    /// Console output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "codegauge.yaml")]
    pub output: PathBuf,

    /// Template to use
    #[arg(short, long, default_value = "default")]
    pub template: String,

    /// List available templates
    #[arg(short, long)]
    pub list: bool,
}

/// Available config templates.
struct Template {
    name: &'static str,
    description: &'static str,
    content: &'static str,
}

static TEMPLATES: &[Template] = &[
    Template {
        name: "default",
        description: "Standard thresholds and layer rules",
        content: include_str!("templates/default.yaml"),
    },
    Template {
        name: "strict",
        description: "Tighter thresholds for new code or review gates",
        content: include_str!("templates/strict.yaml"),
    },
];

/// Discover a config file in the current directory.
fn discover_config() -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Assemble the effective configuration: file first, CLI overrides on
/// top.
fn effective_config(args: &AnalyzeArgs) -> Result<EngineConfig, ConfigurationError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => match discover_config() {
            Some(path) => EngineConfig::load(&path)?,
            None => EngineConfig::default(),
        },
    };

    if let Some(allow) = &args.analyzers {
        config.analyzers = Some(
            allow
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }
    config.exclude.extend(args.exclude.iter().cloned());

    Ok(config)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let config = match effective_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // All configuration problems must surface before any work begins.
    for path in &args.paths {
        if !path.is_dir() {
            eprintln!(
                "Error: {}",
                ConfigurationError::InvalidRoot {
                    path: path.clone(),
                    reason: "not a directory".to_string(),
                }
            );
            return Ok(EXIT_ERROR);
        }
    }

    if let Err(e) = std::fs::create_dir_all(&args.output) {
        eprintln!(
            "Error: {}",
            ConfigurationError::UnwritableOutput {
                path: args.output.clone(),
                reason: e.to_string(),
            }
        );
        return Ok(EXIT_ERROR);
    }

    let orchestrator = match Orchestrator::new(config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let run = orchestrator.run_many(&args.paths)?;

    // Baseline: load, compare, and optionally replace.
    let baseline_path = args
        .baseline
        .clone()
        .unwrap_or_else(|| args.output.join(BASELINE_FILE));
    let previous = baseline::load(&baseline_path)?;
    let comparison = previous
        .as_ref()
        .map(|b| baseline::compare(&run.findings, &run.metrics, b));
    if args.update_baseline {
        baseline::save(&baseline_path, &run.findings, &run.metrics)?;
        tracing::info!(path = %baseline_path.display(), "baseline updated");
    }

    // Report file is always written; console format varies.
    let report_path = args.output.join(REPORT_FILE);
    let document = report::render(&run, comparison.as_ref());
    std::fs::write(&report_path, &document)?;

    match args.format.as_str() {
        "json" => println!("{}", report::render_json(&run, comparison.as_ref())?),
        _ => {
            report::print_summary(&run, comparison.as_ref());
            println!("  Report written to {}", report_path.display());
            println!();
        }
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.list {
        return list_templates();
    }

    let template = match TEMPLATES.iter().find(|t| t.name == args.template) {
        Some(t) => t,
        None => {
            eprintln!("Error: unknown template {:?}", args.template);
            eprintln!("Run 'codegauge init --list' to see available templates");
            return Ok(EXIT_ERROR);
        }
    };

    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, template.content) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!(
        "Created {} from template '{}'",
        args.output.display(),
        template.name
    );
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to fit your project", args.output.display());
    println!(
        "  2. Run: codegauge analyze . --config {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}

/// List available templates.
fn list_templates() -> anyhow::Result<i32> {
    println!("Available templates:");
    println!();

    for template in TEMPLATES {
        let name = if template.name == "default" {
            format!("{} (default)", template.name)
        } else {
            template.name.to_string()
        };
        println!("  {:<16} {}", name, template.description);
    }

    println!();
    println!("Usage:");
    println!("  codegauge init --template <name>");

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn analyze_args(root: &Path, output: &Path) -> AnalyzeArgs {
        AnalyzeArgs {
            paths: vec![root.to_path_buf()],
            config: None,
            analyzers: None,
            exclude: Vec::new(),
            output: output.to_path_buf(),
            baseline: None,
            update_baseline: false,
            format: "pretty".to_string(),
        }
    }

    #[test]
    fn test_analyze_writes_report_and_exits_zero_with_findings() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("bad.py"), "class bad_name:\n    pass\n").unwrap();
        let output = temp.path().join("out");

        let code = run_analyze(&analyze_args(&root, &output)).unwrap();
        assert_eq!(code, EXIT_SUCCESS);

        let report = std::fs::read_to_string(output.join(REPORT_FILE)).unwrap();
        assert!(report.contains("not PascalCase"));
    }

    #[test]
    fn test_analyze_invalid_path_exits_error() {
        let temp = TempDir::new().unwrap();
        let args = analyze_args(
            &temp.path().join("missing"),
            &temp.path().join("out"),
        );
        let code = run_analyze(&args).unwrap();
        assert_eq!(code, EXIT_ERROR);
    }

    #[test]
    fn test_analyze_unknown_analyzer_exits_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        std::fs::create_dir_all(&root).unwrap();
        let mut args = analyze_args(&root, &temp.path().join("out"));
        args.analyzers = Some("naming,typo".to_string());

        let code = run_analyze(&args).unwrap();
        assert_eq!(code, EXIT_ERROR);
    }

    #[test]
    fn test_analyze_invalid_format_exits_error() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        std::fs::create_dir_all(&root).unwrap();
        let mut args = analyze_args(&root, &temp.path().join("out"));
        args.format = "xml".to_string();

        let code = run_analyze(&args).unwrap();
        assert_eq!(code, EXIT_ERROR);
    }

    #[test]
    fn test_update_baseline_then_rerun_is_clean() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("bad.py"), "class bad_name:\n    pass\n").unwrap();
        let output = temp.path().join("out");

        let mut args = analyze_args(&root, &output);
        args.update_baseline = true;
        assert_eq!(run_analyze(&args).unwrap(), EXIT_SUCCESS);
        assert!(output.join(BASELINE_FILE).exists());

        // Second run against the stored baseline: nothing new
        let args = analyze_args(&root, &output);
        assert_eq!(run_analyze(&args).unwrap(), EXIT_SUCCESS);
        let report = std::fs::read_to_string(output.join(REPORT_FILE)).unwrap();
        assert!(report.contains("New findings: 0"));
        assert!(report.contains("Resolved findings: 0"));
    }

    #[test]
    fn test_init_writes_template() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("codegauge.yaml");
        let args = InitArgs {
            output: out.clone(),
            template: "default".to_string(),
            list: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.contains("thresholds:"));

        // Refuses to overwrite
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_init_unknown_template_exits_error() {
        let temp = TempDir::new().unwrap();
        let args = InitArgs {
            output: temp.path().join("cfg.yaml"),
            template: "fancy".to_string(),
            list: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
