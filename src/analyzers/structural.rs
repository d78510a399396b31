//! Structural smell analyzers: size, complexity, and nesting depth.

use crate::config::AnalyzerConfig;
use crate::discovery::FileInfo;
use crate::findings::{Category, Effort, Finding, Priority};
use crate::syntax::{cyclomatic_complexity, max_nesting_depth, Node, NodeKind, SyntaxTree};

use super::Analyzer;

fn named_functions(tree: &SyntaxTree) -> Vec<(&Node, &str, usize)> {
    tree.functions()
        .into_iter()
        .filter_map(|node| match &node.kind {
            NodeKind::FunctionDecl { name, param_count } => {
                Some((node, name.as_str(), *param_count))
            }
            _ => None,
        })
        .collect()
}

/// Flags oversized functions and types and over-parameterized functions.
pub struct StructureAnalyzer {
    config: AnalyzerConfig,
}

impl StructureAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }
}

impl Analyzer for StructureAnalyzer {
    fn id(&self) -> &'static str {
        "structure"
    }

    fn category(&self) -> Category {
        Category::StructuralSmell
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (node, name, param_count) in named_functions(tree) {
            let lines = node.span.line_count();
            if lines > self.config.max_function_lines {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::StructuralSmell,
                        Priority::Medium,
                        format!("function '{}' is too long", name),
                        format!(
                            "function '{}' spans {} lines, above the limit of {}",
                            name, lines, self.config.max_function_lines
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(tree.snippet(&node.span))
                    .with_recommendation(
                        "extract cohesive blocks into named helper functions",
                    )
                    .with_effort(Effort::Medium),
                );
            }

            if param_count > self.config.max_parameters {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::StructuralSmell,
                        Priority::Medium,
                        format!("function '{}' has too many parameters", name),
                        format!(
                            "function '{}' takes {} parameters, above the limit of {}",
                            name, param_count, self.config.max_parameters
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(tree.snippet(&node.span))
                    .with_recommendation(
                        "group related parameters into a parameter object",
                    )
                    .with_effort(Effort::Small),
                );
            }
        }

        for node in tree.types() {
            let Some(name) = node.name() else { continue };
            let lines = node.span.line_count();
            if lines > self.config.max_type_lines {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::StructuralSmell,
                        Priority::Medium,
                        format!("type '{}' is too long", name),
                        format!(
                            "type '{}' spans {} lines, above the limit of {}",
                            name, lines, self.config.max_type_lines
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(tree.snippet(&node.span))
                    .with_recommendation(
                        "split responsibilities into smaller collaborating types",
                    )
                    .with_effort(Effort::Large),
                );
            }
        }

        Ok(findings)
    }
}

/// Flags functions whose cyclomatic complexity exceeds the threshold.
///
/// Complexity is 1 + the number of decision points in the body:
/// conditionals, loops, match arms, short-circuit operators, and
/// exception handlers.
pub struct ComplexityAnalyzer {
    config: AnalyzerConfig,
}

impl ComplexityAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }
}

impl Analyzer for ComplexityAnalyzer {
    fn id(&self) -> &'static str {
        "complexity"
    }

    fn category(&self) -> Category {
        Category::StructuralSmell
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (node, name, _) in named_functions(tree) {
            let complexity = cyclomatic_complexity(node);
            if complexity > self.config.max_complexity {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::StructuralSmell,
                        Priority::High,
                        format!("function '{}' is too complex", name),
                        format!(
                            "function '{}' has cyclomatic complexity {}, above the limit of {}",
                            name, complexity, self.config.max_complexity
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(tree.snippet(&node.span))
                    .with_recommendation(
                        "extract decision-heavy branches into focused helpers or table lookups",
                    )
                    .with_effort(Effort::Medium),
                );
            }
        }

        Ok(findings)
    }
}

/// Flags functions that nest control flow deeper than the threshold.
pub struct NestingAnalyzer {
    config: AnalyzerConfig,
}

impl NestingAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }
}

impl Analyzer for NestingAnalyzer {
    fn id(&self) -> &'static str {
        "nesting"
    }

    fn category(&self) -> Category {
        Category::StructuralSmell
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (node, name, _) in named_functions(tree) {
            let depth = max_nesting_depth(node);
            if depth > self.config.max_nesting_depth {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::StructuralSmell,
                        Priority::Medium,
                        format!("function '{}' is nested too deeply", name),
                        format!(
                            "function '{}' reaches nesting depth {}, above the limit of {}",
                            name, depth, self.config.max_nesting_depth
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(tree.snippet(&node.span))
                    .with_recommendation(
                        "flatten with early returns or guard clauses",
                    )
                    .with_examples(
                        "if ok {\n    if valid {\n        work()\n    }\n}",
                        "if !ok || !valid {\n    return\n}\nwork()",
                    )
                    .with_effort(Effort::Small),
                );
            }
        }

        Ok(findings)
    }
}
