//! Naming convention analyzer.
//!
//! Case predicates are pure membership tests over declaration names from
//! the tree. Conventions are per-language: camelCase functions in Java
//! and TypeScript, snake_case in Rust and Python, and either case in Go
//! where exported names are PascalCase by design.

use crate::discovery::FileInfo;
use crate::findings::{Category, Effort, Finding, Priority};
use crate::syntax::{NodeKind, SyntaxTree};

use super::Analyzer;

pub fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    name.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    name.chars().all(|c| c.is_ascii_alphanumeric())
}

pub fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

pub fn is_upper_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Names exempt from function-convention checks: entry points, operator
/// overloads, and dunder-style protocol hooks.
fn is_exempt_function(name: &str) -> bool {
    // Dunders and other underscore-prefixed protocol names
    if name.starts_with('_') {
        return true;
    }
    // Single lowercase words satisfy every convention
    if name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return true;
    }
    matches!(name, "<anonymous>")
}

pub struct NamingAnalyzer;

impl NamingAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn function_violation(language: &str, name: &str) -> Option<&'static str> {
        match language {
            "java" | "typescript" | "javascript" => {
                (!is_camel_case(name)).then_some("camelCase")
            }
            // Exported Go identifiers are PascalCase, unexported camelCase
            "go" => (!is_camel_case(name) && !is_pascal_case(name)).then_some("camelCase"),
            "rust" | "python" => (!is_snake_case(name)).then_some("snake_case"),
            _ => None,
        }
    }
}

impl Default for NamingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for NamingAnalyzer {
    fn id(&self) -> &'static str {
        "naming"
    }

    fn category(&self) -> Category {
        Category::Naming
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for node in tree.root.descendants() {
            match &node.kind {
                NodeKind::TypeDecl { name, .. } => {
                    if name != "<anonymous>" && !is_pascal_case(name) {
                        findings.push(
                            Finding::new(
                                self.id(),
                                Category::Naming,
                                Priority::Low,
                                format!("type '{}' is not PascalCase", name),
                                format!(
                                    "type names use PascalCase; '{}' does not conform",
                                    name
                                ),
                                &file.relative_path,
                                node.span.start_line,
                            )
                            .with_snippet(tree.snippet(&node.span))
                            .with_recommendation("rename the type to PascalCase")
                            .with_effort(Effort::Trivial)
                            .auto_fixable(),
                        );
                    }
                }
                NodeKind::FunctionDecl { name, .. } => {
                    if is_exempt_function(name) {
                        continue;
                    }
                    if let Some(expected) = Self::function_violation(tree.language, name) {
                        findings.push(
                            Finding::new(
                                self.id(),
                                Category::Naming,
                                Priority::Low,
                                format!("function '{}' is not {}", name, expected),
                                format!(
                                    "{} function names use {}; '{}' does not conform",
                                    tree.language, expected, name
                                ),
                                &file.relative_path,
                                node.span.start_line,
                            )
                            .with_snippet(tree.snippet(&node.span))
                            .with_recommendation(format!("rename the function to {}", expected))
                            .with_effort(Effort::Trivial)
                            .auto_fixable(),
                        );
                    }
                }
                NodeKind::PropertyDecl {
                    name,
                    is_const: true,
                    ..
                } => {
                    // Go constants legitimately use PascalCase/camelCase
                    if tree.language == "go" || name == "<anonymous>" {
                        continue;
                    }
                    if !is_upper_snake_case(name) {
                        findings.push(
                            Finding::new(
                                self.id(),
                                Category::Naming,
                                Priority::Low,
                                format!("constant '{}' is not UPPER_SNAKE_CASE", name),
                                format!(
                                    "constants use UPPER_SNAKE_CASE; '{}' does not conform",
                                    name
                                ),
                                &file.relative_path,
                                node.span.start_line,
                            )
                            .with_snippet(tree.snippet(&node.span))
                            .with_recommendation("rename the constant to UPPER_SNAKE_CASE")
                            .with_effort(Effort::Trivial)
                            .auto_fixable(),
                        );
                    }
                }
                _ => {}
            }
        }

        Ok(findings)
    }
}
