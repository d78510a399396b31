//! Architectural layering analyzer.
//!
//! Checks import edges between layers against the dependency rule of a
//! layered architecture: domain at the center, presentation and data
//! pointing inward, never the reverse and never presentation reaching
//! around domain into data. Also flags presentation code constructing
//! data-layer collaborators directly instead of receiving them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::LayerRule;
use crate::discovery::{FileInfo, Layer};
use crate::findings::{Category, Effort, Finding, Priority};
use crate::syntax::{NodeKind, SyntaxTree};

use super::Analyzer;

/// Collaborator type-name suffixes that identify data-layer machinery.
static DATA_COLLABORATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Repository|Dao|DataSource|Store|Database)\b").unwrap());

pub struct ArchitectureAnalyzer {
    layer_rules: Vec<LayerRule>,
}

impl ArchitectureAnalyzer {
    pub fn new(layer_rules: Vec<LayerRule>) -> Self {
        Self { layer_rules }
    }

    /// Classify an import path with the same ordered rules used for file
    /// paths. Import separators vary by language; segments do not.
    fn import_layer(&self, path: &str) -> Layer {
        let lowered = path.to_lowercase();
        let segments: Vec<&str> = lowered
            .split(['.', '/', ':'])
            .filter(|s| !s.is_empty())
            .collect();
        for rule in &self.layer_rules {
            if segments
                .iter()
                .any(|segment| segment.contains(rule.pattern.as_str()))
            {
                return rule.layer;
            }
        }
        Layer::Unknown
    }

    fn layering_violation(file_layer: Layer, import_layer: Layer) -> Option<(&'static str, &'static str)> {
        match (file_layer, import_layer) {
            // Domain is the innermost layer; it depends on nothing outward.
            (Layer::Domain, Layer::Presentation) => Some((
                "domain layer imports presentation code",
                "invert the dependency: let presentation observe domain abstractions",
            )),
            (Layer::Domain, Layer::Data) => Some((
                "domain layer imports data-layer code",
                "define a domain-owned interface and implement it in the data layer",
            )),
            (Layer::Domain, Layer::Framework) => Some((
                "domain layer imports framework code",
                "keep the domain framework-free; wrap the framework behind a domain interface",
            )),
            // Presentation goes through domain, never straight to data.
            (Layer::Presentation, Layer::Data) => Some((
                "presentation layer accesses the data layer directly",
                "route the access through a domain use case",
            )),
            // Data implements domain contracts; it never sees the UI.
            (Layer::Data, Layer::Presentation) => Some((
                "data layer imports presentation code",
                "remove the dependency; data-layer code must not know about the UI",
            )),
            _ => None,
        }
    }
}

impl Analyzer for ArchitectureAnalyzer {
    fn id(&self) -> &'static str {
        "architecture"
    }

    fn category(&self) -> Category {
        Category::Architecture
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for node in tree.imports() {
            let NodeKind::Import { path } = &node.kind else {
                continue;
            };
            let import_layer = self.import_layer(path);
            if let Some((title, recommendation)) =
                Self::layering_violation(file.layer, import_layer)
            {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::Architecture,
                        Priority::High,
                        title,
                        format!(
                            "{} file imports '{}', which belongs to the {} layer",
                            file.layer, path, import_layer
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(tree.snippet(&node.span))
                    .with_recommendation(recommendation)
                    .with_effort(Effort::Large),
                );
            }
        }

        // Direct construction of data-layer collaborators in presentation
        // code is a wiring smell even when no import edge gives it away.
        if file.layer == Layer::Presentation {
            for node in tree.root.descendants() {
                let NodeKind::Call { callee } = &node.kind else {
                    continue;
                };
                if DATA_COLLABORATOR_RE.is_match(callee) {
                    findings.push(
                        Finding::new(
                            self.id(),
                            Category::DependencyWiring,
                            Priority::Medium,
                            format!("presentation code constructs '{}' directly", callee),
                            format!(
                                "'{}' looks like a data-layer collaborator; constructing it in \
                                 presentation code hard-wires the dependency",
                                callee
                            ),
                            &file.relative_path,
                            node.span.start_line,
                        )
                        .with_snippet(tree.snippet(&node.span))
                        .with_recommendation(
                            "inject the collaborator through the constructor or a factory",
                        )
                        .with_effort(Effort::Medium),
                    );
                }
            }
        }

        Ok(findings)
    }
}
