//! Framework-idiom and error-handling pattern analyzer.
//!
//! Heuristic checks over typed-node text spans. Unrecognized shapes pass
//! through silently; a pattern analyzer earns false negatives, never a
//! crash.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::discovery::FileInfo;
use crate::findings::{Category, Effort, Finding, Priority};
use crate::syntax::{Node, NodeKind, SyntaxTree};

use super::Analyzer;

static DEBUG_PRINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(System\.(out|err)\.print|console\.(log|debug|info)\(|fmt\.Print)").unwrap()
});

static BLOCKING_CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(Thread\.sleep|time\.Sleep|runBlocking)\b").unwrap());

pub struct IdiomAnalyzer;

impl IdiomAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IdiomAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// A catch clause is empty when its handler block has no statements, or
/// only a bare `pass`.
fn is_empty_handler(tree: &SyntaxTree, catch: &Node) -> bool {
    let Some(block) = catch
        .children
        .iter()
        .find(|c| matches!(c.kind, NodeKind::Block))
    else {
        return false;
    };
    let body = tree
        .text(&block.span)
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim();
    body.is_empty() || body == "pass"
}

impl Analyzer for IdiomAnalyzer {
    fn id(&self) -> &'static str {
        "idioms"
    }

    fn category(&self) -> Category {
        Category::FrameworkIdiom
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for node in tree.root.descendants() {
            match &node.kind {
                NodeKind::CatchClause => {
                    if is_empty_handler(tree, node) {
                        findings.push(
                            Finding::new(
                                self.id(),
                                Category::ErrorHandling,
                                Priority::High,
                                "exception handler swallows the error",
                                "the handler body is empty; the failure disappears without a \
                                 trace",
                                &file.relative_path,
                                node.span.start_line,
                            )
                            .with_snippet(tree.snippet(&node.span))
                            .with_recommendation(
                                "handle the error, log it, or let it propagate",
                            )
                            .with_examples(
                                "try { save(); } catch (IOException e) { }",
                                "try { save(); } catch (IOException e) { log.warn(\"save failed\", e); }",
                            )
                            .with_effort(Effort::Small),
                        );
                    }
                }
                NodeKind::Call { .. } => {
                    let text = tree.text(&node.span);
                    if DEBUG_PRINT_RE.is_match(text) {
                        findings.push(
                            Finding::new(
                                self.id(),
                                Category::FrameworkIdiom,
                                Priority::Low,
                                "debug print left in production code",
                                "raw stdout output bypasses the logging framework and its \
                                 levels and sinks",
                                &file.relative_path,
                                node.span.start_line,
                            )
                            .with_snippet(tree.snippet(&node.span))
                            .with_recommendation("replace with a logger call at a proper level")
                            .with_effort(Effort::Trivial)
                            .auto_fixable(),
                        );
                    } else if BLOCKING_CALL_RE.is_match(text) {
                        findings.push(
                            Finding::new(
                                self.id(),
                                Category::Performance,
                                Priority::Medium,
                                "blocking call in application code",
                                "a hard sleep or blocking bridge stalls the calling thread; \
                                 under a shared executor this starves unrelated work",
                                &file.relative_path,
                                node.span.start_line,
                            )
                            .with_snippet(tree.snippet(&node.span))
                            .with_recommendation(
                                "use a scheduled retry or the framework's async primitives",
                            )
                            .with_effort(Effort::Medium),
                        );
                    }
                }
                _ => {}
            }
        }

        Ok(findings)
    }
}
