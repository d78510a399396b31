//! State management analyzer.
//!
//! Pattern analyzer over property declarations: reactive containers
//! exposed in their mutable form, and package-global mutable state.
//! Both checks read the declaration's textual span, so they tolerate
//! shapes the grammar mapping does not classify.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::discovery::FileInfo;
use crate::findings::{Category, Effort, Finding, Priority};
use crate::syntax::{Node, NodeKind, SyntaxTree};

use super::Analyzer;

/// Mutable reactive container type names, across the frameworks the
/// analyzed codebases use.
static MUTABLE_CONTAINER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(MutableLiveData|MutableStateFlow|MutableSharedFlow|MutableState|BehaviorSubject|PublishSubject|ReplaySubject)\b",
    )
    .unwrap()
});

static VISIBILITY_GUARD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(private|protected|internal)\b").unwrap());

pub struct StateAnalyzer;

impl StateAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte spans of every function body, for locality checks.
fn function_spans(tree: &SyntaxTree) -> Vec<(usize, usize)> {
    tree.functions()
        .iter()
        .map(|f| (f.span.start_byte, f.span.end_byte))
        .collect()
}

fn inside_any(spans: &[(usize, usize)], node: &Node) -> bool {
    spans
        .iter()
        .any(|(start, end)| node.span.start_byte >= *start && node.span.end_byte <= *end)
}

impl Analyzer for StateAnalyzer {
    fn id(&self) -> &'static str {
        "state"
    }

    fn category(&self) -> Category {
        Category::StateManagement
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();
        let fn_spans = function_spans(tree);

        for node in tree.root.descendants() {
            let NodeKind::PropertyDecl {
                name,
                mutable,
                is_const,
            } = &node.kind
            else {
                continue;
            };

            let decl_line = tree.snippet(&node.span);

            if MUTABLE_CONTAINER_RE.is_match(&decl_line)
                && !VISIBILITY_GUARD_RE.is_match(&decl_line)
            {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::StateManagement,
                        Priority::High,
                        format!("mutable reactive container '{}' is exposed", name),
                        format!(
                            "property '{}' exposes a mutable reactive container; callers can \
                             push state from anywhere",
                            name
                        ),
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(decl_line.clone())
                    .with_recommendation(
                        "keep the mutable container private and expose a read-only view",
                    )
                    .with_examples(
                        "val items = MutableLiveData<List<Item>>()",
                        "private val _items = MutableLiveData<List<Item>>()\nval items: LiveData<List<Item>> = _items",
                    )
                    .with_effort(Effort::Small),
                );
                continue;
            }

            // Package-global mutable state: a mutable, non-const property
            // declared outside every function body.
            if *mutable && !*is_const && !inside_any(&fn_spans, node) {
                // In Go any package-level var qualifies; elsewhere only
                // static fields are module-wide.
                let module_wide = tree.language == "go" || decl_line.contains("static");
                if module_wide {
                    findings.push(
                        Finding::new(
                            self.id(),
                            Category::StateManagement,
                            Priority::Medium,
                            format!("mutable global state '{}'", name),
                            format!(
                                "'{}' is mutable state shared across the whole module; every \
                                 reader races every writer",
                                name
                            ),
                            &file.relative_path,
                            node.span.start_line,
                        )
                        .with_snippet(decl_line)
                        .with_recommendation(
                            "scope the state to an owner type, or make it immutable",
                        )
                        .with_effort(Effort::Medium),
                    );
                }
            }
        }

        Ok(findings)
    }
}
