//! Persistence pattern analyzer.
//!
//! Flags SQL assembled with string concatenation or interpolation
//! instead of parameter placeholders. The check anchors on string
//! literal nodes from the tree, so SQL keywords inside comments never
//! trigger it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::discovery::FileInfo;
use crate::findings::{Category, Effort, Finding, Priority};
use crate::syntax::{NodeKind, SyntaxTree};

use super::Analyzer;

static SQL_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    // Optional string-prefix letters (f-strings, raw strings) before the quote
    Regex::new(r#"(?i)^\s*[frb]*["'`]?\s*(select\s+.+\s+from|insert\s+into|update\s+\w+\s+set|delete\s+from)\b"#)
        .unwrap()
});

/// Concatenation or interpolation markers on the literal's source line.
const CONCAT_MARKERS: &[&str] = &["\" +", "+ \"", "' +", "+ '", "` +", "+ `", ".format(", "% ("];

pub struct PersistenceAnalyzer;

impl PersistenceAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PersistenceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the literal itself interpolates values: template strings and
/// f-strings embedding `${..}` / `{..}` expressions.
fn is_interpolated(text: &str) -> bool {
    (text.starts_with('`') && text.contains("${"))
        || ((text.starts_with("f\"") || text.starts_with("f'")) && text.contains('{'))
}

impl Analyzer for PersistenceAnalyzer {
    fn id(&self) -> &'static str {
        "persistence"
    }

    fn category(&self) -> Category {
        Category::Persistence
    }

    fn analyze(&self, file: &FileInfo, tree: &SyntaxTree) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for node in tree.root.descendants() {
            if node.kind != NodeKind::StringLiteral {
                continue;
            }
            let text = tree.text(&node.span);
            if !SQL_LITERAL_RE.is_match(text) {
                continue;
            }

            let line_text = tree.line(node.span.start_line);
            let concatenated = CONCAT_MARKERS.iter().any(|m| line_text.contains(m));

            if concatenated || is_interpolated(text) {
                findings.push(
                    Finding::new(
                        self.id(),
                        Category::Persistence,
                        Priority::High,
                        "query built from string concatenation",
                        "the statement splices values into SQL text instead of binding \
                         parameters; beyond injection exposure, the database cannot cache \
                         the plan",
                        &file.relative_path,
                        node.span.start_line,
                    )
                    .with_snippet(line_text.trim())
                    .with_recommendation("bind values through parameter placeholders")
                    .with_examples(
                        "\"SELECT * FROM users WHERE id = \" + userId",
                        "\"SELECT * FROM users WHERE id = ?\" with userId bound as a parameter",
                    )
                    .with_effort(Effort::Small),
                );
            }
        }

        Ok(findings)
    }
}
