//! Core types for analysis findings.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Issue categories, in report order.
///
/// The declaration order here is load-bearing: the aggregator sorts
/// findings by category using this order, and the report renders category
/// sections in the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    StructuralSmell,
    Architecture,
    FrameworkIdiom,
    StateManagement,
    ErrorHandling,
    DependencyWiring,
    Persistence,
    Performance,
    Naming,
    TestCoverage,
    Documentation,
    Security,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::StructuralSmell => "structural-smell",
            Category::Architecture => "architecture",
            Category::FrameworkIdiom => "framework-idiom",
            Category::StateManagement => "state-management",
            Category::ErrorHandling => "error-handling",
            Category::DependencyWiring => "dependency-wiring",
            Category::Persistence => "persistence",
            Category::Performance => "performance",
            Category::Naming => "naming",
            Category::TestCoverage => "test-coverage",
            Category::Documentation => "documentation",
            Category::Security => "security",
        }
    }

    /// All categories in declaration order.
    pub fn all() -> &'static [Category] {
        &[
            Category::StructuralSmell,
            Category::Architecture,
            Category::FrameworkIdiom,
            Category::StateManagement,
            Category::ErrorHandling,
            Category::DependencyWiring,
            Category::Persistence,
            Category::Performance,
            Category::Naming,
            Category::TestCoverage,
            Category::Documentation,
            Category::Security,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Finding priority. Ordered: `Critical` sorts before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ]
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

/// Estimated remediation effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Trivial,
    Small,
    Medium,
    Large,
}

impl std::fmt::Display for Effort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effort::Trivial => write!(f, "trivial"),
            Effort::Small => write!(f, "small"),
            Effort::Medium => write!(f, "medium"),
            Effort::Large => write!(f, "large"),
        }
    }
}

/// Length of the fingerprint hex prefix kept as the finding id.
const FINGERPRINT_LEN: usize = 16;

/// Compute the stable identity of a finding.
///
/// The id is a pure function of `(category, file_path, line, title)` so
/// identical issues across runs hash to identical ids. A title edit
/// changes identity; such findings show up as resolved + new in a
/// baseline diff.
pub fn fingerprint(category: Category, file_path: &str, line: usize, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(category.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(file_path.as_bytes());
    hasher.update(b":");
    hasher.update(line.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(title.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..FINGERPRINT_LEN].to_string()
}

/// One detected issue.
///
/// Immutable after creation: the `with_*` builders consume and return a
/// new value, and downstream stages never mutate findings in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable fingerprint, see [`fingerprint`].
    pub id: String,
    pub analyzer_id: String,
    pub category: Category,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_example: Option<String>,
    pub effort: Effort,
    pub auto_fixable: bool,
}

impl Finding {
    /// Create a finding. The id is derived, and security findings are
    /// forced to critical priority regardless of what the analyzer asked
    /// for.
    pub fn new(
        analyzer_id: &str,
        category: Category,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        file_path: impl Into<String>,
        line: usize,
    ) -> Self {
        let title = title.into();
        let file_path = file_path.into();
        let priority = if category == Category::Security {
            Priority::Critical
        } else {
            priority
        };
        Self {
            id: fingerprint(category, &file_path, line, &title),
            analyzer_id: analyzer_id.to_string(),
            category,
            priority,
            title,
            description: description.into(),
            file_path,
            line,
            column: None,
            code_snippet: None,
            recommendation: None,
            before_example: None,
            after_example: None,
            effort: Effort::Small,
            auto_fixable: false,
        }
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.code_snippet = Some(snippet.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = Some(recommendation.into());
        self
    }

    pub fn with_examples(
        mut self,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        self.before_example = Some(before.into());
        self.after_example = Some(after.into());
        self
    }

    pub fn with_effort(mut self, effort: Effort) -> Self {
        self.effort = effort;
        self
    }

    pub fn auto_fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }

    /// Location string for display, `file:line` or `file:line:col`.
    pub fn location(&self) -> String {
        match self.column {
            Some(col) => format!("{}:{}:{}", self.file_path, self.line, col),
            None => format!("{}:{}", self.file_path, self.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(Category::Naming, "src/foo.rs", 12, "bad name");
        let b = fingerprint(Category::Naming, "src/foo.rs", 12, "bad name");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_varies_by_component() {
        let base = fingerprint(Category::Naming, "src/foo.rs", 12, "bad name");
        assert_ne!(
            base,
            fingerprint(Category::Security, "src/foo.rs", 12, "bad name")
        );
        assert_ne!(
            base,
            fingerprint(Category::Naming, "src/bar.rs", 12, "bad name")
        );
        assert_ne!(
            base,
            fingerprint(Category::Naming, "src/foo.rs", 13, "bad name")
        );
        assert_ne!(
            base,
            fingerprint(Category::Naming, "src/foo.rs", 12, "worse name")
        );
    }

    #[test]
    fn test_finding_id_matches_fingerprint() {
        let f = Finding::new(
            "naming",
            Category::Naming,
            Priority::Low,
            "type name is not PascalCase",
            "rename it",
            "src/foo.rs",
            3,
        );
        assert_eq!(
            f.id,
            fingerprint(Category::Naming, "src/foo.rs", 3, "type name is not PascalCase")
        );
    }

    #[test]
    fn test_security_always_critical() {
        let f = Finding::new(
            "security",
            Category::Security,
            Priority::Low,
            "hardcoded key",
            "rotate and remove",
            "src/keys.rs",
            1,
        );
        assert_eq!(f.priority, Priority::Critical);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical < Priority::High);
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn test_category_order_is_report_order() {
        let all = Category::all();
        let mut sorted = all.to_vec();
        sorted.sort();
        assert_eq!(all, sorted.as_slice());
    }

    #[test]
    fn test_builders_produce_new_values() {
        let f = Finding::new(
            "structure",
            Category::StructuralSmell,
            Priority::Medium,
            "function too long",
            "split it",
            "src/big.rs",
            40,
        );
        let g = f.clone().with_column(7).with_effort(Effort::Large);
        assert_eq!(f.column, None);
        assert_eq!(g.column, Some(7));
        assert_eq!(g.effort, Effort::Large);
        assert_eq!(g.location(), "src/big.rs:40:7");
    }
}
