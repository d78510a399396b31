//! Language-agnostic syntax tree abstraction.
//!
//! The engine's analyzers never touch a concrete parser. They consume the
//! typed node model defined here: a tagged-union [`NodeKind`] walked with
//! ordinary pattern matching. The tree-sitter-backed provider in
//! [`treesitter`] is the only place that knows how any particular grammar
//! maps onto these kinds.
//!
//! Unrecognized grammar constructs map to [`NodeKind::Other`] with their
//! children intact, so traversals see the full shape of the file even for
//! constructs no analyzer cares about.

pub mod treesitter;

pub use treesitter::{provider_for, supported_extensions, GrammarSpec};

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
}

impl Span {
    /// Number of source lines the span covers.
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Trait,
}

/// The tagged union of node shapes the analyzers understand.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// File root.
    Root,
    /// Named type declaration.
    TypeDecl { name: String, kind: TypeKind },
    /// Named function or method declaration.
    FunctionDecl { name: String, param_count: usize },
    /// Field / property / variable declaration.
    PropertyDecl {
        name: String,
        mutable: bool,
        is_const: bool,
    },
    /// Import / use declaration. `path` is the trimmed source text.
    Import { path: String },
    /// Conditional branch: if, else-if, ternary.
    Conditional,
    /// Loop construct: for, while, do, loop.
    Loop,
    /// Switch / match / select construct.
    Match,
    /// One arm of a Match.
    MatchArm,
    /// Exception handler clause.
    CatchClause,
    /// Short-circuit boolean operator (`&&` / `||` / `and` / `or`).
    ShortCircuit,
    /// Call or construction expression. `callee` is the called text.
    Call { callee: String },
    /// String literal (quotes included in the span).
    StringLiteral,
    /// Plain statement block.
    Block,
    /// Anything the grammar mapping does not classify.
    Other,
}

/// One node of the typed tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<Node>,
}

impl Node {
    /// Pre-order iterator over this node and every descendant.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Declared name, for declaration nodes.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::TypeDecl { name, .. }
            | NodeKind::FunctionDecl { name, .. }
            | NodeKind::PropertyDecl { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True for constructs that introduce a nesting level: conditionals,
    /// loops, and match constructs. Sequential blocks do not nest.
    pub fn introduces_nesting(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Conditional | NodeKind::Loop | NodeKind::Match
        )
    }

    /// True for constructs that count as a cyclomatic decision point.
    pub fn is_decision_point(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Conditional
                | NodeKind::Loop
                | NodeKind::MatchArm
                | NodeKind::ShortCircuit
                | NodeKind::CatchClause
        )
    }
}

/// Pre-order traversal state.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so children come back out in source order.
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// A parsed file: typed tree plus the source it was derived from.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// Relative path of the parsed file.
    pub path: String,
    /// Language identifier, e.g. "java".
    pub language: &'static str,
    /// Whether the underlying parse contained error nodes. The tree is
    /// still usable; analyzers tolerate the gaps.
    pub had_errors: bool,
    source: String,
    pub root: Node,
}

impl SyntaxTree {
    pub fn new(
        path: impl Into<String>,
        language: &'static str,
        source: String,
        root: Node,
        had_errors: bool,
    ) -> Self {
        Self {
            path: path.into(),
            language,
            had_errors,
            source,
            root,
        }
    }

    /// Source text of a span.
    pub fn text(&self, span: &Span) -> &str {
        let end = span.end_byte.min(self.source.len());
        let start = span.start_byte.min(end);
        &self.source[start..end]
    }

    /// First line of a span's text, trimmed. Used for snippets.
    pub fn snippet(&self, span: &Span) -> String {
        self.text(span).lines().next().unwrap_or("").trim().to_string()
    }

    /// Full source line by 1-indexed line number.
    pub fn line(&self, line_no: usize) -> &str {
        if line_no == 0 {
            return "";
        }
        self.source.lines().nth(line_no - 1).unwrap_or("")
    }

    /// All function declarations in the file, in source order.
    pub fn functions(&self) -> Vec<&Node> {
        self.root
            .descendants()
            .filter(|n| matches!(n.kind, NodeKind::FunctionDecl { .. }))
            .collect()
    }

    /// All type declarations in the file, in source order.
    pub fn types(&self) -> Vec<&Node> {
        self.root
            .descendants()
            .filter(|n| matches!(n.kind, NodeKind::TypeDecl { .. }))
            .collect()
    }

    /// All import declarations in the file, in source order.
    pub fn imports(&self) -> Vec<&Node> {
        self.root
            .descendants()
            .filter(|n| matches!(n.kind, NodeKind::Import { .. }))
            .collect()
    }
}

/// Cyclomatic complexity of a function node: 1 + decision points in its
/// subtree. Decision points are conditionals, loops, match arms,
/// short-circuit operators, and exception handlers.
pub fn cyclomatic_complexity(function: &Node) -> u32 {
    let decisions = function
        .descendants()
        .skip(1)
        .filter(|n| n.is_decision_point())
        .count() as u32;
    1 + decisions
}

/// Maximum nesting depth inside a function node. Only block-introducing
/// constructs (conditional, loop, match) increment the counter, so N
/// sequential conditionals yield depth 1, not N.
pub fn max_nesting_depth(function: &Node) -> u32 {
    fn walk(node: &Node, depth: u32) -> u32 {
        let mut max = depth;
        for child in &node.children {
            let next = if child.introduces_nesting() {
                depth + 1
            } else {
                depth
            };
            // The child itself counts at its own depth.
            let child_max = walk(child, next).max(next);
            max = max.max(child_max);
        }
        max
    }
    walk(function, 0)
}
