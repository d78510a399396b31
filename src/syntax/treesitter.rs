//! Tree-sitter-backed syntax tree provider.
//!
//! One [`GrammarSpec`] per supported language maps that grammar's node
//! kinds onto the engine's typed [`NodeKind`] model. The mapping is
//! table-driven: adding a language means writing its kind tables and
//! registering the spec in [`ALL_GRAMMARS`]. Constructs absent from the
//! tables come through as `NodeKind::Other` with children intact.

use std::path::Path;

use tree_sitter::{Language, Parser};

use super::{Node, NodeKind, Span, SyntaxTree, TypeKind};

/// Grammar-to-typed-node mapping for one language.
pub struct GrammarSpec {
    pub language_id: &'static str,
    pub extensions: &'static [&'static str],
    get_language: fn() -> Language,
    type_kinds: &'static [(&'static str, TypeKind)],
    function_kinds: &'static [&'static str],
    property_kinds: &'static [&'static str],
    const_kinds: &'static [&'static str],
    import_kinds: &'static [&'static str],
    conditional_kinds: &'static [&'static str],
    loop_kinds: &'static [&'static str],
    match_kinds: &'static [&'static str],
    match_arm_kinds: &'static [&'static str],
    catch_kinds: &'static [&'static str],
    binary_kinds: &'static [&'static str],
    short_circuit_ops: &'static [&'static str],
    call_kinds: &'static [&'static str],
    string_kinds: &'static [&'static str],
    block_kinds: &'static [&'static str],
    /// Substrings in a declaration's first line that mark it immutable.
    immutable_markers: &'static [&'static str],
    /// Substrings in a declaration's first line that mark it a constant.
    const_markers: &'static [&'static str],
}

fn java_language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}

fn typescript_language() -> Language {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn javascript_language() -> Language {
    tree_sitter_javascript::LANGUAGE.into()
}

fn rust_language() -> Language {
    tree_sitter_rust::LANGUAGE.into()
}

static JAVA: GrammarSpec = GrammarSpec {
    language_id: "java",
    extensions: &["java"],
    get_language: java_language,
    type_kinds: &[
        ("class_declaration", TypeKind::Class),
        ("record_declaration", TypeKind::Class),
        ("interface_declaration", TypeKind::Interface),
        ("enum_declaration", TypeKind::Enum),
    ],
    function_kinds: &["method_declaration", "constructor_declaration"],
    property_kinds: &["field_declaration"],
    const_kinds: &[],
    import_kinds: &["import_declaration"],
    conditional_kinds: &["if_statement", "ternary_expression"],
    loop_kinds: &[
        "for_statement",
        "enhanced_for_statement",
        "while_statement",
        "do_statement",
    ],
    match_kinds: &["switch_expression"],
    match_arm_kinds: &["switch_block_statement_group", "switch_rule"],
    catch_kinds: &["catch_clause"],
    binary_kinds: &["binary_expression"],
    short_circuit_ops: &["&&", "||"],
    call_kinds: &["method_invocation", "object_creation_expression"],
    string_kinds: &["string_literal"],
    block_kinds: &["block"],
    immutable_markers: &["final "],
    const_markers: &["static final "],
};

static GO: GrammarSpec = GrammarSpec {
    language_id: "go",
    extensions: &["go"],
    get_language: go_language,
    type_kinds: &[("type_spec", TypeKind::Struct)],
    function_kinds: &["function_declaration", "method_declaration"],
    property_kinds: &["var_spec"],
    const_kinds: &["const_spec"],
    import_kinds: &["import_spec"],
    conditional_kinds: &["if_statement"],
    loop_kinds: &["for_statement"],
    match_kinds: &[
        "expression_switch_statement",
        "type_switch_statement",
        "select_statement",
    ],
    match_arm_kinds: &["expression_case", "type_case", "communication_case"],
    catch_kinds: &[],
    binary_kinds: &["binary_expression"],
    short_circuit_ops: &["&&", "||"],
    call_kinds: &["call_expression"],
    string_kinds: &["interpreted_string_literal", "raw_string_literal"],
    block_kinds: &["block"],
    immutable_markers: &[],
    const_markers: &[],
};

static PYTHON: GrammarSpec = GrammarSpec {
    language_id: "python",
    extensions: &["py"],
    get_language: python_language,
    type_kinds: &[("class_definition", TypeKind::Class)],
    function_kinds: &["function_definition"],
    property_kinds: &[],
    const_kinds: &[],
    import_kinds: &["import_statement", "import_from_statement"],
    conditional_kinds: &["if_statement", "elif_clause", "conditional_expression"],
    loop_kinds: &["for_statement", "while_statement"],
    match_kinds: &["match_statement"],
    match_arm_kinds: &["case_clause"],
    catch_kinds: &["except_clause"],
    binary_kinds: &["boolean_operator"],
    short_circuit_ops: &["and", "or"],
    call_kinds: &["call"],
    string_kinds: &["string"],
    block_kinds: &["block"],
    immutable_markers: &[],
    const_markers: &[],
};

static TYPESCRIPT: GrammarSpec = GrammarSpec {
    language_id: "typescript",
    extensions: &["ts"],
    get_language: typescript_language,
    type_kinds: &[
        ("class_declaration", TypeKind::Class),
        ("interface_declaration", TypeKind::Interface),
        ("enum_declaration", TypeKind::Enum),
    ],
    function_kinds: &["function_declaration", "method_definition"],
    property_kinds: &["public_field_definition"],
    const_kinds: &[],
    import_kinds: &["import_statement"],
    conditional_kinds: &["if_statement", "ternary_expression"],
    loop_kinds: &[
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
    ],
    match_kinds: &["switch_statement"],
    match_arm_kinds: &["switch_case"],
    catch_kinds: &["catch_clause"],
    binary_kinds: &["binary_expression"],
    short_circuit_ops: &["&&", "||"],
    call_kinds: &["call_expression", "new_expression"],
    string_kinds: &["string", "template_string"],
    block_kinds: &["statement_block"],
    immutable_markers: &["readonly ", "const "],
    const_markers: &[],
};

static JAVASCRIPT: GrammarSpec = GrammarSpec {
    language_id: "javascript",
    extensions: &["js", "jsx"],
    get_language: javascript_language,
    type_kinds: &[("class_declaration", TypeKind::Class)],
    function_kinds: &["function_declaration", "method_definition"],
    property_kinds: &["field_definition"],
    const_kinds: &[],
    import_kinds: &["import_statement"],
    conditional_kinds: &["if_statement", "ternary_expression"],
    loop_kinds: &[
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
    ],
    match_kinds: &["switch_statement"],
    match_arm_kinds: &["switch_case"],
    catch_kinds: &["catch_clause"],
    binary_kinds: &["binary_expression"],
    short_circuit_ops: &["&&", "||"],
    call_kinds: &["call_expression", "new_expression"],
    string_kinds: &["string", "template_string"],
    block_kinds: &["statement_block"],
    immutable_markers: &["const "],
    const_markers: &[],
};

static RUST: GrammarSpec = GrammarSpec {
    language_id: "rust",
    extensions: &["rs"],
    get_language: rust_language,
    type_kinds: &[
        ("struct_item", TypeKind::Struct),
        ("enum_item", TypeKind::Enum),
        ("trait_item", TypeKind::Trait),
    ],
    function_kinds: &["function_item"],
    property_kinds: &["field_declaration"],
    const_kinds: &["const_item", "static_item"],
    import_kinds: &["use_declaration"],
    conditional_kinds: &["if_expression"],
    loop_kinds: &["for_expression", "while_expression", "loop_expression"],
    match_kinds: &["match_expression"],
    match_arm_kinds: &["match_arm"],
    catch_kinds: &[],
    binary_kinds: &["binary_expression"],
    short_circuit_ops: &["&&", "||"],
    call_kinds: &["call_expression"],
    string_kinds: &["string_literal", "raw_string_literal"],
    block_kinds: &["block"],
    immutable_markers: &[],
    const_markers: &[],
};

/// All registered grammars, checked in order by [`provider_for`].
static ALL_GRAMMARS: &[&GrammarSpec] =
    &[&JAVA, &GO, &PYTHON, &TYPESCRIPT, &JAVASCRIPT, &RUST];

/// Look up the grammar handling a file, by extension.
pub fn provider_for(path: &Path) -> Option<&'static GrammarSpec> {
    let ext = path.extension().and_then(|e| e.to_str())?;
    ALL_GRAMMARS
        .iter()
        .copied()
        .find(|spec| spec.extensions.contains(&ext))
}

/// File extensions with a registered grammar.
pub fn supported_extensions() -> Vec<&'static str> {
    let mut exts: Vec<&'static str> = ALL_GRAMMARS
        .iter()
        .flat_map(|spec| spec.extensions.iter().copied())
        .collect();
    exts.sort_unstable();
    exts
}

impl GrammarSpec {
    /// Parse source text into the engine's typed tree.
    ///
    /// A file the parser cannot produce a tree for at all is a parse
    /// failure. Partial errors yield a usable tree with `had_errors` set.
    pub fn parse(&self, rel_path: &str, source: &str) -> anyhow::Result<SyntaxTree> {
        let mut parser = Parser::new();
        parser.set_language(&(self.get_language)())?;
        let tree = parser
            .parse(source.as_bytes(), None)
            .ok_or_else(|| anyhow::anyhow!("no syntax tree produced for {}", rel_path))?;

        let ts_root = tree.root_node();
        let mut root = Node {
            kind: NodeKind::Root,
            span: span_of(ts_root),
            children: Vec::new(),
        };
        let mut cursor = ts_root.walk();
        for child in ts_root.named_children(&mut cursor) {
            root.children.push(self.convert(child, source.as_bytes()));
        }

        Ok(SyntaxTree::new(
            rel_path,
            self.language_id,
            source.to_string(),
            root,
            ts_root.has_error(),
        ))
    }

    fn convert(&self, node: tree_sitter::Node, source: &[u8]) -> Node {
        let kind = self.classify(node, source);
        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            children.push(self.convert(child, source));
        }
        Node {
            kind,
            span: span_of(node),
            children,
        }
    }

    fn classify(&self, node: tree_sitter::Node, source: &[u8]) -> NodeKind {
        let kind = node.kind();

        if let Some((_, type_kind)) = self.type_kinds.iter().find(|(k, _)| *k == kind) {
            return NodeKind::TypeDecl {
                name: find_name(node, source).unwrap_or_else(|| "<anonymous>".to_string()),
                kind: *type_kind,
            };
        }

        if self.function_kinds.contains(&kind) {
            return NodeKind::FunctionDecl {
                name: find_name(node, source).unwrap_or_else(|| "<anonymous>".to_string()),
                param_count: count_params(node, source),
            };
        }

        if self.property_kinds.contains(&kind) || self.const_kinds.contains(&kind) {
            let first_line = first_line_of(node, source);
            let is_const = self.const_kinds.contains(&kind)
                || self.const_markers.iter().any(|m| first_line.contains(m));
            let mutable = !is_const
                && !self
                    .immutable_markers
                    .iter()
                    .any(|m| first_line.contains(m));
            return NodeKind::PropertyDecl {
                name: find_name(node, source).unwrap_or_else(|| "<anonymous>".to_string()),
                mutable,
                is_const,
            };
        }

        if self.import_kinds.contains(&kind) {
            return NodeKind::Import {
                path: clean_import(&first_line_of(node, source)),
            };
        }

        if self.conditional_kinds.contains(&kind) {
            return NodeKind::Conditional;
        }
        if self.loop_kinds.contains(&kind) {
            return NodeKind::Loop;
        }
        if self.match_kinds.contains(&kind) {
            return NodeKind::Match;
        }
        if self.match_arm_kinds.contains(&kind) {
            return NodeKind::MatchArm;
        }
        if self.catch_kinds.contains(&kind) {
            return NodeKind::CatchClause;
        }

        if self.binary_kinds.contains(&kind) {
            let op = node
                .child_by_field_name("operator")
                .map(|n| node_text(n, source))
                .unwrap_or_default();
            if self.short_circuit_ops.contains(&op.as_str()) {
                return NodeKind::ShortCircuit;
            }
            return NodeKind::Other;
        }

        if self.call_kinds.contains(&kind) {
            return NodeKind::Call {
                callee: callee_of(node, source),
            };
        }

        if self.string_kinds.contains(&kind) {
            return NodeKind::StringLiteral;
        }
        if self.block_kinds.contains(&kind) {
            return NodeKind::Block;
        }

        NodeKind::Other
    }
}

fn span_of(node: tree_sitter::Node) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        start_line: start.row + 1, // tree-sitter is 0-indexed
        start_col: start.column + 1,
        end_line: end.row + 1,
    }
}

fn node_text(node: tree_sitter::Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

fn first_line_of(node: tree_sitter::Node, source: &[u8]) -> String {
    node.utf8_text(source)
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .to_string()
}

/// Declared name of a node: the `name` field, or the `name` field of a
/// direct named child (covers wrappers like Go's `type_declaration ->
/// type_spec` and Java's `field_declaration -> variable_declarator`).
fn find_name(node: tree_sitter::Node, source: &[u8]) -> Option<String> {
    if let Some(name) = node.child_by_field_name("name") {
        return Some(node_text(name, source));
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(name) = child.child_by_field_name("name") {
            return Some(node_text(name, source));
        }
    }
    None
}

/// Number of declared parameters, excluding receiver-style parameters
/// (`self`, `cls`, Rust's `self_parameter`).
fn count_params(node: tree_sitter::Node, source: &[u8]) -> usize {
    let Some(params) = node.child_by_field_name("parameters") else {
        return 0;
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|p| p.kind() != "self_parameter" && p.kind() != "comment")
        .filter(|p| {
            let text = p.utf8_text(source).unwrap_or("");
            text != "self" && text != "cls"
        })
        .count()
}

/// Called expression of a call node, tried across the field names the
/// supported grammars use.
fn callee_of(node: tree_sitter::Node, source: &[u8]) -> String {
    for field in ["function", "constructor", "type", "name"] {
        if let Some(callee) = node.child_by_field_name(field) {
            return node_text(callee, source);
        }
    }
    first_line_of(node, source)
}

/// Trim an import line down to its path-ish payload.
fn clean_import(line: &str) -> String {
    line.trim()
        .trim_start_matches("import static ")
        .trim_start_matches("import ")
        .trim_start_matches("use ")
        .trim_start_matches("from ")
        .trim_end_matches(';')
        .trim()
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{cyclomatic_complexity, max_nesting_depth};
    use std::path::PathBuf;

    #[test]
    fn test_provider_lookup_by_extension() {
        assert_eq!(
            provider_for(&PathBuf::from("A.java")).map(|s| s.language_id),
            Some("java")
        );
        assert_eq!(
            provider_for(&PathBuf::from("main.go")).map(|s| s.language_id),
            Some("go")
        );
        assert!(provider_for(&PathBuf::from("readme.txt")).is_none());
        assert!(provider_for(&PathBuf::from("Makefile")).is_none());
    }

    #[test]
    fn test_supported_extensions_sorted() {
        let exts = supported_extensions();
        assert!(exts.contains(&"java"));
        assert!(exts.contains(&"rs"));
        let mut sorted = exts.clone();
        sorted.sort_unstable();
        assert_eq!(exts, sorted);
    }

    #[test]
    fn test_parse_go_function_facts() {
        let source = r#"
package main

func process(a int, b int) int {
	if a > 0 {
		for i := 0; i < a; i++ {
			if i%2 == 0 && i > b {
				return i
			}
		}
	}
	return 0
}
"#;
        let tree = GO.parse("main.go", source).unwrap();
        assert!(!tree.had_errors);

        let funcs = tree.functions();
        assert_eq!(funcs.len(), 1);
        match &funcs[0].kind {
            NodeKind::FunctionDecl { name, param_count } => {
                assert_eq!(name, "process");
                assert_eq!(*param_count, 2);
            }
            other => panic!("expected function, got {:?}", other),
        }

        // 1 + if + for + if + && = 5
        assert_eq!(cyclomatic_complexity(funcs[0]), 5);
        // if > for > if
        assert_eq!(max_nesting_depth(funcs[0]), 3);
    }

    #[test]
    fn test_parse_java_class_and_imports() {
        let source = r#"
package com.example.app;

import com.example.data.UserRepository;
import java.util.List;

public class UserService {
    private final UserRepository repository;

    public List<String> names() {
        return repository.loadNames();
    }
}
"#;
        let tree = JAVA.parse("UserService.java", source).unwrap();

        let types = tree.types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name(), Some("UserService"));

        let imports: Vec<String> = tree
            .imports()
            .iter()
            .map(|n| match &n.kind {
                NodeKind::Import { path } => path.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            imports,
            vec![
                "com.example.data.UserRepository".to_string(),
                "java.util.List".to_string()
            ]
        );

        // `final` field maps to an immutable property
        let prop = tree
            .root
            .descendants()
            .find(|n| matches!(n.kind, NodeKind::PropertyDecl { .. }))
            .unwrap();
        match &prop.kind {
            NodeKind::PropertyDecl { name, mutable, .. } => {
                assert_eq!(name, "repository");
                assert!(!mutable);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_sequential_ifs_do_not_nest() {
        let source = r#"
package main

func flags(a, b, c bool) int {
	n := 0
	if a {
		n++
	}
	if b {
		n++
	}
	if c {
		n++
	}
	return n
}
"#;
        let tree = GO.parse("flags.go", source).unwrap();
        let funcs = tree.functions();
        assert_eq!(max_nesting_depth(funcs[0]), 1);
        // 1 + three independent ifs
        assert_eq!(cyclomatic_complexity(funcs[0]), 4);
    }

    #[test]
    fn test_parse_python_except_counts() {
        let source = r#"
def load(path):
    try:
        with open(path) as f:
            return f.read()
    except OSError:
        return None
"#;
        let tree = PYTHON.parse("load.py", source).unwrap();
        let funcs = tree.functions();
        assert_eq!(funcs.len(), 1);
        // 1 + except clause
        assert_eq!(cyclomatic_complexity(funcs[0]), 2);
    }

    #[test]
    fn test_unparseable_input_still_yields_tree_with_errors() {
        let tree = GO.parse("broken.go", "func broken( {{{").unwrap();
        assert!(tree.had_errors);
    }

    #[test]
    fn test_string_literal_spans() {
        let source = r#"
package main

const greeting = "hello"
"#;
        let tree = GO.parse("s.go", source).unwrap();
        let lit = tree
            .root
            .descendants()
            .find(|n| n.kind == NodeKind::StringLiteral)
            .expect("string literal node");
        assert_eq!(tree.text(&lit.span), "\"hello\"");
    }
}
