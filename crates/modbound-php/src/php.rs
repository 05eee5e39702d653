//! PHP language extractor using Tree-sitter.

use modbound_core::{GroupMember, Span, SyntaxNode};
use tree_sitter::{Language, Node, Parser};

use crate::extractor::{ExtractError, FileAnalysis, LanguageExtractor};

/// Node kinds that spell a (possibly qualified) name.
const NAME_KINDS: &[&str] = &["qualified_name", "name", "namespace_name"];

/// Extracts `use` statements and config reads from PHP source.
pub struct PhpExtractor {
    language: Language,
}

impl PhpExtractor {
    /// Creates a new PHP extractor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        node.utf8_text(src).unwrap_or("")
    }

    fn span(node: &Node<'_>) -> Span {
        let start = node.start_position();
        Span {
            line: start.row + 1,
            column: start.column,
            offset: node.start_byte(),
            length: node.end_byte() - node.start_byte(),
        }
    }

    /// `use function ...;` and `use const ...;` import functions/constants, not classes.
    fn is_function_or_const_use(node: &Node<'_>) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|c| !c.is_named() && matches!(c.kind(), "function" | "const"));
        found
    }

    /// Text of the first name-like child (the imported name, not its alias).
    fn first_name<'a>(node: &Node<'_>, src: &'a [u8]) -> Option<&'a str> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|c| NAME_KINDS.contains(&c.kind()))
            .map(|c| Self::text(&c, src));
        found
    }

    fn extract_use(node: &Node<'_>, src: &[u8], out: &mut Vec<SyntaxNode>) {
        if Self::is_function_or_const_use(node) {
            return;
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();

        if let Some(group) = children.iter().find(|c| c.kind() == "namespace_use_group") {
            let prefix = children
                .iter()
                .find(|c| c.kind() == "namespace_name")
                .map_or("", |p| Self::text(p, src));
            let mut group_cursor = group.walk();
            let members = group
                .named_children(&mut group_cursor)
                .filter(|clause| !Self::is_function_or_const_use(clause))
                .filter_map(|clause| {
                    Self::first_name(&clause, src).map(|name| GroupMember {
                        name: name.to_owned(),
                        span: Self::span(&clause),
                    })
                })
                .collect();
            out.push(SyntaxNode::GroupedImportStatement {
                prefix: prefix.to_owned(),
                members,
                span: Self::span(node),
            });
            return;
        }

        for clause in children
            .iter()
            .filter(|c| c.kind() == "namespace_use_clause")
            .filter(|c| !Self::is_function_or_const_use(c))
        {
            if let Some(name) = Self::first_name(clause, src) {
                out.push(SyntaxNode::ImportStatement {
                    name: name.to_owned(),
                    span: Self::span(clause),
                });
            }
        }
    }

    fn extract_static_call(node: &Node<'_>, src: &[u8]) -> Option<SyntaxNode> {
        let scope = node.child_by_field_name("scope")?;
        let method = node.child_by_field_name("name")?;
        if !NAME_KINDS.contains(&scope.kind()) || method.kind() != "name" {
            return None;
        }
        Some(SyntaxNode::StaticFacadeCall {
            class: Self::text(&scope, src).to_owned(),
            method: Self::text(&method, src).to_owned(),
            first_arg: Self::first_string_argument(node, src),
            span: Self::span(node),
        })
    }

    fn extract_function_call(node: &Node<'_>, src: &[u8]) -> Option<SyntaxNode> {
        let function = node.child_by_field_name("function")?;
        if !NAME_KINDS.contains(&function.kind()) {
            return None;
        }
        Some(SyntaxNode::FreeFunctionCall {
            function: Self::text(&function, src).to_owned(),
            first_arg: Self::first_string_argument(node, src),
            span: Self::span(node),
        })
    }

    /// The first argument's value when it is a literal string.
    fn first_string_argument(call: &Node<'_>, src: &[u8]) -> Option<String> {
        let arguments = call.child_by_field_name("arguments")?;
        let mut cursor = arguments.walk();
        let first = arguments.named_children(&mut cursor).next()?;
        if first.kind() != "argument" {
            return None;
        }
        let mut arg_cursor = first.walk();
        let value = first.named_children(&mut arg_cursor).last()?;
        Self::string_literal(&value, src)
    }

    fn string_literal(node: &Node<'_>, src: &[u8]) -> Option<String> {
        let raw = Self::text(node, src);
        let raw = raw.strip_prefix(&['b', 'B'][..]).unwrap_or(raw);
        match node.kind() {
            "string" => {
                let inner = raw.strip_prefix('\'')?.strip_suffix('\'')?;
                Some(unescape_single_quoted(inner))
            }
            "encapsed_string" => {
                let mut cursor = node.walk();
                let interpolated = node.named_children(&mut cursor).any(|c| {
                    !matches!(c.kind(), "string_content" | "string_value" | "escape_sequence")
                });
                if interpolated {
                    return None;
                }
                let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
                Some(unescape_double_quoted(inner))
            }
            _ => None,
        }
    }
}

impl Default for PhpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageExtractor for PhpExtractor {
    fn language_id(&self) -> &'static str {
        "php"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".php"]
    }

    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| ExtractError::Language {
                language: self.language_id(),
                message: e.to_string(),
            })?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or(ExtractError::Parse {
            language: self.language_id(),
        })?;
        let root = tree.root_node();

        let mut result = FileAnalysis {
            has_syntax_errors: root.has_error(),
            ..FileAnalysis::default()
        };

        // Depth-first, pre-order so nodes come out in source order.
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "namespace_use_declaration" => {
                    Self::extract_use(&node, src, &mut result.nodes);
                    continue;
                }
                "scoped_call_expression" => {
                    if let Some(call) = Self::extract_static_call(&node, src) {
                        result.nodes.push(call);
                    }
                }
                "function_call_expression" => {
                    if let Some(call) = Self::extract_function_call(&node, src) {
                        result.nodes.push(call);
                    }
                }
                _ => {}
            }

            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        Ok(result)
    }
}

fn unescape_single_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('\\' | '\'')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn unescape_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let replacement = match chars.peek() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some(&other @ ('\\' | '"' | '$')) => other,
            // Unknown escapes stay as written.
            _ => {
                out.push(c);
                continue;
            }
        };
        out.push(replacement);
        chars.next();
    }
    out
}
