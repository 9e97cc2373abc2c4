//! Dialect-aware parsing of stylesheet text into a [`SyntaxTree`].
//!
//! The tokenizer is lossless: every byte of the input, including whitespace
//! and comments, lands in exactly one leaf token, so `serialize(parse(text))`
//! reproduces `text` byte for byte. The structural layer above it is
//! deliberately shallow. It groups tokens into rules, blocks, declarations
//! and at-rules, which is as much structure as the lint rules need.

use std::ops::Range;

use crate::error::ParseError;
use crate::location::{LineIndex, Location};
use crate::syntax::{Dialect, Node, NodeKind, SyntaxTree, TextSpan};

/// Parse `text` under the given dialect.
///
/// Fails with [`ParseError`] when the text is not valid under the dialect;
/// the error carries the offending location where the tokenizer can supply
/// one.
pub fn parse(text: &str, dialect: Dialect) -> Result<SyntaxTree, ParseError> {
    let root = match dialect {
        Dialect::Scss => parse_scss(text)?,
        Dialect::Sass => parse_sass(text)?,
    };
    Ok(SyntaxTree::new(dialect, root))
}

fn location_at(text: &str, offset: usize) -> Location {
    LineIndex::new(text).location(offset)
}

fn error_at(text: &str, offset: usize, message: impl Into<String>) -> ParseError {
    ParseError::new(message, Some(location_at(text, offset)))
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$' | '@' | '%') || !c.is_ascii()
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-') || !c.is_ascii()
}

/// Tokenize `full[range]` into leaf nodes with spans relative to `full`.
fn lex(full: &str, range: Range<usize>) -> Result<Vec<Node>, ParseError> {
    let text = &full[range.clone()];
    let base = range.start;
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        let c = rest.chars().next().unwrap_or('\0');
        let start = i;

        if c.is_whitespace() {
            let len = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            i += len;
            push(&mut tokens, NodeKind::Space, text, start, i, base);
        } else if rest.starts_with("//") {
            let len = rest.find('\n').unwrap_or(rest.len());
            i += len;
            push(&mut tokens, NodeKind::CommentSingle, text, start, i, base);
        } else if rest.starts_with("/*") {
            match rest.find("*/") {
                Some(end) => i += end + 2,
                None => {
                    return Err(error_at(full, base + start, "unterminated comment"));
                }
            }
            push(&mut tokens, NodeKind::CommentMulti, text, start, i, base);
        } else if c == '"' || c == '\'' {
            i += lex_string(full, base + start, rest, c)?;
            push(&mut tokens, NodeKind::StringLit, text, start, i, base);
        } else if rest.starts_with("#{") {
            i += lex_interpolation(full, base + start, rest)?;
            push(&mut tokens, NodeKind::Ident, text, start, i, base);
        } else if c == '#' && hex_color_len(rest) > 0 {
            i += hex_color_len(rest);
            push(&mut tokens, NodeKind::HexColor, text, start, i, base);
        } else if c.is_ascii_digit() || (c == '.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
        {
            i += number_len(rest);
            push(&mut tokens, NodeKind::Number, text, start, i, base);
        } else if c == '!' {
            let (len, kind) = lex_bang(rest);
            i += len;
            push(&mut tokens, kind, text, start, i, base);
        } else if is_ident_start(c) || (c == '-' && rest[1..].starts_with(is_ident_start)) {
            let mut len = c.len_utf8();
            len += rest[len..]
                .find(|c: char| !is_ident_continue(c))
                .unwrap_or(rest.len() - len);
            i += len;
            push(&mut tokens, NodeKind::Ident, text, start, i, base);
        } else {
            i += c.len_utf8();
            push(&mut tokens, NodeKind::Punct, text, start, i, base);
        }
    }

    Ok(tokens)
}

fn push(tokens: &mut Vec<Node>, kind: NodeKind, text: &str, start: usize, end: usize, base: usize) {
    tokens.push(Node::leaf(
        kind,
        &text[start..end],
        TextSpan::new(base + start, base + end),
    ));
}

/// Length of a quoted string starting at `rest`, quote included on both ends.
fn lex_string(full: &str, offset: usize, rest: &str, quote: char) -> Result<usize, ParseError> {
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' => break,
            c if c == quote => return Ok(i + c.len_utf8()),
            _ => {}
        }
    }
    Err(error_at(full, offset, "unterminated string"))
}

/// Length of a `#{...}` interpolation, braces included. Nesting-aware.
fn lex_interpolation(full: &str, offset: usize, rest: &str) -> Result<usize, ParseError> {
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            _ => {}
        }
    }
    Err(error_at(full, offset, "unterminated interpolation"))
}

/// Length of a hex color token (`#` plus 3-8 hex digits) starting at `rest`,
/// or 0 if `rest` does not start with one.
fn hex_color_len(rest: &str) -> usize {
    let digits = rest[1..]
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(rest.len() - 1);
    let boundary = rest[1 + digits..]
        .chars()
        .next()
        .is_none_or(|c| !is_ident_continue(c));
    if matches!(digits, 3 | 4 | 6 | 8) && boundary { 1 + digits } else { 0 }
}

fn number_len(rest: &str) -> usize {
    let mut len = 0;
    let mut seen_dot = false;
    for c in rest.chars() {
        match c {
            '0'..='9' => len += 1,
            '.' if !seen_dot => {
                seen_dot = true;
                len += 1;
            }
            _ => break,
        }
    }
    // A trailing dot belongs to the next token (`1.` is not a CSS number).
    if rest[..len].ends_with('.') { len - 1 } else { len }
}

/// `!important` (any case, optional inner whitespace), `!default`-style
/// flags, `!=`, or a bare `!`.
fn lex_bang(rest: &str) -> (usize, NodeKind) {
    if rest[1..].starts_with('=') {
        return (2, NodeKind::Punct);
    }
    let ws = rest[1..]
        .find(|c: char| !matches!(c, ' ' | '\t'))
        .unwrap_or(rest.len() - 1);
    let word_start = 1 + ws;
    let word_len = rest[word_start..]
        .find(|c: char| !c.is_alphabetic())
        .unwrap_or(rest.len() - word_start);
    if word_len == 0 {
        return (1, NodeKind::Punct);
    }
    let word = &rest[word_start..word_start + word_len];
    let kind = if word.eq_ignore_ascii_case("important") {
        NodeKind::Important
    } else {
        NodeKind::Ident
    };
    (word_start + word_len, kind)
}

// ---------------------------------------------------------------------------
// SCSS (brace-based) structure
// ---------------------------------------------------------------------------

fn parse_scss(text: &str) -> Result<Node, ParseError> {
    let tokens = lex(text, 0..text.len())?;
    let mut i = 0;
    let children = parse_scss_items(text, &tokens, &mut i)?;
    if let Some(stray) = tokens.get(i) {
        return Err(error_at(text, stray.span.start, "unexpected `}`"));
    }
    Ok(Node::branch(NodeKind::Stylesheet, children))
}

fn is_trivia(token: &Node) -> bool {
    matches!(
        token.kind,
        NodeKind::Space | NodeKind::CommentSingle | NodeKind::CommentMulti
    ) || token.text() == Some(";")
}

/// Parse items until a `}` (left unconsumed) or the end of the token stream.
fn parse_scss_items(text: &str, tokens: &[Node], i: &mut usize) -> Result<Vec<Node>, ParseError> {
    let mut items = Vec::new();

    loop {
        while tokens.get(*i).is_some_and(is_trivia) {
            items.push(tokens[*i].clone());
            *i += 1;
        }
        match tokens.get(*i) {
            None => return Ok(items),
            Some(t) if t.text() == Some("}") => return Ok(items),
            Some(_) => {}
        }

        // Statement: everything up to `{`, `;`, `}` or the end of input.
        let mut statement = Vec::new();
        while let Some(token) = tokens.get(*i) {
            if matches!(token.text(), Some("{") | Some(";") | Some("}")) {
                break;
            }
            statement.push(token.clone());
            *i += 1;
        }

        match tokens.get(*i) {
            Some(open) if open.text() == Some("{") => {
                let open_offset = open.span.start;
                let mut block = vec![open.clone()];
                *i += 1;
                block.extend(parse_scss_items(text, tokens, i)?);
                match tokens.get(*i) {
                    Some(close) if close.text() == Some("}") => {
                        block.push(close.clone());
                        *i += 1;
                    }
                    _ => return Err(error_at(text, open_offset, "unclosed block")),
                }
                items.push(Node::branch(
                    NodeKind::Rule,
                    vec![
                        Node::branch(NodeKind::Selector, statement),
                        Node::branch(NodeKind::Block, block),
                    ],
                ));
            }
            other => {
                let semi = match other {
                    Some(token) if token.text() == Some(";") => {
                        *i += 1;
                        Some(token.clone())
                    }
                    _ => None,
                };
                items.push(build_statement(statement, semi));
            }
        }
    }
}

/// Shape a braceless statement into a declaration (`prop: value;`) or an
/// at-rule style statement (`@import "x";`).
fn build_statement(statement: Vec<Node>, semi: Option<Node>) -> Node {
    let colon = top_level_colon(&statement);

    match colon {
        Some(idx) => {
            let mut value: Vec<Node> = statement[idx + 1..].to_vec();
            let mut children = Vec::new();
            let property: Vec<Node> = statement[..idx].to_vec();
            if !property.is_empty() {
                children.push(Node::branch(NodeKind::Property, property));
            }
            children.push(statement[idx].clone());
            if !value.is_empty() {
                children.push(Node::branch(NodeKind::Value, std::mem::take(&mut value)));
            }
            children.extend(semi);
            Node::branch(NodeKind::Declaration, children)
        }
        None => {
            let mut children = statement;
            children.extend(semi);
            Node::branch(NodeKind::AtRule, children)
        }
    }
}

/// Index of the first `:` outside parentheses, if any.
fn top_level_colon(tokens: &[Node]) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, token) in tokens.iter().enumerate() {
        match token.text() {
            Some("(") => depth += 1,
            Some(")") => depth = depth.saturating_sub(1),
            Some(":") if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// SASS (indentation-based) structure
// ---------------------------------------------------------------------------

struct SourceLine {
    start: usize,
    content_start: usize,
    content_end: usize,
    /// End of the line including its newline, if any.
    end: usize,
    indent: usize,
}

impl SourceLine {
    fn is_blank(&self) -> bool {
        self.content_start == self.content_end
    }
}

fn split_lines(text: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut start = 0;
    while start <= text.len() {
        if start == text.len() && start > 0 {
            break;
        }
        let rest = &text[start..];
        let line_len = rest.find('\n').unwrap_or(rest.len());
        let content = &rest[..line_len];
        let trimmed = content.trim_end();
        let indent = content.len() - content.trim_start().len();
        let content_end = if trimmed.is_empty() {
            // Whitespace-only lines stay a single Space leaf.
            start
        } else {
            start + content.len()
        };
        lines.push(SourceLine {
            start,
            content_start: if trimmed.is_empty() { start } else { start + indent },
            content_end,
            end: start + line_len + if line_len < rest.len() { 1 } else { 0 },
            indent,
        });
        if line_len == rest.len() {
            break;
        }
        start += line_len + 1;
    }
    lines
}

fn parse_sass(text: &str) -> Result<Node, ParseError> {
    let lines = split_lines(text);
    let mut i = 0;
    let children = parse_sass_level(text, &lines, &mut i, 0)?;
    Ok(Node::branch(NodeKind::Stylesheet, children))
}

fn parse_sass_level(
    text: &str,
    lines: &[SourceLine],
    i: &mut usize,
    indent: usize,
) -> Result<Vec<Node>, ParseError> {
    let mut nodes = Vec::new();

    while let Some(line) = lines.get(*i) {
        if line.is_blank() {
            if line.start < line.end {
                nodes.push(Node::leaf(
                    NodeKind::Space,
                    &text[line.start..line.end],
                    TextSpan::new(line.start, line.end),
                ));
            }
            *i += 1;
            continue;
        }
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(error_at(text, line.content_start, "unexpected indentation"));
        }

        let tokens = lex(text, line.content_start..line.content_end)?;
        if let Some(brace) = tokens
            .iter()
            .find(|t| matches!(t.text(), Some("{") | Some("}")))
        {
            return Err(error_at(
                text,
                brace.span.start,
                "braces are not valid in the indented syntax",
            ));
        }

        if line.indent > 0 {
            nodes.push(Node::leaf(
                NodeKind::Space,
                &text[line.start..line.content_start],
                TextSpan::new(line.start, line.content_start),
            ));
        }
        let newline = (line.content_end < line.end).then(|| {
            Node::leaf(
                NodeKind::Space,
                &text[line.content_end..line.end],
                TextSpan::new(line.content_end, line.end),
            )
        });
        *i += 1;

        // A line followed by deeper-indented lines opens a block.
        let child_indent = lines[*i..]
            .iter()
            .find(|l| !l.is_blank())
            .map(|l| l.indent)
            .filter(|&child| child > line.indent);

        match child_indent {
            Some(child) => {
                let mut block = Vec::new();
                block.extend(newline);
                block.extend(parse_sass_level(text, lines, i, child)?);
                nodes.push(Node::branch(
                    NodeKind::Rule,
                    vec![
                        Node::branch(NodeKind::Selector, tokens),
                        Node::branch(NodeKind::Block, block),
                    ],
                ));
            }
            None => {
                if tokens.iter().all(is_trivia) {
                    nodes.extend(tokens);
                } else {
                    nodes.push(build_statement(tokens, None));
                }
                nodes.extend(newline);
            }
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str, dialect: Dialect) {
        let tree = parse(text, dialect).unwrap();
        assert_eq!(tree.serialize(), text);
    }

    #[test]
    fn test_scss_roundtrip() {
        roundtrip("", Dialect::Scss);
        roundtrip("a { color: red; }\n", Dialect::Scss);
        roundtrip(".x,\n.y > .z {\n  margin: 0 auto;\n}\n", Dialect::Scss);
        roundtrip("// comment\na {}\n/* block */\n", Dialect::Scss);
        roundtrip("@import \"base\";\n@media (max-width: 10.5em) { a {} }\n", Dialect::Scss);
        roundtrip("$v: 10px;\na { width: calc(100% - #{$v}); }\n", Dialect::Scss);
        roundtrip("a { content: \"}{\"; }\n", Dialect::Scss);
        roundtrip("a { margin: 0 !important; }\n", Dialect::Scss);
    }

    #[test]
    fn test_sass_roundtrip() {
        roundtrip("", Dialect::Sass);
        roundtrip("a\n  color: red\n", Dialect::Sass);
        roundtrip("$v: 10px\n\n.x\n  margin: 0 auto\n  .y\n    top: 0\n", Dialect::Sass);
        roundtrip("// comment\na\n  color: red\n", Dialect::Sass);
        roundtrip("a\n  color: red", Dialect::Sass);
    }

    #[test]
    fn test_scss_structure() {
        let tree = parse("a { color: red; }", Dialect::Scss).unwrap();
        let rule = &tree.root().children()[0];
        assert_eq!(rule.kind, NodeKind::Rule);
        assert_eq!(rule.children()[0].kind, NodeKind::Selector);
        let block = &rule.children()[1];
        assert_eq!(block.kind, NodeKind::Block);
        let decl = block
            .children()
            .iter()
            .find(|n| n.kind == NodeKind::Declaration)
            .unwrap();
        assert!(decl.children().iter().any(|n| n.kind == NodeKind::Value));
    }

    #[test]
    fn test_scss_number_and_hex_tokens() {
        let tree = parse("a { margin: 0.50px; color: #FFAA00; }", Dialect::Scss).unwrap();
        let leaves = tree.leaves();
        assert!(leaves
            .iter()
            .any(|l| l.kind == NodeKind::Number && l.text() == Some("0.50")));
        assert!(leaves
            .iter()
            .any(|l| l.kind == NodeKind::HexColor && l.text() == Some("#FFAA00")));
    }

    #[test]
    fn test_scss_errors() {
        assert!(parse("a { color: red;", Dialect::Scss).is_err());
        assert!(parse("a } b {}", Dialect::Scss).is_err());
        assert!(parse("/* never closed", Dialect::Scss).is_err());
        assert!(parse("a { content: \"oops; }", Dialect::Scss).is_err());
    }

    #[test]
    fn test_sass_errors() {
        assert!(parse("a {\n  color: red\n}\n", Dialect::Sass).is_err());
        assert!(parse("  color: red\n", Dialect::Sass).is_err());
    }

    #[test]
    fn test_parse_error_location() {
        let err = parse("a {}\nb {\n", Dialect::Scss).unwrap_err();
        let location = err.location.unwrap();
        assert_eq!(location.row(), 2);
    }

    #[test]
    fn test_important_token() {
        let tree = parse("a { margin: 0 !important; }", Dialect::Scss).unwrap();
        assert!(tree.leaves().iter().any(|l| l.kind == NodeKind::Important));
        let tree = parse("$v: 1 !default;", Dialect::Scss).unwrap();
        assert!(tree.leaves().iter().all(|l| l.kind != NodeKind::Important));
    }
}
