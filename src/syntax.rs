use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One of the two stylesheet syntaxes: brace-based `scss` or
/// indentation-based `sass`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Scss,
    Sass,
}

impl Dialect {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scss => "scss",
            Self::Sass => "sass",
        }
    }

    pub const ALL: &'static [Dialect] = &[Dialect::Scss, Dialect::Sass];

    /// Dialect inferred from a file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("scss") => Some(Self::Scss),
            Some("sass") => Some(Self::Sass),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scss" => Ok(Self::Scss),
            "sass" => Ok(Self::Sass),
            _ => Err(ConfigError::UnknownDialect(s.to_string())),
        }
    }
}

/// Byte range of a node in the text it was parsed from.
///
/// Spans are assigned at parse time and act as stable node identifiers for
/// the lifetime of one tree. Mutating a node's text does not move its span;
/// the engine re-parses between passes, so spans are always fresh when
/// violations are detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Branch nodes
    Stylesheet,
    Rule,
    Selector,
    Block,
    Declaration,
    Property,
    Value,
    AtRule,
    // Leaf tokens
    Number,
    Ident,
    HexColor,
    StringLit,
    Important,
    Space,
    CommentMulti,
    CommentSingle,
    Punct,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NodeContent {
    Leaf(String),
    Branch(Vec<Node>),
}

/// A node of the stylesheet tree, either a leaf token carrying text or a
/// branch over child nodes. Serialization is the in-order concatenation of
/// leaf texts, so a tree that was not mutated serializes back to the exact
/// text it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: TextSpan,
    content: NodeContent,
}

impl Node {
    pub fn leaf(kind: NodeKind, text: impl Into<String>, span: TextSpan) -> Self {
        Self { kind, span, content: NodeContent::Leaf(text.into()) }
    }

    pub fn branch(kind: NodeKind, children: Vec<Node>) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => TextSpan::new(first.span.start, last.span.end),
            _ => TextSpan::default(),
        };
        Self { kind, span, content: NodeContent::Branch(children) }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Leaf(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Leaf(text) => Some(text),
            NodeContent::Branch(_) => None,
        }
    }

    /// Replace the text of a leaf node. No-op on branch nodes.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let NodeContent::Leaf(current) = &mut self.content {
            *current = text.into();
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.content {
            NodeContent::Branch(children) => children,
            NodeContent::Leaf(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        match &mut self.content {
            NodeContent::Branch(children) => children,
            NodeContent::Leaf(_) => {
                unreachable!("children_mut() called on a leaf node")
            }
        }
    }

    fn write_to(&self, out: &mut String) {
        match &self.content {
            NodeContent::Leaf(text) => out.push_str(text),
            NodeContent::Branch(children) => {
                for child in children {
                    child.write_to(out);
                }
            }
        }
    }

    /// Leaf with exactly the given span, if any.
    pub fn find_leaf_mut(&mut self, span: TextSpan) -> Option<&mut Node> {
        if matches!(self.content, NodeContent::Leaf(_)) {
            return (self.span == span).then_some(self);
        }
        let NodeContent::Branch(children) = &mut self.content else {
            unreachable!()
        };
        children
            .iter_mut()
            .filter(|c| c.span.start <= span.start && span.end <= c.span.end)
            .find_map(|c| c.find_leaf_mut(span))
    }

    /// Branch whose direct child is the leaf with the given span.
    pub fn find_leaf_parent_mut(&mut self, span: TextSpan) -> Option<&mut Node> {
        let NodeContent::Branch(children) = &self.content else {
            return None;
        };
        if children.iter().any(|c| c.is_leaf() && c.span == span) {
            return Some(self);
        }
        self.children_mut()
            .iter_mut()
            .filter(|c| c.span.start <= span.start && span.end <= c.span.end)
            .find_map(|c| c.find_leaf_parent_mut(span))
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match &self.content {
            NodeContent::Leaf(_) => out.push(self),
            NodeContent::Branch(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// A parsed stylesheet, tagged with the dialect it was parsed under.
///
/// Owned exclusively by the resolution engine while one file is in flight;
/// resolvers mutate it in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxTree {
    dialect: Dialect,
    root: Node,
}

impl SyntaxTree {
    pub fn new(dialect: Dialect, root: Node) -> Self {
        Self { dialect, root }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Re-serialize the tree to text. Total over any tree produced by the
    /// parser or by a well-behaved resolver.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.root.write_to(&mut out);
        out
    }

    /// All leaf tokens in document order.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.root.collect_leaves(&mut out);
        out
    }
}
