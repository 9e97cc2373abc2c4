use crate::detect::Checker;
use crate::diagnostic::Violation;
use crate::registry::Resolver;
use crate::syntax::{Node, SyntaxTree};

pub(crate) const RULE: &str = "hex-notation";

pub(crate) fn check(node: &Node, checker: &mut Checker) {
    let Some(text) = node.text() else { return };
    if text.bytes().any(|b| b.is_ascii_uppercase()) {
        checker.report(
            RULE,
            format!("hex color `{text}` should be written in lowercase"),
            node.span,
        );
    }
}

pub(crate) struct HexNotation;

impl Resolver for HexNotation {
    fn rule(&self) -> &str {
        RULE
    }

    fn resolve(&self, tree: &mut SyntaxTree, violation: &Violation) -> anyhow::Result<bool> {
        let Some(leaf) = tree.root_mut().find_leaf_mut(violation.span) else {
            return Ok(false);
        };
        let Some(text) = leaf.text() else { return Ok(false) };
        if !text.bytes().any(|b| b.is_ascii_uppercase()) {
            return Ok(false);
        }
        let fixed = text.to_ascii_lowercase();
        leaf.set_text(fixed);
        Ok(true)
    }
}
