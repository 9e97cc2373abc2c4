use crate::detect::Checker;
use crate::diagnostic::Violation;
use crate::registry::Resolver;
use crate::syntax::{Node, NodeKind, SyntaxTree};

pub(crate) const RULE: &str = "no-important";

pub(crate) fn check(node: &Node, checker: &mut Checker) {
    checker.report(RULE, "`!important` is not allowed", node.span);
}

pub(crate) struct NoImportant;

impl Resolver for NoImportant {
    fn rule(&self) -> &str {
        RULE
    }

    fn resolve(&self, tree: &mut SyntaxTree, violation: &Violation) -> anyhow::Result<bool> {
        let Some(parent) = tree.root_mut().find_leaf_parent_mut(violation.span) else {
            return Ok(false);
        };
        let children = parent.children_mut();
        let Some(idx) = children
            .iter()
            .position(|c| c.is_leaf() && c.span == violation.span)
        else {
            return Ok(false);
        };
        if children[idx].text() == Some("") {
            return Ok(false);
        }
        children[idx].set_text("");

        // Also swallow the whitespace that separated the flag from the value.
        if idx > 0 && children[idx - 1].kind == NodeKind::Space {
            let trimmed = children[idx - 1]
                .text()
                .unwrap_or("")
                .trim_end_matches([' ', '\t'])
                .to_string();
            children[idx - 1].set_text(trimmed);
        }
        Ok(true)
    }
}
