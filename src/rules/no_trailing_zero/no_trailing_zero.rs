use crate::detect::Checker;
use crate::diagnostic::Violation;
use crate::registry::Resolver;
use crate::syntax::{Node, SyntaxTree};

pub(crate) const RULE: &str = "no-trailing-zero";

pub(crate) fn check(node: &Node, checker: &mut Checker) {
    let Some(text) = node.text() else { return };
    if has_trailing_zero(text) {
        checker.report(RULE, format!("number `{text}` has trailing zeros"), node.span);
    }
}

fn has_trailing_zero(text: &str) -> bool {
    text.contains('.') && text.ends_with('0')
}

fn strip_trailing_zeros(text: &str) -> String {
    let stripped = text.trim_end_matches('0').trim_end_matches('.');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

pub(crate) struct NoTrailingZero;

impl Resolver for NoTrailingZero {
    fn rule(&self) -> &str {
        RULE
    }

    fn resolve(&self, tree: &mut SyntaxTree, violation: &Violation) -> anyhow::Result<bool> {
        let Some(leaf) = tree.root_mut().find_leaf_mut(violation.span) else {
            return Ok(false);
        };
        let Some(text) = leaf.text() else { return Ok(false) };
        if !has_trailing_zero(text) {
            return Ok(false);
        }
        let fixed = strip_trailing_zeros(text);
        leaf.set_text(fixed);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::strip_trailing_zeros;

    #[test]
    fn test_strip() {
        assert_eq!(strip_trailing_zeros("0.0"), "0");
        assert_eq!(strip_trailing_zeros("0.50"), "0.5");
        assert_eq!(strip_trailing_zeros(".50"), ".5");
        assert_eq!(strip_trailing_zeros(".0"), "0");
        assert_eq!(strip_trailing_zeros("1.100"), "1.1");
    }
}
