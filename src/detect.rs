//! Violation detection: runs a ruleset against a syntax tree and returns an
//! ordered list of violations.
//!
//! The order is deterministic and stable across repeated calls on an
//! unchanged tree (sorted by span start, then rule id), which the resolution
//! engine relies on for reproducible iteration.

use serde_json::Value;

use crate::diagnostic::Violation;
use crate::location::LineIndex;
use crate::rules;
use crate::ruleset::Ruleset;
use crate::syntax::{Node, NodeKind, SyntaxTree, TextSpan};

// The object that collects violations during one detection pass. One per
// analyzed tree.
pub struct Checker<'a> {
    ruleset: &'a Ruleset,
    index: LineIndex,
    violations: Vec<Violation>,
}

impl<'a> Checker<'a> {
    fn new(ruleset: &'a Ruleset, index: LineIndex) -> Self {
        Self { ruleset, index, violations: Vec::new() }
    }

    pub(crate) fn is_rule_enabled(&self, rule: &str) -> bool {
        self.ruleset.enabled(rule)
    }

    #[allow(dead_code)]
    pub(crate) fn options(&self, rule: &str) -> Option<&Value> {
        self.ruleset.options(rule)
    }

    pub(crate) fn report(&mut self, rule: &str, message: impl Into<String>, span: TextSpan) {
        self.violations.push(Violation {
            rule: rule.to_string(),
            message: message.into(),
            severity: self.ruleset.severity(rule),
            location: self.index.location(span.start),
            span,
        });
    }
}

/// Detect all violations of `ruleset` in `tree`.
pub fn detect(tree: &SyntaxTree, ruleset: &Ruleset) -> Vec<Violation> {
    let text = tree.serialize();
    let mut checker = Checker::new(ruleset, LineIndex::new(&text));

    walk(tree.root(), false, &mut checker);

    // Trailing whitespace needs lookahead over adjacent leaves, so it runs as
    // a separate ordered scan rather than through the recursive dispatch.
    if checker.is_rule_enabled(rules::no_trailing_whitespace::RULE) {
        let leaves = tree.leaves();
        for (i, leaf) in leaves.iter().enumerate() {
            rules::no_trailing_whitespace::check(leaf, leaves.get(i + 1).copied(), &mut checker);
        }
    }

    let mut violations = checker.violations;
    violations.sort_by(|a, b| {
        (a.span.start, a.rule.as_str()).cmp(&(b.span.start, b.rule.as_str()))
    });
    violations
}

// Dispatches each leaf token to the rules interested in its kind. `in_value`
// tracks whether we are inside a declaration value or at-rule prelude, where
// numbers and colors have their CSS meaning (as opposed to selectors, where
// `#abc` is an id).
fn walk(node: &Node, in_value: bool, checker: &mut Checker) {
    if node.is_leaf() {
        match node.kind {
            NodeKind::Number if in_value => {
                if checker.is_rule_enabled(rules::no_trailing_zero::RULE) {
                    rules::no_trailing_zero::check(node, checker);
                }
            }
            NodeKind::HexColor if in_value => {
                if checker.is_rule_enabled(rules::hex_notation::RULE) {
                    rules::hex_notation::check(node, checker);
                }
            }
            NodeKind::Important => {
                if checker.is_rule_enabled(rules::no_important::RULE) {
                    rules::no_important::check(node, checker);
                }
            }
            NodeKind::CommentMulti => {
                if checker.is_rule_enabled(rules::no_css_comments::RULE) {
                    rules::no_css_comments::check(node, checker);
                }
            }
            _ => {}
        }
        return;
    }

    let in_value = in_value || matches!(node.kind, NodeKind::Value | NodeKind::AtRule);
    for child in node.children() {
        walk(child, in_value, checker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::syntax::Dialect;
    use serde_json::json;

    fn detect_in(text: &str, ruleset: &Ruleset) -> Vec<Violation> {
        let tree = parse(text, Dialect::Scss).unwrap();
        detect(&tree, ruleset)
    }

    #[test]
    fn test_detection_is_deterministic() {
        let ruleset = Ruleset::defaults();
        let text = "a { margin: 0.50px !important; color: #FFAA00; }\n";
        let first = detect_in(text, &ruleset);
        let second = detect_in(text, &ruleset);
        assert_eq!(first, second);
        assert!(!first.is_empty());
        // Sorted by position.
        for pair in first.windows(2) {
            assert!(pair[0].span.start <= pair[1].span.start);
        }
    }

    #[test]
    fn test_only_configured_rules_fire() {
        let ruleset = Ruleset::new().with("no-important", json!(1));
        let violations = detect_in("a { margin: 0.50px !important; }", &ruleset);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "no-important");
    }

    #[test]
    fn test_selector_hex_is_not_a_color() {
        let ruleset = Ruleset::defaults();
        let violations = detect_in("#ABC { color: #abc; }", &ruleset);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_violation_location() {
        let ruleset = Ruleset::new().with("no-trailing-zero", json!(2));
        let violations = detect_in("a {\n  margin: 0.50px;\n}\n", &ruleset);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.row(), 2);
        assert_eq!(violations[0].severity, crate::diagnostic::Severity::Error);
    }
}
