use std::sync::LazyLock;

use regex::Regex;

use crate::detect::Checker;
use crate::diagnostic::Violation;
use crate::registry::Resolver;
use crate::syntax::{Node, SyntaxTree};

pub(crate) const RULE: &str = "no-trailing-whitespace";

static TRAILING_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").unwrap_or_else(|e| panic!("invalid regex: {e}")));

/// `next` is the leaf that follows `node` in document order, if any. A
/// violation is either a blank run before a newline inside one leaf, or a
/// leaf ending in blanks whose successor starts the next line.
pub(crate) fn check(node: &Node, next: Option<&Node>, checker: &mut Checker) {
    let Some(text) = node.text() else { return };
    let internal = TRAILING_RUN.is_match(text);
    let at_line_end = text.ends_with([' ', '\t'])
        && next.is_none_or(|n| n.text().is_some_and(|t| t.starts_with('\n')));
    if internal || at_line_end {
        checker.report(RULE, "trailing whitespace", node.span);
    }
}

pub(crate) struct NoTrailingWhitespace;

impl Resolver for NoTrailingWhitespace {
    fn rule(&self) -> &str {
        RULE
    }

    fn resolve(&self, tree: &mut SyntaxTree, violation: &Violation) -> anyhow::Result<bool> {
        // Look ahead before mutating: trimming the end of the leaf is only
        // correct when it actually sits at the end of a line. A leaf like
        // "\n  " ends in blanks too, but those are indentation.
        let at_line_end = {
            let leaves = tree.leaves();
            match leaves.iter().position(|l| l.span == violation.span) {
                Some(idx) => {
                    leaves[idx].text().is_some_and(|t| t.ends_with([' ', '\t']))
                        && leaves
                            .get(idx + 1)
                            .is_none_or(|n| n.text().is_some_and(|t| t.starts_with('\n')))
                }
                None => return Ok(false),
            }
        };

        let Some(leaf) = tree.root_mut().find_leaf_mut(violation.span) else {
            return Ok(false);
        };
        let Some(text) = leaf.text() else { return Ok(false) };
        let mut fixed = TRAILING_RUN.replace_all(text, "\n").into_owned();
        if at_line_end {
            fixed.truncate(fixed.trim_end_matches([' ', '\t']).len());
        }
        if fixed == text {
            return Ok(false);
        }
        leaf.set_text(fixed);
        Ok(true)
    }
}
