use crate::detect::Checker;
use crate::diagnostic::Violation;
use crate::registry::Resolver;
use crate::syntax::{Node, NodeKind, SyntaxTree};

pub(crate) const RULE: &str = "no-css-comments";

pub(crate) fn check(node: &Node, checker: &mut Checker) {
    let Some(text) = node.text() else { return };
    // `/*!` comments are preserved by minifiers on purpose; leave them be.
    if text.starts_with("/*!") {
        return;
    }
    checker.report(
        RULE,
        "CSS comments are emitted into the compiled output, use silent `//` comments",
        node.span,
    );
}

/// `/* ... */` rewritten as one `//` line per comment line.
fn to_silent(text: &str) -> String {
    let inner = text
        .strip_prefix("/*")
        .and_then(|t| t.strip_suffix("*/"))
        .unwrap_or(text);
    inner
        .lines()
        .map(|line| {
            // Drop the decorative continuation column of block comments.
            let line = line.trim_end();
            let line = line.strip_prefix(" *").unwrap_or(line);
            format!("//{}", line.trim_end())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) struct NoCssComments;

impl Resolver for NoCssComments {
    fn rule(&self) -> &str {
        RULE
    }

    fn resolve(&self, tree: &mut SyntaxTree, violation: &Violation) -> anyhow::Result<bool> {
        // A `//` comment runs to the end of the line, so the rewrite is only
        // safe when nothing but whitespace follows the comment on its line.
        // Otherwise the violation is left for a human.
        if !rest_of_line_is_blank(tree, violation) {
            return Ok(false);
        }

        let Some(leaf) = tree.root_mut().find_leaf_mut(violation.span) else {
            return Ok(false);
        };
        let Some(text) = leaf.text() else { return Ok(false) };
        if !text.starts_with("/*") || text.starts_with("/*!") {
            return Ok(false);
        }
        let fixed = to_silent(text);
        leaf.set_text(fixed);
        Ok(true)
    }
}

fn rest_of_line_is_blank(tree: &SyntaxTree, violation: &Violation) -> bool {
    let leaves = tree.leaves();
    let Some(idx) = leaves.iter().position(|l| l.span == violation.span) else {
        return false;
    };
    for leaf in &leaves[idx + 1..] {
        let text = leaf.text().unwrap_or("");
        if text.starts_with('\n') {
            return true;
        }
        if leaf.kind == NodeKind::Space && text.chars().all(|c| matches!(c, ' ' | '\t')) {
            continue;
        }
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::to_silent;

    #[test]
    fn test_to_silent() {
        assert_eq!(to_silent("/* hello */"), "// hello");
        assert_eq!(to_silent("/*no spaces*/"), "//no spaces");
        assert_eq!(to_silent("/* a\n * b\n */"), "// a\n// b\n//");
    }
}
