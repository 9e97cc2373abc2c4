pub(crate) mod no_css_comments;

pub(crate) use no_css_comments::{NoCssComments, RULE, check};

#[cfg(test)]
mod tests {
    use super::RULE;
    use crate::syntax::Dialect;
    use crate::utils_test::*;

    #[test]
    fn test_lint_no_css_comments() {
        expect_lint("/* loud */\na { color: red; }", Dialect::Scss, RULE);
        expect_lint("a { color: red; /* why */ }", Dialect::Scss, RULE);
    }

    #[test]
    fn test_no_lint_no_css_comments() {
        expect_no_lint("// silent\na { color: red; }", Dialect::Scss, RULE);
        expect_no_lint("/*! preserved banner */\na {}", Dialect::Scss, RULE);
        expect_no_lint("a { content: \"/* not a comment */\"; }", Dialect::Scss, RULE);
    }

    #[test]
    fn test_fix_output() {
        assert_eq!(
            get_fixed_text("/* loud */\na {}\n", Dialect::Scss, RULE),
            "// loud\na {}\n"
        );
        assert_eq!(
            get_fixed_text("a {\n  color: red; /* why */\n}\n", Dialect::Scss, RULE),
            "a {\n  color: red; // why\n}\n"
        );
        assert_eq!(
            get_fixed_text("/*\n * block\n */\na {}\n", Dialect::Scss, RULE),
            "//\n// block\n//\na {}\n"
        );
    }

    #[test]
    fn test_unsafe_rewrite_is_left_unresolved() {
        // Converting to `//` here would swallow the closing brace, so the
        // resolver declines and the violation surfaces as unresolved.
        let resolution = resolve_one("a { color: red; /* why */ }", Dialect::Scss, RULE);
        assert!(resolution.applied_fixes.is_empty());
        assert_eq!(resolution.fixed_text, resolution.original_text);
        assert_eq!(resolution.unresolved_violations.len(), 1);
        assert_eq!(resolution.unresolved_violations[0].rule, RULE);
    }
}
