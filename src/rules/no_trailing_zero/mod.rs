pub(crate) mod no_trailing_zero;

pub(crate) use no_trailing_zero::{NoTrailingZero, RULE, check};

#[cfg(test)]
mod tests {
    use super::RULE;
    use crate::syntax::Dialect;
    use crate::utils_test::*;

    #[test]
    fn test_lint_no_trailing_zero() {
        expect_lint("a { margin: 0.0px; }", Dialect::Scss, RULE);
        expect_lint("a { margin: 0.50px; }", Dialect::Scss, RULE);
        expect_lint("a { opacity: .50; }", Dialect::Scss, RULE);
        expect_lint("a\n  margin: 1.10px\n", Dialect::Sass, RULE);
    }

    #[test]
    fn test_no_lint_no_trailing_zero() {
        expect_no_lint("a { margin: 0.5px; }", Dialect::Scss, RULE);
        expect_no_lint("a { margin: 10px; }", Dialect::Scss, RULE);
        expect_no_lint("a { margin: 100px; }", Dialect::Scss, RULE);
        // Numbers in selectors are not value positions.
        expect_no_lint(".mod-1\\.50 { color: red; }", Dialect::Scss, RULE);
    }

    #[test]
    fn test_fix_output() {
        use insta::assert_snapshot;

        assert_snapshot!(
            get_fixed_text("a { margin: 0.0px; }", Dialect::Scss, RULE),
            @"a { margin: 0px; }"
        );
        assert_snapshot!(
            get_fixed_text("a { margin: 0.50px 1.10em; }", Dialect::Scss, RULE),
            @"a { margin: 0.5px 1.1em; }"
        );
        assert_eq!(
            get_fixed_text("a\n  opacity: .50\n", Dialect::Sass, RULE),
            "a\n  opacity: .5\n"
        );
    }

    #[test]
    fn test_fix_is_recorded() {
        let resolution = resolve_one("a { margin: 0.0px; }", Dialect::Scss, RULE);
        assert_eq!(resolution.applied_fixes, vec![RULE.to_string()]);
        assert!(resolution.unresolved_violations.is_empty());
        assert!(resolution.fixed_text.contains("margin: 0px;"));
    }
}
