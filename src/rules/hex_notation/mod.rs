pub(crate) mod hex_notation;

pub(crate) use hex_notation::{HexNotation, RULE, check};

#[cfg(test)]
mod tests {
    use super::RULE;
    use crate::syntax::Dialect;
    use crate::utils_test::*;

    #[test]
    fn test_lint_hex_notation() {
        expect_lint("a { color: #FFAA00; }", Dialect::Scss, RULE);
        expect_lint("a { color: #FfAa00; }", Dialect::Scss, RULE);
        expect_lint("a { border-color: #ABC; }", Dialect::Scss, RULE);
        expect_lint("a\n  color: #DEF\n", Dialect::Sass, RULE);
    }

    #[test]
    fn test_no_lint_hex_notation() {
        expect_no_lint("a { color: #ffaa00; }", Dialect::Scss, RULE);
        expect_no_lint("a { color: red; }", Dialect::Scss, RULE);
        // Id selectors are not colors, even when they look like hex digits.
        expect_no_lint("#ABC { color: #abc; }", Dialect::Scss, RULE);
    }

    #[test]
    fn test_fix_output() {
        use insta::assert_snapshot;

        assert_snapshot!(
            get_fixed_text("a { color: #FFAA00; border-color: #AbC; }", Dialect::Scss, RULE),
            @"a { color: #ffaa00; border-color: #abc; }"
        );
    }
}
