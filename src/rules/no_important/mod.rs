pub(crate) mod no_important;

pub(crate) use no_important::{NoImportant, RULE, check};

#[cfg(test)]
mod tests {
    use super::RULE;
    use crate::syntax::Dialect;
    use crate::utils_test::*;

    #[test]
    fn test_lint_no_important() {
        expect_lint("a { margin: 0 !important; }", Dialect::Scss, RULE);
        expect_lint("a { margin: 0 ! important; }", Dialect::Scss, RULE);
        expect_lint("a { margin: 0 !IMPORTANT; }", Dialect::Scss, RULE);
        expect_lint("a\n  margin: 0 !important\n", Dialect::Sass, RULE);
    }

    #[test]
    fn test_no_lint_no_important() {
        expect_no_lint("a { margin: 0; }", Dialect::Scss, RULE);
        expect_no_lint("$v: 1 !default;", Dialect::Scss, RULE);
        expect_no_lint("a { content: \"!important\"; }", Dialect::Scss, RULE);
        expect_no_lint("// !important\na { margin: 0; }", Dialect::Scss, RULE);
    }

    #[test]
    fn test_fix_output() {
        use insta::assert_snapshot;

        assert_snapshot!(
            get_fixed_text("a { margin: 0 !important; }", Dialect::Scss, RULE),
            @"a { margin: 0; }"
        );
        assert_snapshot!(
            get_fixed_text("a { margin: 0 ! important; top: 1px !important; }", Dialect::Scss, RULE),
            @"a { margin: 0; top: 1px; }"
        );
    }
}
