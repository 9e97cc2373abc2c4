pub(crate) mod hex_notation;
pub(crate) mod no_css_comments;
pub(crate) mod no_important;
pub(crate) mod no_trailing_whitespace;
pub(crate) mod no_trailing_zero;

use crate::registry::Resolver;

/// Every built-in rule id, in registry order.
pub const ALL_RULES: &[&str] = &[
    hex_notation::RULE,
    no_css_comments::RULE,
    no_important::RULE,
    no_trailing_whitespace::RULE,
    no_trailing_zero::RULE,
];

/// The built-in resolver for a rule id, if one exists.
pub fn builtin_resolver(rule: &str) -> Option<Box<dyn Resolver>> {
    match rule {
        hex_notation::RULE => Some(Box::new(hex_notation::HexNotation)),
        no_css_comments::RULE => Some(Box::new(no_css_comments::NoCssComments)),
        no_important::RULE => Some(Box::new(no_important::NoImportant)),
        no_trailing_whitespace::RULE => {
            Some(Box::new(no_trailing_whitespace::NoTrailingWhitespace))
        }
        no_trailing_zero::RULE => Some(Box::new(no_trailing_zero::NoTrailingZero)),
        _ => None,
    }
}
