pub(crate) mod no_trailing_whitespace;

pub(crate) use no_trailing_whitespace::{NoTrailingWhitespace, RULE, check};
