//! Lint-resolve pipeline for SCSS and indented-syntax SASS stylesheets.
//!
//! The pipeline parses each stylesheet into a lossless syntax tree, detects
//! rule violations, applies the registered resolvers until the file reaches a
//! fixed point, and yields one [`engine::Resolution`] per file. Nothing is
//! written back to disk; callers decide what to do with the fixed text.

pub mod config;
pub mod detect;
pub mod diagnostic;
pub mod driver;
pub mod engine;
pub mod error;
pub mod location;
pub mod parse;
pub mod registry;
pub mod rules;
pub mod ruleset;
pub mod syntax;
