//! The resolution engine: the per-file state machine that composes parsing,
//! detection and resolution into one `Resolution`.
//!
//! Per file: `Parsed -> Detecting -> Resolving -> Reparsing -> Stable | Capped`.
//! Detection and resolution alternate until no violations remain, a fixed
//! point is reached (the same violations recur with no reduction), or the
//! pass cap triggers. The cap is a correctness requirement, not a precaution:
//! resolvers are user-pluggable and a buggy one can re-introduce the very
//! violation it was meant to fix, so termination must hold regardless of
//! resolver behavior.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::detect::detect;
use crate::diagnostic::Violation;
use crate::error::ResolveError;
use crate::parse::parse;
use crate::registry::ResolverRegistry;
use crate::ruleset::Ruleset;
use crate::syntax::Dialect;

/// Upper bound on detect/resolve passes per file. Exceeding it yields a
/// `Capped` resolution with the remaining violations reported unresolved.
pub const MAX_PASSES: usize = 8;

/// The packaged outcome of processing one file through the pipeline.
/// Immutable once yielded.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub source_path: PathBuf,
    pub original_text: String,
    pub fixed_text: String,
    /// Rule ids of fixes that were applied, in application order.
    pub applied_fixes: Vec<String>,
    /// Violations still present when the engine stopped.
    pub unresolved_violations: Vec<Violation>,
    /// True when the pass cap stopped the engine before a fixed point.
    pub capped: bool,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.applied_fixes.is_empty() && self.unresolved_violations.is_empty()
    }
}

enum State {
    Detecting,
    Resolving(Vec<Violation>),
    Reparsing,
    Stable(Vec<Violation>),
    Capped(Vec<Violation>),
}

/// Run the detect/resolve loop over one file's text.
///
/// A parse failure of the original text is fatal for this file. A parse
/// failure after a resolver ran is that resolver's contract violation and is
/// reported as [`ResolveError::Contract`].
pub fn resolve_source(
    path: &Path,
    text: &str,
    dialect: Dialect,
    ruleset: &Ruleset,
    registry: &ResolverRegistry,
) -> Result<Resolution, ResolveError> {
    // Parsed
    let mut tree = parse(text, dialect).map_err(|e| ResolveError::Parse(e.with_path(path)))?;

    let mut current = text.to_string();
    let mut applied: Vec<String> = Vec::new();
    let mut previous_counts: Option<BTreeMap<String, usize>> = None;
    let mut passes = 0usize;
    let mut state = State::Detecting;

    let (unresolved, capped) = loop {
        match state {
            State::Detecting => {
                let violations = detect(&tree, ruleset);
                if violations.is_empty() {
                    state = State::Stable(violations);
                    continue;
                }
                let counts = rule_counts(&violations);
                if previous_counts.as_ref() == Some(&counts) {
                    // Fixed point: the same violations recur with no
                    // reduction in count.
                    state = State::Stable(violations);
                    continue;
                }
                if passes >= MAX_PASSES {
                    state = State::Capped(violations);
                    continue;
                }
                previous_counts = Some(counts);
                passes += 1;
                state = State::Resolving(violations);
            }
            State::Resolving(violations) => {
                let mut ordered: Vec<&Violation> = violations.iter().collect();
                // Detection order, grouped by descending resolver priority.
                ordered.sort_by_key(|v| Reverse(registry.priority(&v.rule)));

                for violation in ordered {
                    let Some(resolver) = registry.lookup(&violation.rule) else {
                        continue;
                    };
                    let changed =
                        resolver
                            .resolve(&mut tree, violation)
                            .map_err(|e| ResolveError::Resolver {
                                path: path.to_path_buf(),
                                rule: violation.rule.clone(),
                                source: e,
                            })?;
                    if !changed {
                        continue;
                    }
                    // The resolver contract: the mutated tree must still
                    // serialize to parseable text.
                    let candidate = tree.serialize();
                    if let Err(e) = parse(&candidate, dialect) {
                        return Err(ResolveError::Contract {
                            path: path.to_path_buf(),
                            rule: violation.rule.clone(),
                            source: e.with_path(path),
                        });
                    }
                    tracing::debug!(
                        path = %path.display(),
                        rule = %violation.rule,
                        row = violation.location.row(),
                        "applied fix"
                    );
                    applied.push(violation.rule.clone());
                }
                state = State::Reparsing;
            }
            State::Reparsing => {
                // Re-parse so the next detection pass sees fresh spans.
                current = tree.serialize();
                tree = parse(&current, dialect)
                    .map_err(|e| ResolveError::Parse(e.with_path(path)))?;
                state = State::Detecting;
            }
            State::Stable(violations) => break (violations, false),
            State::Capped(violations) => {
                tracing::warn!(
                    path = %path.display(),
                    passes = MAX_PASSES,
                    remaining = violations.len(),
                    "pass cap reached before a fixed point, reporting remaining violations unresolved"
                );
                break (violations, true);
            }
        }
    };

    for violation in &unresolved {
        tracing::info!(path = %path.display(), violation = %violation, "unresolved violation");
    }

    Ok(Resolution {
        source_path: path.to_path_buf(),
        original_text: text.to_string(),
        fixed_text: current,
        applied_fixes: applied,
        unresolved_violations: unresolved,
        capped,
    })
}

fn rule_counts(violations: &[Violation]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for violation in violations {
        *counts.entry(violation.rule.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Resolver;
    use crate::syntax::SyntaxTree;
    use crate::utils_test::*;
    use serde_json::json;

    #[test]
    fn test_clean_file_roundtrips_exactly() {
        let text = "a {\n  color: red;\n}\n";
        let resolution = resolve_one(text, Dialect::Scss, "no-important");
        assert!(resolution.is_clean());
        assert_eq!(resolution.fixed_text, text);
        assert_eq!(resolution.original_text, text);
        assert!(!resolution.capped);
    }

    #[test]
    fn test_fixing_is_idempotent() {
        let text = "a { margin: 0.50px !important; }\n";
        let rules = &["no-trailing-zero", "no-important"];
        let first = resolve_all_rules(text, Dialect::Scss, rules);
        assert!(!first.applied_fixes.is_empty());

        let second = resolve_all_rules(&first.fixed_text, Dialect::Scss, rules);
        assert!(second.applied_fixes.is_empty());
        assert_eq!(second.fixed_text, first.fixed_text);
    }

    #[test]
    fn test_determinism() {
        let text = "a { margin: 0.50px; color: #FFAA00 !important; }\n";
        let rules = &["no-trailing-zero", "hex-notation", "no-important"];
        let first = resolve_all_rules(text, Dialect::Scss, rules);
        let second = resolve_all_rules(text, Dialect::Scss, rules);
        assert_eq!(first.fixed_text, second.fixed_text);
        assert_eq!(first.applied_fixes, second.applied_fixes);
    }

    #[test]
    fn test_unregistered_rule_surfaces_as_unresolved() {
        let ruleset = Ruleset::new()
            .with("no-important", json!(1))
            .with("no-trailing-zero", json!(1));
        // Only no-trailing-zero gets a resolver.
        let registry = registry_for(&["no-trailing-zero"]);
        let resolution = resolve_source(
            Path::new("test.scss"),
            "a { margin: 0.0px !important; }\n",
            Dialect::Scss,
            &ruleset,
            &registry,
        )
        .unwrap();

        assert_eq!(resolution.applied_fixes, vec!["no-trailing-zero".to_string()]);
        assert_eq!(resolution.unresolved_violations.len(), 1);
        assert_eq!(resolution.unresolved_violations[0].rule, "no-important");
        assert!(!resolution.capped);
    }

    #[test]
    fn test_parse_error_is_fatal_for_the_file() {
        let registry = registry_for(&["no-important"]);
        let err = resolve_source(
            Path::new("broken.scss"),
            "a { color: red;",
            Dialect::Scss,
            &Ruleset::defaults(),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
        assert_eq!(err.path(), Some(Path::new("broken.scss")));
    }

    /// A deliberately broken resolver that keeps the violation alive by
    /// rewriting the number to another trailing-zero spelling.
    struct SelfDefeating;

    impl Resolver for SelfDefeating {
        fn rule(&self) -> &str {
            "no-trailing-zero"
        }

        fn resolve(
            &self,
            tree: &mut SyntaxTree,
            violation: &Violation,
        ) -> anyhow::Result<bool> {
            if let Some(leaf) = tree.root_mut().find_leaf_mut(violation.span) {
                let longer = format!("{}0", leaf.text().unwrap_or("0.0"));
                leaf.set_text(longer);
            }
            Ok(true)
        }
    }

    #[test]
    fn test_termination_with_violation_reintroducing_resolver() {
        let mut registry = ResolverRegistry::new();
        registry.register(1, Box::new(SelfDefeating)).unwrap();
        let ruleset = Ruleset::new().with("no-trailing-zero", json!(1));

        let resolution = resolve_source(
            Path::new("test.scss"),
            "a { margin: 0.50px; }\n",
            Dialect::Scss,
            &ruleset,
            &registry,
        )
        .unwrap();

        // The engine must emit a resolution rather than loop forever; the
        // violation it could not eliminate is reported unresolved.
        assert!(!resolution.unresolved_violations.is_empty());
        assert_eq!(resolution.unresolved_violations[0].rule, "no-trailing-zero");
    }

    /// A resolver that corrupts the tree: it rewrites the number into an
    /// unmatched opening brace.
    struct TreeBreaker;

    impl Resolver for TreeBreaker {
        fn rule(&self) -> &str {
            "no-trailing-zero"
        }

        fn resolve(
            &self,
            tree: &mut SyntaxTree,
            violation: &Violation,
        ) -> anyhow::Result<bool> {
            if let Some(leaf) = tree.root_mut().find_leaf_mut(violation.span) {
                leaf.set_text("{");
            }
            Ok(true)
        }
    }

    #[test]
    fn test_resolver_contract_violation_is_reported() {
        let mut registry = ResolverRegistry::new();
        registry.register(1, Box::new(TreeBreaker)).unwrap();
        let ruleset = Ruleset::new().with("no-trailing-zero", json!(1));

        let err = resolve_source(
            Path::new("test.scss"),
            "a { margin: 0.50px; }\n",
            Dialect::Scss,
            &ruleset,
            &registry,
        )
        .unwrap_err();

        match err {
            ResolveError::Contract { path, rule, .. } => {
                assert_eq!(path, Path::new("test.scss"));
                assert_eq!(rule, "no-trailing-zero");
            }
            other => panic!("expected a contract violation, got {other:?}"),
        }
    }

    #[test]
    fn test_priority_orders_fixes_within_a_pass() {
        let mut registry = ResolverRegistry::new();
        registry
            .register(1, crate::rules::builtin_resolver("no-trailing-zero").unwrap())
            .unwrap();
        registry
            .register(5, crate::rules::builtin_resolver("no-important").unwrap())
            .unwrap();
        let ruleset = Ruleset::new()
            .with("no-trailing-zero", json!(1))
            .with("no-important", json!(1));

        let resolution = resolve_source(
            Path::new("test.scss"),
            "a { margin: 0.50px !important; }\n",
            Dialect::Scss,
            &ruleset,
            &registry,
        )
        .unwrap();

        assert_eq!(
            resolution.applied_fixes,
            vec!["no-important".to_string(), "no-trailing-zero".to_string()]
        );
        assert_eq!(resolution.fixed_text, "a { margin: 0.5px; }\n");
    }
}
