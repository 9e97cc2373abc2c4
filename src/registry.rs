//! The rule-id to resolver mapping used by the resolution engine.
//!
//! Registration is static per pipeline run: the registry is built once from
//! the configuration (plus any externally supplied resolvers) and rejected
//! with a [`ConfigError`] before any file is processed if two resolvers claim
//! the same rule id.

use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::diagnostic::Violation;
use crate::error::ConfigError;
use crate::rules;
use crate::syntax::SyntaxTree;

/// A repair strategy for one class of lint violation.
///
/// Resolvers mutate the tree in place and must preserve structural validity:
/// the serialized tree has to re-parse under the same dialect. They hold no
/// state between invocations, and resolvers for different rules must compose
/// in any order within one pass.
pub trait Resolver: Send + Sync {
    /// Id of the rule this resolver repairs.
    fn rule(&self) -> &str;

    /// Repair the violation, returning whether the tree was changed.
    fn resolve(&self, tree: &mut SyntaxTree, violation: &Violation) -> anyhow::Result<bool>;
}

struct Entry {
    resolver: Box<dyn Resolver>,
    priority: i64,
}

#[derive(Default)]
pub struct ResolverRegistry {
    entries: FxHashMap<String, Entry>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in resolvers named by `config.resolvers`.
    ///
    /// Rule ids without a built-in resolver are skipped with a warning;
    /// their violations will simply surface as unresolved.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        // Sorted for a reproducible registration order.
        let mut resolvers: Vec<_> = config.resolvers.iter().collect();
        resolvers.sort_unstable_by_key(|(rule, _)| rule.as_str());
        for (rule, &priority) in resolvers {
            match rules::builtin_resolver(rule) {
                Some(resolver) => registry.register(priority, resolver)?,
                None => {
                    tracing::warn!(rule = %rule, "no built-in resolver for configured rule");
                }
            }
        }
        Ok(registry)
    }

    /// Register a resolver under its rule id. Duplicate registration is a
    /// configuration error, never a silent overwrite.
    pub fn register(
        &mut self,
        priority: i64,
        resolver: Box<dyn Resolver>,
    ) -> Result<(), ConfigError> {
        let rule = resolver.rule().to_string();
        if self.entries.contains_key(&rule) {
            return Err(ConfigError::DuplicateResolver(rule));
        }
        self.entries.insert(rule, Entry { resolver, priority });
        Ok(())
    }

    pub fn lookup(&self, rule: &str) -> Option<&dyn Resolver> {
        self.entries.get(rule).map(|e| e.resolver.as_ref())
    }

    /// Priority of the resolver for `rule`; 0 when none is registered.
    pub fn priority(&self, rule: &str) -> i64 {
        self.entries.get(rule).map_or(0, |e| e.priority)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ResolverRegistry::new();
        registry
            .register(1, rules::builtin_resolver("no-important").unwrap())
            .unwrap();
        let err = registry
            .register(1, rules::builtin_resolver("no-important").unwrap())
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateResolver("no-important".to_string()));
    }

    #[test]
    fn test_lookup() {
        let mut registry = ResolverRegistry::new();
        registry
            .register(2, rules::builtin_resolver("no-trailing-zero").unwrap())
            .unwrap();
        assert!(registry.lookup("no-trailing-zero").is_some());
        assert!(registry.lookup("no-important").is_none());
        assert_eq!(registry.priority("no-trailing-zero"), 2);
        assert_eq!(registry.priority("no-important"), 0);
    }
}
