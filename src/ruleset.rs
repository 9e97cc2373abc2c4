use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::diagnostic::Severity;
use crate::rules;

/// Mapping from rule id to rule configuration.
///
/// Values are opaque to the pipeline and passed through to the rule checks.
/// The conventional shapes are a bare severity number (`0` off, `1` warning,
/// `2` error), a boolean, or an array `[severity, options...]`.
#[derive(Clone, Debug, Default)]
pub struct Ruleset {
    rules: FxHashMap<String, Value>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in rules, enabled at warning severity.
    pub fn defaults() -> Self {
        let mut ruleset = Self::new();
        for rule in rules::ALL_RULES {
            ruleset.insert(*rule, Value::from(1));
        }
        ruleset
    }

    pub fn insert(&mut self, rule: impl Into<String>, config: Value) {
        self.rules.insert(rule.into(), config);
    }

    pub fn with(mut self, rule: impl Into<String>, config: Value) -> Self {
        self.insert(rule, config);
        self
    }

    /// Union with the built-in default set. Explicit entries win.
    pub fn merged_with_defaults(mut self) -> Self {
        for (rule, config) in Self::defaults().rules {
            self.rules.entry(rule).or_insert(config);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a rule is present and not disabled.
    pub fn enabled(&self, rule: &str) -> bool {
        self.rules
            .get(rule)
            .is_some_and(|config| parse_severity(config).is_some())
    }

    /// Severity configured for a rule; [`Severity::Warning`] when the
    /// configuration value carries no recognizable severity.
    pub fn severity(&self, rule: &str) -> Severity {
        self.rules
            .get(rule)
            .and_then(parse_severity)
            .unwrap_or_default()
    }

    /// The opaque configuration value of a rule, passed through untouched.
    pub fn options(&self, rule: &str) -> Option<&Value> {
        self.rules.get(rule)
    }

    /// Rule ids in deterministic (sorted) order.
    pub fn rule_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Ruleset {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut ruleset = Self::new();
        for (rule, config) in iter {
            ruleset.insert(rule, config);
        }
        ruleset
    }
}

/// `None` means the rule is disabled.
fn parse_severity(config: &Value) -> Option<Severity> {
    match config {
        Value::Bool(false) => None,
        Value::Bool(true) => Some(Severity::Warning),
        Value::Number(n) => match n.as_u64() {
            Some(0) => None,
            Some(2) => Some(Severity::Error),
            _ => Some(Severity::Warning),
        },
        Value::Array(items) => match items.first() {
            Some(first) => parse_severity(first),
            None => Some(Severity::Warning),
        },
        _ => Some(Severity::Warning),
    }
}
