use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::Location;
use crate::syntax::TextSpan;

/// Severity of a violation, following the sass-lint numeric convention
/// (`1` = warning, `2` = error; `0` disables the rule).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single rule violation found by the detector.
///
/// Produced fresh on every detection pass and never mutated, only superseded
/// by the next pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Id of the violated rule.
    pub rule: String,
    /// Human-readable description of the violation.
    pub message: String,
    pub severity: Severity,
    pub location: Location,
    /// Span of the offending token in the text the tree was parsed from.
    /// Used by resolvers to find the node again.
    pub span: TextSpan,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {} ({})",
            self.location.row(),
            self.location.column(),
            self.severity,
            self.message,
            self.rule
        )
    }
}
