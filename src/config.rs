use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::rules;
use crate::syntax::Dialect;

/// Glob patterns selecting the candidate files of a run.
#[derive(Clone, Debug, Default)]
pub struct FilePatterns {
    pub include: Vec<String>,
}

/// Dialects a run is willing to process. Files with other extensions are
/// never enumerated.
#[derive(Clone, Debug)]
pub struct SyntaxInclude {
    pub include: Vec<Dialect>,
}

impl Default for SyntaxInclude {
    fn default() -> Self {
        Self { include: Dialect::ALL.to_vec() }
    }
}

#[derive(Clone, Debug)]
pub struct Options {
    /// When true, a file whose first line carries the `// sassfix-ignore`
    /// marker is omitted from the run.
    pub opt_out: bool,
    /// When true, the supplied ruleset is unioned with the built-in default
    /// set; explicit entries win. When false, only the supplied ruleset is
    /// used.
    pub merge_default_rules: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { opt_out: true, merge_default_rules: false }
    }
}

/// Immutable configuration of one pipeline run. Constructed once, never
/// mutated afterwards.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory the include patterns are resolved against.
    pub root: PathBuf,
    pub files: FilePatterns,
    pub syntax: SyntaxInclude,
    /// Rule id to resolver priority. Within one pass, violations whose
    /// resolver has a higher priority are repaired first.
    pub resolvers: FxHashMap<String, i64>,
    pub options: Options,
}

impl Config {
    /// Configuration with the given include patterns and defaults everywhere
    /// else: both dialects, every built-in resolver at priority 1.
    pub fn for_patterns(root: impl Into<PathBuf>, include: Vec<String>) -> Self {
        let resolvers = rules::ALL_RULES
            .iter()
            .map(|rule| (rule.to_string(), 1))
            .collect();
        Self {
            root: root.into(),
            files: FilePatterns { include },
            syntax: SyntaxInclude::default(),
            resolvers,
            options: Options::default(),
        }
    }

    pub fn includes_dialect(&self, dialect: Dialect) -> bool {
        self.syntax.include.contains(&dialect)
    }
}
