use std::fmt;
use std::path::{Path, PathBuf};

use crate::location::Location;

/// The source text is not valid under the dialect it was parsed with.
///
/// Fatal for the file it occurred on, never for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub path: Option<PathBuf>,
    pub location: Option<Location>,
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: Option<Location>) -> Self {
        Self { path: None, location, message: message.into() }
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: ", path.display())?;
        }
        match self.location {
            Some(loc) => loc.fmt_with(f, &self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// Invalid pipeline configuration, rejected before any file is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two resolvers were registered for the same rule id.
    DuplicateResolver(String),
    /// A dialect tag in the configuration is not `scss` or `sass`.
    UnknownDialect(String),
    /// A `files.include` glob did not compile.
    InvalidPattern(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateResolver(rule) => {
                write!(f, "a resolver is already registered for rule `{rule}`")
            }
            Self::UnknownDialect(tag) => {
                write!(f, "unknown dialect `{tag}`, expected `scss` or `sass`")
            }
            Self::InvalidPattern(pattern) => {
                write!(f, "invalid include pattern `{pattern}`")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Per-file failure while resolving. Errors of this kind are isolated: they
/// are surfaced in the output sequence alongside the resolutions of other
/// files.
#[derive(Debug)]
pub enum ResolveError {
    /// The original file text failed to parse.
    Parse(ParseError),
    /// The file could not be read.
    Read { path: PathBuf, source: std::io::Error },
    /// A resolver returned an error while repairing a violation.
    Resolver {
        path: PathBuf,
        rule: String,
        source: anyhow::Error,
    },
    /// A resolver produced a tree whose serialization no longer parses.
    /// This indicates a broken fix, not an unfixable file.
    Contract {
        path: PathBuf,
        rule: String,
        source: ParseError,
    },
}

impl ResolveError {
    /// The file this error occurred on.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Parse(e) => e.path.as_deref(),
            Self::Read { path, .. } => Some(path),
            Self::Resolver { path, .. } => Some(path),
            Self::Contract { path, .. } => Some(path),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Read { path, .. } => {
                write!(f, "{}: failed to read file", path.display())
            }
            Self::Resolver { path, rule, .. } => {
                write!(f, "{}: resolver for `{rule}` failed", path.display())
            }
            Self::Contract { path, rule, .. } => {
                write!(
                    f,
                    "{}: resolver for `{rule}` produced an unparseable tree",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Read { source, .. } => Some(source),
            Self::Resolver { source, .. } => Some(source.as_ref()),
            Self::Contract { source, .. } => Some(source),
        }
    }
}

impl From<ParseError> for ResolveError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}
