//! The pipeline driver: enumerates candidate files and drives the resolution
//! engine over each one, producing a lazy sequence of resolutions.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use rayon::prelude::*;

use crate::config::Config;
use crate::engine::{Resolution, resolve_source};
use crate::error::{ConfigError, ResolveError};
use crate::registry::ResolverRegistry;
use crate::ruleset::Ruleset;
use crate::syntax::Dialect;

/// Files whose first line starts with this marker are skipped when
/// `options.opt_out` is enabled.
pub const OPT_OUT_MARKER: &str = "// sassfix-ignore";

/// A configured lint-resolve pipeline.
///
/// Construction fails fast on configuration problems (duplicate resolvers,
/// invalid include globs); per-file failures are isolated and surfaced inside
/// the output sequence instead.
pub struct Pipeline {
    config: Config,
    registry: ResolverRegistry,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with the built-in resolvers selected by `config.resolvers`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let registry = ResolverRegistry::from_config(&config)?;
        Self::with_registry(config, registry)
    }

    /// Pipeline with an externally supplied resolver registry, for callers
    /// that inject custom resolvers.
    pub fn with_registry(config: Config, registry: ResolverRegistry) -> Result<Self, ConfigError> {
        // Validate the include globs up front so a bad pattern cannot
        // surface halfway through a run.
        build_overrides(&config)?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The lazy sequence of resolutions for `ruleset`.
    ///
    /// Each call re-enumerates and re-processes from scratch; no cross-file
    /// state is retained. Files are processed one at a time as the sequence
    /// is pulled, in deterministic enumeration order.
    pub fn run(&self, ruleset: &Ruleset) -> Resolutions<'_> {
        Resolutions {
            pipeline: self,
            ruleset: self.effective_ruleset(ruleset),
            paths: self.enumerate().into_iter(),
        }
    }

    /// Order-preserving batch variant of [`Pipeline::run`], fanning files out
    /// over the rayon thread pool. Each file's tree stays owned by the worker
    /// processing it; the output order matches enumeration order.
    pub fn resolve_parallel(&self, ruleset: &Ruleset) -> Vec<Result<Resolution, ResolveError>> {
        let ruleset = self.effective_ruleset(ruleset);
        self.enumerate()
            .par_iter()
            .filter_map(|path| self.resolve_path(path, &ruleset))
            .collect()
    }

    fn effective_ruleset(&self, ruleset: &Ruleset) -> Ruleset {
        if self.config.options.merge_default_rules {
            ruleset.clone().merged_with_defaults()
        } else {
            ruleset.clone()
        }
    }

    /// Candidate files: matches of `files.include` under the configured
    /// root, restricted to the configured dialects, in sorted order.
    fn enumerate(&self) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(&self.config.root);
        builder
            .hidden(true)
            .parents(true)
            .ignore(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
        match build_overrides(&self.config) {
            Ok(Some(overrides)) => {
                builder.overrides(overrides);
            }
            Ok(None) => {}
            // Validated at construction time.
            Err(_) => return Vec::new(),
        }

        let mut paths: Vec<PathBuf> = builder
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| {
                Dialect::from_path(path).is_some_and(|d| self.config.includes_dialect(d))
            })
            .collect();
        paths.sort();
        paths
    }

    /// `None` when the file opted out of processing.
    fn resolve_path(
        &self,
        path: &Path,
        ruleset: &Ruleset,
    ) -> Option<Result<Resolution, ResolveError>> {
        let dialect = Dialect::from_path(path)?;
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                return Some(Err(ResolveError::Read { path: path.to_path_buf(), source }));
            }
        };
        if self.config.options.opt_out && is_opted_out(&text) {
            tracing::debug!(path = %path.display(), "file opted out of processing");
            return None;
        }
        Some(resolve_source(path, &text, dialect, ruleset, &self.registry))
    }
}

fn build_overrides(config: &Config) -> Result<Option<ignore::overrides::Override>, ConfigError> {
    if config.files.include.is_empty() {
        return Ok(None);
    }
    let mut builder = OverrideBuilder::new(&config.root);
    for pattern in &config.files.include {
        builder
            .add(pattern)
            .map_err(|_| ConfigError::InvalidPattern(pattern.clone()))?;
    }
    let overrides = builder
        .build()
        .map_err(|_| ConfigError::InvalidPattern(config.files.include.join(", ")))?;
    Ok(Some(overrides))
}

fn is_opted_out(text: &str) -> bool {
    text.lines()
        .next()
        .is_some_and(|line| line.trim_start().starts_with(OPT_OUT_MARKER))
}

/// Lazy, restartable sequence of per-file outcomes. Dropping it before
/// exhaustion abandons the remaining files without side effects; the
/// pipeline itself never writes to disk.
pub struct Resolutions<'a> {
    pipeline: &'a Pipeline,
    ruleset: Ruleset,
    paths: std::vec::IntoIter<PathBuf>,
}

impl Iterator for Resolutions<'_> {
    type Item = Result<Resolution, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.paths.next()?;
            if let Some(outcome) = self.pipeline.resolve_path(&path, &self.ruleset) {
                return Some(outcome);
            }
        }
    }
}
