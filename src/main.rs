use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sassfix::config::Config;
use sassfix::driver::Pipeline;
use sassfix::engine::Resolution;
use sassfix::error::ResolveError;
use sassfix::ruleset::Ruleset;

#[derive(Parser)]
#[command(
    author,
    name = "sassfix",
    about = "sassfix: Find and Fix Lints in SCSS/SASS Stylesheets",
    version
)]
struct Args {
    #[arg(
        default_value = ".",
        help = "Directory to search for stylesheets, for example `sassfix src/styles`."
    )]
    root: PathBuf,
    #[arg(
        short,
        long,
        help = "Glob patterns selecting the files to process, relative to the root.",
        default_values_t = ["**/*.scss".to_string(), "**/*.sass".to_string()]
    )]
    include: Vec<String>,
    #[arg(
        short,
        long,
        help = "Names of rules to apply, separated by a comma (no spaces). Defaults to the built-in rule set."
    )]
    rules: Option<String>,
    #[arg(
        short,
        long,
        default_value = "false",
        help = "Write the fixed text back to the processed files."
    )]
    write: bool,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::default(),
        help = "Output serialization format for resolutions."
    )]
    output_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Print one line per fix and per leftover violation
    #[default]
    Text,
    /// Print the resolutions and errors as JSON
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ExitStatus {
    /// Every file processed cleanly and no violations remain.
    Success,
    /// Violations remain that no resolver could repair.
    Failure,
    /// At least one file failed to process.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(status) => status.into(),
        Err(err) => {
            // Use `writeln` instead of `eprintln` to avoid panicking when the stderr pipe is broken.
            let mut stderr = std::io::stderr().lock();
            writeln!(stderr, "sassfix failed").ok();
            for cause in err.chain() {
                writeln!(stderr, "  Cause: {cause}").ok();
            }
            ExitStatus::Error.into()
        }
    }
}

fn run(args: Args) -> Result<ExitStatus> {
    let config = Config::for_patterns(&args.root, args.include.clone());
    let pipeline = Pipeline::new(config)?;
    let ruleset = match &args.rules {
        Some(rules) => rules
            .split(',')
            .filter(|rule| !rule.is_empty())
            .map(|rule| (rule, serde_json::json!(1)))
            .collect(),
        None => Ruleset::defaults(),
    };

    let outcomes = pipeline.resolve_parallel(&ruleset);

    let mut resolutions = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(resolution) => resolutions.push(resolution),
            Err(err) => errors.push(err),
        }
    }

    if args.write {
        for resolution in &resolutions {
            if resolution.fixed_text != resolution.original_text {
                fs::write(&resolution.source_path, &resolution.fixed_text).with_context(|| {
                    format!("failed to write {}", resolution.source_path.display())
                })?;
            }
        }
    }

    match args.output_format {
        OutputFormat::Text => emit_text(&resolutions, &errors)?,
        OutputFormat::Json => emit_json(&resolutions, &errors)?,
    }

    if !errors.is_empty() {
        return Ok(ExitStatus::Error);
    }
    if resolutions
        .iter()
        .any(|r| !r.unresolved_violations.is_empty())
    {
        return Ok(ExitStatus::Failure);
    }
    Ok(ExitStatus::Success)
}

fn emit_text(resolutions: &[Resolution], errors: &[ResolveError]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();

    for err in errors {
        eprintln!("{}: {err}", "Error".red().bold());
    }

    let mut fixed = 0usize;
    let mut unresolved = 0usize;
    for resolution in resolutions {
        let path = resolution.source_path.display();
        for rule in &resolution.applied_fixes {
            fixed += 1;
            writeln!(stdout, "{path}: {} {rule}", "fixed".green())?;
        }
        for violation in &resolution.unresolved_violations {
            unresolved += 1;
            writeln!(stdout, "{path}:{violation} [{}]", "unresolved".yellow())?;
        }
        if resolution.capped {
            writeln!(stdout, "{path}: {}", "gave up before a fixed point".yellow())?;
        }
    }

    writeln!(
        stdout,
        "{} file(s) processed, {fixed} fix(es) applied, {unresolved} violation(s) left",
        resolutions.len()
    )?;
    Ok(())
}

#[derive(Serialize)]
struct JsonError {
    file: Option<String>,
    error: String,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    resolutions: &'a [Resolution],
    errors: Vec<JsonError>,
}

fn emit_json(resolutions: &[Resolution], errors: &[ResolveError]) -> Result<()> {
    let output = JsonOutput {
        resolutions,
        errors: errors
            .iter()
            .map(|err| JsonError {
                file: err.path().map(|p| p.display().to_string()),
                error: err.to_string(),
            })
            .collect(),
    };
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &output)?;
    writeln!(stdout)?;
    Ok(())
}
