mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dumpdelta_core::{Config, Dialect, PairReport, Report, Severity, Snapshot};
use dumpdelta_engine::{DiffRenderer, SnapshotDiffer};
use dumpdelta_sql::{load_snapshot, DumpParser};

use output::{create_output, OutputNamer};

/// dumpdelta - SQL statements that turn one database dump into the next
#[derive(Parser)]
#[command(name = "dumpdelta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dump files (.sql, .sql.gz, .sql.bz2); the first is the newest
    #[arg(required = true, num_args = 2..)]
    files: Vec<PathBuf>,

    /// Sort file names and process them in reverse order
    #[arg(long)]
    sort: bool,

    /// Write diffs to stdout instead of files
    #[arg(long)]
    no_save: bool,

    /// Output file suffix (default: .diff)
    #[arg(short = 'o', long = "suffix")]
    suffix: Option<String>,

    /// SQL dialect of the dumps: mysql, postgres or ansi
    #[arg(long)]
    dialect: Option<Dialect>,

    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Path to config file (default: dumpdelta.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Settings for one run: config file values with command-line overrides applied
struct RunOptions {
    dialect: Dialect,
    to_stdout: bool,
    namer: OutputNamer,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    let options = RunOptions {
        dialect: cli.dialect.unwrap_or(config.dialect),
        to_stdout: cli.no_save || config.output.stdout,
        namer: OutputNamer::new(cli.suffix.clone().unwrap_or_else(|| config.output.suffix.clone()))?,
    };
    let files = processing_order(cli.files.clone(), cli.sort || config.output.sort_inputs);

    let mut report = Report::new();
    let outcome = compare_all(&files, &config, &options, &mut report);

    if let Some(path) = &cli.report {
        report
            .save_to_file(path)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        if cli.verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    let mismatched = outcome?;
    if cli.verbose {
        print_report_summary(&report);
    }

    if mismatched {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(path) = path {
        Config::from_file(path)?
    } else if Path::new(Config::FILE_NAME).exists() {
        Config::from_file(Path::new(Config::FILE_NAME))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if verbose {
        eprintln!("{} dialect: {:?}", "Using".cyan(), config.dialect);
    }
    Ok(config)
}

/// Files in processing order: as given, or reverse-sorted by name
fn processing_order(mut files: Vec<PathBuf>, sort: bool) -> Vec<PathBuf> {
    if sort {
        files.sort();
        files.reverse();
    }
    files
}

/// Compare each file with the one after it
///
/// Every file is loaded once: the older dump of one pair is the newer dump of
/// the next. Returns whether any table was skipped for a schema mismatch.
fn compare_all(files: &[PathBuf], config: &Config, options: &RunOptions, report: &mut Report) -> Result<bool> {
    let parser = DumpParser::from_dialect(options.dialect);
    let differ = SnapshotDiffer::from_config(config);
    let renderer = DiffRenderer::new(options.dialect);

    let Some((first, rest)) = files.split_first() else {
        return Ok(false);
    };

    let mut current_path = first;
    let mut current = load(current_path, &parser, report)?;
    let mut mismatched = false;

    for previous_path in rest {
        let previous = load(previous_path, &parser, report)?;

        let diff = match differ.compare(&current, &previous) {
            Ok(diff) => diff,
            Err(mismatch) => {
                report.add_diagnostic(mismatch.to_diagnostic(current.label()));
                return Err(mismatch.into());
            }
        };
        mismatched |= diff.has_mismatches();
        for diagnostic in diff.diagnostics() {
            report.add_diagnostic(diagnostic);
        }

        let mut pair = PairReport {
            current: current.label().to_string(),
            previous: previous.label().to_string(),
            output: None,
            tables: diff.summaries(),
        };

        if !diff.has_changes() {
            eprintln!("{} {} and {}", "no changes for".dimmed(), current.label(), previous.label());
        } else {
            eprintln!("{} {} and {}", "changes for".green(), current.label().bold(), previous.label().bold());

            if options.to_stdout {
                let mut out = io::stdout().lock();
                renderer.render_all(&diff.changes, &mut out)?;
                out.flush()?;
            } else {
                let path = options.namer.output_path(current_path);
                let file = create_output(&path).map_err(|err| {
                    report.add_diagnostic(err.to_diagnostic());
                    err
                })?;
                let mut out = BufWriter::new(file);
                renderer
                    .render_all(&diff.changes, &mut out)
                    .and_then(|()| out.flush())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(output = %path.display(), tables = diff.changes.len(), "diff written");
                pair.output = Some(path.display().to_string());
            }
        }

        report.add_pair(pair);
        drop(diff);
        current = previous;
        current_path = previous_path;
    }

    Ok(mismatched)
}

fn load(path: &Path, parser: &DumpParser, report: &mut Report) -> Result<Snapshot> {
    load_snapshot(path, parser).map_err(|err| {
        report.add_diagnostic(err.to_diagnostic(&path.display().to_string()));
        anyhow::Error::new(err)
    })
}

fn print_report_summary(report: &Report) {
    let summary = &report.summary;

    eprintln!("\n{}", "=".repeat(60).bright_blue());
    eprintln!("{}", "Dump Comparison Summary".bold().bright_blue());
    eprintln!("{}", "=".repeat(60).bright_blue());
    eprintln!();

    eprintln!("  Pairs compared: {} ({} with changes)", summary.pairs_compared, summary.pairs_changed);
    eprintln!("  Tables changed: {} ({} added)", summary.tables_changed, summary.tables_added);
    eprintln!(
        "  Rows:           {} inserted, {} updated, {} deleted",
        summary.rows_inserted.to_string().green(),
        summary.rows_updated.to_string().yellow(),
        summary.rows_deleted.to_string().red(),
    );
    eprintln!();

    if summary.errors > 0 {
        eprintln!("  Errors:   {}", summary.errors.to_string().red().bold());
    } else {
        eprintln!("  Errors:   {}", summary.errors.to_string().green());
    }

    if summary.warnings > 0 {
        eprintln!("  Warnings: {}", summary.warnings.to_string().yellow());
    } else {
        eprintln!("  Warnings: {}", summary.warnings.to_string().green());
    }

    for diag in &report.diagnostics {
        let severity = match diag.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warn => "WARN".yellow().bold(),
            Severity::Info => "INFO".cyan(),
        };

        eprintln!("  [{}] {}: {}", severity, diag.code.as_str(), diag.message);
        if let Some(location) = &diag.location {
            eprintln!("    at {}", location);
        }
    }
}
