use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use html_table_to_csv::{ExtractOptions, ExtractionReport, extract_path_to_csv};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "html2csv",
    version,
    about = "Extract HTML tables into per-table CSV files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract every table and write one CSV file per table.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input HTML file, or a directory of .html files.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving one CSV file per extracted table.
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Attribute captured from cells and nested elements. Repeatable.
    #[arg(long = "attribute", value_name = "NAME")]
    attributes: Vec<String>,

    /// Element tag to recurse into within each cell. Repeatable.
    #[arg(long = "tag", value_name = "NAME")]
    tags: Vec<String>,

    /// CSS selector marking a table-name source element. Repeatable.
    #[arg(long = "header-selector", value_name = "CSS")]
    header_selectors: Vec<String>,

    /// Table names are cut at the first occurrence of this separator.
    #[arg(long, default_value = ":")]
    separator: String,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Write log output to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let mut options = ExtractOptions::default();
    if !args.attributes.is_empty() {
        options.attributes = args.attributes.clone();
    }
    if !args.tags.is_empty() {
        options.nested_tags = args.tags.clone();
    }
    if !args.header_selectors.is_empty() {
        options.header_selectors = args.header_selectors.clone();
    }
    options.name_separator = args.separator.clone();
    options.delimiter = args.delimiter as u8;

    Ok(options)
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("html_table_to_csv=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time();

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file '{}'", path.display()))?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} file={:?} table_index={:?}: {}",
                warning.code, warning.file, warning.table_index, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    extract_path_to_csv(&args.input, &args.out_dir, &options)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.display()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => {
            if let Err(error) = init_tracing(args.log_file.as_ref()) {
                eprintln!("error: {error:#}");
                return ExitCode::from(1);
            }

            match run_extract(&args) {
                Ok(report) => {
                    log_report(&report, args.verbose);
                    if report.row_count > 0 {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(2)
                    }
                }
                Err(error) => {
                    eprintln!("error: {error:#}");
                    ExitCode::from(1)
                }
            }
        }
    }
}
