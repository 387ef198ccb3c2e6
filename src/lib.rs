mod csv_out;
mod error;
mod extract;
mod files;
mod html_reader;
mod locate;
mod model;
mod normalize;
mod options;
mod warning;

use std::path::Path;

use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::csv_out::{output_file_name, write_csv, write_csv_to_string};
use crate::extract::{NestedTagSelectors, compile_nested_tags, extract_table, prune_non_content};
use crate::files::collect_input_files;
use crate::html_reader::read_html_file;
use crate::locate::{compile_header_selectors, locate_tables};
use crate::model::ExtractedTable;
use crate::warning::WarningCode;

pub use error::ExtractError;
pub use options::ExtractOptions;
pub use warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    /// Input files processed.
    pub file_count: usize,
    /// Tables that produced a CSV output (empty tables are skipped).
    pub table_count: usize,
    /// Records written across all tables.
    pub row_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

/// One serialized table: the file name the writer would use, plus the
/// CSV text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCsv {
    pub file_name: String,
    pub csv: String,
}

struct CompiledOptions {
    header_selectors: Vec<Selector>,
    nested_tags: NestedTagSelectors,
}

impl CompiledOptions {
    fn compile(options: &ExtractOptions) -> Result<Self, ExtractError> {
        Ok(Self {
            header_selectors: compile_header_selectors(&options.header_selectors)?,
            nested_tags: compile_nested_tags(&options.nested_tags)?,
        })
    }
}

/// Parses one document and runs the locate/extract stages over every
/// table it contains. Tables keep their document-order ordinal even when
/// they turn out empty.
fn extract_document_tables(
    html: &str,
    options: &ExtractOptions,
    compiled: &CompiledOptions,
    warnings: &mut Vec<ExtractWarning>,
    file_label: &str,
) -> Vec<ExtractedTable> {
    let mut document = Html::parse_document(html);
    let located = locate_tables(&document, &compiled.header_selectors, &options.name_separator);

    if located.is_empty() {
        warnings.push(
            ExtractWarning::new(
                WarningCode::NoTablesFound,
                "document contains no table elements",
            )
            .with_file(file_label),
        );
        return Vec::new();
    }

    let mut tables = Vec::with_capacity(located.len());
    for location in &located {
        prune_non_content(&mut document, location.node_id);
        tables.push(extract_table(
            &document,
            location,
            options,
            &compiled.nested_tags,
        ));
    }

    tables
}

fn process_file(
    input: &Path,
    out_dir: &Path,
    options: &ExtractOptions,
    compiled: &CompiledOptions,
    report: &mut ExtractionReport,
) -> Result<(), ExtractError> {
    let html = read_html_file(input)?;
    let base_name = file_base_name(input);
    let file_label = input.display().to_string();

    let tables = extract_document_tables(&html, options, compiled, &mut report.warnings, &file_label);
    debug!(file = %file_label, tables = tables.len(), "located tables");

    for table in &tables {
        if table.records.is_empty() {
            info!(
                file = %file_label,
                table_index = table.index,
                "table produced no records; skipping write"
            );
            report.warnings.push(
                ExtractWarning::new(
                    WarningCode::EmptyTable,
                    "table produced no records; no file written",
                )
                .with_file(&file_label)
                .with_table_index(table.index),
            );
            continue;
        }

        let file_name = output_file_name(&base_name, table.index, &table.name);
        let path = out_dir.join(&file_name);
        write_csv(&path, &table.columns, &table.records, options.delimiter)?;
        info!(
            file = %file_label,
            table_index = table.index,
            rows = table.records.len(),
            columns = table.columns.len(),
            output = %path.display(),
            "wrote table csv"
        );

        report.table_count += 1;
        report.row_count += table.records.len();
    }

    Ok(())
}

fn file_base_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "output".to_string(), |stem| stem.to_string_lossy().into_owned())
}

/// Extracts every table from the input path (an HTML file, or a
/// directory of `.html` files) and writes one CSV file per non-empty
/// table into `out_dir`. The first failure aborts the whole run.
pub fn extract_path_to_csv(
    input: &Path,
    out_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    options.validate()?;
    let compiled = CompiledOptions::compile(options)?;

    let files = collect_input_files(input)?;
    let mut report = ExtractionReport::default();

    if files.is_empty() {
        report.warnings.push(
            ExtractWarning::new(
                WarningCode::NoInputFiles,
                "no .html files found under input directory",
            )
            .with_file(input.display().to_string()),
        );
        return Ok(report);
    }

    for file in &files {
        process_file(file, out_dir, options, &compiled, &mut report)?;
    }

    report.file_count = files.len();
    Ok(report)
}

/// Single-file variant of [`extract_path_to_csv`].
pub fn extract_file_to_csv(
    input: &Path,
    out_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    options.validate()?;
    if !input.is_file() {
        return Err(ExtractError::InputNotFound(input.to_path_buf()));
    }
    let compiled = CompiledOptions::compile(options)?;

    let mut report = ExtractionReport::default();
    process_file(input, out_dir, options, &compiled, &mut report)?;
    report.file_count = 1;
    Ok(report)
}

/// In-memory variant: extracts from already-decoded HTML text and
/// returns the per-table CSV strings instead of writing files. The file
/// names are the ones the path-based API would have used.
pub fn extract_html_to_csv_strings(
    html: &str,
    base_name: &str,
    options: &ExtractOptions,
) -> Result<(Vec<TableCsv>, ExtractionReport), ExtractError> {
    options.validate()?;
    let compiled = CompiledOptions::compile(options)?;

    let mut report = ExtractionReport {
        file_count: 1,
        ..ExtractionReport::default()
    };
    let tables = extract_document_tables(html, options, &compiled, &mut report.warnings, base_name);

    let mut outputs = Vec::new();
    for table in &tables {
        if table.records.is_empty() {
            report.warnings.push(
                ExtractWarning::new(
                    WarningCode::EmptyTable,
                    "table produced no records; no file written",
                )
                .with_file(base_name)
                .with_table_index(table.index),
            );
            continue;
        }

        outputs.push(TableCsv {
            file_name: output_file_name(base_name, table.index, &table.name),
            csv: write_csv_to_string(&table.columns, &table.records, options.delimiter)?,
        });
        report.table_count += 1;
        report.row_count += table.records.len();
    }

    Ok((outputs, report))
}
