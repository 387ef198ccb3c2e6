use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::ExtractError;
use crate::model::{ColumnRegistry, TableRecord};

/// Output file name for one extracted table. The derived table name is
/// already a normalized identifier when present.
pub(crate) fn output_file_name(base_name: &str, table_index: usize, table_name: &str) -> String {
    if table_name.is_empty() {
        format!("{base_name}.table_{table_index}.csv")
    } else {
        format!("{base_name}.table_{table_index}.{table_name}.csv")
    }
}

pub(crate) fn write_csv(
    path: &Path,
    columns: &ColumnRegistry,
    records: &[TableRecord],
    delimiter: u8,
) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_rows(&mut writer, columns, records)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn write_csv_to_string(
    columns: &ColumnRegistry,
    records: &[TableRecord],
    delimiter: u8,
) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_rows(&mut writer, columns, records)?;
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

fn write_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    columns: &ColumnRegistry,
    records: &[TableRecord],
) -> Result<(), csv::Error> {
    writer.write_record(columns.names())?;
    for record in records {
        writer.write_record(
            columns
                .names()
                .iter()
                .map(|name| record.get(name).map_or("", String::as_str)),
        )?;
    }
    Ok(())
}
