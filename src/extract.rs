use std::sync::LazyLock;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::locate::LocatedTable;
use crate::model::{ColumnRegistry, ExtractedTable, TableRecord};
use crate::normalize::normalize_name;
use crate::options::ExtractOptions;

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("selector 'tr' is statically valid"));

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("selector 'td, th' is statically valid"));

static HEADER_CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("selector 'th' is statically valid"));

static PRUNE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, noscript")
        .expect("selector 'script, style, noscript' is statically valid")
});

/// Nested tags from the configuration, compiled once per run. The tag
/// string is kept alongside its selector because it feeds field names.
pub(crate) struct NestedTagSelectors {
    tags: Vec<(String, Selector)>,
}

pub(crate) fn compile_nested_tags(tags: &[String]) -> Result<NestedTagSelectors, ExtractError> {
    let tags = tags
        .iter()
        .map(|tag| {
            Selector::parse(tag)
                .map(|selector| (tag.clone(), selector))
                .map_err(|error| ExtractError::InvalidSelector {
                    selector: tag.clone(),
                    message: error.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NestedTagSelectors { tags })
}

/// Detaches `script`/`style`/`noscript` subtrees under the table so the
/// cell walk only ever sees visible text. Destructive, but confined to
/// this document's in-memory tree.
pub(crate) fn prune_non_content(document: &mut Html, table: NodeId) {
    let doomed = match document.tree.get(table).and_then(ElementRef::wrap) {
        Some(table) => table
            .select(&PRUNE_SELECTOR)
            .map(|element| element.id())
            .collect::<Vec<_>>(),
        None => return,
    };

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Flattens one table element into a column registry plus one record per
/// non-empty data row. Pure function of the table's structure and the
/// configuration; row and column order are tree order throughout.
pub(crate) fn extract_table(
    document: &Html,
    located: &LocatedTable,
    options: &ExtractOptions,
    nested: &NestedTagSelectors,
) -> ExtractedTable {
    let mut extracted = ExtractedTable {
        index: located.index,
        name: located.name.clone(),
        ..ExtractedTable::default()
    };

    let Some(table) = document.tree.get(located.node_id).and_then(ElementRef::wrap) else {
        return extracted;
    };

    let rows = table.select(&ROW_SELECTOR).collect::<Vec<_>>();
    let (headers, data_start) = detect_headers(&rows);

    for row in rows.iter().skip(data_start) {
        let record = extract_row(*row, &headers, options, nested, &mut extracted.columns);
        if !record.is_empty() {
            extracted.records.push(record);
        }
    }

    extracted
}

/// The first row holding at least one header cell defines the headers;
/// that row and everything above it is excluded from data. Rows with
/// header cells further down are ordinary data rows.
fn detect_headers(rows: &[ElementRef<'_>]) -> (Vec<String>, usize) {
    for (index, row) in rows.iter().enumerate() {
        let headers = row
            .select(&HEADER_CELL_SELECTOR)
            .map(|cell| normalize_name(&cell.text().collect::<String>()))
            .collect::<Vec<_>>();
        if !headers.is_empty() {
            return (headers, index + 1);
        }
    }

    (Vec::new(), 0)
}

fn extract_row(
    row: ElementRef<'_>,
    headers: &[String],
    options: &ExtractOptions,
    nested: &NestedTagSelectors,
    columns: &mut ColumnRegistry,
) -> TableRecord {
    let mut record = TableRecord::new();

    for (cell_index, cell) in row.select(&CELL_SELECTOR).enumerate() {
        let base = headers
            .get(cell_index)
            .cloned()
            .unwrap_or_else(|| format!("Column{cell_index}"));

        extract_element(cell, &base, options, &mut record, columns);

        for (tag, selector) in &nested.tags {
            for (match_index, element) in cell.select(selector).enumerate() {
                let nested_base = format!("{base}_{tag}{match_index}");
                extract_element(element, &nested_base, options, &mut record, columns);
            }
        }
    }

    record
}

/// Emits the `_content` field (when the trimmed text is non-empty) plus
/// one field per configured attribute present with a non-empty value.
/// Field names enter the registry in first-seen order; repeated names
/// overwrite the record value (last write wins).
fn extract_element(
    element: ElementRef<'_>,
    base: &str,
    options: &ExtractOptions,
    record: &mut TableRecord,
    columns: &mut ColumnRegistry,
) {
    let text = element.text().collect::<String>();
    let text = text.trim();
    if !text.is_empty() {
        set_field(record, columns, format!("{base}_content"), text.to_string());
    }

    for attribute in &options.attributes {
        if let Some(value) = element
            .value()
            .attr(attribute)
            .filter(|value| !value.is_empty())
        {
            set_field(
                record,
                columns,
                format!("{base}_{attribute}"),
                value.to_string(),
            );
        }
    }
}

fn set_field(
    record: &mut TableRecord,
    columns: &mut ColumnRegistry,
    name: String,
    value: String,
) {
    columns.add(&name);
    record.insert(name, value);
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::{compile_nested_tags, extract_table, prune_non_content};
    use crate::locate::{compile_header_selectors, locate_tables};
    use crate::model::ExtractedTable;
    use crate::options::ExtractOptions;

    fn extract_first(html: &str, options: &ExtractOptions) -> ExtractedTable {
        let mut document = Html::parse_document(html);
        let selectors = compile_header_selectors(&options.header_selectors)
            .expect("header selectors should compile");
        let nested =
            compile_nested_tags(&options.nested_tags).expect("nested tags should compile");
        let located = locate_tables(&document, &selectors, &options.name_separator);
        let first = located.first().expect("document should contain a table").clone();
        prune_non_content(&mut document, first.node_id);
        extract_table(&document, &first, options, &nested)
    }

    #[test]
    fn header_row_with_anchor_cell_flattens_to_expected_fields() {
        let table = extract_first(
            "<table>\
               <tr><th>Name</th><th>Link</th></tr>\
               <tr><td>Alice</td><td><a href=\"http://x\">Profile</a></td></tr>\
             </table>",
            &ExtractOptions::default(),
        );

        assert_eq!(
            table.columns.names(),
            [
                "name_content",
                "link_content",
                "link_a0_content",
                "link_a0_href",
            ]
        );
        assert_eq!(table.records.len(), 1);
        let record = &table.records[0];
        assert_eq!(record["name_content"], "Alice");
        assert_eq!(record["link_content"], "Profile");
        assert_eq!(record["link_a0_content"], "Profile");
        assert_eq!(record["link_a0_href"], "http://x");
    }

    #[test]
    fn missing_headers_fall_back_to_positional_columns() {
        let table = extract_first(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
            &ExtractOptions::default(),
        );

        assert_eq!(table.columns.names(), ["Column0_content", "Column1_content"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1]["Column1_content"], "d");
    }

    #[test]
    fn only_the_first_header_row_defines_headers() {
        let table = extract_first(
            "<table>\
               <tr><th>Name</th></tr>\
               <tr><th>Alice</th></tr>\
               <tr><td>Bob</td></tr>\
             </table>",
            &ExtractOptions::default(),
        );

        assert_eq!(table.columns.names(), ["name_content"]);
        let values = table
            .records
            .iter()
            .map(|record| record["name_content"].clone())
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["Alice", "Bob"]);
    }

    #[test]
    fn rows_above_the_header_row_are_excluded() {
        let table = extract_first(
            "<table>\
               <tr><td>preamble</td></tr>\
               <tr><th>Name</th></tr>\
               <tr><td>Alice</td></tr>\
             </table>",
            &ExtractOptions::default(),
        );

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0]["name_content"], "Alice");
    }

    #[test]
    fn fully_empty_rows_produce_no_record() {
        let table = extract_first(
            "<table>\
               <tr><th>Name</th></tr>\
               <tr><td>  </td></tr>\
               <tr><td>Alice</td></tr>\
             </table>",
            &ExtractOptions::default(),
        );

        assert_eq!(table.records.len(), 1);
    }

    #[test]
    fn header_only_table_yields_empty_registry() {
        let table = extract_first(
            "<table><tr><th>Name</th><th>Age</th></tr></table>",
            &ExtractOptions::default(),
        );

        assert!(table.records.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn script_and_style_text_is_pruned_before_extraction() {
        let table = extract_first(
            "<table><tr><td>Alice<script>tracker()</script><style>td{}</style></td></tr></table>",
            &ExtractOptions::default(),
        );

        assert_eq!(table.records[0]["Column0_content"], "Alice");
    }

    #[test]
    fn configured_attributes_are_read_from_the_cell_itself() {
        let options = ExtractOptions {
            attributes: vec!["href".to_string(), "title".to_string()],
            ..ExtractOptions::default()
        };
        let table = extract_first(
            "<table>\
               <tr><th>Name</th></tr>\
               <tr><td title=\"who\">Alice</td></tr>\
             </table>",
            &options,
        );

        assert_eq!(table.columns.names(), ["name_content", "name_title"]);
        assert_eq!(table.records[0]["name_title"], "who");
    }

    #[test]
    fn nested_matches_are_indexed_in_document_order() {
        let table = extract_first(
            "<table><tr><td>\
               <a href=\"/one\">One</a> and <a href=\"/two\">Two</a>\
             </td></tr></table>",
            &ExtractOptions::default(),
        );

        assert_eq!(
            table.columns.names(),
            [
                "Column0_content",
                "Column0_a0_content",
                "Column0_a0_href",
                "Column0_a1_content",
                "Column0_a1_href",
            ]
        );
        let record = &table.records[0];
        assert_eq!(record["Column0_content"], "One and Two");
        assert_eq!(record["Column0_a1_href"], "/two");
    }

    #[test]
    fn ragged_rows_keep_their_own_fields() {
        let table = extract_first(
            "<table>\
               <tr><td>a</td><td>b</td></tr>\
               <tr><td>c</td></tr>\
             </table>",
            &ExtractOptions::default(),
        );

        assert_eq!(table.records.len(), 2);
        assert!(!table.records[1].contains_key("Column1_content"));
        for record in &table.records {
            for key in record.keys() {
                assert!(table.columns.contains(key));
            }
        }
    }

    #[test]
    fn extraction_is_deterministic_across_runs() {
        let html = "<table>\
               <tr><th>Name</th><th>Link</th></tr>\
               <tr><td>Alice</td><td><a href=\"http://x\">Profile</a></td></tr>\
               <tr><td>Bob</td><td><a href=\"http://y\">Home</a></td></tr>\
             </table>";
        let first = extract_first(html, &ExtractOptions::default());
        let second = extract_first(html, &ExtractOptions::default());
        assert_eq!(first, second);
    }
}
