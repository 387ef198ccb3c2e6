use std::sync::LazyLock;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::normalize::normalize_name;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("selector 'table' is statically valid"));

/// A table element found in a document: its node, its 0-based document
/// order ordinal, and the name derived from the nearest preceding
/// heading-like sibling (empty when none matches).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocatedTable {
    pub node_id: NodeId,
    pub index: usize,
    pub name: String,
}

pub(crate) fn compile_header_selectors(
    patterns: &[String],
) -> Result<Vec<Selector>, ExtractError> {
    patterns
        .iter()
        .map(|pattern| {
            Selector::parse(pattern).map_err(|error| ExtractError::InvalidSelector {
                selector: pattern.clone(),
                message: error.to_string(),
            })
        })
        .collect()
}

/// Enumerates every `table` element in document order. Absence of a name
/// source is a valid, silent outcome.
pub(crate) fn locate_tables(
    document: &Html,
    header_selectors: &[Selector],
    name_separator: &str,
) -> Vec<LocatedTable> {
    document
        .select(&TABLE_SELECTOR)
        .enumerate()
        .map(|(index, table)| LocatedTable {
            node_id: table.id(),
            index,
            name: table_name(table, header_selectors, name_separator),
        })
        .collect()
}

fn table_name(
    table: ElementRef<'_>,
    header_selectors: &[Selector],
    name_separator: &str,
) -> String {
    let source = table
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .find(|candidate| header_selectors.iter().any(|sel| sel.matches(candidate)));
    let Some(source) = source else {
        return String::new();
    };

    let text = source.text().collect::<String>();
    let label = text
        .split_once(name_separator)
        .map_or(text.as_str(), |(before, _)| before);
    normalize_name(label)
}
