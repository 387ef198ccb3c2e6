use crate::error::ExtractError;

/// Selectors that mark a preceding element as a table-name source when no
/// explicit selectors are configured.
pub(crate) const DEFAULT_HEADER_SELECTORS: [&str; 7] =
    ["h1", "h2", "h3", "h4", "h5", "h6", ".header"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Attribute names captured from each cell and each nested match.
    pub attributes: Vec<String>,
    /// Element tags recursed into within each cell.
    pub nested_tags: Vec<String>,
    /// CSS selectors matched against a table's preceding siblings to find
    /// its name source.
    pub header_selectors: Vec<String>,
    /// Table names are cut at the first occurrence of this separator.
    pub name_separator: String,
    /// Output delimiter byte.
    pub delimiter: u8,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            attributes: vec!["href".to_string()],
            nested_tags: vec!["a".to_string()],
            header_selectors: DEFAULT_HEADER_SELECTORS
                .iter()
                .map(ToString::to_string)
                .collect(),
            name_separator: ":".to_string(),
            delimiter: b',',
        }
    }
}

impl ExtractOptions {
    pub(crate) fn validate(&self) -> Result<(), ExtractError> {
        if self.name_separator.is_empty() {
            return Err(ExtractError::InvalidOption(
                "name separator must be non-empty".to_string(),
            ));
        }

        for attribute in &self.attributes {
            if attribute.trim().is_empty() {
                return Err(ExtractError::InvalidOption(
                    "attribute names must be non-empty".to_string(),
                ));
            }
        }

        for tag in &self.nested_tags {
            if tag.trim().is_empty() {
                return Err(ExtractError::InvalidOption(
                    "nested element tags must be non-empty".to_string(),
                ));
            }
        }

        for selector in &self.header_selectors {
            if selector.trim().is_empty() {
                return Err(ExtractError::InvalidOption(
                    "header selectors must be non-empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
