use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Expands the input path into an ordered list of candidate HTML files.
/// A single file is taken as-is; a directory contributes its `.html`
/// entries sorted by path so processing order is deterministic.
pub(crate) fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    if !input.exists() {
        return Err(ExtractError::InputNotFound(input.to_path_buf()));
    }

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        if path.is_file() && has_html_extension(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("html"))
}
