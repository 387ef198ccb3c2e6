use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::error::ExtractError;

/// How far into the document the charset declaration scan reaches.
const META_SCAN_LIMIT: usize = 1024;

/// Reads an HTML file and decodes it to text. BOM wins, then a declared
/// `<meta charset>` near the top of the document, then lossy UTF-8.
/// Decoding itself never fails; only the read can.
pub(crate) fn read_html_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    Ok(decode_html_bytes(&bytes))
}

pub(crate) fn decode_html_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_with_bom_removal(bytes);
        return text.into_owned();
    }

    if let Some(encoding) = declared_charset(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if !had_errors {
            return text.into_owned();
        }
    }

    let (text, _) = UTF_8.decode_without_bom_handling(bytes);
    text.into_owned()
}

fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SCAN_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let position = head.find("charset")?;
    let rest = head[position + "charset".len()..]
        .trim_start_matches(|ch: char| ch == '=' || ch == '"' || ch == '\'' || ch.is_whitespace());
    let label = rest
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect::<String>();

    Encoding::for_label(label.as_bytes())
}
