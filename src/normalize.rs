/// Folds arbitrary text into a stable identifier: lowercase, every
/// character outside `[a-z0-9]` becomes `_`, runs of `_` collapse into
/// one, leading/trailing `_` are stripped. Idempotent.
pub(crate) fn normalize_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_separator = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }

    out
}
