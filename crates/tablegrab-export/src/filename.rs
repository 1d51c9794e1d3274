//! File name sanitizing

/// Upper bound on a sanitized base name, in characters.
pub const MAX_FILENAME_LEN: usize = 50;

/// Turn a human title into a safe file base name.
///
/// Every character other than an ASCII letter or digit becomes `_`, runs of
/// `_` collapse to one, the result is lowercased and cut to
/// [`MAX_FILENAME_LEN`] characters. Input made only of punctuation yields a
/// single `_`; empty input yields an empty name.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len().min(MAX_FILENAME_LEN));

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    // Output is pure ASCII, so byte length equals character count
    out.truncate(MAX_FILENAME_LEN);
    out
}
