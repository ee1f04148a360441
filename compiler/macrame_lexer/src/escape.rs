//! String escape resolution.
//!
//! `\n`, `\t`, `\r` and `\0` become their control characters. Any other
//! escaped character stands for itself, so `\"`, `\'` and `\\` yield the
//! quote or backslash.

use std::borrow::Cow;

#[inline]
fn resolve_control_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '0' => Some('\0'),
        _ => None,
    }
}

/// Resolve escapes in raw string content (the text between the quotes).
///
/// Borrows the input when it contains no backslash. A lone trailing
/// backslash is kept as is; the tokenizer rejects such strings before
/// they get here.
pub fn resolve_escapes(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }

    let mut resolved = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            resolved.push(c);
            continue;
        }
        match chars.next() {
            Some(esc) => resolved.push(resolve_control_escape(esc).unwrap_or(esc)),
            None => resolved.push('\\'),
        }
    }
    Cow::Owned(resolved)
}
