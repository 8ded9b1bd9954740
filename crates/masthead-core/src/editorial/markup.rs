//! Markup-blob content checks
//!
//! The body of an article is an opaque markup string produced by an
//! external editing surface. The only interpretation the core ever applies
//! is the emptiness check on submit: a body counts as empty when nothing
//! but whitespace remains once complete `<...>` tag runs are removed.

/// Remove complete `<...>` tag runs, leaving all other text intact
///
/// An unterminated `<` is not a tag and is kept verbatim.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Whether any non-whitespace text remains after markup stripping
pub fn has_content(markup: &str) -> bool {
    !strip_markup(markup).trim().is_empty()
}
