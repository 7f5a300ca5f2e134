//! Text sanitization.
//!
//! Two distinct filters live here:
//!
//! * [`sanitize_text`] escapes HTML-significant characters to entities. It is the first step of
//!   [`parse_message_text`], the markdown-lite renderer used for chat messages.
//! * [`sanitize_text_input`] is the narrower server-side filter for form fields that only ever end
//!   up in a plain-text email body.

mod markup;

pub use markup::parse_message_text;

use crate::constants::DEFAULT_MAX_INPUT_LENGTH;

/// Characters escaped by [`sanitize_text`], with their entity replacements.
const ESCAPES: [(char, &str); 6] = [
    ('&', "&amp;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('/', "&#x2F;"),
];

/// Escape `&`, `<`, `>`, `"`, `'` and `/` to their entity equivalents.
///
/// ```
/// use ecofusion::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("<script>"), "&lt;script&gt;");
/// ```
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ESCAPES.iter().find(|(c, _)| *c == ch) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Reverse of [`sanitize_text`]. Only the six entities it produces are recognised.
pub(crate) fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '&' {
            for (raw, entity) in ESCAPES {
                if rest.starts_with(entity) {
                    out.push(raw);
                    rest = &rest[entity.len()..];
                    continue 'outer;
                }
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Sanitize an inbound form field for storage or forwarding as plain text.
///
/// Trims surrounding whitespace, truncates to `max_length` characters, then strips literal
/// `<` and `>`.
pub fn sanitize_text_input(input: &str, max_length: usize) -> String {
    input
        .trim()
        .chars()
        .take(max_length)
        .filter(|c| *c != '<' && *c != '>')
        .collect()
}

/// [`sanitize_text_input`] with the default field length limit.
pub fn sanitize_field(input: &str) -> String {
    sanitize_text_input(input, DEFAULT_MAX_INPUT_LENGTH)
}
