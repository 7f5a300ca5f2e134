//! Markdown-lite renderer for chat messages.
//!
//! Input is always escaped first; every substitution below operates on escaped text,
//! so the only markup in the output is the markup inserted here.

use url::Url;

use super::{sanitize_text, unescape_text};

const HTTP_SCHEME: &str = "http";
/// `://` as it appears after escaping.
const SCHEME_SEPARATOR: &str = ":&#x2F;&#x2F;";

/// Render free text as a bounded, safe subset of HTML.
///
/// Steps, in order: escape, `**bold**`, `*italic*`, `` `code` ``, newlines to `<br />`,
/// then bare `http(s)://` tokens to anchors when they parse as URLs.
///
/// ```
/// use ecofusion::sanitize::parse_message_text;
///
/// let html = parse_message_text("**hi** <b>");
/// assert_eq!(html, "<strong>hi</strong> &lt;b&gt;");
/// ```
pub fn parse_message_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let sanitized = sanitize_text(text);
    let parsed = replace_delimited(&sanitized, "**", "<strong>", "</strong>");
    let parsed = replace_delimited(&parsed, "*", "<em>", "</em>");
    let parsed = replace_delimited(&parsed, "`", "<code>", "</code>");
    let parsed = parsed.replace('\n', "<br />");
    link_urls(&parsed)
}

/// Replace every `delim content delim` span with `open content close`.
///
/// Spans are shortest-match and never cross a newline. An opening delimiter
/// without a partner on the same line is left as literal text.
fn replace_delimited(input: &str, delim: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        let line_end = after.find('\n').unwrap_or(after.len());

        match after[..line_end].find(delim) {
            Some(end) => {
                out.push_str(&rest[..start]);
                out.push_str(open);
                out.push_str(&after[..end]);
                out.push_str(close);
                rest = &after[end + delim.len()..];
            }
            None => {
                // Delimiters are ASCII; retry one byte further on.
                out.push_str(&rest[..=start]);
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Byte offset of the next escaped `http://` or `https://` token.
fn find_url_start(input: &str) -> Option<usize> {
    input
        .match_indices(HTTP_SCHEME)
        .map(|(i, _)| i)
        .find(|&i| {
            let tail = &input[i + HTTP_SCHEME.len()..];
            tail.starts_with(SCHEME_SEPARATOR)
                || tail
                    .strip_prefix('s')
                    .is_some_and(|t| t.starts_with(SCHEME_SEPARATOR))
        })
}

fn link_urls(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = find_url_start(rest) {
        out.push_str(&rest[..start]);

        let token_len = rest[start..]
            .find(|c: char| c.is_whitespace() || c == '<')
            .unwrap_or(rest.len() - start);
        let token = &rest[start..start + token_len];
        let raw = unescape_text(token);

        if Url::parse(&raw).is_ok() {
            let href = sanitize_text(&raw);
            out.push_str(&format!(
                r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{href}</a>"#
            ));
        } else {
            tracing::debug!(token = %raw, "leaving malformed URL as plain text");
            out.push_str(token);
        }

        rest = &rest[start + token_len..];
    }

    out.push_str(rest);
    out
}
