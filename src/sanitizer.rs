// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Markup stripper.
//!
//! Removes every tag with its attributes and keeps the text between tags.
//! Stray angle brackets are dropped, so the output never contains `<` or
//! `>`, which also makes the function idempotent. The contents of `script`
//! and `style` elements are dropped with the element. Entities are left
//! untouched.

use tracing::debug;

/// Elements whose contents are not text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Strip markup from `text` and trim surrounding whitespace.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(|c: char| c == '<' || c == '>') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        rest = if rest[pos..].starts_with('>') {
            tail
        } else {
            skip_markup(tail)
        };
    }
    out.push_str(rest);

    let cleaned = out.trim();
    if cleaned.len() != text.trim().len() {
        debug!(before = text.len(), after = cleaned.len(), "Markup stripped");
    }
    cleaned.to_string()
}

/// Skip the construct following a `<`. Returns the text after it.
fn skip_markup(after_lt: &str) -> &str {
    if let Some(comment) = after_lt.strip_prefix("!--") {
        return comment.find("-->").map_or("", |end| &comment[end + 3..]);
    }

    match after_lt.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?') => {}
        // A lone `<` is not markup, only the bracket goes
        _ => return after_lt,
    }

    let name = tag_name(after_lt);
    let rest = skip_tag(after_lt);

    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
        let closing = format!("</{name}");
        return match rest.to_ascii_lowercase().find(&closing) {
            Some(end) => skip_tag(&rest[end + 1..]),
            None => "",
        };
    }
    rest
}

/// Lowercased name of an opening tag; empty for closing tags and
/// declarations.
fn tag_name(after_lt: &str) -> String {
    after_lt
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Skip to just past the `>` closing the current tag, honouring quoted
/// attribute values. An unterminated tag swallows the rest of the input.
fn skip_tag(tag: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return &tag[i + 1..],
            (None, _) => {}
        }
    }
    ""
}
