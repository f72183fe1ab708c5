//! Display formatting for resolved references.
//!
//! Rendering is deterministic text assembly over a terminal record: the
//! title (hyperlinked when an href is present), then the author list, then
//! publisher, date, and status, each as its own sentence.

use crate::resolve::ResolvedReference;

/// Prefix for reference anchors. The anchor id doubles as the reference
/// list entry's own anchor and as the target of every in-text citation
/// link for that canonical key.
pub const ANCHOR_PREFIX: &str = "bib-";

/// Anchor id for a canonical key: the key lowercased under a fixed prefix.
pub fn anchor_id(canonical_key: &str) -> String {
    format!("{}{}", ANCHOR_PREFIX, canonical_key.to_lowercase())
}

/// A reference entry ready for list assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedEntry {
    /// Marker text as first written in the document, bracketed.
    pub display_key: String,

    /// Case-folded canonical key; the only input to list ordering.
    pub sort_key: String,

    /// Rendered entry body (HTML text).
    pub body: String,

    /// Anchor id shared by this entry and its in-text citation links.
    pub anchor_id: String,

    /// Classification the entry is partitioned by.
    pub normative: bool,
}

/// Render a resolved reference into a formatted entry.
pub fn format_reference(reference: &ResolvedReference) -> FormattedEntry {
    FormattedEntry {
        display_key: format!("[{}]", reference.display_key),
        sort_key: reference.canonical_key.to_lowercase(),
        body: render_body(reference),
        anchor_id: anchor_id(&reference.canonical_key),
        normative: reference.normative,
    }
}

fn render_body(reference: &ResolvedReference) -> String {
    let record = &reference.record;
    let mut body = String::new();

    let title = escape_html(record.title.as_deref().unwrap_or(&reference.canonical_key));
    match record.href.as_deref() {
        Some(href) => {
            body.push_str("<a href=\"");
            body.push_str(&escape_attr(href));
            body.push_str("\">");
            body.push_str(&title);
            body.push_str("</a>");
        }
        None => body.push_str(&title),
    }
    body.push_str(". ");

    if !record.authors.is_empty() {
        body.push_str(&escape_html(&join_authors(&record.authors)));
        if record.et_al {
            body.push_str(" et al");
        }
        body.push_str(". ");
    }

    // Publisher renders even when authors are absent.
    if let Some(publisher) = record.publisher.as_deref() {
        body.push_str(&ensure_sentence(&escape_html(publisher)));
    }
    if let Some(date) = record.date.as_deref() {
        body.push_str(&ensure_sentence(&escape_html(date)));
    }
    if let Some(status) = record.status.as_deref() {
        body.push_str(&ensure_sentence(&escape_html(status)));
    }

    body
}

/// Render `text` as its own sentence: append a `.` unless it already ends
/// with sentence-ending punctuation, then a single space.
fn ensure_sentence(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.ends_with(['.', '!', '?']) {
        format!("{} ", trimmed)
    } else {
        format!("{}. ", trimmed)
    }
}

/// Join authors with commas and a final "and".
fn join_authors(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attr(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
