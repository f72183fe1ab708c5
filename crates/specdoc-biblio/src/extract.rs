//! Citation marker extraction.
//!
//! Scans document content for citation markers and yields occurrences in
//! document order. The scan is read-only and single-pass: the iterator is
//! tied to one content snapshot and is not restartable.

use regex::{CaptureMatches, Regex};
use std::sync::LazyLock;

/// Citation marker grammar.
///
/// Matches:
/// - `[[Key]]` — an informative inline citation
/// - `[[!Key]]` — a normative inline citation
/// - `data-cite="Key"` / `data-cite='Key'` — an attribute citation,
///   informative unless the value carries the same `!` prefix
///
/// The key text between the delimiters is captured; the `!` prefix is
/// handled separately so both marker forms share one convention.
static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\[\[(?P<inline>[^\[\]]*)\]\]|data-cite\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#,
    )
    .expect("invalid citation marker pattern")
});

/// Byte range of a marker within the scanned content (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One citation marker found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationOccurrence {
    /// Key exactly as written in the marker, `!` prefix stripped.
    pub raw_key: String,

    /// True for markers carrying the `!` normative prefix.
    pub normative: bool,

    /// Where the whole marker sits in the content.
    pub span: Span,
}

/// Scan `content` for citation markers.
///
/// Returns a lazy iterator yielding occurrences in document order. Markers
/// with an empty key are malformed and are skipped, never fatal.
pub fn extract_citations(content: &str) -> Occurrences<'_> {
    Occurrences {
        matches: MARKER_PATTERN.captures_iter(content),
    }
}

/// Iterator over citation occurrences. See [`extract_citations`].
pub struct Occurrences<'c> {
    matches: CaptureMatches<'static, 'c>,
}

impl<'c> Iterator for Occurrences<'c> {
    type Item = CitationOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.matches.by_ref() {
            let Some(whole) = caps.get(0) else { continue };
            let text = match caps
                .name("inline")
                .or_else(|| caps.name("dq"))
                .or_else(|| caps.name("sq"))
            {
                Some(m) => m.as_str(),
                None => continue,
            };

            let (normative, key) = split_marker(text);
            if key.is_empty() {
                continue;
            }

            return Some(CitationOccurrence {
                raw_key: key.to_string(),
                normative,
                span: Span {
                    start: whole.start(),
                    end: whole.end(),
                },
            });
        }
        None
    }
}

/// Apply the `!` normative prefix convention to raw marker text.
fn split_marker(text: &str) -> (bool, &str) {
    let text = text.trim();
    match text.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> Vec<CitationOccurrence> {
        extract_citations(content).collect()
    }

    #[test]
    fn test_inline_informative_marker() {
        let found = extract("foo [[TestRef2]] bar");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_key, "TestRef2");
        assert!(!found[0].normative);
    }

    #[test]
    fn test_inline_normative_marker() {
        let found = extract("foo [[!TestRef1]] bar");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_key, "TestRef1");
        assert!(found[0].normative);
    }

    #[test]
    fn test_data_cite_attribute_is_informative() {
        let found = extract(r#"<a data-cite="LOCAL">PASS</a>"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_key, "LOCAL");
        assert!(!found[0].normative);
    }

    #[test]
    fn test_data_cite_single_quotes() {
        let found = extract("<a data-cite='dom'>dom</a>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_key, "dom");
    }

    #[test]
    fn test_data_cite_normative_prefix() {
        let found = extract(r#"<a data-cite="!dom">dom</a>"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_key, "dom");
        assert!(found[0].normative);
    }

    #[test]
    fn test_empty_keys_are_skipped() {
        let found = extract(r#"[[]] [[!]] data-cite="" [[ok]]"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_key, "ok");
    }

    #[test]
    fn test_whitespace_in_keys_is_trimmed() {
        let found = extract("[[ dom ]] [[! html ]]");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].raw_key, "dom");
        assert_eq!(found[1].raw_key, "html");
        assert!(found[1].normative);
    }

    #[test]
    fn test_document_order_and_spans() {
        let content = "From [[!Zzz]] to [[!aaa]]";
        let found = extract(content);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].raw_key, "Zzz");
        assert_eq!(found[1].raw_key, "aaa");
        assert!(found[0].span.start < found[1].span.start);
        assert_eq!(&content[found[0].span.start..found[0].span.end], "[[!Zzz]]");
        assert_eq!(&content[found[1].span.start..found[1].span.end], "[[!aaa]]");
    }

    #[test]
    fn test_mixed_marker_forms_in_order() {
        let found = extract(r#"<p>[[DOM]] [[DOM4]] [[!dom]]</p><a data-cite="LOCAL">x</a>"#);
        let keys: Vec<&str> = found.iter().map(|o| o.raw_key.as_str()).collect();
        assert_eq!(keys, vec!["DOM", "DOM4", "dom", "LOCAL"]);
        assert_eq!(
            found.iter().filter(|o| o.normative).count(),
            1
        );
    }

    #[test]
    fn test_keys_keep_case() {
        let found = extract("[[DOM]] [[dom]]");
        assert_eq!(found[0].raw_key, "DOM");
        assert_eq!(found[1].raw_key, "dom");
    }

    #[test]
    fn test_no_markers() {
        assert!(extract("plain prose with [single] brackets").is_empty());
    }
}
