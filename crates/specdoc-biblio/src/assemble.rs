//! Partitioning and ordering of formatted reference lists.

use crate::format::FormattedEntry;

/// The two ordered reference lists of a document, fully materialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceLists {
    pub normative: Vec<FormattedEntry>,
    pub informative: Vec<FormattedEntry>,
}

impl ReferenceLists {
    pub fn len(&self) -> usize {
        self.normative.len() + self.informative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normative.is_empty() && self.informative.is_empty()
    }
}

/// Partition entries by classification and sort each list ascending by its
/// case-folded sort key.
///
/// `sort_by` is a stable sort, which is load-bearing here: entries with
/// identical sort keys must keep their first-resolved order.
pub fn assemble(entries: Vec<FormattedEntry>) -> ReferenceLists {
    let (mut normative, mut informative): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|entry| entry.normative);
    normative.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    informative.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    ReferenceLists {
        normative,
        informative,
    }
}
