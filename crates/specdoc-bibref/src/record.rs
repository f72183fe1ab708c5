//! Bibliographic record model.
//!
//! The same record shape is used for document-local override tables and for
//! the remote reference database's responses: a JSON mapping from citation
//! key to record. A record is either *terminal* (it has a title and renders
//! as a reference-list entry) or an *alias* (it has an `aliasOf` target and
//! redirects to another key).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A mapping from citation key to record.
///
/// Both the local override table and a remote lookup response take this
/// shape. Keys are case-sensitive.
pub type RefMap = HashMap<String, BiblioRecord>;

/// A single bibliographic record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BiblioRecord {
    /// Title of the referenced work. Present on terminal records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Link target for the entry; the title renders as a hyperlink when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Authors in publication order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,

    /// True when the author list is truncated and should render "et al".
    #[serde(rename = "etAl", default, skip_serializing_if = "std::ops::Not::not")]
    pub et_al: bool,

    /// Publishing organization, rendered as its own sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Publication date as the database reports it (free-form text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Publication status (e.g. a maturity level), free-form text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Key of the record this one is an alias for. When set, the record
    /// redirects rather than rendering; any other fields are ignored.
    #[serde(rename = "aliasOf", default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,

    /// Fields the database returns that we do not model.
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

impl BiblioRecord {
    /// Whether this record redirects to another key.
    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// Whether this record is a renderable terminal entry.
    pub fn is_terminal(&self) -> bool {
        !self.is_alias() && self.title.is_some()
    }
}
