//! Citation resolution and bibliography assembly for Specdoc documents.
//!
//! This crate turns inline citation markers into two sorted, deduplicated
//! reference lists plus per-site anchor links, reconciling a document-local
//! override table with records fetched from the remote reference database.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         specdoc-biblio                           │
//! │                (citation resolution engine)                      │
//! │  content → occurrences → canonical keys → entries → two lists    │
//! └──────────────────────────────┬───────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         specdoc-bibref                           │
//! │              (record model + remote database access)             │
//! │        RemoteLookup → RefMap keyed by citation key               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The remote fetch is the only suspension point; everything downstream of
//! it is a synchronous, pure transform, so tests drive the whole pipeline
//! through a [`StaticLookup`](specdoc_bibref::StaticLookup) fake.
//!
//! # Example
//!
//! ```rust,ignore
//! use specdoc_biblio::resolve_document;
//! use specdoc_bibref::{BibrefClient, RefMap};
//!
//! let client = BibrefClient::with_defaults()?;
//! let local: RefMap = serde_json::from_str(overrides_json)?;
//! let output = resolve_document(content, local, &client).await?;
//! for entry in &output.lists.normative {
//!     println!("{} {}", entry.display_key, entry.body);
//! }
//! ```

pub mod assemble;
pub mod error;
pub mod extract;
pub mod format;
pub mod registry;
pub mod resolve;

pub use assemble::{ReferenceLists, assemble};
pub use error::{Error, Result};
pub use extract::{CitationOccurrence, Occurrences, Span, extract_citations};
pub use format::{ANCHOR_PREFIX, FormattedEntry, anchor_id, format_reference};
pub use registry::{MAX_ALIAS_HOPS, Registry};
pub use resolve::{
    CiteTarget, Resolution, ResolutionDiagnostics, ResolvedReference, Resolver, UnresolvedKey,
    UnresolvedReason,
};

use specdoc_bibref::{RefMap, RemoteLookup};
use std::collections::{BTreeMap, HashSet};

/// Everything one document resolution pass produces.
#[derive(Debug)]
pub struct DocumentReferences {
    /// The two sorted reference lists.
    pub lists: ReferenceLists,

    /// Anchor outcome per citation site, keyed by marker span.
    pub cite_targets: BTreeMap<Span, CiteTarget>,

    /// Per-key failures plus the advisory reachability flag.
    pub diagnostics: ResolutionDiagnostics,
}

/// Resolve every citation in `content` against the local override table
/// and the remote database.
///
/// The remote database is asked once for the referenced keys that no local
/// override covers, then for alias targets the earlier responses pointed at
/// but did not include (bounded by the alias hop limit). A failed fetch
/// makes the affected keys unresolved and sets the advisory
/// `remote_unavailable` flag; it never fails the pass. The only fatal
/// error is a structurally invalid local override table.
pub async fn resolve_document(
    content: &str,
    local: RefMap,
    remote: &dyn RemoteLookup,
) -> Result<DocumentReferences> {
    let occurrences: Vec<CitationOccurrence> = extract_citations(content).collect();

    // Referenced keys without local coverage, first-seen order.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut requested: Vec<String> = Vec::new();
    for occurrence in &occurrences {
        if seen.insert(occurrence.raw_key.as_str()) && !local.contains_key(&occurrence.raw_key) {
            requested.push(occurrence.raw_key.clone());
        }
    }

    let mut attempted: HashSet<String> = local.keys().cloned().collect();
    attempted.extend(requested.iter().cloned());

    let mut remote_available = true;
    let fetched = if requested.is_empty() {
        RefMap::new()
    } else {
        match remote.lookup(&requested).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(error = %error, "remote reference lookup failed");
                remote_available = false;
                RefMap::new()
            }
        }
    };

    let mut registry = Registry::build(local, fetched)?;

    // Alias targets can point outside the fetched set; chase them with
    // bounded follow-up rounds so chains spanning fetch rounds resolve.
    if remote_available {
        for _ in 0..MAX_ALIAS_HOPS {
            let missing: Vec<String> = registry
                .missing_alias_targets()
                .into_iter()
                .filter(|key| !attempted.contains(key))
                .collect();
            if missing.is_empty() {
                break;
            }
            attempted.extend(missing.iter().cloned());
            match remote.lookup(&missing).await {
                Ok(records) => registry.extend_remote(records),
                Err(error) => {
                    tracing::warn!(error = %error, "alias target lookup failed");
                    remote_available = false;
                    break;
                }
            }
        }
    }

    let resolution = Resolver::new(&registry)
        .with_remote_available(remote_available)
        .resolve(&occurrences);

    Ok(finish(resolution))
}

/// Format and assemble a completed resolution into document output. Split
/// out so callers that run their own fetch and registry construction can
/// still share the rendering tail of the pipeline.
pub fn finish(resolution: Resolution) -> DocumentReferences {
    let entries: Vec<FormattedEntry> = resolution.references.iter().map(format_reference).collect();
    DocumentReferences {
        lists: assemble(entries),
        cite_targets: resolution.cite_targets,
        diagnostics: resolution.diagnostics,
    }
}
