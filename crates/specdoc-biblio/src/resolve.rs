//! Occurrence resolution and reconciliation.
//!
//! The resolver consumes extracted occurrences and a built registry and
//! produces, in one synchronous pass: the resolved references in
//! first-seen order, the per-occurrence anchor targets, and a collected
//! diagnostics value for everything that did not resolve. Per-key failures
//! never abort the pass; partial success is the normal outcome.

use crate::error::Error;
use crate::extract::{CitationOccurrence, Span};
use crate::format::anchor_id;
use crate::registry::Registry;
use hashlink::LinkedHashMap;
use specdoc_bibref::BiblioRecord;
use std::collections::BTreeMap;

/// All occurrences of one reference collapsed into a single entry.
///
/// Occurrences are grouped by the marker key as written; a key cited both
/// ways is promoted to normative (strongest classification wins). Within a
/// classification, keys resolving to the same canonical record collapse
/// into one entry whose display key is the first-seen marker text.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReference {
    /// Canonical key after alias resolution.
    pub canonical_key: String,

    /// The terminal record the entry renders from.
    pub record: BiblioRecord,

    /// True if any contributing occurrence was marked normative.
    pub normative: bool,

    /// Marker text of the first-seen contributing occurrence.
    pub display_key: String,

    /// How many occurrences collapsed into this entry.
    pub occurrence_count: usize,

    /// Spans of the contributing occurrences, in document order.
    pub spans: Vec<Span>,
}

/// Anchor outcome for one citation site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CiteTarget {
    /// The in-text link targets this anchor id.
    Anchor(String),

    /// The key did not resolve; the citation site should stay visibly
    /// flagged rather than silently disappearing.
    Unresolved,
}

/// Why a key failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No usable record in the local overrides or the remote response.
    NotFound,

    /// The `aliasOf` chain revisited a key or ran past the hop limit.
    AliasCycle { chain: Vec<String> },

    /// The remote service was unreachable and no local override covered
    /// the key.
    RemoteUnavailable,
}

/// One unresolved key with the citation sites it was seen at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedKey {
    pub key: String,
    pub reason: UnresolvedReason,
    pub spans: Vec<Span>,
}

/// Collected per-pass diagnostics, surfaced alongside the output lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionDiagnostics {
    /// Keys omitted from the output lists, in first-seen order.
    pub unresolved: Vec<UnresolvedKey>,

    /// Advisory flag: the remote service produced no data this pass.
    pub remote_unavailable: bool,
}

/// Everything one resolution pass over a set of occurrences produces.
#[derive(Debug)]
pub struct Resolution {
    /// Resolved references in first-seen order. Final list order is a
    /// sorting concern and is applied at assembly, not here.
    pub references: Vec<ResolvedReference>,

    /// Anchor outcome per citation site, keyed by marker span.
    pub cite_targets: BTreeMap<Span, CiteTarget>,

    pub diagnostics: ResolutionDiagnostics,
}

/// Per-raw-key fold state.
struct RawGroup {
    normative: bool,
    spans: Vec<Span>,
    outcome: RawOutcome,
}

enum RawOutcome {
    Resolved(String),
    Failed(UnresolvedReason),
}

/// Resolves extracted occurrences against a built registry.
pub struct Resolver<'r> {
    registry: &'r Registry,
    remote_available: bool,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            remote_available: true,
        }
    }

    /// Record whether the remote service produced data this pass. When it
    /// did not, keys missing from the registry are reported as
    /// `RemoteUnavailable` rather than `NotFound`.
    pub fn with_remote_available(mut self, available: bool) -> Self {
        self.remote_available = available;
        self
    }

    /// Resolve a set of occurrences. Resolving the same occurrences twice
    /// against an unchanged registry yields identical output.
    pub fn resolve(&self, occurrences: &[CitationOccurrence]) -> Resolution {
        // Fold occurrences into per-raw-key groups, first-seen order. The
        // classification OR has to complete before entries are built, so
        // this is a two-pass fold.
        let mut raws: LinkedHashMap<String, RawGroup> = LinkedHashMap::new();
        for occurrence in occurrences {
            let group = raws
                .entry(occurrence.raw_key.clone())
                .or_insert_with(|| RawGroup {
                    normative: false,
                    spans: Vec::new(),
                    outcome: self.classify(&occurrence.raw_key),
                });
            group.normative |= occurrence.normative;
            group.spans.push(occurrence.span);
        }

        // Collapse raw keys into entries: one per (canonical key,
        // classification), first-seen marker text as display key.
        let mut references: LinkedHashMap<(String, bool), ResolvedReference> =
            LinkedHashMap::new();
        let mut unresolved: Vec<UnresolvedKey> = Vec::new();
        let mut cite_targets: BTreeMap<Span, CiteTarget> = BTreeMap::new();

        for (raw_key, group) in &raws {
            match &group.outcome {
                RawOutcome::Resolved(canonical) => {
                    let anchor = anchor_id(canonical);
                    for span in &group.spans {
                        cite_targets.insert(*span, CiteTarget::Anchor(anchor.clone()));
                    }
                    let entry = references
                        .entry((canonical.clone(), group.normative))
                        .or_insert_with(|| ResolvedReference {
                            canonical_key: canonical.clone(),
                            record: self
                                .registry
                                .get(canonical)
                                .cloned()
                                .unwrap_or_default(),
                            normative: group.normative,
                            display_key: raw_key.clone(),
                            occurrence_count: 0,
                            spans: Vec::new(),
                        });
                    entry.occurrence_count += group.spans.len();
                    entry.spans.extend(group.spans.iter().copied());
                }
                RawOutcome::Failed(reason) => {
                    tracing::debug!(key = %raw_key, ?reason, "citation key did not resolve");
                    for span in &group.spans {
                        cite_targets.insert(*span, CiteTarget::Unresolved);
                    }
                    unresolved.push(UnresolvedKey {
                        key: raw_key.clone(),
                        reason: reason.clone(),
                        spans: group.spans.clone(),
                    });
                }
            }
        }

        Resolution {
            references: references.into_iter().map(|(_, entry)| entry).collect(),
            cite_targets,
            diagnostics: ResolutionDiagnostics {
                unresolved,
                remote_unavailable: !self.remote_available,
            },
        }
    }

    fn classify(&self, raw_key: &str) -> RawOutcome {
        match self.registry.resolve_alias(raw_key) {
            Ok(canonical) => match self.registry.get(canonical) {
                Some(record) if record.title.is_some() => {
                    RawOutcome::Resolved(canonical.to_string())
                }
                // A record with no title and no alias target is unusable.
                Some(_) => RawOutcome::Failed(UnresolvedReason::NotFound),
                None if self.remote_available => {
                    RawOutcome::Failed(UnresolvedReason::NotFound)
                }
                None => RawOutcome::Failed(UnresolvedReason::RemoteUnavailable),
            },
            Err(Error::AliasCycle { chain }) => {
                RawOutcome::Failed(UnresolvedReason::AliasCycle { chain })
            }
            // resolve_alias only fails with a cycle; anything else is
            // treated as an absent record.
            Err(_) => RawOutcome::Failed(UnresolvedReason::NotFound),
        }
    }
}
