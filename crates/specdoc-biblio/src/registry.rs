//! Layered record registry and alias resolution.
//!
//! The registry is a read-only view over two immutable mappings: the
//! document-local override table and the remote fetch result. Lookups try
//! the local layer first; a same-key local record entirely replaces the
//! remote one, with no field-level merging.

use crate::error::{Error, Result};
use specdoc_bibref::{BiblioRecord, RefMap};

/// Upper bound on alias indirections followed from a single key.
pub const MAX_ALIAS_HOPS: usize = 10;

/// Merged read-only view of local overrides layered over remote records.
#[derive(Debug, Default)]
pub struct Registry {
    local: RefMap,
    remote: RefMap,
}

impl Registry {
    /// Build a registry, validating the local override table.
    ///
    /// A local record with neither a title nor an alias target makes the
    /// table structurally invalid; this is the only fatal condition of a
    /// resolution pass. Remote records are never validated here — a
    /// useless remote record just leaves its key unresolved later.
    pub fn build(local: RefMap, remote: RefMap) -> Result<Self> {
        for (key, record) in &local {
            if record.title.is_none() && record.alias_of.is_none() {
                return Err(Error::MalformedOverride {
                    key: key.clone(),
                    message: "record has neither a title nor an aliasOf target".to_string(),
                });
            }
        }
        Ok(Self { local, remote })
    }

    /// Look up a record by exact key, local layer first.
    pub fn get(&self, key: &str) -> Option<&BiblioRecord> {
        self.local.get(key).or_else(|| self.remote.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.local.contains_key(key) || self.remote.contains_key(key)
    }

    /// Add late-fetched remote records. Keys already present in the remote
    /// layer keep their existing record, so earlier fetch rounds win.
    pub fn extend_remote(&mut self, records: RefMap) {
        for (key, record) in records {
            self.remote.entry(key).or_insert(record);
        }
    }

    /// Alias targets referenced by any record but absent from both layers,
    /// in sorted order.
    pub fn missing_alias_targets(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .local
            .values()
            .chain(self.remote.values())
            .filter_map(|record| record.alias_of.as_deref())
            .filter(|target| !self.contains(target))
            .map(|target| target.to_string())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Follow `aliasOf` indirections from `key` to a canonical key.
    ///
    /// Keys are matched exactly as written in the document; case folding
    /// is a sort-time concern only. The returned key is the first one in
    /// the chain whose record has no alias target — or the key itself when
    /// it is absent from both layers (the caller's record lookup then
    /// reports the absence).
    ///
    /// A chain that revisits a key or runs past [`MAX_ALIAS_HOPS`] fails
    /// with [`Error::AliasCycle`] naming the whole chain. This fails that
    /// single key's resolution, not the pass.
    pub fn resolve_alias<'k>(&'k self, key: &'k str) -> Result<&'k str> {
        let mut chain: Vec<&str> = vec![key];
        let mut current = key;

        for _ in 0..=MAX_ALIAS_HOPS {
            let target = match self.get(current).and_then(|r| r.alias_of.as_deref()) {
                Some(target) => target,
                None => return Ok(current),
            };
            if chain.contains(&target) {
                chain.push(target);
                return Err(Error::AliasCycle {
                    chain: chain.iter().map(|k| k.to_string()).collect(),
                });
            }
            chain.push(target);
            current = target;
        }

        Err(Error::AliasCycle {
            chain: chain.iter().map(|k| k.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal(title: &str) -> BiblioRecord {
        BiblioRecord {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn alias(target: &str) -> BiblioRecord {
        BiblioRecord {
            alias_of: Some(target.to_string()),
            ..Default::default()
        }
    }

    fn map(entries: &[(&str, BiblioRecord)]) -> RefMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_local_record_replaces_remote() {
        let registry = Registry::build(
            map(&[("dom", terminal("Local DOM"))]),
            map(&[("dom", terminal("Remote DOM"))]),
        )
        .unwrap();

        assert_eq!(
            registry.get("dom").unwrap().title.as_deref(),
            Some("Local DOM")
        );
    }

    #[test]
    fn test_local_alias_replaces_remote_terminal() {
        let registry = Registry::build(
            map(&[("dom", alias("dom-living"))]),
            map(&[
                ("dom", terminal("Remote DOM")),
                ("dom-living", terminal("DOM Living Standard")),
            ]),
        )
        .unwrap();

        let canonical = registry.resolve_alias("dom").unwrap();
        assert_eq!(canonical, "dom-living");
    }

    #[test]
    fn test_build_rejects_malformed_local_record() {
        let bad = BiblioRecord {
            publisher: Some("Publisher Here".to_string()),
            ..Default::default()
        };
        let result = Registry::build(map(&[("broken", bad)]), RefMap::new());
        assert!(matches!(
            result,
            Err(Error::MalformedOverride { key, .. }) if key == "broken"
        ));
    }

    #[test]
    fn test_build_tolerates_malformed_remote_record() {
        let bad = BiblioRecord {
            publisher: Some("Publisher Here".to_string()),
            ..Default::default()
        };
        let registry = Registry::build(RefMap::new(), map(&[("broken", bad)])).unwrap();
        assert!(registry.contains("broken"));
    }

    #[test]
    fn test_alias_chain_resolves() {
        let registry = Registry::build(
            map(&[
                ("FOOBARGLOP", alias("BARBAR")),
                ("BARBAR", terminal("The BARBAR Spec")),
            ]),
            RefMap::new(),
        )
        .unwrap();

        assert_eq!(registry.resolve_alias("FOOBARGLOP").unwrap(), "BARBAR");
        assert_eq!(registry.resolve_alias("BARBAR").unwrap(), "BARBAR");
    }

    #[test]
    fn test_absent_key_resolves_to_itself() {
        let registry = Registry::build(RefMap::new(), RefMap::new()).unwrap();
        assert_eq!(registry.resolve_alias("ghost").unwrap(), "ghost");
    }

    #[test]
    fn test_alias_lookup_is_case_sensitive() {
        let registry = Registry::build(
            RefMap::new(),
            map(&[("DOM", alias("dom")), ("dom", terminal("DOM Standard"))]),
        )
        .unwrap();

        assert_eq!(registry.resolve_alias("DOM").unwrap(), "dom");
        // Unknown casing is its own key, not a match for "DOM" or "dom".
        assert_eq!(registry.resolve_alias("Dom").unwrap(), "Dom");
    }

    #[test]
    fn test_two_node_cycle_is_detected() {
        let registry = Registry::build(
            RefMap::new(),
            map(&[("a", alias("b")), ("b", alias("a"))]),
        )
        .unwrap();

        match registry.resolve_alias("a") {
            Err(Error::AliasCycle { chain }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected alias cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_alias_is_detected() {
        let registry =
            Registry::build(RefMap::new(), map(&[("me", alias("me"))])).unwrap();
        assert!(matches!(
            registry.resolve_alias("me"),
            Err(Error::AliasCycle { .. })
        ));
    }

    #[test]
    fn test_chain_at_hop_limit_resolves() {
        // k0 -> k1 -> ... -> k10, ten hops ending at a terminal record.
        let mut entries = Vec::new();
        for i in 0..MAX_ALIAS_HOPS {
            entries.push((format!("k{}", i), alias(&format!("k{}", i + 1))));
        }
        entries.push((format!("k{}", MAX_ALIAS_HOPS), terminal("Deep")));
        let remote: RefMap = entries.into_iter().collect();
        let registry = Registry::build(RefMap::new(), remote).unwrap();

        assert_eq!(registry.resolve_alias("k0").unwrap(), "k10");
    }

    #[test]
    fn test_chain_past_hop_limit_fails() {
        let mut entries = Vec::new();
        for i in 0..=MAX_ALIAS_HOPS + 1 {
            entries.push((format!("k{}", i), alias(&format!("k{}", i + 1))));
        }
        entries.push((format!("k{}", MAX_ALIAS_HOPS + 2), terminal("Too deep")));
        let remote: RefMap = entries.into_iter().collect();
        let registry = Registry::build(RefMap::new(), remote).unwrap();

        assert!(matches!(
            registry.resolve_alias("k0"),
            Err(Error::AliasCycle { .. })
        ));
    }

    #[test]
    fn test_extend_remote_keeps_existing_entries() {
        let mut registry = Registry::build(
            RefMap::new(),
            map(&[("dom", terminal("First fetch"))]),
        )
        .unwrap();

        registry.extend_remote(map(&[
            ("dom", terminal("Second fetch")),
            ("html", terminal("HTML Standard")),
        ]));

        assert_eq!(
            registry.get("dom").unwrap().title.as_deref(),
            Some("First fetch")
        );
        assert!(registry.contains("html"));
    }

    #[test]
    fn test_missing_alias_targets() {
        let registry = Registry::build(
            map(&[("a", alias("covered"))]),
            map(&[
                ("covered", terminal("Covered")),
                ("b", alias("zeta")),
                ("c", alias("alpha")),
            ]),
        )
        .unwrap();

        assert_eq!(registry.missing_alias_targets(), vec!["alpha", "zeta"]);
    }
}
