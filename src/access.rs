use std::collections::{HashMap, HashSet};

use crate::{error::Result, source::Record};

/// External access-control collaborator.
///
/// A failed global check is not an error: the executor falls back to
/// per-object filtering through [`AccessPolicy::filter_by_access`].
pub trait AccessPolicy {
    /// Whether `principal` holds `capability` across all records.
    fn has_global(&self, principal: &str, capability: &str) -> bool;

    /// Restrict `candidates` to the records `principal` may view under
    /// `capability`. A principal with access to nothing yields an empty
    /// collection, never an error.
    fn filter_by_access(
        &self,
        capability: &str,
        principal: &str,
        candidates: Vec<Record>,
    ) -> Result<Vec<Record>>;
}

/// In-memory grants table implementing [`AccessPolicy`].
#[derive(Debug, Default)]
pub struct MemoryAccess {
    /// principal -> capabilities held globally.
    global: HashMap<String, HashSet<String>>,
    /// principal -> capability -> record ids accessible individually.
    objects: HashMap<String, HashMap<String, HashSet<String>>>,
}

impl MemoryAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_global(
        &mut self,
        principal: impl Into<String>,
        capability: impl Into<String>,
    ) {
        self.global
            .entry(principal.into())
            .or_default()
            .insert(capability.into());
    }

    pub fn grant_object(
        &mut self,
        principal: impl Into<String>,
        capability: impl Into<String>,
        record_id: impl Into<String>,
    ) {
        self.objects
            .entry(principal.into())
            .or_default()
            .entry(capability.into())
            .or_default()
            .insert(record_id.into());
    }
}

impl AccessPolicy for MemoryAccess {
    fn has_global(&self, principal: &str, capability: &str) -> bool {
        self.global
            .get(principal)
            .is_some_and(|caps| caps.contains(capability))
    }

    fn filter_by_access(
        &self,
        capability: &str,
        principal: &str,
        candidates: Vec<Record>,
    ) -> Result<Vec<Record>> {
        let allowed = self
            .objects
            .get(principal)
            .and_then(|caps| caps.get(capability));
        Ok(candidates
            .into_iter()
            .filter(|record| {
                record.id().is_some_and(|id| {
                    allowed.is_some_and(|ids| ids.contains(id))
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<Record> {
        vec![
            Record::new().with("id", "1"),
            Record::new().with("id", "2"),
            Record::new().with("id", "3"),
        ]
    }

    #[test]
    fn global_grant_is_per_capability() {
        let mut access = MemoryAccess::new();
        access.grant_global("alice", "document_view");

        assert!(access.has_global("alice", "document_view"));
        assert!(!access.has_global("alice", "document_delete"));
        assert!(!access.has_global("bob", "document_view"));
    }

    #[test]
    fn object_grants_filter_candidates() {
        let mut access = MemoryAccess::new();
        access.grant_object("bob", "document_view", "2");

        let kept = access
            .filter_by_access("document_view", "bob", candidates())
            .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id(), Some("2"));
    }

    #[test]
    fn no_grants_filters_to_nothing() {
        let access = MemoryAccess::new();
        let kept = access
            .filter_by_access("document_view", "bob", candidates())
            .unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn grants_do_not_leak_across_capabilities() {
        let mut access = MemoryAccess::new();
        access.grant_object("bob", "document_delete", "1");

        let kept = access
            .filter_by_access("document_view", "bob", candidates())
            .unwrap();
        assert!(kept.is_empty());
    }
}
