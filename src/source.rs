use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    predicate::Predicate,
};

/// Attribute every record stores its primary key under, and the default
/// projection for fields that belong directly to a search model.
pub const ID_ATTRIBUTE: &str = "id";

/// A flat attribute map for one persisted row.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute assignment.
    #[must_use]
    pub fn with(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.values.insert(attribute.into(), value.into());
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).map(String::as_str)
    }

    /// The record's primary key, when present.
    pub fn id(&self) -> Option<&str> {
        self.get(ID_ATTRIBUTE)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An opaque queryable store of entity records.
///
/// Implementations are read-only from the search core's point of view
/// and must deduplicate projected values themselves (set semantics).
pub trait DataSource {
    /// Return the set of `projection` values across rows of `entity`
    /// matching `predicate`.
    fn find(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &str,
    ) -> Result<HashSet<String>>;

    /// Project a set of primary keys back into `entity`'s record
    /// collection.
    fn fetch(
        &self,
        entity: &str,
        ids: &HashSet<String>,
    ) -> Result<Vec<Record>>;
}

/// In-memory [`DataSource`] backed by per-entity record lists.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<Record>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `entity` exists, even with no records. Searching an
    /// empty table yields empty results; searching an undeclared
    /// entity is a configuration error.
    pub fn declare(&mut self, entity: impl Into<String>) {
        self.tables.entry(entity.into()).or_default();
    }

    pub fn insert(&mut self, entity: impl Into<String>, record: Record) {
        self.tables.entry(entity.into()).or_default().push(record);
    }

    fn table(&self, entity: &str) -> Result<&[Record]> {
        self.tables
            .get(entity)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::NotFound {
                kind: "entity",
                name: entity.to_string(),
            })
    }
}

impl DataSource for MemorySource {
    fn find(
        &self,
        entity: &str,
        predicate: &Predicate,
        projection: &str,
    ) -> Result<HashSet<String>> {
        let mut values = HashSet::new();
        for row in self.table(entity)?.iter() {
            if !predicate.matches(row) {
                continue;
            }
            let value =
                row.get(projection).ok_or_else(|| Error::NotFound {
                    kind: "attribute",
                    name: format!("{entity}.{projection}"),
                })?;
            values.insert(value.to_string());
        }
        Ok(values)
    }

    fn fetch(
        &self,
        entity: &str,
        ids: &HashSet<String>,
    ) -> Result<Vec<Record>> {
        Ok(self
            .table(entity)?
            .iter()
            .filter(|row| row.id().is_some_and(|id| ids.contains(id)))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_source() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert(
            "document",
            Record::new().with("id", "1").with("title", "Annual Report"),
        );
        source.insert(
            "document",
            Record::new().with("id", "2").with("title", "Report Draft"),
        );
        source.insert(
            "tag",
            Record::new()
                .with("id", "10")
                .with("name", "annual")
                .with("document_id", "2"),
        );
        source.insert(
            "tag",
            Record::new()
                .with("id", "11")
                .with("name", "annual")
                .with("document_id", "1"),
        );
        source
    }

    #[test]
    fn find_projects_matching_rows() {
        let source = sample_source();
        let ids = source
            .find("document", &Predicate::contains("title", "report"), "id")
            .unwrap();
        assert_eq!(
            ids,
            HashSet::from(["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn find_deduplicates_projected_values() {
        let source = sample_source();
        let doc_ids = source
            .find("tag", &Predicate::contains("name", "annual"), "name")
            .unwrap();
        assert_eq!(doc_ids.len(), 1, "two rows share the projected value");
    }

    #[test]
    fn find_projects_join_columns() {
        let source = sample_source();
        let doc_ids = source
            .find(
                "tag",
                &Predicate::contains("name", "annual"),
                "document_id",
            )
            .unwrap();
        assert_eq!(
            doc_ids,
            HashSet::from(["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn declared_empty_table_is_searchable() {
        let mut source = MemorySource::new();
        source.declare("tag");

        let values = source
            .find("tag", &Predicate::contains("name", "annual"), "id")
            .unwrap();
        assert!(values.is_empty());

        let records = source.fetch("tag", &HashSet::new()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn find_unknown_entity_fails() {
        let source = sample_source();
        let err = source
            .find("folder", &Predicate::contains("name", "x"), "id")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound { kind: "entity", .. }
        ));
    }

    #[test]
    fn find_missing_projection_attribute_fails() {
        let source = sample_source();
        let err = source
            .find("document", &Predicate::contains("title", "report"), "uuid")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound { kind: "attribute", .. }
        ));
    }

    #[test]
    fn fetch_filters_by_id() {
        let source = sample_source();
        let records = source
            .fetch("document", &HashSet::from(["2".to_string()]))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("title"), Some("Report Draft"));
    }

    #[test]
    fn fetch_empty_id_set_is_empty() {
        let source = sample_source();
        let records =
            source.fetch("document", &HashSet::new()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn record_serde_round_trips_flat_maps() {
        let record =
            Record::new().with("id", "1").with("title", "Annual Report");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":"1","title":"Annual Report"}"#);
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
