//! Declarative dataset files for the CLI: search models, records, and
//! access grants in one JSON document, loaded into the in-memory
//! collaborators at startup.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;

use crate::{
    access::MemoryAccess,
    error::{Error, Result},
    registry::{SearchModel, SearchRegistry},
    source::{MemorySource, Record},
};

#[derive(Debug, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub models: Vec<ModelSpec>,
    /// entity type -> record list.
    #[serde(default)]
    pub records: BTreeMap<String, Vec<Record>>,
    #[serde(default)]
    pub grants: Vec<GrantSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ModelSpec {
    pub entity: String,
    pub label: String,
    #[serde(default)]
    pub capability: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub related_fields: Vec<RelatedFieldSpec>,
}

#[derive(Debug, Deserialize)]
pub struct FieldSpec {
    pub attribute: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct RelatedFieldSpec {
    pub entity: String,
    pub attribute: String,
    /// Join column on the related entity holding the owning model's
    /// primary keys.
    pub projection: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct GrantSpec {
    pub principal: String,
    pub capability: String,
    /// Grant the capability across all records.
    #[serde(default)]
    pub global: bool,
    /// Ids of individually accessible records.
    #[serde(default)]
    pub records: Vec<String>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "cannot read dataset {}: {e}",
                path.display()
            ))
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Materialize the dataset into a registry, data source, and
    /// access policy.
    pub fn build(
        self,
    ) -> Result<(SearchRegistry, MemorySource, MemoryAccess)> {
        let mut registry = SearchRegistry::new();
        for declared in self.models {
            let mut model =
                SearchModel::new(declared.entity, declared.label);
            if let Some(capability) = declared.capability {
                model = model.with_capability(capability);
            }
            for field in declared.fields {
                model.add_field(field.attribute, field.label);
            }
            for field in declared.related_fields {
                model.add_related_field(
                    field.entity,
                    field.attribute,
                    field.projection,
                    field.label,
                );
            }
            registry.register(model)?;
        }

        // Every entity a model's fields reference must exist as a
        // table, even when the dataset carries no rows for it: an
        // empty table contributes an empty result set, while an
        // undeclared entity fails the search.
        let mut source = MemorySource::new();
        for model in registry.iter() {
            source.declare(model.entity());
            for field in model.fields() {
                source.declare(field.entity());
            }
        }
        for (entity, records) in self.records {
            source.declare(entity.as_str());
            for record in records {
                source.insert(entity.as_str(), record);
            }
        }

        let mut access = MemoryAccess::new();
        for grant in self.grants {
            if grant.global {
                access.grant_global(
                    grant.principal.as_str(),
                    grant.capability.as_str(),
                );
            }
            for id in grant.records {
                access.grant_object(
                    grant.principal.as_str(),
                    grant.capability.as_str(),
                    id,
                );
            }
        }

        Ok((registry, source, access))
    }
}
