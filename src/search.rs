use std::{
    collections::{BTreeMap, HashSet},
    time::{Duration, Instant},
};

use tracing::debug;

use crate::{
    access::AccessPolicy,
    error::{Error, Result},
    query::{assemble_query, normalize_query},
    registry::{SearchField, SearchModel, SearchRegistry},
    source::{DataSource, Record},
};

/// How per-field result sets combine within one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combine {
    /// Any field matching suffices (simple search).
    Union,
    /// Every constrained field must match (advanced search).
    Intersect,
}

/// The records that satisfied a search, after access filtering, plus
/// the elapsed wall-clock time for the whole execution.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub records: Vec<Record>,
    pub elapsed: Duration,
}

/// One field's contribution to a search: the attribute to test on its
/// entity type and the normalized terms it must match.
struct FieldSearch<'a> {
    field: &'a SearchField,
    terms: Vec<String>,
}

/// Stateless search executor over a registry and its collaborators.
pub struct Searcher<'a> {
    registry: &'a SearchRegistry,
    source: &'a dyn DataSource,
    access: &'a dyn AccessPolicy,
}

impl<'a> Searcher<'a> {
    pub fn new(
        registry: &'a SearchRegistry,
        source: &'a dyn DataSource,
        access: &'a dyn AccessPolicy,
    ) -> Self {
        Self {
            registry,
            source,
            access,
        }
    }

    /// Free-text search across every field declared on `entity`'s
    /// model. Each field must match all terms of `query`; fields are
    /// combined by union.
    pub fn simple_search(
        &self,
        entity: &str,
        query: &str,
        principal: &str,
    ) -> Result<SearchResults> {
        let model = self.registry.get(entity)?;
        let terms = normalize_query(query);
        debug!(entity, ?terms, "simple search");

        let mut plan: BTreeMap<&str, Vec<FieldSearch<'_>>> =
            BTreeMap::new();
        for field in model.fields() {
            plan.entry(field.entity()).or_default().push(FieldSearch {
                field,
                terms: terms.clone(),
            });
        }

        self.execute(model, &plan, Combine::Union, principal)
    }

    /// Structured search with explicit per-field constraints, combined
    /// by intersection within each entity type.
    ///
    /// Callers must omit fields they have no value for: an empty or
    /// whitespace-only value is rejected, and an unknown field key
    /// fails the whole search with no partial results.
    pub fn advanced_search(
        &self,
        entity: &str,
        constraints: &BTreeMap<String, String>,
        principal: &str,
    ) -> Result<SearchResults> {
        let model = self.registry.get(entity)?;
        debug!(entity, ?constraints, "advanced search");

        let mut plan: BTreeMap<&str, Vec<FieldSearch<'_>>> =
            BTreeMap::new();
        for (key, value) in constraints {
            if value.trim().is_empty() {
                return Err(Error::EmptyConstraint(key.clone()));
            }
            let field = model.field(key)?;
            plan.entry(field.entity()).or_default().push(FieldSearch {
                field,
                terms: normalize_query(value),
            });
        }

        self.execute(model, &plan, Combine::Intersect, principal)
    }

    fn execute(
        &self,
        model: &SearchModel,
        plan: &BTreeMap<&str, Vec<FieldSearch<'_>>>,
        combine: Combine,
        principal: &str,
    ) -> Result<SearchResults> {
        let started = Instant::now();

        // Primary-entity ids surviving each entity type's fields,
        // unioned across entity types.
        let mut combined: HashSet<String> = HashSet::new();

        for (&entity, searches) in plan {
            let mut entity_set: Option<HashSet<String>> = None;

            for search in searches {
                let groups = assemble_query(
                    &search.terms,
                    &[search.field.attribute()],
                );
                if groups.is_empty() {
                    // No terms means no positive constraint from this
                    // field, in either combination mode.
                    continue;
                }

                // Intersect the per-term sets: a row matches the field
                // only when every term matches it.
                let mut field_set: Option<HashSet<String>> = None;
                for predicate in &groups {
                    let term_set = self.source.find(
                        entity,
                        predicate,
                        search.field.projection(),
                    )?;
                    field_set = Some(match field_set {
                        None => term_set,
                        Some(previous) => &previous & &term_set,
                    });
                }
                let field_set = field_set.unwrap_or_default();
                debug!(
                    entity,
                    field = %search.field.full_name(),
                    matches = field_set.len(),
                    "field result"
                );

                entity_set = Some(match (combine, entity_set) {
                    (_, None) => field_set,
                    (Combine::Union, Some(previous)) => {
                        &previous | &field_set
                    }
                    (Combine::Intersect, Some(previous)) => {
                        &previous & &field_set
                    }
                });
            }

            if let Some(set) = entity_set {
                debug!(entity, matches = set.len(), "entity result");
                combined.extend(set);
            }
        }

        let candidates = self.source.fetch(model.entity(), &combined)?;

        let records = match model.capability() {
            None => candidates,
            Some(capability) => {
                if self.access.has_global(principal, capability) {
                    candidates
                } else {
                    // No global grant: fall back to the records the
                    // principal has specific access to.
                    debug!(
                        principal,
                        capability, "falling back to per-object filtering"
                    );
                    self.access.filter_by_access(
                        capability, principal, candidates,
                    )?
                }
            }
        };

        Ok(SearchResults {
            records,
            elapsed: started.elapsed(),
        })
    }
}
