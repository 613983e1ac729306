use crate::{
    error::{Error, Result},
    source::ID_ATTRIBUTE,
};

/// Where a search field lives relative to its owning model.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldScope {
    /// An attribute of the owning model's own entity type.
    Own,
    /// An attribute on a related entity type; `projection` is the join
    /// column whose values are the owning entity's primary keys.
    Related { entity: String, projection: String },
}

/// One searchable attribute declared on a [`SearchModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    owner: String,
    attribute: String,
    label: String,
    scope: FieldScope,
}

impl SearchField {
    /// Key used to look the field up: the bare attribute for own
    /// fields, `related_entity.attribute` for related fields.
    pub fn full_name(&self) -> String {
        match &self.scope {
            FieldScope::Own => self.attribute.clone(),
            FieldScope::Related { entity, .. } => {
                format!("{entity}.{}", self.attribute)
            }
        }
    }

    /// The entity type this field is queried against.
    pub fn entity(&self) -> &str {
        match &self.scope {
            FieldScope::Own => &self.owner,
            FieldScope::Related { entity, .. } => entity,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The attribute projected out of matching rows. Own fields project
    /// the primary key; related fields project their join column.
    pub fn projection(&self) -> &str {
        match &self.scope {
            FieldScope::Own => ID_ATTRIBUTE,
            FieldScope::Related { projection, .. } => projection,
        }
    }

    pub fn is_related(&self) -> bool {
        matches!(self.scope, FieldScope::Related { .. })
    }
}

/// The searchable-field declaration for one primary entity type.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SearchModel {
    entity: String,
    label: String,
    capability: Option<String>,
    fields: Vec<SearchField>,
}

impl SearchModel {
    pub fn new(
        entity: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            label: label.into(),
            capability: None,
            fields: Vec::new(),
        }
    }

    /// Require `capability` to view results; principals without the
    /// global grant are filtered per record instead.
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = Some(capability.into());
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capability(&self) -> Option<&str> {
        self.capability.as_deref()
    }

    /// Declare a searchable attribute of the model's own entity type.
    pub fn add_field(
        &mut self,
        attribute: impl Into<String>,
        label: impl Into<String>,
    ) {
        let owner = self.entity.clone();
        self.push_field(SearchField {
            owner,
            attribute: attribute.into(),
            label: label.into(),
            scope: FieldScope::Own,
        });
    }

    /// Declare a searchable attribute on a related entity type.
    /// `projection` is the related entity's column holding this model's
    /// primary keys.
    pub fn add_related_field(
        &mut self,
        related_entity: impl Into<String>,
        attribute: impl Into<String>,
        projection: impl Into<String>,
        label: impl Into<String>,
    ) {
        let owner = self.entity.clone();
        self.push_field(SearchField {
            owner,
            attribute: attribute.into(),
            label: label.into(),
            scope: FieldScope::Related {
                entity: related_entity.into(),
                projection: projection.into(),
            },
        });
    }

    // Re-declaring a full name replaces the earlier definition in
    // place, keeping first-registration order.
    fn push_field(&mut self, field: SearchField) {
        let full_name = field.full_name();
        match self
            .fields
            .iter_mut()
            .find(|existing| existing.full_name() == full_name)
        {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn fields(&self) -> &[SearchField] {
        &self.fields
    }

    pub fn field(&self, full_name: &str) -> Result<&SearchField> {
        self.fields
            .iter()
            .find(|field| field.full_name() == full_name)
            .ok_or_else(|| Error::NotFound {
                kind: "search field",
                name: format!("{}.{full_name}", self.entity),
            })
    }

    /// `(full_name, label)` pairs in registration order, for field
    /// enumeration by callers such as a search form.
    pub fn field_listing(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|field| (field.full_name(), field.label.clone()))
            .collect()
    }
}

/// Explicitly constructed catalog of search models.
///
/// Populated during process initialization and append-only afterwards;
/// shared references are safe to read concurrently.
#[derive(Debug, Default)]
pub struct SearchRegistry {
    models: Vec<SearchModel>,
}

impl SearchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model. Registering the same entity type twice is a
    /// configuration error, surfaced immediately.
    pub fn register(&mut self, model: SearchModel) -> Result<()> {
        if self.models.iter().any(|m| m.entity == model.entity) {
            return Err(Error::DuplicateModel(model.entity));
        }
        self.models.push(model);
        Ok(())
    }

    pub fn get(&self, entity: &str) -> Result<&SearchModel> {
        self.models
            .iter()
            .find(|model| model.entity == entity)
            .ok_or_else(|| Error::NotFound {
                kind: "search model",
                name: entity.to_string(),
            })
    }

    /// All registered models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SearchModel> {
        self.models.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_model() -> SearchModel {
        let mut model = SearchModel::new("document", "Documents")
            .with_capability("document_view");
        model.add_field("title", "Title");
        model.add_field("description", "Description");
        model.add_related_field("tag", "name", "document_id", "Tags");
        model
    }

    #[test]
    fn own_field_full_name_is_the_attribute() {
        let model = document_model();
        let field = model.field("title").unwrap();
        assert_eq!(field.full_name(), "title");
        assert_eq!(field.entity(), "document");
        assert_eq!(field.projection(), "id");
        assert!(!field.is_related());
    }

    #[test]
    fn related_field_full_name_is_qualified() {
        let model = document_model();
        let field = model.field("tag.name").unwrap();
        assert_eq!(field.entity(), "tag");
        assert_eq!(field.attribute(), "name");
        assert_eq!(field.projection(), "document_id");
        assert!(field.is_related());
    }

    #[test]
    fn unknown_field_is_not_found() {
        let model = document_model();
        let err = model.field("author").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "search field", .. }));
    }

    #[test]
    fn field_listing_preserves_registration_order() {
        let model = document_model();
        let listing = model.field_listing();
        assert_eq!(
            listing,
            vec![
                ("title".to_string(), "Title".to_string()),
                ("description".to_string(), "Description".to_string()),
                ("tag.name".to_string(), "Tags".to_string()),
            ]
        );
    }

    #[test]
    fn redeclaring_a_field_replaces_in_place() {
        let mut model = document_model();
        model.add_field("title", "Document Title");

        let listing = model.field_listing();
        assert_eq!(listing.len(), 3);
        assert_eq!(
            listing[0],
            ("title".to_string(), "Document Title".to_string()),
            "replacement keeps first-registration order"
        );
    }

    #[test]
    fn duplicate_model_registration_fails() {
        let mut registry = SearchRegistry::new();
        registry.register(document_model()).unwrap();

        let err = registry.register(document_model()).unwrap_err();
        assert!(matches!(err, Error::DuplicateModel(entity) if entity == "document"));
    }

    #[test]
    fn get_unknown_model_is_not_found() {
        let registry = SearchRegistry::new();
        let err = registry.get("folder").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "search model", .. }));
    }

    #[test]
    fn iter_preserves_registration_order() {
        let mut registry = SearchRegistry::new();
        registry.register(document_model()).unwrap();
        registry
            .register(SearchModel::new("folder", "Folders"))
            .unwrap();

        let entities: Vec<&str> =
            registry.iter().map(SearchModel::entity).collect();
        assert_eq!(entities, vec!["document", "folder"]);
    }

    #[test]
    fn capability_is_optional() {
        let model = SearchModel::new("folder", "Folders");
        assert_eq!(model.capability(), None);
        assert_eq!(
            document_model().capability(),
            Some("document_view")
        );
    }
}
