//! dynsearch - field-declarative search across document models.
//!
//! Search models declare, per entity type, which of its own attributes
//! and which attributes of related entity types participate in search.
//! A free-text query is normalized into terms (double-quoted phrases
//! stay together), each field must match every term, and field results
//! combine by union (simple search) or intersection (advanced search)
//! before access filtering.
//!
//! Persistence and access control stay behind the [`DataSource`] and
//! [`AccessPolicy`] traits; [`MemorySource`] and [`MemoryAccess`] are
//! the bundled in-memory implementations.
//!
//! # Quick start
//!
//! ```
//! use dynsearch::{
//!     MemoryAccess, MemorySource, Record, SearchModel, SearchRegistry,
//!     Searcher,
//! };
//!
//! let mut model = SearchModel::new("document", "Documents");
//! model.add_field("title", "Title");
//! model.add_related_field("tag", "name", "document_id", "Tags");
//!
//! let mut registry = SearchRegistry::new();
//! registry.register(model).unwrap();
//!
//! let mut source = MemorySource::new();
//! source.insert(
//!     "document",
//!     Record::new().with("id", "1").with("title", "Annual Report"),
//! );
//! source.insert(
//!     "tag",
//!     Record::new()
//!         .with("id", "10")
//!         .with("name", "annual")
//!         .with("document_id", "1"),
//! );
//!
//! let access = MemoryAccess::new();
//! let searcher = Searcher::new(&registry, &source, &access);
//! let results = searcher
//!     .simple_search("document", "annual report", "alice")
//!     .unwrap();
//! assert_eq!(results.records.len(), 1);
//! ```

pub mod access;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod search;
pub mod source;

pub use access::{AccessPolicy, MemoryAccess};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use predicate::Predicate;
pub use query::{assemble_query, normalize_query};
pub use registry::{SearchField, SearchModel, SearchRegistry};
pub use search::{SearchResults, Searcher};
pub use source::{DataSource, ID_ATTRIBUTE, MemorySource, Record};
