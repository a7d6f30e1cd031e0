//! # mox-orm: Object-Document Mapper
//!
//! Thin mapping layer over a document database driver: models with an
//! embedded base record, opt-in lifecycle hooks, validation and soft delete,
//! a persistence façade (`save`, `find_by_id`, `delete`, `archive`,
//! `restore`), an accumulating query builder, relationship descriptors and
//! scoped sessions. Storage, indexing and transactions belong to the driver
//! behind [`backends::DocumentBackend`]; an in-memory driver is bundled.

pub mod backends;
pub mod client;
pub mod collection;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod hook_error;
pub mod hooks;
pub mod model;
pub mod persistence;
pub mod query;
pub mod relationships;
pub mod session;

pub use backends::{
    BackendType, DocumentBackend, DocumentSession, FindOptions, MemoryBackend, Namespace, SharedSession,
};
pub use client::Client;
pub use collection::Collection;
pub use config::ClientOptions;
pub use database::Database;
pub use document::{from_document, id_filter, to_document, Document, ObjectId, ID_FIELD};
pub use error::{ModelError, ModelResult, OrmError, OrmResult};
pub use hook_error::HookError;
pub use hooks::{HookPoint, Hookable};
pub use model::{extract_id, is_unset, require_id, validate_model, Archivable, Model, Record, Validatable};
pub use query::{QueryBuilder, QueryOperator, SortDirection};
pub use relationships::{Relationship, RelationshipType};
pub use session::{Session, SessionContext};

pub use mox_validation as validation;

/// Everything needed to define and persist models
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::{
        Archivable, Client, ClientOptions, Database, Document, HookError, Hookable, Model,
        ModelError, ModelResult, ObjectId, QueryOperator, Record, Relationship, SortDirection,
        Validatable,
    };
    pub use mox_validation::{validate_fields, Field, Rule, ValidationError, ValidationErrors, ValidationResult};
}
