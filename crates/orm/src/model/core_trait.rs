//! Core Model Trait - Base definition for persistable documents
//!
//! A model names its collection and exposes the embedded [`Record`] that
//! carries its identifier and timestamps. Optional behaviour (hooks,
//! validation, soft delete) is opted into by overriding the `as_*`
//! capability accessors; the defaults opt out.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::ObjectId;
use crate::hooks::Hookable;
use crate::model::record::{Archivable, Record};
use crate::model::validation::Validatable;

/// Core trait for documents persisted through the mapper
pub trait Model: Send + Sync + Debug + Serialize + DeserializeOwned {
    /// Collection this model is stored in
    fn collection_name() -> &'static str;

    /// The embedded base record
    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    /// Identifier of this instance; nil when never persisted
    fn id(&self) -> ObjectId {
        self.record().id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.record_mut().id = id;
    }

    /// Lifecycle hooks, if this model has any
    fn as_hookable(&mut self) -> Option<&mut dyn Hookable> {
        None
    }

    /// Model-level validation, if this model has any
    fn as_validatable(&self) -> Option<&dyn Validatable> {
        None
    }

    /// Soft-delete support, if this model allows archiving
    fn as_archivable(&mut self) -> Option<&mut dyn Archivable> {
        None
    }
}
