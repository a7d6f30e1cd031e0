//! Identifier resolution - decide insert vs update from a model's id

use crate::document::ObjectId;
use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::Model;

/// True when the model has never been assigned an identifier
pub fn is_unset<M: Model>(model: &M) -> bool {
    model.id().is_nil()
}

/// The model's identifier, or `None` while unset
pub fn extract_id<M: Model>(model: &M) -> Option<ObjectId> {
    let id = model.id();
    if id.is_nil() {
        None
    } else {
        Some(id)
    }
}

/// Like [`extract_id`], failing with `NoIdentifier` when unset
pub fn require_id<M: Model>(model: &M) -> ModelResult<ObjectId> {
    extract_id(model).ok_or_else(|| ModelError::NoIdentifier(M::collection_name().to_string()))
}
