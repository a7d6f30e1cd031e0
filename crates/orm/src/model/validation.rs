//! Model validation - the self-validating capability and its dispatcher

use async_trait::async_trait;
use mox_validation::ValidationResult;

use crate::error::ModelResult;
use crate::model::core_trait::Model;

/// Capability for models that check their own state before being saved
#[async_trait]
pub trait Validatable: Send + Sync {
    async fn validate(&self) -> ValidationResult<()>;
}

/// Run the model's own validation, if it has any
pub async fn validate_model<M: Model>(model: &M) -> ModelResult<()> {
    match model.as_validatable() {
        Some(validatable) => validatable.validate().await.map_err(Into::into),
        None => Ok(()),
    }
}
