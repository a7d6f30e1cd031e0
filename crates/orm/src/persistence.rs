//! Persistence operations - validate, run hooks, resolve the identifier, write
//!
//! `save` inserts models whose identifier is unset and otherwise replaces the
//! stored fields of the document addressed by the identifier. Any failure
//! (validation, hook, driver) is returned to the caller unchanged and stops
//! the operation at that step.

use chrono::Utc;
use serde_json::Value;

use crate::database::Database;
use crate::document::{from_document, id_filter, to_document, Document, ObjectId, ID_FIELD};
use crate::error::{ModelError, ModelResult};
use crate::hooks::{call_after_delete, call_after_find, call_before_delete, call_before_save};
use crate::model::{extract_id, validate_model, Model, TIMESTAMP_FIELDS};
use crate::query::{QueryBuilder, QueryOperator, SortDirection};

impl Database {
    /// Insert or update `model`
    ///
    /// Runs model validation, then `before_save`, then stamps the record
    /// timestamps. An unset identifier inserts and writes the assigned id back
    /// into the model; a set identifier `$set`s every field onto the stored
    /// document and fails with `NotFound` if nothing has that id. When the
    /// write fails the record keeps the timestamps it had before the call.
    pub async fn save<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        validate_model(model).await?;
        call_before_save(model).await?;

        let unstamped = model.record().clone();
        model.record_mut().set_timestamps(Utc::now());

        let written = self.write(model).await;
        if written.is_err() {
            *model.record_mut() = unstamped;
        }
        written
    }

    async fn write<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        let collection = self.collection::<M>();

        match extract_id(model) {
            None => {
                let document = to_document(model)?;
                let result = collection.insert_one(document).await?;
                let id = ObjectId::from_value(&result.inserted_id).ok_or_else(|| {
                    ModelError::Database(format!(
                        "Backend assigned a non-ObjectId identifier: {}",
                        result.inserted_id
                    ))
                })?;
                model.set_id(id);

                tracing::debug!(collection = M::collection_name(), id = %id, "inserted model");
            }
            Some(id) => {
                let update = replacement_update(to_document(model)?);
                let result = collection.update_one_by_id(id, &update).await?;
                if result.matched_count == 0 {
                    return Err(ModelError::NotFound(M::collection_name().to_string()));
                }

                tracing::debug!(
                    collection = M::collection_name(),
                    id = %id,
                    modified = result.modified_count,
                    "updated model"
                );
            }
        }

        Ok(())
    }

    /// Same pipeline as [`Database::save`]; used by archive and restore
    pub async fn publish<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        self.save(model).await
    }

    /// Load the document with `id` into `model`, then run `after_find`
    pub async fn find_by_id<M: Model>(&self, model: &mut M, id: ObjectId) -> ModelResult<()> {
        let document = self
            .collection::<M>()
            .find_one_by_id(id)
            .await?
            .ok_or_else(|| ModelError::NotFound(M::collection_name().to_string()))?;

        *model = from_document(document)?;
        call_after_find(model).await
    }

    /// Alias of [`Database::find_by_id`]
    pub async fn find<M: Model>(&self, model: &mut M, id: ObjectId) -> ModelResult<()> {
        self.find_by_id(model, id).await
    }

    /// Remove the document with `id`
    ///
    /// `before_delete` runs first and can veto. A driver failure is reported
    /// as is; a delete that removed nothing is `NotFound`. `after_delete` runs
    /// only once a document was removed.
    pub async fn delete<M: Model>(&self, model: &mut M, id: ObjectId) -> ModelResult<()> {
        call_before_delete(model).await?;

        let result = self.collection::<M>().delete_one_by_id(id).await?;
        if result.deleted_count == 0 {
            return Err(ModelError::NotFound(M::collection_name().to_string()));
        }

        tracing::debug!(collection = M::collection_name(), id = %id, "deleted model");
        call_after_delete(model).await
    }

    /// Soft delete: set the archive timestamp and persist
    pub async fn archive<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        match model.as_archivable() {
            Some(archivable) => archivable.archive(),
            None => return Err(missing_capability::<M>("archiving")),
        }
        self.publish(model).await
    }

    /// Undo [`Database::archive`]: clear the archive timestamp and persist
    pub async fn restore<M: Model>(&self, model: &mut M) -> ModelResult<()> {
        match model.as_archivable() {
            Some(archivable) => archivable.restore(),
            None => return Err(missing_capability::<M>("restoring")),
        }
        self.publish(model).await
    }

    /// Count `M` documents matching `filter`
    pub async fn count<M: Model>(&self, filter: Document) -> ModelResult<u64> {
        self.collection::<M>().count_documents(&filter).await
    }

    /// Start a query with one filter condition
    pub fn where_<T: Into<Value>>(&self, field: &str, operator: QueryOperator, value: T) -> QueryBuilder {
        self.query().where_op(field, operator, value)
    }

    /// Start a query with one sort key
    pub fn sort_by(&self, field: &str, direction: SortDirection) -> QueryBuilder {
        self.query().order_by(field, direction)
    }

    /// Start a query with a result limit
    pub fn limit(&self, count: i64) -> QueryBuilder {
        self.query().limit(count)
    }

    pub fn skip(&self, count: u64) -> QueryBuilder {
        self.query().skip(count)
    }
}

fn missing_capability<M: Model>(operation: &'static str) -> ModelError {
    ModelError::MissingCapability {
        collection: M::collection_name().to_string(),
        operation,
    }
}

/// `$set` every stored field; `$unset` record timestamps the model no longer has
fn replacement_update(mut fields: Document) -> Document {
    fields.remove(ID_FIELD);

    let mut cleared = Document::new();
    for field in TIMESTAMP_FIELDS {
        if !fields.contains_key(field) {
            cleared.insert(field.to_string(), Value::String(String::new()));
        }
    }

    let mut update = Document::new();
    update.insert("$set".to_string(), Value::Object(fields));
    if !cleared.is_empty() {
        update.insert("$unset".to_string(), Value::Object(cleared));
    }
    update
}
