//! Relationship descriptor - declarative link from a parent to related documents
//!
//! Built once with the fluent constructors and loaded on demand. With a
//! pipeline attached, loading runs an aggregation whose first stage is a
//! `$match` on the relationship's selector; otherwise it runs a plain find
//! with the same selector and the attached read options.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::metadata::{RelationshipType, DEFAULT_FOREIGN_KEY};
use crate::backends::FindOptions;
use crate::database::Database;
use crate::document::{from_document, Document};
use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    kind: RelationshipType,
    collection: String,
    foreign_key: String,
    pipeline: Vec<Document>,
    options: Option<FindOptions>,
}

impl Relationship {
    fn new(kind: RelationshipType, collection: &str) -> Self {
        Self {
            kind,
            collection: collection.to_string(),
            foreign_key: DEFAULT_FOREIGN_KEY.to_string(),
            pipeline: Vec::new(),
            options: None,
        }
    }

    pub fn belongs_to(collection: &str) -> Self {
        Self::new(RelationshipType::BelongsTo, collection)
    }

    pub fn has_many(collection: &str) -> Self {
        Self::new(RelationshipType::HasMany, collection)
    }

    pub fn has_one(collection: &str) -> Self {
        Self::new(RelationshipType::HasOne, collection)
    }

    pub fn embeds(collection: &str) -> Self {
        Self::new(RelationshipType::Embeds, collection)
    }

    /// Stages run after the selector `$match`
    pub fn with_pipeline(mut self, pipeline: Vec<Document>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Read options for the plain find path
    pub fn with_options(mut self, options: FindOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Reference field for `has_many` / `has_one`
    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = foreign_key.to_string();
        self
    }

    pub fn kind(&self) -> RelationshipType {
        self.kind
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    pub fn pipeline(&self) -> &[Document] {
        &self.pipeline
    }

    pub fn options(&self) -> Option<&FindOptions> {
        self.options.as_ref()
    }

    /// Filter selecting the documents related to `parent_id`
    pub fn selector(&self, parent_id: impl Into<Value>) -> Document {
        let mut selector = Document::new();
        selector.insert(
            self.kind.selector_field(&self.foreign_key).to_string(),
            parent_id.into(),
        );
        selector
    }

    /// Full aggregation pipeline for `parent_id`, selector `$match` first
    pub fn pipeline_for(&self, parent_id: impl Into<Value>) -> Vec<Document> {
        let mut match_stage = Document::new();
        match_stage.insert("$match".to_string(), Value::Object(self.selector(parent_id)));

        let mut stages = Vec::with_capacity(self.pipeline.len() + 1);
        stages.push(match_stage);
        stages.extend(self.pipeline.iter().cloned());
        stages
    }

    /// Load the related documents of `parent_id`
    pub async fn load(&self, database: &Database, parent_id: impl Into<Value>) -> ModelResult<Vec<Document>> {
        let collection = database.collection_named(&self.collection);
        let parent_id = parent_id.into();

        tracing::debug!(
            relationship = %self.kind,
            collection = %self.collection,
            pipeline = !self.pipeline.is_empty(),
            "loading relationship"
        );

        let mut documents = if self.pipeline.is_empty() {
            let mut options = self.options.clone().unwrap_or_default();
            if self.kind == RelationshipType::HasOne {
                options.limit = Some(1);
            }
            collection.find(&self.selector(parent_id), &options).await?
        } else {
            collection.aggregate(&self.pipeline_for(parent_id)).await?
        };

        if self.kind == RelationshipType::HasOne {
            documents.truncate(1);
        }

        Ok(documents)
    }

    /// Load and decode the related documents of `parent_id`
    pub async fn load_as<T: DeserializeOwned>(
        &self,
        database: &Database,
        parent_id: impl Into<Value>,
    ) -> ModelResult<Vec<T>> {
        self.load(database, parent_id)
            .await?
            .into_iter()
            .map(|document| {
                from_document(document).map_err(|e| {
                    ModelError::Relationship(format!(
                        "Failed to decode related document from '{}': {}",
                        self.collection, e
                    ))
                })
            })
            .collect()
    }
}
