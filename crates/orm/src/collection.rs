//! Collection handle - untyped document operations on one collection
//!
//! Thin pass-through to the backend, or to the bound session when the
//! database has one, plus by-identifier helpers.

use serde_json::Value;

use crate::backends::{DeleteResult, FindOptions, InsertOneResult, Namespace, UpdateResult};
use crate::database::Database;
use crate::document::{id_filter, Document};
use crate::error::OrmResult;

#[derive(Debug, Clone)]
pub struct Collection {
    database: Database,
    namespace: Namespace,
}

impl Collection {
    pub fn new(database: Database, name: &str) -> Self {
        let namespace = database.namespace(name);
        Self { database, namespace }
    }

    pub fn name(&self) -> &str {
        &self.namespace.collection
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub async fn insert_one(&self, document: Document) -> OrmResult<InsertOneResult> {
        tracing::debug!(namespace = %self.namespace, "insert_one");
        match self.database.session() {
            Some(session) => session.lock().await.insert_one(&self.namespace, document).await,
            None => self.database.backend().insert_one(&self.namespace, document).await,
        }
    }

    pub async fn update_one(&self, filter: &Document, update: &Document) -> OrmResult<UpdateResult> {
        tracing::debug!(namespace = %self.namespace, "update_one");
        match self.database.session() {
            Some(session) => session.lock().await.update_one(&self.namespace, filter, update).await,
            None => {
                self.database
                    .backend()
                    .update_one(&self.namespace, filter, update)
                    .await
            }
        }
    }

    pub async fn find_one(&self, filter: &Document) -> OrmResult<Option<Document>> {
        tracing::debug!(namespace = %self.namespace, "find_one");
        match self.database.session() {
            Some(session) => session.lock().await.find_one(&self.namespace, filter).await,
            None => self.database.backend().find_one(&self.namespace, filter).await,
        }
    }

    pub async fn find(&self, filter: &Document, options: &FindOptions) -> OrmResult<Vec<Document>> {
        tracing::debug!(namespace = %self.namespace, "find");
        match self.database.session() {
            Some(session) => session.lock().await.find(&self.namespace, filter, options).await,
            None => {
                self.database
                    .backend()
                    .find(&self.namespace, filter, options)
                    .await
            }
        }
    }

    pub async fn count_documents(&self, filter: &Document) -> OrmResult<u64> {
        tracing::debug!(namespace = %self.namespace, "count_documents");
        match self.database.session() {
            Some(session) => session.lock().await.count_documents(&self.namespace, filter).await,
            None => {
                self.database
                    .backend()
                    .count_documents(&self.namespace, filter)
                    .await
            }
        }
    }

    pub async fn delete_one(&self, filter: &Document) -> OrmResult<DeleteResult> {
        tracing::debug!(namespace = %self.namespace, "delete_one");
        match self.database.session() {
            Some(session) => session.lock().await.delete_one(&self.namespace, filter).await,
            None => self.database.backend().delete_one(&self.namespace, filter).await,
        }
    }

    pub async fn aggregate(&self, pipeline: &[Document]) -> OrmResult<Vec<Document>> {
        tracing::debug!(namespace = %self.namespace, stages = pipeline.len(), "aggregate");
        match self.database.session() {
            Some(session) => session.lock().await.aggregate(&self.namespace, pipeline).await,
            None => self.database.backend().aggregate(&self.namespace, pipeline).await,
        }
    }

    pub async fn find_one_by_id(&self, id: impl Into<Value>) -> OrmResult<Option<Document>> {
        self.find_one(&id_filter(id)).await
    }

    pub async fn update_one_by_id(
        &self,
        id: impl Into<Value>,
        update: &Document,
    ) -> OrmResult<UpdateResult> {
        self.update_one(&id_filter(id), update).await
    }

    pub async fn delete_one_by_id(&self, id: impl Into<Value>) -> OrmResult<DeleteResult> {
        self.delete_one(&id_filter(id)).await
    }

    /// Whether a document with this identifier exists; a miss is not an error
    pub async fn exists(&self, id: impl Into<Value>) -> OrmResult<bool> {
        Ok(self.count_documents(&id_filter(id)).await? > 0)
    }
}
