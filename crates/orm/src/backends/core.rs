//! Core Document Backend Traits
//!
//! This module defines the driver seam the mapper talks to. A backend stores
//! JSON-object documents in named collections and exposes the handful of
//! CRUD, aggregation and session primitives the persistence layer forwards
//! to. Durability, indexing and wire protocol belong to the backend.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::document::Document;
use crate::error::OrmResult;
use crate::query::SortDirection;

/// Fully qualified collection address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Read options for `find`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Vec<(String, SortDirection)>,
    /// Non-positive values mean "no limit"
    pub limit: Option<i64>,
    pub skip: Option<u64>,
    pub projection: Option<Document>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    /// The limit as a count, `None` when unset or non-positive
    pub fn effective_limit(&self) -> Option<usize> {
        match self.limit {
            Some(limit) if limit > 0 => Some(limit as usize),
            _ => None,
        }
    }
}

/// Abstract document store
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Verify the backend is reachable
    async fn ping(&self) -> OrmResult<()>;

    /// Insert one document, assigning `_id` when the document has none
    async fn insert_one(&self, ns: &Namespace, document: Document) -> OrmResult<InsertOneResult>;

    /// Apply an update document (`$set`, `$unset`, `$inc`) to the first match
    async fn update_one(
        &self,
        ns: &Namespace,
        filter: &Document,
        update: &Document,
    ) -> OrmResult<UpdateResult>;

    async fn find_one(&self, ns: &Namespace, filter: &Document) -> OrmResult<Option<Document>>;

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        options: &FindOptions,
    ) -> OrmResult<Vec<Document>>;

    async fn count_documents(&self, ns: &Namespace, filter: &Document) -> OrmResult<u64>;

    /// Remove the first match
    async fn delete_one(&self, ns: &Namespace, filter: &Document) -> OrmResult<DeleteResult>;

    /// Run an aggregation pipeline against a collection
    async fn aggregate(&self, ns: &Namespace, pipeline: &[Document]) -> OrmResult<Vec<Document>>;

    async fn start_session(&self) -> OrmResult<Box<dyn DocumentSession>>;
}

/// Backend session carrying at most one transaction at a time
///
/// Reads and writes issued through the session take part in its open
/// transaction; the same calls on the backend never do.
#[async_trait]
pub trait DocumentSession: Send + Sync {
    fn id(&self) -> Uuid;

    async fn start_transaction(&mut self) -> OrmResult<()>;

    async fn commit_transaction(&mut self) -> OrmResult<()>;

    async fn abort_transaction(&mut self) -> OrmResult<()>;

    fn in_transaction(&self) -> bool;

    /// Release the session; aborts an open transaction. Idempotent.
    fn end_session(&mut self);

    async fn insert_one(&mut self, ns: &Namespace, document: Document) -> OrmResult<InsertOneResult>;

    async fn update_one(
        &mut self,
        ns: &Namespace,
        filter: &Document,
        update: &Document,
    ) -> OrmResult<UpdateResult>;

    async fn find_one(&self, ns: &Namespace, filter: &Document) -> OrmResult<Option<Document>>;

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        options: &FindOptions,
    ) -> OrmResult<Vec<Document>>;

    async fn count_documents(&self, ns: &Namespace, filter: &Document) -> OrmResult<u64>;

    async fn delete_one(&mut self, ns: &Namespace, filter: &Document) -> OrmResult<DeleteResult>;

    async fn aggregate(&self, ns: &Namespace, pipeline: &[Document]) -> OrmResult<Vec<Document>>;
}

/// A session shared between its guard and the transaction body
pub type SharedSession = Arc<tokio::sync::Mutex<Box<dyn DocumentSession>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_display() {
        let ns = Namespace::new("app", "users");
        assert_eq!(ns.to_string(), "app.users");
    }

    #[test]
    fn test_find_options_builder() {
        let options = FindOptions::new()
            .sort("age", SortDirection::Desc)
            .sort("name", SortDirection::Asc)
            .limit(10)
            .skip(20);

        assert_eq!(options.sort.len(), 2);
        assert_eq!(options.sort[0], ("age".to_string(), SortDirection::Desc));
        assert_eq!(options.effective_limit(), Some(10));
        assert_eq!(options.skip, Some(20));
    }

    #[test]
    fn test_non_positive_limit_means_unbounded() {
        assert_eq!(FindOptions::new().effective_limit(), None);
        assert_eq!(FindOptions::new().limit(0).effective_limit(), None);
        assert_eq!(FindOptions::new().limit(-5).effective_limit(), None);
    }
}
