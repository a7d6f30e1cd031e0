#![allow(dead_code)]

use std::sync::Arc;

use mox_orm::backends::{
    DeleteResult, DocumentBackend, DocumentSession, FindOptions, InsertOneResult, Namespace, UpdateResult,
};
use mox_orm::prelude::*;
use mox_orm::MemoryBackend;
use serde::{Deserialize, Serialize};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn client() -> Client {
    init_tracing();
    Client::with_backend(Arc::new(MemoryBackend::new()), "mox_test")
}

pub fn database() -> Database {
    client().database().clone()
}

/// Model with every capability: hooks, validation and soft delete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub record: Record,
    pub name: String,
    pub email: String,
    pub age: u32,

    #[serde(skip)]
    pub loaded: bool,
    #[serde(skip)]
    pub removed: bool,
}

impl User {
    pub fn new(name: &str, email: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            age,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Hookable for User {
    async fn before_save(&mut self) -> Result<(), HookError> {
        if self.name.starts_with('!') {
            return Err(HookError::aborted("names cannot start with '!'"));
        }
        self.name = self.name.trim().to_string();
        self.email = self.email.to_lowercase();
        Ok(())
    }

    async fn after_find(&mut self) -> Result<(), HookError> {
        if self.name == "cursed" {
            return Err(HookError::failed("cursed record"));
        }
        self.loaded = true;
        Ok(())
    }

    async fn before_delete(&mut self) -> Result<(), HookError> {
        if self.name == "root" {
            return Err(HookError::aborted("root cannot be deleted"));
        }
        Ok(())
    }

    async fn after_delete(&mut self) -> Result<(), HookError> {
        self.removed = true;
        Ok(())
    }
}

#[async_trait]
impl Validatable for User {
    async fn validate(&self) -> ValidationResult<()> {
        validate_fields(&[
            Field::new("name", self.name.as_str()).required(),
            Field::new("email", self.email.as_str()).required().email(),
        ])
        .await
    }
}

impl Model for User {
    fn collection_name() -> &'static str {
        "users"
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn as_hookable(&mut self) -> Option<&mut dyn Hookable> {
        Some(self)
    }

    fn as_validatable(&self) -> Option<&dyn Validatable> {
        Some(self)
    }

    fn as_archivable(&mut self) -> Option<&mut dyn Archivable> {
        Some(&mut self.record)
    }
}

/// Model with no optional capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    #[serde(flatten)]
    pub record: Record,
    pub body: String,
}

impl Note {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Default::default()
        }
    }
}

impl Model for Note {
    fn collection_name() -> &'static str {
        "notes"
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// Child document pointing at its owner through `parent_id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub record: Record,
    pub title: String,
    pub parent_id: ObjectId,
    pub score: i64,
}

impl Post {
    pub fn new(title: &str, parent_id: ObjectId, score: i64) -> Self {
        Self {
            title: title.to_string(),
            parent_id,
            score,
            ..Default::default()
        }
    }
}

impl Model for Post {
    fn collection_name() -> &'static str {
        "posts"
    }

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// Seed `users` with one saved user per `(name, age)`
pub async fn seed_users(db: &Database, people: &[(&str, u32)]) -> Vec<User> {
    let mut saved = Vec::with_capacity(people.len());
    for (name, age) in people {
        let mut user = User::new(name, &format!("{}@example.com", name), *age);
        db.save(&mut user).await.unwrap();
        saved.push(user);
    }
    saved
}

/// Memory backend whose deletes always fail at the driver
#[derive(Debug, Clone, Default)]
pub struct FailingDeletes {
    inner: MemoryBackend,
}

pub const DELETE_FAILURE: &str = "connection reset during delete";

#[async_trait]
impl DocumentBackend for FailingDeletes {
    fn name(&self) -> &'static str {
        "failing-deletes"
    }

    async fn ping(&self) -> ModelResult<()> {
        self.inner.ping().await
    }

    async fn insert_one(&self, ns: &Namespace, document: Document) -> ModelResult<InsertOneResult> {
        self.inner.insert_one(ns, document).await
    }

    async fn update_one(&self, ns: &Namespace, filter: &Document, update: &Document) -> ModelResult<UpdateResult> {
        self.inner.update_one(ns, filter, update).await
    }

    async fn find_one(&self, ns: &Namespace, filter: &Document) -> ModelResult<Option<Document>> {
        self.inner.find_one(ns, filter).await
    }

    async fn find(&self, ns: &Namespace, filter: &Document, options: &FindOptions) -> ModelResult<Vec<Document>> {
        self.inner.find(ns, filter, options).await
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Document) -> ModelResult<u64> {
        self.inner.count_documents(ns, filter).await
    }

    async fn delete_one(&self, _ns: &Namespace, _filter: &Document) -> ModelResult<DeleteResult> {
        Err(ModelError::Database(DELETE_FAILURE.to_string()))
    }

    async fn aggregate(&self, ns: &Namespace, pipeline: &[Document]) -> ModelResult<Vec<Document>> {
        self.inner.aggregate(ns, pipeline).await
    }

    async fn start_session(&self) -> ModelResult<Box<dyn DocumentSession>> {
        self.inner.start_session().await
    }
}

pub fn failing_deletes_database() -> Database {
    init_tracing();
    Client::with_backend(Arc::new(FailingDeletes::default()), "mox_test")
        .database()
        .clone()
}
