//! In-memory document backend
//!
//! Thread-safe store of databases → collections → documents in insertion
//! order, behind an async-aware `RwLock`. Used by the `memory://` scheme and
//! by tests. A session records an undo entry for every write it makes inside
//! a transaction; abort replays them in reverse, so writes made outside the
//! session are left alone. Transactions are not isolated: other callers see
//! a transaction's writes before it commits.

pub mod evaluator;
pub mod pipeline;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::core::{
    DeleteResult, DocumentBackend, DocumentSession, FindOptions, InsertOneResult, Namespace,
    UpdateResult,
};
use crate::document::{Document, ObjectId, ID_FIELD};
use crate::error::{OrmError, OrmResult};

type Collections = HashMap<String, Vec<Document>>;
type Databases = HashMap<String, Collections>;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    databases: Arc<RwLock<Databases>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the collections holding at least one document
    pub async fn collection_names(&self, database: &str) -> Vec<String> {
        let databases = self.databases.read().await;
        let mut names: Vec<String> = databases
            .get(database)
            .map(|collections| {
                collections
                    .iter()
                    .filter(|(_, documents)| !documents.is_empty())
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// How to take back one write made inside a transaction
#[derive(Debug)]
enum Undo {
    Insert { ns: Namespace, id: Value },
    Update { ns: Namespace, id: Value, previous: Document },
    Delete { ns: Namespace, index: usize, document: Document },
}

impl Undo {
    fn revert(self, databases: &mut Databases) {
        match self {
            Undo::Insert { ns, id } => {
                if let Some(documents) = documents_mut(databases, &ns) {
                    documents.retain(|document| document.get(ID_FIELD) != Some(&id));
                }
            }
            Undo::Update { ns, id, previous } => {
                if let Some(document) = documents_mut(databases, &ns)
                    .and_then(|documents| documents.iter_mut().find(|d| d.get(ID_FIELD) == Some(&id)))
                {
                    *document = previous;
                }
            }
            Undo::Delete { ns, index, document } => {
                let documents = databases
                    .entry(ns.database)
                    .or_default()
                    .entry(ns.collection)
                    .or_default();
                let index = index.min(documents.len());
                documents.insert(index, document);
            }
        }
    }
}

fn documents<'a>(databases: &'a Databases, ns: &Namespace) -> Option<&'a Vec<Document>> {
    databases
        .get(&ns.database)
        .and_then(|collections| collections.get(&ns.collection))
}

fn documents_mut<'a>(databases: &'a mut Databases, ns: &Namespace) -> Option<&'a mut Vec<Document>> {
    databases
        .get_mut(&ns.database)
        .and_then(|collections| collections.get_mut(&ns.collection))
}

fn position(documents: &[Document], filter: &Document) -> OrmResult<Option<usize>> {
    for (index, document) in documents.iter().enumerate() {
        if evaluator::matches(document, filter)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn insert(databases: &mut Databases, ns: &Namespace, mut document: Document) -> OrmResult<(InsertOneResult, Undo)> {
    let id = match document.get(ID_FIELD) {
        None | Some(Value::Null) => {
            let id = Value::from(ObjectId::new());
            document.insert(ID_FIELD.to_string(), id.clone());
            id
        }
        Some(id) => id.clone(),
    };

    let documents = databases
        .entry(ns.database.clone())
        .or_default()
        .entry(ns.collection.clone())
        .or_default();

    if documents.iter().any(|existing| existing.get(ID_FIELD) == Some(&id)) {
        return Err(OrmError::Database(format!(
            "E11000 duplicate key error collection: {} index: _id_ dup key: {{ _id: {} }}",
            ns, id
        )));
    }

    documents.push(document);
    tracing::trace!(namespace = %ns, "inserted document");

    let undo = Undo::Insert { ns: ns.clone(), id: id.clone() };
    Ok((InsertOneResult { inserted_id: id }, undo))
}

fn update(
    databases: &mut Databases,
    ns: &Namespace,
    filter: &Document,
    update: &Document,
) -> OrmResult<(UpdateResult, Option<Undo>)> {
    let Some(documents) = documents_mut(databases, ns) else {
        return Ok((UpdateResult::default(), None));
    };
    let Some(index) = position(documents.as_slice(), filter)? else {
        return Ok((UpdateResult::default(), None));
    };

    let previous = documents[index].clone();
    let modified = evaluator::apply_update(&mut documents[index], update)?;
    tracing::trace!(namespace = %ns, modified, "updated document");

    let undo = match previous.get(ID_FIELD) {
        Some(id) if modified => Some(Undo::Update {
            ns: ns.clone(),
            id: id.clone(),
            previous,
        }),
        _ => None,
    };

    let result = UpdateResult {
        matched_count: 1,
        modified_count: u64::from(modified),
    };
    Ok((result, undo))
}

fn delete(databases: &mut Databases, ns: &Namespace, filter: &Document) -> OrmResult<Option<Undo>> {
    let Some(documents) = documents_mut(databases, ns) else {
        return Ok(None);
    };

    match position(documents.as_slice(), filter)? {
        Some(index) => {
            let document = documents.remove(index);
            tracing::trace!(namespace = %ns, "deleted document");
            Ok(Some(Undo::Delete {
                ns: ns.clone(),
                index,
                document,
            }))
        }
        None => Ok(None),
    }
}

fn find_one(databases: &Databases, ns: &Namespace, filter: &Document) -> OrmResult<Option<Document>> {
    let Some(documents) = documents(databases, ns) else {
        return Ok(None);
    };
    Ok(position(documents.as_slice(), filter)?.map(|index| documents[index].clone()))
}

fn find(
    databases: &Databases,
    ns: &Namespace,
    filter: &Document,
    options: &FindOptions,
) -> OrmResult<Vec<Document>> {
    let mut found = Vec::new();
    if let Some(documents) = documents(databases, ns) {
        for document in documents {
            if evaluator::matches(document, filter)? {
                found.push(document.clone());
            }
        }
    }

    evaluator::sort_documents(&mut found, &options.sort);

    let skip = options.skip.unwrap_or(0) as usize;
    let mut found: Vec<Document> = found.into_iter().skip(skip).collect();
    if let Some(limit) = options.effective_limit() {
        found.truncate(limit);
    }

    match &options.projection {
        Some(projection) => found
            .iter()
            .map(|document| evaluator::project(document, projection))
            .collect(),
        None => Ok(found),
    }
}

fn count(databases: &Databases, ns: &Namespace, filter: &Document) -> OrmResult<u64> {
    let mut count = 0;
    if let Some(documents) = documents(databases, ns) {
        for document in documents {
            if evaluator::matches(document, filter)? {
                count += 1;
            }
        }
    }
    Ok(count)
}

fn aggregate(databases: &Databases, ns: &Namespace, stages: &[Document]) -> OrmResult<Vec<Document>> {
    let empty = Collections::new();
    let collections = databases.get(&ns.database).unwrap_or(&empty);
    let documents = collections.get(&ns.collection).cloned().unwrap_or_default();

    pipeline::run(documents, stages, collections)
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> OrmResult<()> {
        Ok(())
    }

    async fn insert_one(&self, ns: &Namespace, document: Document) -> OrmResult<InsertOneResult> {
        let (result, _) = insert(&mut *self.databases.write().await, ns, document)?;
        Ok(result)
    }

    async fn update_one(
        &self,
        ns: &Namespace,
        filter: &Document,
        update_doc: &Document,
    ) -> OrmResult<UpdateResult> {
        let (result, _) = update(&mut *self.databases.write().await, ns, filter, update_doc)?;
        Ok(result)
    }

    async fn find_one(&self, ns: &Namespace, filter: &Document) -> OrmResult<Option<Document>> {
        find_one(&*self.databases.read().await, ns, filter)
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        options: &FindOptions,
    ) -> OrmResult<Vec<Document>> {
        find(&*self.databases.read().await, ns, filter, options)
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Document) -> OrmResult<u64> {
        count(&*self.databases.read().await, ns, filter)
    }

    async fn delete_one(&self, ns: &Namespace, filter: &Document) -> OrmResult<DeleteResult> {
        let removed = delete(&mut *self.databases.write().await, ns, filter)?;
        Ok(DeleteResult {
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn aggregate(&self, ns: &Namespace, stages: &[Document]) -> OrmResult<Vec<Document>> {
        aggregate(&*self.databases.read().await, ns, stages)
    }

    async fn start_session(&self) -> OrmResult<Box<dyn DocumentSession>> {
        Ok(Box::new(MemorySession {
            id: Uuid::new_v4(),
            databases: Arc::clone(&self.databases),
            undo_log: None,
            ended: false,
        }))
    }
}

/// Session over a [`MemoryBackend`]
#[derive(Debug)]
pub struct MemorySession {
    id: Uuid,
    databases: Arc<RwLock<Databases>>,
    /// Writes made by the open transaction, oldest first
    undo_log: Option<Vec<Undo>>,
    ended: bool,
}

impl MemorySession {
    fn ensure_active(&self) -> OrmResult<()> {
        if self.ended {
            return Err(OrmError::Transaction(format!("Session {} has ended", self.id)));
        }
        Ok(())
    }

    fn record(&mut self, undo: Undo) {
        if let Some(log) = self.undo_log.as_mut() {
            log.push(undo);
        }
    }

    fn roll_back(log: Vec<Undo>, databases: &mut Databases) {
        for undo in log.into_iter().rev() {
            undo.revert(databases);
        }
    }
}

#[async_trait]
impl DocumentSession for MemorySession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn start_transaction(&mut self) -> OrmResult<()> {
        self.ensure_active()?;
        if self.undo_log.is_some() {
            return Err(OrmError::Transaction("Transaction already in progress".to_string()));
        }

        self.undo_log = Some(Vec::new());
        Ok(())
    }

    async fn commit_transaction(&mut self) -> OrmResult<()> {
        self.ensure_active()?;
        self.undo_log
            .take()
            .map(|_| ())
            .ok_or_else(|| OrmError::Transaction("No transaction started".to_string()))
    }

    async fn abort_transaction(&mut self) -> OrmResult<()> {
        self.ensure_active()?;
        let log = self
            .undo_log
            .take()
            .ok_or_else(|| OrmError::Transaction("No transaction started".to_string()))?;

        tracing::trace!(session = %self.id, writes = log.len(), "rolling back transaction");
        Self::roll_back(log, &mut *self.databases.write().await);
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.undo_log.is_some()
    }

    fn end_session(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        if let Some(log) = self.undo_log.take() {
            match self.databases.try_write() {
                Ok(mut databases) => Self::roll_back(log, &mut databases),
                Err(_) => tracing::warn!(
                    session = %self.id,
                    "store busy while ending session, open transaction was not rolled back"
                ),
            }
        }
    }

    async fn insert_one(&mut self, ns: &Namespace, document: Document) -> OrmResult<InsertOneResult> {
        self.ensure_active()?;
        let (result, undo) = insert(&mut *self.databases.write().await, ns, document)?;
        self.record(undo);
        Ok(result)
    }

    async fn update_one(
        &mut self,
        ns: &Namespace,
        filter: &Document,
        update_doc: &Document,
    ) -> OrmResult<UpdateResult> {
        self.ensure_active()?;
        let (result, undo) = update(&mut *self.databases.write().await, ns, filter, update_doc)?;
        if let Some(undo) = undo {
            self.record(undo);
        }
        Ok(result)
    }

    async fn find_one(&self, ns: &Namespace, filter: &Document) -> OrmResult<Option<Document>> {
        self.ensure_active()?;
        find_one(&*self.databases.read().await, ns, filter)
    }

    async fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        options: &FindOptions,
    ) -> OrmResult<Vec<Document>> {
        self.ensure_active()?;
        find(&*self.databases.read().await, ns, filter, options)
    }

    async fn count_documents(&self, ns: &Namespace, filter: &Document) -> OrmResult<u64> {
        self.ensure_active()?;
        count(&*self.databases.read().await, ns, filter)
    }

    async fn delete_one(&mut self, ns: &Namespace, filter: &Document) -> OrmResult<DeleteResult> {
        self.ensure_active()?;
        let removed = delete(&mut *self.databases.write().await, ns, filter)?;
        let deleted_count = u64::from(removed.is_some());
        if let Some(undo) = removed {
            self.record(undo);
        }
        Ok(DeleteResult { deleted_count })
    }

    async fn aggregate(&self, ns: &Namespace, stages: &[Document]) -> OrmResult<Vec<Document>> {
        self.ensure_active()?;
        aggregate(&*self.databases.read().await, ns, stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn ns() -> Namespace {
        Namespace::new("test", "users")
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let backend = MemoryBackend::new();
        let result = backend.insert_one(&ns(), doc(json!({"name": "Alice"}))).await.unwrap();

        let id = ObjectId::from_value(&result.inserted_id).unwrap();
        assert!(!id.is_nil());

        let stored = backend.find_one(&ns(), &doc(json!({"_id": result.inserted_id}))).await.unwrap();
        assert_eq!(stored.unwrap()["name"], json!("Alice"));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let backend = MemoryBackend::new();
        backend.insert_one(&ns(), doc(json!({"_id": "a"}))).await.unwrap();

        let err = backend.insert_one(&ns(), doc(json!({"_id": "a"}))).await.unwrap_err();
        assert!(matches!(err, OrmError::Database(_)));
        assert!(err.to_string().contains("duplicate key"));
    }

    #[tokio::test]
    async fn test_update_and_delete_counts() {
        let backend = MemoryBackend::new();
        backend.insert_one(&ns(), doc(json!({"_id": "a", "n": 1}))).await.unwrap();

        let update = doc(json!({"$set": {"n": 2}}));
        let result = backend.update_one(&ns(), &doc(json!({"_id": "a"})), &update).await.unwrap();
        assert_eq!(result, UpdateResult { matched_count: 1, modified_count: 1 });

        let result = backend.update_one(&ns(), &doc(json!({"_id": "a"})), &update).await.unwrap();
        assert_eq!(result, UpdateResult { matched_count: 1, modified_count: 0 });

        let result = backend.update_one(&ns(), &doc(json!({"_id": "z"})), &update).await.unwrap();
        assert_eq!(result, UpdateResult::default());

        let deleted = backend.delete_one(&ns(), &doc(json!({"_id": "a"}))).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
        let deleted = backend.delete_one(&ns(), &doc(json!({"_id": "a"}))).await.unwrap();
        assert_eq!(deleted.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_find_with_options() {
        let backend = MemoryBackend::new();
        for (name, age) in [("a", 30), ("b", 10), ("c", 20), ("d", 40)] {
            backend.insert_one(&ns(), doc(json!({"name": name, "age": age}))).await.unwrap();
        }

        let options = FindOptions::new()
            .sort("age", crate::query::SortDirection::Asc)
            .skip(1)
            .limit(2)
            .projection(doc(json!({"name": 1, "_id": 0})));
        let found = backend.find(&ns(), &doc(json!({})), &options).await.unwrap();
        assert_eq!(found, vec![doc(json!({"name": "c"})), doc(json!({"name": "a"}))]);

        let count = backend.count_documents(&ns(), &doc(json!({"age": {"$gte": 20}}))).await.unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_unknown_namespace_is_empty() {
        let backend = MemoryBackend::new();
        let missing = Namespace::new("nope", "nothing");
        assert!(backend.find_one(&missing, &Document::new()).await.unwrap().is_none());
        assert_eq!(backend.count_documents(&missing, &Document::new()).await.unwrap(), 0);
        assert!(backend.aggregate(&missing, &[]).await.unwrap().is_empty());
        assert!(backend.collection_names("nope").await.is_empty());
    }

    #[tokio::test]
    async fn test_abort_reverts_only_session_writes() {
        let backend = MemoryBackend::new();
        backend.insert_one(&ns(), doc(json!({"_id": "keep", "n": 1}))).await.unwrap();
        backend.insert_one(&ns(), doc(json!({"_id": "gone", "n": 1}))).await.unwrap();

        let mut session = backend.start_session().await.unwrap();
        session.start_transaction().await.unwrap();
        assert!(session.in_transaction());

        session.insert_one(&ns(), doc(json!({"_id": "drop"}))).await.unwrap();
        session
            .update_one(&ns(), &doc(json!({"_id": "keep"})), &doc(json!({"$inc": {"n": 1}})))
            .await
            .unwrap();
        session.delete_one(&ns(), &doc(json!({"_id": "gone"}))).await.unwrap();
        backend.insert_one(&ns(), doc(json!({"_id": "outside"}))).await.unwrap();

        assert_eq!(session.count_documents(&ns(), &Document::new()).await.unwrap(), 3);
        session.abort_transaction().await.unwrap();

        let remaining = backend
            .find(&ns(), &Document::new(), &FindOptions::new())
            .await
            .unwrap();
        assert_eq!(
            remaining,
            vec![
                doc(json!({"_id": "keep", "n": 1})),
                doc(json!({"_id": "gone", "n": 1})),
                doc(json!({"_id": "outside"})),
            ]
        );
        assert!(session.commit_transaction().await.is_err());
    }

    #[tokio::test]
    async fn test_writes_outside_a_transaction_are_kept() {
        let backend = MemoryBackend::new();
        let mut session = backend.start_session().await.unwrap();

        session.insert_one(&ns(), doc(json!({"_id": "a"}))).await.unwrap();
        session.start_transaction().await.unwrap();
        session.abort_transaction().await.unwrap();

        assert_eq!(backend.count_documents(&ns(), &Document::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_end_session_rolls_back_open_transaction() {
        let backend = MemoryBackend::new();
        let mut session = backend.start_session().await.unwrap();
        session.start_transaction().await.unwrap();
        assert!(session.start_transaction().await.is_err());

        session.insert_one(&ns(), doc(json!({"_id": "x"}))).await.unwrap();
        backend.insert_one(&ns(), doc(json!({"_id": "y"}))).await.unwrap();
        session.end_session();
        session.end_session();

        let remaining = backend.find(&ns(), &Document::new(), &FindOptions::new()).await.unwrap();
        assert_eq!(remaining, vec![doc(json!({"_id": "y"}))]);
        assert!(session.start_transaction().await.is_err());
        assert!(session.find_one(&ns(), &Document::new()).await.is_err());
    }
}
