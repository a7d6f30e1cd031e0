//! Database handle - a named database on a shared backend
//!
//! Cheap to clone. The persistence operations (`save`, `find_by_id`,
//! `delete`, ...) are implemented on this type in `persistence`. A handle
//! bound to a session (see `SessionContext::database`) sends every read and
//! write through that session.

use std::fmt;
use std::sync::Arc;

use crate::backends::{DocumentBackend, Namespace, SharedSession};
use crate::collection::Collection;
use crate::error::OrmResult;
use crate::model::Model;
use crate::query::QueryBuilder;

#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn DocumentBackend>,
    name: String,
    session: Option<SharedSession>,
}

impl Database {
    pub fn new(backend: Arc<dyn DocumentBackend>, name: impl Into<String>) -> Self {
        Self {
            backend,
            name: name.into(),
            session: None,
        }
    }

    /// Same database, with operations issued through `session`
    pub(crate) fn bound_to(&self, session: SharedSession) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            name: self.name.clone(),
            session: Some(session),
        }
    }

    pub fn session(&self) -> Option<&SharedSession> {
        self.session.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }

    pub fn namespace(&self, collection: &str) -> Namespace {
        Namespace::new(self.name.as_str(), collection)
    }

    /// Collection backing model `M`
    pub fn collection<M: Model>(&self) -> Collection {
        self.collection_named(M::collection_name())
    }

    pub fn collection_named(&self, name: &str) -> Collection {
        Collection::new(self.clone(), name)
    }

    /// Start an empty query
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.clone())
    }

    pub async fn ping(&self) -> OrmResult<()> {
        self.backend.ping().await
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("in_session", &self.session.is_some())
            .finish()
    }
}
