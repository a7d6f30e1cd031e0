//! Sessions - scoped backend sessions with transaction support
//!
//! A [`Session`] ends its backend session when dropped, so every exit path
//! releases it. An open transaction is aborted when the session ends.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backends::{DocumentSession, SharedSession};
use crate::database::Database;
use crate::error::ModelResult;

/// Handle passed to transaction bodies
///
/// Its database is bound to the session: reads and writes made through
/// [`SessionContext::database`] run inside the open transaction.
#[derive(Debug, Clone)]
pub struct SessionContext {
    session_id: Uuid,
    database: Database,
}

impl SessionContext {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Database the transaction body reads and writes through
    pub fn database(&self) -> &Database {
        &self.database
    }
}

pub struct Session {
    id: Uuid,
    inner: SharedSession,
    database: Database,
}

impl Session {
    pub(crate) fn new(inner: Box<dyn DocumentSession>, database: Database) -> Self {
        let id = inner.id();
        let inner: SharedSession = Arc::new(Mutex::new(inner));
        tracing::debug!(session = %id, "session started");

        Self {
            id,
            database: database.bound_to(Arc::clone(&inner)),
            inner,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            session_id: self.id,
            database: self.database.clone(),
        }
    }

    pub async fn in_transaction(&self) -> bool {
        self.inner.lock().await.in_transaction()
    }

    pub async fn start_transaction(&mut self) -> ModelResult<()> {
        self.inner.lock().await.start_transaction().await
    }

    pub async fn commit_transaction(&mut self) -> ModelResult<()> {
        self.inner.lock().await.commit_transaction().await
    }

    pub async fn abort_transaction(&mut self) -> ModelResult<()> {
        self.inner.lock().await.abort_transaction().await
    }

    /// Run `body` inside a transaction: commit on `Ok`, abort on `Err`
    ///
    /// The body's error is returned unchanged even if the abort itself fails.
    pub async fn with_transaction<F, Fut, T>(&mut self, body: F) -> ModelResult<T>
    where
        F: FnOnce(SessionContext) -> Fut,
        Fut: Future<Output = ModelResult<T>>,
    {
        self.start_transaction().await?;

        match body(self.context()).await {
            Ok(value) => {
                self.commit_transaction().await?;
                tracing::info!(session = %self.id, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transaction().await {
                    tracing::warn!(session = %self.id, error = %abort_err, "failed to abort transaction");
                }
                tracing::warn!(session = %self.id, error = %err, "transaction aborted");
                Err(err)
            }
        }
    }

    /// End the session now instead of at drop
    pub fn end_session(self) {}
}

impl Drop for Session {
    fn drop(&mut self) {
        match self.inner.try_lock() {
            Ok(mut inner) => {
                if inner.in_transaction() {
                    tracing::warn!(session = %self.id, "session ended with an open transaction, aborting");
                }
                inner.end_session();
                tracing::debug!(session = %self.id, "session ended");
            }
            Err(_) => tracing::warn!(session = %self.id, "session busy at drop, left to its last user"),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("database", &self.database.name())
            .finish()
    }
}
