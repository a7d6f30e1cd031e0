//! Client - connection entry point
//!
//! Connecting picks a backend from the connection string scheme and bounds
//! establishment by the configured connect timeout (10 seconds by default).

use std::future::Future;
use std::sync::Arc;

use crate::backends::{BackendType, DocumentBackend, MemoryBackend};
use crate::collection::Collection;
use crate::config::{ClientDefaults, ClientOptions};
use crate::database::Database;
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::session::{Session, SessionContext};

#[derive(Debug, Clone)]
pub struct Client {
    database: Database,
    options: Option<ClientOptions>,
}

impl Client {
    /// Connect to `uri` and use `database`
    ///
    /// `options`, when given, is used as the whole configuration in place of
    /// the defaults for `uri`, including its own `uri`.
    pub async fn connect(uri: &str, database: &str, options: Option<ClientOptions>) -> ModelResult<Self> {
        let options = match options {
            Some(options) => options,
            None => ClientOptions::parse(uri)?,
        };
        options.validate()?;

        let backend = tokio::time::timeout(options.connect_timeout, establish(&options))
            .await
            .map_err(|_| {
                ModelError::Connection(format!(
                    "Timed out after {:?} connecting to '{}'",
                    options.connect_timeout, options.uri
                ))
            })??;

        tracing::info!(
            backend = backend.name(),
            database,
            app_name = ?options.app_name,
            "connected"
        );

        Ok(Self {
            database: Database::new(backend, database),
            options: Some(options),
        })
    }

    /// Connect with [`ClientOptions::from_env`]
    pub async fn from_env() -> ModelResult<Self> {
        let options = ClientOptions::from_env()?;
        let uri = options.uri.clone();
        let database = options
            .database
            .clone()
            .unwrap_or_else(|| ClientDefaults::DATABASE_NAME.to_string());
        Self::connect(&uri, &database, Some(options)).await
    }

    /// Wrap an already connected backend
    pub fn with_backend(backend: Arc<dyn DocumentBackend>, database: &str) -> Self {
        Self {
            database: Database::new(backend, database),
            options: None,
        }
    }

    /// Options used to connect; `None` for clients built with `with_backend`
    pub fn options(&self) -> Option<&ClientOptions> {
        self.options.as_ref()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Another database on the same backend
    pub fn database_named(&self, name: &str) -> Database {
        Database::new(Arc::clone(self.database.backend()), name)
    }

    pub fn collection<M: Model>(&self) -> Collection {
        self.database.collection::<M>()
    }

    pub async fn ping(&self) -> ModelResult<()> {
        self.database.ping().await
    }

    pub async fn new_session(&self) -> ModelResult<Session> {
        let inner = self.database.backend().start_session().await?;
        Ok(Session::new(inner, self.database.clone()))
    }

    /// Run `body` in a transaction on a fresh session, ending the session afterwards
    pub async fn with_transaction<F, Fut, T>(&self, body: F) -> ModelResult<T>
    where
        F: FnOnce(SessionContext) -> Fut,
        Fut: Future<Output = ModelResult<T>>,
    {
        let mut session = self.new_session().await?;
        let result = session.with_transaction(body).await;
        session.end_session();
        result
    }
}

async fn establish(options: &ClientOptions) -> ModelResult<Arc<dyn DocumentBackend>> {
    match options.backend_type()? {
        BackendType::Memory => {
            let backend = MemoryBackend::new();
            backend.ping().await?;
            Ok(Arc::new(backend))
        }
        other => Err(ModelError::Configuration(format!(
            "No '{}' driver is built in; connect one with Client::with_backend",
            other
        ))),
    }
}
