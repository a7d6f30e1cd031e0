//! Client configuration
//!
//! `ClientOptions` is the complete connection configuration handed to a
//! backend. Options passed to `Client::connect` replace the defaults derived
//! from the connection string; they are not merged with them.

use std::env;
use std::time::Duration;

use crate::backends::BackendType;
use crate::error::{ModelError, ModelResult};

/// Default connection settings
pub struct ClientDefaults;

impl ClientDefaults {
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const SERVER_SELECTION_TIMEOUT_SECS: u64 = 30;
    pub const MAX_POOL_SIZE: u32 = 100;
    pub const MIN_POOL_SIZE: u32 = 0;
    pub const DATABASE_URI: &'static str = "memory://localhost";
    pub const DATABASE_NAME: &'static str = "mox";
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub uri: String,
    /// Database used when none is given to `connect`
    pub database: Option<String>,
    pub app_name: Option<String>,
    /// Bound on initial connection establishment
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
}

impl ClientOptions {
    /// Defaults for `uri`
    pub fn parse(uri: &str) -> ModelResult<Self> {
        BackendType::from_uri(uri)?;

        Ok(Self {
            uri: uri.to_string(),
            database: None,
            app_name: None,
            connect_timeout: Duration::from_secs(ClientDefaults::CONNECT_TIMEOUT_SECS),
            server_selection_timeout: Duration::from_secs(
                ClientDefaults::SERVER_SELECTION_TIMEOUT_SECS,
            ),
            max_pool_size: ClientDefaults::MAX_POOL_SIZE,
            min_pool_size: ClientDefaults::MIN_POOL_SIZE,
        })
    }

    /// Read `MOX_DATABASE_URI`, `MOX_DATABASE_NAME`, `MOX_CONNECT_TIMEOUT_SECS`
    /// and `MOX_APP_NAME`, falling back to the defaults
    pub fn from_env() -> ModelResult<Self> {
        let uri = get_env_or_default("MOX_DATABASE_URI", ClientDefaults::DATABASE_URI);
        let database = get_env_or_default("MOX_DATABASE_NAME", ClientDefaults::DATABASE_NAME);

        let timeout_raw = get_env_or_default(
            "MOX_CONNECT_TIMEOUT_SECS",
            &ClientDefaults::CONNECT_TIMEOUT_SECS.to_string(),
        );
        let connect_timeout_secs = timeout_raw.parse::<u64>().map_err(|_| {
            ModelError::Configuration(format!(
                "MOX_CONNECT_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                timeout_raw
            ))
        })?;

        let mut options = Self::parse(&uri)?
            .database(database)
            .connect_timeout(Duration::from_secs(connect_timeout_secs));
        if let Ok(app_name) = env::var("MOX_APP_NAME") {
            options = options.app_name(app_name);
        }

        options.validate()?;
        Ok(options)
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }

    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = size;
        self
    }

    pub fn min_pool_size(mut self, size: u32) -> Self {
        self.min_pool_size = size;
        self
    }

    pub fn backend_type(&self) -> ModelResult<BackendType> {
        BackendType::from_uri(&self.uri)
    }

    pub fn validate(&self) -> ModelResult<()> {
        self.backend_type()?;

        if self.connect_timeout.is_zero() {
            return Err(ModelError::Configuration(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_pool_size == 0 {
            return Err(ModelError::Configuration(
                "Maximum pool size must be greater than 0".to_string(),
            ));
        }

        if self.min_pool_size > self.max_pool_size {
            return Err(ModelError::Configuration(format!(
                "Minimum pool size ({}) exceeds maximum pool size ({})",
                self.min_pool_size, self.max_pool_size
            )));
        }

        if matches!(&self.database, Some(name) if name.is_empty()) {
            return Err(ModelError::Configuration("Database name must not be empty".to_string()));
        }

        Ok(())
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
