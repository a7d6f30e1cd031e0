//! Document Backend Abstractions
//!
//! This module provides the driver seam the mapper forwards to, plus the
//! bundled in-memory backend. Network drivers plug in by implementing
//! [`DocumentBackend`] and are handed to `Client::with_backend`.

pub mod core;
pub mod memory;

pub use self::core::*;
pub use memory::{MemoryBackend, MemorySession};

use crate::error::{OrmError, OrmResult};

/// Backend selected by a connection string scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Memory,
    MongoDb,
}

impl BackendType {
    /// Pick the backend from the scheme of `uri`
    pub fn from_uri(uri: &str) -> OrmResult<Self> {
        let (scheme, _) = uri
            .split_once("://")
            .ok_or_else(|| OrmError::Configuration(format!("Connection string has no scheme: '{}'", uri)))?;
        scheme.parse()
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Memory => write!(f, "memory"),
            BackendType::MongoDb => write!(f, "mongodb"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendType::Memory),
            "mongodb" | "mongodb+srv" => Ok(BackendType::MongoDb),
            _ => Err(OrmError::Configuration(format!("Unsupported database backend: {}", s))),
        }
    }
}
