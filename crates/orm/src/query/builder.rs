//! Query Builder - Core builder implementation
//!
//! Modifiers consume and return the builder, so chained calls accumulate:
//! `db.where_op(..).limit(10)` keeps both the filter and the limit. A
//! builder is executed once against the collection of the model type it is
//! read into.

use std::fmt;

use crate::database::Database;
use crate::document::Document;
use super::types::SortDirection;

/// Accumulated filter, sort and window for a single read
#[derive(Clone)]
pub struct QueryBuilder {
    pub(crate) database: Database,
    pub(crate) filters: Vec<Document>,
    pub(crate) sort: Vec<(String, SortDirection)>,
    pub(crate) limit: Option<i64>,
    pub(crate) skip: Option<u64>,
}

impl QueryBuilder {
    /// Create an empty builder reading from `database`
    pub fn new(database: Database) -> Self {
        Self {
            database,
            filters: Vec::new(),
            sort: Vec::new(),
            limit: None,
            skip: None,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn filters(&self) -> &[Document] {
        &self.filters
    }

    pub fn sort_keys(&self) -> &[(String, SortDirection)] {
        &self.sort
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("database", &self.database.name())
            .field("filters", &self.filters)
            .field("sort", &self.sort)
            .field("limit", &self.limit)
            .field("skip", &self.skip)
            .finish()
    }
}
