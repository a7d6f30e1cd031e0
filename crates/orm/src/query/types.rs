//! Query Builder Types - Core types and enums for query building

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Comparison operators accepted by `where_op`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    Exists,
    Regex,
}

impl QueryOperator {
    /// The document-query operator key, e.g. `$gt`
    pub fn as_operator(&self) -> &'static str {
        match self {
            QueryOperator::Equal => "$eq",
            QueryOperator::NotEqual => "$ne",
            QueryOperator::GreaterThan => "$gt",
            QueryOperator::GreaterThanOrEqual => "$gte",
            QueryOperator::LessThan => "$lt",
            QueryOperator::LessThanOrEqual => "$lte",
            QueryOperator::In => "$in",
            QueryOperator::NotIn => "$nin",
            QueryOperator::Exists => "$exists",
            QueryOperator::Regex => "$regex",
        }
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_operator())
    }
}

impl FromStr for QueryOperator {
    type Err = ModelError;

    /// Accepts the bare name (`gt`) or the operator key (`$gt`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix('$').unwrap_or(s);
        match name.to_lowercase().as_str() {
            "eq" => Ok(QueryOperator::Equal),
            "ne" => Ok(QueryOperator::NotEqual),
            "gt" => Ok(QueryOperator::GreaterThan),
            "gte" => Ok(QueryOperator::GreaterThanOrEqual),
            "lt" => Ok(QueryOperator::LessThan),
            "lte" => Ok(QueryOperator::LessThanOrEqual),
            "in" => Ok(QueryOperator::In),
            "nin" => Ok(QueryOperator::NotIn),
            "exists" => Ok(QueryOperator::Exists),
            "regex" => Ok(QueryOperator::Regex),
            _ => Err(ModelError::Query(format!("Unknown query operator: {}", s))),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Numeric form used in sort documents
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortDirection::Asc),
            "desc" | "descending" | "-1" => Ok(SortDirection::Desc),
            _ => Err(ModelError::Query(format!("Unknown sort direction: {}", s))),
        }
    }
}
