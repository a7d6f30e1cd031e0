//! Query Builder filter operations

use serde_json::Value;

use super::builder::QueryBuilder;
use super::types::QueryOperator;
use crate::document::Document;

impl QueryBuilder {
    /// Add a `{field: {$op: value}}` condition
    pub fn where_op<T: Into<Value>>(mut self, field: &str, operator: QueryOperator, value: T) -> Self {
        let mut expression = Document::new();
        expression.insert(operator.as_operator().to_string(), value.into());

        let mut condition = Document::new();
        condition.insert(field.to_string(), Value::Object(expression));
        self.filters.push(condition);
        self
    }

    /// Add an equality condition
    pub fn where_eq<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.where_op(field, QueryOperator::Equal, value)
    }

    pub fn where_ne<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.where_op(field, QueryOperator::NotEqual, value)
    }

    pub fn where_gt<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.where_op(field, QueryOperator::GreaterThan, value)
    }

    pub fn where_gte<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.where_op(field, QueryOperator::GreaterThanOrEqual, value)
    }

    pub fn where_lt<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.where_op(field, QueryOperator::LessThan, value)
    }

    pub fn where_lte<T: Into<Value>>(self, field: &str, value: T) -> Self {
        self.where_op(field, QueryOperator::LessThanOrEqual, value)
    }

    /// Match any of `values`
    pub fn where_in<T: Into<Value>>(self, field: &str, values: Vec<T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.where_op(field, QueryOperator::In, values)
    }

    pub fn where_not_in<T: Into<Value>>(self, field: &str, values: Vec<T>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.where_op(field, QueryOperator::NotIn, values)
    }

    /// Match documents that have (or lack) `field`
    pub fn where_exists(self, field: &str, exists: bool) -> Self {
        self.where_op(field, QueryOperator::Exists, exists)
    }

    pub fn where_regex(self, field: &str, pattern: &str) -> Self {
        self.where_op(field, QueryOperator::Regex, pattern)
    }

    /// Add a raw filter document, merged key by key with the others
    pub fn filter(mut self, filter: Document) -> Self {
        self.filters.push(filter);
        self
    }
}
