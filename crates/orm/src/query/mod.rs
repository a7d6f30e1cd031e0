//! Query Builder Module - fluent filter, sort and window accumulation
//!
//! Reads are executed against the collection of the model type passed to
//! `get`, `first` or `count`.

pub mod builder;
pub mod execution;
pub mod ordering;
pub mod pagination;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use types::{QueryOperator, SortDirection};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::backends::MemoryBackend;
    use crate::database::Database;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(Database::new(Arc::new(MemoryBackend::new()), "test"))
    }

    #[test]
    fn test_modifiers_accumulate() {
        let query = builder()
            .where_op("age", QueryOperator::GreaterThan, 18)
            .where_eq("status", "active")
            .order_by_desc("age")
            .limit(10)
            .skip(5);

        assert_eq!(
            Value::Object(query.to_filter()),
            json!({"age": {"$gt": 18}, "status": {"$eq": "active"}})
        );

        let options = query.to_find_options();
        assert_eq!(options.sort, vec![("age".to_string(), SortDirection::Desc)]);
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.skip, Some(5));
    }

    #[test]
    fn test_later_filter_on_same_field_wins() {
        let query = builder().where_gt("age", 18).where_lt("age", 65);
        assert_eq!(Value::Object(query.to_filter()), json!({"age": {"$lt": 65}}));
        assert_eq!(query.filters().len(), 2);
    }

    #[test]
    fn test_order_by_same_field_replaces_direction() {
        let query = builder()
            .order_by_asc("name")
            .order_by_desc("age")
            .order_by("name", SortDirection::Desc);

        assert_eq!(
            query.sort_keys(),
            &[
                ("name".to_string(), SortDirection::Desc),
                ("age".to_string(), SortDirection::Desc)
            ]
        );
    }

    #[test]
    fn test_paginate() {
        let query = builder().paginate(20, 3);
        assert_eq!(query.limit_value(), Some(20));
        assert_eq!(query.skip_value(), Some(40));

        let query = builder().paginate(20, 0);
        assert_eq!(query.skip_value(), Some(0));
    }

    #[test]
    fn test_paginate_far_page_saturates() {
        let query = builder().paginate(50, u64::MAX);
        assert_eq!(query.limit_value(), Some(50));
        assert_eq!(query.skip_value(), Some(u64::MAX));
    }

    #[test]
    fn test_set_operators() {
        let query = builder()
            .where_in("role", vec!["admin", "owner"])
            .where_not_in("status", vec!["banned"])
            .where_exists("email", true)
            .where_regex("name", "^A");

        assert_eq!(
            Value::Object(query.to_filter()),
            json!({
                "role": {"$in": ["admin", "owner"]},
                "status": {"$nin": ["banned"]},
                "email": {"$exists": true},
                "name": {"$regex": "^A"}
            })
        );
    }
}
