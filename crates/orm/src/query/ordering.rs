//! Query Builder sort operations

use super::builder::QueryBuilder;
use super::types::SortDirection;

impl QueryBuilder {
    /// Sort by `field`; sorting again by the same field replaces its direction
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        match self.sort.iter_mut().find(|(existing, _)| existing == field) {
            Some(entry) => entry.1 = direction,
            None => self.sort.push((field.to_string(), direction)),
        }
        self
    }

    pub fn order_by_asc(self, field: &str) -> Self {
        self.order_by(field, SortDirection::Asc)
    }

    pub fn order_by_desc(self, field: &str) -> Self {
        self.order_by(field, SortDirection::Desc)
    }
}
