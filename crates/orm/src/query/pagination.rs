//! Query Builder pagination operations

use super::builder::QueryBuilder;

impl QueryBuilder {
    /// Cap the number of results; non-positive means no limit
    pub fn limit(mut self, count: i64) -> Self {
        self.limit = Some(count);
        self
    }

    /// Skip the first `count` results
    pub fn skip(mut self, count: u64) -> Self {
        self.skip = Some(count);
        self
    }

    /// One-based page of `per_page` results
    pub fn paginate(mut self, per_page: i64, page: u64) -> Self {
        let per_page = per_page.max(1);
        self.limit = Some(per_page);
        self.skip = Some(page.saturating_sub(1).saturating_mul(per_page as u64));
        self
    }
}
