//! Query Builder execution for Model types

use crate::backends::FindOptions;
use crate::document::{from_document, Document};
use crate::error::ModelResult;
use crate::hooks::call_after_find;
use crate::model::Model;
use super::builder::QueryBuilder;

impl QueryBuilder {
    /// Merge the accumulated filters; a later filter on a field replaces an earlier one
    pub fn to_filter(&self) -> Document {
        let mut combined = Document::new();
        for filter in &self.filters {
            for (key, value) in filter {
                combined.insert(key.clone(), value.clone());
            }
        }
        combined
    }

    pub fn to_find_options(&self) -> FindOptions {
        FindOptions {
            sort: self.sort.clone(),
            limit: self.limit,
            skip: self.skip,
            projection: None,
        }
    }

    /// Execute the read against `M`'s collection without decoding
    pub async fn get_raw<M: Model>(self) -> ModelResult<Vec<Document>> {
        let ns = self.database.namespace(M::collection_name());
        let filter = self.to_filter();
        let options = self.to_find_options();

        tracing::debug!(
            namespace = %ns,
            filters = self.filters.len(),
            limit = ?options.limit,
            skip = ?options.skip,
            "executing query"
        );

        self.database
            .collection_named(M::collection_name())
            .find(&filter, &options)
            .await
    }

    /// Execute the read and decode every match, running `after_find` on each
    pub async fn get<M: Model>(self) -> ModelResult<Vec<M>> {
        let documents = self.get_raw::<M>().await?;

        let mut models = Vec::with_capacity(documents.len());
        for document in documents {
            let mut model: M = from_document(document)?;
            call_after_find(&mut model).await?;
            models.push(model);
        }

        Ok(models)
    }

    /// First match in sort order, if any
    pub async fn first<M: Model>(self) -> ModelResult<Option<M>> {
        Ok(self.limit(1).get::<M>().await?.into_iter().next())
    }

    /// Number of documents matching the filters; sort and window are ignored
    pub async fn count<M: Model>(self) -> ModelResult<u64> {
        self.database
            .collection_named(M::collection_name())
            .count_documents(&self.to_filter())
            .await
    }
}
