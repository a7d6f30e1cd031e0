//! Base Record - identifier, timestamps and soft-delete marker every model embeds
//!
//! Embed with `#[serde(flatten)]` so the fields land at the top level of the
//! stored document under `_id`, `created_at`, `updated_at` and `deleted_at`.
//! Empty fields are omitted from the stored document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::ObjectId;

/// Stored keys of the record timestamps, in declaration order
pub const TIMESTAMP_FIELDS: [&str; 3] = ["created_at", "updated_at", "deleted_at"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id", default, skip_serializing_if = "ObjectId::is_nil")]
    pub id: ObjectId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// `None` while active, the archive instant once soft deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Stamp a save at `now`: `created_at` only if never set, `updated_at` always
    pub fn set_timestamps(&mut self, now: DateTime<Utc>) {
        if self.created_at.is_none() {
            self.created_at = Some(now);
        }
        self.updated_at = Some(now);
    }

    pub fn touch(&mut self) {
        self.set_timestamps(Utc::now());
    }
}

/// Soft-delete capability: mark a document inactive instead of removing it
pub trait Archivable: Send + Sync {
    /// Set the soft-delete timestamp to now
    fn archive(&mut self);

    /// Clear the soft-delete timestamp
    fn restore(&mut self);

    fn is_archived(&self) -> bool;
}

impl Archivable for Record {
    fn archive(&mut self) {
        self.deleted_at = Some(Utc::now());
    }

    fn restore(&mut self) {
        self.deleted_at = None;
    }

    fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}
