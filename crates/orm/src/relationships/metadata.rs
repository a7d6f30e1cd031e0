//! Relationship Metadata - kinds of relationship and how each selects related documents

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::ID_FIELD;

/// Reference field used by `has_many` / `has_one` unless overridden
pub const DEFAULT_FOREIGN_KEY: &str = "parent_id";

/// Defines the type of relationship between models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    /// The related document is addressed by the parent reference itself
    BelongsTo,
    /// Every related document whose reference field holds the parent id
    HasMany,
    /// At most one related document whose reference field holds the parent id
    HasOne,
    /// A document stored in its own collection under the parent id
    Embeds,
}

impl RelationshipType {
    /// Returns true if this relationship returns a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany)
    }

    /// Returns true if related documents are selected by their own `_id`
    pub fn selects_by_id(self) -> bool {
        matches!(self, Self::BelongsTo | Self::Embeds)
    }

    /// Field compared against the parent id
    pub fn selector_field(self, foreign_key: &str) -> &str {
        if self.selects_by_id() {
            ID_FIELD
        } else {
            foreign_key
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipType::BelongsTo => write!(f, "belongsTo"),
            RelationshipType::HasMany => write!(f, "hasMany"),
            RelationshipType::HasOne => write!(f, "hasOne"),
            RelationshipType::Embeds => write!(f, "embeds"),
        }
    }
}
