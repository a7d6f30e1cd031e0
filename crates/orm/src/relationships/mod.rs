//! Relationships Module - declarative relationship descriptors and loading

pub mod metadata;
pub mod types;

pub use metadata::{RelationshipType, DEFAULT_FOREIGN_KEY};
pub use types::Relationship;
