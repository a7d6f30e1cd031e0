//! Model System - the contract persistable documents implement
//!
//! - `core_trait`: the `Model` trait and its capability accessors
//! - `record`: the embedded base record and the `Archivable` capability
//! - `identifier`: insert-vs-update identifier resolution
//! - `validation`: the `Validatable` capability and its dispatcher

pub mod core_trait;
pub mod identifier;
pub mod record;
pub mod validation;

pub use core_trait::Model;
pub use identifier::{extract_id, is_unset, require_id};
pub use record::{Archivable, Record, TIMESTAMP_FIELDS};
pub use validation::{validate_model, Validatable};
