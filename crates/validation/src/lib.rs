//! # mox-validation
//!
//! Field validation for the mox document mapper. Provides the four
//! declarative rules (`required`, `email`, `min`, `max`), the validators
//! behind them, and an aggregated error type that names every failing field.

pub mod error;
pub mod rules;
pub mod traits;
pub mod validators;

pub use error::{ValidationError, ValidationErrors, ValidationResult};
pub use rules::{validate_fields, Field, Rule, Rules};
pub use traits::{ToValidationValue, ValidationRule};

pub use validators::{EmailValidator, LengthValidator, NumericValidator, RequiredValidator};
