//! Built-in validators backing the declarative rule set

pub mod email;
pub mod length;
pub mod numeric;
pub mod required;

pub use email::EmailValidator;
pub use length::LengthValidator;
pub use numeric::NumericValidator;
pub use required::RequiredValidator;
