//! Declarative field rules
//!
//! A [`Field`] pairs a name and value with a list of [`Rule`]s. Running
//! [`validate_fields`] over a slice checks every rule of every field and
//! collects all failures into one [`ValidationErrors`], so a single error
//! names each offending field.

use crate::error::{ValidationErrors, ValidationResult};
use crate::traits::{ToValidationValue, ValidationRule};
use crate::validators::*;
use serde_json::Value;
use std::fmt;

/// The closed set of declarative rule kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Value must be present and non-empty
    Required,
    /// String value must be a well-formed email address
    Email,
    /// Lower bound: numeric value for numbers, length for strings and arrays
    Min(f64),
    /// Upper bound: numeric value for numbers, length for strings and arrays
    Max(f64),
}

impl Rule {
    /// Rule name as used in declarations (`required`, `email`, `min`, `max`)
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Email => "email",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
        }
    }

    /// Parse a rule from its name and optional parameter, e.g. `("min", Some(3.0))`
    pub fn parse(name: &str, param: Option<f64>) -> Option<Self> {
        match (name, param) {
            ("required", _) => Some(Rule::Required),
            ("email", _) => Some(Rule::Email),
            ("min", Some(n)) => Some(Rule::Min(n)),
            ("max", Some(n)) => Some(Rule::Max(n)),
            _ => None,
        }
    }

    /// Run this rule against one value
    pub async fn check(&self, value: &Value, field: &str) -> ValidationResult<()> {
        match self {
            Rule::Required => RequiredValidator::new().validate(value, field).await,
            Rule::Email => EmailValidator::new().validate(value, field).await,
            Rule::Min(bound) => match value {
                Value::Number(_) => NumericValidator::new().min(*bound).validate(value, field).await,
                _ => LengthValidator::new().min(length_bound(*bound)).validate(value, field).await,
            },
            Rule::Max(bound) => match value {
                Value::Number(_) => NumericValidator::new().max(*bound).validate(value, field).await,
                _ => LengthValidator::new().max(length_bound(*bound)).validate(value, field).await,
            },
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Min(n) | Rule::Max(n) => write!(f, "{}:{}", self.name(), n),
            _ => write!(f, "{}", self.name()),
        }
    }
}

fn length_bound(bound: f64) -> usize {
    if bound <= 0.0 {
        0
    } else {
        bound.ceil() as usize
    }
}

/// A named value together with the rules it must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
    pub rules: Vec<Rule>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl ToValidationValue) -> Self {
        Self {
            name: name.into(),
            value: value.to_validation_value(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn email(self) -> Self {
        self.rule(Rule::Email)
    }

    pub fn min(self, bound: f64) -> Self {
        self.rule(Rule::Min(bound))
    }

    pub fn max(self, bound: f64) -> Self {
        self.rule(Rule::Max(bound))
    }

    /// Check every rule on this field, collecting all failures
    pub async fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        for rule in &self.rules {
            if let Err(rule_errors) = rule.check(&self.value, &self.name).await {
                errors.merge(rule_errors);
            }
        }
        errors.into_result()
    }
}

/// Validate a list of fields against their rules.
///
/// Returns one combined error listing every failing field, in declaration order.
pub async fn validate_fields(fields: &[Field]) -> ValidationResult<()> {
    let mut errors = ValidationErrors::new();
    for field in fields {
        if let Err(field_errors) = field.validate().await {
            errors.merge(field_errors);
        }
    }
    errors.into_result()
}

/// Rule declarations keyed by field name, applied to a JSON object.
///
/// Fields missing from the object are checked as `null`.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    field_rules: Vec<(String, Vec<Rule>)>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for a field, keeping declaration order
    pub fn field(mut self, field: impl Into<String>, rule: Rule) -> Self {
        let field = field.into();
        match self.field_rules.iter_mut().find(|(name, _)| *name == field) {
            Some((_, rules)) => rules.push(rule),
            None => self.field_rules.push((field, vec![rule])),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.field_rules.is_empty()
    }

    pub fn get_field_rules(&self, field: &str) -> Option<&[Rule]> {
        self.field_rules
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Build the field list for an object and validate it
    pub async fn validate_object(&self, object: &serde_json::Map<String, Value>) -> ValidationResult<()> {
        let fields: Vec<Field> = self
            .field_rules
            .iter()
            .map(|(name, rules)| Field {
                name: name.clone(),
                value: object.get(name).cloned().unwrap_or(Value::Null),
                rules: rules.clone(),
            })
            .collect();
        validate_fields(&fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_required_failures_name_every_field() {
        let fields = vec![
            Field::new("name", "").required(),
            Field::new("email", Value::Null).required(),
            Field::new("age", 30).required(),
        ];

        let errors = validate_fields(&fields).await.unwrap_err();
        let message = errors.to_string();
        assert!(message.contains("name"));
        assert!(message.contains("email"));
        assert!(!message.contains("age"));
        assert_eq!(message, "name is required, email is required");
    }

    #[tokio::test]
    async fn test_populated_fields_pass() {
        let fields = vec![
            Field::new("name", "Alice").required().min(2.0).max(50.0),
            Field::new("email", "alice@example.com").required().email(),
            Field::new("age", 30).min(18.0).max(120.0),
        ];

        assert!(validate_fields(&fields).await.is_ok());
    }

    #[tokio::test]
    async fn test_min_max_dispatch_on_value_type() {
        let short = Field::new("name", "A").min(2.0);
        assert_eq!(short.validate().await.unwrap_err().errors[0].code, "length_min");

        let young = Field::new("age", 12).min(18.0);
        assert_eq!(young.validate().await.unwrap_err().errors[0].code, "numeric_min");

        let tags = Field::new("tags", vec!["a", "b", "c"]).max(2.0);
        assert_eq!(tags.validate().await.unwrap_err().errors[0].code, "length_max");
    }

    #[tokio::test]
    async fn test_one_field_can_fail_several_rules() {
        let field = Field::new("email", "x").email().min(5.0);
        let errors = field.validate().await.unwrap_err();
        assert_eq!(errors.total_errors(), 2);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_rule_parse_and_display() {
        assert_eq!(Rule::parse("required", None), Some(Rule::Required));
        assert_eq!(Rule::parse("min", Some(3.0)), Some(Rule::Min(3.0)));
        assert_eq!(Rule::parse("max", None), None);
        assert_eq!(Rule::parse("unique", None), None);
        assert_eq!(Rule::Max(10.0).to_string(), "max:10");
        assert_eq!(Rule::Email.to_string(), "email");
    }

    #[tokio::test]
    async fn test_rules_validate_object() {
        let rules = Rules::new()
            .field("name", Rule::Required)
            .field("email", Rule::Required)
            .field("email", Rule::Email);

        assert_eq!(rules.get_field_rules("email").map(|r| r.len()), Some(2));

        let object = json!({ "name": "Alice" });
        let errors = rules
            .validate_object(object.as_object().unwrap())
            .await
            .unwrap_err();
        assert_eq!(errors.field_names(), vec!["email"]);

        let object = json!({ "name": "Alice", "email": "alice@example.com" });
        assert!(rules.validate_object(object.as_object().unwrap()).await.is_ok());
    }
}
