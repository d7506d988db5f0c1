//! Results of a validation pass.

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::{ErrorKind, ValidationError, Value};

/// What one rule produced for its field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldResult {
    /// The rule passed and produced a typed value.
    Value(Value),
    /// The rule passed without a value (absent optional field).
    Empty,
    /// The rule failed.
    Error(ValidationError),
}

/// The outcome of one rule in a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    rule: &'static str,
    field: String,
    result: FieldResult,
}

impl FieldReport {
    pub(crate) fn new(rule: &'static str, field: impl Into<String>, result: FieldResult) -> Self {
        Self {
            rule,
            field: field.into(),
            result,
        }
    }

    /// Name of the rule that ran.
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Field the rule validated.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// What the rule produced.
    pub fn result(&self) -> &FieldResult {
        &self.result
    }

    fn error(&self) -> Option<&ValidationError> {
        match &self.result {
            FieldResult::Error(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of running a [`Validator`](crate::Validator) once.
///
/// Entries are kept in rule order. A field validated by several rules has
/// several entries; its typed value is the one produced by the last passing
/// rule that produced a value.
///
/// # Examples
///
/// ```
/// use request_validator::rules::{Integer, Required};
/// use request_validator::{ParameterSet, Stash, Validator, Value};
///
/// let validator = Validator::new()
///     .rule(Required::new("age"))
///     .rule(Integer::new("age"))
///     .rule(Required::new("name"));
///
/// let params = ParameterSet::new().with("age", "42");
/// let report = validator.validate(&params, &Stash::new());
///
/// assert!(!report.is_valid());
/// assert_eq!(report.value("age"), Some(&Value::Integer(42)));
/// assert_eq!(report.error_fields(), vec!["name"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    entries: Vec<FieldReport>,
}

impl ValidationReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: FieldReport) {
        self.entries.push(entry);
    }

    /// Returns `true` when no rule failed.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Returns every rule outcome in rule order.
    pub fn entries(&self) -> &[FieldReport] {
        &self.entries
    }

    /// Returns the typed values by field name.
    pub fn values(&self) -> BTreeMap<&str, &Value> {
        self.entries
            .iter()
            .filter_map(|e| match &e.result {
                FieldResult::Value(v) => Some((e.field.as_str(), v)),
                _ => None,
            })
            .collect()
    }

    /// Returns the typed value for `field`.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.entries.iter().rev().find_map(|e| match &e.result {
            FieldResult::Value(v) if e.field == field => Some(v),
            _ => None,
        })
    }

    /// Returns every error in rule order.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter().filter_map(FieldReport::error)
    }

    /// Returns the messages of the errors for `field`.
    pub fn errors_for(&self, field: &str) -> Vec<&str> {
        self.errors()
            .filter(|e| e.field() == field)
            .map(ValidationError::message)
            .collect()
    }

    /// Returns all error messages in rule order.
    pub fn error_strings(&self) -> Vec<&str> {
        self.errors().map(ValidationError::message).collect()
    }

    /// Returns the names of the fields with errors, each once, in rule order.
    pub fn error_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for e in self.errors() {
            if !fields.contains(&e.field()) {
                fields.push(e.field());
            }
        }
        fields
    }

    /// Returns only the errors caused by misconfigured rules.
    pub fn data_errors(&self) -> Vec<&ValidationError> {
        self.errors()
            .filter(|e| e.kind() == ErrorKind::ValidationData)
            .collect()
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let errors: Vec<&ValidationError> = self.errors().collect();
        let mut state = serializer.serialize_struct("ValidationReport", 3)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("values", &self.values())?;
        state.serialize_field("errors", &errors)?;
        state.end()
    }
}
