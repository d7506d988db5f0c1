use std::fmt;

use serde::Serialize;

/// An error produced for one field during a validation pass.
///
/// Every error is scoped to the field whose rule produced it and carries the
/// final, human-readable message rendered by the [`Formatter`](crate::Formatter).
///
/// # Examples
///
/// ```
/// use request_validator::{ErrorKind, ValidationError};
///
/// let error = ValidationError::new("email", ErrorKind::Validation, "This is required.");
/// assert_eq!(error.field(), "email");
/// assert!(!error.is_data_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    field: String,
    kind: ErrorKind,
    message: String,
}

impl ValidationError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Returns the name of the field the error belongs to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the rendered error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the error signals a misconfigured rule rather than bad input.
    pub fn is_data_error(&self) -> bool {
        self.kind == ErrorKind::ValidationData
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The class of a validation error.
///
/// `Validation` and `Parsing` errors describe user input and are safe to show
/// to end users. `ValidationData` errors describe a misconfigured rule and
/// should be treated as a deployment bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input failed the rule.
    Validation,
    /// The input could not be parsed into the type the rule compares against.
    Parsing,
    /// The rule's own configuration is missing or unusable.
    ValidationData,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation error"),
            Self::Parsing => write!(f, "parsing error"),
            Self::ValidationData => write!(f, "validation data error"),
        }
    }
}

/// Error returned when a [`ValidatorConfig`](crate::ValidatorConfig) cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid validator configuration: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_accessors() {
        let error = ValidationError::new("age", ErrorKind::Parsing, "not a number");

        assert_eq!(error.field(), "age");
        assert_eq!(error.kind(), ErrorKind::Parsing);
        assert_eq!(error.message(), "not a number");
        assert!(!error.is_data_error());
    }

    #[test]
    fn data_error_is_flagged() {
        let error = ValidationError::new("color", ErrorKind::ValidationData, "empty list");
        assert!(error.is_data_error());
    }

    #[test]
    fn validation_error_display() {
        let error = ValidationError::new("name", ErrorKind::Validation, "This is required.");
        let output = format!("{}", error);

        assert!(output.contains("name"));
        assert!(output.contains("validation error"));
        assert!(output.contains("This is required."));
    }

    #[test]
    fn error_kinds_display() {
        assert_eq!(format!("{}", ErrorKind::Validation), "validation error");
        assert_eq!(format!("{}", ErrorKind::Parsing), "parsing error");
        assert_eq!(
            format!("{}", ErrorKind::ValidationData),
            "validation data error"
        );
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ValidationData).unwrap();
        assert_eq!(json, "\"validation_data\"");
    }

    #[test]
    fn config_error_display() {
        let error = ConfigError::new("unknown field `foo`");
        assert_eq!(
            format!("{}", error),
            "invalid validator configuration: unknown field `foo`"
        );
    }
}
