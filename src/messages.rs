use serde::Deserialize;

use crate::ErrorKind;

/// Per-rule label and custom message overrides.
///
/// A custom message preempts the generated one for its error kind. The label
/// is the human-readable field name used in generated messages; when it is
/// not set, the validator's label dictionary is consulted.
///
/// # Examples
///
/// ```
/// use request_validator::{ErrorKind, Messages};
///
/// let messages = Messages::new()
///     .label("E-Mail")
///     .validation_error("Please tell us your e-mail address.");
///
/// assert_eq!(messages.label_text(), Some("E-Mail"));
/// assert_eq!(
///     messages.custom_for(ErrorKind::Validation),
///     Some("Please tell us your e-mail address.")
/// );
/// assert_eq!(messages.custom_for(ErrorKind::ValidationData), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Messages {
    label: Option<String>,
    validation_error: Option<String>,
    parsing_error: Option<String>,
    validation_data_error: Option<String>,
}

impl Messages {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the message shown when the input fails the rule.
    pub fn validation_error(mut self, message: impl Into<String>) -> Self {
        self.validation_error = Some(message.into());
        self
    }

    /// Sets the message shown when the input cannot be parsed.
    pub fn parsing_error(mut self, message: impl Into<String>) -> Self {
        self.parsing_error = Some(message.into());
        self
    }

    /// Sets the message shown when the rule is misconfigured.
    pub fn validation_data_error(mut self, message: impl Into<String>) -> Self {
        self.validation_data_error = Some(message.into());
        self
    }

    /// Returns the label, if one was set.
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }

    /// Returns the custom message for `kind`, if one was set.
    pub fn custom_for(&self, kind: ErrorKind) -> Option<&str> {
        let custom = match kind {
            ErrorKind::Validation => &self.validation_error,
            ErrorKind::Parsing => &self.parsing_error,
            ErrorKind::ValidationData => &self.validation_data_error,
        };
        custom.as_deref().filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_count_as_unset() {
        let messages = Messages::new().label("").validation_error("");

        assert_eq!(messages.label_text(), None);
        assert_eq!(messages.custom_for(ErrorKind::Validation), None);
    }

    #[test]
    fn each_kind_has_its_own_override() {
        let messages = Messages::new()
            .validation_error("v")
            .parsing_error("p")
            .validation_data_error("d");

        assert_eq!(messages.custom_for(ErrorKind::Validation), Some("v"));
        assert_eq!(messages.custom_for(ErrorKind::Parsing), Some("p"));
        assert_eq!(messages.custom_for(ErrorKind::ValidationData), Some("d"));
    }

    #[test]
    fn deserializes_from_toml() {
        let messages: Messages = toml::from_str(
            r#"
            label = "Age"
            parsing_error = "Numbers only, please."
            "#,
        )
        .unwrap();

        assert_eq!(messages.label_text(), Some("Age"));
        assert_eq!(
            messages.custom_for(ErrorKind::Parsing),
            Some("Numbers only, please.")
        );
    }
}
