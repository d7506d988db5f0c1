use std::collections::HashMap;

use serde::Deserialize;

use crate::{ConfigError, Locale};

/// Validator settings loadable from TOML.
///
/// Every key is optional:
///
/// ```toml
/// trim = true
/// fill_stash_on_error = false
/// locale = "de_DE"
///
/// [labels]
/// email = "E-Mail"
/// ```
///
/// # Examples
///
/// ```
/// use request_validator::ValidatorConfig;
///
/// let config = ValidatorConfig::from_toml_str(r#"
///     fill_stash_on_error = true
///     locale = "de_DE"
///
///     [labels]
///     email = "E-Mail"
/// "#).unwrap();
///
/// assert!(config.trim);
/// assert!(config.fill_stash_on_error);
/// assert_eq!(config.labels["email"], "E-Mail");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Trim whitespace from values before inspection.
    pub trim: bool,
    /// Copy errors and non-password parameters into the stash on failure.
    pub fill_stash_on_error: bool,
    /// Locale name such as `de_DE` or `en-GB`.
    pub locale: Option<String>,
    /// Human-readable field labels.
    pub labels: HashMap<String, String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            trim: true,
            fill_stash_on_error: false,
            locale: None,
            labels: HashMap::new(),
        }
    }
}

impl ValidatorConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed TOML, unknown keys, an empty
    /// locale name or an empty label key.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;

        if config.locale.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(ConfigError::new("locale must not be empty"));
        }
        if config.labels.keys().any(|k| k.is_empty()) {
            return Err(ConfigError::new("label keys must not be empty"));
        }

        Ok(config)
    }

    /// Returns the configured locale.
    pub fn locale(&self) -> Option<Locale> {
        self.locale.as_deref().map(Locale::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_uses_defaults() {
        let config = ValidatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert!(config.locale().is_none());
    }

    #[test]
    fn locale_is_resolved() {
        let config = ValidatorConfig::from_toml_str(r#"locale = "de-DE""#).unwrap();
        assert_eq!(config.locale().map(|l| l.language().to_string()), Some("de".into()));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ValidatorConfig::from_toml_str("trimming = false").unwrap_err();
        assert!(err.message().contains("trimming"));
    }

    #[test]
    fn rejects_empty_values() {
        assert!(ValidatorConfig::from_toml_str(r#"locale = " ""#).is_err());
        assert!(ValidatorConfig::from_toml_str("[labels]\n\"\" = \"x\"").is_err());
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(ValidatorConfig::from_toml_str(r#"trim = "yes""#).is_err());
    }
}
