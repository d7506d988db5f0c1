use std::collections::HashMap;
use std::sync::Arc;

use crate::format::{Catalog, DefaultCatalog, Formatter};
use crate::logging::RuleLog;
use crate::report::{FieldReport, FieldResult, ValidationReport};
use crate::{
    Locale, ParameterSet, Rule, Stash, ValidationContext, ValidationError,
    ValidatorConfig, Value,
};

/// Stash key receiving the error messages when the stash is filled on error.
pub const ERROR_STRINGS_KEY: &str = "validationErrorStrings";

/// Stash key receiving the names of the failed fields when the stash is
/// filled on error.
pub const ERROR_FIELDS_KEY: &str = "validationErrorFields";

/// An ordered chain of rules evaluated together.
///
/// Every rule runs on every pass, even after an earlier one failed, so a
/// caller gets all field errors at once. A validator is immutable once built
/// and can be shared between threads behind an [`Arc`].
///
/// # Examples
///
/// ```
/// use request_validator::rules::{Confirmed, Required};
/// use request_validator::{ParameterSet, Stash, Validator};
///
/// let validator = Validator::new()
///     .label("password", "Password")
///     .rule(Required::new("password"))
///     .rule(Confirmed::new("password"));
///
/// let params = ParameterSet::new()
///     .with("password", "hunter2")
///     .with("password_confirmation", "hunter3");
/// let report = validator.validate(&params, &Stash::new());
///
/// assert!(!report.is_valid());
/// assert_eq!(
///     report.errors_for("password"),
///     vec!["The content of the “Password” field has not been confirmed."]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    rules: Vec<Arc<dyn Rule>>,
    labels: HashMap<String, String>,
    trim: bool,
    fill_stash_on_error: bool,
    locale: Option<Locale>,
    catalog: Arc<dyn Catalog>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Creates an empty validator with trimming enabled.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            labels: HashMap::new(),
            trim: true,
            fill_stash_on_error: false,
            locale: None,
            catalog: Arc::new(DefaultCatalog),
        }
    }

    /// Creates a validator from loaded settings.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new().with_config(config)
    }

    /// Applies loaded settings, replacing trimming, fill-on-error and locale
    /// and merging the labels.
    pub fn with_config(mut self, config: &ValidatorConfig) -> Self {
        self.trim = config.trim;
        self.fill_stash_on_error = config.fill_stash_on_error;
        self.locale = config.locale();
        self.labels
            .extend(config.labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Appends a rule to the chain.
    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets the label of `field` for rules that have none of their own.
    pub fn label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Sets several field labels at once.
    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Inspects values exactly as submitted, without trimming whitespace.
    pub fn no_trimming(mut self) -> Self {
        self.trim = false;
        self
    }

    /// Makes [`validate_into_stash`](Self::validate_into_stash) copy errors
    /// and parameters into the stash when validation fails.
    pub fn fill_stash_on_error(mut self) -> Self {
        self.fill_stash_on_error = true;
        self
    }

    /// Uses `locale` for passes started with [`validate`](Self::validate).
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Uses `catalog` to translate messages.
    pub fn catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the chain has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule against `params` and `stash`.
    pub fn validate(&self, params: &ParameterSet, stash: &Stash) -> ValidationReport {
        let mut ctx = ValidationContext::new(params, stash);
        if let Some(locale) = &self.locale {
            ctx = ctx.with_locale(locale);
        }
        self.validate_with(&ctx)
    }

    /// Runs every rule within a prepared context.
    ///
    /// The context's locale and origin are used as given. Trimming is disabled
    /// when either the context or the validator disables it.
    pub fn validate_with(&self, ctx: &ValidationContext<'_>) -> ValidationReport {
        let ctx = if self.trim {
            *ctx
        } else {
            ctx.without_trimming()
        };
        let origin = ctx.origin().unwrap_or("-");
        let mut report = ValidationReport::new();

        if self.rules.is_empty() {
            tracing::warn!(origin = %origin, "validation chain has no rules");
            return report;
        }
        if ctx.params().is_empty() {
            tracing::debug!(origin = %origin, "validating an empty parameter set");
        }

        let formatter = Formatter::new(self.catalog.as_ref(), ctx.locale(), &self.labels);

        for rule in &self.rules {
            let rule = rule.as_ref();
            let result = match rule.validate(&ctx) {
                Ok(Some(value)) => FieldResult::Value(value),
                Ok(None) => FieldResult::Empty,
                Err(error) => {
                    let message = formatter.render(rule, &error);
                    RuleLog::new(rule.name(), rule.field(), &ctx)
                        .debug(format_args!("{}: {}", error.kind(), message));
                    FieldResult::Error(ValidationError::new(rule.field(), error.kind(), message))
                }
            };
            report.push(FieldReport::new(rule.name(), rule.field(), result));
        }

        report
    }

    /// Runs the chain and, when it fails and filling is enabled, stores the
    /// error messages, the failed field names and every parameter whose key
    /// does not look like a password in `stash`.
    ///
    /// # Examples
    ///
    /// ```
    /// use request_validator::rules::Required;
    /// use request_validator::{ParameterSet, Stash, Validator, Value};
    ///
    /// let validator = Validator::new()
    ///     .fill_stash_on_error()
    ///     .rule(Required::new("email"));
    ///
    /// let params = ParameterSet::new().with("name", "Ada").with("password", "secret");
    /// let mut stash = Stash::new();
    /// let report = validator.validate_into_stash(&params, &mut stash);
    ///
    /// assert!(!report.is_valid());
    /// assert_eq!(stash.get("name"), Some(&Value::from("Ada")));
    /// assert!(!stash.contains("password"));
    /// assert_eq!(
    ///     stash.get("validationErrorFields"),
    ///     Some(&Value::List(vec!["email".into()]))
    /// );
    /// ```
    pub fn validate_into_stash(&self, params: &ParameterSet, stash: &mut Stash) -> ValidationReport {
        let report = self.validate(params, stash);

        if self.fill_stash_on_error && !report.is_valid() {
            let strings = report.error_strings().into_iter().map(str::to_string).collect();
            let fields = report.error_fields().into_iter().map(str::to_string).collect();
            stash.insert(ERROR_STRINGS_KEY, Value::List(strings));
            stash.insert(ERROR_FIELDS_KEY, Value::List(fields));

            for (key, _) in params.iter() {
                if key.to_lowercase().contains("password") {
                    continue;
                }
                if let Some(value) = params.value(key) {
                    stash.insert(key, value);
                }
            }
        }

        report
    }
}
