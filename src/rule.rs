use std::fmt;

use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::{ErrorKind, Messages, ValidationContext, Value};

/// Result of evaluating one rule.
///
/// - `Ok(Some(value))`: the field passed and produced a typed value
/// - `Ok(None)`: the field is absent and not required; the rule did nothing
/// - `Err(error)`: the field failed, or the rule is misconfigured
pub type RuleOutcome = Result<Option<Value>, RuleError>;

/// Error produced by a rule, before it is rendered into a message.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleError {
    kind: ErrorKind,
    data: ErrorData,
}

impl RuleError {
    /// The input failed the rule.
    pub fn validation(data: ErrorData) -> Self {
        Self {
            kind: ErrorKind::Validation,
            data,
        }
    }

    /// The input could not be parsed into the compared type.
    pub fn parsing(data: ErrorData) -> Self {
        Self {
            kind: ErrorKind::Parsing,
            data,
        }
    }

    /// The rule's configuration is missing or unusable.
    pub fn data(data: ErrorData) -> Self {
        Self {
            kind: ErrorKind::ValidationData,
            data,
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the rule-specific error data.
    pub fn error_data(&self) -> &ErrorData {
        &self.data
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Rule-specific context for message generation.
///
/// Static configuration (thresholds, other-field names) is read by the rule
/// itself when it renders a message. `ErrorData` carries what is only known
/// at validation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ErrorData {
    /// Nothing beyond the rule's configuration.
    #[default]
    None,
    /// A single offending character.
    Char(char),
    /// Free text such as a parser error or a formatted comparison value.
    Text(String),
    /// A reason code chosen by the rule, such as why a domain name was
    /// rejected.
    Code(&'static str),
    /// A resolved list, e.g. comparison values read from the stash.
    List(Vec<String>),
    /// Resolved numeric bounds, already formatted.
    Bounds {
        /// Lower bound, if the rule has one.
        min: Option<String>,
        /// Upper bound, if the rule has one.
        max: Option<String>,
    },
}

/// A single named check against one field.
///
/// Implementations hold only configuration: they are built once, shared
/// across threads and evaluated for many requests. Everything per-request
/// arrives through the [`ValidationContext`].
///
/// # Implementing a rule
///
/// ```
/// use request_validator::{
///     ErrorData, Formatter, Rule, RuleBase, RuleError, RuleOutcome, ValidationContext, Value,
/// };
///
/// #[derive(Debug)]
/// struct Even {
///     base: RuleBase,
/// }
///
/// impl Rule for Even {
///     fn name(&self) -> &'static str {
///         "Even"
///     }
///
///     fn base(&self) -> &RuleBase {
///         &self.base
///     }
///
///     fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
///         let Some(v) = self.base.value(ctx) else {
///             return self.base.default_value(ctx, self.name());
///         };
///         match v.parse::<i64>() {
///             Ok(n) if n % 2 == 0 => Ok(Some(Value::Integer(n))),
///             _ => Err(RuleError::validation(ErrorData::None)),
///         }
///     }
///
///     fn generic_error_message(
///         &self,
///         label: Option<&str>,
///         _data: &ErrorData,
///         f: &Formatter<'_>,
///     ) -> String {
///         match label {
///             Some(l) => f.tr("Even", "The “%1” field must be even.", &[l]),
///             None => f.tr("Even", "Must be even.", &[]),
///         }
///     }
/// }
/// ```
pub trait Rule: fmt::Debug + Send + Sync {
    /// Short rule name used in log records and as translation context.
    fn name(&self) -> &'static str;

    /// Returns the shared rule configuration.
    fn base(&self) -> &RuleBase;

    /// Returns the validated field's name.
    fn field(&self) -> &str {
        self.base().field()
    }

    /// Returns the rule's label and custom messages.
    fn messages(&self) -> &Messages {
        self.base().messages()
    }

    /// Evaluates the rule. Must be a pure function of `ctx` and the rule's
    /// configuration.
    ///
    /// A rule returning [`RuleError::data`] logs the cause at `warn` itself;
    /// the chain only records the rendered failure at `debug`.
    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome;

    /// Message for [`ErrorKind::Validation`] errors when no custom message is set.
    fn generic_error_message(
        &self,
        label: Option<&str>,
        data: &ErrorData,
        f: &Formatter<'_>,
    ) -> String {
        let _ = data;
        match label {
            Some(l) => f.tr(
                "ValidatorRule",
                "The input data in the “%1” field is not valid.",
                &[l],
            ),
            None => f.tr("ValidatorRule", "The input data is not valid.", &[]),
        }
    }

    /// Message for [`ErrorKind::Parsing`] errors when no custom message is set.
    fn generic_parsing_error_message(
        &self,
        label: Option<&str>,
        data: &ErrorData,
        f: &Formatter<'_>,
    ) -> String {
        let _ = data;
        match label {
            Some(l) => f.tr(
                "ValidatorRule",
                "Failed to parse the input data of the “%1” field.",
                &[l],
            ),
            None => f.tr("ValidatorRule", "Failed to parse the input data.", &[]),
        }
    }

    /// Message for [`ErrorKind::ValidationData`] errors when no custom message is set.
    fn generic_data_error_message(
        &self,
        label: Option<&str>,
        data: &ErrorData,
        f: &Formatter<'_>,
    ) -> String {
        let _ = data;
        unusable_data_message(label, f)
    }
}

/// Configuration every rule shares: field, messages and default-value key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleBase {
    field: String,
    messages: Messages,
    default_key: Option<String>,
}

impl RuleBase {
    /// Creates the base for a rule on `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            messages: Messages::default(),
            default_key: None,
        }
    }

    /// Sets the label and custom messages.
    pub fn set_messages(&mut self, messages: Messages) {
        self.messages = messages;
    }

    /// Sets the stash key consulted when the field is absent or empty.
    pub fn set_default_key(&mut self, key: impl Into<String>) {
        self.default_key = Some(key.into());
    }

    /// Returns the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the label and custom messages.
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Returns the default-value stash key, if one is configured.
    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    /// Returns the field's value after the whitespace policy, or `None` if the
    /// field is missing or empty.
    pub fn value<'c>(&self, ctx: &ValidationContext<'c>) -> Option<&'c str> {
        ctx.value(&self.field).filter(|v| !v.is_empty())
    }

    /// Resolves the default value for an absent or empty field.
    ///
    /// A stash value under the default key is returned verbatim, without
    /// validating it against the rule. Without a key, or without a stash
    /// value, the rule succeeds with no value.
    pub fn default_value(&self, ctx: &ValidationContext<'_>, rule: &'static str) -> RuleOutcome {
        let Some(key) = self.default_key.as_deref() else {
            return Ok(None);
        };

        match ctx.stash().get(key) {
            Some(value) => {
                RuleLog::new(rule, &self.field, ctx).debug(format_args!(
                    "using {} default value from stash key \"{}\"",
                    value.kind(),
                    key
                ));
                Ok(Some(value.clone()))
            }
            None => Ok(None),
        }
    }
}

/// The fallback message for misconfigured rules.
pub(crate) fn unusable_data_message(label: Option<&str>, f: &Formatter<'_>) -> String {
    match label {
        Some(l) => f.tr(
            "ValidatorRule",
            "Missing or unusable validation data for the “%1” field.",
            &[l],
        ),
        None => f.tr("ValidatorRule", "Missing or unusable validation data.", &[]),
    }
}

/// Builder methods shared by every built-in rule.
macro_rules! impl_rule_builders {
    ($($rule:ty),+ $(,)?) => {
        $(
            impl $rule {
                /// Sets the label and custom messages.
                pub fn with_messages(mut self, messages: $crate::Messages) -> Self {
                    self.base.set_messages(messages);
                    self
                }

                /// Sets the label used in generated messages.
                pub fn label(mut self, label: impl Into<String>) -> Self {
                    let messages = self.base.messages().clone().label(label);
                    self.base.set_messages(messages);
                    self
                }
            }
        )+
    };
}

/// Adds the default-value builder to rules that honour the default fallback.
macro_rules! impl_default_key {
    ($($rule:ty),+ $(,)?) => {
        $(
            impl $rule {
                /// Sets the stash key whose value is used when the field is
                /// absent or empty.
                pub fn default_key(mut self, key: impl Into<String>) -> Self {
                    self.base.set_default_key(key);
                    self
                }
            }
        )+
    };
}

pub(crate) use impl_default_key;
pub(crate) use impl_rule_builders;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterSet, Stash};

    #[test]
    fn base_value_filters_empty() {
        let params = ParameterSet::new().with("a", "  ").with("b", " x ");
        let stash = Stash::new();
        let ctx = ValidationContext::new(&params, &stash);

        assert_eq!(RuleBase::new("a").value(&ctx), None);
        assert_eq!(RuleBase::new("b").value(&ctx), Some("x"));
        assert_eq!(RuleBase::new("c").value(&ctx), None);
    }

    #[test]
    fn default_value_from_stash_is_verbatim() {
        let params = ParameterSet::new();
        let stash = Stash::new().with("fallback", 12_i64);
        let ctx = ValidationContext::new(&params, &stash);

        let mut base = RuleBase::new("count");
        base.set_default_key("fallback");

        assert_eq!(base.default_value(&ctx, "Test"), Ok(Some(Value::Integer(12))));
    }

    #[test]
    fn missing_default_is_noop() {
        let params = ParameterSet::new();
        let stash = Stash::new();
        let ctx = ValidationContext::new(&params, &stash);

        let mut base = RuleBase::new("count");
        assert_eq!(base.default_value(&ctx, "Test"), Ok(None));

        base.set_default_key("absent");
        assert_eq!(base.default_value(&ctx, "Test"), Ok(None));
    }

    #[test]
    fn rule_error_constructors() {
        assert_eq!(RuleError::validation(ErrorData::None).kind(), ErrorKind::Validation);
        assert_eq!(RuleError::parsing(ErrorData::None).kind(), ErrorKind::Parsing);
        assert_eq!(RuleError::data(ErrorData::None).kind(), ErrorKind::ValidationData);
        assert_eq!(
            RuleError::validation(ErrorData::Char('x')).error_data(),
            &ErrorData::Char('x')
        );
    }
}
