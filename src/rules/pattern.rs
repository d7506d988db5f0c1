use regex::Regex;

use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// The field must match a regular expression.
///
/// The pattern is searched, not anchored: add `^` and `$` to match the whole
/// value. An invalid pattern does not fail construction; it is reported as a
/// data error whenever the rule runs.
///
/// ```
/// use request_validator::rules::RegularExpression;
/// use request_validator::{ErrorKind, ParameterSet, Rule, Stash, ValidationContext};
///
/// let stash = Stash::new();
/// let params = ParameterSet::new().with("zip", "12345");
/// let ctx = ValidationContext::new(&params, &stash);
///
/// assert!(RegularExpression::new("zip", r"^\d{5}$").validate(&ctx).is_ok());
///
/// let broken = RegularExpression::new("zip", r"^\d{5");
/// assert_eq!(broken.validate(&ctx).unwrap_err().kind(), ErrorKind::ValidationData);
/// ```
#[derive(Debug, Clone)]
pub struct RegularExpression {
    base: RuleBase,
    regex: Result<Regex, regex::Error>,
}

impl RegularExpression {
    /// Requires `field` to match `pattern`.
    pub fn new(field: impl Into<String>, pattern: &str) -> Self {
        Self {
            base: RuleBase::new(field),
            regex: Regex::new(pattern),
        }
    }

    /// Uses an already compiled expression.
    pub fn with_regex(field: impl Into<String>, regex: Regex) -> Self {
        Self {
            base: RuleBase::new(field),
            regex: Ok(regex),
        }
    }
}

impl Rule for RegularExpression {
    fn name(&self) -> &'static str {
        "RegularExpression"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let regex = match &self.regex {
            Ok(regex) => regex,
            Err(e) => {
                RuleLog::new(self.name(), self.field(), ctx)
                    .warn(format_args!("invalid regular expression: {}", e));
                return Err(RuleError::data(ErrorData::Text(e.to_string())));
            }
        };

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if regex.is_match(v) {
            Ok(Some(Value::from(v)))
        } else {
            Err(RuleError::validation(ErrorData::None))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(self.name(), "The “%1” field does not match the desired format.", &[l]),
            None => f.tr(self.name(), "Does not match the desired format.", &[]),
        }
    }

    fn generic_data_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "The regular expression for the “%1” field is not valid.",
                &[l],
            ),
            None => f.tr(self.name(), "The regular expression is not valid.", &[]),
        }
    }
}

impl_rule_builders!(RegularExpression);
impl_default_key!(RegularExpression);
