use crate::format::Formatter;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

const TRUE_VALUES: &[&str] = &["1", "true", "on"];
const FALSE_VALUES: &[&str] = &["0", "false", "off"];

/// Parses a boolean the way HTML forms submit them: `1`/`true`/`on` and
/// `0`/`false`/`off`, case-insensitive.
fn parse_bool(value: &str) -> Option<bool> {
    if TRUE_VALUES.iter().any(|t| t.eq_ignore_ascii_case(value)) {
        Some(true)
    } else if FALSE_VALUES.iter().any(|f| f.eq_ignore_ascii_case(value)) {
        Some(false)
    } else {
        None
    }
}

/// The field must be a boolean and is returned as [`Value::Bool`].
///
/// ```
/// use request_validator::rules::Boolean;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Boolean::new("newsletter");
/// let params = ParameterSet::new().with("newsletter", "On");
/// let stash = Stash::new();
///
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::Bool(true)))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Boolean {
    base: RuleBase,
}

impl Boolean {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

impl Rule for Boolean {
    fn name(&self) -> &'static str {
        "Boolean"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        parse_bool(v)
            .map(|b| Some(Value::Bool(b)))
            .ok_or_else(|| RuleError::validation(ErrorData::None))
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "The data in the “%1” field can not be interpreted as a boolean.",
                &[l],
            ),
            None => f.tr(self.name(), "Can not be interpreted as a boolean.", &[]),
        }
    }
}

impl_rule_builders!(Boolean);
impl_default_key!(Boolean);
