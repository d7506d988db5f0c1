use crate::format::Formatter;
use crate::rule::{impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome};
use crate::{ValidationContext, Value};

/// The field must be present and non-empty after trimming.
///
/// # Examples
///
/// ```
/// use request_validator::rules::Required;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Required::new("name");
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("name", " Ada ");
/// let ctx = ValidationContext::new(&params, &stash);
/// assert_eq!(rule.validate(&ctx), Ok(Some(Value::from("Ada"))));
///
/// let params = ParameterSet::new().with("name", "");
/// let ctx = ValidationContext::new(&params, &stash);
/// assert!(rule.validate(&ctx).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Required {
    base: RuleBase,
}

impl Required {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

impl Rule for Required {
    fn name(&self) -> &'static str {
        "Required"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        match self.base.value(ctx) {
            Some(v) => Ok(Some(Value::from(v))),
            None => Err(RuleError::validation(ErrorData::None)),
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        required_message(self.name(), label, f)
    }
}

/// The field may be absent, but when it is submitted it must not be empty.
#[derive(Debug, Clone)]
pub struct Filled {
    base: RuleBase,
}

impl Filled {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

impl Rule for Filled {
    fn name(&self) -> &'static str {
        "Filled"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        match ctx.value(self.field()) {
            None => Ok(None),
            Some("") => Err(RuleError::validation(ErrorData::None)),
            Some(v) => Ok(Some(Value::from(v))),
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "You must fill in the “%1” field if it is present.",
                &[l],
            ),
            None => f.tr(self.name(), "Must be filled if present.", &[]),
        }
    }
}

/// The field key must be submitted; its content may be empty.
#[derive(Debug, Clone)]
pub struct Present {
    base: RuleBase,
}

impl Present {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

impl Rule for Present {
    fn name(&self) -> &'static str {
        "Present"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        match ctx.value(self.field()) {
            Some(v) => Ok(Some(Value::from(v))),
            None => Err(RuleError::validation(ErrorData::None)),
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(self.name(), "The “%1” field was not found in the input data.", &[l]),
            None => f.tr(self.name(), "Has not been found in the input data.", &[]),
        }
    }
}

/// The field must be one of `yes`, `on`, `1` or `true` (case-insensitive).
///
/// Useful for terms-of-service checkboxes. An absent field is an error.
#[derive(Debug, Clone)]
pub struct Accepted {
    base: RuleBase,
}

impl Accepted {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

const ACCEPTED: &[&str] = &["yes", "on", "1", "true"];

impl Rule for Accepted {
    fn name(&self) -> &'static str {
        "Accepted"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let accepted = self
            .base
            .value(ctx)
            .is_some_and(|v| ACCEPTED.iter().any(|a| a.eq_ignore_ascii_case(v)));

        if accepted {
            Ok(Some(Value::Bool(true)))
        } else {
            Err(RuleError::validation(ErrorData::None))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(self.name(), "The “%1” has to be accepted.", &[l]),
            None => f.tr(self.name(), "Has to be accepted.", &[]),
        }
    }
}

impl_rule_builders!(Required, Filled, Present, Accepted);

/// Message shared by every rule that makes a field required.
pub(crate) fn required_message(context: &str, label: Option<&str>, f: &Formatter<'_>) -> String {
    match label {
        Some(l) => f.tr(context, "You must fill in the “%1” field.", &[l]),
        None => f.tr(context, "This is required.", &[]),
    }
}
