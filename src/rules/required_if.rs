use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome};
use crate::rules::presence::required_message;
use crate::{ValidationContext, Value};

/// Evaluates a conditionally required field once the condition is known.
fn conditional(base: &RuleBase, ctx: &ValidationContext<'_>, required: bool) -> RuleOutcome {
    match base.value(ctx) {
        Some(v) => Ok(Some(Value::from(v))),
        None if required => Err(RuleError::validation(ErrorData::None)),
        None => Ok(None),
    }
}

fn other_field_message(
    context: &str,
    label: Option<&str>,
    other: &str,
    f: &Formatter<'_>,
) -> String {
    let other = f.field_label(other);
    match label {
        Some(l) => f.tr(
            context,
            "You must fill in the “%1” field, because the “%2” field contains a value that requires it.",
            &[l, &other],
        ),
        None => f.tr(
            context,
            "This is required, because the “%1” field contains a value that requires it.",
            &[&other],
        ),
    }
}

fn check_other(
    rule: &'static str,
    base: &RuleBase,
    ctx: &ValidationContext<'_>,
    other_field: &str,
    other_values: &[String],
) -> Result<(), RuleError> {
    if other_field.is_empty() || other_values.is_empty() {
        RuleLog::new(rule, base.field(), ctx).warn(format_args!(
            "invalid validation data: other field \"{}\", {} other values",
            other_field,
            other_values.len()
        ));
        return Err(RuleError::data(ErrorData::None));
    }
    Ok(())
}

/// The field is required if another field's value is in a list.
///
/// ```
/// use request_validator::rules::RequiredIf;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
///
/// let rule = RequiredIf::new("reason", "status", ["other"]);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("status", "other");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
///
/// let params = ParameterSet::new().with("status", "done");
/// assert_eq!(rule.validate(&ValidationContext::new(&params, &stash)), Ok(None));
/// ```
#[derive(Debug, Clone)]
pub struct RequiredIf {
    base: RuleBase,
    other_field: String,
    other_values: Vec<String>,
}

impl RequiredIf {
    /// Requires `field` when `other_field`'s value is one of `other_values`.
    pub fn new<I, S>(field: impl Into<String>, other_field: impl Into<String>, other_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RuleBase::new(field),
            other_field: other_field.into(),
            other_values: other_values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for RequiredIf {
    fn name(&self) -> &'static str {
        "RequiredIf"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        check_other(self.name(), &self.base, ctx, &self.other_field, &self.other_values)?;

        let required = ctx
            .value(&self.other_field)
            .is_some_and(|other| self.other_values.iter().any(|v| v == other));

        conditional(&self.base, ctx, required)
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        other_field_message(self.name(), label, &self.other_field, f)
    }
}

/// The field is required unless another field's value is in a list.
///
/// A missing other field is never in the list, so the field is required.
#[derive(Debug, Clone)]
pub struct RequiredUnless {
    base: RuleBase,
    other_field: String,
    other_values: Vec<String>,
}

impl RequiredUnless {
    /// Requires `field` unless `other_field`'s value is one of `other_values`.
    pub fn new<I, S>(field: impl Into<String>, other_field: impl Into<String>, other_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RuleBase::new(field),
            other_field: other_field.into(),
            other_values: other_values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for RequiredUnless {
    fn name(&self) -> &'static str {
        "RequiredUnless"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        check_other(self.name(), &self.base, ctx, &self.other_field, &self.other_values)?;

        let exempt = ctx
            .value(&self.other_field)
            .is_some_and(|other| self.other_values.iter().any(|v| v == other));

        conditional(&self.base, ctx, !exempt)
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let other = f.field_label(&self.other_field);
        match label {
            Some(l) => f.tr(
                self.name(),
                "You must fill in the “%1” field, because the “%2” field does not contain a value that makes it optional.",
                &[l, &other],
            ),
            None => f.tr(
                self.name(),
                "This is required, because the “%1” field does not contain a value that makes it optional.",
                &[&other],
            ),
        }
    }
}

/// Returns `true` if the stash value under `key` renders to one of `values`.
fn stash_matches(ctx: &ValidationContext<'_>, key: &str, values: &[String]) -> bool {
    ctx.stash().get(key).is_some_and(|stashed| {
        let stashed = stashed.to_string();
        values.iter().any(|v| *v == stashed)
    })
}

fn check_stash(
    rule: &'static str,
    base: &RuleBase,
    ctx: &ValidationContext<'_>,
    key: &str,
    values: &[String],
) -> Result<(), RuleError> {
    if key.is_empty() || values.is_empty() {
        RuleLog::new(rule, base.field(), ctx).warn(format_args!(
            "invalid validation data: stash key \"{}\", {} stash values",
            key,
            values.len()
        ));
        return Err(RuleError::data(ErrorData::None));
    }
    Ok(())
}

/// The field is required if a stash value is in a list.
///
/// Stash values are compared by their text rendering, so `Value::Integer(1)`
/// matches `"1"`.
#[derive(Debug, Clone)]
pub struct RequiredIfStash {
    base: RuleBase,
    stash_key: String,
    stash_values: Vec<String>,
}

impl RequiredIfStash {
    /// Requires `field` when the stash value under `stash_key` is one of `stash_values`.
    pub fn new<I, S>(field: impl Into<String>, stash_key: impl Into<String>, stash_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RuleBase::new(field),
            stash_key: stash_key.into(),
            stash_values: stash_values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for RequiredIfStash {
    fn name(&self) -> &'static str {
        "RequiredIfStash"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        check_stash(self.name(), &self.base, ctx, &self.stash_key, &self.stash_values)?;
        let required = stash_matches(ctx, &self.stash_key, &self.stash_values);
        conditional(&self.base, ctx, required)
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        required_message(self.name(), label, f)
    }
}

/// The field is required unless a stash value is in a list.
#[derive(Debug, Clone)]
pub struct RequiredUnlessStash {
    base: RuleBase,
    stash_key: String,
    stash_values: Vec<String>,
}

impl RequiredUnlessStash {
    /// Requires `field` unless the stash value under `stash_key` is one of `stash_values`.
    pub fn new<I, S>(field: impl Into<String>, stash_key: impl Into<String>, stash_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RuleBase::new(field),
            stash_key: stash_key.into(),
            stash_values: stash_values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Rule for RequiredUnlessStash {
    fn name(&self) -> &'static str {
        "RequiredUnlessStash"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        check_stash(self.name(), &self.base, ctx, &self.stash_key, &self.stash_values)?;
        let exempt = stash_matches(ctx, &self.stash_key, &self.stash_values);
        conditional(&self.base, ctx, !exempt)
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        required_message(self.name(), label, f)
    }
}

impl_rule_builders!(RequiredIf, RequiredUnless, RequiredIfStash, RequiredUnlessStash);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, ParameterSet, Stash};

    fn run(rule: &dyn Rule, params: &ParameterSet, stash: &Stash) -> RuleOutcome {
        rule.validate(&ValidationContext::new(params, stash))
    }

    #[test]
    fn required_if_triggers_on_trimmed_match() {
        let rule = RequiredIf::new("reason", "status", ["other", "failed"]);
        let stash = Stash::new();

        let params = ParameterSet::new().with("status", " failed ");
        assert!(run(&rule, &params, &stash).is_err());

        let params = ParameterSet::new()
            .with("status", "failed")
            .with("reason", "timeout");
        assert_eq!(run(&rule, &params, &stash), Ok(Some(Value::from("timeout"))));

        let params = ParameterSet::new().with("status", "ok");
        assert_eq!(run(&rule, &params, &stash), Ok(None));

        assert_eq!(run(&rule, &ParameterSet::new(), &stash), Ok(None));
    }

    #[test]
    fn required_unless() {
        let rule = RequiredUnless::new("phone", "contact", ["email"]);
        let stash = Stash::new();

        assert!(run(&rule, &ParameterSet::new(), &stash).is_err());
        let params = ParameterSet::new().with("contact", "email");
        assert_eq!(run(&rule, &params, &stash), Ok(None));
        let params = ParameterSet::new().with("contact", "phone");
        assert!(run(&rule, &params, &stash).is_err());
    }

    #[test]
    fn empty_configuration_is_data_error() {
        let stash = Stash::new();
        let params = ParameterSet::new();

        let no_values = RequiredIf::new("a", "b", Vec::<String>::new());
        assert_eq!(
            run(&no_values, &params, &stash).unwrap_err().kind(),
            ErrorKind::ValidationData
        );

        let no_field = RequiredUnless::new("a", "", ["x"]);
        assert_eq!(
            run(&no_field, &params, &stash).unwrap_err().kind(),
            ErrorKind::ValidationData
        );

        let no_key = RequiredIfStash::new("a", "", ["x"]);
        assert_eq!(
            run(&no_key, &params, &stash).unwrap_err().kind(),
            ErrorKind::ValidationData
        );
    }

    #[test]
    fn stash_driven() {
        let if_rule = RequiredIfStash::new("vat_id", "account_type", ["business"]);
        let unless_rule = RequiredUnlessStash::new("birthday", "age_checked", ["1"]);
        let params = ParameterSet::new();

        let stash = Stash::new()
            .with("account_type", "business")
            .with("age_checked", 1_i64);
        assert!(run(&if_rule, &params, &stash).is_err());
        assert_eq!(run(&unless_rule, &params, &stash), Ok(None));

        let stash = Stash::new();
        assert_eq!(run(&if_rule, &params, &stash), Ok(None));
        assert!(run(&unless_rule, &params, &stash).is_err());
    }
}
