use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

fn check_other_field(
    rule: &'static str,
    base: &RuleBase,
    ctx: &ValidationContext<'_>,
    other: &str,
) -> Result<(), RuleError> {
    if other.is_empty() {
        RuleLog::new(rule, base.field(), ctx)
            .warn(format_args!("invalid validation data: empty other field name"));
        return Err(RuleError::data(ErrorData::None));
    }
    Ok(())
}

fn other_label(other: &str, other_label: Option<&str>, f: &Formatter<'_>) -> String {
    match other_label {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => f.field_label(other),
    }
}

/// The field must have the same value as another field.
///
/// Both values go through the whitespace policy before they are compared.
///
/// ```
/// use request_validator::rules::Same;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Same::new("a", "b");
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("a", "x").with("b", "x ");
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::from("x")))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Same {
    base: RuleBase,
    other_field: String,
    other_label: Option<String>,
}

impl Same {
    /// Requires `field` to equal `other_field`.
    pub fn new(field: impl Into<String>, other_field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            other_field: other_field.into(),
            other_label: None,
        }
    }

    /// Sets the label of the other field used in messages.
    pub fn other_label(mut self, label: impl Into<String>) -> Self {
        self.other_label = Some(label.into());
        self
    }
}

impl Rule for Same {
    fn name(&self) -> &'static str {
        "Same"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        check_other_field(self.name(), &self.base, ctx, &self.other_field)?;

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if ctx.value(&self.other_field).unwrap_or("") == v {
            Ok(Some(Value::from(v)))
        } else {
            Err(RuleError::validation(ErrorData::None))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let other = other_label(&self.other_field, self.other_label.as_deref(), f);
        match label {
            Some(l) => f.tr(
                self.name(),
                "The value in the “%1” field is not the same as in the “%2” field.",
                &[l, &other],
            ),
            None => f.tr(
                self.name(),
                "Must be the same as in the “%1” field.",
                &[&other],
            ),
        }
    }
}

/// The field must have a different value than another field.
///
/// An absent other field counts as empty, so any non-empty value differs
/// from it.
#[derive(Debug, Clone)]
pub struct Different {
    base: RuleBase,
    other_field: String,
    other_label: Option<String>,
}

impl Different {
    /// Requires `field` to differ from `other_field`.
    pub fn new(field: impl Into<String>, other_field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            other_field: other_field.into(),
            other_label: None,
        }
    }

    /// Sets the label of the other field used in messages.
    pub fn other_label(mut self, label: impl Into<String>) -> Self {
        self.other_label = Some(label.into());
        self
    }
}

impl Rule for Different {
    fn name(&self) -> &'static str {
        "Different"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        check_other_field(self.name(), &self.base, ctx, &self.other_field)?;

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if ctx.value(&self.other_field).unwrap_or("") == v {
            Err(RuleError::validation(ErrorData::None))
        } else {
            Ok(Some(Value::from(v)))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let other = other_label(&self.other_field, self.other_label.as_deref(), f);
        match label {
            Some(l) => f.tr(
                self.name(),
                "The value in the “%1” field can not be the same as in the “%2” field.",
                &[l, &other],
            ),
            None => f.tr(
                self.name(),
                "Can not be the same as in the “%1” field.",
                &[&other],
            ),
        }
    }
}

/// The field must equal the field named `<field>_confirmation`.
#[derive(Debug, Clone)]
pub struct Confirmed {
    base: RuleBase,
    confirmation: String,
}

impl Confirmed {
    /// Requires `field` to equal `<field>_confirmation`.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        let confirmation = format!("{}_confirmation", field);
        Self {
            base: RuleBase::new(field),
            confirmation,
        }
    }

    /// Returns the name of the confirmation field.
    pub fn confirmation_field(&self) -> &str {
        &self.confirmation
    }
}

impl Rule for Confirmed {
    fn name(&self) -> &'static str {
        "Confirmed"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if ctx.value(&self.confirmation) == Some(v) {
            Ok(Some(Value::from(v)))
        } else {
            Err(RuleError::validation(ErrorData::None))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(self.name(), "The content of the “%1” field has not been confirmed.", &[l]),
            None => f.tr(self.name(), "Has not been confirmed.", &[]),
        }
    }
}

impl_rule_builders!(Same, Different, Confirmed);
impl_default_key!(Same, Different, Confirmed);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DefaultCatalog;
    use crate::{ErrorKind, Locale, ParameterSet, Stash};
    use std::collections::HashMap;

    fn run(rule: &dyn Rule, params: &ParameterSet) -> RuleOutcome {
        let stash = Stash::new();
        rule.validate(&ValidationContext::new(params, &stash))
    }

    #[test]
    fn same() {
        let rule = Same::new("a", "b");
        assert_eq!(
            run(&rule, &ParameterSet::new().with("a", "x").with("b", "x")),
            Ok(Some(Value::from("x")))
        );
        assert!(run(&rule, &ParameterSet::new().with("a", "x").with("b", "y")).is_err());
        assert!(run(&rule, &ParameterSet::new().with("a", "x")).is_err());
        assert_eq!(run(&rule, &ParameterSet::new()), Ok(None));
    }

    #[test]
    fn same_respects_trimming_flag() {
        let rule = Same::new("a", "b");
        let params = ParameterSet::new().with("a", "x").with("b", " x");
        let stash = Stash::new();
        let ctx = ValidationContext::new(&params, &stash);

        assert!(rule.validate(&ctx).is_ok());
        assert!(rule.validate(&ctx.without_trimming()).is_err());
    }

    #[test]
    fn different() {
        let rule = Different::new("new_pw", "old_pw");
        assert!(run(&rule, &ParameterSet::new().with("new_pw", "a").with("old_pw", "a")).is_err());
        assert!(run(&rule, &ParameterSet::new().with("new_pw", "a").with("old_pw", "b")).is_ok());
        assert!(run(&rule, &ParameterSet::new().with("new_pw", "a")).is_ok());
    }

    #[test]
    fn confirmed() {
        let rule = Confirmed::new("password");
        assert_eq!(rule.confirmation_field(), "password_confirmation");

        let params = ParameterSet::new()
            .with("password", "secret")
            .with("password_confirmation", "secret");
        assert!(run(&rule, &params).is_ok());

        let params = ParameterSet::new().with("password", "secret");
        assert!(run(&rule, &params).is_err());
    }

    #[test]
    fn empty_other_field_is_data_error() {
        let rule = Same::new("a", "");
        let err = run(&rule, &ParameterSet::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationData);
    }

    #[test]
    fn message_uses_other_field_label() {
        let mut labels = HashMap::new();
        labels.insert("b".to_string(), "Repeat".to_string());
        let locale = Locale::c();
        let f = Formatter::new(&DefaultCatalog, &locale, &labels);

        let rule = Same::new("a", "b").label("Password");
        assert_eq!(
            rule.generic_error_message(Some("Password"), &ErrorData::None, &f),
            "The value in the “Password” field is not the same as in the “Repeat” field."
        );

        let rule = Same::new("a", "b").other_label("Again");
        assert_eq!(
            rule.generic_error_message(None, &ErrorData::None, &f),
            "Must be the same as in the “Again” field."
        );
    }
}
