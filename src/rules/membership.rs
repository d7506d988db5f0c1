use std::borrow::Cow;

use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// Source of the comparison list of [`In`] and [`NotIn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueList {
    /// A fixed list.
    Literal(Vec<String>),
    /// A list read from the stash at validation time. The stash value must be
    /// a [`Value::List`] or a JSON array of strings.
    Stash(String),
}

impl ValueList {
    /// Reads the comparison list from the stash under `key`.
    pub fn stash(key: impl Into<String>) -> Self {
        Self::Stash(key.into())
    }

    fn resolve<'s>(
        &'s self,
        rule: &'static str,
        field: &str,
        ctx: &ValidationContext<'_>,
    ) -> Result<Cow<'s, [String]>, RuleError> {
        let log = RuleLog::new(rule, field, ctx);
        let list = match self {
            Self::Literal(items) => Cow::Borrowed(items.as_slice()),
            Self::Stash(key) if key.is_empty() => {
                log.warn(format_args!("invalid validation data: empty stash key"));
                return Err(RuleError::data(ErrorData::None));
            }
            Self::Stash(key) => match ctx.stash().get(key).and_then(Value::as_string_list) {
                Some(items) => Cow::Owned(items),
                None => {
                    log.warn(format_args!(
                        "invalid validation data: stash key \"{}\" does not hold a list of strings",
                        key
                    ));
                    return Err(RuleError::data(ErrorData::None));
                }
            },
        };

        if list.is_empty() {
            log.warn(format_args!("invalid validation data: empty comparison list"));
            return Err(RuleError::data(ErrorData::None));
        }
        Ok(list)
    }
}

impl<S: Into<String>> FromIterator<S> for ValueList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::Literal(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for ValueList {
    fn from(items: [S; N]) -> Self {
        items.into_iter().collect()
    }
}

impl From<Vec<String>> for ValueList {
    fn from(items: Vec<String>) -> Self {
        Self::Literal(items)
    }
}

fn contains(list: &[String], value: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        list.iter().any(|item| item == value)
    } else {
        let value = value.to_lowercase();
        list.iter().any(|item| item.to_lowercase() == value)
    }
}

/// The field's value must be one of a list of values.
///
/// ```
/// use request_validator::rules::In;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
///
/// let rule = In::new("color", ["red", "blue"]).case_insensitive();
/// let params = ParameterSet::new().with("color", "RED");
/// let stash = Stash::new();
///
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct In {
    base: RuleBase,
    values: ValueList,
    case_sensitive: bool,
}

impl In {
    /// Requires `field` to be one of `values`. Comparison is case-sensitive
    /// unless [`In::case_insensitive`] is set.
    pub fn new(field: impl Into<String>, values: impl Into<ValueList>) -> Self {
        Self {
            base: RuleBase::new(field),
            values: values.into(),
            case_sensitive: true,
        }
    }

    /// Compares values ignoring case.
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }
}

impl Rule for In {
    fn name(&self) -> &'static str {
        "In"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let list = self.values.resolve(self.name(), self.field(), ctx)?;

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if contains(&list, v, self.case_sensitive) {
            Ok(Some(Value::from(v)))
        } else {
            Err(RuleError::validation(ErrorData::List(list.into_owned())))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let values = match data {
            ErrorData::List(items) => f.separated_list(items),
            _ => String::new(),
        };
        match label {
            Some(l) => f.tr(
                self.name(),
                "The value in the “%1” field has to be one of the following values: %2",
                &[l, &values],
            ),
            None => f.tr(
                self.name(),
                "Has to be one of the following values: %1",
                &[&values],
            ),
        }
    }
}

/// The field's value must not be one of a list of values.
#[derive(Debug, Clone)]
pub struct NotIn {
    base: RuleBase,
    values: ValueList,
    case_sensitive: bool,
}

impl NotIn {
    /// Forbids `values` for `field`. Comparison is case-sensitive unless
    /// [`NotIn::case_insensitive`] is set.
    pub fn new(field: impl Into<String>, values: impl Into<ValueList>) -> Self {
        Self {
            base: RuleBase::new(field),
            values: values.into(),
            case_sensitive: true,
        }
    }

    /// Compares values ignoring case.
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }
}

impl Rule for NotIn {
    fn name(&self) -> &'static str {
        "NotIn"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let list = self.values.resolve(self.name(), self.field(), ctx)?;

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if contains(&list, v, self.case_sensitive) {
            Err(RuleError::validation(ErrorData::List(list.into_owned())))
        } else {
            Ok(Some(Value::from(v)))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let values = match data {
            ErrorData::List(items) => f.separated_list(items),
            _ => String::new(),
        };
        match label {
            Some(l) => f.tr(
                self.name(),
                "The value in the “%1” field has to be not one of the following values: %2",
                &[l, &values],
            ),
            None => f.tr(
                self.name(),
                "Has to be not one of the following values: %1",
                &[&values],
            ),
        }
    }
}

impl_rule_builders!(In, NotIn);
impl_default_key!(In, NotIn);
