use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{ErrorData, Rule, RuleBase, RuleError, RuleOutcome};
use crate::{ValidationContext, Value};

/// How the presence of the other fields makes this field required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    AnyPresent,
    AllPresent,
    AnyAbsent,
    AllAbsent,
}

impl Trigger {
    fn name(self) -> &'static str {
        match self {
            Self::AnyPresent => "RequiredWith",
            Self::AllPresent => "RequiredWithAll",
            Self::AnyAbsent => "RequiredWithout",
            Self::AllAbsent => "RequiredWithoutAll",
        }
    }

    fn is_required(self, ctx: &ValidationContext<'_>, others: &[String]) -> bool {
        let params = ctx.params();
        match self {
            Self::AnyPresent => others.iter().any(|o| params.contains(o)),
            Self::AllPresent => others.iter().all(|o| params.contains(o)),
            Self::AnyAbsent => others.iter().any(|o| !params.contains(o)),
            Self::AllAbsent => others.iter().all(|o| !params.contains(o)),
        }
    }
}

/// Shared implementation of the four presence-driven requiredness rules.
#[derive(Debug, Clone)]
struct WithOthers {
    base: RuleBase,
    others: Vec<String>,
    trigger: Trigger,
}

impl WithOthers {
    fn new<I, S>(field: impl Into<String>, others: I, trigger: Trigger) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base: RuleBase::new(field),
            others: others.into_iter().map(Into::into).collect(),
            trigger,
        }
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        if self.others.is_empty() {
            RuleLog::new(self.trigger.name(), self.base.field(), ctx)
                .warn(format_args!("invalid validation data: no other fields"));
            return Err(RuleError::data(ErrorData::None));
        }

        match self.base.value(ctx) {
            Some(v) => Ok(Some(Value::from(v))),
            None if self.trigger.is_required(ctx, &self.others) => {
                Err(RuleError::validation(ErrorData::None))
            }
            None => Ok(None),
        }
    }

    fn message(&self, label: Option<&str>, f: &Formatter<'_>) -> String {
        let context = self.trigger.name();
        match label {
            Some(l) => f.tr(context, "The “%1” field is required.", &[l]),
            None => f.tr(context, "This is required.", &[]),
        }
    }
}

macro_rules! with_others_rule {
    ($(#[$doc:meta])* $name:ident, $trigger:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: WithOthers,
        }

        impl $name {
            /// Creates the rule for `field` depending on `others`.
            pub fn new<I, S>(field: impl Into<String>, others: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                Self {
                    inner: WithOthers::new(field, others, $trigger),
                }
            }

            /// Sets the label and custom messages.
            pub fn with_messages(mut self, messages: $crate::Messages) -> Self {
                self.inner.base.set_messages(messages);
                self
            }

            /// Sets the label used in generated messages.
            pub fn label(mut self, label: impl Into<String>) -> Self {
                let messages = self.inner.base.messages().clone().label(label);
                self.inner.base.set_messages(messages);
                self
            }
        }

        impl Rule for $name {
            fn name(&self) -> &'static str {
                self.inner.trigger.name()
            }

            fn base(&self) -> &RuleBase {
                &self.inner.base
            }

            fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
                self.inner.validate(ctx)
            }

            fn generic_error_message(
                &self,
                label: Option<&str>,
                _: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                self.inner.message(label, f)
            }
        }
    };
}

with_others_rule!(
    /// The field is required if any of the other fields is present.
    RequiredWith,
    Trigger::AnyPresent
);

with_others_rule!(
    /// The field is required if all of the other fields are present.
    ///
    /// ```
    /// use request_validator::rules::RequiredWithAll;
    /// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
    ///
    /// let rule = RequiredWithAll::new("z", ["x", "y"]);
    /// let stash = Stash::new();
    ///
    /// let both = ParameterSet::new().with("x", "1").with("y", "2");
    /// assert!(rule.validate(&ValidationContext::new(&both, &stash)).is_err());
    ///
    /// let one = ParameterSet::new().with("x", "1");
    /// assert_eq!(rule.validate(&ValidationContext::new(&one, &stash)), Ok(None));
    /// ```
    RequiredWithAll,
    Trigger::AllPresent
);

with_others_rule!(
    /// The field is required if any of the other fields is absent.
    RequiredWithout,
    Trigger::AnyAbsent
);

with_others_rule!(
    /// The field is required if all of the other fields are absent.
    RequiredWithoutAll,
    Trigger::AllAbsent
);
