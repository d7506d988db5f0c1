use once_cell::sync::Lazy;
use regex::Regex;

use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// The field must not contain any of a set of forbidden characters.
///
/// The first offending character, in input order, is reported.
///
/// ```
/// use request_validator::rules::CharNotAllowed;
/// use request_validator::{ErrorData, ParameterSet, Rule, Stash, ValidationContext};
///
/// let rule = CharNotAllowed::new("name", "<>&");
/// let params = ParameterSet::new().with("name", "a&b<c");
/// let stash = Stash::new();
///
/// let err = rule.validate(&ValidationContext::new(&params, &stash)).unwrap_err();
/// assert_eq!(err.error_data(), &ErrorData::Char('&'));
/// ```
#[derive(Debug, Clone)]
pub struct CharNotAllowed {
    base: RuleBase,
    forbidden: String,
}

impl CharNotAllowed {
    /// Forbids every character of `forbidden` in `field`.
    pub fn new(field: impl Into<String>, forbidden: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            forbidden: forbidden.into(),
        }
    }
}

impl Rule for CharNotAllowed {
    fn name(&self) -> &'static str {
        "CharNotAllowed"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        if self.forbidden.is_empty() {
            RuleLog::new(self.name(), self.field(), ctx)
                .warn(format_args!("invalid validation data: empty set of forbidden characters"));
            return Err(RuleError::data(ErrorData::None));
        }

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        match v.chars().find(|c| self.forbidden.contains(*c)) {
            Some(c) => Err(RuleError::validation(ErrorData::Char(c))),
            None => Ok(Some(Value::from(v))),
        }
    }

    fn generic_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let found = match data {
            ErrorData::Char(c) => c.to_string(),
            _ => String::new(),
        };
        match label {
            Some(l) => f.tr(
                self.name(),
                "The text in the “%1” field contains the following character that is not allowed: “%2”. Forbidden characters are: %3",
                &[l, &found, &self.forbidden],
            ),
            None => f.tr(
                self.name(),
                "Contains the following character that is not allowed: “%1”. Forbidden characters are: %2",
                &[&found, &self.forbidden],
            ),
        }
    }

    fn generic_data_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "The list of characters not allowed for the “%1” field is empty.",
                &[l],
            ),
            None => f.tr(self.name(), "The list of characters not allowed is empty.", &[]),
        }
    }
}

static ALPHA: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[\p{L}\p{M}]+$").ok());
static ALPHA_ASCII: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").ok());
static ALPHA_DASH: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}_-]+$").ok());
static ALPHA_DASH_ASCII: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").ok());
static ALPHA_NUM: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}]+$").ok());
static ALPHA_NUM_ASCII: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").ok());

macro_rules! char_class_rule {
    (
        $(#[$doc:meta])*
        $name:ident, $unicode:ident, $ascii:ident,
        labeled: $with_label:literal,
        unlabeled: $without_label:literal
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            base: RuleBase,
            ascii_only: bool,
        }

        impl $name {
            /// Creates the rule for `field`, accepting any Unicode letters.
            pub fn new(field: impl Into<String>) -> Self {
                Self {
                    base: RuleBase::new(field),
                    ascii_only: false,
                }
            }

            /// Accepts only ASCII characters.
            pub fn ascii_only(mut self) -> Self {
                self.ascii_only = true;
                self
            }
        }

        impl Rule for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn base(&self) -> &RuleBase {
                &self.base
            }

            fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
                let Some(v) = self.base.value(ctx) else {
                    return self.base.default_value(ctx, self.name());
                };

                let re: &Option<Regex> = if self.ascii_only { &$ascii } else { &$unicode };
                let Some(re) = re.as_ref() else {
                    RuleLog::new(self.name(), self.field(), ctx)
                        .warn(format_args!("built-in character class failed to compile"));
                    return Err(RuleError::data(ErrorData::None));
                };
                if re.is_match(v) {
                    Ok(Some(Value::from(v)))
                } else {
                    Err(RuleError::validation(ErrorData::None))
                }
            }

            fn generic_error_message(
                &self,
                label: Option<&str>,
                _: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                match label {
                    Some(l) => f.tr(self.name(), $with_label, &[l]),
                    None => f.tr(self.name(), $without_label, &[]),
                }
            }
        }
    };
}

char_class_rule!(
    /// The field must consist entirely of letters (and combining marks).
    Alpha, ALPHA, ALPHA_ASCII,
    labeled: "The text in the “%1” field must only contain alphabetic characters.",
    unlabeled: "Must only contain alphabetic characters."
);

char_class_rule!(
    /// The field may contain letters, digits, dashes and underscores.
    ///
    /// ```
    /// use request_validator::rules::AlphaDash;
    /// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
    ///
    /// let rule = AlphaDash::new("slug").ascii_only();
    /// let stash = Stash::new();
    ///
    /// let params = ParameterSet::new().with("slug", "hello-world_2");
    /// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_ok());
    ///
    /// let params = ParameterSet::new().with("slug", "grüße");
    /// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
    /// ```
    AlphaDash, ALPHA_DASH, ALPHA_DASH_ASCII,
    labeled: "The “%1” field can only contain alpha-numeric characters, as well as dashes and underscores.",
    unlabeled: "Can only contain alpha-numeric characters, dashes and underscores."
);

char_class_rule!(
    /// The field must consist entirely of letters and digits.
    AlphaNum, ALPHA_NUM, ALPHA_NUM_ASCII,
    labeled: "The text in the “%1” field must only contain alpha-numeric characters.",
    unlabeled: "Must only contain alpha-numeric characters."
);

impl_rule_builders!(CharNotAllowed, Alpha, AlphaDash, AlphaNum);
impl_default_key!(CharNotAllowed, Alpha, AlphaDash, AlphaNum);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, ParameterSet, Stash};

    fn run(rule: &dyn Rule, value: &str) -> RuleOutcome {
        let params = ParameterSet::new().with("f", value);
        let stash = Stash::new();
        rule.validate(&ValidationContext::new(&params, &stash))
    }

    #[test]
    fn reports_first_offending_character() {
        let rule = CharNotAllowed::new("f", "#%");
        assert_eq!(
            run(&rule, "a%b#"),
            Err(RuleError::validation(ErrorData::Char('%')))
        );
        assert_eq!(run(&rule, "abc"), Ok(Some(Value::from("abc"))));
    }

    #[test]
    fn empty_forbidden_set_is_data_error() {
        let rule = CharNotAllowed::new("f", "");
        assert_eq!(run(&rule, "abc").unwrap_err().kind(), ErrorKind::ValidationData);
    }

    #[test]
    fn alpha_unicode_and_ascii() {
        assert!(run(&Alpha::new("f"), "Grüße").is_ok());
        assert!(run(&Alpha::new("f"), "abc1").is_err());
        assert!(run(&Alpha::new("f").ascii_only(), "Grüße").is_err());
        assert!(run(&Alpha::new("f").ascii_only(), "Gruesse").is_ok());
    }

    #[test]
    fn alpha_num() {
        assert!(run(&AlphaNum::new("f"), "abc123").is_ok());
        assert!(run(&AlphaNum::new("f"), "abc-123").is_err());
        assert!(run(&AlphaNum::new("f"), "日本語2").is_ok());
    }

    #[test]
    fn alpha_dash() {
        assert!(run(&AlphaDash::new("f"), "my_slug-1").is_ok());
        assert!(run(&AlphaDash::new("f"), "my slug").is_err());
    }
}
