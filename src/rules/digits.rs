use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// Returns `true` if `value` consists only of ASCII digits and, when `length`
/// is given, has exactly that many characters.
///
/// The empty string passes when no length is given.
///
/// ```
/// use request_validator::rules::is_digits;
///
/// assert!(is_digits("0123", None));
/// assert!(is_digits("0123", Some(4)));
/// assert!(!is_digits("0123", Some(3)));
/// assert!(!is_digits("12a", None));
/// assert!(is_digits("", None));
/// ```
pub fn is_digits(value: &str, length: Option<usize>) -> bool {
    value.bytes().all(|b| b.is_ascii_digit()) && length.map_or(true, |len| value.len() == len)
}

/// The field may only contain ASCII digits, optionally with an exact length.
///
/// Unlike [`Integer`](crate::rules::Integer) the value is kept as text, so
/// leading zeros survive.
#[derive(Debug, Clone)]
pub struct Digits {
    base: RuleBase,
    length: Option<usize>,
}

impl Digits {
    /// Accepts any number of digits.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            length: None,
        }
    }

    /// Requires exactly `length` digits. A length of zero disables the check.
    pub fn length(mut self, length: usize) -> Self {
        self.length = (length > 0).then_some(length);
        self
    }
}

impl Rule for Digits {
    fn name(&self) -> &'static str {
        "Digits"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if is_digits(v, self.length) {
            Ok(Some(Value::from(v)))
        } else {
            Err(RuleError::validation(ErrorData::None))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match (label, self.length) {
            (Some(l), Some(n)) => f.tr_n(
                self.name(),
                "The “%1” field must contain exactly %n digit.",
                "The “%1” field must contain exactly %n digits.",
                n as u64,
                &[l],
            ),
            (None, Some(n)) => f.tr_n(
                self.name(),
                "Must contain exactly %n digit.",
                "Must contain exactly %n digits.",
                n as u64,
                &[],
            ),
            (Some(l), None) => f.tr(self.name(), "The “%1” field must only contain digits.", &[l]),
            (None, None) => f.tr(self.name(), "Must only contain digits.", &[]),
        }
    }
}

/// The field may only contain ASCII digits and its length must lie in
/// `[min, max]`.
#[derive(Debug, Clone)]
pub struct DigitsBetween {
    base: RuleBase,
    min: usize,
    max: usize,
}

impl DigitsBetween {
    /// Requires between `min` and `max` digits, inclusive.
    pub fn new(field: impl Into<String>, min: usize, max: usize) -> Self {
        Self {
            base: RuleBase::new(field),
            min,
            max,
        }
    }
}

impl Rule for DigitsBetween {
    fn name(&self) -> &'static str {
        "DigitsBetween"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        if self.min > self.max {
            RuleLog::new(self.name(), self.field(), ctx).warn(format_args!(
                "invalid validation data: min {} is greater than max {}",
                self.min, self.max
            ));
            return Err(RuleError::data(ErrorData::None));
        }

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        if is_digits(v, None) && (self.min..=self.max).contains(&v.len()) {
            Ok(Some(Value::from(v)))
        } else {
            Err(RuleError::validation(ErrorData::Bounds {
                min: Some(self.min.to_string()),
                max: Some(self.max.to_string()),
            }))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let min = self.min.to_string();
        let max = self.max.to_string();
        match label {
            Some(l) => f.tr(
                self.name(),
                "The “%1” field must only contain digits with a length between %2 and %3.",
                &[l, &min, &max],
            ),
            None => f.tr(
                self.name(),
                "Must only contain digits with a length between %1 and %2.",
                &[&min, &max],
            ),
        }
    }

    fn generic_data_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let min = self.min.to_string();
        let max = self.max.to_string();
        match label {
            Some(l) => f.tr(
                self.name(),
                "The minimum length %1 for the “%3” field is greater than the maximum length %2.",
                &[&min, &max, l],
            ),
            None => f.tr(
                self.name(),
                "The minimum length %1 is greater than the maximum length %2.",
                &[&min, &max],
            ),
        }
    }
}

impl_rule_builders!(Digits, DigitsBetween);
impl_default_key!(Digits, DigitsBetween);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DefaultCatalog;
    use crate::{ErrorKind, Locale, ParameterSet, Stash};
    use std::collections::HashMap;

    fn run(rule: &dyn Rule, value: Option<&str>) -> RuleOutcome {
        let mut params = ParameterSet::new();
        if let Some(v) = value {
            params.insert("field", v);
        }
        let stash = Stash::new();
        rule.validate(&ValidationContext::new(&params, &stash))
    }

    #[test]
    fn exact_length() {
        let rule = Digits::new("field").length(3);
        assert!(run(&rule, Some("12")).is_err());
        assert_eq!(run(&rule, Some("123")), Ok(Some(Value::from("123"))));
        assert!(run(&rule, Some("12a")).is_err());
    }

    #[test]
    fn any_length_keeps_leading_zeros() {
        let rule = Digits::new("field");
        assert_eq!(run(&rule, Some("007")), Ok(Some(Value::from("007"))));
        assert!(run(&rule, Some("-7")).is_err());
        assert!(run(&rule, Some("٣")).is_err());
    }

    #[test]
    fn empty_follows_absence_policy() {
        assert_eq!(run(&Digits::new("field"), Some("")), Ok(None));
        assert_eq!(run(&Digits::new("field").length(3), Some("")), Ok(None));
        assert_eq!(run(&Digits::new("field"), None), Ok(None));
        assert!(!is_digits("", Some(3)));
    }

    #[test]
    fn between() {
        let rule = DigitsBetween::new("field", 2, 4);
        assert!(run(&rule, Some("1")).is_err());
        assert!(run(&rule, Some("12")).is_ok());
        assert!(run(&rule, Some("1234")).is_ok());
        assert!(run(&rule, Some("12345")).is_err());
        assert!(run(&rule, Some("1a")).is_err());
    }

    #[test]
    fn inverted_bounds_are_data_error() {
        let rule = DigitsBetween::new("field", 5, 2);
        let err = run(&rule, Some("123")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationData);
    }

    #[test]
    fn plural_message() {
        let labels = HashMap::new();
        let locale = Locale::c();
        let f = Formatter::new(&DefaultCatalog, &locale, &labels);

        let one = Digits::new("pin").length(1);
        assert_eq!(
            one.generic_error_message(Some("PIN"), &ErrorData::None, &f),
            "The “PIN” field must contain exactly 1 digit."
        );
        let four = Digits::new("pin").length(4);
        assert_eq!(
            four.generic_error_message(None, &ErrorData::None, &f),
            "Must contain exactly 4 digits."
        );
    }
}
