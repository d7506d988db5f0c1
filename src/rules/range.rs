//! Size comparisons: [`Min`], [`Max`], [`Between`] and [`Size`].
//!
//! Each rule compares a [`Subject`] derived from the input against one or two
//! [`Threshold`]s. Thresholds are literals or are read from the stash at
//! validation time, so a limit can depend on the current user or tenant.

use std::cmp::Ordering;

use crate::format::{format_number, Formatter};
use crate::logging::RuleLog;
use crate::rule::{unusable_data_message, ErrorData, Rule, RuleBase, RuleError, RuleOutcome};
use crate::rules::numeric::parse_float;
use crate::{ValidationContext, Value};

/// What is compared against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// The input parsed as `i64`.
    Signed,
    /// The input parsed as `u64`.
    Unsigned,
    /// The input parsed as a C-locale float.
    Float,
    /// The number of characters of the input.
    Length,
}

impl Subject {
    /// Measures `value`, returning the compared quantity and the typed value
    /// the rule produces on success.
    fn measure(self, value: &str) -> Option<(Number, Value)> {
        match self {
            Self::Signed => value
                .parse::<i64>()
                .ok()
                .map(|i| (Number::Exact(i.into()), Value::Integer(i))),
            Self::Unsigned => value
                .parse::<u64>()
                .ok()
                .map(|u| (Number::Exact(u.into()), Value::Unsigned(u))),
            Self::Float => parse_float(value).map(|f| (Number::Float(f), Value::Float(f))),
            Self::Length => Some((
                Number::Exact(value.chars().count() as i128),
                Value::from(value),
            )),
        }
    }
}

/// A measured input or a resolved threshold.
///
/// Integers stay exact so that `i64` and `u64` limits compare correctly
/// beyond the 53 bits a float can represent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Exact(i128),
    Float(f64),
}

impl Number {
    pub(crate) fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => Some(a.cmp(&b)),
            (Self::Exact(a), Self::Float(b)) => compare_exact(a, b),
            (Self::Float(a), Self::Exact(b)) => compare_exact(b, a).map(Ordering::reverse),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(&b),
        }
    }

    pub(crate) fn at_least(self, min: Number) -> bool {
        matches!(self.compare(min), Some(Ordering::Greater | Ordering::Equal))
    }

    pub(crate) fn at_most(self, max: Number) -> bool {
        matches!(self.compare(max), Some(Ordering::Less | Ordering::Equal))
    }

    pub(crate) fn display(self) -> String {
        match self {
            Self::Exact(i) => i.to_string(),
            Self::Float(f) => format_number(f),
        }
    }

    fn from_stash(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(Self::Exact((*i).into())),
            Value::Unsigned(u) => Some(Self::Exact((*u).into())),
            Value::Float(f) if f.is_finite() => Some(Self::Float(*f)),
            Value::Text(s) => {
                let s = s.trim();
                s.parse::<i128>()
                    .ok()
                    .map(Self::Exact)
                    .or_else(|| parse_float(s).map(Self::Float))
            }
            _ => None,
        }
    }
}

/// Orders an exact integer against a float without rounding the integer.
fn compare_exact(a: i128, b: f64) -> Option<Ordering> {
    if !b.is_finite() {
        return None;
    }
    let floor = b.floor();
    if floor >= i128::MAX as f64 {
        return Some(Ordering::Less);
    }
    if floor < i128::MIN as f64 {
        return Some(Ordering::Greater);
    }
    match a.cmp(&(floor as i128)) {
        Ordering::Equal if b > floor => Some(Ordering::Less),
        ord => Some(ord),
    }
}

/// A comparison limit.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    /// A fixed signed limit.
    Integer(i64),
    /// A fixed unsigned limit.
    Unsigned(u64),
    /// A fixed floating point limit.
    Float(f64),
    /// A limit read from the stash. Any numeric value, or text that parses as
    /// a number, is accepted.
    Stash(String),
}

impl Threshold {
    /// Reads the limit from the stash under `key`.
    pub fn stash(key: impl Into<String>) -> Self {
        Self::Stash(key.into())
    }

    pub(crate) fn resolve(&self, log: &RuleLog<'_>, ctx: &ValidationContext<'_>) -> Result<Number, RuleError> {
        match self {
            Self::Integer(i) => Ok(Number::Exact((*i).into())),
            Self::Unsigned(u) => Ok(Number::Exact((*u).into())),
            Self::Float(f) if f.is_finite() => Ok(Number::Float(*f)),
            Self::Float(f) => {
                log.warn(format_args!("invalid validation data: threshold {}", f));
                Err(RuleError::data(ErrorData::None))
            }
            Self::Stash(key) => ctx
                .stash()
                .get(key)
                .and_then(Number::from_stash)
                .ok_or_else(|| {
                    log.warn(format_args!(
                        "invalid validation data: stash key \"{}\" does not hold a number",
                        key
                    ));
                    RuleError::data(ErrorData::None)
                }),
        }
    }
}

macro_rules! threshold_from {
    ($variant:ident: $($t:ty),+) => {
        $(
            impl From<$t> for Threshold {
                fn from(v: $t) -> Self {
                    Self::$variant(v.into())
                }
            }
        )+
    };
}

threshold_from!(Integer: i64, i32, i16, i8);
threshold_from!(Unsigned: u64, u32, u16, u8);
threshold_from!(Float: f64, f32);

impl From<usize> for Threshold {
    fn from(v: usize) -> Self {
        Self::Unsigned(v as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
    Between,
    Size,
}

/// Shared evaluation of the four range rules.
#[derive(Debug, Clone)]
struct Range {
    base: RuleBase,
    subject: Subject,
    bound: Bound,
    min: Option<Threshold>,
    max: Option<Threshold>,
}

impl Range {
    fn validate(&self, name: &'static str, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let log = RuleLog::new(name, self.base.field(), ctx);
        let min = self.min.as_ref().map(|t| t.resolve(&log, ctx)).transpose()?;
        let max = self.max.as_ref().map(|t| t.resolve(&log, ctx)).transpose()?;

        let bounds = ErrorData::Bounds {
            min: min.map(Number::display),
            max: max.map(Number::display),
        };

        if let (Some(lo), Some(hi)) = (min, max) {
            if lo.compare(hi) == Some(Ordering::Greater) {
                log.warn(format_args!(
                    "invalid validation data: minimum {} is greater than maximum {}",
                    lo.display(),
                    hi.display()
                ));
                return Err(RuleError::data(bounds));
            }
        }

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, name);
        };

        let Some((measured, value)) = self.subject.measure(v) else {
            log.debug(format_args!("can not parse \"{}\" as {:?}", v, self.subject));
            return Err(RuleError::parsing(bounds));
        };

        let ok = match self.bound {
            Bound::Size => {
                min.map_or(true, |size| measured.compare(size) == Some(Ordering::Equal))
            }
            _ => {
                min.map_or(true, |min| measured.at_least(min))
                    && max.map_or(true, |max| measured.at_most(max))
            }
        };

        if ok {
            Ok(Some(value))
        } else {
            Err(RuleError::validation(bounds))
        }
    }

    fn message(&self, name: &str, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let (min, max) = match data {
            ErrorData::Bounds { min, max } => (
                min.clone().unwrap_or_default(),
                max.clone().unwrap_or_default(),
            ),
            _ => (String::new(), String::new()),
        };
        let count = |s: &str| s.parse::<f64>().map_or(0, |n| n.max(0.0) as u64);

        match (self.bound, self.subject == Subject::Length, label) {
            (Bound::Min, false, Some(l)) => f.tr(
                name,
                "The value in the “%1” field has to be greater than or equal to %2.",
                &[l, &min],
            ),
            (Bound::Min, false, None) => {
                f.tr(name, "Has to be greater than or equal to %1.", &[&min])
            }
            (Bound::Min, true, Some(l)) => f.tr_n(
                name,
                "The text in the “%1” field has to be at least %n character long.",
                "The text in the “%1” field has to be at least %n characters long.",
                count(&min),
                &[l],
            ),
            (Bound::Min, true, None) => f.tr_n(
                name,
                "Has to be at least %n character long.",
                "Has to be at least %n characters long.",
                count(&min),
                &[],
            ),
            (Bound::Max, false, Some(l)) => f.tr(
                name,
                "The value in the “%1” field has to be less than or equal to %2.",
                &[l, &max],
            ),
            (Bound::Max, false, None) => f.tr(name, "Has to be less than or equal to %1.", &[&max]),
            (Bound::Max, true, Some(l)) => f.tr_n(
                name,
                "The text in the “%1” field has to be at most %n character long.",
                "The text in the “%1” field has to be at most %n characters long.",
                count(&max),
                &[l],
            ),
            (Bound::Max, true, None) => f.tr_n(
                name,
                "Has to be at most %n character long.",
                "Has to be at most %n characters long.",
                count(&max),
                &[],
            ),
            (Bound::Between, false, Some(l)) => f.tr(
                name,
                "The value of the “%1” field has to be between %2 and %3.",
                &[l, &min, &max],
            ),
            (Bound::Between, false, None) => {
                f.tr(name, "Value has to be between %1 and %2.", &[&min, &max])
            }
            (Bound::Between, true, Some(l)) => f.tr(
                name,
                "The length of the “%1” field has to be between %2 and %3.",
                &[l, &min, &max],
            ),
            (Bound::Between, true, None) => {
                f.tr(name, "Length has to be between %1 and %2.", &[&min, &max])
            }
            (Bound::Size, false, Some(l)) => f.tr(
                name,
                "The value of the “%1” field has to be equal to %2.",
                &[l, &min],
            ),
            (Bound::Size, false, None) => f.tr(name, "Has to be equal to %1.", &[&min]),
            (Bound::Size, true, Some(l)) => f.tr_n(
                name,
                "The text in the “%1” field has to be exactly %n character long.",
                "The text in the “%1” field has to be exactly %n characters long.",
                count(&min),
                &[l],
            ),
            (Bound::Size, true, None) => f.tr_n(
                name,
                "Has to be exactly %n character long.",
                "Has to be exactly %n characters long.",
                count(&min),
                &[],
            ),
        }
    }

    fn data_message(&self, name: &str, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let ErrorData::Bounds {
            min: Some(min),
            max: Some(max),
        } = data
        else {
            return unusable_data_message(label, f);
        };
        match label {
            Some(l) => f.tr(
                name,
                "The minimum %1 for the “%3” field is greater than the maximum %2.",
                &[min, max, l],
            ),
            None => f.tr(name, "The minimum %1 is greater than the maximum %2.", &[min, max]),
        }
    }

    fn parsing_message(&self, name: &str, label: Option<&str>, f: &Formatter<'_>) -> String {
        let kind = match self.subject {
            Subject::Signed => f.tr(name, "integer", &[]),
            Subject::Unsigned => f.tr(name, "unsigned integer", &[]),
            Subject::Float | Subject::Length => f.tr(name, "number", &[]),
        };
        match label {
            Some(l) => f.tr(
                name,
                "Failed to parse the value of the “%1” field into a %2.",
                &[l, &kind],
            ),
            None => f.tr(name, "Failed to parse into a %1.", &[&kind]),
        }
    }
}

macro_rules! range_rule {
    ($name:ident, $label:literal) => {
        impl Rule for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn base(&self) -> &RuleBase {
                &self.range.base
            }

            fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
                self.range.validate(self.name(), ctx)
            }

            fn generic_error_message(
                &self,
                label: Option<&str>,
                data: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                self.range.message(self.name(), label, data, f)
            }

            fn generic_parsing_error_message(
                &self,
                label: Option<&str>,
                _: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                self.range.parsing_message(self.name(), label, f)
            }

            fn generic_data_error_message(
                &self,
                label: Option<&str>,
                data: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                self.range.data_message(self.name(), label, data, f)
            }
        }

        impl $name {
            /// Sets the label and custom messages.
            pub fn with_messages(mut self, messages: $crate::Messages) -> Self {
                self.range.base.set_messages(messages);
                self
            }

            /// Sets the label used in generated messages.
            pub fn label(mut self, label: impl Into<String>) -> Self {
                let messages = self.range.base.messages().clone().label(label);
                self.range.base.set_messages(messages);
                self
            }

            /// Sets the stash key whose value is used when the field is
            /// absent or empty.
            pub fn default_key(mut self, key: impl Into<String>) -> Self {
                self.range.base.set_default_key(key);
                self
            }
        }
    };
}

/// The input must be at least `min`.
///
/// ```
/// use request_validator::rules::{Min, Subject};
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Min::new("username", Subject::Length, 3);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("username", "ab");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
///
/// let params = ParameterSet::new().with("username", "abc");
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::from("abc")))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Min {
    range: Range,
}

impl Min {
    /// Requires `field`, measured as `subject`, to be at least `min`.
    pub fn new(field: impl Into<String>, subject: Subject, min: impl Into<Threshold>) -> Self {
        Self {
            range: Range {
                base: RuleBase::new(field),
                subject,
                bound: Bound::Min,
                min: Some(min.into()),
                max: None,
            },
        }
    }
}

/// The input must be at most `max`.
#[derive(Debug, Clone)]
pub struct Max {
    range: Range,
}

impl Max {
    /// Requires `field`, measured as `subject`, to be at most `max`.
    pub fn new(field: impl Into<String>, subject: Subject, max: impl Into<Threshold>) -> Self {
        Self {
            range: Range {
                base: RuleBase::new(field),
                subject,
                bound: Bound::Max,
                min: None,
                max: Some(max.into()),
            },
        }
    }
}

/// The input must lie in `[min, max]`.
#[derive(Debug, Clone)]
pub struct Between {
    range: Range,
}

impl Between {
    /// Requires `field`, measured as `subject`, to lie in `[min, max]`.
    pub fn new(
        field: impl Into<String>,
        subject: Subject,
        min: impl Into<Threshold>,
        max: impl Into<Threshold>,
    ) -> Self {
        Self {
            range: Range {
                base: RuleBase::new(field),
                subject,
                bound: Bound::Between,
                min: Some(min.into()),
                max: Some(max.into()),
            },
        }
    }
}

/// The input must be exactly `size`.
#[derive(Debug, Clone)]
pub struct Size {
    range: Range,
}

impl Size {
    /// Requires `field`, measured as `subject`, to equal `size`.
    pub fn new(field: impl Into<String>, subject: Subject, size: impl Into<Threshold>) -> Self {
        Self {
            range: Range {
                base: RuleBase::new(field),
                subject,
                bound: Bound::Size,
                min: Some(size.into()),
                max: None,
            },
        }
    }
}

range_rule!(Min, "Min");
range_rule!(Max, "Max");
range_rule!(Between, "Between");
range_rule!(Size, "Size");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DefaultCatalog;
    use crate::{ErrorKind, Locale, ParameterSet, Stash};
    use std::collections::HashMap;

    fn run(rule: &dyn Rule, value: &str, stash: &Stash) -> RuleOutcome {
        let params = ParameterSet::new().with("f", value);
        rule.validate(&ValidationContext::new(&params, stash))
    }

    #[test]
    fn min_numeric() {
        let stash = Stash::new();
        let rule = Min::new("f", Subject::Signed, 10);
        assert_eq!(run(&rule, "10", &stash), Ok(Some(Value::Integer(10))));
        assert!(run(&rule, "9", &stash).is_err());
        assert_eq!(
            run(&rule, "ten", &stash).unwrap_err().kind(),
            ErrorKind::Parsing
        );
    }

    #[test]
    fn max_float_and_unsigned() {
        let stash = Stash::new();
        let rule = Max::new("f", Subject::Float, 2.5);
        assert_eq!(run(&rule, "2.5", &stash), Ok(Some(Value::Float(2.5))));
        assert!(run(&rule, "2.51", &stash).is_err());

        let rule = Max::new("f", Subject::Unsigned, 5_u64);
        assert_eq!(run(&rule, "5", &stash), Ok(Some(Value::Unsigned(5))));
        assert_eq!(run(&rule, "-1", &stash).unwrap_err().kind(), ErrorKind::Parsing);
    }

    #[test]
    fn between_length_counts_characters() {
        let stash = Stash::new();
        let rule = Between::new("f", Subject::Length, 2, 4);
        assert!(run(&rule, "a", &stash).is_err());
        assert!(run(&rule, "äöü", &stash).is_ok());
        assert!(run(&rule, "abcde", &stash).is_err());
    }

    #[test]
    fn size() {
        let stash = Stash::new();
        let rule = Size::new("f", Subject::Length, 5);
        assert!(run(&rule, "12345", &stash).is_ok());
        assert!(run(&rule, "1234", &stash).is_err());

        let rule = Size::new("f", Subject::Signed, 7);
        assert!(run(&rule, "7", &stash).is_ok());
        assert!(run(&rule, "8", &stash).is_err());
    }

    #[test]
    fn thresholds_from_stash() {
        let rule = Max::new("f", Subject::Signed, Threshold::stash("limit"));

        let stash = Stash::new().with("limit", 3_i64);
        assert!(run(&rule, "3", &stash).is_ok());
        assert!(run(&rule, "4", &stash).is_err());

        let stash = Stash::new().with("limit", "3");
        assert!(run(&rule, "3", &stash).is_ok());

        let stash = Stash::new();
        assert_eq!(
            run(&rule, "3", &stash).unwrap_err().kind(),
            ErrorKind::ValidationData
        );

        let stash = Stash::new().with("limit", true);
        assert_eq!(
            run(&rule, "3", &stash).unwrap_err().kind(),
            ErrorKind::ValidationData
        );
    }

    #[test]
    fn signed_limits_compare_exactly() {
        let stash = Stash::new();
        let rule = Max::new("f", Subject::Signed, 9_007_199_254_740_992_i64);
        assert!(run(&rule, "9007199254740992", &stash).is_ok());
        assert_eq!(
            run(&rule, "9007199254740993", &stash).unwrap_err().kind(),
            ErrorKind::Validation
        );

        let rule = Min::new("f", Subject::Signed, i64::MAX);
        assert_eq!(run(&rule, &i64::MAX.to_string(), &stash), Ok(Some(Value::Integer(i64::MAX))));
        assert!(run(&rule, &(i64::MAX - 1).to_string(), &stash).is_err());
    }

    #[test]
    fn unsigned_limits_compare_exactly() {
        let stash = Stash::new();
        let rule = Size::new("f", Subject::Unsigned, u64::MAX);
        assert_eq!(
            run(&rule, &u64::MAX.to_string(), &stash),
            Ok(Some(Value::Unsigned(u64::MAX)))
        );
        assert!(run(&rule, "18446744073709551000", &stash).is_err());

        let rule = Between::new("f", Subject::Unsigned, u64::MAX - 1, u64::MAX);
        assert!(run(&rule, "18446744073709551614", &stash).is_ok());
        assert!(run(&rule, "18446744073709551613", &stash).is_err());

        let stash = Stash::new().with("limit", u64::MAX - 1);
        let rule = Max::new("f", Subject::Unsigned, Threshold::stash("limit"));
        assert!(run(&rule, &u64::MAX.to_string(), &stash).is_err());
    }

    #[test]
    fn integers_against_fractional_limits() {
        let stash = Stash::new();
        let rule = Between::new("f", Subject::Signed, -0.5, 2.5);
        assert!(run(&rule, "-1", &stash).is_err());
        assert!(run(&rule, "0", &stash).is_ok());
        assert!(run(&rule, "2", &stash).is_ok());
        assert!(run(&rule, "3", &stash).is_err());
    }

    #[test]
    fn inverted_bounds_are_data_errors() {
        let labels = HashMap::new();
        let locale = Locale::c();
        let f = Formatter::new(&DefaultCatalog, &locale, &labels);
        let stash = Stash::new();

        let rule = Between::new("f", Subject::Signed, 10, 1);
        for input in ["5", "10", "abc"] {
            let err = run(&rule, input, &stash).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationData);
        }
        let err = run(&rule, "5", &stash).unwrap_err();
        assert_eq!(f.render(&rule, &err), "The minimum 10 is greater than the maximum 1.");

        let params = ParameterSet::new();
        assert_eq!(
            rule.validate(&ValidationContext::new(&params, &stash)).unwrap_err().kind(),
            ErrorKind::ValidationData
        );

        let rule = Between::new("f", Subject::Length, 3, 3);
        assert!(run(&rule, "abc", &stash).is_ok());
    }

    #[test]
    fn messages_use_resolved_bounds() {
        let labels = HashMap::new();
        let locale = Locale::c();
        let f = Formatter::new(&DefaultCatalog, &locale, &labels);
        let stash = Stash::new().with("limit", 8_i64);

        let rule = Min::new("f", Subject::Length, Threshold::stash("limit")).label("Password");
        let err = run(&rule, "short", &stash).unwrap_err();
        assert_eq!(
            f.render(&rule, &err),
            "The text in the “Password” field has to be at least 8 characters long."
        );

        let rule = Between::new("f", Subject::Float, 0.5, 1.5);
        let err = run(&rule, "2", &stash).unwrap_err();
        assert_eq!(f.render(&rule, &err), "Value has to be between 0.5 and 1.5.");
    }
}
