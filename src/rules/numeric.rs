use std::fmt;

use crate::format::Formatter;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// Parses a finite C-locale floating point number.
pub(crate) fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// The field must be a number like `1`, `-2.5` or `3.454e3`.
///
/// Parsing is locale independent: the decimal separator is always `.`.
/// The value is returned as [`Value::Float`].
#[derive(Debug, Clone)]
pub struct Numeric {
    base: RuleBase,
}

impl Numeric {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

impl Rule for Numeric {
    fn name(&self) -> &'static str {
        "Numeric"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        parse_float(v)
            .map(|f| Some(Value::Float(f)))
            .ok_or_else(|| RuleError::validation(ErrorData::None))
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "You have to enter a numeric value into the “%1” field, like 1, -2.5 or 3.454e3.",
                &[l],
            ),
            None => f.tr(self.name(), "Must be numeric, like 1, -2.5 or 3.454e3.", &[]),
        }
    }
}

/// Integer width accepted by [`Integer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IntegerWidth {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    #[default]
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
}

impl IntegerWidth {
    /// Returns `true` for the unsigned widths.
    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    fn signed_range(self) -> (i64, i64) {
        match self {
            Self::I8 => (i8::MIN.into(), i8::MAX.into()),
            Self::I16 => (i16::MIN.into(), i16::MAX.into()),
            Self::I32 => (i32::MIN.into(), i32::MAX.into()),
            _ => (i64::MIN, i64::MAX),
        }
    }

    fn unsigned_max(self) -> u64 {
        match self {
            Self::U8 => u8::MAX.into(),
            Self::U16 => u16::MAX.into(),
            Self::U32 => u32::MAX.into(),
            _ => u64::MAX,
        }
    }

    /// Returns the inclusive bounds as text, for messages.
    pub fn bounds(self) -> (String, String) {
        if self.is_unsigned() {
            ("0".to_string(), self.unsigned_max().to_string())
        } else {
            let (min, max) = self.signed_range();
            (min.to_string(), max.to_string())
        }
    }

    fn parse(self, value: &str) -> Option<Value> {
        if self.is_unsigned() {
            value
                .parse::<u64>()
                .ok()
                .filter(|u| *u <= self.unsigned_max())
                .map(Value::Unsigned)
        } else {
            let (min, max) = self.signed_range();
            value
                .parse::<i64>()
                .ok()
                .filter(|i| (min..=max).contains(i))
                .map(Value::Integer)
        }
    }
}

impl fmt::Display for IntegerWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        };
        f.write_str(name)
    }
}

/// The field must be an integer that fits the configured width.
///
/// Signed widths produce [`Value::Integer`], unsigned ones [`Value::Unsigned`].
///
/// ```
/// use request_validator::rules::{Integer, IntegerWidth};
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Integer::new("age").width(IntegerWidth::U8);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("age", "42");
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::Unsigned(42)))
/// );
///
/// let params = ParameterSet::new().with("age", "300");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Integer {
    base: RuleBase,
    width: IntegerWidth,
}

impl Integer {
    /// Accepts any `i64`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            width: IntegerWidth::default(),
        }
    }

    /// Restricts the accepted range to `width`.
    pub fn width(mut self, width: IntegerWidth) -> Self {
        self.width = width;
        self
    }
}

impl Rule for Integer {
    fn name(&self) -> &'static str {
        "Integer"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        match self.width.parse(v) {
            Some(value) => Ok(Some(value)),
            None => {
                let (min, max) = self.width.bounds();
                Err(RuleError::validation(ErrorData::Bounds {
                    min: Some(min),
                    max: Some(max),
                }))
            }
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let (min, max) = self.width.bounds();
        match label {
            Some(l) => f.tr(
                self.name(),
                "The value in the “%1” field must be an integer between %2 and %3.",
                &[l, &min, &max],
            ),
            None => f.tr(self.name(), "Must be an integer between %1 and %2.", &[&min, &max]),
        }
    }
}

impl_rule_builders!(Numeric, Integer);
impl_default_key!(Numeric, Integer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterSet, Stash};

    fn run(rule: &dyn Rule, value: &str) -> RuleOutcome {
        let params = ParameterSet::new().with("n", value);
        let stash = Stash::new();
        rule.validate(&ValidationContext::new(&params, &stash))
    }

    #[test]
    fn numeric_c_locale() {
        let rule = Numeric::new("n");
        assert_eq!(run(&rule, "-2.5"), Ok(Some(Value::Float(-2.5))));
        assert_eq!(run(&rule, "3.454e3"), Ok(Some(Value::Float(3454.0))));
        assert_eq!(run(&rule, "1"), Ok(Some(Value::Float(1.0))));
        assert!(run(&rule, "2,5").is_err());
        assert!(run(&rule, "abc").is_err());
        assert!(run(&rule, "inf").is_err());
        assert!(run(&rule, "NaN").is_err());
    }

    #[test]
    fn integer_widths() {
        let i8_rule = Integer::new("n").width(IntegerWidth::I8);
        assert_eq!(run(&i8_rule, "-128"), Ok(Some(Value::Integer(-128))));
        assert!(run(&i8_rule, "128").is_err());

        let u16_rule = Integer::new("n").width(IntegerWidth::U16);
        assert_eq!(run(&u16_rule, "65535"), Ok(Some(Value::Unsigned(65535))));
        assert!(run(&u16_rule, "-1").is_err());
        assert!(run(&u16_rule, "65536").is_err());

        let u64_rule = Integer::new("n").width(IntegerWidth::U64);
        assert_eq!(
            run(&u64_rule, "18446744073709551615"),
            Ok(Some(Value::Unsigned(u64::MAX)))
        );
    }

    #[test]
    fn integer_rejects_fractions() {
        let rule = Integer::new("n");
        assert!(run(&rule, "1.0").is_err());
        assert!(run(&rule, "1e3").is_err());
    }

    #[test]
    fn integer_error_carries_bounds() {
        let rule = Integer::new("n").width(IntegerWidth::I16);
        let err = run(&rule, "x").unwrap_err();
        assert_eq!(
            err.error_data(),
            &ErrorData::Bounds {
                min: Some("-32768".into()),
                max: Some("32767".into())
            }
        );
    }
}
