use std::cmp::Ordering;

use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, unusable_data_message, ErrorData, Rule, RuleBase,
    RuleError, RuleOutcome,
};
use crate::rules::range::{Number, Threshold};
use crate::{ValidationContext, Value};

/// Which unit prefixes a [`FileSize`] accepts and how they are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSizeUnits {
    /// Decimal (`kB`) and binary (`KiB`) prefixes. Prefixes without `i` are
    /// decimal.
    #[default]
    Any,
    /// Only binary prefixes such as `KiB` or `Mi`.
    BinaryOnly,
    /// Only decimal prefixes such as `kB` or `M`.
    DecimalOnly,
    /// Any prefix, always read as a power of 1024.
    ForceBinary,
    /// Any prefix, always read as a power of 1000.
    ForceDecimal,
}

const PREFIXES: [char; 8] = ['K', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y'];

/// Splits the input into its number and unit parts. Either part may come
/// first, but neither may be interrupted by the other.
fn split(input: &str, decimal_point: char) -> Option<(String, Vec<char>)> {
    let mut number = String::new();
    let mut symbols = Vec::new();
    let mut last_was_digit = None;
    let mut switches = 0;

    for c in input.chars().filter(|c| !matches!(c, ' ' | '\t')) {
        let is_digit = c.is_ascii_digit() || c == decimal_point;
        if last_was_digit.is_some_and(|prev| prev != is_digit) {
            switches += 1;
            if switches > 1 {
                return None;
            }
        }
        last_was_digit = Some(is_digit);

        if is_digit {
            number.push(if c == decimal_point { '.' } else { c });
        } else {
            symbols.push(c.to_ascii_uppercase());
        }
    }
    Some((number, symbols))
}

/// Reads `[prefix][i][B]` and returns the prefix exponent and whether `i`
/// was given.
fn unit(symbols: &[char]) -> Option<(i32, bool)> {
    let mut rest = symbols;
    let mut exponent = 0;
    let mut binary = false;

    if let Some((first, tail)) = rest.split_first() {
        if let Some(pos) = PREFIXES.iter().position(|p| p == first) {
            exponent = pos as i32 + 1;
            rest = tail;
            if let Some(('I', tail)) = rest.split_first() {
                binary = true;
                rest = tail;
            }
        }
    }
    if let Some(('B', tail)) = rest.split_first() {
        rest = tail;
    }
    rest.is_empty().then_some((exponent, binary))
}

/// Parses a size string such as `1.5 GiB` or `200kB` into bytes.
pub(crate) fn parse_file_size(input: &str, decimal_point: char, units: FileSizeUnits) -> Option<f64> {
    let (number, symbols) = split(input, decimal_point)?;
    if !number.bytes().any(|b| b.is_ascii_digit()) || number.matches('.').count() > 1 {
        return None;
    }
    let value: f64 = number.parse().ok()?;
    let (exponent, has_i) = unit(&symbols)?;

    let binary = match units {
        FileSizeUnits::Any => has_i,
        FileSizeUnits::BinaryOnly if exponent > 0 && !has_i => return None,
        FileSizeUnits::BinaryOnly => true,
        FileSizeUnits::DecimalOnly if has_i => return None,
        FileSizeUnits::DecimalOnly | FileSizeUnits::ForceDecimal => false,
        FileSizeUnits::ForceBinary => true,
    };
    let base: f64 = if binary { 1024.0 } else { 1000.0 };
    Some(value * base.powi(exponent))
}

/// The field must be a file size such as `512`, `20 kB` or `1.5GiB`,
/// optionally within limits given in bytes.
///
/// The decimal separator follows the request locale. On success the size in
/// bytes is returned, rounded to an unsigned integer when it fits.
///
/// ```
/// use request_validator::rules::FileSize;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = FileSize::new("quota").max(1_000_000_000_u64);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("quota", "1.5 MiB");
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::Unsigned(1_572_864)))
/// );
///
/// let params = ParameterSet::new().with("quota", "2 GB");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FileSize {
    base: RuleBase,
    units: FileSizeUnits,
    min: Option<Threshold>,
    max: Option<Threshold>,
}

impl FileSize {
    /// Creates the rule for `field` without limits.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            units: FileSizeUnits::Any,
            min: None,
            max: None,
        }
    }

    /// Restricts or reinterprets the accepted unit prefixes.
    pub fn units(mut self, units: FileSizeUnits) -> Self {
        self.units = units;
        self
    }

    /// Sets the smallest accepted size in bytes.
    pub fn min(mut self, min: impl Into<Threshold>) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Sets the largest accepted size in bytes.
    pub fn max(mut self, max: impl Into<Threshold>) -> Self {
        self.max = Some(max.into());
        self
    }
}

impl Rule for FileSize {
    fn name(&self) -> &'static str {
        "FileSize"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let log = RuleLog::new(self.name(), self.base.field(), ctx);
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
            return self.base.default_value(ctx, self.name());
        };

        let Some(size) = parse_file_size(v, ctx.locale().decimal_point(), self.units) else {
            log.debug(format_args!("\"{}\" is not a file size", v));
            return Err(RuleError::validation(bounds));
        };

        let measured = Number::Float(size);
        let within = min.map_or(true, |min| measured.at_least(min))
            && max.map_or(true, |max| measured.at_most(max));
        if !within {
            return Err(RuleError::validation(bounds));
        }

        if size < u64::MAX as f64 {
            Ok(Some(Value::Unsigned((size + 0.5) as u64)))
        } else {
            Ok(Some(Value::Float(size)))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let limited = self.min.is_some() || self.max.is_some();
        match (limited, label) {
            (true, Some(l)) => f.tr(
                self.name(),
                "The value in the “%1” field is either not a valid file size or not within the allowed limits.",
                &[l],
            ),
            (true, None) => f.tr(
                self.name(),
                "Invalid file size or file size not within the allowed limits.",
                &[],
            ),
            (false, Some(l)) => f.tr(
                self.name(),
                "The “%1” field does not contain a valid file size.",
                &[l],
            ),
            (false, None) => f.tr(self.name(), "Invalid file size.", &[]),
        }
    }

    fn generic_data_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        match (data, label) {
            (
                ErrorData::Bounds {
                    min: Some(min),
                    max: Some(max),
                },
                Some(l),
            ) => f.tr(
                self.name(),
                "The minimum %1 for the “%3” field is greater than the maximum %2.",
                &[min, max, l],
            ),
            (
                ErrorData::Bounds {
                    min: Some(min),
                    max: Some(max),
                },
                None,
            ) => f.tr(
                self.name(),
                "The minimum %1 is greater than the maximum %2.",
                &[min, max],
            ),
            _ => unusable_data_message(label, f),
        }
    }
}

impl_rule_builders!(FileSize);
impl_default_key!(FileSize);
