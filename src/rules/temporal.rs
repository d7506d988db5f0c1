//! Date and time rules: [`Date`], [`Time`], [`DateTime`], [`After`] and [`Before`].
//!
//! Input is parsed with an optional custom format (chrono strftime syntax)
//! first, then with the locale's short and long formats, then ISO 8601,
//! RFC 2822 and the generic text format.

use chrono::{FixedOffset, NaiveDate, NaiveTime};

use crate::datetime::{self, ParsedDateTime, Zone, ZoneError};
use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// Where a [`DateTime`] rule finds the time zone of inputs without an
/// explicit offset.
///
/// A zone is either an IANA name such as `Europe/Berlin` or a UTC offset in
/// seconds such as `3600`. When no zone can be found, UTC is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeZoneSpec {
    /// A fixed zone.
    Literal(String),
    /// The zone submitted in another field.
    Field(String),
    /// The zone stored in the stash: text, or an integer offset in seconds.
    Stash(String),
}

impl TimeZoneSpec {
    fn resolve(&self, rule: &'static str, field: &str, ctx: &ValidationContext<'_>) -> Result<Zone, RuleError> {
        let log = RuleLog::new(rule, field, ctx);
        let (spec, user_supplied) = match self {
            Self::Literal(zone) => (zone.clone(), false),
            Self::Field(other) => (ctx.value(other).unwrap_or("").to_string(), true),
            Self::Stash(key) => match ctx.stash().get(key) {
                None => (String::new(), false),
                Some(Value::Text(zone)) => (zone.clone(), false),
                Some(Value::Integer(seconds)) => (seconds.to_string(), false),
                Some(other) => {
                    log.warn(format_args!(
                        "invalid validation data: stash key \"{}\" holds a {} time zone",
                        key,
                        other.kind()
                    ));
                    return Err(RuleError::data(ErrorData::None));
                }
            },
        };

        if spec.is_empty() {
            return Ok(datetime::utc());
        }

        datetime::parse_zone(&spec).map_err(|e| {
            let shown = match e {
                ZoneError::OffsetOutOfRange(seconds) => seconds.to_string(),
                ZoneError::UnknownName(name) => name,
            };
            if user_supplied {
                log.debug(format_args!("unknown time zone \"{}\"", shown));
                RuleError::validation(ErrorData::Text(shown))
            } else {
                log.warn(format_args!("invalid validation data: unknown time zone \"{}\"", shown));
                RuleError::data(ErrorData::Text(shown))
            }
        })
    }
}

fn format_message(
    context: &str,
    label: Option<&str>,
    what: &str,
    format: Option<&str>,
    f: &Formatter<'_>,
) -> String {
    match (label, format) {
        (Some(l), Some(fmt)) => f.tr(
            context,
            "Could not parse the %2 in the “%1” field according to the following format: %3",
            &[l, what, fmt],
        ),
        (None, Some(fmt)) => f.tr(
            context,
            "Could not parse the %1 according to the following format: %2",
            &[what, fmt],
        ),
        (Some(l), None) => f.tr(context, "The “%1” field does not contain a valid %2.", &[l, what]),
        (None, None) => f.tr(context, "Not a valid %1.", &[what]),
    }
}

/// The field must be a date and is returned as [`Value::Date`].
///
/// ```
/// use chrono::NaiveDate;
/// use request_validator::rules::Date;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Date::new("birthday");
/// let params = ParameterSet::new().with("birthday", "1995-05-20");
/// let stash = Stash::new();
///
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::Date(NaiveDate::from_ymd_opt(1995, 5, 20).unwrap())))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Date {
    base: RuleBase,
    format: Option<String>,
}

impl Date {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            format: None,
        }
    }

    /// Tries `format` before the built-in formats.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl Rule for Date {
    fn name(&self) -> &'static str {
        "Date"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        datetime::parse_date(v, self.format.as_deref(), ctx.locale())
            .map(|d| Some(Value::Date(d)))
            .ok_or_else(|| RuleError::validation(ErrorData::None))
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let what = f.tr(self.name(), "date", &[]);
        format_message(self.name(), label, &what, self.format.as_deref(), f)
    }
}

/// The field must be a time of day and is returned as [`Value::Time`].
#[derive(Debug, Clone)]
pub struct Time {
    base: RuleBase,
    format: Option<String>,
}

impl Time {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            format: None,
        }
    }

    /// Tries `format` before the built-in formats.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl Rule for Time {
    fn name(&self) -> &'static str {
        "Time"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        datetime::parse_time(v, self.format.as_deref(), ctx.locale())
            .map(|t| Some(Value::Time(t)))
            .ok_or_else(|| RuleError::validation(ErrorData::None))
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        let what = f.tr(self.name(), "time", &[]);
        format_message(self.name(), label, &what, self.format.as_deref(), f)
    }
}

/// Parses `input` into a date-time with offset, attaching `zone` when the
/// input does not carry its own offset.
fn parse_datetime_in(
    input: &str,
    format: Option<&str>,
    ctx: &ValidationContext<'_>,
    zone: Zone,
) -> Option<chrono::DateTime<FixedOffset>> {
    match datetime::parse_datetime(input, format, ctx.locale())? {
        ParsedDateTime::Offset(dt) => Some(dt),
        ParsedDateTime::Naive(naive) => datetime::localize(naive, zone),
    }
}

/// The field must be a date and time and is returned as [`Value::DateTime`].
///
/// Inputs without an explicit offset are interpreted in the configured time
/// zone, or UTC.
///
/// ```
/// use request_validator::rules::{DateTime, TimeZoneSpec};
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = DateTime::new("start").time_zone(TimeZoneSpec::Field("tz".into()));
/// let params = ParameterSet::new()
///     .with("start", "2024-01-15T12:00:00")
///     .with("tz", "Europe/Berlin");
/// let stash = Stash::new();
///
/// let Ok(Some(Value::DateTime(dt))) = rule.validate(&ValidationContext::new(&params, &stash)) else {
///     panic!("expected a date-time");
/// };
/// assert_eq!(dt.offset().local_minus_utc(), 3600);
/// ```
#[derive(Debug, Clone)]
pub struct DateTime {
    base: RuleBase,
    format: Option<String>,
    time_zone: Option<TimeZoneSpec>,
}

impl DateTime {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            format: None,
            time_zone: None,
        }
    }

    /// Tries `format` before the built-in formats.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets where the time zone of offset-less inputs comes from.
    pub fn time_zone(mut self, spec: TimeZoneSpec) -> Self {
        self.time_zone = Some(spec);
        self
    }
}

impl Rule for DateTime {
    fn name(&self) -> &'static str {
        "DateTime"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        let zone = match &self.time_zone {
            Some(spec) => spec.resolve(self.name(), self.field(), ctx)?,
            None => datetime::utc(),
        };

        parse_datetime_in(v, self.format.as_deref(), ctx, zone)
            .map(|dt| Some(Value::DateTime(dt)))
            .ok_or_else(|| RuleError::validation(ErrorData::None))
    }

    fn generic_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        if let ErrorData::Text(zone) = data {
            return match label {
                Some(l) => f.tr(
                    self.name(),
                    "The time zone “%2” for the “%1” field is not known.",
                    &[l, zone],
                ),
                None => f.tr(self.name(), "The time zone “%1” is not known.", &[zone]),
            };
        }
        let what = f.tr(self.name(), "date and time", &[]);
        format_message(self.name(), label, &what, self.format.as_deref(), f)
    }
}

/// The value an [`After`] or [`Before`] rule compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// A fixed [`Value::Date`], [`Value::Time`] or [`Value::DateTime`].
    Value(Value),
    /// A date, time or date-time read from the stash.
    Stash(String),
}

impl Comparison {
    /// Reads the comparison value from the stash under `key`.
    pub fn stash(key: impl Into<String>) -> Self {
        Self::Stash(key.into())
    }
}

impl From<NaiveDate> for Comparison {
    fn from(d: NaiveDate) -> Self {
        Self::Value(Value::Date(d))
    }
}

impl From<NaiveTime> for Comparison {
    fn from(t: NaiveTime) -> Self {
        Self::Value(Value::Time(t))
    }
}

impl From<chrono::DateTime<FixedOffset>> for Comparison {
    fn from(dt: chrono::DateTime<FixedOffset>) -> Self {
        Self::Value(Value::DateTime(dt))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    After,
    Before,
}

/// Shared evaluation of [`After`] and [`Before`].
#[derive(Debug, Clone)]
struct Temporal {
    base: RuleBase,
    comparison: Comparison,
    direction: Direction,
    format: Option<String>,
    time_zone: Option<TimeZoneSpec>,
}

const KIND_DATE: &str = "date";
const KIND_TIME: &str = "time";
const KIND_DATETIME: &str = "datetime";

impl Temporal {
    fn validate(&self, name: &'static str, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let log = RuleLog::new(name, self.base.field(), ctx);
        let comparison = match &self.comparison {
            Comparison::Value(v) => Some(v),
            Comparison::Stash(key) => ctx.stash().get(key),
        };

        let comparison = match comparison {
            Some(v @ (Value::Date(_) | Value::Time(_) | Value::DateTime(_))) => v,
            other => {
                log.warn(format_args!(
                    "invalid validation data: comparison value is {}",
                    other.map_or("missing", Value::kind)
                ));
                return Err(RuleError::data(ErrorData::None));
            }
        };

        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, name);
        };

        let locale = ctx.locale();
        let format = self.format.as_deref();
        let (parsed, ordering, kind, shown) = match comparison {
            Value::Date(other) => {
                let parsed = datetime::parse_date(v, format, locale);
                (
                    parsed.map(Value::Date),
                    parsed.map(|d| d.cmp(other)),
                    KIND_DATE,
                    other.format(locale.short_date_format()).to_string(),
                )
            }
            Value::Time(other) => {
                let parsed = datetime::parse_time(v, format, locale);
                (
                    parsed.map(Value::Time),
                    parsed.map(|t| t.cmp(other)),
                    KIND_TIME,
                    other.format(locale.short_time_format()).to_string(),
                )
            }
            Value::DateTime(other) => {
                let zone = match &self.time_zone {
                    Some(spec) => spec.resolve(name, self.base.field(), ctx)?,
                    None => datetime::utc(),
                };
                let parsed = parse_datetime_in(v, format, ctx, zone);
                (
                    parsed.map(Value::DateTime),
                    parsed.map(|dt| dt.cmp(other)),
                    KIND_DATETIME,
                    other.format(&locale.short_datetime_format()).to_string(),
                )
            }
            _ => return Err(RuleError::data(ErrorData::None)),
        };

        let (Some(parsed), Some(ordering)) = (parsed, ordering) else {
            log.debug(format_args!("can not parse input {} \"{}\"", kind, v));
            return Err(RuleError::parsing(ErrorData::Text(kind.to_string())));
        };

        let passes = match self.direction {
            Direction::After => ordering.is_gt(),
            Direction::Before => ordering.is_lt(),
        };

        if passes {
            Ok(Some(parsed))
        } else {
            Err(RuleError::validation(ErrorData::List(vec![
                kind.to_string(),
                shown,
            ])))
        }
    }

    fn message(&self, name: &str, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let label = label.map(str::to_string).unwrap_or_else(|| f.field_label(self.base.field()));
        let (kind, shown) = match data {
            ErrorData::List(items) if items.len() == 2 => (items[0].as_str(), items[1].as_str()),
            ErrorData::Text(zone) => {
                return f.tr(
                    name,
                    "The time zone “%2” for the “%1” field is not known.",
                    &[&label, zone],
                )
            }
            _ => ("", ""),
        };

        let template = match (self.direction, kind) {
            (Direction::After, KIND_DATE) => "The date in the “%1” field must be after %2.",
            (Direction::After, KIND_TIME) => "The time in the “%1” field must be after %2.",
            (Direction::After, _) => "The date and time in the “%1” field must be after %2.",
            (Direction::Before, KIND_DATE) => "The date in the “%1” field must be before %2.",
            (Direction::Before, KIND_TIME) => "The time in the “%1” field must be before %2.",
            (Direction::Before, _) => "The date and time in the “%1” field must be before %2.",
        };
        f.tr(name, template, &[&label, shown])
    }

    fn parsing_message(&self, name: &str, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let what = match data {
            ErrorData::Text(kind) if kind == KIND_DATE => f.tr(name, "date", &[]),
            ErrorData::Text(kind) if kind == KIND_TIME => f.tr(name, "time", &[]),
            _ => f.tr(name, "date and time", &[]),
        };
        match label {
            Some(l) => f.tr(
                name,
                "Could not parse the input in the “%1” field into a %2.",
                &[l, &what],
            ),
            None => f.tr(name, "Could not parse the input into a %1.", &[&what]),
        }
    }
}

macro_rules! temporal_rule {
    ($(#[$doc:meta])* $name:ident, $direction:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: Temporal,
        }

        impl $name {
            /// Creates the rule for `field` comparing against `comparison`.
            pub fn new(field: impl Into<String>, comparison: impl Into<Comparison>) -> Self {
                Self {
                    inner: Temporal {
                        base: RuleBase::new(field),
                        comparison: comparison.into(),
                        direction: $direction,
                        format: None,
                        time_zone: None,
                    },
                }
            }

            /// Tries `format` before the built-in formats when parsing input.
            pub fn format(mut self, format: impl Into<String>) -> Self {
                self.inner.format = Some(format.into());
                self
            }

            /// Sets where the time zone of offset-less date-time inputs comes from.
            pub fn time_zone(mut self, spec: TimeZoneSpec) -> Self {
                self.inner.time_zone = Some(spec);
                self
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

            /// Sets the stash key whose value is used when the field is
            /// absent or empty.
            pub fn default_key(mut self, key: impl Into<String>) -> Self {
                self.inner.base.set_default_key(key);
                self
            }
        }

        impl Rule for $name {
            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn base(&self) -> &RuleBase {
                &self.inner.base
            }

            fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
                self.inner.validate(self.name(), ctx)
            }

            fn generic_error_message(
                &self,
                label: Option<&str>,
                data: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                self.inner.message(self.name(), label, data, f)
            }

            fn generic_parsing_error_message(
                &self,
                label: Option<&str>,
                data: &ErrorData,
                f: &Formatter<'_>,
            ) -> String {
                self.inner.parsing_message(self.name(), label, data, f)
            }
        }
    };
}

temporal_rule!(
    /// The input must be strictly later than the comparison value.
    ///
    /// The input is parsed into the type of the comparison value. Input that
    /// can not be parsed is a parsing error, a comparison value that is not a
    /// date, time or date-time is a data error.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use request_validator::rules::After;
    /// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
    ///
    /// let rule = After::new("start", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    /// let stash = Stash::new();
    ///
    /// let params = ParameterSet::new().with("start", "2024-01-02");
    /// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_ok());
    ///
    /// let params = ParameterSet::new().with("start", "2024-01-01");
    /// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
    /// ```
    After,
    Direction::After
);

temporal_rule!(
    /// The input must be strictly earlier than the comparison value.
    Before,
    Direction::Before
);

impl_rule_builders!(Date, Time, DateTime);
impl_default_key!(Date, Time, DateTime);
