//! Date and time parsing shared by the temporal rules.
//!
//! Every parser tries the same fixed sequence: an optional custom format, the
//! locale's short format, the locale's long format, ISO 8601, RFC 2822 and
//! finally the generic text format (`Sat May 20 1995`).

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};

use crate::Locale;

const ISO_DATE: &str = "%Y-%m-%d";
const ISO_TIMES: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const ISO_DATETIMES: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const TEXT_DATE: &str = "%a %b %d %Y";
const TEXT_TIME: &str = "%H:%M:%S";
const TEXT_DATETIME: &str = "%a %b %d %H:%M:%S %Y";

/// A parsed date-time, with or without an explicit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedDateTime {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

pub(crate) fn parse_date(input: &str, custom: Option<&str>, locale: &Locale) -> Option<NaiveDate> {
    if let Some(d) = custom.and_then(|fmt| NaiveDate::parse_from_str(input, fmt).ok()) {
        return Some(d);
    }

    [locale.short_date_format(), locale.long_date_format(), ISO_DATE]
        .into_iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc2822(input)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| NaiveDate::parse_from_str(input, TEXT_DATE).ok())
}

pub(crate) fn parse_time(input: &str, custom: Option<&str>, locale: &Locale) -> Option<NaiveTime> {
    if let Some(t) = custom.and_then(|fmt| NaiveTime::parse_from_str(input, fmt).ok()) {
        return Some(t);
    }

    [locale.short_time_format(), locale.long_time_format()]
        .into_iter()
        .chain(ISO_TIMES.iter().copied())
        .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc2822(input).ok().map(|dt| dt.time()))
        .or_else(|| NaiveTime::parse_from_str(input, TEXT_TIME).ok())
}

pub(crate) fn parse_datetime(
    input: &str,
    custom: Option<&str>,
    locale: &Locale,
) -> Option<ParsedDateTime> {
    if let Some(fmt) = custom {
        if let Ok(dt) = DateTime::parse_from_str(input, fmt) {
            return Some(ParsedDateTime::Offset(dt));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(ParsedDateTime::Naive(dt));
        }
    }

    let locale_formats = [locale.short_datetime_format(), locale.long_datetime_format()];
    if let Some(dt) = locale_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Some(ParsedDateTime::Naive(dt));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(ParsedDateTime::Offset(dt));
    }
    if let Some(dt) = ISO_DATETIMES
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
    {
        return Some(ParsedDateTime::Naive(dt));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(ParsedDateTime::Offset(dt));
    }

    NaiveDateTime::parse_from_str(input, TEXT_DATETIME)
        .ok()
        .map(ParsedDateTime::Naive)
}

/// A resolved time zone: a fixed offset or an IANA zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Zone {
    Fixed(FixedOffset),
    Named(chrono_tz::Tz),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ZoneError {
    /// Offset seconds outside ±24h.
    OffsetOutOfRange(i64),
    /// Not an IANA zone name.
    UnknownName(String),
}

/// Interprets `spec` as UTC offset seconds when it is numeric, otherwise as an
/// IANA zone name.
pub(crate) fn parse_zone(spec: &str) -> Result<Zone, ZoneError> {
    if let Ok(seconds) = spec.parse::<i64>() {
        return i32::try_from(seconds)
            .ok()
            .and_then(FixedOffset::east_opt)
            .map(Zone::Fixed)
            .ok_or(ZoneError::OffsetOutOfRange(seconds));
    }

    spec.parse::<chrono_tz::Tz>()
        .map(Zone::Named)
        .map_err(|_| ZoneError::UnknownName(spec.to_string()))
}

/// Attaches `zone` to a naive date-time.
///
/// Ambiguous local times (when clocks go back) resolve to the earlier
/// instant. Local times skipped when clocks go forward are read with the
/// offset in force before the transition, which moves them forward by the
/// length of the gap: 02:30 on a spring-forward night in Berlin becomes
/// 03:30 summer time.
pub(crate) fn localize(naive: NaiveDateTime, zone: Zone) -> Option<DateTime<FixedOffset>> {
    match zone {
        Zone::Fixed(offset) => offset.from_local_datetime(&naive).earliest(),
        Zone::Named(tz) => match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.fixed_offset()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
            LocalResult::None => {
                let day_before = naive.checked_sub_signed(Duration::days(1))?;
                let before = tz.offset_from_utc_datetime(&day_before).fix();
                let instant = naive
                    .checked_sub_signed(Duration::seconds(before.local_minus_utc().into()))?;
                Some(tz.from_utc_datetime(&instant).fixed_offset())
            }
        },
    }
}

pub(crate) fn utc() -> Zone {
    Zone::Fixed(Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn custom_format_wins() {
        let locale = Locale::c();
        let d = parse_date("20|05|1995", Some("%d|%m|%Y"), &locale).unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (1995, 5, 20));
    }

    #[test]
    fn locale_formats_before_iso() {
        let de = Locale::new("de_DE");
        let d = parse_date("20.05.95", None, &de).unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (1995, 5, 20));

        let c = Locale::c();
        let d = parse_date("05/20/95", None, &c).unwrap();
        assert_eq!(d.day(), 20);
    }

    #[test]
    fn date_fallbacks() {
        let locale = Locale::c();
        assert!(parse_date("1995-05-20", None, &locale).is_some());
        assert!(parse_date("Sat, 20 May 1995 10:00:00 +0000", None, &locale).is_some());
        assert!(parse_date("Sat May 20 1995", None, &locale).is_some());
        assert!(parse_date("yesterday", None, &locale).is_none());
    }

    #[test]
    fn time_fallbacks() {
        let locale = Locale::c();
        assert_eq!(parse_time("10:30 PM", None, &locale).unwrap().hour(), 22);
        assert_eq!(parse_time("22:30:15", None, &locale).unwrap().second(), 15);
        assert_eq!(parse_time("22:30", None, &locale).unwrap().minute(), 30);
        assert!(parse_time("25:00", None, &locale).is_none());
    }

    #[test]
    fn datetime_offsets() {
        let locale = Locale::c();
        assert!(matches!(
            parse_datetime("1995-05-20T10:00:00+02:00", None, &locale),
            Some(ParsedDateTime::Offset(_))
        ));
        assert!(matches!(
            parse_datetime("1995-05-20T10:00:00", None, &locale),
            Some(ParsedDateTime::Naive(_))
        ));
        assert!(matches!(
            parse_datetime("Sat, 20 May 1995 10:00:00 +0000", None, &locale),
            Some(ParsedDateTime::Offset(_))
        ));
        assert!(parse_datetime("not a date", None, &locale).is_none());
    }

    #[test]
    fn zones() {
        assert_eq!(
            parse_zone("3600"),
            Ok(Zone::Fixed(FixedOffset::east_opt(3600).unwrap()))
        );
        assert_eq!(
            parse_zone("Europe/Berlin"),
            Ok(Zone::Named(chrono_tz::Europe::Berlin))
        );
        assert_eq!(
            parse_zone("Mars/Olympus"),
            Err(ZoneError::UnknownName("Mars/Olympus".into()))
        );
        assert_eq!(parse_zone("999999"), Err(ZoneError::OffsetOutOfRange(999999)));
    }

    #[test]
    fn localize_moves_gap_times_forward() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let dt = localize(naive, Zone::Named(chrono_tz::Europe::Berlin)).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        assert_eq!((dt.hour(), dt.minute()), (3, 30));

        let naive = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 15, 0)
            .unwrap();
        let dt = localize(naive, Zone::Named(chrono_tz::America::New_York)).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (3, 15));
        assert_eq!(dt.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn localize_ambiguous_times_take_the_earlier_instant() {
        let naive = NaiveDate::from_ymd_opt(2024, 10, 27)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let dt = localize(naive, Zone::Named(chrono_tz::Europe::Berlin)).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn localize_named_zone() {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let dt = localize(naive, Zone::Named(chrono_tz::Europe::Berlin)).unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
    }
}
