//! Per-request locale: date/time formats and plural rules.

use std::fmt;

/// CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    /// Singular forms ("1 digit").
    One,
    /// Paucal forms used by Slavic languages ("2 cyfry").
    Few,
    /// Large-number forms used by Slavic languages ("5 cyfr").
    Many,
    /// Everything else.
    Other,
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "one"),
            Self::Few => write!(f, "few"),
            Self::Many => write!(f, "many"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Locale used by date/time rules and by plural selection.
///
/// Date and time formats use `chrono` strftime syntax. Month and weekday
/// names are parsed in English regardless of the locale, since chrono has no
/// localized name tables.
///
/// # Examples
///
/// ```
/// use request_validator::{Locale, PluralCategory};
///
/// let de = Locale::new("de_DE.UTF-8");
/// assert_eq!(de.language(), "de");
/// assert_eq!(de.short_date_format(), "%d.%m.%y");
/// assert_eq!(de.plural_category(1), PluralCategory::One);
///
/// let pl = Locale::new("pl-PL");
/// assert_eq!(pl.plural_category(3), PluralCategory::Few);
/// assert_eq!(pl.plural_category(5), PluralCategory::Many);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    name: String,
    language: String,
    short_date: String,
    long_date: String,
    short_time: String,
    long_time: String,
}

impl Locale {
    /// The locale-independent "C" locale.
    pub fn c() -> Self {
        Self::from_parts("C", "en", "%m/%d/%y", "%A, %B %d, %Y", "%I:%M %p", "%I:%M:%S %p")
    }

    /// Creates a locale from a POSIX or BCP 47 style name such as `de_DE`,
    /// `en-GB` or `fr_FR.UTF-8`.
    ///
    /// Unknown regions fall back to the language's formats, and unknown
    /// languages fall back to the C formats while keeping the language for
    /// plural selection.
    pub fn new(name: &str) -> Self {
        let base = name.split(['.', '@']).next().unwrap_or(name);
        let normalized = base.replace('-', "_");
        let language = normalized
            .split('_')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        let (short_date, long_date, short_time, long_time) = match normalized.as_str() {
            "en_GB" | "en_IE" | "en_AU" | "en_NZ" => {
                ("%d/%m/%Y", "%A, %d %B %Y", "%H:%M", "%H:%M:%S")
            }
            _ => match language.as_str() {
                "de" => ("%d.%m.%y", "%A, %d. %B %Y", "%H:%M", "%H:%M:%S"),
                "fr" | "es" | "it" | "pt" => ("%d/%m/%Y", "%A %d %B %Y", "%H:%M", "%H:%M:%S"),
                "nl" => ("%d-%m-%Y", "%A %d %B %Y", "%H:%M", "%H:%M:%S"),
                "ru" | "pl" => ("%d.%m.%Y", "%d %B %Y", "%H:%M", "%H:%M:%S"),
                "ja" | "zh" => ("%Y/%m/%d", "%Y年%m月%d日", "%H:%M", "%H:%M:%S"),
                _ => ("%m/%d/%y", "%A, %B %d, %Y", "%I:%M %p", "%I:%M:%S %p"),
            },
        };

        let language = if language.is_empty() || language == "c" || language == "posix" {
            "en".to_string()
        } else {
            language
        };

        Self::from_parts(base, &language, short_date, long_date, short_time, long_time)
    }

    fn from_parts(
        name: &str,
        language: &str,
        short_date: &str,
        long_date: &str,
        short_time: &str,
        long_time: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            short_date: short_date.to_string(),
            long_date: long_date.to_string(),
            short_time: short_time.to_string(),
            long_time: long_time.to_string(),
        }
    }

    /// Overrides the short date format.
    pub fn with_short_date_format(mut self, format: impl Into<String>) -> Self {
        self.short_date = format.into();
        self
    }

    /// Overrides the long date format.
    pub fn with_long_date_format(mut self, format: impl Into<String>) -> Self {
        self.long_date = format.into();
        self
    }

    /// Overrides the short time format.
    pub fn with_short_time_format(mut self, format: impl Into<String>) -> Self {
        self.short_time = format.into();
        self
    }

    /// Overrides the long time format.
    pub fn with_long_time_format(mut self, format: impl Into<String>) -> Self {
        self.long_time = format.into();
        self
    }

    /// Returns the locale name as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lower-case language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the short date format.
    pub fn short_date_format(&self) -> &str {
        &self.short_date
    }

    /// Returns the long date format.
    pub fn long_date_format(&self) -> &str {
        &self.long_date
    }

    /// Returns the short time format.
    pub fn short_time_format(&self) -> &str {
        &self.short_time
    }

    /// Returns the long time format.
    pub fn long_time_format(&self) -> &str {
        &self.long_time
    }

    /// Returns the short date-and-time format.
    pub fn short_datetime_format(&self) -> String {
        format!("{} {}", self.short_date, self.short_time)
    }

    /// Returns the long date-and-time format.
    pub fn long_datetime_format(&self) -> String {
        format!("{} {}", self.long_date, self.long_time)
    }

    /// Returns the decimal separator used when reading localized numbers.
    pub fn decimal_point(&self) -> char {
        match self.language.as_str() {
            "de" | "fr" | "es" | "it" | "pt" | "nl" | "ru" | "pl" => ',',
            _ => '.',
        }
    }

    /// Selects the CLDR plural category of `n` for this locale's language.
    pub fn plural_category(&self, n: u64) -> PluralCategory {
        let mod10 = n % 10;
        let mod100 = n % 100;
        match self.language.as_str() {
            "ja" | "zh" | "ko" | "vi" | "th" => PluralCategory::Other,
            "fr" | "pt" => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            "ru" | "uk" | "be" => {
                if mod10 == 1 && mod100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            "pl" => {
                if n == 1 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            _ => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::c()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_locale_is_english() {
        let c = Locale::c();
        assert_eq!(c.name(), "C");
        assert_eq!(c.language(), "en");
        assert_eq!(c.short_date_format(), "%m/%d/%y");
    }

    #[test]
    fn names_are_normalized() {
        assert_eq!(Locale::new("en-GB").short_date_format(), "%d/%m/%Y");
        assert_eq!(Locale::new("de_AT.UTF-8").short_date_format(), "%d.%m.%y");
        assert_eq!(Locale::new("POSIX").language(), "en");
    }

    #[test]
    fn unknown_language_keeps_code() {
        let sw = Locale::new("sw_KE");
        assert_eq!(sw.language(), "sw");
        assert_eq!(sw.short_date_format(), Locale::c().short_date_format());
    }

    #[test]
    fn combined_formats() {
        let gb = Locale::new("en_GB");
        assert_eq!(gb.short_datetime_format(), "%d/%m/%Y %H:%M");
        assert_eq!(gb.long_datetime_format(), "%A, %d %B %Y %H:%M:%S");
    }

    #[test]
    fn overrides() {
        let l = Locale::c().with_short_date_format("%Y%m%d");
        assert_eq!(l.short_date_format(), "%Y%m%d");
    }

    #[test]
    fn decimal_points() {
        assert_eq!(Locale::c().decimal_point(), '.');
        assert_eq!(Locale::new("en_GB").decimal_point(), '.');
        assert_eq!(Locale::new("de_DE").decimal_point(), ',');
        assert_eq!(Locale::new("pl-PL").decimal_point(), ',');
    }

    #[test]
    fn english_plurals() {
        let en = Locale::c();
        assert_eq!(en.plural_category(0), PluralCategory::Other);
        assert_eq!(en.plural_category(1), PluralCategory::One);
        assert_eq!(en.plural_category(2), PluralCategory::Other);
    }

    #[test]
    fn french_zero_is_singular() {
        assert_eq!(Locale::new("fr").plural_category(0), PluralCategory::One);
        assert_eq!(Locale::new("fr").plural_category(2), PluralCategory::Other);
    }

    #[test]
    fn russian_plurals() {
        let ru = Locale::new("ru_RU");
        assert_eq!(ru.plural_category(1), PluralCategory::One);
        assert_eq!(ru.plural_category(21), PluralCategory::One);
        assert_eq!(ru.plural_category(11), PluralCategory::Many);
        assert_eq!(ru.plural_category(3), PluralCategory::Few);
        assert_eq!(ru.plural_category(13), PluralCategory::Many);
    }

    #[test]
    fn japanese_has_no_plural() {
        assert_eq!(Locale::new("ja_JP").plural_category(1), PluralCategory::Other);
    }
}
