use once_cell::sync::Lazy;

use crate::{Locale, ParameterSet, Stash};

static C_LOCALE: Lazy<Locale> = Lazy::new(Locale::c);

/// Everything a rule may look at during one validation pass.
///
/// `ValidationContext` borrows the request's [`ParameterSet`] and [`Stash`]
/// and adds the pass-wide settings: the whitespace policy, the locale used by
/// date/time rules and an optional origin (for example `"Users::create"`)
/// that is attached to log records.
///
/// The context is a bundle of shared references, so it is `Copy` and can be
/// handed to every rule of a chain without cloning request data.
///
/// # Examples
///
/// ```
/// use request_validator::{Locale, ParameterSet, Stash, ValidationContext};
///
/// let params = ParameterSet::new().with("name", "  Ada  ");
/// let stash = Stash::new();
/// let locale = Locale::new("en_GB");
///
/// let ctx = ValidationContext::new(&params, &stash)
///     .with_locale(&locale)
///     .with_origin("Users::create");
///
/// assert_eq!(ctx.value("name"), Some("Ada"));
/// assert_eq!(ctx.without_trimming().value("name"), Some("  Ada  "));
/// assert_eq!(ctx.origin(), Some("Users::create"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    params: &'a ParameterSet,
    stash: &'a Stash,
    locale: &'a Locale,
    origin: Option<&'a str>,
    trim: bool,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context with trimming enabled and the C locale.
    pub fn new(params: &'a ParameterSet, stash: &'a Stash) -> Self {
        Self {
            params,
            stash,
            locale: &C_LOCALE,
            origin: None,
            trim: true,
        }
    }

    /// Uses `locale` for date/time parsing and plural selection.
    pub fn with_locale(mut self, locale: &'a Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Attaches an origin (controller/action) to log records.
    pub fn with_origin(mut self, origin: &'a str) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Disables whitespace trimming for this pass.
    pub fn without_trimming(mut self) -> Self {
        self.trim = false;
        self
    }

    /// Returns the request parameters.
    pub fn params(&self) -> &'a ParameterSet {
        self.params
    }

    /// Returns the request stash.
    pub fn stash(&self) -> &'a Stash {
        self.stash
    }

    /// Returns the locale of this pass.
    pub fn locale(&self) -> &'a Locale {
        self.locale
    }

    /// Returns the origin attached to log records, if any.
    pub fn origin(&self) -> Option<&'a str> {
        self.origin
    }

    /// Returns `true` if values are trimmed before inspection.
    pub fn trims(&self) -> bool {
        self.trim
    }

    /// Returns the value of `field` after applying the whitespace policy.
    ///
    /// Returns `None` only if the field was not submitted; a submitted empty
    /// field yields `Some("")`.
    pub fn value(&self, field: &str) -> Option<&'a str> {
        self.params.value(field).map(|v| self.apply_trim(v))
    }

    /// Applies the whitespace policy to an arbitrary string.
    pub fn apply_trim<'v>(&self, value: &'v str) -> &'v str {
        if self.trim {
            value.trim()
        } else {
            value
        }
    }
}
