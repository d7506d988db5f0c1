use std::cell::Cell;

use bitflags::bitflags;
use url::{ParseError, SyntaxViolation, Url as ParsedUrl};

use crate::format::Formatter;
use crate::logging::RuleLog;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

bitflags! {
    /// Restrictions applied by the [`Url`] rule.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UrlConstraints: u8 {
        /// Reject input that only parses after error correction.
        const STRICT_PARSING = 1 << 0;
        /// Reject relative references such as `/about`.
        const NO_RELATIVE = 1 << 1;
        /// Reject `file:` URLs.
        const NO_LOCAL_FILE = 1 << 2;
        /// Only `http` and `https` URLs. Implies `NO_RELATIVE` and `NO_LOCAL_FILE`.
        const WEBSITE_ONLY = 1 << 3;
    }
}

/// The field must be a URL.
///
/// Absolute URLs are returned as [`Value::Url`]. Relative references, when
/// allowed, are returned as [`Value::Text`].
///
/// ```
/// use request_validator::rules::{Url, UrlConstraints};
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
///
/// let rule = Url::new("homepage").constraints(UrlConstraints::WEBSITE_ONLY);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("homepage", "https://example.org/");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_ok());
///
/// let params = ParameterSet::new().with("homepage", "ftp://example.org/");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Url {
    base: RuleBase,
    constraints: UrlConstraints,
    schemes: Vec<String>,
}

impl Url {
    /// Creates the rule for `field` without constraints.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            constraints: UrlConstraints::empty(),
            schemes: Vec::new(),
        }
    }

    /// Sets the constraints.
    pub fn constraints(mut self, constraints: UrlConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Restricts the accepted schemes (compared case-insensitively).
    pub fn schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes
            .into_iter()
            .map(|s| s.into().to_ascii_lowercase())
            .collect();
        self
    }

    fn allowed_schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.schemes.iter().map(String::as_str).collect();
        if self.constraints.contains(UrlConstraints::WEBSITE_ONLY) {
            for web in ["http", "https"] {
                if !schemes.contains(&web) {
                    schemes.push(web);
                }
            }
        }
        schemes
    }

    fn relative_allowed(&self) -> bool {
        !self
            .constraints
            .intersects(UrlConstraints::NO_RELATIVE | UrlConstraints::WEBSITE_ONLY)
            && self.allowed_schemes().is_empty()
    }
}

impl Rule for Url {
    fn name(&self) -> &'static str {
        "Url"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        let violated = Cell::new(false);
        let on_violation = |_: SyntaxViolation| violated.set(true);
        let parsed = ParsedUrl::options()
            .syntax_violation_callback(Some(&on_violation))
            .parse(v);

        let strict = self.constraints.contains(UrlConstraints::STRICT_PARSING);
        if strict && violated.get() {
            RuleLog::new(self.name(), self.field(), ctx)
                .debug(format_args!("syntax violation in strict mode"));
            return Err(RuleError::validation(ErrorData::None));
        }

        let url = match parsed {
            Ok(url) => url,
            Err(ParseError::RelativeUrlWithoutBase) if self.relative_allowed() => {
                return Ok(Some(Value::from(v)));
            }
            Err(_) => return Err(RuleError::validation(ErrorData::None)),
        };

        let no_local = self
            .constraints
            .intersects(UrlConstraints::NO_LOCAL_FILE | UrlConstraints::WEBSITE_ONLY);
        if no_local && url.scheme() == "file" {
            return Err(RuleError::validation(ErrorData::None));
        }

        let schemes = self.allowed_schemes();
        if !schemes.is_empty() && !schemes.contains(&url.scheme()) {
            return Err(RuleError::validation(ErrorData::None));
        }

        Ok(Some(Value::Url(url)))
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(self.name(), "The value in the “%1” field is not a valid URL.", &[l]),
            None => f.tr(self.name(), "Not a valid URL.", &[]),
        }
    }
}

impl_rule_builders!(Url);
impl_default_key!(Url);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterSet, Stash};

    fn run(rule: &Url, value: &str) -> RuleOutcome {
        let params = ParameterSet::new().with("f", value);
        let stash = Stash::new();
        rule.validate(&ValidationContext::new(&params, &stash))
    }

    #[test]
    fn absolute_urls_are_parsed() {
        let Ok(Some(Value::Url(url))) = run(&Url::new("f"), "https://example.org/a?b=c") else {
            panic!("expected url");
        };
        assert_eq!(url.host_str(), Some("example.org"));
        assert_eq!(url.query(), Some("b=c"));
    }

    #[test]
    fn relative_references() {
        assert_eq!(
            run(&Url::new("f"), "/about/team"),
            Ok(Some(Value::from("/about/team")))
        );
        let rule = Url::new("f").constraints(UrlConstraints::NO_RELATIVE);
        assert!(run(&rule, "/about/team").is_err());
        assert!(run(&Url::new("f").schemes(["https"]), "/about/team").is_err());
    }

    #[test]
    fn local_files() {
        assert!(run(&Url::new("f"), "file:///etc/hosts").is_ok());
        let rule = Url::new("f").constraints(UrlConstraints::NO_LOCAL_FILE);
        assert!(run(&rule, "file:///etc/hosts").is_err());
        assert!(run(&rule, "https://example.org").is_ok());
    }

    #[test]
    fn scheme_list_is_case_insensitive() {
        let rule = Url::new("f").schemes(["HTTPS", "mailto"]);
        assert!(run(&rule, "mailto:someone@example.org").is_ok());
        assert!(run(&rule, "HTTPS://example.org").is_ok());
        assert!(run(&rule, "http://example.org").is_err());
    }

    #[test]
    fn website_only_extends_schemes() {
        let rule = Url::new("f")
            .constraints(UrlConstraints::WEBSITE_ONLY)
            .schemes(["ftp"]);
        assert!(run(&rule, "ftp://example.org").is_ok());
        assert!(run(&rule, "http://example.org").is_ok());
        assert!(run(&rule, "file:///tmp/x").is_err());
        assert!(run(&rule, "index.html").is_err());
    }

    #[test]
    fn strict_parsing_rejects_corrected_input() {
        let tolerant = Url::new("f");
        assert!(run(&tolerant, "https://example.org/a b").is_ok());

        let strict = Url::new("f").constraints(UrlConstraints::STRICT_PARSING);
        assert!(run(&strict, "https://example.org/a b").is_err());
        assert!(run(&strict, "https://example.org/a%20b").is_ok());
    }
}
