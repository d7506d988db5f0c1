//! Domain name syntax and, with the `dns` feature, existence checks.

use crate::format::Formatter;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// Longest name the DNS can carry, without the root dot.
const MAX_NAME_LEN: usize = 253;
/// Longest single label.
const MAX_LABEL_LEN: usize = 63;

/// Why a domain name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainDiagnosis {
    /// Well formed, but no address records were found.
    MissingDns,
    /// A label contains characters other than `a-z`, `0-9` and `-`.
    InvalidChars,
    /// A label is longer than 63 characters.
    LabelTooLong,
    /// The whole name is longer than 253 characters.
    TooLong,
    /// The name is empty or consists of a top level domain only.
    InvalidLabelCount,
    /// Two dots follow each other, or the name is empty.
    EmptyLabel,
    /// The top level domain contains digits or dashes, or is a single
    /// character.
    InvalidTld,
    /// A label starts with a dash.
    DashStart,
    /// A label ends with a dash.
    DashEnd,
    /// A label starts with a digit.
    DigitStart,
    /// The DNS lookup did not answer in time.
    DnsTimeout,
}

impl DomainDiagnosis {
    const ALL: [Self; 11] = [
        Self::MissingDns,
        Self::InvalidChars,
        Self::LabelTooLong,
        Self::TooLong,
        Self::InvalidLabelCount,
        Self::EmptyLabel,
        Self::InvalidTld,
        Self::DashStart,
        Self::DashEnd,
        Self::DigitStart,
        Self::DnsTimeout,
    ];

    /// Stable reason code carried in [`ErrorData::Code`].
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingDns => "missing-dns",
            Self::InvalidChars => "invalid-chars",
            Self::LabelTooLong => "label-too-long",
            Self::TooLong => "too-long",
            Self::InvalidLabelCount => "invalid-label-count",
            Self::EmptyLabel => "empty-label",
            Self::InvalidTld => "invalid-tld",
            Self::DashStart => "dash-start",
            Self::DashEnd => "dash-end",
            Self::DigitStart => "digit-start",
            Self::DnsTimeout => "dns-timeout",
        }
    }

    /// Looks a diagnosis up by its [`code`](Self::code).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    fn describe(self, rule: &str, label: Option<&str>, f: &Formatter<'_>) -> String {
        let (labeled, unlabeled) = match self {
            Self::MissingDns => (
                "The domain name in the “%1” field seems to be valid but could not be found in the domain name system.",
                "The domain name seems to be valid but could not be found in the domain name system.",
            ),
            Self::InvalidChars => (
                "The domain name in the “%1” field contains characters that are not allowed.",
                "The domain name contains characters that are not allowed.",
            ),
            Self::LabelTooLong => (
                "A section of the domain name in the “%1” field is longer than 63 characters. Internationalized names can be longer internally than they look.",
                "A section of the domain name is longer than 63 characters. Internationalized names can be longer internally than they look.",
            ),
            Self::TooLong => (
                "The domain name in the “%1” field must not be longer than 253 characters. Internationalized names can be longer internally than they look.",
                "The domain name must not be longer than 253 characters. Internationalized names can be longer internally than they look.",
            ),
            Self::InvalidLabelCount => (
                "The “%1” field does not contain a valid domain name because it is empty or only has a top level domain.",
                "This is not a valid domain name because it is empty or only has a top level domain.",
            ),
            Self::EmptyLabel => (
                "A section of the domain name in the “%1” field is empty. Check for two consecutive dots.",
                "A section of the domain name is empty. Check for two consecutive dots.",
            ),
            Self::InvalidTld => (
                "The top level domain of the domain name in the “%1” field contains characters that are not allowed, like digits or dashes.",
                "The top level domain contains characters that are not allowed, like digits or dashes.",
            ),
            Self::DashStart => (
                "Sections of the domain name in the “%1” field must not start with a dash.",
                "Domain name sections must not start with a dash.",
            ),
            Self::DashEnd => (
                "Sections of the domain name in the “%1” field must not end with a dash.",
                "Domain name sections must not end with a dash.",
            ),
            Self::DigitStart => (
                "Sections of the domain name in the “%1” field must not start with a digit.",
                "Domain name sections must not start with a digit.",
            ),
            Self::DnsTimeout => (
                "The DNS lookup for the domain name in the “%1” field took too long.",
                "The DNS lookup for the domain name took too long.",
            ),
        };
        match label {
            Some(l) => f.tr(rule, labeled, &[l]),
            None => f.tr(rule, unlabeled, &[]),
        }
    }
}

/// Checks the syntax of a domain name and returns its lower-case ASCII
/// (punycode) form.
///
/// A trailing root dot is accepted and kept. Internationalized names are
/// converted to their `xn--` form before the label checks run, but the top
/// level domain is checked for digits and dashes in its original form.
///
/// ```
/// use request_validator::rules::{check_domain, DomainDiagnosis};
///
/// assert_eq!(check_domain("Example.ORG"), Ok("example.org".to_string()));
/// assert_eq!(check_domain("bücher.de."), Ok("xn--bcher-kva.de.".to_string()));
/// assert_eq!(check_domain("localhost"), Err(DomainDiagnosis::InvalidLabelCount));
/// assert_eq!(check_domain("-a.example"), Err(DomainDiagnosis::DashStart));
/// ```
pub fn check_domain(value: &str) -> Result<String, DomainDiagnosis> {
    let (name, root_dot) = match value.strip_suffix('.') {
        Some(name) => (name, true),
        None => (value, false),
    };

    let tld = name.rsplit('.').next().unwrap_or_default();
    if tld.is_empty() {
        return Err(DomainDiagnosis::EmptyLabel);
    }
    if tld.chars().any(|c| c.is_ascii_digit() || c == '-') {
        return Err(DomainDiagnosis::InvalidTld);
    }

    let ace = if name.is_ascii() {
        name.to_ascii_lowercase()
    } else {
        match url::quirks::domain_to_ascii(name) {
            ace if ace.is_empty() => return Err(DomainDiagnosis::InvalidChars),
            ace => ace,
        }
    };

    if ace.len() > MAX_NAME_LEN {
        return Err(DomainDiagnosis::TooLong);
    }

    let labels: Vec<&str> = ace.split('.').collect();
    if labels.len() < 2 {
        return Err(DomainDiagnosis::InvalidLabelCount);
    }
    let last = labels.len() - 1;
    if labels[last].len() < 2 {
        return Err(DomainDiagnosis::InvalidTld);
    }

    for (i, label) in labels.iter().enumerate() {
        check_label(label, i == last)?;
    }

    if root_dot {
        Ok(format!("{ace}."))
    } else {
        Ok(ace)
    }
}

fn check_label(label: &str, is_tld: bool) -> Result<(), DomainDiagnosis> {
    if label.is_empty() {
        return Err(DomainDiagnosis::EmptyLabel);
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(DomainDiagnosis::LabelTooLong);
    }

    let punycode = label.starts_with("xn--");
    let end = label.len() - 1;
    for (j, b) in label.bytes().enumerate() {
        let digit = b.is_ascii_digit();
        let dash = b == b'-';
        let letter = b.is_ascii_lowercase();

        if j == 0 && dash {
            return Err(DomainDiagnosis::DashStart);
        }
        if j == 0 && digit {
            return Err(DomainDiagnosis::DigitStart);
        }
        if j == end && dash {
            return Err(DomainDiagnosis::DashEnd);
        }

        let allowed = if is_tld && !punycode {
            letter
        } else {
            letter || digit || dash
        };
        if !allowed {
            return Err(if is_tld {
                DomainDiagnosis::InvalidTld
            } else {
                DomainDiagnosis::InvalidChars
            });
        }
    }
    Ok(())
}

/// The field must be a syntactically valid domain name, returned as
/// lower-case ASCII text.
///
/// The synchronous check covers syntax only. With the `dns` feature,
/// [`Domain::validate_resolving`] additionally requires the name to resolve.
///
/// ```
/// use request_validator::rules::Domain;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Domain::new("host");
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("host", "Mail.Example.com");
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::from("mail.example.com")))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Domain {
    base: RuleBase,
}

impl Domain {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

impl Rule for Domain {
    fn name(&self) -> &'static str {
        "Domain"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        check_domain(v)
            .map(|ace| Some(Value::Text(ace)))
            .map_err(|diagnosis| RuleError::validation(ErrorData::Code(diagnosis.code())))
    }

    fn generic_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        let diagnosis = match data {
            ErrorData::Code(code) => DomainDiagnosis::from_code(code),
            _ => None,
        };
        diagnosis
            .unwrap_or(DomainDiagnosis::InvalidChars)
            .describe(self.name(), label, f)
    }
}

#[cfg(feature = "dns")]
mod resolving {
    use super::{Domain, DomainDiagnosis};
    use crate::logging::RuleLog;
    use crate::resolver::{CnameResolver, DnsError, DnsLookup};
    use crate::rule::{ErrorData, Rule, RuleError, RuleOutcome};
    use crate::{ValidationContext, Value};

    impl Domain {
        /// Validates the syntax like [`Rule::validate`], then requires the
        /// name to resolve to at least one address through `resolver`.
        ///
        /// Stash defaults are returned without a lookup.
        pub async fn validate_resolving<L: DnsLookup>(
            &self,
            ctx: &ValidationContext<'_>,
            resolver: &CnameResolver<L>,
        ) -> RuleOutcome {
            let outcome = self.validate(ctx)?;
            if self.base.value(ctx).is_none() {
                return Ok(outcome);
            }
            let Some(Value::Text(ace)) = &outcome else {
                return Ok(outcome);
            };

            let host = ace.trim_end_matches('.');
            match resolver.resolve(host).await {
                Ok(_) => Ok(outcome),
                Err(e) => {
                    RuleLog::new(self.name(), self.field(), ctx).debug(format_args!("{}", e));
                    let diagnosis = match e {
                        DnsError::Timeout(_) => DomainDiagnosis::DnsTimeout,
                        _ => DomainDiagnosis::MissingDns,
                    };
                    Err(RuleError::validation(ErrorData::Code(diagnosis.code())))
                }
            }
        }
    }
}

impl_rule_builders!(Domain);
impl_default_key!(Domain);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DefaultCatalog;
    use crate::{ErrorKind, Locale, ParameterSet, Stash};
    use std::collections::HashMap;

    fn run(value: &str) -> RuleOutcome {
        let params = ParameterSet::new().with("f", value);
        let stash = Stash::new();
        Domain::new("f").validate(&ValidationContext::new(&params, &stash))
    }

    #[test]
    fn accepts_and_normalizes() {
        assert_eq!(run("www.Example.com"), Ok(Some(Value::from("www.example.com"))));
        assert_eq!(run("example.com."), Ok(Some(Value::from("example.com."))));
        assert_eq!(run("a-b.c1.example"), Ok(Some(Value::from("a-b.c1.example"))));
        assert_eq!(run("Bücher.de"), Ok(Some(Value::from("xn--bcher-kva.de"))));
    }

    #[test]
    fn diagnoses() {
        let cases = [
            ("example", DomainDiagnosis::InvalidLabelCount),
            ("example..com", DomainDiagnosis::EmptyLabel),
            ("example.com..", DomainDiagnosis::EmptyLabel),
            ("example.c0m", DomainDiagnosis::InvalidTld),
            ("example.c", DomainDiagnosis::InvalidTld),
            ("-example.com", DomainDiagnosis::DashStart),
            ("example-.com", DomainDiagnosis::DashEnd),
            ("1example.com", DomainDiagnosis::DigitStart),
            ("exa_mple.com", DomainDiagnosis::InvalidChars),
        ];
        for (input, expected) in cases {
            assert_eq!(check_domain(input), Err(expected), "{input}");
        }
    }

    #[test]
    fn length_limits() {
        let label = "a".repeat(64);
        assert_eq!(
            check_domain(&format!("{label}.com")),
            Err(DomainDiagnosis::LabelTooLong)
        );

        let long = format!("{}.com", vec!["a".repeat(60); 5].join("."));
        assert!(long.len() > MAX_NAME_LEN);
        assert_eq!(check_domain(&long), Err(DomainDiagnosis::TooLong));

        let fits = format!("{}.com", vec!["a".repeat(61); 3].join("."));
        assert!(check_domain(&fits).is_ok());
    }

    #[test]
    fn codes_round_trip_and_render() {
        for d in DomainDiagnosis::ALL {
            assert_eq!(DomainDiagnosis::from_code(d.code()), Some(d));
        }

        let err = run("example..com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_data(), &ErrorData::Code("empty-label"));

        let labels = HashMap::new();
        let locale = Locale::c();
        let f = Formatter::new(&DefaultCatalog, &locale, &labels);
        let rule = Domain::new("f").label("Host");
        assert_eq!(
            f.render(&rule, &err),
            "A section of the domain name in the “Host” field is empty. Check for two consecutive dots."
        );
    }

    #[cfg(feature = "dns")]
    mod resolving {
        use super::*;
        use crate::resolver::{CnameResolver, DnsError, DnsLookup};
        use async_trait::async_trait;
        use std::net::{IpAddr, Ipv4Addr};
        use std::time::Duration;

        #[derive(Debug)]
        struct Zone {
            known: &'static str,
        }

        #[async_trait]
        impl DnsLookup for Zone {
            async fn cname(&self, name: &str) -> Result<Option<String>, DnsError> {
                if name == "slow.example" {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
                Ok(None)
            }

            async fn addresses(&self, name: &str) -> Result<Vec<IpAddr>, DnsError> {
                if name == self.known {
                    Ok(vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))])
                } else {
                    Ok(Vec::new())
                }
            }
        }

        async fn resolve_field(value: &str) -> RuleOutcome {
            let resolver = CnameResolver::new(Zone {
                known: "example.org",
            });
            let params = ParameterSet::new().with("f", value);
            let stash = Stash::new().with("fallback", "unresolvable.invalid");
            let ctx = ValidationContext::new(&params, &stash);
            Domain::new("f")
                .default_key("fallback")
                .validate_resolving(&ctx, &resolver)
                .await
        }

        #[tokio::test]
        async fn resolvable_name_passes() {
            assert_eq!(
                resolve_field("Example.org.").await,
                Ok(Some(Value::from("example.org.")))
            );
        }

        #[tokio::test]
        async fn unknown_name_is_missing_from_dns() {
            let err = resolve_field("nowhere.example").await.unwrap_err();
            assert_eq!(err.error_data(), &ErrorData::Code("missing-dns"));
        }

        #[tokio::test(start_paused = true)]
        async fn slow_lookup_times_out() {
            let err = resolve_field("slow.example").await.unwrap_err();
            assert_eq!(err.error_data(), &ErrorData::Code("dns-timeout"));
        }

        #[tokio::test]
        async fn syntax_errors_skip_the_lookup() {
            let err = resolve_field("bad..example").await.unwrap_err();
            assert_eq!(err.error_data(), &ErrorData::Code("empty-label"));
        }

        #[tokio::test]
        async fn defaults_are_not_resolved() {
            assert_eq!(
                resolve_field("").await,
                Ok(Some(Value::from("unresolvable.invalid")))
            );
        }
    }
}
