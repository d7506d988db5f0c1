use std::net::{Ipv4Addr, Ipv6Addr};

use crate::format::Formatter;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::rules::domain::check_domain;
use crate::{ValidationContext, Value};

/// Longest address that fits into an SMTP forward path.
const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Characters allowed in an unquoted local part besides letters and digits.
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

/// The field must be an email address.
///
/// The local part is a dot-atom or a quoted string. The domain is either a
/// domain name, checked like the [`Domain`](crate::rules::Domain) rule, or an
/// address literal such as `[192.0.2.1]` or `[IPv6:2001:db8::1]`. The address
/// is returned with its domain in lower-case ASCII form.
///
/// ```
/// use request_validator::rules::Email;
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext, Value};
///
/// let rule = Email::new("email");
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("email", "Ada.Lovelace@Example.ORG");
/// assert_eq!(
///     rule.validate(&ValidationContext::new(&params, &stash)),
///     Ok(Some(Value::from("Ada.Lovelace@example.org")))
/// );
///
/// let params = ParameterSet::new().with("email", "ada@@example.org");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Email {
    base: RuleBase,
}

impl Email {
    /// Creates the rule for `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
        }
    }
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c)
}

fn valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        return false;
    }

    if let Some(quoted) = local
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        let mut chars = quoted.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(' ' | '\t') => {}
                    Some(escaped) if escaped.is_ascii_graphic() => {}
                    _ => return false,
                },
                '"' => return false,
                ' ' | '\t' => {}
                c if c.is_ascii_graphic() => {}
                _ => return false,
            }
        }
        return true;
    }

    local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(is_atext))
}

fn normalize_domain(domain: &str) -> Option<String> {
    if let Some(literal) = domain
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let valid = match literal.strip_prefix("IPv6:") {
            Some(v6) => v6.parse::<Ipv6Addr>().is_ok(),
            None => literal.parse::<Ipv4Addr>().is_ok(),
        };
        return valid.then(|| domain.to_string());
    }

    if domain.ends_with('.') {
        return None;
    }
    check_domain(domain).ok()
}

/// Checks `value` as an email address and returns it with a normalized
/// domain.
pub(crate) fn check_email(value: &str) -> Option<String> {
    let (local, domain) = value.rsplit_once('@')?;
    if !valid_local_part(local) {
        return None;
    }
    let domain = normalize_domain(domain)?;
    let address = format!("{local}@{domain}");
    (address.len() <= MAX_ADDRESS_LEN).then_some(address)
}

impl Rule for Email {
    fn name(&self) -> &'static str {
        "Email"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        check_email(v)
            .map(|address| Some(Value::Text(address)))
            .ok_or_else(|| RuleError::validation(ErrorData::None))
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "The email address in the “%1” field is not valid.",
                &[l],
            ),
            None => f.tr(self.name(), "This is not a valid email address.", &[]),
        }
    }
}

impl_rule_builders!(Email);
impl_default_key!(Email);
