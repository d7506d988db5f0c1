use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bitflags::bitflags;

use crate::format::Formatter;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

bitflags! {
    /// Restrictions applied by the [`Ip`] rule.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IpConstraints: u8 {
        /// Only IPv4 addresses.
        const IPV4_ONLY = 1 << 0;
        /// Only IPv6 addresses.
        const IPV6_ONLY = 1 << 1;
        /// Reject private and link-local ranges.
        const NO_PRIVATE_RANGE = 1 << 2;
        /// Reject loopback, documentation, translation and other reserved ranges.
        const NO_RESERVED_RANGE = 1 << 3;
        /// Reject multicast addresses.
        const NO_MULTICAST = 1 << 4;
        /// Only publicly routable unicast addresses.
        const PUBLIC_ONLY = Self::NO_PRIVATE_RANGE.bits()
            | Self::NO_RESERVED_RANGE.bits()
            | Self::NO_MULTICAST.bits();
    }
}

const V4_PRIVATE: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
];

const V4_RESERVED: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(192, 0, 0, 0), 24),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(192, 88, 99, 0), 24),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
];

const V4_MULTICAST: (Ipv4Addr, u8) = (Ipv4Addr::new(224, 0, 0, 0), 4);

const V6_PRIVATE: &[(Ipv6Addr, u8)] = &[
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
];

const V6_RESERVED: &[(Ipv6Addr, u8)] = &[
    (Ipv6Addr::UNSPECIFIED, 128),
    (Ipv6Addr::LOCALHOST, 128),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0), 96),
    (Ipv6Addr::new(0x100, 0, 0, 0, 0, 0, 0, 0), 64),
    (Ipv6Addr::new(0x64, 0xff9b, 0, 0, 0, 0, 0, 0), 96),
    (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0x2001, 0x10, 0, 0, 0, 0, 0, 0), 28),
    (Ipv6Addr::new(0x2001, 0x20, 0, 0, 0, 0, 0, 0), 28),
    (Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0x2002, 0, 0, 0, 0, 0, 0, 0), 16),
];

const V6_MULTICAST: (Ipv6Addr, u8) = (Ipv6Addr::new(0xff00, 0, 0, 0, 0, 0, 0, 0), 8);

fn v4_in(addr: Ipv4Addr, (net, prefix): (Ipv4Addr, u8)) -> bool {
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    u32::from(addr) & mask == u32::from(net) & mask
}

fn v6_in(addr: Ipv6Addr, (net, prefix): (Ipv6Addr, u8)) -> bool {
    let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
    u128::from(addr) & mask == u128::from(net) & mask
}

impl IpConstraints {
    fn permits(self, addr: IpAddr) -> bool {
        match addr {
            IpAddr::V4(a) => {
                if self.contains(Self::IPV6_ONLY) {
                    return false;
                }
                !(self.contains(Self::NO_PRIVATE_RANGE) && V4_PRIVATE.iter().any(|n| v4_in(a, *n))
                    || self.contains(Self::NO_RESERVED_RANGE)
                        && V4_RESERVED.iter().any(|n| v4_in(a, *n))
                    || self.contains(Self::NO_MULTICAST) && v4_in(a, V4_MULTICAST))
            }
            IpAddr::V6(a) => {
                if self.contains(Self::IPV4_ONLY) {
                    return false;
                }
                !(self.contains(Self::NO_PRIVATE_RANGE) && V6_PRIVATE.iter().any(|n| v6_in(a, *n))
                    || self.contains(Self::NO_RESERVED_RANGE)
                        && V6_RESERVED.iter().any(|n| v6_in(a, *n))
                    || self.contains(Self::NO_MULTICAST) && v6_in(a, V6_MULTICAST))
            }
        }
    }
}

/// The field must be an IPv4 or IPv6 address.
///
/// IPv4 addresses must have four dotted decimal parts. The value is returned
/// as [`Value::Text`].
///
/// ```
/// use request_validator::rules::{Ip, IpConstraints};
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
///
/// let rule = Ip::new("server").constraints(IpConstraints::PUBLIC_ONLY);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("server", "8.8.8.8");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_ok());
///
/// let params = ParameterSet::new().with("server", "192.168.1.10");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Ip {
    base: RuleBase,
    constraints: IpConstraints,
}

impl Ip {
    /// Creates the rule for `field`, accepting any address.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            constraints: IpConstraints::empty(),
        }
    }

    /// Sets the constraints.
    pub fn constraints(mut self, constraints: IpConstraints) -> Self {
        self.constraints = constraints;
        self
    }
}

impl Rule for Ip {
    fn name(&self) -> &'static str {
        "Ip"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        match v.parse::<IpAddr>() {
            Ok(addr) if self.constraints.permits(addr) => Ok(Some(Value::from(v))),
            _ => Err(RuleError::validation(ErrorData::None)),
        }
    }

    fn generic_error_message(&self, label: Option<&str>, _: &ErrorData, f: &Formatter<'_>) -> String {
        match label {
            Some(l) => f.tr(
                self.name(),
                "You have to enter a valid IP address into the “%1” field.",
                &[l],
            ),
            None => f.tr(self.name(), "Not a valid IP address.", &[]),
        }
    }
}

impl_rule_builders!(Ip);
impl_default_key!(Ip);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterSet, Stash};

    fn check(constraints: IpConstraints, value: &str) -> bool {
        let params = ParameterSet::new().with("f", value);
        let stash = Stash::new();
        Ip::new("f")
            .constraints(constraints)
            .validate(&ValidationContext::new(&params, &stash))
            .is_ok()
    }

    #[test]
    fn syntax() {
        let none = IpConstraints::empty();
        assert!(check(none, "192.0.2.1"));
        assert!(check(none, "2001:db8::1"));
        assert!(!check(none, "192.168.2"));
        assert!(!check(none, "256.1.1.1"));
        assert!(!check(none, "example.org"));
    }

    #[test]
    fn protocol_restrictions() {
        assert!(!check(IpConstraints::IPV4_ONLY, "::1"));
        assert!(check(IpConstraints::IPV4_ONLY, "10.0.0.1"));
        assert!(!check(IpConstraints::IPV6_ONLY, "10.0.0.1"));
        assert!(check(IpConstraints::IPV6_ONLY, "fe80::1"));
    }

    #[test]
    fn private_ranges() {
        let c = IpConstraints::NO_PRIVATE_RANGE;
        for addr in ["10.1.2.3", "172.31.255.255", "192.168.0.1", "169.254.10.10", "fd00::1", "fe80::1"] {
            assert!(!check(c, addr), "{addr} should be private");
        }
        assert!(check(c, "172.32.0.1"));
        assert!(check(c, "192.169.0.1"));
    }

    #[test]
    fn reserved_ranges() {
        let c = IpConstraints::NO_RESERVED_RANGE;
        for addr in ["127.0.0.1", "0.1.2.3", "100.64.0.1", "203.0.113.5", "255.255.255.255", "::1", "::", "2001:db8::1", "::ffff:1.2.3.4"] {
            assert!(!check(c, addr), "{addr} should be reserved");
        }
        assert!(check(c, "8.8.8.8"));
        assert!(check(c, "2a00:1450::1"));
    }

    #[test]
    fn multicast_and_public_only() {
        assert!(!check(IpConstraints::NO_MULTICAST, "224.0.0.1"));
        assert!(!check(IpConstraints::NO_MULTICAST, "ff02::1"));
        assert!(check(IpConstraints::NO_MULTICAST, "10.0.0.1"));

        assert!(!check(IpConstraints::PUBLIC_ONLY, "10.0.0.1"));
        assert!(!check(IpConstraints::PUBLIC_ONLY, "239.1.1.1"));
        assert!(check(IpConstraints::PUBLIC_ONLY, "1.1.1.1"));
    }

    #[test]
    fn subnet_math() {
        assert!(v4_in(Ipv4Addr::new(1, 2, 3, 4), (Ipv4Addr::UNSPECIFIED, 0)));
        assert!(v4_in(Ipv4Addr::BROADCAST, (Ipv4Addr::BROADCAST, 32)));
        assert!(!v4_in(Ipv4Addr::new(255, 255, 255, 254), (Ipv4Addr::BROADCAST, 32)));
    }
}
