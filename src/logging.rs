use std::fmt;

use crate::ValidationContext;

/// A logger scoped to one rule evaluation.
///
/// Every record carries the rule name, the field and, when the pass has one,
/// the origin (controller/action) so misconfigured rules can be traced back to
/// the action that declared them.
///
/// Level conventions used by the built-in rules:
/// - `debug`: user input failed a rule
/// - `warn`: a rule is misconfigured or its comparison data is unusable
#[derive(Debug, Clone, Copy)]
pub struct RuleLog<'a> {
    rule: &'static str,
    field: &'a str,
    origin: &'a str,
}

impl<'a> RuleLog<'a> {
    /// Creates a logger for `rule` validating `field` within `ctx`.
    pub fn new(rule: &'static str, field: &'a str, ctx: &ValidationContext<'a>) -> Self {
        Self {
            rule,
            field,
            origin: ctx.origin().unwrap_or("-"),
        }
    }

    /// Returns the rule name attached to records.
    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(rule = self.rule, field = %self.field, origin = %self.origin, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(rule = self.rule, field = %self.field, origin = %self.origin, "{}", args);
    }
}
