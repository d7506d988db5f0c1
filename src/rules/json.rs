use crate::format::Formatter;
use crate::rule::{
    impl_default_key, impl_rule_builders, ErrorData, Rule, RuleBase, RuleError, RuleOutcome,
};
use crate::{ValidationContext, Value};

/// The JSON document shape a [`Json`] rule accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonExpectation {
    /// Any valid JSON value.
    #[default]
    Any,
    /// A top-level array.
    Array,
    /// A top-level object.
    Object,
}

/// The field must contain valid JSON, returned as [`Value::Json`].
///
/// ```
/// use request_validator::rules::{Json, JsonExpectation};
/// use request_validator::{ParameterSet, Rule, Stash, ValidationContext};
///
/// let rule = Json::new("payload").expect(JsonExpectation::Object);
/// let stash = Stash::new();
///
/// let params = ParameterSet::new().with("payload", r#"{"id": 7}"#);
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_ok());
///
/// let params = ParameterSet::new().with("payload", "[1, 2]");
/// assert!(rule.validate(&ValidationContext::new(&params, &stash)).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Json {
    base: RuleBase,
    expectation: JsonExpectation,
}

impl Json {
    /// Creates the rule for `field`, accepting any JSON value.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(field),
            expectation: JsonExpectation::Any,
        }
    }

    /// Restricts the accepted top-level shape.
    pub fn expect(mut self, expectation: JsonExpectation) -> Self {
        self.expectation = expectation;
        self
    }
}

impl Rule for Json {
    fn name(&self) -> &'static str {
        "Json"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> RuleOutcome {
        let Some(v) = self.base.value(ctx) else {
            return self.base.default_value(ctx, self.name());
        };

        let json: serde_json::Value = serde_json::from_str(v)
            .map_err(|e| RuleError::validation(ErrorData::Text(e.to_string())))?;

        let fits = match self.expectation {
            JsonExpectation::Any => true,
            JsonExpectation::Array => json.is_array(),
            JsonExpectation::Object => json.is_object(),
        };

        if fits {
            Ok(Some(Value::Json(json)))
        } else {
            Err(RuleError::validation(ErrorData::None))
        }
    }

    fn generic_error_message(&self, label: Option<&str>, data: &ErrorData, f: &Formatter<'_>) -> String {
        if let ErrorData::Text(reason) = data {
            return match label {
                Some(l) => f.tr(
                    self.name(),
                    "The data entered in the “%1” field is not valid JSON: %2",
                    &[l, reason],
                ),
                None => f.tr(self.name(), "Invalid JSON data: %1", &[reason]),
            };
        }

        match (self.expectation, label) {
            (JsonExpectation::Array, Some(l)) => f.tr(
                self.name(),
                "The data entered in the “%1” field is not a JSON array.",
                &[l],
            ),
            (JsonExpectation::Array, None) => f.tr(self.name(), "Not a JSON array.", &[]),
            (_, Some(l)) => f.tr(
                self.name(),
                "The data entered in the “%1” field is not a JSON object.",
                &[l],
            ),
            (_, None) => f.tr(self.name(), "Not a JSON object.", &[]),
        }
    }
}

impl_rule_builders!(Json);
impl_default_key!(Json);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterSet, Stash};
    use serde_json::json;

    fn run(rule: &Json, value: &str) -> RuleOutcome {
        let params = ParameterSet::new().with("f", value);
        let stash = Stash::new();
        rule.validate(&ValidationContext::new(&params, &stash))
    }

    #[test]
    fn any_value() {
        let rule = Json::new("f");
        assert_eq!(run(&rule, "42"), Ok(Some(Value::Json(json!(42)))));
        assert_eq!(run(&rule, r#""text""#), Ok(Some(Value::Json(json!("text")))));
        assert_eq!(
            run(&rule, r#"{"a": [1, 2]}"#),
            Ok(Some(Value::Json(json!({"a": [1, 2]}))))
        );
    }

    #[test]
    fn parse_error_carries_reason() {
        let err = run(&Json::new("f"), "{broken").unwrap_err();
        assert!(matches!(err.error_data(), ErrorData::Text(reason) if !reason.is_empty()));
    }

    #[test]
    fn shape_mismatch() {
        let rule = Json::new("f").expect(JsonExpectation::Array);
        assert!(run(&rule, "[]").is_ok());
        assert_eq!(
            run(&rule, "{}"),
            Err(RuleError::validation(ErrorData::None))
        );
    }

    #[test]
    fn messages() {
        use crate::format::DefaultCatalog;
        use crate::Locale;
        use std::collections::HashMap;

        let labels = HashMap::new();
        let locale = Locale::c();
        let f = Formatter::new(&DefaultCatalog, &locale, &labels);

        let rule = Json::new("f").expect(JsonExpectation::Object).label("Payload");
        let err = run(&rule, "[1]").unwrap_err();
        assert_eq!(
            f.render(&rule, &err),
            "The data entered in the “Payload” field is not a JSON object."
        );
    }
}
