//! Rendering of rule errors into human-readable messages.

use std::collections::HashMap;
use std::fmt;

use crate::locale::PluralCategory;
use crate::rule::{Rule, RuleError};
use crate::{ErrorKind, Locale};

/// Source of translated message templates.
///
/// Templates use `%1`..`%9` for positional arguments and `%n` for the count
/// of plural messages. The `context` is the name of the rule that produced
/// the message, so catalogs can keep identical source strings apart.
///
/// The default methods return the English source text, which is what
/// [`DefaultCatalog`] uses.
pub trait Catalog: fmt::Debug + Send + Sync {
    /// Translates a message template.
    fn translate(&self, context: &str, source: &str) -> String {
        let _ = context;
        source.to_string()
    }

    /// Translates a plural message template for the given plural category.
    fn translate_plural(
        &self,
        context: &str,
        singular: &str,
        plural: &str,
        category: PluralCategory,
    ) -> String {
        let _ = context;
        match category {
            PluralCategory::One => singular.to_string(),
            _ => plural.to_string(),
        }
    }

    /// Returns the word joining the last two items of a list.
    fn list_conjunction(&self) -> String {
        "and".to_string()
    }
}

/// Catalog that returns the built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCatalog;

impl Catalog for DefaultCatalog {}

/// Renders rule errors into final messages.
///
/// Precedence for every error:
/// 1. the rule's custom message for the error kind,
/// 2. the rule's generic message, which chooses a "with label" or "without
///    label" template depending on whether a label could be resolved,
/// 3. interpolation of rule-specific error data into that template.
///
/// Labels resolve from the rule's own [`Messages`](crate::Messages) first,
/// then from the validator's label dictionary.
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a> {
    catalog: &'a dyn Catalog,
    locale: &'a Locale,
    labels: &'a HashMap<String, String>,
}

impl<'a> Formatter<'a> {
    /// Creates a formatter.
    pub fn new(
        catalog: &'a dyn Catalog,
        locale: &'a Locale,
        labels: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            catalog,
            locale,
            labels,
        }
    }

    /// Returns the locale used for plural selection.
    pub fn locale(&self) -> &'a Locale {
        self.locale
    }

    /// Renders the final message for `error` produced by `rule`.
    pub fn render(&self, rule: &dyn Rule, error: &RuleError) -> String {
        if let Some(custom) = rule.messages().custom_for(error.kind()) {
            return custom.to_string();
        }

        let label = self.label_for(rule);
        match error.kind() {
            ErrorKind::Validation => rule.generic_error_message(label, error.error_data(), self),
            ErrorKind::Parsing => rule.generic_parsing_error_message(label, error.error_data(), self),
            ErrorKind::ValidationData => rule.generic_data_error_message(label, error.error_data(), self),
        }
    }

    /// Resolves the label of the rule's field.
    pub fn label_for<'r>(&'r self, rule: &'r dyn Rule) -> Option<&'r str> {
        rule.messages().label_text().or_else(|| {
            self.labels
                .get(rule.field())
                .map(String::as_str)
                .filter(|l| !l.is_empty())
        })
    }

    /// Returns the label of an arbitrary field, falling back to its name.
    pub fn field_label(&self, field: &str) -> String {
        self.labels
            .get(field)
            .filter(|l| !l.is_empty())
            .cloned()
            .unwrap_or_else(|| field.to_string())
    }

    /// Translates `source` and substitutes `%1`..`%9` with `args`.
    pub fn tr(&self, context: &str, source: &str, args: &[&str]) -> String {
        substitute(&self.catalog.translate(context, source), args, None)
    }

    /// Translates a plural message for `n` and substitutes `%n` and `args`.
    pub fn tr_n(
        &self,
        context: &str,
        singular: &str,
        plural: &str,
        n: u64,
        args: &[&str],
    ) -> String {
        let category = self.locale.plural_category(n);
        let template = self
            .catalog
            .translate_plural(context, singular, plural, category);
        substitute(&template, args, Some(n))
    }

    /// Joins `items` into a natural-language list: `a`, `a and b`,
    /// `a, b and c`.
    pub fn separated_list(&self, items: &[String]) -> String {
        match items {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!(
                "{} {} {}",
                init.join(", "),
                self.catalog.list_conjunction(),
                last
            ),
        }
    }
}

/// Replaces `%1`..`%9` with `args` and `%n` with `count` in a single pass.
///
/// Placeholders without a matching argument are kept verbatim, and text
/// inserted from arguments is never scanned again.
pub(crate) fn substitute(template: &str, args: &[&str], count: Option<u64>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('n') if count.is_some() => {
                chars.next();
                if let Some(n) = count {
                    out.push_str(&n.to_string());
                }
            }
            Some(d @ '1'..='9') => {
                let index = (d as usize) - ('1' as usize);
                match args.get(index) {
                    Some(arg) => {
                        chars.next();
                        out.push_str(arg);
                    }
                    None => out.push('%'),
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Formats a threshold for messages: whole numbers without a fraction.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
