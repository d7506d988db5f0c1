//! Composable validation of request parameters.
//!
//! This crate checks the parameters of an incoming request against a chain of
//! rules and produces, in one pass:
//! - **Typed values**: rules that parse their input (numbers, dates, URLs,
//!   JSON) hand back the parsed [`Value`]
//! - **Field-scoped errors**: every failing rule yields a human-readable
//!   message for its field, rendered through a translatable [`Catalog`]
//! - **Misconfiguration signals**: rules with unusable configuration report a
//!   distinct [`ErrorKind::ValidationData`] so they are fixed, not shown
//!
//! # Core Types
//!
//! - [`ParameterSet`]: the request's ordered parameter multimap
//! - [`Stash`]: per-request side-channel of typed values (defaults, lists)
//! - [`Rule`]: one check on one field; built-in rules live in [`rules`]
//! - [`Validator`]: an ordered chain of rules with labels and flags
//! - [`ValidationReport`]: values, errors and validity of one pass
//!
//! # Examples
//!
//! ```
//! use request_validator::rules::{Between, Integer, Required, Subject, Url, UrlConstraints};
//! use request_validator::{ParameterSet, Stash, Validator, Value};
//!
//! let validator = Validator::new()
//!     .label("age", "Age")
//!     .rule(Required::new("age"))
//!     .rule(Integer::new("age"))
//!     .rule(Between::new("age", Subject::Signed, 18, 130))
//!     .rule(Url::new("homepage").constraints(UrlConstraints::WEBSITE_ONLY));
//!
//! let params = ParameterSet::from_urlencoded("age=42&homepage=ftp%3A%2F%2Fexample.org");
//! let report = validator.validate(&params, &Stash::new());
//!
//! assert!(!report.is_valid());
//! assert_eq!(report.value("age"), Some(&Value::Integer(42)));
//! assert_eq!(report.error_fields(), vec!["homepage"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod datetime;
mod error;
mod format;
mod locale;
mod logging;
mod messages;
mod params;
mod report;
mod rule;
pub mod rules;
mod stash;
mod validator;
mod value;

#[cfg(feature = "dns")]
pub mod resolver;

pub use config::ValidatorConfig;
pub use context::ValidationContext;
pub use error::{ConfigError, ErrorKind, ValidationError};
pub use format::{Catalog, DefaultCatalog, Formatter};
pub use locale::{Locale, PluralCategory};
pub use logging::RuleLog;
pub use messages::Messages;
pub use params::ParameterSet;
pub use report::{FieldReport, FieldResult, ValidationReport};
pub use rule::{ErrorData, Rule, RuleBase, RuleError, RuleOutcome};
pub use stash::Stash;
pub use validator::{Validator, ERROR_FIELDS_KEY, ERROR_STRINGS_KEY};
pub use value::Value;
