//! Built-in validation rules.
//!
//! Every rule is a builder: construct it with `new(field, ..)`, refine it with
//! rule-specific options, then attach a label, custom messages or a stash
//! default key:
//!
//! ```
//! use request_validator::rules::{Integer, IntegerWidth};
//! use request_validator::Messages;
//!
//! let rule = Integer::new("age")
//!     .width(IntegerWidth::U8)
//!     .with_messages(Messages::new().label("Age"))
//!     .default_key("default_age");
//! ```
//!
//! Groups:
//! - presence: [`Required`], [`Filled`], [`Present`], [`Accepted`] and the
//!   conditional `Required*` rules
//! - comparison: [`Same`], [`Different`], [`Confirmed`], [`In`], [`NotIn`]
//! - numbers and sizes: [`Digits`], [`DigitsBetween`], [`Numeric`],
//!   [`Integer`], [`Min`], [`Max`], [`Between`], [`Size`]
//! - text: [`Alpha`], [`AlphaDash`], [`AlphaNum`], [`CharNotAllowed`],
//!   [`RegularExpression`]
//! - typed parsing: [`Boolean`], [`Date`], [`Time`], [`DateTime`], [`After`],
//!   [`Before`], [`Json`], [`Url`], [`Ip`], [`Domain`], [`Email`],
//!   [`FileSize`]

mod boolean;
mod chars;
mod compare;
mod digits;
mod domain;
mod email;
mod file_size;
mod ip;
mod json;
mod membership;
mod numeric;
mod pattern;
mod presence;
mod range;
mod required_if;
mod required_with;
mod temporal;
mod url;

pub use self::boolean::Boolean;
pub use self::chars::{Alpha, AlphaDash, AlphaNum, CharNotAllowed};
pub use self::compare::{Confirmed, Different, Same};
pub use self::digits::{is_digits, Digits, DigitsBetween};
pub use self::domain::{check_domain, Domain, DomainDiagnosis};
pub use self::email::Email;
pub use self::file_size::{FileSize, FileSizeUnits};
pub use self::ip::{Ip, IpConstraints};
pub use self::json::{Json, JsonExpectation};
pub use self::membership::{In, NotIn, ValueList};
pub use self::numeric::{Integer, IntegerWidth, Numeric};
pub use self::pattern::RegularExpression;
pub use self::presence::{Accepted, Filled, Present, Required};
pub use self::range::{Between, Max, Min, Size, Subject, Threshold};
pub use self::required_if::{RequiredIf, RequiredIfStash, RequiredUnless, RequiredUnlessStash};
pub use self::required_with::{RequiredWith, RequiredWithAll, RequiredWithout, RequiredWithoutAll};
pub use self::temporal::{After, Before, Comparison, Date, DateTime, Time, TimeZoneSpec};
pub use self::url::{Url, UrlConstraints};
