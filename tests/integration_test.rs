use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use request_validator::rules::{
    Accepted, After, Between, Comparison, Confirmed, Date, Digits, Domain, Email, FileSize, In,
    Integer, IntegerWidth, Json, Required, RequiredWith, Subject, ValueList,
};
use request_validator::{
    Catalog, ErrorKind, Locale, Messages, ParameterSet, PluralCategory, Stash, ValidationContext,
    Validator, ValidatorConfig, Value,
};

fn signup() -> Validator {
    Validator::new()
        .labels([("username", "Username"), ("age", "Age"), ("password", "Password")])
        .rule(Required::new("username"))
        .rule(Required::new("password"))
        .rule(Confirmed::new("password"))
        .rule(Integer::new("age").width(IntegerWidth::U8))
        .rule(Between::new("age", Subject::Unsigned, 16, 120))
        .rule(Accepted::new("terms"))
}

#[test]
fn signup_form_passes() {
    let params = ParameterSet::from_urlencoded(
        "username=ada&password=s3cret&password_confirmation=s3cret&age=36&terms=on",
    );
    let report = signup().validate(&params, &Stash::new());

    assert!(report.is_valid(), "{:?}", report.error_strings());
    assert_eq!(report.value("age"), Some(&Value::Unsigned(36)));
    assert_eq!(report.value("terms"), Some(&Value::Bool(true)));
    assert_eq!(report.value("username"), Some(&Value::from("ada")));
}

#[test]
fn signup_form_collects_every_error() {
    let params = ParameterSet::from_urlencoded("password=a&password_confirmation=b&age=12");
    let report = signup().validate(&params, &Stash::new());

    assert!(!report.is_valid());
    assert_eq!(report.error_fields(), vec!["username", "password", "age", "terms"]);
    assert_eq!(
        report.errors_for("username"),
        vec!["You must fill in the “Username” field."]
    );
    assert!(report.data_errors().is_empty());
}

#[test]
fn custom_message_wins_over_generated_one() {
    let validator = Validator::new().rule(
        Required::new("email").with_messages(
            Messages::new()
                .label("E-Mail")
                .validation_error("We need your e-mail address."),
        ),
    );
    let report = validator.validate(&ParameterSet::new(), &Stash::new());
    assert_eq!(report.error_strings(), vec!["We need your e-mail address."]);
}

#[test]
fn default_from_stash_is_not_revalidated() {
    let validator = Validator::new().rule(Integer::new("page").default_key("default_page"));
    let stash = Stash::new().with("default_page", "first");

    let report = validator.validate(&ParameterSet::new(), &stash);
    assert!(report.is_valid());
    assert_eq!(report.value("page"), Some(&Value::from("first")));

    let report = validator.validate(&ParameterSet::new(), &Stash::new());
    assert!(report.is_valid());
    assert_eq!(report.value("page"), None);
}

#[test]
fn membership_list_from_stash() {
    let validator = Validator::new().rule(In::new("color", ValueList::stash("colors")));
    let params = ParameterSet::new().with("color", "teal");

    let stash = Stash::new().with("colors", vec!["red", "green", "blue"]);
    let report = validator.validate(&params, &stash);
    assert_eq!(
        report.errors_for("color"),
        vec!["Has to be one of the following values: red, green and blue"]
    );

    let report = validator.validate(&params, &Stash::new());
    assert_eq!(report.data_errors().len(), 1);
    assert_eq!(report.data_errors()[0].kind(), ErrorKind::ValidationData);
}

#[test]
fn conditional_requiredness() {
    let validator = Validator::new().rule(RequiredWith::new("street", ["zip", "city"]));

    let report = validator.validate(&ParameterSet::new().with("city", "Berlin"), &Stash::new());
    assert_eq!(report.error_fields(), vec!["street"]);

    let report = validator.validate(&ParameterSet::new(), &Stash::new());
    assert!(report.is_valid());
}

#[test]
fn german_locale_dates() {
    let validator = Validator::new()
        .locale(Locale::new("de_DE"))
        .rule(Date::new("birthday"))
        .rule(After::new(
            "birthday",
            Comparison::from(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()),
        ));

    let report = validator.validate(&ParameterSet::new().with("birthday", "20.05.95"), &Stash::new());
    assert!(report.is_valid());
    assert_eq!(
        report.value("birthday"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(1995, 5, 20).unwrap()))
    );
}

#[test]
fn context_carries_locale_and_origin() {
    let validator = Validator::new().rule(Date::new("d"));
    let params = ParameterSet::new().with("d", "20/05/1995");
    let stash = Stash::new();
    let gb = Locale::new("en_GB");
    let ctx = ValidationContext::new(&params, &stash)
        .with_locale(&gb)
        .with_origin("Users::create");

    assert!(validator.validate_with(&ctx).is_valid());
    assert!(!validator.validate(&params, &stash).is_valid());
}

#[derive(Debug)]
struct German;

impl Catalog for German {
    fn translate(&self, _context: &str, source: &str) -> String {
        match source {
            "You must fill in the “%1” field." => "Das Feld „%1“ muss ausgefüllt werden.".into(),
            other => other.into(),
        }
    }

    fn translate_plural(
        &self,
        _context: &str,
        _singular: &str,
        _plural: &str,
        category: PluralCategory,
    ) -> String {
        match category {
            PluralCategory::One => "„%1“ muss genau %n Ziffer enthalten.".into(),
            _ => "„%1“ muss genau %n Ziffern enthalten.".into(),
        }
    }
}

#[test]
fn catalog_translates_and_pluralizes() {
    let validator = Validator::new()
        .catalog(Arc::new(German))
        .locale(Locale::new("de_DE"))
        .label("name", "Name")
        .label("pin", "PIN")
        .rule(Required::new("name"))
        .rule(Digits::new("pin").length(4))
        .rule(Digits::new("check").label("Prüfziffer").length(1));

    let params = ParameterSet::new().with("pin", "12a4").with("check", "x");
    let report = validator.validate(&params, &Stash::new());

    assert_eq!(
        report.error_strings(),
        vec![
            "Das Feld „Name“ muss ausgefüllt werden.",
            "„PIN“ muss genau 4 Ziffern enthalten.",
            "„Prüfziffer“ muss genau 1 Ziffer enthalten.",
        ]
    );
}

#[test]
fn json_values_reach_the_report() {
    let validator = Validator::new().rule(Json::new("filter"));
    let params = ParameterSet::new().with("filter", r#"{"tags": ["a", "b"]}"#);
    let report = validator.validate(&params, &Stash::new());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["values"]["filter"]["tags"][1], "b");
}

#[test]
fn shared_between_threads() {
    let validator = Arc::new(signup());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let params = ParameterSet::new()
                    .with("username", format!("user{i}"))
                    .with("age", (20 + i).to_string());
                validator.validate(&params, &Stash::new())
            })
        })
        .collect();

    for handle in handles {
        let report = handle.join().unwrap();
        assert_eq!(report.error_fields(), vec!["password", "terms"]);
    }
}

#[test]
fn configured_validator_fills_stash() {
    let config = ValidatorConfig::from_toml_str(
        r#"
        fill_stash_on_error = true

        [labels]
        username = "Username"
        "#,
    )
    .unwrap();
    let validator = Validator::from_config(&config).rule(Required::new("username"));

    let params = ParameterSet::new()
        .with("username", "   ")
        .with("email", "ada@example.org")
        .with("Password", "hunter2");
    let mut stash = Stash::new();
    let report = validator.validate_into_stash(&params, &mut stash);

    assert!(!report.is_valid());
    assert_eq!(stash.get("email"), Some(&Value::from("ada@example.org")));
    assert!(!stash.contains("Password"));
    assert_eq!(
        stash.get("validationErrorStrings"),
        Some(&Value::List(vec!["You must fill in the “Username” field.".into()]))
    );
}

#[test]
fn contact_and_upload_fields() {
    let validator = Validator::new()
        .labels([("email", "E-Mail"), ("site", "Website"), ("upload", "Upload")])
        .rule(Email::new("email"))
        .rule(Domain::new("site"))
        .rule(FileSize::new("upload").max(2_000_000_u64));

    let params = ParameterSet::new()
        .with("email", "ada@Example.ORG")
        .with("site", "Bücher.de")
        .with("upload", "1.5 MB");
    let report = validator.validate(&params, &Stash::new());
    assert!(report.is_valid(), "{:?}", report.error_strings());
    assert_eq!(report.value("email"), Some(&Value::from("ada@example.org")));
    assert_eq!(report.value("site"), Some(&Value::from("xn--bcher-kva.de")));
    assert_eq!(report.value("upload"), Some(&Value::Unsigned(1_500_000)));

    let params = ParameterSet::new()
        .with("email", "ada@localhost")
        .with("site", "-bad.example")
        .with("upload", "3 MB");
    let report = validator.validate(&params, &Stash::new());
    assert_eq!(report.error_fields(), vec!["email", "site", "upload"]);
    assert_eq!(
        report.errors_for("email"),
        vec!["The email address in the “E-Mail” field is not valid."]
    );
    assert!(report.data_errors().is_empty());
}
