//! Sign-up form validation.
//!
//! This example validates two urlencoded form submissions against one rule
//! chain:
//! 1. Build a `Validator` with labels and rules for every field
//! 2. Validate a correct submission and read the typed values
//! 3. Validate a broken submission and print the messages per field
//! 4. Serialize the report as it would be returned to a client
//!
//! Run with: `cargo run --example form_validation`

use request_validator::rules::{
    Accepted, Between, Confirmed, Date, Email, FileSize, Integer, IntegerWidth, Min, Required,
    Subject, Threshold,
};
use request_validator::{ParameterSet, Stash, Validator};

fn signup() -> Validator {
    Validator::new()
        .labels([
            ("username", "Username"),
            ("email", "E-Mail"),
            ("password", "Password"),
            ("age", "Age"),
            ("birthday", "Birthday"),
            ("avatar_size", "Avatar size"),
        ])
        .rule(Required::new("username"))
        .rule(Min::new("username", Subject::Length, 3))
        .rule(Required::new("email"))
        .rule(Email::new("email"))
        .rule(Required::new("password"))
        .rule(Min::new("password", Subject::Length, Threshold::stash("min_password")))
        .rule(Confirmed::new("password"))
        .rule(Integer::new("age").width(IntegerWidth::U8))
        .rule(Between::new("age", Subject::Unsigned, 16, 120))
        .rule(Date::new("birthday").format("%Y-%m-%d"))
        .rule(FileSize::new("avatar_size").max(Threshold::stash("max_avatar")))
        .rule(Accepted::new("terms"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    println!("=== Form Validation Example ===\n");

    let validator = signup();
    let stash = Stash::new()
        .with("min_password", 8_u64)
        .with("max_avatar", 2_000_000_u64);

    // Scenario 1: a complete and correct submission
    println!("--- Scenario 1: Valid submission ---");

    let params = ParameterSet::from_urlencoded(
        "username=ada&email=Ada%40Example.ORG&password=analytical&password_confirmation=analytical\
         &age=36&birthday=1815-12-10&avatar_size=1.5+MiB&terms=yes",
    );
    let report = validator.validate(&params, &stash);

    println!("valid: {}", report.is_valid());
    for (field, value) in report.values() {
        println!("  {field} = {value:?}");
    }

    // Scenario 2: several fields fail at once
    println!("\n--- Scenario 2: Invalid submission ---");

    let params = ParameterSet::from_urlencoded(
        "username=al&email=al%40localhost&password=short&password_confirmation=shorter\
         &age=300&birthday=10.12.1815&avatar_size=3+GB",
    );
    let report = validator.validate(&params, &stash);

    println!("valid: {}", report.is_valid());
    for field in report.error_fields() {
        for message in report.errors_for(field) {
            println!("  ✗ {field}: {message}");
        }
    }

    // Scenario 3: the report as a client would receive it
    println!("\n--- Scenario 3: JSON report ---");

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("could not serialize report: {e}"),
    }

    println!("\n=== Example Complete ===");
}
