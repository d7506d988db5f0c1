use std::collections::HashMap;

use crate::Value;

/// Per-request side channel of typed values.
///
/// The stash holds state a request handler computed before validation:
/// default values for absent fields, comparison lists, time zones, and
/// comparison values for stash-driven rules. It is created per request and
/// dropped with it.
///
/// # Examples
///
/// ```
/// use request_validator::{Stash, Value};
///
/// let mut stash = Stash::new();
/// stash.insert("default_country", "DE");
/// stash.insert("allowed_colors", vec!["red", "green"]);
///
/// assert_eq!(stash.get("default_country"), Some(&Value::from("DE")));
/// assert!(stash.contains("allowed_colors"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stash {
    values: HashMap<String, Value>,
}

impl Stash {
    /// Creates an empty stash.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns `true` if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the stash is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces() {
        let mut stash = Stash::new();
        stash.insert("k", 1_i64);
        stash.insert("k", "two");

        assert_eq!(stash.get("k"), Some(&Value::from("two")));
        assert_eq!(stash.len(), 1);
    }

    #[test]
    fn remove_and_contains() {
        let mut stash = Stash::new().with("tz", "Europe/Berlin");

        assert!(stash.contains("tz"));
        assert_eq!(stash.remove("tz"), Some(Value::from("Europe/Berlin")));
        assert!(stash.is_empty());
        assert_eq!(stash.get("tz"), None);
    }
}
