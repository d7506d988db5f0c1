//! Request parameters as an ordered multimap.

/// Ordered multimap of request parameters.
///
/// Keys may repeat (multi-select form fields, repeated query keys). The set
/// keeps insertion order, so [`values`](Self::values) yields every value of a
/// key in the order it was received, while [`value`](Self::value) returns the
/// most recently inserted one.
///
/// A `ParameterSet` is only borrowed during validation; rules never modify it.
///
/// # Examples
///
/// ```
/// use request_validator::ParameterSet;
///
/// let params = ParameterSet::from_urlencoded("color=red&color=blue&name=Ada+Lovelace");
///
/// assert_eq!(params.value("name"), Some("Ada Lovelace"));
/// assert_eq!(params.value("color"), Some("blue"));
/// assert_eq!(params.values("color").collect::<Vec<_>>(), vec!["red", "blue"]);
/// assert!(!params.contains("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// `+` decodes to a space and percent escapes are decoded. Invalid UTF-8
    /// in escapes is replaced rather than rejected, matching how request
    /// parsers treat malformed form bodies. Empty segments are skipped and a
    /// key without `=` gets an empty value.
    pub fn from_urlencoded(input: &str) -> Self {
        let mut params = Self::new();
        for segment in input.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once('=') {
                Some((k, v)) => (k, v),
                None => (segment, ""),
            };
            params.insert(decode_component(key), decode_component(value));
        }
        params
    }

    /// Appends a value for `key`, keeping any existing values.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the most recently inserted value for `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all values for `key` in insertion order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if `key` was submitted, whatever its content.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Iterates over all key/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of key/value pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no parameters were submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_returns_last_inserted() {
        let params = ParameterSet::new().with("a", "1").with("b", "2").with("a", "3");

        assert_eq!(params.value("a"), Some("3"));
        assert_eq!(params.value("b"), Some("2"));
        assert_eq!(params.value("c"), None);
    }

    #[test]
    fn values_preserve_insertion_order() {
        let params: ParameterSet = vec![("tag", "x"), ("other", "o"), ("tag", "y")]
            .into_iter()
            .collect();

        assert_eq!(params.values("tag").collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn contains_ignores_content() {
        let params = ParameterSet::new().with("empty", "");
        assert!(params.contains("empty"));
        assert_eq!(params.value("empty"), Some(""));
    }

    #[test]
    fn urlencoded_decoding() {
        let params = ParameterSet::from_urlencoded("q=caf%C3%A9+au+lait&flag&&x=%2B1");

        assert_eq!(params.value("q"), Some("café au lait"));
        assert_eq!(params.value("flag"), Some(""));
        assert_eq!(params.value("x"), Some("+1"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn urlencoded_invalid_utf8_is_replaced() {
        let params = ParameterSet::from_urlencoded("bad=%FF");
        assert_eq!(params.value("bad"), Some("\u{FFFD}"));
    }

    #[test]
    fn empty_set() {
        let params = ParameterSet::from_urlencoded("");
        assert!(params.is_empty());
        assert_eq!(params.iter().count(), 0);
    }
}
