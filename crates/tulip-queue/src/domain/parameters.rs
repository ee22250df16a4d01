//! Parameter flattening for form transport.
//!
//! Tulip only accepts flat form fields. Nested sequences and mappings are
//! expanded into bracketed keys (`tags[0]`, `tags[1]`) and re-indexed densely
//! in iteration order: the nested structure's own keys are discarded, so
//! `{"1": "foo", "5": "bar"}` becomes `[0]` and `[1]`. Deeper nesting repeats
//! the same rule at every level (`groups[0][1]`).

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Parameters produced by an object, in insertion order.
pub type Parameters = serde_json::Map<String, Value>;

/// Flat string parameters in insertion order.
///
/// Keys are unique: inserting an existing key replaces its value in place.
/// Equality compares entries in order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FlatParameters {
    entries: IndexMap<String, String>,
}

impl FlatParameters {
    /// Empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl PartialEq for FlatParameters {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for FlatParameters {}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for FlatParameters {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Flatten nested parameters into bracket-indexed form fields.
///
/// Strings pass through, numbers use their decimal form, booleans become
/// `"1"`/`"0"` and `null` becomes an empty string. Empty nested structures
/// contribute no fields.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tulip_queue::domain::flatten_parameters;
///
/// let serde_json::Value::Object(parameters) =
///     json!({ "name": "Ada", "array": { "1": "foo", "5": "bar" } })
/// else {
///     unreachable!()
/// };
///
/// let flat = flatten_parameters(&parameters);
/// assert_eq!(flat.get("name"), Some("Ada"));
/// assert_eq!(flat.get("array[0]"), Some("foo"));
/// assert_eq!(flat.get("array[1]"), Some("bar"));
/// ```
#[must_use]
pub fn flatten_parameters(parameters: &Parameters) -> FlatParameters {
    let mut flat = FlatParameters::new();
    for (key, value) in parameters {
        flatten_value(&mut flat, key.clone(), value);
    }
    flat
}

fn flatten_value(flat: &mut FlatParameters, key: String, value: &Value) {
    match value {
        Value::Array(items) => flatten_nested(flat, &key, items.iter()),
        Value::Object(entries) => flatten_nested(flat, &key, entries.values()),
        scalar => flat.insert(key, scalar_to_string(scalar)),
    }
}

fn flatten_nested<'a>(
    flat: &mut FlatParameters,
    key: &str,
    values: impl Iterator<Item = &'a Value>,
) {
    for (index, value) in values.enumerate() {
        flatten_value(flat, format!("{key}[{index}]"), value);
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_owned(),
        Value::Bool(false) => "0".to_owned(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    //! Flattening rules.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            other => panic!("test parameters must be an object, got {other}"),
        }
    }

    #[test]
    fn sparse_nested_keys_are_reindexed_densely() {
        let flat = flatten_parameters(&params(json!({ "array": { "1": "foo", "5": "bar" } })));
        assert_eq!(flat, FlatParameters::from([("array[0]", "foo"), ("array[1]", "bar")]));
    }

    #[test]
    fn reindexing_follows_insertion_order_not_key_order() {
        let flat = flatten_parameters(&params(json!({ "array": { "10": "ten", "2": "two" } })));
        assert_eq!(flat.get("array[0]"), Some("ten"));
        assert_eq!(flat.get("array[1]"), Some("two"));
    }

    #[test]
    fn sequences_and_scalars_keep_their_order() {
        let flat = flatten_parameters(&params(json!({
            "name": "Ada",
            "tags": ["a", "b"],
            "age": 36,
        })));
        let keys: Vec<&str> = flat.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["name", "tags[0]", "tags[1]", "age"]);
    }

    #[rstest]
    #[case::string(json!("text"), "text")]
    #[case::integer(json!(42), "42")]
    #[case::float(json!(1.5), "1.5")]
    #[case::truthy(json!(true), "1")]
    #[case::falsy(json!(false), "0")]
    #[case::null(json!(null), "")]
    fn scalars_convert_to_strings(#[case] value: Value, #[case] expected: &str) {
        let mut parameters = Parameters::new();
        parameters.insert("field".to_owned(), value);
        assert_eq!(flatten_parameters(&parameters).get("field"), Some(expected));
    }

    #[test]
    fn deeper_nesting_is_flattened_recursively() {
        let flat = flatten_parameters(&params(json!({
            "groups": [ { "x": "a", "y": "b" }, ["c"] ],
        })));
        assert_eq!(
            flat,
            FlatParameters::from([
                ("groups[0][0]", "a"),
                ("groups[0][1]", "b"),
                ("groups[1][0]", "c"),
            ])
        );
    }

    #[test]
    fn empty_structures_contribute_nothing() {
        let flat = flatten_parameters(&params(json!({ "empty": [], "none": {} })));
        assert!(flat.is_empty());
    }

    #[test]
    fn inserting_an_existing_key_replaces_in_place() {
        let mut flat = FlatParameters::from([("a", "1"), ("b", "2")]);
        flat.insert("a", "3");
        assert_eq!(flat.iter().collect::<Vec<_>>(), [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let forward = FlatParameters::from([("a", "1"), ("b", "2")]);
        let reversed = FlatParameters::from([("b", "2"), ("a", "1")]);
        assert_ne!(forward, reversed);
        assert_eq!(forward, FlatParameters::from([("a", "1"), ("b", "2")]));
    }

    #[test]
    fn serialises_as_an_ordered_map() {
        let flat = FlatParameters::from([("z", "1"), ("a[0]", "2")]);
        let encoded = serde_json::to_string(&flat).expect("serialise");
        assert_eq!(encoded, r#"{"z":"1","a[0]":"2"}"#);
    }
}
