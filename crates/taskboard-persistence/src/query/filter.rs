use serde::Serialize;
use serde_json::Value;

use super::document::get_field;

/// Predicate over stored documents.
///
/// Field names address top-level keys of the stored JSON. A field that is
/// absent compares equal to `null`, so `Filter::eq("updatedAt", Value::Null)`
/// matches both documents with an explicit `null` and documents without the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    #[default]
    All,
    Eq(String, Value),
    Ne(String, Value),
    /// Field value is one of the listed values.
    In(String, Vec<Value>),
    /// Field is an array holding the value.
    Contains(String, Value),
    /// Field is missing, not an array, or an array without the value.
    NotContains(String, Value),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Serialize) -> Self {
        Filter::Eq(field.into(), to_value(value))
    }

    pub fn ne(field: impl Into<String>, value: impl Serialize) -> Self {
        Filter::Ne(field.into(), to_value(value))
    }

    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Serialize,
    {
        Filter::In(field.into(), values.into_iter().map(to_value).collect())
    }

    pub fn contains(field: impl Into<String>, value: impl Serialize) -> Self {
        Filter::Contains(field.into(), to_value(value))
    }

    pub fn not_contains(field: impl Into<String>, value: impl Serialize) -> Self {
        Filter::NotContains(field.into(), to_value(value))
    }

    /// Conjunction, flattening nested `And`s and dropping `All`.
    pub fn and(self, other: Filter) -> Self {
        let mut parts = Vec::new();
        for filter in [self, other] {
            match filter {
                Filter::All => {}
                Filter::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Filter::All,
            1 => parts.remove(0),
            _ => Filter::And(parts),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut inner) => {
                inner.push(other);
                Filter::Or(inner)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(field, expected) => field_value(doc, field) == *expected,
            Filter::Ne(field, expected) => field_value(doc, field) != *expected,
            Filter::In(field, candidates) => {
                let actual = field_value(doc, field);
                candidates.iter().any(|candidate| *candidate == actual)
            }
            Filter::Contains(field, expected) => array_contains(doc, field, expected),
            Filter::NotContains(field, expected) => !array_contains(doc, field, expected),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    /// The `_id` this filter pins down, if it is an equality on `_id`
    /// (alone or as one arm of a conjunction). Lets backends narrow the scan.
    pub fn pinned_id(&self) -> Option<&str> {
        match self {
            Filter::Eq(field, Value::String(id)) if field == taskboard_core::fields::ID => {
                Some(id.as_str())
            }
            Filter::And(filters) => filters.iter().find_map(Filter::pinned_id),
            _ => None,
        }
    }
}

fn field_value(doc: &Value, field: &str) -> Value {
    get_field(doc, field).cloned().unwrap_or(Value::Null)
}

fn array_contains(doc: &Value, field: &str, expected: &Value) -> bool {
    matches!(get_field(doc, field), Some(Value::Array(items)) if items.contains(expected))
}
