//! Field rules shared by the entity schemas and the request validators.
//!
//! Every check appends to a [`ValidationErrors`] instead of returning early, so a
//! single pass reports all problems with an input.

use serde_json::{Map, Value};
use taskboard_core::ValidationErrors;
use uuid::Uuid;

use crate::ids::parse_id;

/// Length and presence constraints for a string field.
#[derive(Debug, Clone, Copy)]
pub struct StringRule {
    pub min: usize,
    pub max: Option<usize>,
}

impl StringRule {
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Check a present value. Strings must already be trimmed; they are never
    /// silently trimmed here.
    pub fn check(&self, errors: &mut ValidationErrors, field: &str, value: &str) {
        if value.is_empty() {
            errors.add(field, "is not allowed to be empty");
            return;
        }
        if value.trim() != value {
            errors.add(field, "must not have leading or trailing whitespace");
        }
        let len = value.chars().count();
        if len < self.min {
            errors.add(
                field,
                format!("must be at least {} characters long", self.min),
            );
        }
        if let Some(max) = self.max {
            if len > max {
                errors.add(
                    field,
                    format!("must be less than or equal to {} characters long", max),
                );
            }
        }
    }
}

/// A required string; reports `is required` when absent.
pub fn required_string(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    rule: StringRule,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, "is required");
            None
        }
        Some(v) => {
            let before = errors.len();
            rule.check(errors, field, v);
            (errors.len() == before).then(|| v.to_string())
        }
    }
}

/// An optional string; absence is fine, a present value must satisfy `rule`.
pub fn optional_string(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    rule: StringRule,
) -> Option<String> {
    value.and_then(|v| {
        let before = errors.len();
        rule.check(errors, field, v);
        (errors.len() == before).then(|| v.to_string())
    })
}

pub fn required_id(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<Uuid> {
    match value {
        None => {
            errors.add(field, "is required");
            None
        }
        Some(raw) => match parse_id(field, raw) {
            Ok(id) => Some(id),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    }
}

/// Every entry must match the identifier pattern. Entry errors are reported as
/// `field[index]`.
pub fn id_list(errors: &mut ValidationErrors, field: &str, values: &[String]) -> Option<Vec<Uuid>> {
    let before = errors.len();
    let ids: Vec<Uuid> = values
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| match parse_id(&format!("{}[{}]", field, i), raw) {
            Ok(id) => Some(id),
            Err(e) => {
                errors.push(e);
                None
            }
        })
        .collect();
    (errors.len() == before).then_some(ids)
}

pub fn required_id_list(
    errors: &mut ValidationErrors,
    field: &str,
    values: Option<&[String]>,
) -> Option<Vec<Uuid>> {
    match values {
        None => {
            errors.add(field, "is required");
            None
        }
        Some(values) => id_list(errors, field, values),
    }
}

/// Keep only the keys named in `allowed`. Immutable fields (`_id`, `createdAt`)
/// never appear in an allow-list, so they are always dropped.
pub fn writable_fields(raw: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    raw.iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
