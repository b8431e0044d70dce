use serde::Serialize;
use serde_json::Value;
use taskboard_core::{fields, TaskboardError, TaskboardResult};

use super::document::as_document_mut;

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    Set(String, Value),
    /// Append to an array field, creating it when absent.
    Push(String, Value),
    /// Remove every occurrence of the value from an array field.
    Pull(String, Value),
}

/// Ordered list of field operations applied to one document in a single step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        self.ops.push(UpdateOp::Set(field.into(), to_value(value)));
        self
    }

    pub fn push(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        self.ops.push(UpdateOp::Push(field.into(), to_value(value)));
        self
    }

    pub fn pull(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        self.ops.push(UpdateOp::Pull(field.into(), to_value(value)));
        self
    }

    pub fn with_op(mut self, op: UpdateOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every operation in order. On error the document may be partly
    /// modified, so callers apply to a copy and commit only on success.
    pub fn apply(&self, doc: &mut Value) -> TaskboardResult<()> {
        let map = as_document_mut(doc)?;
        for op in &self.ops {
            match op {
                UpdateOp::Set(field, value) => {
                    guard_id(field)?;
                    map.insert(field.clone(), value.clone());
                }
                UpdateOp::Push(field, value) => {
                    guard_id(field)?;
                    let slot = map
                        .entry(field.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    match slot {
                        Value::Array(items) => items.push(value.clone()),
                        Value::Null => *slot = Value::Array(vec![value.clone()]),
                        _ => return Err(not_an_array(field)),
                    }
                }
                UpdateOp::Pull(field, value) => {
                    guard_id(field)?;
                    match map.get_mut(field) {
                        Some(Value::Array(items)) => items.retain(|item| item != value),
                        None | Some(Value::Null) => {}
                        Some(_) => return Err(not_an_array(field)),
                    }
                }
            }
        }
        Ok(())
    }
}

fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn guard_id(field: &str) -> TaskboardResult<()> {
    if field == fields::ID {
        return Err(TaskboardError::validation(fields::ID, "is immutable"));
    }
    Ok(())
}

fn not_an_array(field: &str) -> TaskboardError {
    TaskboardError::Storage(format!("field '{field}' is not an array"))
}
