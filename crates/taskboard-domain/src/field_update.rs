use serde::Serialize;
use serde_json::Value;

/// Three-state change to an optional field.
///
/// ```
/// use taskboard_domain::FieldUpdate;
///
/// let mut description = Some("draft".to_string());
/// FieldUpdate::Set("final".to_string()).apply_to(&mut description);
/// assert_eq!(description.as_deref(), Some("final"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut description);
/// assert_eq!(description, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Keep the stored value.
    #[default]
    NoChange,
    Set(T),
    /// Store `null`.
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }
}

impl<T: Serialize> FieldUpdate<T> {
    /// Value for a `$set` operator, or `None` when the field is left alone.
    pub fn to_set_value(&self) -> Option<Value> {
        match self {
            FieldUpdate::NoChange => None,
            FieldUpdate::Set(value) => serde_json::to_value(value).ok(),
            FieldUpdate::Clear => Some(Value::Null),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}
