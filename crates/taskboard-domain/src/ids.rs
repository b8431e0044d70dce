use chrono::{DateTime, Utc};
use taskboard_core::FieldError;
use uuid::Uuid;

pub type BoardId = Uuid;
pub type ColumnId = Uuid;
pub type CardId = Uuid;
pub type UserId = Uuid;

pub const ID_PATTERN_MESSAGE: &str = "fails to match the identifier pattern";

const HYPHENATED_LEN: usize = 36;

/// Parse an identifier in the store's canonical form (hyphenated UUID).
///
/// Other textual UUID encodings (simple, braced, urn) are rejected so every
/// accepted ID round-trips byte-for-byte through the store.
pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, FieldError> {
    if raw.len() != HYPHENATED_LEN {
        return Err(FieldError::new(field, ID_PATTERN_MESSAGE));
    }
    Uuid::parse_str(raw).map_err(|_| FieldError::new(field, ID_PATTERN_MESSAGE))
}

pub fn is_valid_id(raw: &str) -> bool {
    parse_id("", raw).is_ok()
}

pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

/// Current time truncated to whole milliseconds, the precision timestamps are stored at.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hyphenated() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("boardId", &id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_reject_other_shapes() {
        let id = Uuid::new_v4();
        assert!(!is_valid_id(&id.simple().to_string()));
        assert!(!is_valid_id(&id.braced().to_string()));
        assert!(!is_valid_id("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(!is_valid_id(""));

        let err = parse_id("cardId", "nope").unwrap_err();
        assert_eq!(err.field, "cardId");
        assert_eq!(err.message, ID_PATTERN_MESSAGE);
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
