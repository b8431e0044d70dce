use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{Entity, TaskboardResult, ValidationErrors};

use crate::ids::{new_id, now_millis, BoardId, CardId, ColumnId};
use crate::validation::StringRule;

pub const TITLE_RULE: StringRule = StringRule::between(3, 50);

pub mod fields {
    pub const BOARD_ID: &str = "boardId";
    pub const TITLE: &str = "title";
    pub const CARD_ORDER_IDS: &str = "cardOrderIds";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(rename = "_id")]
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default)]
    pub card_order_ids: Vec<CardId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "_destroy", default)]
    pub destroyed: bool,
}

impl Column {
    pub const WRITABLE_FIELDS: &'static [&'static str] = &[fields::TITLE, fields::CARD_ORDER_IDS];

    pub fn new(board_id: BoardId, title: String) -> Self {
        Self {
            id: new_id(),
            board_id,
            title,
            card_order_ids: Vec::new(),
            created_at: now_millis(),
            updated_at: None,
            destroyed: false,
        }
    }

    pub fn validate_before_create(&self) -> TaskboardResult<()> {
        let mut errors = ValidationErrors::new();
        TITLE_RULE.check(&mut errors, fields::TITLE, &self.title);
        if !self.card_order_ids.is_empty() {
            errors.add(fields::CARD_ORDER_IDS, "must be empty for a new column");
        }
        errors.into_result()
    }
}

impl Entity for Column {
    const COLLECTION: &'static str = "columns";

    fn id(&self) -> ColumnId {
        self.id
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_new_column() {
        let board_id = Uuid::new_v4();
        let column = Column::new(board_id, "To Do".to_string());
        assert_eq!(column.board_id, board_id);
        assert!(column.card_order_ids.is_empty());
        column.validate_before_create().unwrap();
    }

    #[test]
    fn test_schema_rejects_preseeded_order() {
        let mut column = Column::new(Uuid::new_v4(), "Doing".to_string());
        column.card_order_ids.push(Uuid::new_v4());
        assert!(column.validate_before_create().is_err());
    }

    #[test]
    fn test_stored_field_names() {
        let column = Column::new(Uuid::new_v4(), "Done".to_string());
        let value = serde_json::to_value(&column).unwrap();
        assert_eq!(value["boardId"], column.board_id.to_string());
        assert!(value["cardOrderIds"].as_array().unwrap().is_empty());
    }
}
