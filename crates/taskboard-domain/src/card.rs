use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_core::{Entity, TaskboardResult, ValidationErrors};

use crate::ids::{new_id, now_millis, BoardId, CardId, ColumnId};
use crate::validation::StringRule;

pub const TITLE_RULE: StringRule = StringRule::between(3, 50);
pub const DESCRIPTION_RULE: StringRule = StringRule::between(1, 255);

pub mod fields {
    pub const BOARD_ID: &str = "boardId";
    pub const COLUMN_ID: &str = "columnId";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: CardId,
    pub board_id: BoardId,
    /// Sole source of truth for which column holds this card.
    pub column_id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "_destroy", default)]
    pub destroyed: bool,
}

impl Card {
    pub const WRITABLE_FIELDS: &'static [&'static str] = &[fields::TITLE, fields::DESCRIPTION];

    pub fn new(
        board_id: BoardId,
        column_id: ColumnId,
        title: String,
        description: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            board_id,
            column_id,
            title,
            description,
            created_at: now_millis(),
            updated_at: None,
            destroyed: false,
        }
    }

    pub fn validate_before_create(&self) -> TaskboardResult<()> {
        let mut errors = ValidationErrors::new();
        TITLE_RULE.check(&mut errors, fields::TITLE, &self.title);
        if let Some(description) = &self.description {
            DESCRIPTION_RULE.check(&mut errors, fields::DESCRIPTION, description);
        }
        errors.into_result()
    }
}

impl Entity for Card {
    const COLLECTION: &'static str = "cards";

    fn id(&self) -> CardId {
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
    fn test_new_card() {
        let card = Card::new(Uuid::new_v4(), Uuid::new_v4(), "Write docs".to_string(), None);
        card.validate_before_create().unwrap();
        assert!(card.description.is_none());
    }

    #[test]
    fn test_schema_checks_description_when_present() {
        let card = Card::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Write docs".to_string(),
            Some(" trailing ".to_string()),
        );
        assert!(card.validate_before_create().is_err());
    }

    #[test]
    fn test_missing_description_deserializes() {
        let card = Card::new(Uuid::new_v4(), Uuid::new_v4(), "Write docs".to_string(), None);
        let mut value = serde_json::to_value(&card).unwrap();
        value.as_object_mut().unwrap().remove("description");
        let back: Card = serde_json::from_value(value).unwrap();
        assert_eq!(back, card);
    }
}
