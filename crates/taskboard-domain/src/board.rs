use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use taskboard_core::{Entity, TaskboardResult, ValidationErrors};

use crate::ids::{new_id, now_millis, BoardId, ColumnId, UserId};
use crate::validation::StringRule;

pub const TITLE_RULE: StringRule = StringRule::between(3, 50);
pub const SLUG_RULE: StringRule = StringRule::at_least(3);
pub const DESCRIPTION_RULE: StringRule = StringRule::between(3, 255);

/// Stored field names of a board document.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const SLUG: &str = "slug";
    pub const DESCRIPTION: &str = "description";
    pub const TYPE: &str = "type";
    pub const COLUMN_ORDER_IDS: &str = "columnOrderIds";
    pub const OWNER_IDS: &str = "ownerIds";
    pub const MEMBER_IDS: &str = "memberIds";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    Public,
    Private,
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

impl FromStr for BoardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            _ => Err("must be one of [public, private]".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(rename = "_id")]
    pub id: BoardId,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "type")]
    pub board_type: BoardType,
    #[serde(default)]
    pub column_order_ids: Vec<ColumnId>,
    #[serde(default)]
    pub owner_ids: Vec<UserId>,
    #[serde(default)]
    pub member_ids: Vec<UserId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "_destroy", default)]
    pub destroyed: bool,
}

impl Board {
    /// Fields a caller may change after creation. `_id` and `createdAt` are
    /// immutable; `slug` follows `title` and is never written directly.
    pub const WRITABLE_FIELDS: &'static [&'static str] = &[
        fields::TITLE,
        fields::DESCRIPTION,
        fields::TYPE,
        fields::COLUMN_ORDER_IDS,
    ];

    pub fn new(title: String, description: String, board_type: BoardType, owner: UserId) -> Self {
        let slug = slugify(&title);
        Self {
            id: new_id(),
            title,
            slug,
            description,
            board_type,
            column_order_ids: Vec::new(),
            owner_ids: vec![owner],
            member_ids: Vec::new(),
            created_at: now_millis(),
            updated_at: None,
            destroyed: false,
        }
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id)
    }

    /// Owners and members both count as participants.
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.is_owner(user_id) || self.member_ids.contains(&user_id)
    }

    /// Schema check run by the model layer before every insert.
    pub fn validate_before_create(&self) -> TaskboardResult<()> {
        let mut errors = ValidationErrors::new();
        TITLE_RULE.check(&mut errors, fields::TITLE, &self.title);
        SLUG_RULE.check(&mut errors, fields::SLUG, &self.slug);
        DESCRIPTION_RULE.check(&mut errors, fields::DESCRIPTION, &self.description);
        if self.destroyed {
            errors.add("_destroy", "must be false for a new board");
        }
        errors.into_result()
    }
}

impl Entity for Board {
    const COLLECTION: &'static str = "boards";

    fn id(&self) -> BoardId {
        self.id
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// URL-safe slug: lowercase alphanumerics joined by single dashes.
///
/// Deterministic, so the same title always yields the same slug. Titles that
/// reduce to fewer than three characters get a `-board` suffix to satisfy the
/// slug schema.
pub fn slugify(title: &str) -> String {
    let slug = title
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.chars().count() < 3 {
        if slug.is_empty() {
            "board".to_string()
        } else {
            format!("{}-board", slug)
        }
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sprint Planning"), "sprint-planning");
        assert_eq!(slugify("Fix: Bug in Parser!"), "fix-bug-in-parser");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
        assert_eq!(slugify("Q3 / Q4 Roadmap"), "q3-q4-roadmap");
        assert_eq!(slugify("Café Ops"), "café-ops");
    }

    #[test]
    fn test_slugify_is_deterministic() {
        let title = "Marketing Launch 2025";
        assert_eq!(slugify(title), slugify(title));
    }

    #[test]
    fn test_short_slugs_are_padded() {
        assert_eq!(slugify("A!"), "a-board");
        assert_eq!(slugify("!!!"), "board");
    }

    #[test]
    fn test_new_board_defaults() {
        let owner = Uuid::new_v4();
        let board = Board::new(
            "Team Board".to_string(),
            "Everything we do".to_string(),
            BoardType::Private,
            owner,
        );

        assert_eq!(board.slug, "team-board");
        assert!(board.column_order_ids.is_empty());
        assert_eq!(board.owner_ids, vec![owner]);
        assert!(board.member_ids.is_empty());
        assert!(board.updated_at.is_none());
        assert!(!board.destroyed);
        assert!(board.has_participant(owner));
        assert!(!board.has_participant(Uuid::new_v4()));
        board.validate_before_create().unwrap();
    }

    #[test]
    fn test_schema_rejects_short_description() {
        let board = Board::new(
            "Team Board".to_string(),
            "ok".to_string(),
            BoardType::Public,
            Uuid::new_v4(),
        );
        assert!(board.validate_before_create().is_err());
    }

    #[test]
    fn test_stored_field_names() {
        let board = Board::new(
            "Team Board".to_string(),
            "Everything we do".to_string(),
            BoardType::Public,
            Uuid::new_v4(),
        );
        let value = serde_json::to_value(&board).unwrap();

        assert!(value.get("_id").is_some());
        assert_eq!(value["type"], "public");
        assert_eq!(value["_destroy"], false);
        assert!(value["createdAt"].is_i64());
        assert!(value["updatedAt"].is_null());
        assert!(value["columnOrderIds"].is_array());

        let back: Board = serde_json::from_value(value).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_board_type_from_str() {
        assert_eq!("public".parse::<BoardType>().unwrap(), BoardType::Public);
        assert!("secret".parse::<BoardType>().is_err());
    }
}
