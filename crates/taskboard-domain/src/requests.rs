//! Request validators.
//!
//! Each request type mirrors an inbound body with every field optional, so a
//! missing field is reported as `is required` rather than as a deserialization
//! failure. `validate` turns the raw request into a typed command or update, or
//! returns every field-level problem at once.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskboard_core::{TaskboardError, TaskboardResult, ValidationErrors};

use crate::board::{self, slugify, Board, BoardType};
use crate::card::{self, Card};
use crate::column::{self, Column};
use crate::field_update::FieldUpdate;
use crate::ids::{BoardId, CardId, ColumnId, UserId};
use crate::validation::{
    id_list, optional_string, required_id, required_id_list, required_string, writable_fields,
};

fn check_board_type(errors: &mut ValidationErrors, raw: &str) -> Option<BoardType> {
    match raw.parse::<BoardType>() {
        Ok(board_type) => Some(board_type),
        Err(message) => {
            errors.add(board::fields::TYPE, message);
            None
        }
    }
}

/// Deserialize a raw update body after dropping everything outside `allowed`.
fn from_raw<T: serde::de::DeserializeOwned>(raw: &Value, allowed: &[&str]) -> TaskboardResult<T> {
    let object = raw
        .as_object()
        .ok_or_else(|| TaskboardError::validation("body", "must be an object"))?;
    let kept: Map<String, Value> = writable_fields(object, allowed);
    serde_json::from_value(Value::Object(kept))
        .map_err(|e| TaskboardError::validation("body", e.to_string()))
}

// ============================================================================
// Boards
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub board_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBoard {
    pub title: String,
    pub description: String,
    pub board_type: BoardType,
}

impl NewBoard {
    pub fn into_board(self, owner: UserId) -> Board {
        Board::new(self.title, self.description, self.board_type, owner)
    }
}

impl CreateBoardRequest {
    pub fn validate(&self) -> TaskboardResult<NewBoard> {
        let mut errors = ValidationErrors::new();
        let title = required_string(
            &mut errors,
            board::fields::TITLE,
            self.title.as_deref(),
            board::TITLE_RULE,
        );
        let description = required_string(
            &mut errors,
            board::fields::DESCRIPTION,
            self.description.as_deref(),
            board::DESCRIPTION_RULE,
        );
        let board_type = match self.board_type.as_deref() {
            None => {
                errors.add(board::fields::TYPE, "is required");
                None
            }
            Some(raw) => check_board_type(&mut errors, raw),
        };

        match (title, description, board_type) {
            (Some(title), Some(description), Some(board_type)) if errors.is_empty() => {
                Ok(NewBoard {
                    title,
                    description,
                    board_type,
                })
            }
            _ => Err(TaskboardError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub board_type: Option<String>,
    pub column_order_ids: Option<Vec<String>>,
}

/// Validated board changes. Only allow-listed fields can be expressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub board_type: Option<BoardType>,
    pub column_order_ids: Option<Vec<ColumnId>>,
}

impl UpdateBoardRequest {
    /// Build from an arbitrary JSON body, silently dropping immutable and
    /// non-writable keys such as `_id`, `createdAt` or `slug`.
    pub fn from_raw(raw: &Value) -> TaskboardResult<Self> {
        from_raw(raw, Board::WRITABLE_FIELDS)
    }

    pub fn validate(&self) -> TaskboardResult<BoardUpdate> {
        let mut errors = ValidationErrors::new();
        let update = BoardUpdate {
            title: optional_string(
                &mut errors,
                board::fields::TITLE,
                self.title.as_deref(),
                board::TITLE_RULE,
            ),
            description: optional_string(
                &mut errors,
                board::fields::DESCRIPTION,
                self.description.as_deref(),
                board::DESCRIPTION_RULE,
            ),
            board_type: self
                .board_type
                .as_deref()
                .and_then(|raw| check_board_type(&mut errors, raw)),
            column_order_ids: self.column_order_ids.as_deref().and_then(|ids| {
                id_list(&mut errors, board::fields::COLUMN_ORDER_IDS, ids)
            }),
        };
        errors.into_result()?;
        Ok(update)
    }
}

impl BoardUpdate {
    /// `$set` pairs for the plain fields. The column order is written separately
    /// by the ordering engine.
    pub fn set_fields(&self) -> Vec<(&'static str, Value)> {
        let mut sets = Vec::new();
        if let Some(title) = &self.title {
            sets.push((board::fields::TITLE, Value::String(title.clone())));
            sets.push((board::fields::SLUG, Value::String(slugify(title))));
        }
        if let Some(description) = &self.description {
            sets.push((board::fields::DESCRIPTION, Value::String(description.clone())));
        }
        if let Some(board_type) = self.board_type {
            sets.push((board::fields::TYPE, Value::String(board_type.to_string())));
        }
        sets
    }
}

// ============================================================================
// Columns
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub board_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewColumn {
    pub board_id: BoardId,
    pub title: String,
}

impl NewColumn {
    pub fn into_column(self) -> Column {
        Column::new(self.board_id, self.title)
    }
}

impl CreateColumnRequest {
    pub fn validate(&self) -> TaskboardResult<NewColumn> {
        let mut errors = ValidationErrors::new();
        let board_id = required_id(&mut errors, column::fields::BOARD_ID, self.board_id.as_deref());
        let title = required_string(
            &mut errors,
            column::fields::TITLE,
            self.title.as_deref(),
            column::TITLE_RULE,
        );
        match (board_id, title) {
            (Some(board_id), Some(title)) if errors.is_empty() => Ok(NewColumn { board_id, title }),
            _ => Err(TaskboardError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumnRequest {
    pub title: Option<String>,
    pub card_order_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnUpdate {
    pub title: Option<String>,
    pub card_order_ids: Option<Vec<CardId>>,
}

impl UpdateColumnRequest {
    pub fn from_raw(raw: &Value) -> TaskboardResult<Self> {
        from_raw(raw, Column::WRITABLE_FIELDS)
    }

    pub fn validate(&self) -> TaskboardResult<ColumnUpdate> {
        let mut errors = ValidationErrors::new();
        let update = ColumnUpdate {
            title: optional_string(
                &mut errors,
                column::fields::TITLE,
                self.title.as_deref(),
                column::TITLE_RULE,
            ),
            card_order_ids: self
                .card_order_ids
                .as_deref()
                .and_then(|ids| id_list(&mut errors, column::fields::CARD_ORDER_IDS, ids)),
        };
        errors.into_result()?;
        Ok(update)
    }
}

impl ColumnUpdate {
    pub fn set_fields(&self) -> Vec<(&'static str, Value)> {
        self.title
            .iter()
            .map(|title| (column::fields::TITLE, Value::String(title.clone())))
            .collect()
    }
}

// ============================================================================
// Cards
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub board_id: Option<String>,
    pub column_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCard {
    pub board_id: BoardId,
    pub column_id: ColumnId,
    pub title: String,
    pub description: Option<String>,
}

impl NewCard {
    pub fn into_card(self) -> Card {
        Card::new(self.board_id, self.column_id, self.title, self.description)
    }
}

impl CreateCardRequest {
    pub fn validate(&self) -> TaskboardResult<NewCard> {
        let mut errors = ValidationErrors::new();
        let board_id = required_id(&mut errors, card::fields::BOARD_ID, self.board_id.as_deref());
        let column_id = required_id(&mut errors, card::fields::COLUMN_ID, self.column_id.as_deref());
        let title = required_string(
            &mut errors,
            card::fields::TITLE,
            self.title.as_deref(),
            card::TITLE_RULE,
        );
        let description = optional_string(
            &mut errors,
            card::fields::DESCRIPTION,
            self.description.as_deref(),
            card::DESCRIPTION_RULE,
        );
        match (board_id, column_id, title) {
            (Some(board_id), Some(column_id), Some(title)) if errors.is_empty() => Ok(NewCard {
                board_id,
                column_id,
                title,
                description,
            }),
            _ => Err(TaskboardError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub clear_description: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
}

impl UpdateCardRequest {
    pub fn validate(&self) -> TaskboardResult<CardUpdate> {
        let mut errors = ValidationErrors::new();
        if self.clear_description && self.description.is_some() {
            errors.add(
                card::fields::DESCRIPTION,
                "cannot be set and cleared in the same request",
            );
        }
        let title = optional_string(
            &mut errors,
            card::fields::TITLE,
            self.title.as_deref(),
            card::TITLE_RULE,
        );
        let description = optional_string(
            &mut errors,
            card::fields::DESCRIPTION,
            self.description.as_deref(),
            card::DESCRIPTION_RULE,
        );
        errors.into_result()?;

        let description = match (description, self.clear_description) {
            (Some(value), _) => FieldUpdate::Set(value),
            (None, true) => FieldUpdate::Clear,
            (None, false) => FieldUpdate::NoChange,
        };
        Ok(CardUpdate { title, description })
    }
}

impl CardUpdate {
    pub fn set_fields(&self) -> Vec<(&'static str, Value)> {
        let mut sets = Vec::new();
        if let Some(title) = &self.title {
            sets.push((card::fields::TITLE, Value::String(title.clone())));
        }
        if let Some(value) = self.description.to_set_value() {
            sets.push((card::fields::DESCRIPTION, value));
        }
        sets
    }
}

// ============================================================================
// Moving a card between columns
// ============================================================================

pub mod move_fields {
    pub const CURRENT_CARD_ID: &str = "currentCardId";
    pub const PREV_COLUMN_ID: &str = "prevColumnId";
    pub const PREV_CARD_ORDER_IDS: &str = "prevCardOrderIds";
    pub const NEXT_COLUMN_ID: &str = "nextColumnId";
    pub const NEXT_CARD_ORDER_IDS: &str = "nextCardOrderIds";
}

/// Body of a drag-and-drop move. The client has already reordered both
/// columns and sends their final card orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub current_card_id: Option<String>,
    pub prev_column_id: Option<String>,
    pub prev_card_order_ids: Option<Vec<String>>,
    pub next_column_id: Option<String>,
    pub next_card_order_ids: Option<Vec<String>>,
}

/// A shape-checked card move, ready for the ordering engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardMove {
    pub card_id: CardId,
    pub prev_column_id: ColumnId,
    pub prev_card_order_ids: Vec<CardId>,
    pub next_column_id: ColumnId,
    pub next_card_order_ids: Vec<CardId>,
}

impl MoveCardRequest {
    pub fn validate(&self) -> TaskboardResult<CardMove> {
        use move_fields::*;

        let mut errors = ValidationErrors::new();
        let card_id = required_id(&mut errors, CURRENT_CARD_ID, self.current_card_id.as_deref());
        let prev_column_id =
            required_id(&mut errors, PREV_COLUMN_ID, self.prev_column_id.as_deref());
        let prev_card_order_ids = required_id_list(
            &mut errors,
            PREV_CARD_ORDER_IDS,
            self.prev_card_order_ids.as_deref(),
        );
        let next_column_id =
            required_id(&mut errors, NEXT_COLUMN_ID, self.next_column_id.as_deref());
        let next_card_order_ids = required_id_list(
            &mut errors,
            NEXT_CARD_ORDER_IDS,
            self.next_card_order_ids.as_deref(),
        );

        if let (Some(prev), Some(next)) = (prev_column_id, next_column_id) {
            if prev == next {
                errors.add(NEXT_COLUMN_ID, "must differ from prevColumnId");
            }
        }

        match (
            card_id,
            prev_column_id,
            prev_card_order_ids,
            next_column_id,
            next_card_order_ids,
        ) {
            (Some(card_id), Some(prev_column_id), Some(prev), Some(next_column_id), Some(next))
                if errors.is_empty() =>
            {
                Ok(CardMove {
                    card_id,
                    prev_column_id,
                    prev_card_order_ids: prev,
                    next_column_id,
                    next_card_order_ids: next,
                })
            }
            _ => Err(TaskboardError::Validation(errors)),
        }
    }
}
