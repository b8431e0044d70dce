use serde::{Deserialize, Serialize};

use crate::{Board, Card, Column, ColumnId};

/// A board with its active columns and cards, as produced by the detail join.
///
/// `columns` and `cards` are flat and in store order. Grouping and ordering for
/// display is left to the caller; the helpers below do it without mutating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl BoardDetails {
    /// Columns in `columnOrderIds` order, then any column the array misses.
    pub fn columns_in_order(&self) -> Vec<&Column> {
        let mut ordered: Vec<&Column> = self
            .board
            .column_order_ids
            .iter()
            .filter_map(|id| self.columns.iter().find(|c| c.id == *id))
            .collect();
        ordered.extend(
            self.columns
                .iter()
                .filter(|c| !self.board.column_order_ids.contains(&c.id)),
        );
        ordered
    }

    /// Cards whose `columnId` is `column_id`, in that column's `cardOrderIds`
    /// order, followed by any card the array misses.
    pub fn cards_in_column(&self, column_id: ColumnId) -> Vec<&Card> {
        let order: &[_] = self
            .columns
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| c.card_order_ids.as_slice())
            .unwrap_or(&[]);
        let members: Vec<&Card> = self
            .cards
            .iter()
            .filter(|card| card.column_id == column_id)
            .collect();

        let mut ordered: Vec<&Card> = order
            .iter()
            .filter_map(|id| members.iter().find(|card| card.id == *id).copied())
            .collect();
        ordered.extend(members.iter().filter(|card| !order.contains(&card.id)).copied());
        ordered
    }
}

/// Projections returned after a successful cross-column move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMoveOutcome {
    pub card: Card,
    pub prev_column: Column,
    pub next_column: Column,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDeletion {
    pub column_id: ColumnId,
    pub board: Board,
    /// Cards soft-deleted together with the column.
    pub destroyed_cards: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoardType;
    use uuid::Uuid;

    fn details() -> BoardDetails {
        let mut board = Board::new(
            "Product".to_string(),
            "Product work".to_string(),
            BoardType::Public,
            Uuid::new_v4(),
        );
        let todo = Column::new(board.id, "Todo".to_string());
        let mut done = Column::new(board.id, "Done".to_string());
        board.column_order_ids = vec![done.id];

        let a = Card::new(board.id, done.id, "Card A".to_string(), None);
        let b = Card::new(board.id, done.id, "Card B".to_string(), None);
        let c = Card::new(board.id, todo.id, "Card C".to_string(), None);
        done.card_order_ids = vec![b.id];

        BoardDetails {
            board,
            columns: vec![todo, done],
            cards: vec![a, b, c],
        }
    }

    #[test]
    fn test_columns_in_order() {
        let details = details();
        let titles: Vec<&str> = details
            .columns_in_order()
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Done", "Todo"]);
    }

    #[test]
    fn test_cards_in_column() {
        let details = details();
        let done = details.columns[1].id;
        let titles: Vec<&str> = details
            .cards_in_column(done)
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Card B", "Card A"]);
        assert!(details.cards_in_column(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_flattened_shape() {
        let details = details();
        let value = serde_json::to_value(&details).unwrap();
        assert!(value["_id"].is_string());
        assert_eq!(value["columns"].as_array().unwrap().len(), 2);
        assert_eq!(value["cards"].as_array().unwrap().len(), 3);

        let back: BoardDetails = serde_json::from_value(value).unwrap();
        assert_eq!(back, details);
    }
}
