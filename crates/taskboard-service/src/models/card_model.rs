use taskboard_core::{fields, TaskboardResult};
use taskboard_domain::{card, BoardId, Card, CardId, ColumnId};
use taskboard_persistence::{Filter, Update};

use super::{active, active_by_id, touched, Repository};

pub type CardModel = Repository<Card>;

impl Repository<Card> {
    pub async fn create(&self, card: Card) -> TaskboardResult<Card> {
        card.validate_before_create()?;
        self.insert(card).await
    }

    pub async fn find_active_by_board(&self, board_id: BoardId) -> TaskboardResult<Vec<Card>> {
        self.collection()
            .find(&Filter::eq(card::fields::BOARD_ID, board_id).and(active()))
            .await
    }

    /// Active cards whose `columnId` is `column_id`, in creation order.
    pub async fn find_active_by_column(&self, column_id: ColumnId) -> TaskboardResult<Vec<Card>> {
        let mut cards = self
            .collection()
            .find(&Filter::eq(card::fields::COLUMN_ID, column_id).and(active()))
            .await?;
        cards.sort_by_key(|c| c.created_at);
        Ok(cards)
    }

    /// Point an active card at another column.
    pub async fn set_column(
        &self,
        card_id: CardId,
        column_id: ColumnId,
    ) -> TaskboardResult<Option<Card>> {
        self.collection()
            .find_one_and_update(
                &active_by_id(card_id),
                &touched(Update::new().set(card::fields::COLUMN_ID, column_id)),
            )
            .await
    }

    /// Soft-delete every active card of a column; returns how many.
    pub async fn soft_delete_by_column(&self, column_id: ColumnId) -> TaskboardResult<u64> {
        let count = self
            .collection()
            .update_many(
                &Filter::eq(card::fields::COLUMN_ID, column_id).and(active()),
                &touched(Update::new().set(fields::DESTROYED, true)),
            )
            .await?;
        tracing::debug!("Soft-deleted {} cards of column {}", count, column_id);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::StorageConfig;
    use taskboard_persistence::Database;
    use uuid::Uuid;

    async fn model() -> CardModel {
        let db = Database::new(StorageConfig::memory());
        db.connect().await.unwrap();
        CardModel::open(&db).unwrap()
    }

    #[tokio::test]
    async fn test_set_column_moves_membership() {
        let model = model().await;
        let (board, from, to) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let card = model
            .create(Card::new(board, from, "Write docs".to_string(), None))
            .await
            .unwrap();

        let moved = model.set_column(card.id, to).await.unwrap().unwrap();
        assert_eq!(moved.column_id, to);
        assert!(model.find_active_by_column(from).await.unwrap().is_empty());
        assert_eq!(model.find_active_by_column(to).await.unwrap().len(), 1);
        assert_eq!(model.find_active_by_board(board).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_by_column() {
        let model = model().await;
        let (board, column, other) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for title in ["Card one", "Card two"] {
            model
                .create(Card::new(board, column, title.to_string(), None))
                .await
                .unwrap();
        }
        model
            .create(Card::new(board, other, "Card three".to_string(), None))
            .await
            .unwrap();

        assert_eq!(model.soft_delete_by_column(column).await.unwrap(), 2);
        assert_eq!(model.soft_delete_by_column(column).await.unwrap(), 0);
        assert_eq!(model.find_active_by_board(board).await.unwrap().len(), 1);
    }
}
