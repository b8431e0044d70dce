use taskboard_core::TaskboardResult;
use taskboard_domain::{column, BoardId, Column};
use taskboard_persistence::Filter;

use super::{active, Repository};

pub type ColumnModel = Repository<Column>;

impl Repository<Column> {
    pub async fn create(&self, column: Column) -> TaskboardResult<Column> {
        column.validate_before_create()?;
        self.insert(column).await
    }

    /// Active columns of a board in creation order.
    pub async fn find_active_by_board(&self, board_id: BoardId) -> TaskboardResult<Vec<Column>> {
        let mut columns = self
            .collection()
            .find(&Filter::eq(column::fields::BOARD_ID, board_id).and(active()))
            .await?;
        columns.sort_by_key(|c| c.created_at);
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::StorageConfig;
    use taskboard_persistence::Database;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_find_active_by_board() {
        let db = Database::new(StorageConfig::memory());
        db.connect().await.unwrap();
        let model = ColumnModel::open(&db).unwrap();
        let board_id = Uuid::new_v4();

        let todo = model.create(Column::new(board_id, "Todo".to_string())).await.unwrap();
        let done = model.create(Column::new(board_id, "Done".to_string())).await.unwrap();
        model
            .create(Column::new(Uuid::new_v4(), "Elsewhere".to_string()))
            .await
            .unwrap();
        model.soft_delete(todo.id).await.unwrap();

        let columns = model.find_active_by_board(board_id).await.unwrap();
        assert_eq!(columns, vec![done]);
    }

    #[tokio::test]
    async fn test_create_rejects_prefilled_order() {
        let db = Database::new(StorageConfig::memory());
        db.connect().await.unwrap();
        let model = ColumnModel::open(&db).unwrap();
        let mut column = Column::new(Uuid::new_v4(), "Todo".to_string());
        column.card_order_ids.push(Uuid::new_v4());
        assert!(model.create(column).await.is_err());
    }
}
