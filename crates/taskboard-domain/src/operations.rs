use async_trait::async_trait;
use taskboard_core::{PageRequest, Paginated, TaskboardResult};

use crate::details::{BoardDetails, CardMoveOutcome, ColumnDeletion};
use crate::ids::{BoardId, CardId, ColumnId, UserId};
use crate::requests::{
    CreateBoardRequest, CreateCardRequest, CreateColumnRequest, MoveCardRequest,
    UpdateBoardRequest, UpdateCardRequest, UpdateColumnRequest,
};
use crate::{Board, Card, Column};

/// Everything a front end may ask of the board backend.
/// Adding a method here forces every implementation to provide it.
#[async_trait]
pub trait BoardOperations: Send + Sync {
    // Board operations
    async fn create_board(&self, user_id: UserId, request: CreateBoardRequest)
        -> TaskboardResult<Board>;
    /// `None` when the board does not exist or was deleted.
    async fn get_board_details(&self, board_id: BoardId) -> TaskboardResult<Option<BoardDetails>>;
    async fn list_boards(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> TaskboardResult<Paginated<Board>>;
    async fn update_board(
        &self,
        board_id: BoardId,
        request: UpdateBoardRequest,
    ) -> TaskboardResult<Board>;
    async fn delete_board(&self, board_id: BoardId) -> TaskboardResult<()>;
    async fn add_board_member(&self, board_id: BoardId, user_id: UserId) -> TaskboardResult<Board>;

    // Column operations
    async fn create_column(&self, request: CreateColumnRequest) -> TaskboardResult<Column>;
    async fn update_column(
        &self,
        column_id: ColumnId,
        request: UpdateColumnRequest,
    ) -> TaskboardResult<Column>;
    async fn delete_column(&self, column_id: ColumnId) -> TaskboardResult<ColumnDeletion>;

    // Card operations
    async fn create_card(&self, request: CreateCardRequest) -> TaskboardResult<Card>;
    async fn update_card(&self, card_id: CardId, request: UpdateCardRequest)
        -> TaskboardResult<Card>;
    async fn delete_card(&self, card_id: CardId) -> TaskboardResult<()>;
    async fn move_card_to_different_column(
        &self,
        request: MoveCardRequest,
    ) -> TaskboardResult<CardMoveOutcome>;
}
