use std::sync::Arc;

use async_trait::async_trait;
use taskboard_core::{AppConfig, PageRequest, Paginated, TaskboardError, TaskboardResult};
use taskboard_domain::{
    board, card, column, Board, BoardDetails, BoardId, BoardOperations, Card, CardId,
    CardMoveOutcome, Column, ColumnDeletion, ColumnId, CreateBoardRequest, CreateCardRequest,
    CreateColumnRequest, MoveCardRequest, UpdateBoardRequest, UpdateCardRequest,
    UpdateColumnRequest, UserId,
};
use taskboard_persistence::Database;

use crate::aggregation::AggregationEngine;
use crate::models::{not_found, BoardModel, CardModel, ColumnModel};
use crate::ordering::{reject_duplicates, OrderingEngine};

/// Runtime knobs taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    pub items_per_page: u32,
    pub strict_move_validation: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ServiceSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            items_per_page: config.listing.items_per_page,
            strict_move_validation: config.ordering.strict_move_validation,
        }
    }
}

/// Validates requests and drives the ordering and aggregation engines.
pub struct TaskboardService {
    db: Arc<Database>,
    settings: ServiceSettings,
    ordering: OrderingEngine,
    aggregation: AggregationEngine,
}

impl TaskboardService {
    pub fn new(db: Arc<Database>, settings: ServiceSettings) -> Self {
        let ordering =
            OrderingEngine::new(Arc::clone(&db)).with_strict_moves(settings.strict_move_validation);
        let aggregation = AggregationEngine::new(Arc::clone(&db));
        Self {
            db,
            settings,
            ordering,
            aggregation,
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn ordering(&self) -> &OrderingEngine {
        &self.ordering
    }

    /// Page request with the configured page size filling in what is missing.
    pub fn page_request(
        &self,
        page: Option<u32>,
        items_per_page: Option<u32>,
    ) -> TaskboardResult<PageRequest> {
        PageRequest::from_optional(page, items_per_page, self.settings.items_per_page)
    }

    fn boards(&self) -> TaskboardResult<BoardModel> {
        BoardModel::open(&self.db)
    }

    fn columns(&self) -> TaskboardResult<ColumnModel> {
        ColumnModel::open(&self.db)
    }

    fn cards(&self) -> TaskboardResult<CardModel> {
        CardModel::open(&self.db)
    }
}

#[async_trait]
impl BoardOperations for TaskboardService {
    async fn create_board(
        &self,
        user_id: UserId,
        request: CreateBoardRequest,
    ) -> TaskboardResult<Board> {
        let new_board = request.validate()?;
        self.boards()?.create(new_board.into_board(user_id)).await
    }

    async fn get_board_details(
        &self,
        board_id: BoardId,
    ) -> TaskboardResult<Option<BoardDetails>> {
        self.aggregation.get_board_details(board_id).await
    }

    async fn list_boards(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> TaskboardResult<Paginated<Board>> {
        self.aggregation.list_boards_for_user(user_id, page).await
    }

    async fn update_board(
        &self,
        board_id: BoardId,
        request: UpdateBoardRequest,
    ) -> TaskboardResult<Board> {
        let update = request.validate()?;
        if let Some(order) = &update.column_order_ids {
            reject_duplicates(board::fields::COLUMN_ORDER_IDS, order)?;
        }
        let board = self
            .boards()?
            .update_fields(board_id, update.set_fields())
            .await?
            .ok_or_else(|| not_found::<Board>(board_id))?;

        match update.column_order_ids {
            Some(order) => self.ordering.set_column_order(board_id, order).await,
            None => self.ordering.reconcile_board(board).await,
        }
    }

    async fn delete_board(&self, board_id: BoardId) -> TaskboardResult<()> {
        self.boards()?
            .soft_delete(board_id)
            .await?
            .ok_or_else(|| not_found::<Board>(board_id))?;
        tracing::info!("Deleted board {}", board_id);
        Ok(())
    }

    async fn add_board_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> TaskboardResult<Board> {
        let boards = self.boards()?;
        let board = match boards.push_member(board_id, user_id).await? {
            Some(board) => board,
            None => boards.require_active(board_id).await?,
        };
        self.ordering.reconcile_board(board).await
    }

    async fn create_column(&self, request: CreateColumnRequest) -> TaskboardResult<Column> {
        let new_column = request.validate()?;
        self.boards()?.require_active(new_column.board_id).await?;

        let column = self.columns()?.create(new_column.into_column()).await?;
        self.ordering.append_column(column.board_id, column.id).await?;
        tracing::info!("Created column {} on board {}", column.id, column.board_id);
        Ok(column)
    }

    async fn update_column(
        &self,
        column_id: ColumnId,
        request: UpdateColumnRequest,
    ) -> TaskboardResult<Column> {
        let update = request.validate()?;
        if let Some(order) = &update.card_order_ids {
            reject_duplicates(column::fields::CARD_ORDER_IDS, order)?;
        }
        let column = self
            .columns()?
            .update_fields(column_id, update.set_fields())
            .await?
            .ok_or_else(|| not_found::<Column>(column_id))?;

        match update.card_order_ids {
            Some(order) => self.ordering.set_card_order(column_id, order).await,
            None => self.ordering.reconcile_column(column).await,
        }
    }

    async fn delete_column(&self, column_id: ColumnId) -> TaskboardResult<ColumnDeletion> {
        let columns = self.columns()?;
        let column = columns.require_active(column_id).await?;
        self.boards()?.require_active(column.board_id).await?;

        columns
            .soft_delete(column_id)
            .await?
            .ok_or_else(|| not_found::<Column>(column_id))?;
        let destroyed_cards = self.cards()?.soft_delete_by_column(column_id).await?;
        let board = self.ordering.remove_column(column.board_id, column_id).await?;

        tracing::info!(
            "Deleted column {} and {} of its cards",
            column_id,
            destroyed_cards
        );
        Ok(ColumnDeletion {
            column_id,
            board,
            destroyed_cards,
        })
    }

    async fn create_card(&self, request: CreateCardRequest) -> TaskboardResult<Card> {
        let new_card = request.validate()?;
        let column = self.columns()?.require_active(new_card.column_id).await?;
        if column.board_id != new_card.board_id {
            return Err(TaskboardError::validation(
                card::fields::COLUMN_ID,
                "must belong to the board given by boardId",
            ));
        }
        self.boards()?.require_active(new_card.board_id).await?;

        let card = self.cards()?.create(new_card.into_card()).await?;
        self.ordering.append_card(card.column_id, card.id).await?;
        tracing::info!("Created card {} in column {}", card.id, card.column_id);
        Ok(card)
    }

    async fn update_card(
        &self,
        card_id: CardId,
        request: UpdateCardRequest,
    ) -> TaskboardResult<Card> {
        let update = request.validate()?;
        self.cards()?
            .update_fields(card_id, update.set_fields())
            .await?
            .ok_or_else(|| not_found::<Card>(card_id))
    }

    async fn delete_card(&self, card_id: CardId) -> TaskboardResult<()> {
        let card = self
            .cards()?
            .soft_delete(card_id)
            .await?
            .ok_or_else(|| not_found::<Card>(card_id))?;

        // A card left behind in a deleted column has no order array to fix.
        match self.ordering.remove_card(card.column_id, card.id).await {
            Ok(_) | Err(TaskboardError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        tracing::info!("Deleted card {}", card_id);
        Ok(())
    }

    async fn move_card_to_different_column(
        &self,
        request: MoveCardRequest,
    ) -> TaskboardResult<CardMoveOutcome> {
        let card_move = request.validate()?;
        self.ordering.move_card_to_different_column(&card_move).await
    }
}
