//! Sole writer of `columnOrderIds` and `cardOrderIds`.
//!
//! Every projection of a board or column returned from here has been
//! reconciled against the active children, so callers never see drift.
//!
//! A cross-column card move is three single-document writes (source column,
//! target column, card) with no transaction. A failure part-way leaves the
//! arrays out of step with the cards' `columnId`; because `columnId` is
//! authoritative, the next reconcile of either column rebuilds its array.

use std::sync::Arc;

use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::ordering::{duplicates, reconcile, verify_move};
use taskboard_domain::requests::move_fields;
use taskboard_domain::{
    board, column, Board, BoardId, Card, CardId, CardMove, CardMoveOutcome, Column, ColumnId,
};
use taskboard_persistence::{Database, Filter, Update};
use uuid::Uuid;

use crate::models::{active_by_id, by_id, not_found, touched, BoardModel, CardModel, ColumnModel};

pub struct OrderingEngine {
    db: Arc<Database>,
    strict_moves: bool,
}

impl OrderingEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            strict_moves: false,
        }
    }

    /// Verify client-computed move arrays against stored state before writing.
    pub fn with_strict_moves(mut self, strict: bool) -> Self {
        self.strict_moves = strict;
        self
    }

    pub fn strict_moves(&self) -> bool {
        self.strict_moves
    }

    /// Append a column to the end of its board's order. Fails with `NotFound`
    /// for an inactive board and `Conflict` when the column is already listed.
    /// The repair that follows keeps the new column last.
    pub async fn append_column(
        &self,
        board_id: BoardId,
        column_id: ColumnId,
    ) -> TaskboardResult<Board> {
        let boards = BoardModel::open(&self.db)?;
        let filter = active_by_id(board_id)
            .and(Filter::not_contains(board::fields::COLUMN_ORDER_IDS, column_id));
        let update = touched(Update::new().push(board::fields::COLUMN_ORDER_IDS, column_id));

        match boards.collection().find_one_and_update(&filter, &update).await? {
            Some(board) => {
                tracing::debug!("Appended column {} to board {}", column_id, board_id);
                self.repair_board(board, Some(column_id)).await
            }
            None => match boards.find_active(board_id).await? {
                None => Err(not_found::<Board>(board_id)),
                Some(_) => Err(TaskboardError::Conflict(format!(
                    "column {column_id} is already in columnOrderIds of board {board_id}"
                ))),
            },
        }
    }

    /// Pull a column from its board's order. Pulling an absent ID is a no-op.
    /// An active column of the board is a `Conflict`: it has to be deleted
    /// first, otherwise the repair would list it again.
    pub async fn remove_column(
        &self,
        board_id: BoardId,
        column_id: ColumnId,
    ) -> TaskboardResult<Board> {
        let still_active = ColumnModel::open(&self.db)?
            .find_active(column_id)
            .await?
            .is_some_and(|column| column.board_id == board_id);
        if still_active {
            return Err(TaskboardError::Conflict(format!(
                "column {column_id} is still active on board {board_id}"
            )));
        }
        let boards = BoardModel::open(&self.db)?;
        let update = touched(Update::new().pull(board::fields::COLUMN_ORDER_IDS, column_id));
        let board = boards
            .collection()
            .find_one_and_update(&active_by_id(board_id), &update)
            .await?
            .ok_or_else(|| not_found::<Board>(board_id))?;
        tracing::debug!("Removed column {} from board {}", column_id, board_id);
        self.reconcile_board(board).await
    }

    pub async fn append_card(
        &self,
        column_id: ColumnId,
        card_id: CardId,
    ) -> TaskboardResult<Column> {
        let columns = ColumnModel::open(&self.db)?;
        let filter = active_by_id(column_id)
            .and(Filter::not_contains(column::fields::CARD_ORDER_IDS, card_id));
        let update = touched(Update::new().push(column::fields::CARD_ORDER_IDS, card_id));

        match columns.collection().find_one_and_update(&filter, &update).await? {
            Some(column) => {
                tracing::debug!("Appended card {} to column {}", card_id, column_id);
                self.repair_column(column, Some(card_id)).await
            }
            None => match columns.find_active(column_id).await? {
                None => Err(not_found::<Column>(column_id)),
                Some(_) => Err(TaskboardError::Conflict(format!(
                    "card {card_id} is already in cardOrderIds of column {column_id}"
                ))),
            },
        }
    }

    /// Pull a card from a column's order. Fails with `Conflict` while the card
    /// is active and its `columnId` still names this column.
    pub async fn remove_card(
        &self,
        column_id: ColumnId,
        card_id: CardId,
    ) -> TaskboardResult<Column> {
        let still_held = CardModel::open(&self.db)?
            .find_active(card_id)
            .await?
            .is_some_and(|card| card.column_id == column_id);
        if still_held {
            return Err(TaskboardError::Conflict(format!(
                "card {card_id} is still active in column {column_id}"
            )));
        }
        let columns = ColumnModel::open(&self.db)?;
        let update = touched(Update::new().pull(column::fields::CARD_ORDER_IDS, card_id));
        let column = columns
            .collection()
            .find_one_and_update(&active_by_id(column_id), &update)
            .await?
            .ok_or_else(|| not_found::<Column>(column_id))?;
        tracing::debug!("Removed card {} from column {}", card_id, column_id);
        self.reconcile_column(column).await
    }

    /// Overwrite a board's column order. Duplicates are a `Conflict`; IDs that
    /// are not active columns of the board are dropped by the reconcile.
    pub async fn set_column_order(
        &self,
        board_id: BoardId,
        order: Vec<ColumnId>,
    ) -> TaskboardResult<Board> {
        reject_duplicates(board::fields::COLUMN_ORDER_IDS, &order)?;
        let boards = BoardModel::open(&self.db)?;
        let update = touched(Update::new().set(board::fields::COLUMN_ORDER_IDS, &order));
        let board = boards
            .collection()
            .find_one_and_update(&active_by_id(board_id), &update)
            .await?
            .ok_or_else(|| not_found::<Board>(board_id))?;
        self.reconcile_board(board).await
    }

    pub async fn set_card_order(
        &self,
        column_id: ColumnId,
        order: Vec<CardId>,
    ) -> TaskboardResult<Column> {
        reject_duplicates(column::fields::CARD_ORDER_IDS, &order)?;
        let columns = ColumnModel::open(&self.db)?;
        let update = touched(Update::new().set(column::fields::CARD_ORDER_IDS, &order));
        let column = columns
            .collection()
            .find_one_and_update(&active_by_id(column_id), &update)
            .await?
            .ok_or_else(|| not_found::<Column>(column_id))?;
        self.reconcile_column(column).await
    }

    /// Apply a client-computed move: source array, target array, then the
    /// card's `columnId`, in that order.
    pub async fn move_card_to_different_column(
        &self,
        card_move: &CardMove,
    ) -> TaskboardResult<CardMoveOutcome> {
        let columns = ColumnModel::open(&self.db)?;
        let cards = CardModel::open(&self.db)?;

        let prev = columns.require_active(card_move.prev_column_id).await?;
        let next = columns.require_active(card_move.next_column_id).await?;
        let card = cards.require_active(card_move.card_id).await?;
        for (field, column) in [
            (move_fields::PREV_COLUMN_ID, &prev),
            (move_fields::NEXT_COLUMN_ID, &next),
        ] {
            if column.board_id != card.board_id {
                return Err(TaskboardError::validation(
                    field,
                    "must belong to the same board as the card",
                ));
            }
        }

        if self.strict_moves {
            verify_move(card_move, &prev.card_order_ids, &next.card_order_ids)
                .map_err(TaskboardError::Validation)?;
        }

        let prev = write_move_step(
            &columns,
            card_move.card_id,
            1,
            card_move.prev_column_id,
            &card_move.prev_card_order_ids,
        )
        .await?;
        let next = write_move_step(
            &columns,
            card_move.card_id,
            2,
            card_move.next_column_id,
            &card_move.next_card_order_ids,
        )
        .await?;

        let card = match cards.set_column(card_move.card_id, card_move.next_column_id).await {
            Ok(Some(card)) => card,
            Ok(None) => {
                tracing::error!("Move of card {} stopped at step 3: card vanished", card_move.card_id);
                return Err(not_found::<Card>(card_move.card_id));
            }
            Err(e) => {
                tracing::error!("Move of card {} failed at step 3: {}", card_move.card_id, e);
                return Err(e);
            }
        };
        tracing::info!(
            "Moved card {} from column {} to column {}",
            card.id,
            card_move.prev_column_id,
            card_move.next_column_id
        );

        Ok(CardMoveOutcome {
            card,
            prev_column: self.reconcile_column(prev).await?,
            next_column: self.reconcile_column(next).await?,
        })
    }

    /// Make `columnOrderIds` a permutation of the board's active columns,
    /// writing back only when it changed.
    pub async fn reconcile_board(&self, board: Board) -> TaskboardResult<Board> {
        self.repair_board(board, None).await
    }

    async fn repair_board(&self, board: Board, last: Option<ColumnId>) -> TaskboardResult<Board> {
        let children: Vec<Uuid> = ColumnModel::open(&self.db)?
            .find_active_by_board(board.id)
            .await?
            .iter()
            .map(|c| c.id)
            .collect();
        let mut repaired = reconcile(&board.column_order_ids, &children);
        if let Some(id) = last {
            repaired = repaired.keep_last(id);
        }
        if repaired.order == board.column_order_ids {
            return Ok(board);
        }

        tracing::warn!(
            "Repaired columnOrderIds of board {}: dropped {:?}, appended {:?}",
            board.id,
            repaired.dropped,
            repaired.appended
        );
        let update = Update::new().set(board::fields::COLUMN_ORDER_IDS, &repaired.order);
        let stored = BoardModel::open(&self.db)?
            .collection()
            .find_one_and_update(&by_id(board.id), &update)
            .await?;
        Ok(stored.unwrap_or(Board {
            column_order_ids: repaired.order,
            ..board
        }))
    }

    /// Make `cardOrderIds` a permutation of the cards whose `columnId` is this
    /// column, writing back only when it changed.
    pub async fn reconcile_column(&self, column: Column) -> TaskboardResult<Column> {
        self.repair_column(column, None).await
    }

    async fn repair_column(&self, column: Column, last: Option<CardId>) -> TaskboardResult<Column> {
        let children: Vec<Uuid> = CardModel::open(&self.db)?
            .find_active_by_column(column.id)
            .await?
            .iter()
            .map(|c| c.id)
            .collect();
        let mut repaired = reconcile(&column.card_order_ids, &children);
        if let Some(id) = last {
            repaired = repaired.keep_last(id);
        }
        if repaired.order == column.card_order_ids {
            return Ok(column);
        }

        tracing::warn!(
            "Repaired cardOrderIds of column {}: dropped {:?}, appended {:?}",
            column.id,
            repaired.dropped,
            repaired.appended
        );
        let update = Update::new().set(column::fields::CARD_ORDER_IDS, &repaired.order);
        let stored = ColumnModel::open(&self.db)?
            .collection()
            .find_one_and_update(&by_id(column.id), &update)
            .await?;
        Ok(stored.unwrap_or(Column {
            card_order_ids: repaired.order,
            ..column
        }))
    }

    /// Reconciled projection of an active column.
    pub async fn column_projection(&self, column_id: ColumnId) -> TaskboardResult<Column> {
        let column = ColumnModel::open(&self.db)?.require_active(column_id).await?;
        self.reconcile_column(column).await
    }

    /// Reconciled projection of an active board.
    pub async fn board_projection(&self, board_id: BoardId) -> TaskboardResult<Board> {
        let board = BoardModel::open(&self.db)?.require_active(board_id).await?;
        self.reconcile_board(board).await
    }
}

/// One order-array overwrite of a move. Logs the failing step before
/// propagating.
async fn write_move_step(
    columns: &ColumnModel,
    card_id: CardId,
    step: u8,
    column_id: ColumnId,
    order: &[CardId],
) -> TaskboardResult<Column> {
    let update = touched(Update::new().set(column::fields::CARD_ORDER_IDS, order));
    match columns
        .collection()
        .find_one_and_update(&active_by_id(column_id), &update)
        .await
    {
        Ok(Some(column)) => Ok(column),
        Ok(None) => {
            tracing::error!(
                "Move of card {} stopped at step {}: column {} vanished",
                card_id,
                step,
                column_id
            );
            Err(not_found::<Column>(column_id))
        }
        Err(e) => {
            tracing::error!(
                "Move of card {} failed at step {} (column {}): {}",
                card_id,
                step,
                column_id,
                e
            );
            Err(e)
        }
    }
}

pub(crate) fn reject_duplicates(field: &str, order: &[Uuid]) -> TaskboardResult<()> {
    let repeated = duplicates(order);
    if repeated.is_empty() {
        return Ok(());
    }
    Err(TaskboardError::Conflict(format!(
        "{field} lists {} more than once",
        repeated
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    )))
}
