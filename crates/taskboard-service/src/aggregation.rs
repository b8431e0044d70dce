//! Read-side joins. Nothing here writes; drift in order arrays is returned
//! as stored.

use std::sync::Arc;

use serde_json::Value;
use taskboard_core::{fields, Entity, PageRequest, Paginated, TaskboardResult};
use taskboard_domain::{board, card, column, Board, BoardDetails, BoardId, Card, Column, UserId};
use taskboard_persistence::{Collation, Database, Lookup, Pipeline, SortDirection, Stage};

use crate::models::{active, active_by_id, BoardModel};

const COLLATION_LOCALE: &str = "en";
const PAGE_FACET: &str = "queryBoards";
const TOTAL_FACET: &str = "queryTotalBoards";
const TOTAL_FIELD: &str = "countedAllBoards";

pub struct AggregationEngine {
    db: Arc<Database>,
}

impl AggregationEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// A board with its active columns and cards, or `None` when the board
    /// is missing or deleted.
    pub async fn get_board_details(
        &self,
        board_id: BoardId,
    ) -> TaskboardResult<Option<BoardDetails>> {
        let boards = BoardModel::open(&self.db)?;
        let pipeline = Pipeline::new()
            .matching(active_by_id(board_id))
            .lookup(
                Lookup::new(Column::COLLECTION, fields::ID, column::fields::BOARD_ID, "columns")
                    .with_filter(active()),
            )
            .lookup(
                Lookup::new(Card::COLLECTION, fields::ID, card::fields::BOARD_ID, "cards")
                    .with_filter(active()),
            );

        let details = boards
            .collection()
            .aggregate(&pipeline)
            .await?
            .into_iter()
            .next()
            .map(serde_json::from_value::<BoardDetails>)
            .transpose()?;
        tracing::debug!(
            "Board details for {}: {}",
            board_id,
            if details.is_some() { "found" } else { "none" }
        );
        Ok(details)
    }

    /// One page of the user's active boards sorted by title, plus the total
    /// across all pages, from a single pipeline.
    pub async fn list_boards_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> TaskboardResult<Paginated<Board>> {
        let boards = BoardModel::open(&self.db)?;
        let pipeline = Pipeline::new()
            .matching(BoardModel::participant_filter(user_id))
            .sort(board::fields::TITLE, SortDirection::Ascending)
            .with_collation(Collation::locale(COLLATION_LOCALE))
            .facet(vec![
                (
                    PAGE_FACET.to_string(),
                    vec![Stage::Skip(page.skip()), Stage::Limit(page.limit())],
                ),
                (
                    TOTAL_FACET.to_string(),
                    vec![Stage::Count(TOTAL_FIELD.to_string())],
                ),
            ]);

        let result = boards
            .collection()
            .aggregate(&pipeline)
            .await?
            .into_iter()
            .next()
            .unwrap_or(Value::Null);

        let items: Vec<Board> = match result.get(PAGE_FACET) {
            Some(page_docs) => serde_json::from_value(page_docs.clone())?,
            None => Vec::new(),
        };
        // An empty match yields no count document at all.
        let total = result
            .get(TOTAL_FACET)
            .and_then(|docs| docs.get(0))
            .and_then(|doc| doc.get(TOTAL_FIELD))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        tracing::debug!(
            "Listed {} of {} boards for user {} (page {})",
            items.len(),
            total,
            user_id,
            page.page()
        );
        Ok(Paginated::new(items, total, page))
    }
}
