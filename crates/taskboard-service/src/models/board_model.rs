use taskboard_core::{Entity, TaskboardResult};
use taskboard_domain::{board, Board, BoardId, UserId};
use taskboard_persistence::{Filter, Update};

use super::{active, active_by_id, touched, Repository};

pub type BoardModel = Repository<Board>;

impl Repository<Board> {
    pub async fn create(&self, board: Board) -> TaskboardResult<Board> {
        board.validate_before_create()?;
        let board = self.insert(board).await?;
        tracing::info!("Created board {} ({})", board.id, board.slug);
        Ok(board)
    }

    /// Active boards the user owns or is a member of.
    pub fn participant_filter(user_id: UserId) -> Filter {
        active().and(
            Filter::contains(board::fields::OWNER_IDS, user_id)
                .or(Filter::contains(board::fields::MEMBER_IDS, user_id)),
        )
    }

    /// Push `user_id` onto `memberIds` unless already there. `None` when the
    /// board is inactive or the user was already a member.
    pub async fn push_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> TaskboardResult<Option<Board>> {
        let filter = active_by_id(board_id)
            .and(Filter::not_contains(board::fields::MEMBER_IDS, user_id));
        let update = touched(Update::new().push(board::fields::MEMBER_IDS, user_id));
        let updated = self.collection().find_one_and_update(&filter, &update).await?;
        if updated.is_some() {
            tracing::debug!("Added member {} to {} {}", user_id, Board::COLLECTION, board_id);
        }
        Ok(updated)
    }
}
