pub mod board;
pub mod card;
pub mod column;
pub mod details;
pub mod field_update;
pub mod ids;
pub mod operations;
pub mod ordering;
pub mod requests;
pub mod validation;

pub use board::{slugify, Board, BoardType};
pub use card::Card;
pub use column::Column;
pub use details::{BoardDetails, CardMoveOutcome, ColumnDeletion};
pub use field_update::FieldUpdate;
pub use ids::{parse_id, BoardId, CardId, ColumnId, UserId};
pub use operations::BoardOperations;
pub use requests::{
    BoardUpdate, CardMove, CardUpdate, ColumnUpdate, CreateBoardRequest, CreateCardRequest,
    CreateColumnRequest, MoveCardRequest, NewBoard, NewCard, NewColumn, UpdateBoardRequest,
    UpdateCardRequest, UpdateColumnRequest,
};
