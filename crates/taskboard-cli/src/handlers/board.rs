use crate::cli::{BoardAction, BoardUpdateArgs};
use crate::context::CliContext;
use crate::output;
use taskboard_core::TaskboardError;
use taskboard_domain::{BoardOperations, CreateBoardRequest, UpdateBoardRequest};

pub async fn handle(ctx: &CliContext, action: BoardAction) -> anyhow::Result<()> {
    match action {
        BoardAction::Create {
            title,
            description,
            board_type,
        } => {
            let user = ctx.require_user()?;
            let request = CreateBoardRequest {
                title: Some(title),
                description,
                board_type: Some(board_type),
            };
            let board = ctx.service.create_board(user, request).await?;
            output::output_success(&board);
        }
        BoardAction::List {
            page,
            items_per_page,
        } => {
            let user = ctx.require_user()?;
            let page = ctx.service.page_request(page, items_per_page)?;
            let boards = ctx.service.list_boards(user, page).await?;
            output::output_success(&boards);
        }
        BoardAction::Get { id } => match ctx.service.get_board_details(id).await? {
            Some(details) => output::output_success(&details),
            None => return Err(TaskboardError::NotFound(format!("board {id}")).into()),
        },
        BoardAction::Update(args) => {
            let id = args.id;
            let request = update_request(args)?;
            let board = ctx.service.update_board(id, request).await?;
            output::output_success(&board);
        }
        BoardAction::Delete { id } => {
            ctx.service.delete_board(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
        BoardAction::AddMember { id, member } => {
            let board = ctx.service.add_board_member(id, member).await?;
            output::output_success(&board);
        }
    }
    Ok(())
}

/// Start from `--json` when given, then let explicit flags win.
fn update_request(args: BoardUpdateArgs) -> anyhow::Result<UpdateBoardRequest> {
    let mut request = match args.json {
        Some(raw) => {
            let body: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| TaskboardError::validation("json", e.to_string()))?;
            UpdateBoardRequest::from_raw(&body)?
        }
        None => UpdateBoardRequest::default(),
    };
    if args.title.is_some() {
        request.title = args.title;
    }
    if args.description.is_some() {
        request.description = args.description;
    }
    if args.board_type.is_some() {
        request.board_type = args.board_type;
    }
    if args.column_order.is_some() {
        request.column_order_ids = args.column_order.map(non_empty);
    }
    Ok(request)
}

/// `--flag ""` means an empty list.
pub fn non_empty(ids: Vec<String>) -> Vec<String> {
    ids.into_iter().filter(|id| !id.trim().is_empty()).collect()
}
