use crate::cli::{CardAction, CardMoveArgs};
use crate::context::CliContext;
use crate::handlers::board::non_empty;
use crate::output;
use taskboard_domain::{BoardOperations, CreateCardRequest, MoveCardRequest, UpdateCardRequest};

pub async fn handle(ctx: &CliContext, action: CardAction) -> anyhow::Result<()> {
    match action {
        CardAction::Create {
            board_id,
            column_id,
            title,
            description,
        } => {
            let request = CreateCardRequest {
                board_id: Some(board_id),
                column_id: Some(column_id),
                title: Some(title),
                description,
            };
            let card = ctx.service.create_card(request).await?;
            output::output_success(&card);
        }
        CardAction::Update {
            id,
            title,
            description,
            clear_description,
        } => {
            let request = UpdateCardRequest {
                title,
                description,
                clear_description,
            };
            let card = ctx.service.update_card(id, request).await?;
            output::output_success(&card);
        }
        CardAction::Delete { id } => {
            ctx.service.delete_card(id).await?;
            output::output_success(serde_json::json!({"deleted": id.to_string()}));
        }
        CardAction::Move(args) => {
            let outcome = ctx
                .service
                .move_card_to_different_column(move_request(args))
                .await?;
            output::output_success(&outcome);
        }
    }
    Ok(())
}

fn move_request(args: CardMoveArgs) -> MoveCardRequest {
    MoveCardRequest {
        current_card_id: args.card_id,
        prev_column_id: args.prev_column_id,
        prev_card_order_ids: args.prev_order.map(non_empty),
        next_column_id: args.next_column_id,
        next_card_order_ids: args.next_order.map(non_empty),
    }
}
