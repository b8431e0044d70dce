use crate::cli::ColumnAction;
use crate::context::CliContext;
use crate::handlers::board::non_empty;
use crate::output;
use taskboard_domain::{BoardOperations, CreateColumnRequest, UpdateColumnRequest};

pub async fn handle(ctx: &CliContext, action: ColumnAction) -> anyhow::Result<()> {
    match action {
        ColumnAction::Create { board_id, title } => {
            let column = ctx
                .service
                .create_column(CreateColumnRequest {
                    board_id: Some(board_id),
                    title: Some(title),
                })
                .await?;
            output::output_success(&column);
        }
        ColumnAction::Update {
            id,
            title,
            card_order,
        } => {
            let request = UpdateColumnRequest {
                title,
                card_order_ids: card_order.map(non_empty),
            };
            let column = ctx.service.update_column(id, request).await?;
            output::output_success(&column);
        }
        ColumnAction::Delete { id } => {
            let deletion = ctx.service.delete_column(id).await?;
            output::output_success(&deletion);
        }
    }
    Ok(())
}
