use probe_client::{BoardInput, BoardPatch, Fetch, Resource};

use crate::cli::{BoardAction, BoardUpdateArgs};
use crate::context::ProbeContext;

pub async fn handle(ctx: &ProbeContext, action: BoardAction) -> anyhow::Result<()> {
    ctx.require_token()?;
    let boards = ctx.client.boards();
    let exchange = match action {
        BoardAction::List => boards.list().await?,
        BoardAction::Get { id } => boards.get(&id).await?,
        BoardAction::Create { title, description } => {
            boards
                .create(&BoardInput {
                    title,
                    description: description.unwrap_or_default(),
                })
                .await?
        }
        BoardAction::Update(BoardUpdateArgs {
            id,
            title,
            description,
        }) => boards.update(&id, &BoardPatch { title, description }).await?,
        BoardAction::Delete { id } => boards.delete(&id).await?,
        BoardAction::Members { id } => boards.members(&id).await?,
    };
    ctx.show(&exchange)
}
