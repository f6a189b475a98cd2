use probe_client::{Fetch, ListInput, Resource};

use crate::cli::{ListAction, ListUpdateArgs};
use crate::context::ProbeContext;

pub async fn handle(ctx: &ProbeContext, action: ListAction) -> anyhow::Result<()> {
    ctx.require_token()?;
    let lists = ctx.client.lists();
    let exchange = match action {
        ListAction::List { board_id } => lists.list(board_id.as_ref()).await?,
        ListAction::Get { id } => lists.get(&id).await?,
        ListAction::Create { title, board_id } => {
            lists
                .create(&ListInput {
                    title: Some(title),
                    board_id: Some(board_id),
                })
                .await?
        }
        ListAction::Update(ListUpdateArgs {
            id,
            title,
            board_id,
        }) => lists.update(&id, &ListInput { title, board_id }).await?,
        ListAction::Delete { id } => lists.delete(&id).await?,
    };
    ctx.show(&exchange)
}
