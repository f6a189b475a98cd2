use probe_client::{CommentInput, CommentPatch, Resource};

use crate::cli::CommentAction;
use crate::context::ProbeContext;

pub async fn handle(ctx: &ProbeContext, action: CommentAction) -> anyhow::Result<()> {
    ctx.require_token()?;
    let comments = ctx.client.comments();
    let exchange = match action {
        CommentAction::List { card_id } => comments.for_card(&card_id).await?,
        CommentAction::Create { card_id, text } => {
            comments.create(&CommentInput { text, card_id }).await?
        }
        CommentAction::Update { id, text } => {
            comments.update(&id, &CommentPatch { text }).await?
        }
        CommentAction::Delete { id } => comments.delete(&id).await?,
    };
    ctx.show(&exchange)
}
