use probe_client::{CardInput, Fetch, Resource};

use crate::cli::{CardAction, CardUpdateArgs};
use crate::context::ProbeContext;

pub async fn handle(ctx: &ProbeContext, action: CardAction) -> anyhow::Result<()> {
    ctx.require_token()?;
    let cards = ctx.client.cards();
    let exchange = match action {
        CardAction::List { list_id } => cards.list(list_id.as_ref()).await?,
        CardAction::Get { id } => cards.get(&id).await?,
        CardAction::Create {
            title,
            list_id,
            description,
        } => {
            cards
                .create(&CardInput {
                    title: Some(title),
                    description,
                    list_id: Some(list_id),
                })
                .await?
        }
        CardAction::Update(CardUpdateArgs {
            id,
            title,
            description,
            list_id,
        }) => {
            cards
                .update(
                    &id,
                    &CardInput {
                        title,
                        description,
                        list_id,
                    },
                )
                .await?
        }
        CardAction::Delete { id } => cards.delete(&id).await?,
    };
    ctx.show(&exchange)
}
