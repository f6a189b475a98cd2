use probe_core::ProbeResult;

use super::Resource;
use crate::client::ApiClient;
use crate::exchange::Exchange;
use crate::models::{CommentInput, CommentPatch, EntityId};

pub struct Comments<'a> {
    client: &'a ApiClient,
}

impl<'a> Comments<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Comments attached to a card, `GET /comments/:cardId`.
    pub async fn for_card(&self, card_id: &EntityId) -> ProbeResult<Exchange> {
        self.client.get(&Self::item_path(card_id), &[]).await
    }
}

impl Resource for Comments<'_> {
    const PATH: &'static str = "comments";
    type Input = CommentInput;
    type Patch = CommentPatch;

    fn client(&self) -> &ApiClient {
        self.client
    }
}
