use async_trait::async_trait;
use probe_core::ProbeResult;
use serde::Serialize;

use crate::client::ApiClient;
use crate::exchange::Exchange;
use crate::models::EntityId;

pub mod auth;
pub mod boards;
pub mod cards;
pub mod comments;
pub mod lists;

pub use auth::AuthApi;
pub use boards::Boards;
pub use cards::Cards;
pub use comments::Comments;
pub use lists::Lists;

/// A REST collection mounted at `PATH`, with items at `PATH/<id>`.
#[async_trait]
pub trait Resource: Sync {
    const PATH: &'static str;
    type Input: Serialize + Sync;
    type Patch: Serialize + Sync;

    fn client(&self) -> &ApiClient;

    fn item_path(id: &EntityId) -> String {
        format!("{}/{}", Self::PATH, id)
    }

    async fn create(&self, input: &Self::Input) -> ProbeResult<Exchange> {
        self.client().post(Self::PATH, input).await
    }

    async fn update(&self, id: &EntityId, patch: &Self::Patch) -> ProbeResult<Exchange> {
        self.client().put(&Self::item_path(id), patch).await
    }

    async fn delete(&self, id: &EntityId) -> ProbeResult<Exchange> {
        self.client().delete(&Self::item_path(id)).await
    }
}

/// Collections that answer `GET PATH/<id>` with the item itself. Comments do
/// not: that path lists the comments of a card.
#[async_trait]
pub trait Fetch: Resource {
    async fn get(&self, id: &EntityId) -> ProbeResult<Exchange> {
        self.client().get(&Self::item_path(id), &[]).await
    }
}
