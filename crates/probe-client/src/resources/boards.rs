use probe_core::ProbeResult;

use super::{Fetch, Resource};
use crate::client::ApiClient;
use crate::exchange::Exchange;
use crate::models::{BoardInput, BoardPatch, EntityId};

pub struct Boards<'a> {
    client: &'a ApiClient,
}

impl<'a> Boards<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ProbeResult<Exchange> {
        self.client.get(Self::PATH, &[]).await
    }

    pub async fn members(&self, id: &EntityId) -> ProbeResult<Exchange> {
        let path = format!("{}/members", Self::item_path(id));
        self.client.get(&path, &[]).await
    }
}

impl Resource for Boards<'_> {
    const PATH: &'static str = "boards";
    type Input = BoardInput;
    type Patch = BoardPatch;

    fn client(&self) -> &ApiClient {
        self.client
    }
}

impl Fetch for Boards<'_> {}
