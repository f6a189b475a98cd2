use probe_core::ProbeResult;

use super::{Fetch, Resource};
use crate::client::ApiClient;
use crate::exchange::Exchange;
use crate::models::{EntityId, ListInput};

pub struct Lists<'a> {
    client: &'a ApiClient,
}

impl<'a> Lists<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /lists`, optionally narrowed with `?board_id=`.
    pub async fn list(&self, board_id: Option<&EntityId>) -> ProbeResult<Exchange> {
        let query: Vec<(&str, String)> = board_id
            .map(|id| vec![("board_id", id.to_string())])
            .unwrap_or_default();
        self.client.get(Self::PATH, &query).await
    }
}

impl Resource for Lists<'_> {
    const PATH: &'static str = "lists";
    type Input = ListInput;
    type Patch = ListInput;

    fn client(&self) -> &ApiClient {
        self.client
    }
}

impl Fetch for Lists<'_> {}
