use probe_core::ProbeResult;

use super::{Fetch, Resource};
use crate::client::ApiClient;
use crate::exchange::Exchange;
use crate::models::{CardInput, EntityId};

pub struct Cards<'a> {
    client: &'a ApiClient,
}

impl<'a> Cards<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `GET /cards`, filtered with `?list=` when a list is given.
    pub async fn list(&self, list_id: Option<&EntityId>) -> ProbeResult<Exchange> {
        let query: Vec<(&str, String)> = list_id
            .map(|id| vec![("list", id.to_string())])
            .unwrap_or_default();
        self.client.get(Self::PATH, &query).await
    }
}

impl Resource for Cards<'_> {
    const PATH: &'static str = "cards";
    type Input = CardInput;
    type Patch = CardInput;

    fn client(&self) -> &ApiClient {
        self.client
    }
}

impl Fetch for Cards<'_> {}
