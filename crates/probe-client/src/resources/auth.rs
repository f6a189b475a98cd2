use probe_core::ProbeResult;

use crate::client::ApiClient;
use crate::exchange::Exchange;
use crate::models::{LoginRequest, RegisterRequest};

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub const REGISTER: &'static str = "auth/register";
    pub const LOGIN: &'static str = "auth/login";

    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/register`, answered with 201 and `{user, token}`.
    pub async fn register(&self, request: &RegisterRequest) -> ProbeResult<Exchange> {
        self.client.post(Self::REGISTER, request).await
    }

    /// `POST /auth/login`, answered with 200 and `{user, token}`.
    pub async fn login(&self, request: &LoginRequest) -> ProbeResult<Exchange> {
        self.client.post(Self::LOGIN, request).await
    }
}
