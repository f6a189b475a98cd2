pub mod client;
pub mod exchange;
#[cfg(feature = "mock-server")]
pub mod mock;
pub mod models;
pub mod render;
pub mod resources;

pub use client::ApiClient;
pub use exchange::{Exchange, RequestRecord, ResponseRecord};
pub use models::{
    AuthSession, BoardInput, BoardPatch, CardInput, CommentInput, CommentPatch, Credentials,
    EntityId, ListInput, LoginRequest, RegisterRequest, UserSummary,
};
pub use resources::{AuthApi, Boards, Cards, Comments, Fetch, Lists, Resource};
