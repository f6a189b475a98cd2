pub mod auth;
pub mod board;
pub mod card;
pub mod comment;
pub mod list;
pub mod mock;
pub mod run;
