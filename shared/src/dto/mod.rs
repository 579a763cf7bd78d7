//! Data Transfer Objects for the directory service API.

pub mod chat;
pub mod users;

pub use chat::*;
pub use users::*;
