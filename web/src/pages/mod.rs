//! Page modules

pub mod chat;
pub mod discover;
pub mod login;
pub mod matches;
pub mod profile;

pub use chat::ChatPage;
pub use discover::DiscoverPage;
pub use login::LoginPage;
pub use matches::MatchesPage;
pub use profile::ProfilePage;
