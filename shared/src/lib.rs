//! # Shared Data Transfer Objects Library
//!
//! This library defines the contract between the VibeMatch web client and the
//! external directory service. All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects for directory API communication
//!   - **[`dto::users`]**: user records, registration, match scores, friends
//!   - **[`dto::chat`]**: chat threads and messages
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::format_address`]**: Format wallet addresses for display
//!   - **[`utils::truncate_address`]**: Truncate addresses with ellipsis
//!
//! ## Wire Format
//!
//! The directory service speaks Mongo-flavored JSON:
//! - Record ids travel as `_id` (mapped to the `id` field on the Rust side)
//! - User fields use **snake_case** (`wallet_address`, `chain_data`)
//! - Chat fields use **camelCase** (`lastMessage`, `unreadCount`)
//! - Optional fields are omitted when `None` and tolerated when absent
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::users::UserRecord;
//!
//! let record: UserRecord = serde_json::from_str(
//!     r#"{"_id":"665f1c2e","wallet_address":"0xAAA","nickname":"Bob"}"#,
//! ).unwrap();
//! assert_eq!(record.id.as_deref(), Some("665f1c2e"));
//! assert_eq!(record.nickname, "Bob");
//! ```

pub mod dto;
pub mod utils;

// Re-export commonly used types for convenience
// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
pub use utils::*;
