//! UI Components

pub mod navbar;
pub mod tip;
pub mod toast;

pub use navbar::Navbar;
pub use tip::TipDialog;
pub use toast::{provide_toast_context, use_toast_context, ToastContext, ToastStack};
