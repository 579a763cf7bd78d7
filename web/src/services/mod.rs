//! External collaborators: the directory REST service, the wallet provider,
//! and the RIZZ token contract.

pub mod directory;
pub mod ethereum;
pub mod token;
