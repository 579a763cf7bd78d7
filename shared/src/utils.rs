//! # Shared Utility Functions
//!
//! Address display helpers used across the web client.
//!
//! ## Address Formatting
//!
//! - [`format_address`] - Format an address with ellipsis (first N and last M characters)
//! - [`truncate_address`] - Alias for `format_address` with default parameters
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::truncate_address;
//!
//! let address = "0x7B7E367B6F328F16cfe61336928908cc91289353";
//! assert_eq!(truncate_address(address), "0x7B7E...9353");
//! ```

/// Format a wallet address by showing the first `prefix_len` and last
/// `suffix_len` characters.
///
/// If the address is shorter than `prefix_len + suffix_len`, it is returned
/// as-is. Hex addresses are ASCII-only, so byte indexing is safe.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_address;
///
/// let addr = "0x7B7E367B6F328F16cfe61336928908cc91289353";
/// assert_eq!(format_address(addr, 6, 4), "0x7B7E...9353");
/// assert_eq!(format_address(addr, 10, 6), "0x7B7E367B...289353");
/// assert_eq!(format_address("0xAAA", 6, 4), "0xAAA");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    if address_len <= prefix_len + suffix_len
        || prefix_len >= address_len
        || suffix_len >= address_len
    {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format a wallet address with the default 6-character prefix (keeping the
/// `0x` visible) and 4-character suffix.
///
/// # Examples
///
/// ```rust
/// use shared::utils::truncate_address;
///
/// let addr = "0x7B7E367B6F328F16cfe61336928908cc91289353";
/// assert_eq!(truncate_address(addr), "0x7B7E...9353");
/// ```
pub fn truncate_address(address: &str) -> String {
    format_address(address, 6, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        let addr = "0x7B7E367B6F328F16cfe61336928908cc91289353";
        assert_eq!(format_address(addr, 6, 4), "0x7B7E...9353");
        assert_eq!(format_address(addr, 4, 4), "0x7B...9353");
        assert_eq!(format_address(addr, 2, 2), "0x...53");
    }

    #[test]
    fn test_format_address_short() {
        assert_eq!(format_address("0xAAA", 6, 4), "0xAAA");
        assert_eq!(format_address("", 6, 4), "");
    }

    #[test]
    fn test_truncate_address() {
        let addr = "0x7B7E367B6F328F16cfe61336928908cc91289353";
        assert_eq!(truncate_address(addr), "0x7B7E...9353");
    }
}
