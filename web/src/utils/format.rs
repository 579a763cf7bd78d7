//! # Formatting Utilities
//!
//! Display helpers for the match feed and chat views. For address
//! formatting, use [`shared::utils::format_address`] or
//! [`shared::utils::truncate_address`].

/// Format a compatibility score for display.
///
/// # Examples
///
/// ```rust
/// use vibematch_web::utils::format::format_match_percentage;
///
/// assert_eq!(format_match_percentage(85), "85% Match");
/// ```
pub fn format_match_percentage(percentage: u8) -> String {
    format!("{}% Match", percentage.min(100))
}

/// Avatar initial for a display name: first character, uppercased.
///
/// # Examples
///
/// ```rust
/// use vibematch_web::utils::format::avatar_initials;
///
/// assert_eq!(avatar_initials("bob"), "B");
/// assert_eq!(avatar_initials("  "), "U");
/// ```
pub fn avatar_initials(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "U".to_string())
}

/// Format a portfolio share as a percentage with one decimal place.
pub fn format_asset_share(share: f64) -> String {
    format!("{:.1}%", share)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_match_percentage() {
        assert_eq!(format_match_percentage(70), "70% Match");
        assert_eq!(format_match_percentage(130), "100% Match");
    }

    #[test]
    fn test_avatar_initials() {
        assert_eq!(avatar_initials("alice"), "A");
        assert_eq!(avatar_initials("Ökonom"), "Ö");
        assert_eq!(avatar_initials(""), "U");
    }

    #[test]
    fn test_format_asset_share() {
        assert_eq!(format_asset_share(62.5), "62.5%");
        assert_eq!(format_asset_share(0.0), "0.0%");
    }
}
