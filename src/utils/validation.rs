//! Input validation utilities
//!
//! Provides the display name syntax check.

/// Longest accepted display name, in characters.
pub const MAX_NAME_LENGTH: usize = 20;

/// Validate that a display name is 1 to 20 ASCII alphanumeric characters
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LENGTH
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}
