// src/utils.rs

//! Utility helpers shared across the storefront core.

pub mod time;

pub use time::Time;

/// String helpers
pub mod strings {
    /// Returns true when the string is empty or whitespace-only
    pub fn is_blank(s: &str) -> bool {
        s.trim().is_empty()
    }

    /// Truncate string to maximum length with ellipsis
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            s.to_string()
        } else {
            format!("{}...", &s[..max_len.saturating_sub(3)])
        }
    }
}

/// Validation utilities
pub mod validation {
    /// Email validation (basic)
    pub fn is_valid_email(email: &str) -> bool {
        email.contains('@') && email.contains('.') && email.len() > 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(strings::is_blank(""));
        assert!(strings::is_blank("   \t\n"));
        assert!(!strings::is_blank("great value"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(strings::truncate("short", 10), "short");
        assert_eq!(strings::truncate("a very long comment", 10), "a very ...");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(validation::is_valid_email("demo@nectar.app"));
        assert!(!validation::is_valid_email("demo"));
        assert!(!validation::is_valid_email("a@b."));
    }
}
