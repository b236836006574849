use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9+\-() ]{7,20}$").expect("phone regex is valid"))
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !email_regex().is_match(email.trim()) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }
    Ok(())
}

/// Swedish numbers are entered in many shapes (070-123 45 67, +46701234567),
/// so only the character set and a sane length are checked.
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let phone = phone.trim();
    if !phone_regex().is_match(phone) || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "Invalid phone number".to_string(),
        ));
    }
    Ok(())
}

pub fn require_non_empty(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

/// Lowercased, trimmed email used for lookups and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("anna@salong.se").is_ok());
        assert!(validate_email(" anna@salong.se ").is_ok());
        assert!(validate_email("anna@salong").is_err());
        assert!(validate_email("anna salong@x.se").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("070-123 45 67").is_ok());
        assert!(validate_phone("+46701234567").is_ok());
        assert!(validate_phone("070").is_err());
        assert!(validate_phone("call me maybe").is_err());
        assert!(validate_phone("-------").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Anna@Salong.SE "), "anna@salong.se");
    }
}
