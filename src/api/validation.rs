//! Input validation for API requests.
//!
//! Payload shape and format checks happen here, before anything reaches the
//! auth core. The core assumes well-typed inputs and raises only domain
//! errors, so every rejection in this module is a 400.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating reset codes (exactly six digits)
    static ref RESET_CODE_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
}

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate a login identifier (username or email)
pub fn validate_login_id(login_id: &str) -> Result<(), String> {
    if login_id.trim().is_empty() {
        return Err("Login id is required".to_string());
    }
    if login_id.len() > 254 {
        return Err("Login id is too long (max 254 characters)".to_string());
    }
    Ok(())
}

/// Validate a reset code (must be exactly six digits)
pub fn validate_reset_code(code: &str) -> Result<(), String> {
    if RESET_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        Err("Code must be a 6-digit number".to_string())
    }
}

/// Validate a new password
pub fn validate_new_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_id_must_not_be_blank() {
        assert!(validate_login_id("admin").is_ok());
        assert!(validate_login_id("jane.doe@example.com").is_ok());
        assert!(validate_login_id("").is_err());
        assert!(validate_login_id("   ").is_err());
        assert!(validate_login_id(&"x".repeat(255)).is_err());
    }

    #[test]
    fn reset_code_must_be_exactly_six_digits() {
        assert!(validate_reset_code("000000").is_ok());
        assert!(validate_reset_code("123456").is_ok());
        assert!(validate_reset_code("12345").is_err());
        assert!(validate_reset_code("1234567").is_err());
        assert!(validate_reset_code("12345a").is_err());
        assert!(validate_reset_code(" 123456").is_err());
        assert!(validate_reset_code("").is_err());
    }

    #[test]
    fn new_password_has_a_minimum_length() {
        assert!(validate_new_password("secret").is_ok());
        assert!(validate_new_password("short").is_err());
        assert!(validate_new_password("").is_err());
    }
}
