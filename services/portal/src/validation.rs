//! Signup input validation

use regex::Regex;
use std::sync::OnceLock;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let length = username.chars().count();

    if length < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if length > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();

    if length < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if length > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if !c.is_alphanumeric() {
            has_special = true;
        }
    }

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

/// Validate a signup submission, reporting the first problem found
pub fn validate_signup(username: &str, password: &str) -> Result<(), String> {
    validate_username(username)?;
    validate_password(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert_eq!(
            validate_username("").unwrap_err(),
            "Username is required"
        );
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("alice<script>").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Sup3r$ecret").is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(validate_password("").unwrap_err(), "Password is required");
        assert!(validate_password("S3$a").is_err());
        assert!(validate_password(&format!("Aa1!{}", "x".repeat(125))).is_err());
        assert_eq!(
            validate_password("sup3r$ecret").unwrap_err(),
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            validate_password("SUP3R$ECRET").unwrap_err(),
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            validate_password("Super$ecret").unwrap_err(),
            "Password must contain at least one digit"
        );
        assert_eq!(
            validate_password("Sup3rSecret").unwrap_err(),
            "Password must contain at least one special character"
        );
    }

    #[test]
    fn test_signup_reports_username_first() {
        assert_eq!(
            validate_signup("", "").unwrap_err(),
            "Username is required"
        );
        assert!(validate_signup("alice", "Sup3r$ecret").is_ok());
    }
}
