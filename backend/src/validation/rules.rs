//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates username format.
///
/// Requirements:
/// - 1-50 characters in length
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() || username.chars().count() > 50 {
        return Err(ValidationError::new("username_invalid_length"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_empty() {
        let result = validate_username("");
        assert!(result.is_err());
    }

    #[test]
    fn username_rejects_overlong() {
        let result = validate_username(&"x".repeat(51));
        assert!(result.is_err());
    }

    #[test]
    fn username_accepts_valid() {
        let result = validate_username("valid_user123");
        assert!(result.is_ok());
    }
}
