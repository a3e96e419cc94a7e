//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates password strength.
///
/// Requirements:
/// - At least 8 characters
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::new("password_too_short"));
    }
    Ok(())
}

/// Validates an optional phone number in loose E.164 shape.
///
/// Requirements:
/// - Optional leading `+`
/// - 7-15 digits, spaces/dashes/parentheses tolerated
pub fn validate_optional_phone(phone: &str) -> Result<(), ValidationError> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(7..=15).contains(&digits.len()) {
        return Err(ValidationError::new("phone_invalid_length"));
    }

    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if !allowed {
        return Err(ValidationError::new("phone_invalid_characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rejects_short() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("1234567").is_err());
    }

    #[test]
    fn password_accepts_eight_chars() {
        assert!(validate_password_strength("longenough").is_ok());
        assert!(validate_password_strength("12345678").is_ok());
    }

    #[test]
    fn phone_rejects_letters() {
        assert!(validate_optional_phone("not-a-number").is_err());
    }

    #[test]
    fn phone_accepts_common_shapes() {
        assert!(validate_optional_phone("+1 (555) 010-2030").is_ok());
        assert!(validate_optional_phone("5550102030").is_ok());
    }

    #[test]
    fn phone_rejects_too_short() {
        assert!(validate_optional_phone("123").is_err());
    }
}
