//! Local input validation.
//!
//! These checks run before any network call; inputs that fail them never
//! reach the gateway. The rules match what the backend enforces: all fields
//! present, plausible email shape, passwords matching and at least 8 chars.

use charla_types::error::{MIN_PASSWORD_LEN, ValidationError};

/// Shape check equivalent to `^[^\s@]+@[^\s@]+\.[^\s@]+$`: one `@`, a
/// non-empty local part, and a domain with a dot separating non-empty parts,
/// none of it containing whitespace or a second `@`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if host.is_empty() || tld.is_empty() {
        return false;
    }
    !email.contains(char::is_whitespace)
}

/// Validate a registration form.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if username.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Validate a login form.
pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

/// Trim a message and reject it when nothing remains.
pub fn non_empty_message(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana@example."));
        assert!(!is_valid_email("an a@example.com"));
        assert!(!is_valid_email("ana@@example.com"));
    }

    #[test]
    fn test_registration_rules_in_order() {
        assert_eq!(
            validate_registration("", "a@b.c", "secretos", "secretos"),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_registration("ana", "bad", "secretos", "secretos"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_registration("ana", "a@b.c", "secretos", "otros"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration("ana", "a@b.c", "short", "short"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_registration("ana", "a@b.c", "secretos", "secretos"),
            Ok(())
        );
    }

    #[test]
    fn test_login_rules() {
        assert_eq!(
            validate_login("", "pw"),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_login("ana", ""),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(validate_login("ana", "pw"), Ok(()));
    }

    #[test]
    fn test_non_empty_message_trims() {
        assert_eq!(non_empty_message("  hola  ").unwrap(), "hola");
        assert_eq!(non_empty_message("   "), Err(ValidationError::EmptyMessage));
        assert_eq!(non_empty_message(""), Err(ValidationError::EmptyMessage));
    }
}
