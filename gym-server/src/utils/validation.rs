//! Input validation helpers
//!
//! Centralized text length constants and the registration rules that
//! `validator` derives cannot express (email domain, student id, card data).

use chrono::{Datelike, NaiveDate};

use crate::utils::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Person names, session types, instructors
pub const MAX_NAME_LEN: usize = 100;

/// Notes, feedback, descriptions
pub const MAX_NOTE_LEN: usize = 1000;

/// Notification titles
pub const MAX_TITLE_LEN: usize = 200;

/// Notification bodies
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Generic helpers ─────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty"))
            .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

// ── Registration rules ──────────────────────────────────────────────

/// `<local>@<domain>` with exactly the allowed domain (case-insensitive)
pub fn validate_email_domain(email: &str, allowed_domain: &str) -> Result<(), AppError> {
    let invalid = || {
        AppError::with_message(
            ErrorCode::InvalidEmailDomain,
            format!("Email must be a valid @{allowed_domain} address"),
        )
        .with_detail("field", "email")
    };

    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || !domain.eq_ignore_ascii_case(allowed_domain) {
        return Err(invalid());
    }
    Ok(())
}

/// Student id: 6 to 10 ASCII digits
pub fn validate_student_id(student_id: &str) -> Result<(), AppError> {
    let len_ok = (6..=10).contains(&student_id.len());
    if !len_ok || !student_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStudentId,
            "Student ID must be 6-10 digits",
        )
        .with_detail("field", "student_id"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::PasswordTooShort,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        )
        .with_detail("field", "password"));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN})"
        ))
        .with_detail("field", "password"));
    }
    Ok(())
}

/// Luhn checksum over a digit string
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = (b - b'0') as u32;
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn payment_error(field: &str, message: &str) -> AppError {
    AppError::with_message(ErrorCode::InvalidPaymentDetails, message).with_detail("field", field)
}

/// Credit card data supplied at registration
///
/// Spaces and dashes in the card number are ignored. The card stays valid
/// through the last day of its expiry month.
pub fn validate_card(
    number: Option<&str>,
    expiry: Option<&str>,
    cvv: Option<&str>,
    today: NaiveDate,
) -> Result<(), AppError> {
    let number: String = number
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    if !(13..=19).contains(&number.len()) || !luhn_valid(&number) {
        return Err(payment_error("card_number", "Invalid card number"));
    }

    let expiry = expiry.unwrap_or_default();
    let (mm, yy) = expiry
        .split_once('/')
        .filter(|(m, y)| m.len() == 2 && y.len() == 2)
        .ok_or_else(|| payment_error("card_expiry", "Card expiry must be MM/YY"))?;
    let month: u32 = mm
        .parse()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| payment_error("card_expiry", "Card expiry must be MM/YY"))?;
    let year: i32 = yy
        .parse::<i32>()
        .map(|y| 2000 + y)
        .map_err(|_| payment_error("card_expiry", "Card expiry must be MM/YY"))?;
    if (year, month) < (today.year(), today.month()) {
        return Err(payment_error("card_expiry", "Card has expired"));
    }

    let cvv = cvv.unwrap_or_default();
    if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
        return Err(payment_error("card_cvv", "CVV must be 3-4 digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_domain() {
        let domain = "my.jcu.edu.au";
        assert!(validate_email_domain("jane.doe@my.jcu.edu.au", domain).is_ok());
        assert!(validate_email_domain("Jane.Doe@MY.JCU.EDU.AU", domain).is_ok());

        for bad in [
            "jane@gmail.com",
            "@my.jcu.edu.au",
            "jane@jcu.edu.au",
            "jane@evil.my.jcu.edu.au",
            "jane@@my.jcu.edu.au",
            "jane doe@my.jcu.edu.au",
            "my.jcu.edu.au",
        ] {
            let err = validate_email_domain(bad, domain).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidEmailDomain, "{bad}");
        }
    }

    #[test]
    fn test_student_id_bounds() {
        assert!(validate_student_id("123456").is_ok());
        assert!(validate_student_id("1234567890").is_ok());
        assert!(validate_student_id("12345").is_err());
        assert!(validate_student_id("12345678901").is_err());
        assert_eq!(
            validate_student_id("12345a").unwrap_err().code,
            ErrorCode::InvalidStudentId
        );
    }

    #[test]
    fn test_password_length() {
        assert!(validate_password("abcdef").is_ok());
        assert_eq!(
            validate_password("abcde").unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
    }

    #[test]
    fn test_luhn() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("5555555555554444"));
        assert!(luhn_valid("378282246310005"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("41111111a1111111"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_card_validation() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert!(validate_card(Some("4111 1111 1111 1111"), Some("06/25"), Some("123"), today).is_ok());
        assert!(validate_card(Some("4111-1111-1111-1111"), Some("12/30"), Some("1234"), today).is_ok());

        let err = validate_card(Some("4111111111111112"), Some("12/30"), Some("123"), today)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPaymentDetails);

        // expired last month
        assert!(validate_card(Some("4111111111111111"), Some("05/25"), Some("123"), today).is_err());
        assert!(validate_card(Some("4111111111111111"), Some("13/30"), Some("123"), today).is_err());
        assert!(validate_card(Some("4111111111111111"), Some("1/30"), Some("123"), today).is_err());
        assert!(validate_card(Some("4111111111111111"), Some("12/30"), Some("12"), today).is_err());
        assert!(validate_card(None, Some("12/30"), Some("123"), today).is_err());
    }
}
