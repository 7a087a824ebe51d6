//! Field validation for submitted inquiries.
//!
//! Rules run in a fixed order and the first failure wins. Validation is a pure
//! function of the input: no clock, no I/O, no hidden state.

use crate::domain::inquiry::InquiryInput;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum length, in characters, of the free-text `goals` and `notes` fields.
pub const MAX_TEXT_LEN: usize = 5000;

/// `local@domain.tld` with no whitespace or `@` inside either part.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Why a submission was refused. The display text is shown to the submitter verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The honeypot field was filled in
    #[error("spam")]
    Spam,
    #[error("name required")]
    NameRequired,
    #[error("valid email required")]
    InvalidEmail,
    /// `goals` or `notes` exceeded [`MAX_TEXT_LEN`]
    #[error("fields too long")]
    FieldsTooLong,
}

impl ValidationError {
    /// The short reason string reported to the presentation layer.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::Spam => "spam",
            ValidationError::NameRequired => "name required",
            ValidationError::InvalidEmail => "valid email required",
            ValidationError::FieldsTooLong => "fields too long",
        }
    }
}

/// Check an inquiry against the submission rules.
pub fn validate(input: &InquiryInput) -> Result<(), ValidationError> {
    if !input.honeypot().is_empty() {
        return Err(ValidationError::Spam);
    }
    if input.name().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !is_valid_email(input.email()) {
        return Err(ValidationError::InvalidEmail);
    }
    if too_long(input.goals()) || too_long(input.notes()) {
        return Err(ValidationError::FieldsTooLong);
    }
    Ok(())
}

/// Syntactic email check. Empty strings are rejected.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn too_long(text: &str) -> bool {
    // byte length is an upper bound on char count
    text.len() > MAX_TEXT_LEN && text.chars().count() > MAX_TEXT_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inquiry::InquiryForm;

    fn form() -> InquiryForm {
        InquiryForm {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            goals: "get fit".to_string(),
            ..InquiryForm::default()
        }
    }

    fn check(form: InquiryForm) -> Result<(), ValidationError> {
        validate(&InquiryInput::from(form))
    }

    #[test]
    fn test_valid_inquiry() {
        assert_eq!(check(form()), Ok(()));
    }

    #[test]
    fn test_honeypot_wins_over_everything() {
        let spam = InquiryForm {
            name: String::new(),
            email: "not an email".to_string(),
            goals: "x".repeat(MAX_TEXT_LEN + 1),
            honeypot: "http://buy-now.example".to_string(),
            ..InquiryForm::default()
        };
        assert_eq!(check(spam), Err(ValidationError::Spam));

        let otherwise_valid = InquiryForm {
            honeypot: "spam".to_string(),
            ..form()
        };
        assert_eq!(check(otherwise_valid), Err(ValidationError::Spam));
    }

    #[test]
    fn test_whitespace_honeypot_is_ignored() {
        let input = InquiryForm {
            honeypot: "   ".to_string(),
            ..form()
        };
        assert_eq!(check(input), Ok(()));
    }

    #[test]
    fn test_name_required() {
        let input = InquiryForm {
            name: "  ".to_string(),
            email: String::new(),
            ..form()
        };
        assert_eq!(check(input), Err(ValidationError::NameRequired));
    }

    #[test]
    fn test_email_acceptance() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@b.co\n"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let input = InquiryForm {
            email: "jane@x".to_string(),
            ..form()
        };
        assert_eq!(check(input), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_text_length_limits() {
        let at_limit = InquiryForm {
            goals: "g".repeat(MAX_TEXT_LEN),
            notes: "n".repeat(MAX_TEXT_LEN),
            ..form()
        };
        assert_eq!(check(at_limit), Ok(()));

        let long_notes = InquiryForm {
            notes: "n".repeat(MAX_TEXT_LEN + 1),
            ..form()
        };
        assert_eq!(check(long_notes), Err(ValidationError::FieldsTooLong));

        let long_goals = InquiryForm {
            goals: "g".repeat(MAX_TEXT_LEN + 1),
            ..form()
        };
        assert_eq!(check(long_goals), Err(ValidationError::FieldsTooLong));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 5000 two-byte characters is 10000 bytes but still within the limit
        let input = InquiryForm {
            goals: "é".repeat(MAX_TEXT_LEN),
            ..form()
        };
        assert_eq!(check(input), Ok(()));
    }

    #[test]
    fn test_validate_is_idempotent() {
        let input = InquiryInput::from(InquiryForm {
            email: "bad".to_string(),
            ..form()
        });
        let first = validate(&input);
        let second = validate(&input);
        assert_eq!(first, second);
        assert_eq!(first, Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_reason_matches_display() {
        for err in [
            ValidationError::Spam,
            ValidationError::NameRequired,
            ValidationError::InvalidEmail,
            ValidationError::FieldsTooLong,
        ] {
            assert_eq!(err.reason(), err.to_string());
        }
    }
}
