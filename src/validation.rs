//! Field validation rules shared by the request DTOs.
//!
//! Each rule records a message in a [`FieldErrors`] and returns whether the
//! value passed, so callers can stop checking a field after its first failure.

use crate::errors::FieldErrors;

/// Longest string accepted by most text fields
pub const MAX_STRING_LENGTH: usize = 255;

/// Checks that a value is present and not blank
pub fn required(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> bool {
    match value {
        Some(v) if !v.trim().is_empty() => true,
        _ => {
            errors.add(field, format!("The {} field is required.", humanize(field)));
            false
        }
    }
}

/// Checks that a value has at most `max` characters
pub fn max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) -> bool {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("The {} may not be greater than {} characters.", humanize(field), max),
        );
        return false;
    }
    true
}

/// Checks that a value has at least `min` characters
pub fn min_length(errors: &mut FieldErrors, field: &str, value: &str, min: usize) -> bool {
    if value.chars().count() < min {
        errors.add(
            field,
            format!("The {} must be at least {} characters.", humanize(field), min),
        );
        return false;
    }
    true
}

/// Checks that a value looks like an email address
pub fn email(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if !is_valid_email(value) {
        errors.add(
            field,
            format!("The {} must be a valid email address.", humanize(field)),
        );
        return false;
    }
    true
}

/// Checks that an integer lies within an inclusive range
pub fn between(errors: &mut FieldErrors, field: &str, value: i64, min: i64, max: i64) -> bool {
    if value < min || value > max {
        errors.add(
            field,
            format!("The {} must be between {} and {}.", humanize(field), min, max),
        );
        return false;
    }
    true
}

/// Canonical form of an account email: surrounding whitespace dropped and
/// lowercased, so one mailbox maps to one account
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Structural email check: one `@`, a non-empty local part, and a dotted
/// domain whose labels are non-empty and free of whitespace
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let mut errors = FieldErrors::new();
        assert!(required(&mut errors, "name", Some("Ada")));
        assert!(!required(&mut errors, "name", Some("   ")));
        assert!(!required(&mut errors, "item_type", None));

        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert_eq!(errors.get("item_type").unwrap(), ["The item type field is required."]);
    }

    #[test]
    fn test_length_rules_count_characters() {
        let mut errors = FieldErrors::new();
        // 4 characters, 8 bytes
        assert!(max_length(&mut errors, "title", "ÅÅÅÅ", 4));
        assert!(!max_length(&mut errors, "title", "ÅÅÅÅÅ", 4));
        assert!(min_length(&mut errors, "password", "secret", 6));
        assert!(!min_length(&mut errors, "password", "short", 6));

        assert_eq!(errors.get("title").unwrap(), ["The title may not be greater than 4 characters."]);
        assert_eq!(errors.get("password").unwrap(), ["The password must be at least 6 characters."]);
    }

    #[test]
    fn test_between() {
        let mut errors = FieldErrors::new();
        assert!(between(&mut errors, "rating", 1, 1, 5));
        assert!(between(&mut errors, "rating", 5, 1, 5));
        assert!(!between(&mut errors, "rating", 0, 1, 5));
        assert!(!between(&mut errors, "rating", 6, 1, 5));
        assert_eq!(errors.get("rating").unwrap().len(), 2);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
        assert_eq!(normalize_email("ada@example.com"), "ada@example.com");
        assert!(is_valid_email(&normalize_email(" Ada@Example.com\n")));
    }

    #[test]
    fn test_valid_emails() {
        for email in ["astro@nasa.gov", "first.last+tag@mail.example.org", "x@a.io"] {
            assert!(is_valid_email(email), "{} should be valid", email);
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in [
            "",
            "plainaddress",
            "@nasa.gov",
            "astro@",
            "astro@nasa",
            "astro@@nasa.gov",
            "astro@nasa..gov",
            "astro @nasa.gov",
            "astro@-nasa.gov",
        ] {
            assert!(!is_valid_email(email), "{} should be invalid", email);
        }
    }
}

#[cfg(test)]
mod prop_tests;
