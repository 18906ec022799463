use super::*;
use proptest::prelude::*;

proptest! {
    /// max_length accepts exactly the strings whose char count is within the limit
    #[test]
    fn prop_max_length_matches_char_count(value in "\\PC{0,40}", max in 0usize..40) {
        let mut errors = FieldErrors::new();
        let accepted = max_length(&mut errors, "title", &value, max);
        prop_assert_eq!(accepted, value.chars().count() <= max);
        prop_assert_eq!(errors.is_empty(), accepted);
    }

    /// Well-formed addresses built from simple parts are always accepted
    #[test]
    fn prop_simple_emails_are_valid(
        local in "[a-z0-9._+]{1,20}",
        domain in "[a-z0-9]{1,20}",
        tld in "[a-z]{2,6}",
    ) {
        let address = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&address));
    }

    /// Anything without an `@` is rejected
    #[test]
    fn prop_emails_without_at_are_invalid(value in "[^@]*") {
        prop_assert!(!is_valid_email(&value));
    }

    /// between never records an error for values inside the range
    #[test]
    fn prop_between_accepts_in_range(value in 1i64..=5) {
        let mut errors = FieldErrors::new();
        prop_assert!(between(&mut errors, "rating", value, 1, 5));
        prop_assert!(errors.is_empty());
    }
}
