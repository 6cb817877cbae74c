use lazy_static::lazy_static;
use regex::Regex;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Treats a blank value the same as an absent one.
pub(crate) fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Secrets are taken as typed: only an empty string counts as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("First.Last@Example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a b@c.com"));
    }

    #[test]
    fn blank_values_are_not_supplied() {
        assert_eq!(supplied(None), None);
        assert_eq!(supplied(Some("".into())), None);
        assert_eq!(supplied(Some("   ".into())), None);
        assert_eq!(supplied(Some("x".into())), Some("x".to_string()));
    }

    #[test]
    fn whitespace_secrets_are_present() {
        assert_eq!(present(None), None);
        assert_eq!(present(Some("".into())), None);
        assert_eq!(present(Some("   ".into())), Some("   ".to_string()));
    }
}
