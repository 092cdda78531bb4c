use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern"));

static HTTP_URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").expect("url pattern"));

static SVG_DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/svg\+xml").expect("svg pattern"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Exactly ten digits, no separators.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Avatars are either http(s) URLs or inline SVG data URIs.
pub fn is_valid_avatar(value: &str) -> bool {
    HTTP_URL_RE.is_match(value) || SVG_DATA_RE.is_match(value)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Pushes `message` unless the field is present and non-blank. Used for
/// required fields on create payloads.
pub fn require(field: Option<&str>, message: &str, errors: &mut Vec<String>) {
    match field {
        Some(value) if !is_blank(value) => {}
        _ => errors.push(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@clinic.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@mail.com"));
    }

    #[test]
    fn phone_is_exactly_ten_digits() {
        assert!(is_valid_phone("1234567890"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("12345678901"));
        assert!(!is_valid_phone("12345-7890"));
    }

    #[test]
    fn avatar_accepts_urls_and_inline_svg() {
        assert!(is_valid_avatar("https://cdn.example.com/a.png"));
        assert!(is_valid_avatar("http://cdn.example.com/a.png"));
        assert!(is_valid_avatar("data:image/svg+xml;base64,PHN2Zz4="));
        assert!(!is_valid_avatar("ftp://cdn.example.com/a.png"));
        assert!(!is_valid_avatar("data:image/png;base64,xxxx"));
    }
}
