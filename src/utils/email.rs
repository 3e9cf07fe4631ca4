use once_cell::sync::Lazy;
use regex::Regex;

// Something, an @, something, a dot, something. No whitespace, one @.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern")
});

/// Trim surrounding whitespace and lowercase.
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
