//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid E.164 pattern")
});

// Routing prefix keys: digits only, at least one
static PREFIX_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").expect("valid prefix pattern")
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is valid (international E.164 format)
pub fn is_valid_international_phone(phone: &str) -> bool {
    let normalized = normalize_phone_number(phone);
    INTERNATIONAL_PHONE_REGEX.is_match(&normalized)
}

/// Strip every leading `+` from a destination or routing key.
///
/// The result is what routing prefixes are matched against, so `"+14155550100"`
/// becomes `"14155550100"`.
pub fn strip_leading_plus(value: &str) -> &str {
    value.trim_start_matches('+')
}

/// Check whether a (normalized) routing key is a usable numeric prefix
pub fn is_prefix_key(key: &str) -> bool {
    PREFIX_KEY_REGEX.is_match(key)
}

/// Normalize a routing prefix key: trim whitespace, drop leading `+`
pub fn normalize_prefix_key(key: &str) -> String {
    strip_leading_plus(key.trim()).to_string()
}

/// Normalize an ISO alpha-2 region key to its upper-case form
pub fn normalize_country_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Mask a phone number for logging, keeping only the last 4 characters
///
/// ```ignore
/// assert_eq!(mask_phone_number("+1234567890"), "+******7890");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    let count = phone.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }

    let visible_digits = 4;
    let masked_count = count - visible_digits;
    let last_digits: String = phone.chars().skip(masked_count).collect();

    if phone.starts_with('+') {
        format!("+{}{}", "*".repeat(masked_count - 1), last_digits)
    } else {
        format!("{}{}", "*".repeat(masked_count), last_digits)
    }
}
