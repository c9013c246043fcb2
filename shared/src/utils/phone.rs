//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// E.164: leading `+`, non-zero first digit, 7 to 15 digits in total
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{6,14}$").unwrap()
});

static COUNTRY_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{0,2}$").unwrap()
});

/// Length of a national subscriber number entered without a country code
pub const NATIONAL_NUMBER_LENGTH: usize = 10;

/// Normalize user input to canonical E.164 form.
///
/// Accepts `+<digits>`, the `00` international prefix, national numbers with
/// a trunk `0`, bare national numbers and numbers that already carry the
/// default country code digits. Spaces, dashes, dots and parentheses are
/// ignored. Returns `None` when the input cannot be made into a valid E.164
/// number.
pub fn normalize_phone_number(raw: &str, default_country_code: &str) -> Option<String> {
    let country_digits = default_country_code.trim().trim_start_matches('+');
    let trimmed = raw.trim();

    let (has_plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return None,
        }
    }
    if digits.is_empty() {
        return None;
    }

    let candidate = if has_plus {
        format!("+{}", digits)
    } else if let Some(international) = digits.strip_prefix("00") {
        format!("+{}", international)
    } else if let Some(national) = digits.strip_prefix('0') {
        format!("+{}{}", country_digits, national)
    } else if digits.len() == NATIONAL_NUMBER_LENGTH {
        format!("+{}{}", country_digits, digits)
    } else if !country_digits.is_empty()
        && digits.starts_with(country_digits)
        && digits.len() == country_digits.len() + NATIONAL_NUMBER_LENGTH
    {
        format!("+{}", digits)
    } else {
        return None;
    };

    is_valid_e164(&candidate).then_some(candidate)
}

/// Check if a phone number is already in canonical E.164 form
pub fn is_valid_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Check a `+<1-3 digits>` country calling code
pub fn is_valid_country_code(code: &str) -> bool {
    COUNTRY_CODE_REGEX.is_match(code)
}

/// Mask a phone number for logs, keeping only the last 4 digits (e.g. +********3210)
pub fn mask_phone_number(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }

    let visible: String = digits[digits.len() - 4..].iter().collect();
    let prefix = if phone.starts_with('+') { "+" } else { "" };
    format!("{}{}{}", prefix, "*".repeat(digits.len() - 4), visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IN: &str = "+91";

    #[test]
    fn test_normalize_keeps_e164() {
        assert_eq!(
            normalize_phone_number("+15551234567", IN),
            Some("+15551234567".to_string())
        );
        assert_eq!(
            normalize_phone_number(" +1 (555) 123-4567 ", IN),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_normalize_national_numbers() {
        assert_eq!(
            normalize_phone_number("9876543210", IN),
            Some("+919876543210".to_string())
        );
        assert_eq!(
            normalize_phone_number("98765 43210", IN),
            Some("+919876543210".to_string())
        );
        assert_eq!(
            normalize_phone_number("09876543210", IN),
            Some("+919876543210".to_string())
        );
        assert_eq!(
            normalize_phone_number("919876543210", IN),
            Some("+919876543210".to_string())
        );
    }

    #[test]
    fn test_normalize_international_prefix() {
        assert_eq!(
            normalize_phone_number("0044 20 7183 8750", IN),
            Some("+442071838750".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(normalize_phone_number("", IN), None);
        assert_eq!(normalize_phone_number("+", IN), None);
        assert_eq!(normalize_phone_number("abc", IN), None);
        assert_eq!(normalize_phone_number("98765x3210", IN), None);
        assert_eq!(normalize_phone_number("12345", IN), None);
        assert_eq!(normalize_phone_number("+0123456789", IN), None);
        assert_eq!(normalize_phone_number("+1234567890123456", IN), None);
        assert_eq!(normalize_phone_number("+91+9876543210", IN), None);
    }

    #[test]
    fn test_is_valid_e164() {
        assert!(is_valid_e164("+15551234567"));
        assert!(is_valid_e164("+442071838750"));
        assert!(!is_valid_e164("15551234567"));
        assert!(!is_valid_e164("+0123456789"));
        assert!(!is_valid_e164("+1 555 123 4567"));
    }

    #[test]
    fn test_is_valid_country_code() {
        assert!(is_valid_country_code("+91"));
        assert!(is_valid_country_code("+1"));
        assert!(!is_valid_country_code("91"));
        assert!(!is_valid_country_code("+0"));
        assert!(!is_valid_country_code("+1234"));
    }

    #[test]
    fn test_mask_phone_number() {
        assert_eq!(mask_phone_number("+919876543210"), "+********3210");
        assert_eq!(mask_phone_number("5551234567"), "******4567");
        assert_eq!(mask_phone_number("1234"), "****");
    }
}
