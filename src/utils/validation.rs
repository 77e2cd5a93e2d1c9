use regex::Regex;

/// Indian mobile format: 10 digits, leading digit 6-9.
pub fn validate_phone(phone: &str) -> bool {
    let re = Regex::new(r"^[6-9]\d{9}$").unwrap();
    re.is_match(phone)
}

pub fn validate_email(email: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    re.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_valid_ten_digit_numbers() {
        assert!(validate_phone("9876543210"));
        assert!(validate_phone("6000000000"));
    }

    #[test]
    fn phone_rejects_bad_formats() {
        assert!(!validate_phone("1234567890")); // leading digit out of range
        assert!(!validate_phone("987654321")); // too short
        assert!(!validate_phone("98765432100")); // too long
        assert!(!validate_phone("98765abc10"));
        assert!(!validate_phone("+919876543210"));
    }

    #[test]
    fn email_basic_shapes() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("a.b+c@sub.domain.org"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("user@"));
    }
}
