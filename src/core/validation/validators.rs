//! Reusable field validators
//!
//! Each validator is a small closure taking the field name and the value,
//! returning a human-readable reason on failure. The order validator composes
//! them and collects every failure.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use validator::ValidateEmail;

/// Local mobile numbers: `07` followed by eight digits
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^07\d{8}$").expect("phone pattern is valid"));

/// Validator: string must be present and not blank
pub fn required() -> impl Fn(&str, Option<&str>) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: Option<&str>| match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(format!("{} is required", field)),
    }
}

/// Validator: email address format
pub fn email() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if value.validate_email() {
            Ok(())
        } else {
            Err(format!("{} must be a valid email address (got '{}')", field, value))
        }
    }
}

/// Validator: local phone number format
pub fn phone() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if PHONE_PATTERN.is_match(value) {
            Ok(())
        } else {
            Err(format!("{} must use the format 07XXXXXXXX (got '{}')", field, value))
        }
    }
}

/// Validator: integer must be within an inclusive range
pub fn within_range(
    min: i64,
    max: i64,
) -> impl Fn(&str, i64) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: i64| {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(format!(
                "{} must be between {} and {} (got {})",
                field, min, max, value
            ))
        }
    }
}

/// Validator: collection size must not exceed maximum
pub fn max_items(max: usize) -> impl Fn(&str, usize) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, count: usize| {
        if count <= max {
            Ok(())
        } else {
            Err(format!(
                "{} allows at most {} entries (got {})",
                field, max, count
            ))
        }
    }
}

/// Validator: string length in characters must not exceed maximum
pub fn max_chars(max: usize) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &str| {
        let len = value.chars().count();
        if len <= max {
            Ok(())
        } else {
            Err(format!(
                "{} must not exceed {} characters (currently {})",
                field, max, len
            ))
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: &'static [&'static str],
) -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &str| {
        if allowed.iter().any(|a| a.eq_ignore_ascii_case(value.trim())) {
            Ok(())
        } else {
            Err(format!(
                "{} must be one of: {} (got '{}')",
                field,
                allowed.join(", "),
                value
            ))
        }
    }
}

/// Parse a calendar date given as `YYYY-MM-DD` or a full RFC 3339 timestamp
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Validator: date must parse and fall on or after `earliest`
pub fn date_not_before(
    earliest: NaiveDate,
) -> impl Fn(&str, &str) -> Result<NaiveDate, String> + Send + Sync + Clone {
    move |field: &str, value: &str| match parse_date(value) {
        None => Err(format!(
            "{} must be a valid date in YYYY-MM-DD format (got '{}')",
            field, value
        )),
        Some(date) if date < earliest => Err(format!(
            "{} cannot be in the past (got {}, earliest is {})",
            field, date, earliest
        )),
        Some(date) => Ok(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === required() ===

    #[test]
    fn test_required_missing_value_returns_error() {
        let v = required();
        let result = v("customerName", None);
        assert!(result.unwrap_err().contains("customerName"));
    }

    #[test]
    fn test_required_blank_value_returns_error() {
        let v = required();
        assert!(v("phone", Some("   ")).is_err());
    }

    #[test]
    fn test_required_present_value_returns_ok() {
        let v = required();
        assert!(v("email", Some("a@b.co")).is_ok());
    }

    // === email() ===

    #[test]
    fn test_email_accepts_standard_address() {
        let v = email();
        assert!(v("email", "jane@x.com").is_ok());
    }

    #[test]
    fn test_email_rejects_garbage() {
        let v = email();
        assert!(v("email", "not-an-email").is_err());
        assert!(v("email", "two@@signs.com").is_err());
    }

    // === phone() ===

    #[test]
    fn test_phone_accepts_local_mobile() {
        let v = phone();
        assert!(v("phone", "0771234567").is_ok());
    }

    #[test]
    fn test_phone_rejects_wrong_prefix_or_length() {
        let v = phone();
        assert!(v("phone", "0871234567").is_err());
        assert!(v("phone", "077123456").is_err());
        assert!(v("phone", "07712345678").is_err());
        assert!(v("phone", "07712a4567").is_err());
    }

    // === within_range() / max_items() / max_chars() ===

    #[test]
    fn test_within_range_bounds_are_inclusive() {
        let v = within_range(1, 5);
        assert!(v("layers", 1).is_ok());
        assert!(v("layers", 5).is_ok());
        assert!(v("layers", 0).is_err());
        let err = v("layers", 9).unwrap_err();
        assert!(err.contains("between 1 and 5"));
    }

    #[test]
    fn test_max_items() {
        let v = max_items(5);
        assert!(v("toppings", 5).is_ok());
        assert!(v("toppings", 6).is_err());
    }

    #[test]
    fn test_max_chars_counts_characters_not_bytes() {
        let v = max_chars(3);
        assert!(v("message", "été").is_ok());
        assert!(v("message", "four").is_err());
    }

    // === in_list() ===

    #[test]
    fn test_in_list_is_case_insensitive() {
        let v = in_list(&["cash", "card", "online"]);
        assert!(v("paymentMethod", "Card").is_ok());
        let err = v("paymentMethod", "cheque").unwrap_err();
        assert!(err.contains("cash, card, online"));
    }

    // === date_not_before() ===

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date("2026-10-20"), NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(
            parse_date("2026-10-20T09:30:00Z"),
            NaiveDate::from_ymd_opt(2026, 10, 20)
        );
        assert_eq!(parse_date("20/10/2026"), None);
    }

    #[test]
    fn test_date_not_before() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let v = date_not_before(today);
        assert!(v("deliveryDate", "2026-10-15").is_ok());
        assert!(v("deliveryDate", "2026-10-14").unwrap_err().contains("past"));
        assert!(v("deliveryDate", "soon").unwrap_err().contains("valid date"));
    }
}
