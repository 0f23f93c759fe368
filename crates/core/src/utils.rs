use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Normalizes a resource or dataset name into a snake_case identifier
/// Runs of anything other than ASCII letters and digits become a single underscore
pub fn normalize_identifier(name: &str) -> String {
    let mut output = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            output.push(c.to_ascii_lowercase());
        } else if !output.ends_with('_') {
            output.push('_');
        }
    }

    let trimmed = output.trim_matches('_');
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// True when `name` is already in normalized form and safe to quote into SQL
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Formats a date as ISO 8601 (`YYYY-MM-DD`)
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Load ids are the start time as `<unix seconds>.<microseconds>`
pub fn load_id_from(started_at: DateTime<Utc>) -> String {
    format!(
        "{}.{:06}",
        started_at.timestamp(),
        started_at.timestamp_subsec_micros()
    )
}

/// RFC 3339 timestamp in UTC with microsecond precision
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_normalize_identifier_already_normal() {
        assert_eq!(normalize_identifier("amazon_raw"), "amazon_raw");
        assert_eq!(normalize_identifier("products"), "products");
    }

    #[test]
    fn test_normalize_identifier_case_and_spaces() {
        assert_eq!(normalize_identifier("Amazon Raw"), "amazon_raw");
        assert_eq!(normalize_identifier("  Reviews  "), "reviews");
    }

    #[test]
    fn test_normalize_identifier_special_chars() {
        assert_eq!(normalize_identifier("order-items/2024"), "order_items_2024");
        assert_eq!(normalize_identifier("a::b"), "a_b");
        assert_eq!(normalize_identifier("__x__"), "x");
    }

    #[test]
    fn test_normalize_identifier_leading_digit() {
        assert_eq!(normalize_identifier("2024 sales"), "_2024_sales");
    }

    #[test]
    fn test_normalize_identifier_empty() {
        assert_eq!(normalize_identifier(""), "");
        assert_eq!(normalize_identifier("***"), "");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("amazon_raw"));
        assert!(is_valid_identifier("_loads"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("Products"));
        assert!(!is_valid_identifier("x\"; DROP TABLE y"));
        assert!(!is_valid_identifier("1abc"));
    }

    #[test]
    fn test_format_iso_date_pads_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_iso_date(date), "2024-01-05");
    }

    #[test]
    fn test_load_id_from() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::microseconds(42);
        assert_eq!(load_id_from(ts), "1704067200.000042");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-01T12:30:00.000000Z");
    }
}
