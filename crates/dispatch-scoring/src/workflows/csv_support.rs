//! Field helpers shared by the CSV importers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts `1/0`, `true/false`, `yes/no` in any case.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Parses a float cell, treating blanks and garbage as missing.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|number| number.is_finite())
}

pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn flags_accept_numeric_and_word_forms() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" False "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn datetimes_accept_common_layouts() {
        let spaced = parse_datetime("2025-03-04 09:30:00").expect("spaced layout");
        assert_eq!(spaced.hour(), 9);
        assert_eq!(spaced.minute(), 30);

        let rfc = parse_datetime("2025-03-04T09:30:00Z").expect("rfc3339");
        assert_eq!(rfc, spaced);

        let date_only = parse_datetime("2025-03-04").expect("date only");
        assert_eq!(date_only.hour(), 0);

        assert!(parse_datetime("  ").is_none());
        assert!(parse_datetime("04/03/2025").is_none());
    }

    #[test]
    fn numbers_reject_blank_and_non_finite_cells() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
