use chrono::NaiveDate;
use serde_json::Value;

/// Outcome of parsing a raw date string. Unrecognized input is carried
/// back unmodified so the caller can report it; downstream date
/// arithmetic treats it as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParse {
    Iso(String),
    Unrecognized(String),
}

/// Outcome of parsing a raw amount value. The aggregate contract
/// ultimately defaults `Unparseable` to 0, but the distinction keeps
/// "explicitly zero" separate from "unknown".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountParse {
    Value(f64),
    Unparseable,
}

const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Accepts `D/M/YYYY`, `D-M-YYYY`, already-canonical `YYYY-M-D`, and a
/// combined `date time` timestamp separated by whitespace. Single-digit
/// components are zero-padded in the output.
pub fn parse_visit_date(raw: &str) -> DateParse {
    let cleaned = raw.trim();
    let date_part = cleaned.split_whitespace().next().unwrap_or_default();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return DateParse::Iso(date.format("%Y-%m-%d").to_string());
        }
    }
    DateParse::Unrecognized(cleaned.to_string())
}

/// Normalizes a time string to `HH:MM`. Accepts `.` as a separator
/// (the combined-timestamp convention) and drops seconds.
pub fn parse_visit_time(raw: &str) -> Option<String> {
    let cleaned = raw.trim().replace('.', ":");
    let mut parts = cleaned.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = match parts.next() {
        Some(part) => part.trim().parse().ok()?,
        None => 0,
    };
    if hour > 23 || minute > 59 {
        return None;
    }
    Some(format!("{:02}:{:02}", hour, minute))
}

/// Parses a free-form currency value: every character that is not a
/// digit, comma, period, or minus sign is stripped, commas become the
/// decimal separator, and the result is clamped to a non-negative finite
/// number rounded to 2 decimals.
pub fn parse_amount(raw: &Value) -> AmountParse {
    match raw {
        Value::Number(number) => match number.as_f64() {
            Some(value) if value.is_finite() => AmountParse::Value(round2(value.max(0.0))),
            _ => AmountParse::Unparseable,
        },
        Value::String(text) => parse_amount_str(text),
        _ => AmountParse::Unparseable,
    }
}

fn parse_amount_str(raw: &str) -> AmountParse {
    let filtered: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.' | '-'))
        .collect();
    if filtered.is_empty() {
        return AmountParse::Unparseable;
    }
    match filtered.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => AmountParse::Value(round2(value.max(0.0))),
        Ok(_) => AmountParse::Value(0.0),
        Err(_) => AmountParse::Unparseable,
    }
}

/// Round half-up on the third decimal digit.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_slash_date_with_padding() {
        assert_eq!(
            parse_visit_date("07/01/2026"),
            DateParse::Iso("2026-01-07".to_string())
        );
        assert_eq!(
            parse_visit_date("7/1/2026"),
            DateParse::Iso("2026-01-07".to_string())
        );
    }

    #[test]
    fn parses_dash_and_canonical_dates() {
        assert_eq!(
            parse_visit_date("7-1-2026"),
            DateParse::Iso("2026-01-07".to_string())
        );
        assert_eq!(
            parse_visit_date("2026-01-07"),
            DateParse::Iso("2026-01-07".to_string())
        );
        assert_eq!(
            parse_visit_date("2026-1-7"),
            DateParse::Iso("2026-01-07".to_string())
        );
    }

    #[test]
    fn parses_combined_timestamp_date_part() {
        assert_eq!(
            parse_visit_date("08/01/2026 11.51.35"),
            DateParse::Iso("2026-01-08".to_string())
        );
    }

    #[test]
    fn unrecognized_date_is_returned_unmodified() {
        assert_eq!(
            parse_visit_date("January 7th"),
            DateParse::Unrecognized("January 7th".to_string())
        );
        assert_eq!(
            parse_visit_date("31/02/2026"),
            DateParse::Unrecognized("31/02/2026".to_string())
        );
    }

    #[test]
    fn time_rewrites_dot_separator() {
        assert_eq!(parse_visit_time("11.51.35"), Some("11:51".to_string()));
        assert_eq!(parse_visit_time("9:05"), Some("09:05".to_string()));
        assert_eq!(parse_visit_time("23"), Some("23:00".to_string()));
    }

    #[test]
    fn time_rejects_out_of_range() {
        assert_eq!(parse_visit_time("25:00"), None);
        assert_eq!(parse_visit_time("12:75"), None);
        assert_eq!(parse_visit_time("noonish"), None);
    }

    #[test]
    fn amount_parses_comma_decimal_with_currency() {
        assert_eq!(parse_amount(&json!("10,50€")), AmountParse::Value(10.5));
        assert_eq!(parse_amount(&json!("€ 7.20")), AmountParse::Value(7.2));
    }

    #[test]
    fn amount_garbage_is_unparseable() {
        assert_eq!(parse_amount(&json!("abc")), AmountParse::Unparseable);
        assert_eq!(parse_amount(&json!(null)), AmountParse::Unparseable);
        assert_eq!(parse_amount(&json!("1.2.3")), AmountParse::Unparseable);
    }

    #[test]
    fn amount_parsing_is_idempotent() {
        let AmountParse::Value(first) = parse_amount(&json!("10.5")) else {
            panic!("expected a value");
        };
        assert_eq!(
            parse_amount(&json!(first.to_string())),
            AmountParse::Value(first)
        );
    }

    #[test]
    fn amount_is_never_negative_or_non_finite() {
        assert_eq!(parse_amount(&json!("-3,50")), AmountParse::Value(0.0));
        // Large enough to overflow f64 into infinity once parsed.
        let huge = "9".repeat(400);
        assert_eq!(parse_amount(&json!(huge)), AmountParse::Value(0.0));
    }

    #[test]
    fn amount_accepts_json_numbers() {
        assert_eq!(parse_amount(&json!(12.346)), AmountParse::Value(12.35));
        assert_eq!(parse_amount(&json!(8)), AmountParse::Value(8.0));
    }

    #[test]
    fn round2_is_half_up_on_third_decimal() {
        // 0.125 is exactly representable, so this is a true tie.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(10.006), 10.01);
        assert_eq!(round2(10.004), 10.0);
    }
}
