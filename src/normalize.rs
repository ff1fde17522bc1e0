use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const RETICULA: &str = "reticula";
pub const INEX_ONE: &str = "inex one";

const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Collapses spelling variants of the two canonical project types.
///
/// The value is lower-cased, periods become spaces, whitespace runs collapse
/// and the ends are trimmed. Anything mentioning "inex" becomes `"inex one"`,
/// anything mentioning "reticula" becomes `"reticula"`, and everything else
/// passes through cleaned.
pub fn normalize_project_type(value: &str) -> String {
    let lowered = value.to_lowercase().replace('.', " ");
    let cleaned = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.contains("inex") {
        INEX_ONE.to_string()
    } else if cleaned.contains(RETICULA) {
        RETICULA.to_string()
    } else {
        cleaned
    }
}

pub fn is_canonical_project_type(value: &str) -> bool {
    let normalized = normalize_project_type(value);
    normalized == RETICULA || normalized == INEX_ONE
}

/// Leading-integer parse: optional sign followed by decimal digits, anything
/// after the digits ignored. `"12 calls"` is 12, `"3.7"` is 3, `"calls"` is `None`.
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = split_sign(trimmed);
    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];

    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Leading-decimal parse in the same spirit as [`parse_int`]: the longest
/// prefix that reads as a decimal number (with optional exponent) is used.
pub fn parse_float(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let (negative, rest) = split_sign(trimmed);

    if rest.starts_with("Infinity") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let bytes = rest.as_bytes();
    let mut end = 0;
    let mut mantissa_digits = 0;

    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    let parsed = rest[..end].trim_end_matches('.');
    let magnitude = if parsed.is_empty() {
        0.0
    } else {
        parsed.parse::<f64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

pub fn int_or_zero(value: &str) -> i64 {
    parse_int(value).unwrap_or(0)
}

pub fn float_or_zero(value: &str) -> f64 {
    parse_float(value).filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Parses a calendar day from the handful of layouts seen in uploads.
/// Timestamps carrying an offset are converted to their UTC day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.with_timezone(&Utc).date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|stamp| stamp.date())
        })
}

/// Fixed-point rendering with `digits` decimals. Exact ties round away from
/// zero, so `6.25` becomes `"6.3"` rather than the round-half-even `"6.2"`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if scaled.is_finite() && scaled.fract().abs() == 0.5 {
        format!("{:.*}", digits, scaled.round() / factor)
    } else {
        format!("{value:.digits$}")
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn split_sign(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = value.strip_prefix('+') {
        (false, rest)
    } else {
        (false, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_type_variants_collapse() {
        assert_eq!(normalize_project_type("inex.one"), "inex one");
        assert_eq!(normalize_project_type("INEX ONE"), "inex one");
        assert_eq!(normalize_project_type("Inex-One"), "inex one");
        assert_eq!(normalize_project_type("  Reticula  Classic "), "reticula");
        assert_eq!(normalize_project_type("Advisory   Call."), "advisory call");
        assert_eq!(normalize_project_type(""), "");
    }

    #[test]
    fn canonical_detection_uses_normalized_key() {
        assert!(is_canonical_project_type("Inex.One"));
        assert!(is_canonical_project_type("RETICULA"));
        assert!(!is_canonical_project_type("Survey"));
    }

    #[test]
    fn integers_read_leading_digits() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("  7 calls"), Some(7));
        assert_eq!(parse_int("3.9"), Some(3));
        assert_eq!(parse_int("-2"), Some(-2));
        assert_eq!(parse_int("n/a"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(int_or_zero("n/a"), 0);
    }

    #[test]
    fn floats_read_leading_decimal() {
        assert_eq!(parse_float("200.00"), Some(200.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("1e3x"), Some(1000.0));
        assert_eq!(parse_float("2e"), Some(2.0));
        assert_eq!(parse_float("-1.25%"), Some(-1.25));
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("abc"), None);
        assert_eq!(float_or_zero("abc"), 0.0);
    }

    #[test]
    fn fixed_point_ties_round_up() {
        assert_eq!(to_fixed(6.25, 1), "6.3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(33.333_333, 1), "33.3");
        assert_eq!(to_fixed(200.0, 2), "200.00");
        assert_eq!(to_fixed(1.005, 2), "1.00");
    }

    #[test]
    fn dates_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("2024-03-05"), expected);
        assert_eq!(parse_date("2024/03/05"), expected);
        assert_eq!(parse_date("03/05/2024"), expected);
        assert_eq!(parse_date("Mar 5, 2024"), expected);
        assert_eq!(parse_date("2024-03-05T10:15:00"), expected);
        assert_eq!(parse_date("2024-03-05T23:30:00-02:00"), NaiveDate::from_ymd_opt(2024, 3, 6));
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("  "), None);
    }
}
