//! Currency and percent text helpers.
//!
//! Parsing is lenient: everything except digits, `.` and `-` is stripped and
//! anything that still fails to parse is treated as zero. Formatting is en-US
//! with whole dollars.

/// Parse a currency string such as `"$1,250,000"` into a number.
pub fn parse_currency(text: &str) -> f64 {
    parse_lenient(text)
}

/// Parse a percent string such as `"80%"` or `" 97.5 "`.
pub fn parse_percent(text: &str) -> f64 {
    parse_lenient(text)
}

fn parse_lenient(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Format as whole US dollars: `1234.6` -> `"$1,235"`, non-finite -> `"$0"`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Format a percentage rounded to two decimals, trailing zeros dropped.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0%".to_string();
    }
    let mut rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        rounded = 0.0; // no "-0%"
    }
    format!("{}%", rounded)
}

/// Round `value` to the nearest multiple of `step`.
pub fn round_to_nearest(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,250,000"), 1_250_000.0);
        assert_eq!(parse_currency("  400000 "), 400_000.0);
        assert_eq!(parse_currency("$-25.50"), -25.5);
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("abc"), 0.0);
        assert_eq!(parse_currency("1.2.3"), 0.0);
        assert_eq!(parse_currency("-"), 0.0);
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("80%"), 80.0);
        assert_eq!(parse_percent("96.5 %"), 96.5);
        assert_eq!(parse_percent("n/a"), 0.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(1000.0), "$1,000");
        assert_eq!(format_currency(400_000.0), "$400,000");
        assert_eq!(format_currency(1_234_567.4), "$1,234,567");
        assert_eq!(format_currency(1699.5), "$1,700");
        assert_eq!(format_currency(-2500.0), "-$2,500");
        assert_eq!(format_currency(f64::NAN), "$0");
        assert_eq!(format_currency(f64::INFINITY), "$0");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(80.0), "80%");
        assert_eq!(format_percent(96.5), "96.5%");
        assert_eq!(format_percent(70.123), "70.12%");
        assert_eq!(format_percent(-0.001), "0%");
        assert_eq!(format_percent(f64::NAN), "0%");
    }

    #[test]
    fn test_round_to_nearest() {
        assert_eq!(round_to_nearest(1696.67, 25.0), 1700.0);
        assert_eq!(round_to_nearest(1012.0, 25.0), 1000.0);
        assert_eq!(round_to_nearest(1012.5, 25.0), 1025.0);
    }
}
