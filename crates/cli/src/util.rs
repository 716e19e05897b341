//! Shared CLI helpers: argument parsing and output.

use serde::Serialize;

use quotegate_engine::money::{parse_currency, parse_percent};

use crate::CliError;

/// clap value parser for dollar amounts: `500000`, `$500,000`.
pub fn parse_money(s: &str) -> Result<f64, String> {
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' is not an amount", s));
    }
    Ok(parse_currency(s))
}

/// clap value parser for percentages: `80`, `80%`, `97.5`.
pub fn parse_pct(s: &str) -> Result<f64, String> {
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' is not a percentage", s));
    }
    Ok(parse_percent(s))
}

/// Print one JSON value on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("cannot serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

/// Print aligned `label  value` rows.
pub fn print_rows(rows: &[(&str, String)]) {
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("{:<width$}  {}", label, value, width = width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$650,000"), Ok(650_000.0));
        assert_eq!(parse_money("400000"), Ok(400_000.0));
        assert!(parse_money("lots").is_err());
    }

    #[test]
    fn test_parse_pct() {
        assert_eq!(parse_pct("80%"), Ok(80.0));
        assert_eq!(parse_pct("96.5"), Ok(96.5));
        assert!(parse_pct("%").is_err());
    }
}
