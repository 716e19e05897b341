//! Reading pricing responses.
//!
//! The pricing service has no fixed schema. The summary picks the first
//! truthy candidate for each headline number and the full body is kept for
//! display and for save-quote.

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::money::format_currency;

const MISSING: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSummary {
    pub rate: Option<f64>,
    pub apr: Option<f64>,
    pub price: String,
    pub payment: Option<f64>,
}

impl QuoteSummary {
    pub fn from_response(data: &Value, borrower_pts: f64) -> Self {
        let pricing = data.get("pricing");
        let nested = |key: &str| pricing.and_then(|p| p.get(key));

        let rate = first_number(&[data.get("rate"), data.get("bestRate"), data.get("noteRate"), nested("rate")]);
        let apr = first_number(&[data.get("apr"), data.get("APR"), nested("apr")]);
        let payment = first_number(&[data.get("piti"), data.get("payment"), nested("payment")]);
        let price = [data.get("price"), data.get("points"), nested("price")]
            .into_iter()
            .flatten()
            .find(|v| is_truthy(v))
            .map(display_value)
            .unwrap_or_else(|| borrower_pts.to_string());

        Self { rate, apr, price, payment }
    }

    /// (label, value) pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Rate", self.rate.map(|r| format!("{:.3}%", r)).unwrap_or_else(|| MISSING.into())),
            ("APR", self.apr.map(|r| format!("{:.3}%", r)).unwrap_or_else(|| MISSING.into())),
            ("Points/Price", self.price.clone()),
            ("Est. Payment", self.payment.map(format_currency).unwrap_or_else(|| MISSING.into())),
        ]
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn first_number(candidates: &[Option<&Value>]) -> Option<f64> {
    candidates
        .iter()
        .flatten()
        .find(|v| is_truthy(v))
        .and_then(|v| as_number(v))
        .filter(|n| n.is_finite())
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// "MM/DD HH:MM" stamp used for last-quoted display and save-quote.
pub fn quote_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%m/%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_top_level_fields() {
        let s = QuoteSummary::from_response(
            &json!({"rate": 6.125, "apr": "6.301", "price": -0.5, "piti": 3120.4}),
            0.0,
        );
        assert_eq!(s.rate, Some(6.125));
        assert_eq!(s.apr, Some(6.301));
        assert_eq!(s.price, "-0.5");
        assert_eq!(s.payment, Some(3120.4));

        let rows = s.rows();
        assert_eq!(rows[0], ("Rate", "6.125%".to_string()));
        assert_eq!(rows[1], ("APR", "6.301%".to_string()));
        assert_eq!(rows[3], ("Est. Payment", "$3,120".to_string()));
    }

    #[test]
    fn test_nested_pricing_fallback() {
        let s = QuoteSummary::from_response(
            &json!({"rate": 0, "pricing": {"rate": 5.99, "apr": 6.1, "payment": 2800, "price": "100.25"}}),
            0.0,
        );
        assert_eq!(s.rate, Some(5.99));
        assert_eq!(s.apr, Some(6.1));
        assert_eq!(s.payment, Some(2800.0));
        assert_eq!(s.price, "100.25");
    }

    #[test]
    fn test_alternate_names() {
        let s = QuoteSummary::from_response(&json!({"noteRate": 7.0, "APR": 7.2, "payment": 1000}), 0.0);
        assert_eq!(s.rate, Some(7.0));
        assert_eq!(s.apr, Some(7.2));
        assert_eq!(s.payment, Some(1000.0));
    }

    #[test]
    fn test_empty_response_falls_back_to_points() {
        let s = QuoteSummary::from_response(&json!({}), 1.5);
        assert_eq!(s.rate, None);
        assert_eq!(s.price, "1.5");
        let rows = s.rows();
        assert_eq!(rows[0].1, "—");
        assert_eq!(rows[3].1, "—");
    }

    #[test]
    fn test_quote_stamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(quote_stamp(&at), "03/07 09:05");
    }
}
