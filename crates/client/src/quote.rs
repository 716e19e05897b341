//! Pricing, lead upsert and save-quote calls.
//!
//! Every POST goes out as `text/plain` with a `{"payload": ...}` envelope,
//! which is what the script endpoints accept without a CORS preflight.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use quotegate_config::RuntimeConfig;
use quotegate_engine::validation::{validate_email, validate_for_pricing};
use quotegate_engine::{PricingInputs, QuoteInputs, ValidationError};

use crate::{ClientError, USER_AGENT};

/// Lead capture form as sent to `upsertLead`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub timeline: String,
    pub text_updates: bool,
    pub source: String,
}

impl LeadForm {
    /// Required fields plus a plausible email.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("first name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("last name"));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MissingField("phone"));
        }
        validate_email(&self.email)
    }
}

/// Body of a `saveQuote` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuoteRequest {
    pub lead_token: String,
    pub inputs: PricingInputs,
    pub quote: Value,
    /// `MM/DD HH:MM`, local time.
    pub saved_at: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_zip: Option<String>,
}

#[derive(Serialize)]
struct PriceRequest<'a> {
    inputs: &'a PricingInputs,
    #[serde(rename = "leadToken")]
    lead_token: &'a str,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    payload: &'a T,
}

/// Blocking client for the pricing and leads endpoints.
#[derive(Clone)]
pub struct QuoteClient {
    http: reqwest::blocking::Client,
    price_url: String,
    upsert_url: Option<String>,
    save_url: Option<String>,
}

impl QuoteClient {
    pub fn new(config: &RuntimeConfig) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            price_url: config.price_url(),
            upsert_url: config.upsert_lead_url(),
            save_url: config.save_quote_url(),
        })
    }

    /// Validate inputs, then price them.
    pub fn price_inputs(
        &self,
        inputs: &QuoteInputs,
        lead_token: Option<&str>,
    ) -> Result<Value, ClientError> {
        validate_for_pricing(inputs)?;
        self.price(&inputs.pricing_payload(), lead_token)
    }

    /// Any JSON body from a 2xx response is the quote.
    pub fn price(
        &self,
        inputs: &PricingInputs,
        lead_token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let request = PriceRequest {
            inputs,
            lead_token: lead_token.unwrap_or(""),
        };
        log::debug!("pricing {} loan={} ltv={}", inputs.program, inputs.loan, inputs.ltv);

        let (status, body) = self.post_payload(&self.price_url, &request)?;
        if !(200..300).contains(&status) {
            return Err(ClientError::Http { status, body: truncate(&body) });
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Returns the lead token on success.
    pub fn upsert_lead(&self, form: &LeadForm) -> Result<String, ClientError> {
        let url = self.upsert_url.as_deref().ok_or(ClientError::NotConfigured("leads"))?;
        form.validate()?;

        let (status, body) = self.post_payload(url, form)?;
        let json = parse_body(status, &body)?;
        check_ok(status, &json)?;

        let token = json
            .get("leadToken")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Rejected("Lead saved but no leadToken returned".into()))?;

        log::info!("lead upserted for {}", form.email.trim());
        Ok(token.to_string())
    }

    pub fn save_quote(&self, request: &SaveQuoteRequest) -> Result<(), ClientError> {
        let url = self.save_url.as_deref().ok_or(ClientError::NotConfigured("leads"))?;
        if request.lead_token.trim().is_empty() {
            return Err(ClientError::MissingLeadToken);
        }

        let (status, body) = self.post_payload(url, request)?;
        let json = parse_body(status, &body)?;
        check_ok(status, &json)?;

        log::info!("quote saved ({})", request.saved_at);
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn post_payload<T: Serialize>(&self, url: &str, payload: &T) -> Result<(u16, String), ClientError> {
        let body = serde_json::to_string(&Envelope { payload })
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let resp = self
            .http
            .post(url)
            .header("Content-Type", "text/plain;charset=utf-8")
            .body(body)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp.text().map_err(|e| ClientError::Network(e.to_string()))?;
        Ok((status, text))
    }
}

/// Parse a leads-endpoint body. A non-2xx with an unreadable body is still
/// an HTTP error, not a parse error.
fn parse_body(status: u16, body: &str) -> Result<Value, ClientError> {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => Ok(v),
        Err(_) if !(200..300).contains(&status) => {
            Err(ClientError::Http { status, body: truncate(body) })
        }
        Err(e) => Err(ClientError::Parse(e.to_string())),
    }
}

/// 2xx and `ok == true`, else the server's `message`, `error`, or `HTTP {status}`.
fn check_ok(status: u16, json: &Value) -> Result<(), ClientError> {
    let ok = json.get("ok").and_then(Value::as_bool).unwrap_or(false);
    if (200..300).contains(&status) && ok {
        return Ok(());
    }

    let text = |key: &str| {
        json.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };
    let message = text("message")
        .or_else(|| text("error"))
        .unwrap_or_else(|| format!("HTTP {status}"));
    Err(ClientError::Rejected(message))
}

fn truncate(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use quotegate_config::Settings;

    fn client_for(server: &MockServer) -> QuoteClient {
        let mut settings = Settings::default();
        settings.endpoints.pricing_base = server.url("/pricing/exec");
        settings.endpoints.leads_base = server.url("/leads/exec");
        QuoteClient::new(&RuntimeConfig::baseline(&settings)).unwrap()
    }

    fn lead_form() -> LeadForm {
        LeadForm {
            first_name: "Pat".into(),
            last_name: "Lee".into(),
            phone: "480-555-0100".into(),
            email: "pat@example.com".into(),
            timeline: "30-60 days".into(),
            text_updates: true,
            source: "qgate".into(),
        }
    }

    #[test]
    fn test_price_sends_envelope_and_returns_body() {
        let server = MockServer::start();
        let inputs = QuoteInputs::default();
        let expected = serde_json::json!({
            "payload": {
                "inputs": serde_json::to_value(inputs.pricing_payload()).unwrap(),
                "leadToken": "tok"
            }
        });
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/pricing/exec")
                .query_param("action", "price")
                .header("content-type", "text/plain;charset=utf-8")
                .json_body(expected);
            then.status(200).body(r#"{"rate": 6.125, "apr": 6.2, "piti": 3100}"#);
        });

        let client = client_for(&server);
        let quote = client.price_inputs(&inputs, Some("tok")).unwrap();
        mock.assert();
        assert_eq!(quote["rate"], 6.125);
    }

    #[test]
    fn test_price_without_token_sends_empty_string() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/pricing/exec")
                .body_contains(r#""leadToken":"""#);
            then.status(200).body("{}");
        });

        let client = client_for(&server);
        let quote = client.price(&QuoteInputs::default().pricing_payload(), None).unwrap();
        mock.assert();
        assert_eq!(quote, serde_json::json!({}));
    }

    #[test]
    fn test_price_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/pricing/exec");
            then.status(502).body("bad gateway");
        });

        let err = client_for(&server)
            .price(&QuoteInputs::default().pricing_payload(), None)
            .unwrap_err();
        match err {
            ClientError::Http { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn test_price_non_json_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/pricing/exec");
            then.status(200).body("<html>login</html>");
        });

        let err = client_for(&server)
            .price(&QuoteInputs::default().pricing_payload(), None)
            .unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[test]
    fn test_price_validation_blocks_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/pricing/exec");
            then.status(200).body("{}");
        });

        let inputs = QuoteInputs { loan: 0.0, ..QuoteInputs::default() };
        let err = client_for(&server).price_inputs(&inputs, None).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::NonPositiveLoan)));
        mock.assert_hits(0);
    }

    #[test]
    fn test_upsert_lead_returns_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/leads/exec")
                .query_param("action", "upsertLead")
                .body_contains(r#""firstName":"Pat""#)
                .body_contains(r#""textUpdates":true"#);
            then.status(200).body(r#"{"ok": true, "leadToken": "lt-123"}"#);
        });

        let token = client_for(&server).upsert_lead(&lead_form()).unwrap();
        mock.assert();
        assert_eq!(token, "lt-123");
    }

    #[test]
    fn test_upsert_lead_rejected_and_missing_token() {
        let server = MockServer::start();
        let rejected = server.mock(|when, then| {
            when.method(POST).path("/leads/exec").body_contains("bad@example.com");
            then.status(200).body(r#"{"ok": false, "message": "Duplicate lead"}"#);
        });
        server.mock(|when, then| {
            when.method(POST).path("/leads/exec").body_contains("pat@example.com");
            then.status(200).body(r#"{"ok": true}"#);
        });

        let client = client_for(&server);
        let form = LeadForm { email: "bad@example.com".into(), ..lead_form() };
        let err = client.upsert_lead(&form).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate lead");
        rejected.assert();

        let err = client.upsert_lead(&lead_form()).unwrap_err();
        assert!(matches!(err, ClientError::Rejected(_)));
    }

    #[test]
    fn test_upsert_lead_invalid_email_sends_nothing() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/leads/exec");
            then.status(200).body(r#"{"ok": true, "leadToken": "x"}"#);
        });

        let form = LeadForm { email: "not-an-email".into(), ..lead_form() };
        let err = client_for(&server).upsert_lead(&form).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ValidationError::InvalidEmail)));
        mock.assert_hits(0);
    }

    #[test]
    fn test_save_quote_ok_and_error_messages() {
        let server = MockServer::start();
        let ok = server.mock(|when, then| {
            when.method(POST)
                .path("/leads/exec")
                .query_param("action", "saveQuote")
                .body_contains(r#""subjectZip":"85254""#);
            then.status(200).body(r#"{"ok": true}"#);
        });
        server.mock(|when, then| {
            when.method(POST).path("/leads/exec").body_contains(r#""leadToken":"bad""#);
            then.status(200).body(r#"{"ok": false, "error": "Unknown lead"}"#);
        });
        server.mock(|when, then| {
            when.method(POST).path("/leads/exec").body_contains(r#""leadToken":"down""#);
            then.status(503).body(r#"{"ok": false}"#);
        });

        let client = client_for(&server);
        let mut request = SaveQuoteRequest {
            lead_token: "tok".into(),
            inputs: QuoteInputs::default().pricing_payload(),
            quote: serde_json::json!({"rate": 6.5}),
            saved_at: "10/16 09:30".into(),
            source: "qgate".into(),
            subject_zip: Some("85254".into()),
        };
        client.save_quote(&request).unwrap();
        ok.assert();

        request.lead_token = "bad".into();
        request.subject_zip = None;
        assert_eq!(client.save_quote(&request).unwrap_err().to_string(), "Unknown lead");

        request.lead_token = "down".into();
        assert_eq!(client.save_quote(&request).unwrap_err().to_string(), "HTTP 503");
    }

    #[test]
    fn test_save_quote_requires_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/leads/exec");
            then.status(200).body(r#"{"ok": true}"#);
        });

        let request = SaveQuoteRequest {
            lead_token: " ".into(),
            inputs: QuoteInputs::default().pricing_payload(),
            quote: Value::Null,
            saved_at: String::new(),
            source: "qgate".into(),
            subject_zip: None,
        };
        let err = client_for(&server).save_quote(&request).unwrap_err();
        assert!(matches!(err, ClientError::MissingLeadToken));
        mock.assert_hits(0);
    }

    #[test]
    fn test_leads_not_configured() {
        let mut settings = Settings::default();
        settings.endpoints.leads_base = String::new();
        let client = QuoteClient::new(&RuntimeConfig::baseline(&settings)).unwrap();
        let err = client.upsert_lead(&lead_form()).unwrap_err();
        assert!(matches!(err, ClientError::NotConfigured("leads")));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let long = "é".repeat(150);
        let cut = truncate(&long);
        assert!(cut.ends_with('…'));
        assert!(cut.len() <= 203);
    }
}
