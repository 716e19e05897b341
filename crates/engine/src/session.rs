//! Quote session: the in-memory form state and the edits applied to it.
//!
//! The session never touches the network. Callers resolve ZIPs and run
//! pricing calls, then feed the results back in. Every edit that changes
//! what would be priced leaves `needs_reprice` set until the caller takes it.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::escrow::EscrowEstimator;
use crate::inputs::{QuoteInputs, Transaction, DEFAULT_INITIAL_ZIP};
use crate::quote::QuoteSummary;
use crate::triangle::{LoanTriangle, LtvBounds, TriangleEdit};
use crate::validation::{clamp_fico, clamp_points};
use crate::zip::{is_valid_zip, ZipInfo};

pub const ZIP_NOT_FOUND_MESSAGE: &str = "Could not find Property Zip. Try another ZIP.";

/// Outcome of a ZIP change.
#[derive(Debug, Clone, PartialEq)]
pub enum ZipStatus {
    /// No usable ZIP; location reset to the fallback state.
    Cleared,
    /// Lookup found nothing; the prior location is kept.
    NotFound,
    Resolved(ZipInfo),
}

impl ZipStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            ZipStatus::Cleared => None,
            ZipStatus::NotFound => Some(ZIP_NOT_FOUND_MESSAGE.to_string()),
            ZipStatus::Resolved(info) => Some(info.display()),
        }
    }
}

/// Edits to inputs that pass straight through to pricing.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEdit {
    Program(String),
    Transaction(Transaction),
    Term(u32),
    Fico(u32),
    Points(f64),
    Hoa(f64),
    PmiToggle(bool),
    DtiOver45(bool),
    TwoPlusBorrowers(bool),
    FinanceUfmip(bool),
    AnnualMip(f64),
    VaExempt(bool),
    VaFirstUse(bool),
    DscrRatio(f64),
}

#[derive(Debug, Clone)]
pub struct QuoteSession {
    inputs: QuoteInputs,
    estimator: EscrowEstimator,
    ltv_bounds: LtvBounds,
    initial_zip: String,
    tax_auto: bool,
    ins_auto: bool,
    lead_token: Option<String>,
    last_quote: Option<Value>,
    last_quoted_at: Option<DateTime<Local>>,
    last_error: Option<String>,
    needs_reprice: bool,
}

impl QuoteSession {
    pub fn new(estimator: EscrowEstimator, ltv_bounds: LtvBounds) -> Self {
        let mut session = Self {
            inputs: QuoteInputs::default(),
            estimator,
            ltv_bounds,
            initial_zip: DEFAULT_INITIAL_ZIP.to_string(),
            tax_auto: true,
            ins_auto: true,
            lead_token: None,
            last_quote: None,
            last_quoted_at: None,
            last_error: None,
            needs_reprice: false,
        };
        session.apply_escrow_defaults();
        session
    }

    /// Start from a different initial ZIP (the value the gate compares against).
    pub fn with_initial_zip(mut self, zip: impl Into<String>) -> Self {
        self.initial_zip = zip.into();
        self.inputs.prop_zip = self.initial_zip.clone();
        self
    }

    pub fn with_lead_token(mut self, token: Option<String>) -> Self {
        self.lead_token = token.filter(|t| !t.is_empty());
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn inputs(&self) -> &QuoteInputs {
        &self.inputs
    }

    pub fn estimator(&self) -> &EscrowEstimator {
        &self.estimator
    }

    pub fn tax_auto(&self) -> bool {
        self.tax_auto
    }

    pub fn ins_auto(&self) -> bool {
        self.ins_auto
    }

    pub fn lead_token(&self) -> Option<&str> {
        self.lead_token.as_deref()
    }

    /// Pricing is unlocked once a lead token exists.
    pub fn is_gated(&self) -> bool {
        self.lead_token.is_some()
    }

    pub fn last_quote(&self) -> Option<&Value> {
        self.last_quote.as_ref()
    }

    pub fn last_quoted_at(&self) -> Option<DateTime<Local>> {
        self.last_quoted_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn summary(&self) -> Option<QuoteSummary> {
        self.last_quote
            .as_ref()
            .map(|q| QuoteSummary::from_response(q, self.inputs.borrower_pts))
    }

    /// A 5-digit ZIP different from the initial one unlocks the lead gate.
    pub fn zip_ready_for_gate(&self) -> bool {
        is_valid_zip(&self.inputs.prop_zip) && self.inputs.prop_zip != self.initial_zip
    }

    /// Returns and clears the pending reprice flag.
    pub fn take_reprice(&mut self) -> bool {
        std::mem::take(&mut self.needs_reprice)
    }

    // ── Location ────────────────────────────────────────────────────

    /// Apply a ZIP change. `zip` is the normalized ZIP (None when the input
    /// had no usable ZIP); `lookup` is the resolver's answer for it.
    pub fn zip_changed(&mut self, zip: Option<String>, lookup: Option<ZipInfo>) -> ZipStatus {
        let Some(zip) = zip else {
            self.inputs.prop_zip = String::new();
            self.inputs.city = String::new();
            self.inputs.state_abbr = self.estimator.tables().fallback_state_abbr.clone();
            self.inputs.state_name = self.estimator.tables().fallback_state_name.clone();
            self.apply_escrow_defaults();
            return ZipStatus::Cleared;
        };

        self.inputs.prop_zip = zip;
        match lookup {
            None => {
                log::debug!("zip {} not found; keeping {}", self.inputs.prop_zip, self.inputs.state_abbr);
                ZipStatus::NotFound
            }
            Some(info) => {
                self.inputs.city = info.city.clone();
                self.inputs.state_abbr = info.state_abbr.clone();
                self.inputs.state_name = info.state_name.clone();
                self.apply_escrow_defaults();
                self.needs_reprice = true;
                ZipStatus::Resolved(info)
            }
        }
    }

    // ── Loan triangle ───────────────────────────────────────────────

    pub fn edit_value(&mut self, value: f64) {
        self.apply_triangle(TriangleEdit::Value(value));
        self.apply_escrow_defaults();
    }

    pub fn edit_ltv(&mut self, ltv: f64) {
        self.apply_triangle(TriangleEdit::Ltv(ltv));
    }

    pub fn edit_loan(&mut self, loan: f64) {
        self.apply_triangle(TriangleEdit::Loan(loan));
    }

    pub fn triangle(&self) -> LoanTriangle {
        LoanTriangle {
            property_value: self.inputs.value,
            ltv: self.inputs.ltv,
            loan_amount: self.inputs.loan,
        }
    }

    fn apply_triangle(&mut self, edit: TriangleEdit) {
        let mut t = self.triangle();
        t.apply(edit, self.ltv_bounds);
        self.inputs.value = t.property_value;
        self.inputs.ltv = t.ltv;
        self.inputs.loan = t.loan_amount;
        self.needs_reprice = true;
    }

    // ── Escrows ─────────────────────────────────────────────────────

    /// Manual tax entry; turns tax auto mode off.
    pub fn set_taxes_manual(&mut self, taxes: f64) {
        self.inputs.taxes = taxes;
        self.tax_auto = false;
        self.needs_reprice = true;
    }

    /// Manual insurance entry; turns insurance auto mode off.
    pub fn set_insurance_manual(&mut self, ins: f64) {
        self.inputs.ins = ins;
        self.ins_auto = false;
        self.needs_reprice = true;
    }

    pub fn set_tax_auto(&mut self, on: bool) {
        self.tax_auto = on;
        self.apply_tax_default();
        self.needs_reprice = true;
    }

    pub fn set_ins_auto(&mut self, on: bool) {
        self.ins_auto = on;
        self.apply_ins_default();
        self.needs_reprice = true;
    }

    /// Swap in a new estimator (tables changed) and re-run auto estimates.
    pub fn replace_estimator(&mut self, estimator: EscrowEstimator) {
        self.estimator = estimator;
        self.apply_escrow_defaults();
    }

    pub fn set_ltv_bounds(&mut self, bounds: LtvBounds) {
        self.ltv_bounds = bounds;
    }

    fn apply_escrow_defaults(&mut self) {
        self.apply_tax_default();
        self.apply_ins_default();
    }

    fn apply_tax_default(&mut self) {
        if !self.tax_auto {
            return;
        }
        self.inputs.taxes = self.estimator.annual_tax(self.inputs.value, &self.inputs.state_abbr);
    }

    fn apply_ins_default(&mut self) {
        if !self.ins_auto {
            return;
        }
        self.inputs.ins = self.estimator.annual_insurance(self.inputs.value, &self.inputs.state_name);
    }

    // ── Pass-through inputs ─────────────────────────────────────────

    pub fn apply(&mut self, edit: InputEdit) {
        let i = &mut self.inputs;
        match edit {
            InputEdit::Program(p) => i.program = p,
            InputEdit::Transaction(t) => i.txn = t,
            InputEdit::Term(t) => i.term = t,
            InputEdit::Fico(f) => i.fico = clamp_fico(f),
            InputEdit::Points(p) => i.borrower_pts = clamp_points(p),
            InputEdit::Hoa(h) => i.hoa = h,
            InputEdit::PmiToggle(b) => i.pmi_toggle = b,
            InputEdit::DtiOver45(b) => i.dti_over45 = b,
            InputEdit::TwoPlusBorrowers(b) => i.two_plus_borrowers = b,
            InputEdit::FinanceUfmip(b) => i.finance_ufmip = b,
            InputEdit::AnnualMip(m) => i.annual_mip = m,
            InputEdit::VaExempt(b) => i.va_exempt = b,
            InputEdit::VaFirstUse(b) => i.va_first_use = b,
            InputEdit::DscrRatio(r) => i.dscr_ratio = r,
        }
        self.needs_reprice = true;
    }

    // ── Lead + pricing results ──────────────────────────────────────

    pub fn set_lead_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.lead_token = if token.is_empty() { None } else { Some(token) };
    }

    pub fn clear_lead_token(&mut self) {
        self.lead_token = None;
    }

    /// Store a successful pricing response.
    pub fn record_quote(&mut self, quote: Value, at: DateTime<Local>) {
        self.last_quote = Some(quote);
        self.last_quoted_at = Some(at);
        self.last_error = None;
    }

    /// Store a pricing failure. The previous quote stays as it was.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.last_error = Some(if message.is_empty() {
            "Pricing error: unknown failure".to_string()
        } else {
            message
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> QuoteSession {
        QuoteSession::new(EscrowEstimator::default(), LtvBounds::default())
    }

    fn texas() -> ZipInfo {
        ZipInfo {
            zip: "78701".into(),
            city: "Austin".into(),
            state_abbr: "TX".into(),
            state_name: "Texas".into(),
        }
    }

    #[test]
    fn test_initial_estimates_use_fallback_state() {
        let s = session();
        assert_eq!(s.inputs().taxes, 2500.0);
        assert_eq!(s.inputs().ins, 1700.0);
        assert!(s.tax_auto() && s.ins_auto());
        assert!(!s.is_gated());
    }

    #[test]
    fn test_reconcile_value_then_loan() {
        let mut s = session();
        s.edit_value(500_000.0);
        s.edit_ltv(80.0);
        assert_eq!(s.inputs().loan, 400_000.0);
        s.edit_loan(350_000.0);
        assert_eq!(s.inputs().ltv, 70.0);
        assert!(s.take_reprice());
        assert!(!s.take_reprice());
    }

    #[test]
    fn test_resolved_zip_recomputes_escrows() {
        let mut s = session();
        let status = s.zip_changed(Some("78701".into()), Some(texas()));
        assert_eq!(status.message().as_deref(), Some("Austin, Texas"));
        assert_eq!(s.inputs().state_abbr, "TX");
        assert_eq!(s.inputs().taxes, 6875.0);
        assert_eq!(s.inputs().ins, 4000.0);
        assert!(s.zip_ready_for_gate());
    }

    #[test]
    fn test_not_found_zip_keeps_location() {
        let mut s = session();
        s.zip_changed(Some("78701".into()), Some(texas()));
        let status = s.zip_changed(Some("00000".into()), None);
        assert_eq!(status, ZipStatus::NotFound);
        assert_eq!(status.message().as_deref(), Some(ZIP_NOT_FOUND_MESSAGE));
        assert_eq!(s.inputs().prop_zip, "00000");
        assert_eq!(s.inputs().state_name, "Texas");
        assert_eq!(s.inputs().taxes, 6875.0);
    }

    #[test]
    fn test_cleared_zip_resets_to_fallback() {
        let mut s = session();
        s.zip_changed(Some("78701".into()), Some(texas()));
        assert_eq!(s.zip_changed(None, None), ZipStatus::Cleared);
        assert_eq!(s.inputs().state_abbr, "AZ");
        assert_eq!(s.inputs().city, "");
        assert_eq!(s.inputs().taxes, 2500.0);
        assert!(!s.zip_ready_for_gate());
    }

    #[test]
    fn test_initial_zip_does_not_open_gate() {
        let s = session();
        assert_eq!(s.inputs().prop_zip, "85254");
        assert!(!s.zip_ready_for_gate());
    }

    #[test]
    fn test_tax_auto_toggle() {
        let mut s = session();
        s.set_tax_auto(false);
        assert!(!s.tax_auto());
        let before = s.inputs().taxes;
        s.edit_value(800_000.0);
        assert_eq!(s.inputs().taxes, before);
        // insurance is still automatic
        assert_eq!(s.inputs().ins, 2725.0);

        s.set_tax_auto(true);
        assert_eq!(s.inputs().taxes, 4000.0);
        s.edit_value(900_000.0);
        assert_eq!(s.inputs().taxes, 4500.0);
    }

    #[test]
    fn test_manual_escrow_disables_auto() {
        let mut s = session();
        s.set_taxes_manual(3100.0);
        s.set_insurance_manual(1200.0);
        assert!(!s.tax_auto() && !s.ins_auto());
        s.edit_value(700_000.0);
        assert_eq!(s.inputs().taxes, 3100.0);
        assert_eq!(s.inputs().ins, 1200.0);

        s.set_ins_auto(true);
        // 1018 * 7/3 = 2375.3 -> 2375
        assert_eq!(s.inputs().ins, 2375.0);
    }

    #[test]
    fn test_failed_pricing_keeps_last_quote() {
        let mut s = session();
        s.record_quote(json!({"rate": 6.5}), Local::now());
        s.record_error("Pricing error: HTTP 502");
        assert_eq!(s.last_quote(), Some(&json!({"rate": 6.5})));
        assert_eq!(s.last_error(), Some("Pricing error: HTTP 502"));
        assert_eq!(s.summary().and_then(|q| q.rate), Some(6.5));

        s.record_error("");
        assert!(!s.last_error().unwrap_or_default().is_empty());

        s.record_quote(json!({"rate": 6.25}), Local::now());
        assert!(s.last_error().is_none());
    }

    #[test]
    fn test_pass_through_edits_clamp() {
        let mut s = session();
        s.apply(InputEdit::Fico(200));
        s.apply(InputEdit::Points(9.0));
        s.apply(InputEdit::Program("FHA30".into()));
        assert_eq!(s.inputs().fico, 300);
        assert_eq!(s.inputs().borrower_pts, 5.0);
        assert_eq!(s.inputs().family(), crate::ProgramFamily::Fha);
        assert!(s.take_reprice());
    }

    #[test]
    fn test_replace_estimator_reapplies() {
        let mut s = session();
        let mut rates = crate::TaxRateTable::new();
        rates.insert("AZ".into(), 1.0);
        s.replace_estimator(EscrowEstimator::new(
            crate::StateTables::default().with_tax_rates(rates),
        ));
        assert_eq!(s.inputs().taxes, 5000.0);
    }

    #[test]
    fn test_lead_token() {
        let mut s = session().with_lead_token(Some(String::new()));
        assert!(!s.is_gated());
        s.set_lead_token("tok-1");
        assert!(s.is_gated());
        assert_eq!(s.lead_token(), Some("tok-1"));
        s.clear_lead_token();
        assert!(!s.is_gated());
    }
}
