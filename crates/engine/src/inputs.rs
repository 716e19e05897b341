use serde::{Deserialize, Serialize};

use crate::program::ProgramFamily;
use crate::tables::{FALLBACK_STATE_ABBR, FALLBACK_STATE_NAME};

pub const DEFAULT_INITIAL_ZIP: &str = "85254";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transaction {
    #[default]
    Purchase,
    Refinance,
    CashOut,
}

impl std::str::FromStr for Transaction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PURCHASE" => Ok(Transaction::Purchase),
            "REFINANCE" | "REFI" => Ok(Transaction::Refinance),
            "CASH_OUT" | "CASHOUT" => Ok(Transaction::CashOut),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// Everything the quote form holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInputs {
    pub program: String,
    pub txn: Transaction,
    /// Months.
    pub term: u32,
    pub prop_zip: String,
    pub city: String,
    pub state_abbr: String,
    pub state_name: String,
    pub value: f64,
    pub ltv: f64,
    pub loan: f64,
    pub fico: u32,
    pub borrower_pts: f64,
    pub taxes: f64,
    pub ins: f64,
    pub hoa: f64,
    pub pmi_toggle: bool,
    pub dti_over45: bool,
    pub two_plus_borrowers: bool,
    pub finance_ufmip: bool,
    pub annual_mip: f64,
    pub va_exempt: bool,
    pub va_first_use: bool,
    pub dscr_ratio: f64,
}

impl Default for QuoteInputs {
    fn default() -> Self {
        Self {
            program: "CONV30".to_string(),
            txn: Transaction::Purchase,
            term: 360,
            prop_zip: DEFAULT_INITIAL_ZIP.to_string(),
            city: String::new(),
            state_abbr: FALLBACK_STATE_ABBR.to_string(),
            state_name: FALLBACK_STATE_NAME.to_string(),
            value: 500_000.0,
            ltv: 80.0,
            loan: 400_000.0,
            fico: 740,
            borrower_pts: 0.0,
            taxes: 0.0,
            ins: 0.0,
            hoa: 0.0,
            pmi_toggle: true,
            dti_over45: false,
            two_plus_borrowers: false,
            finance_ufmip: true,
            annual_mip: 0.55,
            va_exempt: false,
            va_first_use: true,
            dscr_ratio: 1.25,
        }
    }
}

impl QuoteInputs {
    pub fn family(&self) -> ProgramFamily {
        ProgramFamily::from_code(&self.program)
    }

    /// The wire projection sent to the pricing and save-quote endpoints.
    pub fn pricing_payload(&self) -> PricingInputs {
        PricingInputs {
            program: self.program.clone(),
            txn: self.txn,
            term: self.term,
            loan: whole(self.loan),
            ltv: (self.ltv * 100.0).round() / 100.0,
            fico: self.fico,
            borrower_pts: self.borrower_pts,
            taxes: whole(self.taxes),
            ins: whole(self.ins),
            hoa: whole(self.hoa),
            pmi_toggle: self.pmi_toggle,
            dti_over45: self.dti_over45,
            two_plus_borrowers: self.two_plus_borrowers,
            finance_ufmip: self.finance_ufmip,
            annual_mip: self.annual_mip,
            va_exempt: self.va_exempt,
            va_first_use: self.va_first_use,
            dscr_ratio: self.dscr_ratio,
        }
    }
}

fn whole(v: f64) -> i64 {
    if v.is_finite() {
        v.round() as i64
    } else {
        0
    }
}

/// Pricing inputs as they go over the wire. Dollar amounts are whole; LTV is
/// rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    pub program: String,
    pub txn: Transaction,
    pub term: u32,
    pub loan: i64,
    pub ltv: f64,
    pub fico: u32,
    pub borrower_pts: f64,
    pub taxes: i64,
    pub ins: i64,
    pub hoa: i64,
    pub pmi_toggle: bool,
    pub dti_over45: bool,
    pub two_plus_borrowers: bool,
    pub finance_ufmip: bool,
    pub annual_mip: f64,
    pub va_exempt: bool,
    pub va_first_use: bool,
    pub dscr_ratio: f64,
}
