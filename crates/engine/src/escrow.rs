//! Escrow estimates: annual property tax and homeowner's insurance.

use serde::{Deserialize, Serialize};

use crate::money::round_to_nearest;
use crate::tables::StateTables;

/// Insurance estimates are rounded to this many dollars.
pub const INSURANCE_ROUNDING: f64 = 25.0;

/// Estimated annual escrow amounts, in dollars.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowEstimate {
    pub annual_taxes: f64,
    pub annual_insurance: f64,
}

/// `value * rate_percent / 100`, or 0 when either input is non-positive or
/// non-finite.
pub fn estimate_annual_tax(value: f64, rate_percent: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 || !rate_percent.is_finite() || rate_percent <= 0.0 {
        return 0.0;
    }
    value * (rate_percent / 100.0)
}

/// Scale a base premium linearly from `reference_coverage` to `value`, rounded
/// to the nearest $25.
pub fn estimate_annual_insurance(value: f64, base_premium: f64, reference_coverage: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    if !base_premium.is_finite() || base_premium <= 0.0 {
        return 0.0;
    }
    if !reference_coverage.is_finite() || reference_coverage <= 0.0 {
        return 0.0;
    }
    let scaled = base_premium * (value / reference_coverage);
    round_to_nearest(scaled, INSURANCE_ROUNDING)
}

/// Table-backed estimator. Built from an explicit [`StateTables`]; swap the
/// whole estimator to change tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EscrowEstimator {
    tables: StateTables,
}

impl EscrowEstimator {
    pub fn new(tables: StateTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &StateTables {
        &self.tables
    }

    /// Annual taxes in whole dollars for a state code.
    pub fn annual_tax(&self, value: f64, state_abbr: &str) -> f64 {
        let abbr = if state_abbr.is_empty() {
            self.tables.fallback_state_abbr.as_str()
        } else {
            state_abbr
        };
        estimate_annual_tax(value, self.tables.tax_rate_for(abbr)).round()
    }

    /// Annual insurance for a state name, a multiple of $25.
    pub fn annual_insurance(&self, value: f64, state_name: &str) -> f64 {
        let name = if state_name.is_empty() {
            self.tables.fallback_state_name.as_str()
        } else {
            state_name
        };
        estimate_annual_insurance(
            value,
            self.tables.base_premium_for(name),
            self.tables.reference_coverage,
        )
    }

    pub fn estimate(&self, value: f64, state_abbr: &str, state_name: &str) -> EscrowEstimate {
        EscrowEstimate {
            annual_taxes: self.annual_tax(value, state_abbr),
            annual_insurance: self.annual_insurance(value, state_name),
        }
    }
}
