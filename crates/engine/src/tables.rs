//! Per-state reference tables for escrow estimates.
//!
//! Tax rates are 2023 effective property tax percentages keyed by two-letter
//! state code. Insurance premiums are 2022 average homeowner's premiums keyed
//! by full state name, quoted at [`REFERENCE_COVERAGE`].
//!
//! Tables are replaced wholesale by operator overrides, never merged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dwelling coverage the insurance premiums are quoted at.
pub const REFERENCE_COVERAGE: f64 = 300_000.0;

pub const FALLBACK_STATE_ABBR: &str = "AZ";
pub const FALLBACK_STATE_NAME: &str = "Arizona";

/// Rate used when neither the state nor the fallback state has a tax entry.
pub const FALLBACK_TAX_RATE_PCT: f64 = 0.5;

pub type TaxRateTable = BTreeMap<String, f64>;
pub type InsuranceTable = BTreeMap<String, f64>;

const TAX_RATES_2023_PCT: &[(&str, f64)] = &[
    ("AL", 0.375), ("AK", 0.875), ("AZ", 0.500), ("AR", 0.500), ("CA", 0.750),
    ("CO", 0.500), ("CT", 1.500), ("DE", 0.500), ("FL", 0.750), ("GA", 0.750),
    ("HI", 0.375), ("ID", 0.500), ("IL", 1.875), ("IN", 0.750), ("IA", 1.250),
    ("KS", 1.250), ("KY", 0.750), ("LA", 0.500), ("ME", 1.000), ("MD", 0.875),
    ("MA", 1.000), ("MI", 1.125), ("MN", 1.000), ("MS", 0.625), ("MO", 0.875),
    ("MT", 0.625), ("NE", 1.375), ("NV", 0.500), ("NH", 1.375), ("NJ", 1.750),
    ("NM", 0.625), ("NY", 1.250), ("NC", 0.625), ("ND", 1.000), ("OH", 1.250),
    ("OK", 0.750), ("OR", 0.750), ("PA", 1.250), ("RI", 1.000), ("SC", 0.500),
    ("SD", 1.000), ("TN", 0.500), ("TX", 1.375), ("UT", 0.500), ("VT", 1.375),
    ("VA", 0.750), ("WA", 0.750), ("WV", 0.500), ("WI", 1.250), ("WY", 0.500),
    ("DC", 0.625),
];

const INSURANCE_2022: &[(&str, f64)] = &[
    ("Alabama", 1748.0), ("Alaska", 1129.0), ("Arizona", 1018.0), ("Arkansas", 1740.0),
    ("California", 1492.0), ("Colorado", 2079.0), ("Connecticut", 1814.0),
    ("Delaware", 1103.0), ("District of Columbia", 1384.0), ("Florida", 2677.0),
    ("Georgia", 1655.0), ("Hawaii", 1431.0), ("Idaho", 1002.0), ("Illinois", 1343.0),
    ("Indiana", 1191.0), ("Iowa", 1268.0), ("Kansas", 1583.0), ("Kentucky", 1359.0),
    ("Louisiana", 2603.0), ("Maine", 1077.0), ("Maryland", 1392.0),
    ("Massachusetts", 1871.0), ("Michigan", 1056.0), ("Minnesota", 1774.0),
    ("Mississippi", 1907.0), ("Missouri", 1668.0), ("Montana", 1639.0),
    ("Nebraska", 1869.0), ("Nevada", 948.0), ("New Hampshire", 1188.0),
    ("New Jersey", 1417.0), ("New Mexico", 1322.0), ("New York", 1628.0),
    ("North Carolina", 1621.0), ("North Dakota", 1325.0), ("Ohio", 995.0),
    ("Oklahoma", 2268.0), ("Oregon", 893.0), ("Pennsylvania", 1120.0),
    ("Rhode Island", 2074.0), ("South Carolina", 1571.0), ("South Dakota", 1756.0),
    ("Tennessee", 1492.0), ("Texas", 2397.0), ("Utah", 937.0), ("Vermont", 1109.0),
    ("Virginia", 1332.0), ("Washington", 1151.0), ("West Virginia", 1113.0),
    ("Wisconsin", 957.0), ("Wyoming", 1596.0),
];

/// Built-in tax-rate table.
pub fn default_tax_rates() -> TaxRateTable {
    TAX_RATES_2023_PCT
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

/// Built-in insurance premium table.
pub fn default_insurance_premiums() -> InsuranceTable {
    INSURANCE_2022
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

/// The reference data an [`EscrowEstimator`](crate::EscrowEstimator) runs against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTables {
    pub tax_rates: TaxRateTable,
    pub insurance: InsuranceTable,
    pub reference_coverage: f64,
    pub fallback_state_abbr: String,
    pub fallback_state_name: String,
}

impl Default for StateTables {
    fn default() -> Self {
        Self {
            tax_rates: default_tax_rates(),
            insurance: default_insurance_premiums(),
            reference_coverage: REFERENCE_COVERAGE,
            fallback_state_abbr: FALLBACK_STATE_ABBR.to_string(),
            fallback_state_name: FALLBACK_STATE_NAME.to_string(),
        }
    }
}

impl StateTables {
    /// Replace the tax table, keeping everything else.
    pub fn with_tax_rates(mut self, tax_rates: TaxRateTable) -> Self {
        self.tax_rates = tax_rates;
        self
    }

    /// Replace the insurance table, keeping everything else.
    pub fn with_insurance(mut self, insurance: InsuranceTable) -> Self {
        self.insurance = insurance;
        self
    }

    /// Tax rate percent for a state code, falling back to the fallback state
    /// and then to [`FALLBACK_TAX_RATE_PCT`].
    pub fn tax_rate_for(&self, state_abbr: &str) -> f64 {
        self.tax_rates
            .get(state_abbr)
            .or_else(|| self.tax_rates.get(&self.fallback_state_abbr))
            .copied()
            .unwrap_or(FALLBACK_TAX_RATE_PCT)
    }

    /// Base premium for a state name, falling back to the fallback state.
    /// Zero when neither has an entry.
    pub fn base_premium_for(&self, state_name: &str) -> f64 {
        self.insurance
            .get(state_name)
            .or_else(|| self.insurance.get(&self.fallback_state_name))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_all_states() {
        let t = StateTables::default();
        assert_eq!(t.tax_rates.len(), 51);
        assert_eq!(t.insurance.len(), 51);
        assert_eq!(t.tax_rate_for("TX"), 1.375);
        assert_eq!(t.base_premium_for("Florida"), 2677.0);
    }

    #[test]
    fn test_tax_rate_fallbacks() {
        let t = StateTables::default();
        assert_eq!(t.tax_rate_for("ZZ"), 0.5); // AZ entry
        assert_eq!(t.tax_rate_for(""), 0.5);

        let empty = StateTables::default().with_tax_rates(TaxRateTable::new());
        assert_eq!(empty.tax_rate_for("TX"), FALLBACK_TAX_RATE_PCT);
    }

    #[test]
    fn test_premium_fallbacks() {
        let t = StateTables::default();
        assert_eq!(t.base_premium_for("Atlantis"), 1018.0);

        let mut only_texas = InsuranceTable::new();
        only_texas.insert("Texas".into(), 2397.0);
        let t = StateTables::default().with_insurance(only_texas);
        assert_eq!(t.base_premium_for("Texas"), 2397.0);
        assert_eq!(t.base_premium_for("Ohio"), 0.0);
    }
}
