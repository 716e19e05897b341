//! Operator overrides layered on top of settings.
//!
//! Stored in `overrides.json`. An override table replaces the built-in table
//! entirely. Clearing overrides and rebuilding the runtime config restores
//! the baseline.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use quotegate_engine::{InsuranceTable, TaxRateTable};

use crate::ConfigError;

pub const OVERRIDES_FILE: &str = "overrides.json";

const TAX_KEY: &str = "STATE_TAX_RATE_2023_PCT";
const INSURANCE_KEY: &str = "HOI_2022";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leads_base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rates: Option<TaxRateTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<InsuranceTable>,
}

/// Which tables an apply call replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverrideReport {
    pub leads_base: bool,
    pub tax_rates: bool,
    pub insurance: bool,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.leads_base.is_none() && self.tax_rates.is_none() && self.insurance.is_none()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::parse(path, e))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::parse(path, e))?;
        fs::write(path, json).map_err(|e| ConfigError::io(path, e))
    }

    pub fn clear(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            fs::remove_file(path).map_err(|e| ConfigError::io(path, e))?;
        }
        Ok(())
    }

    /// Set or clear the leads base override. Blank input is ignored.
    pub fn set_leads_base(&mut self, base: &str) -> bool {
        let base = base.trim();
        if base.is_empty() {
            return false;
        }
        self.leads_base = Some(base.to_string());
        true
    }

    /// Apply table overrides from JSON text.
    ///
    /// Accepts `{"STATE_TAX_RATE_2023_PCT": {...}, "HOI_2022": {...}}` (either
    /// key or both), or a bare table whose shape decides what it is: all keys
    /// two uppercase letters is a tax table, any longer alphabetic key makes it
    /// an insurance table. Nothing changes unless the whole input is valid.
    pub fn apply_json(&mut self, text: &str) -> Result<OverrideReport, ConfigError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(OverrideReport::default());
        }
        let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::OverrideJson(e.to_string()))?;
        let Value::Object(obj) = value else {
            return Err(ConfigError::InvalidOverride("expected a JSON object".into()));
        };

        let mut tax = None;
        let mut insurance = None;

        let has_named = obj.contains_key(TAX_KEY) || obj.contains_key(INSURANCE_KEY);
        if has_named {
            if let Some(v) = obj.get(TAX_KEY) {
                tax = Some(table_from(TAX_KEY, v)?);
            }
            if let Some(v) = obj.get(INSURANCE_KEY) {
                insurance = Some(table_from(INSURANCE_KEY, v)?);
            }
        } else if looks_like_tax_table(&obj) {
            tax = Some(table_from("tax table", &Value::Object(obj))?);
        } else if looks_like_insurance_table(&obj) {
            insurance = Some(table_from("insurance table", &Value::Object(obj))?);
        } else {
            return Err(ConfigError::InvalidOverride(
                "could not tell whether this is a tax or insurance table".into(),
            ));
        }

        let report = OverrideReport {
            leads_base: false,
            tax_rates: tax.is_some(),
            insurance: insurance.is_some(),
        };
        if let Some(t) = tax {
            self.tax_rates = Some(t);
        }
        if let Some(t) = insurance {
            self.insurance = Some(t);
        }
        Ok(report)
    }
}

/// Vacuously true for `{}`: an empty bare map installs an empty tax table.
fn looks_like_tax_table(obj: &Map<String, Value>) -> bool {
    obj.keys()
        .all(|k| k.len() == 2 && k.bytes().all(|b| b.is_ascii_uppercase()))
}

fn looks_like_insurance_table(obj: &Map<String, Value>) -> bool {
    obj.keys()
        .any(|k| k.len() > 2 && k.chars().any(|c| c.is_ascii_alphabetic()))
}

fn table_from(name: &str, value: &Value) -> Result<std::collections::BTreeMap<String, f64>, ConfigError> {
    let Value::Object(map) = value else {
        return Err(ConfigError::InvalidOverride(format!("{name} must be an object")));
    };
    map.iter()
        .map(|(k, v)| match v.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => Ok((k.clone(), n)),
            _ => Err(ConfigError::InvalidOverride(format!(
                "{name}: value for '{k}' must be a non-negative number"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_tables() {
        let mut o = Overrides::default();
        let report = o
            .apply_json(r#"{"STATE_TAX_RATE_2023_PCT": {"AZ": 0.6}, "HOI_2022": {"Arizona": 1200}}"#)
            .unwrap();
        assert!(report.tax_rates && report.insurance);
        assert_eq!(o.tax_rates.as_ref().unwrap()["AZ"], 0.6);
        assert_eq!(o.insurance.as_ref().unwrap()["Arizona"], 1200.0);
    }

    #[test]
    fn test_named_single_table_leaves_other() {
        let mut o = Overrides::default();
        o.apply_json(r#"{"HOI_2022": {"Texas": 3000}}"#).unwrap();
        assert!(o.tax_rates.is_none());
        assert_eq!(o.insurance.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_bare_tax_table_inferred() {
        let mut o = Overrides::default();
        let report = o.apply_json(r#"{"AZ": 0.55, "TX": 1.6}"#).unwrap();
        assert!(report.tax_rates);
        assert!(!report.insurance);
        assert_eq!(o.tax_rates.unwrap().len(), 2);
    }

    #[test]
    fn test_bare_insurance_table_inferred() {
        let mut o = Overrides::default();
        let report = o.apply_json(r#"{"New Mexico": 1400, "Ohio": 1000}"#).unwrap();
        assert!(report.insurance);
        assert!(!report.tax_rates);
    }

    #[test]
    fn test_malformed_json_changes_nothing() {
        let mut o = Overrides::default();
        o.apply_json(r#"{"AZ": 0.55}"#).unwrap();
        let before = o.clone();

        assert!(matches!(o.apply_json("{not json"), Err(ConfigError::OverrideJson(_))));
        assert!(o.apply_json(r#"{"AZ": "high"}"#).is_err());
        assert!(o.apply_json(r#"[1, 2]"#).is_err());
        assert!(o.apply_json(r#"{"12": 1}"#).is_err());
        assert_eq!(o, before);
    }

    #[test]
    fn test_empty_bare_map_is_empty_tax_table() {
        let mut o = Overrides::default();
        let report = o.apply_json("{}").unwrap();
        assert!(report.tax_rates);
        assert!(!report.insurance);
        assert!(o.tax_rates.as_ref().unwrap().is_empty());
        assert!(o.insurance.is_none());
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut o = Overrides::default();
        assert_eq!(o.apply_json("   ").unwrap(), OverrideReport::default());
        assert!(o.is_empty());
    }

    #[test]
    fn test_persist_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERRIDES_FILE);

        let mut o = Overrides::default();
        assert!(o.set_leads_base(" https://example.test/exec "));
        assert!(!o.set_leads_base("  "));
        o.apply_json(r#"{"AZ": 0.7}"#).unwrap();
        o.save(&path).unwrap();

        let loaded = Overrides::load(&path).unwrap();
        assert_eq!(loaded.leads_base.as_deref(), Some("https://example.test/exec"));
        assert_eq!(loaded, o);

        Overrides::clear(&path).unwrap();
        assert!(Overrides::load(&path).unwrap().is_empty());
    }
}
