// Application settings
// Loaded from <config dir>/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use quotegate_engine::inputs::DEFAULT_INITIAL_ZIP;
use quotegate_engine::program::DEFAULT_PROGRAMS;
use quotegate_engine::ZipPolicy;

use crate::ConfigError;

pub const SETTINGS_FILE: &str = "settings.toml";

pub const DEFAULT_PRICING_BASE: &str = "https://script.google.com/macros/s/AKfycbzM2epYNmWxxIP5Sp4Fnl1iz4tCcSf_lCVGb0Hm-0pQBaST8mb8EsQ-jVC6_5WIXZon/exec";
pub const DEFAULT_LEADS_BASE: &str = "https://script.google.com/macros/s/AKfycbxBP3K11wYn-r6_98B3qsJUMI8yj8bKRX8gLFarQ_f5WEvEMSfXHQ9neg4RQJhTlnKv/exec";
pub const DEFAULT_ZIP_SERVICE: &str = "https://api.zippopotam.us";
pub const DEFAULT_DEBOUNCE_MS: u64 = 350;
pub const DEFAULT_SOURCE: &str = "qgate";

/// Remote endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Pricing script base; `?action=price` is appended.
    pub pricing_base: String,
    /// Lead / save-quote script base. Empty disables lead capture and saving.
    pub leads_base: String,
    /// ZIP lookup service; `/us/{zip}` is appended.
    pub zip_service: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            pricing_base: DEFAULT_PRICING_BASE.to_string(),
            leads_base: DEFAULT_LEADS_BASE.to_string(),
            zip_service: DEFAULT_ZIP_SERVICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Quiet period before an edit triggers a re-price.
    pub debounce_ms: u64,
    /// The ZIP the form starts on. The lead gate opens only for a different one.
    pub initial_zip: String,
    /// Sent as `source` on lead and save-quote payloads.
    pub source: String,
    pub programs: Vec<String>,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            initial_zip: DEFAULT_INITIAL_ZIP.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            programs: DEFAULT_PROGRAMS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    /// Upper clamp for LTV derived from a loan-amount edit.
    pub ltv_max: f64,
    pub zip_policy: ZipPolicy,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self { ltv_max: 100.0, zip_policy: ZipPolicy::Strict }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoints: EndpointSettings,
    pub pricing: PricingSettings,
    pub rules: RuleSettings,
}

impl Settings {
    /// Parse a settings file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let settings: Settings = toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
        settings.validate(path)?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is absent or bad.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        if !self.rules.ltv_max.is_finite() || self.rules.ltv_max <= 0.0 {
            return Err(ConfigError::parse(path, "rules.ltv_max must be a positive number"));
        }
        if self.pricing.programs.is_empty() {
            return Err(ConfigError::parse(path, "pricing.programs must not be empty"));
        }
        Ok(())
    }
}
