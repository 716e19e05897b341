use std::path::{Path, PathBuf};

use crate::lead::{self, LeadRecord, LEAD_FILE};
use crate::overrides::{OverrideReport, Overrides, OVERRIDES_FILE};
use crate::runtime::RuntimeConfig;
use crate::settings::{Settings, SETTINGS_FILE};
use crate::ConfigError;

/// Overrides the config directory (tests, multiple profiles).
pub const CONFIG_DIR_ENV: &str = "QUOTEGATE_CONFIG_DIR";

/// `$QUOTEGATE_CONFIG_DIR`, else `<platform config dir>/quotegate`.
pub fn default_config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotegate")
}

/// All on-disk state under one config directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn open_default() -> Self {
        Self::at(default_config_dir())
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn overrides_path(&self) -> PathBuf {
        self.dir.join(OVERRIDES_FILE)
    }

    pub fn lead_path(&self) -> PathBuf {
        self.dir.join(LEAD_FILE)
    }

    pub fn settings(&self) -> Settings {
        Settings::load_or_default(&self.settings_path())
    }

    /// Unreadable overrides are reported and skipped.
    pub fn overrides(&self) -> Overrides {
        match Overrides::load(&self.overrides_path()) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("{}; ignoring overrides", e);
                Overrides::default()
            }
        }
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig::resolve(&self.settings(), &self.overrides())
    }

    /// Apply a leads-base and/or table override and persist it.
    pub fn apply_overrides(
        &self,
        leads_base: Option<&str>,
        tables_json: Option<&str>,
    ) -> Result<OverrideReport, ConfigError> {
        let mut overrides = Overrides::load(&self.overrides_path())?;
        let mut report = match tables_json {
            Some(text) => overrides.apply_json(text)?,
            None => OverrideReport::default(),
        };
        if let Some(base) = leads_base {
            report.leads_base = overrides.set_leads_base(base);
        }
        overrides.save(&self.overrides_path())?;
        log::info!(
            "overrides applied (leads_base={}, tax_rates={}, insurance={})",
            report.leads_base, report.tax_rates, report.insurance
        );
        Ok(report)
    }

    pub fn reset_overrides(&self) -> Result<(), ConfigError> {
        Overrides::clear(&self.overrides_path())
    }

    pub fn lead(&self) -> Option<LeadRecord> {
        lead::load_lead(&self.lead_path())
    }

    pub fn save_lead(&self, record: &LeadRecord) -> Result<(), ConfigError> {
        lead::save_lead(&self.lead_path(), record)
    }

    pub fn delete_lead(&self) -> Result<(), ConfigError> {
        lead::delete_lead(&self.lead_path())
    }
}
