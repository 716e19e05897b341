use std::time::Duration;

use quotegate_engine::{EscrowEstimator, LtvBounds, StateTables, ZipPolicy};

use crate::overrides::Overrides;
use crate::settings::Settings;

/// Fully resolved configuration handed to the resolver, estimator and client.
///
/// Built from settings plus overrides. Never mutated in place: to change or
/// reset, resolve a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub pricing_base: String,
    /// None when lead capture is not configured.
    pub leads_base: Option<String>,
    pub zip_service: String,
    pub tables: StateTables,
    pub debounce: Duration,
    pub ltv_bounds: LtvBounds,
    pub zip_policy: ZipPolicy,
    pub initial_zip: String,
    pub source: String,
    pub programs: Vec<String>,
}

impl RuntimeConfig {
    /// Settings and built-in tables only.
    pub fn baseline(settings: &Settings) -> Self {
        Self::resolve(settings, &Overrides::default())
    }

    pub fn resolve(settings: &Settings, overrides: &Overrides) -> Self {
        let mut tables = StateTables::default();
        if let Some(t) = &overrides.tax_rates {
            tables = tables.with_tax_rates(t.clone());
        }
        if let Some(t) = &overrides.insurance {
            tables = tables.with_insurance(t.clone());
        }

        let leads_base = overrides
            .leads_base
            .as_deref()
            .unwrap_or(&settings.endpoints.leads_base)
            .trim()
            .to_string();

        Self {
            pricing_base: settings.endpoints.pricing_base.trim().to_string(),
            leads_base: if leads_base.is_empty() { None } else { Some(leads_base) },
            zip_service: settings.endpoints.zip_service.trim_end_matches('/').to_string(),
            tables,
            debounce: Duration::from_millis(settings.pricing.debounce_ms),
            ltv_bounds: LtvBounds::with_max(settings.rules.ltv_max),
            zip_policy: settings.rules.zip_policy,
            initial_zip: settings.pricing.initial_zip.clone(),
            source: settings.pricing.source.clone(),
            programs: settings.pricing.programs.clone(),
        }
    }

    pub fn estimator(&self) -> EscrowEstimator {
        EscrowEstimator::new(self.tables.clone())
    }

    pub fn price_url(&self) -> String {
        with_action(&self.pricing_base, "price")
    }

    pub fn upsert_lead_url(&self) -> Option<String> {
        self.leads_base.as_deref().map(|b| with_action(b, "upsertLead"))
    }

    pub fn save_quote_url(&self) -> Option<String> {
        self.leads_base.as_deref().map(|b| with_action(b, "saveQuote"))
    }
}

fn with_action(base: &str, action: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}action={action}")
}
