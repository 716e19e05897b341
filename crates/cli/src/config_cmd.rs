//! `qgate config`: show, path, apply, reset.

use std::path::PathBuf;

use serde::Serialize;

use quotegate_config::{ConfigStore, OverrideReport, Settings};

use crate::util::{print_json, print_rows};
use crate::CliError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOutput<'a> {
    config_dir: String,
    settings: &'a Settings,
    pricing_url: String,
    leads_base: Option<&'a str>,
    tax_rates_overridden: bool,
    insurance_overridden: bool,
    tax_rate_states: usize,
    insurance_states: usize,
    lead_email: Option<String>,
}

pub fn cmd_show(store: &ConfigStore, json: bool) -> Result<(), CliError> {
    let settings = store.settings();
    let overrides = store.overrides();
    let runtime = store.runtime();
    let lead = store.lead();

    let out = ConfigOutput {
        config_dir: store.dir().display().to_string(),
        settings: &settings,
        pricing_url: runtime.price_url(),
        leads_base: runtime.leads_base.as_deref(),
        tax_rates_overridden: overrides.tax_rates.is_some(),
        insurance_overridden: overrides.insurance.is_some(),
        tax_rate_states: runtime.tables.tax_rates.len(),
        insurance_states: runtime.tables.insurance.len(),
        lead_email: lead.and_then(|l| l.lead_email),
    };

    if json {
        return print_json(&out);
    }

    let table_label = |overridden: bool, n: usize| {
        format!("{} states ({})", n, if overridden { "override" } else { "built-in" })
    };
    print_rows(&[
        ("Config dir", out.config_dir.clone()),
        ("Pricing", out.pricing_url.clone()),
        ("Leads", out.leads_base.unwrap_or("(not configured)").to_string()),
        ("ZIP service", runtime.zip_service.clone()),
        ("Debounce", format!("{} ms", runtime.debounce.as_millis())),
        ("Initial ZIP", runtime.initial_zip.clone()),
        ("Programs", runtime.programs.join(", ")),
        ("LTV max", format!("{}", runtime.ltv_bounds.max)),
        ("ZIP policy", format!("{:?}", runtime.zip_policy)),
        ("Tax rates", table_label(out.tax_rates_overridden, out.tax_rate_states)),
        ("Insurance", table_label(out.insurance_overridden, out.insurance_states)),
        ("Lead", out.lead_email.clone().unwrap_or_else(|| "(none)".into())),
    ]);
    Ok(())
}

pub fn cmd_path(store: &ConfigStore) -> Result<(), CliError> {
    println!("{}", store.dir().display());
    Ok(())
}

pub fn cmd_apply(
    store: &ConfigStore,
    leads_base: Option<String>,
    tables: Option<String>,
    tables_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let tables = match tables_file {
        Some(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
            CliError::usage(format!("cannot read {}: {}", path.display(), e))
        })?),
        None => tables,
    };
    if leads_base.is_none() && tables.is_none() {
        return Err(CliError::usage("nothing to apply")
            .with_hint("pass --leads-base, --tables or --tables-file"));
    }

    let report = store.apply_overrides(leads_base.as_deref(), tables.as_deref())?;
    print_report(&report);
    Ok(())
}

pub fn cmd_reset(store: &ConfigStore) -> Result<(), CliError> {
    store.reset_overrides()?;
    eprintln!("Overrides cleared; using built-in tables");
    Ok(())
}

fn print_report(report: &OverrideReport) {
    let mut applied = Vec::new();
    if report.leads_base {
        applied.push("leads endpoint");
    }
    if report.tax_rates {
        applied.push("tax rates");
    }
    if report.insurance {
        applied.push("insurance premiums");
    }
    if applied.is_empty() {
        eprintln!("No overrides changed");
    } else {
        eprintln!("Applied: {}", applied.join(", "));
    }
}
