//! Offline-ish commands: `qgate zip`, `qgate estimate`, `qgate reconcile`.
//!
//! None of these need a lead token. Only `zip` and `estimate --zip` touch
//! the network, and only the ZIP service.

use serde::Serialize;

use quotegate_client::ZipResolver;
use quotegate_config::ConfigStore;
use quotegate_engine::money::{format_currency, format_percent};
use quotegate_engine::{LoanTriangle, TriangleEdit, ZipInfo};

use crate::exit_codes::EXIT_ZIP_NOT_FOUND;
use crate::util::{print_json, print_rows};
use crate::CliError;

const DEFAULT_LTV: f64 = 80.0;

// ── zip ─────────────────────────────────────────────────────────────

pub fn cmd_zip(store: &ConfigStore, zip: String, json: bool) -> Result<(), CliError> {
    let runtime = store.runtime();
    let resolver = ZipResolver::new(&runtime.zip_service, runtime.zip_policy)?;
    let info = resolve_or_fail(&resolver, &zip)?;

    if json {
        return print_json(&info);
    }
    println!("{}", info.display());
    print_rows(&[
        ("ZIP", info.zip.clone()),
        ("State", info.state_abbr.clone()),
    ]);
    Ok(())
}

pub(crate) fn resolve_or_fail(resolver: &ZipResolver, raw: &str) -> Result<ZipInfo, CliError> {
    let Some(zip) = resolver.normalize(raw) else {
        return Err(CliError::new(
            EXIT_ZIP_NOT_FOUND,
            format!("'{}' is not a 5-digit ZIP", raw.trim()),
        ));
    };
    resolver.resolve(&zip).ok_or_else(|| {
        CliError::new(EXIT_ZIP_NOT_FOUND, quotegate_engine::session::ZIP_NOT_FOUND_MESSAGE)
    })
}

// ── estimate ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateOutput {
    property_value: f64,
    state_abbr: String,
    state_name: String,
    tax_rate_pct: f64,
    annual_taxes: f64,
    annual_insurance: f64,
    monthly_escrow: f64,
}

pub fn cmd_estimate(
    store: &ConfigStore,
    value: f64,
    zip: Option<String>,
    state: Option<String>,
    state_name: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let runtime = store.runtime();
    let estimator = runtime.estimator();
    let tables = estimator.tables();

    let (abbr, name) = match zip {
        Some(zip) => {
            let resolver = ZipResolver::new(&runtime.zip_service, runtime.zip_policy)?;
            let info = resolve_or_fail(&resolver, &zip)?;
            (info.state_abbr, info.state_name)
        }
        None => (
            state
                .map(|s| s.trim().to_ascii_uppercase())
                .unwrap_or_else(|| tables.fallback_state_abbr.clone()),
            state_name.unwrap_or_else(|| tables.fallback_state_name.clone()),
        ),
    };

    let estimate = estimator.estimate(value, &abbr, &name);
    let out = EstimateOutput {
        property_value: value,
        tax_rate_pct: tables.tax_rate_for(&abbr),
        annual_taxes: estimate.annual_taxes,
        annual_insurance: estimate.annual_insurance,
        monthly_escrow: ((estimate.annual_taxes + estimate.annual_insurance) / 12.0).round(),
        state_abbr: abbr,
        state_name: name,
    };

    if json {
        return print_json(&out);
    }
    print_rows(&[
        ("State", format!("{} ({})", out.state_name, out.state_abbr)),
        ("Value", format_currency(out.property_value)),
        ("Tax rate", format_percent(out.tax_rate_pct)),
        ("Annual taxes", format_currency(out.annual_taxes)),
        ("Annual insurance", format_currency(out.annual_insurance)),
        ("Monthly escrow", format_currency(out.monthly_escrow)),
    ]);
    Ok(())
}

// ── reconcile ───────────────────────────────────────────────────────

pub fn cmd_reconcile(
    store: &ConfigStore,
    value: f64,
    ltv: Option<f64>,
    loan: Option<f64>,
    json: bool,
) -> Result<(), CliError> {
    let bounds = store.runtime().ltv_bounds;
    let mut triangle = LoanTriangle::new(value, DEFAULT_LTV);
    if let Some(ltv) = ltv {
        triangle.apply(TriangleEdit::Ltv(ltv), bounds);
    }
    if let Some(loan) = loan {
        triangle.apply(TriangleEdit::Loan(loan), bounds);
    }

    if json {
        return print_json(&triangle);
    }
    print_rows(&[
        ("Value", format_currency(triangle.property_value)),
        ("LTV", format_percent(triangle.ltv)),
        ("Loan", format_currency(triangle.loan_amount)),
    ]);
    if !triangle.is_consistent() {
        eprintln!("note: LTV clamped to {}", format_percent(triangle.ltv));
    }
    Ok(())
}
