//! `qgate quote`: one-shot pricing, optionally saved against the lead.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use quotegate_client::{QuoteClient, SaveQuoteRequest, ZipResolver};
use quotegate_config::{ConfigStore, LeadRecord, RuntimeConfig};
use quotegate_engine::money::{format_currency, format_percent};
use quotegate_engine::quote::quote_stamp;
use quotegate_engine::{InputEdit, ProgramField, QuoteInputs, QuoteSession, QuoteSummary, ZipStatus};

use crate::exit_codes::EXIT_LEAD_REQUIRED;
use crate::util::{print_json, print_rows};
use crate::{CliError, ScenarioArgs};

pub fn cmd_quote(store: &ConfigStore, scenario: ScenarioArgs, save: bool, json: bool) -> Result<(), CliError> {
    let runtime = store.runtime();
    let lead = require_lead(store)?;
    let resolver = ZipResolver::new(&runtime.zip_service, runtime.zip_policy)?;
    let client = QuoteClient::new(&runtime)?;

    let mut session = new_session(&runtime, Some(&lead));
    let zip = scenario.zip.clone().unwrap_or_else(|| runtime.initial_zip.clone());
    if let ZipStatus::NotFound = apply_zip(&mut session, &resolver, &zip) {
        eprintln!("warning: {}", quotegate_engine::session::ZIP_NOT_FOUND_MESSAGE);
    }
    apply_scenario(&mut session, &runtime, &scenario)?;

    let quote = match client.price_inputs(session.inputs(), session.lead_token()) {
        Ok(q) => q,
        Err(e) => {
            session.record_error(format!("Pricing error: {}", e));
            return Err(e.into());
        }
    };
    let quoted_at = Local::now();
    session.record_quote(quote.clone(), quoted_at);
    let stamp = quote_stamp(&quoted_at);

    let saved = if save {
        client.save_quote(&SaveQuoteRequest {
            lead_token: lead.lead_token.clone(),
            inputs: session.inputs().pricing_payload(),
            quote: quote.clone(),
            saved_at: stamp.clone(),
            source: runtime.source.clone(),
            subject_zip: Some(session.inputs().prop_zip.clone()).filter(|z| !z.is_empty()),
        })?;
        true
    } else {
        false
    };

    let summary = session.summary().unwrap_or_else(|| QuoteSummary::from_response(&quote, 0.0));
    if json {
        return print_json(&QuoteOutput {
            quoted_at: stamp,
            inputs: session.inputs(),
            summary: &summary,
            quote: &quote,
            saved,
        });
    }

    print_inputs(session.inputs());
    println!();
    print_rows(&summary.rows());
    println!("\nLast quoted {}", stamp);
    if saved {
        eprintln!("Quote saved");
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteOutput<'a> {
    quoted_at: String,
    inputs: &'a QuoteInputs,
    summary: &'a QuoteSummary,
    quote: &'a Value,
    saved: bool,
}

// ── Session helpers (shared with watch) ─────────────────────────────

pub(crate) fn require_lead(store: &ConfigStore) -> Result<LeadRecord, CliError> {
    store.lead().ok_or_else(|| {
        CliError::new(EXIT_LEAD_REQUIRED, "pricing is locked until lead capture is complete")
            .with_hint("run `qgate lead --zip .. --first .. --last .. --phone .. --email ..`")
    })
}

pub(crate) fn new_session(runtime: &RuntimeConfig, lead: Option<&LeadRecord>) -> QuoteSession {
    QuoteSession::new(runtime.estimator(), runtime.ltv_bounds)
        .with_initial_zip(runtime.initial_zip.clone())
        .with_lead_token(lead.map(|l| l.lead_token.clone()))
}

/// Normalize, resolve and apply a ZIP. Unusable input clears the location.
pub(crate) fn apply_zip(session: &mut QuoteSession, resolver: &ZipResolver, raw: &str) -> ZipStatus {
    let zip = resolver.normalize(raw);
    let lookup = zip.as_deref().and_then(|z| resolver.resolve(z));
    session.zip_changed(zip, lookup)
}

/// Canonical program code if it is one of the configured programs.
pub(crate) fn program_code(runtime: &RuntimeConfig, raw: &str) -> Result<String, CliError> {
    let code = raw.trim().to_ascii_uppercase();
    if runtime.programs.iter().any(|p| p.eq_ignore_ascii_case(&code)) {
        Ok(code)
    } else {
        Err(CliError::usage(format!("unknown program '{}'", raw.trim()))
            .with_hint(format!("configured programs: {}", runtime.programs.join(", "))))
    }
}

fn apply_scenario(session: &mut QuoteSession, runtime: &RuntimeConfig, s: &ScenarioArgs) -> Result<(), CliError> {
    if let Some(program) = &s.program {
        session.apply(InputEdit::Program(program_code(runtime, program)?));
    }
    if let Some(txn) = s.txn {
        session.apply(InputEdit::Transaction(txn));
    }
    if let Some(term) = s.term {
        session.apply(InputEdit::Term(term));
    }
    if let Some(value) = s.value {
        session.edit_value(value);
    }
    if let Some(ltv) = s.ltv {
        session.edit_ltv(ltv);
    }
    if let Some(loan) = s.loan {
        session.edit_loan(loan);
    }
    if let Some(fico) = s.fico {
        session.apply(InputEdit::Fico(fico));
    }
    if let Some(points) = s.points {
        session.apply(InputEdit::Points(points));
    }
    if let Some(hoa) = s.hoa {
        session.apply(InputEdit::Hoa(hoa));
    }
    if let Some(taxes) = s.taxes {
        session.set_taxes_manual(taxes);
    }
    if let Some(ins) = s.ins {
        session.set_insurance_manual(ins);
    }
    Ok(())
}

pub(crate) fn print_inputs(inputs: &QuoteInputs) {
    let location = if inputs.city.is_empty() {
        inputs.state_name.clone()
    } else {
        format!("{}, {}", inputs.city, inputs.state_name)
    };
    let mut rows = vec![
        ("Property", format!("{} ({})", location, inputs.prop_zip)),
        ("Program", format!("{} ({}), {} mo", inputs.program, inputs.family().label(), inputs.term)),
        ("Value", format_currency(inputs.value)),
        ("LTV", format_percent(inputs.ltv)),
        ("Loan", format_currency(inputs.loan)),
        ("FICO", inputs.fico.to_string()),
        ("Taxes/yr", format_currency(inputs.taxes)),
        ("Insurance/yr", format_currency(inputs.ins)),
        ("HOA/mo", format_currency(inputs.hoa)),
    ];
    for field in inputs.family().fields() {
        let value = match field {
            ProgramField::FinanceUfmip => yes_no(inputs.finance_ufmip),
            ProgramField::AnnualMip => format_percent(inputs.annual_mip),
            ProgramField::VaExempt => yes_no(inputs.va_exempt),
            ProgramField::VaFirstUse => yes_no(inputs.va_first_use),
            ProgramField::DscrRatio => format!("{:.2}", inputs.dscr_ratio),
        };
        rows.push((field.wire_name(), value));
    }
    print_rows(&rows);
}

fn yes_no(b: bool) -> String {
    let text = if b { "yes" } else { "no" };
    text.to_string()
}
