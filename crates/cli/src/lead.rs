//! Lead gate commands: `qgate lead` and `qgate logout`.

use quotegate_client::{LeadForm, QuoteClient, ZipResolver};
use quotegate_config::{ConfigStore, LeadRecord};
use quotegate_engine::session::ZIP_NOT_FOUND_MESSAGE;
use quotegate_engine::ZipStatus;

use crate::exit_codes::EXIT_ZIP_NOT_FOUND;
use crate::quote::{apply_zip, new_session};
use crate::CliError;

/// Capture the lead and save its token. The property ZIP must resolve and
/// differ from the initial ZIP before any lead request is sent.
#[allow(clippy::too_many_arguments)]
pub fn cmd_lead(
    store: &ConfigStore,
    zip: String,
    first: String,
    last: String,
    phone: String,
    email: String,
    timeline: String,
    text_updates: bool,
) -> Result<(), CliError> {
    let runtime = store.runtime();
    let resolver = ZipResolver::new(&runtime.zip_service, runtime.zip_policy)?;
    let client = QuoteClient::new(&runtime)?;

    let mut session = new_session(&runtime, None);
    if let ZipStatus::NotFound = apply_zip(&mut session, &resolver, &zip) {
        return Err(CliError::new(EXIT_ZIP_NOT_FOUND, ZIP_NOT_FOUND_MESSAGE));
    }
    if !session.zip_ready_for_gate() {
        return Err(CliError::usage(format!(
            "lead capture needs the 5-digit property ZIP (not the default {})",
            runtime.initial_zip
        ))
        .with_hint("qgate lead --zip 78701 --first .. --last .. --phone .. --email .."));
    }

    let form = LeadForm {
        first_name: first.trim().to_string(),
        last_name: last.trim().to_string(),
        phone: phone.trim().to_string(),
        email: email.trim().to_string(),
        timeline: timeline.trim().to_string(),
        text_updates,
        source: runtime.source.clone(),
    };

    let token = client.upsert_lead(&form)?;
    store.save_lead(&LeadRecord::new(token, Some(form.email.clone())))?;

    let inputs = session.inputs();
    eprintln!("Pricing unlocked for {} ({}, {})", form.email, inputs.city, inputs.state_abbr);
    Ok(())
}

pub fn cmd_logout(store: &ConfigStore) -> Result<(), CliError> {
    let had_lead = store.lead().is_some();
    store.delete_lead()?;
    if had_lead {
        eprintln!("Lead token removed");
    } else {
        eprintln!("No lead token saved");
    }
    Ok(())
}
