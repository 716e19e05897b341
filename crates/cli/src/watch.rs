//! `qgate watch`: interactive quote session.
//!
//! Each stdin line is one edit applied to the shared session. Edits that
//! change what would be priced schedule a debounced re-price on the
//! scheduler thread; a response that arrives after a newer re-price started
//! is dropped.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::Local;
use serde_json::Value;

use quotegate_client::{ClientError, LeadForm, QuoteClient, RepriceScheduler, SaveQuoteRequest, Ticket, ZipResolver};
use quotegate_config::{ConfigStore, LeadRecord, RuntimeConfig};
use quotegate_engine::money::parse_currency;
use quotegate_engine::quote::quote_stamp;
use quotegate_engine::{InputEdit, QuoteSession, Transaction};

use crate::quote::{apply_zip, new_session, print_inputs, program_code};
use crate::util::print_rows;
use crate::CliError;

const HELP: &str = "\
  zip <ZIP>              property ZIP (re-estimates escrows)
  value <AMT>            property value
  ltv <PCT> | loan <AMT> loan-to-value or loan amount
  fico <N>               credit score (300-850)
  points <N>             borrower points (-5 to 5)
  program <CODE>         e.g. CONV30, FHA30, VA30, DSCR30
  txn <TYPE>             purchase, refinance, cash-out
  term <MONTHS>
  taxes <AMT|auto>       annual taxes; `auto` re-enables the estimate
  ins <AMT|auto>         annual insurance; `auto` re-enables the estimate
  hoa <AMT>              monthly HOA dues
  pmi|dti45|borrowers2|ufmip|va-exempt|va-first <on|off>
  mip <PCT> | dscr <RATIO>
  lead <FIRST> <LAST> <PHONE> <EMAIL>   unlock pricing
  show | save | reload | help | quit";

#[derive(Debug, Clone, PartialEq)]
enum WatchCommand {
    Zip(String),
    Value(f64),
    Ltv(f64),
    Loan(f64),
    Taxes(Option<f64>),
    Ins(Option<f64>),
    Program(String),
    Edit(InputEdit),
    Lead { first: String, last: String, phone: String, email: String },
    Show,
    Save,
    Reload,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<WatchCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = parts.collect();
    let arg = rest.first().copied();
    let need = |what: &str| arg.ok_or_else(|| format!("`{}` needs {}", head, what));
    let amount = |what: &str| -> Result<f64, String> {
        let a = need(what)?;
        if !a.chars().any(|c| c.is_ascii_digit()) {
            return Err(format!("'{}' is not a number", a));
        }
        Ok(parse_currency(a))
    };
    let flag = || -> Result<bool, String> {
        match need("on or off")?.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => Ok(true),
            "off" | "no" | "false" | "0" => Ok(false),
            other => Err(format!("expected on/off, got '{}'", other)),
        }
    };
    let auto_or_amount = |what: &str| -> Result<Option<f64>, String> {
        if need(what)?.eq_ignore_ascii_case("auto") {
            Ok(None)
        } else {
            amount(what).map(Some)
        }
    };

    let cmd = match head.to_ascii_lowercase().as_str() {
        "zip" => WatchCommand::Zip(arg.unwrap_or("").to_string()),
        "value" => WatchCommand::Value(amount("an amount")?),
        "ltv" => WatchCommand::Ltv(amount("a percentage")?),
        "loan" => WatchCommand::Loan(amount("an amount")?),
        "taxes" => WatchCommand::Taxes(auto_or_amount("an amount or `auto`")?),
        "ins" => WatchCommand::Ins(auto_or_amount("an amount or `auto`")?),
        "program" => WatchCommand::Program(need("a program code")?.to_string()),
        "fico" => {
            let n = need("a score")?;
            WatchCommand::Edit(InputEdit::Fico(n.parse().map_err(|_| format!("'{}' is not a score", n))?))
        }
        "points" => WatchCommand::Edit(InputEdit::Points(amount("a number")?)),
        "txn" => WatchCommand::Edit(InputEdit::Transaction(need("a type")?.parse::<Transaction>()?)),
        "term" => {
            let n = need("months")?;
            WatchCommand::Edit(InputEdit::Term(n.parse().map_err(|_| format!("'{}' is not a term", n))?))
        }
        "hoa" => WatchCommand::Edit(InputEdit::Hoa(amount("an amount")?)),
        "pmi" => WatchCommand::Edit(InputEdit::PmiToggle(flag()?)),
        "dti45" => WatchCommand::Edit(InputEdit::DtiOver45(flag()?)),
        "borrowers2" => WatchCommand::Edit(InputEdit::TwoPlusBorrowers(flag()?)),
        "ufmip" => WatchCommand::Edit(InputEdit::FinanceUfmip(flag()?)),
        "mip" => WatchCommand::Edit(InputEdit::AnnualMip(amount("a percentage")?)),
        "va-exempt" => WatchCommand::Edit(InputEdit::VaExempt(flag()?)),
        "va-first" => WatchCommand::Edit(InputEdit::VaFirstUse(flag()?)),
        "dscr" => WatchCommand::Edit(InputEdit::DscrRatio(amount("a ratio")?)),
        "lead" => match rest.as_slice() {
            [first, last, phone, email] => WatchCommand::Lead {
                first: first.to_string(),
                last: last.to_string(),
                phone: phone.to_string(),
                email: email.to_string(),
            },
            _ => return Err("usage: lead <FIRST> <LAST> <PHONE> <EMAIL>".into()),
        },
        "show" => WatchCommand::Show,
        "save" => WatchCommand::Save,
        "reload" => WatchCommand::Reload,
        "help" | "?" => WatchCommand::Help,
        "quit" | "exit" | "q" => WatchCommand::Quit,
        other => return Err(format!("unknown command '{}' (try `help`)", other)),
    };
    Ok(Some(cmd))
}

struct Watch {
    store: ConfigStore,
    runtime: RuntimeConfig,
    resolver: ZipResolver,
    client: QuoteClient,
    scheduler: RepriceScheduler,
    session: Arc<Mutex<QuoteSession>>,
    pending: Option<JoinHandle<()>>,
}

pub fn cmd_watch(store: &ConfigStore) -> Result<(), CliError> {
    let runtime = store.runtime();
    let lead = store.lead();
    let resolver = ZipResolver::new(&runtime.zip_service, runtime.zip_policy)?;
    let client = QuoteClient::new(&runtime)?;
    let scheduler = RepriceScheduler::new(runtime.debounce);

    let mut session = new_session(&runtime, lead.as_ref());
    let initial_zip = runtime.initial_zip.clone();
    if let Some(msg) = apply_zip(&mut session, &resolver, &initial_zip).message() {
        println!("{}", msg);
    }
    session.take_reprice();

    let mut watch = Watch {
        store: store.clone(),
        runtime,
        resolver,
        client,
        scheduler,
        session: Arc::new(Mutex::new(session)),
        pending: None,
    };

    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        println!("qgate watch - type `help` for commands, `quit` to leave");
    }
    if lead.is_some() {
        watch.reprice_now();
    } else {
        println!("Pricing is locked. Change the ZIP, then `lead <FIRST> <LAST> <PHONE> <EMAIL>`.");
    }

    let stdin = io::stdin();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush().ok();
        }
        let mut line = String::new();
        let n = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| CliError::general(format!("cannot read stdin: {}", e)))?;
        if n == 0 {
            break;
        }

        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(WatchCommand::Quit)) => break,
            Ok(Some(cmd)) => watch.handle(cmd),
            Err(msg) => eprintln!("{}", msg),
        }
    }

    // Let the last debounce window run out so the final edit gets priced.
    if let Some(handle) = watch.pending.take() {
        let _ = handle.join();
    }
    Ok(())
}

impl Watch {
    fn lock(&self) -> std::sync::MutexGuard<'_, QuoteSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn handle(&mut self, cmd: WatchCommand) {
        let mut force = false;
        match cmd {
            WatchCommand::Zip(raw) => {
                let status = {
                    let mut s = self.lock();
                    apply_zip(&mut s, &self.resolver, &raw)
                };
                if let Some(msg) = status.message() {
                    println!("{}", msg);
                }
                let ready = { let s = self.lock(); s.zip_ready_for_gate() && !s.is_gated() };
                if ready {
                    println!("Unlock pricing: lead <FIRST> <LAST> <PHONE> <EMAIL>");
                }
            }
            WatchCommand::Value(v) => self.lock().edit_value(v),
            WatchCommand::Ltv(v) => self.lock().edit_ltv(v),
            WatchCommand::Loan(v) => self.lock().edit_loan(v),
            WatchCommand::Taxes(None) => self.lock().set_tax_auto(true),
            WatchCommand::Taxes(Some(v)) => self.lock().set_taxes_manual(v),
            WatchCommand::Ins(None) => self.lock().set_ins_auto(true),
            WatchCommand::Ins(Some(v)) => self.lock().set_insurance_manual(v),
            WatchCommand::Program(raw) => match program_code(&self.runtime, &raw) {
                Ok(code) => self.lock().apply(InputEdit::Program(code)),
                Err(e) => eprintln!("{}", e.message),
            },
            WatchCommand::Edit(edit) => self.lock().apply(edit),
            WatchCommand::Lead { first, last, phone, email } => self.capture_lead(first, last, phone, email),
            WatchCommand::Show => self.show(),
            WatchCommand::Save => self.save(),
            WatchCommand::Reload => {
                self.reload();
                force = true;
            }
            WatchCommand::Help => println!("{}", HELP),
            WatchCommand::Quit => {}
        }

        let (reprice, gated) = {
            let mut s = self.lock();
            (s.take_reprice(), s.is_gated())
        };
        if (reprice || force) && gated {
            self.schedule_reprice();
        }
    }

    fn show(&self) {
        let s = self.lock();
        print_inputs(s.inputs());
        if let Some(summary) = s.summary() {
            println!();
            print_rows(&summary.rows());
        }
        if let Some(at) = s.last_quoted_at() {
            println!("Last quoted {}", quote_stamp(&at));
        }
        if let Some(err) = s.last_error() {
            println!("{}", err);
        }
    }

    fn capture_lead(&mut self, first: String, last: String, phone: String, email: String) {
        let locked = {
            let s = self.lock();
            !s.is_gated() && !s.zip_ready_for_gate()
        };
        if locked {
            println!(
                "Enter the 5-digit property ZIP first (not {}), then `lead ...`.",
                self.runtime.initial_zip
            );
            return;
        }

        let form = LeadForm {
            first_name: first,
            last_name: last,
            phone,
            email,
            timeline: String::new(),
            text_updates: false,
            source: self.runtime.source.clone(),
        };
        let token = match self.client.upsert_lead(&form) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Lead error: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save_lead(&LeadRecord::new(token.clone(), Some(form.email.clone()))) {
            log::warn!("lead token not persisted: {}", e);
        }
        self.lock().set_lead_token(token);
        println!("Pricing unlocked for {}", form.email);
        self.reprice_now();
    }

    fn save(&self) {
        let request = {
            let s = self.lock();
            let (Some(token), Some(quote)) = (s.lead_token(), s.last_quote()) else {
                eprintln!("Nothing to save yet: price a scenario first");
                return;
            };
            SaveQuoteRequest {
                lead_token: token.to_string(),
                inputs: s.inputs().pricing_payload(),
                quote: quote.clone(),
                saved_at: quote_stamp(&Local::now()),
                source: self.runtime.source.clone(),
                subject_zip: Some(s.inputs().prop_zip.clone()).filter(|z| !z.is_empty()),
            }
        };
        match self.client.save_quote(&request) {
            Ok(()) => println!("Quote saved {}", request.saved_at),
            Err(e) => eprintln!("Save error: {}", e),
        }
    }

    /// Re-read settings and overrides; tables take effect immediately.
    /// The debounce window keeps its startup value.
    fn reload(&mut self) {
        self.runtime = self.store.runtime();
        match QuoteClient::new(&self.runtime) {
            Ok(c) => self.client = c,
            Err(e) => log::warn!("keeping previous client: {}", e),
        }
        {
            let mut s = self.lock();
            s.set_ltv_bounds(self.runtime.ltv_bounds);
            s.replace_estimator(self.runtime.estimator());
        }
        println!("Configuration reloaded");
    }

    fn reprice_now(&self) {
        let (session, client) = (Arc::clone(&self.session), self.client.clone());
        self.scheduler.run_now(move |ticket| run_pricing(&session, &client, ticket));
    }

    fn schedule_reprice(&mut self) {
        let (session, client) = (Arc::clone(&self.session), self.client.clone());
        self.pending = Some(self.scheduler.schedule(move |ticket| run_pricing(&session, &client, ticket)));
    }
}

/// Price the current inputs. The lock is not held across the request.
fn run_pricing(session: &Mutex<QuoteSession>, client: &QuoteClient, ticket: Ticket) {
    let (inputs, token) = {
        let s = session.lock().unwrap_or_else(|p| p.into_inner());
        (s.inputs().clone(), s.lead_token().map(str::to_string))
    };
    let Some(token) = token else {
        return;
    };

    let result = client.price_inputs(&inputs, Some(token.as_str()));
    apply_pricing_result(session, result, &ticket);
}

/// Record a pricing outcome unless `ticket` was superseded. The ticket is
/// checked under the session lock. Returns whether the result was recorded.
fn apply_pricing_result(session: &Mutex<QuoteSession>, result: Result<Value, ClientError>, ticket: &Ticket) -> bool {
    let mut s = session.lock().unwrap_or_else(|p| p.into_inner());
    if !ticket.is_current() {
        log::debug!("dropping stale pricing response (generation {})", ticket.generation());
        return false;
    }

    match result {
        Ok(quote) => {
            s.record_quote(quote, Local::now());
            if let Some(summary) = s.summary() {
                println!();
                print_rows(&summary.rows());
            }
        }
        Err(e) => {
            s.record_error(format!("Pricing error: {}", e));
            if let Some(err) = s.last_error() {
                eprintln!("{}", err);
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use quotegate_engine::{EscrowEstimator, LtvBounds, StateTables};
    use serde_json::json;

    fn unlocked_session() -> Mutex<QuoteSession> {
        let session = QuoteSession::new(EscrowEstimator::new(StateTables::default()), LtvBounds::default())
            .with_lead_token(Some("tok".into()));
        Mutex::new(session)
    }

    fn take_ticket(scheduler: &RepriceScheduler) -> Ticket {
        let mut ticket = None;
        scheduler.run_now(|t| ticket = Some(t));
        ticket.unwrap()
    }

    #[test]
    fn test_superseded_response_is_dropped() {
        let session = unlocked_session();
        let scheduler = RepriceScheduler::new(Duration::ZERO);

        let first = take_ticket(&scheduler);
        assert!(apply_pricing_result(&session, Ok(json!({"rate": 6.5})), &first));

        let in_flight = take_ticket(&scheduler);
        let _newer = take_ticket(&scheduler);
        assert!(!apply_pricing_result(&session, Ok(json!({"rate": 7.25})), &in_flight));
        assert!(!apply_pricing_result(
            &session,
            Err(ClientError::Http { status: 500, body: "boom".into() }),
            &in_flight
        ));

        let s = session.lock().unwrap();
        assert_eq!(s.last_quote(), Some(&json!({"rate": 6.5})));
        assert!(s.last_error().is_none());
    }

    #[test]
    fn test_cancel_drops_in_flight_response() {
        let session = unlocked_session();
        let scheduler = RepriceScheduler::new(Duration::ZERO);

        let ticket = take_ticket(&scheduler);
        scheduler.cancel();
        assert!(!apply_pricing_result(&session, Ok(json!({"rate": 6.5})), &ticket));
        assert!(session.lock().unwrap().last_quote().is_none());
    }

    #[test]
    fn test_current_failure_keeps_last_quote() {
        let session = unlocked_session();
        let scheduler = RepriceScheduler::new(Duration::ZERO);

        assert!(apply_pricing_result(&session, Ok(json!({"rate": 6.5})), &take_ticket(&scheduler)));
        let failed = Err(ClientError::Network("connection refused".into()));
        assert!(apply_pricing_result(&session, failed, &take_ticket(&scheduler)));

        let s = session.lock().unwrap();
        assert_eq!(s.last_quote(), Some(&json!({"rate": 6.5})));
        assert!(s.last_error().unwrap().starts_with("Pricing error"));
    }

    #[test]
    fn test_parse_edits() {
        assert_eq!(parse_command("value $650,000").unwrap(), Some(WatchCommand::Value(650_000.0)));
        assert_eq!(parse_command("  loan 500000 ").unwrap(), Some(WatchCommand::Loan(500_000.0)));
        assert_eq!(parse_command("taxes auto").unwrap(), Some(WatchCommand::Taxes(None)));
        assert_eq!(parse_command("ins 1800").unwrap(), Some(WatchCommand::Ins(Some(1800.0))));
        assert_eq!(
            parse_command("txn cash-out").unwrap(),
            Some(WatchCommand::Edit(InputEdit::Transaction(Transaction::CashOut)))
        );
        assert_eq!(
            parse_command("pmi off").unwrap(),
            Some(WatchCommand::Edit(InputEdit::PmiToggle(false)))
        );
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("zip").unwrap(), Some(WatchCommand::Zip(String::new())));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("value").is_err());
        assert!(parse_command("fico great").is_err());
        assert!(parse_command("pmi maybe").is_err());
        assert!(parse_command("lead Pat Lee").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_parse_lead() {
        let cmd = parse_command("lead Pat Lee 480-555-0100 pat@example.com").unwrap();
        assert_eq!(
            cmd,
            Some(WatchCommand::Lead {
                first: "Pat".into(),
                last: "Lee".into(),
                phone: "480-555-0100".into(),
                email: "pat@example.com".into(),
            })
        );
    }
}
