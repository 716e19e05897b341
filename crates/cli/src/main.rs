// qgate - lead-gated mortgage quotes from the terminal

mod config_cmd;
mod exit_codes;
mod lead;
mod lookup;
mod quote;
mod util;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use quotegate_client::ClientError;
use quotegate_config::{ConfigError, ConfigStore};
use quotegate_engine::Transaction;

use exit_codes::{client_exit_code, config_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

/// Env var holding the log filter (`info`, `quotegate_client=debug`, ...).
const LOG_ENV: &str = "QUOTEGATE_LOG";

#[derive(Parser)]
#[command(name = "qgate")]
#[command(about = "Mortgage quotes with ZIP-based escrow estimates (lead-gated pricing)")]
#[command(version)]
#[command(long_version = long_version())]
struct Cli {
    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a ZIP code to city and state
    #[command(after_help = "\
Examples:
  qgate zip 85254
  qgate zip 85254 --json")]
    Zip {
        zip: String,

        #[arg(long)]
        json: bool,
    },

    /// Estimate annual property tax and insurance
    #[command(after_help = "\
Examples:
  qgate estimate --value 500000                 # fallback state (Arizona)
  qgate estimate --value '$750,000' --zip 78701
  qgate estimate --value 400000 --state TX --state-name Texas --json")]
    Estimate {
        /// Property value
        #[arg(long, value_parser = util::parse_money)]
        value: f64,

        /// Resolve the state from this ZIP
        #[arg(long, conflicts_with_all = ["state", "state_name"])]
        zip: Option<String>,

        /// Two-letter state code (tax table key)
        #[arg(long)]
        state: Option<String>,

        /// Full state name (insurance table key)
        #[arg(long)]
        state_name: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Reconcile property value, LTV and loan amount
    #[command(after_help = "\
Edits apply in order: value, then --ltv, then --loan.

Examples:
  qgate reconcile --value 500000 --ltv 80
  qgate reconcile --value 500000 --loan 350000 --json")]
    Reconcile {
        #[arg(long, value_parser = util::parse_money)]
        value: f64,

        #[arg(long, value_parser = util::parse_pct)]
        ltv: Option<f64>,

        #[arg(long, value_parser = util::parse_money)]
        loan: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Capture lead details and unlock pricing
    #[command(after_help = "\
Examples:
  qgate lead --zip 78701 --first Pat --last Lee --phone 480-555-0100 --email pat@example.com
  qgate lead --zip 78701 --first Pat --last Lee --phone 480-555-0100 --email pat@example.com --text-updates")]
    Lead {
        /// Property ZIP; must differ from the configured initial ZIP
        #[arg(long)]
        zip: String,

        #[arg(long)]
        first: String,

        #[arg(long)]
        last: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        /// Purchase timeline, free text
        #[arg(long, default_value = "")]
        timeline: String,

        /// Opt in to text updates
        #[arg(long)]
        text_updates: bool,
    },

    /// Forget the saved lead token
    Logout,

    /// Price a scenario (requires `qgate lead` first)
    #[command(after_help = "\
Examples:
  qgate quote --zip 78701 --value 650000 --ltv 80
  qgate quote --program FHA30 --value 400000 --loan 386000 --fico 680
  qgate quote --zip 78701 --value 650000 --save --json")]
    Quote {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Save the quote against the lead after pricing
        #[arg(long)]
        save: bool,

        #[arg(long)]
        json: bool,
    },

    /// Interactive quote session on stdin, re-pricing as you type
    #[command(after_help = "\
Enter `field value` lines, e.g. `zip 78701`, `value 650000`, `loan 500000`.
Type `help` inside the session for the full list, `quit` to leave.")]
    Watch,

    /// Show or change settings and table overrides
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Scenario flags shared by `quote`.
#[derive(Args, Debug, Default, Clone)]
pub struct ScenarioArgs {
    /// Property ZIP (defaults to the configured initial ZIP)
    #[arg(long)]
    pub zip: Option<String>,

    /// Program code, e.g. CONV30, FHA30, VA30, DSCR30
    #[arg(long)]
    pub program: Option<String>,

    /// purchase, refinance or cash-out
    #[arg(long)]
    pub txn: Option<Transaction>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    #[arg(long, value_parser = util::parse_money)]
    pub value: Option<f64>,

    #[arg(long, value_parser = util::parse_pct, conflicts_with = "loan")]
    pub ltv: Option<f64>,

    #[arg(long, value_parser = util::parse_money)]
    pub loan: Option<f64>,

    #[arg(long)]
    pub fico: Option<u32>,

    /// Borrower points, -5 to 5
    #[arg(long, allow_hyphen_values = true)]
    pub points: Option<f64>,

    /// Annual taxes (turns auto-estimate off)
    #[arg(long, value_parser = util::parse_money)]
    pub taxes: Option<f64>,

    /// Annual insurance (turns auto-estimate off)
    #[arg(long, value_parser = util::parse_money)]
    pub ins: Option<f64>,

    /// Monthly HOA dues
    #[arg(long, value_parser = util::parse_money)]
    pub hoa: Option<f64>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Print the config directory
    Path,
    /// Override the leads endpoint and/or the state tables
    #[command(after_help = "\
Table JSON may be {\"STATE_TAX_RATE_2023_PCT\": {...}, \"HOI_2022\": {...}}
or a bare map: two-letter keys are tax rates, state names are premiums.

Examples:
  qgate config apply --leads-base https://script.google.com/macros/s/XYZ/exec
  qgate config apply --tables '{\"AZ\": 0.62, \"TX\": 1.8}'
  qgate config apply --tables-file hoi.json")]
    Apply {
        #[arg(long)]
        leads_base: Option<String>,

        /// Table override JSON, inline
        #[arg(long, conflicts_with = "tables_file")]
        tables: Option<String>,

        /// Table override JSON, from a file
        #[arg(long)]
        tables_file: Option<PathBuf>,
    },
    /// Drop all overrides and return to the built-in tables
    Reset,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("QGATE_COMMIT"), ")",
        "\ntarget:  ", env!("QGATE_TARGET"),
        "\nconfig:  $QUOTEGATE_CONFIG_DIR or <config dir>/quotegate",
    )
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .filter(|_| !verbose)
        .and_then(|s| tracing_subscriber::EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = ConfigStore::open_default();
    log::debug!("config dir: {}", store.dir().display());

    let result = match cli.command {
        Commands::Zip { zip, json } => lookup::cmd_zip(&store, zip, json),
        Commands::Estimate { value, zip, state, state_name, json } => {
            lookup::cmd_estimate(&store, value, zip, state, state_name, json)
        }
        Commands::Reconcile { value, ltv, loan, json } => {
            lookup::cmd_reconcile(&store, value, ltv, loan, json)
        }
        Commands::Lead { zip, first, last, phone, email, timeline, text_updates } => {
            lead::cmd_lead(&store, zip, first, last, phone, email, timeline, text_updates)
        }
        Commands::Logout => lead::cmd_logout(&store),
        Commands::Quote { scenario, save, json } => quote::cmd_quote(&store, scenario, save, json),
        Commands::Watch => watch::cmd_watch(&store),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { json } => config_cmd::cmd_show(&store, json),
            ConfigCommands::Path => config_cmd::cmd_path(&store),
            ConfigCommands::Apply { leads_base, tables, tables_file } => {
                config_cmd::cmd_apply(&store, leads_base, tables, tables_file)
            }
            ConfigCommands::Reset => config_cmd::cmd_reset(&store),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        let code = client_exit_code(&err);
        let hint = match &err {
            ClientError::NotConfigured(_) => {
                Some("set endpoints.leads_base in settings.toml or run `qgate config apply --leads-base URL`")
            }
            ClientError::MissingLeadToken => Some("run `qgate lead` first"),
            ClientError::Network(_) => Some("check your connection and the configured endpoints"),
            _ => None,
        };
        Self { code, message: err.to_string(), hint: hint.map(String::from) }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::new(config_exit_code(&err), err.to_string())
    }
}
