// Configuration loading

mod error;
pub mod lead;
pub mod overrides;
pub mod runtime;
pub mod settings;
mod store;

pub use error::ConfigError;
pub use lead::LeadRecord;
pub use overrides::{OverrideReport, Overrides};
pub use runtime::RuntimeConfig;
pub use settings::Settings;
pub use store::{default_config_dir, ConfigStore, CONFIG_DIR_ENV};
