//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                 |
//! |---------|-----------|---------------------------------------------|
//! | 0       | Universal | Success                                     |
//! | 1       | Universal | General error (unspecified)                 |
//! | 2       | Universal | CLI usage error (bad args, invalid input)   |
//! | 3-9     | config    | Settings / overrides / lead file            |
//! | 10-19   | lead      | Lead gate and lead capture                  |
//! | 20-29   | service   | Pricing / leads endpoint failures           |
//! | 30-39   | zip       | ZIP lookup                                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use quotegate_client::ClientError;
use quotegate_config::ConfigError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, or inputs that fail local validation.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (3-9)
// =============================================================================

/// Cannot read or write a file in the config directory.
pub const EXIT_CONFIG_IO: u8 = 3;

/// Settings or override JSON is malformed or out of range.
pub const EXIT_CONFIG_INVALID: u8 = 4;

// =============================================================================
// Lead (10-19)
// =============================================================================

/// No lead token saved; pricing is locked.
pub const EXIT_LEAD_REQUIRED: u8 = 10;

/// Leads endpoint not configured.
pub const EXIT_LEAD_NOT_CONFIGURED: u8 = 11;

// =============================================================================
// Service (20-29)
// =============================================================================

/// Request never got a response.
pub const EXIT_SERVICE_NETWORK: u8 = 20;

/// Non-2xx response.
pub const EXIT_SERVICE_HTTP: u8 = 21;

/// Response body was not JSON.
pub const EXIT_SERVICE_PARSE: u8 = 22;

/// Service answered `ok: false`.
pub const EXIT_SERVICE_REJECTED: u8 = 23;

// =============================================================================
// ZIP (30-39)
// =============================================================================

/// ZIP lookup found nothing (or the ZIP is not 5 digits).
pub const EXIT_ZIP_NOT_FOUND: u8 = 30;

// =============================================================================
// Error mapping
// =============================================================================

pub fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::Network(_) => EXIT_SERVICE_NETWORK,
        ClientError::Http { .. } => EXIT_SERVICE_HTTP,
        ClientError::Parse(_) => EXIT_SERVICE_PARSE,
        ClientError::Rejected(_) => EXIT_SERVICE_REJECTED,
        ClientError::NotConfigured(_) => EXIT_LEAD_NOT_CONFIGURED,
        ClientError::MissingLeadToken => EXIT_LEAD_REQUIRED,
        ClientError::Validation(_) => EXIT_USAGE,
    }
}

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Io { .. } => EXIT_CONFIG_IO,
        ConfigError::Parse { .. } | ConfigError::OverrideJson(_) | ConfigError::InvalidOverride(_) => {
            EXIT_CONFIG_INVALID
        }
    }
}
