//! Input checks that gate network calls.
//!
//! A failed check means no request goes out; the caller shows the message
//! inline and waits for the next edit.

use thiserror::Error;

use crate::inputs::QuoteInputs;
use crate::zip::is_valid_zip;

pub const FICO_MIN: u32 = 300;
pub const FICO_MAX: u32 = 850;
pub const POINTS_MIN: f64 = -5.0;
pub const POINTS_MAX: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("enter a valid email address")]
    InvalidEmail,
    #[error("property ZIP must be 5 digits (got '{0}')")]
    InvalidZip(String),
    #[error("loan amount must be greater than zero")]
    NonPositiveLoan,
    #[error("FICO must be at least 300 (got {0})")]
    FicoTooLow(u32),
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Loose address check: one `@`, a non-empty local part, a dotted domain,
/// no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return Err(ValidationError::InvalidEmail);
    };
    if host.is_empty() || tld.is_empty() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Checks that must pass before a pricing call.
pub fn validate_for_pricing(inputs: &QuoteInputs) -> Result<(), ValidationError> {
    if !is_valid_zip(&inputs.prop_zip) {
        return Err(ValidationError::InvalidZip(inputs.prop_zip.clone()));
    }
    if !inputs.loan.is_finite() || inputs.loan <= 0.0 {
        return Err(ValidationError::NonPositiveLoan);
    }
    if inputs.fico < FICO_MIN {
        return Err(ValidationError::FicoTooLow(inputs.fico));
    }
    Ok(())
}

pub fn clamp_fico(fico: u32) -> u32 {
    fico.clamp(FICO_MIN, FICO_MAX)
}

pub fn clamp_points(points: f64) -> f64 {
    if !points.is_finite() {
        return 0.0;
    }
    points.clamp(POINTS_MIN, POINTS_MAX)
}
