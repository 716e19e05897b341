//! HTTP client for the quote services.
//!
//! This crate is the single source of truth for the wire contracts: ZIP
//! lookup, pricing, lead upsert, save quote. It also owns the re-price
//! debounce.
//!
//! No retries. Every failure surfaces as a [`ClientError`] with a
//! user-facing message.

mod error;
mod quote;
mod reprice;
mod zip;

pub use error::ClientError;
pub use quote::{LeadForm, QuoteClient, SaveQuoteRequest};
pub use reprice::{RepriceScheduler, Ticket};
pub use zip::ZipResolver;

pub(crate) const USER_AGENT: &str = concat!("qgate/", env!("CARGO_PKG_VERSION"));
