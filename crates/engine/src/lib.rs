//! Quote engine: state tables, escrow estimates, the loan triangle and the
//! in-memory quote session. No IO.

pub mod escrow;
pub mod inputs;
pub mod money;
pub mod program;
pub mod quote;
pub mod session;
pub mod tables;
pub mod triangle;
pub mod validation;
pub mod zip;

pub use escrow::{estimate_annual_insurance, estimate_annual_tax, EscrowEstimate, EscrowEstimator};
pub use inputs::{PricingInputs, QuoteInputs, Transaction};
pub use program::{ProgramFamily, ProgramField};
pub use quote::QuoteSummary;
pub use session::{InputEdit, QuoteSession, ZipStatus};
pub use tables::{InsuranceTable, StateTables, TaxRateTable};
pub use triangle::{LoanTriangle, LtvBounds, TriangleEdit};
pub use validation::ValidationError;
pub use zip::{ZipInfo, ZipPolicy};
