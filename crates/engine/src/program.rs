//! Loan program families and the extra inputs each one prices with.
//!
//! Program codes are configuration ("CONV30", "FHA30", ...). The family is
//! derived from the code prefix so new codes need no code change.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROGRAMS: &[&str] = &["CONV30", "CONV15", "FHA30", "VA30", "DSCR30"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramFamily {
    Conventional,
    Fha,
    Va,
    Dscr,
}

/// Program-specific input fields beyond the common set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgramField {
    FinanceUfmip,
    AnnualMip,
    VaExempt,
    VaFirstUse,
    DscrRatio,
}

impl ProgramField {
    /// Wire name, as sent in the pricing payload.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ProgramField::FinanceUfmip => "financeUfmip",
            ProgramField::AnnualMip => "annualMip",
            ProgramField::VaExempt => "vaExempt",
            ProgramField::VaFirstUse => "vaFirstUse",
            ProgramField::DscrRatio => "dscrRatio",
        }
    }
}

impl ProgramFamily {
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_ascii_uppercase();
        if code.starts_with("FHA") {
            ProgramFamily::Fha
        } else if code.starts_with("VA") {
            ProgramFamily::Va
        } else if code.starts_with("DSCR") {
            ProgramFamily::Dscr
        } else {
            ProgramFamily::Conventional
        }
    }

    pub fn fields(&self) -> &'static [ProgramField] {
        match self {
            ProgramFamily::Conventional => &[],
            ProgramFamily::Fha => &[ProgramField::FinanceUfmip, ProgramField::AnnualMip],
            ProgramFamily::Va => &[ProgramField::VaExempt, ProgramField::VaFirstUse],
            ProgramFamily::Dscr => &[ProgramField::DscrRatio],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgramFamily::Conventional => "Conventional",
            ProgramFamily::Fha => "FHA",
            ProgramFamily::Va => "VA",
            ProgramFamily::Dscr => "DSCR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_prefix() {
        assert_eq!(ProgramFamily::from_code("CONV30"), ProgramFamily::Conventional);
        assert_eq!(ProgramFamily::from_code("FHA15"), ProgramFamily::Fha);
        assert_eq!(ProgramFamily::from_code("va30"), ProgramFamily::Va);
        assert_eq!(ProgramFamily::from_code("DSCR_IO"), ProgramFamily::Dscr);
        assert_eq!(ProgramFamily::from_code("JUMBO30"), ProgramFamily::Conventional);
    }

    #[test]
    fn test_field_sets() {
        assert!(ProgramFamily::Conventional.fields().is_empty());
        assert_eq!(
            ProgramFamily::Fha.fields(),
            &[ProgramField::FinanceUfmip, ProgramField::AnnualMip]
        );
        assert_eq!(ProgramFamily::Dscr.fields()[0].wire_name(), "dscrRatio");
    }
}
