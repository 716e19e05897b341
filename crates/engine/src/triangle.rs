//! Value / LTV / loan reconciliation.
//!
//! Exactly one side is the edited source on each pass; the dependent side is
//! recomputed so `loan ≈ value * ltv / 100` holds to within a dollar, except
//! when a loan edit pushes LTV outside [`LtvBounds`] and the ratio is clamped.

use serde::{Deserialize, Serialize};

/// Allowed LTV range for ratios derived from a loan edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtvBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for LtvBounds {
    fn default() -> Self {
        Self { min: 0.0, max: 100.0 }
    }
}

impl LtvBounds {
    pub fn with_max(max: f64) -> Self {
        Self { min: 0.0, max }
    }

    pub fn clamp(&self, ltv: f64) -> f64 {
        ltv.max(self.min).min(self.max)
    }
}

/// Which side of the triangle was edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriangleEdit {
    Value(f64),
    Ltv(f64),
    Loan(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTriangle {
    pub property_value: f64,
    pub ltv: f64,
    pub loan_amount: f64,
}

impl LoanTriangle {
    /// Build from value and LTV, deriving the loan.
    pub fn new(property_value: f64, ltv: f64) -> Self {
        Self {
            property_value,
            ltv,
            loan_amount: loan_for(property_value, ltv),
        }
    }

    pub fn apply(&mut self, edit: TriangleEdit, bounds: LtvBounds) {
        match edit {
            TriangleEdit::Value(value) => {
                self.property_value = value;
                self.loan_amount = loan_for(value, self.ltv);
            }
            TriangleEdit::Ltv(ltv) => {
                self.ltv = ltv;
                self.loan_amount = loan_for(self.property_value, ltv);
            }
            TriangleEdit::Loan(loan) => {
                self.loan_amount = loan;
                let ltv = if self.property_value > 0.0 {
                    loan * 100.0 / self.property_value
                } else {
                    0.0
                };
                self.ltv = bounds.clamp(ltv);
            }
        }
    }

    /// True when the loan matches value * ltv to within a dollar.
    pub fn is_consistent(&self) -> bool {
        (self.loan_amount - self.property_value * self.ltv / 100.0).abs() <= 1.0
    }
}

fn loan_for(value: f64, ltv: f64) -> f64 {
    let loan = (value * (ltv / 100.0)).round();
    if loan.is_finite() {
        loan
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_then_loan_edit() {
        let mut t = LoanTriangle::new(500_000.0, 80.0);
        assert_eq!(t.loan_amount, 400_000.0);

        t.apply(TriangleEdit::Loan(350_000.0), LtvBounds::default());
        assert_eq!(t.ltv, 70.0);
        assert_eq!(t.property_value, 500_000.0);
        assert!(t.is_consistent());
    }

    #[test]
    fn test_value_edit_keeps_ltv() {
        let mut t = LoanTriangle::new(500_000.0, 80.0);
        t.apply(TriangleEdit::Value(625_000.0), LtvBounds::default());
        assert_eq!(t.ltv, 80.0);
        assert_eq!(t.loan_amount, 500_000.0);
    }

    #[test]
    fn test_ltv_edit_recomputes_loan() {
        let mut t = LoanTriangle::new(500_000.0, 80.0);
        t.apply(TriangleEdit::Ltv(96.5), LtvBounds::default());
        assert_eq!(t.loan_amount, 482_500.0);
        assert!(t.is_consistent());
    }

    #[test]
    fn test_loan_edit_rounds_to_dollar() {
        let mut t = LoanTriangle::new(333_333.0, 80.0);
        assert_eq!(t.loan_amount, 266_666.0);
        t.apply(TriangleEdit::Ltv(33.3), LtvBounds::default());
        assert_eq!(t.loan_amount, 111_000.0);
    }

    #[test]
    fn test_loan_edit_clamps_ltv() {
        let mut t = LoanTriangle::new(500_000.0, 80.0);
        t.apply(TriangleEdit::Loan(600_000.0), LtvBounds::default());
        assert_eq!(t.ltv, 100.0);
        assert_eq!(t.loan_amount, 600_000.0);

        t.apply(TriangleEdit::Loan(600_000.0), LtvBounds::with_max(200.0));
        assert_eq!(t.ltv, 120.0);

        t.apply(TriangleEdit::Loan(-5.0), LtvBounds::default());
        assert_eq!(t.ltv, 0.0);
    }

    #[test]
    fn test_loan_edit_with_zero_value() {
        let mut t = LoanTriangle::new(0.0, 80.0);
        assert_eq!(t.loan_amount, 0.0);
        t.apply(TriangleEdit::Loan(100_000.0), LtvBounds::default());
        assert_eq!(t.ltv, 0.0);
    }
}
