use super::money::WholeDollar;
use super::monthly::Month;
use serde::Serialize;

/// Non-fatal findings raised while building or evaluating a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// A monthly row was supplied with a column C that differs from line 8b.
    ContributionMismatch {
        month: Month,
        expected: WholeDollar,
        actual: WholeDollar,
    },
    /// Line 10 chose the annual path; the monthly table is ignored.
    UnusedMonthlyTable,
    /// Line 10 chose the monthly path; line 11 figures are ignored.
    UnusedAnnualFigures,
    /// Line 9 is checked but shared policy allocation is not applied.
    AllocationNotModeled,
    /// Advance payments exceed the allowed credit; line 27 is not computed.
    ExcessAdvancePayment { excess: WholeDollar },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::ContributionMismatch {
                month,
                expected,
                actual,
            } => write!(
                f,
                "{} column C is {} but line 8b is {}",
                month, actual, expected
            ),
            Warning::UnusedMonthlyTable => {
                write!(f, "annual calculation selected, monthly rows ignored")
            }
            Warning::UnusedAnnualFigures => {
                write!(f, "monthly calculation selected, line 11 figures ignored")
            }
            Warning::AllocationNotModeled => write!(
                f,
                "line 9 allocation or alternative calculation is not applied"
            ),
            Warning::ExcessAdvancePayment { excess } => write!(
                f,
                "advance payments exceed allowed credit by {}, repayment (line 27) not computed",
                excess
            ),
        }
    }
}
