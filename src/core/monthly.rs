//! Monthly calculation (Form 8962 lines 12-23)

use super::money::WholeDollar;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position in the calendar year
    pub fn index(self) -> usize {
        self as usize
    }

    /// Form line number (January is line 12)
    pub fn line(self) -> u32 {
        12 + self as u32
    }

    pub fn display(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown month '{0}'")]
pub struct UnknownMonth(pub String);

impl std::str::FromStr for Month {
    type Err = UnknownMonth;

    /// Accepts the full month name or its first three letters, in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| {
                m.display().eq_ignore_ascii_case(s) || m.display()[..3].eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// One month of coverage, columns A, B, C and F of lines 12-23
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlyReconciliationRow {
    /// (a) Monthly enrollment premiums, Form(s) 1095-A lines 21-32 column A
    pub enrollment_premium: WholeDollar,
    /// (b) Monthly applicable SLCSP premium, Form(s) 1095-A column B
    pub benchmark_premium: WholeDollar,
    /// (c) Monthly contribution amount, from line 8b
    pub monthly_contribution_amount: WholeDollar,
    /// (f) Monthly advance payment of PTC, Form(s) 1095-A column C
    pub advance_payment: WholeDollar,
}

impl MonthlyReconciliationRow {
    pub fn new(
        enrollment_premium: WholeDollar,
        benchmark_premium: WholeDollar,
        monthly_contribution_amount: WholeDollar,
        advance_payment: WholeDollar,
    ) -> Self {
        MonthlyReconciliationRow {
            enrollment_premium,
            benchmark_premium,
            monthly_contribution_amount,
            advance_payment,
        }
    }

    /// (d) Monthly maximum premium assistance: B - C, floored at zero
    pub fn capped_assistance(&self) -> WholeDollar {
        self.benchmark_premium
            .saturating_excess_over(self.monthly_contribution_amount)
    }

    /// (e) Monthly premium tax credit allowed: lesser of A and D
    pub fn allowed_credit(&self) -> WholeDollar {
        self.enrollment_premium.min(self.capped_assistance())
    }
}

/// Twelve month slots, any of which may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyReconciliationTable {
    slots: [Option<MonthlyReconciliationRow>; 12],
}

impl MonthlyReconciliationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, month: Month, row: MonthlyReconciliationRow) -> Self {
        self.slots[month.index()] = Some(row);
        self
    }

    pub fn get(&self, month: Month) -> Option<&MonthlyReconciliationRow> {
        self.slots[month.index()].as_ref()
    }

    /// Populated months in calendar order
    pub fn rows(&self) -> impl Iterator<Item = (Month, &MonthlyReconciliationRow)> {
        Month::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(month, slot)| slot.as_ref().map(|row| (month, row)))
    }

    pub fn populated_months(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_months() == 0
    }

    /// Line 24 on the monthly path
    pub fn total_allowed_credit(&self) -> WholeDollar {
        self.rows().map(|(_, row)| row.allowed_credit()).sum()
    }

    /// Line 25 on the monthly path
    pub fn total_advance_payment(&self) -> WholeDollar {
        self.rows().map(|(_, row)| row.advance_payment).sum()
    }
}

impl FromIterator<(Month, MonthlyReconciliationRow)> for MonthlyReconciliationTable {
    fn from_iter<I: IntoIterator<Item = (Month, MonthlyReconciliationRow)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (month, row)| table.with_row(month, row))
    }
}
