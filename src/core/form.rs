//! Form 8962 reconciliation: household figures, path selection and net result

use super::applicable::{ApplicableRateTable, ABOVE_400_PERCENT};
use super::guidelines::{
    ConfigurationError, GuidelineError, PovertyGuidelineRegistry, ResidencyCategory,
};
use super::input::{FormInput, MonthlyRowInput};
use super::money::WholeDollar;
use super::monthly::{Month, MonthlyReconciliationRow, MonthlyReconciliationTable};
use super::ssn::TaxpayerId;
use super::warnings::Warning;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field} '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("missing {field}: required when {reason}")]
    MissingField {
        field: &'static str,
        reason: &'static str,
    },
    #[error("poverty guideline configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl ValidationError {
    /// Name of the input field at fault, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::InvalidField { field, .. }
            | ValidationError::MissingField { field, .. } => Some(field),
            ValidationError::Configuration(_) => None,
        }
    }
}

/// Part I: household size, income and the resolved poverty line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Household {
    size: u32,
    modified_agi: WholeDollar,
    dependents_modified_agi: Option<WholeDollar>,
    residency: ResidencyCategory,
    poverty_line: WholeDollar,
    applicable_figure: Decimal,
}

impl Household {
    pub fn new(
        registry: &PovertyGuidelineRegistry,
        rates: &ApplicableRateTable,
        size: u32,
        modified_agi: WholeDollar,
        dependents_modified_agi: Option<WholeDollar>,
        residency: ResidencyCategory,
    ) -> Result<Self, ValidationError> {
        let poverty_line = registry
            .lookup(residency, size)
            .map_err(|e| match e {
                GuidelineError::InvalidHouseholdSize(size) => ValidationError::InvalidField {
                    field: "tax_family_size",
                    value: size.to_string(),
                    reason: "household size must be at least 1",
                },
                GuidelineError::Configuration(e) => ValidationError::Configuration(e),
            })?;
        let household_income =
            modified_agi + dependents_modified_agi.unwrap_or(WholeDollar::ZERO);
        let applicable_figure =
            rates.lookup(percent_of_poverty_line(household_income, poverty_line));
        Ok(Household {
            size,
            modified_agi,
            dependents_modified_agi,
            residency,
            poverty_line,
            applicable_figure,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn modified_agi(&self) -> WholeDollar {
        self.modified_agi
    }

    pub fn dependents_modified_agi(&self) -> Option<WholeDollar> {
        self.dependents_modified_agi
    }

    pub fn residency(&self) -> ResidencyCategory {
        self.residency
    }

    /// Line 3
    pub fn household_income(&self) -> WholeDollar {
        self.modified_agi + self.dependents_modified_agi.unwrap_or(WholeDollar::ZERO)
    }

    /// Line 4
    pub fn poverty_line(&self) -> WholeDollar {
        self.poverty_line
    }

    /// Line 5: income as a whole percentage of the poverty line, truncated.
    /// Anything over 400% is reported as 401.
    pub fn percent_of_poverty_line(&self) -> i64 {
        percent_of_poverty_line(self.household_income(), self.poverty_line)
    }

    /// Line 7
    pub fn applicable_figure(&self) -> Decimal {
        self.applicable_figure
    }

    /// Line 8a: line 3 x line 7, rounded to the nearest dollar
    pub fn annual_contribution(&self) -> WholeDollar {
        WholeDollar::round_half_up(self.household_income().to_decimal() * self.applicable_figure())
    }

    /// Line 8b: line 8a / 12, rounded to the nearest dollar
    pub fn monthly_contribution(&self) -> WholeDollar {
        WholeDollar::round_half_up(self.annual_contribution().to_decimal() / dec!(12))
    }
}

/// Line 5 rule, shared by [`Household`] and the tests
pub fn percent_of_poverty_line(household_income: WholeDollar, poverty_line: WholeDollar) -> i64 {
    let ratio = household_income.to_decimal() / poverty_line.to_decimal();
    if ratio <= dec!(4) {
        // Very large negative incomes clamp to the bottom of the rate table anyway
        (ratio * dec!(100)).trunc().to_i64().unwrap_or(i64::MIN)
    } else {
        ABOVE_400_PERCENT
    }
}

/// Line 11 columns A, B and F
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnualFigures {
    pub enrollment_premiums: WholeDollar,
    pub slcsp_premium: WholeDollar,
    pub advance_payment: WholeDollar,
}

/// Which of the two mutually exclusive calculations line 10 selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationPath {
    /// Line 11, one annual row
    Annual(AnnualFigures),
    /// Lines 12-23, one row per month of coverage
    Monthly(MonthlyReconciliationTable),
}

/// Outcome of comparing line 24 with line 25
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NetResult {
    /// Line 26: net premium tax credit
    AdditionalCredit { amount: WholeDollar },
    /// Credit and advance payments cancel out
    Zero,
    /// Advance payments exceed the credit. Repayment (lines 27-29) is not computed.
    ExcessAdvancePayment { excess: WholeDollar },
}

impl NetResult {
    pub fn from_totals(total_tax_credit: WholeDollar, total_advance_payment: WholeDollar) -> Self {
        match total_tax_credit.cmp(&total_advance_payment) {
            std::cmp::Ordering::Greater => NetResult::AdditionalCredit {
                amount: total_tax_credit - total_advance_payment,
            },
            std::cmp::Ordering::Equal => NetResult::Zero,
            std::cmp::Ordering::Less => NetResult::ExcessAdvancePayment {
                excess: total_advance_payment - total_tax_credit,
            },
        }
    }

    /// Amount entered on line 26, if one can be entered
    pub fn net_premium_tax_credit(&self) -> Option<WholeDollar> {
        match self {
            NetResult::AdditionalCredit { amount } => Some(*amount),
            NetResult::Zero => Some(WholeDollar::ZERO),
            NetResult::ExcessAdvancePayment { .. } => None,
        }
    }
}

/// Value of a computed line, as handed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Count(u32),
    Dollars(WholeDollar),
    Percent(i64),
    Figure(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal),
    NotComputed,
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Count(n) => write!(f, "{}", n),
            FieldValue::Dollars(amount) => write!(f, "{}", amount),
            FieldValue::Percent(p) => write!(f, "{}%", p),
            FieldValue::Figure(figure) => write!(f, "{:.4}", figure),
            FieldValue::NotComputed => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedField {
    pub line: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
}

impl ComputedField {
    fn new(line: &'static str, label: &'static str, value: FieldValue) -> Self {
        ComputedField { line, label, value }
    }
}

/// A validated Form 8962.
///
/// Every derived line is recomputed from the stored inputs on access.
/// Fields belonging to the path line 10 did not select come back as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationForm {
    name_on_return: String,
    ssn: TaxpayerId,
    household: Household,
    allocation_or_alternative: bool,
    path: ReconciliationPath,
    input_warnings: Vec<Warning>,
}

impl ReconciliationForm {
    pub fn new(input: FormInput) -> Result<Self, ValidationError> {
        Self::with_tables(
            input,
            PovertyGuidelineRegistry::tax_year_2022(),
            ApplicableRateTable::tax_year_2022(),
        )
    }

    pub fn with_registry(
        input: FormInput,
        registry: &PovertyGuidelineRegistry,
    ) -> Result<Self, ValidationError> {
        Self::with_tables(input, registry, ApplicableRateTable::tax_year_2022())
    }

    /// Build against a poverty guideline registry and applicable figure table of the caller's choosing
    pub fn with_tables(
        input: FormInput,
        registry: &PovertyGuidelineRegistry,
        rates: &ApplicableRateTable,
    ) -> Result<Self, ValidationError> {
        if !input.ssn.is_well_formed() {
            return Err(ValidationError::InvalidField {
                field: "ssn",
                value: input.ssn.masked().to_string(),
                reason: "expected ddd-dd-dddd or nine digits",
            });
        }

        let size = u32::try_from(input.tax_family_size)
            .ok()
            .filter(|size| *size >= 1)
            .ok_or_else(|| ValidationError::InvalidField {
                field: "tax_family_size",
                value: input.tax_family_size.to_string(),
                reason: "household size must be at least 1",
            })?;

        let household = Household::new(
            registry,
            rates,
            size,
            input.modified_agi,
            input.dependents_modified_agi,
            input.state_of_residence,
        )?;

        let mut input_warnings = Vec::new();
        let path = if input.annual_path {
            let figures = AnnualFigures {
                enrollment_premiums: require_annual(
                    input.annual_enrollment_premiums,
                    "annual_enrollment_premiums",
                )?,
                slcsp_premium: require_annual(input.annual_slcsp_premium, "annual_slcsp_premium")?,
                advance_payment: require_annual(
                    input.annual_advance_payment,
                    "annual_advance_payment",
                )?,
            };
            if input.monthly_calculation.is_some() {
                input_warnings.push(Warning::UnusedMonthlyTable);
            }
            ReconciliationPath::Annual(figures)
        } else {
            let rows = input
                .monthly_calculation
                .ok_or(ValidationError::MissingField {
                    field: "monthly_calculation",
                    reason: "the monthly calculation is selected (line 10 unchecked)",
                })?;
            let has_annual_figures = input.annual_enrollment_premiums.is_some()
                || input.annual_slcsp_premium.is_some()
                || input.annual_advance_payment.is_some();
            if has_annual_figures {
                input_warnings.push(Warning::UnusedAnnualFigures);
            }
            ReconciliationPath::Monthly(build_monthly_table(
                rows,
                household.monthly_contribution(),
                &mut input_warnings,
            ))
        };

        if input.another_taxpayer_or_alternative_calculation {
            input_warnings.push(Warning::AllocationNotModeled);
        }

        log::debug!(
            "Built form for {}: household of {}, {} path",
            input.name_on_return,
            household.size(),
            if input.annual_path { "annual" } else { "monthly" }
        );

        Ok(ReconciliationForm {
            name_on_return: input.name_on_return,
            ssn: input.ssn,
            household,
            allocation_or_alternative: input.another_taxpayer_or_alternative_calculation,
            path,
            input_warnings,
        })
    }

    pub fn name_on_return(&self) -> &str {
        &self.name_on_return
    }

    pub fn ssn(&self) -> &TaxpayerId {
        &self.ssn
    }

    pub fn household(&self) -> &Household {
        &self.household
    }

    /// Line 1
    pub fn tax_family_size(&self) -> u32 {
        self.household.size()
    }

    pub fn residency(&self) -> ResidencyCategory {
        self.household.residency()
    }

    /// Line 9
    pub fn allocation_or_alternative(&self) -> bool {
        self.allocation_or_alternative
    }

    /// Line 10
    pub fn annual_path_selected(&self) -> bool {
        matches!(self.path, ReconciliationPath::Annual(_))
    }

    pub fn path(&self) -> &ReconciliationPath {
        &self.path
    }

    pub fn household_income(&self) -> WholeDollar {
        self.household.household_income()
    }

    pub fn poverty_line(&self) -> WholeDollar {
        self.household.poverty_line()
    }

    pub fn percent_of_poverty_line(&self) -> i64 {
        self.household.percent_of_poverty_line()
    }

    pub fn applicable_figure(&self) -> Decimal {
        self.household.applicable_figure()
    }

    pub fn annual_contribution(&self) -> WholeDollar {
        self.household.annual_contribution()
    }

    pub fn monthly_contribution(&self) -> WholeDollar {
        self.household.monthly_contribution()
    }

    pub fn annual_figures(&self) -> Option<&AnnualFigures> {
        match &self.path {
            ReconciliationPath::Annual(figures) => Some(figures),
            ReconciliationPath::Monthly(_) => None,
        }
    }

    pub fn monthly_calculation(&self) -> Option<&MonthlyReconciliationTable> {
        match &self.path {
            ReconciliationPath::Monthly(table) => Some(table),
            ReconciliationPath::Annual(_) => None,
        }
    }

    /// Line 11(c), annual contribution carried from line 8a
    pub fn annual_contribution_amount(&self) -> Option<WholeDollar> {
        self.annual_figures().map(|_| self.annual_contribution())
    }

    /// Line 11(d): line 11(c) less line 11(b), floored at zero
    pub fn annual_max_premium_assistance(&self) -> Option<WholeDollar> {
        self.annual_figures()
            .map(|figures| self.max_premium_assistance(figures))
    }

    /// Line 11(e): lesser of line 11(a) and line 11(d)
    pub fn annual_allowed_tax_credit(&self) -> Option<WholeDollar> {
        self.annual_figures()
            .map(|figures| self.allowed_tax_credit(figures))
    }

    fn max_premium_assistance(&self, figures: &AnnualFigures) -> WholeDollar {
        self.annual_contribution()
            .saturating_excess_over(figures.slcsp_premium)
    }

    fn allowed_tax_credit(&self, figures: &AnnualFigures) -> WholeDollar {
        figures
            .enrollment_premiums
            .min(self.max_premium_assistance(figures))
    }

    /// Line 24
    pub fn total_tax_credit(&self) -> WholeDollar {
        match &self.path {
            ReconciliationPath::Annual(figures) => self.allowed_tax_credit(figures),
            ReconciliationPath::Monthly(table) => table.total_allowed_credit(),
        }
    }

    /// Line 25
    pub fn total_advance_payment(&self) -> WholeDollar {
        match &self.path {
            ReconciliationPath::Annual(figures) => figures.advance_payment,
            ReconciliationPath::Monthly(table) => table.total_advance_payment(),
        }
    }

    pub fn net_result(&self) -> NetResult {
        NetResult::from_totals(self.total_tax_credit(), self.total_advance_payment())
    }

    /// Line 26
    pub fn net_premium_tax_credit(&self) -> Option<WholeDollar> {
        self.net_result().net_premium_tax_credit()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = self.input_warnings.clone();
        if let NetResult::ExcessAdvancePayment { excess } = self.net_result() {
            warnings.push(Warning::ExcessAdvancePayment { excess });
        }
        warnings
    }

    /// Every computed line in form order, as named key/value pairs
    pub fn computed_fields(&self) -> Vec<ComputedField> {
        use FieldValue::*;

        let mut fields = vec![
            ComputedField::new("1", "Tax family size", Count(self.tax_family_size())),
            ComputedField::new(
                "2a",
                "Modified AGI",
                Dollars(self.household.modified_agi()),
            ),
        ];
        if let Some(dependents) = self.household.dependents_modified_agi() {
            fields.push(ComputedField::new(
                "2b",
                "Dependents' modified AGI",
                Dollars(dependents),
            ));
        }
        fields.extend([
            ComputedField::new("3", "Household income", Dollars(self.household_income())),
            ComputedField::new("4", "Federal poverty line", Dollars(self.poverty_line())),
            ComputedField::new(
                "5",
                "Percent of poverty line",
                Percent(self.percent_of_poverty_line()),
            ),
            ComputedField::new("7", "Applicable figure", Figure(self.applicable_figure())),
            ComputedField::new("8a", "Annual contribution", Dollars(self.annual_contribution())),
            ComputedField::new(
                "8b",
                "Monthly contribution",
                Dollars(self.monthly_contribution()),
            ),
        ]);

        if let (Some(figures), Some(contribution), Some(assistance), Some(allowed)) = (
            self.annual_figures(),
            self.annual_contribution_amount(),
            self.annual_max_premium_assistance(),
            self.annual_allowed_tax_credit(),
        ) {
            fields.extend([
                ComputedField::new(
                    "11a",
                    "Annual enrollment premiums",
                    Dollars(figures.enrollment_premiums),
                ),
                ComputedField::new(
                    "11b",
                    "Annual applicable SLCSP premium",
                    Dollars(figures.slcsp_premium),
                ),
                ComputedField::new("11c", "Annual contribution amount", Dollars(contribution)),
                ComputedField::new(
                    "11d",
                    "Annual maximum premium assistance",
                    Dollars(assistance),
                ),
                ComputedField::new(
                    "11e",
                    "Annual premium tax credit allowed",
                    Dollars(allowed),
                ),
                ComputedField::new(
                    "11f",
                    "Annual advance payment of PTC",
                    Dollars(figures.advance_payment),
                ),
            ]);
        }

        fields.extend([
            ComputedField::new(
                "24",
                "Total premium tax credit",
                Dollars(self.total_tax_credit()),
            ),
            ComputedField::new(
                "25",
                "Advance payment of PTC",
                Dollars(self.total_advance_payment()),
            ),
            ComputedField::new(
                "26",
                "Net premium tax credit",
                self.net_premium_tax_credit().map_or(NotComputed, Dollars),
            ),
        ]);
        fields
    }
}

fn require_annual(
    value: Option<WholeDollar>,
    field: &'static str,
) -> Result<WholeDollar, ValidationError> {
    value.ok_or(ValidationError::MissingField {
        field,
        reason: "the annual calculation is selected (line 10 checked)",
    })
}

/// Column C comes from line 8b unless the input overrides it.
fn build_monthly_table(
    rows: BTreeMap<Month, MonthlyRowInput>,
    monthly_contribution: WholeDollar,
    warnings: &mut Vec<Warning>,
) -> MonthlyReconciliationTable {
    rows.into_iter()
        .map(|(month, input)| {
            let contribution = match input.monthly_contribution {
                Some(actual) if actual != monthly_contribution => {
                    warnings.push(Warning::ContributionMismatch {
                        month,
                        expected: monthly_contribution,
                        actual,
                    });
                    actual
                }
                Some(actual) => actual,
                None => monthly_contribution,
            };
            let row = MonthlyReconciliationRow::new(
                input.enrollment_premium,
                input.slcsp_premium,
                contribution,
                input.advance_payment,
            );
            (month, row)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::guidelines::PovertyGuidelineTable;
    use crate::core::ssn::SSN_MASK;

    fn monthly_input() -> FormInput {
        FormInput {
            name_on_return: "Karl Wooster".to_string(),
            ssn: TaxpayerId::new("123-45-6789"),
            tax_family_size: 4,
            modified_agi: WholeDollar::new(77194),
            dependents_modified_agi: None,
            state_of_residence: ResidencyCategory::Contiguous48AndDc,
            another_taxpayer_or_alternative_calculation: false,
            annual_path: false,
            annual_enrollment_premiums: None,
            annual_slcsp_premium: None,
            annual_advance_payment: None,
            monthly_calculation: Some(
                [Month::January, Month::February, Month::March, Month::April]
                    .into_iter()
                    .map(|m| (m, month(700, 500, 100)))
                    .collect(),
            ),
        }
    }

    fn annual_input(premiums: i64, slcsp: i64, advance: i64) -> FormInput {
        FormInput {
            annual_path: true,
            annual_enrollment_premiums: Some(WholeDollar::new(premiums)),
            annual_slcsp_premium: Some(WholeDollar::new(slcsp)),
            annual_advance_payment: Some(WholeDollar::new(advance)),
            monthly_calculation: None,
            ..monthly_input()
        }
    }

    fn month(premium: i64, slcsp: i64, advance: i64) -> MonthlyRowInput {
        MonthlyRowInput {
            enrollment_premium: WholeDollar::new(premium),
            slcsp_premium: WholeDollar::new(slcsp),
            advance_payment: WholeDollar::new(advance),
            monthly_contribution: None,
        }
    }

    fn household(income: i64, size: u32) -> Household {
        Household::new(
            PovertyGuidelineRegistry::tax_year_2022(),
            ApplicableRateTable::tax_year_2022(),
            size,
            WholeDollar::new(income),
            None,
            ResidencyCategory::Contiguous48AndDc,
        )
        .unwrap()
    }

    #[test]
    fn end_to_end_household_lines() {
        let form = ReconciliationForm::new(monthly_input()).unwrap();
        assert_eq!(form.household_income(), WholeDollar::new(77194));
        assert_eq!(form.poverty_line(), WholeDollar::new(27750));
        assert_eq!(form.percent_of_poverty_line(), 278);
        assert_eq!(form.applicable_figure(), dec!(0.0512));
        assert_eq!(form.annual_contribution(), WholeDollar::new(3952));
        assert_eq!(form.monthly_contribution(), WholeDollar::new(329));
    }

    #[test]
    fn dependents_income_is_added() {
        let form = ReconciliationForm::new(FormInput {
            dependents_modified_agi: Some(WholeDollar::new(2806)),
            ..monthly_input()
        })
        .unwrap();
        assert_eq!(form.household_income(), WholeDollar::new(80000));
        assert_eq!(form.percent_of_poverty_line(), 288);
    }

    #[test]
    fn percent_truncates_rather_than_rounds() {
        let line = WholeDollar::new(20000);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(30000), line), 150);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(30099), line), 150);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(30199), line), 150);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(30200), line), 151);
    }

    #[test]
    fn percent_above_400_is_sentinel() {
        let line = WholeDollar::new(20000);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(80000), line), 400);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(80001), line), 401);
        assert_eq!(percent_of_poverty_line(WholeDollar::new(5_000_000), line), 401);
    }

    #[test]
    fn percent_of_negative_income_uses_lowest_figure() {
        let h = household(-5000, 1);
        assert!(h.percent_of_poverty_line() < 0);
        assert_eq!(h.applicable_figure(), dec!(0));
        assert_eq!(h.annual_contribution(), WholeDollar::ZERO);
    }

    #[test]
    fn contribution_rounds_while_percent_truncates() {
        // 41625 / 27750 = 150%, figure 0.0000
        assert_eq!(household(41625, 4).annual_contribution(), WholeDollar::ZERO);

        // 55500 / 27750 = 200%, figure 0.0200: 1110.00 exactly
        let h = household(55500, 4);
        assert_eq!(h.percent_of_poverty_line(), 200);
        assert_eq!(h.annual_contribution(), WholeDollar::new(1110));
        // 1110 / 12 = 92.5 rounds up
        assert_eq!(h.monthly_contribution(), WholeDollar::new(93));

        // 13590 x 3.4 = 46206 -> 340%, figure 0.0700: 3234.42
        let h = household(46206, 1);
        assert_eq!(h.percent_of_poverty_line(), 340);
        assert_eq!(h.annual_contribution(), WholeDollar::new(3234));
        // 3234 / 12 = 269.5 rounds up
        assert_eq!(h.monthly_contribution(), WholeDollar::new(270));
    }

    #[test]
    fn above_400_uses_top_figure() {
        let h = household(200000, 1);
        assert_eq!(h.percent_of_poverty_line(), 401);
        assert_eq!(h.applicable_figure(), dec!(0.0850));
        assert_eq!(h.annual_contribution(), WholeDollar::new(17000));
    }

    #[test]
    fn monthly_path_fills_column_c_from_line_8b() {
        let form = ReconciliationForm::new(monthly_input()).unwrap();
        let table = form.monthly_calculation().unwrap();
        assert_eq!(table.populated_months(), 4);
        for (_, row) in table.rows() {
            assert_eq!(row.monthly_contribution_amount, WholeDollar::new(329));
            assert_eq!(row.allowed_credit(), WholeDollar::new(171));
        }
        assert_eq!(form.total_tax_credit(), WholeDollar::new(684));
        assert_eq!(form.total_advance_payment(), WholeDollar::new(400));
        assert_eq!(
            form.net_result(),
            NetResult::AdditionalCredit {
                amount: WholeDollar::new(284)
            }
        );
        assert_eq!(form.net_premium_tax_credit(), Some(WholeDollar::new(284)));
        assert!(form.warnings().is_empty());
    }

    #[test]
    fn annual_only_fields_unavailable_on_monthly_path() {
        let form = ReconciliationForm::new(monthly_input()).unwrap();
        assert!(!form.annual_path_selected());
        assert_eq!(form.annual_figures(), None);
        assert_eq!(form.annual_contribution_amount(), None);
        assert_eq!(form.annual_max_premium_assistance(), None);
        assert_eq!(form.annual_allowed_tax_credit(), None);
        assert!(form.computed_fields().iter().all(|f| !f.line.starts_with("11")));
    }

    #[test]
    fn annual_path_lines() {
        let form = ReconciliationForm::new(annual_input(9000, 2500, 600)).unwrap();
        assert!(form.annual_path_selected());
        assert!(form.monthly_calculation().is_none());
        assert_eq!(form.annual_contribution_amount(), Some(WholeDollar::new(3952)));
        assert_eq!(
            form.annual_max_premium_assistance(),
            Some(WholeDollar::new(1452))
        );
        assert_eq!(form.annual_allowed_tax_credit(), Some(WholeDollar::new(1452)));
        assert_eq!(form.total_tax_credit(), WholeDollar::new(1452));
        assert_eq!(form.total_advance_payment(), WholeDollar::new(600));
        assert_eq!(form.net_premium_tax_credit(), Some(WholeDollar::new(852)));
    }

    #[test]
    fn annual_credit_capped_by_premiums() {
        let form = ReconciliationForm::new(annual_input(1000, 2500, 600)).unwrap();
        assert_eq!(form.annual_allowed_tax_credit(), Some(WholeDollar::new(1000)));
        assert_eq!(
            form.net_result(),
            NetResult::AdditionalCredit {
                amount: WholeDollar::new(400)
            }
        );
    }

    #[test]
    fn annual_assistance_floors_at_zero() {
        let form = ReconciliationForm::new(annual_input(9000, 5000, 0)).unwrap();
        assert_eq!(form.annual_max_premium_assistance(), Some(WholeDollar::ZERO));
        assert_eq!(form.total_tax_credit(), WholeDollar::ZERO);
        assert_eq!(form.net_result(), NetResult::Zero);
    }

    #[test]
    fn net_result_trichotomy() {
        let d = WholeDollar::new;
        assert_eq!(
            NetResult::from_totals(d(1000), d(600)),
            NetResult::AdditionalCredit { amount: d(400) }
        );
        assert_eq!(NetResult::from_totals(d(800), d(800)), NetResult::Zero);
        assert_eq!(
            NetResult::from_totals(d(400), d(900)),
            NetResult::ExcessAdvancePayment { excess: d(500) }
        );
        assert_eq!(NetResult::Zero.net_premium_tax_credit(), Some(WholeDollar::ZERO));
        assert_eq!(
            NetResult::from_totals(d(400), d(900)).net_premium_tax_credit(),
            None
        );
    }

    #[test]
    fn excess_advance_payment_is_reported_not_computed() {
        let form = ReconciliationForm::new(annual_input(9000, 2500, 2000)).unwrap();
        assert_eq!(
            form.net_result(),
            NetResult::ExcessAdvancePayment {
                excess: WholeDollar::new(548)
            }
        );
        assert_eq!(form.net_premium_tax_credit(), None);
        assert_eq!(
            form.warnings(),
            vec![Warning::ExcessAdvancePayment {
                excess: WholeDollar::new(548)
            }]
        );
        let line_26 = form.computed_fields().pop().unwrap();
        assert_eq!(line_26.line, "26");
        assert_eq!(line_26.value, FieldValue::NotComputed);
    }

    #[test]
    fn rejects_malformed_ssn_without_echoing_digits() {
        let err = ReconciliationForm::new(FormInput {
            ssn: TaxpayerId::new("12-345-6789"),
            ..monthly_input()
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("ssn"));
        let message = err.to_string();
        assert!(message.contains(SSN_MASK));
        assert!(!message.contains("6789"));
    }

    #[test]
    fn rejects_household_below_one() {
        for size in [0, -2] {
            let err = ReconciliationForm::new(FormInput {
                tax_family_size: size,
                ..monthly_input()
            })
            .unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidField {
                    field: "tax_family_size",
                    value: size.to_string(),
                    reason: "household size must be at least 1",
                }
            );
        }
    }

    #[test]
    fn annual_path_requires_all_line_11_figures() {
        let err = ReconciliationForm::new(FormInput {
            annual_slcsp_premium: None,
            ..annual_input(9000, 2500, 600)
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("annual_slcsp_premium"));

        let err = ReconciliationForm::new(FormInput {
            annual_advance_payment: None,
            ..annual_input(9000, 2500, 600)
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("annual_advance_payment"));
    }

    #[test]
    fn monthly_path_requires_table() {
        let err = ReconciliationForm::new(FormInput {
            monthly_calculation: None,
            ..monthly_input()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MissingField {
                field: "monthly_calculation",
                ..
            }
        ));
    }

    #[test]
    fn empty_monthly_table_is_allowed() {
        let form = ReconciliationForm::new(FormInput {
            monthly_calculation: Some(BTreeMap::new()),
            ..monthly_input()
        })
        .unwrap();
        assert_eq!(form.total_tax_credit(), WholeDollar::ZERO);
        assert_eq!(form.net_result(), NetResult::Zero);
    }

    #[test]
    fn custom_registry_drives_line_4() {
        let mut tables = PovertyGuidelineRegistry::tax_year_2022().tables().to_vec();
        tables.retain(|t| t.category() != ResidencyCategory::Hawaii);
        tables.push(
            PovertyGuidelineTable::new(
                ResidencyCategory::Hawaii,
                [(1, WholeDollar::new(10000))].into(),
                WholeDollar::new(1000),
            )
            .unwrap(),
        );
        let registry = PovertyGuidelineRegistry::new(tables).unwrap();

        let form = ReconciliationForm::with_registry(
            FormInput {
                state_of_residence: ResidencyCategory::Hawaii,
                ..monthly_input()
            },
            &registry,
        )
        .unwrap();
        assert_eq!(form.poverty_line(), WholeDollar::new(13000));
        assert_eq!(form.percent_of_poverty_line(), 401);
    }

    #[test]
    fn custom_rate_table_drives_line_7() {
        // flat 10% from 100% of the poverty line upward
        let rates = ApplicableRateTable::new(100, vec![dec!(0.1000)]).unwrap();
        let form = ReconciliationForm::with_tables(
            monthly_input(),
            PovertyGuidelineRegistry::tax_year_2022(),
            &rates,
        )
        .unwrap();
        assert_eq!(form.percent_of_poverty_line(), 278);
        assert_eq!(form.applicable_figure(), dec!(0.1000));
        assert_eq!(form.annual_contribution(), WholeDollar::new(7719));
        assert_eq!(form.monthly_contribution(), WholeDollar::new(643));
        assert_eq!(
            form.monthly_calculation()
                .unwrap()
                .get(Month::January)
                .unwrap()
                .monthly_contribution_amount,
            WholeDollar::new(643)
        );
    }

    #[test]
    fn mismatched_column_c_is_kept_and_flagged() {
        let mut input = monthly_input();
        if let Some(rows) = input.monthly_calculation.as_mut() {
            rows.insert(
                Month::May,
                MonthlyRowInput {
                    monthly_contribution: Some(WholeDollar::new(300)),
                    ..month(700, 500, 100)
                },
            );
        }
        let form = ReconciliationForm::new(input).unwrap();
        let may = form.monthly_calculation().unwrap().get(Month::May).unwrap();
        assert_eq!(may.monthly_contribution_amount, WholeDollar::new(300));
        assert_eq!(may.allowed_credit(), WholeDollar::new(200));
        assert_eq!(
            form.warnings(),
            vec![Warning::ContributionMismatch {
                month: Month::May,
                expected: WholeDollar::new(329),
                actual: WholeDollar::new(300),
            }]
        );
    }

    #[test]
    fn unused_inputs_and_allocation_are_flagged() {
        let form = ReconciliationForm::new(FormInput {
            monthly_calculation: monthly_input().monthly_calculation,
            another_taxpayer_or_alternative_calculation: true,
            ..annual_input(9000, 2500, 600)
        })
        .unwrap();
        assert_eq!(
            form.warnings(),
            vec![Warning::UnusedMonthlyTable, Warning::AllocationNotModeled]
        );

        let form = ReconciliationForm::new(FormInput {
            annual_advance_payment: Some(WholeDollar::new(10)),
            ..monthly_input()
        })
        .unwrap();
        assert_eq!(form.warnings(), vec![Warning::UnusedAnnualFigures]);
    }

    #[test]
    fn computed_fields_in_form_order() {
        let form = ReconciliationForm::new(annual_input(9000, 2500, 600)).unwrap();
        let lines: Vec<_> = form.computed_fields().iter().map(|f| f.line).collect();
        assert_eq!(
            lines,
            vec![
                "1", "2a", "3", "4", "5", "7", "8a", "8b", "11a", "11b", "11c", "11d", "11e",
                "11f", "24", "25", "26"
            ]
        );
        let json = serde_json::to_value(form.computed_fields()).unwrap();
        assert_eq!(json[4]["value"], 278);
        assert_eq!(json[5]["value"], 0.0512);
        assert_eq!(json[6]["value"], 3952);
    }

    #[test]
    fn form_debug_output_masks_ssn() {
        let form = ReconciliationForm::new(monthly_input()).unwrap();
        let debug = format!("{:?}", form);
        assert!(!debug.contains("123-45-6789"));
        assert!(debug.contains(SSN_MASK));
        assert_eq!(form.ssn().to_string(), SSN_MASK);
    }
}
