use super::guidelines::ResidencyCategory;
use super::money::WholeDollar;
use super::monthly::Month;
use super::ssn::TaxpayerId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Filer input for Form 8962
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FormInput {
    /// Name(s) shown on return
    pub name_on_return: String,
    /// Social Security Number (ddd-dd-dddd or nine digits)
    #[schemars(with = "String")]
    pub ssn: TaxpayerId,
    /// Tax family size (Part I, line 1)
    pub tax_family_size: i64,
    /// Modified AGI (Part I, line 2a)
    #[schemars(with = "f64")]
    pub modified_agi: WholeDollar,
    /// Total of dependents' modified AGI (Part I, line 2b)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub dependents_modified_agi: Option<WholeDollar>,
    /// Poverty guideline table to use (tables 1-1, 1-2 or 1-3)
    pub state_of_residence: ResidencyCategory,
    /// Allocating with another taxpayer or alternative calculation for year of marriage (line 9)
    #[serde(default)]
    pub another_taxpayer_or_alternative_calculation: bool,
    /// Use line 11 (annual) instead of lines 12-23 (monthly) (line 10)
    pub annual_path: bool,
    /// Annual enrollment premiums, Form(s) 1095-A line 33A (line 11(a))
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub annual_enrollment_premiums: Option<WholeDollar>,
    /// Annual applicable SLCSP premium, Form(s) 1095-A line 33B (line 11(b))
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub annual_slcsp_premium: Option<WholeDollar>,
    /// Annual advance payment of PTC, Form(s) 1095-A line 33C (line 11(f))
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub annual_advance_payment: Option<WholeDollar>,
    /// Monthly figures keyed by lower-case month name (lines 12-23)
    #[serde(default)]
    pub monthly_calculation: Option<BTreeMap<Month, MonthlyRowInput>>,
}

/// One month of Form 1095-A figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyRowInput {
    /// Monthly enrollment premium (column A)
    #[schemars(with = "f64")]
    pub enrollment_premium: WholeDollar,
    /// Monthly applicable SLCSP premium (column B)
    #[schemars(with = "f64")]
    pub slcsp_premium: WholeDollar,
    /// Monthly advance payment of PTC (column F)
    #[schemars(with = "f64")]
    pub advance_payment: WholeDollar,
    /// Monthly contribution amount (column C); defaults to line 8b
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub monthly_contribution: Option<WholeDollar>,
}

/// CSV record for a monthly row
#[derive(Debug, Deserialize)]
struct MonthlyRowRecord {
    month: String,
    enrollment_premium: WholeDollar,
    slcsp_premium: WholeDollar,
    advance_payment: WholeDollar,
    #[serde(default)]
    monthly_contribution: Option<WholeDollar>,
}

/// Columns accepted by [`read_monthly_csv`], with whether each is required
pub const MONTHLY_CSV_COLUMNS: &[(&str, bool, &str)] = &[
    ("month", true, "Month name or three letter abbreviation"),
    (
        "enrollment_premium",
        true,
        "Monthly enrollment premium, Form 1095-A column A",
    ),
    (
        "slcsp_premium",
        true,
        "Monthly applicable SLCSP premium, Form 1095-A column B",
    ),
    (
        "advance_payment",
        true,
        "Monthly advance payment of PTC, Form 1095-A column C",
    ),
    (
        "monthly_contribution",
        false,
        "Monthly contribution amount; defaults to line 8b",
    ),
];

/// Read form input from JSON
pub fn read_form_json<R: Read>(reader: R) -> anyhow::Result<FormInput> {
    let input: FormInput = serde_json::from_reader(reader)?;
    log::debug!("Read form input for {}", input.name_on_return);
    Ok(input)
}

/// Read monthly rows from CSV, one row per month
pub fn read_monthly_csv<R: Read>(reader: R) -> anyhow::Result<BTreeMap<Month, MonthlyRowInput>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = BTreeMap::new();
    for (i, result) in rdr.deserialize::<MonthlyRowRecord>().enumerate() {
        let record = result?;
        let month: Month = record
            .month
            .parse()
            .map_err(|e| anyhow::anyhow!("row {}: {}", i + 1, e))?;
        let row = MonthlyRowInput {
            enrollment_premium: record.enrollment_premium,
            slcsp_premium: record.slcsp_premium,
            advance_payment: record.advance_payment,
            monthly_contribution: record.monthly_contribution,
        };
        if rows.insert(month, row).is_some() {
            anyhow::bail!("row {}: {} listed more than once", i + 1, month);
        }
    }
    log::info!("Read {} monthly rows", rows.len());
    Ok(rows)
}
