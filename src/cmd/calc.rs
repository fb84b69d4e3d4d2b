//! Calc command - build a Form 8962 from filer input and print the computed lines

use super::{read_form, read_monthly, write_csv};
use clap::Args;
use ptc::{
    ComputedField, FieldValue, Month, MonthlyReconciliationRow, NetResult, ReconciliationForm,
    ResidencyCategory, TaxpayerId, Warning, WholeDollar,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalcCommand {
    /// JSON file containing the form input (or "-" for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// CSV file of monthly rows, replacing any monthly table in the input
    #[arg(short, long)]
    monthly: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output computed lines as CSV
    #[arg(long)]
    csv: bool,
}

/// One line of the form for table and CSV output
#[derive(Debug, Tabled, Serialize)]
struct LineRow {
    #[tabled(rename = "Line")]
    line: &'static str,
    #[tabled(rename = "Description")]
    label: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Lines 11 and 12-23, columns A to F
#[derive(Debug, Tabled, Serialize)]
struct CalculationRow {
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "(a) Premiums")]
    enrollment_premium: WholeDollar,
    #[tabled(rename = "(b) SLCSP")]
    benchmark_premium: WholeDollar,
    #[tabled(rename = "(c) Contribution")]
    contribution: WholeDollar,
    #[tabled(rename = "(d) Max assistance")]
    max_assistance: WholeDollar,
    #[tabled(rename = "(e) PTC allowed")]
    allowed_credit: WholeDollar,
    #[tabled(rename = "(f) Advance PTC")]
    advance_payment: WholeDollar,
}

impl CalculationRow {
    fn monthly(month: Month, row: &MonthlyReconciliationRow) -> Self {
        CalculationRow {
            line: month.line().to_string(),
            period: month.to_string(),
            enrollment_premium: row.enrollment_premium,
            benchmark_premium: row.benchmark_premium,
            contribution: row.monthly_contribution_amount,
            max_assistance: row.capped_assistance(),
            allowed_credit: row.allowed_credit(),
            advance_payment: row.advance_payment,
        }
    }

    fn annual(form: &ReconciliationForm) -> Option<Self> {
        let figures = form.annual_figures()?;
        Some(CalculationRow {
            line: "11".to_string(),
            period: "Annual".to_string(),
            enrollment_premium: figures.enrollment_premiums,
            benchmark_premium: figures.slcsp_premium,
            contribution: form.annual_contribution_amount()?,
            max_assistance: form.annual_max_premium_assistance()?,
            allowed_credit: form.annual_allowed_tax_credit()?,
            advance_payment: figures.advance_payment,
        })
    }
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct CalcOutput<'a> {
    name_on_return: &'a str,
    ssn: &'a TaxpayerId,
    state_of_residence: ResidencyCategory,
    calculation: &'static str,
    lines: Vec<ComputedField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    monthly: Vec<CalculationRow>,
    net_result: NetResult,
    warnings: Vec<Warning>,
}

impl CalcCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut input = read_form(&self.input)?;
        if let Some(path) = &self.monthly {
            input.monthly_calculation = Some(read_monthly(path)?);
        }

        let form = ReconciliationForm::new(input)?;
        log::info!(
            "Line 24 {}, line 25 {}",
            form.total_tax_credit(),
            form.total_advance_payment()
        );

        if self.json {
            self.print_json(&form)
        } else if self.csv {
            write_csv(form.computed_fields().iter().map(csv_row), io::stdout())
        } else {
            self.print_text(&form);
            Ok(())
        }
    }

    fn print_json(&self, form: &ReconciliationForm) -> anyhow::Result<()> {
        let output = CalcOutput {
            name_on_return: form.name_on_return(),
            ssn: form.ssn(),
            state_of_residence: form.residency(),
            calculation: calculation_name(form),
            lines: form.computed_fields(),
            monthly: monthly_rows(form),
            net_result: form.net_result(),
            warnings: form.warnings(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn print_text(&self, form: &ReconciliationForm) {
        let (part_one, totals): (Vec<_>, Vec<_>) = form
            .computed_fields()
            .into_iter()
            .filter(|f| !f.line.starts_with("11"))
            .partition(|f| !matches!(f.line, "24" | "25" | "26"));

        println!(
            "Form 8962 for {} (SSN {})",
            form.name_on_return(),
            form.ssn()
        );
        println!("Poverty guidelines: {}", form.residency());
        println!();
        println!("PART I - ANNUAL AND MONTHLY CONTRIBUTION AMOUNT");
        println!("{}", lines_table(&part_one));
        println!();

        let calculation: Vec<_> = match CalculationRow::annual(form) {
            Some(row) => vec![row],
            None => monthly_rows(form),
        };
        println!(
            "PART II - PREMIUM TAX CREDIT CLAIM ({} calculation)",
            calculation_name(form)
        );
        if calculation.is_empty() {
            println!("No months of coverage");
        } else {
            let table = Table::new(&calculation)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }
        println!("{}", lines_table(&totals));

        let warnings = form.warnings();
        if !warnings.is_empty() {
            println!();
            println!("Warnings:");
            for warning in &warnings {
                println!("  - {}", warning);
            }
        }
    }
}

fn calculation_name(form: &ReconciliationForm) -> &'static str {
    if form.annual_path_selected() {
        "annual"
    } else {
        "monthly"
    }
}

fn monthly_rows(form: &ReconciliationForm) -> Vec<CalculationRow> {
    form.monthly_calculation()
        .map(|table| {
            table
                .rows()
                .map(|(month, row)| CalculationRow::monthly(month, row))
                .collect()
        })
        .unwrap_or_default()
}

fn lines_table(fields: &[ComputedField]) -> String {
    let rows: Vec<_> = fields
        .iter()
        .map(|f| LineRow {
            line: f.line,
            label: f.label,
            value: f.value.to_string(),
        })
        .collect();
    Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
        .to_string()
}

/// CSV values are bare numbers; a line that cannot be computed is left empty.
fn csv_row(field: &ComputedField) -> LineRow {
    let value = match field.value {
        FieldValue::Count(n) => n.to_string(),
        FieldValue::Dollars(amount) => amount.dollars().to_string(),
        FieldValue::Percent(p) => p.to_string(),
        FieldValue::Figure(figure) => format!("{:.4}", figure),
        FieldValue::NotComputed => String::new(),
    };
    LineRow {
        line: field.line,
        label: field.label,
        value,
    }
}
