pub mod applicable;
pub mod form;
pub mod guidelines;
pub mod input;
pub mod money;
pub mod monthly;
pub mod ssn;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use applicable::{ApplicableRateTable, ABOVE_400_PERCENT};
pub use form::{
    percent_of_poverty_line, AnnualFigures, ComputedField, FieldValue, Household, NetResult,
    ReconciliationForm, ReconciliationPath, ValidationError,
};
pub use guidelines::{
    ConfigurationError, GuidelineError, PovertyGuidelineRegistry, PovertyGuidelineTable,
    ResidencyCategory,
};
pub use input::{read_form_json, read_monthly_csv, FormInput, MonthlyRowInput, MONTHLY_CSV_COLUMNS};
pub use money::WholeDollar;
pub use monthly::{Month, MonthlyReconciliationRow, MonthlyReconciliationTable, UnknownMonth};
pub use ssn::{TaxpayerId, SSN_MASK};
pub use warnings::Warning;
