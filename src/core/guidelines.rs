//! Federal poverty guidelines used for Form 8962 line 4 (tax year 2022 tables 1-1, 1-2, 1-3)

use super::money::WholeDollar;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which poverty guideline table applies to the filer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResidencyCategory {
    /// One of the 48 contiguous states or the District of Columbia (table 1-1)
    Contiguous48AndDc,
    /// Alaska (table 1-2)
    Alaska,
    /// Hawaii (table 1-3)
    Hawaii,
}

impl ResidencyCategory {
    pub const ALL: [ResidencyCategory; 3] = [
        ResidencyCategory::Contiguous48AndDc,
        ResidencyCategory::Alaska,
        ResidencyCategory::Hawaii,
    ];

    pub fn display(&self) -> &'static str {
        match self {
            ResidencyCategory::Contiguous48AndDc => "48 Contiguous States and DC",
            ResidencyCategory::Alaska => "Alaska",
            ResidencyCategory::Hawaii => "Hawaii",
        }
    }
}

impl std::fmt::Display for ResidencyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("no poverty guideline table for {0}")]
    MissingTable(ResidencyCategory),
    #[error("more than one poverty guideline table for {category} [{count}]")]
    AmbiguousTable {
        category: ResidencyCategory,
        count: usize,
    },
    #[error("poverty guideline table for {0} has no entries")]
    EmptyTable(ResidencyCategory),
    #[error("poverty guideline table for {category} must list sizes 1..={max} without gaps")]
    NonContiguousSizes {
        category: ResidencyCategory,
        max: u32,
    },
    #[error("poverty guideline for {category}, household of {size}, must be positive")]
    NonPositiveGuideline {
        category: ResidencyCategory,
        size: u32,
    },
    #[error("poverty guideline increment for {category} must be positive, got {increment}")]
    NonPositiveIncrement {
        category: ResidencyCategory,
        increment: WholeDollar,
    },
    #[error("applicable figure table has no entries")]
    EmptyRateTable,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuidelineError {
    #[error("household size must be at least 1, got {0}")]
    InvalidHouseholdSize(u32),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Poverty line by household size for one residency category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PovertyGuidelineTable {
    category: ResidencyCategory,
    sizes: BTreeMap<u32, WholeDollar>,
    extra_person_increment: WholeDollar,
}

impl PovertyGuidelineTable {
    /// Sizes must start at 1 and be contiguous, and every line and the increment positive.
    pub fn new(
        category: ResidencyCategory,
        sizes: BTreeMap<u32, WholeDollar>,
        extra_person_increment: WholeDollar,
    ) -> Result<Self, ConfigurationError> {
        let max = match sizes.keys().next_back() {
            Some(max) => *max,
            None => return Err(ConfigurationError::EmptyTable(category)),
        };
        if !sizes.keys().copied().eq(1..=max) {
            return Err(ConfigurationError::NonContiguousSizes { category, max });
        }
        if let Some((size, _)) = sizes.iter().find(|(_, line)| !line.is_positive()) {
            return Err(ConfigurationError::NonPositiveGuideline {
                category,
                size: *size,
            });
        }
        if !extra_person_increment.is_positive() {
            return Err(ConfigurationError::NonPositiveIncrement {
                category,
                increment: extra_person_increment,
            });
        }
        Ok(PovertyGuidelineTable {
            category,
            sizes,
            extra_person_increment,
        })
    }

    fn from_row(category: ResidencyCategory, row: [i64; 8], extra: i64) -> Self {
        PovertyGuidelineTable {
            category,
            sizes: (1..).zip(row.map(WholeDollar::new)).collect(),
            extra_person_increment: WholeDollar::new(extra),
        }
    }

    pub fn category(&self) -> ResidencyCategory {
        self.category
    }

    pub fn max_tabulated_size(&self) -> u32 {
        self.sizes.keys().next_back().copied().unwrap_or(0)
    }

    pub fn extra_person_increment(&self) -> WholeDollar {
        self.extra_person_increment
    }

    /// Poverty line for a household, extrapolating past the largest tabulated size
    pub fn lookup(&self, household_size: u32) -> Result<WholeDollar, GuidelineError> {
        if household_size == 0 {
            return Err(GuidelineError::InvalidHouseholdSize(household_size));
        }
        if let Some(line) = self.sizes.get(&household_size) {
            return Ok(*line);
        }
        let (largest_size, largest_line) = self
            .sizes
            .iter()
            .next_back()
            .ok_or(ConfigurationError::EmptyTable(self.category))?;
        let additional_persons = household_size - largest_size;
        log::debug!(
            "Extrapolating {} poverty line: {} + {} x {}",
            self.category,
            largest_line,
            additional_persons,
            self.extra_person_increment
        );
        Ok(*largest_line + self.extra_person_increment * additional_persons)
    }
}

/// One poverty guideline table per residency category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PovertyGuidelineRegistry {
    tables: Vec<PovertyGuidelineTable>,
}

static TAX_YEAR_2022: Lazy<PovertyGuidelineRegistry> = Lazy::new(|| PovertyGuidelineRegistry {
    tables: vec![
        PovertyGuidelineTable::from_row(
            ResidencyCategory::Contiguous48AndDc,
            [13590, 18310, 23030, 27750, 32470, 37190, 41910, 46630],
            4720,
        ),
        PovertyGuidelineTable::from_row(
            ResidencyCategory::Alaska,
            [16990, 22890, 28790, 34690, 40590, 46490, 52390, 58290],
            5900,
        ),
        PovertyGuidelineTable::from_row(
            ResidencyCategory::Hawaii,
            [15630, 21060, 26490, 31920, 37350, 42780, 48210, 53640],
            5430,
        ),
    ],
});

impl PovertyGuidelineRegistry {
    /// Every category must appear exactly once.
    pub fn new(tables: Vec<PovertyGuidelineTable>) -> Result<Self, ConfigurationError> {
        let registry = PovertyGuidelineRegistry { tables };
        for category in ResidencyCategory::ALL {
            registry.table(category)?;
        }
        Ok(registry)
    }

    /// Guidelines in effect for tax year 2022 coverage
    pub fn tax_year_2022() -> &'static PovertyGuidelineRegistry {
        &TAX_YEAR_2022
    }

    pub fn tables(&self) -> &[PovertyGuidelineTable] {
        &self.tables
    }

    pub fn table(
        &self,
        category: ResidencyCategory,
    ) -> Result<&PovertyGuidelineTable, ConfigurationError> {
        let mut matches = self.tables.iter().filter(|t| t.category == category);
        match (matches.next(), matches.count()) {
            (Some(table), 0) => Ok(table),
            (Some(_), rest) => Err(ConfigurationError::AmbiguousTable {
                category,
                count: rest + 1,
            }),
            (None, _) => Err(ConfigurationError::MissingTable(category)),
        }
    }

    pub fn lookup(
        &self,
        category: ResidencyCategory,
        household_size: u32,
    ) -> Result<WholeDollar, GuidelineError> {
        self.table(category)?.lookup(household_size)
    }
}
