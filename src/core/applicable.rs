//! Applicable figure table (Form 8962 line 7)

use super::guidelines::ConfigurationError;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

/// Percent of poverty line reported on line 5 when household income exceeds 400%
pub const ABOVE_400_PERCENT: i64 = 401;

/// Figures for 150%..=400%, in ten-thousandths.
const TAX_YEAR_2022_FIGURES: [i64; 251] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36,
    40, 44, 48, 52, 56, 60, 64, 68, 72, 76,
    80, 84, 88, 92, 96, 100, 104, 108, 112, 116,
    120, 124, 128, 132, 136, 140, 144, 148, 152, 156,
    160, 164, 168, 172, 176, 180, 184, 188, 192, 196,
    200, 204, 208, 212, 216, 220, 224, 228, 232, 236,
    240, 244, 248, 252, 256, 260, 264, 268, 272, 276,
    280, 284, 288, 292, 296, 300, 304, 308, 312, 316,
    320, 324, 328, 332, 336, 340, 344, 348, 352, 356,
    360, 364, 368, 372, 376, 380, 384, 388, 392, 396,
    400, 404, 408, 412, 416, 420, 424, 428, 432, 436,
    440, 444, 448, 452, 456, 460, 464, 468, 472, 476,
    480, 484, 488, 492, 496, 500, 504, 508, 512, 516,
    520, 524, 528, 532, 536, 540, 544, 548, 552, 556,
    560, 564, 568, 572, 576, 580, 584, 588, 592, 596,
    600, 603, 605, 608, 610, 613, 615, 618, 620, 623,
    625, 628, 630, 633, 635, 638, 640, 643, 645, 648,
    650, 653, 655, 658, 660, 663, 665, 668, 670, 673,
    675, 678, 680, 683, 685, 688, 690, 693, 695, 698,
    700, 703, 705, 708, 710, 713, 715, 718, 720, 723,
    725, 728, 730, 733, 735, 738, 740, 743, 745, 748,
    750, 753, 755, 758, 760, 763, 765, 768, 770, 773,
    775, 778, 780, 783, 785, 788, 790, 793, 795, 798,
    800, 803, 805, 808, 810, 813, 815, 818, 820, 823,
    825, 828, 830, 833, 835, 838, 840, 843, 845, 848,
    850,
];

static TAX_YEAR_2022: Lazy<ApplicableRateTable> = Lazy::new(|| ApplicableRateTable {
    first_percent: 150,
    rates: TAX_YEAR_2022_FIGURES
        .iter()
        .map(|&figure| Decimal::new(figure, 4))
        .collect(),
});

/// Applicable figure by whole percent of the poverty line.
///
/// Densely populated from `first_percent` upward, one entry per percentage point.
/// Lookups outside the table clamp to its first or last entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicableRateTable {
    first_percent: i64,
    rates: Vec<Decimal>,
}

impl ApplicableRateTable {
    pub fn new(first_percent: i64, rates: Vec<Decimal>) -> Result<Self, ConfigurationError> {
        if rates.is_empty() {
            return Err(ConfigurationError::EmptyRateTable);
        }
        Ok(ApplicableRateTable {
            first_percent,
            rates,
        })
    }

    pub fn tax_year_2022() -> &'static ApplicableRateTable {
        &TAX_YEAR_2022
    }

    pub fn min_percent(&self) -> i64 {
        self.first_percent
    }

    pub fn max_percent(&self) -> i64 {
        self.first_percent + self.rates.len() as i64 - 1
    }

    pub fn lookup(&self, percent: i64) -> Decimal {
        let clamped = percent.clamp(self.min_percent(), self.max_percent());
        self.rates[(clamped - self.first_percent) as usize]
    }

    /// `(percent, figure)` pairs in ascending order
    pub fn entries(&self) -> impl Iterator<Item = (i64, Decimal)> + '_ {
        (self.first_percent..).zip(self.rates.iter().copied())
    }
}
