//! Premium Tax Credit reconciliation (IRS Form 8962, tax year 2022)

pub mod core;

pub use crate::core::*;
