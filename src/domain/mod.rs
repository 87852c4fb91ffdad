//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loaded rows and datasets (`RentalRecord`, `RentalDataset`)
//! - the inclusive date window (`DateRange`)
//! - category decodings (`Season`, `DayType`)
//! - derived tables handed to renderers (`WorkingDaySummary`, `SeasonSummary`, etc.)

pub mod types;

pub use types::*;
