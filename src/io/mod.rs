//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - derived-table exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
