//! Reporting utilities: formatted terminal output for the derived views.

pub mod format;

pub use format::*;
