//! `bike-rentals` library crate.
//!
//! The binary (`rentals`) is a thin wrapper around this library so that:
//!
//! - the transforms are testable without spawning processes
//! - the CLI and the TUI share one pipeline

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod transform;
pub mod tui;
