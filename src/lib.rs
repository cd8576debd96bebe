//! `epiplot` library crate.
//!
//! Core pipeline for the municipal time-series dashboard: spreadsheet rows
//! come in through a source-fetch collaborator, get normalized into datasets
//! of per-municipality series, and queries produce ordered time points plus
//! summary statistics for a presentation layer to render. The binary is a
//! thin CLI wrapper so the pipeline stays testable on its own.

pub mod data;
pub mod error;
pub mod processing;
pub mod state;
