pub mod catalog;
pub mod columns;
pub mod dataset;
pub mod datetime;
pub mod loader;
pub mod values;
