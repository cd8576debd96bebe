pub mod series;
pub mod statistics;
