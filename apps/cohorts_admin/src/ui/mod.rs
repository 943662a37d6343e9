//! Presentation of the cohorts view-model.

pub mod grid;
