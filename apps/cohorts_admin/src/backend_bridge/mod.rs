//! Bridge between the view-model command queue and the cohort service worker.

pub mod commands;
pub mod runtime;
