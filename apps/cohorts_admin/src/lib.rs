//! Cohorts listing screen: view-model, backend worker bridge, and text grid.

pub mod backend_bridge;
pub mod config;
pub mod controller;
pub mod ui;
