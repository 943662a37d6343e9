//! Controller layer: view-model state, backend events, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod view_model;
