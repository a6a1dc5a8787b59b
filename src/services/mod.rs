//! Preset application services

pub mod apply_report;
pub mod geometry_mapper;
pub mod layout_orchestrator;

pub use apply_report::*;
pub use layout_orchestrator::*;
