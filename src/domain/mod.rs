//! Core domain types and logic.

pub mod combiner;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod performance;
pub mod portfolio;
pub mod position;
pub mod price;
