//! Packing engine for two ceramic kilns: how many pieces of a product fit
//! per firing, which kiln to use, and what the result costs.

pub mod config;
pub mod cost;
pub mod diagnosis;
pub mod edge;
pub mod error;
pub mod filler;
pub mod flat;
pub mod geometry;
pub mod loading;
pub mod logging;
pub mod solver;
pub mod types;

pub use error::{Error, Result};
pub use loading::evaluate_kiln_loading;
pub use solver::Solver;
