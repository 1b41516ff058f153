//! Data model and evaluation framework for the ETLook pipelines.
//!
//! This crate knows nothing about evapotranspiration physics: it provides
//! the gridded field container, the dependency-gated step engine, the
//! variable vocabulary with units and defaults, the model parameters and
//! the error taxonomy. The formula modules and pipeline assemblies live
//! in `etlook-components`.

pub mod container;
pub mod errors;
pub mod grid;
pub mod parameters;
pub mod sentinel;
pub mod step;
pub mod variable;
pub mod version;
