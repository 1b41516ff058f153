//! ETLook: a surface energy balance model for daily evapotranspiration and
//! instantaneous root-zone soil moisture from harmonized remote sensing
//! inputs.
//!
//! The crate is a facade over two members:
//!
//! - `etlook-core`: the grid/field data model, the dependency-gated step
//!   engine, parameters and the variable vocabulary.
//! - `etlook-components`: the formula modules and the two pipeline
//!   assemblies.
//!
//! A typical run builds a [`ModelContainer`] on a [`Grid`], inserts the
//! input fields, and calls [`et_look::run`] or [`se_root::run`]:
//!
//! ```
//! use etlook::{et_look, EtLookVersion, ExportSelection, Grid, ModelContainer, Parameters};
//! use ndarray::{array, Array1};
//!
//! let grid = Grid::daily(array![180.0], Array1::linspace(29.0, 29.2, 4), Array1::linspace(30.5, 30.8, 4));
//! let mut container = ModelContainer::new(grid);
//! for (name, value) in [
//!     ("ndvi", 0.5), ("p_24", 1.0), ("ra_flat_24", 250.0), ("t_air_24", 22.0),
//!     ("p_air_24", 1008.0), ("vp_24", 16.0), ("u2m_24", 2.0), ("v2m_24", 1.0),
//!     ("r0", 0.2), ("t_amp", 10.0), ("se_root", 0.5),
//! ] {
//!     container.insert_constant(name, value);
//! }
//!
//! let (output, report) = et_look::run(
//!     &mut container,
//!     EtLookVersion::V2,
//!     &Parameters::default(),
//!     &ExportSelection::Default,
//! )
//! .unwrap();
//! assert!(output.contains("aeti_24_mm"));
//! assert!(report.skipped.is_empty());
//! ```

pub use etlook_components::{et_look, se_root};
pub use etlook_core::container::ModelContainer;
pub use etlook_core::errors::{EtLookError, EtLookResult};
pub use etlook_core::grid::{Grid, GridField};
pub use etlook_core::parameters::Parameters;
pub use etlook_core::step::{RunReport, SkippedStep};
pub use etlook_core::variable::Substitution;
pub use etlook_core::version::{EtLookVersion, ExportSelection, SeRootVersion};

/// The formula modules, for callers composing their own sequences.
pub mod components {
    pub use etlook_components::{
        clear_sky_radiation, constants, evapotranspiration, leaf, meteo, neutral, radiation,
        resistance, roughness, soil_moisture, solar_radiation, stress, unstable,
    };
}
