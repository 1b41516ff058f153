//! Formula library and pipeline assemblies for the ETLook surface energy
//! balance.
//!
//! Each module groups the array-level formulas of one physical concern
//! (solar geometry, meteorology, resistances, ...). The [`et_look`] and
//! [`se_root`] modules assemble them into the two dependency-gated
//! pipelines: daily evapotranspiration and instantaneous root-zone soil
//! moisture.

pub mod clear_sky_radiation;
pub mod constants;
pub mod et_look;
pub mod evapotranspiration;
pub mod leaf;
pub mod meteo;
pub mod neutral;
pub mod radiation;
pub mod resistance;
pub mod roughness;
pub mod se_root;
pub mod soil_moisture;
pub mod solar_radiation;
pub mod stress;
pub mod unstable;
