//! Model parameters.
//!
//! These are the tuning constants of the formula layer, with the defaults
//! the model is calibrated for. All of them can be overridden from a TOML
//! table; absent keys keep their defaults.

use crate::errors::{EtLookError, EtLookResult};
use serde::{Deserialize, Serialize};

/// Tuning constants for both pipelines.
///
/// Field docs give the unit; `-` marks dimensionless values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// NDVI of a fully bare pixel [-].
    pub nd_min: f64,
    /// NDVI of a fully vegetated pixel [-].
    pub nd_max: f64,
    /// Exponent of the vegetation cover curve [-].
    pub vc_pow: f64,
    /// Upper bound on vegetation cover used in the LAI inversion [-].
    pub vc_max: f64,
    /// Exponent of the LAI curve [-].
    pub lai_pow: f64,

    /// Slope of the vapour pressure deficit stress curve [mbar^-1].
    pub vpd_slope: f64,
    /// Optimum air temperature for photosynthesis [C].
    pub t_opt: f64,
    /// Minimum air temperature for photosynthesis [C].
    pub t_min: f64,
    /// Maximum air temperature for photosynthesis [C].
    pub t_max: f64,
    /// Moisture stress tenacity: 1 sensitive .. 1.5 moderate .. 3 insensitive [-].
    pub tenacity: f64,
    /// Maximum canopy resistance [s/m].
    pub rcan_max: f64,
    /// Minimum soil resistance [s/m].
    pub r_soil_min: f64,
    /// Exponent of the soil resistance curve [-].
    pub r_soil_pow: f64,

    /// Slope of the net longwave transmissivity term [-].
    pub lw_slope: f64,
    /// Offset of the net longwave transmissivity term [-].
    pub lw_offset: f64,
    /// Maximum interception per unit leaf area [mm/day].
    pub int_max: f64,
    /// Slope of the open-water heat flux on soil net radiation [-].
    pub rn_slope: f64,
    /// Offset of the open-water heat flux [W/m^2].
    pub rn_offset: f64,
    /// Soil porosity [-].
    pub porosity: f64,
    /// Albedo of the reference grass surface [-].
    pub r0_grass: f64,

    /// NDVI below which obstacles are at their minimum height [-].
    pub ndvi_obs_min: f64,
    /// NDVI above which obstacles are at their maximum height [-].
    pub ndvi_obs_max: f64,
    /// Obstacle height fraction at minimum NDVI [-].
    pub obs_fr: f64,
    /// Displacement height constant (Raupach) [-].
    pub c1: f64,

    /// Observation height for meteorological inputs [m].
    pub z_obs: f64,
    /// Blending height [m].
    pub z_b: f64,

    /// Roughness length of bare soil [m].
    pub z0m_bare: f64,
    /// Roughness length of full vegetation [m].
    pub z0m_full: f64,
    /// Displacement height of bare soil [m].
    pub disp_bare: f64,
    /// Displacement height of full vegetation [m].
    pub disp_full: f64,
    /// Albedo of dry bare soil [-].
    pub r0_bare: f64,
    /// Albedo of wet bare soil [-].
    pub r0_bare_wet: f64,
    /// Albedo of full vegetation [-].
    pub r0_full: f64,
    /// Fraction of net radiation becoming sensible heat at the dry bare limit [-].
    pub fraction_h_bare: f64,
    /// Fraction of net radiation becoming sensible heat at the dry vegetated limit [-].
    pub fraction_h_full: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            nd_min: 0.125,
            nd_max: 0.8,
            vc_pow: 0.7,
            vc_max: 0.9677324885,
            lai_pow: -0.45,

            vpd_slope: -0.3,
            t_opt: 25.0,
            t_min: 0.0,
            t_max: 50.0,
            tenacity: 1.5,
            rcan_max: 1_000_000.0,
            r_soil_min: 800.0,
            r_soil_pow: -2.1,

            lw_slope: 1.35,
            lw_offset: -0.35,
            int_max: 0.2,
            rn_slope: 0.92,
            rn_offset: 61.0,
            porosity: 0.4,
            r0_grass: 0.23,

            ndvi_obs_min: 0.25,
            ndvi_obs_max: 0.75,
            obs_fr: 0.25,
            c1: 1.0,

            z_obs: 10.0,
            z_b: 100.0,

            z0m_bare: 0.001,
            z0m_full: 0.1,
            disp_bare: 0.0,
            disp_full: 0.667,
            r0_bare: 0.38,
            r0_bare_wet: 0.2,
            r0_full: 0.18,
            fraction_h_bare: 0.65,
            fraction_h_full: 0.95,
        }
    }
}

impl Parameters {
    /// Parse a parameter table from TOML. Absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> EtLookResult<Self> {
        toml::from_str(text).map_err(|e| EtLookError::Parameters(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_physical() {
        let p = Parameters::default();
        assert!(p.nd_min < p.nd_max);
        assert!(p.t_min < p.t_opt && p.t_opt < p.t_max);
        assert!(p.z_obs < p.z_b);
        assert!((0.0..=1.0).contains(&p.r0_bare));
        assert!((0.0..=1.0).contains(&p.fraction_h_full));
    }

    #[test]
    fn toml_overrides_keep_other_defaults() {
        let p = Parameters::from_toml_str("t_opt = 22.5\ntenacity = 3.0\n").unwrap();
        assert_eq!(p.t_opt, 22.5);
        assert_eq!(p.tenacity, 3.0);
        assert_eq!(p.nd_min, Parameters::default().nd_min);
    }

    #[test]
    fn malformed_toml_is_a_configuration_error() {
        let result = Parameters::from_toml_str("t_opt = \"warm\"");
        assert!(matches!(result, Err(EtLookError::Parameters(_))));
    }

    #[test]
    fn toml_roundtrip() {
        let p = Parameters::default();
        let text = toml::to_string(&p).unwrap();
        let back = Parameters::from_toml_str(&text).unwrap();
        assert_eq!(p, back);
    }
}
