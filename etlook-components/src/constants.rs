//! Physical constants shared across the formula modules.

/// Solar constant \\[W m-2\\].
pub const SOLAR_CONSTANT: f64 = 1367.0;

/// Stefan-Boltzmann constant \\[W m-2 K-4\\].
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// Von Karman constant \\[-\\].
pub const KARMAN: f64 = 0.41;

/// Gravitational acceleration \\[m s-2\\].
pub const GRAVITY: f64 = 9.81;

/// Specific heat of air at constant pressure \\[J kg-1 K-1\\].
pub const SPECIFIC_HEAT_AIR: f64 = 1004.0;

/// Specific gas constant of dry air \\[mbar K-1 m3 kg-1\\].
pub const GAS_CONSTANT_DRY: f64 = 2.87;

/// Specific gas constant of water vapour \\[mbar K-1 m3 kg-1\\].
pub const GAS_CONSTANT_MOIST: f64 = 4.61;

/// Offset between Celsius and Kelvin scales \\[K\\].
pub const ZERO_CELSIUS: f64 = 273.15;

/// Seconds per day \\[s\\].
pub const DAY_SECONDS: f64 = 86400.0;

/// Seconds per year \\[s\\].
pub const YEAR_SECONDS: f64 = 365.25 * 86400.0;

/// Roughness length of bare soil \\[m\\].
pub const Z0_SOIL: f64 = 0.001;

/// Roughness length of the reference grass surface \\[m\\].
pub const Z0M_GRASS: f64 = 0.0171;

/// Aerodynamic resistance numerator of the FAO reference surface \\[s m-1 /
/// (m s-1)\\].
pub const RA_GRASS_NUMERATOR: f64 = 208.0;

/// Surface resistance of the FAO reference grass surface \\[s m-1\\].
pub const R_GRASS: f64 = 70.0;

/// Number of stability-correction sweeps for the sensible heat iteration.
pub const STABILITY_ITERATIONS: usize = 3;

/// Sensible heat below this magnitude is treated as neutral when computing
/// the Monin-Obukhov length \\[W m-2\\].
pub const NEUTRAL_H_THRESHOLD: f64 = 0.01;

/// Monin-Obukhov length assigned under neutral conditions \\[m\\].
pub const NEUTRAL_MO_LENGTH: f64 = -1e8;

/// Edge length of the zones used for zone-averaged land surface
/// temperature \\[pixels\\].
pub const LST_ZONE_SIZE: usize = 200;
