//! Environmental stress factors scaling the canopy resistance.
//!
//! Each factor is dimensionless in \\[0, 1\\]: 1 means no stress, 0 shuts
//! transpiration down entirely. NaN inputs propagate.

use etlook_core::sentinel::clamp_unit;
use ndarray::{ArrayD, Zip};
use std::f64::consts::PI;

/// Radiation stress factor \\[-\\].
///
/// Low light limits photosynthesis; the factor approaches 1.12 before
/// clamping under strong insolation.
pub fn stress_radiation(ra_24: &ArrayD<f64>) -> ArrayD<f64> {
    ra_24.mapv(|ra| clamp_unit(ra / (ra + 60.0) * (1.0 + 60.0 / 500.0)))
}

/// Vapour pressure deficit stress factor \\[-\\].
///
/// Logarithmic response with a configurable slope; dry air closes stomata.
pub fn stress_vpd(vpd_24: &ArrayD<f64>, vpd_slope: f64) -> ArrayD<f64> {
    vpd_24.mapv(|vpd| clamp_unit(vpd_slope * (vpd / 10.0 + 0.5).ln() + 1.0))
}

/// Air temperature stress factor \\[-\\].
///
/// A beta-style response peaking at `t_opt` and vanishing outside the
/// (`t_min`, `t_max`) window.
pub fn stress_temperature(
    t_air_24: &ArrayD<f64>,
    t_opt: f64,
    t_min: f64,
    t_max: f64,
) -> ArrayD<f64> {
    let x = (t_max - t_opt) / (t_opt - t_min);
    let peak = (t_opt - t_min) * (t_max - t_opt).powf(x);
    t_air_24.mapv(|t| {
        if t.is_nan() {
            return f64::NAN;
        }
        if t <= t_min || t >= t_max {
            return 0.0;
        }
        clamp_unit((t - t_min) * (t_max - t).powf(x) / peak)
    })
}

/// Soil moisture stress factor \\[-\\].
///
/// The `tenacity` parameter expresses how strongly vegetation keeps
/// transpiring as the root zone dries: 1 for sensitive, 1.5 for moderately
/// sensitive, up to 3 for insensitive vegetation.
pub fn stress_moisture(se_root: &ArrayD<f64>, tenacity: f64) -> ArrayD<f64> {
    se_root.mapv(|se| clamp_unit(tenacity * se - (2.0 * PI * se).sin() / (2.0 * PI)))
}

/// Combined atmospheric stress on the canopy \\[-\\].
pub fn combined_stress(
    stress_rad: &ArrayD<f64>,
    stress_vpd: &ArrayD<f64>,
    stress_temp: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(stress_rad)
        .and(stress_vpd)
        .and(stress_temp)
        .map_collect(|&r, &v, &t| r * v * t)
}
