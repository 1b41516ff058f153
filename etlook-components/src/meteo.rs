//! Meteorological state variables.
//!
//! Temperatures enter in Celsius and are converted once; vapour pressures
//! are in mbar throughout. The instantaneous and daily pipelines share
//! these formulas, differing only in which fields they are applied to.

use crate::constants::{
    GAS_CONSTANT_DRY, GAS_CONSTANT_MOIST, SPECIFIC_HEAT_AIR, ZERO_CELSIUS, Z0M_GRASS,
};
use etlook_core::sentinel::{clamp_min, nan_div};
use ndarray::{ArrayD, Zip};

/// Air temperature in Kelvin from Celsius.
pub fn air_temperature_kelvin(t_air: &ArrayD<f64>) -> ArrayD<f64> {
    t_air.mapv(|t| t + ZERO_CELSIUS)
}

/// Air pressure in mbar from kPa.
pub fn air_pressure_kpa2mbar(p_air_kpa: &ArrayD<f64>) -> ArrayD<f64> {
    p_air_kpa.mapv(|p| p * 10.0)
}

/// Saturated vapour pressure \\[mbar\\].
///
/// $$e_s = 6.108 \exp\left(\frac{17.27\,T}{T + 237.3}\right)$$
///
/// with $T$ the air temperature in Celsius.
pub fn saturated_vapour_pressure(t_air: &ArrayD<f64>) -> ArrayD<f64> {
    t_air.mapv(svp_scalar)
}

/// Saturated vapour pressure averaged from the daily extremes \\[mbar\\].
///
/// Averaging the saturation curve at the minimum and maximum temperature
/// overestimates less than evaluating it at the mean, because the curve is
/// convex.
pub fn saturated_vapour_pressure_minmax(
    t_air_min: &ArrayD<f64>,
    t_air_max: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(t_air_min)
        .and(t_air_max)
        .map_collect(|&tmin, &tmax| 0.5 * (svp_scalar(tmin) + svp_scalar(tmax)))
}

fn svp_scalar(t: f64) -> f64 {
    6.108 * (17.27 * t / (t + 237.3)).exp()
}

/// Vapour pressure from specific humidity \\[mbar\\].
pub fn vapour_pressure_from_specific_humidity(
    qv: &ArrayD<f64>,
    p_air: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(qv)
        .and(p_air)
        .map_collect(|&qv, &p| qv * p / (0.622 + 0.378 * qv))
}

/// Vapour pressure deficit \\[mbar\\], floored at zero.
pub fn vapour_pressure_deficit(svp: &ArrayD<f64>, vp: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(svp)
        .and(vp)
        .map_collect(|&svp, &vp| clamp_min(svp - vp, 0.0))
}

/// Slope of the saturated vapour pressure curve \\[mbar K-1\\].
pub fn slope_saturated_vapour_pressure(svp: &ArrayD<f64>, t_air: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(svp)
        .and(t_air)
        .map_collect(|&svp, &t| 4098.0 * svp / ((t + 237.3) * (t + 237.3)))
}

/// Latent heat of vaporization \\[J kg-1\\].
pub fn latent_heat(t_air: &ArrayD<f64>) -> ArrayD<f64> {
    t_air.mapv(|t| (2501.0 - 2.361 * t) * 1000.0)
}

/// Psychrometric constant \\[mbar K-1\\].
pub fn psychrometric_constant(p_air: &ArrayD<f64>, lh: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(p_air)
        .and(lh)
        .map_collect(|&p, &lh| nan_div(SPECIFIC_HEAT_AIR * p, 0.622 * lh))
}

/// Dry air density \\[kg m-3\\].
pub fn dry_air_density(
    p_air: &ArrayD<f64>,
    vp: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(p_air)
        .and(vp)
        .and(t_air_k)
        .map_collect(|&p, &vp, &t| nan_div(p - vp, GAS_CONSTANT_DRY * t))
}

/// Moist air density \\[kg m-3\\].
pub fn moist_air_density(vp: &ArrayD<f64>, t_air_k: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(vp)
        .and(t_air_k)
        .map_collect(|&vp, &t| nan_div(vp, GAS_CONSTANT_MOIST * t))
}

/// Total air density \\[kg m-3\\].
pub fn air_density(ad_dry: &ArrayD<f64>, ad_moist: &ArrayD<f64>) -> ArrayD<f64> {
    ad_dry + ad_moist
}

/// Wind speed magnitude from its eastward and northward components \\[m s-1\\].
pub fn wind_speed(u2m: &ArrayD<f64>, v2m: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(u2m)
        .and(v2m)
        .map_collect(|&u, &v| (u * u + v * v).sqrt())
}

/// Wind speed extrapolated to blending height over grass \\[m s-1\\].
///
/// Logarithmic profile over the reference roughness [`Z0M_GRASS`].
pub fn wind_speed_blending_height(u: &ArrayD<f64>, z_obs: f64, z_b: f64) -> ArrayD<f64> {
    wind_speed_blending_height_rough(u, Z0M_GRASS, z_obs, z_b)
}

/// Wind speed extrapolated to blending height over a given roughness \\[m s-1\\].
pub fn wind_speed_blending_height_rough(
    u: &ArrayD<f64>,
    z0m: f64,
    z_obs: f64,
    z_b: f64,
) -> ArrayD<f64> {
    let factor = (z_b / z0m).ln() / (z_obs / z0m).ln();
    u.mapv(|u| u * factor)
}

/// Wet-bulb temperature \\[C\\].
///
/// Stull (2011) empirical fit, valid for relative humidities above roughly
/// 5% at standard pressure.
pub fn wet_bulb_temperature(
    t_air: &ArrayD<f64>,
    vp: &ArrayD<f64>,
    svp: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(t_air)
        .and(vp)
        .and(svp)
        .map_collect(|&t, &vp, &svp| {
            let rh = 100.0 * nan_div(vp, svp);
            t * (0.151977 * (rh + 8.313659).sqrt()).atan() + (t + rh).atan()
                - (rh - 1.676331).atan()
                + 0.00391838 * rh.powf(1.5) * (0.023101 * rh).atan()
                - 4.686035
        })
}
