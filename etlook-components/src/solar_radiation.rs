//! Daily solar geometry and top-of-atmosphere radiation.

use crate::constants::SOLAR_CONSTANT;
use ndarray::{ArrayD, Zip};
use std::f64::consts::PI;

/// Latitude or longitude in radians from degrees.
pub fn angle_rad(angle_deg: &ArrayD<f64>) -> ArrayD<f64> {
    angle_deg.mapv(f64::to_radians)
}

/// Solar declination \\[rad\\].
///
/// $$\delta = 0.409 \sin\left(\frac{2\pi J}{365} - 1.39\right)$$
///
/// with $J$ the day of year.
pub fn declination(doy: &ArrayD<f64>) -> ArrayD<f64> {
    doy.mapv(|d| 0.409 * (2.0 * PI * d / 365.0 - 1.39).sin())
}

/// Inverse squared relative earth-sun distance \\[-\\].
pub fn inverse_earth_sun_distance(doy: &ArrayD<f64>) -> ArrayD<f64> {
    doy.mapv(|d| 1.0 + 0.033 * (2.0 * PI * d / 365.0).cos())
}

/// Seasonal correction of solar time \\[hours\\].
///
/// The equation-of-time polynomial of the FAO-56 hour angle calculation.
pub fn seasonal_correction(doy: &ArrayD<f64>) -> ArrayD<f64> {
    doy.mapv(|d| {
        let b = 2.0 * PI * (d - 81.0) / 364.0;
        0.1645 * (2.0 * b).sin() - 0.1255 * b.cos() - 0.025 * b.sin()
    })
}

/// Hour angle at the moment of observation \\[rad\\].
///
/// Zero at local solar noon, negative in the morning.
pub fn hour_angle(sc: &ArrayD<f64>, dtime: &ArrayD<f64>, lon_rad: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(sc)
        .and(dtime)
        .and(lon_rad)
        .map_collect(|&sc, &dtime, &lon| (PI / 12.0) * (dtime + sc - 12.0) + lon)
}

/// Sunset hour angle \\[rad\\].
///
/// NaN inside the polar circles when the sun never sets or never rises.
pub fn sunset_hour_angle(lat_rad: &ArrayD<f64>, decl: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(lat_rad).and(decl).map_collect(|&lat, &decl| {
        let x = -lat.tan() * decl.tan();
        if (-1.0..=1.0).contains(&x) {
            x.acos()
        } else {
            f64::NAN
        }
    })
}

/// Daily extraterrestrial radiation on a flat surface \\[W m-2\\].
///
/// $$S_{toa} = \frac{G_{sc}}{\pi} d_r \left(\omega_s \sin\varphi \sin\delta
///   + \cos\varphi \cos\delta \sin\omega_s\right)$$
pub fn daily_solar_radiation_toa_flat(
    decl: &ArrayD<f64>,
    iesd: &ArrayD<f64>,
    lat_rad: &ArrayD<f64>,
    ws: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(decl)
        .and(iesd)
        .and(lat_rad)
        .and(ws)
        .map_collect(|&decl, &iesd, &lat, &ws| {
            (SOLAR_CONSTANT / PI)
                * iesd
                * (ws * lat.sin() * decl.sin() + lat.cos() * decl.cos() * ws.sin())
        })
}

/// Daily atmospheric transmissivity \\[-\\].
///
/// Ratio of measured surface radiation to the top-of-atmosphere value; NaN
/// where the latter vanishes (polar night).
pub fn transmissivity(ra_flat: &ArrayD<f64>, ra_toa_flat: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(ra_flat)
        .and(ra_toa_flat)
        .map_collect(|&ra, &toa| etlook_core::sentinel::nan_div(ra, toa))
}
