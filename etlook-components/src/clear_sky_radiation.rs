//! Instantaneous clear-sky solar radiation after the ESRA model.
//!
//! The chain runs from solar elevation through refraction, relative optical
//! air mass, Rayleigh optical thickness and Linke turbidity to the beam and
//! diffuse components on a horizontal surface. All angles are in radians;
//! pixels where the sun is below the (refracted) horizon produce zero
//! irradiance, not NaN, so night-time overpasses stay well defined.

use crate::constants::SOLAR_CONSTANT;
use etlook_core::sentinel::{clamp_min, nan_div, nan_ln};
use ndarray::{ArrayD, Zip};
use std::f64::consts::PI;

/// Day angle \\[rad\\], the fraction of the anomalistic year.
pub fn day_angle(doy: &ArrayD<f64>) -> ArrayD<f64> {
    doy.mapv(|d| 2.0 * PI * d / 365.25)
}

/// Eccentricity correction of the extraterrestrial irradiance \\[-\\].
pub fn extraterrestrial_irradiance_normal(day_angle: &ArrayD<f64>) -> ArrayD<f64> {
    day_angle.mapv(|j| 1.0 + 0.03344 * (j - 0.048869).cos())
}

/// Extraterrestrial irradiance at normal incidence \\[W m-2\\].
pub fn solar_constant_corrected(ied: &ArrayD<f64>) -> ArrayD<f64> {
    ied.mapv(|ied| SOLAR_CONSTANT * ied)
}

/// True solar elevation angle \\[rad\\].
///
/// Negative below the horizon.
pub fn solar_elevation_angle(
    decl: &ArrayD<f64>,
    lat_rad: &ArrayD<f64>,
    ha: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(decl)
        .and(lat_rad)
        .and(ha)
        .map_collect(|&decl, &lat, &ha| {
            (decl.sin() * lat.sin() + decl.cos() * lat.cos() * ha.cos()).asin()
        })
}

/// Solar elevation corrected for atmospheric refraction \\[rad\\].
pub fn solar_elevation_angle_refracted(h0: &ArrayD<f64>) -> ArrayD<f64> {
    h0.mapv(|h0| {
        let refraction = 0.061359 * (0.1594 + 1.123 * h0 + 0.065656 * h0 * h0)
            / (1.0 + 28.9344 * h0 + 277.3971 * h0 * h0);
        h0 + refraction
    })
}

/// Relative optical air mass, pressure corrected \\[-\\].
///
/// Kasten and Young (1989). Zero irradiance pixels (sun below the refracted
/// horizon) report an air mass of NaN; the beam component guards on the
/// elevation itself.
pub fn relative_optical_airmass(
    h0ref: &ArrayD<f64>,
    p_air: &ArrayD<f64>,
    p_air_0: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(h0ref)
        .and(p_air)
        .and(p_air_0)
        .map_collect(|&h0ref, &p, &p0| {
            if h0ref <= 0.0 {
                return f64::NAN;
            }
            let h0_deg = h0ref.to_degrees();
            let denom = h0ref.sin() + 0.50572 * (h0_deg + 6.07995).powf(-1.6364);
            nan_div(nan_div(p, p0), denom)
        })
}

/// Rayleigh optical thickness at air mass `m` \\[-\\].
pub fn rayleigh_optical_thickness(m: &ArrayD<f64>) -> ArrayD<f64> {
    m.mapv(|m| {
        if m <= 20.0 {
            1.0 / (6.6296 + 1.7513 * m - 0.1202 * m * m + 0.0065 * m.powi(3)
                - 0.00013 * m.powi(4))
        } else {
            1.0 / (10.4 + 0.718 * m)
        }
    })
}

/// Linke atmospheric turbidity at air mass 2 \\[-\\].
///
/// Remund et al. (2003), from aerosol optical depth and total column water
/// vapour, with a pressure correction for site elevation.
pub fn linke_turbidity(
    aod550: &ArrayD<f64>,
    wv: &ArrayD<f64>,
    p_air: &ArrayD<f64>,
    p_air_0: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(aod550)
        .and(wv)
        .and(p_air)
        .and(p_air_0)
        .map_collect(|&aod, &wv, &p, &p0| {
            let pr = nan_div(p, p0);
            3.91 * (0.689 * pr).exp() * aod
                + 0.376 * nan_ln(wv)
                + 2.0
                + 0.54 * pr
                - 0.5 * pr * pr
                + 0.16 * pr.powi(3)
        })
}

/// Beam irradiance at normal incidence \\[W m-2\\].
pub fn beam_irradiance_normal(
    g0: &ArrayD<f64>,
    tl2: &ArrayD<f64>,
    m: &ArrayD<f64>,
    rotm: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(g0)
        .and(tl2)
        .and(m)
        .and(rotm)
        .map_collect(|&g0, &tl2, &m, &rotm| g0 * (-0.8662 * tl2 * m * rotm).exp())
}

/// Beam irradiance on a horizontal surface \\[W m-2\\].
pub fn beam_irradiance_horizontal(b0c: &ArrayD<f64>, h0: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(b0c).and(h0).map_collect(|&b0c, &h0| {
        if h0 > 0.0 {
            b0c * h0.sin()
        } else {
            0.0
        }
    })
}

/// Diffuse irradiance on a horizontal surface \\[W m-2\\].
///
/// ESRA diffuse transmission function of turbidity and solar elevation.
pub fn diffuse_irradiance_horizontal(
    g0: &ArrayD<f64>,
    tl2: &ArrayD<f64>,
    h0: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(g0).and(tl2).and(h0).map_collect(|&g0, &tl2, &h0| {
        if h0 <= 0.0 {
            return 0.0;
        }
        let tn = -0.015843 + 0.030543 * tl2 + 0.0003797 * tl2 * tl2;
        let mut a1 = 0.26463 - 0.061581 * tl2 + 0.0031408 * tl2 * tl2;
        if a1 * tn < 0.0022 {
            a1 = nan_div(0.0022, tn);
        }
        let a2 = 2.04020 + 0.018945 * tl2 - 0.011161 * tl2 * tl2;
        let a3 = -1.3025 + 0.039231 * tl2 + 0.0085079 * tl2 * tl2;
        let fd = a1 + a2 * h0.sin() + a3 * h0.sin() * h0.sin();
        clamp_min(g0 * tn * fd, 0.0)
    })
}

/// Total clear-sky irradiance on a horizontal surface \\[W m-2\\].
pub fn ra_hor_clear(bhc: &ArrayD<f64>, dhc: &ArrayD<f64>) -> ArrayD<f64> {
    bhc + dhc
}
