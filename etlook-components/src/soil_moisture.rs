//! Soil thermal properties, soil heat flux and the root-zone soil-moisture
//! retrieval.
//!
//! The retrieval scales the observed land surface temperature between two
//! modelled end members: the temperature a completely dry surface would
//! reach (all available energy into sensible heat) and the temperature of
//! a fully wet, freely evaporating surface. Both end members are
//! linearized around the air temperature.

use crate::constants::{
    KARMAN, LST_ZONE_SIZE, SPECIFIC_HEAT_AIR, STEFAN_BOLTZMANN, YEAR_SECONDS, Z0_SOIL,
};
use crate::unstable::{psi_h, psi_m};
use etlook_core::sentinel::nan_div;
use ndarray::{ArrayD, ArrayViewMutD, Zip};
use std::f64::consts::PI;

/// Soil thermal conductivity \\[W m-1 K-1\\].
///
/// Linear in saturation: ~0.15 for dry soil up to 2.0 at saturation.
pub fn soil_thermal_conductivity(se_root: &ArrayD<f64>) -> ArrayD<f64> {
    se_root.mapv(|se| 0.15 + 1.85 * se)
}

/// Volumetric heat capacity of the soil \\[J m-3 K-1\\].
pub fn volumetric_heat_capacity(se_root: &ArrayD<f64>, porosity: f64) -> ArrayD<f64> {
    se_root.mapv(|se| porosity * se * 4.186e6 + (1.0 - porosity) * 1.93e6)
}

/// Damping depth of the annual temperature wave \\[m\\].
pub fn damping_depth(stc: &ArrayD<f64>, vhc: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(stc)
        .and(vhc)
        .map_collect(|&stc, &vhc| (stc * YEAR_SECONDS / (vhc * PI)).sqrt())
}

/// Bare soil heat flux from the annual temperature harmonic \\[W m-2\\].
///
/// The phase puts the maximum flux in late spring, an eighth of a year
/// before the surface temperature peak; it flips sign on the southern
/// hemisphere.
pub fn bare_soil_heat_flux(
    doy: &ArrayD<f64>,
    dd: &ArrayD<f64>,
    stc: &ArrayD<f64>,
    t_amp: &ArrayD<f64>,
    lat: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(doy)
        .and(dd)
        .and(stc)
        .and(t_amp)
        .and(lat)
        .map_collect(|&doy, &dd, &stc, &amp, &lat| {
            let mut arg = 2.0 * PI * doy / 365.25 - 1.1;
            if lat < 0.0 {
                arg += PI;
            }
            nan_div(2.0_f64.sqrt() * amp * stc * arg.sin(), dd)
        })
}

/// Daily soil heat flux \\[W m-2\\].
///
/// Land pixels scale the bare-soil harmonic with the exposed soil
/// fraction; open water stores a fixed share of the soil net radiation.
pub fn soil_heat_flux(
    g0_bs: &ArrayD<f64>,
    sf_soil: &ArrayD<f64>,
    land_mask: &ArrayD<f64>,
    rn_24_soil: &ArrayD<f64>,
    rn_slope: f64,
    rn_offset: f64,
) -> ArrayD<f64> {
    Zip::from(g0_bs)
        .and(sf_soil)
        .and(land_mask)
        .and(rn_24_soil)
        .map_collect(|&g0_bs, &sf, &mask, &rn_soil| {
            if mask == 2.0 {
                rn_slope * rn_soil + rn_offset
            } else {
                sf * g0_bs
            }
        })
}

/// Apparent atmospheric emissivity \\[-\\].
///
/// Brutsaert (1975) from vapour pressure (mbar) and air temperature (K).
pub fn atmospheric_emissivity(vp: &ArrayD<f64>, t_air_k: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(vp)
        .and(t_air_k)
        .map_collect(|&vp, &t| 1.24 * nan_div(vp, t).powf(1.0 / 7.0))
}

/// Instantaneous net radiation of a surface with albedo `r0` \\[W m-2\\].
pub fn net_radiation_inst(
    ra_hor_clear: &ArrayD<f64>,
    emiss_atm: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
    lst: &ArrayD<f64>,
    r0: f64,
) -> ArrayD<f64> {
    Zip::from(ra_hor_clear)
        .and(emiss_atm)
        .and(t_air_k)
        .and(lst)
        .map_collect(|&ra, &emiss, &t_air, &lst| {
            (1.0 - r0) * ra + emiss * STEFAN_BOLTZMANN * t_air.powi(4)
                - STEFAN_BOLTZMANN * lst.powi(4)
        })
}

/// Sensible heat flux as a fixed fraction of net radiation \\[W m-2\\].
pub fn sensible_heat_flux(rn: &ArrayD<f64>, fraction_h: f64) -> ArrayD<f64> {
    rn.mapv(|rn| fraction_h * rn)
}

/// Wind speed near the soil surface \\[m s-1\\].
///
/// Logarithmic profile from observation height down to 0.1 m.
pub fn wind_speed_soil(u: &ArrayD<f64>, z_obs: f64) -> ArrayD<f64> {
    let factor = (0.1 / Z0_SOIL).ln() / (z_obs / Z0_SOIL).ln();
    u.mapv(|u| u * factor)
}

/// Aerodynamic resistance of the soil boundary layer \\[s m-1\\].
pub fn aerodynamical_resistance_soil(u_soil: &ArrayD<f64>) -> ArrayD<f64> {
    u_soil.mapv(|u| nan_div(1.0, 0.0025 + 0.012 * u))
}

/// Stability-corrected aerodynamic resistance \\[s m-1\\].
///
/// Combined momentum and heat profile between the surface and the
/// observation height.
pub fn aerodynamical_resistance(
    u: &ArrayD<f64>,
    length: &ArrayD<f64>,
    z_obs: f64,
    disp: f64,
    z0m: f64,
) -> ArrayD<f64> {
    let height = z_obs - disp;
    Zip::from(u).and(length).map_collect(|&u, &length| {
        if height <= z0m {
            return f64::NAN;
        }
        let zeta = height / length;
        let term_h = (height / z0m).ln() - psi_h(zeta);
        let term_m = (height / z0m).ln() - psi_m(zeta);
        if term_h <= 0.0 || term_m <= 0.0 {
            return f64::NAN;
        }
        nan_div(term_h * term_m, KARMAN * KARMAN * u)
    })
}

/// Dry-limit surface temperature \\[K\\].
///
/// Linearized surface energy balance with no evaporation: a fraction
/// `1 - g_frac` of the radiative surplus must leave as sensible heat
/// through the resistance `r`.
pub fn maximum_temperature(
    ra_hor_clear: &ArrayD<f64>,
    emiss_atm: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    r: &ArrayD<f64>,
    r0: f64,
    g_frac: f64,
) -> ArrayD<f64> {
    Zip::from(ra_hor_clear)
        .and(emiss_atm)
        .and(t_air_k)
        .and(ad)
        .and(r)
        .map_collect(|&ra, &emiss, &t_air, &ad, &r| {
            let q0 = (1.0 - r0) * ra + (emiss - 1.0) * STEFAN_BOLTZMANN * t_air.powi(4);
            let sink = nan_div(ad * SPECIFIC_HEAT_AIR, r)
                + 4.0 * STEFAN_BOLTZMANN * t_air.powi(3) * (1.0 - g_frac);
            t_air + nan_div((1.0 - g_frac) * q0, sink)
        })
}

/// Wet-limit surface temperature \\[K\\].
///
/// Same linearization as [`maximum_temperature`] but with the surface
/// evaporating freely, so most of the surplus leaves as latent heat and
/// the air's vapour pressure deficit pulls the surface below the dry
/// limit. `t_ref` is the reference temperature of the inversion, either
/// the local air temperature or a zone-averaged surface temperature.
#[allow(clippy::too_many_arguments)]
pub fn minimum_temperature(
    ra_hor_clear: &ArrayD<f64>,
    emiss_atm: &ArrayD<f64>,
    t_ref: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    r: &ArrayD<f64>,
    vpd: &ArrayD<f64>,
    psy: &ArrayD<f64>,
    ssvp: &ArrayD<f64>,
    r0_wet: f64,
    g_frac: f64,
) -> ArrayD<f64> {
    let q0 = Zip::from(ra_hor_clear)
        .and(emiss_atm)
        .and(t_ref)
        .map_collect(|&ra, &emiss, &t| {
            (1.0 - g_frac) * ((1.0 - r0_wet) * ra + (emiss - 1.0) * STEFAN_BOLTZMANN * t.powi(4))
        });
    let vpd_gamma = Zip::from(vpd).and(psy).map_collect(|&vpd, &psy| nan_div(vpd, psy));
    let delta_gamma = Zip::from(ssvp)
        .and(psy)
        .map_collect(|&ssvp, &psy| nan_div(ssvp, psy));

    // ndarray's Zip only offers map_collect for up to 5 producers; zip
    // the 6 inputs as iterators instead (same logical element order).
    let values: Vec<f64> = q0
        .iter()
        .zip(vpd_gamma.iter())
        .zip(delta_gamma.iter())
        .zip(t_ref.iter())
        .zip(ad.iter())
        .zip(r.iter())
        .map(|(((((&q0, &vpd_gamma), &delta_gamma), &t), &ad), &r)| {
            let rho_cp = ad * SPECIFIC_HEAT_AIR;
            let radiative = 4.0 * STEFAN_BOLTZMANN * t.powi(3) * r * (1.0 - g_frac);
            let dt = (nan_div(q0 * r, rho_cp) - vpd_gamma)
                / (1.0 + delta_gamma + nan_div(radiative, rho_cp));
            t + dt
        })
        .collect();
    ArrayD::from_shape_vec(q0.raw_dim(), values).expect("inputs share a shape")
}

/// Blend bare and vegetated end-member temperatures by cover \\[K\\].
pub fn blend_by_cover(
    vc: &ArrayD<f64>,
    t_full: &ArrayD<f64>,
    t_bare: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(vc)
        .and(t_full)
        .and(t_bare)
        .map_collect(|&vc, &full, &bare| vc * full + (1.0 - vc) * bare)
}

/// Zone-averaged land surface temperature \\[K\\].
///
/// Means over square blocks of [`LST_ZONE_SIZE`] pixels per time step,
/// skipping NaN. Blocks without a single valid pixel fall back to the
/// scene mean; a fully masked scene stays NaN.
pub fn lst_zone_mean(lst: &ArrayD<f64>) -> ArrayD<f64> {
    lst_zone_mean_sized(lst, LST_ZONE_SIZE)
}

pub fn lst_zone_mean_sized(lst: &ArrayD<f64>, zone: usize) -> ArrayD<f64> {
    let mut out = lst.clone();
    for mut scene in out.outer_iter_mut() {
        zone_mean_scene(&mut scene, zone);
    }
    out
}

fn zone_mean_scene(scene: &mut ArrayViewMutD<'_, f64>, zone: usize) {
    let ny = scene.shape()[0];
    let nx = scene.shape()[1];

    let mut scene_sum = 0.0;
    let mut scene_count = 0_usize;
    for &v in scene.iter() {
        if v.is_finite() {
            scene_sum += v;
            scene_count += 1;
        }
    }
    let scene_mean = if scene_count > 0 {
        scene_sum / scene_count as f64
    } else {
        f64::NAN
    };

    for by in (0..ny).step_by(zone) {
        for bx in (0..nx).step_by(zone) {
            let y_end = (by + zone).min(ny);
            let x_end = (bx + zone).min(nx);

            let mut sum = 0.0;
            let mut count = 0_usize;
            for y in by..y_end {
                for x in bx..x_end {
                    let v = scene[[y, x]];
                    if v.is_finite() {
                        sum += v;
                        count += 1;
                    }
                }
            }
            let mean = if count > 0 {
                sum / count as f64
            } else {
                scene_mean
            };
            for y in by..y_end {
                for x in bx..x_end {
                    scene[[y, x]] = mean;
                }
            }
        }
    }
}

/// Root-zone soil-moisture saturation \\[-\\].
///
/// Position of the observed surface temperature between the wet and dry
/// end members, clamped to \\[0, 1\\]. A degenerate bracket (wet and dry
/// limits coinciding) carries no information and yields NaN.
pub fn soil_moisture_from_maximum_temperature(
    lst_max: &ArrayD<f64>,
    lst: &ArrayD<f64>,
    lst_min: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(lst_max)
        .and(lst)
        .and(lst_min)
        .map_collect(|&max, &lst, &min| {
            let bracket = max - min;
            if bracket.abs() < 1e-9 {
                return f64::NAN;
            }
            let ratio = (max - lst) / bracket;
            etlook_core::sentinel::clamp_unit(ratio)
        })
}
