//! Final evapotranspiration aggregates and the FAO reference flux.

use crate::constants::{RA_GRASS_NUMERATOR, R_GRASS, SPECIFIC_HEAT_AIR};
use crate::neutral::pm_scalar;
use etlook_core::sentinel::nan_div;
use ndarray::{ArrayD, Zip};

/// Actual evapotranspiration and interception \\[mm day-1\\].
pub fn aeti_mm(
    t_24_mm: &ArrayD<f64>,
    e_24_mm: &ArrayD<f64>,
    int_mm: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(t_24_mm)
        .and(e_24_mm)
        .and(int_mm)
        .map_collect(|&t, &e, &int| t + e + int)
}

/// Reference evapotranspiration flux \\[W m-2\\].
///
/// Penman-Monteith over the FAO-56 hypothetical grass surface: fixed
/// surface resistance of 70 s/m and an aerodynamic resistance of 208/u.
pub fn et_reference(
    rn_24_grass: &ArrayD<f64>,
    ssvp_24: &ArrayD<f64>,
    psy_24: &ArrayD<f64>,
    vpd_24: &ArrayD<f64>,
    ad_24: &ArrayD<f64>,
    u_24: &ArrayD<f64>,
) -> ArrayD<f64> {
    // ndarray's Zip only offers map_collect for up to 5 producers; zip
    // the 6 inputs as iterators instead (same logical element order).
    let values: Vec<f64> = rn_24_grass
        .iter()
        .zip(ssvp_24.iter())
        .zip(psy_24.iter())
        .zip(vpd_24.iter())
        .zip(ad_24.iter())
        .zip(u_24.iter())
        .map(|(((((&rn, &ssvp), &psy), &vpd), &ad), &u)| {
            let ra_grass = nan_div(RA_GRASS_NUMERATOR, u);
            let demand = ad * SPECIFIC_HEAT_AIR * vpd;
            pm_scalar(rn, ssvp, demand, psy, R_GRASS, ra_grass)
        })
        .collect();
    ArrayD::from_shape_vec(rn_24_grass.raw_dim(), values)
        .expect("inputs share a shape")
}
