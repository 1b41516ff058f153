//! Surface roughness and displacement.

use crate::constants::KARMAN;
use ndarray::{ArrayD, Zip};

/// Obstacle height from NDVI \\[m\\].
///
/// Linear ramp between `obs_fr * z_obst_max` on bare pixels and
/// `z_obst_max` under a closed canopy.
pub fn obstacle_height(
    ndvi: &ArrayD<f64>,
    z_obst_max: &ArrayD<f64>,
    ndvi_obs_min: f64,
    ndvi_obs_max: f64,
    obs_fr: f64,
) -> ArrayD<f64> {
    Zip::from(ndvi)
        .and(z_obst_max)
        .map_collect(|&ndvi, &z_max| {
            if ndvi.is_nan() || z_max.is_nan() {
                return f64::NAN;
            }
            if ndvi <= ndvi_obs_min {
                obs_fr * z_max
            } else if ndvi >= ndvi_obs_max {
                z_max
            } else {
                let fraction = (ndvi - ndvi_obs_min) / (ndvi_obs_max - ndvi_obs_min);
                obs_fr * z_max + (1.0 - obs_fr) * z_max * fraction
            }
        })
}

/// Zero-plane displacement height \\[m\\].
///
/// Raupach (1994):
///
/// $$d = h \left(1 - \frac{1 - e^{-\sqrt{c_1 LAI}}}{\sqrt{c_1
/// LAI}}\right)$$
///
/// with the bare-soil limit $d \to 0$ as $LAI \to 0$.
pub fn displacement_height(lai: &ArrayD<f64>, z_obst: &ArrayD<f64>, c1: f64) -> ArrayD<f64> {
    Zip::from(lai).and(z_obst).map_collect(|&lai, &z_obst| {
        if lai.is_nan() || z_obst.is_nan() {
            return f64::NAN;
        }
        let x = (c1 * lai).sqrt();
        if x < 1e-6 {
            return 0.0;
        }
        z_obst * (1.0 - (1.0 - (-x).exp()) / x)
    })
}

/// Roughness length for momentum \\[m\\].
///
/// Raupach-style drag partition: the ratio of friction velocity to the
/// wind speed at obstacle height grows with leaf area up to a limit of
/// 0.3. Orographic roughness is added on top; open water (land mask 2) is
/// fixed at 0.1 mm and unclassified pixels (mask 0) are undefined.
pub fn roughness_length(
    lai: &ArrayD<f64>,
    z_obst: &ArrayD<f64>,
    disp: &ArrayD<f64>,
    z_oro: &ArrayD<f64>,
    land_mask: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(lai)
        .and(z_obst)
        .and(disp)
        .and(z_oro)
        .and(land_mask)
        .map_collect(|&lai, &z_obst, &disp, &z_oro, &mask| {
            if mask == 0.0 {
                return f64::NAN;
            }
            if mask == 2.0 {
                return 0.0001;
            }
            if lai.is_nan() || z_obst.is_nan() || disp.is_nan() {
                return f64::NAN;
            }
            let ustar_ratio = (0.003 + 0.3 * lai / 2.0).sqrt().min(0.3);
            let z0m = (z_obst - disp) * (-KARMAN / ustar_ratio + 0.193).exp();
            z0m + z_oro
        })
}
