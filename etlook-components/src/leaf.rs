//! Vegetation descriptors derived from NDVI.

use etlook_core::sentinel::clamp_unit;
use ndarray::ArrayD;

/// Vegetation cover fraction \\[-\\].
///
/// $$f_c = 1 - \left(\frac{NDVI_{max} - NDVI}{NDVI_{max} -
/// NDVI_{min}}\right)^{p}$$
///
/// clamped to \\[0, 1\\]; bare below `nd_min`, closed canopy above
/// `nd_max`.
pub fn vegetation_cover(ndvi: &ArrayD<f64>, nd_min: f64, nd_max: f64, vc_pow: f64) -> ArrayD<f64> {
    ndvi.mapv(|ndvi| {
        if ndvi.is_nan() {
            return f64::NAN;
        }
        if ndvi <= nd_min {
            0.0
        } else if ndvi >= nd_max {
            1.0
        } else {
            clamp_unit(1.0 - ((nd_max - ndvi) / (nd_max - nd_min)).powf(vc_pow))
        }
    })
}

/// Leaf area index \\[-\\], inverted from vegetation cover.
///
/// The cover is capped at `vc_max` before inversion so the logarithm stays
/// finite for closed canopies.
pub fn leaf_area_index(vc: &ArrayD<f64>, vc_max: f64, lai_pow: f64) -> ArrayD<f64> {
    vc.mapv(|vc| {
        if vc.is_nan() {
            return f64::NAN;
        }
        let vc = vc.min(vc_max);
        (1.0 - vc).ln() / lai_pow
    })
}

/// Effective leaf area index \\[-\\].
///
/// The fraction of leaves actively contributing to transpiration; saturates
/// for dense canopies.
pub fn effective_leaf_area_index(lai: &ArrayD<f64>) -> ArrayD<f64> {
    lai.mapv(|lai| lai / (0.3 * lai + 1.2))
}

/// Fraction of the surface energy balance attributed to the soil \\[-\\].
pub fn soil_fraction(lai: &ArrayD<f64>) -> ArrayD<f64> {
    lai.mapv(|lai| (-0.6 * lai).exp())
}
