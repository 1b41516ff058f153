//! Surface resistances of canopy and soil.

use crate::stress;
use etlook_core::sentinel::{clamp_min, nan_div};
use ndarray::{ArrayD, Zip};

/// Canopy resistance without soil moisture stress \\[s m-1\\].
///
/// Minimum stomatal resistance scaled up by the effective leaf area and
/// the atmospheric stress factors, capped at `rcan_max` where the stresses
/// shut the canopy down.
pub fn atmospheric_canopy_resistance(
    lai_eff: &ArrayD<f64>,
    stress_rad: &ArrayD<f64>,
    stress_vpd: &ArrayD<f64>,
    stress_temp: &ArrayD<f64>,
    rs_min: &ArrayD<f64>,
    rcan_max: f64,
) -> ArrayD<f64> {
    let stress_atm = stress::combined_stress(stress_rad, stress_vpd, stress_temp);
    Zip::from(lai_eff)
        .and(&stress_atm)
        .and(rs_min)
        .map_collect(|&lai_eff, &stress, &rs_min| {
            if lai_eff.is_nan() || stress.is_nan() {
                return f64::NAN;
            }
            let r = nan_div(rs_min, lai_eff * stress);
            if r.is_nan() || r > rcan_max {
                rcan_max
            } else {
                r
            }
        })
}

/// Canopy resistance including soil moisture stress \\[s m-1\\].
pub fn canopy_resistance(
    r_canopy_0: &ArrayD<f64>,
    stress_moist: &ArrayD<f64>,
    rcan_max: f64,
) -> ArrayD<f64> {
    Zip::from(r_canopy_0)
        .and(stress_moist)
        .map_collect(|&r0, &s| {
            if r0.is_nan() || s.is_nan() {
                return f64::NAN;
            }
            let r = nan_div(r0, s);
            if r.is_nan() || r > rcan_max {
                rcan_max
            } else {
                r
            }
        })
}

/// Soil resistance to evaporation \\[s m-1\\].
///
/// Power law in the root zone saturation; open water (land mask 2) offers
/// no resistance. The saturation is floored so the power law stays finite
/// on completely dry pixels.
pub fn soil_resistance(
    se_root: &ArrayD<f64>,
    land_mask: &ArrayD<f64>,
    r_soil_min: f64,
    r_soil_pow: f64,
) -> ArrayD<f64> {
    Zip::from(se_root)
        .and(land_mask)
        .map_collect(|&se, &mask| {
            if mask == 2.0 {
                return 0.0;
            }
            if se.is_nan() {
                return f64::NAN;
            }
            r_soil_min * clamp_min(se, 0.01).powf(r_soil_pow)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::{ArrayD, IxDyn};

    fn scalar(value: f64) -> ArrayD<f64> {
        ArrayD::from_elem(IxDyn(&[1, 1, 1]), value)
    }

    fn at(a: &ArrayD<f64>) -> f64 {
        a[[0, 0, 0]]
    }

    const RCAN_MAX: f64 = 1_000_000.0;

    #[test]
    fn unstressed_canopy_approaches_scaled_stomatal_resistance() {
        let r = atmospheric_canopy_resistance(
            &scalar(2.0),
            &scalar(1.0),
            &scalar(1.0),
            &scalar(1.0),
            &scalar(100.0),
            RCAN_MAX,
        );
        assert!(is_close!(at(&r), 50.0));
    }

    #[test]
    fn fully_stressed_canopy_is_capped() {
        let r = atmospheric_canopy_resistance(
            &scalar(2.0),
            &scalar(0.0),
            &scalar(1.0),
            &scalar(1.0),
            &scalar(100.0),
            RCAN_MAX,
        );
        assert_eq!(at(&r), RCAN_MAX);
    }

    #[test]
    fn moisture_stress_scales_canopy_resistance() {
        let r = canopy_resistance(&scalar(100.0), &scalar(0.5), RCAN_MAX);
        assert!(is_close!(at(&r), 200.0));
        let dry = canopy_resistance(&scalar(100.0), &scalar(0.0), RCAN_MAX);
        assert_eq!(at(&dry), RCAN_MAX);
    }

    #[test]
    fn soil_resistance_grows_as_the_soil_dries() {
        let wet = at(&soil_resistance(&scalar(1.0), &scalar(1.0), 800.0, -2.1));
        let dry = at(&soil_resistance(&scalar(0.2), &scalar(1.0), 800.0, -2.1));
        assert!(is_close!(wet, 800.0));
        assert!(dry > 10.0 * wet);
    }

    #[test]
    fn open_water_has_no_soil_resistance() {
        let r = soil_resistance(&scalar(0.5), &scalar(2.0), 800.0, -2.1);
        assert_eq!(at(&r), 0.0);
    }

    #[test]
    fn bone_dry_soil_stays_finite() {
        let r = at(&soil_resistance(&scalar(0.0), &scalar(1.0), 800.0, -2.1));
        assert!(r.is_finite());
    }
}
