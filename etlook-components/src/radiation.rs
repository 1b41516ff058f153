//! Daily net radiation and its canopy/soil partition.

use crate::constants::{DAY_SECONDS, STEFAN_BOLTZMANN};
use etlook_core::sentinel::nan_div;
use ndarray::{ArrayD, Zip};

/// Daily net longwave radiation \\[W m-2\\], positive outgoing.
///
/// FAO-56 formulation: emission at air temperature, damped by humidity and
/// cloudiness. The transmissivity enters relative to a clear-sky value of
/// 0.75 through the `lw_slope` and `lw_offset` calibration constants.
pub fn longwave_radiation_fao(
    t_air_k_24: &ArrayD<f64>,
    vp_24: &ArrayD<f64>,
    trans_24: &ArrayD<f64>,
    lw_slope: f64,
    lw_offset: f64,
) -> ArrayD<f64> {
    Zip::from(t_air_k_24)
        .and(vp_24)
        .and(trans_24)
        .map_collect(|&t_k, &vp, &trans| {
            let vp_kpa = vp / 10.0;
            if vp_kpa < 0.0 {
                return f64::NAN;
            }
            STEFAN_BOLTZMANN
                * t_k.powi(4)
                * (0.34 - 0.14 * vp_kpa.sqrt())
                * (lw_slope * trans / 0.75 + lw_offset)
        })
}

/// Daily interception \\[mm day-1\\].
///
/// Rainfall retained on the canopy, saturating at `int_max` per unit leaf
/// area.
pub fn interception_mm(
    p_24: &ArrayD<f64>,
    vc: &ArrayD<f64>,
    lai: &ArrayD<f64>,
    int_max: f64,
) -> ArrayD<f64> {
    Zip::from(p_24)
        .and(vc)
        .and(lai)
        .map_collect(|&p, &vc, &lai| {
            if p.is_nan() || vc.is_nan() || lai.is_nan() {
                return f64::NAN;
            }
            let capacity = int_max * lai;
            if capacity <= 0.0 || vc * p <= 0.0 {
                return 0.0;
            }
            capacity * (1.0 - 1.0 / (1.0 + (vc * p) / capacity))
        })
}

/// Interception as an energy flux \\[W m-2\\].
pub fn interception_wm2(int_mm: &ArrayD<f64>, lh_24: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(int_mm)
        .and(lh_24)
        .map_collect(|&int, &lh| int * lh / DAY_SECONDS)
}

/// Daily net radiation \\[W m-2\\].
///
/// Absorbed shortwave minus net longwave, minus the energy already spent
/// evaporating intercepted rainfall.
pub fn net_radiation(
    r0: &ArrayD<f64>,
    ra_24: &ArrayD<f64>,
    l_net: &ArrayD<f64>,
    int_wm2: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(r0)
        .and(ra_24)
        .and(l_net)
        .and(int_wm2)
        .map_collect(|&r0, &ra, &l_net, &int| (1.0 - r0) * ra - l_net - int)
}

/// Canopy share of the daily net radiation \\[W m-2\\].
pub fn net_radiation_canopy(rn_24: &ArrayD<f64>, sf_soil: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(rn_24)
        .and(sf_soil)
        .map_collect(|&rn, &sf| rn * (1.0 - sf))
}

/// Soil share of the daily net radiation \\[W m-2\\].
pub fn net_radiation_soil(rn_24: &ArrayD<f64>, sf_soil: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(rn_24)
        .and(sf_soil)
        .map_collect(|&rn, &sf| rn * sf)
}

/// Daily net radiation of the reference grass surface \\[W m-2\\].
pub fn net_radiation_grass(
    ra_24: &ArrayD<f64>,
    l_net: &ArrayD<f64>,
    r0_grass: f64,
) -> ArrayD<f64> {
    Zip::from(ra_24)
        .and(l_net)
        .map_collect(|&ra, &l_net| (1.0 - r0_grass) * ra - l_net)
}

/// Convert a latent heat flux to a water depth \\[mm day-1\\].
pub fn flux_to_mm(flux_wm2: &ArrayD<f64>, lh: &ArrayD<f64>) -> ArrayD<f64> {
    Zip::from(flux_wm2)
        .and(lh)
        .map_collect(|&flux, &lh| nan_div(flux * DAY_SECONDS, lh))
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

    #[test]
    fn longwave_is_plausible_for_a_clear_warm_day() {
        let l_net = at(&longwave_radiation_fao(
            &scalar(298.15),
            &scalar(20.0),
            &scalar(0.75),
            1.35,
            -0.35,
        ));
        assert!(
            (20.0..120.0).contains(&l_net),
            "net longwave out of range: {l_net}"
        );
    }

    #[test]
    fn cloud_cover_reduces_longwave_loss() {
        let t_k = scalar(298.15);
        let vp = scalar(20.0);
        let clear = at(&longwave_radiation_fao(&t_k, &vp, &scalar(0.75), 1.35, -0.35));
        let overcast = at(&longwave_radiation_fao(&t_k, &vp, &scalar(0.3), 1.35, -0.35));
        assert!(overcast < clear);
    }

    #[test]
    fn interception_is_zero_without_rain_or_canopy() {
        assert_eq!(
            at(&interception_mm(&scalar(0.0), &scalar(0.8), &scalar(3.0), 0.2)),
            0.0
        );
        assert_eq!(
            at(&interception_mm(&scalar(10.0), &scalar(0.0), &scalar(0.0), 0.2)),
            0.0
        );
    }

    #[test]
    fn interception_saturates_at_canopy_capacity() {
        let lai = scalar(3.0);
        let vc = scalar(0.9);
        let light = at(&interception_mm(&scalar(2.0), &vc, &lai, 0.2));
        let heavy = at(&interception_mm(&scalar(100.0), &vc, &lai, 0.2));
        assert!(light < heavy);
        assert!(heavy < 0.2 * 3.0);
    }

    #[test]
    fn net_radiation_partition_sums_to_total() {
        let rn = scalar(150.0);
        let sf = scalar(0.3);
        let canopy = at(&net_radiation_canopy(&rn, &sf));
        let soil = at(&net_radiation_soil(&rn, &sf));
        assert!(is_close!(canopy + soil, 150.0));
        assert!(is_close!(soil, 45.0));
    }

    #[test]
    fn flux_conversion_reference_point() {
        // 100 W/m2 over a day at lh ~2.45 MJ/kg is ~3.5 mm.
        let mm = at(&flux_to_mm(&scalar(100.0), &scalar(2.45e6)));
        assert!(is_close!(mm, 3.53, rel_tol = 0.01), "got {mm}");
    }

    #[test]
    fn grass_reference_uses_fixed_albedo() {
        let rn = at(&net_radiation_grass(&scalar(200.0), &scalar(50.0), 0.23));
        assert!(is_close!(rn, 0.77 * 200.0 - 50.0));
    }
}
