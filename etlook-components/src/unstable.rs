//! Atmospheric stability corrections and the sensible heat iteration.
//!
//! The daily fluxes follow from a fixed-point problem: the aerodynamic
//! resistance depends on stability, stability on the sensible heat flux,
//! and the sensible heat flux on the latent heat flux computed with that
//! resistance. The loop runs a fixed number of sweeps from the neutral
//! first guess; the fluxes settle well within three sweeps for daily
//! averages, so no convergence test is made.

use crate::constants::{
    GRAVITY, KARMAN, NEUTRAL_H_THRESHOLD, NEUTRAL_MO_LENGTH, SPECIFIC_HEAT_AIR,
    STABILITY_ITERATIONS, Z0_SOIL,
};
use crate::neutral::{friction_velocity_scalar, pm_scalar};
use ndarray::{ArrayD, Zip};
use std::f64::consts::FRAC_PI_2;

/// Businger-Dyer stability correction for momentum \\[-\\].
///
/// `zeta` is the dimensionless height $(z - d)/L$; negative under unstable
/// conditions.
pub fn psi_m(zeta: f64) -> f64 {
    if zeta.is_nan() {
        return f64::NAN;
    }
    if zeta < 0.0 {
        let x = (1.0 - 16.0 * zeta).powf(0.25);
        2.0 * ((1.0 + x) / 2.0).ln() + ((1.0 + x * x) / 2.0).ln() - 2.0 * x.atan() + FRAC_PI_2
    } else {
        -5.0 * zeta
    }
}

/// Businger-Dyer stability correction for heat \\[-\\].
pub fn psi_h(zeta: f64) -> f64 {
    if zeta.is_nan() {
        return f64::NAN;
    }
    if zeta < 0.0 {
        let x = (1.0 - 16.0 * zeta).powf(0.25);
        2.0 * ((1.0 + x * x) / 2.0).ln()
    } else {
        -5.0 * zeta
    }
}

/// Monin-Obukhov length \\[m\\].
///
/// Near-zero sensible heat is snapped to a large negative length, i.e.
/// neutral conditions, to keep the division well defined.
pub fn monin_obukhov_length_scalar(h: f64, ad: f64, u_star: f64, t_air_k: f64) -> f64 {
    if h.is_nan() || ad.is_nan() || u_star.is_nan() || t_air_k.is_nan() {
        return f64::NAN;
    }
    if h.abs() < NEUTRAL_H_THRESHOLD {
        return NEUTRAL_MO_LENGTH;
    }
    -ad * SPECIFIC_HEAT_AIR * u_star.powi(3) * t_air_k / (KARMAN * GRAVITY * h)
}

/// Array form of [`monin_obukhov_length_scalar`].
pub fn monin_obukhov_length(
    h: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    u_star: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(h)
        .and(ad)
        .and(u_star)
        .and(t_air_k)
        .map_collect(|&h, &ad, &u_star, &t| monin_obukhov_length_scalar(h, ad, u_star, t))
}

/// Stability-corrected friction velocity \\[m s-1\\].
pub fn friction_velocity_corrected_scalar(
    u_b: f64,
    disp: f64,
    z0m: f64,
    z_b: f64,
    zeta: f64,
) -> f64 {
    let height = z_b - disp;
    if height <= z0m || z0m <= 0.0 {
        return f64::NAN;
    }
    let denom = (height / z0m).ln() - psi_m(zeta);
    if denom <= 0.0 {
        return f64::NAN;
    }
    KARMAN * u_b / denom
}

/// Daily transpiration flux after the stability iteration \\[W m-2\\].
#[allow(clippy::too_many_arguments)]
pub fn transpiration(
    rn_24_canopy: &ArrayD<f64>,
    ssvp: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    vpd: &ArrayD<f64>,
    psy: &ArrayD<f64>,
    r_canopy: &ArrayD<f64>,
    h_canopy_init: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
    u_b: &ArrayD<f64>,
    disp: &ArrayD<f64>,
    z0m: &ArrayD<f64>,
    z_b: f64,
) -> ArrayD<f64> {
    iterate_flux(
        rn_24_canopy,
        ssvp,
        ad,
        vpd,
        psy,
        r_canopy,
        h_canopy_init,
        t_air_k,
        u_b,
        disp,
        Some(z0m),
        z_b,
    )
}

/// Daily soil evaporation flux after the stability iteration \\[W m-2\\].
///
/// `available_energy` is the soil net radiation minus the soil heat flux.
#[allow(clippy::too_many_arguments)]
pub fn evaporation(
    available_energy: &ArrayD<f64>,
    ssvp: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    vpd: &ArrayD<f64>,
    psy: &ArrayD<f64>,
    r_soil: &ArrayD<f64>,
    h_soil_init: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
    u_b: &ArrayD<f64>,
    disp: &ArrayD<f64>,
    z_b: f64,
) -> ArrayD<f64> {
    iterate_flux(
        available_energy,
        ssvp,
        ad,
        vpd,
        psy,
        r_soil,
        h_soil_init,
        t_air_k,
        u_b,
        disp,
        None,
        z_b,
    )
}

// All container fields are kept in standard layout, so slice access cannot
// fail for arrays produced by the pipelines.
fn slice(a: &ArrayD<f64>) -> &[f64] {
    a.as_slice()
        .unwrap_or_else(|| panic!("field is not in standard layout"))
}

#[allow(clippy::too_many_arguments)]
fn iterate_flux(
    available_energy: &ArrayD<f64>,
    ssvp: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    vpd: &ArrayD<f64>,
    psy: &ArrayD<f64>,
    r_surface: &ArrayD<f64>,
    h_init: &ArrayD<f64>,
    t_air_k: &ArrayD<f64>,
    u_b: &ArrayD<f64>,
    disp: &ArrayD<f64>,
    z0m: Option<&ArrayD<f64>>,
    z_b: f64,
) -> ArrayD<f64> {
    let q = slice(available_energy);
    let ssvp = slice(ssvp);
    let ad = slice(ad);
    let vpd = slice(vpd);
    let psy = slice(psy);
    let rs = slice(r_surface);
    let h_init = slice(h_init);
    let t_k = slice(t_air_k);
    let u_b = slice(u_b);
    let disp = slice(disp);
    let z0m = z0m.map(slice);

    let mut out = vec![f64::NAN; q.len()];
    for (i, le) in out.iter_mut().enumerate() {
        let z0m_i = z0m.map_or(Z0_SOIL, |z| z[i]);
        *le = iterate_pixel(
            q[i], ssvp[i], ad[i], vpd[i], psy[i], rs[i], h_init[i], t_k[i], u_b[i], disp[i],
            z0m_i, z_b,
        );
    }
    ArrayD::from_shape_vec(available_energy.raw_dim(), out)
        .unwrap_or_else(|_| panic!("flux shape diverged from its inputs"))
}

#[allow(clippy::too_many_arguments)]
fn iterate_pixel(
    q: f64,
    ssvp: f64,
    ad: f64,
    vpd: f64,
    psy: f64,
    rs: f64,
    h_init: f64,
    t_air_k: f64,
    u_b: f64,
    disp: f64,
    z0m: f64,
    z_b: f64,
) -> f64 {
    let demand = ad * SPECIFIC_HEAT_AIR * vpd;
    let mut h = h_init;
    let mut u_star = friction_velocity_scalar(u_b, disp, z0m, z_b);
    let mut le = f64::NAN;

    for _ in 0..STABILITY_ITERATIONS {
        let length = monin_obukhov_length_scalar(h, ad, u_star, t_air_k);
        let zeta = (z_b - disp) / length;
        u_star = friction_velocity_corrected_scalar(u_b, disp, z0m, z_b, zeta);
        if u_star.is_nan() || u_star <= 0.0 {
            return f64::NAN;
        }
        let ra = ((z_b - disp) / (0.1 * z0m)).ln() - psi_h(zeta);
        let ra = ra / (KARMAN * u_star);
        if ra.is_nan() || ra <= 0.0 {
            return f64::NAN;
        }
        le = pm_scalar(q, ssvp, demand, psy, rs, ra);
        h = q - le;
    }
    le
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
    fn stability_functions_vanish_at_neutral() {
        assert_eq!(psi_m(0.0), 0.0);
        assert_eq!(psi_h(0.0), 0.0);
    }

    #[test]
    fn unstable_conditions_enhance_transfer() {
        // Positive psi reduces the resistance under instability.
        assert!(psi_m(-1.0) > 0.0);
        assert!(psi_h(-1.0) > 0.0);
        // Stable stratification suppresses it.
        assert!(psi_m(0.5) < 0.0);
        assert!(psi_h(0.5) < 0.0);
    }

    #[test]
    fn obukhov_length_sign_follows_the_heat_flux() {
        // Upward sensible heat: unstable, negative length.
        let unstable = monin_obukhov_length_scalar(100.0, 1.2, 0.3, 293.0);
        assert!(unstable < 0.0);
        let stable = monin_obukhov_length_scalar(-50.0, 1.2, 0.3, 293.0);
        assert!(stable > 0.0);
    }

    #[test]
    fn near_zero_heat_flux_is_treated_as_neutral() {
        let length = monin_obukhov_length_scalar(0.001, 1.2, 0.3, 293.0);
        assert_eq!(length, NEUTRAL_MO_LENGTH);
    }

    #[test]
    fn transpiration_is_positive_and_bounded_for_a_typical_crop() {
        let le = at(&transpiration(
            &scalar(120.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(10.0),
            &scalar(0.67),
            &scalar(80.0),
            &scalar(40.0),
            &scalar(298.0),
            &scalar(4.0),
            &scalar(1.0),
            &scalar(0.2),
            100.0,
        ));
        assert!((20.0..200.0).contains(&le), "got {le}");
    }

    #[test]
    fn iteration_moves_away_from_the_neutral_guess() {
        // Strongly unstable case: the corrected flux should differ from a
        // single neutral Penman-Monteith evaluation.
        let q = scalar(150.0);
        let neutral = crate::neutral::penman_monteith(
            &q,
            &scalar(1.8),
            &scalar(1.2),
            &scalar(20.0),
            &scalar(0.67),
            &scalar(80.0),
            &crate::neutral::initial_canopy_aerodynamic_resistance(&scalar(1.0), &scalar(0.2), 10.0),
        );
        let corrected = transpiration(
            &q,
            &scalar(1.8),
            &scalar(1.2),
            &scalar(20.0),
            &scalar(0.67),
            &scalar(80.0),
            &scalar(120.0),
            &scalar(298.0),
            &scalar(1.5),
            &scalar(1.0),
            &scalar(0.2),
            100.0,
        );
        assert!(!is_close!(at(&neutral), at(&corrected), rel_tol = 1e-6));
    }

    // The solver loop, replayed sweep by sweep for a strongly unstable
    // canopy pixel.
    fn manual_sweeps(n: usize) -> f64 {
        let (q, ssvp, ad, vpd, psy, rs) = (150.0, 1.8, 1.2, 20.0, 0.67, 80.0);
        let (t_air_k, u_b, disp, z0m, z_b) = (298.0, 1.5, 1.0, 0.2, 100.0);
        let demand = ad * SPECIFIC_HEAT_AIR * vpd;
        let mut h = 120.0;
        let mut u_star = friction_velocity_scalar(u_b, disp, z0m, z_b);
        let mut le = f64::NAN;
        for _ in 0..n {
            let length = monin_obukhov_length_scalar(h, ad, u_star, t_air_k);
            let zeta = (z_b - disp) / length;
            u_star = friction_velocity_corrected_scalar(u_b, disp, z0m, z_b, zeta);
            let ra = (((z_b - disp) / (0.1 * z0m)).ln() - psi_h(zeta)) / (KARMAN * u_star);
            le = pm_scalar(q, ssvp, demand, psy, rs, ra);
            h = q - le;
        }
        le
    }

    #[test]
    fn every_sweep_runs_with_no_early_exit() {
        let solved = at(&transpiration(
            &scalar(150.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(20.0),
            &scalar(0.67),
            &scalar(80.0),
            &scalar(120.0),
            &scalar(298.0),
            &scalar(1.5),
            &scalar(1.0),
            &scalar(0.2),
            100.0,
        ));
        assert_eq!(
            solved.to_bits(),
            manual_sweeps(STABILITY_ITERATIONS).to_bits(),
            "flux does not match {STABILITY_ITERATIONS} sweeps"
        );
        // One sweep fewer gives a different flux, so the count above is
        // really what ran.
        assert!(!is_close!(
            solved,
            manual_sweeps(STABILITY_ITERATIONS - 1),
            rel_tol = 1e-9
        ));
    }

    #[test]
    fn nan_inputs_stay_nan() {
        let le = at(&evaporation(
            &scalar(f64::NAN),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(10.0),
            &scalar(0.67),
            &scalar(800.0),
            &scalar(40.0),
            &scalar(298.0),
            &scalar(4.0),
            &scalar(0.0),
            100.0,
        ));
        assert!(le.is_nan());
    }

    #[test]
    fn evaporation_responds_to_soil_resistance() {
        let wet = at(&evaporation(
            &scalar(100.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(10.0),
            &scalar(0.67),
            &scalar(800.0),
            &scalar(40.0),
            &scalar(298.0),
            &scalar(4.0),
            &scalar(0.0),
            100.0,
        ));
        let dry = at(&evaporation(
            &scalar(100.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(10.0),
            &scalar(0.67),
            &scalar(100_000.0),
            &scalar(40.0),
            &scalar(298.0),
            &scalar(4.0),
            &scalar(0.0),
            100.0,
        ));
        assert!(wet > dry);
    }
}
