//! First-guess fluxes under neutral atmospheric stability.
//!
//! These seed the stability iteration in [`crate::unstable`]: aerodynamic
//! resistances from plain logarithmic profiles, a Penman-Monteith latent
//! heat flux, and the sensible heat residual that follows from it.

use crate::constants::{KARMAN, SPECIFIC_HEAT_AIR, Z0_SOIL};
use etlook_core::sentinel::nan_div;
use ndarray::{ArrayD, Zip};

/// Penman-Monteith latent heat flux \\[W m-2\\].
///
/// $$\lambda E = \frac{\Delta Q + \rho c_p \frac{VPD}{r_a}}{\Delta +
/// \gamma \left(1 + \frac{r_s}{r_a}\right)}$$
///
/// where $Q$ is the available energy for the surface in question.
pub fn penman_monteith(
    available_energy: &ArrayD<f64>,
    ssvp: &ArrayD<f64>,
    ad: &ArrayD<f64>,
    vpd: &ArrayD<f64>,
    psy: &ArrayD<f64>,
    r_surface: &ArrayD<f64>,
    ra: &ArrayD<f64>,
) -> ArrayD<f64> {
    let demand = Zip::from(ad)
        .and(vpd)
        .map_collect(|&ad, &vpd| ad * SPECIFIC_HEAT_AIR * vpd);
    // ndarray's Zip only offers map_collect for up to 5 producers; zip
    // the 6 inputs as iterators instead (same logical element order).
    let values: Vec<f64> = available_energy
        .iter()
        .zip(ssvp.iter())
        .zip(demand.iter())
        .zip(psy.iter())
        .zip(r_surface.iter())
        .zip(ra.iter())
        .map(|(((((&q, &ssvp), &demand), &psy), &rs), &ra)| {
            pm_scalar(q, ssvp, demand, psy, rs, ra)
        })
        .collect();
    ArrayD::from_shape_vec(available_energy.raw_dim(), values)
        .expect("inputs share a shape")
}

/// Scalar Penman-Monteith core, shared with the stability iteration.
pub(crate) fn pm_scalar(q: f64, ssvp: f64, demand: f64, psy: f64, rs: f64, ra: f64) -> f64 {
    let numerator = ssvp * q + nan_div(demand, ra);
    let denominator = ssvp + psy * (1.0 + nan_div(rs, ra));
    nan_div(numerator, denominator)
}

/// Neutral aerodynamic resistance of the canopy \\[s m-1\\].
pub fn initial_canopy_aerodynamic_resistance(
    u_24: &ArrayD<f64>,
    z0m: &ArrayD<f64>,
    z_obs: f64,
) -> ArrayD<f64> {
    Zip::from(u_24).and(z0m).map_collect(|&u, &z0m| {
        if z0m <= 0.0 || z0m.is_nan() {
            return f64::NAN;
        }
        nan_div(
            (z_obs / z0m).ln() * (z_obs / (0.1 * z0m)).ln(),
            KARMAN * KARMAN * u,
        )
    })
}

/// Neutral aerodynamic resistance of the soil \\[s m-1\\].
pub fn initial_soil_aerodynamic_resistance(u_24: &ArrayD<f64>, z_obs: f64) -> ArrayD<f64> {
    let numerator = (z_obs / Z0_SOIL).ln() * (z_obs / (0.1 * Z0_SOIL)).ln();
    u_24.mapv(|u| nan_div(numerator, KARMAN * KARMAN * u))
}

/// Neutral friction velocity \\[m s-1\\].
pub fn initial_friction_velocity(
    u_b: &ArrayD<f64>,
    disp: &ArrayD<f64>,
    z0m: &ArrayD<f64>,
    z_b: f64,
) -> ArrayD<f64> {
    Zip::from(u_b)
        .and(disp)
        .and(z0m)
        .map_collect(|&u_b, &disp, &z0m| friction_velocity_scalar(u_b, disp, z0m, z_b))
}

/// Neutral friction velocity over the soil surface \\[m s-1\\].
pub fn initial_friction_velocity_soil(
    u_b: &ArrayD<f64>,
    disp: &ArrayD<f64>,
    z_b: f64,
) -> ArrayD<f64> {
    Zip::from(u_b)
        .and(disp)
        .map_collect(|&u_b, &disp| friction_velocity_scalar(u_b, disp, Z0_SOIL, z_b))
}

pub(crate) fn friction_velocity_scalar(u_b: f64, disp: f64, z0m: f64, z_b: f64) -> f64 {
    let height = z_b - disp;
    if height <= z0m || z0m <= 0.0 {
        return f64::NAN;
    }
    KARMAN * u_b / (height / z0m).ln()
}

/// Sensible heat residual of the canopy \\[W m-2\\].
pub fn initial_sensible_heat_canopy(
    rn_24_canopy: &ArrayD<f64>,
    t_24_init: &ArrayD<f64>,
) -> ArrayD<f64> {
    rn_24_canopy - t_24_init
}

/// Sensible heat residual of the soil \\[W m-2\\].
pub fn initial_sensible_heat_soil(
    rn_24_soil: &ArrayD<f64>,
    g0_24: &ArrayD<f64>,
    e_24_init: &ArrayD<f64>,
) -> ArrayD<f64> {
    Zip::from(rn_24_soil)
        .and(g0_24)
        .and(e_24_init)
        .map_collect(|&rn, &g0, &e| rn - g0 - e)
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
    fn penman_monteith_is_bounded_by_available_energy_when_air_is_saturated() {
        // No atmospheric demand: latent heat cannot exceed the available
        // energy once the surface resistance is non-zero.
        let le = at(&penman_monteith(
            &scalar(100.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(0.0),
            &scalar(0.67),
            &scalar(50.0),
            &scalar(50.0),
        ));
        assert!(le > 0.0 && le < 100.0, "got {le}");
    }

    #[test]
    fn drier_air_increases_the_flux() {
        let humid = at(&penman_monteith(
            &scalar(100.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(5.0),
            &scalar(0.67),
            &scalar(50.0),
            &scalar(50.0),
        ));
        let dry = at(&penman_monteith(
            &scalar(100.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(25.0),
            &scalar(0.67),
            &scalar(50.0),
            &scalar(50.0),
        ));
        assert!(dry > humid);
    }

    #[test]
    fn closed_surface_shuts_the_flux_down() {
        let le = at(&penman_monteith(
            &scalar(100.0),
            &scalar(1.8),
            &scalar(1.2),
            &scalar(10.0),
            &scalar(0.67),
            &scalar(1_000_000.0),
            &scalar(50.0),
        ));
        assert!(le.abs() < 1.0, "got {le}");
    }

    #[test]
    fn canopy_resistance_magnitude() {
        let ra = at(&initial_canopy_aerodynamic_resistance(
            &scalar(3.0),
            &scalar(0.1),
            10.0,
        ));
        assert!((30.0..150.0).contains(&ra), "got {ra}");
    }

    #[test]
    fn soil_aerodynamic_resistance_exceeds_canopy() {
        let ra_soil = at(&initial_soil_aerodynamic_resistance(&scalar(3.0), 10.0));
        let ra_canopy = at(&initial_canopy_aerodynamic_resistance(
            &scalar(3.0),
            &scalar(0.1),
            10.0,
        ));
        assert!(ra_soil > ra_canopy);
    }

    #[test]
    fn friction_velocity_profile() {
        let u_star = at(&initial_friction_velocity(
            &scalar(5.0),
            &scalar(1.0),
            &scalar(0.2),
            100.0,
        ));
        assert!(is_close!(u_star, 0.41 * 5.0 / (99.0_f64 / 0.2).ln()));
    }

    #[test]
    fn degenerate_profile_is_nan() {
        let u_star = at(&initial_friction_velocity(
            &scalar(5.0),
            &scalar(100.0),
            &scalar(0.2),
            100.0,
        ));
        assert!(u_star.is_nan());
    }

    #[test]
    fn sensible_heat_closes_the_balance() {
        let h = initial_sensible_heat_soil(&scalar(120.0), &scalar(20.0), &scalar(60.0));
        assert_eq!(at(&h), 40.0);
    }
}
