//! The daily evapotranspiration pipeline.
//!
//! Assembles the formula modules into the dependency-gated step sequence
//! that turns the harmonized inputs into daily transpiration, soil
//! evaporation, interception and the reference flux. Fields supplied by
//! the caller (for example a precomputed wind speed or obstacle height)
//! take precedence over the corresponding steps.

use crate::{
    evapotranspiration, leaf, meteo, neutral, radiation, resistance, roughness, soil_moisture,
    solar_radiation, stress, unstable,
};
use etlook_core::container::ModelContainer;
use etlook_core::errors::EtLookResult;
use etlook_core::parameters::Parameters;
use etlook_core::step::{self, RunReport, Step};
use etlook_core::variable;
use etlook_core::version::{EtLookVersion, ExportSelection};
use ndarray::ArrayD;

/// Output fields kept under [`ExportSelection::Default`].
pub const DEFAULT_EXPORT: &[&str] = &[
    "int_mm",
    "t_24_mm",
    "e_24_mm",
    "aeti_24_mm",
    "et_ref_24_mm",
    "se_root",
];

/// Run the daily ET pipeline over a prepared container.
///
/// Checks the version's required inputs, substitutes documented defaults
/// for absent optional inputs, executes the step sequence and selects the
/// export subset. The returned report lists substitutions, computed fields
/// and skipped steps.
pub fn run(
    container: &mut ModelContainer,
    version: EtLookVersion,
    params: &Parameters,
    export: &ExportSelection,
) -> EtLookResult<(ModelContainer, RunReport)> {
    let [nt, ny, nx] = container.shape();
    log::info!("running et_look {version:?} over {nt}x{ny}x{nx}");

    let required = variable::et_look_required(version);
    variable::check_required(container, &required, "et_look")?;
    let substituted = variable::substitute_defaults(container, variable::ET_LOOK_OPTIONAL);

    let mut report = step::execute(container, &steps(version), params)?;
    report.substituted = substituted;

    let output = container.select(export, DEFAULT_EXPORT)?;
    Ok((output, report))
}

/// The step sequence for one pipeline version.
pub fn steps(version: EtLookVersion) -> Vec<Step> {
    let svp_step = match version {
        EtLookVersion::V2 => Step {
            provides: "svp_24",
            requires: &["t_air_24"],
            run: svp_from_mean,
        },
        EtLookVersion::V3 => Step {
            provides: "svp_24",
            requires: &["t_air_min_24", "t_air_max_24"],
            run: svp_from_minmax,
        },
    };

    vec![
        Step { provides: "lat_rad", requires: &["lat"], run: lat_rad },
        Step { provides: "decl", requires: &["doy"], run: decl },
        Step { provides: "iesd", requires: &["doy"], run: iesd },
        Step { provides: "ws", requires: &["lat_rad", "decl"], run: ws },
        Step {
            provides: "ra_toa_flat_24",
            requires: &["decl", "iesd", "lat_rad", "ws"],
            run: ra_toa_flat_24,
        },
        Step {
            provides: "trans_24",
            requires: &["ra_flat_24", "ra_toa_flat_24"],
            run: trans_24,
        },
        Step { provides: "vc", requires: &["ndvi"], run: vc },
        Step { provides: "lai", requires: &["vc"], run: lai },
        Step { provides: "lai_eff", requires: &["lai"], run: lai_eff },
        Step { provides: "sf_soil", requires: &["lai"], run: sf_soil },
        Step { provides: "stress_rad", requires: &["ra_flat_24"], run: stress_rad },
        svp_step,
        Step { provides: "vpd_24", requires: &["svp_24", "vp_24"], run: vpd_24 },
        Step { provides: "stress_vpd", requires: &["vpd_24"], run: stress_vpd },
        Step { provides: "stress_temp", requires: &["t_air_24"], run: stress_temp },
        Step {
            provides: "r_canopy_0",
            requires: &["lai_eff", "stress_rad", "stress_vpd", "stress_temp", "rs_min"],
            run: r_canopy_0,
        },
        Step { provides: "stress_moist", requires: &["se_root"], run: stress_moist },
        Step {
            provides: "r_canopy",
            requires: &["r_canopy_0", "stress_moist"],
            run: r_canopy,
        },
        Step { provides: "t_air_k_24", requires: &["t_air_24"], run: t_air_k_24 },
        Step { provides: "lh_24", requires: &["t_air_24"], run: lh_24 },
        Step {
            provides: "l_net",
            requires: &["t_air_k_24", "vp_24", "trans_24"],
            run: l_net,
        },
        Step { provides: "int_mm", requires: &["p_24", "vc", "lai"], run: int_mm },
        Step { provides: "int_wm2", requires: &["int_mm", "lh_24"], run: int_wm2 },
        Step {
            provides: "rn_24",
            requires: &["r0", "ra_flat_24", "l_net", "int_wm2"],
            run: rn_24,
        },
        Step {
            provides: "rn_24_canopy",
            requires: &["rn_24", "sf_soil"],
            run: rn_24_canopy,
        },
        Step {
            provides: "rn_24_soil",
            requires: &["rn_24", "sf_soil"],
            run: rn_24_soil,
        },
        Step {
            provides: "rn_24_grass",
            requires: &["ra_flat_24", "l_net"],
            run: rn_24_grass,
        },
        Step { provides: "u_24", requires: &["u2m_24", "v2m_24"], run: u_24 },
        Step { provides: "u_b_24", requires: &["u_24"], run: u_b_24 },
        Step {
            provides: "z_obst",
            requires: &["ndvi", "z_obst_max"],
            run: z_obst,
        },
        Step { provides: "disp", requires: &["lai", "z_obst"], run: disp },
        Step {
            provides: "z0m",
            requires: &["lai", "z_obst", "disp", "z_oro", "land_mask"],
            run: z0m,
        },
        Step {
            provides: "ra_canopy_init",
            requires: &["u_24", "z0m"],
            run: ra_canopy_init,
        },
        Step { provides: "ra_soil_init", requires: &["u_24"], run: ra_soil_init },
        Step {
            provides: "ad_dry_24",
            requires: &["p_air_24", "vp_24", "t_air_k_24"],
            run: ad_dry_24,
        },
        Step {
            provides: "ad_moist_24",
            requires: &["vp_24", "t_air_k_24"],
            run: ad_moist_24,
        },
        Step {
            provides: "ad_24",
            requires: &["ad_dry_24", "ad_moist_24"],
            run: ad_24,
        },
        Step { provides: "psy_24", requires: &["p_air_24", "lh_24"], run: psy_24 },
        Step { provides: "ssvp_24", requires: &["svp_24", "t_air_24"], run: ssvp_24 },
        Step {
            provides: "t_24_init",
            requires: &[
                "rn_24_canopy", "ssvp_24", "ad_24", "vpd_24", "psy_24", "r_canopy",
                "ra_canopy_init",
            ],
            run: t_24_init,
        },
        Step {
            provides: "h_canopy_24_init",
            requires: &["rn_24_canopy", "t_24_init"],
            run: h_canopy_24_init,
        },
        Step {
            provides: "t_24",
            requires: &[
                "rn_24_canopy", "ssvp_24", "ad_24", "vpd_24", "psy_24", "r_canopy",
                "h_canopy_24_init", "t_air_k_24", "u_b_24", "disp", "z0m",
            ],
            run: t_24,
        },
        Step { provides: "t_24_mm", requires: &["t_24", "lh_24"], run: t_24_mm },
        Step {
            provides: "r_soil",
            requires: &["se_root", "land_mask"],
            run: r_soil,
        },
        Step { provides: "stc", requires: &["se_root"], run: stc },
        Step { provides: "vhc", requires: &["se_root"], run: vhc },
        Step { provides: "dd", requires: &["stc", "vhc"], run: dd },
        Step {
            provides: "g0_bs",
            requires: &["doy", "dd", "stc", "t_amp", "lat"],
            run: g0_bs,
        },
        Step {
            provides: "g0_24",
            requires: &["g0_bs", "sf_soil", "land_mask", "rn_24_soil"],
            run: g0_24,
        },
        Step {
            provides: "e_24_init",
            requires: &[
                "rn_24_soil", "g0_24", "ssvp_24", "ad_24", "vpd_24", "psy_24", "r_soil",
                "ra_soil_init",
            ],
            run: e_24_init,
        },
        Step {
            provides: "h_soil_24_init",
            requires: &["rn_24_soil", "g0_24", "e_24_init"],
            run: h_soil_24_init,
        },
        Step {
            provides: "e_24",
            requires: &[
                "rn_24_soil", "g0_24", "ssvp_24", "ad_24", "vpd_24", "psy_24", "r_soil",
                "h_soil_24_init", "t_air_k_24", "u_b_24", "disp",
            ],
            run: e_24,
        },
        Step { provides: "e_24_mm", requires: &["e_24", "lh_24"], run: e_24_mm },
        Step {
            provides: "aeti_24_mm",
            requires: &["t_24_mm", "e_24_mm", "int_mm"],
            run: aeti_24_mm,
        },
        Step {
            provides: "et_ref_24",
            requires: &["rn_24_grass", "ssvp_24", "psy_24", "vpd_24", "ad_24", "u_24"],
            run: et_ref_24,
        },
        Step {
            provides: "et_ref_24_mm",
            requires: &["et_ref_24", "lh_24"],
            run: et_ref_24_mm,
        },
    ]
}

fn lat_rad(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::angle_rad(c.expect_array("lat"))
}

fn decl(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::declination(c.expect_array("doy"))
}

fn iesd(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::inverse_earth_sun_distance(c.expect_array("doy"))
}

fn ws(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::sunset_hour_angle(c.expect_array("lat_rad"), c.expect_array("decl"))
}

fn ra_toa_flat_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::daily_solar_radiation_toa_flat(
        c.expect_array("decl"),
        c.expect_array("iesd"),
        c.expect_array("lat_rad"),
        c.expect_array("ws"),
    )
}

fn trans_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::transmissivity(c.expect_array("ra_flat_24"), c.expect_array("ra_toa_flat_24"))
}

fn vc(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    leaf::vegetation_cover(c.expect_array("ndvi"), p.nd_min, p.nd_max, p.vc_pow)
}

fn lai(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    leaf::leaf_area_index(c.expect_array("vc"), p.vc_max, p.lai_pow)
}

fn lai_eff(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    leaf::effective_leaf_area_index(c.expect_array("lai"))
}

fn sf_soil(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    leaf::soil_fraction(c.expect_array("lai"))
}

fn stress_rad(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    stress::stress_radiation(c.expect_array("ra_flat_24"))
}

fn svp_from_mean(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::saturated_vapour_pressure(c.expect_array("t_air_24"))
}

fn svp_from_minmax(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::saturated_vapour_pressure_minmax(
        c.expect_array("t_air_min_24"),
        c.expect_array("t_air_max_24"),
    )
}

fn vpd_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::vapour_pressure_deficit(c.expect_array("svp_24"), c.expect_array("vp_24"))
}

fn stress_vpd(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    stress::stress_vpd(c.expect_array("vpd_24"), p.vpd_slope)
}

fn stress_temp(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    stress::stress_temperature(c.expect_array("t_air_24"), p.t_opt, p.t_min, p.t_max)
}

fn r_canopy_0(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    resistance::atmospheric_canopy_resistance(
        c.expect_array("lai_eff"),
        c.expect_array("stress_rad"),
        c.expect_array("stress_vpd"),
        c.expect_array("stress_temp"),
        c.expect_array("rs_min"),
        p.rcan_max,
    )
}

fn stress_moist(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    stress::stress_moisture(c.expect_array("se_root"), p.tenacity)
}

fn r_canopy(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    resistance::canopy_resistance(
        c.expect_array("r_canopy_0"),
        c.expect_array("stress_moist"),
        p.rcan_max,
    )
}

fn t_air_k_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_temperature_kelvin(c.expect_array("t_air_24"))
}

fn lh_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::latent_heat(c.expect_array("t_air_24"))
}

fn l_net(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    radiation::longwave_radiation_fao(
        c.expect_array("t_air_k_24"),
        c.expect_array("vp_24"),
        c.expect_array("trans_24"),
        p.lw_slope,
        p.lw_offset,
    )
}

fn int_mm(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    radiation::interception_mm(
        c.expect_array("p_24"),
        c.expect_array("vc"),
        c.expect_array("lai"),
        p.int_max,
    )
}

fn int_wm2(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::interception_wm2(c.expect_array("int_mm"), c.expect_array("lh_24"))
}

fn rn_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::net_radiation(
        c.expect_array("r0"),
        c.expect_array("ra_flat_24"),
        c.expect_array("l_net"),
        c.expect_array("int_wm2"),
    )
}

fn rn_24_canopy(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::net_radiation_canopy(c.expect_array("rn_24"), c.expect_array("sf_soil"))
}

fn rn_24_soil(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::net_radiation_soil(c.expect_array("rn_24"), c.expect_array("sf_soil"))
}

fn rn_24_grass(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    radiation::net_radiation_grass(
        c.expect_array("ra_flat_24"),
        c.expect_array("l_net"),
        p.r0_grass,
    )
}

fn u_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::wind_speed(c.expect_array("u2m_24"), c.expect_array("v2m_24"))
}

fn u_b_24(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    meteo::wind_speed_blending_height(c.expect_array("u_24"), p.z_obs, p.z_b)
}

fn z_obst(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    roughness::obstacle_height(
        c.expect_array("ndvi"),
        c.expect_array("z_obst_max"),
        p.ndvi_obs_min,
        p.ndvi_obs_max,
        p.obs_fr,
    )
}

fn disp(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    roughness::displacement_height(c.expect_array("lai"), c.expect_array("z_obst"), p.c1)
}

fn z0m(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    roughness::roughness_length(
        c.expect_array("lai"),
        c.expect_array("z_obst"),
        c.expect_array("disp"),
        c.expect_array("z_oro"),
        c.expect_array("land_mask"),
    )
}

fn ra_canopy_init(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    neutral::initial_canopy_aerodynamic_resistance(
        c.expect_array("u_24"),
        c.expect_array("z0m"),
        p.z_obs,
    )
}

fn ra_soil_init(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    neutral::initial_soil_aerodynamic_resistance(c.expect_array("u_24"), p.z_obs)
}

fn ad_dry_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::dry_air_density(
        c.expect_array("p_air_24"),
        c.expect_array("vp_24"),
        c.expect_array("t_air_k_24"),
    )
}

fn ad_moist_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::moist_air_density(c.expect_array("vp_24"), c.expect_array("t_air_k_24"))
}

fn ad_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_density(c.expect_array("ad_dry_24"), c.expect_array("ad_moist_24"))
}

fn psy_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::psychrometric_constant(c.expect_array("p_air_24"), c.expect_array("lh_24"))
}

fn ssvp_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::slope_saturated_vapour_pressure(c.expect_array("svp_24"), c.expect_array("t_air_24"))
}

fn t_24_init(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    neutral::penman_monteith(
        c.expect_array("rn_24_canopy"),
        c.expect_array("ssvp_24"),
        c.expect_array("ad_24"),
        c.expect_array("vpd_24"),
        c.expect_array("psy_24"),
        c.expect_array("r_canopy"),
        c.expect_array("ra_canopy_init"),
    )
}

fn h_canopy_24_init(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    neutral::initial_sensible_heat_canopy(
        c.expect_array("rn_24_canopy"),
        c.expect_array("t_24_init"),
    )
}

fn t_24(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    unstable::transpiration(
        c.expect_array("rn_24_canopy"),
        c.expect_array("ssvp_24"),
        c.expect_array("ad_24"),
        c.expect_array("vpd_24"),
        c.expect_array("psy_24"),
        c.expect_array("r_canopy"),
        c.expect_array("h_canopy_24_init"),
        c.expect_array("t_air_k_24"),
        c.expect_array("u_b_24"),
        c.expect_array("disp"),
        c.expect_array("z0m"),
        p.z_b,
    )
}

fn t_24_mm(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::flux_to_mm(c.expect_array("t_24"), c.expect_array("lh_24"))
}

fn r_soil(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    resistance::soil_resistance(
        c.expect_array("se_root"),
        c.expect_array("land_mask"),
        p.r_soil_min,
        p.r_soil_pow,
    )
}

fn stc(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::soil_thermal_conductivity(c.expect_array("se_root"))
}

fn vhc(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::volumetric_heat_capacity(c.expect_array("se_root"), p.porosity)
}

fn dd(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::damping_depth(c.expect_array("stc"), c.expect_array("vhc"))
}

fn g0_bs(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::bare_soil_heat_flux(
        c.expect_array("doy"),
        c.expect_array("dd"),
        c.expect_array("stc"),
        c.expect_array("t_amp"),
        c.expect_array("lat"),
    )
}

fn g0_24(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::soil_heat_flux(
        c.expect_array("g0_bs"),
        c.expect_array("sf_soil"),
        c.expect_array("land_mask"),
        c.expect_array("rn_24_soil"),
        p.rn_slope,
        p.rn_offset,
    )
}

fn soil_available_energy(c: &ModelContainer) -> ArrayD<f64> {
    c.expect_array("rn_24_soil") - c.expect_array("g0_24")
}

fn e_24_init(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    neutral::penman_monteith(
        &soil_available_energy(c),
        c.expect_array("ssvp_24"),
        c.expect_array("ad_24"),
        c.expect_array("vpd_24"),
        c.expect_array("psy_24"),
        c.expect_array("r_soil"),
        c.expect_array("ra_soil_init"),
    )
}

fn h_soil_24_init(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    neutral::initial_sensible_heat_soil(
        c.expect_array("rn_24_soil"),
        c.expect_array("g0_24"),
        c.expect_array("e_24_init"),
    )
}

fn e_24(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    unstable::evaporation(
        &soil_available_energy(c),
        c.expect_array("ssvp_24"),
        c.expect_array("ad_24"),
        c.expect_array("vpd_24"),
        c.expect_array("psy_24"),
        c.expect_array("r_soil"),
        c.expect_array("h_soil_24_init"),
        c.expect_array("t_air_k_24"),
        c.expect_array("u_b_24"),
        c.expect_array("disp"),
        p.z_b,
    )
}

fn e_24_mm(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::flux_to_mm(c.expect_array("e_24"), c.expect_array("lh_24"))
}

fn aeti_24_mm(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    evapotranspiration::aeti_mm(
        c.expect_array("t_24_mm"),
        c.expect_array("e_24_mm"),
        c.expect_array("int_mm"),
    )
}

fn et_ref_24(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    evapotranspiration::et_reference(
        c.expect_array("rn_24_grass"),
        c.expect_array("ssvp_24"),
        c.expect_array("psy_24"),
        c.expect_array("vpd_24"),
        c.expect_array("ad_24"),
        c.expect_array("u_24"),
    )
}

fn et_ref_24_mm(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    radiation::flux_to_mm(c.expect_array("et_ref_24"), c.expect_array("lh_24"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use etlook_core::grid::Grid;
    use ndarray::{array, Array1};

    fn test_container() -> ModelContainer {
        let grid = Grid::daily(
            array![160.0, 200.0],
            Array1::linspace(29.0, 29.2, 3),
            Array1::linspace(30.5, 30.7, 3),
        );
        let mut c = ModelContainer::new(grid);
        c.insert_constant("ndvi", 0.55);
        c.insert_constant("p_24", 1.5);
        c.insert_constant("ra_flat_24", 260.0);
        c.insert_constant("t_air_24", 24.0);
        c.insert_constant("p_air_24", 1005.0);
        c.insert_constant("vp_24", 18.0);
        c.insert_constant("u2m_24", 2.0);
        c.insert_constant("v2m_24", -1.5);
        c.insert_constant("r0", 0.2);
        c.insert_constant("t_amp", 11.0);
        c.insert_constant("se_root", 0.45);
        c
    }

    #[test]
    fn step_sequences_are_well_ordered() {
        etlook_core::step::validate_order(&steps(EtLookVersion::V2)).unwrap();
        etlook_core::step::validate_order(&steps(EtLookVersion::V3)).unwrap();
    }

    #[test]
    fn full_run_produces_the_default_outputs() {
        let mut c = test_container();
        let (output, report) = run(
            &mut c,
            EtLookVersion::V2,
            &Parameters::default(),
            &ExportSelection::Default,
        )
        .unwrap();

        assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
        assert!(report
            .substituted
            .iter()
            .any(|s| s.variable == "rs_min" && s.value == 100.0));

        let names: Vec<_> = output.names().collect();
        for name in ["int_mm", "t_24_mm", "e_24_mm", "aeti_24_mm", "et_ref_24_mm"] {
            assert!(names.contains(&name), "missing {name} in {names:?}");
        }

        let aeti = output.expect_array("aeti_24_mm");
        for &v in aeti.iter() {
            assert!((0.0..15.0).contains(&v), "AETI out of range: {v}");
        }
    }

    #[test]
    fn v3_uses_the_temperature_extremes() {
        let mut c = test_container();
        c.insert_constant("t_air_min_24", 16.0);
        c.insert_constant("t_air_max_24", 31.0);
        let (output, report) = run(
            &mut c,
            EtLookVersion::V3,
            &Parameters::default(),
            &ExportSelection::All,
        )
        .unwrap();
        assert!(report.skipped.is_empty());
        assert!(output.contains("svp_24"));
    }

    #[test]
    fn v3_without_extremes_is_a_configuration_error() {
        let mut c = test_container();
        let result = run(
            &mut c,
            EtLookVersion::V3,
            &Parameters::default(),
            &ExportSelection::Default,
        );
        assert!(matches!(
            result,
            Err(etlook_core::errors::EtLookError::MissingRequiredInput { .. })
        ));
    }

    #[test]
    fn precomputed_wind_speed_is_respected() {
        let mut c = test_container();
        c.insert_constant("u_24", 9.9);
        run(
            &mut c,
            EtLookVersion::V2,
            &Parameters::default(),
            &ExportSelection::Default,
        )
        .unwrap();
        assert_eq!(c.expect_array("u_24")[[0, 0, 0]], 9.9);
    }

    #[test]
    fn transpiration_exceeds_evaporation_under_dense_canopy() {
        let mut c = test_container();
        let (_, _) = run(
            &mut c,
            EtLookVersion::V2,
            &Parameters::default(),
            &ExportSelection::All,
        )
        .unwrap();
        let t = c.expect_array("t_24_mm")[[0, 1, 1]];
        let e = c.expect_array("e_24_mm")[[0, 1, 1]];
        assert!(t > e, "transpiration {t} should exceed soil evaporation {e}");
    }
}
