//! The instantaneous root-zone soil-moisture pipeline.
//!
//! Runs at satellite overpass time: clear-sky radiation from solar
//! geometry and turbidity, instantaneous meteorology, then the dry and wet
//! end-member surface temperatures that bracket the observed land surface
//! temperature.

use crate::{clear_sky_radiation, meteo, neutral, soil_moisture, solar_radiation, unstable};
use etlook_core::container::ModelContainer;
use etlook_core::errors::EtLookResult;
use etlook_core::parameters::Parameters;
use etlook_core::step::{self, RunReport, Step};
use etlook_core::variable;
use etlook_core::version::{ExportSelection, SeRootVersion};
use ndarray::ArrayD;

/// Output fields kept under [`ExportSelection::Default`].
pub const DEFAULT_EXPORT: &[&str] = &["se_root"];

/// Ground heat fraction of the bare-soil end members.
const G_FRAC_BARE: f64 = 0.35;
/// Ground heat fraction of the vegetated end members.
const G_FRAC_FULL: f64 = 0.05;

/// Run the soil-moisture pipeline over a prepared container.
pub fn run(
    container: &mut ModelContainer,
    version: SeRootVersion,
    params: &Parameters,
    export: &ExportSelection,
) -> EtLookResult<(ModelContainer, RunReport)> {
    let [nt, ny, nx] = container.shape();
    log::info!("running se_root {version:?} over {nt}x{ny}x{nx}");

    let required: Vec<_> = variable::SE_ROOT_REQUIRED.iter().collect();
    variable::check_required(container, &required, "se_root")?;
    let substituted = variable::substitute_defaults(container, variable::SE_ROOT_OPTIONAL);

    let mut report = step::execute(container, &steps(version), params)?;
    report.substituted = substituted;

    let output = container.select(export, DEFAULT_EXPORT)?;
    Ok((output, report))
}

/// The step sequence for one pipeline version.
pub fn steps(version: SeRootVersion) -> Vec<Step> {
    let mut sequence = vec![
        Step { provides: "lat_rad", requires: &["lat"], run: lat_rad },
        Step { provides: "lon_rad", requires: &["lon"], run: lon_rad },
        Step { provides: "sc", requires: &["doy"], run: sc },
        Step { provides: "decl", requires: &["doy"], run: decl },
        Step { provides: "day_angle", requires: &["doy"], run: day_angle },
        Step { provides: "ied", requires: &["day_angle"], run: ied },
        Step { provides: "vc", requires: &["ndvi"], run: vc },
        Step { provides: "u_i", requires: &["u2m_i", "v2m_i"], run: u_i },
        Step { provides: "t_air_k_i", requires: &["t_air_i"], run: t_air_k_i },
        Step {
            provides: "p_air_i_mbar",
            requires: &["p_air_i"],
            run: p_air_i_mbar,
        },
        Step {
            provides: "p_air_0_i_mbar",
            requires: &["p_air_0_i"],
            run: p_air_0_i_mbar,
        },
        Step {
            provides: "vp_i",
            requires: &["qv_i", "p_air_i_mbar"],
            run: vp_i,
        },
        Step { provides: "svp_i", requires: &["t_air_i"], run: svp_i },
        Step { provides: "vpd_i", requires: &["svp_i", "vp_i"], run: vpd_i },
        Step {
            provides: "ad_moist_i",
            requires: &["vp_i", "t_air_k_i"],
            run: ad_moist_i,
        },
        Step {
            provides: "ad_dry_i",
            requires: &["p_air_i_mbar", "vp_i", "t_air_k_i"],
            run: ad_dry_i,
        },
        Step {
            provides: "ad_i",
            requires: &["ad_dry_i", "ad_moist_i"],
            run: ad_i,
        },
        Step {
            provides: "ha",
            requires: &["sc", "dtime", "lon_rad"],
            run: ha,
        },
        Step {
            provides: "h0",
            requires: &["decl", "lat_rad", "ha"],
            run: h0,
        },
        Step { provides: "h0ref", requires: &["h0"], run: h0ref },
        Step {
            provides: "m",
            requires: &["h0ref", "p_air_i_mbar", "p_air_0_i_mbar"],
            run: airmass,
        },
        Step { provides: "rotm", requires: &["m"], run: rotm },
        Step {
            provides: "tl2",
            requires: &["aod550_i", "wv_i", "p_air_i_mbar", "p_air_0_i_mbar"],
            run: tl2,
        },
        Step { provides: "g0_i", requires: &["ied"], run: g0_i },
        Step {
            provides: "b0c_i",
            requires: &["g0_i", "tl2", "m", "rotm"],
            run: b0c_i,
        },
        Step { provides: "bhc_i", requires: &["b0c_i", "h0"], run: bhc_i },
        Step {
            provides: "dhc_i",
            requires: &["g0_i", "tl2", "h0"],
            run: dhc_i,
        },
        Step {
            provides: "ra_hor_clear_i",
            requires: &["bhc_i", "dhc_i"],
            run: ra_hor_clear_i,
        },
        Step {
            provides: "emiss_atm_i",
            requires: &["vp_i", "t_air_k_i"],
            run: emiss_atm_i,
        },
        Step {
            provides: "rn_bare",
            requires: &["ra_hor_clear_i", "emiss_atm_i", "t_air_k_i", "lst"],
            run: rn_bare,
        },
        Step {
            provides: "rn_full",
            requires: &["ra_hor_clear_i", "emiss_atm_i", "t_air_k_i", "lst"],
            run: rn_full,
        },
        Step { provides: "h_bare", requires: &["rn_bare"], run: h_bare },
        Step { provides: "h_full", requires: &["rn_full"], run: h_full },
        Step { provides: "u_b_i_bare", requires: &["u_i"], run: u_b_i_bare },
        Step { provides: "u_b_i_full", requires: &["u_i"], run: u_b_i_full },
        Step {
            provides: "u_star_i_bare",
            requires: &["u_b_i_bare"],
            run: u_star_i_bare,
        },
        Step {
            provides: "u_star_i_full",
            requires: &["u_b_i_full"],
            run: u_star_i_full,
        },
        Step {
            provides: "l_bare",
            requires: &["h_bare", "ad_i", "u_star_i_bare", "t_air_k_i"],
            run: l_bare,
        },
        Step {
            provides: "l_full",
            requires: &["h_full", "ad_i", "u_star_i_full", "t_air_k_i"],
            run: l_full,
        },
        Step { provides: "u_i_soil", requires: &["u_i"], run: u_i_soil },
        Step { provides: "ras", requires: &["u_i_soil"], run: ras },
        Step { provides: "raa", requires: &["u_i", "l_bare"], run: raa },
        Step { provides: "rac", requires: &["u_i", "l_full"], run: rac },
        Step {
            provides: "t_max_bare",
            requires: &["ra_hor_clear_i", "emiss_atm_i", "t_air_k_i", "ad_i", "raa", "ras"],
            run: t_max_bare,
        },
        Step {
            provides: "t_max_full",
            requires: &["ra_hor_clear_i", "emiss_atm_i", "t_air_k_i", "ad_i", "rac"],
            run: t_max_full,
        },
        Step {
            provides: "lst_max",
            requires: &["vc", "t_max_full", "t_max_bare"],
            run: lst_max,
        },
    ];

    match version {
        SeRootVersion::V2 => {
            sequence.push(Step {
                provides: "t_wet_i",
                requires: &["t_air_i", "vp_i", "svp_i"],
                run: t_wet_i,
            });
            sequence.push(Step {
                provides: "t_wet_k_i",
                requires: &["t_wet_i"],
                run: t_wet_k_i,
            });
            sequence.push(Step {
                provides: "lst_min",
                requires: &["vc", "t_air_k_i", "t_wet_k_i"],
                run: lst_min_v2,
            });
        }
        SeRootVersion::Dev => {
            sequence.push(Step { provides: "lh_i", requires: &["t_air_i"], run: lh_i });
            sequence.push(Step {
                provides: "psy_i",
                requires: &["p_air_i_mbar", "lh_i"],
                run: psy_i,
            });
            sequence.push(Step {
                provides: "ssvp_i",
                requires: &["svp_i", "t_air_i"],
                run: ssvp_i,
            });
            sequence.push(Step {
                provides: "lst_zone_mean",
                requires: &["lst"],
                run: lst_zone_mean,
            });
            sequence.push(Step {
                provides: "t_min_bare",
                requires: &[
                    "ra_hor_clear_i", "emiss_atm_i", "lst_zone_mean", "ad_i", "raa", "ras",
                    "vpd_i", "psy_i", "ssvp_i",
                ],
                run: t_min_bare,
            });
            sequence.push(Step {
                provides: "t_min_full",
                requires: &[
                    "ra_hor_clear_i", "emiss_atm_i", "lst_zone_mean", "ad_i", "rac", "vpd_i",
                    "psy_i", "ssvp_i",
                ],
                run: t_min_full,
            });
            sequence.push(Step {
                provides: "lst_min",
                requires: &["vc", "t_min_full", "t_min_bare"],
                run: lst_min_dev,
            });
        }
    }

    sequence.push(Step {
        provides: "se_root",
        requires: &["lst_max", "lst", "lst_min"],
        run: se_root,
    });
    sequence
}

fn lat_rad(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::angle_rad(c.expect_array("lat"))
}

fn lon_rad(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::angle_rad(c.expect_array("lon"))
}

fn sc(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::seasonal_correction(c.expect_array("doy"))
}

fn decl(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::declination(c.expect_array("doy"))
}

fn day_angle(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::day_angle(c.expect_array("doy"))
}

fn ied(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::extraterrestrial_irradiance_normal(c.expect_array("day_angle"))
}

fn vc(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    crate::leaf::vegetation_cover(c.expect_array("ndvi"), p.nd_min, p.nd_max, p.vc_pow)
}

fn u_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::wind_speed(c.expect_array("u2m_i"), c.expect_array("v2m_i"))
}

fn t_air_k_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_temperature_kelvin(c.expect_array("t_air_i"))
}

fn p_air_i_mbar(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_pressure_kpa2mbar(c.expect_array("p_air_i"))
}

fn p_air_0_i_mbar(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_pressure_kpa2mbar(c.expect_array("p_air_0_i"))
}

fn vp_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::vapour_pressure_from_specific_humidity(
        c.expect_array("qv_i"),
        c.expect_array("p_air_i_mbar"),
    )
}

fn svp_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::saturated_vapour_pressure(c.expect_array("t_air_i"))
}

fn vpd_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::vapour_pressure_deficit(c.expect_array("svp_i"), c.expect_array("vp_i"))
}

fn ad_moist_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::moist_air_density(c.expect_array("vp_i"), c.expect_array("t_air_k_i"))
}

fn ad_dry_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::dry_air_density(
        c.expect_array("p_air_i_mbar"),
        c.expect_array("vp_i"),
        c.expect_array("t_air_k_i"),
    )
}

fn ad_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_density(c.expect_array("ad_dry_i"), c.expect_array("ad_moist_i"))
}

fn ha(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    solar_radiation::hour_angle(
        c.expect_array("sc"),
        c.expect_array("dtime"),
        c.expect_array("lon_rad"),
    )
}

fn h0(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::solar_elevation_angle(
        c.expect_array("decl"),
        c.expect_array("lat_rad"),
        c.expect_array("ha"),
    )
}

fn h0ref(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::solar_elevation_angle_refracted(c.expect_array("h0"))
}

fn airmass(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::relative_optical_airmass(
        c.expect_array("h0ref"),
        c.expect_array("p_air_i_mbar"),
        c.expect_array("p_air_0_i_mbar"),
    )
}

fn rotm(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::rayleigh_optical_thickness(c.expect_array("m"))
}

fn tl2(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::linke_turbidity(
        c.expect_array("aod550_i"),
        c.expect_array("wv_i"),
        c.expect_array("p_air_i_mbar"),
        c.expect_array("p_air_0_i_mbar"),
    )
}

fn g0_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::solar_constant_corrected(c.expect_array("ied"))
}

fn b0c_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::beam_irradiance_normal(
        c.expect_array("g0_i"),
        c.expect_array("tl2"),
        c.expect_array("m"),
        c.expect_array("rotm"),
    )
}

fn bhc_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::beam_irradiance_horizontal(c.expect_array("b0c_i"), c.expect_array("h0"))
}

fn dhc_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::diffuse_irradiance_horizontal(
        c.expect_array("g0_i"),
        c.expect_array("tl2"),
        c.expect_array("h0"),
    )
}

fn ra_hor_clear_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    clear_sky_radiation::ra_hor_clear(c.expect_array("bhc_i"), c.expect_array("dhc_i"))
}

fn emiss_atm_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::atmospheric_emissivity(c.expect_array("vp_i"), c.expect_array("t_air_k_i"))
}

fn rn_bare(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::net_radiation_inst(
        c.expect_array("ra_hor_clear_i"),
        c.expect_array("emiss_atm_i"),
        c.expect_array("t_air_k_i"),
        c.expect_array("lst"),
        p.r0_bare,
    )
}

fn rn_full(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::net_radiation_inst(
        c.expect_array("ra_hor_clear_i"),
        c.expect_array("emiss_atm_i"),
        c.expect_array("t_air_k_i"),
        c.expect_array("lst"),
        p.r0_full,
    )
}

fn h_bare(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::sensible_heat_flux(c.expect_array("rn_bare"), p.fraction_h_bare)
}

fn h_full(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::sensible_heat_flux(c.expect_array("rn_full"), p.fraction_h_full)
}

fn u_b_i_bare(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    meteo::wind_speed_blending_height_rough(c.expect_array("u_i"), p.z0m_bare, p.z_obs, p.z_b)
}

fn u_b_i_full(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    meteo::wind_speed_blending_height_rough(c.expect_array("u_i"), p.z0m_full, p.z_obs, p.z_b)
}

fn u_star_i_bare(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    c.expect_array("u_b_i_bare")
        .mapv(|u_b| neutral::friction_velocity_scalar(u_b, p.disp_bare, p.z0m_bare, p.z_b))
}

fn u_star_i_full(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    c.expect_array("u_b_i_full")
        .mapv(|u_b| neutral::friction_velocity_scalar(u_b, p.disp_full, p.z0m_full, p.z_b))
}

fn l_bare(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    unstable::monin_obukhov_length(
        c.expect_array("h_bare"),
        c.expect_array("ad_i"),
        c.expect_array("u_star_i_bare"),
        c.expect_array("t_air_k_i"),
    )
}

fn l_full(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    unstable::monin_obukhov_length(
        c.expect_array("h_full"),
        c.expect_array("ad_i"),
        c.expect_array("u_star_i_full"),
        c.expect_array("t_air_k_i"),
    )
}

fn u_i_soil(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::wind_speed_soil(c.expect_array("u_i"), p.z_obs)
}

fn ras(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::aerodynamical_resistance_soil(c.expect_array("u_i_soil"))
}

fn raa(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::aerodynamical_resistance(
        c.expect_array("u_i"),
        c.expect_array("l_bare"),
        p.z_obs,
        p.disp_bare,
        p.z0m_bare,
    )
}

fn rac(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::aerodynamical_resistance(
        c.expect_array("u_i"),
        c.expect_array("l_full"),
        p.z_obs,
        p.disp_full,
        p.z0m_full,
    )
}

fn t_max_bare(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    let r = c.expect_array("raa") + c.expect_array("ras");
    soil_moisture::maximum_temperature(
        c.expect_array("ra_hor_clear_i"),
        c.expect_array("emiss_atm_i"),
        c.expect_array("t_air_k_i"),
        c.expect_array("ad_i"),
        &r,
        p.r0_bare,
        G_FRAC_BARE,
    )
}

fn t_max_full(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::maximum_temperature(
        c.expect_array("ra_hor_clear_i"),
        c.expect_array("emiss_atm_i"),
        c.expect_array("t_air_k_i"),
        c.expect_array("ad_i"),
        c.expect_array("rac"),
        p.r0_full,
        G_FRAC_FULL,
    )
}

fn lst_max(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::blend_by_cover(
        c.expect_array("vc"),
        c.expect_array("t_max_full"),
        c.expect_array("t_max_bare"),
    )
}

fn t_wet_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::wet_bulb_temperature(
        c.expect_array("t_air_i"),
        c.expect_array("vp_i"),
        c.expect_array("svp_i"),
    )
}

fn t_wet_k_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::air_temperature_kelvin(c.expect_array("t_wet_i"))
}

fn lst_min_v2(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::blend_by_cover(
        c.expect_array("vc"),
        c.expect_array("t_air_k_i"),
        c.expect_array("t_wet_k_i"),
    )
}

fn lh_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::latent_heat(c.expect_array("t_air_i"))
}

fn psy_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::psychrometric_constant(c.expect_array("p_air_i_mbar"), c.expect_array("lh_i"))
}

fn ssvp_i(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    meteo::slope_saturated_vapour_pressure(c.expect_array("svp_i"), c.expect_array("t_air_i"))
}

fn lst_zone_mean(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::lst_zone_mean(c.expect_array("lst"))
}

fn t_min_bare(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    let r = c.expect_array("raa") + c.expect_array("ras");
    soil_moisture::minimum_temperature(
        c.expect_array("ra_hor_clear_i"),
        c.expect_array("emiss_atm_i"),
        c.expect_array("lst_zone_mean"),
        c.expect_array("ad_i"),
        &r,
        c.expect_array("vpd_i"),
        c.expect_array("psy_i"),
        c.expect_array("ssvp_i"),
        p.r0_bare_wet,
        G_FRAC_BARE,
    )
}

fn t_min_full(c: &ModelContainer, p: &Parameters) -> ArrayD<f64> {
    soil_moisture::minimum_temperature(
        c.expect_array("ra_hor_clear_i"),
        c.expect_array("emiss_atm_i"),
        c.expect_array("lst_zone_mean"),
        c.expect_array("ad_i"),
        c.expect_array("rac"),
        c.expect_array("vpd_i"),
        c.expect_array("psy_i"),
        c.expect_array("ssvp_i"),
        p.r0_full,
        G_FRAC_FULL,
    )
}

fn lst_min_dev(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::blend_by_cover(
        c.expect_array("vc"),
        c.expect_array("t_min_full"),
        c.expect_array("t_min_bare"),
    )
}

fn se_root(c: &ModelContainer, _p: &Parameters) -> ArrayD<f64> {
    soil_moisture::soil_moisture_from_maximum_temperature(
        c.expect_array("lst_max"),
        c.expect_array("lst"),
        c.expect_array("lst_min"),
    )
}
