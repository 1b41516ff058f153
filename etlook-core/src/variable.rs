//! The fixed variable vocabulary.
//!
//! Field names follow the WaPOR convention: a short lower-case token with a
//! temporal suffix (`_24` daily aggregate, `_i` instantaneous at overpass,
//! `_mm` water depth per day). Each pipeline entry point enumerates its
//! required inputs, plus the optional inputs it can substitute with a
//! documented constant default. Substitution is always reported, never
//! silent.

use crate::container::ModelContainer;
use crate::errors::{EtLookError, EtLookResult};
use crate::version::EtLookVersion;

/// Static description of a variable: name, unit, one-line meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDef {
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
}

/// An input the model can run without, by substituting a constant.
#[derive(Debug, Clone, Copy)]
pub struct OptionalInput {
    pub def: VariableDef,
    pub default: f64,
}

/// Record of one applied default substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub variable: &'static str,
    pub value: f64,
}

macro_rules! var {
    ($name:expr, $unit:expr, $desc:expr) => {
        VariableDef {
            name: $name,
            unit: $unit,
            description: $desc,
        }
    };
}

/// Inputs the daily ET pipeline cannot run without (any version).
pub const ET_LOOK_REQUIRED: &[VariableDef] = &[
    var!("ndvi", "-", "normalized difference vegetation index"),
    var!("p_24", "mm/day", "daily precipitation"),
    var!("ra_flat_24", "W/m^2", "daily incoming shortwave radiation on a flat surface"),
    var!("t_air_24", "C", "daily mean air temperature"),
    var!("p_air_24", "mbar", "daily mean air pressure at surface level"),
    var!("vp_24", "mbar", "daily mean vapour pressure"),
    var!("u2m_24", "m/s", "daily mean eastward wind at 2 m"),
    var!("v2m_24", "m/s", "daily mean northward wind at 2 m"),
    var!("r0", "-", "surface albedo"),
    var!("t_amp", "K", "yearly amplitude of the air temperature"),
    var!("se_root", "-", "root-zone soil-moisture saturation (from the se_root pipeline)"),
];

/// Additional required inputs for [`EtLookVersion::V3`].
pub const ET_LOOK_REQUIRED_V3: &[VariableDef] = &[
    var!("t_air_min_24", "C", "daily minimum air temperature"),
    var!("t_air_max_24", "C", "daily maximum air temperature"),
];

/// Optional ET inputs with their documented constant defaults.
pub const ET_LOOK_OPTIONAL: &[OptionalInput] = &[
    OptionalInput {
        def: var!("rs_min", "s/m", "minimum stomatal resistance"),
        default: 100.0,
    },
    OptionalInput {
        def: var!("land_mask", "-", "land use classification (0 none, 1 land, 2 water, 3 urban)"),
        default: 1.0,
    },
    OptionalInput {
        def: var!("z_obst_max", "m", "maximum obstacle height"),
        default: 3.0,
    },
    OptionalInput {
        def: var!("z_oro", "m", "orographic roughness"),
        default: 0.001,
    },
];

/// Inputs the instantaneous soil-moisture pipeline cannot run without.
pub const SE_ROOT_REQUIRED: &[VariableDef] = &[
    var!("ndvi", "-", "normalized difference vegetation index"),
    var!("lst", "K", "land surface temperature at overpass time"),
    var!("t_air_i", "C", "instantaneous air temperature"),
    var!("qv_i", "kg/kg", "instantaneous specific humidity"),
    var!("p_air_i", "kPa", "instantaneous air pressure at surface level"),
    var!("p_air_0_i", "kPa", "instantaneous air pressure at sea level"),
    var!("u2m_i", "m/s", "instantaneous eastward wind at 2 m"),
    var!("v2m_i", "m/s", "instantaneous northward wind at 2 m"),
    var!("wv_i", "g/cm^2", "instantaneous total column water vapour"),
];

/// Optional soil-moisture inputs with defaults.
pub const SE_ROOT_OPTIONAL: &[OptionalInput] = &[OptionalInput {
    def: var!("aod550_i", "-", "aerosol optical depth at 550 nm"),
    default: 0.1,
}];

/// Attributes for fields computed by the pipelines, used to annotate output
/// containers. Not exhaustive for intermediates that never leave a run.
const DERIVED: &[VariableDef] = &[
    var!("doy", "-", "day of year"),
    var!("dtime", "hour", "decimal time of day"),
    var!("lat", "deg", "latitude"),
    var!("lon", "deg", "longitude"),
    var!("lat_rad", "rad", "latitude"),
    var!("lon_rad", "rad", "longitude"),
    var!("decl", "rad", "solar declination"),
    var!("iesd", "-", "inverse earth-sun distance"),
    var!("sc", "hour", "seasonal correction of solar time"),
    var!("ha", "rad", "hour angle"),
    var!("ws", "rad", "sunset hour angle"),
    var!("ra_toa_flat_24", "W/m^2", "daily top-of-atmosphere radiation, flat surface"),
    var!("trans_24", "-", "daily atmospheric transmissivity"),
    var!("vc", "-", "vegetation cover fraction"),
    var!("lai", "-", "leaf area index"),
    var!("lai_eff", "-", "effective leaf area index"),
    var!("sf_soil", "-", "soil fraction of the surface energy balance"),
    var!("stress_rad", "-", "radiation stress factor"),
    var!("stress_vpd", "-", "vapour pressure deficit stress factor"),
    var!("stress_temp", "-", "temperature stress factor"),
    var!("stress_moist", "-", "soil moisture stress factor"),
    var!("svp_24", "mbar", "daily saturated vapour pressure"),
    var!("vpd_24", "mbar", "daily vapour pressure deficit"),
    var!("t_air_k_24", "K", "daily mean air temperature"),
    var!("lh_24", "J/kg", "daily latent heat of vaporization"),
    var!("psy_24", "mbar/K", "daily psychrometric constant"),
    var!("ssvp_24", "mbar/K", "daily slope of the saturated vapour pressure curve"),
    var!("ad_24", "kg/m^3", "daily air density"),
    var!("u_24", "m/s", "daily wind speed at observation height"),
    var!("u_b_24", "m/s", "daily wind speed at blending height"),
    var!("l_net", "W/m^2", "daily net longwave radiation"),
    var!("rn_24", "W/m^2", "daily net radiation"),
    var!("rn_24_canopy", "W/m^2", "daily net radiation of the canopy"),
    var!("rn_24_soil", "W/m^2", "daily net radiation of the soil"),
    var!("rn_24_grass", "W/m^2", "daily net radiation of a reference grass surface"),
    var!("r_canopy_0", "s/m", "canopy resistance without moisture stress"),
    var!("r_canopy", "s/m", "canopy resistance"),
    var!("r_soil", "s/m", "soil resistance"),
    var!("z0m", "m", "roughness length for momentum"),
    var!("disp", "m", "displacement height"),
    var!("z_obst", "m", "obstacle height"),
    var!("g0_24", "W/m^2", "daily soil heat flux"),
    var!("t_24", "W/m^2", "daily transpiration energy flux"),
    var!("t_24_mm", "mm/day", "daily transpiration"),
    var!("e_24", "W/m^2", "daily evaporation energy flux"),
    var!("e_24_mm", "mm/day", "daily evaporation"),
    var!("int_mm", "mm/day", "daily interception"),
    var!("aeti_24_mm", "mm/day", "daily actual evapotranspiration and interception"),
    var!("et_ref_24", "W/m^2", "daily reference evapotranspiration energy flux"),
    var!("et_ref_24_mm", "mm/day", "daily reference evapotranspiration"),
    var!("u_i", "m/s", "instantaneous wind speed at observation height"),
    var!("vp_i", "mbar", "instantaneous vapour pressure"),
    var!("svp_i", "mbar", "instantaneous saturated vapour pressure"),
    var!("vpd_i", "mbar", "instantaneous vapour pressure deficit"),
    var!("t_air_k_i", "K", "instantaneous air temperature"),
    var!("ad_i", "kg/m^3", "instantaneous air density"),
    var!("p_air_i_mbar", "mbar", "instantaneous air pressure at surface level"),
    var!("p_air_0_i_mbar", "mbar", "instantaneous air pressure at sea level"),
    var!("ra_hor_clear_i", "W/m^2", "instantaneous clear-sky radiation on a horizontal surface"),
    var!("emiss_atm_i", "-", "instantaneous atmospheric emissivity"),
    var!("t_wet_i", "C", "instantaneous wet-bulb temperature"),
    var!("t_wet_k_i", "K", "instantaneous wet-bulb temperature"),
    var!("lst_max", "K", "maximum temperature under dry conditions"),
    var!("lst_min", "K", "minimum temperature under wet conditions"),
    var!("lst_zone_mean", "K", "zone-averaged land surface temperature"),
    var!("se_root", "-", "root-zone soil-moisture saturation"),
];

/// Look up attributes for a known input or derived variable.
pub fn attrs(name: &str) -> Option<&'static VariableDef> {
    ET_LOOK_REQUIRED
        .iter()
        .chain(ET_LOOK_REQUIRED_V3)
        .chain(SE_ROOT_REQUIRED)
        .chain(ET_LOOK_OPTIONAL.iter().map(|o| &o.def))
        .chain(SE_ROOT_OPTIONAL.iter().map(|o| &o.def))
        .chain(DERIVED)
        .find(|v| v.name == name)
}

/// The required input set of the ET pipeline for a given version.
pub fn et_look_required(version: EtLookVersion) -> Vec<&'static VariableDef> {
    let mut required: Vec<_> = ET_LOOK_REQUIRED.iter().collect();
    if version == EtLookVersion::V3 {
        required.extend(ET_LOOK_REQUIRED_V3);
    }
    required
}

/// Fail fast if any required input is absent from the container.
pub fn check_required(
    container: &ModelContainer,
    required: &[&VariableDef],
    pipeline: &'static str,
) -> EtLookResult<()> {
    for def in required {
        if !container.contains(def.name) {
            return Err(EtLookError::MissingRequiredInput {
                variable: def.name.to_string(),
                pipeline,
            });
        }
    }
    Ok(())
}

/// Insert constant defaults for absent optional inputs.
///
/// Every substitution is logged and returned so callers can surface them.
pub fn substitute_defaults(
    container: &mut ModelContainer,
    optional: &[OptionalInput],
) -> Vec<Substitution> {
    let mut applied = Vec::new();
    for opt in optional {
        if !container.contains(opt.def.name) {
            log::warn!(
                "input `{}` not provided, using default {} {}",
                opt.def.name,
                opt.default,
                opt.def.unit
            );
            container.insert_constant(opt.def.name, opt.default);
            applied.push(Substitution {
                variable: opt.def.name,
                value: opt.default,
            });
        }
    }
    applied
}
