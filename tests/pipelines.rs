//! End-to-end runs of both pipelines on small synthetic scenes.

use etlook::{
    et_look, se_root, EtLookError, EtLookVersion, ExportSelection, Grid, ModelContainer,
    Parameters, SeRootVersion,
};
use ndarray::{array, Array1, ArrayD, IxDyn};

fn spatial_axis(n: usize, start: f64) -> Array1<f64> {
    Array1::linspace(start, start + 0.01 * (n - 1) as f64, n)
}

fn instantaneous_container(ny: usize, nx: usize) -> ModelContainer {
    let grid = Grid::new(
        array![190.0],
        array![10.75],
        spatial_axis(ny, 30.0),
        spatial_axis(nx, 31.0),
    )
    .unwrap();
    let mut c = ModelContainer::new(grid);
    c.insert_constant("ndvi", 0.45);
    c.insert_constant("t_air_i", 27.0);
    c.insert_constant("qv_i", 0.010);
    c.insert_constant("p_air_i", 99.8);
    c.insert_constant("p_air_0_i", 101.3);
    c.insert_constant("u2m_i", 2.0);
    c.insert_constant("v2m_i", 1.0);
    c.insert_constant("wv_i", 2.0);
    c
}

fn daily_container(ny: usize, nx: usize) -> ModelContainer {
    let grid = Grid::daily(array![190.0], spatial_axis(ny, 30.0), spatial_axis(nx, 31.0));
    let mut c = ModelContainer::new(grid);
    c.insert_constant("ndvi", 0.45);
    c.insert_constant("p_24", 2.0);
    c.insert_constant("ra_flat_24", 270.0);
    c.insert_constant("t_air_24", 25.0);
    c.insert_constant("p_air_24", 998.0);
    c.insert_constant("vp_24", 17.0);
    c.insert_constant("u2m_24", 2.0);
    c.insert_constant("v2m_24", 1.0);
    c.insert_constant("r0", 0.21);
    c.insert_constant("t_amp", 10.0);
    c
}

/// Spatially varying LST: hottest in the corner, coolest opposite.
fn lst_gradient(ny: usize, nx: usize) -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[1, ny, nx]), |idx| {
        300.0 + 18.0 * (idx[1] + idx[2]) as f64 / (ny + nx - 2) as f64
    })
}

#[test]
fn soil_moisture_feeds_the_daily_pipeline() {
    let ny = 10;
    let nx = 10;

    let mut inst = instantaneous_container(ny, nx);
    inst.insert("lst", lst_gradient(ny, nx)).unwrap();
    let (sm_output, sm_report) = se_root::run(
        &mut inst,
        SeRootVersion::V2,
        &Parameters::default(),
        &ExportSelection::Default,
    )
    .unwrap();
    assert!(sm_report.skipped.is_empty(), "{:?}", sm_report.skipped);

    let se_root_field = sm_output.expect_array("se_root").clone();
    for &se in se_root_field.iter() {
        assert!((0.0..=1.0).contains(&se), "se_root out of range: {se}");
    }
    // The hot corner must be drier than the cool one.
    assert!(se_root_field[[0, 0, 0]] > se_root_field[[0, ny - 1, nx - 1]]);

    let mut daily = daily_container(ny, nx);
    daily.insert("se_root", se_root_field).unwrap();
    let (et_output, et_report) = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::Default,
    )
    .unwrap();
    assert!(et_report.skipped.is_empty(), "{:?}", et_report.skipped);

    let aeti = et_output.expect_array("aeti_24_mm");
    for &v in aeti.iter() {
        assert!((0.0..15.0).contains(&v), "AETI out of range: {v}");
    }
    // Drier pixels evaporate less.
    assert!(aeti[[0, 0, 0]] > aeti[[0, ny - 1, nx - 1]]);
}

#[test]
fn missing_optional_inputs_are_reported_not_fatal() {
    let mut daily = daily_container(4, 4);
    daily.insert_constant("se_root", 0.5);
    let (_, report) = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::Default,
    )
    .unwrap();

    let substituted: Vec<_> = report.substituted.iter().map(|s| s.variable).collect();
    for name in ["rs_min", "land_mask", "z_obst_max", "z_oro"] {
        assert!(substituted.contains(&name), "{name} not substituted");
    }
}

#[test]
fn missing_required_input_fails_before_any_step_runs() {
    let grid = Grid::daily(array![190.0], spatial_axis(3, 30.0), spatial_axis(3, 31.0));
    let mut c = ModelContainer::new(grid);
    c.insert_constant("ndvi", 0.5);

    let err = et_look::run(
        &mut c,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::Default,
    )
    .unwrap_err();
    assert!(matches!(err, EtLookError::MissingRequiredInput { .. }));
    // Nothing beyond the inputs and coordinates was added.
    assert!(!c.contains("decl"));
}

#[test]
fn custom_export_rejects_unknown_names() {
    let mut daily = daily_container(3, 3);
    daily.insert_constant("se_root", 0.5);
    let err = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::Custom(vec!["rn_24".to_string(), "no_such_field".to_string()]),
    )
    .unwrap_err();
    assert!(matches!(err, EtLookError::UnknownExportVariable(name) if name == "no_such_field"));
}

#[test]
fn custom_export_returns_exactly_the_requested_fields() {
    let mut daily = daily_container(3, 3);
    daily.insert_constant("se_root", 0.5);
    let (output, _) = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::Custom(vec!["rn_24".to_string(), "g0_24".to_string()]),
    )
    .unwrap();
    let names: Vec<_> = output.names().collect();
    assert_eq!(names, vec!["rn_24", "g0_24"]);
}

#[test]
fn nan_gaps_propagate_per_pixel_without_spreading() {
    let ny = 4;
    let nx = 4;
    let mut ndvi = ArrayD::from_elem(IxDyn(&[1, ny, nx]), 0.45);
    ndvi[[0, 2, 2]] = f64::NAN;

    let grid = Grid::daily(array![190.0], spatial_axis(ny, 30.0), spatial_axis(nx, 31.0));
    let mut c = ModelContainer::new(grid);
    c.insert("ndvi", ndvi).unwrap();
    c.insert_constant("p_24", 2.0);
    c.insert_constant("ra_flat_24", 270.0);
    c.insert_constant("t_air_24", 25.0);
    c.insert_constant("p_air_24", 998.0);
    c.insert_constant("vp_24", 17.0);
    c.insert_constant("u2m_24", 2.0);
    c.insert_constant("v2m_24", 1.0);
    c.insert_constant("r0", 0.21);
    c.insert_constant("t_amp", 10.0);
    c.insert_constant("se_root", 0.5);

    let (output, _) = et_look::run(
        &mut c,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::Default,
    )
    .unwrap();

    let aeti = output.expect_array("aeti_24_mm");
    assert!(aeti[[0, 2, 2]].is_nan(), "masked pixel must stay undefined");
    assert!(!aeti[[0, 0, 0]].is_nan(), "gap must not spread to valid pixels");
    assert!(!aeti[[0, 2, 1]].is_nan());
}

#[test]
fn parameters_from_toml_change_the_result() {
    let run_with = |params: &Parameters| {
        let mut daily = daily_container(3, 3);
        daily.insert_constant("se_root", 0.5);
        let (output, _) = et_look::run(
            &mut daily,
            EtLookVersion::V2,
            params,
            &ExportSelection::Default,
        )
        .unwrap();
        output.expect_array("t_24_mm")[[0, 1, 1]]
    };

    let default = run_with(&Parameters::default());
    let tenacious = run_with(&Parameters::from_toml_str("tenacity = 3.0").unwrap());
    assert!(
        tenacious > default,
        "less moisture-sensitive vegetation should transpire more: {tenacious} vs {default}"
    );
}

#[test]
fn both_se_root_versions_run_on_the_same_scene() {
    for version in [SeRootVersion::V2, SeRootVersion::Dev] {
        let mut inst = instantaneous_container(6, 6);
        inst.insert("lst", lst_gradient(6, 6)).unwrap();
        let (output, report) = se_root::run(
            &mut inst,
            version,
            &Parameters::default(),
            &ExportSelection::Default,
        )
        .unwrap();
        assert!(report.skipped.is_empty(), "{version:?}: {:?}", report.skipped);
        for &se in output.expect_array("se_root").iter() {
            assert!(
                se.is_nan() || (0.0..=1.0).contains(&se),
                "{version:?} produced {se}"
            );
        }
    }
}

#[test]
fn reruns_on_identical_input_are_bit_identical() {
    let assert_identical = |a: &ModelContainer, b: &ModelContainer| {
        for field in a.iter() {
            let other = b.expect_array(&field.name);
            for (x, y) in field.data.iter().zip(other.iter()) {
                assert_eq!(x.to_bits(), y.to_bits(), "{} diverged between runs", field.name);
            }
        }
    };

    let mut daily = daily_container(5, 5);
    daily.insert_constant("se_root", 0.5);
    let (first, _) = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::All,
    )
    .unwrap();

    // Second pass over the populated container: every field is already
    // present, so nothing is recomputed and nothing changes.
    let (second, report) = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::All,
    )
    .unwrap();
    assert!(report.computed.is_empty(), "{:?}", report.computed);
    assert_identical(&first, &second);

    // A fresh container built the same way lands on the same bits.
    let mut fresh = daily_container(5, 5);
    fresh.insert_constant("se_root", 0.5);
    let (third, _) = et_look::run(
        &mut fresh,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::All,
    )
    .unwrap();
    assert_identical(&first, &third);
}

#[test]
fn all_export_keeps_inputs_and_intermediates() {
    let mut daily = daily_container(3, 3);
    daily.insert_constant("se_root", 0.5);
    let (output, report) = et_look::run(
        &mut daily,
        EtLookVersion::V2,
        &Parameters::default(),
        &ExportSelection::All,
    )
    .unwrap();

    for name in ["ndvi", "trans_24", "rn_24", "t_24", "e_24", "et_ref_24_mm"] {
        assert!(output.contains(name), "missing {name}");
    }
    // Every computed step should appear in the output container.
    for &name in &report.computed {
        assert!(output.contains(name), "computed {name} missing from export");
    }
}
