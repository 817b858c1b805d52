// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pipeline tests against a mock calibration engine.

use std::{
    cell::{Cell, RefCell},
    fs::File,
    path::{Path, PathBuf},
};

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use super::*;
use crate::{
    engine::{CalibrationEngine, EngineError, StandardCatalog},
    sources::{CalibratorSource, KnownCalibrator},
};

/// An engine that records every request and witnesses solves by touching
/// the requested table file.
struct MockEngine {
    spw_ids: Vec<usize>,
    spw_ref_freqs_hz: Vec<f64>,
    channel_range_hz: (f64, f64),

    /// When false, solves "succeed" without writing their table.
    create_tables: Cell<bool>,
    flux_scale_coefficients: Vec<f64>,

    solves: RefCell<Vec<(String, SolveRequest)>>,
    applies: RefCell<Vec<ApplyRequest>>,
    injections: RefCell<Vec<ModelInjection>>,
    removed: RefCell<Vec<PathBuf>>,
    clips: RefCell<Vec<(PathBuf, f64, f64)>>,
}

impl MockEngine {
    fn new() -> MockEngine {
        MockEngine {
            spw_ids: vec![0, 1, 2, 3, 4, 5],
            spw_ref_freqs_hz: vec![1.1e9, 1.2e9, 1.3e9, 1.4e9, 1.5e9, 1.6e9],
            channel_range_hz: (1.0e9, 2.0e9),
            create_tables: Cell::new(true),
            flux_scale_coefficients: vec![1.0, -0.5, 0.1],
            solves: RefCell::new(vec![]),
            applies: RefCell::new(vec![]),
            injections: RefCell::new(vec![]),
            removed: RefCell::new(vec![]),
            clips: RefCell::new(vec![]),
        }
    }

    fn touch(&self, table: &Path) -> Result<(), EngineError> {
        if self.create_tables.get() {
            File::create(table)?;
        }
        Ok(())
    }
}

impl StandardCatalog for MockEngine {
    fn lookup_standard_coefficients(
        &self,
        source_name: &str,
        _standard: Standard,
        epoch: &str,
    ) -> Result<CatalogCoefficients, EngineError> {
        if source_name == "3C286" && epoch == "2017" {
            Ok(CatalogCoefficients {
                coefficients: vec![1.2481, -0.4507, -0.1798, 0.0357],
                errors: vec![0.0045, 0.0031, 0.0011, 0.0009],
            })
        } else {
            Ok(CatalogCoefficients {
                coefficients: vec![],
                errors: vec![],
            })
        }
    }
}

impl CalibrationEngine for MockEngine {
    fn solve_cross_hand_delay(&self, request: &SolveRequest) -> Result<(), EngineError> {
        self.touch(&request.table)?;
        self.solves
            .borrow_mut()
            .push(("kcross".to_string(), request.clone()));
        Ok(())
    }

    fn solve_leakage(&self, request: &SolveRequest, pol_type: &str) -> Result<(), EngineError> {
        self.touch(&request.table)?;
        self.solves
            .borrow_mut()
            .push((pol_type.to_string(), request.clone()));
        Ok(())
    }

    fn solve_pol_angle(&self, request: &SolveRequest, pol_type: &str) -> Result<(), EngineError> {
        self.touch(&request.table)?;
        self.solves
            .borrow_mut()
            .push((pol_type.to_string(), request.clone()));
        Ok(())
    }

    fn apply_calibration(&self, request: &ApplyRequest) -> Result<(), EngineError> {
        self.applies.borrow_mut().push(request.clone());
        Ok(())
    }

    fn inject_model(&self, request: &ModelInjection) -> Result<(), EngineError> {
        self.injections.borrow_mut().push(request.clone());
        Ok(())
    }

    fn transfer_flux_scale(&self, request: &FluxScaleRequest) -> Result<Vec<f64>, EngineError> {
        self.touch(&request.flux_table)?;
        Ok(self.flux_scale_coefficients.clone())
    }

    fn remove_table(&self, table: &Path) -> Result<(), EngineError> {
        if table.exists() {
            std::fs::remove_file(table)?;
        }
        self.removed.borrow_mut().push(table.to_path_buf());
        Ok(())
    }

    fn spw_ref_freqs_hz(&self, _dataset: &Path) -> Result<Vec<f64>, EngineError> {
        Ok(self.spw_ref_freqs_hz.clone())
    }

    fn channel_freq_range_hz(&self, _dataset: &Path) -> Result<(f64, f64), EngineError> {
        Ok(self.channel_range_hz)
    }

    fn spw_ids(&self, _dataset: &Path) -> Result<Vec<usize>, EngineError> {
        Ok(self.spw_ids.clone())
    }

    fn field_id(&self, _dataset: &Path, _field: &str) -> Result<usize, EngineError> {
        Ok(2)
    }

    fn clip_flag_outside(&self, table: &Path, clip_min: f64, clip_max: f64) {
        self.clips
            .borrow_mut()
            .push((table.to_path_buf(), clip_min, clip_max));
    }
}

fn test_config(dataset: PathBuf) -> PolCalConfig {
    PolCalConfig {
        dataset,
        pol_angle_field: "3C286".to_string(),
        leakage_field: "J1407+2827".to_string(),
        target: "NGC1275".to_string(),
        ref_ant: "ea10".to_string(),
        nu_0_hz: Some(1.0e9),
        ..Default::default()
    }
}

fn test_setup() -> (TempDir, PathBuf, MockEngine) {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("obs.ms");
    (dir, dataset, MockEngine::new())
}

#[test]
fn metadata_is_derived_from_the_dataset() {
    let (_dir, dataset, engine) = test_setup();
    let config = PolCalConfig {
        nu_0_hz: None,
        ..test_config(dataset)
    };
    let pipeline = PolCalPipeline::new(config, &engine).unwrap();

    assert_eq!(pipeline.spw_ids(), &[0, 1, 2, 3, 4, 5]);
    // The median of an even number of reference frequencies.
    assert_abs_diff_eq!(pipeline.nu_0_hz(), 1.35e9);
    assert_abs_diff_eq!(pipeline.nu_min_hz(), 1.0e9);
    assert_abs_diff_eq!(pipeline.nu_max_hz(), 2.0e9);
    assert_eq!(pipeline.stage(), Stage::Uninitialized);
}

#[test]
fn explicit_config_values_are_kept() {
    let (_dir, dataset, engine) = test_setup();
    let config = PolCalConfig {
        spw_ids: Some(vec![2, 3]),
        nu_min_hz: Some(1.2e9),
        ..test_config(dataset)
    };
    let pipeline = PolCalPipeline::new(config, &engine).unwrap();
    assert_eq!(pipeline.spw_ids(), &[2, 3]);
    assert_abs_diff_eq!(pipeline.nu_0_hz(), 1.0e9);
    assert_abs_diff_eq!(pipeline.nu_min_hz(), 1.2e9);
    assert_abs_diff_eq!(pipeline.nu_max_hz(), 2.0e9);
}

#[test]
fn empty_spw_ids_are_rejected() {
    let (_dir, dataset, engine) = test_setup();
    let config = PolCalConfig {
        spw_ids: Some(vec![]),
        ..test_config(dataset)
    };
    assert!(matches!(
        PolCalPipeline::new(config, &engine),
        Err(CalibrateError::EmptySpwIds(_))
    ));
}

#[test]
fn stage_ordering_is_enforced() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = PolCalPipeline::new(test_config(dataset), &engine).unwrap();

    // No model yet: no solves allowed.
    assert!(matches!(
        pipeline.solve_leakage(&LeakageOptions::default()),
        Err(CalibrateError::StageOrder {
            required: Stage::ModelSet,
            ..
        })
    ));
    assert!(matches!(
        pipeline.solve_cross_hand_delays(&CrossHandDelayOptions::default()),
        Err(CalibrateError::StageOrder { .. })
    ));
    assert!(matches!(
        pipeline.apply_solutions(&ApplyOptions::default()),
        Err(CalibrateError::StageOrder {
            required: Stage::PolAngleSolved,
            ..
        })
    ));
    assert!(engine.solves.borrow().is_empty());
    assert!(engine.applies.borrow().is_empty());
}

#[test]
fn known_model_injects_catalog_and_polarization_coefficients() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = PolCalPipeline::new(test_config(dataset), &engine).unwrap();
    let mut source = CalibratorSource::known(KnownCalibrator::ThreeC286);

    pipeline
        .set_known_model(&mut source, "3C286", Standard::PerleyButler2017, "2017", 2, 2)
        .unwrap();
    assert_eq!(pipeline.stage(), Stage::ModelSet);

    let injections = engine.injections.borrow();
    assert_eq!(injections.len(), 1);
    let injection = &injections[0];
    assert_eq!(injection.field, "3C286");
    // At 1 GHz the catalog polynomial collapses to its constant term.
    assert_abs_diff_eq!(injection.flux_density[0], 10.0_f64.powf(1.2481), epsilon = 1e-9);
    assert_eq!(injection.flux_density[1..], [0.0, 0.0, 0.0]);
    assert_eq!(injection.spectral_idx.len(), 2);
    assert!(injection.spectral_idx[0] < 0.0);
    assert_abs_diff_eq!(injection.ref_freq_hz, 1.0e9);
    assert!(injection.scale_by_channel);

    let fraction = injection.pol_fraction_coefficients.as_ref().unwrap();
    assert_eq!(fraction.len(), 2);
    assert!(fraction[0] >= 0.086 && fraction[0] <= 0.126);
    assert!(injection.pol_angle_coefficients.is_some());
}

#[test]
fn unknown_model_transfers_the_flux_scale() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = PolCalPipeline::new(test_config(dataset.clone()), &engine).unwrap();
    let mut source = CalibratorSource::empty();

    let flux_table = pipeline
        .set_unknown_model(
            &mut source,
            "NGC1275",
            &dataset.with_extension("G0"),
            "3C286",
            "NGC1275",
            1,
        )
        .unwrap();
    assert_eq!(flux_table, dataset.with_extension("F.NGC1275"));
    assert!(flux_table.exists());
    assert_eq!(pipeline.stage(), Stage::ModelSet);

    let injections = engine.injections.borrow();
    let injection = &injections[0];
    // Transferred coefficients [1.0, -0.5, 0.1]: intensity 10^1, the rest
    // are index and curvature.
    assert_abs_diff_eq!(injection.flux_density[0], 10.0);
    assert_eq!(injection.spectral_idx, vec![-0.5, 0.1]);
    assert!(injection.pol_fraction_coefficients.is_none());
    assert!(injection.pol_angle_coefficients.is_none());
    assert_eq!(
        source.catalog_coefficients().unwrap().coefficients,
        vec![1.0, -0.5, 0.1]
    );
}

/// Walks a pipeline to ModelSet without the fitting machinery.
fn model_set<'a>(
    engine: &'a MockEngine,
    dataset: PathBuf,
    config: Option<PolCalConfig>,
) -> PolCalPipeline<'a, MockEngine> {
    let mut pipeline =
        PolCalPipeline::new(config.unwrap_or_else(|| test_config(dataset.clone())), engine)
            .unwrap();
    let mut source = CalibratorSource::empty();
    pipeline
        .set_unknown_model(
            &mut source,
            "NGC1275",
            &dataset.with_extension("G0"),
            "3C286",
            "NGC1275",
            1,
        )
        .unwrap();
    pipeline
}

#[test]
fn cross_hand_delay_solve_spans_all_spws_combined() {
    let (_dir, dataset, engine) = test_setup();
    let config = PolCalConfig {
        kcross_ref_ant: "ea20".to_string(),
        ..test_config(dataset.clone())
    };
    let mut pipeline = model_set(&engine, dataset.clone(), Some(config));

    let table = pipeline
        .solve_cross_hand_delays(&CrossHandDelayOptions {
            channels: "13~115".to_string(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(table, dataset.with_extension("Kcross"));
    assert!(table.exists());
    assert_eq!(pipeline.stage(), Stage::CrossHandDelaySolved);

    let solves = engine.solves.borrow();
    let (_, request) = solves.last().unwrap();
    assert_eq!(request.spw, "0~5:13~115");
    assert_eq!(request.combine, "scan,spw");
    assert_eq!(request.field, "3C286");
    assert_eq!(request.ref_ant, "ea20");
    assert_eq!(request.ref_ant_mode.as_deref(), Some("strict"));
    assert!(request.gain_tables.is_empty());
    assert!(request.spw_maps.is_empty());
}

#[test]
fn leakage_chains_the_cross_hand_table_with_a_broadcast_map() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset.clone(), None);
    let kcross = pipeline
        .solve_cross_hand_delays(&CrossHandDelayOptions::default())
        .unwrap();

    let leakage = pipeline.solve_leakage(&LeakageOptions::default()).unwrap();
    assert_eq!(leakage, dataset.with_extension("D0"));
    assert_eq!(pipeline.stage(), Stage::LeakageSolved);

    let solves = engine.solves.borrow();
    let (pol_type, request) = solves.last().unwrap();
    assert_eq!(pol_type, "Df");
    assert_eq!(request.field, "J1407+2827");
    assert_eq!(request.spw, "0~5");
    assert_eq!(request.combine, "scan");
    assert_eq!(request.gain_tables, vec![kcross]);
    assert_eq!(request.gain_fields, vec![String::new()]);
    assert_eq!(request.spw_maps, vec![SpwMap(vec![0; 6])]);
    assert_eq!(request.interp, vec![InterpMode::Linear]);

    // The default post-solve clip filter ran with the default range.
    let clips = engine.clips.borrow();
    assert_eq!(clips.len(), 1);
    assert_eq!(clips[0], (dataset.with_extension("D0"), 0.0, 0.25));
}

#[test]
fn leakage_for_an_explicit_field_names_its_own_table() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset.clone(), None);

    let table = pipeline
        .solve_leakage(&LeakageOptions {
            field: "NGC1275".to_string(),
            flag_clip: false,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(table, dataset.with_extension("D.NGC1275"));
    assert!(engine.clips.borrow().is_empty());
}

#[test]
fn apply_composes_the_two_table_chain_without_a_cross_hand_solve() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset.clone(), None);

    // No cross-hand delay solved: the leakage solve has no upstream chain.
    let leakage = pipeline.solve_leakage(&LeakageOptions::default()).unwrap();
    {
        let solves = engine.solves.borrow();
        let (_, request) = solves.last().unwrap();
        assert!(request.gain_tables.is_empty());
        assert!(request.spw_maps.is_empty());
        assert!(request.interp.is_empty());
    }

    let pol_angle = pipeline.solve_pol_angle(&PolAngleOptions::default()).unwrap();
    assert_eq!(pol_angle, dataset.with_extension("X0"));
    {
        let solves = engine.solves.borrow();
        let (pol_type, request) = solves.last().unwrap();
        assert_eq!(pol_type, "Xf");
        assert_eq!(request.field, "3C286");
        assert_eq!(request.gain_tables, vec![leakage.clone()]);
        assert_eq!(request.spw_maps, vec![SpwMap(vec![0; 6])]);
    }

    pipeline.apply_solutions(&ApplyOptions::default()).unwrap();
    assert_eq!(pipeline.stage(), Stage::Applied);

    let applies = engine.applies.borrow();
    assert_eq!(applies.len(), 1);
    let apply = &applies[0];
    assert_eq!(apply.gain_tables.as_slice(), [leakage, pol_angle]);
    assert_eq!(apply.interp, vec![InterpMode::EngineDefault; 2]);
    assert_eq!(apply.spw_maps, vec![SpwMap(vec![0; 6]), SpwMap::identity()]);
    assert_eq!(apply.cal_wt, vec![false, false]);
    assert_eq!(apply.field, "");
    assert_eq!(apply.spw, "0~5");
    assert_eq!(apply.antenna, "*&*");
    assert_eq!(apply.apply_mode, "calflagstrict");
    assert!(apply.parallactic_angle);
    assert!(apply.select_data);
}

#[test]
fn apply_chains_all_three_tables_after_a_cross_hand_solve() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset, None);
    let kcross = pipeline
        .solve_cross_hand_delays(&CrossHandDelayOptions::default())
        .unwrap();
    let leakage = pipeline.solve_leakage(&LeakageOptions::default()).unwrap();
    let pol_angle = pipeline.solve_pol_angle(&PolAngleOptions::default()).unwrap();

    // The angle solve depends on both earlier tables.
    {
        let solves = engine.solves.borrow();
        let (_, request) = solves.last().unwrap();
        assert_eq!(request.gain_tables, vec![kcross.clone(), leakage.clone()]);
        assert_eq!(
            request.spw_maps,
            vec![SpwMap(vec![0; 6]), SpwMap::identity()]
        );
    }

    pipeline.apply_solutions(&ApplyOptions::default()).unwrap();
    let applies = engine.applies.borrow();
    let apply = &applies[0];
    assert_eq!(apply.gain_tables.as_slice(), [kcross, leakage, pol_angle]);
    assert_eq!(apply.interp.len(), 3);
    assert_eq!(
        apply.spw_maps,
        vec![SpwMap(vec![0; 6]), SpwMap::identity(), SpwMap::identity()]
    );
}

#[test]
fn legacy_instrument_disables_spw_selection_and_mapping() {
    let (_dir, dataset, engine) = test_setup();
    let config = PolCalConfig {
        old_instrument: true,
        ..test_config(dataset.clone())
    };
    let mut pipeline = model_set(&engine, dataset, Some(config));
    pipeline
        .solve_cross_hand_delays(&CrossHandDelayOptions::default())
        .unwrap();
    pipeline.solve_leakage(&LeakageOptions::default()).unwrap();

    {
        let solves = engine.solves.borrow();
        let (_, request) = solves.last().unwrap();
        assert_eq!(request.spw, "");
        assert!(request.spw_maps.is_empty());
        assert_eq!(request.interp, vec![InterpMode::Nearest]);
    }

    pipeline.solve_pol_angle(&PolAngleOptions::default()).unwrap();
    pipeline.apply_solutions(&ApplyOptions::default()).unwrap();
    let applies = engine.applies.borrow();
    let apply = &applies[0];
    assert_eq!(apply.spw, "");
    assert!(apply.spw_maps.is_empty());
    assert_eq!(apply.interp, vec![InterpMode::Nearest; 3]);
    assert_eq!(apply.cal_wt, vec![false]);
    assert_eq!(apply.antenna, "");
    assert!(!apply.select_data);
}

#[test]
fn a_missing_table_after_a_solve_is_fatal() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset, None);
    engine.create_tables.set(false);

    let result = pipeline.solve_leakage(&LeakageOptions::default());
    match result {
        Err(CalibrateError::MissingArtifact { stage, .. }) => assert_eq!(stage, "leakage"),
        other => panic!("expected MissingArtifact, got {other:?}"),
    }
    // The failed stage left no table behind and the stage did not advance.
    assert_eq!(pipeline.stage(), Stage::ModelSet);
    assert!(pipeline.leakage_table().is_none());
}

#[test]
fn a_stale_table_is_removed_before_re_solving() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset.clone(), None);

    let stale = dataset.with_extension("Kcross");
    File::create(&stale).unwrap();
    pipeline
        .solve_cross_hand_delays(&CrossHandDelayOptions::default())
        .unwrap();
    assert!(engine.removed.borrow().contains(&stale));
    assert!(stale.exists());
}

#[test]
fn mismatched_chain_lists_are_rejected() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset.clone(), None);

    let result = pipeline.solve_leakage(&LeakageOptions {
        gain_tables: vec![dataset.with_extension("Kcross")],
        gain_fields: vec!["a".to_string(), "b".to_string()],
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(CalibrateError::MismatchedChainLists {
            num_tables: 1,
            num_other: 2,
            ..
        })
    ));
}

#[test]
fn apply_rejects_spw_maps_not_matching_the_chain() {
    let (_dir, dataset, engine) = test_setup();
    let mut pipeline = model_set(&engine, dataset, None);
    pipeline.solve_leakage(&LeakageOptions::default()).unwrap();
    pipeline.solve_pol_angle(&PolAngleOptions::default()).unwrap();

    // Two tables in the chain, three maps supplied.
    let result = pipeline.apply_solutions(&ApplyOptions {
        spw_maps: vec![SpwMap::identity(); 3],
        ..Default::default()
    });
    assert!(matches!(
        result,
        Err(CalibrateError::MismatchedChainLists {
            num_tables: 2,
            num_other: 3,
            ..
        })
    ));
    assert!(engine.applies.borrow().is_empty());
    assert_eq!(pipeline.stage(), Stage::PolAngleSolved);
}

#[test]
fn single_solution_apply_rejects_spw_maps_not_matching_the_tables() {
    let (_dir, dataset, engine) = test_setup();
    let pipeline = PolCalPipeline::new(test_config(dataset.clone()), &engine).unwrap();

    let mut options = SingleApplyOptions::for_table(dataset.with_extension("D0"));
    options.spw_maps = vec![SpwMap::identity(); 2];
    let result = pipeline.apply_single_solution(&options);
    assert!(matches!(
        result,
        Err(CalibrateError::MismatchedChainLists {
            num_tables: 1,
            num_other: 2,
            ..
        })
    ));
    assert!(engine.applies.borrow().is_empty());
}

#[test]
fn single_solution_apply_passes_selectors_through() {
    let (_dir, dataset, engine) = test_setup();
    let pipeline = PolCalPipeline::new(test_config(dataset.clone()), &engine).unwrap();

    let mut options = SingleApplyOptions::for_table(dataset.with_extension("D0"));
    options.field = "NGC1275".to_string();
    options.spw = "2~3".to_string();
    pipeline.apply_single_solution(&options).unwrap();

    let applies = engine.applies.borrow();
    let apply = &applies[0];
    assert_eq!(apply.field, "NGC1275");
    assert_eq!(apply.spw, "2~3");
    assert_eq!(apply.gain_tables.as_slice(), [dataset.with_extension("D0")]);
    assert_eq!(apply.interp, vec![InterpMode::Linear]);
    assert_eq!(apply.cal_wt, vec![false]);
}

#[test]
fn config_frequencies_parse_with_units() {
    let config: PolCalConfig = serde_json::from_str(
        r#"{
            "dataset": "obs.ms",
            "nu_0_hz": "1.4GHz",
            "nu_min_hz": 1.0e9,
            "nu_max_hz": "2000MHz"
        }"#,
    )
    .unwrap();
    assert_abs_diff_eq!(config.nu_0_hz.unwrap(), 1.4e9);
    assert_abs_diff_eq!(config.nu_min_hz.unwrap(), 1.0e9);
    assert_abs_diff_eq!(config.nu_max_hz.unwrap(), 2.0e9);

    let result = serde_json::from_str::<PolCalConfig>(r#"{"nu_0_hz": "fast"}"#);
    assert!(result.is_err());
}

#[test]
fn table_names_derive_from_the_dataset_stem() {
    let dataset = Path::new("/data/obs.ms");
    assert_eq!(
        table::cross_hand_delay(dataset).unwrap().path(),
        Path::new("/data/obs.Kcross")
    );
    assert_eq!(
        table::leakage(dataset, None).unwrap().path(),
        Path::new("/data/obs.D0")
    );
    assert_eq!(
        table::leakage(dataset, Some("3C48")).unwrap().path(),
        Path::new("/data/obs.D.3C48")
    );
    assert_eq!(
        table::pol_angle(dataset).unwrap().path(),
        Path::new("/data/obs.X0")
    );
    assert_eq!(
        table::flux_scale(dataset, "NGC1275").unwrap().path(),
        Path::new("/data/obs.F.NGC1275")
    );

    assert!(matches!(
        table::cross_hand_delay(Path::new("")),
        Err(CalibrateError::BadDatasetName(_))
    ));
}
