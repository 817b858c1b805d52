// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The polarization-calibration pipeline.

[`PolCalPipeline`] walks a dataset through the calibration stages in order:
a flux/polarization model is injected for the calibrator fields, then the
cross-hand delay, leakage (D-term) and polarization-angle terms are solved,
each against the tables produced before it, and finally the solved tables
are applied to all fields in one call. Stage ordering is enforced; a solve
whose table does not exist afterwards aborts the run.
 */

mod error;
mod spw;
mod table;
#[cfg(test)]
mod tests;

pub use error::CalibrateError;

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use vec1::Vec1;

use crate::{
    constants::{DEFAULT_LEAKAGE_CLIP_MAX, DEFAULT_LEAKAGE_CLIP_MIN, DEFAULT_MIN_SNR, DEFAULT_SOL_INT},
    engine::{
        ApplyRequest, CalibrationEngine, CatalogCoefficients, FluxScaleRequest, InterpMode,
        ModelInjection, SolveRequest, SpwMap, Standard,
    },
    sources::CalibratorSource,
};

use table::CalTable;

/// Where the pipeline is in its stage sequence. Later stages compare
/// greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum Stage {
    #[strum(serialize = "uninitialized")]
    Uninitialized,

    #[strum(serialize = "model set")]
    ModelSet,

    #[strum(serialize = "cross-hand delay solved")]
    CrossHandDelaySolved,

    #[strum(serialize = "leakage solved")]
    LeakageSolved,

    #[strum(serialize = "polarization angle solved")]
    PolAngleSolved,

    #[strum(serialize = "applied")]
    Applied,
}

/// Everything needed to start a pipeline over one dataset. Frequencies and
/// spectral-window ids left unset are derived from the dataset's metadata
/// at construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolCalConfig {
    pub dataset: PathBuf,

    /// The active spectral-window ids, ascending. Derived from the dataset
    /// if unset.
    pub spw_ids: Option<Vec<usize>>,

    /// Antenna selector passed to every solve; empty means all antennas.
    pub antennas: String,

    /// The field used for the cross-hand delay and polarization-angle
    /// solves.
    pub pol_angle_field: String,

    /// The field used for the leakage solve.
    pub leakage_field: String,

    /// The science target field.
    pub target: String,

    pub ref_ant: String,

    /// A distinct reference antenna for the cross-hand delay solve; falls
    /// back to `ref_ant` when empty.
    pub kcross_ref_ant: String,

    /// The spectral window whose combined-solve solutions are broadcast to
    /// the others.
    pub mapped_spw: usize,

    /// Model reference frequency \[Hz\]; the median spectral-window
    /// reference frequency if unset.
    #[serde(deserialize_with = "deserialize_freq_hz")]
    pub nu_0_hz: Option<f64>,

    /// Lower edge of the band used for the polarization fits \[Hz\].
    #[serde(deserialize_with = "deserialize_freq_hz")]
    pub nu_min_hz: Option<f64>,

    /// Upper edge of the band used for the polarization fits \[Hz\].
    #[serde(deserialize_with = "deserialize_freq_hz")]
    pub nu_max_hz: Option<f64>,

    /// Legacy-instrument data: no per-spw structure, so spw selection and
    /// mapping are disabled and tables are applied with nearest-neighbour
    /// interpolation.
    pub old_instrument: bool,
}

/// Options for the cross-hand delay solve.
#[derive(Debug, Clone)]
pub struct CrossHandDelayOptions {
    pub min_snr: f64,
    pub sol_int: String,

    /// The solve's combine rule; the delay is solved once across the
    /// combined span.
    pub combine: String,

    /// A narrower spw interval than the full span, e.g. `"1~4"`; empty
    /// means the full span.
    pub spw_interval: String,

    /// A channel sub-range, e.g. `"13~115"`, to keep band edges out of the
    /// delay solve; empty means all channels.
    pub channels: String,

    pub ref_ant_mode: Option<String>,
}

impl Default for CrossHandDelayOptions {
    fn default() -> CrossHandDelayOptions {
        CrossHandDelayOptions {
            min_snr: DEFAULT_MIN_SNR,
            sol_int: DEFAULT_SOL_INT.to_string(),
            combine: "scan,spw".to_string(),
            spw_interval: String::new(),
            channels: String::new(),
            ref_ant_mode: Some("strict".to_string()),
        }
    }
}

/// Options for the leakage solve.
#[derive(Debug, Clone)]
pub struct LeakageOptions {
    pub min_snr: f64,
    pub sol_int: String,

    /// The engine's leakage solve type.
    pub pol_type: String,

    /// Explicit upstream gain chain; empty means the default chain derived
    /// from pipeline state.
    pub gain_tables: Vec<PathBuf>,
    pub gain_fields: Vec<String>,
    pub spw_maps: Vec<SpwMap>,

    pub interp_mode: InterpMode,

    /// Explicit spw selector; empty means the full span.
    pub spw: String,

    /// Solve for this field into a `.D.<field>` table instead of the
    /// pipeline's leakage field.
    pub field: String,

    /// Post-solve sanity filter: flag D-term solutions with amplitudes
    /// outside `[clip_min, clip_max]`.
    pub flag_clip: bool,
    pub clip_min: f64,
    pub clip_max: f64,
}

impl Default for LeakageOptions {
    fn default() -> LeakageOptions {
        LeakageOptions {
            min_snr: DEFAULT_MIN_SNR,
            sol_int: DEFAULT_SOL_INT.to_string(),
            pol_type: "Df".to_string(),
            gain_tables: vec![],
            gain_fields: vec![],
            spw_maps: vec![],
            interp_mode: InterpMode::Linear,
            spw: String::new(),
            field: String::new(),
            flag_clip: true,
            clip_min: DEFAULT_LEAKAGE_CLIP_MIN,
            clip_max: DEFAULT_LEAKAGE_CLIP_MAX,
        }
    }
}

/// Options for the polarization-angle solve.
#[derive(Debug, Clone)]
pub struct PolAngleOptions {
    pub min_snr: f64,
    pub sol_int: String,

    /// The engine's angle solve type.
    pub pol_type: String,

    pub gain_tables: Vec<PathBuf>,
    pub gain_fields: Vec<String>,
    pub spw_maps: Vec<SpwMap>,
    pub interp_mode: InterpMode,
    pub spw: String,
    pub field: String,
}

impl Default for PolAngleOptions {
    fn default() -> PolAngleOptions {
        PolAngleOptions {
            min_snr: DEFAULT_MIN_SNR,
            sol_int: DEFAULT_SOL_INT.to_string(),
            pol_type: "Xf".to_string(),
            gain_tables: vec![],
            gain_fields: vec![],
            spw_maps: vec![],
            interp_mode: InterpMode::Linear,
            spw: String::new(),
            field: String::new(),
        }
    }
}

/// Options for the final apply.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub gain_tables: Vec<PathBuf>,
    pub gain_fields: Vec<String>,
    pub spw_maps: Vec<SpwMap>,
    pub apply_mode: String,
    pub antenna: String,
    pub flag_backup: bool,
}

impl Default for ApplyOptions {
    fn default() -> ApplyOptions {
        ApplyOptions {
            gain_tables: vec![],
            gain_fields: vec![],
            spw_maps: vec![],
            apply_mode: "calflagstrict".to_string(),
            antenna: "*&*".to_string(),
            flag_backup: true,
        }
    }
}

/// Options for applying one solution table with caller-supplied selectors.
#[derive(Debug, Clone)]
pub struct SingleApplyOptions {
    pub field: String,
    pub spw: String,
    pub gain_tables: Vec1<PathBuf>,
    pub gain_fields: Vec<String>,
    pub spw_maps: Vec<SpwMap>,
    pub cal_wt: Vec<bool>,
    pub select_data: bool,
    pub apply_mode: String,
    pub interp_mode: InterpMode,
    pub antenna: String,
    pub flag_backup: bool,
}

impl SingleApplyOptions {
    /// The defaults around one mandatory table.
    pub fn for_table(table: PathBuf) -> SingleApplyOptions {
        SingleApplyOptions {
            field: String::new(),
            spw: String::new(),
            gain_tables: Vec1::new(table),
            gain_fields: vec![],
            spw_maps: vec![],
            cal_wt: vec![false],
            select_data: true,
            apply_mode: "calflagstrict".to_string(),
            interp_mode: InterpMode::Linear,
            antenna: String::new(),
            flag_backup: true,
        }
    }
}

/// The stage-by-stage polarization calibration of one dataset.
pub struct PolCalPipeline<'a, E: CalibrationEngine + ?Sized> {
    engine: &'a E,
    config: PolCalConfig,

    spw_ids: Vec<usize>,
    num_spws: usize,
    nu_0_hz: f64,
    nu_min_hz: f64,
    nu_max_hz: f64,

    stage: Stage,
    cross_hand_table: Option<CalTable>,
    leakage_table: Option<CalTable>,
    pol_angle_table: Option<CalTable>,
}

impl<'a, E: CalibrationEngine + ?Sized> PolCalPipeline<'a, E> {
    /// Set up a pipeline over one dataset, deriving any unset frequencies
    /// and spectral-window ids from the dataset's metadata.
    pub fn new(config: PolCalConfig, engine: &'a E) -> Result<PolCalPipeline<'a, E>, CalibrateError> {
        let spw_ids = match &config.spw_ids {
            Some(ids) => ids.clone(),
            None => engine.spw_ids(&config.dataset)?,
        };
        if spw_ids.is_empty() {
            return Err(CalibrateError::EmptySpwIds(config.dataset.clone()));
        }
        let num_spws = spw_ids.len();

        let nu_0_hz = match config.nu_0_hz {
            Some(f) => f,
            None => {
                let ref_freqs = engine.spw_ref_freqs_hz(&config.dataset)?;
                if ref_freqs.is_empty() {
                    return Err(CalibrateError::EmptySpwIds(config.dataset.clone()));
                }
                median(&ref_freqs)
            }
        };
        let (nu_min_hz, nu_max_hz) = match (config.nu_min_hz, config.nu_max_hz) {
            (Some(min), Some(max)) => (min, max),
            (min, max) => {
                let (derived_min, derived_max) = engine.channel_freq_range_hz(&config.dataset)?;
                (min.unwrap_or(derived_min), max.unwrap_or(derived_max))
            }
        };

        info!("Polarization calibration of {}", config.dataset.display());
        info!("Number of spectral windows: {num_spws}");
        info!("Reference freq: {} GHz", nu_0_hz / crate::constants::HZ_PER_GHZ);
        info!("Minimum freq: {} GHz", nu_min_hz / crate::constants::HZ_PER_GHZ);
        info!("Maximum freq: {} GHz", nu_max_hz / crate::constants::HZ_PER_GHZ);

        Ok(PolCalPipeline {
            engine,
            config,
            spw_ids,
            num_spws,
            nu_0_hz,
            nu_min_hz,
            nu_max_hz,
            stage: Stage::Uninitialized,
            cross_hand_table: None,
            leakage_table: None,
            pol_angle_table: None,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn spw_ids(&self) -> &[usize] {
        &self.spw_ids
    }

    pub fn nu_0_hz(&self) -> f64 {
        self.nu_0_hz
    }

    pub fn nu_min_hz(&self) -> f64 {
        self.nu_min_hz
    }

    pub fn nu_max_hz(&self) -> f64 {
        self.nu_max_hz
    }

    pub fn cross_hand_table(&self) -> Option<&Path> {
        self.cross_hand_table.as_ref().map(CalTable::path)
    }

    pub fn leakage_table(&self) -> Option<&Path> {
        self.leakage_table.as_ref().map(CalTable::path)
    }

    pub fn pol_angle_table(&self) -> Option<&Path> {
        self.pol_angle_table.as_ref().map(CalTable::path)
    }

    fn require_stage(
        &self,
        operation: &'static str,
        required: Stage,
    ) -> Result<(), CalibrateError> {
        if self.stage >= required {
            Ok(())
        } else {
            Err(CalibrateError::StageOrder {
                operation,
                stage: self.stage,
                required,
            })
        }
    }

    /// Inject a known calibrator's catalog-derived flux and polarization
    /// model for `field`.
    pub fn set_known_model(
        &mut self,
        source: &mut CalibratorSource,
        field: &str,
        standard: Standard,
        epoch: &str,
        num_terms_angle: usize,
        num_terms_fraction: usize,
    ) -> Result<(), CalibrateError> {
        let flux_info =
            source.known_source_information(self.engine, self.nu_0_hz, standard, epoch)?;
        let pol_info = source.source_polarization_information(
            num_terms_angle,
            num_terms_fraction,
            self.nu_min_hz,
            self.nu_max_hz,
        )?;

        info!("Setting the model of {} for field '{field}'", source.name());
        debug!("Pol fraction coeffs: {:?}", pol_info.pol_fraction_coefficients);
        debug!("Pol angle coeffs: {:?}", pol_info.pol_angle_coefficients);

        self.engine.inject_model(&ModelInjection {
            dataset: self.config.dataset.clone(),
            field: field.to_string(),
            flux_density: [flux_info.intensity, 0.0, 0.0, 0.0],
            spectral_idx: flux_info.spectral_idx,
            ref_freq_hz: self.nu_0_hz,
            pol_fraction_coefficients: Some(pol_info.pol_fraction_coefficients),
            pol_angle_coefficients: Some(pol_info.pol_angle_coefficients),
            scale_by_channel: true,
        })?;
        self.engine
            .plot_model(&self.config.dataset, field, &self.config.ref_ant);

        self.stage = self.stage.max(Stage::ModelSet);
        Ok(())
    }

    /// Derive a flux-only model for `field` by transferring the flux scale
    /// from `reference_field` through an existing complex-gain table, then
    /// inject it. The transferred coefficients are a log-Taylor expansion:
    /// the constant term carries the intensity (`10^c0`) and the rest the
    /// spectral index and curvature. Returns the flux table written by the
    /// transfer.
    pub fn set_unknown_model(
        &mut self,
        source: &mut CalibratorSource,
        field: &str,
        gain_table: &Path,
        reference_field: &str,
        transfer_field: &str,
        fit_order: usize,
    ) -> Result<PathBuf, CalibrateError> {
        let field_id = self.engine.field_id(&self.config.dataset, field)?;
        debug!("Field '{field}' has id {field_id}");

        let flux_table = table::flux_scale(&self.config.dataset, field)?;
        if flux_table.exists() {
            self.engine.remove_table(flux_table.path())?;
        }

        let coefficients = self.engine.transfer_flux_scale(&FluxScaleRequest {
            dataset: self.config.dataset.clone(),
            flux_table: flux_table.path().to_path_buf(),
            gain_table: gain_table.to_path_buf(),
            reference_field: reference_field.to_string(),
            transfer_field: transfer_field.to_string(),
            field_id,
            fit_order,
        })?;
        if coefficients.is_empty() {
            return Err(CalibrateError::EmptyFluxScale {
                field: field.to_string(),
            });
        }

        let intensity = 10.0_f64.powf(coefficients[0]);
        let spectral_idx = coefficients[1..].to_vec();
        info!(
            "Setting the model of {} for field '{field}': I({:.4} GHz) = {intensity:.4} Jy, alpha/beta = {spectral_idx:?}",
            source.name(),
            self.nu_0_hz / crate::constants::HZ_PER_GHZ
        );
        let num_coefficients = coefficients.len();
        source.set_catalog_coefficients(CatalogCoefficients {
            coefficients,
            errors: vec![0.0; num_coefficients],
        });

        self.engine.inject_model(&ModelInjection {
            dataset: self.config.dataset.clone(),
            field: field.to_string(),
            flux_density: [intensity, 0.0, 0.0, 0.0],
            spectral_idx,
            ref_freq_hz: self.nu_0_hz,
            pol_fraction_coefficients: None,
            pol_angle_coefficients: None,
            scale_by_channel: true,
        })?;
        self.engine
            .plot_model(&self.config.dataset, field, &self.config.ref_ant);

        self.stage = self.stage.max(Stage::ModelSet);
        Ok(flux_table.path().to_path_buf())
    }

    /// Solve the cross-hand delay across the combined spectral span.
    pub fn solve_cross_hand_delays(
        &mut self,
        options: &CrossHandDelayOptions,
    ) -> Result<PathBuf, CalibrateError> {
        self.require_stage("the cross-hand delay solve", Stage::ModelSet)?;

        let cal_table = table::cross_hand_delay(&self.config.dataset)?;
        if cal_table.exists() {
            self.engine.remove_table(cal_table.path())?;
        }

        let spw = spw::cross_hand_selector(&self.spw_ids, &options.spw_interval, &options.channels);
        let ref_ant = if self.config.kcross_ref_ant.is_empty() {
            &self.config.ref_ant
        } else {
            &self.config.kcross_ref_ant
        };
        info!("Solving cross-hand delays for field '{}'", self.config.pol_angle_field);
        debug!("Spw: {spw}");

        self.engine.solve_cross_hand_delay(&SolveRequest {
            dataset: self.config.dataset.clone(),
            table: cal_table.path().to_path_buf(),
            field: self.config.pol_angle_field.clone(),
            spw,
            ref_ant: ref_ant.clone(),
            ref_ant_mode: options.ref_ant_mode.clone(),
            antennas: self.config.antennas.clone(),
            min_snr: options.min_snr,
            sol_int: options.sol_int.clone(),
            combine: options.combine.clone(),
            gain_tables: vec![],
            gain_fields: vec![],
            spw_maps: vec![],
            interp: vec![],
        })?;
        cal_table.ensure_solved(&self.config.dataset)?;
        self.engine.plot_table(cal_table.path(), cal_table.stage());

        let path = cal_table.path().to_path_buf();
        self.cross_hand_table = Some(cal_table);
        self.stage = self.stage.max(Stage::CrossHandDelaySolved);
        Ok(path)
    }

    /// Solve leakage (D-terms). The default upstream chain is the
    /// cross-hand delay table when one was solved, otherwise empty.
    pub fn solve_leakage(&mut self, options: &LeakageOptions) -> Result<PathBuf, CalibrateError> {
        self.require_stage("the leakage solve", Stage::ModelSet)?;

        let chain = if options.gain_tables.is_empty() {
            self.cross_hand_table
                .iter()
                .map(|t| t.path().to_path_buf())
                .collect()
        } else {
            options.gain_tables.clone()
        };

        let field = if options.field.is_empty() {
            self.config.leakage_field.clone()
        } else {
            options.field.clone()
        };
        let cal_table = table::leakage(
            &self.config.dataset,
            (!options.field.is_empty()).then_some(options.field.as_str()),
        )?;
        if cal_table.exists() {
            self.engine.remove_table(cal_table.path())?;
        }

        info!("Solving leakage for field '{field}'");
        let request = self.chained_solve_request(
            ChainSolve {
                operation: "the leakage solve",
                min_snr: options.min_snr,
                sol_int: &options.sol_int,
                spw: &options.spw,
                spw_maps: &options.spw_maps,
                gain_fields: &options.gain_fields,
                interp_mode: options.interp_mode,
            },
            cal_table.path(),
            &field,
            chain,
        )?;
        self.engine.solve_leakage(&request, &options.pol_type)?;
        cal_table.ensure_solved(&self.config.dataset)?;

        if options.flag_clip {
            self.engine
                .clip_flag_outside(cal_table.path(), options.clip_min, options.clip_max);
        }
        self.engine.plot_table(cal_table.path(), cal_table.stage());

        let path = cal_table.path().to_path_buf();
        self.leakage_table = Some(cal_table);
        self.stage = self.stage.max(Stage::LeakageSolved);
        Ok(path)
    }

    /// Solve the polarization-angle term. The default upstream chain is
    /// `[cross-hand delay?, leakage]`.
    pub fn solve_pol_angle(&mut self, options: &PolAngleOptions) -> Result<PathBuf, CalibrateError> {
        self.require_stage("the polarization-angle solve", Stage::LeakageSolved)?;

        let chain: Vec<PathBuf> = if options.gain_tables.is_empty() {
            self.cross_hand_table
                .iter()
                .chain(self.leakage_table.iter())
                .map(|t| t.path().to_path_buf())
                .collect()
        } else {
            options.gain_tables.clone()
        };

        let field = if options.field.is_empty() {
            self.config.pol_angle_field.clone()
        } else {
            options.field.clone()
        };
        let cal_table = table::pol_angle(&self.config.dataset)?;
        if cal_table.exists() {
            self.engine.remove_table(cal_table.path())?;
        }

        info!("Solving the polarization angle for field '{field}'");
        let request = self.chained_solve_request(
            ChainSolve {
                operation: "the polarization-angle solve",
                min_snr: options.min_snr,
                sol_int: &options.sol_int,
                spw: &options.spw,
                spw_maps: &options.spw_maps,
                gain_fields: &options.gain_fields,
                interp_mode: options.interp_mode,
            },
            cal_table.path(),
            &field,
            chain,
        )?;
        self.engine.solve_pol_angle(&request, &options.pol_type)?;
        cal_table.ensure_solved(&self.config.dataset)?;
        self.engine.plot_table(cal_table.path(), cal_table.stage());

        let path = cal_table.path().to_path_buf();
        self.pol_angle_table = Some(cal_table);
        self.stage = self.stage.max(Stage::PolAngleSolved);
        Ok(path)
    }

    /// Build a per-spw solve request with the chain's parallel lists filled
    /// in: default gain fields, the broadcast-head spw-map policy, one
    /// interpolation mode per table, and the legacy-instrument overrides.
    fn chained_solve_request(
        &self,
        params: ChainSolve,
        cal_table: &Path,
        field: &str,
        chain: Vec<PathBuf>,
    ) -> Result<SolveRequest, CalibrateError> {
        let gain_fields = default_gain_fields(params.operation, &chain, params.gain_fields)?;

        let mut spw = if params.spw.is_empty() {
            spw::span_selector(&self.spw_ids)
        } else {
            params.spw.to_string()
        };
        let mut spw_maps = if params.spw_maps.is_empty() {
            spw::chain_maps(chain.len(), self.config.mapped_spw, self.num_spws)
        } else {
            if params.spw_maps.len() != chain.len() {
                return Err(CalibrateError::MismatchedChainLists {
                    operation: params.operation,
                    num_tables: chain.len(),
                    num_other: params.spw_maps.len(),
                    what: "spw maps",
                });
            }
            params.spw_maps.to_vec()
        };
        let mut interp = vec![params.interp_mode; chain.len()];

        if self.config.old_instrument {
            spw = String::new();
            spw_maps = vec![];
            interp = vec![InterpMode::Nearest; chain.len()];
        }
        debug!("Spw: {spw}");
        debug!("Spw maps: {spw_maps:?}");

        Ok(SolveRequest {
            dataset: self.config.dataset.clone(),
            table: cal_table.to_path_buf(),
            field: field.to_string(),
            spw,
            ref_ant: self.config.ref_ant.clone(),
            ref_ant_mode: None,
            antennas: self.config.antennas.clone(),
            min_snr: params.min_snr,
            sol_int: params.sol_int.to_string(),
            combine: "scan".to_string(),
            gain_tables: chain,
            gain_fields,
            spw_maps,
            interp,
        })
    }

    /// Apply the solved tables to all fields in one call. The default
    /// chain is `[cross-hand delay?, leakage, polarization angle]`.
    pub fn apply_solutions(&mut self, options: &ApplyOptions) -> Result<(), CalibrateError> {
        self.require_stage("applying solutions", Stage::PolAngleSolved)?;

        let chain: Vec<PathBuf> = if options.gain_tables.is_empty() {
            self.cross_hand_table
                .iter()
                .chain(self.leakage_table.iter())
                .chain(self.pol_angle_table.iter())
                .map(|t| t.path().to_path_buf())
                .collect()
        } else {
            options.gain_tables.clone()
        };
        let gain_fields = default_gain_fields("applying solutions", &chain, &options.gain_fields)?;
        let num_tables = chain.len();
        let gain_tables = match Vec1::try_from_vec(chain) {
            Ok(tables) => tables,
            Err(_) => {
                return Err(CalibrateError::StageOrder {
                    operation: "applying solutions",
                    stage: self.stage,
                    required: Stage::PolAngleSolved,
                })
            }
        };

        let mut spw = spw::span_selector(&self.spw_ids);
        let mut spw_maps = if options.spw_maps.is_empty() {
            spw::chain_maps(num_tables, self.config.mapped_spw, self.num_spws)
        } else {
            if options.spw_maps.len() != num_tables {
                return Err(CalibrateError::MismatchedChainLists {
                    operation: "applying solutions",
                    num_tables,
                    num_other: options.spw_maps.len(),
                    what: "spw maps",
                });
            }
            options.spw_maps.clone()
        };
        let mut interp = vec![InterpMode::EngineDefault; num_tables];
        let mut cal_wt = vec![false; num_tables];
        let mut select_data = true;
        let mut antenna = options.antenna.clone();

        if self.config.old_instrument {
            spw = String::new();
            spw_maps = vec![];
            interp = vec![InterpMode::Nearest; num_tables];
            cal_wt = vec![false];
            select_data = false;
            antenna = String::new();
        }

        info!("Applying solutions: {gain_tables:?}");
        debug!("Spw: {spw}");
        debug!("Spw maps: {spw_maps:?}");

        self.engine.apply_calibration(&ApplyRequest {
            dataset: self.config.dataset.clone(),
            field: String::new(),
            spw,
            gain_tables,
            gain_fields,
            spw_maps,
            interp,
            cal_wt,
            antenna,
            select_data,
            apply_mode: options.apply_mode.clone(),
            parallactic_angle: true,
            flag_backup: options.flag_backup,
        })?;

        self.stage = Stage::Applied;
        Ok(())
    }

    /// Apply one solution table with caller-supplied selectors, outside the
    /// stage sequence.
    pub fn apply_single_solution(
        &self,
        options: &SingleApplyOptions,
    ) -> Result<(), CalibrateError> {
        let num_tables = options.gain_tables.len();
        let gain_fields = default_gain_fields(
            "applying a single solution",
            &options.gain_tables,
            &options.gain_fields,
        )?;
        if !options.spw_maps.is_empty() && options.spw_maps.len() != num_tables {
            return Err(CalibrateError::MismatchedChainLists {
                operation: "applying a single solution",
                num_tables,
                num_other: options.spw_maps.len(),
                what: "spw maps",
            });
        }
        let cal_wt = if options.cal_wt.is_empty() {
            vec![false; num_tables]
        } else {
            options.cal_wt.clone()
        };

        self.engine.apply_calibration(&ApplyRequest {
            dataset: self.config.dataset.clone(),
            field: options.field.clone(),
            spw: options.spw.clone(),
            gain_tables: options.gain_tables.clone(),
            gain_fields,
            spw_maps: options.spw_maps.clone(),
            interp: vec![options.interp_mode; num_tables],
            cal_wt,
            antenna: options.antenna.clone(),
            select_data: options.select_data,
            apply_mode: options.apply_mode.clone(),
            parallactic_angle: true,
            flag_backup: options.flag_backup,
        })?;
        Ok(())
    }
}

/// Configured frequencies can be raw Hz numbers or strings with a unit,
/// e.g. `"1.4GHz"`.
fn deserialize_freq_hz<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FreqSpec {
        Hz(f64),
        WithUnit(String),
    }

    match Option::<FreqSpec>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FreqSpec::Hz(freq)) => Ok(Some(freq)),
        Some(FreqSpec::WithUnit(s)) => crate::unit_parsing::parse_freq_hz(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// The per-solve knobs shared by the chained (leakage and angle) solves.
struct ChainSolve<'o> {
    operation: &'static str,
    min_snr: f64,
    sol_int: &'o str,
    spw: &'o str,
    spw_maps: &'o [SpwMap],
    gain_fields: &'o [String],
    interp_mode: InterpMode,
}

/// Default gain fields ("" per table) when none were supplied; otherwise
/// the lists must have matching lengths.
fn default_gain_fields(
    operation: &'static str,
    tables: &[PathBuf],
    given: &[String],
) -> Result<Vec<String>, CalibrateError> {
    if given.is_empty() {
        Ok(vec![String::new(); tables.len()])
    } else if given.len() == tables.len() {
        Ok(given.to_vec())
    } else {
        Err(CalibrateError::MismatchedChainLists {
            operation,
            num_tables: tables.len(),
            num_other: given.len(),
            what: "gain fields",
        })
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}
