// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The boundary to the external measurement-set calibration engine.

Everything the pipeline cannot do itself -- the per-antenna solves, applying
tables to visibilities, injecting source models, metadata queries, the
standard-catalog lookup and diagnostic side effects -- goes through the
traits here. Implementations are deliberately out of scope for this crate;
tests use an in-tree mock.

Every solve writes its solutions to a table on persistent storage, and the
existence of that table afterwards is the only witness of success the
pipeline trusts.
 */

mod error;

pub use error::EngineError;

use std::path::{Path, PathBuf};

use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

/// How an upstream gain table should be interpolated when pre-applied
/// during a solve or apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum InterpMode {
    #[strum(serialize = "linear")]
    Linear,

    #[strum(serialize = "nearest")]
    Nearest,

    /// Let the engine pick; serializes to an empty string.
    #[default]
    #[strum(serialize = "")]
    EngineDefault,
}

/// A spectral-window mapping vector for one upstream gain table: entry `i`
/// names the spectral window whose solutions should calibrate spectral
/// window `i`. An empty map means the identity mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpwMap(pub Vec<usize>);

impl SpwMap {
    /// The identity mapping.
    pub fn identity() -> SpwMap {
        SpwMap(vec![])
    }

    /// Broadcast a single solved spectral window to `num_spws` windows.
    pub fn broadcast(mapped_spw: usize, num_spws: usize) -> SpwMap {
        SpwMap(vec![mapped_spw; num_spws])
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The flux-standard catalogs that can be resolved by name and epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Standard {
    #[strum(serialize = "Perley-Butler 2013")]
    PerleyButler2013,

    #[strum(serialize = "Perley-Butler 2017")]
    PerleyButler2017,

    #[strum(serialize = "Scaife-Heald 2012")]
    ScaifeHeald2012,
}

impl Standard {
    /// The identifier of the coefficient table within the external catalog.
    pub fn table_id(self) -> &'static str {
        match self {
            Standard::PerleyButler2013 => "PerleyButler2013Coeffs",
            Standard::PerleyButler2017 => "PerleyButler2017Coeffs",
            Standard::ScaifeHeald2012 => "ScaifeHeald2012Coeffs",
        }
    }
}

/// Coefficients of the catalog flux parameterization
/// log10(S \[Jy\]) = Σᵢ aᵢ log10(ν \[GHz\])ⁱ, with their uncertainties.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCoefficients {
    pub coefficients: Vec<f64>,
    pub errors: Vec<f64>,
}

/// Everything a calibration solve needs. The gain-chain lists
/// (`gain_tables`, `gain_fields`, `spw_maps`, `interp`) are parallel and
/// must have equal lengths.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub dataset: PathBuf,

    /// Where the solutions should land.
    pub table: PathBuf,

    pub field: String,

    /// Spectral-window selector, e.g. `"0~5"` or `"0~5:13~115"`; empty
    /// means no selection.
    pub spw: String,

    pub ref_ant: String,

    /// The engine's reference-antenna mode (e.g. "strict"), where relevant.
    pub ref_ant_mode: Option<String>,

    pub antennas: String,

    pub min_snr: f64,

    pub sol_int: String,

    /// The solve's combine rule, e.g. `"scan"` or `"scan,spw"`.
    pub combine: String,

    pub gain_tables: Vec<PathBuf>,
    pub gain_fields: Vec<String>,
    pub spw_maps: Vec<SpwMap>,
    pub interp: Vec<InterpMode>,
}

/// Everything an apply needs. As with [`SolveRequest`], the per-table lists
/// are parallel; `gain_tables` can never be empty.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub dataset: PathBuf,

    /// Field selector; empty means all fields.
    pub field: String,

    pub spw: String,

    pub gain_tables: Vec1<PathBuf>,
    pub gain_fields: Vec<String>,
    pub spw_maps: Vec<SpwMap>,
    pub interp: Vec<InterpMode>,
    pub cal_wt: Vec<bool>,

    /// Antenna/baseline selector, e.g. `"*&*"` for all baselines.
    pub antenna: String,

    pub select_data: bool,

    /// The engine's apply mode, e.g. "calflagstrict".
    pub apply_mode: String,

    /// Apply parallactic-angle corrections.
    pub parallactic_angle: bool,

    pub flag_backup: bool,
}

/// A source model to inject into a dataset for one field.
#[derive(Debug, Clone)]
pub struct ModelInjection {
    pub dataset: PathBuf,

    pub field: String,

    /// Stokes (I, Q, U, V) flux densities at the reference frequency \[Jy\].
    pub flux_density: [f64; 4],

    /// Spectral index and any higher-order (curvature) terms.
    pub spectral_idx: Vec<f64>,

    pub ref_freq_hz: f64,

    /// Polarization-fraction polynomial coefficients, if the source's
    /// polarization is being modelled.
    pub pol_fraction_coefficients: Option<Vec<f64>>,

    /// Polarization-angle polynomial coefficients \[rad\].
    pub pol_angle_coefficients: Option<Vec<f64>>,

    /// Scale the model per channel rather than per spectral window.
    pub scale_by_channel: bool,
}

/// A flux-scale transfer from a reference field to a transfer field via an
/// existing complex-gain table.
#[derive(Debug, Clone)]
pub struct FluxScaleRequest {
    pub dataset: PathBuf,

    /// Where the scaled flux table should land.
    pub flux_table: PathBuf,

    /// The complex-gain table whose solutions carry the scale.
    pub gain_table: PathBuf,

    pub reference_field: String,

    pub transfer_field: String,

    /// The field whose fitted coefficients are wanted back.
    pub field_id: usize,

    /// The order of the log-Taylor expansion fit.
    pub fit_order: usize,
}

/// Resolution of tabulated standard-catalog flux coefficients by calibrator
/// name and epoch.
pub trait StandardCatalog {
    /// Look up the catalog coefficients (and their uncertainties) for a
    /// named source under the given standard and epoch. An empty result
    /// means the epoch has no data for this source.
    fn lookup_standard_coefficients(
        &self,
        source_name: &str,
        standard: Standard,
        epoch: &str,
    ) -> Result<CatalogCoefficients, EngineError>;
}

/// The external calibration engine's primitives, consumed as black boxes.
///
/// The solve methods are expected to block until the solve finishes and to
/// have written the requested table on success. The diagnostic methods at
/// the bottom are fire-and-forget: they default to no-ops, and an
/// implementation must not let their failures escape, since the pipeline
/// never consults them for control flow.
pub trait CalibrationEngine: StandardCatalog {
    /// Solve a single cross-hand delay across the requested spectral span.
    fn solve_cross_hand_delay(&self, request: &SolveRequest) -> Result<(), EngineError>;

    /// Solve leakage (D-term) calibration. `pol_type` is the engine's
    /// leakage solve type, e.g. "Df".
    fn solve_leakage(&self, request: &SolveRequest, pol_type: &str) -> Result<(), EngineError>;

    /// Solve the polarization-angle term. `pol_type` is the engine's
    /// angle solve type, e.g. "Xf".
    fn solve_pol_angle(&self, request: &SolveRequest, pol_type: &str) -> Result<(), EngineError>;

    /// Apply a set of calibration tables to the dataset in one call.
    fn apply_calibration(&self, request: &ApplyRequest) -> Result<(), EngineError>;

    /// Inject a source model into the dataset for one field.
    fn inject_model(&self, request: &ModelInjection) -> Result<(), EngineError>;

    /// Transfer a flux scale between fields, returning the fitted
    /// log-Taylor expansion coefficients for the requested field.
    fn transfer_flux_scale(&self, request: &FluxScaleRequest) -> Result<Vec<f64>, EngineError>;

    /// Remove a stale calibration table from storage.
    fn remove_table(&self, table: &Path) -> Result<(), EngineError>;

    /// The reference frequency of every unflagged spectral window \[Hz\].
    fn spw_ref_freqs_hz(&self, dataset: &Path) -> Result<Vec<f64>, EngineError>;

    /// The minimum and maximum channel frequency over all unflagged
    /// spectral windows \[Hz\].
    fn channel_freq_range_hz(&self, dataset: &Path) -> Result<(f64, f64), EngineError>;

    /// The ids of all unflagged spectral windows.
    fn spw_ids(&self, dataset: &Path) -> Result<Vec<usize>, EngineError>;

    /// The id of a named field.
    fn field_id(&self, dataset: &Path, field: &str) -> Result<usize, EngineError>;

    /// Request diagnostic plots of a field's injected model.
    fn plot_model(&self, _dataset: &Path, _field: &str, _ref_ant: &str) {}

    /// Request diagnostic plots of a solved calibration table.
    fn plot_table(&self, _table: &Path, _description: &'static str) {}

    /// Flag solutions in a table whose amplitudes fall outside
    /// `[clip_min, clip_max]`.
    fn clip_flag_outside(&self, _table: &Path, _clip_min: f64, _clip_max: f64) {}
}
