// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with the polarization-calibration pipeline.

use std::path::PathBuf;

use thiserror::Error;

use super::Stage;

#[derive(Error, Debug)]
pub enum CalibrateError {
    #[error("Can't run {operation} at stage '{stage}'; it needs at least stage '{required}'")]
    StageOrder {
        operation: &'static str,
        stage: Stage,
        required: Stage,
    },

    #[error("The {stage} solve finished but its table {table} does not exist; cannot continue with dataset {dataset}")]
    MissingArtifact {
        stage: &'static str,
        table: PathBuf,
        dataset: PathBuf,
    },

    #[error("Can't derive calibration-table names from dataset path {0}")]
    BadDatasetName(PathBuf),

    #[error("Dataset {0} has no spectral windows to calibrate")]
    EmptySpwIds(PathBuf),

    #[error("{operation}: {num_tables} gain tables but {num_other} {what}; the per-table lists must have matching lengths")]
    MismatchedChainLists {
        operation: &'static str,
        num_tables: usize,
        num_other: usize,
        what: &'static str,
    },

    #[error("The flux-scale transfer for field '{field}' returned no fitted coefficients")]
    EmptyFluxScale { field: String },

    #[error(transparent)]
    Source(#[from] crate::sources::SourceError),

    #[error(transparent)]
    Engine(#[from] crate::engine::EngineError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
