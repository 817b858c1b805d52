// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors surfaced by the external calibration engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("The calibration engine failed during {operation}: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },

    #[error("Field '{field}' does not exist in dataset {dataset}")]
    NoSuchField { field: String, dataset: PathBuf },

    #[error("Dataset {dataset} has no unflagged spectral windows")]
    NoSpectralWindows { dataset: PathBuf },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
