// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with calibrator sources.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::Standard;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Unknown calibrator source '{name}'; available sources are: {available}")]
    UnknownCalibrator { name: String, available: String },

    #[error("Calibrator source '{name}' is malformed: {num_freqs} frequency samples, {num_angles} angle samples, {num_fractions} fraction samples")]
    Malformed {
        name: String,
        num_freqs: usize,
        num_angles: usize,
        num_fractions: usize,
    },

    #[error("The {standard} catalog has no data for source '{source_name}' at epoch {epoch}")]
    UnknownEpochOrStandard {
        standard: Standard,
        epoch: String,
        source_name: String,
    },

    #[error("Source '{0}' has no catalog coefficients; resolve them from a standard before using its flux model")]
    MissingCatalogCoefficients(String),

    #[error("Source '{0}' has no flux-density samples to fit against")]
    NoFluxSamples(String),

    #[error("Couldn't parse calibrator table {path} at line {line}: {message}")]
    ParseTable {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Revised-catalog source name '{0}' needs a table directory to load from")]
    MissingTableDir(String),

    #[error(transparent)]
    Fit(#[from] crate::fitting::FitError),

    #[error(transparent)]
    Engine(#[from] crate::engine::EngineError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
