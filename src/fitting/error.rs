// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with model fitting.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitError {
    #[error("Expected {expected} initial coefficients for this model, but {got} were supplied")]
    CoefficientCountMismatch { expected: usize, got: usize },

    #[error("Cannot fit {num_terms} coefficients against only {num_samples} samples")]
    InsufficientSamples {
        num_terms: usize,
        num_samples: usize,
    },

    #[error("The frequency array has {x_len} entries but the data array has {data_len}")]
    SampleLengthMismatch { x_len: usize, data_len: usize },

    #[error("The sigma array has {sigma_len} entries but there are {data_len} data points")]
    SigmaLengthMismatch { sigma_len: usize, data_len: usize },

    #[error("Non-finite values were supplied to a fit")]
    NonFiniteData,

    #[error("The least-squares fit did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}
