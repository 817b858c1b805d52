// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The top-level error type; all module errors funnel into this.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolcalError {
    #[error(transparent)]
    Fit(#[from] crate::fitting::FitError),

    #[error(transparent)]
    Source(#[from] crate::sources::SourceError),

    #[error(transparent)]
    Calibrate(#[from] crate::calibrate::CalibrateError),

    #[error(transparent)]
    Engine(#[from] crate::engine::EngineError),

    #[error(transparent)]
    UnitParse(#[from] crate::unit_parsing::UnitParseError),
}
