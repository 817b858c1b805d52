// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Polarization calibration modelling and orchestration for radio
interferometers.

This crate models the frequency-dependent polarization behaviour of
calibrator sources (flux density, linear polarization fraction and angle)
and drives the multi-stage polarization-calibration sequence (cross-hand
delays, leakage terms, polarization-angle terms, apply) over an external
calibration engine. The engine itself -- the per-antenna solver, visibility
I/O, plotting -- sits behind the traits in [`engine`].
 */

pub mod calibrate;
pub mod constants;
pub mod engine;
mod error;
pub mod fitting;
pub mod sources;
pub mod unit_parsing;

// Re-exports.
pub use calibrate::{PolCalConfig, PolCalPipeline};
pub use error::PolcalError;
pub use fitting::{FluxModel, FrequencyModel, PolynomialModel};
pub use sources::CalibratorSource;
