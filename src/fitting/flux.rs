// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The flux-density frequency model.

use serde::{Deserialize, Serialize};

use super::FrequencyModel;

/// A log power law with curvature:
///
/// S(ν) = S₀ (ν/ν₀)^(α + β ln(ν/ν₀))
///
/// The two coefficients are the spectral index α and the spectral curvature
/// β around the reference frequency ν₀. This is the form the calibration
/// engine's model injection expects, as opposed to the absolute
/// log10-polynomial form the standard catalogs store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxModel {
    /// The reference frequency ν₀ \[Hz\].
    ref_freq_hz: f64,

    /// The flux density at the reference frequency \[Jy\].
    flux_0: f64,

    /// \[α, β\] once fitted.
    coefficients: Vec<f64>,

    coefficient_errors: Vec<f64>,
}

impl FluxModel {
    /// A model with no coefficients yet. `ref_freq_hz` must be a positive
    /// physical frequency in Hz.
    pub fn new(ref_freq_hz: f64, flux_0: f64) -> FluxModel {
        debug_assert!(ref_freq_hz > 0.0);
        FluxModel {
            ref_freq_hz,
            flux_0,
            coefficients: vec![],
            coefficient_errors: vec![],
        }
    }

    /// The flux density at the reference frequency \[Jy\].
    pub fn flux_0(&self) -> f64 {
        self.flux_0
    }
}

impl FrequencyModel for FluxModel {
    fn num_terms(&self) -> usize {
        2
    }

    fn ref_freq_hz(&self) -> f64 {
        self.ref_freq_hz
    }

    fn eval(&self, freq_hz: f64, coefficients: &[f64]) -> f64 {
        let ratio = freq_hz / self.ref_freq_hz;
        self.flux_0 * ratio.powf(coefficients[0] + coefficients[1] * ratio.ln())
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    fn coefficient_errors(&self) -> &[f64] {
        &self.coefficient_errors
    }

    fn set_coefficients(&mut self, coefficients: Vec<f64>, errors: Vec<f64>) {
        self.coefficients = coefficients;
        self.coefficient_errors = errors;
    }
}
