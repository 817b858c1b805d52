// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The polarization frequency model.

use serde::{Deserialize, Serialize};

use super::FrequencyModel;

/// A polynomial in the normalized frequency offset:
///
/// p(ν) = Σᵢ cᵢ ((ν - ν₀) / ν₀)ⁱ
///
/// Used for both polarization fraction (coefficients bounded to \[0,1\])
/// and polarization angle (bounded to \[-π,π\]). At ν = ν₀ the model is
/// exactly c₀. The number of terms is caller-chosen and traded against the
/// number of available frequency samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    /// The reference frequency ν₀ \[Hz\].
    ref_freq_hz: f64,

    num_terms: usize,

    coefficients: Vec<f64>,

    coefficient_errors: Vec<f64>,
}

impl PolynomialModel {
    /// A model with no coefficients yet. `ref_freq_hz` must be a positive
    /// physical frequency in Hz.
    pub fn new(ref_freq_hz: f64, num_terms: usize) -> PolynomialModel {
        debug_assert!(ref_freq_hz > 0.0);
        PolynomialModel {
            ref_freq_hz,
            num_terms,
            coefficients: vec![],
            coefficient_errors: vec![],
        }
    }
}

impl FrequencyModel for PolynomialModel {
    fn num_terms(&self) -> usize {
        self.num_terms
    }

    fn ref_freq_hz(&self) -> f64 {
        self.ref_freq_hz
    }

    fn eval(&self, freq_hz: f64, coefficients: &[f64]) -> f64 {
        let x = (freq_hz - self.ref_freq_hz) / self.ref_freq_hz;
        let mut power = 1.0;
        let mut y = 0.0;
        for &c in coefficients {
            y += c * power;
            power *= x;
        }
        y
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
