// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Parametric frequency models with bounded nonlinear least-squares fitting.

The two concrete models are [`FluxModel`] (log power law with curvature,
used for flux densities) and [`PolynomialModel`] (polynomial in normalized
frequency offset, used for both polarization fraction and angle). Fitting
goes through a single evaluation path, [`FrequencyModel::eval`], which also
serves as prediction; a model's stored coefficients are only ever mutated by
[`FrequencyModel::fit`] and [`FrequencyModel::set_coefficients`].
 */

mod error;
mod flux;
mod lm;
mod poly;

pub use error::FitError;
pub use flux::FluxModel;
pub use lm::LmSettings;
pub use poly::PolynomialModel;

use ndarray::ArrayView1;

/// A closed-form model of some quantity against frequency.
///
/// All frequencies are in Hz, including the model's reference frequency;
/// constructors take explicitly-named `_hz` arguments so that a model is
/// never evaluated against a query in different units than its reference.
pub trait FrequencyModel {
    /// The number of coefficients this model carries.
    fn num_terms(&self) -> usize;

    /// The model's reference frequency \[Hz\].
    fn ref_freq_hz(&self) -> f64;

    /// Evaluate the model at `freq_hz` with the supplied coefficients. This
    /// is both the fitting objective and the prediction function; it never
    /// touches the stored coefficients.
    fn eval(&self, freq_hz: f64, coefficients: &[f64]) -> f64;

    /// The stored coefficients (empty before any fit).
    fn coefficients(&self) -> &[f64];

    /// The stored coefficient uncertainties (empty before any fit).
    fn coefficient_errors(&self) -> &[f64];

    /// Overwrite the stored coefficients and their uncertainties.
    fn set_coefficients(&mut self, coefficients: Vec<f64>, errors: Vec<f64>);

    /// Evaluate the model at `freq_hz` with the stored coefficients.
    fn evaluate(&self, freq_hz: f64) -> f64 {
        self.eval(freq_hz, self.coefficients())
    }

    /// Perform a bounded nonlinear least-squares fit of this model against
    /// `data`, starting from `initial_coefficients`. Every coefficient is
    /// constrained to `[lower_bound, upper_bound]`. `sigma`, when given,
    /// weights each residual by the corresponding per-point measurement
    /// uncertainty, and the resulting coefficient errors reflect it.
    ///
    /// On success the fitted coefficients and their errors are stored on the
    /// model and also returned.
    fn fit(
        &mut self,
        xdata: ArrayView1<f64>,
        data: ArrayView1<f64>,
        initial_coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
        sigma: Option<ArrayView1<f64>>,
    ) -> Result<(Vec<f64>, Vec<f64>), FitError> {
        if initial_coefficients.len() != self.num_terms() {
            return Err(FitError::CoefficientCountMismatch {
                expected: self.num_terms(),
                got: initial_coefficients.len(),
            });
        }

        let fit = {
            let f = |freq_hz: f64, c: &[f64]| self.eval(freq_hz, c);
            lm::fit_bounded(
                f,
                xdata,
                data,
                initial_coefficients,
                lower_bound,
                upper_bound,
                sigma,
                &LmSettings::default(),
            )?
        };

        log::trace!(
            "fit converged after {} iterations with cost {:e}",
            fit.iterations,
            fit.cost
        );
        let coefficients = fit.coefficients.to_vec();
        let errors = fit.coefficient_errors.to_vec();
        self.set_coefficients(coefficients.clone(), errors.clone());
        Ok((coefficients, errors))
    }
}
