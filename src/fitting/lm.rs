// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
A Levenberg-Marquardt least-squares solver with box constraints.

The damped normal equations `(JᵀJ + λI) δ = -Jᵀr` are solved with a Cholesky
factorization, the damping factor λ growing on rejected steps and shrinking
on accepted ones. Trial parameters are projected back into the caller's box
after each step, which is how the coefficient bounds on polarization models
are enforced. Per-point sigmas, when present, scale the residuals so that
the fit (and the extracted coefficient covariance) is weighted by
measurement uncertainty.
 */

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::FitError;

/// Knobs for the Levenberg-Marquardt iteration.
#[derive(Debug, Clone, Copy)]
pub struct LmSettings {
    /// Maximum number of iterations before the fit is declared failed.
    pub max_iterations: usize,

    /// Relative cost-reduction threshold for convergence.
    pub ftol: f64,

    /// Relative step-size threshold for convergence.
    pub xtol: f64,

    /// Initial damping factor.
    pub initial_lambda: f64,

    /// Factor to increase lambda on a rejected step.
    pub lambda_up: f64,

    /// Factor to decrease lambda on an accepted step.
    pub lambda_down: f64,

    /// Damping factor limits.
    pub min_lambda: f64,
    pub max_lambda: f64,
}

impl Default for LmSettings {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-10,
            xtol: 1e-12,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
        }
    }
}

/// The result of a successful fit.
pub(super) struct Fit {
    /// The best-fit coefficients.
    pub(super) coefficients: Array1<f64>,

    /// One-sigma coefficient uncertainties out of the fit covariance.
    /// Infinite when the normal matrix is singular at the solution.
    pub(super) coefficient_errors: Array1<f64>,

    /// The final (weighted) residual sum of squares.
    pub(super) cost: f64,

    /// The number of iterations taken.
    pub(super) iterations: usize,
}

/// Fit `f(x, coefficients)` against `data` over `xdata` with every
/// coefficient constrained to `[lower_bound, upper_bound]`.
#[allow(clippy::too_many_arguments)]
pub(super) fn fit_bounded<F>(
    f: F,
    xdata: ArrayView1<f64>,
    data: ArrayView1<f64>,
    initial_coefficients: &[f64],
    lower_bound: f64,
    upper_bound: f64,
    sigma: Option<ArrayView1<f64>>,
    settings: &LmSettings,
) -> Result<Fit, FitError>
where
    F: Fn(f64, &[f64]) -> f64,
{
    let num_samples = xdata.len();
    let num_terms = initial_coefficients.len();

    if num_samples != data.len() {
        return Err(FitError::SampleLengthMismatch {
            x_len: num_samples,
            data_len: data.len(),
        });
    }
    if num_samples < num_terms {
        return Err(FitError::InsufficientSamples {
            num_terms,
            num_samples,
        });
    }
    if let Some(sigma) = sigma {
        if sigma.len() != num_samples {
            return Err(FitError::SigmaLengthMismatch {
                sigma_len: sigma.len(),
                data_len: num_samples,
            });
        }
    }
    if xdata.iter().chain(data.iter()).any(|v| !v.is_finite())
        || initial_coefficients.iter().any(|v| !v.is_finite())
    {
        return Err(FitError::NonFiniteData);
    }

    // Residuals are weighted by 1/sigma when sigmas are available.
    let weights: Array1<f64> = match sigma {
        Some(sigma) => sigma.mapv(|s| 1.0 / s),
        None => Array1::ones(num_samples),
    };

    let clamp = |c: f64| c.clamp(lower_bound, upper_bound);
    let residuals = |coefficients: &[f64]| -> Array1<f64> {
        Array1::from_shape_fn(num_samples, |i| {
            (f(xdata[i], coefficients) - data[i]) * weights[i]
        })
    };

    let mut coefficients: Vec<f64> = initial_coefficients.iter().map(|&c| clamp(c)).collect();
    let mut lambda = settings.initial_lambda;
    let mut r = residuals(&coefficients);
    let mut cost = r.dot(&r);
    let mut converged = false;
    let mut iterations = 0;

    for iteration in 0..settings.max_iterations {
        iterations = iteration + 1;

        if cost < f64::MIN_POSITIVE {
            converged = true;
            break;
        }

        let jacobian = finite_diff_jacobian(&residuals, &coefficients, &r, upper_bound);
        let jtj = jacobian.t().dot(&jacobian);
        let jtr = jacobian.t().dot(&r);

        // Solve the damped normal equations; a singular system just means
        // more damping is needed.
        let mut damped = jtj.clone();
        for i in 0..num_terms {
            damped[(i, i)] += lambda;
        }
        let delta = match cholesky_factor(&damped)
            .and_then(|l| cholesky_solve(&l, jtr.mapv(|v| -v).view()))
        {
            Some(delta) => delta,
            None => {
                lambda = (lambda * settings.lambda_up).min(settings.max_lambda);
                continue;
            }
        };

        let trial: Vec<f64> = coefficients
            .iter()
            .zip(delta.iter())
            .map(|(c, d)| clamp(c + d))
            .collect();
        let trial_r = residuals(&trial);
        let trial_cost = trial_r.dot(&trial_r);

        if trial_cost <= cost {
            let step_norm = coefficients
                .iter()
                .zip(trial.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            let param_norm = coefficients.iter().map(|c| c * c).sum::<f64>().sqrt();
            let cost_reduction = cost - trial_cost;

            coefficients = trial;
            r = trial_r;
            cost = trial_cost;
            lambda = (lambda * settings.lambda_down).max(settings.min_lambda);

            if cost_reduction <= settings.ftol * cost.max(f64::MIN_POSITIVE)
                || step_norm <= settings.xtol * (param_norm + settings.xtol)
            {
                converged = true;
                break;
            }
        } else {
            lambda = (lambda * settings.lambda_up).min(settings.max_lambda);
        }
    }

    if !converged {
        return Err(FitError::NoConvergence { iterations });
    }

    let jacobian = finite_diff_jacobian(&residuals, &coefficients, &r, upper_bound);
    let coefficient_errors = covariance_errors(&jacobian, cost, num_samples, num_terms);

    Ok(Fit {
        coefficients: Array1::from(coefficients),
        coefficient_errors,
        cost,
        iterations,
    })
}

/// Forward-difference Jacobian of the residual vector. The step direction
/// flips when a forward step would leave the box.
fn finite_diff_jacobian<R>(
    residuals: &R,
    coefficients: &[f64],
    r0: &Array1<f64>,
    upper_bound: f64,
) -> Array2<f64>
where
    R: Fn(&[f64]) -> Array1<f64>,
{
    let num_samples = r0.len();
    let num_terms = coefficients.len();
    let mut jacobian = Array2::zeros((num_samples, num_terms));

    for j in 0..num_terms {
        let mut h = 1e-8 * coefficients[j].abs().max(1.0);
        if coefficients[j] + h > upper_bound {
            h = -h;
        }

        let mut stepped = coefficients.to_vec();
        stepped[j] += h;
        let r_stepped = residuals(&stepped);

        for (i, mut col) in jacobian.axis_iter_mut(Axis(0)).enumerate() {
            col[j] = (r_stepped[i] - r0[i]) / h;
        }
    }

    jacobian
}

/// One-sigma coefficient uncertainties: the square roots of the diagonal of
/// `(JᵀJ)⁻¹` scaled by the reduced chi-squared, infinite if the normal
/// matrix is singular.
fn covariance_errors(
    jacobian: &Array2<f64>,
    cost: f64,
    num_samples: usize,
    num_terms: usize,
) -> Array1<f64> {
    let jtj = jacobian.t().dot(jacobian);
    let scale = if num_samples > num_terms {
        cost / (num_samples - num_terms) as f64
    } else {
        1.0
    };

    let l = match cholesky_factor(&jtj) {
        Some(l) => l,
        None => return Array1::from_elem(num_terms, f64::INFINITY),
    };

    let mut errors = Array1::zeros(num_terms);
    for j in 0..num_terms {
        let mut e = Array1::zeros(num_terms);
        e[j] = 1.0;
        match cholesky_solve(&l, e.view()) {
            Some(col) => errors[j] = (col[j] * scale).max(0.0).sqrt(),
            None => errors[j] = f64::INFINITY,
        }
    }
    errors
}

/// The lower-triangular Cholesky factor of a symmetric positive-definite
/// matrix, or `None` if the matrix isn't positive definite.
fn cholesky_factor(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l: Array2<f64> = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }

            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[(i, j)] = sum.sqrt();
            } else {
                if l[(j, j)].abs() < 1e-300 {
                    return None;
                }
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }

    Some(l)
}

/// Solve `L Lᵀ x = b` given the Cholesky factor `L`.
fn cholesky_solve(l: &Array2<f64>, b: ArrayView1<f64>) -> Option<Array1<f64>> {
    let n = b.len();

    // Forward substitution: L y = b.
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[(i, j)] * y[j];
        }
        if l[(i, i)].abs() < 1e-300 {
            return None;
        }
        y[i] = sum / l[(i, i)];
    }

    // Backward substitution: Lᵀ x = y.
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[(j, i)] * x[j];
        }
        x[i] = sum / l[(i, i)];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn recovers_a_line() {
        let xdata = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let data = xdata.mapv(|x| 2.5 * x - 1.0);
        let fit = fit_bounded(
            |x, c| c[0] + c[1] * x,
            xdata.view(),
            data.view(),
            &[0.0, 0.0],
            f64::NEG_INFINITY,
            f64::INFINITY,
            None,
            &LmSettings::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.coefficients[1], 2.5, epsilon = 1e-6);
        assert!(fit.cost < 1e-10);
    }

    #[test]
    fn recovers_an_exponential() {
        let xdata = array![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0];
        let data = xdata.mapv(|x: f64| 1.3 * (-0.7 * x).exp());
        let fit = fit_bounded(
            |x, c| c[0] * (c[1] * x).exp(),
            xdata.view(),
            data.view(),
            &[1.0, -1.0],
            f64::NEG_INFINITY,
            f64::INFINITY,
            None,
            &LmSettings::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], 1.3, epsilon = 1e-4);
        assert_abs_diff_eq!(fit.coefficients[1], -0.7, epsilon = 1e-4);
    }

    #[test]
    fn bounds_are_respected() {
        // The unconstrained optimum of this fit is c = 2, but the box stops
        // at 1.
        let xdata = array![0.0, 1.0, 2.0];
        let data = array![2.0, 2.0, 2.0];
        let fit = fit_bounded(
            |_, c| c[0],
            xdata.view(),
            data.view(),
            &[0.5],
            0.0,
            1.0,
            None,
            &LmSettings::default(),
        )
        .unwrap();

        assert!(fit.coefficients[0] <= 1.0);
        assert_abs_diff_eq!(fit.coefficients[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn sigma_downweights_points() {
        // Two clusters of data disagree on the constant; the fit should land
        // near the cluster with the smaller uncertainty.
        let xdata = array![0.0, 1.0, 2.0, 3.0];
        let data = array![1.0, 1.0, 3.0, 3.0];
        let sigma = array![0.01, 0.01, 10.0, 10.0];
        let fit = fit_bounded(
            |_, c| c[0],
            xdata.view(),
            data.view(),
            &[2.0],
            f64::NEG_INFINITY,
            f64::INFINITY,
            Some(sigma.view()),
            &LmSettings::default(),
        )
        .unwrap();

        assert_abs_diff_eq!(fit.coefficients[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let result = fit_bounded(
            |_, c| c[0],
            array![0.0, 1.0].view(),
            array![0.0].view(),
            &[0.0],
            f64::NEG_INFINITY,
            f64::INFINITY,
            None,
            &LmSettings::default(),
        );
        assert!(matches!(
            result,
            Err(FitError::SampleLengthMismatch { .. })
        ));
    }

    #[test]
    fn too_many_terms_are_rejected() {
        let result = fit_bounded(
            |_, c| c[0] + c[1] + c[2],
            array![0.0, 1.0].view(),
            array![0.0, 1.0].view(),
            &[0.0, 0.0, 0.0],
            f64::NEG_INFINITY,
            f64::INFINITY,
            None,
            &LmSettings::default(),
        );
        assert!(matches!(result, Err(FitError::InsufficientSamples { .. })));
    }

    #[test]
    fn errors_are_finite_for_well_posed_fits() {
        let xdata = Array1::linspace(0.0, 5.0, 20);
        let data = xdata.mapv(|x| 0.2 + 0.1 * x);
        let fit = fit_bounded(
            |x, c| c[0] + c[1] * x,
            xdata.view(),
            data.view(),
            &[0.0, 0.0],
            f64::NEG_INFINITY,
            f64::INFINITY,
            None,
            &LmSettings::default(),
        )
        .unwrap();

        assert!(fit.coefficient_errors.iter().all(|e| e.is_finite()));
        assert!(fit.iterations >= 1);
    }
}
