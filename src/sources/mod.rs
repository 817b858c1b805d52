// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Calibrator sources and their frequency-dependent polarization behaviour.

A [`CalibratorSource`] holds a calibrator's empirical (frequency,
polarization angle, polarization fraction, flux density) samples, either
from the embedded tables of the well-known sources or from an external
per-source table, and turns them into fitted coefficient models for the
calibration pipeline. Units are normalized at construction: frequencies to
Hz, angles to radians, fractions to the unit interval.
 */

mod error;
mod known;
mod read;

pub use error::SourceError;
pub use known::KnownCalibrator;
pub use read::source_from_table_file;

use itertools::Itertools;
use log::{debug, info};
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    constants::{
        CATALOG_FIT_MAX_FREQ_GHZ, CATALOG_FIT_MIN_FREQ_GHZ, CATALOG_FIT_NUM_FREQS, HZ_PER_GHZ,
        PI, RAD_PER_DEG,
    },
    engine::{CatalogCoefficients, Standard, StandardCatalog},
    fitting::{FitError, FluxModel, FrequencyModel, PolynomialModel},
};

lazy_static::lazy_static! {
    /// A comma-separated list of the embedded calibrator names, for error
    /// messages.
    static ref AVAILABLE_CALIBRATORS: String = KnownCalibrator::iter().join(", ");
}

/// The flux-model information of a known calibrator: the intensity at the
/// reference frequency and the (spectral index, curvature) pair fitted from
/// its catalog coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownSourceInfo {
    /// Stokes I flux density at the reference frequency \[Jy\].
    pub intensity: f64,

    /// Spectral index and curvature around the reference frequency.
    pub spectral_idx: Vec<f64>,

    /// Their one-sigma uncertainties, propagated from the catalog.
    pub spectral_idx_errors: Vec<f64>,
}

/// Fitted polarization-model coefficients of a calibrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePolInfo {
    /// Polarization-angle polynomial coefficients \[rad\].
    pub pol_angle_coefficients: Vec<f64>,
    pub pol_angle_coefficient_errors: Vec<f64>,

    /// Polarization-fraction polynomial coefficients \[unit interval\].
    pub pol_fraction_coefficients: Vec<f64>,
    pub pol_fraction_coefficient_errors: Vec<f64>,
}

/// A polarization calibrator: empirical samples plus (once resolved)
/// standard-catalog flux coefficients.
///
/// The three sample arrays are index-aligned and, for a usable source,
/// equal in length; `is_correct` checks this. Samples are immutable after
/// construction; only the catalog coefficients are set later.
#[derive(Debug, Clone)]
pub struct CalibratorSource {
    name: String,

    /// Sample frequencies \[Hz\], ascending.
    nu_hz: Array1<f64>,

    /// Flux-density samples \[Jy\]. All zero for the embedded tables, which
    /// predate the revised catalogs that publish flux alongside
    /// polarization.
    flux_density_jy: Array1<f64>,

    /// Polarization-angle samples \[rad\].
    pol_angle_rad: Array1<f64>,

    /// Linear polarization fraction samples \[unit interval\].
    pol_fraction: Array1<f64>,

    /// Catalog flux coefficients (log10-polynomial in GHz), once resolved.
    catalog_coefficients: Option<CatalogCoefficients>,
}

impl CalibratorSource {
    /// An empty, unusable source; `is_correct` is false.
    pub fn empty() -> CalibratorSource {
        CalibratorSource {
            name: String::new(),
            nu_hz: Array1::zeros(0),
            flux_density_jy: Array1::zeros(0),
            pol_angle_rad: Array1::zeros(0),
            pol_fraction: Array1::zeros(0),
            catalog_coefficients: None,
        }
    }

    /// A source built from one of the embedded calibrator tables.
    pub fn known(calibrator: KnownCalibrator) -> CalibratorSource {
        let nu_hz = known::SAMPLE_FREQS_GHZ
            .iter()
            .map(|&f| f * HZ_PER_GHZ)
            .collect::<Array1<f64>>();
        let pol_angle_rad = calibrator
            .pol_angles_deg()
            .iter()
            .map(|&a| a * RAD_PER_DEG)
            .collect::<Array1<f64>>();
        let pol_fraction = calibrator
            .pol_fractions_percent()
            .iter()
            .map(|&p| p / 100.0)
            .collect::<Array1<f64>>();
        let flux_density_jy = Array1::zeros(nu_hz.len());

        CalibratorSource {
            name: calibrator.to_string(),
            nu_hz,
            flux_density_jy,
            pol_angle_rad,
            pol_fraction,
            catalog_coefficients: None,
        }
    }

    /// Select a source by name. An empty name gives an empty source; a name
    /// that isn't one of the embedded calibrators is an error.
    pub fn from_name(name: &str) -> Result<CalibratorSource, SourceError> {
        if name.is_empty() {
            return Ok(CalibratorSource::empty());
        }
        let calibrator =
            name.to_uppercase()
                .parse::<KnownCalibrator>()
                .map_err(|_| SourceError::UnknownCalibrator {
                    name: name.to_string(),
                    available: AVAILABLE_CALIBRATORS.clone(),
                })?;
        Ok(CalibratorSource::known(calibrator))
    }

    /// Select a source by name, handling the `_2019` revised-catalog names
    /// by loading the source's external table (`<name>.txt`, lowercase)
    /// from `tables_dir`.
    pub fn resolve(
        name: &str,
        tables_dir: Option<&std::path::Path>,
    ) -> Result<CalibratorSource, SourceError> {
        match name.to_uppercase().strip_suffix("_2019") {
            Some(base) => {
                let dir =
                    tables_dir.ok_or_else(|| SourceError::MissingTableDir(name.to_string()))?;
                let path = dir.join(format!("{}.txt", base.to_lowercase()));
                debug!("Loading revised table for {base} from {}", path.display());
                source_from_table_file(&path)
            }
            None => CalibratorSource::from_name(name),
        }
    }

    pub(crate) fn from_parts(
        name: String,
        nu_hz: Array1<f64>,
        flux_density_jy: Array1<f64>,
        pol_angle_rad: Array1<f64>,
        pol_fraction: Array1<f64>,
    ) -> CalibratorSource {
        CalibratorSource {
            name,
            nu_hz,
            flux_density_jy,
            pol_angle_rad,
            pol_fraction,
            catalog_coefficients: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample frequencies \[Hz\].
    pub fn nu_hz(&self) -> &Array1<f64> {
        &self.nu_hz
    }

    /// Flux-density samples \[Jy\].
    pub fn flux_density_jy(&self) -> &Array1<f64> {
        &self.flux_density_jy
    }

    /// Polarization-angle samples \[rad\].
    pub fn pol_angle_rad(&self) -> &Array1<f64> {
        &self.pol_angle_rad
    }

    /// Polarization-fraction samples \[unit interval\].
    pub fn pol_fraction(&self) -> &Array1<f64> {
        &self.pol_fraction
    }

    /// Are the sample arrays aligned and non-empty? Callers must check this
    /// before fitting; mismatched samples are not auto-repaired.
    pub fn is_correct(&self) -> bool {
        !self.nu_hz.is_empty()
            && self.nu_hz.len() == self.pol_angle_rad.len()
            && self.nu_hz.len() == self.pol_fraction.len()
    }

    fn check_correct(&self) -> Result<(), SourceError> {
        if self.is_correct() {
            Ok(())
        } else {
            Err(SourceError::Malformed {
                name: self.name.clone(),
                num_freqs: self.nu_hz.len(),
                num_angles: self.pol_angle_rad.len(),
                num_fractions: self.pol_fraction.len(),
            })
        }
    }

    /// The subsequence of `(nu, data)` samples with `nu_min <= nu <= nu_max`
    /// \[Hz\], in the original order. Restricting a polarization fit to a
    /// stable sub-band keeps the low-order polynomial well conditioned.
    pub fn filter(
        nu_hz: &Array1<f64>,
        data: &Array1<f64>,
        nu_min_hz: f64,
        nu_max_hz: f64,
    ) -> (Array1<f64>, Array1<f64>) {
        let (nu, data): (Vec<f64>, Vec<f64>) = nu_hz
            .iter()
            .zip(data.iter())
            .filter(|(&nu, _)| nu >= nu_min_hz && nu <= nu_max_hz)
            .map(|(&nu, &d)| (nu, d))
            .unzip();
        (Array1::from(nu), Array1::from(data))
    }

    /// Evaluate the catalog flux parameterization
    /// 10^(Σᵢ aᵢ log10(ν \[GHz\])ⁱ) at a single frequency. The catalog
    /// stores its polynomial against GHz, so the Hz input is converted
    /// here rather than at any call site.
    pub fn flux_scalar_with_coefficients(nu_hz: f64, coefficients: &[f64]) -> f64 {
        let log_nu_ghz = (nu_hz / HZ_PER_GHZ).log10();
        let mut power = 1.0;
        let mut log_flux = 0.0;
        for &a in coefficients {
            log_flux += a * power;
            power *= log_nu_ghz;
        }
        10.0_f64.powf(log_flux)
    }

    /// [`Self::flux_scalar_with_coefficients`] over an array of
    /// frequencies \[Hz\].
    pub fn flux_with_coefficients(nu_hz: &Array1<f64>, coefficients: &[f64]) -> Array1<f64> {
        nu_hz.mapv(|nu| Self::flux_scalar_with_coefficients(nu, coefficients))
    }

    /// The resolved catalog coefficients, if any.
    pub fn catalog_coefficients(&self) -> Option<&CatalogCoefficients> {
        self.catalog_coefficients.as_ref()
    }

    /// Overwrite the catalog coefficients (e.g. with the result of a
    /// flux-scale transfer).
    pub fn set_catalog_coefficients(&mut self, coefficients: CatalogCoefficients) {
        self.catalog_coefficients = Some(coefficients);
    }

    /// Resolve this source's flux coefficients from a standard catalog. An
    /// epoch with no data is a hard error.
    pub fn resolve_catalog_coefficients<C: StandardCatalog + ?Sized>(
        &mut self,
        catalog: &C,
        standard: Standard,
        epoch: &str,
    ) -> Result<&CatalogCoefficients, SourceError> {
        let looked_up = catalog.lookup_standard_coefficients(&self.name, standard, epoch)?;
        if looked_up.coefficients.is_empty() || looked_up.errors.is_empty() {
            return Err(SourceError::UnknownEpochOrStandard {
                standard,
                epoch: epoch.to_string(),
                source_name: self.name.clone(),
            });
        }
        debug!(
            "{}: catalog coefficients from {standard} epoch {epoch}: {:?}",
            self.name, looked_up.coefficients
        );
        Ok(self.catalog_coefficients.insert(looked_up))
    }

    /// The catalog model's flux density at one frequency \[Hz -> Jy\].
    pub fn flux_scalar(&self, nu_hz: f64) -> Result<f64, SourceError> {
        let c = self
            .catalog_coefficients
            .as_ref()
            .ok_or_else(|| SourceError::MissingCatalogCoefficients(self.name.clone()))?;
        Ok(Self::flux_scalar_with_coefficients(nu_hz, &c.coefficients))
    }

    /// The catalog model's flux densities over an array of frequencies.
    pub fn flux(&self, nu_hz: &Array1<f64>) -> Result<Array1<f64>, SourceError> {
        let c = self
            .catalog_coefficients
            .as_ref()
            .ok_or_else(|| SourceError::MissingCatalogCoefficients(self.name.clone()))?;
        Ok(Self::flux_with_coefficients(nu_hz, &c.coefficients))
    }

    /// Convert the catalog's absolute log10-polynomial flux model into a
    /// (spectral index, curvature) pair around `nu_0_hz` by fitting the
    /// power-law-with-curvature form against a synthetic evaluation of the
    /// catalog model over `nu_grid_hz`.
    ///
    /// The catalog's coefficient uncertainties are propagated into a
    /// per-point sigma: the model is evaluated at coefficients ± errors and
    /// half the spread is used to weight the fit, so the returned index and
    /// curvature errors reflect catalog uncertainty rather than the
    /// sampling of the synthetic grid. When `nu_0_hz` is `None`, the middle
    /// of the grid is used.
    pub fn fit_alpha_and_beta(
        &self,
        nu_grid_hz: &Array1<f64>,
        nu_0_hz: Option<f64>,
    ) -> Result<(Vec<f64>, Vec<f64>), SourceError> {
        let c = self
            .catalog_coefficients
            .as_ref()
            .ok_or_else(|| SourceError::MissingCatalogCoefficients(self.name.clone()))?;

        let nu_0_hz = nu_0_hz.unwrap_or_else(|| midpoint(nu_grid_hz));
        let flux_0 = Self::flux_scalar_with_coefficients(nu_0_hz, &c.coefficients);
        let fluxes = Self::flux_with_coefficients(nu_grid_hz, &c.coefficients);

        let upper: Vec<f64> = c
            .coefficients
            .iter()
            .zip(c.errors.iter())
            .map(|(a, e)| a + e)
            .collect();
        let lower: Vec<f64> = c
            .coefficients
            .iter()
            .zip(c.errors.iter())
            .map(|(a, e)| a - e)
            .collect();
        let sigma = (Self::flux_with_coefficients(nu_grid_hz, &upper)
            - Self::flux_with_coefficients(nu_grid_hz, &lower))
        .mapv(|s| 0.5 * s.abs());
        let sigma = if sigma.sum() == 0.0 { None } else { Some(sigma) };

        let initial: Vec<f64> = rand::thread_rng()
            .sample_iter(rand::distributions::Uniform::new(0.0, 1.0))
            .take(2)
            .collect();
        let mut model = FluxModel::new(nu_0_hz, flux_0);
        let fitted = model.fit(
            nu_grid_hz.view(),
            fluxes.view(),
            &initial,
            f64::NEG_INFINITY,
            f64::INFINITY,
            sigma.as_ref().map(|s| s.view()),
        )?;
        Ok(fitted)
    }

    /// Fit the (spectral index, curvature) flux model directly against this
    /// source's measured flux-density samples, for sources carrying flux
    /// measurements instead of catalog coefficients. The flux at the
    /// sample nearest `nu_0_hz` anchors the model.
    pub fn coefficients_from_flux(
        &self,
        nu_0_hz: Option<f64>,
    ) -> Result<(Vec<f64>, Vec<f64>), SourceError> {
        if self.flux_density_jy.is_empty() || self.flux_density_jy.iter().all(|&f| f == 0.0) {
            return Err(SourceError::NoFluxSamples(self.name.clone()));
        }

        let nu_0_hz = nu_0_hz.unwrap_or_else(|| midpoint(&self.nu_hz));
        let nearest = self
            .nu_hz
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (*a - nu_0_hz)
                    .abs()
                    .total_cmp(&(*b - nu_0_hz).abs())
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let flux_0 = self.flux_density_jy[nearest];

        let initial: Vec<f64> = rand::thread_rng()
            .sample_iter(rand::distributions::Uniform::new(0.0, 1.0))
            .take(2)
            .collect();
        let mut model = FluxModel::new(nu_0_hz, flux_0);
        let fitted = model.fit(
            self.nu_hz.view(),
            self.flux_density_jy.view(),
            &initial,
            f64::NEG_INFINITY,
            f64::INFINITY,
            None,
        )?;
        Ok(fitted)
    }

    /// Fit the polarization-fraction polynomial over the samples within
    /// `[nu_min_hz, nu_max_hz]`. Initial guesses are sampled uniformly in
    /// \[0,1\] and the coefficients are bounded to the same interval. A
    /// window containing no samples is a fit error.
    pub fn pol_fraction_coefficients(
        &self,
        num_terms: usize,
        nu_0_hz: Option<f64>,
        nu_min_hz: f64,
        nu_max_hz: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), SourceError> {
        self.check_correct()?;
        let (nu, fraction) = Self::filter(&self.nu_hz, &self.pol_fraction, nu_min_hz, nu_max_hz);
        if nu.is_empty() {
            return Err(FitError::InsufficientSamples {
                num_terms,
                num_samples: 0,
            }
            .into());
        }
        let nu_0_hz = nu_0_hz.unwrap_or_else(|| midpoint(&nu));

        let initial: Vec<f64> = rand::thread_rng()
            .sample_iter(rand::distributions::Uniform::new(0.0, 1.0))
            .take(num_terms)
            .collect();
        let mut model = PolynomialModel::new(nu_0_hz, num_terms);
        let fitted = model.fit(nu.view(), fraction.view(), &initial, 0.0, 1.0, None)?;
        Ok(fitted)
    }

    /// Fit the polarization-angle polynomial over the samples within
    /// `[nu_min_hz, nu_max_hz]`. Initial guesses are sampled uniformly in
    /// \[-π,π\] and the coefficients are bounded to the same interval. A
    /// window containing no samples is a fit error.
    pub fn pol_angle_coefficients(
        &self,
        num_terms: usize,
        nu_0_hz: Option<f64>,
        nu_min_hz: f64,
        nu_max_hz: f64,
    ) -> Result<(Vec<f64>, Vec<f64>), SourceError> {
        self.check_correct()?;
        let (nu, angle) = Self::filter(&self.nu_hz, &self.pol_angle_rad, nu_min_hz, nu_max_hz);
        if nu.is_empty() {
            return Err(FitError::InsufficientSamples {
                num_terms,
                num_samples: 0,
            }
            .into());
        }
        let nu_0_hz = nu_0_hz.unwrap_or_else(|| midpoint(&nu));

        let initial: Vec<f64> = rand::thread_rng()
            .sample_iter(rand::distributions::Uniform::new(-PI, PI))
            .take(num_terms)
            .collect();
        let mut model = PolynomialModel::new(nu_0_hz, num_terms);
        let fitted = model.fit(nu.view(), angle.view(), &initial, -PI, PI, None)?;
        Ok(fitted)
    }

    /// Resolve catalog coefficients and convert them to the intensity and
    /// (index, curvature) pair at `nu_0_hz`, over the standard synthetic
    /// grid spanning the catalog's characterized band.
    pub fn known_source_information<C: StandardCatalog + ?Sized>(
        &mut self,
        catalog: &C,
        nu_0_hz: f64,
        standard: Standard,
        epoch: &str,
    ) -> Result<KnownSourceInfo, SourceError> {
        self.resolve_catalog_coefficients(catalog, standard, epoch)?;
        let nu_grid_hz = Array1::linspace(
            CATALOG_FIT_MIN_FREQ_GHZ * HZ_PER_GHZ,
            CATALOG_FIT_MAX_FREQ_GHZ * HZ_PER_GHZ,
            CATALOG_FIT_NUM_FREQS,
        );
        let (spectral_idx, spectral_idx_errors) =
            self.fit_alpha_and_beta(&nu_grid_hz, Some(nu_0_hz))?;
        let intensity = self.flux_scalar(nu_0_hz)?;
        info!(
            "{}: I({:.4} GHz) = {intensity:.4} Jy, alpha/beta = {spectral_idx:?}",
            self.name,
            nu_0_hz / HZ_PER_GHZ
        );
        Ok(KnownSourceInfo {
            intensity,
            spectral_idx,
            spectral_idx_errors,
        })
    }

    /// Fit both polarization polynomials over `[nu_min_hz, nu_max_hz]` for
    /// pipeline consumption.
    pub fn source_polarization_information(
        &self,
        num_terms_angle: usize,
        num_terms_fraction: usize,
        nu_min_hz: f64,
        nu_max_hz: f64,
    ) -> Result<SourcePolInfo, SourceError> {
        let (pol_fraction_coefficients, pol_fraction_coefficient_errors) =
            self.pol_fraction_coefficients(num_terms_fraction, None, nu_min_hz, nu_max_hz)?;
        let (pol_angle_coefficients, pol_angle_coefficient_errors) =
            self.pol_angle_coefficients(num_terms_angle, None, nu_min_hz, nu_max_hz)?;
        Ok(SourcePolInfo {
            pol_angle_coefficients,
            pol_angle_coefficient_errors,
            pol_fraction_coefficients,
            pol_fraction_coefficient_errors,
        })
    }
}

/// The midpoint of an array's extrema.
fn midpoint(nu: &Array1<f64>) -> f64 {
    let min = nu.iter().copied().fold(f64::INFINITY, f64::min);
    let max = nu.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    0.5 * (min + max)
}
