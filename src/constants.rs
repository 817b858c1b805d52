// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All frequencies in this crate are stored in Hz; anything arriving in other
units is converted at the boundary with the factors below. The standard
catalogs parameterize their flux models in log10(freq \[GHz\]), so that one
conversion is explicit wherever catalog coefficients are evaluated.
 */

pub use std::f64::consts::PI;

/// Hz per GHz.
pub const HZ_PER_GHZ: f64 = 1e9;

/// Hz per MHz.
pub const HZ_PER_MHZ: f64 = 1e6;

/// Hz per kHz.
pub const HZ_PER_KHZ: f64 = 1e3;

/// Radians per degree.
pub const RAD_PER_DEG: f64 = PI / 180.0;

/// The span \[GHz\] and size of the synthetic frequency grid used to convert
/// catalog log10-polynomial flux coefficients into a (spectral index,
/// curvature) pair around a chosen reference frequency. The span covers the
/// full range over which the standard catalogs are characterized.
pub const CATALOG_FIT_MIN_FREQ_GHZ: f64 = 0.3275;
pub const CATALOG_FIT_MAX_FREQ_GHZ: f64 = 50.0;
pub const CATALOG_FIT_NUM_FREQS: usize = 40;

/// Leakage (D-term) solutions with amplitudes outside this range are
/// physically implausible and get clip-flagged after the leakage solve.
pub const DEFAULT_LEAKAGE_CLIP_MIN: f64 = 0.0;
pub const DEFAULT_LEAKAGE_CLIP_MAX: f64 = 0.25;

/// Default minimum SNR for calibration solves.
pub const DEFAULT_MIN_SNR: f64 = 3.0;

/// Default solution interval for calibration solves.
pub const DEFAULT_SOL_INT: &str = "inf";
