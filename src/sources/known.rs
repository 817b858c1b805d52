// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Empirical polarization tables for the well-characterized calibrators.
//!
//! These are the published VLA observing-guide values: polarization angle
//! and linear polarization fraction sampled at 24 frequencies from 1.05 to
//! 43.5 GHz. Native units are GHz, degrees and percent; normalization to
//! Hz, radians and the unit interval happens when a
//! [`CalibratorSource`](super::CalibratorSource) is built from a variant.

use strum_macros::{Display, EnumIter, EnumString};

/// The calibrators with embedded empirical polarization tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum KnownCalibrator {
    #[strum(serialize = "3C48")]
    ThreeC48,

    #[strum(serialize = "3C138")]
    ThreeC138,

    #[strum(serialize = "3C286")]
    ThreeC286,

    #[strum(serialize = "3C147")]
    ThreeC147,
}

/// The sample frequencies shared by all embedded tables \[GHz\].
pub(super) const SAMPLE_FREQS_GHZ: [f64; 24] = [
    1.05, 1.45, 1.64, 1.95, 2.45, 2.95, 3.25, 3.75, 4.50, 5.00, 6.50, 7.25, 8.10, 8.80, 12.8,
    13.7, 14.6, 15.5, 18.1, 19.0, 22.4, 23.3, 36.5, 43.5,
];

const POL_ANGLE_DEG_3C48: [f64; 24] = [
    25.0, 140.0, -5.0, -150.0, -120.0, -100.0, -92.0, -84.0, -75.0, -72.0, -68.0, -67.0, -64.0,
    -62.0, -62.0, -62.0, -63.0, -64.0, -66.0, -67.0, -70.0, -70.0, -77.0, -85.0,
];

const POL_FRACTION_PERCENT_3C48: [f64; 24] = [
    0.3, 0.5, 0.7, 0.9, 1.4, 2.0, 2.5, 3.2, 3.8, 4.2, 5.2, 5.2, 5.3, 5.4, 6.0, 6.1, 6.4, 6.4,
    6.9, 7.1, 7.7, 7.8, 7.4, 7.5,
];

const POL_ANGLE_DEG_3C138: [f64; 24] = [
    -14.0, -11.0, -10.0, -10.0, -9.0, -10.0, -10.0, 0.0, -11.0, -11.0, -12.0, -12.0, -10.0, -8.0,
    -7.0, -7.0, -8.0, -9.0, -12.0, -13.0, -16.0, -17.0, -24.0, -27.0,
];

const POL_FRACTION_PERCENT_3C138: [f64; 24] = [
    5.6, 7.5, 8.4, 9.0, 10.4, 10.7, 10.0, 0.0, 10.0, 10.4, 9.8, 10.0, 10.4, 10.1, 8.4, 7.9, 7.7,
    7.4, 6.7, 6.5, 6.7, 6.6, 6.6, 6.5,
];

const POL_ANGLE_DEG_3C286: [f64; 24] = [
    33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 33.0, 34.0, 34.0, 34.0,
    34.0, 34.0, 34.0, 34.0, 35.0, 35.0, 35.0, 36.0, 36.0,
];

const POL_FRACTION_PERCENT_3C286: [f64; 24] = [
    8.6, 9.5, 9.9, 10.1, 10.5, 10.8, 10.9, 11.1, 11.3, 11.4, 11.6, 11.7, 11.9, 11.9, 11.9, 11.9,
    12.1, 12.2, 12.5, 12.5, 12.6, 12.6, 13.1, 13.2,
];

const POL_ANGLE_DEG_3C147: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -100.0, 0.0, -65.0, -39.0, -24.0, -11.0, 43.0, 48.0,
    53.0, 59.0, 67.0, 68.0, 75.0, 76.0, 85.0, 86.0,
];

const POL_FRACTION_PERCENT_3C147: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.3, 0.3, 0.6, 0.7, 0.8, 2.2, 2.4, 2.7, 2.9,
    3.4, 3.5, 3.8, 3.8, 4.4, 5.2,
];

impl KnownCalibrator {
    /// The calibrator's polarization angles \[degrees\] at
    /// [`SAMPLE_FREQS_GHZ`].
    pub(super) fn pol_angles_deg(self) -> &'static [f64; 24] {
        match self {
            KnownCalibrator::ThreeC48 => &POL_ANGLE_DEG_3C48,
            KnownCalibrator::ThreeC138 => &POL_ANGLE_DEG_3C138,
            KnownCalibrator::ThreeC286 => &POL_ANGLE_DEG_3C286,
            KnownCalibrator::ThreeC147 => &POL_ANGLE_DEG_3C147,
        }
    }

    /// The calibrator's linear polarization fractions \[percent\] at
    /// [`SAMPLE_FREQS_GHZ`].
    pub(super) fn pol_fractions_percent(self) -> &'static [f64; 24] {
        match self {
            KnownCalibrator::ThreeC48 => &POL_FRACTION_PERCENT_3C48,
            KnownCalibrator::ThreeC138 => &POL_FRACTION_PERCENT_3C138,
            KnownCalibrator::ThreeC286 => &POL_FRACTION_PERCENT_3C286,
            KnownCalibrator::ThreeC147 => &POL_FRACTION_PERCENT_3C147,
        }
    }
}
