// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into frequencies with a unit.

mod error;
#[cfg(test)]
mod tests;

pub use error::UnitParseError;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::constants::{HZ_PER_GHZ, HZ_PER_KHZ, HZ_PER_MHZ};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[allow(non_camel_case_types)]
pub enum FreqFormat {
    /// Hertz
    Hz,

    /// kiloHertz
    kHz,

    /// megaHertz
    MHz,

    /// gigaHertz
    GHz,

    NoUnit,
}

impl FreqFormat {
    /// Convert a quantity in this unit to Hz. A naked number is taken to
    /// already be in Hz.
    pub fn to_hz(self, quantity: f64) -> f64 {
        match self {
            FreqFormat::Hz | FreqFormat::NoUnit => quantity,
            FreqFormat::kHz => quantity * HZ_PER_KHZ,
            FreqFormat::MHz => quantity * HZ_PER_MHZ,
            FreqFormat::GHz => quantity * HZ_PER_GHZ,
        }
    }
}

/// Parse a string that may have a unit of frequency attached to it.
pub fn parse_freq(s: &str) -> Result<(f64, FreqFormat), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, FreqFormat::NoUnit));
    };

    // That didn't work; let's search over our supported formats.
    for freq_format in FreqFormat::iter().filter(|&f| f != FreqFormat::NoUnit) {
        let freq_format_str: &'static str = freq_format.into();
        let suffix = s
            .trim()
            .trim_start_matches(|c| char::is_numeric(c) || c == '.' || c == '-')
            .trim();
        if suffix.to_uppercase() == freq_format_str.to_uppercase() {
            let prefix = s.trim().trim_end_matches(char::is_alphabetic).trim();
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => return Err(UnitParseError::GotFreqUnitButCantParse(s.to_string())),
            };
            return Ok((number, freq_format));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "frequency",
    })
}

/// Parse a string that may have a unit of frequency attached to it, returning
/// the quantity in Hz.
pub fn parse_freq_hz(s: &str) -> Result<f64, UnitParseError> {
    let (quantity, format) = parse_freq(s)?;
    Ok(format.to_hz(quantity))
}
