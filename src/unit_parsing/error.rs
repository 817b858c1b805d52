// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with parsing quantities with units.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnitParseError {
    #[error("Found a frequency unit in '{0}', but couldn't parse the rest of it as a number")]
    GotFreqUnitButCantParse(String),

    #[error("Couldn't parse '{input}' as a {unit_type} quantity")]
    Unknown {
        input: String,
        unit_type: &'static str,
    },
}
