// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading calibrator sources from external whitespace-separated tables.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use itertools::Itertools;
use log::debug;
use ndarray::Array1;

use crate::constants::HZ_PER_GHZ;

use super::{CalibratorSource, SourceError};

/// Read a calibrator source from a whitespace-separated table file.
///
/// Each non-comment line holds four columns: frequency \[GHz\], flux
/// density \[Jy\], linear polarization fraction \[percent\] and
/// polarization angle \[rad\]. Lines starting with `#` and blank lines are
/// skipped. Rows are sorted by frequency, and the source takes its name
/// from the uppercased file stem.
pub fn source_from_table_file(path: &Path) -> Result<CalibratorSource, SourceError> {
    let file = File::open(path).map_err(|e| SourceError::ParseTable {
        path: path.to_path_buf(),
        line: 0,
        message: e.to_string(),
    })?;

    let mut rows: Vec<[f64; 4]> = vec![];
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line_num = i + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let columns: Vec<f64> = trimmed
            .split_whitespace()
            .map(|c| {
                c.parse::<f64>().map_err(|e| SourceError::ParseTable {
                    path: path.to_path_buf(),
                    line: line_num,
                    message: format!("'{c}': {e}"),
                })
            })
            .collect::<Result<_, _>>()?;
        match columns[..] {
            [freq_ghz, flux_jy, fraction_percent, angle_rad] => {
                rows.push([freq_ghz, flux_jy, fraction_percent, angle_rad])
            }
            _ => {
                return Err(SourceError::ParseTable {
                    path: path.to_path_buf(),
                    line: line_num,
                    message: format!("expected 4 columns, found {}", columns.len()),
                })
            }
        }
    }
    if rows.is_empty() {
        return Err(SourceError::ParseTable {
            path: path.to_path_buf(),
            line: 0,
            message: "no data rows".to_string(),
        });
    }

    rows.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    debug!("Read {} rows for {name} from {}", rows.len(), path.display());

    let (nu_hz, flux_jy, fraction, angle_rad): (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) = rows
        .iter()
        .map(|r| (r[0] * HZ_PER_GHZ, r[1], r[2] / 100.0, r[3]))
        .multiunzip();

    Ok(CalibratorSource::from_parts(
        name,
        Array1::from(nu_hz),
        Array1::from(flux_jy),
        Array1::from(angle_rad),
        Array1::from(fraction),
    ))
}
