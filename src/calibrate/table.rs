// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration-table artifacts.
//!
//! Every solve stage writes its solutions to a table named after the
//! dataset stem (`x.ms` solves into `x.Kcross`, `x.D0`, ...). The table's
//! existence on storage afterwards is the only witness of success the
//! pipeline trusts; [`CalTable::ensure_solved`] turns its absence into a
//! fatal error.

use std::path::{Path, PathBuf};

use super::CalibrateError;

/// A solve stage's expected output table.
#[derive(Debug, Clone)]
pub(super) struct CalTable {
    path: PathBuf,

    /// A short human-readable stage name for errors and plots.
    stage: &'static str,
}

impl CalTable {
    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn stage(&self) -> &'static str {
        self.stage
    }

    pub(super) fn exists(&self) -> bool {
        self.path.exists()
    }

    /// The post-solve witness check.
    pub(super) fn ensure_solved(&self, dataset: &Path) -> Result<(), CalibrateError> {
        if self.exists() {
            Ok(())
        } else {
            Err(CalibrateError::MissingArtifact {
                stage: self.stage,
                table: self.path.clone(),
                dataset: dataset.to_path_buf(),
            })
        }
    }
}

/// `x.ms` -> `x.<extension>`. A dataset path without a usable stem can't
/// name its tables.
fn stem_table(dataset: &Path, extension: &str) -> Result<PathBuf, CalibrateError> {
    match dataset.file_stem() {
        Some(stem) if !stem.is_empty() => Ok(dataset.with_extension(extension)),
        _ => Err(CalibrateError::BadDatasetName(dataset.to_path_buf())),
    }
}

pub(super) fn cross_hand_delay(dataset: &Path) -> Result<CalTable, CalibrateError> {
    Ok(CalTable {
        path: stem_table(dataset, "Kcross")?,
        stage: "cross-hand delay",
    })
}

/// The leakage table: `.D0` for the pipeline's own leakage field, or
/// `.D.<field>` when solving for an explicitly named field.
pub(super) fn leakage(dataset: &Path, field: Option<&str>) -> Result<CalTable, CalibrateError> {
    let extension = match field {
        Some(field) => format!("D.{field}"),
        None => "D0".to_string(),
    };
    Ok(CalTable {
        path: stem_table(dataset, &extension)?,
        stage: "leakage",
    })
}

pub(super) fn pol_angle(dataset: &Path) -> Result<CalTable, CalibrateError> {
    Ok(CalTable {
        path: stem_table(dataset, "X0")?,
        stage: "polarization angle",
    })
}

pub(super) fn flux_scale(dataset: &Path, field: &str) -> Result<CalTable, CalibrateError> {
    Ok(CalTable {
        path: stem_table(dataset, &format!("F.{field}"))?,
        stage: "flux scale",
    })
}
