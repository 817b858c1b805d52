// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spectral-window selectors and the spw-mapping policy.

use crate::engine::SpwMap;

/// The contiguous selector spanning all active spectral windows,
/// e.g. `"0~5"`.
pub(super) fn span_selector(spw_ids: &[usize]) -> String {
    match (spw_ids.first(), spw_ids.last()) {
        (Some(first), Some(last)) => format!("{first}~{last}"),
        _ => String::new(),
    }
}

/// The cross-hand delay solve's selector: the full span unless a narrower
/// interval is requested, with an optional channel sub-range (e.g.
/// `"0~5:13~115"`) to keep band edges out of the delay solve.
pub(super) fn cross_hand_selector(spw_ids: &[usize], spw_interval: &str, channels: &str) -> String {
    let spw = if spw_interval.is_empty() {
        span_selector(spw_ids)
    } else {
        spw_interval.to_string()
    };
    if channels.is_empty() {
        spw
    } else {
        format!("{spw}:{channels}")
    }
}

/// The default spw maps for a gain chain of `num_tables` upstream tables.
///
/// The head of the chain is the table solved across the combined spectral
/// span (the cross-hand delay, or the leakage table when no delay was
/// solved), so its single solved window is broadcast to every window; the
/// remaining tables were solved per window and keep the identity mapping.
/// An empty chain gets an empty map list.
pub(super) fn chain_maps(num_tables: usize, mapped_spw: usize, num_spws: usize) -> Vec<SpwMap> {
    match num_tables {
        0 => vec![],
        n => {
            let mut maps = vec![SpwMap::broadcast(mapped_spw, num_spws)];
            maps.extend(std::iter::repeat(SpwMap::identity()).take(n - 1));
            maps
        }
    }
}
