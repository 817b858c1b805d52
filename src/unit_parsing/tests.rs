// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn naked_number_is_hz() {
    let (q, f) = parse_freq("1400000000").unwrap();
    assert_abs_diff_eq!(q, 1.4e9);
    assert_eq!(f, FreqFormat::NoUnit);
    assert_abs_diff_eq!(f.to_hz(q), 1.4e9);
}

#[test]
fn parse_with_units() {
    let (q, f) = parse_freq("1400MHz").unwrap();
    assert_abs_diff_eq!(q, 1400.0);
    assert_eq!(f, FreqFormat::MHz);
    assert_abs_diff_eq!(f.to_hz(q), 1.4e9);

    let (q, f) = parse_freq("1.4 GHz").unwrap();
    assert_abs_diff_eq!(q, 1.4);
    assert_eq!(f, FreqFormat::GHz);
    assert_abs_diff_eq!(f.to_hz(q), 1.4e9);

    let (q, f) = parse_freq("250 kHz").unwrap();
    assert_abs_diff_eq!(q, 250.0);
    assert_eq!(f, FreqFormat::kHz);
    assert_abs_diff_eq!(f.to_hz(q), 250e3);

    // Case insensitive.
    let (q, f) = parse_freq("3ghz").unwrap();
    assert_abs_diff_eq!(q, 3.0);
    assert_eq!(f, FreqFormat::GHz);
}

#[test]
fn parse_freq_hz_shortcut() {
    assert_abs_diff_eq!(parse_freq_hz("2GHz").unwrap(), 2e9);
    assert_abs_diff_eq!(parse_freq_hz("33.0").unwrap(), 33.0);
}

#[test]
fn bad_input_is_rejected() {
    let result = parse_freq("chickens");
    assert!(result.is_err());

    let result = parse_freq("..1GHz");
    assert!(result.is_err());
}
