//! Deterministic seeding for mock analyses.
//!
//! Every derived value is a pure function of `(seed, min, max)` so the same
//! upload always yields the same result, regardless of when or how often it
//! is analysed.

use super::models::ImageUpload;

const SIZE_MODULUS: u64 = 97;
const NAME_WEIGHT: u64 = 7;

/// `(byte_size mod 97) + 7 * filename_length`.
///
/// Filename length counts UTF-16 code units so names with non-ASCII characters
/// seed the same way they do in a browser.
pub fn scan_seed(byte_size: u64, filename: &str) -> u64 {
    let name_len = filename.encode_utf16().count() as u64;
    (byte_size % SIZE_MODULUS) + NAME_WEIGHT * name_len
}

pub fn seed_for_upload(upload: &ImageUpload) -> u64 {
    scan_seed(upload.byte_size(), &upload.filename)
}

/// Pseudo-random value in `[min, max]`, rounded to one decimal place.
pub fn seeded_value(seed: u64, min: f64, max: f64) -> f64 {
    let unit = ((seed as f64 + min + max).sin() + 1.0) / 2.0;
    round_tenth(min + unit * (max - min))
}

/// `seeded_value` rounded to the nearest integer.
pub fn seeded_whole(seed: u64, min: f64, max: f64) -> f64 {
    seeded_value(seed, min, max).round()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
