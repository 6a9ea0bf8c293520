//! `.cube` 3D LUT text format.
//!
//! ```text
//! # Comment
//! TITLE "Portra-ish"
//! LUT_3D_SIZE 32
//! 0.000000 0.000000 0.000000
//! 0.032258 0.000000 0.000000
//! ...
//! 1.000000 1.000000 1.000000
//! ```
//!
//! Rows are expected in the standard order (red fastest) and are stored as
//! encountered. Rows that aren't three finite numbers are skipped; other
//! directives (`TITLE`, `DOMAIN_MIN`, ...) are ignored.

use tracing::debug;

use super::{Lut, MAX_SIZE};
use crate::error::LutError;

const SIZE_DIRECTIVE: &str = "LUT_3D_SIZE";

/// Parse `.cube` text into a [`Lut`] with entries scaled to 0..=255.
pub fn parse(text: &str) -> Result<Lut, LutError> {
    let mut size = 0usize;
    let mut data = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        if first == SIZE_DIRECTIVE {
            size = parse_size(line)?;
            continue;
        }
        if first.starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }

        match parse_row(line) {
            Some([r, g, b]) => data.extend([r * 255.0, g * 255.0, b * 255.0, 255.0]),
            None => skipped += 1,
        }
    }

    if size == 0 {
        return Err(LutError::MissingSize);
    }
    debug!(size, rows = data.len() / 4, skipped, "parsed cube");
    Lut::from_entries(size, data)
}

/// Value of a `LUT_3D_SIZE` line. Accepts the Adobe `.cube` range
/// `2..=MAX_SIZE`, so `LUT_3D_SIZE 1` is an error even with one valid row.
fn parse_size(line: &str) -> Result<usize, LutError> {
    let token = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| LutError::InvalidSize("missing value".into()))?;
    let size: usize = token
        .parse()
        .map_err(|_| LutError::InvalidSize(token.to_string()))?;
    if !(2..=MAX_SIZE).contains(&size) {
        return Err(LutError::InvalidSize(format!(
            "{size} is outside 2..={MAX_SIZE}"
        )));
    }
    Ok(size)
}

fn parse_row(line: &str) -> Option<[f32; 3]> {
    let mut tokens = line.split_whitespace();
    let mut rgb = [0.0f32; 3];
    for v in &mut rgb {
        *v = tokens.next()?.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
    }
    if tokens.next().is_some() {
        return None;
    }
    Some(rgb)
}
