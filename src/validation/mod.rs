// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for flat boundary buffers.
//!
//! The core assumes correctly sized input once the dimension is set; these
//! checks run before any buffer is turned into a matrix.

use crate::error::{Error, Result};

/// Validate an interleaved row-major complex buffer of side `dim`.
pub fn validate_flat_matrix(field: &str, values: &[f64], dim: usize) -> Result<()> {
    if dim == 0 {
        return Err(Error::InvalidDimension(dim));
    }
    let expected = 2 * dim * dim;
    if values.len() != expected {
        return Err(Error::mismatch(
            format!("{field} buffer length"),
            expected,
            values.len(),
        ));
    }
    Ok(())
}

/// Validate a flat `[row, col, re, im]*` buffer for operators of side `dim`.
pub fn validate_triplets(field: &str, values: &[f64], dim: usize) -> Result<()> {
    if dim == 0 {
        return Err(Error::InvalidDimension(dim));
    }
    if values.len() % 4 != 0 {
        return Err(Error::InvalidBuffer(format!(
            "{field}: length {} is not a multiple of 4",
            values.len()
        )));
    }

    for (entry, chunk) in values.chunks_exact(4).enumerate() {
        for (name, val) in [("row", chunk[0]), ("col", chunk[1])] {
            if !val.is_finite() || val < 0.0 || val.fract() != 0.0 {
                return Err(Error::InvalidBuffer(format!(
                    "{field}: entry {entry} has non-integral {name} index {val}"
                )));
            }
            if val >= dim as f64 {
                return Err(Error::InvalidBuffer(format!(
                    "{field}: entry {entry} {name} index {val} out of range for dimension {dim}"
                )));
            }
        }
        for (name, val) in [("re", chunk[2]), ("im", chunk[3])] {
            if val.is_nan() {
                return Err(Error::InvalidBuffer(format!(
                    "{field}: entry {entry} contains NaN in {name}"
                )));
            }
            if val.is_infinite() {
                return Err(Error::InvalidBuffer(format!(
                    "{field}: entry {entry} contains Inf in {name}"
                )));
            }
        }
    }

    Ok(())
}

/// Validate a macro timestep.
pub fn validate_timestep(dt: f64) -> Result<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(Error::InvalidTimestep(format!(
            "dt must be a positive finite number, got {dt}"
        )));
    }
    Ok(())
}

/// Validate the substep bound of a subcycled evolution.
pub fn validate_max_dt(max_dt: f64) -> Result<()> {
    if !max_dt.is_finite() || max_dt <= 0.0 {
        return Err(Error::InvalidTimestep(format!(
            "max_dt must be a positive finite number, got {max_dt}"
        )));
    }
    Ok(())
}
