// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Flat numeric buffer codec.
//!
//! Dense matrices travel as row-major interleaved `[re, im]` pairs of length
//! `2·dim²`. Sparse operators travel as `[row, col, re, im]` 4-tuples. Every
//! decoder validates its buffer first.

use std::collections::BTreeMap;

use num_complex::Complex64;

use crate::error::{Error, Result};
use crate::lindblad::EvolutionMetrics;
use crate::matrix::{DenseMatrix, SparseMatrix};
use crate::validation::{validate_flat_matrix, validate_triplets};

/// Decode an interleaved buffer into a `dim × dim` matrix.
pub fn unpack_dense(field: &str, values: &[f64], dim: usize) -> Result<DenseMatrix> {
    validate_flat_matrix(field, values, dim)?;
    let entries: Vec<Complex64> = values
        .chunks_exact(2)
        .map(|pair| Complex64::new(pair[0], pair[1]))
        .collect();
    DenseMatrix::from_shape_vec((dim, dim), entries)
        .map_err(|e| Error::InvalidBuffer(format!("{field}: {e}")))
}

/// Encode a matrix as a row-major interleaved buffer.
pub fn pack_dense(m: &DenseMatrix) -> Vec<f64> {
    let mut out = Vec::with_capacity(2 * m.len());
    for z in m.iter() {
        out.push(z.re);
        out.push(z.im);
    }
    out
}

/// Decode a `[row, col, re, im]*` buffer into a sparse operator.
///
/// Negligible entries are dropped and repeated positions are summed.
pub fn parse_triplets(field: &str, values: &[f64], dim: usize) -> Result<SparseMatrix> {
    validate_triplets(field, values, dim)?;
    let entries = values.chunks_exact(4).map(|chunk| {
        (
            chunk[0] as usize,
            chunk[1] as usize,
            Complex64::new(chunk[2], chunk[3]),
        )
    });
    Ok(SparseMatrix::from_triplets(dim, entries))
}

/// Flat key → value view of the metrics snapshot.
pub fn metrics_map(metrics: &EvolutionMetrics) -> BTreeMap<&'static str, f64> {
    BTreeMap::from([
        ("evolution_time_ms", metrics.evolution_time_ms),
        ("matrix_exp_time_ms", metrics.matrix_exp_time_ms),
        ("lindblad_time_ms", metrics.lindblad_time_ms),
        ("pade_iterations", f64::from(metrics.pade_iterations)),
        ("hilbert_dim", metrics.hilbert_dim as f64),
    ])
}
