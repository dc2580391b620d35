// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Density-matrix observables.
//!
//! Pure functions of ρ; none of them validate physicality. A ρ with zero trace
//! passed to [`normalize`] yields non-finite entries rather than an error.

use num_complex::Complex64;

use crate::matrix::{DenseMatrix, Operator};

/// Tr(ρ).
pub fn trace(rho: &DenseMatrix) -> Complex64 {
    rho.diag().iter().sum()
}

/// Purity Re Tr(ρ²), computed without forming ρ².
pub fn purity(rho: &DenseMatrix) -> f64 {
    let mut acc = Complex64::new(0.0, 0.0);
    for ((i, j), &value) in rho.indexed_iter() {
        acc += value * rho[[j, i]];
    }
    acc.re
}

/// ⟨O⟩ = Tr(O ρ), without forming O ρ.
///
/// Sparse operators touch only their stored entries.
pub fn expectation_value(op: &Operator, rho: &DenseMatrix) -> Complex64 {
    match op {
        Operator::Dense(o) => {
            let mut acc = Complex64::new(0.0, 0.0);
            for ((i, k), &value) in o.indexed_iter() {
                acc += value * rho[[k, i]];
            }
            acc
        }
        Operator::Sparse(s) => s
            .entries()
            .into_iter()
            .map(|(i, k, value)| value * rho[[k, i]])
            .sum(),
    }
}

/// ρ / Tr(ρ).
pub fn normalize(rho: &DenseMatrix) -> DenseMatrix {
    rho / trace(rho)
}

/// Frobenius norm ‖ρ − ρ†‖.
pub fn hermitian_deviation(rho: &DenseMatrix) -> f64 {
    rho.indexed_iter()
        .map(|((i, j), &value)| (value - rho[[j, i]].conj()).norm_sqr())
        .sum::<f64>()
        .sqrt()
}

/// Whether ρ is Hermitian within `tol`.
pub fn is_hermitian(rho: &DenseMatrix, tol: f64) -> bool {
    hermitian_deviation(rho) <= tol
}
