// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test fixtures for engine tests.

use ndarray::Array2;
use num_complex::Complex64;

use crate::matrix::{c, DenseMatrix};

/// ρ = |0⟩⟨0|
pub fn ground_state() -> DenseMatrix {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = c(1.0);
    m
}

/// ρ = |1⟩⟨1|
pub fn excited_state() -> DenseMatrix {
    let mut m = Array2::zeros((2, 2));
    m[[1, 1]] = c(1.0);
    m
}

/// ρ = |+⟩⟨+| = ½(I + σx)
pub fn plus_state() -> DenseMatrix {
    Array2::from_elem((2, 2), c(0.5))
}

/// σ⁻ = |0⟩⟨1|
pub fn sigma_minus() -> DenseMatrix {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = c(1.0);
    m
}

/// σz / 2
pub fn sigma_z_half() -> DenseMatrix {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = c(0.5);
    m[[1, 1]] = c(-0.5);
    m
}

/// σx
pub fn pauli_x() -> DenseMatrix {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = c(1.0);
    m[[1, 0]] = c(1.0);
    m
}

/// H = diag(0, 1)
pub fn two_level_hamiltonian() -> DenseMatrix {
    let mut m = Array2::zeros((2, 2));
    m[[1, 1]] = c(1.0);
    m
}

/// A 3×3 non-normal complex matrix with a few structural zeros.
pub fn sample_non_normal() -> DenseMatrix {
    let mut m = Array2::zeros((3, 3));
    m[[0, 0]] = Complex64::new(0.4, 0.2);
    m[[0, 1]] = Complex64::new(1.0, -0.5);
    m[[1, 1]] = Complex64::new(-0.3, 0.0);
    m[[1, 2]] = Complex64::new(0.0, 0.8);
    m[[2, 0]] = Complex64::new(0.25, 0.0);
    m[[2, 2]] = Complex64::new(0.1, -0.7);
    m
}

/// Assert element-wise closeness within `tol`.
pub fn assert_matrix_close(a: &DenseMatrix, b: &DenseMatrix, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff <= tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}
