// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad dissipator computation.
//!
//! Computes D[L](ρ) = L ρ L† − ½{L†L, ρ} for each registered operator, using
//! the (L†, L†L) pair cached at finalize. Every product with ρ is a sparse
//! kernel, so L is never densified.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use num_complex::Complex64;

use crate::matrix::{c, commutator, DenseMatrix, SparseMatrix};

use super::registry::ReadyRegistry;
use super::types::Derivatives;

/// Dissipator contribution of a single operator.
///
/// D[L](ρ) = L ρ L† − ½ L†L ρ − ½ ρ L†L
///
/// Rates are folded into L (√γ·L), so there is no separate γ.
pub fn dissipator(l: &SparseMatrix, derivatives: &Derivatives, rho: &DenseMatrix) -> DenseMatrix {
    let mut out = DenseMatrix::zeros(rho.raw_dim());
    accumulate_dissipator(&mut out, l, derivatives, rho);
    out
}

fn accumulate_dissipator(
    out: &mut DenseMatrix,
    l: &SparseMatrix,
    derivatives: &Derivatives,
    rho: &DenseMatrix,
) {
    let half = c(-0.5);
    // L ρ L†
    let l_rho_ldag = derivatives.adjoint.apply_right(&l.apply_left(rho));
    *out += &l_rho_ldag;
    out.scaled_add(half, &derivatives.adjoint_product.apply_left(rho));
    out.scaled_add(half, &derivatives.adjoint_product.apply_right(rho));
}

/// Total dissipator Σ_k D[L_k](ρ).
///
/// Zero when no operators are registered.
pub fn total_dissipator(ready: &ReadyRegistry<'_>, rho: &DenseMatrix) -> DenseMatrix {
    let mut total = DenseMatrix::zeros(rho.raw_dim());
    for (l, derivatives) in ready.channels() {
        accumulate_dissipator(&mut total, l, derivatives, rho);
    }
    total
}

/// Coherent part −i[H, ρ].
pub fn coherent_term(hamiltonian: &DenseMatrix, rho: &DenseMatrix, parallel: bool) -> DenseMatrix {
    commutator(hamiltonian, rho, parallel) * Complex64::new(0.0, -1.0)
}

/// Full master-equation right-hand side.
///
/// dρ/dt = −i[H, ρ] + Σ_k D[L_k](ρ), with the coherent term omitted when no
/// Hamiltonian is registered.
pub fn lindblad_rhs(ready: &ReadyRegistry<'_>, rho: &DenseMatrix, parallel: bool) -> DenseMatrix {
    let mut drho = total_dissipator(ready, rho);
    if let Some(h) = ready.hamiltonian() {
        drho += &coherent_term(h, rho, parallel);
    }
    drho
}
