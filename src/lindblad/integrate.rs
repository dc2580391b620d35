// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time-stepping for the Lindblad master equation.
//!
//! Two families of steps, both working against a finalized registry:
//!
//! - explicit Euler on the full right-hand side, optionally subcycled so that
//!   no substep exceeds `max_dt`;
//! - an operator split: the coherent part is applied exactly as U ρ U† with
//!   U = exp(−iH·dt), then the dissipator advances ρ by one Euler step.
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use num_complex::Complex64;

use crate::expm::{Exponential, PadeSolver};
use crate::matrix::{c, dagger, matmul, DenseMatrix};

use super::dissipator::{lindblad_rhs, total_dissipator};
use super::registry::ReadyRegistry;

/// Largest substep count a single subcycled call will run.
pub const MAX_SUBSTEPS: usize = 1_000_000;

/// Number of equal substeps needed so that none exceeds `max_dt`.
///
/// One step when `dt` already fits, when `dt` is not finite, or when `max_dt`
/// is not a positive number. Counts past `usize::MAX` saturate.
pub fn substep_count(dt: f64, max_dt: f64) -> usize {
    if !dt.is_finite() || !(max_dt > 0.0) || dt <= max_dt {
        return 1;
    }
    ((dt / max_dt).ceil() as usize).max(1)
}

/// One explicit Euler step in place: ρ ← ρ + dt · L(ρ).
pub fn euler_step(ready: &ReadyRegistry<'_>, rho: &mut DenseMatrix, dt: f64, parallel: bool) {
    let drho = lindblad_rhs(ready, rho, parallel);
    rho.scaled_add(c(dt), &drho);
}

/// Euler over a macro step `dt`, split into [`substep_count`] equal substeps.
///
/// Returns the number of substeps taken.
pub fn evolve_subcycled(
    ready: &ReadyRegistry<'_>,
    rho: &mut DenseMatrix,
    dt: f64,
    max_dt: f64,
    parallel: bool,
) -> usize {
    let n = substep_count(dt, max_dt);
    let h = dt / n as f64;
    for _ in 0..n {
        euler_step(ready, rho, h, parallel);
    }
    n
}

/// Dissipator-only Euler step in place: ρ ← ρ + dt · Σ_k D[L_k](ρ).
pub fn dissipative_step(ready: &ReadyRegistry<'_>, rho: &mut DenseMatrix, dt: f64) {
    let d = total_dissipator(ready, rho);
    rho.scaled_add(c(dt), &d);
}

/// U = exp(−iH·dt).
pub fn propagator(solver: &PadeSolver, hamiltonian: &DenseMatrix, dt: f64) -> Exponential {
    solver.exponential(&(hamiltonian * Complex64::new(0.0, -dt)))
}

/// Conjugation U ρ U†.
pub fn unitary_step(u: &DenseMatrix, rho: &DenseMatrix, parallel: bool) -> DenseMatrix {
    matmul(&matmul(u, rho, parallel), &dagger(u), parallel)
}

/// Split step: U ρ U† (skipped when `u` is `None`), then one dissipator step.
pub fn split_step(
    ready: &ReadyRegistry<'_>,
    u: Option<&DenseMatrix>,
    rho: &DenseMatrix,
    dt: f64,
    parallel: bool,
) -> DenseMatrix {
    let mut next = match u {
        Some(u) => unitary_step(u, rho, parallel),
        None => rho.clone(),
    };
    dissipative_step(ready, &mut next, dt);
    next
}
