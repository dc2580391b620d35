// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential via scaling-and-squaring with a Padé approximant of
//! configurable order.
//!
//! Implements the algorithm from:
//!   Higham (2005), "The Scaling and Squaring Method for the Matrix
//!   Exponential Revisited", SIAM J. Matrix Anal. Appl. 26(4), 1179.
//!
//! The input need not be Hermitian or normal. For the engine the argument is
//! always −iH·dt, but nothing here relies on that.

use std::time::Instant;

use num_complex::Complex64;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::matrix::{c, identity, matmul, DenseMatrix};

/// Default Padé order.
pub const DEFAULT_PADE_ORDER: u32 = 13;

/// Smallest accepted Padé order.
pub const MIN_PADE_ORDER: u32 = 3;

/// Largest accepted Padé order.
pub const MAX_PADE_ORDER: u32 = 20;

/// Dense products run in parallel when the dimension exceeds this.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Scaling thresholds θ_m for m = 3..=13 (Higham 2005, Table 2.3).
///
/// Orders above 13 reuse θ_13.
const THETA: [f64; 11] = [
    1.495_585_217_958_292e-2, // 3
    8.54e-2,                  // 4
    2.539_398_330_063_23e-1,  // 5
    5.41e-1,                  // 6
    9.504_178_996_162_932e-1, // 7
    1.47,                     // 8
    2.097_847_961_257_068,    // 9
    2.81,                     // 10
    3.60,                     // 11
    4.46,                     // 12
    5.371_920_351_148_152,    // 13
];

fn theta(order: u32) -> f64 {
    let m = order.clamp(MIN_PADE_ORDER, 13);
    THETA[(m - MIN_PADE_ORDER) as usize]
}

/// Coefficients c_k of the diagonal [m/m] Padé approximant of exp(x):
///
///   c_k = (2m − k)! m! / ((2m)! k! (m − k)!)
fn pade_coefficients(m: usize) -> Vec<f64> {
    let mut coeffs = Vec::with_capacity(m + 1);
    coeffs.push(1.0);
    for k in 1..=m {
        let prev = coeffs[k - 1];
        coeffs.push(prev * (m - k + 1) as f64 / (k * (2 * m - k + 1)) as f64);
    }
    coeffs
}

/// Cost counters for one exponential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExpmStats {
    /// Number of squarings s in exp(A) = R(A/2^s)^(2^s).
    pub squarings: u32,
    /// Matrix products spent building the Padé numerator and denominator.
    pub products: u32,
    /// Wall time in milliseconds.
    pub elapsed_ms: f64,
}

impl ExpmStats {
    /// Squarings plus Padé products.
    pub fn iterations(&self) -> u32 {
        self.squarings + self.products
    }
}

/// Result of [`PadeSolver::exponential`].
#[derive(Debug, Clone)]
pub struct Exponential {
    /// exp(A).
    pub value: DenseMatrix,
    /// Cost of the computation.
    pub stats: ExpmStats,
}

/// Padé exponential solver.
///
/// Holds only configuration; [`PadeSolver::exponential`] takes `&self`, so a
/// configured solver can be shared across threads.
#[derive(Debug, Clone)]
pub struct PadeSolver {
    order: u32,
    multithreading: bool,
    parallel_threshold: usize,
}

impl Default for PadeSolver {
    fn default() -> Self {
        Self {
            order: DEFAULT_PADE_ORDER,
            multithreading: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl PadeSolver {
    /// Create a solver with the given Padé order.
    pub fn new(order: u32) -> Result<Self> {
        let mut solver = Self::default();
        solver.set_order(order)?;
        Ok(solver)
    }

    /// Current Padé order.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Set the Padé order. Out-of-range orders are rejected and leave the
    /// solver unchanged.
    pub fn set_order(&mut self, order: u32) -> Result<()> {
        if !(MIN_PADE_ORDER..=MAX_PADE_ORDER).contains(&order) {
            return Err(Error::InvalidPadeOrder(order));
        }
        self.order = order;
        Ok(())
    }

    /// Whether large products are parallelized.
    pub fn multithreading(&self) -> bool {
        self.multithreading
    }

    /// Enable or disable parallel products.
    pub fn set_multithreading(&mut self, enabled: bool) {
        self.multithreading = enabled;
    }

    /// Dimension above which products are parallelized.
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Set the parallelization threshold.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    pub(crate) fn use_parallel(&self, dim: usize) -> bool {
        self.multithreading && dim > self.parallel_threshold
    }

    /// Compute exp(A) for a square complex matrix.
    ///
    /// Ill-conditioned or non-finite input is not special-cased; it shows up
    /// as non-finite entries in the result.
    pub fn exponential(&self, a: &DenseMatrix) -> Exponential {
        let start = Instant::now();
        let n = a.nrows();
        debug_assert_eq!(n, a.ncols(), "exponential requires a square matrix");

        if n == 0 {
            return Exponential {
                value: DenseMatrix::zeros((0, 0)),
                stats: ExpmStats::default(),
            };
        }

        let parallel = self.use_parallel(n);
        let s = scaling_exponent(infinity_norm(a), theta(self.order));

        // A_s = A / 2^s
        let scaled = a * c(0.5_f64.powi(s as i32));

        let mut products = 0;
        let (numerator, denominator) = self.pade_terms(&scaled, parallel, &mut products);

        // R = D⁻¹ N, then exp(A) = R^(2^s)
        let mut result = solve_linear(denominator, numerator);
        for _ in 0..s {
            result = matmul(&result, &result, parallel);
        }

        let stats = ExpmStats {
            squarings: s,
            products,
            elapsed_ms: start.elapsed().as_secs_f64() * 1e3,
        };
        trace!(
            dim = n,
            order = self.order,
            squarings = stats.squarings,
            products = stats.products,
            parallel,
            "matrix exponential computed"
        );

        Exponential {
            value: result,
            stats,
        }
    }

    /// Numerator N = E + O and denominator D = E − O of the Padé approximant,
    /// where E collects the even powers and O = X · (odd coefficients × even powers).
    fn pade_terms(
        &self,
        x: &DenseMatrix,
        parallel: bool,
        products: &mut u32,
    ) -> (DenseMatrix, DenseMatrix) {
        let m = self.order as usize;
        let coeffs = pade_coefficients(m);
        let n = x.nrows();

        let mut even = identity(n) * c(coeffs[0]);
        let mut odd = identity(n) * c(coeffs[1]);

        let x2 = matmul(x, x, parallel);
        *products += 1;

        let mut power = x2.clone();
        for j in 1..=m / 2 {
            if j > 1 {
                power = matmul(&power, &x2, parallel);
                *products += 1;
            }
            even.scaled_add(c(coeffs[2 * j]), &power);
            if 2 * j < m {
                odd.scaled_add(c(coeffs[2 * j + 1]), &power);
            }
        }

        let odd = matmul(x, &odd, parallel);
        *products += 1;

        (&even + &odd, even - odd)
    }
}

/// s = max(0, ceil(log2(‖A‖ / θ))).
fn scaling_exponent(norm: f64, theta: f64) -> u32 {
    if !norm.is_finite() || norm <= theta {
        0
    } else {
        (norm / theta).log2().ceil() as u32
    }
}

/// Infinity norm: max row sum of absolute values.
fn infinity_norm(a: &DenseMatrix) -> f64 {
    a.rows()
        .into_iter()
        .map(|row| row.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Solve A · X = B for X using Gaussian elimination with partial pivoting.
fn solve_linear(mut a: DenseMatrix, mut b: DenseMatrix) -> DenseMatrix {
    let n = a.nrows();
    let m = b.ncols();
    let zero = Complex64::new(0.0, 0.0);

    // Forward elimination
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[[i, col]].norm().total_cmp(&a[[j, col]].norm()))
            .unwrap_or(col);
        if pivot_row != col {
            swap_rows(&mut a, col, pivot_row);
            swap_rows(&mut b, col, pivot_row);
        }

        let pivot = a[[col, col]];
        for row in (col + 1)..n {
            let factor = a[[row, col]] / pivot;
            if factor == zero {
                continue;
            }
            for j in col..n {
                let val = a[[col, j]];
                a[[row, j]] -= factor * val;
            }
            for j in 0..m {
                let val = b[[col, j]];
                b[[row, j]] -= factor * val;
            }
        }
    }

    // Back substitution, overwriting B with X
    for col in (0..n).rev() {
        let pivot = a[[col, col]];
        for j in 0..m {
            let mut sum = b[[col, j]];
            for k in (col + 1)..n {
                sum -= a[[col, k]] * b[[k, j]];
            }
            b[[col, j]] = sum / pivot;
        }
    }
    b
}

fn swap_rows(m: &mut DenseMatrix, i: usize, j: usize) {
    for col in 0..m.ncols() {
        m.swap([i, col], [j, col]);
    }
}
