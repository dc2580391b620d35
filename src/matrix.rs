// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Complex matrix primitives.
//!
//! Dense matrices are plain `ndarray` arrays of `Complex64`. Lindblad
//! operators are kept in CSR form ([`SparseMatrix`]) and are never densified
//! during evolution: every product with a density matrix goes through
//! [`SparseMatrix::apply_left`] (S·ρ) or [`SparseMatrix::apply_right`] (ρ·S).

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use sprs::{CsMat, TriMat};

/// Dense complex square matrix.
pub type DenseMatrix = Array2<Complex64>;

/// Entries with both |re| and |im| at or below this are dropped on ingestion.
pub const SPARSITY_EPSILON: f64 = 1e-15;

/// Helper: create Complex64 from f64
#[inline]
pub(crate) fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// Whether an entry is negligible under [`SPARSITY_EPSILON`].
#[inline]
pub fn is_negligible(z: Complex64) -> bool {
    z.re.abs() <= SPARSITY_EPSILON && z.im.abs() <= SPARSITY_EPSILON
}

/// Identity matrix of side `dim`.
pub fn identity(dim: usize) -> DenseMatrix {
    Array2::from_diag_elem(dim, c(1.0))
}

/// Conjugate transpose (dagger) of a dense matrix.
pub fn dagger(m: &DenseMatrix) -> DenseMatrix {
    m.t().mapv(|z| z.conj())
}

/// Commutator [A, B] = AB − BA.
pub fn commutator(a: &DenseMatrix, b: &DenseMatrix, parallel: bool) -> DenseMatrix {
    matmul(a, b, parallel) - matmul(b, a, parallel)
}

/// Frobenius norm sqrt(Σ |m_ij|²).
pub fn frobenius_norm(m: &DenseMatrix) -> f64 {
    m.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Dense product, optionally split row-wise across the rayon pool.
///
/// Each output row is computed independently, so the parallel and serial
/// paths differ at most by floating-point reassociation.
pub fn matmul(a: &DenseMatrix, b: &DenseMatrix, parallel: bool) -> DenseMatrix {
    if !parallel {
        return a.dot(b);
    }
    let mut out = DenseMatrix::zeros((a.nrows(), b.ncols()));
    Zip::from(out.rows_mut())
        .and(a.rows())
        .par_for_each(|mut out_row, a_row| out_row.assign(&a_row.dot(b)));
    out
}

/// Sparse complex square matrix in compressed-row storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    inner: CsMat<Complex64>,
}

impl SparseMatrix {
    /// Build from `(row, col, value)` entries.
    ///
    /// Negligible entries are dropped and duplicates are summed.
    ///
    /// # Panics
    /// Panics if an index is outside `dim`; callers validate indices first
    /// (see [`crate::validation::validate_triplets`]).
    pub fn from_triplets<I>(dim: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, Complex64)>,
    {
        let mut tri = TriMat::new((dim, dim));
        for (row, col, value) in entries {
            if !is_negligible(value) {
                tri.add_triplet(row, col, value);
            }
        }
        Self {
            inner: tri.to_csr(),
        }
    }

    /// Sparsify a dense square matrix.
    pub fn from_dense(m: &DenseMatrix) -> Self {
        Self::from_triplets(
            m.nrows(),
            m.indexed_iter().map(|((i, j), &z)| (i, j, z)),
        )
    }

    /// Side length.
    pub fn dim(&self) -> usize {
        self.inner.rows()
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// Entry at (row, col); zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.inner.get(row, col).copied().unwrap_or_default()
    }

    /// Stored entries in row-major order.
    pub fn entries(&self) -> Vec<(usize, usize, Complex64)> {
        let mut out = Vec::with_capacity(self.nnz());
        for (row, vec) in self.inner.outer_iterator().enumerate() {
            for (col, &value) in vec.iter() {
                out.push((row, col, value));
            }
        }
        out
    }

    /// Conjugate transpose S†.
    pub fn adjoint(&self) -> Self {
        let entries = self
            .entries()
            .into_iter()
            .map(|(row, col, value)| (col, row, value.conj()));
        Self::from_triplets(self.dim(), entries)
    }

    /// Sparse product self · rhs.
    pub fn mul_sparse(&self, rhs: &SparseMatrix) -> Self {
        let mut tri = TriMat::new((self.dim(), rhs.dim()));
        for (row, vec) in self.inner.outer_iterator().enumerate() {
            for (k, &a) in vec.iter() {
                if let Some(rhs_row) = rhs.inner.outer_view(k) {
                    for (col, &b) in rhs_row.iter() {
                        tri.add_triplet(row, col, a * b);
                    }
                }
            }
        }
        Self {
            inner: tri.to_csr(),
        }
    }

    /// S · ρ (sparse × dense).
    pub fn apply_left(&self, rho: &DenseMatrix) -> DenseMatrix {
        let mut out = DenseMatrix::zeros((self.dim(), rho.ncols()));
        for (row, vec) in self.inner.outer_iterator().enumerate() {
            let mut out_row = out.row_mut(row);
            for (k, &value) in vec.iter() {
                out_row.scaled_add(value, &rho.row(k));
            }
        }
        out
    }

    /// ρ · S (dense × sparse).
    pub fn apply_right(&self, rho: &DenseMatrix) -> DenseMatrix {
        let mut out = DenseMatrix::zeros((rho.nrows(), self.dim()));
        for (k, vec) in self.inner.outer_iterator().enumerate() {
            let rho_col = rho.column(k);
            for (col, &value) in vec.iter() {
                out.column_mut(col).scaled_add(value, &rho_col);
            }
        }
        out
    }

    /// Materialize as a dense matrix (tests and diagnostics only).
    pub fn to_dense(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros((self.dim(), self.dim()));
        for (row, col, value) in self.entries() {
            out[[row, col]] = value;
        }
        out
    }
}

/// The two operator representations the engine accepts.
#[derive(Debug, Clone)]
pub enum Operator {
    /// Dense d × d matrix.
    Dense(DenseMatrix),
    /// Sparse d × d matrix.
    Sparse(SparseMatrix),
}

impl Operator {
    /// Side length of the operator.
    pub fn dim(&self) -> usize {
        match self {
            Operator::Dense(m) => m.nrows(),
            Operator::Sparse(s) => s.dim(),
        }
    }

    /// Whether the operator is square (sparse operators always are).
    pub fn is_square(&self) -> bool {
        match self {
            Operator::Dense(m) => m.is_square(),
            Operator::Sparse(_) => true,
        }
    }

    /// Convert to sparse storage, dropping negligible entries.
    pub fn into_sparse(self) -> SparseMatrix {
        match self {
            Operator::Dense(m) => SparseMatrix::from_dense(&m),
            Operator::Sparse(s) => s,
        }
    }
}

impl From<DenseMatrix> for Operator {
    fn from(m: DenseMatrix) -> Self {
        Operator::Dense(m)
    }
}

impl From<SparseMatrix> for Operator {
    fn from(s: SparseMatrix) -> Self {
        Operator::Sparse(s)
    }
}
