// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator registry.
//!
//! Owns the optional Hamiltonian and the Lindblad operators of one scenario,
//! and caches (L†, L†L) for every operator once per `finalize`.
//!
//! The registry is either `Configuring` or `Ready`. The cached derivatives
//! live inside the `Ready` state, so every mutation drops them, and evolution
//! code can only reach them through a [`ReadyRegistry`] borrowed from a
//! finalized registry.

use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, Operator, SparseMatrix};

use super::types::Derivatives;

#[derive(Debug, Clone, Default)]
enum RegistryState {
    #[default]
    Configuring,
    Ready(Vec<Derivatives>),
}

/// Hamiltonian and Lindblad operators for one scenario.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    dim: Option<usize>,
    hamiltonian: Option<DenseMatrix>,
    lindblads: Vec<SparseMatrix>,
    state: RegistryState,
    generation: u64,
}

impl OperatorRegistry {
    /// Create an empty registry with no dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry of the given dimension.
    pub fn with_dimension(dim: usize) -> Result<Self> {
        let mut registry = Self::new();
        registry.set_dimension(dim)?;
        Ok(registry)
    }

    /// Hilbert dimension, if set.
    pub fn dimension(&self) -> Option<usize> {
        self.dim
    }

    /// Number of registered Lindblad operators.
    pub fn lindblad_count(&self) -> usize {
        self.lindblads.len()
    }

    pub fn has_hamiltonian(&self) -> bool {
        self.hamiltonian.is_some()
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, RegistryState::Ready(_))
    }

    /// Counter bumped on every mutation; used to key derived caches.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hamiltonian(&self) -> Option<&DenseMatrix> {
        self.hamiltonian.as_ref()
    }

    pub fn lindblads(&self) -> &[SparseMatrix] {
        &self.lindblads
    }

    fn invalidate(&mut self) {
        self.state = RegistryState::Configuring;
        self.generation += 1;
    }

    fn require_dim(&self) -> Result<usize> {
        self.dim.ok_or(Error::NotConfigured)
    }

    /// Set the Hilbert dimension.
    ///
    /// Changing to a different dimension drops the registered operators,
    /// which would no longer fit. Always clears finalization.
    pub fn set_dimension(&mut self, dim: usize) -> Result<()> {
        if dim == 0 {
            return Err(Error::InvalidDimension(dim));
        }
        if self.dim.is_some_and(|old| old != dim)
            && (self.hamiltonian.is_some() || !self.lindblads.is_empty())
        {
            debug!(
                old_dim = ?self.dim,
                new_dim = dim,
                lindblad_count = self.lindblads.len(),
                "dimension changed, dropping registered operators"
            );
            self.hamiltonian = None;
            self.lindblads.clear();
        }
        self.dim = Some(dim);
        self.invalidate();
        Ok(())
    }

    /// Register (or replace) the dense Hamiltonian.
    pub fn set_hamiltonian(&mut self, hamiltonian: DenseMatrix) -> Result<()> {
        let dim = self.require_dim()?;
        if hamiltonian.dim() != (dim, dim) {
            return Err(Error::mismatch(
                "Hamiltonian",
                dim,
                hamiltonian.nrows().max(hamiltonian.ncols()),
            ));
        }
        self.hamiltonian = Some(hamiltonian);
        self.invalidate();
        Ok(())
    }

    /// Append a Lindblad operator, sparsifying dense input.
    ///
    /// Returns the operator's index.
    pub fn add_lindblad_operator(&mut self, op: impl Into<Operator>) -> Result<usize> {
        let dim = self.require_dim()?;
        let op = op.into();
        if !op.is_square() || op.dim() != dim {
            return Err(Error::mismatch("Lindblad operator", dim, op.dim()));
        }
        self.lindblads.push(op.into_sparse());
        self.invalidate();
        Ok(self.lindblads.len() - 1)
    }

    /// Remove the Hamiltonian and all Lindblad operators.
    pub fn clear_operators(&mut self) {
        self.hamiltonian = None;
        self.lindblads.clear();
        self.invalidate();
    }

    /// Precompute L† and L†L for every operator and enter the ready state.
    ///
    /// Calling it again recomputes from the current operator set.
    pub fn finalize(&mut self) -> Result<()> {
        let dim = self.require_dim()?;
        let derivatives: Vec<Derivatives> = self.lindblads.iter().map(Derivatives::of).collect();
        debug!(
            dim,
            lindblad_count = derivatives.len(),
            has_hamiltonian = self.hamiltonian.is_some(),
            nnz = derivatives
                .iter()
                .map(|d| d.adjoint_product.nnz())
                .sum::<usize>(),
            "operator registry finalized"
        );
        self.state = RegistryState::Ready(derivatives);
        Ok(())
    }

    /// Borrow the finalized operator set.
    pub fn ready(&self) -> Result<ReadyRegistry<'_>> {
        let dim = self.require_dim()?;
        match &self.state {
            RegistryState::Ready(derivatives) => Ok(ReadyRegistry {
                dim,
                hamiltonian: self.hamiltonian.as_ref(),
                lindblads: &self.lindblads,
                derivatives,
            }),
            RegistryState::Configuring => Err(Error::NotFinalized),
        }
    }
}

/// Read-only view of a finalized registry.
///
/// Holding one borrows the registry, so it cannot be mutated underneath.
/// The view is `Copy + Sync`; several threads may evolve different density
/// matrices against it at once.
#[derive(Debug, Clone, Copy)]
pub struct ReadyRegistry<'a> {
    dim: usize,
    hamiltonian: Option<&'a DenseMatrix>,
    lindblads: &'a [SparseMatrix],
    derivatives: &'a [Derivatives],
}

impl<'a> ReadyRegistry<'a> {
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn hamiltonian(&self) -> Option<&'a DenseMatrix> {
        self.hamiltonian
    }

    /// Each Lindblad operator paired with its cached derivatives.
    pub fn channels(&self) -> impl Iterator<Item = (&'a SparseMatrix, &'a Derivatives)> + 'a {
        self.lindblads.iter().zip(self.derivatives.iter())
    }

    pub fn lindblad_count(&self) -> usize {
        self.lindblads.len()
    }
}
