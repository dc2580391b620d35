// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad engine types.
//!
//! Ref: Lindblad (1976), Commun. Math. Phys. 48, 119.
//! Ref: Gorini, Kossakowski, Sudarshan (1976), J. Math. Phys. 17, 821.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::matrix::SparseMatrix;

/// Cached derivatives of one Lindblad operator L.
///
/// Only ever constructed by `OperatorRegistry::finalize`, and dropped by any
/// later mutation of the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivatives {
    /// L†
    pub adjoint: SparseMatrix,
    /// L†L
    pub adjoint_product: SparseMatrix,
}

impl Derivatives {
    pub(crate) fn of(l: &SparseMatrix) -> Self {
        let adjoint = l.adjoint();
        let adjoint_product = adjoint.mul_sparse(l);
        Self {
            adjoint,
            adjoint_product,
        }
    }
}

/// Integration strategy for a macro timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Explicit Euler on the full master equation, subcycled against `max_dt`.
    #[default]
    Euler,
    /// Exact unitary step U ρ U† followed by a first-order dissipator step.
    Split,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Euler => write!(f, "euler"),
            Strategy::Split => write!(f, "split"),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euler" => Ok(Strategy::Euler),
            "split" => Ok(Strategy::Split),
            other => Err(Error::Config(format!(
                "unknown strategy '{other}' (expected 'euler' or 'split')"
            ))),
        }
    }
}

/// One evolution entry point, as dispatched by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Single Euler step of size dt.
    Euler,
    /// Euler split into ceil(dt / max_dt) equal substeps.
    Subcycled { max_dt: f64 },
    /// Unitary exponential step followed by the dissipator.
    Split,
    /// Coherent part only.
    Unitary,
    /// Dissipative part only.
    Dissipative,
}

/// Timing and iteration counters of the most recent evolution call.
///
/// Overwritten on every call, never accumulated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvolutionMetrics {
    /// Wall time of the whole call.
    pub evolution_time_ms: f64,
    /// Time spent computing exp(−iH·dt) (zero on a cached propagator).
    pub matrix_exp_time_ms: f64,
    /// Time spent evaluating the master-equation right-hand side.
    pub lindblad_time_ms: f64,
    /// Squarings plus Padé products of the exponential.
    pub pade_iterations: u32,
    /// Hilbert-space dimension.
    pub hilbert_dim: usize,
    /// Euler substeps taken.
    pub substeps: usize,
}

impl EvolutionMetrics {
    pub fn new(hilbert_dim: usize) -> Self {
        Self {
            hilbert_dim,
            ..Default::default()
        }
    }
}
