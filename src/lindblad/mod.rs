// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad master equation for open quantum systems.
//!
//! Implements the Gorini–Kossakowski–Sudarshan–Lindblad (GKSL) master equation:
//!
//!   dρ/dt = -i[H, ρ] + Σ_k (L_k ρ L_k† − ½{L_k†L_k, ρ})
//!
//! with rates folded into the operators (L_k = √γ_k · A_k).
//!
//! This module provides:
//! - An operator registry with a configure → finalize lifecycle
//! - Sparse dissipator kernels over the cached (L†, L†L) pairs
//! - Euler, subcycled Euler and unitary/dissipative split steps
//!
//! # Example
//!
//! ```
//! use qubit_os_lindblad::lindblad::{integrate, OperatorRegistry};
//! use qubit_os_lindblad::matrix::DenseMatrix;
//! use num_complex::Complex64;
//!
//! let mut registry = OperatorRegistry::with_dimension(2).unwrap();
//! let mut decay = DenseMatrix::zeros((2, 2));
//! decay[[0, 1]] = Complex64::new(1.0, 0.0);
//! registry.add_lindblad_operator(decay).unwrap();
//! registry.finalize().unwrap();
//!
//! let mut rho = DenseMatrix::zeros((2, 2));
//! rho[[1, 1]] = Complex64::new(1.0, 0.0);
//! let ready = registry.ready().unwrap();
//! integrate::evolve_subcycled(&ready, &mut rho, 0.1, 0.01, false);
//! assert!(rho[[0, 0]].re > 0.09);
//! ```
//!
//! # References
//!
//! - Lindblad, G. (1976). Commun. Math. Phys. 48, 119.
//!   DOI: 10.1007/BF01608499
//! - Gorini, V., Kossakowski, A., & Sudarshan, E. C. G. (1976). J. Math. Phys. 17, 821.
//!   DOI: 10.1063/1.522979
//! - Breuer, H.-P. & Petruccione, F. (2002). "The Theory of Open Quantum Systems." Oxford.

pub mod dissipator;
pub mod integrate;
pub mod registry;
pub mod types;

pub use dissipator::{lindblad_rhs, total_dissipator};
pub use registry::{OperatorRegistry, ReadyRegistry};
pub use types::{Derivatives, EvolutionMetrics, Step, Strategy};
