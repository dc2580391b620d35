// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Lindblad evolution engine
//!
//! Time evolution of density matrices for open quantum systems under the
//! Lindblad master equation, with dense Hamiltonians, sparse Lindblad
//! operators and a scaling-and-squaring Padé matrix exponential.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       CLI (scenario runner)              │
//! ├─────────────────────────────────────────┤
//! │   boundary codec  ·  validation          │
//! ├─────────────────────────────────────────┤
//! │            LindbladEngine                │
//! ├──────────────────┬──────────────────────┤
//! │ OperatorRegistry │   PadeSolver         │
//! │ (sparse L, L†L)  │   (exp(−iH·dt))      │
//! ├──────────────────┴──────────────────────┤
//! │     integrators  ·  observables          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`engine`]: Fail-soft evolution facade
//! - [`lindblad`]: Operator registry, dissipator and integrators
//! - [`expm`]: Padé matrix exponential
//! - [`observables`]: Trace, purity, expectation values
//! - [`boundary`]: Flat buffer codec
//! - [`validation`]: Input validation utilities
//! - [`scenario`]: YAML scenario runner
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod boundary;
pub mod config;
pub mod engine;
pub mod error;
pub mod expm;
pub mod lindblad;
pub mod matrix;
pub mod observables;
pub mod scenario;
pub mod validation;

pub use config::Config;
pub use engine::LindbladEngine;
pub use error::{Error, Result};
pub use matrix::{DenseMatrix, Operator, SparseMatrix};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
