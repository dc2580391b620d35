// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! YAML scenario files for batch simulation.
//!
//! A scenario names the dimension, the operators as flat boundary buffers,
//! the initial state and the stepping schedule:
//!
//! ```yaml
//! dim: 2
//! hamiltonian: [0, 0, 0, 0, 0, 0, 1, 0]
//! lindblad:
//!   - [0, 1, 0.1, 0]
//! initial_state: [0, 0, 0, 0, 0, 0, 1, 0]
//! dt: 0.01
//! steps: 100
//! strategy: split
//! observables:
//!   excited: [0, 0, 0, 0, 0, 0, 1, 0]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary::{metrics_map, pack_dense, parse_triplets, unpack_dense};
use crate::config::{Config, EvolutionConfig};
use crate::engine::{step_for, LindbladEngine};
use crate::error::Result;
use crate::lindblad::Strategy;
use crate::matrix::{DenseMatrix, Operator};
use crate::observables::{expectation_value, hermitian_deviation, purity, trace};
use crate::validation::{
    validate_flat_matrix, validate_max_dt, validate_timestep, validate_triplets,
};

/// One simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Hilbert dimension
    pub dim: usize,

    /// Flat interleaved Hamiltonian
    #[serde(default)]
    pub hamiltonian: Option<Vec<f64>>,

    /// Lindblad operators as `[row, col, re, im]*` buffers
    #[serde(default)]
    pub lindblad: Vec<Vec<f64>>,

    /// Flat interleaved initial density matrix
    pub initial_state: Vec<f64>,

    /// Macro timestep
    pub dt: f64,

    /// Number of macro steps
    pub steps: usize,

    /// Overrides `evolution.strategy`
    #[serde(default)]
    pub strategy: Option<Strategy>,

    /// Overrides `evolution.max_dt`
    #[serde(default)]
    pub max_dt: Option<f64>,

    /// Named observables (flat interleaved) reported on the final state
    #[serde(default)]
    pub observables: BTreeMap<String, Vec<f64>>,
}

/// Result of [`Scenario::run`].
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub dim: usize,
    pub steps: usize,
    pub dt: f64,
    pub strategy: Strategy,
    /// Final ρ, flat interleaved
    pub final_state: Vec<f64>,
    /// Tr(ρ) as `[re, im]`
    pub trace: [f64; 2],
    pub purity: f64,
    pub hermitian_deviation: f64,
    /// ⟨O⟩ per named observable as `[re, im]`
    pub expectation_values: BTreeMap<String, [f64; 2]>,
    /// Metrics of the last macro step
    pub metrics: BTreeMap<&'static str, f64>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Evolution settings after applying this scenario's overrides.
    pub fn evolution(&self, config: &Config) -> EvolutionConfig {
        EvolutionConfig {
            strategy: self.strategy.unwrap_or(config.evolution.strategy),
            max_dt: self.max_dt.unwrap_or(config.evolution.max_dt),
        }
    }

    /// Check every buffer and the schedule without running anything.
    pub fn validate(&self, config: &Config) -> Result<()> {
        if let Some(h) = &self.hamiltonian {
            validate_flat_matrix("hamiltonian", h, self.dim)?;
        }
        for (i, l) in self.lindblad.iter().enumerate() {
            validate_triplets(&format!("lindblad[{i}]"), l, self.dim)?;
        }
        validate_flat_matrix("initial_state", &self.initial_state, self.dim)?;
        for (name, o) in &self.observables {
            validate_flat_matrix(&format!("observable '{name}'"), o, self.dim)?;
        }
        validate_timestep(self.dt)?;
        let evolution = self.evolution(config);
        if evolution.strategy == Strategy::Euler {
            validate_max_dt(evolution.max_dt)?;
        }
        Ok(())
    }

    /// Build and finalize an engine for this scenario.
    pub fn build_engine(&self, config: &Config) -> Result<LindbladEngine> {
        let mut engine = LindbladEngine::with_config(config)?;
        engine.set_dimension(self.dim)?;
        if let Some(h) = &self.hamiltonian {
            engine.set_hamiltonian(unpack_dense("hamiltonian", h, self.dim)?)?;
        }
        for (i, l) in self.lindblad.iter().enumerate() {
            engine.add_lindblad_operator(parse_triplets(&format!("lindblad[{i}]"), l, self.dim)?)?;
        }
        engine.finalize()?;
        Ok(engine)
    }

    /// Evolve the initial state through all steps and summarize the result.
    pub fn run(&self, config: &Config) -> Result<Report> {
        self.validate(config)?;
        let mut engine = self.build_engine(config)?;
        let evolution = self.evolution(config);
        let step = step_for(&evolution);

        let mut rho = unpack_dense("initial_state", &self.initial_state, self.dim)?;
        for _ in 0..self.steps {
            rho = engine.try_evolve(&rho, self.dt, step)?;
        }
        debug!(
            dim = self.dim,
            steps = self.steps,
            strategy = %evolution.strategy,
            "scenario complete"
        );

        let mut expectation_values = BTreeMap::new();
        for (name, o) in &self.observables {
            let op = Operator::Dense(unpack_dense(name, o, self.dim)?);
            let value = expectation_value(&op, &rho);
            expectation_values.insert(name.clone(), [value.re, value.im]);
        }

        Ok(summarize(self, evolution.strategy, &rho, &engine, expectation_values))
    }
}

fn summarize(
    scenario: &Scenario,
    strategy: Strategy,
    rho: &DenseMatrix,
    engine: &LindbladEngine,
    expectation_values: BTreeMap<String, [f64; 2]>,
) -> Report {
    let tr = trace(rho);
    Report {
        dim: scenario.dim,
        steps: scenario.steps,
        dt: scenario.dt,
        strategy,
        final_state: pack_dense(rho),
        trace: [tr.re, tr.im],
        purity: purity(rho),
        hermitian_deviation: hermitian_deviation(rho),
        expectation_values,
        metrics: metrics_map(engine.metrics()),
    }
}
