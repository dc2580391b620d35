// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evolution engine facade.
//!
//! [`LindbladEngine`] bundles an [`OperatorRegistry`], a [`PadeSolver`] and the
//! metrics of the most recent call. Every evolution entry point comes in two
//! forms:
//!
//! - `try_*` returns `Result` and never touches ρ on failure;
//! - the plain form takes ρ by value and is fail-soft: on any error it logs a
//!   warning and hands ρ back unchanged.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::{Config, EvolutionConfig};
use crate::error::{Error, Result};
use crate::expm::PadeSolver;
use crate::lindblad::integrate::{
    dissipative_step, euler_step, evolve_subcycled, propagator, split_step, substep_count,
    unitary_step, MAX_SUBSTEPS,
};
use crate::lindblad::{EvolutionMetrics, OperatorRegistry, Step, Strategy};
use crate::matrix::{DenseMatrix, Operator};

/// Cached exp(−iH·dt) for one (registry generation, dt, order) triple.
#[derive(Debug, Clone)]
struct CachedPropagator {
    generation: u64,
    dt_bits: u64,
    order: u32,
    value: DenseMatrix,
}

/// Lindblad evolution engine.
#[derive(Debug, Clone, Default)]
pub struct LindbladEngine {
    registry: OperatorRegistry,
    solver: PadeSolver,
    metrics: EvolutionMetrics,
    propagator: Option<CachedPropagator>,
}

impl LindbladEngine {
    /// Engine with default solver settings and no dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with solver settings taken from `config.pade`.
    pub fn with_config(config: &Config) -> Result<Self> {
        let mut solver = PadeSolver::new(config.pade.order)?;
        solver.set_multithreading(config.pade.multithreading);
        solver.set_parallel_threshold(config.pade.parallel_threshold);
        Ok(Self {
            solver,
            ..Self::default()
        })
    }

    /// Drop all operators and caches and start over at dimension `dim`.
    ///
    /// Solver settings are kept.
    pub fn reset(&mut self, dim: usize) -> Result<()> {
        let registry = OperatorRegistry::with_dimension(dim)?;
        self.registry = registry;
        self.propagator = None;
        self.metrics = EvolutionMetrics::new(dim);
        Ok(())
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn solver(&self) -> &PadeSolver {
        &self.solver
    }

    /// Metrics of the most recent evolution call.
    pub fn metrics(&self) -> &EvolutionMetrics {
        &self.metrics
    }

    pub fn dimension(&self) -> Option<usize> {
        self.registry.dimension()
    }

    pub fn lindblad_count(&self) -> usize {
        self.registry.lindblad_count()
    }

    pub fn is_finalized(&self) -> bool {
        self.registry.is_finalized()
    }

    // Setup. Failures leave the engine unchanged and are logged.

    pub fn set_dimension(&mut self, dim: usize) -> Result<()> {
        logged("set_dimension", self.registry.set_dimension(dim))
    }

    pub fn set_hamiltonian(&mut self, hamiltonian: DenseMatrix) -> Result<()> {
        logged("set_hamiltonian", self.registry.set_hamiltonian(hamiltonian))
    }

    pub fn add_lindblad_operator(&mut self, op: impl Into<Operator>) -> Result<usize> {
        logged("add_lindblad_operator", self.registry.add_lindblad_operator(op))
    }

    pub fn clear_operators(&mut self) {
        self.registry.clear_operators();
    }

    pub fn finalize(&mut self) -> Result<()> {
        logged("finalize", self.registry.finalize())
    }

    /// Set the Padé order; out-of-range orders leave the solver unchanged.
    pub fn set_pade_order(&mut self, order: u32) -> Result<()> {
        logged("set_pade_order", self.solver.set_order(order))
    }

    pub fn set_multithreading(&mut self, enabled: bool) {
        self.solver.set_multithreading(enabled);
    }

    // Fail-soft evolution.

    /// One Euler step of size `dt`.
    pub fn evolve_step(&mut self, rho: DenseMatrix, dt: f64) -> DenseMatrix {
        self.evolve_soft(rho, dt, Step::Euler)
    }

    /// Euler over `dt`, subcycled so that no substep exceeds `max_dt`.
    pub fn evolve(&mut self, rho: DenseMatrix, dt: f64, max_dt: f64) -> DenseMatrix {
        self.evolve_soft(rho, dt, Step::Subcycled { max_dt })
    }

    /// U ρ U† followed by one dissipator step.
    pub fn evolve_split(&mut self, rho: DenseMatrix, dt: f64) -> DenseMatrix {
        self.evolve_soft(rho, dt, Step::Split)
    }

    /// Coherent evolution only.
    pub fn evolve_unitary(&mut self, rho: DenseMatrix, dt: f64) -> DenseMatrix {
        self.evolve_soft(rho, dt, Step::Unitary)
    }

    /// Dissipative evolution only.
    pub fn evolve_lindblad(&mut self, rho: DenseMatrix, dt: f64) -> DenseMatrix {
        self.evolve_soft(rho, dt, Step::Dissipative)
    }

    /// Advance by `dt` with the configured strategy.
    pub fn evolve_with(
        &mut self,
        rho: DenseMatrix,
        dt: f64,
        evolution: &EvolutionConfig,
    ) -> DenseMatrix {
        self.evolve_soft(rho, dt, step_for(evolution))
    }

    fn evolve_soft(&mut self, rho: DenseMatrix, dt: f64, step: Step) -> DenseMatrix {
        match self.try_evolve(&rho, dt, step) {
            Ok(next) => next,
            Err(e) if e.is_soft() => {
                warn!(error = %e, ?step, "engine not ready, returning input unchanged");
                rho
            }
            Err(e) => {
                warn!(error = %e, ?step, dt, "evolution rejected, returning input unchanged");
                rho
            }
        }
    }

    /// Advance `rho` by `dt` using `step`.
    ///
    /// Fails with [`Error::NotConfigured`] / [`Error::NotFinalized`] before
    /// setup is complete, and with [`Error::DimensionMismatch`] if `rho` does
    /// not match the registry.
    pub fn try_evolve(&mut self, rho: &DenseMatrix, dt: f64, step: Step) -> Result<DenseMatrix> {
        let start = Instant::now();
        let Self {
            registry,
            solver,
            metrics,
            propagator: cache,
        } = self;

        *metrics = EvolutionMetrics::new(registry.dimension().unwrap_or(0));
        let ready = registry.ready()?;
        let dim = ready.dim();
        if rho.dim() != (dim, dim) {
            return Err(Error::mismatch(
                "density matrix",
                dim,
                rho.nrows().max(rho.ncols()),
            ));
        }
        if let Step::Subcycled { max_dt } = step {
            let n = substep_count(dt, max_dt);
            if n > MAX_SUBSTEPS {
                return Err(Error::InvalidTimestep(format!(
                    "dt {dt} with max_dt {max_dt} needs more than {MAX_SUBSTEPS} substeps"
                )));
            }
        }
        let parallel = solver.use_parallel(dim);

        let next = match step {
            Step::Euler | Step::Subcycled { .. } => {
                let mut next = rho.clone();
                let rhs_start = Instant::now();
                metrics.substeps = match step {
                    Step::Subcycled { max_dt } => {
                        evolve_subcycled(&ready, &mut next, dt, max_dt, parallel)
                    }
                    _ => {
                        euler_step(&ready, &mut next, dt, parallel);
                        1
                    }
                };
                metrics.lindblad_time_ms = elapsed_ms(rhs_start);
                next
            }
            Step::Dissipative => {
                let mut next = rho.clone();
                let rhs_start = Instant::now();
                dissipative_step(&ready, &mut next, dt);
                metrics.lindblad_time_ms = elapsed_ms(rhs_start);
                metrics.substeps = 1;
                next
            }
            Step::Unitary | Step::Split => {
                let u = match ready.hamiltonian() {
                    Some(h) => Some(cached_propagator(
                        cache,
                        solver,
                        metrics,
                        h,
                        dt,
                        registry.generation(),
                    )),
                    None => None,
                };
                if step == Step::Unitary {
                    match u {
                        Some(u) => unitary_step(u, rho, parallel),
                        None => rho.clone(),
                    }
                } else {
                    let rhs_start = Instant::now();
                    let next = split_step(&ready, u, rho, dt, parallel);
                    metrics.lindblad_time_ms = elapsed_ms(rhs_start);
                    metrics.substeps = 1;
                    next
                }
            }
        };

        metrics.evolution_time_ms = elapsed_ms(start);
        debug!(
            ?step,
            dt,
            dim,
            evolution_time_ms = metrics.evolution_time_ms,
            pade_iterations = metrics.pade_iterations,
            "evolution step complete"
        );
        Ok(next)
    }
}

/// Map the configured strategy to an evolution step.
pub fn step_for(evolution: &EvolutionConfig) -> Step {
    match evolution.strategy {
        Strategy::Euler => Step::Subcycled {
            max_dt: evolution.max_dt,
        },
        Strategy::Split => Step::Split,
    }
}

/// Return the propagator for `dt`, computing it only when the cache is stale.
fn cached_propagator<'c>(
    cache: &'c mut Option<CachedPropagator>,
    solver: &PadeSolver,
    metrics: &mut EvolutionMetrics,
    hamiltonian: &DenseMatrix,
    dt: f64,
    generation: u64,
) -> &'c DenseMatrix {
    let entry = match cache.take() {
        Some(hit)
            if hit.generation == generation
                && hit.dt_bits == dt.to_bits()
                && hit.order == solver.order() =>
        {
            hit
        }
        _ => {
            let exp = propagator(solver, hamiltonian, dt);
            metrics.matrix_exp_time_ms = exp.stats.elapsed_ms;
            metrics.pade_iterations = exp.stats.iterations();
            CachedPropagator {
                generation,
                dt_bits: dt.to_bits(),
                order: solver.order(),
                value: exp.value,
            }
        }
    };
    &cache.insert(entry).value
}

fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "setup call rejected, engine unchanged");
    }
    result
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}
