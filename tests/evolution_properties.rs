// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Physical and lifecycle properties of the evolution engine, exercised
//! through the public API only.

use approx::assert_relative_eq;
use num_complex::Complex64;

use qubit_os_lindblad::boundary::{pack_dense, parse_triplets, unpack_dense};
use qubit_os_lindblad::expm::PadeSolver;
use qubit_os_lindblad::matrix::{frobenius_norm, identity};
use qubit_os_lindblad::observables::{hermitian_deviation, trace};
use qubit_os_lindblad::{DenseMatrix, LindbladEngine};

fn cx(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// Hermitian 3-level Hamiltonian with a complex coupling.
fn qutrit_hamiltonian() -> DenseMatrix {
    let mut h = DenseMatrix::zeros((3, 3));
    h[[0, 0]] = cx(0.0, 0.0);
    h[[1, 1]] = cx(1.0, 0.0);
    h[[2, 2]] = cx(2.1, 0.0);
    h[[0, 1]] = cx(0.3, 0.1);
    h[[1, 0]] = cx(0.3, -0.1);
    h[[1, 2]] = cx(0.0, 0.2);
    h[[2, 1]] = cx(0.0, -0.2);
    h
}

/// Mixed 3-level state with coherences.
fn qutrit_state() -> DenseMatrix {
    let mut rho = DenseMatrix::zeros((3, 3));
    rho[[0, 0]] = cx(0.5, 0.0);
    rho[[1, 1]] = cx(0.3, 0.0);
    rho[[2, 2]] = cx(0.2, 0.0);
    rho[[0, 1]] = cx(0.1, 0.05);
    rho[[1, 0]] = cx(0.1, -0.05);
    rho[[0, 2]] = cx(0.0, 0.08);
    rho[[2, 0]] = cx(0.0, -0.08);
    rho
}

fn qutrit_engine(with_dissipation: bool) -> LindbladEngine {
    let mut engine = LindbladEngine::new();
    engine.set_dimension(3).unwrap();
    engine.set_hamiltonian(qutrit_hamiltonian()).unwrap();
    if with_dissipation {
        // Ladder decay 1 → 0, 2 → 1 and a complex dephasing term.
        let decay = parse_triplets("decay", &[0.0, 1.0, 0.3, 0.0, 1.0, 2.0, 0.4, 0.0], 3).unwrap();
        let dephase = parse_triplets("dephase", &[2.0, 2.0, 0.0, 0.2], 3).unwrap();
        engine.add_lindblad_operator(decay).unwrap();
        engine.add_lindblad_operator(dephase).unwrap();
    }
    engine.finalize().unwrap();
    engine
}

#[test]
fn trace_preserved_by_hamiltonian_only_evolution() {
    let mut engine = qutrit_engine(false);
    let rho = qutrit_state();
    let before = trace(&rho);

    let after = engine.evolve(rho.clone(), 0.1, 0.01);
    assert_relative_eq!(trace(&after).re, before.re, epsilon = 1e-12);
    assert_relative_eq!(trace(&after).im, before.im, epsilon = 1e-12);

    let split = engine.evolve_split(rho, 0.1);
    assert_relative_eq!(trace(&split).re, before.re, epsilon = 1e-12);
}

#[test]
fn euler_step_preserves_trace_at_any_dt() {
    // Every term of the right-hand side is traceless.
    let mut engine = qutrit_engine(true);
    for dt in [0.1, 0.01, 0.001] {
        let after = engine.evolve_step(qutrit_state(), dt);
        assert_relative_eq!(trace(&after).re, 1.0, epsilon = 1e-13);
    }
}

#[test]
fn hermiticity_preserved_by_both_strategies() {
    let mut engine = qutrit_engine(true);
    let rho = qutrit_state();
    assert!(hermitian_deviation(&rho) < 1e-15);

    let mut euler = rho.clone();
    let mut split = rho;
    for _ in 0..20 {
        euler = engine.evolve(euler, 0.05, 0.01);
        split = engine.evolve_split(split, 0.05);
    }
    assert!(hermitian_deviation(&euler) < 1e-12, "euler {}", hermitian_deviation(&euler));
    assert!(hermitian_deviation(&split) < 1e-12, "split {}", hermitian_deviation(&split));
}

#[test]
fn dissipator_free_lindblad_step_is_identity() {
    let mut engine = qutrit_engine(false);
    let rho = qutrit_state();
    let after = engine.evolve_lindblad(rho.clone(), 0.5);
    assert_eq!(pack_dense(&after), pack_dense(&rho));
}

#[test]
fn subcycling_matches_sequential_steps() {
    let max_dt = 0.005;
    let mut engine = qutrit_engine(true);

    let cycled = engine.evolve(qutrit_state(), 2.0 * max_dt, max_dt);
    assert_eq!(engine.metrics().substeps, 2);

    let once = engine.evolve_step(qutrit_state(), max_dt);
    let twice = engine.evolve_step(once, max_dt);

    assert!(frobenius_norm(&(&cycled - &twice)) < 1e-14);
}

#[test]
fn exponential_group_law_for_non_normal_matrix() {
    let mut a = DenseMatrix::zeros((3, 3));
    a[[0, 0]] = cx(0.4, 0.2);
    a[[0, 1]] = cx(1.0, -0.5);
    a[[1, 1]] = cx(-0.3, 0.0);
    a[[1, 2]] = cx(0.0, 0.8);
    a[[2, 0]] = cx(0.25, 0.0);
    a[[2, 2]] = cx(0.1, -0.7);

    for order in [6, 13, 20] {
        let solver = PadeSolver::new(order).unwrap();
        let forward = solver.exponential(&a).value;
        let backward = solver.exponential(&a.mapv(|z| -z)).value;
        let product = forward.dot(&backward);
        assert!(
            frobenius_norm(&(&product - &identity(3))) < 1e-12,
            "order {order}"
        );
    }
}

#[test]
fn finalize_invalidation_round_trip() {
    let mut engine = qutrit_engine(true);
    let rho = qutrit_state();

    let evolved = engine.evolve_step(rho.clone(), 0.01);
    assert_ne!(pack_dense(&evolved), pack_dense(&rho));

    let extra = parse_triplets("extra", &[0.0, 2.0, 0.1, 0.0], 3).unwrap();
    engine.add_lindblad_operator(extra).unwrap();
    assert!(!engine.is_finalized());

    for after in [
        engine.evolve_step(rho.clone(), 0.01),
        engine.evolve(rho.clone(), 0.02, 0.01),
        engine.evolve_split(rho.clone(), 0.01),
        engine.evolve_unitary(rho.clone(), 0.01),
        engine.evolve_lindblad(rho.clone(), 0.01),
    ] {
        assert_eq!(pack_dense(&after), pack_dense(&rho));
    }

    engine.finalize().unwrap();
    let refreshed = engine.evolve_step(rho.clone(), 0.01);
    assert_ne!(pack_dense(&refreshed), pack_dense(&rho));
    assert_ne!(pack_dense(&refreshed), pack_dense(&evolved));
}

#[test]
fn diagonal_hamiltonian_ground_state_is_stationary() {
    let mut engine = LindbladEngine::new();
    engine.set_dimension(2).unwrap();
    let h = unpack_dense("H", &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0], 2).unwrap();
    engine.set_hamiltonian(h).unwrap();
    engine.finalize().unwrap();

    let rho = unpack_dense("rho", &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 2).unwrap();
    let after = engine.evolve_step(rho, 0.01);

    assert!((after[[0, 0]].re - 1.0).abs() < 1e-3);
    assert!(after[[1, 1]].norm() < 1e-3);
    assert!(after[[0, 1]].norm() < 1e-12);
    assert!(after[[1, 0]].norm() < 1e-12);
}

#[test]
fn soft_failure_before_dimension() {
    let mut engine = LindbladEngine::new();
    assert!(engine.add_lindblad_operator(identity(2)).is_err());
    assert!(engine.finalize().is_err());
    assert_eq!(engine.lindblad_count(), 0);

    let rho = identity(2) * cx(0.5, 0.0);
    let after = engine.evolve_split(rho.clone(), 0.1);
    assert_eq!(pack_dense(&after), pack_dense(&rho));
}
