// This code is part of Qiskit.
//
// (C) Copyright IBM 2025
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use approx::assert_abs_diff_eq;
use hashbrown::HashMap;
use ndarray::Array2;
use num_complex::Complex64;

use qkshim_circuit::gate::Gate;
use qkshim_circuit::operations::Param;
use qkshim_circuit::parameter::parameter_expression::ParameterExpression;
use qkshim_circuit::parameter::symbol_expr::Symbol;
use qkshim_circuit_library::{CHGate, HGate, RGate};

const TOL: f64 = 1e-12;

fn all_gates() -> Vec<Box<dyn Gate>> {
    let gates: [Box<dyn Gate>; 6] = [
        Box::new(HGate::default()),
        Box::new(CHGate::default()),
        Box::new(CHGate::new(None, Some(0)).unwrap()),
        Box::new(RGate::new(0.3, 1.2, None).unwrap()),
        Box::new(RGate::new(-2.1, 0.0, None).unwrap()),
        Box::new(RGate::new(std::f64::consts::PI, -0.7, None).unwrap()),
    ];
    Vec::from(gates)
}

fn identity(dim: usize) -> Array2<Complex64> {
    Array2::eye(dim)
}

#[test]
fn matrices_are_unitary() {
    for gate in all_gates() {
        let matrix = gate.to_matrix().unwrap();
        let adjoint = matrix.t().mapv(|value| value.conj());
        assert_abs_diff_eq!(matrix.dot(&adjoint), identity(matrix.nrows()), epsilon = TOL);
    }
}

#[test]
fn decompositions_reproduce_matrices() {
    for gate in all_gates() {
        let expected = gate.to_matrix().unwrap();
        let definition = gate.definition_circuit().unwrap();
        assert_eq!(definition.num_qubits(), gate.base().num_qubits());
        let actual = definition.to_matrix().unwrap();
        assert_abs_diff_eq!(actual, expected, epsilon = TOL);
    }
}

#[test]
fn inverse_undoes_gate() {
    for gate in all_gates() {
        let inverse = gate.inverse().unwrap();
        assert_eq!(inverse.base().name(), gate.base().name());
        let product = inverse.to_matrix().unwrap().dot(&gate.to_matrix().unwrap());
        assert_abs_diff_eq!(product, identity(1 << gate.base().num_qubits()), epsilon = TOL);
    }
}

#[test]
fn h_matrix_values() {
    let matrix = HGate::default().to_matrix().unwrap();
    let amp = std::f64::consts::FRAC_1_SQRT_2;
    let expected = ndarray::array![
        [Complex64::new(amp, 0.), Complex64::new(amp, 0.)],
        [Complex64::new(amp, 0.), Complex64::new(-amp, 0.)],
    ];
    assert_abs_diff_eq!(matrix, expected, epsilon = TOL);
}

#[test]
fn controlled_h_acts_only_on_control_state() {
    let closed = CHGate::default().to_matrix().unwrap();
    // |00> (index 0) has the control off and is left alone.
    assert_abs_diff_eq!(closed[[0, 0]], Complex64::new(1., 0.), epsilon = TOL);
    let open = CHGate::new(None, Some(0)).unwrap().to_matrix().unwrap();
    // |01> (index 1) has the control on for the closed gate, off for the open one.
    assert_abs_diff_eq!(open[[1, 1]], Complex64::new(1., 0.), epsilon = TOL);
    assert_abs_diff_eq!(closed[[1, 1]].re, std::f64::consts::FRAC_1_SQRT_2, epsilon = TOL);
}

#[test]
fn h_control_matches_ch() {
    let controlled = HGate::default().control(1, None, None).unwrap();
    assert_abs_diff_eq!(
        controlled.to_matrix().unwrap(),
        CHGate::default().to_matrix().unwrap(),
        epsilon = TOL
    );
}

#[test]
fn r_gate_after_binding_expression() {
    let theta = Symbol::new("θ", None);
    let expr = ParameterExpression::from_symbol(theta.clone()).mul_value(2.0);
    let mut gate = RGate::new(expr.clone(), 0.25, None).unwrap();
    assert!(gate.to_matrix().is_err());
    // The symbolic decomposition is still available.
    assert_eq!(gate.definition_circuit().unwrap().len(), 1);

    let bound = expr.bind(&HashMap::from([(theta, 0.4)])).unwrap();
    gate.base_mut().set_param(0, Param::from(bound)).unwrap();
    let expected = RGate::new(0.8, 0.25, None).unwrap().to_matrix().unwrap();
    assert_abs_diff_eq!(gate.to_matrix().unwrap(), expected, epsilon = TOL);
    assert_abs_diff_eq!(
        gate.definition_circuit().unwrap().to_matrix().unwrap(),
        expected,
        epsilon = TOL
    );
}
