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

use std::f64::consts::FRAC_PI_2;

use ndarray::{aview2, Array2};
use num_complex::Complex64;
use smallvec::smallvec;

use qkshim_circuit::circuit_data::CircuitData;
use qkshim_circuit::error::CircuitError;
use qkshim_circuit::gate::{float_params, Gate, GateBase};
use qkshim_circuit::gate_matrix::r_gate;
use qkshim_circuit::impl_gate_operation;
use qkshim_circuit::instruction_parameters::{FloatType, ParameterType, ParameterTypeError};
use qkshim_circuit::operations::{Param, StandardGate, FLOAT_ZERO};
use qkshim_circuit::Qubit;

static R_SPEC: [&dyn ParameterType; 2] = [&FloatType, &FloatType];

/// Rotation θ around the cos(φ)x + sin(φ)y axis.
///
/// ```text
/// R(θ, φ) = exp(-i θ/2 (cos(φ) X + sin(φ) Y))
///         = [[cos(θ/2),             -i e^{-iφ} sin(θ/2)],
///            [-i e^{iφ} sin(θ/2),   cos(θ/2)           ]]
/// ```
///
/// Both θ and φ are dynamic parameters.
#[derive(Clone, Debug)]
pub struct RGate {
    base: GateBase,
}

impl RGate {
    pub fn new<T, P>(theta: T, phi: P, label: Option<String>) -> Result<Self, CircuitError>
    where
        T: Into<Param>,
        P: Into<Param>,
    {
        Ok(RGate {
            base: GateBase::new(
                "r",
                1,
                &R_SPEC,
                Some(vec![theta.into(), phi.into()]),
                label,
            )?,
        })
    }

    /// An R gate with both parameters unset.
    pub fn unset(label: Option<String>) -> Self {
        RGate {
            base: GateBase::with_spec("r", 1, &R_SPEC, label),
        }
    }

    pub fn theta(&self) -> Result<Param, CircuitError> {
        self.base.param(0)
    }

    pub fn phi(&self) -> Result<Param, CircuitError> {
        self.base.param(1)
    }

    pub fn label(&self) -> Option<&str> {
        self.base.label()
    }
}

fn theta_phi(params: &[Param]) -> Result<(Param, Param), CircuitError> {
    match params {
        [theta, phi] => Ok((FloatType.bind(theta.clone())?, FloatType.bind(phi.clone())?)),
        _ => Err(CircuitError::ParamCountMismatch {
            name: "r".to_string(),
            expected: 2,
            actual: params.len(),
        }),
    }
}

fn not_a_float(param: &Param) -> CircuitError {
    ParameterTypeError {
        expected: "floating-point number",
        received: param.to_string(),
    }
    .into()
}

impl Gate for RGate {
    fn base(&self) -> &GateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GateBase {
        &mut self.base
    }

    fn gate_matrix(&self, params: &[Param]) -> Result<Array2<Complex64>, CircuitError> {
        let [theta, phi] = float_params::<2>(params)?;
        Ok(aview2(&r_gate(theta, phi)).to_owned())
    }

    /// gate r(θ, φ) a { u3(θ, φ - π/2, -φ + π/2) a; }
    fn decompose(&self, params: &[Param]) -> Result<CircuitData, CircuitError> {
        let (theta, phi) = theta_phi(params)?;
        let phi_minus = phi
            .checked_add(-FRAC_PI_2)
            .ok_or_else(|| not_a_float(&phi))?;
        let lam = phi
            .checked_neg()
            .and_then(|neg_phi| neg_phi.checked_add(FRAC_PI_2))
            .ok_or_else(|| not_a_float(&phi))?;
        CircuitData::from_standard_gates(
            1,
            [(
                StandardGate::UGate,
                smallvec![theta, phi_minus, lam],
                smallvec![Qubit(0)],
            )],
            FLOAT_ZERO,
        )
    }

    /// r(θ, φ)^dagger = r(-θ, φ)
    fn inverse(&self) -> Result<Box<dyn Gate>, CircuitError> {
        let theta = self.theta()?;
        let neg_theta = theta.checked_neg().ok_or_else(|| not_a_float(&theta))?;
        Ok(Box::new(RGate::new(neg_theta, self.phi()?, None)?))
    }

    fn clone_gate(&self) -> Box<dyn Gate> {
        Box::new(self.clone())
    }
}

impl_gate_operation!(RGate);
