// This code is part of Qiskit.
//
// (C) Copyright IBM 2024
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use ndarray::{aview2, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use crate::circuit_data::CircuitData;
use crate::gate_matrix;
use crate::instruction_parameters::ParameterBackreferences;
use crate::parameter::parameter_expression::{ParameterError, ParameterExpression};
use crate::Qubit;

/// Trait for generic circuit operations these define the common attributes
/// needed for something to be addable to the circuit struct
///
/// The `params` passed to [Operation::matrix] and [Operation::definition] are the operation's
/// *dynamic* parameters, in the order a [crate::circuit_instruction::CircuitInstruction] stores
/// them.  State parameters, if an operation has any, are read from the operation itself.
pub trait Operation {
    fn name(&self) -> &str;
    fn num_qubits(&self) -> u32;
    fn num_clbits(&self) -> u32;
    fn num_params(&self) -> u32;
    fn matrix(&self, params: &[Param]) -> Option<Array2<Complex64>>;
    fn definition(&self, params: &[Param]) -> Option<CircuitData>;
    fn standard_gate(&self) -> Option<StandardGate>;
    /// The backwards-compatible parameter store of this operation, if it keeps one.
    fn instruction_parameters(&self) -> Option<&ParameterBackreferences> {
        None
    }
}

/// A value held in one parameter slot of an operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Param {
    ParameterExpression(Arc<ParameterExpression>),
    Float(f64),
    Int(i64),
    Str(String),
}

impl Param {
    /// Get the numeric value of this parameter, if it has one.
    pub fn try_float(&self) -> Result<f64, ParameterError> {
        match self {
            Param::Float(value) => Ok(*value),
            Param::Int(value) => Ok(*value as f64),
            Param::ParameterExpression(expr) => expr.try_to_value(),
            Param::Str(_) => Err(ParameterError::UnboundParameter),
        }
    }

    /// Whether this is a symbolic expression that still depends on unbound parameters.
    pub fn is_unbound_expression(&self) -> bool {
        matches!(self, Param::ParameterExpression(expr) if !expr.is_bound())
    }

    /// `-self`, or `None` if this parameter is not numeric.
    pub fn checked_neg(&self) -> Option<Param> {
        match self {
            Param::Float(value) => Some(Param::Float(-value)),
            Param::Int(value) => value.checked_neg().map(Param::Int),
            Param::ParameterExpression(expr) => Some(Param::from(expr.neg())),
            Param::Str(_) => None,
        }
    }

    /// `self + rhs`, or `None` if this parameter is not numeric.
    pub fn checked_add(&self, rhs: f64) -> Option<Param> {
        match self {
            Param::Float(value) => Some(Param::Float(value + rhs)),
            Param::Int(value) => Some(Param::Float(*value as f64 + rhs)),
            Param::ParameterExpression(expr) => Some(Param::from(expr.add_value(rhs))),
            Param::Str(_) => None,
        }
    }

    /// `self * rhs`, or `None` if this parameter is not numeric.
    pub fn checked_mul(&self, rhs: f64) -> Option<Param> {
        match self {
            Param::Float(value) => Some(Param::Float(value * rhs)),
            Param::Int(value) => Some(Param::Float(*value as f64 * rhs)),
            Param::ParameterExpression(expr) => Some(Param::from(expr.mul_value(rhs))),
            Param::Str(_) => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::ParameterExpression(expr) => write!(f, "{}", expr),
            Param::Float(value) => write!(f, "{:?}", value),
            Param::Int(value) => write!(f, "{}", value),
            Param::Str(value) => write!(f, "{}", value),
        }
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

impl From<ParameterExpression> for Param {
    fn from(value: ParameterExpression) -> Self {
        Param::ParameterExpression(Arc::new(value))
    }
}

/// The primitive gates that library gates decompose into.
#[derive(Clone, Debug, Copy, Eq, PartialEq, Hash)]
pub enum StandardGate {
    HGate,
    XGate,
    SGate,
    SdgGate,
    TGate,
    TdgGate,
    CXGate,
    PhaseGate,
    UGate,
}

impl Operation for StandardGate {
    fn name(&self) -> &str {
        match self {
            Self::HGate => "h",
            Self::XGate => "x",
            Self::SGate => "s",
            Self::SdgGate => "sdg",
            Self::TGate => "t",
            Self::TdgGate => "tdg",
            Self::CXGate => "cx",
            Self::PhaseGate => "p",
            Self::UGate => "u",
        }
    }

    fn num_qubits(&self) -> u32 {
        match self {
            Self::CXGate => 2,
            _ => 1,
        }
    }

    fn num_clbits(&self) -> u32 {
        0
    }

    fn num_params(&self) -> u32 {
        match self {
            Self::PhaseGate => 1,
            Self::UGate => 3,
            _ => 0,
        }
    }

    fn matrix(&self, params: &[Param]) -> Option<Array2<Complex64>> {
        if params.len() != self.num_params() as usize {
            return None;
        }
        match self {
            Self::HGate => Some(aview2(&gate_matrix::H_GATE).to_owned()),
            Self::XGate => Some(aview2(&gate_matrix::X_GATE).to_owned()),
            Self::SGate => Some(aview2(&gate_matrix::S_GATE).to_owned()),
            Self::SdgGate => Some(aview2(&gate_matrix::SDG_GATE).to_owned()),
            Self::TGate => Some(aview2(&gate_matrix::T_GATE).to_owned()),
            Self::TdgGate => Some(aview2(&gate_matrix::TDG_GATE).to_owned()),
            Self::CXGate => Some(aview2(&gate_matrix::CX_GATE).to_owned()),
            Self::PhaseGate => {
                let lam = params[0].try_float().ok()?;
                Some(aview2(&gate_matrix::phase_gate(lam)).to_owned())
            }
            Self::UGate => {
                let theta = params[0].try_float().ok()?;
                let phi = params[1].try_float().ok()?;
                let lam = params[2].try_float().ok()?;
                Some(aview2(&gate_matrix::u_gate(theta, phi, lam)).to_owned())
            }
        }
    }

    fn definition(&self, params: &[Param]) -> Option<CircuitData> {
        match self {
            Self::HGate => CircuitData::from_standard_gates(
                1,
                [(
                    Self::UGate,
                    smallvec![Param::Float(PI / 2.), FLOAT_ZERO, Param::Float(PI)],
                    smallvec![Qubit(0)],
                )],
                FLOAT_ZERO,
            )
            .ok(),
            Self::XGate => CircuitData::from_standard_gates(
                1,
                [(
                    Self::UGate,
                    smallvec![Param::Float(PI), FLOAT_ZERO, Param::Float(PI)],
                    smallvec![Qubit(0)],
                )],
                FLOAT_ZERO,
            )
            .ok(),
            Self::SGate => phase_definition(Param::Float(PI / 2.)),
            Self::SdgGate => phase_definition(Param::Float(-PI / 2.)),
            Self::TGate => phase_definition(Param::Float(PI / 4.)),
            Self::TdgGate => phase_definition(Param::Float(-PI / 4.)),
            Self::PhaseGate => CircuitData::from_standard_gates(
                1,
                [(
                    Self::UGate,
                    smallvec![FLOAT_ZERO, FLOAT_ZERO, params.first()?.clone()],
                    smallvec![Qubit(0)],
                )],
                FLOAT_ZERO,
            )
            .ok(),
            Self::CXGate => None,
            Self::UGate => None,
        }
    }

    fn standard_gate(&self) -> Option<StandardGate> {
        Some(*self)
    }
}

fn phase_definition(lam: Param) -> Option<CircuitData> {
    CircuitData::from_standard_gates(
        1,
        [(StandardGate::PhaseGate, smallvec![lam], smallvec![Qubit(0)])],
        FLOAT_ZERO,
    )
    .ok()
}

pub const FLOAT_ZERO: Param = Param::Float(0.0);
