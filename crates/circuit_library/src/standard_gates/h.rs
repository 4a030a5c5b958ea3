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

use std::f64::consts::PI;

use ndarray::{aview2, Array2};
use num_complex::Complex64;
use smallvec::{smallvec, SmallVec};

use qkshim_circuit::circuit_data::CircuitData;
use qkshim_circuit::error::CircuitError;
use qkshim_circuit::gate::{Gate, GateBase};
use qkshim_circuit::gate_matrix::{CH_GATE, CH_GATE_CTRL_0, H_GATE};
use qkshim_circuit::impl_gate_operation;
use qkshim_circuit::instruction_parameters::ParameterType;
use qkshim_circuit::operations::{Param, StandardGate, FLOAT_ZERO};
use qkshim_circuit::Qubit;

static NO_PARAMS: [&dyn ParameterType; 0] = [];

/// Single-qubit Hadamard gate.
///
/// This gate is a π rotation about the X+Z axis, and has the effect of changing the computation
/// basis from |0>,|1> to |+>,|-> and vice-versa.
#[derive(Clone, Debug)]
pub struct HGate {
    base: GateBase,
}

impl HGate {
    pub fn new(label: Option<String>) -> Self {
        HGate {
            base: GateBase::with_spec("h", 1, &NO_PARAMS, label),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.base.label()
    }

    /// Return a controlled version of this gate.
    ///
    /// Only the single-control form exists here; the returned [CHGate]'s base gate keeps this
    /// gate's label.
    pub fn control(
        &self,
        num_ctrl_qubits: u32,
        label: Option<String>,
        ctrl_state: Option<u32>,
    ) -> Result<CHGate, CircuitError> {
        if num_ctrl_qubits != 1 {
            return Err(CircuitError::UnsupportedControl {
                name: self.base.name().to_string(),
                num_ctrl_qubits,
            });
        }
        CHGate::with_base_label(label, ctrl_state, self.base.label().map(str::to_string))
    }
}

impl Default for HGate {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Gate for HGate {
    fn base(&self) -> &GateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GateBase {
        &mut self.base
    }

    fn gate_matrix(&self, _params: &[Param]) -> Result<Array2<Complex64>, CircuitError> {
        Ok(aview2(&H_GATE).to_owned())
    }

    /// gate h a { u2(0,pi) a; }
    fn decompose(&self, _params: &[Param]) -> Result<CircuitData, CircuitError> {
        CircuitData::from_standard_gates(
            1,
            [(
                StandardGate::UGate,
                smallvec![Param::Float(PI / 2.), FLOAT_ZERO, Param::Float(PI)],
                smallvec![Qubit(0)],
            )],
            FLOAT_ZERO,
        )
    }

    fn inverse(&self) -> Result<Box<dyn Gate>, CircuitError> {
        Ok(Box::new(HGate::new(None)))
    }

    fn clone_gate(&self) -> Box<dyn Gate> {
        Box::new(self.clone())
    }
}

impl_gate_operation!(HGate);

/// Controlled-Hadamard gate.
///
/// Applies a Hadamard on the target qubit (qubit 1) if the control (qubit 0) is in the
/// `ctrl_state` state.
#[derive(Clone, Debug)]
pub struct CHGate {
    base: GateBase,
    ctrl_state: u32,
    base_gate: HGate,
}

impl CHGate {
    pub fn new(label: Option<String>, ctrl_state: Option<u32>) -> Result<Self, CircuitError> {
        Self::with_base_label(label, ctrl_state, None)
    }

    fn with_base_label(
        label: Option<String>,
        ctrl_state: Option<u32>,
        base_label: Option<String>,
    ) -> Result<Self, CircuitError> {
        let ctrl_state = ctrl_state.unwrap_or(1);
        if ctrl_state > 1 {
            return Err(CircuitError::InvalidCtrlState {
                ctrl_state,
                num_ctrl_qubits: 1,
            });
        }
        Ok(Self::build(label, ctrl_state, base_label))
    }

    fn build(label: Option<String>, ctrl_state: u32, base_label: Option<String>) -> Self {
        CHGate {
            base: GateBase::with_spec("ch", 2, &NO_PARAMS, label),
            ctrl_state,
            base_gate: HGate::new(base_label),
        }
    }

    pub fn ctrl_state(&self) -> u32 {
        self.ctrl_state
    }

    pub fn num_ctrl_qubits(&self) -> u32 {
        1
    }

    /// The gate that is being controlled.
    pub fn base_gate(&self) -> &HGate {
        &self.base_gate
    }

    pub fn label(&self) -> Option<&str> {
        self.base.label()
    }
}

impl Default for CHGate {
    fn default() -> Self {
        Self::build(None, 1, None)
    }
}

impl Gate for CHGate {
    fn base(&self) -> &GateBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GateBase {
        &mut self.base
    }

    fn gate_matrix(&self, _params: &[Param]) -> Result<Array2<Complex64>, CircuitError> {
        if self.ctrl_state == 1 {
            Ok(aview2(&CH_GATE).to_owned())
        } else {
            Ok(aview2(&CH_GATE_CTRL_0).to_owned())
        }
    }

    /// gate ch a,b {
    ///     s b;
    ///     h b;
    ///     t b;
    ///     cx a, b;
    ///     tdg b;
    ///     h b;
    ///     sdg b;
    /// }
    fn decompose(&self, _params: &[Param]) -> Result<CircuitData, CircuitError> {
        let a = Qubit(0);
        let b = Qubit(1);
        // An open control is the closed one conjugated by X on the control qubit.
        let open = self.ctrl_state == 0;
        let flip: (StandardGate, SmallVec<[Param; 3]>, SmallVec<[Qubit; 2]>) =
            (StandardGate::XGate, smallvec![], smallvec![a]);
        let mut instructions = Vec::with_capacity(9);
        if open {
            instructions.push(flip.clone());
        }
        instructions.extend([
            (StandardGate::SGate, smallvec![], smallvec![b]),
            (StandardGate::HGate, smallvec![], smallvec![b]),
            (StandardGate::TGate, smallvec![], smallvec![b]),
            (StandardGate::CXGate, smallvec![], smallvec![a, b]),
            (StandardGate::TdgGate, smallvec![], smallvec![b]),
            (StandardGate::HGate, smallvec![], smallvec![b]),
            (StandardGate::SdgGate, smallvec![], smallvec![b]),
        ]);
        if open {
            instructions.push(flip);
        }
        CircuitData::from_standard_gates(2, instructions, FLOAT_ZERO)
    }

    fn inverse(&self) -> Result<Box<dyn Gate>, CircuitError> {
        Ok(Box::new(CHGate::new(None, Some(self.ctrl_state))?))
    }

    fn clone_gate(&self) -> Box<dyn Gate> {
        Box::new(self.clone())
    }
}

impl_gate_operation!(CHGate);
