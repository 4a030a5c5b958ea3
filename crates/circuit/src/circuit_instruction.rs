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

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use ndarray::Array2;
use num_complex::Complex64;
use smallvec::SmallVec;

use crate::circuit_data::CircuitData;
use crate::gate::Gate;
use crate::instruction_parameters::{InstructionParameterError, ParameterBackreferences};
use crate::operations::{Operation, Param, StandardGate};
use crate::Qubit;

/// The operation held by a [CircuitInstruction].
#[derive(Clone, Debug)]
pub enum OperationType {
    Standard(StandardGate),
    Gate(Box<dyn Gate>),
}

impl Operation for OperationType {
    fn name(&self) -> &str {
        match self {
            Self::Standard(op) => op.name(),
            Self::Gate(op) => op.name(),
        }
    }

    fn num_qubits(&self) -> u32 {
        match self {
            Self::Standard(op) => op.num_qubits(),
            Self::Gate(op) => op.num_qubits(),
        }
    }

    fn num_clbits(&self) -> u32 {
        match self {
            Self::Standard(op) => op.num_clbits(),
            Self::Gate(op) => op.num_clbits(),
        }
    }

    fn num_params(&self) -> u32 {
        match self {
            Self::Standard(op) => op.num_params(),
            Self::Gate(op) => op.num_params(),
        }
    }

    fn matrix(&self, params: &[Param]) -> Option<Array2<Complex64>> {
        match self {
            Self::Standard(op) => op.matrix(params),
            Self::Gate(op) => op.matrix(params),
        }
    }

    fn definition(&self, params: &[Param]) -> Option<CircuitData> {
        match self {
            Self::Standard(op) => op.definition(params),
            Self::Gate(op) => op.definition(params),
        }
    }

    fn standard_gate(&self) -> Option<StandardGate> {
        match self {
            Self::Standard(op) => Some(*op),
            Self::Gate(_) => None,
        }
    }

    fn instruction_parameters(&self) -> Option<&ParameterBackreferences> {
        match self {
            Self::Standard(_) => None,
            Self::Gate(op) => op.instruction_parameters(),
        }
    }
}

impl From<StandardGate> for OperationType {
    fn from(value: StandardGate) -> Self {
        Self::Standard(value)
    }
}

/// One operation in a circuit, together with the qubits it acts on.
///
/// The instruction owns the storage of its operation's dynamic parameters.  A library gate held
/// here is bound to `parameters`, so reads and writes through the gate and through the
/// instruction see the same values.
#[derive(Debug)]
pub struct CircuitInstruction {
    pub operation: OperationType,
    pub qubits: SmallVec<[Qubit; 2]>,
    parameters: Rc<RefCell<Vec<Param>>>,
}

impl CircuitInstruction {
    pub(crate) fn new(
        operation: OperationType,
        qubits: SmallVec<[Qubit; 2]>,
        parameters: Rc<RefCell<Vec<Param>>>,
    ) -> Self {
        Self {
            operation,
            qubits,
            parameters,
        }
    }

    /// The dynamic parameters of the operation, in slot order.
    pub fn params(&self) -> Ref<'_, Vec<Param>> {
        self.parameters.borrow()
    }

    /// Overwrite one dynamic parameter, returning the previous value.  For a bound library gate
    /// the change is visible through the gate's own parameter store.
    pub fn set_param(
        &self,
        index: usize,
        value: Param,
    ) -> Result<Param, InstructionParameterError> {
        let mut parameters = self
            .parameters
            .try_borrow_mut()
            .map_err(|_| InstructionParameterError::ContainerBorrowed)?;
        let len = parameters.len();
        let slot = parameters
            .get_mut(index)
            .ok_or(InstructionParameterError::ForeignIndexOutOfRange {
                foreign: index,
                len,
            })?;
        Ok(std::mem::replace(slot, value))
    }

    /// The shared parameter store that a bound gate delegates to.
    pub fn parameter_store(&self) -> &Rc<RefCell<Vec<Param>>> {
        &self.parameters
    }

    pub fn is_parameterized(&self) -> bool {
        self.parameters
            .borrow()
            .iter()
            .any(Param::is_unbound_expression)
    }

    pub fn matrix(&self) -> Option<Array2<Complex64>> {
        self.operation.matrix(&self.parameters.borrow())
    }

    pub fn definition(&self) -> Option<CircuitData> {
        self.operation.definition(&self.parameters.borrow())
    }
}
