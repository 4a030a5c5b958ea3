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

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashSet;
use ndarray::Array2;
use num_complex::Complex64;
use smallvec::SmallVec;
use tracing::debug;

use crate::circuit_instruction::{CircuitInstruction, OperationType};
use crate::error::CircuitError;
use crate::gate::Gate;
use crate::operations::{Operation, Param, StandardGate};
use crate::parameter::parameter_expression::ParameterError;
use crate::util::embed;
use crate::Qubit;

/// An ordered list of instructions over a fixed number of qubits.
///
/// This is the form that gate decompositions take.  Library gates are appended by copy; the copy
/// is bound to parameter storage owned by its [CircuitInstruction].
#[derive(Debug)]
pub struct CircuitData {
    num_qubits: u32,
    data: Vec<CircuitInstruction>,
    global_phase: Param,
}

impl CircuitData {
    pub fn new(num_qubits: u32, global_phase: Param) -> Self {
        CircuitData {
            num_qubits,
            data: Vec::new(),
            global_phase,
        }
    }

    /// A constructor for circuits that only contain standard gates.
    pub fn from_standard_gates<I>(
        num_qubits: u32,
        instructions: I,
        global_phase: Param,
    ) -> Result<Self, CircuitError>
    where
        I: IntoIterator<Item = (StandardGate, SmallVec<[Param; 3]>, SmallVec<[Qubit; 2]>)>,
    {
        let instruction_iter = instructions.into_iter();
        let mut res = CircuitData {
            num_qubits,
            data: Vec::with_capacity(instruction_iter.size_hint().0),
            global_phase,
        };
        for (operation, params, qargs) in instruction_iter {
            res.push_standard_gate(operation, &params, &qargs)?;
        }
        Ok(res)
    }

    /// Append a standard gate.
    pub fn push_standard_gate(
        &mut self,
        operation: StandardGate,
        params: &[Param],
        qargs: &[Qubit],
    ) -> Result<(), CircuitError> {
        if params.len() != operation.num_params() as usize {
            return Err(CircuitError::ParamCountMismatch {
                name: operation.name().to_string(),
                expected: operation.num_params() as usize,
                actual: params.len(),
            });
        }
        self.check_qargs(operation.name(), operation.num_qubits(), qargs)?;
        self.data.push(CircuitInstruction::new(
            operation.into(),
            qargs.iter().copied().collect(),
            Rc::new(RefCell::new(params.to_vec())),
        ));
        Ok(())
    }

    /// Append a copy of a library gate.
    ///
    /// The current values of the gate's dynamic parameters move into storage owned by the new
    /// instruction, and the copy is bound to that storage.  The caller's `gate` is not modified
    /// and stays unbound (or bound to whatever it was bound to before).
    pub fn append(&mut self, gate: &dyn Gate, qargs: &[Qubit]) -> Result<(), CircuitError> {
        self.check_qargs(gate.name(), gate.num_qubits(), qargs)?;
        let values = gate.base().params().dynamic_parameters()?;
        let num_dynamic = values.len();
        let parameters = Rc::new(RefCell::new(values));
        let mut operation = gate.clone_gate();
        operation.base_mut().params_mut().reference(&parameters)?;
        debug!(
            name = operation.name(),
            num_dynamic,
            index = self.data.len(),
            "appended gate with instruction-owned parameters"
        );
        self.data.push(CircuitInstruction::new(
            OperationType::Gate(operation),
            qargs.iter().copied().collect(),
            parameters,
        ));
        Ok(())
    }

    fn check_qargs(
        &self,
        name: &str,
        num_qubits: u32,
        qargs: &[Qubit],
    ) -> Result<(), CircuitError> {
        if qargs.len() != num_qubits as usize {
            return Err(CircuitError::QubitCountMismatch {
                name: name.to_string(),
                expected: num_qubits as usize,
                actual: qargs.len(),
            });
        }
        let mut seen = HashSet::with_capacity(qargs.len());
        for qubit in qargs {
            if qubit.index() >= self.num_qubits as usize {
                return Err(CircuitError::QubitExceedsCapacity(qubit.index()));
            }
            if !seen.insert(*qubit) {
                return Err(CircuitError::DuplicateQubits);
            }
        }
        Ok(())
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CircuitInstruction> {
        self.data.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CircuitInstruction> {
        self.data.get_mut(index)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CircuitInstruction> + '_ {
        self.data.iter()
    }

    pub fn global_phase(&self) -> &Param {
        &self.global_phase
    }

    pub fn set_global_phase(&mut self, global_phase: Param) {
        self.global_phase = global_phase;
    }

    /// The unitary of the whole circuit, in little-endian qubit order and including the global
    /// phase.
    ///
    /// Instructions without a matrix of their own are expanded through their definition.
    pub fn to_matrix(&self) -> Result<Array2<Complex64>, CircuitError> {
        let dim = 1usize << self.num_qubits;
        let mut out = Array2::<Complex64>::eye(dim);
        for instruction in &self.data {
            let qubits = instruction
                .qubits
                .iter()
                .map(|q| q.index())
                .collect::<SmallVec<[usize; 2]>>();
            let local = instruction_matrix(instruction)?;
            out = embed(local.view(), &qubits, self.num_qubits as usize).dot(&out);
        }
        let phase = self.global_phase.try_float()?;
        Ok(out.mapv(|value| value * Complex64::from_polar(1., phase)))
    }
}

fn instruction_matrix(instruction: &CircuitInstruction) -> Result<Array2<Complex64>, CircuitError> {
    if let Some(matrix) = instruction.matrix() {
        return Ok(matrix);
    }
    if instruction.is_parameterized() {
        return Err(ParameterError::UnboundParameter.into());
    }
    instruction
        .definition()
        .ok_or_else(|| CircuitError::NoMatrix(instruction.operation.name().to_string()))?
        .to_matrix()
}

impl<'a> IntoIterator for &'a CircuitData {
    type Item = &'a CircuitInstruction;
    type IntoIter = std::slice::Iter<'a, CircuitInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl IntoIterator for CircuitData {
    type Item = CircuitInstruction;
    type IntoIter = std::vec::IntoIter<CircuitInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
