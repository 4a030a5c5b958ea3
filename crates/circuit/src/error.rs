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

use crate::instruction_parameters::{InstructionParameterError, ParameterTypeError};
use crate::parameter::parameter_expression::ParameterError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CircuitError {
    #[error("Qubit at index {0} exceeds circuit capacity.")]
    QubitExceedsCapacity(usize),
    #[error("Operation '{name}' acts on {expected} qubits, but {actual} were given.")]
    QubitCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Duplicate qubit arguments.")]
    DuplicateQubits,
    #[error("Operation '{name}' takes {expected} parameters, but {actual} were given.")]
    ParamCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Operation '{0}' has no matrix definition.")]
    NoMatrix(String),
    #[error(
        "Controlled version of '{name}' with {num_ctrl_qubits} control qubits is not supported."
    )]
    UnsupportedControl { name: String, num_ctrl_qubits: u32 },
    #[error("Invalid control state {ctrl_state} for {num_ctrl_qubits} control qubits.")]
    InvalidCtrlState { ctrl_state: u32, num_ctrl_qubits: u32 },
    #[error(transparent)]
    ParameterError(#[from] ParameterError),
    #[error(transparent)]
    InstructionParameterError(#[from] InstructionParameterError),
    #[error(transparent)]
    ParameterTypeError(#[from] ParameterTypeError),
}
