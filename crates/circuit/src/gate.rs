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

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use crate::circuit_data::CircuitData;
use crate::error::CircuitError;
use crate::instruction_parameters::{
    InstructionParameterError, ParameterBackreferences, ParameterType,
};
use crate::operations::{Operation, Param};
use crate::parameter::parameter_expression::ParameterError;
use crate::slice::SequenceKey;

/// The fixed parameter specification of a gate class.
pub type GateSpec = &'static [&'static dyn ParameterType];

/// The state shared by every library gate: its identity and its parameter store.
#[derive(Clone, Debug)]
pub struct GateBase {
    name: &'static str,
    num_qubits: u32,
    label: Option<String>,
    spec: GateSpec,
    params: ParameterBackreferences,
}

impl GateBase {
    /// Create a gate whose parameter store is built from `spec`.  If `params` is given, it must
    /// have one value per slot and every value is type checked against its slot.
    pub fn new(
        name: &'static str,
        num_qubits: u32,
        spec: GateSpec,
        params: Option<Vec<Param>>,
        label: Option<String>,
    ) -> Result<Self, CircuitError> {
        let mut out = Self::with_spec(name, num_qubits, spec, label);
        if let Some(params) = params {
            if params.len() != spec.len() {
                return Err(CircuitError::ParamCountMismatch {
                    name: name.to_string(),
                    expected: spec.len(),
                    actual: params.len(),
                });
            }
            for (index, value) in params.into_iter().enumerate() {
                out.set_param(index as isize, value)?;
            }
        }
        Ok(out)
    }

    /// Create a gate whose parameter slots all start unset.
    pub fn with_spec(
        name: &'static str,
        num_qubits: u32,
        spec: GateSpec,
        label: Option<String>,
    ) -> Self {
        Self {
            name,
            num_qubits,
            label,
            spec,
            params: ParameterBackreferences::new(spec),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn spec(&self) -> GateSpec {
        self.spec
    }

    pub fn param(&self, index: isize) -> Result<Param, CircuitError> {
        Ok(self.params.get(index)?)
    }

    /// Set one parameter, normalising it through the slot's [ParameterType] first.
    pub fn set_param(&mut self, index: isize, value: Param) -> Result<(), CircuitError> {
        let slot = SequenceKey::convert_idx(index, self.spec.len()).map_err(|_| {
            InstructionParameterError::IndexOutOfRange {
                index,
                len: self.spec.len(),
            }
        })?;
        let value = self.spec[slot].bind(value)?;
        self.params.set(index, value)?;
        Ok(())
    }

    pub fn params(&self) -> &ParameterBackreferences {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterBackreferences {
        &mut self.params
    }
}

/// A gate object from the circuit library.
///
/// Library gates keep their parameters in a [ParameterBackreferences] so that the values can be
/// redirected into a circuit once the gate is appended.  The `params` given to
/// [Gate::gate_matrix] and [Gate::decompose] are the dynamic parameters in slot order; use
/// [Gate::to_matrix] and [Gate::definition_circuit] to act on the gate's current values.
pub trait Gate: Operation + fmt::Debug {
    fn base(&self) -> &GateBase;
    fn base_mut(&mut self) -> &mut GateBase;

    fn gate_matrix(&self, params: &[Param]) -> Result<Array2<Complex64>, CircuitError>;
    fn decompose(&self, params: &[Param]) -> Result<CircuitData, CircuitError>;
    fn inverse(&self) -> Result<Box<dyn Gate>, CircuitError>;

    /// An unbound copy of this gate.
    fn clone_gate(&self) -> Box<dyn Gate>;

    fn to_matrix(&self) -> Result<Array2<Complex64>, CircuitError> {
        let params = self.base().params().dynamic_parameters()?;
        if params.iter().any(Param::is_unbound_expression) {
            return Err(ParameterError::UnboundParameter.into());
        }
        self.gate_matrix(&params)
    }

    fn definition_circuit(&self) -> Result<CircuitData, CircuitError> {
        let params = self.base().params().dynamic_parameters()?;
        self.decompose(&params)
    }
}

impl Clone for Box<dyn Gate> {
    fn clone(&self) -> Self {
        self.clone_gate()
    }
}

/// Read the numeric value of each of `params`, failing on the first one that is unresolved.
pub fn float_params<const N: usize>(params: &[Param]) -> Result<[f64; N], CircuitError> {
    let mut out = [0.; N];
    if params.len() != N {
        return Err(CircuitError::ParamCountMismatch {
            name: "matrix".to_string(),
            expected: N,
            actual: params.len(),
        });
    }
    for (value, param) in out.iter_mut().zip(params) {
        *value = param.try_float()?;
    }
    Ok(out)
}

/// Implement [Operation] for a type that implements [Gate], by delegating to its [GateBase].
#[macro_export]
macro_rules! impl_gate_operation {
    ($gate:ty) => {
        impl $crate::operations::Operation for $gate {
            fn name(&self) -> &str {
                $crate::gate::Gate::base(self).name()
            }

            fn num_qubits(&self) -> u32 {
                $crate::gate::Gate::base(self).num_qubits()
            }

            fn num_clbits(&self) -> u32 {
                0
            }

            fn num_params(&self) -> u32 {
                $crate::gate::Gate::base(self).spec().len() as u32
            }

            fn matrix(
                &self,
                params: &[$crate::operations::Param],
            ) -> Option<::ndarray::Array2<::num_complex::Complex64>> {
                $crate::gate::Gate::gate_matrix(self, params).ok()
            }

            fn definition(
                &self,
                params: &[$crate::operations::Param],
            ) -> Option<$crate::circuit_data::CircuitData> {
                $crate::gate::Gate::decompose(self, params).ok()
            }

            fn standard_gate(&self) -> Option<$crate::operations::StandardGate> {
                None
            }

            fn instruction_parameters(
                &self,
            ) -> Option<&$crate::instruction_parameters::ParameterBackreferences> {
                Some($crate::gate::Gate::base(self).params())
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instruction_parameters::{FloatType, OpaqueType};
    use crate::parameter::parameter_expression::ParameterExpression;

    static SPEC: [&dyn ParameterType; 2] = [&OpaqueType, &FloatType];

    #[test]
    fn new_checks_count_and_types() {
        let base = GateBase::new(
            "g",
            1,
            &SPEC,
            Some(vec![Param::from("mode"), Param::Int(3)]),
            Some("lbl".to_string()),
        )
        .unwrap();
        assert_eq!(base.param(1).unwrap(), Param::Float(3.0));
        assert_eq!(base.param(0).unwrap(), Param::from("mode"));
        assert_eq!(base.label(), Some("lbl"));

        assert_eq!(
            GateBase::new("g", 1, &SPEC, Some(vec![Param::Int(3)]), None).unwrap_err(),
            CircuitError::ParamCountMismatch {
                name: "g".to_string(),
                expected: 2,
                actual: 1
            }
        );
        assert!(matches!(
            GateBase::new("g", 1, &SPEC, Some(vec![Param::Int(3), Param::from("x")]), None),
            Err(CircuitError::ParameterTypeError(_))
        ));
    }

    #[test]
    fn set_param_uses_slot_type() {
        let mut base = GateBase::new("g", 1, &SPEC, None, None).unwrap();
        base.set_param(-1, Param::Int(2)).unwrap();
        assert_eq!(base.params().get(1), Ok(Param::Float(2.0)));
        let theta = Param::from(ParameterExpression::parameter("θ"));
        base.set_param(1, theta.clone()).unwrap();
        assert_eq!(base.param(-1).unwrap(), theta);
        assert!(matches!(
            base.set_param(2, Param::Int(0)),
            Err(CircuitError::InstructionParameterError(
                InstructionParameterError::IndexOutOfRange { index: 2, len: 2 }
            ))
        ));
    }

    #[test]
    fn float_params_requires_values() {
        assert_eq!(
            float_params::<2>(&[Param::Float(1.0), Param::Int(2)]).unwrap(),
            [1.0, 2.0]
        );
        let theta = Param::from(ParameterExpression::parameter("θ"));
        assert_eq!(
            float_params::<1>(&[theta]).unwrap_err(),
            CircuitError::ParameterError(ParameterError::UnboundParameter)
        );
    }
}
