// This code is part of Qiskit.
//
// (C) Copyright IBM 2022
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

//! Storage for the parameters of a gate while those parameters are moving out of the gate
//! object and into the circuit-level
//! [CircuitInstruction](crate::circuit_instruction::CircuitInstruction).
//!
//! A gate keeps a [ParameterBackreferences] as its parameter list.  Slots whose
//! [ParameterType] is dynamic are stored locally until the gate is placed in a circuit; at that
//! point the circuit calls [ParameterBackreferences::reference] and from then on those slots read
//! and write through to the container's parameter list.  State slots always stay local.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, trace};

use crate::operations::{Operation, Param};
use crate::slice::{SequenceIndexError, SequenceKey, SliceIndex};

/// The value given to a slot was not of a type that slot accepts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("required a {expected}, but received '{received}'")]
pub struct ParameterTypeError {
    pub expected: &'static str,
    pub received: String,
}

/// The classification of one parameter slot of an operation.
pub trait ParameterType: fmt::Debug + Send + Sync {
    /// Whether this type can be part of a dynamic circuit (`true`), or if it represents some
    /// circuit-construction state of the object that operates on it (`false`).
    fn dynamic(&self) -> bool;

    /// Type check the given `value`, returning it in a normalised form if it is valid for this
    /// type.
    fn bind(&self, value: Param) -> Result<Param, ParameterTypeError>;
}

/// A state slot holding anything; no validation is done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpaqueType;

impl ParameterType for OpaqueType {
    fn dynamic(&self) -> bool {
        false
    }

    fn bind(&self, value: Param) -> Result<Param, ParameterTypeError> {
        Ok(value)
    }
}

/// A dynamic slot holding a real number or a symbolic expression.  Integers are promoted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FloatType;

impl ParameterType for FloatType {
    fn dynamic(&self) -> bool {
        true
    }

    fn bind(&self, value: Param) -> Result<Param, ParameterTypeError> {
        match value {
            Param::Float(_) | Param::ParameterExpression(_) => Ok(value),
            Param::Int(value) => Ok(Param::Float(value as f64)),
            Param::Str(_) => Err(ParameterTypeError {
                expected: "floating-point number",
                received: value.to_string(),
            }),
        }
    }
}

/// An externally owned object that holds the live storage of an operation's dynamic parameters.
pub trait ParameterContainer {
    fn parameters(&self) -> &[Param];
    fn parameters_mut(&mut self) -> &mut [Param];
}

impl ParameterContainer for Vec<Param> {
    fn parameters(&self) -> &[Param] {
        self
    }

    fn parameters_mut(&mut self) -> &mut [Param] {
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstructionParameterError {
    #[error("index {index} out of range for {len} parameters")]
    IndexOutOfRange { index: isize, len: usize },
    #[error("parameter {0} has not been set")]
    Unset(usize),
    #[error("cannot change the number of parameters in an instruction")]
    StructuralChange,
    #[error("attempt to assign a sequence of size {actual} to a slice of size {expected}")]
    SliceLengthMismatch { expected: usize, actual: usize },
    #[error("slice step cannot be zero")]
    ZeroSliceStep,
    #[error("parameters are already bound to a live container")]
    AlreadyBound,
    #[error("container holds {available} parameters, but {required} are needed")]
    ContainerTooShort { required: usize, available: usize },
    #[error("the container holding parameter {0} no longer exists")]
    DanglingReference(usize),
    #[error("the parameter container is already borrowed mutably")]
    ContainerBorrowed,
    #[error("foreign index {foreign} out of range for a container of {len} parameters")]
    ForeignIndexOutOfRange { foreign: usize, len: usize },
    #[error("serialized parameter state is inconsistent")]
    InconsistentState,
}

/// Where the value of one local index lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Local(usize),
    Foreign(usize),
}

type ContainerRef = Rc<RefCell<dyn ParameterContainer>>;

/// A fixed-length, sequence-like parameter store for an operation that can redirect its dynamic
/// slots to a foreign [ParameterContainer].
///
/// The circuit that takes ownership of an operation should always append a copy of it, so any
/// given instance is bound to at most one container.  The reference to the container is weak;
/// this object never keeps its container alive.
pub struct ParameterBackreferences {
    bound_reference: Option<Weak<RefCell<dyn ParameterContainer>>>,
    /// Storage for local parameters.  `None` marks a slot that has never been set.
    local_parameters: Vec<Option<Param>>,
    /// The indices that are always local; these are the "state-like" parameters.
    local_keys: Arc<[usize]>,
    /// Mapping of `{local_index: foreign_index}` for the dynamic parameters.
    foreign_key_map: Arc<IndexMap<usize, usize>>,
    slots: Arc<[Slot]>,
}

impl ParameterBackreferences {
    pub fn new(parameter_spec: &[&dyn ParameterType]) -> Self {
        let mut local_keys = Vec::new();
        let mut foreign_key_map = IndexMap::new();
        let mut slots = Vec::with_capacity(parameter_spec.len());
        for (local_key, type_) in parameter_spec.iter().enumerate() {
            if type_.dynamic() {
                let foreign_key = foreign_key_map.len();
                foreign_key_map.insert(local_key, foreign_key);
                slots.push(Slot::Foreign(foreign_key));
            } else {
                local_keys.push(local_key);
                slots.push(Slot::Local(local_key));
            }
        }
        Self {
            bound_reference: None,
            local_parameters: vec![None; parameter_spec.len()],
            local_keys: local_keys.into(),
            foreign_key_map: Arc::new(foreign_key_map),
            slots: slots.into(),
        }
    }

    /// Rebuild a store from the triple produced by [ParameterBackreferences::to_state].  The
    /// result is always unbound.  Both key sets must be in ascending index order and together
    /// cover every slot exactly once.
    pub fn from_state(
        local_parameters: Vec<Option<Param>>,
        local_keys: Vec<usize>,
        foreign_key_map: IndexMap<usize, usize>,
    ) -> Result<Self, InstructionParameterError> {
        let ascending = |keys: &[usize]| keys.windows(2).all(|pair| pair[0] < pair[1]);
        let foreign_keys = foreign_key_map.keys().copied().collect::<Vec<_>>();
        if !ascending(&local_keys) || !ascending(&foreign_keys) {
            return Err(InstructionParameterError::InconsistentState);
        }
        let len = local_parameters.len();
        let mut slots = vec![None; len];
        for &key in &local_keys {
            match slots.get_mut(key) {
                Some(slot @ None) => *slot = Some(Slot::Local(key)),
                _ => return Err(InstructionParameterError::InconsistentState),
            }
        }
        let mut expected_foreign = 0;
        for (local, &foreign) in foreign_key_map.iter() {
            if foreign != expected_foreign {
                return Err(InstructionParameterError::InconsistentState);
            }
            expected_foreign += 1;
            match slots.get_mut(*local) {
                Some(slot @ None) => *slot = Some(Slot::Foreign(foreign)),
                _ => return Err(InstructionParameterError::InconsistentState),
            }
        }
        let slots = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(InstructionParameterError::InconsistentState)?;
        Ok(Self {
            bound_reference: None,
            local_parameters,
            local_keys: local_keys.into(),
            foreign_key_map: Arc::new(foreign_key_map),
            slots: slots.into(),
        })
    }

    /// The persistable state of this store.  The bound container is deliberately not part of it;
    /// if the container is reconstructed alongside, it should rebind the rebuilt store.
    pub fn to_state(&self) -> (Vec<Option<Param>>, Vec<usize>, IndexMap<usize, usize>) {
        (
            self.local_parameters.clone(),
            self.local_keys.to_vec(),
            self.foreign_key_map.as_ref().clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.local_parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local_parameters.is_empty()
    }

    pub fn local_keys(&self) -> &[usize] {
        &self.local_keys
    }

    pub fn foreign_key_map(&self) -> &IndexMap<usize, usize> {
        &self.foreign_key_map
    }

    pub fn local_parameters(&self) -> &[Option<Param>] {
        &self.local_parameters
    }

    /// Whether the dynamic slots currently delegate to a live container.
    pub fn is_bound(&self) -> bool {
        self.bound_reference
            .as_ref()
            .is_some_and(|reference| reference.strong_count() > 0)
    }

    /// Bind this parameter store to the given container.
    ///
    /// This is a separate step from construction so that an operation built with parameters
    /// keeps working with local storage until a circuit takes ownership of it.  Existing local
    /// values of dynamic slots are not moved into the container.
    pub fn reference<C>(
        &mut self,
        container: &Rc<RefCell<C>>,
    ) -> Result<(), InstructionParameterError>
    where
        C: ParameterContainer + 'static,
    {
        if self.is_bound() {
            return Err(InstructionParameterError::AlreadyBound);
        }
        let available = container
            .try_borrow()
            .map_err(|_| InstructionParameterError::ContainerBorrowed)?
            .parameters()
            .len();
        let required = self.foreign_key_map.len();
        if available < required {
            return Err(InstructionParameterError::ContainerTooShort {
                required,
                available,
            });
        }
        let container: ContainerRef = container.clone();
        self.bound_reference = Some(Rc::downgrade(&container));
        debug!(required, available, "instruction parameters bound to container");
        Ok(())
    }

    pub fn get(&self, index: isize) -> Result<Param, InstructionParameterError> {
        let index = self.resolve(index)?;
        self.read(index)
    }

    pub fn set(&mut self, index: isize, value: Param) -> Result<(), InstructionParameterError> {
        let index = self.resolve(index)?;
        self.write(index, value)
    }

    pub fn get_slice(&self, slice: SliceIndex) -> Result<Vec<Param>, InstructionParameterError> {
        SequenceKey::Slice(slice)
            .with_len(self.len())?
            .iter()
            .map(|index| self.read(index))
            .collect()
    }

    /// Assign `values` to the indices selected by `slice`, in slice order.  The number of values
    /// must match the size of the slice exactly; nothing is written if it does not.
    pub fn set_slice<I>(
        &mut self,
        slice: SliceIndex,
        values: I,
    ) -> Result<(), InstructionParameterError>
    where
        I: IntoIterator<Item = Param>,
    {
        let indices = SequenceKey::Slice(slice).with_len(self.len())?;
        let values = values.into_iter().collect::<Vec<_>>();
        if values.len() != indices.len() {
            return Err(InstructionParameterError::SliceLengthMismatch {
                expected: indices.len(),
                actual: values.len(),
            });
        }
        for (index, value) in indices.iter().zip(values) {
            self.write(index, value)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Param, InstructionParameterError>> + '_ {
        (0..self.len()).map(|index| self.read(index))
    }

    pub fn to_vec(&self) -> Result<Vec<Param>, InstructionParameterError> {
        self.iter().collect()
    }

    pub fn insert(
        &mut self,
        _index: isize,
        _value: Param,
    ) -> Result<(), InstructionParameterError> {
        Err(InstructionParameterError::StructuralChange)
    }

    pub fn remove(&mut self, _index: isize) -> Result<Param, InstructionParameterError> {
        Err(InstructionParameterError::StructuralChange)
    }

    pub fn push(&mut self, _value: Param) -> Result<(), InstructionParameterError> {
        Err(InstructionParameterError::StructuralChange)
    }

    pub fn pop(&mut self) -> Result<Param, InstructionParameterError> {
        Err(InstructionParameterError::StructuralChange)
    }

    pub fn clear(&mut self) -> Result<(), InstructionParameterError> {
        Err(InstructionParameterError::StructuralChange)
    }

    /// The parameters that could in theory be set during a circuit execution by the executing
    /// hardware, in ascending local index order.
    pub fn dynamic_parameters(&self) -> Result<Vec<Param>, InstructionParameterError> {
        self.foreign_key_map
            .keys()
            .map(|&index| self.read(index))
            .collect()
    }

    /// The parameters that make up the configuration of the operation and are not settable
    /// during circuit execution.
    pub fn state_parameters(&self) -> Result<Vec<Param>, InstructionParameterError> {
        self.local_keys.iter().map(|&index| self.read(index)).collect()
    }

    pub fn state_indices(&self) -> Vec<usize> {
        self.local_keys.to_vec()
    }

    fn resolve(&self, index: isize) -> Result<usize, InstructionParameterError> {
        SequenceKey::convert_idx(index, self.len()).map_err(|_| {
            InstructionParameterError::IndexOutOfRange {
                index,
                len: self.len(),
            }
        })
    }

    fn container(&self, index: usize) -> Result<Option<ContainerRef>, InstructionParameterError> {
        match &self.bound_reference {
            None => Ok(None),
            Some(reference) => reference
                .upgrade()
                .map(Some)
                .ok_or(InstructionParameterError::DanglingReference(index)),
        }
    }

    fn read(&self, index: usize) -> Result<Param, InstructionParameterError> {
        if let Slot::Foreign(foreign) = self.slots[index] {
            if let Some(container) = self.container(index)? {
                let container = container
                    .try_borrow()
                    .map_err(|_| InstructionParameterError::ContainerBorrowed)?;
                let parameters = container.parameters();
                trace!(index, foreign, "reading delegated parameter");
                let value = parameters.get(foreign).cloned().ok_or(
                    InstructionParameterError::ForeignIndexOutOfRange {
                        foreign,
                        len: parameters.len(),
                    },
                );
                return value;
            }
        }
        self.local_parameters[index]
            .clone()
            .ok_or(InstructionParameterError::Unset(index))
    }

    fn write(&mut self, index: usize, value: Param) -> Result<(), InstructionParameterError> {
        if let Slot::Foreign(foreign) = self.slots[index] {
            if let Some(container) = self.container(index)? {
                let mut container = container
                    .try_borrow_mut()
                    .map_err(|_| InstructionParameterError::ContainerBorrowed)?;
                let parameters = container.parameters_mut();
                let len = parameters.len();
                trace!(index, foreign, "writing delegated parameter");
                let slot = parameters
                    .get_mut(foreign)
                    .ok_or(InstructionParameterError::ForeignIndexOutOfRange { foreign, len })?;
                *slot = value;
                return Ok(());
            }
        }
        self.local_parameters[index] = Some(value);
        Ok(())
    }
}

impl From<SequenceIndexError> for InstructionParameterError {
    fn from(value: SequenceIndexError) -> Self {
        match value {
            // Only slices reach this conversion; they clamp rather than fail on range.
            SequenceIndexError::OutOfRange => InstructionParameterError::InconsistentState,
            SequenceIndexError::ZeroStep => InstructionParameterError::ZeroSliceStep,
        }
    }
}

impl Clone for ParameterBackreferences {
    /// A shallow copy that is always unbound.
    ///
    /// The local storage is copied as a new vector holding the same values; the index maps are
    /// logically immutable after creation and are shared.
    fn clone(&self) -> Self {
        Self {
            bound_reference: None,
            local_parameters: self.local_parameters.clone(),
            local_keys: Arc::clone(&self.local_keys),
            foreign_key_map: Arc::clone(&self.foreign_key_map),
            slots: Arc::clone(&self.slots),
        }
    }
}

impl fmt::Debug for ParameterBackreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBackreferences")
            .field("local_parameters", &self.local_parameters)
            .field("local_keys", &self.local_keys)
            .field("foreign_key_map", &self.foreign_key_map)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl fmt::Display for ParameterBackreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Ok(value) => write!(f, "{}", value)?,
                Err(_) => write!(f, "<unset>")?,
            }
        }
        write!(f, "]")
    }
}

impl PartialEq<[Param]> for ParameterBackreferences {
    fn eq(&self, other: &[Param]) -> bool {
        self.to_vec().is_ok_and(|values| values == other)
    }
}

impl PartialEq<Vec<Param>> for ParameterBackreferences {
    fn eq(&self, other: &Vec<Param>) -> bool {
        self == other.as_slice()
    }
}

impl Serialize for ParameterBackreferences {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (
            &self.local_parameters,
            &*self.local_keys,
            &*self.foreign_key_map,
        )
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParameterBackreferences {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (local_parameters, local_keys, foreign_key_map) =
            <(Vec<Option<Param>>, Vec<usize>, IndexMap<usize, usize>)>::deserialize(deserializer)?;
        Self::from_state(local_parameters, local_keys, foreign_key_map)
            .map_err(serde::de::Error::custom)
    }
}

/// Get the dynamic parameters used by `operation`.
///
/// An operation that does not keep a [ParameterBackreferences] cannot be handling its
/// parameters in the backwards-compatible way, so it has no dynamic parameters here.
pub fn dynamic_parameters(
    operation: &dyn Operation,
) -> Result<Vec<Param>, InstructionParameterError> {
    match operation.instruction_parameters() {
        Some(parameters) => parameters.dynamic_parameters(),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::operations::StandardGate;
    use crate::parameter::parameter_expression::ParameterExpression;

    fn opaque_float_float() -> ParameterBackreferences {
        ParameterBackreferences::new(&[&OpaqueType, &FloatType, &FloatType])
    }

    fn container(values: &[f64]) -> Rc<RefCell<Vec<Param>>> {
        Rc::new(RefCell::new(values.iter().map(|v| Param::Float(*v)).collect()))
    }

    #[test]
    fn float_type_binding() {
        assert!(FloatType.dynamic());
        assert_eq!(FloatType.bind(Param::Float(1.5)), Ok(Param::Float(1.5)));
        assert_eq!(FloatType.bind(Param::Int(2)), Ok(Param::Float(2.0)));
        let expr = Param::from(ParameterExpression::parameter("a"));
        assert_eq!(FloatType.bind(expr.clone()), Ok(expr));
        let err = FloatType.bind(Param::from("x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "required a floating-point number, but received 'x'"
        );
    }

    #[test]
    fn opaque_type_binding() {
        assert!(!OpaqueType.dynamic());
        assert_eq!(OpaqueType.bind(Param::from("x")), Ok(Param::from("x")));
        assert_eq!(OpaqueType.bind(Param::Int(3)), Ok(Param::Int(3)));
    }

    #[test]
    fn fresh_store_is_unset() {
        let params = opaque_float_float();
        assert_eq!(params.len(), 3);
        assert!(!params.is_bound());
        for index in 0..3 {
            assert_eq!(
                params.get(index),
                Err(InstructionParameterError::Unset(index as usize))
            );
        }
        let empty = ParameterBackreferences::new(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.to_vec(), Ok(vec![]));
    }

    #[test]
    fn keys_partition_indices() {
        let spec: [&dyn ParameterType; 5] =
            [&FloatType, &OpaqueType, &FloatType, &OpaqueType, &FloatType];
        let params = ParameterBackreferences::new(&spec);
        assert_eq!(params.local_keys(), &[1, 3]);
        assert_eq!(
            params.foreign_key_map().iter().map(|(&l, &f)| (l, f)).collect::<Vec<_>>(),
            vec![(0, 0), (2, 1), (4, 2)]
        );
        let mut all = params
            .local_keys()
            .iter()
            .chain(params.foreign_key_map().keys())
            .copied()
            .collect::<Vec<_>>();
        all.sort();
        assert_eq!(all, (0..5).collect::<Vec<_>>());
    }

    #[test]
    fn unbound_round_trip_and_negative_index() {
        let mut params = opaque_float_float();
        params.set(0, Param::from("x")).unwrap();
        params.set(-1, Param::Float(2.0)).unwrap();
        assert_eq!(params.get(-3), Ok(Param::from("x")));
        assert_eq!(params.get(2), Ok(Param::Float(2.0)));
        assert_eq!(
            params.get(3),
            Err(InstructionParameterError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            params.set(-4, Param::Int(0)),
            Err(InstructionParameterError::IndexOutOfRange { index: -4, len: 3 })
        );
    }

    #[test]
    fn worked_example() {
        let mut params = opaque_float_float();
        assert_eq!(params.local_keys(), &[0]);
        params.set(0, Param::from("x")).unwrap();
        params.set(1, Param::Float(1.5)).unwrap();
        params.set(2, FloatType.bind(Param::Int(2)).unwrap()).unwrap();
        assert_eq!(params.state_parameters(), Ok(vec![Param::from("x")]));
        assert_eq!(
            params.dynamic_parameters(),
            Ok(vec![Param::Float(1.5), Param::Float(2.0)])
        );

        let store = container(&[0.0, 0.0]);
        params.reference(&store).unwrap();
        assert!(params.is_bound());
        params.set(1, Param::Float(9.0)).unwrap();
        assert_eq!(store.borrow()[0], Param::Float(9.0));
        assert_eq!(params.get(1), Ok(Param::Float(9.0)));
        // Rebinding is a redirection, not a migration.
        assert_eq!(params.get(2), Ok(Param::Float(0.0)));
        assert_eq!(params.get(0), Ok(Param::from("x")));
    }

    #[test]
    fn reads_follow_the_container() {
        let mut params = ParameterBackreferences::new(&[&FloatType, &OpaqueType, &FloatType]);
        let store = container(&[0.25, 0.5]);
        params.reference(&store).unwrap();
        store.borrow_mut()[1] = Param::Float(4.0);
        assert_eq!(params.get(2), Ok(Param::Float(4.0)));
        assert_eq!(params.get(0), Ok(Param::Float(0.25)));
        assert_eq!(params.get(1), Err(InstructionParameterError::Unset(1)));
        assert_eq!(
            params.dynamic_parameters(),
            Ok(vec![Param::Float(0.25), Param::Float(4.0)])
        );
    }

    #[test]
    fn slices() {
        let spec: [&dyn ParameterType; 4] = [&FloatType; 4];
        let mut params = ParameterBackreferences::new(&spec);
        params
            .set_slice(
                SliceIndex::full(),
                [1.0, 2.0, 3.0, 4.0].into_iter().map(Param::Float),
            )
            .unwrap();
        assert_eq!(
            params.get_slice(SliceIndex::range(1, 3)),
            Ok(vec![Param::Float(2.0), Param::Float(3.0)])
        );
        assert_eq!(
            params.get_slice(SliceIndex::new(None, None, Some(-2))),
            Ok(vec![Param::Float(4.0), Param::Float(2.0)])
        );
        params
            .set_slice(
                SliceIndex::new(None, None, Some(-1)),
                [10.0, 20.0, 30.0, 40.0].into_iter().map(Param::Float),
            )
            .unwrap();
        assert_eq!(params.get(0), Ok(Param::Float(40.0)));
        assert_eq!(params.get(3), Ok(Param::Float(10.0)));
        assert_eq!(params.get_slice(SliceIndex::range(3, 1)), Ok(vec![]));
    }

    #[test]
    fn slice_length_mismatch_writes_nothing() {
        let spec: [&dyn ParameterType; 3] = [&FloatType; 3];
        let mut params = ParameterBackreferences::new(&spec);
        let result = params.set_slice(SliceIndex::range(0, 2), [Param::Float(1.0)]);
        assert_eq!(
            result,
            Err(InstructionParameterError::SliceLengthMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(params.get(0), Err(InstructionParameterError::Unset(0)));
        assert_eq!(
            params.get_slice(SliceIndex::new(None, None, Some(0))),
            Err(InstructionParameterError::ZeroSliceStep)
        );
    }

    #[test]
    fn slice_writes_through_when_bound() {
        let mut params = opaque_float_float();
        let store = container(&[0.0, 0.0]);
        params.reference(&store).unwrap();
        params
            .set_slice(
                SliceIndex::range(0, 3),
                [Param::from("x"), Param::Float(1.0), Param::Float(2.0)],
            )
            .unwrap();
        assert_eq!(*store.borrow(), vec![Param::Float(1.0), Param::Float(2.0)]);
        assert_eq!(params.local_parameters()[0], Some(Param::from("x")));
        assert_eq!(params.local_parameters()[1], None);
    }

    #[test]
    fn structural_changes_are_rejected() {
        let mut params = opaque_float_float();
        let store = container(&[0.0, 0.0]);
        for _ in 0..2 {
            assert_eq!(
                params.insert(0, Param::Float(1.0)),
                Err(InstructionParameterError::StructuralChange)
            );
            assert_eq!(params.remove(1), Err(InstructionParameterError::StructuralChange));
            assert_eq!(
                params.push(Param::Float(1.0)),
                Err(InstructionParameterError::StructuralChange)
            );
            assert_eq!(params.pop(), Err(InstructionParameterError::StructuralChange));
            assert_eq!(params.clear(), Err(InstructionParameterError::StructuralChange));
            assert_eq!(params.len(), 3);
            params.reference(&store).ok();
        }
    }

    #[test]
    fn clone_is_unbound_and_independent() {
        let mut params = opaque_float_float();
        params.set(0, Param::from("x")).unwrap();
        params.set(1, Param::Float(1.0)).unwrap();
        let store = container(&[5.0, 6.0]);
        params.reference(&store).unwrap();

        let mut copy = params.clone();
        assert!(!copy.is_bound());
        assert!(params.is_bound());
        // The copy sees the local values, not the container.
        assert_eq!(copy.get(1), Ok(Param::Float(1.0)));
        assert_eq!(copy.get(2), Err(InstructionParameterError::Unset(2)));

        copy.set(0, Param::from("y")).unwrap();
        copy.set(1, Param::Float(7.0)).unwrap();
        assert_eq!(params.get(0), Ok(Param::from("x")));
        assert_eq!(params.get(1), Ok(Param::Float(5.0)));
        assert_eq!(*store.borrow(), vec![Param::Float(5.0), Param::Float(6.0)]);
    }

    #[test]
    fn second_reference_is_rejected_while_alive() {
        let mut params = opaque_float_float();
        let first = container(&[0.0, 0.0]);
        let second = container(&[1.0, 1.0]);
        params.reference(&first).unwrap();
        assert_eq!(
            params.reference(&second),
            Err(InstructionParameterError::AlreadyBound)
        );
        drop(first);
        assert!(!params.is_bound());
        params.reference(&second).unwrap();
        assert_eq!(params.get(1), Ok(Param::Float(1.0)));
    }

    #[test]
    fn short_container_is_rejected() {
        let mut params = opaque_float_float();
        let store = container(&[0.0]);
        assert_eq!(
            params.reference(&store),
            Err(InstructionParameterError::ContainerTooShort {
                required: 2,
                available: 1
            })
        );
        assert!(!params.is_bound());
    }

    #[test]
    fn dropped_container_is_not_kept_alive() {
        let mut params = opaque_float_float();
        params.set(0, Param::from("x")).unwrap();
        params.set(1, Param::Float(1.0)).unwrap();
        let store = container(&[3.0, 4.0]);
        params.reference(&store).unwrap();
        assert_eq!(Rc::strong_count(&store), 1);
        drop(store);
        assert_eq!(
            params.get(1),
            Err(InstructionParameterError::DanglingReference(1))
        );
        assert_eq!(
            params.set(2, Param::Float(0.0)),
            Err(InstructionParameterError::DanglingReference(2))
        );
        assert_eq!(params.get(0), Ok(Param::from("x")));
        assert_eq!(params.state_parameters(), Ok(vec![Param::from("x")]));
    }

    #[test]
    fn borrowed_container_reports_error() {
        let mut params = ParameterBackreferences::new(&[&FloatType]);
        let store = container(&[1.0]);
        params.reference(&store).unwrap();
        let _guard = store.borrow_mut();
        assert_eq!(params.get(0), Err(InstructionParameterError::ContainerBorrowed));
    }

    #[test]
    fn views() {
        let spec: [&dyn ParameterType; 4] = [&FloatType, &OpaqueType, &OpaqueType, &FloatType];
        let mut params = ParameterBackreferences::new(&spec);
        for (index, value) in [(0, 0.0), (1, 1.0), (2, 2.0), (3, 3.0)] {
            params.set(index, Param::Float(value)).unwrap();
        }
        let dynamic = params.dynamic_parameters().unwrap();
        let state = params.state_parameters().unwrap();
        assert_eq!(dynamic, vec![Param::Float(0.0), Param::Float(3.0)]);
        assert_eq!(state, vec![Param::Float(1.0), Param::Float(2.0)]);
        assert_eq!(dynamic.len(), params.foreign_key_map().len());
        assert_eq!(state.len(), params.local_keys().len());

        let mut indices = params.state_indices();
        indices.push(99);
        assert_eq!(params.state_indices(), vec![1, 2]);
    }

    #[test]
    fn equality_and_display() {
        let mut params = opaque_float_float();
        params.set(0, Param::from("x")).unwrap();
        params.set(1, Param::Float(1.5)).unwrap();
        assert_eq!(params.to_string(), "[x, 1.5, <unset>]");
        assert!(params != vec![Param::from("x"), Param::Float(1.5)]);
        params.set(2, Param::Float(2.0)).unwrap();
        assert!(params == vec![Param::from("x"), Param::Float(1.5), Param::Float(2.0)]);
    }

    #[test]
    fn serialize_round_trip_is_unbound() {
        let mut params = opaque_float_float();
        params.set(0, Param::from("x")).unwrap();
        params.set(1, Param::Float(1.5)).unwrap();
        let store = container(&[7.0, 8.0]);
        params.reference(&store).unwrap();

        let bytes = bincode::serialize(&params).unwrap();
        let restored: ParameterBackreferences = bincode::deserialize(&bytes).unwrap();
        assert!(!restored.is_bound());
        assert_eq!(restored.to_state(), params.to_state());
        assert_eq!(restored.get(1), Ok(Param::Float(1.5)));
        assert_eq!(restored.get(2), Err(InstructionParameterError::Unset(2)));
    }

    #[test]
    fn inconsistent_state_is_rejected() {
        let cases = [
            // index 1 is in neither set
            (vec![None, None], vec![0], IndexMap::new()),
            // index 0 is in both sets
            (vec![None], vec![0], IndexMap::from([(0, 0)])),
            // foreign indices must be assigned in order from zero
            (vec![None, None], vec![], IndexMap::from([(0, 1), (1, 0)])),
            // out of range key
            (vec![None], vec![3], IndexMap::new()),
            // dynamic slots must be keyed in ascending index order
            (
                vec![None, None, None],
                vec![1],
                IndexMap::from([(2, 0), (0, 1)]),
            ),
            // state slots must be listed in ascending index order
            (
                vec![None, None, None],
                vec![2, 0],
                IndexMap::from([(1, 0)]),
            ),
        ];
        for (local_parameters, local_keys, foreign_key_map) in cases {
            assert_eq!(
                ParameterBackreferences::from_state(local_parameters, local_keys, foreign_key_map)
                    .unwrap_err(),
                InstructionParameterError::InconsistentState
            );
        }
    }

    #[test]
    fn dynamic_parameters_of_plain_operation_is_empty() {
        assert_eq!(dynamic_parameters(&StandardGate::UGate), Ok(vec![]));
    }
}
