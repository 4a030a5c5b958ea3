// This code is part of Qiskit.
//
// (C) Copyright IBM 2023, 2024
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

pub mod circuit_data;
pub mod circuit_instruction;
pub mod error;
pub mod gate;
pub mod gate_matrix;
pub mod instruction_parameters;
pub mod operations;
pub mod parameter;
pub mod slice;
pub mod util;

#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
#[repr(transparent)]
pub struct Qubit(pub u32);

macro_rules! impl_circuit_identifier {
    ($type:ident) => {
        impl $type {
            // The maximum storable index.
            pub const MAX: Self = Self(u32::MAX);

            /// Construct a new identifier from a usize, if you have a u32 you can
            /// construct one directly via [$type()]. This will panic if the `usize`
            /// index exceeds `u32::MAX`.
            #[inline(always)]
            pub const fn new(index: usize) -> Self {
                if index <= Self::MAX.index() {
                    Self(index as u32)
                } else {
                    panic!("Index value exceeds the maximum identifier width!")
                }
            }

            /// Convert to a usize.
            #[inline(always)]
            pub const fn index(&self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $type {
            fn from(value: u32) -> Self {
                $type(value)
            }
        }

        impl From<$type> for u32 {
            fn from(value: $type) -> Self {
                value.0
            }
        }
    };
}

impl_circuit_identifier!(Qubit);
