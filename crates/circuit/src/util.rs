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

use ndarray::{Array2, ArrayView2};
use num_complex::{Complex, Complex64};

// The two generic parameters allow calls like `c64(half_theta.cos(), 0)` that mix f64 and
// integer arguments.
/// Create a new [`Complex<f64>`] with arguments that can convert [`Into<f64>`].
#[inline]
pub fn c64<T: Into<f64>, V: Into<f64>>(re: T, im: V) -> Complex64 {
    Complex::new(re.into(), im.into())
}

pub type GateArray1Q = [[Complex64; 2]; 2];
pub type GateArray2Q = [[Complex64; 4]; 4];

pub const C_ZERO: Complex64 = Complex64::new(0., 0.);
pub const C_ONE: Complex64 = Complex64::new(1., 0.);
pub const IM: Complex64 = Complex64::new(0., 1.);
pub const M_IM: Complex64 = Complex64::new(0., -1.);

/// Embed a single-qubit matrix acting on `qubit` into the full little-endian space of
/// `num_qubits` qubits.
pub fn embed_1q(
    matrix: ArrayView2<Complex64>,
    qubit: usize,
    num_qubits: usize,
) -> Array2<Complex64> {
    embed(matrix, &[qubit], num_qubits)
}

/// Embed a matrix acting on the ordered `qubits` into the full little-endian space of
/// `num_qubits` qubits.  Row/column bit `k` of `matrix` corresponds to `qubits[k]`.
pub fn embed(
    matrix: ArrayView2<Complex64>,
    qubits: &[usize],
    num_qubits: usize,
) -> Array2<Complex64> {
    let dim = 1usize << num_qubits;
    let mut out = Array2::<Complex64>::zeros((dim, dim));
    let local = |index: usize| -> usize {
        qubits
            .iter()
            .enumerate()
            .fold(0, |acc, (k, q)| acc | (((index >> q) & 1) << k))
    };
    let mask = qubits.iter().fold(0usize, |acc, q| acc | (1 << q));
    for row in 0..dim {
        for col in 0..dim {
            // Qubits outside the operand set must be untouched.
            if row & !mask != col & !mask {
                continue;
            }
            out[[row, col]] = matrix[[local(row), local(col)]];
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::aview2;

    #[test]
    fn embed_single_qubit_on_high_qubit() {
        let x: GateArray1Q = [[C_ZERO, C_ONE], [C_ONE, C_ZERO]];
        let out = embed_1q(aview2(&x), 1, 2);
        // X on qubit 1 maps |00> -> |10>, i.e. basis index 0 -> 2.
        assert_eq!(out[[2, 0]], C_ONE);
        assert_eq!(out[[0, 2]], C_ONE);
        assert_eq!(out[[3, 1]], C_ONE);
        assert_eq!(out[[0, 0]], C_ZERO);
    }

    #[test]
    fn embed_identity_ordering() {
        let mut swap_ordered = Array2::<Complex64>::zeros((4, 4));
        for i in 0..4 {
            swap_ordered[[i, i]] = C_ONE;
        }
        let out = embed(swap_ordered.view(), &[1, 0], 2);
        assert_eq!(out, swap_ordered);
    }
}
