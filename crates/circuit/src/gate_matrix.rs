// This code is part of Qiskit.
//
// (C) Copyright IBM 2023
//
// This code is licensed under the Apache License, Version 2.0. You may
// obtain a copy of this license in the LICENSE.txt file in the root directory
// of this source tree or at http://www.apache.org/licenses/LICENSE-2.0.
//
// Any modifications or derivative works of this code must retain this
// copyright notice, and modified files need to carry a notice indicating
// that they have been altered from the originals.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;

use crate::util::{c64, GateArray1Q, GateArray2Q, C_ONE, C_ZERO, IM, M_IM};

#[inline]
pub fn r_gate(theta: f64, phi: f64) -> GateArray1Q {
    let half_theta = theta / 2.;
    let cost = c64(half_theta.cos(), 0.);
    let sint = half_theta.sin();
    let cosphi = phi.cos();
    let sinphi = phi.sin();
    [
        [cost, c64(-sint * sinphi, -sint * cosphi)],
        [c64(sint * sinphi, -sint * cosphi), cost],
    ]
}

#[inline]
pub fn u_gate(theta: f64, phi: f64, lam: f64) -> GateArray1Q {
    let cos = (theta / 2.).cos();
    let sin = (theta / 2.).sin();
    [
        [c64(cos, 0.), (-c64(0., lam).exp()) * sin],
        [c64(0., phi).exp() * sin, c64(0., phi + lam).exp() * cos],
    ]
}

#[inline]
pub fn phase_gate(lam: f64) -> GateArray1Q {
    [[C_ONE, C_ZERO], [C_ZERO, c64(0., lam).exp()]]
}

pub static H_GATE: GateArray1Q = [
    [Complex64::new(FRAC_1_SQRT_2, 0.), Complex64::new(FRAC_1_SQRT_2, 0.)],
    [Complex64::new(FRAC_1_SQRT_2, 0.), Complex64::new(-FRAC_1_SQRT_2, 0.)],
];

pub static X_GATE: GateArray1Q = [[C_ZERO, C_ONE], [C_ONE, C_ZERO]];

pub static S_GATE: GateArray1Q = [[C_ONE, C_ZERO], [C_ZERO, IM]];

pub static SDG_GATE: GateArray1Q = [[C_ONE, C_ZERO], [C_ZERO, M_IM]];

pub static T_GATE: GateArray1Q = [
    [C_ONE, C_ZERO],
    [C_ZERO, Complex64::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)],
];

pub static TDG_GATE: GateArray1Q = [
    [C_ONE, C_ZERO],
    [C_ZERO, Complex64::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)],
];

/// CX with qubit 0 as control and qubit 1 as target, in little-endian ordering.
pub static CX_GATE: GateArray2Q = [
    [C_ONE, C_ZERO, C_ZERO, C_ZERO],
    [C_ZERO, C_ZERO, C_ZERO, C_ONE],
    [C_ZERO, C_ZERO, C_ONE, C_ZERO],
    [C_ZERO, C_ONE, C_ZERO, C_ZERO],
];

/// Controlled-H with qubit 0 as the control, activated on |1>.
pub static CH_GATE: GateArray2Q = [
    [C_ONE, C_ZERO, C_ZERO, C_ZERO],
    [C_ZERO, Complex64::new(FRAC_1_SQRT_2, 0.), C_ZERO, Complex64::new(FRAC_1_SQRT_2, 0.)],
    [C_ZERO, C_ZERO, C_ONE, C_ZERO],
    [C_ZERO, Complex64::new(FRAC_1_SQRT_2, 0.), C_ZERO, Complex64::new(-FRAC_1_SQRT_2, 0.)],
];

/// Controlled-H with qubit 0 as the control, activated on |0>.
pub static CH_GATE_CTRL_0: GateArray2Q = [
    [Complex64::new(FRAC_1_SQRT_2, 0.), C_ZERO, Complex64::new(FRAC_1_SQRT_2, 0.), C_ZERO],
    [C_ZERO, C_ONE, C_ZERO, C_ZERO],
    [Complex64::new(FRAC_1_SQRT_2, 0.), C_ZERO, Complex64::new(-FRAC_1_SQRT_2, 0.), C_ZERO],
    [C_ZERO, C_ZERO, C_ZERO, C_ONE],
];
