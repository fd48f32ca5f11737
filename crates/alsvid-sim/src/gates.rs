//! Gate kernels.
//!
//! Single-qubit gates run over amplitude pairs `(i, i | 1 << qubit)`. The
//! pair loop walks the vector in chunks of `2 * mask` and splits each chunk
//! in half, which gives disjoint borrows and lets the parallel backend hand
//! whole chunks to rayon. Multi-qubit gates use plain index masking and stay
//! serial.

use num_complex::{Complex, Complex64};
use rayon::prelude::*;

use alsvid_ir::StandardGate;

use crate::backend::Backend;
use crate::error::{SimError, SimResult};
use crate::precision::Precision;
use crate::statevector::StateVector;

impl<T: Precision> StateVector<T> {
    /// Apply `f` to every amplitude pair differing only in `qubit`.
    fn for_each_pair<F>(&mut self, qubit: usize, f: F)
    where
        F: Fn(&mut Complex<T>, &mut Complex<T>) + Send + Sync,
    {
        let mask = 1usize << qubit;
        if self.backend() == Backend::CpuParallel {
            self.amps.par_chunks_mut(2 * mask).for_each(|chunk| {
                let (lo, hi) = chunk.split_at_mut(mask);
                for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                    f(a, b);
                }
            });
        } else {
            for chunk in self.amps.chunks_mut(2 * mask) {
                let (lo, hi) = chunk.split_at_mut(mask);
                for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                    f(a, b);
                }
            }
        }
    }

    /// Apply a general 2x2 matrix `[[m00, m01], [m10, m11]]` to one qubit.
    fn apply_matrix2(&mut self, qubit: usize, m: [Complex<T>; 4]) {
        self.for_each_pair(qubit, move |a, b| {
            let (x, y) = (*a, *b);
            *a = m[0] * x + m[1] * y;
            *b = m[2] * x + m[3] * y;
        });
    }

    pub(crate) fn apply_standard_gate(&mut self, gate: StandardGate, qubits: &[usize]) {
        match gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::Y => self.apply_y(qubits[0]),
            StandardGate::Z => self.apply_z(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::S => self.apply_phase(qubits[0], T::FRAC_PI_2()),
            StandardGate::Sdg => self.apply_phase(qubits[0], -T::FRAC_PI_2()),
            StandardGate::T => self.apply_phase(qubits[0], T::FRAC_PI_4()),
            StandardGate::Tdg => self.apply_phase(qubits[0], -T::FRAC_PI_4()),
            StandardGate::SX => self.apply_rx_global(qubits[0], T::FRAC_PI_2(), T::FRAC_PI_4()),
            StandardGate::SXdg => {
                self.apply_rx_global(qubits[0], -T::FRAC_PI_2(), -T::FRAC_PI_4());
            }
            StandardGate::Rx(theta) => self.apply_rx(qubits[0], T::lit(theta)),
            StandardGate::Ry(theta) => self.apply_ry(qubits[0], T::lit(theta)),
            StandardGate::Rz(theta) => self.apply_rz(qubits[0], T::lit(theta)),
            StandardGate::P(theta) => self.apply_phase(qubits[0], T::lit(theta)),
            StandardGate::U(theta, phi, lambda) => {
                self.apply_u(qubits[0], T::lit(theta), T::lit(phi), T::lit(lambda));
            }

            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CY => self.apply_cy(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            StandardGate::CH => self.apply_ch(qubits[0], qubits[1]),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
            StandardGate::ISwap => self.apply_iswap(qubits[0], qubits[1]),
            StandardGate::CRx(theta) => {
                self.apply_controlled_rotation(qubits[0], qubits[1], rx_matrix(T::lit(theta)));
            }
            StandardGate::CRy(theta) => {
                self.apply_controlled_rotation(qubits[0], qubits[1], ry_matrix(T::lit(theta)));
            }
            StandardGate::CRz(theta) => self.apply_crz(qubits[0], qubits[1], T::lit(theta)),
            StandardGate::CP(theta) => self.apply_cp(qubits[0], qubits[1], T::lit(theta)),
            StandardGate::RXX(theta) => self.apply_rxx(qubits[0], qubits[1], T::lit(theta)),
            StandardGate::RYY(theta) => self.apply_ryy(qubits[0], qubits[1], T::lit(theta)),
            StandardGate::RZZ(theta) => self.apply_rzz(qubits[0], qubits[1], T::lit(theta)),

            StandardGate::CCX => self.apply_ccx(qubits[0], qubits[1], qubits[2]),
            StandardGate::CSwap => self.apply_cswap(qubits[0], qubits[1], qubits[2]),
        }
    }

    // =========================================================================
    // Single-qubit kernels
    // =========================================================================

    pub(crate) fn apply_x(&mut self, qubit: usize) {
        self.for_each_pair(qubit, |a, b| std::mem::swap(a, b));
    }

    fn apply_y(&mut self, qubit: usize) {
        let i_val = Complex::new(T::zero(), T::one());
        self.for_each_pair(qubit, move |a, b| {
            let tmp = *a;
            *a = -i_val * *b;
            *b = i_val * tmp;
        });
    }

    fn apply_z(&mut self, qubit: usize) {
        self.for_each_pair(qubit, |_, b| *b = -*b);
    }

    pub(crate) fn apply_h(&mut self, qubit: usize) {
        let sqrt2_inv = T::FRAC_1_SQRT_2();
        self.for_each_pair(qubit, move |a, b| {
            let (x, y) = (*a, *b);
            *a = (x + y).scale(sqrt2_inv);
            *b = (x - y).scale(sqrt2_inv);
        });
    }

    fn apply_phase(&mut self, qubit: usize, theta: T) {
        let phase = Complex::from_polar(T::one(), theta);
        self.for_each_pair(qubit, move |_, b| *b *= phase);
    }

    fn apply_rx(&mut self, qubit: usize, theta: T) {
        self.apply_matrix2(qubit, rx_matrix(theta));
    }

    /// RX with an extra global phase, `e^{i phase} RX(theta)`. SX is
    /// `e^{i pi/4} RX(pi/2)`.
    fn apply_rx_global(&mut self, qubit: usize, theta: T, phase: T) {
        let g = Complex::from_polar(T::one(), phase);
        let m = rx_matrix(theta);
        self.apply_matrix2(qubit, [g * m[0], g * m[1], g * m[2], g * m[3]]);
    }

    fn apply_ry(&mut self, qubit: usize, theta: T) {
        self.apply_matrix2(qubit, ry_matrix(theta));
    }

    fn apply_rz(&mut self, qubit: usize, theta: T) {
        let half = theta / T::lit(2.0);
        let phase_0 = Complex::from_polar(T::one(), -half);
        let phase_1 = Complex::from_polar(T::one(), half);
        self.for_each_pair(qubit, move |a, b| {
            *a *= phase_0;
            *b *= phase_1;
        });
    }

    fn apply_u(&mut self, qubit: usize, theta: T, phi: T, lambda: T) {
        let half = theta / T::lit(2.0);
        let (c, s) = (half.cos(), half.sin());
        let e_il = Complex::from_polar(T::one(), lambda);
        let e_ip = Complex::from_polar(T::one(), phi);
        let e_ipl = Complex::from_polar(T::one(), phi + lambda);
        self.apply_matrix2(
            qubit,
            [
                Complex::new(c, T::zero()),
                -e_il.scale(s),
                e_ip.scale(s),
                e_ipl.scale(c),
            ],
        );
    }

    // =========================================================================
    // Two-qubit kernels
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amps.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cy(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        let i_val = Complex::new(T::zero(), T::one());
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let tmp = self.amps[i];
                self.amps[i] = -i_val * self.amps[j];
                self.amps[j] = i_val * tmp;
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amps[i] = -self.amps[i];
            }
        }
    }

    fn apply_ch(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        let sqrt2_inv = T::FRAC_1_SQRT_2();
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amps[i];
                let b = self.amps[j];
                self.amps[i] = (a + b).scale(sqrt2_inv);
                self.amps[j] = (a - b).scale(sqrt2_inv);
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        for i in 0..self.amps.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                self.amps.swap(i, (i & !mask1) | mask2);
            }
        }
    }

    fn apply_iswap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        let i_val = Complex::new(T::zero(), T::one());
        for i in 0..self.amps.len() {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                let tmp = self.amps[i];
                self.amps[i] = i_val * self.amps[j];
                self.amps[j] = i_val * tmp;
            }
        }
    }

    /// Apply a 2x2 matrix to `target` on the subspace where `control` is 1.
    fn apply_controlled_rotation(&mut self, control: usize, target: usize, m: [Complex<T>; 4]) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let (x, y) = (self.amps[i], self.amps[j]);
                self.amps[i] = m[0] * x + m[1] * y;
                self.amps[j] = m[2] * x + m[3] * y;
            }
        }
    }

    fn apply_crz(&mut self, control: usize, target: usize, theta: T) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        let half = theta / T::lit(2.0);
        let phase_0 = Complex::from_polar(T::one(), -half);
        let phase_1 = Complex::from_polar(T::one(), half);
        for i in 0..self.amps.len() {
            if i & ctrl_mask != 0 {
                if i & tgt_mask == 0 {
                    self.amps[i] *= phase_0;
                } else {
                    self.amps[i] *= phase_1;
                }
            }
        }
    }

    fn apply_cp(&mut self, control: usize, target: usize, theta: T) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        let phase = Complex::from_polar(T::one(), theta);
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask != 0) {
                self.amps[i] *= phase;
            }
        }
    }

    // RXX/RYY mix the pair of basis states whose q1,q2 bits differ in both
    // positions; RZZ is diagonal with phase by the parity of the two bits.

    fn apply_rxx(&mut self, q1: usize, q2: usize, theta: T) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        let half = theta / T::lit(2.0);
        let c = Complex::new(half.cos(), T::zero());
        let neg_i_s = Complex::new(T::zero(), -half.sin());
        for i in 0..self.amps.len() {
            if (i & mask1 == 0) && (i & mask2 == 0) {
                // pairs (00,11) and, via i|mask1, (10,01)
                let j = i | mask1 | mask2;
                let (x, y) = (self.amps[i], self.amps[j]);
                self.amps[i] = c * x + neg_i_s * y;
                self.amps[j] = neg_i_s * x + c * y;

                let k = i | mask1;
                let l = i | mask2;
                let (x, y) = (self.amps[k], self.amps[l]);
                self.amps[k] = c * x + neg_i_s * y;
                self.amps[l] = neg_i_s * x + c * y;
            }
        }
    }

    fn apply_ryy(&mut self, q1: usize, q2: usize, theta: T) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        let half = theta / T::lit(2.0);
        let c = Complex::new(half.cos(), T::zero());
        let i_s = Complex::new(T::zero(), half.sin());
        for i in 0..self.amps.len() {
            if (i & mask1 == 0) && (i & mask2 == 0) {
                // (00,11) couples with +i sin, (10,01) with -i sin
                let j = i | mask1 | mask2;
                let (x, y) = (self.amps[i], self.amps[j]);
                self.amps[i] = c * x + i_s * y;
                self.amps[j] = i_s * x + c * y;

                let k = i | mask1;
                let l = i | mask2;
                let (x, y) = (self.amps[k], self.amps[l]);
                self.amps[k] = c * x - i_s * y;
                self.amps[l] = -i_s * x + c * y;
            }
        }
    }

    fn apply_rzz(&mut self, q1: usize, q2: usize, theta: T) {
        let mask1 = 1usize << q1;
        let mask2 = 1usize << q2;
        let half = theta / T::lit(2.0);
        let even = Complex::from_polar(T::one(), -half);
        let odd = Complex::from_polar(T::one(), half);
        for (i, a) in self.amps.iter_mut().enumerate() {
            let parity = ((i & mask1 != 0) as u8) ^ ((i & mask2 != 0) as u8);
            if parity == 1 {
                *a *= odd;
            } else {
                *a *= even;
            }
        }
    }

    // =========================================================================
    // Three-qubit kernels
    // =========================================================================

    fn apply_ccx(&mut self, c1: usize, c2: usize, target: usize) {
        let c1_mask = 1usize << c1;
        let c2_mask = 1usize << c2;
        let tgt_mask = 1usize << target;
        for i in 0..self.amps.len() {
            if (i & c1_mask != 0) && (i & c2_mask != 0) && (i & tgt_mask == 0) {
                self.amps.swap(i, i | tgt_mask);
            }
        }
    }

    fn apply_cswap(&mut self, control: usize, t1: usize, t2: usize) {
        let ctrl_mask = 1usize << control;
        let t1_mask = 1usize << t1;
        let t2_mask = 1usize << t2;
        for i in 0..self.amps.len() {
            if (i & ctrl_mask != 0) && (i & t1_mask != 0) && (i & t2_mask == 0) {
                self.amps.swap(i, (i & !t1_mask) | t2_mask);
            }
        }
    }

    // =========================================================================
    // General k-qubit unitary
    // =========================================================================

    /// Apply a row-major `2^k x 2^k` matrix to `k` qubit operands. Operand 0
    /// addresses the least significant bit of the matrix row index.
    pub(crate) fn apply_unitary(&mut self, matrix: &[Complex64], qubits: &[usize]) -> SimResult<()> {
        let k = qubits.len();
        let dim = 1usize << k;
        if matrix.len() != dim * dim {
            return Err(SimError::InvalidOperation(format!(
                "unitary on {k} qubits needs {} entries, got {}",
                dim * dim,
                matrix.len()
            )));
        }

        let m: Vec<Complex<T>> = matrix
            .iter()
            .map(|c| Complex::new(T::lit(c.re), T::lit(c.im)))
            .collect();

        // Bit offset into the statevector for each matrix row/column index.
        let mut offsets = vec![0usize; dim];
        for (sub, off) in offsets.iter_mut().enumerate() {
            for (pos, &q) in qubits.iter().enumerate() {
                if sub >> pos & 1 == 1 {
                    *off |= 1 << q;
                }
            }
        }
        let joint_mask: usize = qubits.iter().map(|&q| 1usize << q).sum();

        let zero = Complex::new(T::zero(), T::zero());
        let mut scratch = vec![zero; dim];
        for base in 0..self.amps.len() {
            if base & joint_mask != 0 {
                continue;
            }
            for (sub, s) in scratch.iter_mut().enumerate() {
                *s = self.amps[base | offsets[sub]];
            }
            for row in 0..dim {
                let mut acc = zero;
                for (col, s) in scratch.iter().enumerate() {
                    acc += m[row * dim + col] * *s;
                }
                self.amps[base | offsets[row]] = acc;
            }
        }
        Ok(())
    }
}

fn rx_matrix<T: Precision>(theta: T) -> [Complex<T>; 4] {
    let half = theta / T::lit(2.0);
    let c = Complex::new(half.cos(), T::zero());
    let neg_i_s = Complex::new(T::zero(), -half.sin());
    [c, neg_i_s, neg_i_s, c]
}

fn ry_matrix<T: Precision>(theta: T) -> [Complex<T>; 4] {
    let half = theta / T::lit(2.0);
    let (c, s) = (half.cos(), half.sin());
    [
        Complex::new(c, T::zero()),
        Complex::new(-s, T::zero()),
        Complex::new(s, T::zero()),
        Complex::new(c, T::zero()),
    ]
}
