//! Dense statevector state.
//!
//! A `StateVector<T>` holds the 2^n complex amplitudes of an n-qubit
//! register, with qubit `i` mapped to bit `i` of the basis index (qubit 0 is
//! the least significant bit). It also carries the classical record produced
//! by measurements and a cursor into the circuit being evolved, so evolution
//! can stop at a measurement boundary and resume later.

use num_complex::Complex;
use rand::Rng;

use alsvid_ir::{BitVector, Instruction, InstructionKind};

use crate::backend::Backend;
use crate::error::{SimError, SimResult};
use crate::precision::Precision;

/// A dense n-qubit statevector.
#[derive(Debug, Clone)]
pub struct StateVector<T: Precision> {
    /// The state amplitudes (2^n complex numbers).
    pub(crate) amps: Vec<Complex<T>>,
    /// Number of qubits.
    num_qubits: usize,
    /// Kernel execution backend.
    backend: Backend,
    /// Index of the next circuit instruction to apply.
    position: usize,
    /// Classical bits written by measurements, indexed by clbit.
    cstate: Vec<bool>,
}

impl<T: Precision> StateVector<T> {
    /// Create a statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1usize << num_qubits;
        let mut amps = vec![Complex::new(T::zero(), T::zero()); size];
        amps[0] = Complex::new(T::one(), T::zero());
        Self {
            amps,
            num_qubits,
            backend: Backend::default(),
            position: 0,
            cstate: Vec::new(),
        }
    }

    /// Create a |0...0⟩ state on a specific backend.
    pub fn with_backend(num_qubits: usize, backend: Backend) -> SimResult<Self> {
        if !backend.is_available() {
            return Err(SimError::UnsupportedBackend(backend));
        }
        let mut sv = Self::new(num_qubits);
        sv.backend = backend;
        Ok(sv)
    }

    /// Build a state from explicit amplitudes.
    ///
    /// The length must be a power of two and the squared norm must be within
    /// the precision's tolerance of 1.
    pub fn from_amplitudes(amps: Vec<Complex<T>>) -> SimResult<Self> {
        if amps.is_empty() || !amps.len().is_power_of_two() {
            return Err(SimError::SizeMismatch {
                expected: amps.len().next_power_of_two().max(1),
                got: amps.len(),
            });
        }
        let num_qubits = amps.len().trailing_zeros() as usize;
        let sv = Self {
            amps,
            num_qubits,
            backend: Backend::default(),
            position: 0,
            cstate: Vec::new(),
        };
        let norm = sv.norm_sqr();
        if (norm - T::one()).abs() > T::norm_epsilon() {
            return Err(SimError::InvalidOperation(format!(
                "state is not normalized: |psi|^2 = {norm}"
            )));
        }
        Ok(sv)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes (2^n).
    pub fn size(&self) -> usize {
        self.amps.len()
    }

    /// Kernel backend this state runs on.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// All amplitudes, basis-index order.
    pub fn amplitudes(&self) -> &[Complex<T>] {
        &self.amps
    }

    /// Amplitude of one basis state.
    pub fn amplitude(&self, index: usize) -> SimResult<Complex<T>> {
        self.amps
            .get(index)
            .copied()
            .ok_or(SimError::IndexOutOfRange {
                index,
                size: self.amps.len(),
            })
    }

    /// Real part of amplitude `index`.
    pub fn real(&self, index: usize) -> SimResult<T> {
        Ok(self.amplitude(index)?.re)
    }

    /// Imaginary part of amplitude `index`.
    pub fn imag(&self, index: usize) -> SimResult<T> {
        Ok(self.amplitude(index)?.im)
    }

    /// Amplitude of the basis state addressed by a bitstring.
    pub fn amplitude_of(&self, bits: &BitVector) -> SimResult<Complex<T>> {
        if bits.len() != self.num_qubits {
            return Err(SimError::BitstringLength {
                expected: self.num_qubits,
                got: bits.len(),
            });
        }
        self.amplitude(bits.to_index())
    }

    /// Born-rule probability of each basis state.
    pub fn probabilities(&self) -> Vec<T> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Squared norm of the whole state (1 for a valid state).
    pub fn norm_sqr(&self) -> T {
        self.amps
            .iter()
            .fold(T::zero(), |acc, a| acc + a.norm_sqr())
    }

    /// Reset to |0...0⟩, clearing the classical record and the cursor.
    pub fn set_initial_state(&mut self) {
        for a in &mut self.amps {
            *a = Complex::new(T::zero(), T::zero());
        }
        self.amps[0] = Complex::new(T::one(), T::zero());
        self.position = 0;
        self.cstate.clear();
    }

    /// Classical bits written by measurements so far.
    pub fn classical_bits(&self) -> &[bool] {
        &self.cstate
    }

    /// Classical record as a bitstring, padded to `num_clbits` bits.
    pub fn classical_record(&self, num_clbits: usize) -> BitVector {
        let mut bits = vec![false; num_clbits.max(self.cstate.len())];
        bits[..self.cstate.len()].copy_from_slice(&self.cstate);
        BitVector::from_bits(bits)
    }

    /// Index of the next circuit instruction to apply.
    pub fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn record_clbit(&mut self, clbit: usize, value: bool) {
        if clbit >= self.cstate.len() {
            self.cstate.resize(clbit + 1, false);
        }
        self.cstate[clbit] = value;
    }

    fn check_qubit(&self, qubit: usize) -> SimResult<()> {
        if qubit < self.num_qubits {
            Ok(())
        } else {
            Err(SimError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
            })
        }
    }

    /// Apply one instruction, drawing randomness for measurements and resets
    /// from `rng`.
    pub fn apply<R: Rng>(&mut self, instruction: &Instruction, rng: &mut R) -> SimResult<()> {
        for q in &instruction.qubits {
            self.check_qubit(q.index())?;
        }
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_standard_gate(*gate, &qubits);
                Ok(())
            }
            InstructionKind::Unitary { matrix } => {
                let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_unitary(matrix, &qubits)
            }
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let outcome = self.measure_qubit(q.index(), rng)?;
                    self.record_clbit(c.index(), outcome);
                }
                Ok(())
            }
            InstructionKind::Reset => {
                for q in &instruction.qubits {
                    self.reset_qubit(q.index(), rng)?;
                }
                Ok(())
            }
            InstructionKind::Barrier => Ok(()),
        }
    }

    /// Measure one qubit, collapse the state, and return the outcome.
    pub fn measure_qubit<R: Rng>(&mut self, qubit: usize, rng: &mut R) -> SimResult<bool> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;

        let mut p_zero = T::zero();
        let mut p_one = T::zero();
        for (i, a) in self.amps.iter().enumerate() {
            if i & mask != 0 {
                p_one += a.norm_sqr();
            } else {
                p_zero += a.norm_sqr();
            }
        }

        let draw = T::lit(rng.r#gen::<f64>());
        let outcome = draw < p_one;
        // The retained mass is summed rather than derived from 1 - p so a
        // state whose norm has decayed still trips the floor.
        let retained = if outcome { p_one } else { p_zero };
        if retained < T::prob_floor() {
            return Err(SimError::DegenerateMeasurement { qubit });
        }

        let scale = retained.sqrt().recip();
        let zero = Complex::new(T::zero(), T::zero());
        for (i, a) in self.amps.iter_mut().enumerate() {
            if ((i & mask) != 0) == outcome {
                *a = a.scale(scale);
            } else {
                *a = zero;
            }
        }
        Ok(outcome)
    }

    /// Reset one qubit to |0⟩ by measuring and flipping on outcome 1.
    pub fn reset_qubit<R: Rng>(&mut self, qubit: usize, rng: &mut R) -> SimResult<()> {
        if self.measure_qubit(qubit, rng)? {
            self.apply_x(qubit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv: StateVector<f64> = StateVector::new(2);
        assert_eq!(sv.size(), 4);
        assert!(approx(sv.amplitudes()[0], Complex::new(1.0, 0.0)));
        assert!(sv.amplitudes()[1..].iter().all(|a| a.norm() < 1e-15));
    }

    #[test]
    fn test_zero_qubits() {
        let sv: StateVector<f64> = StateVector::new(0);
        assert_eq!(sv.size(), 1);
        assert!((sv.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_amplitudes_rejects_bad_length() {
        let err = StateVector::<f64>::from_amplitudes(vec![Complex::new(1.0, 0.0); 3]).unwrap_err();
        assert!(matches!(err, SimError::SizeMismatch { .. }));
    }

    #[test]
    fn test_from_amplitudes_rejects_unnormalized() {
        let err = StateVector::<f64>::from_amplitudes(vec![Complex::new(1.0, 0.0); 2]).unwrap_err();
        assert!(matches!(err, SimError::InvalidOperation(_)));
    }

    #[test]
    fn test_measure_deterministic_outcome() {
        let mut sv: StateVector<f64> = StateVector::new(1);
        sv.apply_x(0);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = sv.measure_qubit(0, &mut rng).unwrap();
        assert!(outcome);
        assert!((sv.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_measure_degenerate_state_is_reported() {
        // A state whose remaining mass has decayed below the probability
        // floor cannot be renormalized; the measurement must fail rather
        // than divide by a vanishing norm.
        let mut sv: StateVector<f64> = StateVector::new(1);
        sv.amps[0] = Complex::new(1e-13, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let err = sv.measure_qubit(0, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::DegenerateMeasurement { qubit: 0 }));
    }

    #[test]
    fn test_measure_collapses_and_renormalizes() {
        let mut sv: StateVector<f64> = StateVector::new(1);
        sv.apply_h(0);
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = sv.measure_qubit(0, &mut rng).unwrap();
        let kept = if outcome { 1 } else { 0 };
        assert!(approx(sv.amplitudes()[kept], Complex::new(1.0, 0.0)));
        assert!(approx(sv.amplitudes()[1 - kept], Complex::new(0.0, 0.0)));
    }

    #[test]
    fn test_reset_from_one() {
        let mut sv: StateVector<f64> = StateVector::new(1);
        sv.apply_x(0);
        let mut rng = StdRng::seed_from_u64(1);
        sv.reset_qubit(0, &mut rng).unwrap();
        assert!(approx(sv.amplitudes()[0], Complex::new(1.0, 0.0)));
    }

    #[test]
    fn test_qubit_out_of_range() {
        let mut sv: StateVector<f64> = StateVector::new(2);
        let mut rng = StdRng::seed_from_u64(0);
        let err = sv.measure_qubit(5, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::QubitOutOfRange { qubit: 5, .. }));
    }

    #[test]
    fn test_accelerator_unavailable() {
        let err = StateVector::<f64>::with_backend(1, Backend::Accelerator).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedBackend(_)));
    }

    #[test]
    fn test_classical_record_padding() {
        let mut sv: StateVector<f64> = StateVector::new(1);
        sv.record_clbit(2, true);
        let record = sv.classical_record(4);
        assert_eq!(record.to_string(), "0010");
    }
}
