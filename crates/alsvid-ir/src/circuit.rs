//! High-level circuit builder API.
//!
//! A [`Circuit`] is an ordered instruction sequence over declared qubit and
//! classical-bit counts. Validation happens eagerly at every push: once an
//! instruction is accepted, its operand indices are known to be in range and
//! its shape consistent. The simulator only ever reads a circuit.

use num_complex::Complex64;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit.
///
/// Provides a fluent API for building circuits, with convenient methods for
/// the standard gate set.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Ordered instruction sequence.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_qubits: 0,
            num_clbits: 0,
            instructions: vec![],
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    /// Rebuild a circuit from its parts, re-validating every instruction.
    ///
    /// Used by deserialization so that a loaded circuit satisfies the same
    /// invariants as a built one.
    pub fn from_parts(
        name: impl Into<String>,
        num_qubits: u32,
        num_clbits: u32,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Self> {
        let mut circuit = Self::with_size(name, num_qubits, num_clbits);
        for inst in instructions {
            circuit.push(inst)?;
        }
        Ok(circuit)
    }

    /// Add a single qubit to the circuit, returning its id.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.num_qubits);
        self.num_qubits += 1;
        id
    }

    /// Add `size` qubits, returning their ids.
    pub fn add_qubits(&mut self, size: u32) -> Vec<QubitId> {
        (0..size).map(|_| self.add_qubit()).collect()
    }

    /// Add a single classical bit to the circuit, returning its id.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        id
    }

    /// Add `size` classical bits, returning their ids.
    pub fn add_clbits(&mut self, size: u32) -> Vec<ClbitId> {
        (0..size).map(|_| self.add_clbit()).collect()
    }

    /// Append an instruction, validating its operands.
    ///
    /// Checks, in order: qubit/clbit bounds, duplicate qubit operands, gate
    /// arity against operand count, unitary matrix dimension against operand
    /// count, and measurement shape.
    pub fn push(&mut self, inst: Instruction) -> IrResult<&mut Self> {
        let gate_name = || Some(inst.name().to_string());

        for &qubit in &inst.qubits {
            if qubit.0 >= self.num_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                    gate_name: gate_name(),
                });
            }
        }
        for &clbit in &inst.clbits {
            if clbit.0 >= self.num_clbits {
                return Err(IrError::ClbitOutOfRange {
                    clbit,
                    num_clbits: self.num_clbits,
                    gate_name: gate_name(),
                });
            }
        }
        for (i, &qubit) in inst.qubits.iter().enumerate() {
            if inst.qubits[..i].contains(&qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name(),
                });
            }
        }

        match &inst.kind {
            InstructionKind::Gate(gate) => {
                let expected = gate.num_qubits();
                let got = inst.qubits.len() as u32;
                if expected != got {
                    return Err(IrError::ArityMismatch {
                        gate_name: gate.name().to_string(),
                        expected,
                        got,
                    });
                }
            }
            InstructionKind::Unitary { matrix } => {
                let k = inst.qubits.len() as u32;
                if k == 0 {
                    return Err(IrError::EmptyOperands("unitary".into()));
                }
                let dim = 1usize << k;
                if matrix.len() != dim * dim {
                    return Err(IrError::InvalidMatrix {
                        expected: dim * dim,
                        got: matrix.len(),
                        num_qubits: k,
                    });
                }
            }
            InstructionKind::Measure => {
                if inst.qubits.is_empty() {
                    return Err(IrError::EmptyOperands("measure".into()));
                }
                if inst.qubits.len() != inst.clbits.len() {
                    return Err(IrError::MeasureShapeMismatch {
                        qubits: inst.qubits.len(),
                        clbits: inst.clbits.len(),
                    });
                }
            }
            InstructionKind::Reset => {
                if inst.qubits.is_empty() {
                    return Err(IrError::EmptyOperands("reset".into()));
                }
            }
            InstructionKind::Barrier => {}
        }

        self.instructions.push(inst);
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Tdg, qubit))
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::SX, qubit))
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::SXdg, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::Rx(theta),
            qubit,
        ))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::Ry(theta),
            qubit,
        ))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::Rz(theta),
            qubit,
        ))
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::P(theta), qubit))
    }

    /// Apply universal U gate.
    pub fn u(&mut self, theta: f64, phi: f64, lambda: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(
            StandardGate::U(theta, phi, lambda),
            qubit,
        ))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CY, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CZ, control, target))
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CH, control, target))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::ISwap, q1, q2))
    }

    /// Apply controlled-Rx gate.
    pub fn crx(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CRx(theta),
            control,
            target,
        ))
    }

    /// Apply controlled-Ry gate.
    pub fn cry(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CRy(theta),
            control,
            target,
        ))
    }

    /// Apply controlled-Rz gate.
    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CRz(theta),
            control,
            target,
        ))
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(
            StandardGate::CP(theta),
            control,
            target,
        ))
    }

    /// Apply RXX (XX rotation) gate.
    pub fn rxx(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::RXX(theta), q1, q2))
    }

    /// Apply RYY (YY rotation) gate.
    pub fn ryy(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::RYY(theta), q1, q2))
    }

    /// Apply RZZ (ZZ rotation) gate.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::RZZ(theta), q1, q2))
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply a general unitary from a row-major `2^k × 2^k` matrix.
    pub fn unitary(
        &mut self,
        matrix: Vec<Complex64>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::unitary(matrix, qubits))
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Measure all qubits to corresponding classical bits.
    ///
    /// Grows the classical register if it is smaller than the qubit count.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.num_clbits < self.num_qubits {
            self.add_clbit();
        }
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        let clbits: Vec<_> = (0..self.num_qubits).map(ClbitId).collect();
        self.push(Instruction::measure_many(qubits, clbits))
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Get the ordered instruction sequence.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// True when the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }
        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_qubits(), 0);
        assert_eq!(circuit.num_clbits(), 0);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap();
        assert_eq!(circuit.len(), 3);
        assert!(circuit.instructions()[2].is_measure());
    }

    #[test]
    fn test_qubit_out_of_range() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        let err = circuit.x(QubitId(1)).unwrap_err();
        assert!(matches!(
            err,
            IrError::QubitOutOfRange {
                qubit: QubitId(1),
                num_qubits: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_clbit_out_of_range() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        let err = circuit.measure(QubitId(0), ClbitId(0)).unwrap_err();
        assert!(matches!(err, IrError::ClbitOutOfRange { .. }));
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit.cx(QubitId(0), QubitId(0)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        let err = circuit
            .push(Instruction::gate(StandardGate::CX, [QubitId(0)]))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::ArityMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_unitary_matrix_validation() {
        let mut circuit = Circuit::with_size("test", 1, 0);
        // 3 entries is not a 2x2 matrix
        let err = circuit
            .unitary(vec![Complex64::new(1.0, 0.0); 3], [QubitId(0)])
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::InvalidMatrix {
                expected: 4,
                got: 3,
                ..
            }
        ));

        circuit
            .unitary(vec![Complex64::new(1.0, 0.0); 4], [QubitId(0)])
            .unwrap();
    }

    #[test]
    fn test_measure_shape_mismatch() {
        let mut circuit = Circuit::with_size("test", 2, 1);
        let err = circuit
            .push(Instruction::measure_many(
                [QubitId(0), QubitId(1)],
                [ClbitId(0)],
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            IrError::MeasureShapeMismatch {
                qubits: 2,
                clbits: 1
            }
        ));
    }

    #[test]
    fn test_measure_all_grows_register() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.len(), 4);
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.len(), 1 + 4 + 5);
    }

    #[test]
    fn test_from_parts_validates() {
        let bad = Instruction::single_qubit_gate(StandardGate::X, QubitId(7));
        let err = Circuit::from_parts("bad", 2, 0, [bad]).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { .. }));
    }

    #[test]
    fn test_parameterized_gates() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit
            .rx(PI / 2.0, QubitId(0))
            .unwrap()
            .cp(PI / 4.0, QubitId(0), QubitId(1))
            .unwrap();
        assert_eq!(circuit.len(), 2);
    }
}
