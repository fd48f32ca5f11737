//! Error types for the IR crate.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building or validating circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit index is outside the circuit's declared range.
    #[error("Qubit {qubit} out of range for circuit with {num_qubits} qubits{}", format_gate_context(.gate_name))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits declared by the circuit.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Classical bit index is outside the circuit's declared range.
    #[error("Classical bit {clbit} out of range for circuit with {num_clbits} bits{}", format_gate_context(.gate_name))]
    ClbitOutOfRange {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Number of classical bits declared by the circuit.
        num_clbits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    ArityMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// The same qubit appears twice in one operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Unitary matrix does not match the declared arity.
    #[error("Unitary matrix has {got} entries, expected {expected} for a {num_qubits}-qubit operation")]
    InvalidMatrix {
        /// Expected number of entries (`4^k`).
        expected: usize,
        /// Actual number of entries.
        got: usize,
        /// Declared number of target qubits.
        num_qubits: u32,
    },

    /// Measurement with mismatched qubit/clbit operand counts.
    #[error("Measurement maps {qubits} qubits to {clbits} classical bits")]
    MeasureShapeMismatch {
        /// Number of measured qubits.
        qubits: usize,
        /// Number of classical bit targets.
        clbits: usize,
    },

    /// An operation with no qubit operands.
    #[error("Operation '{0}' has no qubit operands")]
    EmptyOperands(String),

    /// Invalid character in a bit-string literal.
    #[error("Invalid character '{found}' at position {position} in bit string")]
    InvalidBitString {
        /// The offending character.
        found: char,
        /// Zero-based position in the literal.
        position: usize,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
