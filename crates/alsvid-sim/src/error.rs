//! Error types for the simulation engine.

use thiserror::Error;

use crate::backend::Backend;

/// Errors that can occur during simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Qubit index beyond the register.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit state")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    /// Basis-state index beyond the statevector.
    #[error("Basis index {index} out of range for statevector of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Statevector length does not match the circuit width.
    #[error("Statevector size mismatch: expected {expected} amplitudes, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// Input bitstring does not cover every qubit.
    #[error("Bitstring length mismatch: expected {expected} bits, got {got}")]
    BitstringLength { expected: usize, got: usize },

    /// Operation not valid in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Result requested before any circuit was simulated.
    #[error("No circuit has been simulated yet")]
    NotReady,

    /// A circuit was already simulated on this simulator.
    #[error("Simulator already holds a simulated state; create a fresh simulator")]
    AlreadySimulated,

    /// Measured qubit had vanishing probability for both outcomes.
    #[error("Degenerate measurement on qubit {qubit}: state has vanishing norm")]
    DegenerateMeasurement { qubit: usize },

    /// Backend not usable in this build.
    #[error("Backend '{0}' is not available")]
    UnsupportedBackend(Backend),

    /// Failure attributed to a specific instruction.
    #[error("Instruction {index} ({name}): {source}")]
    Instruction {
        index: usize,
        name: String,
        source: Box<SimError>,
    },

    /// Error from circuit construction or validation.
    #[error(transparent)]
    Ir(#[from] alsvid_ir::IrError),
}

impl SimError {
    /// Attach the index and name of the instruction that failed.
    pub(crate) fn at_instruction(self, index: usize, name: &str) -> Self {
        SimError::Instruction {
            index,
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
