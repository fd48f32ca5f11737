//! Structured-record serialization for circuits.
//!
//! Circuits round-trip through a versioned record: qubit/bit counts plus the
//! ordered operation list. Loading re-validates every instruction, so a
//! decoded circuit satisfies the same invariants as a built one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::circuit::Circuit;
use crate::error::IrError;
use crate::instruction::Instruction;

/// Version tag written into every record.
pub const FORMAT_VERSION: u32 = 1;

/// Errors from record encoding/decoding.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtoError {
    /// Malformed record bytes.
    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Record version this build does not understand.
    #[error("Unsupported record version {found}, supported version is {supported}")]
    UnsupportedVersion {
        /// Version found in the record.
        found: u32,
        /// Version this build writes and reads.
        supported: u32,
    },

    /// Record decoded but failed circuit validation.
    #[error("Invalid circuit in record: {0}")]
    Invalid(#[from] IrError),
}

/// Result type for record operations.
pub type ProtoResult<T> = Result<T, ProtoError>;

/// On-the-wire circuit record.
#[derive(Debug, Serialize, Deserialize)]
struct CircuitRecord {
    version: u32,
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    instructions: Vec<Instruction>,
}

/// Encode a circuit into record bytes.
pub fn save_circuit(circuit: &Circuit) -> ProtoResult<Vec<u8>> {
    let record = CircuitRecord {
        version: FORMAT_VERSION,
        name: circuit.name().to_string(),
        num_qubits: circuit.num_qubits() as u32,
        num_clbits: circuit.num_clbits() as u32,
        instructions: circuit.instructions().to_vec(),
    };
    Ok(serde_json::to_vec(&record)?)
}

/// Decode a circuit from record bytes, re-validating it.
pub fn load_circuit(bytes: &[u8]) -> ProtoResult<Circuit> {
    let record: CircuitRecord = serde_json::from_slice(bytes)?;
    if record.version != FORMAT_VERSION {
        return Err(ProtoError::UnsupportedVersion {
            found: record.version,
            supported: FORMAT_VERSION,
        });
    }
    let circuit = Circuit::from_parts(
        record.name,
        record.num_qubits,
        record.num_clbits,
        record.instructions,
    )?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;
    use crate::qubit::QubitId;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    #[test]
    fn test_circuit_roundtrip() {
        let mut circuit = Circuit::with_size("rt", 3, 3);
        circuit
            .h(QubitId(0))
            .unwrap()
            .rx(PI / 3.0, QubitId(1))
            .unwrap()
            .cx(QubitId(0), QubitId(2))
            .unwrap()
            .measure_all()
            .unwrap();

        let bytes = save_circuit(&circuit).unwrap();
        let loaded = load_circuit(&bytes).unwrap();

        assert_eq!(loaded.num_qubits(), circuit.num_qubits());
        assert_eq!(loaded.num_clbits(), circuit.num_clbits());
        assert_eq!(loaded.instructions(), circuit.instructions());
    }

    #[test]
    fn test_unitary_roundtrip() {
        let matrix = vec![
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 0.0),
        ];
        let mut circuit = Circuit::with_size("u", 1, 0);
        circuit.unitary(matrix, [QubitId(0)]).unwrap();

        let bytes = save_circuit(&circuit).unwrap();
        let loaded = load_circuit(&bytes).unwrap();
        assert_eq!(loaded.instructions(), circuit.instructions());
    }

    #[test]
    fn test_version_check() {
        let circuit = Circuit::with_size("v", 1, 0);
        let bytes = save_circuit(&circuit).unwrap();
        let mut record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        record["version"] = serde_json::json!(99);
        let bytes = serde_json::to_vec(&record).unwrap();

        let err = load_circuit(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_tampered_record_fails_validation() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        circuit.x(QubitId(1)).unwrap();
        let bytes = save_circuit(&circuit).unwrap();

        // Shrink the declared register below the used qubit index.
        let mut record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        record["num_qubits"] = serde_json::json!(1);
        let bytes = serde_json::to_vec(&record).unwrap();

        let err = load_circuit(&bytes).unwrap_err();
        assert!(matches!(err, ProtoError::Invalid(_)));
    }

    #[test]
    fn test_garbage_bytes() {
        assert!(matches!(
            load_circuit(b"not a record").unwrap_err(),
            ProtoError::Malformed(_)
        ));
    }
}
