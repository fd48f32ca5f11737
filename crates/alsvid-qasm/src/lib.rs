//! OpenQASM frontend for Alsvid.
//!
//! Parses a practical subset shared by OpenQASM 2 and 3 and lowers it
//! directly to an [`alsvid_ir::Circuit`]: register declarations in either
//! style (`qreg q[2];` / `qubit[2] q;`), the standard gate set, measurement
//! in both directions (`measure q -> c;` / `c = measure q;`), `reset`,
//! `barrier`, and constant-folded parameter expressions over `pi`.
//!
//! Custom gate definitions, control flow, and subroutines are out of scope;
//! they surface as [`ParseError::UnknownGate`] or
//! [`ParseError::Unsupported`].
//!
//! # Example
//!
//! ```
//! let circuit = alsvid_qasm::parse(
//!     r#"
//!     OPENQASM 3.0;
//!     qubit[2] q;
//!     bit[2] c;
//!     h q[0];
//!     cx q[0], q[1];
//!     c = measure q;
//!     "#,
//! )?;
//! assert_eq!(circuit.num_qubits(), 2);
//! # Ok::<(), alsvid_qasm::ParseError>(())
//! ```

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, ParseResult};
pub use parser::parse;

use alsvid_ir::Circuit;

/// Parse an OpenQASM file from disk.
pub fn parse_file<P: AsRef<std::path::Path>>(path: P) -> ParseResult<Circuit> {
    let source = std::fs::read_to_string(path.as_ref()).map_err(|e| ParseError::Io {
        path: path.as_ref().display().to_string(),
        message: e.to_string(),
    })?;
    parse(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_round_trip() {
        let path = std::env::temp_dir().join("alsvid_parse_file_test.qasm");
        std::fs::write(&path, "qreg q[2];\nh q[0];\ncx q[0], q[1];\n").unwrap();
        let circuit = parse_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.len(), 2);
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/nonexistent/alsvid.qasm").unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
