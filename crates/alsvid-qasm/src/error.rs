//! Error types for the QASM parser.

use thiserror::Error;

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}: {message}")]
    LexerError { line: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// Version header other than 2.x or 3.x.
    #[error("Unsupported OPENQASM version")]
    InvalidVersion,

    /// Undefined register or identifier.
    #[error("Undefined identifier at line {line}: {name}")]
    UndefinedIdentifier { line: usize, name: String },

    /// Duplicate register declaration.
    #[error("Duplicate declaration at line {line}: {name}")]
    DuplicateDeclaration { line: usize, name: String },

    /// Unknown gate name.
    #[error("Unknown gate at line {line}: {name}")]
    UnknownGate { line: usize, name: String },

    /// Wrong number of qubit arguments.
    #[error("Gate '{gate}' expects {expected} qubits, got {got} (line {line})")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
        line: usize,
    },

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got} (line {line})")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
        line: usize,
    },

    /// Register index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// Broadcast over registers of different sizes.
    #[error("Mismatched register sizes at line {line}: {left} vs {right}")]
    BroadcastMismatch {
        line: usize,
        left: usize,
        right: usize,
    },

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] alsvid_ir::IrError),

    /// Construct the dialect does not support.
    #[error("Unsupported construct at line {line}: {message}")]
    Unsupported { line: usize, message: String },

    /// Failed to read a source file.
    #[error("Failed to read '{path}': {message}")]
    Io { path: String, message: String },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
