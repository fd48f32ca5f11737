//! Alsvid Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing quantum
//! circuits in Alsvid: qubit/bit addressing, classical bit strings, the
//! standard gate set, and the validated instruction sequence the simulator
//! consumes.
//!
//! # Overview
//!
//! A [`Circuit`] is an ordered list of [`Instruction`]s over declared
//! qubit and classical-bit registers. Validation is eager: every push checks
//! operand bounds, duplicate operands, gate arity, and unitary matrix shape,
//! so the simulation engine never re-validates.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use alsvid_ir::{Circuit, QubitId, ClbitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//!
//! // |00⟩ → (|00⟩ + |11⟩)/√2
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//! circuit.measure(QubitId(1), ClbitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.len(), 4);
//! ```
//!
//! # Example: Record Round-Trip
//!
//! ```rust
//! use alsvid_ir::{Circuit, proto};
//!
//! let circuit = Circuit::bell().unwrap();
//! let bytes = proto::save_circuit(&circuit).unwrap();
//! let loaded = proto::load_circuit(&bytes).unwrap();
//! assert_eq!(loaded.instructions(), circuit.instructions());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `H` | 1 | Hadamard gate |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `S`, `Sdg`, `T`, `Tdg`, `SX`, `SXdg` | 1 | Clifford+T gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation/phase gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CY`, `CZ`, `CH` | 2 | Controlled gates |
//! | `Swap`, `ISwap` | 2 | Swap gates |
//! | `CRx`, `CRy`, `CRz`, `CP` | 2 | Controlled rotations |
//! | `RXX`, `RYY`, `RZZ` | 2 | Two-qubit rotations |
//! | `CCX`, `CSwap` | 3 | Toffoli / Fredkin |
//!
//! General k-qubit unitaries are expressed as explicit matrices via
//! [`Instruction::unitary`].

pub mod bitvec;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod proto;
pub mod qubit;

pub use bitvec::BitVector;
pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use proto::{ProtoError, ProtoResult};
pub use qubit::{ClbitId, QubitId};
