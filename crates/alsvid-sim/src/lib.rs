//! Alsvid dense statevector simulator.
//!
//! Simulates quantum circuits by holding all 2^n complex amplitudes in
//! memory and streaming gates over them. Exact up to floating point, which
//! bounds it at roughly 25-30 qubits on a workstation.
//!
//! The engine is generic over amplitude precision ([`Precision`], `f32` or
//! `f64`) and kernel backend ([`Backend`], serial or rayon-parallel).
//!
//! # Running a circuit
//!
//! ```
//! use alsvid_ir::Circuit;
//! use alsvid_sim::execute;
//!
//! let circuit = Circuit::bell()?;
//! let results = execute::<f64>(&circuit, 1000, Some(42), &[])?;
//! assert_eq!(results.total_shots(), 1000);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Stepping through measurements
//!
//! [`evolve`] runs a circuit from |0...0⟩ and returns the [`StateVector`];
//! with `stop_before_measure` it halts at the first measurement so the
//! pre-measurement amplitudes can be inspected, and [`evolve_next`] resumes
//! a caller-owned state from its stored cursor.

pub mod backend;
pub mod error;
pub mod execute;
mod gates;
pub mod precision;
pub mod result;
pub mod simulator;
pub mod statevector;

pub use backend::Backend;
pub use error::{SimError, SimResult};
pub use execute::{evolve, evolve_next, execute};
pub use precision::Precision;
pub use result::{load_results, save_results, QcsResults};
pub use simulator::Simulator;
pub use statevector::StateVector;
