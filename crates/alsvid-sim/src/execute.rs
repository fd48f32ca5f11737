//! High-level entry points: run a circuit for shots, or evolve a state
//! through a circuit with control over measurement boundaries.

use rand::rngs::StdRng;
use tracing::{debug, instrument};

use alsvid_ir::{BitVector, Circuit};

use crate::error::{SimError, SimResult};
use crate::precision::Precision;
use crate::result::QcsResults;
use crate::simulator::{make_rng, Simulator};
use crate::statevector::StateVector;

/// Run `circuit` for `shots` shots and aggregate outcome counts.
///
/// With `seed` set the run is reproducible. Each bitstring in `bitstrings`
/// must cover every qubit; the final amplitude of each requested basis state
/// is attached to the result.
#[instrument(skip(circuit, bitstrings), fields(name = circuit.name()))]
pub fn execute<T: Precision>(
    circuit: &Circuit,
    shots: u64,
    seed: Option<u64>,
    bitstrings: &[BitVector],
) -> SimResult<QcsResults> {
    for bits in bitstrings {
        if bits.len() != circuit.num_qubits() {
            return Err(SimError::BitstringLength {
                expected: circuit.num_qubits(),
                got: bits.len(),
            });
        }
    }

    let mut sim: Simulator<T> = match seed {
        Some(seed) => Simulator::with_seed(circuit.num_qubits(), seed),
        None => Simulator::new(circuit.num_qubits()),
    };
    sim.simulate_circuit(circuit)?;
    let mut results = sim.get_result(shots)?;

    let state = sim.state_vector();
    for bits in bitstrings {
        let amp = state.amplitude_of(bits)?;
        results.push_amplitude(
            bits.clone(),
            num_complex::Complex64::new(amp.re.to_f64(), amp.im.to_f64()),
        );
    }
    debug!(shots, outcomes = results.counts().len(), "execution done");
    Ok(results)
}

/// Evolve a fresh |0...0⟩ state through `circuit` and return it.
///
/// With `stop_before_measure` the evolution halts at the first measurement
/// instruction and leaves the cursor there; [`evolve_next`] picks up from
/// that point. Gates draw no randomness, so re-seeding between the two calls
/// does not change what the unitary prefix computes.
pub fn evolve<T: Precision>(
    circuit: &Circuit,
    seed: Option<u64>,
    stop_before_measure: bool,
) -> SimResult<StateVector<T>> {
    let mut state = StateVector::new(circuit.num_qubits());
    evolve_from(&mut state, circuit, make_rng(seed), stop_before_measure)?;
    Ok(state)
}

/// Continue evolving `state` through `circuit` from its current cursor.
pub fn evolve_next<T: Precision>(
    state: &mut StateVector<T>,
    circuit: &Circuit,
    seed: Option<u64>,
    stop_before_measure: bool,
) -> SimResult<()> {
    evolve_from(state, circuit, make_rng(seed), stop_before_measure)
}

fn evolve_from<T: Precision>(
    state: &mut StateVector<T>,
    circuit: &Circuit,
    mut rng: StdRng,
    stop_before_measure: bool,
) -> SimResult<()> {
    let expected = 1usize << circuit.num_qubits();
    if state.size() != expected {
        return Err(SimError::SizeMismatch {
            expected,
            got: state.size(),
        });
    }

    let start = state.position();
    debug!(start, instructions = circuit.len(), "evolving state");
    for (index, inst) in circuit.instructions().iter().enumerate().skip(start) {
        if stop_before_measure && inst.is_measure() {
            state.set_position(index);
            return Ok(());
        }
        state
            .apply(inst, &mut rng)
            .map_err(|e| e.at_instruction(index, inst.name()))?;
        state.set_position(index + 1);
    }
    Ok(())
}
