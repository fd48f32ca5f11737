//! Circuit simulator.
//!
//! A [`Simulator`] owns one statevector and one seeded RNG. It evolves the
//! state through a circuit exactly once; sampling afterwards draws shots
//! from the final distribution without re-running the circuit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use alsvid_ir::{BitVector, Circuit};

use crate::backend::Backend;
use crate::error::{SimError, SimResult};
use crate::precision::Precision;
use crate::result::QcsResults;
use crate::statevector::StateVector;

/// Statevector simulator for one circuit run.
#[derive(Debug)]
pub struct Simulator<T: Precision> {
    state: StateVector<T>,
    rng: StdRng,
    num_clbits: usize,
    simulated: bool,
}

impl<T: Precision> Simulator<T> {
    /// Create a simulator over |0...0⟩ with a random seed.
    pub fn new(num_qubits: usize) -> Self {
        Self::from_state(StateVector::new(num_qubits), StdRng::from_entropy())
    }

    /// Create a simulator with a fixed seed. Same seed, same circuit, same
    /// outcomes.
    pub fn with_seed(num_qubits: usize, seed: u64) -> Self {
        Self::from_state(StateVector::new(num_qubits), StdRng::seed_from_u64(seed))
    }

    /// Create a simulator on a specific backend.
    pub fn with_backend(num_qubits: usize, backend: Backend, seed: Option<u64>) -> SimResult<Self> {
        let state = StateVector::with_backend(num_qubits, backend)?;
        Ok(Self::from_state(state, make_rng(seed)))
    }

    /// Resume from an existing state instead of |0...0⟩.
    pub fn with_state(state: StateVector<T>, seed: Option<u64>) -> Self {
        Self::from_state(state, make_rng(seed))
    }

    fn from_state(state: StateVector<T>, rng: StdRng) -> Self {
        Self {
            state,
            rng,
            num_clbits: 0,
            simulated: false,
        }
    }

    /// Evolve the state through `circuit`, stopping before its trailing
    /// measurements.
    ///
    /// Trailing measurements are not applied; [`Self::sampling`] draws shot
    /// outcomes from the pre-measurement distribution instead, so one
    /// evolution serves any number of shots. A measurement followed by more
    /// gates is applied in place and collapses the state (one trajectory).
    ///
    /// Each simulator instance runs one circuit; a second call returns
    /// [`SimError::AlreadySimulated`].
    #[instrument(skip(self, circuit), fields(name = circuit.name()))]
    pub fn simulate_circuit(&mut self, circuit: &Circuit) -> SimResult<()> {
        if self.simulated {
            return Err(SimError::AlreadySimulated);
        }
        let expected = 1usize << circuit.num_qubits();
        if self.state.size() != expected {
            return Err(SimError::SizeMismatch {
                expected,
                got: self.state.size(),
            });
        }

        let boundary = trailing_measure_boundary(circuit);
        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.len(),
            boundary,
            "starting simulation"
        );
        for (index, inst) in circuit.instructions().iter().enumerate().take(boundary) {
            self.state
                .apply(inst, &mut self.rng)
                .map_err(|e| e.at_instruction(index, inst.name()))?;
            self.state.set_position(index + 1);
        }
        self.state.set_position(boundary);
        self.num_clbits = circuit.num_clbits();
        self.simulated = true;
        debug!("simulation complete");
        Ok(())
    }

    /// Draw `shots` basis-state samples from the simulated distribution and
    /// aggregate them into counts.
    ///
    /// Fails with [`SimError::NotReady`] before a circuit was simulated.
    /// The cumulative distribution is built once; each shot is a binary
    /// search, so sampling never re-runs the circuit.
    pub fn sampling(&mut self, shots: u64) -> SimResult<FxHashMap<BitVector, u64>> {
        if !self.simulated {
            return Err(SimError::NotReady);
        }
        let cumulative = self.cumulative_distribution();
        let num_qubits = self.state.num_qubits();
        let last = cumulative.len() - 1;

        let mut counts: FxHashMap<BitVector, u64> = FxHashMap::default();
        for _ in 0..shots {
            let r = T::lit(self.rng.r#gen::<f64>());
            let idx = cumulative.partition_point(|&c| c <= r).min(last);
            *counts
                .entry(BitVector::from_index(idx, num_qubits))
                .or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn cumulative_distribution(&self) -> Vec<T> {
        let mut acc = T::zero();
        self.state
            .amplitudes()
            .iter()
            .map(|a| {
                acc += a.norm_sqr();
                acc
            })
            .collect()
    }

    /// Sample `shots` outcomes and aggregate them into a result.
    ///
    /// Fails with [`SimError::NotReady`] before a circuit was simulated.
    pub fn get_result(&mut self, shots: u64) -> SimResult<QcsResults> {
        let counts = self.sampling(shots)?;
        debug!(shots, outcomes = counts.len(), "sampled outcomes");

        let mut results = QcsResults::new();
        for (outcome, count) in counts {
            results.record_count(outcome, count);
        }
        results.set_classical_record(self.state.classical_record(self.num_clbits));
        results.set_fidelity(self.state.norm_sqr().to_f64());
        Ok(results)
    }

    /// The current statevector.
    pub fn state_vector(&self) -> &StateVector<T> {
        &self.state
    }

    /// Consume the simulator and take the statevector.
    pub fn into_state_vector(self) -> StateVector<T> {
        self.state
    }
}

/// Index where the trailing suffix of measurements and barriers begins.
fn trailing_measure_boundary(circuit: &Circuit) -> usize {
    let instructions = circuit.instructions();
    let mut boundary = instructions.len();
    while boundary > 0 {
        let inst = &instructions[boundary - 1];
        if inst.is_measure() || inst.is_barrier() {
            boundary -= 1;
        } else {
            break;
        }
    }
    boundary
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
