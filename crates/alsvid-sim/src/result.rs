//! Aggregated run results.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use alsvid_ir::{BitVector, ProtoError, ProtoResult};

/// Format version for serialized results.
const FORMAT_VERSION: u32 = 1;

/// Outcome of executing a circuit for a number of shots.
///
/// `counts` aggregates sampled outcomes by bitstring. `amplitudes` carries
/// the final amplitudes of explicitly requested basis states. `fidelity` is
/// the squared norm of the final state, which stays within rounding of 1.0
/// for this exact engine; the field exists so results from approximate
/// engines share the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QcsResults {
    counts: FxHashMap<BitVector, u64>,
    classical_record: BitVector,
    amplitudes: Vec<(BitVector, Complex64)>,
    fidelity: f64,
    version: String,
}

impl QcsResults {
    /// Empty result set tagged with the engine version.
    pub fn new() -> Self {
        Self {
            counts: FxHashMap::default(),
            classical_record: BitVector::zeros(0),
            amplitudes: Vec::new(),
            fidelity: 1.0,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Record one sampled outcome.
    pub fn record_shot(&mut self, outcome: BitVector) {
        self.record_count(outcome, 1);
    }

    /// Record an outcome observed `count` times.
    pub fn record_count(&mut self, outcome: BitVector, count: u64) {
        *self.counts.entry(outcome).or_insert(0) += count;
    }

    pub(crate) fn set_classical_record(&mut self, record: BitVector) {
        self.classical_record = record;
    }

    pub(crate) fn push_amplitude(&mut self, bits: BitVector, amplitude: Complex64) {
        self.amplitudes.push((bits, amplitude));
    }

    pub(crate) fn set_fidelity(&mut self, fidelity: f64) {
        self.fidelity = fidelity;
    }

    /// Outcome counts keyed by bitstring.
    pub fn counts(&self) -> &FxHashMap<BitVector, u64> {
        &self.counts
    }

    /// Count for one outcome given as a bitstring like `"011"`.
    pub fn count_of(&self, bits: &str) -> u64 {
        bits.parse::<BitVector>()
            .ok()
            .and_then(|b| self.counts.get(&b).copied())
            .unwrap_or(0)
    }

    /// Total number of recorded shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Classical bits written by in-circuit measurements.
    pub fn classical_record(&self) -> &BitVector {
        &self.classical_record
    }

    /// Amplitudes of the requested basis states, in request order.
    pub fn amplitudes(&self) -> &[(BitVector, Complex64)] {
        &self.amplitudes
    }

    /// Estimated fidelity of the run (1.0 for exact simulation).
    pub fn fidelity(&self) -> f64 {
        self.fidelity
    }

    /// Version of the engine that produced this result.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Counts sorted by frequency (descending), ties by bitstring.
    pub fn sorted_counts(&self) -> Vec<(&BitVector, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(b, &c)| (b, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

impl Default for QcsResults {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for QcsResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "shots: {}", self.total_shots())?;
        for (bits, count) in self.sorted_counts() {
            writeln!(f, "  {bits}: {count}")?;
        }
        Ok(())
    }
}

/// On-disk wrapper so old readers can reject newer layouts.
#[derive(Serialize, Deserialize)]
struct ResultsRecord {
    version: u32,
    results: QcsResults,
}

/// Serialize results to bytes.
pub fn save_results(results: &QcsResults) -> ProtoResult<Vec<u8>> {
    let record = ResultsRecord {
        version: FORMAT_VERSION,
        results: results.clone(),
    };
    Ok(serde_json::to_vec(&record)?)
}

/// Deserialize results produced by [`save_results`].
pub fn load_results(bytes: &[u8]) -> ProtoResult<QcsResults> {
    let record: ResultsRecord = serde_json::from_slice(bytes)?;
    if record.version != FORMAT_VERSION {
        return Err(ProtoError::UnsupportedVersion {
            found: record.version,
            supported: FORMAT_VERSION,
        });
    }
    Ok(record.results)
}
