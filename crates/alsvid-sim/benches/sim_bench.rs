//! Benchmarks for gate kernels and end-to-end execution.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use alsvid_ir::{Circuit, QubitId};
use alsvid_sim::{execute, Backend, Simulator};

fn layered_circuit(num_qubits: u32, layers: usize) -> Circuit {
    let mut circuit = Circuit::with_size("bench", num_qubits, 0);
    for layer in 0..layers {
        for q in 0..num_qubits {
            circuit.h(QubitId(q)).expect("valid qubit");
            circuit
                .rz(0.1 * layer as f64, QubitId(q))
                .expect("valid qubit");
        }
        for q in 0..num_qubits - 1 {
            circuit.cx(QubitId(q), QubitId(q + 1)).expect("valid pair");
        }
    }
    circuit
}

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    for &num_qubits in &[8u32, 12, 16] {
        let circuit = layered_circuit(num_qubits, 5);
        group.bench_with_input(
            BenchmarkId::new("cpu", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    let mut sim: Simulator<f64> = Simulator::with_seed(num_qubits as usize, 0);
                    sim.simulate_circuit(circuit).expect("simulation succeeds");
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("cpu-parallel", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    let mut sim = Simulator::<f64>::with_backend(
                        num_qubits as usize,
                        Backend::CpuParallel,
                        Some(0),
                    )
                    .expect("backend available");
                    sim.simulate_circuit(circuit).expect("simulation succeeds");
                });
            },
        );
    }
    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let circuit = layered_circuit(12, 5);
    c.bench_function("sampling_10k_shots", |b| {
        b.iter(|| execute::<f64>(&circuit, 10_000, Some(0), &[]).expect("execution succeeds"));
    });
}

criterion_group!(benches, bench_simulate, bench_sampling);
criterion_main!(benches);
