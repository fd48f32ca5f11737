//! Property tests for the gate kernels.

use alsvid_ir::{Circuit, QubitId};
use alsvid_sim::{Simulator, StateVector};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum GateChoice {
    H(u32),
    X(u32),
    Y(u32),
    Z(u32),
    S(u32),
    T(u32),
    Rx(f64, u32),
    Ry(f64, u32),
    Rz(f64, u32),
    Cx(u32, u32),
    Cz(u32, u32),
}

fn arb_gate(num_qubits: u32) -> impl Strategy<Value = GateChoice> {
    let q = 0..num_qubits;
    let angle = -10.0..10.0f64;
    prop_oneof![
        q.clone().prop_map(GateChoice::H),
        q.clone().prop_map(GateChoice::X),
        q.clone().prop_map(GateChoice::Y),
        q.clone().prop_map(GateChoice::Z),
        q.clone().prop_map(GateChoice::S),
        q.clone().prop_map(GateChoice::T),
        (angle.clone(), q.clone()).prop_map(|(a, q)| GateChoice::Rx(a, q)),
        (angle.clone(), q.clone()).prop_map(|(a, q)| GateChoice::Ry(a, q)),
        (angle, q.clone()).prop_map(|(a, q)| GateChoice::Rz(a, q)),
        (q.clone(), q.clone()).prop_map(|(a, b)| GateChoice::Cx(a, b)),
        (q.clone(), q).prop_map(|(a, b)| GateChoice::Cz(a, b)),
    ]
}

fn build_circuit(num_qubits: u32, gates: &[GateChoice]) -> Circuit {
    let mut circuit = Circuit::with_size("prop", num_qubits, 0);
    for gate in gates {
        // Two-qubit gates on identical operands are invalid; skip them.
        let result = match *gate {
            GateChoice::H(q) => circuit.h(QubitId(q)),
            GateChoice::X(q) => circuit.x(QubitId(q)),
            GateChoice::Y(q) => circuit.y(QubitId(q)),
            GateChoice::Z(q) => circuit.z(QubitId(q)),
            GateChoice::S(q) => circuit.s(QubitId(q)),
            GateChoice::T(q) => circuit.t(QubitId(q)),
            GateChoice::Rx(a, q) => circuit.rx(a, QubitId(q)),
            GateChoice::Ry(a, q) => circuit.ry(a, QubitId(q)),
            GateChoice::Rz(a, q) => circuit.rz(a, QubitId(q)),
            GateChoice::Cx(a, b) if a != b => circuit.cx(QubitId(a), QubitId(b)),
            GateChoice::Cz(a, b) if a != b => circuit.cz(QubitId(a), QubitId(b)),
            _ => continue,
        };
        result.expect("valid gate");
    }
    circuit
}

proptest! {
    #[test]
    fn random_circuits_preserve_norm(gates in prop::collection::vec(arb_gate(4), 0..40)) {
        let circuit = build_circuit(4, &gates);
        let mut sim: Simulator<f64> = Simulator::with_seed(4, 0);
        sim.simulate_circuit(&circuit).unwrap();
        let norm = sim.state_vector().norm_sqr();
        prop_assert!((norm - 1.0).abs() < 1e-9, "norm drifted to {norm}");
    }

    #[test]
    fn probabilities_sum_to_one(gates in prop::collection::vec(arb_gate(3), 0..25)) {
        let circuit = build_circuit(3, &gates);
        let mut sim: Simulator<f64> = Simulator::with_seed(3, 1);
        sim.simulate_circuit(&circuit).unwrap();
        let total: f64 = sim.state_vector().probabilities().iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn double_x_is_identity(qubit in 0..3u32, gates in prop::collection::vec(arb_gate(3), 0..10)) {
        let mut with_pair = build_circuit(3, &gates);
        with_pair.x(QubitId(qubit)).unwrap().x(QubitId(qubit)).unwrap();
        let without = build_circuit(3, &gates);

        let mut a: Simulator<f64> = Simulator::with_seed(3, 2);
        let mut b: Simulator<f64> = Simulator::with_seed(3, 2);
        a.simulate_circuit(&with_pair).unwrap();
        b.simulate_circuit(&without).unwrap();
        for (x, y) in a.state_vector().amplitudes().iter().zip(b.state_vector().amplitudes()) {
            prop_assert!((x - y).norm() < 1e-9);
        }
    }

    #[test]
    fn from_amplitudes_round_trips(index in 0..8usize) {
        let mut amps = vec![num_complex::Complex::new(0.0, 0.0); 8];
        amps[index] = num_complex::Complex::new(1.0, 0.0);
        let sv = StateVector::<f64>::from_amplitudes(amps).unwrap();
        prop_assert_eq!(sv.num_qubits(), 3);
        prop_assert!((sv.amplitude(index).unwrap().re - 1.0).abs() < 1e-12);
    }
}
