//! Benchmarks the Keccak-256 gadget's constraint synthesis and
//! `MockProver` satisfiability check across a few input sizes.
//!
//! The teacher benchmarks a full `keygen`/`create_proof` pipeline over a
//! sweep of production configs; this crate only builds mock-mode circuits
//! (the keygen/SRS/proving pipeline is an external collaborator's concern
//! per spec §6), so the benchmark measures what this crate actually owns:
//! how long it takes to assign the gadget's witnesses and have
//! `MockProver` check them.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use halo2_base::{
    gates::builder::FlexGateConfigParams,
    halo2_proofs::{dev::MockProver, halo2curves::bn256::Fr},
};
use itertools::Itertools;
use neox_header_circuit::keccak::{set_keccak_test_env, Keccak256Circuit, KeccakGateConfig};

const DEGREE_BITS: u32 = 14;

fn gate_config() -> KeccakGateConfig {
    KeccakGateConfig {
        flex_gate_config_params: FlexGateConfigParams {
            k: DEGREE_BITS as usize,
            num_advice_per_phase: vec![20],
            num_lookup_advice_per_phase: vec![2],
            num_fixed: 1,
        },
        rows_per_round: 25,
        lookup_bits: 8,
    }
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("keccak_mock_prove");
    group.sample_size(10);

    let gate_config = gate_config();
    set_keccak_test_env(&gate_config, DEGREE_BITS);

    for max_len in [64usize, 256, 1024] {
        let message = vec![0x5au8; max_len / 2];
        let mut padded = message.clone();
        padded.resize(max_len, 0);
        let expected = ethers_core::utils::keccak256(&message);
        let instance: Vec<Fr> = expected.iter().map(|b| Fr::from(*b as u64)).collect_vec();

        group.bench_with_input(
            BenchmarkId::new("max_len", max_len),
            &max_len,
            |bencher, _| {
                bencher.iter(|| {
                    let circuit =
                        Keccak256Circuit::<Fr>::mock(&gate_config, &padded, message.len());
                    black_box(
                        MockProver::run(DEGREE_BITS, &circuit, vec![instance.clone()])
                            .expect("mock proving should not error"),
                    );
                })
            },
        );
    }
    group.finish()
}

criterion_group!(benches, bench);
criterion_main!(benches);
