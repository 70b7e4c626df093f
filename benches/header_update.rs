//! Benchmarks the header-update predicate's (C8) witness assignment --
//! encoding both headers, decompressing the BLS public key, recomputing
//! `hash_to_g2`, and emitting every assertion of spec §4.8 -- under a
//! fixed circuit configuration.
//!
//! As with `benches/keccak.rs`, this measures constraint synthesis rather
//! than a full proof: the crate only builds mock-mode circuits, leaving
//! the keygen/SRS/proving pipeline to an external collaborator.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use halo2_base::gates::builder::FlexGateConfigParams;
use neox_header_circuit::{
    keccak::KeccakGateConfig,
    update::circuit::{set_header_update_test_env, HeaderUpdateCircuit},
    witness::{encode_header_native, hash_to_curve_native::hash_to_g2_native, NativeHeader, NativeUpdateInput},
    CircuitWithLimbsConfig,
};

const DEGREE_BITS: u32 = 18;

fn sample_header(number: u64, parent_hash: [u8; 32]) -> NativeHeader {
    NativeHeader {
        parent_hash: parent_hash.to_vec(),
        uncle_hash: vec![0u8; 32],
        coinbase: vec![0u8; 20],
        root: vec![0u8; 32],
        tx_hash: vec![0u8; 32],
        receipt_hash: vec![0u8; 32],
        bloom: vec![0u8; 256],
        difficulty: vec![],
        number: number.to_be_bytes().to_vec(),
        gas_limit: 0u64.to_be_bytes().to_vec(),
        gas_used: 0u64.to_be_bytes().to_vec(),
        time: 1000u64.to_be_bytes().to_vec(),
        extra: {
            let mut extra = vec![0x01u8, 0x01];
            extra.extend_from_slice(&[0u8; 32]);
            extra.extend_from_slice(&[0u8; 48]);
            extra
        },
        mix_digest: vec![0u8; 32],
        nonce: vec![0u8; 8],
        base_fee: vec![],
        withdrawals_hash: vec![0u8; 32],
    }
}

/// Compressed encoding of the BLS12-381 G1 generator, used as a stand-in
/// public key -- the benchmark only measures witness assignment cost, not
/// whether the embedded pairing check is satisfied.
fn sample_g1_generator_compressed() -> Vec<u8> {
    hex::decode(
        "97f1d3a73197d7942695638c4fa9ac0fc3688c4f9774b905a14e3a3f171bac586c55e83ff97a1aeffb3af00adb22c6e",
    )
    .expect("valid hex")
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("header_update_witness_assignment");
    group.sample_size(10);

    let parent = sample_header(100, [0x11u8; 32]);
    let mut current = sample_header(101, [0u8; 32]);
    current.parent_hash =
        ethers_core::utils::keccak256(encode_header_native(&parent, false).unwrap()).to_vec();
    let seal_rlp = encode_header_native(&current, true).unwrap();
    let (hash_native, _hints) = hash_to_g2_native(&seal_rlp);

    let native = NativeUpdateInput {
        parent,
        current,
        public_key_compressed: sample_g1_generator_compressed(),
        signature: hash_native,
    };

    let gate_config = KeccakGateConfig {
        flex_gate_config_params: FlexGateConfigParams {
            k: DEGREE_BITS as usize,
            num_advice_per_phase: vec![60],
            num_lookup_advice_per_phase: vec![6],
            num_fixed: 2,
        },
        rows_per_round: 25,
        lookup_bits: 17,
    };
    let circuit_config = CircuitWithLimbsConfig::from_degree_bits(DEGREE_BITS);
    set_header_update_test_env(&gate_config, &circuit_config);

    group.bench_function("assign_and_check", |bencher| {
        bencher.iter(|| {
            black_box(
                HeaderUpdateCircuit::<halo2_base::halo2_proofs::halo2curves::bn256::Fr>::mock(
                    &gate_config,
                    &circuit_config,
                    &native,
                )
                .expect("well-shaped witness assigns without error"),
            );
        })
    });
    group.finish()
}

criterion_group!(benches, bench);
criterion_main!(benches);
