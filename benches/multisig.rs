//! Benchmarks the standalone ECDSA multisig predicate's (C6) witness
//! assignment: script parsing, public-key binding and the five emulated
//! secp256k1 ECDSA verifications, under a fixed circuit configuration.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neox_header_circuit::{
    ecdsa_multisig::{
        circuit::{set_multisig_test_env, MultisigCircuit},
        MIN_INVOCATION_SCRIPT_LEN, MIN_VERIFICATION_SCRIPT_LEN, NUM_KEYS, NUM_SIGS,
        PUBLIC_KEY_LEN, PUSH5, PUSH7, PUSHDATA1, SIGNATURE_LEN, SYSCALL,
    },
    keccak::KeccakGateConfig,
    witness::NativeMultisigInput,
    CircuitWithLimbsConfig,
};

const DEGREE_BITS: u32 = 18;

fn sample_input() -> NativeMultisigInput {
    let generator_compressed = hex::decode(
        "0379be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
    )
    .expect("valid hex");
    let interop_id = [0xaau8, 0xbb, 0xcc, 0xdd];

    let mut verification_script = vec![PUSH5 as u8];
    for _ in 0..NUM_KEYS {
        verification_script.push(PUSHDATA1 as u8);
        verification_script.push(PUBLIC_KEY_LEN as u8);
        verification_script.extend_from_slice(&generator_compressed);
    }
    verification_script.push(PUSH7 as u8);
    verification_script.push(SYSCALL as u8);
    verification_script.extend_from_slice(&interop_id);
    assert_eq!(verification_script.len(), MIN_VERIFICATION_SCRIPT_LEN);

    let mut invocation_script = Vec::new();
    let mut sigs = Vec::new();
    let mut data = Vec::new();
    for i in 0..NUM_SIGS {
        let mut r = vec![0u8; 32];
        r[31] = (i + 1) as u8;
        let mut s = vec![0u8; 32];
        s[31] = (i + 10) as u8;
        invocation_script.push(PUSHDATA1 as u8);
        invocation_script.push(SIGNATURE_LEN as u8);
        invocation_script.extend_from_slice(&r);
        invocation_script.extend_from_slice(&s);
        sigs.push((r, s));
        let mut h = vec![0u8; 32];
        h[31] = (i + 20) as u8;
        data.push(h);
    }
    assert_eq!(invocation_script.len(), MIN_INVOCATION_SCRIPT_LEN);

    NativeMultisigInput {
        verification_script,
        invocation_script,
        pub_keys_compressed: vec![generator_compressed; NUM_KEYS],
        sigs,
        data,
        mapping_rules: vec![0, 1, 2, 3, 4],
        interop_id,
    }
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("multisig_witness_assignment");
    group.sample_size(10);

    let native = sample_input();
    let gate_config = KeccakGateConfig {
        flex_gate_config_params: halo2_base::gates::builder::FlexGateConfigParams {
            k: DEGREE_BITS as usize,
            num_advice_per_phase: vec![60],
            num_lookup_advice_per_phase: vec![6],
            num_fixed: 2,
        },
        rows_per_round: 25,
        lookup_bits: 17,
    };
    let circuit_config = CircuitWithLimbsConfig::from_degree_bits(DEGREE_BITS);
    set_multisig_test_env(&gate_config, &circuit_config);

    group.bench_function("assign_and_check", |bencher| {
        bencher.iter(|| {
            black_box(
                MultisigCircuit::<halo2_base::halo2_proofs::halo2curves::bn256::Fr>::mock(
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
