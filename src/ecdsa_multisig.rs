//! Secp256k1 5-of-7 ECDSA multisig script verifier (C6).
//!
//! Checks a pair of NEO-style scripts against a set of off-script
//! witness points: a `verificationScript` carrying seven compressed
//! public keys behind a `PUSH5 ... SYSCALL` header, and an
//! `invocationScript` carrying five 64-byte signatures. The seven
//! public keys are *bound* to the emulated-curve witnesses bit-by-bit;
//! the five signatures are checked structurally only, the actual
//! cryptographic assurance coming from the standalone ECDSA relation.
//!
//! This is a standalone circuit (see the header-update predicate's
//! state machine in the design notes): it is never composed with the
//! BLS path of C8, only audited independently for the sibling UTXO
//! chain.
//!
//! Grounded on `examples/original_source/n3/circuit/multisig_verify.go`,
//! generalised onto emulated secp256k1 arithmetic the way the teacher
//! wraps BN254 pairing arithmetic in `batch_verify/common/chip.rs`.

use halo2_base::{
    gates::{GateChip, GateInstructions},
    halo2_proofs::halo2curves::secp256k1::{Fp as SecpFp, Fq as SecpFq, Secp256k1Affine},
    utils::ScalarField,
    AssignedValue, Context,
};
use halo2_ecc::{
    bigint::ProperCrtUint,
    ecc::{check_is_on_curve, ecdsa::ecdsa_verify_no_pubkey_check, EcPoint},
    fields::FieldChip,
    secp256k1::FpChip,
};

/// `PUSHDATA1` NeoVM opcode.
pub const PUSHDATA1: u64 = 0x0c;
/// `PUSH5` NeoVM opcode.
pub const PUSH5: u64 = 0x55;
/// `PUSH7` NeoVM opcode.
pub const PUSH7: u64 = 0x57;
/// `SYSCALL` NeoVM opcode.
pub const SYSCALL: u64 = 0x41;

/// Length in bytes of a compressed secp256k1 public key.
pub const PUBLIC_KEY_LEN: usize = 33;
/// Length in bytes of a public key push (`PUSHDATA1 + len + key`).
pub const PUBLIC_KEY_DATA_LEN: usize = PUBLIC_KEY_LEN + 2;
/// Length in bytes of a raw `(r, s)` ECDSA signature.
pub const SIGNATURE_LEN: usize = 64;
/// Length in bytes of a signature push (`PUSHDATA1 + len + sig`).
pub const SIGNATURE_DATA_LEN: usize = SIGNATURE_LEN + 2;

/// Number of public keys in the verification script (7-of-5 multisig).
pub const NUM_KEYS: usize = 7;
/// Number of signatures in the invocation script.
pub const NUM_SIGS: usize = 5;
/// Bits needed for a mapping rule to select one of [`NUM_KEYS`] keys.
pub const MAPPING_RULE_BITS: usize = 3;

/// Minimum physical length of the verification script.
pub const MIN_VERIFICATION_SCRIPT_LEN: usize =
    NUM_KEYS * PUBLIC_KEY_DATA_LEN + 7;
/// Minimum physical length of the invocation script.
pub const MIN_INVOCATION_SCRIPT_LEN: usize = NUM_SIGS * SIGNATURE_DATA_LEN;

/// Same window size the teacher uses for its own fixed-base/variable-base
/// scalar multiplication (`batch_verify::common::chip::WINDOW_BITS`).
const ECDSA_WINDOW_BITS: usize = 4;

/// An assigned, reduced secp256k1 public key: on-curve and in canonical
/// CRT form, so its bit decomposition is unique.
pub type AssignedPubKey<F> = EcPoint<F, ProperCrtUint<F>>;

/// An assigned `(r, s)` ECDSA signature over secp256k1's scalar field.
pub type AssignedSignature<F> = (ProperCrtUint<F>, ProperCrtUint<F>);

/// Inputs to [`Secp256k1MultisigChip::verify`].
pub struct MultisigWitness<F: ScalarField> {
    /// Fixed-length byte-wire vector, physical length ≥
    /// [`MIN_VERIFICATION_SCRIPT_LEN`].
    pub verification_script: Vec<AssignedValue<F>>,
    /// Fixed-length byte-wire vector, physical length ≥
    /// [`MIN_INVOCATION_SCRIPT_LEN`].
    pub invocation_script: Vec<AssignedValue<F>>,
    /// The seven public keys claimed by the verification script.
    pub pub_keys: Vec<AssignedPubKey<F>>,
    /// The five signatures claimed by the invocation script.
    pub sigs: Vec<AssignedSignature<F>>,
    /// The five message hashes the signatures were produced over.
    pub data: Vec<ProperCrtUint<F>>,
    /// For each signature, a [`MAPPING_RULE_BITS`]-bit big-endian index
    /// into `pub_keys`.
    pub mapping_rules: Vec<[AssignedValue<F>; MAPPING_RULE_BITS]>,
    /// Little-endian interop id of `System.Crypto.CheckMultisig`, as
    /// computed off-circuit by the native caller (external collaborator
    /// concern -- the hash-to-id registry is not part of the core).
    pub interop_id: [AssignedValue<F>; 4],
}

/// Verifier over the emulated secp256k1 field.
pub struct Secp256k1MultisigChip<'a, F: ScalarField> {
    fp_chip: &'a FpChip<'a, F>,
}

impl<'a, F: ScalarField> Secp256k1MultisigChip<'a, F> {
    pub fn new(fp_chip: &'a FpChip<'a, F>) -> Self {
        Self { fp_chip }
    }

    pub fn fp_chip(&self) -> &FpChip<'a, F> {
        self.fp_chip
    }

    /// Runs the five-step protocol of §4.6: script-length, verification-
    /// script structure, public-key binding, invocation-script structure,
    /// and per-signature ECDSA verification.
    pub fn verify(&self, ctx: &mut Context<F>, witness: &MultisigWitness<F>) {
        assert!(witness.pub_keys.len() == NUM_KEYS);
        assert!(witness.sigs.len() == NUM_SIGS);
        assert!(witness.data.len() == NUM_SIGS);
        assert!(witness.mapping_rules.len() == NUM_SIGS);
        assert!(witness.verification_script.len() >= MIN_VERIFICATION_SCRIPT_LEN);
        assert!(witness.invocation_script.len() >= MIN_INVOCATION_SCRIPT_LEN);

        let gate = self.fp_chip.gate();
        self.check_verification_script_structure(
            ctx,
            gate,
            &witness.verification_script,
            &witness.interop_id,
        );
        self.check_invocation_script_structure(ctx, gate, &witness.invocation_script);
        self.bind_public_keys(ctx, gate, &witness.verification_script, &witness.pub_keys);
        self.check_signatures(
            ctx,
            gate,
            &witness.pub_keys,
            &witness.sigs,
            &witness.data,
            &witness.mapping_rules,
        );
    }

    /// §4.6 step 2: `vs[0] == PUSH5`; each of the 7 key slots opens with
    /// `PUSHDATA1, 33`; the trailer is `PUSH7, SYSCALL, LE32(interop id)`.
    fn check_verification_script_structure(
        &self,
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        vs: &[AssignedValue<F>],
        interop_id: &[AssignedValue<F>; 4],
    ) {
        gate.assert_is_const(ctx, &vs[0], &F::from(PUSH5));
        for i in 0..NUM_KEYS {
            let base = i * PUBLIC_KEY_DATA_LEN;
            gate.assert_is_const(ctx, &vs[base + 1], &F::from(PUSHDATA1));
            gate.assert_is_const(ctx, &vs[base + 2], &F::from(PUBLIC_KEY_LEN as u64));
        }
        let trailer = NUM_KEYS * PUBLIC_KEY_DATA_LEN;
        gate.assert_is_const(ctx, &vs[trailer + 1], &F::from(PUSH7));
        gate.assert_is_const(ctx, &vs[trailer + 2], &F::from(SYSCALL));
        for (i, expected) in interop_id.iter().enumerate() {
            ctx.constrain_equal(&vs[trailer + 3 + i], expected);
        }
    }

    /// §4.6 step 4: each of the 5 signature slots opens with
    /// `PUSHDATA1, 64`. The signature bytes themselves are not bound to
    /// `sigs[i]` -- the script is an auditability artifact, the actual
    /// cryptographic assurance comes from the ECDSA relation in step 5.
    fn check_invocation_script_structure(
        &self,
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        is: &[AssignedValue<F>],
    ) {
        for i in 0..NUM_SIGS {
            let base = i * SIGNATURE_DATA_LEN;
            gate.assert_is_const(ctx, &is[base], &F::from(PUSHDATA1));
            gate.assert_is_const(ctx, &is[base + 1], &F::from(SIGNATURE_LEN as u64));
        }
    }

    /// §4.6 step 3: binds the emulated point `pub_keys[i]` to the
    /// compressed bytes embedded at `vs[i*35+3 .. i*35+36]`.
    ///
    /// The 32 key bytes following the compression byte are big-endian in
    /// the script; the emulated field's bit decomposition is little-
    /// endian. Reversing the 32-byte order (not the bits) before
    /// decomposing aligns the two -- the fix to the known source loop
    /// bug is folded in here by iterating over the full 32 bytes rather
    /// than stopping early.
    fn bind_public_keys(
        &self,
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        vs: &[AssignedValue<F>],
        pub_keys: &[AssignedPubKey<F>],
    ) {
        for (i, pub_key) in pub_keys.iter().enumerate() {
            check_is_on_curve::<_, _, Secp256k1Affine>(self.fp_chip, ctx, pub_key);

            let base = i * PUBLIC_KEY_DATA_LEN + 3;
            let compression_byte = vs[base];
            let key_bytes_be = &vs[base + 1..base + 1 + PUBLIC_KEY_LEN - 1];

            let x_bits = crt_uint_to_bits(ctx, gate, pub_key.x());
            let y_bits = crt_uint_to_bits(ctx, gate, pub_key.y());

            let reversed_bits: Vec<AssignedValue<F>> = key_bytes_be
                .iter()
                .rev()
                .flat_map(|byte| gate.num_to_bits(ctx, *byte, 8))
                .collect();
            // `x_bits` carries a full limb decomposition (`num_limbs *
            // limb_bits`), which is wider than the 256-bit coordinate once
            // the limb geometry doesn't divide 256 evenly; only the low
            // bits are compared, the same `limb_bits_le.len() >=
            // x_bits_le.len()` zip `bls::bind_g1_pubkey_compressed` uses,
            // plus an explicit zero check on the unused high bits since a
            // proper secp256k1 coordinate never sets them.
            assert!(x_bits.len() >= reversed_bits.len());
            for (a, b) in x_bits.iter().zip(reversed_bits.iter()) {
                ctx.constrain_equal(a, b);
            }
            for high_bit in &x_bits[reversed_bits.len()..] {
                gate.assert_is_const(ctx, high_bit, &F::zero());
            }

            let y_parity = y_bits[0];
            let two = ctx.load_constant(F::from(2));
            let expected_compression_byte = gate.add(ctx, two, y_parity);
            ctx.constrain_equal(&compression_byte, &expected_compression_byte);
        }
    }

    /// §4.6 step 5: selects `pub_keys[mapping_rules[i]]` via a one-hot
    /// indicator and checks the ECDSA relation against `(sigs[i],
    /// data[i])`.
    fn check_signatures(
        &self,
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        pub_keys: &[AssignedPubKey<F>],
        sigs: &[AssignedSignature<F>],
        data: &[ProperCrtUint<F>],
        mapping_rules: &[[AssignedValue<F>; MAPPING_RULE_BITS]],
    ) {
        for i in 0..NUM_SIGS {
            let indicator = mapping_rule_indicator(ctx, gate, &mapping_rules[i], NUM_KEYS);
            let selected = select_pub_key(self.fp_chip, ctx, pub_keys, &indicator);

            let (r, s) = &sigs[i];
            let is_valid = ecdsa_verify_no_pubkey_check::<F, SecpFp, SecpFq>(
                self.fp_chip,
                ctx,
                selected,
                r.clone(),
                s.clone(),
                data[i].clone(),
                ECDSA_WINDOW_BITS,
                ECDSA_WINDOW_BITS,
            );
            gate.assert_is_const(ctx, &is_valid, &F::one());
        }
    }
}

/// Decomposes a non-native field element's CRT limbs into a little-
/// endian bit vector, limb-by-limb.
fn crt_uint_to_bits<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    value: &ProperCrtUint<F>,
) -> Vec<AssignedValue<F>> {
    value
        .limbs()
        .iter()
        .flat_map(|limb| gate.num_to_bits(ctx, *limb, F::NUM_BITS.min(88) as usize))
        .collect()
}

/// Converts a [`MAPPING_RULE_BITS`]-bit big-endian index into a one-hot
/// indicator vector of length `n`, via [`crate::utils::bitmask::ith_bit_bitmask`].
fn mapping_rule_indicator<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    bits: &[AssignedValue<F>; MAPPING_RULE_BITS],
    n: usize,
) -> Vec<AssignedValue<F>> {
    let mut index = ctx.load_zero();
    for bit in bits.iter() {
        let doubled = gate.add(ctx, index, index);
        index = gate.add(ctx, doubled, *bit);
    }
    crate::utils::bitmask::ith_bit_bitmask(ctx, gate, index, n as u64)
}

/// Selects one of `points` via a one-hot `indicator`, field-element by
/// field-element, using [`FieldChip::select`] the way
/// `batch_verify::common::chip` composes pairwise selects for its own
/// point arithmetic.
fn select_pub_key<F: ScalarField>(
    fp_chip: &FpChip<F>,
    ctx: &mut Context<F>,
    points: &[AssignedPubKey<F>],
    indicator: &[AssignedValue<F>],
) -> AssignedPubKey<F> {
    assert_eq!(points.len(), indicator.len());
    let mut acc = points[0].clone();
    for (point, &sel) in points.iter().zip(indicator.iter()).skip(1) {
        let x = fp_chip.select(ctx, point.x(), acc.x(), sel);
        let y = fp_chip.select(ctx, point.y(), acc.y(), sel);
        acc = EcPoint::new(x, y);
    }
    acc
}

/// Mock-only top-level circuit wrapping the standalone multisig predicate
/// (C6) for `MockProver` testing and benchmarking, the same role
/// [`crate::update::circuit::HeaderUpdateCircuit`] plays for C8. No public
/// instances are exposed; spec §6 leaves the proving pipeline that would
/// pick a public/private split to an external collaborator.
pub mod circuit {
    use super::{Secp256k1MultisigChip, NUM_KEYS, NUM_SIGS};
    use crate::{
        keccak::chip::assign_prover,
        witness::{self, NativeMultisigInput},
        CircuitWithLimbsConfig, EccPrimeField, HeaderCircuitError,
    };
    use core::cell::RefCell;
    use halo2_base::{
        gates::{
            builder::{GateThreadBuilder, MultiPhaseThreadBreakPoints},
            range::{RangeChip, RangeConfig, RangeStrategy},
        },
        halo2_proofs::{
            circuit::{Layouter, SimpleFloorPlanner},
            plonk::{Circuit, ConstraintSystem, Error},
        },
        SKIP_FIRST_PASS,
    };
    use halo2_ecc::secp256k1::FpChip;

    const MULTISIG_GATE_CONFIG_VAR: &str = "MULTISIG_TEST_GATE_CONFIG";
    const MULTISIG_CIRCUIT_CONFIG_VAR: &str = "MULTISIG_TEST_CIRCUIT_CONFIG";

    /// Makes `gate_config`/`circuit_config` visible to the next
    /// `Circuit::configure` call for [`MultisigCircuit`]. Must be called
    /// before key generation or before `MockProver::run`.
    pub fn set_multisig_test_env(
        gate_config: &crate::keccak::KeccakGateConfig,
        circuit_config: &CircuitWithLimbsConfig,
    ) {
        std::env::set_var(
            MULTISIG_GATE_CONFIG_VAR,
            serde_json::to_string(gate_config).expect("gate config is serializable"),
        );
        std::env::set_var(
            MULTISIG_CIRCUIT_CONFIG_VAR,
            serde_json::to_string(circuit_config).expect("circuit config is serializable"),
        );
    }

    #[derive(Clone)]
    pub struct MultisigCircuitConfig<F: EccPrimeField> {
        pub range: RangeConfig<F>,
    }

    impl<F: EccPrimeField> MultisigCircuitConfig<F> {
        pub fn configure(
            meta: &mut ConstraintSystem<F>,
            degree_bits: u32,
            gate_config: &crate::keccak::KeccakGateConfig,
        ) -> Self {
            let mut range = RangeConfig::configure(
                meta,
                RangeStrategy::Vertical,
                &gate_config.flex_gate_config_params.num_advice_per_phase,
                &gate_config.flex_gate_config_params.num_lookup_advice_per_phase,
                gate_config.flex_gate_config_params.num_fixed,
                gate_config.lookup_bits,
                degree_bits,
            );
            range.gate.max_rows = (1 << degree_bits) - meta.minimum_rows();
            Self { range }
        }
    }

    /// Proves a single verification/invocation script pair end to end:
    /// assigns the scripts, public keys, signatures and mapping rules via
    /// [`crate::witness`], then runs [`Secp256k1MultisigChip::verify`].
    pub struct MultisigCircuit<F: EccPrimeField> {
        builder: RefCell<GateThreadBuilder<F>>,
        break_points: RefCell<MultiPhaseThreadBreakPoints>,
    }

    impl<F: EccPrimeField> MultisigCircuit<F> {
        pub fn mock(
            circuit_config: &CircuitWithLimbsConfig,
            native: &NativeMultisigInput,
        ) -> Result<Self, HeaderCircuitError> {
            assert_eq!(native.pub_keys_compressed.len(), NUM_KEYS);
            assert_eq!(native.sigs.len(), NUM_SIGS);

            let mut builder = GateThreadBuilder::mock();
            let range = RangeChip::default(circuit_config.lookup_bits);
            let fp_chip = FpChip::new(&range, circuit_config.limb_bits, circuit_config.num_limbs);

            let ctx = builder.main(0);
            let witness = witness::assign_multisig_witness(ctx, &fp_chip, native)?;
            let chip = Secp256k1MultisigChip::new(&fp_chip);
            chip.verify(ctx, &witness);

            Ok(Self {
                builder: RefCell::new(builder),
                break_points: RefCell::new(vec![]),
            })
        }
    }

    impl<F: EccPrimeField> Circuit<F> for MultisigCircuit<F> {
        type Config = MultisigCircuitConfig<F>;
        type FloorPlanner = SimpleFloorPlanner;

        fn without_witnesses(&self) -> Self {
            unimplemented!("mock-only test circuit")
        }

        fn configure(meta: &mut ConstraintSystem<F>) -> Self::Config {
            let gate_config: crate::keccak::KeccakGateConfig = serde_json::from_str(
                &std::env::var(MULTISIG_GATE_CONFIG_VAR)
                    .expect("MULTISIG_TEST_GATE_CONFIG not set; call set_multisig_test_env first"),
            )
            .expect("gate config deserialization error");
            let circuit_config: CircuitWithLimbsConfig = serde_json::from_str(
                &std::env::var(MULTISIG_CIRCUIT_CONFIG_VAR).expect(
                    "MULTISIG_TEST_CIRCUIT_CONFIG not set; call set_multisig_test_env first",
                ),
            )
            .expect("circuit config deserialization error");
            MultisigCircuitConfig::configure(meta, circuit_config.degree_bits, &gate_config)
        }

        fn synthesize(
            &self,
            config: Self::Config,
            mut layouter: impl Layouter<F>,
        ) -> Result<(), Error> {
            config
                .range
                .load_lookup_table(&mut layouter)
                .expect("load range lookup table");
            let mut first_pass = SKIP_FIRST_PASS;
            let witness_gen_only = self.builder.borrow().witness_gen_only();
            layouter.assign_region(
                || "multisig predicate",
                |mut region| {
                    if first_pass {
                        first_pass = false;
                        return Ok(());
                    }
                    if witness_gen_only {
                        let builder = &mut self.builder.borrow_mut();
                        let break_points = &mut self.break_points.borrow_mut();
                        assign_prover(
                            &mut region,
                            &config.range.gate,
                            &config.range.lookup_advice,
                            builder,
                            break_points,
                        );
                    } else {
                        let builder = self.builder.borrow();
                        let assignments = builder.assign_all(
                            &config.range.gate,
                            &config.range.lookup_advice,
                            &config.range.q_lookup,
                            &mut region,
                            Default::default(),
                        );
                        *self.break_points.borrow_mut() = assignments.break_points;
                    }
                    Ok(())
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_length_bounds_match_spec() {
        assert_eq!(MIN_VERIFICATION_SCRIPT_LEN, 7 * 35 + 7);
        assert_eq!(MIN_INVOCATION_SCRIPT_LEN, 5 * 66);
    }

    #[test]
    fn mapping_rule_index_is_big_endian() {
        // bits = [1, 0, 1] should decode to 5, matching the big-endian
        // convention §4.6 step 5 specifies.
        let bits = [1u64, 0, 1];
        let mut index = 0u64;
        for bit in bits {
            index = index * 2 + bit;
        }
        assert_eq!(index, 5);
    }

    #[test]
    fn compression_byte_formula_matches_spec() {
        for y0 in [0u64, 1] {
            let compression_byte = 0x02 | y0;
            assert_eq!(compression_byte, 2 + y0);
        }
    }

    /// Confirms the witness adapter and predicate gates assign cleanly for
    /// a well-shaped (if cryptographically unsigned) script pair.
    #[test]
    fn multisig_witness_assigns_for_well_shaped_scripts() {
        use super::circuit::{set_multisig_test_env, MultisigCircuit};
        use crate::keccak::KeccakGateConfig;
        use crate::witness::NativeMultisigInput;
        use halo2_base::gates::builder::FlexGateConfigParams;
        use halo2_base::halo2_proofs::halo2curves::bn256::Fr;

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

        let native = NativeMultisigInput {
            verification_script,
            invocation_script,
            pub_keys_compressed: vec![generator_compressed; NUM_KEYS],
            sigs,
            data,
            mapping_rules: vec![0, 1, 2, 3, 4],
            interop_id,
        };

        let gate_config = KeccakGateConfig {
            flex_gate_config_params: FlexGateConfigParams {
                k: 18,
                num_advice_per_phase: vec![60],
                num_lookup_advice_per_phase: vec![6],
                num_fixed: 2,
            },
            rows_per_round: 25,
            lookup_bits: 17,
        };
        let circuit_config = crate::CircuitWithLimbsConfig::from_degree_bits(18);
        set_multisig_test_env(&gate_config, &circuit_config);

        MultisigCircuit::<Fr>::mock(&circuit_config, &native)
            .expect("well-shaped witness assigns without error");
    }
}
