//! Header-update predicate (C8): the relation a BLS-threshold header
//! extension must satisfy, composing C5 (header encoder), C3 (keccak), and
//! C7 (BLS verifier) per spec §4.8.
//!
//! Unlike [`crate::ecdsa_multisig`] (a standalone circuit audited on its
//! own), this module is the one place the header encoder, keccak chip and
//! BLS verifier are wired together; the ECDSA fallback path is never
//! composed here (spec §4.9).

use crate::{
    bls::{self, hash_to_g2::SswuHint, BlsWitness, G1Point},
    header::{self, HeaderParameters},
    keccak::chip::KeccakChip,
    EccPrimeField,
};
use halo2_base::{
    gates::{GateChip, GateInstructions, RangeChip, RangeInstructions},
    AssignedValue, Context,
};
use halo2_ecc::bls12_381::{Fp2Chip, FpChip};

pub mod circuit;

/// Extra-field layout offsets (spec §6 wire-format table): the 48-byte
/// compressed G1 public key starts right after the 34-byte hashable prefix
/// (version, scheme, TPKE commitment).
const PUBKEY_OFFSET: usize = 34;
const PUBKEY_LEN: usize = 48;

/// All witnesses the header-update predicate needs beyond the two headers
/// themselves: the claimed seal hash (as a `G2` point), the BLS signature,
/// and the pair of SSWU sqrt/sign hints `hash_to_g2` needs to recompute
/// that same point from the current header's seal-mode RLP.
pub struct UpdateWitness<F: EccPrimeField> {
    pub parent: HeaderParameters<F>,
    pub current: HeaderParameters<F>,
    pub public_key: G1Point<F>,
    pub hash: bls::G2Point<F>,
    pub signature: bls::G2Point<F>,
    pub sswu_hints: [SswuHint<F>; 2],
}

/// Decodes a big-endian byte vector into a single native field element via
/// Horner's rule (`acc = acc * 256 + byte`). Safe without CRT reduction for
/// any field this crate's fixed-width header integers use (8 bytes, 64
/// bits), since BN254's scalar field is far wider.
fn decode_be_bytes<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    bytes: &[AssignedValue<F>],
) -> AssignedValue<F> {
    let base = ctx.load_constant(F::from(256u64));
    let mut acc = ctx.load_zero();
    for byte in bytes {
        let scaled = gate.mul(ctx, acc, base);
        acc = gate.add(ctx, scaled, *byte);
    }
    acc
}

/// Spec §4.8 step 1: `current.parentHash == keccak(rlp_full(parent))`.
fn assert_linkage<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    keccak: &mut KeccakChip<F>,
    parent: &HeaderParameters<F>,
    current: &HeaderParameters<F>,
) {
    let parent_rlp = header::encode_header(ctx, gate, range, parent, false);
    keccak.keccak_var_len(ctx, range, parent_rlp.slice().to_vec(), parent_rlp.padding());
    let digest = keccak
        .var_len_queries()
        .last()
        .expect("query just pushed")
        .output_bytes_assigned()
        .to_vec();
    for (computed, claimed) in digest.iter().zip(current.parent_hash.iter()) {
        ctx.constrain_equal(computed, claimed);
    }
}

/// Spec §4.8 step 2: `current.number == parent.number + 1` (big-endian
/// 8-byte integers).
fn assert_index_monotonic<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    parent: &HeaderParameters<F>,
    current: &HeaderParameters<F>,
) {
    let parent_number = decode_be_bytes(ctx, gate, &parent.number);
    let current_number = decode_be_bytes(ctx, gate, &current.number);
    let one = ctx.load_constant(F::one());
    let expected = gate.add(ctx, parent_number, one);
    ctx.constrain_equal(&expected, &current_number);
}

/// Spec §4.8 step 3: `current.time > parent.time` (big-endian 8-byte
/// integers), a dynamic strict inequality between two witness-dependent
/// values -- unlike [`crate::rlp`]'s length checks, neither side is a
/// circuit-time constant, so this goes through `is_less_than` rather than
/// `is_less_than_safe`.
fn assert_time_monotonic<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    parent: &HeaderParameters<F>,
    current: &HeaderParameters<F>,
) {
    let parent_time = decode_be_bytes(ctx, gate, &parent.time);
    let current_time = decode_be_bytes(ctx, gate, &current.time);
    // 8 bytes comfortably fit in 64 bits.
    let is_increasing = range.is_less_than(ctx, parent_time, current_time, 64);
    gate.assert_is_const(ctx, &is_increasing, &F::one());
}

/// Spec §4.8 step 4: `current.extra[0] in {ExtraV1, ExtraV2}` (the
/// ECDSA-fallback `ExtraV0` state is never valid at the head of a BLS
/// update) and `current.extra[1] == ExtraV1ThresholdScheme`, expressed as
/// the same range-membership accumulator `hashable_extra` uses rather than
/// a branch (spec §7: "the Extra version check is expressed as range
/// membership, not a branch").
fn assert_extra_gating<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    current: &HeaderParameters<F>,
) {
    let extra0 = current.extra[0];
    let extra1 = current.extra[1];
    let v1 = ctx.load_constant(F::from(header::EXTRA_V1));
    let v2 = ctx.load_constant(F::from(header::EXTRA_V2));
    let is_v1 = gate.is_equal(ctx, extra0, v1);
    let is_v2 = gate.is_equal(ctx, extra0, v2);
    let is_known_version = gate.or(ctx, is_v1, is_v2);
    gate.assert_is_const(ctx, &is_known_version, &F::one());

    let scheme = ctx.load_constant(F::from(header::EXTRA_V1_THRESHOLD_SCHEME));
    ctx.constrain_equal(&extra1, &scheme);
}

/// Spec §4.8 step 5: `keccak(current.extra[34..82]) == parent.mixDigest`,
/// the TPKE-commitment link between successive headers. `current.extra`'s
/// slice is a fixed Rust-level range (not witness-dependent), so this is a
/// fixed-length keccak query.
fn assert_tpke_commitment<F: EccPrimeField>(
    ctx: &mut Context<F>,
    range: &RangeChip<F>,
    keccak: &mut KeccakChip<F>,
    parent: &HeaderParameters<F>,
    current: &HeaderParameters<F>,
) {
    let pub_bytes = current.extra[PUBKEY_OFFSET..PUBKEY_OFFSET + PUBKEY_LEN].to_vec();
    keccak.keccak_fixed_len(ctx, range, pub_bytes);
    let digest = keccak
        .fixed_len_queries()
        .last()
        .expect("query just pushed")
        .output_bytes_assigned()
        .to_vec();
    for (computed, claimed) in digest.iter().zip(parent.mix_digest.iter()) {
        ctx.constrain_equal(computed, claimed);
    }
}

/// Binds `current.extra[34..82]` (the compressed `G1` public key bytes
/// hashed by [`assert_tpke_commitment`]) to the `public_key` witness C7
/// will run the pairing check against, so the TPKE-commitment link and the
/// signature check are provably about the same point.
fn assert_pubkey_binding<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp_chip: &FpChip<F>,
    limb_bits: usize,
    current: &HeaderParameters<F>,
    public_key: &G1Point<F>,
) {
    let pub_bytes = &current.extra[PUBKEY_OFFSET..PUBKEY_OFFSET + PUBKEY_LEN];
    bls::bind_g1_pubkey_compressed(ctx, fp_chip, limb_bits, pub_bytes, public_key);
}

/// Spec §4.8 step 6: the seal digest. RLP-encodes `current` in seal mode,
/// applies in-circuit `hash_to_g2`, and asserts its 192-byte marshalling
/// equals the witness `hash`'s own marshalling.
fn assert_seal_digest<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    keccak: &mut KeccakChip<F>,
    fp_chip: &FpChip<F>,
    fp2_chip: &Fp2Chip<F>,
    limb_bits: usize,
    current: &HeaderParameters<F>,
    hash: &bls::G2Point<F>,
    sswu_hints: [SswuHint<F>; 2],
) {
    let seal_rlp = header::encode_header(ctx, gate, range, current, true);
    let recomputed = bls::hash_to_g2::hash_to_g2(
        ctx,
        range,
        keccak,
        fp2_chip,
        seal_rlp.slice().to_vec(),
        seal_rlp.padding(),
        sswu_hints,
    );
    let recomputed_bytes = bls::hash_to_g2::marshal_g2_192(ctx, fp_chip, limb_bits, &recomputed);
    let claimed_bytes = bls::hash_to_g2::marshal_g2_192(ctx, fp_chip, limb_bits, hash);
    for (a, b) in recomputed_bytes.iter().zip(claimed_bytes.iter()) {
        ctx.constrain_equal(a, b);
    }
}

/// Full C8 entry point: asserts every step of spec §4.8 in order, then
/// delegates the signature check itself to [`bls::verify`] (C7).
pub fn assert_header_update<F: EccPrimeField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    keccak: &mut KeccakChip<F>,
    fp_chip: &FpChip<F>,
    fp2_chip: &Fp2Chip<F>,
    limb_bits: usize,
    witness: &UpdateWitness<F>,
) {
    witness.parent.assert_widths();
    witness.current.assert_widths();

    assert_linkage(ctx, gate, range, keccak, &witness.parent, &witness.current);
    assert_index_monotonic(ctx, gate, &witness.parent, &witness.current);
    assert_time_monotonic(ctx, gate, range, &witness.parent, &witness.current);
    assert_extra_gating(ctx, gate, &witness.current);
    assert_tpke_commitment(ctx, range, keccak, &witness.parent, &witness.current);
    assert_pubkey_binding(ctx, fp_chip, limb_bits, &witness.current, &witness.public_key);
    assert_seal_digest(
        ctx,
        gate,
        range,
        keccak,
        fp_chip,
        fp2_chip,
        limb_bits,
        &witness.current,
        &witness.hash,
        witness.sswu_hints.clone(),
    );

    let bls_witness = BlsWitness {
        public_key: witness.public_key.clone(),
        hash: witness.hash.clone(),
        signature: witness.signature.clone(),
    };
    bls::verify(ctx, fp_chip, fp2_chip, &bls_witness);
}
