//! Header encoder (C5): composes [`crate::rlp`] over the 17-field header
//! tuple, in either seal-mode (hashable-extra truncated per the version
//! byte) or full-mode (extra included whole).
//!
//! Field widths and the `ExtraV0`/`ExtraV1`/`ExtraV2` hashable-prefix
//! lengths are grounded on `examples/original_source/neox/circuit/{helper.go,
//! ConstValue.go}`.

use crate::{
    rlp,
    slice::PaddingSlice,
    utils::bitmask::first_i_bits_bitmask,
};
use halo2_base::{
    gates::{GateChip, GateInstructions, RangeChip},
    utils::ScalarField,
    AssignedValue, Context,
};

/// Extra-field version byte denoting the ECDSA-fallback scheme.
pub const EXTRA_V0: u64 = 0x00;
/// Extra-field version byte denoting the threshold scheme (initial).
pub const EXTRA_V1: u64 = 0x01;
/// Extra-field version byte denoting the threshold scheme (current).
pub const EXTRA_V2: u64 = 0x02;
/// Scheme byte at `extra[1]` for the BLS threshold path.
pub const EXTRA_V1_THRESHOLD_SCHEME: u64 = 0x01;

/// Hashable-extra length for `ExtraV0` headers: the version byte alone.
pub const HASHABLE_EXTRA_V0_LEN: usize = 1;
/// Hashable-extra length for `ExtraV1`/`ExtraV2` headers: version, scheme,
/// and the 32-byte TPKE commitment.
pub const HASHABLE_EXTRA_V1_LEN: usize = 34;

pub const PARENT_HASH_LEN: usize = 32;
pub const UNCLE_HASH_LEN: usize = 32;
pub const COINBASE_LEN: usize = 20;
pub const ROOT_LEN: usize = 32;
pub const TX_HASH_LEN: usize = 32;
pub const RECEIPT_HASH_LEN: usize = 32;
pub const BLOOM_LEN: usize = 256;
/// Maximum physical width of the big-endian, zero-padded `difficulty` wire.
pub const DIFFICULTY_MAX_LEN: usize = 32;
pub const NUMBER_LEN: usize = 8;
pub const GAS_LIMIT_LEN: usize = 8;
pub const GAS_USED_LEN: usize = 8;
pub const TIME_LEN: usize = 8;
/// Maximum physical width of `extra`: `34` (hashable prefix) `+ 48`
/// (compressed G1 public key) `+ 96` (compressed G2 signature), the
/// threshold-mode wire format of §6.
pub const EXTRA_MAX_LEN: usize = 178;
pub const MIX_DIGEST_LEN: usize = 32;
pub const NONCE_LEN: usize = 8;
/// Maximum physical width of the big-endian, zero-padded `base_fee` wire.
pub const BASE_FEE_MAX_LEN: usize = 32;
pub const WITHDRAWALS_HASH_LEN: usize = 32;

/// The 17 logical fields of an EVM-style, post-withdrawal block header, as
/// fixed-physical-length byte-wire vectors assigned at the circuit
/// frontier. Numeric fields (`difficulty, number, gas_limit, gas_used,
/// time, base_fee`) are big-endian, zero-padded on their low-index side;
/// the rest are raw fixed-width byte strings.
#[derive(Clone)]
pub struct HeaderParameters<F: ScalarField> {
    pub parent_hash: Vec<AssignedValue<F>>,
    pub uncle_hash: Vec<AssignedValue<F>>,
    pub coinbase: Vec<AssignedValue<F>>,
    pub root: Vec<AssignedValue<F>>,
    pub tx_hash: Vec<AssignedValue<F>>,
    pub receipt_hash: Vec<AssignedValue<F>>,
    pub bloom: Vec<AssignedValue<F>>,
    pub difficulty: Vec<AssignedValue<F>>,
    pub number: Vec<AssignedValue<F>>,
    pub gas_limit: Vec<AssignedValue<F>>,
    pub gas_used: Vec<AssignedValue<F>>,
    pub time: Vec<AssignedValue<F>>,
    pub extra: Vec<AssignedValue<F>>,
    pub mix_digest: Vec<AssignedValue<F>>,
    pub nonce: Vec<AssignedValue<F>>,
    pub base_fee: Vec<AssignedValue<F>>,
    pub withdrawals_hash: Vec<AssignedValue<F>>,
}

impl<F: ScalarField> HeaderParameters<F> {
    /// Asserts every field has its declared physical width. Mismatches here
    /// are the "compile-time shape error" of spec §7 -- callers (C9) should
    /// check field lengths before assignment; this is the in-circuit
    /// backstop.
    pub fn assert_widths(&self) {
        assert_eq!(self.parent_hash.len(), PARENT_HASH_LEN);
        assert_eq!(self.uncle_hash.len(), UNCLE_HASH_LEN);
        assert_eq!(self.coinbase.len(), COINBASE_LEN);
        assert_eq!(self.root.len(), ROOT_LEN);
        assert_eq!(self.tx_hash.len(), TX_HASH_LEN);
        assert_eq!(self.receipt_hash.len(), RECEIPT_HASH_LEN);
        assert_eq!(self.bloom.len(), BLOOM_LEN);
        assert_eq!(self.difficulty.len(), DIFFICULTY_MAX_LEN);
        assert_eq!(self.number.len(), NUMBER_LEN);
        assert_eq!(self.gas_limit.len(), GAS_LIMIT_LEN);
        assert_eq!(self.gas_used.len(), GAS_USED_LEN);
        assert_eq!(self.time.len(), TIME_LEN);
        assert_eq!(self.extra.len(), EXTRA_MAX_LEN);
        assert_eq!(self.mix_digest.len(), MIX_DIGEST_LEN);
        assert_eq!(self.nonce.len(), NONCE_LEN);
        assert_eq!(self.base_fee.len(), BASE_FEE_MAX_LEN);
        assert_eq!(self.withdrawals_hash.len(), WITHDRAWALS_HASH_LEN);
    }
}

/// Wraps `bytes` as a `PaddingSlice` whose logical length is always the
/// full physical length -- used for identifier/hash fields, which RLP
/// must encode at their declared width regardless of value (unlike
/// numeric fields, a hash of all-zero bytes is not "empty").
fn full_width_field<F: ScalarField>(
    ctx: &mut Context<F>,
    bytes: Vec<AssignedValue<F>>,
) -> PaddingSlice<F> {
    let len = bytes.len();
    let padding = ctx.load_constant(F::from(len as u64));
    PaddingSlice::from_parts(bytes, padding, true)
}

/// RLP-encodes a fixed-width identifier/hash field as a string, at its
/// full declared width.
fn encode_fixed_width_field<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    bytes: Vec<AssignedValue<F>>,
) -> PaddingSlice<F> {
    let content = full_width_field(ctx, bytes);
    rlp::encode_string(ctx, gate, range, &content)
}

/// Asserts `extra[0]` is one of `{ExtraV0, ExtraV1, ExtraV2}` (the
/// `rangeCheck`-by-`Select` pattern of the design notes: accumulate with
/// `Select`/`Or` starting from `false`, never from `true`), then masks
/// `extra` down to its hashable prefix: `1` byte for `ExtraV0`, `34`
/// bytes for `ExtraV1`/`ExtraV2`.
fn hashable_extra<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    extra: &[AssignedValue<F>],
) -> PaddingSlice<F> {
    let extra0 = extra[0];
    let v0 = ctx.load_constant(F::from(EXTRA_V0));
    let v1 = ctx.load_constant(F::from(EXTRA_V1));
    let v2 = ctx.load_constant(F::from(EXTRA_V2));
    let is_v0 = gate.is_equal(ctx, extra0, v0);
    let is_v1 = gate.is_equal(ctx, extra0, v1);
    let is_v2 = gate.is_equal(ctx, extra0, v2);

    let is_known_version = ctx.load_constant(F::zero());
    let is_known_version = gate.or(ctx, is_known_version, is_v0);
    let is_known_version = gate.or(ctx, is_known_version, is_v1);
    let is_known_version = gate.or(ctx, is_known_version, is_v2);
    gate.assert_is_const(ctx, &is_known_version, &F::one());

    let hashable_v0_len = ctx.load_constant(F::from(HASHABLE_EXTRA_V0_LEN as u64));
    let hashable_v1_len = ctx.load_constant(F::from(HASHABLE_EXTRA_V1_LEN as u64));
    let hashable_len = gate.select(ctx, hashable_v0_len, hashable_v1_len, is_v0);

    let mask = first_i_bits_bitmask(ctx, gate, hashable_len, extra.len() as u64);
    let masked: Vec<AssignedValue<F>> = extra
        .iter()
        .zip(mask.iter())
        .map(|(byte, bit)| gate.mul(ctx, *byte, *bit))
        .collect();
    PaddingSlice::from_parts(masked, hashable_len, true)
}

/// Composes the full RLP of `header`: in seal-mode, `extra` is truncated to
/// its hashable prefix (see [`hashable_extra`]); in full-mode it is
/// included whole. Returns the RLP list payload as a `PaddingSlice`.
pub fn encode_header<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    header: &HeaderParameters<F>,
    seal_mode: bool,
) -> PaddingSlice<F> {
    header.assert_widths();

    let extra_encoded = if seal_mode {
        let hashable = hashable_extra(ctx, gate, &header.extra);
        rlp::encode_string(ctx, gate, range, &hashable)
    } else {
        encode_fixed_width_field(ctx, gate, range, header.extra.clone())
    };

    let members = [
        encode_fixed_width_field(ctx, gate, range, header.parent_hash.clone()),
        encode_fixed_width_field(ctx, gate, range, header.uncle_hash.clone()),
        encode_fixed_width_field(ctx, gate, range, header.coinbase.clone()),
        encode_fixed_width_field(ctx, gate, range, header.root.clone()),
        encode_fixed_width_field(ctx, gate, range, header.tx_hash.clone()),
        encode_fixed_width_field(ctx, gate, range, header.receipt_hash.clone()),
        encode_fixed_width_field(ctx, gate, range, header.bloom.clone()),
        rlp::encode_bytes_as_string(ctx, gate, range, header.difficulty.clone(), true),
        rlp::encode_bytes_as_string(ctx, gate, range, header.number.clone(), true),
        rlp::encode_bytes_as_string(ctx, gate, range, header.gas_limit.clone(), true),
        rlp::encode_bytes_as_string(ctx, gate, range, header.gas_used.clone(), true),
        rlp::encode_bytes_as_string(ctx, gate, range, header.time.clone(), true),
        extra_encoded,
        encode_fixed_width_field(ctx, gate, range, header.mix_digest.clone()),
        encode_fixed_width_field(ctx, gate, range, header.nonce.clone()),
        rlp::encode_bytes_as_string(ctx, gate, range, header.base_fee.clone(), true),
        encode_fixed_width_field(ctx, gate, range, header.withdrawals_hash.clone()),
    ];

    let payload = PaddingSlice::concat(ctx, gate, &members, true);
    rlp::encode_list(ctx, gate, range, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashable_extra_lengths_match_spec() {
        assert_eq!(HASHABLE_EXTRA_V0_LEN, 1);
        assert_eq!(HASHABLE_EXTRA_V1_LEN, 1 + 1 + 32);
        assert_eq!(EXTRA_MAX_LEN, HASHABLE_EXTRA_V1_LEN + 48 + 96);
    }
}
