//! In-circuit RLP encoding (spec §4.4), built on [`crate::slice`]'s
//! variable-width byte algebra.
//!
//! Every rule below explicitly range-checks the length it consumes (spec:
//! "Each rule must explicitly constrain `len` via range assertions"), and
//! the variable-length entry point [`encode_string`] selects among the
//! applicable rules with `GateInstructions::select` rather than branching
//! the circuit shape on the witness-dependent length.

use crate::slice::PaddingSlice;
use halo2_base::{
    gates::{GateChip, GateInstructions, RangeChip, RangeInstructions},
    utils::ScalarField,
    AssignedValue, Context,
};

/// `0x80 + len` string prefix threshold (len in `1..=55`).
const SHORT_STRING_MAX_LEN: u64 = 55;
/// `0xb9` two-byte-length string prefix threshold.
const MEDIUM_STRING_MAX_LEN: u64 = 255;
/// Largest length a 2-byte big-endian length field can carry.
const LONG_STRING_MAX_LEN: u64 = 65535;

const OFFSET_SHORT_STRING: u64 = 0x80;
const OFFSET_LONG_STRING: u64 = 0xb7;
const OFFSET_SHORT_LIST: u64 = 0xc0;
const OFFSET_LONG_LIST: u64 = 0xf7;

/// R1: a single byte in `[0x00, 0x7f]` is its own RLP encoding.
pub fn encode_rule1<F: ScalarField>(
    ctx: &mut Context<F>,
    range: &RangeChip<F>,
    byte: AssignedValue<F>,
) -> Vec<AssignedValue<F>> {
    range.range_check(ctx, byte, 7);
    vec![byte]
}

/// R2: a string of `1 <= len <= 55` bytes is prefixed with `0x80 + len`.
pub fn encode_rule2<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    len: AssignedValue<F>,
) -> AssignedValue<F> {
    range.check_less_than_safe(ctx, len, SHORT_STRING_MAX_LEN + 1);
    let offset = ctx.load_constant(F::from(OFFSET_SHORT_STRING));
    gate.add(ctx, offset, len)
}

/// R3-1: a string of `55 < len <= 255` bytes is prefixed with `0xb8, len`.
pub fn encode_rule3_1<F: ScalarField>(
    ctx: &mut Context<F>,
    range: &RangeChip<F>,
    len: AssignedValue<F>,
) -> [AssignedValue<F>; 2] {
    range.check_less_than_safe(ctx, len, MEDIUM_STRING_MAX_LEN + 1);
    let prefix = ctx.load_constant(F::from(OFFSET_LONG_STRING + 1));
    [prefix, len]
}

/// R3-2: a string of `255 < len <= 65535` bytes is prefixed with
/// `0xb9, lenHi, lenLo`.
pub fn encode_rule3_2<F: ScalarField>(
    ctx: &mut Context<F>,
    range: &RangeChip<F>,
    len: AssignedValue<F>,
) -> [AssignedValue<F>; 3] {
    range.check_less_than_safe(ctx, len, LONG_STRING_MAX_LEN + 1);
    let prefix = ctx.load_constant(F::from(OFFSET_LONG_STRING + 2));
    let (len_hi, len_lo) = range.div_mod(ctx, len, 256u64, 16);
    [prefix, len_hi, len_lo]
}

/// R4: a list whose encoded payload totals `total <= 55` bytes is prefixed
/// with `0xc0 + total`.
pub fn encode_rule4<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    total: AssignedValue<F>,
) -> AssignedValue<F> {
    range.check_less_than_safe(ctx, total, SHORT_STRING_MAX_LEN + 1);
    let offset = ctx.load_constant(F::from(OFFSET_SHORT_LIST));
    gate.add(ctx, offset, total)
}

/// R5-1: a list whose payload totals `55 < total <= 255` bytes is prefixed
/// with `0xf8, total`.
pub fn encode_rule5_1<F: ScalarField>(
    ctx: &mut Context<F>,
    range: &RangeChip<F>,
    total: AssignedValue<F>,
) -> [AssignedValue<F>; 2] {
    range.check_less_than_safe(ctx, total, MEDIUM_STRING_MAX_LEN + 1);
    let prefix = ctx.load_constant(F::from(OFFSET_LONG_LIST + 1));
    [prefix, total]
}

/// R5-2: a list whose payload totals `255 < total <= 65535` bytes is
/// prefixed with `0xf9, totalHi, totalLo`.
pub fn encode_rule5_2<F: ScalarField>(
    ctx: &mut Context<F>,
    range: &RangeChip<F>,
    total: AssignedValue<F>,
) -> [AssignedValue<F>; 3] {
    range.check_less_than_safe(ctx, total, LONG_STRING_MAX_LEN + 1);
    let prefix = ctx.load_constant(F::from(OFFSET_LONG_LIST + 2));
    let (total_hi, total_lo) = range.div_mod(ctx, total, 256u64, 16);
    [prefix, total_hi, total_lo]
}

/// Variable-length RLP string encoder, operating on a [`PaddingSlice`]
/// whose logical length (`content.padding()`) is witness-dependent.
///
/// Selects among R1/R2/R3-1/R3-2 with `select`s on the (small, statically
/// bounded) set of length-range indicators rather than branching the
/// circuit shape, and returns a `PaddingSlice` of physical length
/// `content.len() + 3` (room for the worst-case 3-byte prefix) whose
/// `padding` equals the true encoded output length.
pub fn encode_string<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    content: &PaddingSlice<F>,
) -> PaddingSlice<F> {
    let content = content.to_left_aligned(ctx, gate);
    let len = content.padding();

    let one = ctx.load_constant(F::one());
    let is_len_one = gate.is_equal(ctx, len, one);
    let first_byte = *content.slice().first().unwrap_or(&one);
    let is_small_byte = range.is_less_than_safe(ctx, first_byte, OFFSET_SHORT_STRING);
    let is_bare_byte = gate.and(ctx, is_len_one, is_small_byte);

    let is_medium =
        range.is_less_than_safe(ctx, ctx.load_constant(F::from(SHORT_STRING_MAX_LEN)), len);
    let is_long = range.is_less_than_safe(
        ctx,
        ctx.load_constant(F::from(MEDIUM_STRING_MAX_LEN)),
        len,
    );

    // Short-string prefix byte (R2), valid whenever `len <= 55`.
    let short_prefix = encode_rule2(ctx, gate, range, len);
    // Medium-string prefix bytes (R3-1), valid whenever `55 < len <= 255`.
    let [medium_prefix0, medium_prefix1] = encode_rule3_1(ctx, range, len);
    // Long-string prefix bytes (R3-2), valid whenever `255 < len <= 65535`.
    let [long_prefix0, long_prefix1, long_prefix2] =
        encode_rule3_2(ctx, range, len);

    let zero = ctx.load_zero();
    let prefix0_multi = gate.select(ctx, long_prefix0, medium_prefix0, is_long);
    let prefix0_multi = gate.select(ctx, prefix0_multi, short_prefix, is_medium);
    let prefix0 = gate.select(ctx, prefix0_multi, zero, is_bare_byte);

    let prefix1 = gate.select(ctx, long_prefix1, medium_prefix1, is_long);
    let prefix1 = gate.select(ctx, prefix1, zero, is_medium);
    let prefix2 = gate.select(ctx, long_prefix2, zero, is_long);

    let prefix_len_multi_byte = {
        let two = ctx.load_constant(F::from(2u64));
        let three = ctx.load_constant(F::from(3u64));
        gate.select(ctx, three, two, is_long)
    };
    let prefix_len = gate.select(
        ctx,
        gate.select(ctx, prefix_len_multi_byte, one, is_medium),
        zero,
        is_bare_byte,
    );

    let prefix = PaddingSlice::from_parts(vec![prefix0, prefix1, prefix2], prefix_len, true);
    PaddingSlice::concat(ctx, gate, &[prefix, content], true)
}

/// Variable-length RLP list encoder: wraps an already-assembled payload
/// (the concatenation of its member encodings) with the R4/R5-1/R5-2 list
/// prefix selected on `payload.padding()`.
pub fn encode_list<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    payload: &PaddingSlice<F>,
) -> PaddingSlice<F> {
    let payload = payload.to_left_aligned(ctx, gate);
    let total = payload.padding();

    let is_medium = range.is_less_than_safe(
        ctx,
        ctx.load_constant(F::from(SHORT_STRING_MAX_LEN)),
        total,
    );
    let is_long = range.is_less_than_safe(
        ctx,
        ctx.load_constant(F::from(MEDIUM_STRING_MAX_LEN)),
        total,
    );

    let short_prefix = encode_rule4(ctx, gate, range, total);
    let [medium_prefix0, medium_prefix1] = encode_rule5_1(ctx, range, total);
    let [long_prefix0, long_prefix1, long_prefix2] = encode_rule5_2(ctx, range, total);

    let zero = ctx.load_zero();
    let prefix0 = gate.select(ctx, long_prefix0, medium_prefix0, is_long);
    let prefix0 = gate.select(ctx, prefix0, short_prefix, is_medium);
    let prefix1 = gate.select(ctx, long_prefix1, medium_prefix1, is_long);
    let prefix1 = gate.select(ctx, prefix1, zero, is_medium);
    let prefix2 = gate.select(ctx, long_prefix2, zero, is_long);

    let one = ctx.load_constant(F::one());
    let two = ctx.load_constant(F::from(2u64));
    let three = ctx.load_constant(F::from(3u64));
    let prefix_len = gate.select(ctx, three, gate.select(ctx, two, one, is_medium), is_long);

    let prefix = PaddingSlice::from_parts(vec![prefix0, prefix1, prefix2], prefix_len, true);
    PaddingSlice::concat(ctx, gate, &[prefix, payload], true)
}

/// Convenience: encodes a fixed-length byte array whose logical length is
/// not yet known as a `PaddingSlice` (derives it with
/// [`PaddingSlice::from_bytes`], `big_endian` since header numeric fields
/// are zero-padded on their low (most-significant) side), then RLP-encodes
/// it as a string.
pub fn encode_bytes_as_string<F: ScalarField>(
    ctx: &mut Context<F>,
    gate: &GateChip<F>,
    range: &RangeChip<F>,
    bytes: Vec<AssignedValue<F>>,
    big_endian: bool,
) -> PaddingSlice<F> {
    let content = PaddingSlice::from_bytes(ctx, gate, bytes, !big_endian);
    encode_string(ctx, gate, range, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2_base::{gates::builder::GateThreadBuilder, halo2_proofs::halo2curves::bn256::Fr};

    fn chips() -> (GateChip<Fr>, RangeChip<Fr>) {
        (GateChip::default(), RangeChip::default(8))
    }

    #[test]
    fn short_string_prefix() {
        let mut builder = GateThreadBuilder::<Fr>::mock();
        let (gate, range) = chips();
        let ctx = builder.main(0);
        let bytes = ctx.assign_witnesses([0xDEu64, 0xAD, 0xBE, 0xEF, 0, 0].map(Fr::from));
        let encoded = encode_bytes_as_string(ctx, &gate, &range, bytes, true);
        // 4-byte string -> prefix 0x80+4 = 0x84, total length 5.
        assert_eq!(encoded.slice()[0].value(), &Fr::from(0x84u64));
        assert_eq!(encoded.padding().value(), &Fr::from(5u64));
    }

    #[test]
    fn single_small_byte_is_bare() {
        let mut builder = GateThreadBuilder::<Fr>::mock();
        let (gate, range) = chips();
        let ctx = builder.main(0);
        let bytes = ctx.assign_witnesses([0x01u64, 0, 0].map(Fr::from));
        let encoded = encode_bytes_as_string(ctx, &gate, &range, bytes, true);
        assert_eq!(encoded.padding().value(), &Fr::from(1u64));
        assert_eq!(encoded.slice()[0].value(), &Fr::from(0x01u64));
    }
}
