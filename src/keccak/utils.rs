//! Byte/bit packing utility functions shared by the fixed- and
//! variable-length Keccak gadgets.

use crate::EccPrimeField;
use halo2_base::{
    gates::{GateInstructions, RangeChip, RangeInstructions},
    AssignedValue, Context, QuantumCell,
};
use itertools::Itertools;
use zkevm_keccak::util::{NUM_WORDS_TO_ABSORB, RATE_IN_BITS};

/// Byte size in bits
const BYTE_SIZE_IN_BITS: usize = 8;

/// Number of parts to perform the in-field assertion
/// for byte decompositions.
const NUM_PARTS: usize = 2;

/// Returns the number of bytes required to represent a field element.
pub fn num_bytes<F: EccPrimeField>() -> usize {
    let num_bytes: usize = (F::NUM_BITS as usize + BYTE_SIZE_IN_BITS - 1) / BYTE_SIZE_IN_BITS;
    assert!(num_bytes > 0);
    num_bytes
}

/// Returns a vector with the powers of 2^8.
pub(crate) fn byte_decomposition_powers<F: EccPrimeField>() -> Vec<F> {
    let num_bytes = num_bytes::<F>();
    let mut powers = Vec::<F>::with_capacity(num_bytes);
    let two_to_byte_size_in_bits = F::from(1 << BYTE_SIZE_IN_BITS);

    powers.push(F::one());
    for i in 1..num_bytes {
        powers.push(powers[i - 1] * two_to_byte_size_in_bits);
    }

    powers
}

/// Returns the little-endian byte decomposition of F::MODULUS - 1,
/// in other words, the byte decomposition of the max element
/// in the field F.
fn field_max_element_byte_decomposition<F: EccPrimeField>() -> Vec<F> {
    let modulus_minus_one = F::zero() - F::one();
    modulus_minus_one
        .to_bytes_le()
        .into_iter()
        .map(|byte| F::from(byte as u64))
        .collect_vec()
}

/// Splits the element `F::MODULUS - 1` into `NUM_PARTS` parts, each representable
/// with `num_bytes`/`NUM_PARTS` bytes. The parts are returned from least to most
/// significant.
pub(crate) fn field_max_element_into_parts<F, const NUM_PARTS: usize>() -> [F; NUM_PARTS]
where
    F: EccPrimeField,
{
    let num_bytes = num_bytes::<F>();
    assert_eq!(num_bytes % NUM_PARTS, 0);
    let num_bytes_in_part = num_bytes / NUM_PARTS;
    let powers = &byte_decomposition_powers::<F>()[0..num_bytes_in_part];
    field_max_element_byte_decomposition::<F>()
        .into_iter()
        .chunks(num_bytes_in_part)
        .into_iter()
        .map(|chunk| {
            chunk
                .into_iter()
                .zip_eq(powers.iter())
                .fold(F::zero(), |acc, (byte, power)| acc + byte * power)
        })
        .collect_vec()
        .try_into()
        .expect("Conversion from vector into array is not allowed to fail")
}

/// Splits the field element represented by `bytes` into `NUM_PARTS` parts.
fn assigned_field_element_bytes_into_parts<'a, F, const NUM_PARTS: usize>(
    ctx: &mut Context<F>,
    chip: &RangeChip<F>,
    bytes: impl ExactSizeIterator<Item = &'a AssignedValue<F>>,
) -> [AssignedValue<F>; NUM_PARTS]
where
    F: EccPrimeField,
{
    let num_bytes = num_bytes::<F>();
    assert_eq!(num_bytes, bytes.len(), "Wrong number of bytes");
    assert_eq!(num_bytes % NUM_PARTS, 0);
    let num_bytes_in_part = num_bytes / NUM_PARTS;
    let powers = byte_decomposition_powers()
        .into_iter()
        .take(num_bytes_in_part)
        .map(|power| QuantumCell::from(ctx.load_constant(power)))
        .collect_vec();
    bytes
        .into_iter()
        .chunks(num_bytes_in_part)
        .into_iter()
        .map(|chunk| {
            chip.gate.inner_product(
                ctx,
                chunk.into_iter().cloned().map(QuantumCell::from),
                powers.clone(),
            )
        })
        .collect_vec()
        .try_into()
        .expect("Conversion from vector into array is not allowed to fail")
}

/// Checks `bytes` corresponds to the byte decomposition of a field element.
/// It does so by splitting both the field element represented by `bytes` into
/// `NUM_PARTS` parts and comparing them to the parts of `F::MODULUS - 1`.
///
/// # Implementation Note
///
/// This function assumes that `bytes` have been range-checked to be `< 2^8`.
pub(crate) fn assert_byte_decomposition_is_in_field<'a, F, const NUM_PARTS: usize>(
    ctx: &mut Context<F>,
    chip: &RangeChip<F>,
    bytes: impl ExactSizeIterator<Item = &'a AssignedValue<F>>,
) -> bool
where
    F: EccPrimeField,
{
    let num_bytes = num_bytes::<F>();
    assert_eq!(num_bytes % NUM_PARTS, 0);
    let num_bytes_in_part = num_bytes / NUM_PARTS;
    let num_bits_in_part = num_bytes_in_part * BYTE_SIZE_IN_BITS;
    let parts = assigned_field_element_bytes_into_parts::<F, NUM_PARTS>(ctx, chip, bytes);
    let maximal_parts = field_max_element_into_parts::<F, NUM_PARTS>()
        .map(|part| QuantumCell::from(ctx.load_constant(part)));
    let is_in_field = parts.into_iter().zip_eq(maximal_parts.into_iter()).fold(
        ctx.load_constant(F::one()),
        |lower_parts_satisfied, (part, maximal_part)| {
            // It can satisfy all inequalities for the lower parts
            // AND be equal to the current part OR it can be strictly
            // smaller than the current part.
            let is_equal = chip.gate.is_equal(ctx, part, maximal_part);
            let is_equal_and_lower_parts = chip.gate.and(ctx, lower_parts_satisfied, is_equal);
            let is_less = chip.is_less_than(ctx, part, maximal_part, num_bits_in_part);
            chip.gate.or(ctx, is_equal_and_lower_parts, is_less)
        },
    );
    chip.gate.assert_is_const(ctx, &is_in_field, &F::one());

    // Return true if the byte decomposition is in the field, false otherwise
    is_in_field.value().get_lower_32() != 0
}

/// Decomposes `field_element` into bytes. Returns its big-endian byte decomposition,
/// already assigned in the `ctx`.
pub fn byte_decomposition<F>(
    ctx: &mut Context<F>,
    chip: &RangeChip<F>,
    field_element: &AssignedValue<F>,
) -> Vec<AssignedValue<F>>
where
    F: EccPrimeField,
{
    let mut byte_decomposition_powers = byte_decomposition_powers()
        .into_iter()
        .map(|power| QuantumCell::from(ctx.load_constant(power)))
        .collect_vec();
    byte_decomposition_powers.reverse();
    let byte_repr = field_element
        .value()
        .to_bytes_le()
        .into_iter()
        .rev()
        .map(|byte| F::from(byte as u64))
        .collect_vec();
    let assigned_repr = ctx.assign_witnesses(byte_repr);
    assert_byte_decomposition_is_in_field::<F, NUM_PARTS>(ctx, chip, assigned_repr.iter().rev());
    for byte in assigned_repr.iter() {
        chip.range_check(ctx, *byte, BYTE_SIZE_IN_BITS);
    }
    let result = chip.gate.inner_product(
        ctx,
        assigned_repr.clone().into_iter().map(QuantumCell::from),
        byte_decomposition_powers,
    );
    ctx.constrain_equal(field_element, &result);
    assigned_repr
}

/// Decomposes `field_elements` into bytes. Returns the concatenation
/// of their respective byte decompositions, in order.
pub fn byte_decomposition_list<F>(
    ctx: &mut Context<F>,
    chip: &RangeChip<F>,
    field_elements: &[AssignedValue<F>],
) -> Vec<AssignedValue<F>>
where
    F: EccPrimeField,
{
    field_elements
        .iter()
        .flat_map(|field_element| byte_decomposition(ctx, chip, field_element))
        .collect()
}

/// Converts bytes into bits.
fn into_bits<F>(
    ctx: &mut Context<F>,
    chip: &RangeChip<F>,
    bytes: &[AssignedValue<F>],
) -> Vec<AssignedValue<F>>
where
    F: EccPrimeField,
{
    let mut assigned_bits: Vec<AssignedValue<F>> =
        Vec::with_capacity(bytes.len() * BYTE_SIZE_IN_BITS);
    for byte in bytes {
        assigned_bits.extend(chip.gate.num_to_bits(ctx, *byte, BYTE_SIZE_IN_BITS));
    }
    assigned_bits
}

/// Pads `bits` so its length becomes a multiple of `rate_in_bits`.
fn padding<F>(ctx: &mut Context<F>, bits: &mut Vec<AssignedValue<F>>, rate_in_bits: usize)
where
    F: EccPrimeField,
{
    bits.push(ctx.load_constant(F::one()));
    while (bits.len() + 1) % rate_in_bits != 0 {
        bits.push(ctx.load_constant(F::zero()));
    }
    bits.push(ctx.load_constant(F::one()));
}

/// Packs a vector of padded `bits` into a word.
fn pack<F>(ctx: &mut Context<F>, chip: &RangeChip<F>, bits: &[AssignedValue<F>]) -> AssignedValue<F>
where
    F: EccPrimeField,
{
    assert_eq!(bits.len(), 64, "Wrong number of bits");
    let base = ctx.load_constant(F::from(8u64));
    let initial_value = ctx.load_constant(F::zero());
    bits.iter().rev().fold(initial_value, |acc, bit| {
        chip.gate.mul_add(ctx, acc, base, *bit)
    })
}

/// Converts `bytes` to bits, pads them and packs them into 64-bit words.
pub fn bytes_to_keccak_padded_words<F>(
    ctx: &mut Context<F>,
    chip: &RangeChip<F>,
    bytes: &[AssignedValue<F>],
) -> Vec<AssignedValue<F>>
where
    F: EccPrimeField,
{
    let mut bits = into_bits(ctx, chip, bytes);
    padding(ctx, &mut bits, RATE_IN_BITS);
    let chunks = bits.chunks(RATE_IN_BITS);
    let mut result = Vec::new();
    for chunk in chunks {
        for idx in 0..NUM_WORDS_TO_ABSORB {
            result.push(pack(ctx, chip, &chunk[idx * 64..(idx + 1) * 64]));
        }
    }
    result
}
