//! Variable-width byte-slice algebra over field wires ([`PaddingSlice`] /
//! `SliceApi`), plus the [`SliceComposer`] reducer that turns a predicate
//! over an unknown-length prefix into a constant-width selector sum.
//!
//! Every byte-valued wire manipulated here keeps its physical (circuit-time
//! constant) length fixed; only the *logical* length, tracked by the
//! `padding` wire, varies with the witness. This lets the RLP encoder and
//! header encoder (`crate::rlp`, `crate::header`) treat e.g. `extra` or a
//! trimmed numeric field uniformly, without branching the circuit shape on
//! a witness value.

use crate::utils::bitmask::ith_bit_bitmask;
use halo2_base::{
    gates::{GateChip, GateInstructions},
    utils::ScalarField,
    AssignedValue, Context,
};

/// A logical byte sequence embedded in a fixed-length physical buffer: a
/// vector of byte-valued wires plus a wire marking the index one past the
/// last meaningful byte (see spec §3).
#[derive(Clone, Debug)]
pub struct PaddingSlice<F: ScalarField> {
    slice: Vec<AssignedValue<F>>,
    padding: AssignedValue<F>,
    is_little_endian: bool,
}

impl<F: ScalarField> PaddingSlice<F> {
    /// Physical length of the slice (a Rust-level constant, not a wire).
    pub fn len(&self) -> usize {
        self.slice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slice.is_empty()
    }

    pub fn slice(&self) -> &[AssignedValue<F>] {
        &self.slice
    }

    pub fn padding(&self) -> AssignedValue<F> {
        self.padding
    }

    pub fn is_little_endian(&self) -> bool {
        self.is_little_endian
    }

    /// Builds a `PaddingSlice` from an already-known `(slice, padding)`
    /// pair, without re-deriving `padding` from the bytes. Used internally
    /// by operations (`Concat`, `Reverse`, ...) that compute `padding`
    /// analytically rather than by scanning.
    pub fn from_parts(
        slice: Vec<AssignedValue<F>>,
        padding: AssignedValue<F>,
        is_little_endian: bool,
    ) -> Self {
        Self {
            slice,
            padding,
            is_little_endian,
        }
    }

    /// Constructs a `PaddingSlice` from a raw fixed-length byte-wire vector
    /// with declared endianness, deriving `padding` by the prefix/suffix
    /// scan of spec §4.1: accumulate an OR of "nonzero seen so far" from
    /// the padding-side end inward, then sum the accumulator. The sum
    /// equals the logical length because the accumulator is 0 exactly at
    /// the trailing (zero) positions and 1 from the first nonzero byte
    /// (inclusive) onward.
    pub fn from_bytes(
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        bytes: Vec<AssignedValue<F>>,
        is_little_endian: bool,
    ) -> Self {
        let n = bytes.len();
        let scan_order: Vec<usize> = if is_little_endian {
            (0..n).rev().collect()
        } else {
            (0..n).collect()
        };
        let zero = ctx.load_zero();
        let mut acc = zero;
        let mut padding = zero;
        for idx in scan_order {
            let is_zero_byte = gate.is_zero(ctx, bytes[idx]);
            let is_nonzero = gate.not(ctx, is_zero_byte);
            acc = gate.or(ctx, acc, is_nonzero);
            padding = gate.add(ctx, padding, acc);
        }
        Self {
            slice: bytes,
            padding,
            is_little_endian,
        }
    }

    /// `AssertIsZero`: asserts every wire of the slice equals the zero
    /// constant, irrespective of `padding`.
    pub fn assert_is_zero(&self, ctx: &mut Context<F>, gate: &GateChip<F>) {
        for byte in &self.slice {
            gate.assert_is_const(ctx, byte, &F::zero());
        }
    }

    /// `AssertIsSame`: asserts the logical contents of `self` and `other`
    /// agree, independent of their physical lengths -- the shorter one is
    /// required to be zero-padded out to the longer one's length. Both
    /// operands must share endianness (logical comparison is meaningless
    /// across mismatched layouts without a `Reverse`).
    pub fn assert_is_same(&self, ctx: &mut Context<F>, gate: &GateChip<F>, other: &Self) {
        assert_eq!(
            self.is_little_endian, other.is_little_endian,
            "AssertIsSame requires matching endianness; normalize with Reverse first"
        );
        let min_len = self.len().min(other.len());
        for i in 0..min_len {
            ctx.constrain_equal(&self.slice[i], &other.slice[i]);
        }
        for extra in &self.slice[min_len..] {
            gate.assert_is_const(ctx, extra, &F::zero());
        }
        for extra in &other.slice[min_len..] {
            gate.assert_is_const(ctx, extra, &F::zero());
        }
    }

    /// `RightShift`: inserts `k` zero wires at the low-index end, shifting
    /// everything else up. Implemented without branching on `k` (which is
    /// itself a wire): for every feasible shift amount, compute the
    /// statically-shifted vector and select it with `k`'s one-hot bitmask
    /// (reusing [`ith_bit_bitmask`], the same selector primitive the
    /// variable-length Keccak gadget uses to pick out its padding word).
    pub fn right_shift(
        &self,
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        k: AssignedValue<F>,
    ) -> Self {
        let n = self.len();
        let selectors = ith_bit_bitmask(ctx, gate, k, n as u64);
        let zero = ctx.load_zero();
        let mut result = vec![zero; n];
        for (shift, selector) in selectors.into_iter().enumerate() {
            for i in 0..n {
                let src = if i >= shift { self.slice[i - shift] } else { zero };
                let term = gate.mul(ctx, src, selector);
                result[i] = gate.add(ctx, result[i], term);
            }
        }
        Self {
            slice: result,
            padding: self.padding,
            is_little_endian: self.is_little_endian,
        }
    }

    /// `LeftShift`: the mirror of [`Self::right_shift`], discarding the
    /// low-index `k` wires and filling zeros from the top.
    pub fn left_shift(
        &self,
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        k: AssignedValue<F>,
    ) -> Self {
        let n = self.len();
        let selectors = ith_bit_bitmask(ctx, gate, k, n as u64);
        let zero = ctx.load_zero();
        let mut result = vec![zero; n];
        for (shift, selector) in selectors.into_iter().enumerate() {
            for i in 0..n {
                let src = if i + shift < n {
                    self.slice[i + shift]
                } else {
                    zero
                };
                let term = gate.mul(ctx, src, selector);
                result[i] = gate.add(ctx, result[i], term);
            }
        }
        Self {
            slice: result,
            padding: self.padding,
            is_little_endian: self.is_little_endian,
        }
    }

    /// `Reverse`: physically reverses the slice, toggles the endianness
    /// flag, and maps `padding -> |slice| - padding`. The logical content
    /// is unchanged -- only the coordinate system describing it flips.
    pub fn reverse(&self, ctx: &mut Context<F>, gate: &GateChip<F>) -> Self {
        let mut reversed = self.slice.clone();
        reversed.reverse();
        let len_const = ctx.load_constant(F::from(self.len() as u64));
        let padding = gate.sub(ctx, len_const, self.padding);
        Self {
            slice: reversed,
            padding,
            is_little_endian: !self.is_little_endian,
        }
    }

    /// Repositions `self`'s logical content to the low-index end, *without*
    /// reversing byte order, retagging the result as little-endian.
    ///
    /// This is deliberately not [`Self::reverse`]: `reverse` flips both the
    /// position *and* the byte order (used e.g. by the ECDSA public-key
    /// binding, which genuinely needs a byte-order flip). `Concat`'s job is
    /// to preserve each operand's logical byte sequence while relocating
    /// it, so normalizing a big-endian operand here is a left-shift by its
    /// own zero-prefix length, re-tagged -- the bytes keep their order.
    pub fn to_left_aligned(&self, ctx: &mut Context<F>, gate: &GateChip<F>) -> Self {
        if self.is_little_endian {
            self.clone()
        } else {
            let len_const = ctx.load_constant(F::from(self.len() as u64));
            let zero_prefix_len = gate.sub(ctx, len_const, self.padding);
            let shifted = self.left_shift(ctx, gate, zero_prefix_len);
            Self {
                slice: shifted.slice,
                padding: self.padding,
                is_little_endian: true,
            }
        }
    }

    /// Returns a copy of `self` zero-extended (on the padding side, which
    /// for a little-endian slice is the high-index end) out to physical
    /// length `new_len >= self.len()`.
    fn extend_little_endian(&self, ctx: &mut Context<F>, new_len: usize) -> Self {
        assert!(self.is_little_endian, "extend_little_endian requires little-endian input");
        assert!(new_len >= self.len());
        let mut slice = self.slice.clone();
        slice.resize(new_len, ctx.load_zero());
        Self {
            slice,
            padding: self.padding,
            is_little_endian: true,
        }
    }

    /// `Concat`: builds the `PaddingSlice` whose logical content is the
    /// concatenation, in order, of the logical contents of `slices`. Every
    /// operand is normalized to little-endian, zero-extended to the output
    /// physical length, right-shifted to begin at its cumulative logical
    /// offset, then summed (safe because, after shifting, non-overlapping
    /// operands occupy disjoint byte ranges). `out_little_endian` selects
    /// the endianness of the result.
    pub fn concat(
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        slices: &[Self],
        out_little_endian: bool,
    ) -> Self {
        let out_len: usize = slices.iter().map(Self::len).sum();
        let zero = ctx.load_zero();
        let mut acc = vec![zero; out_len];
        let mut offset = zero;
        for s in slices {
            let le = s.to_left_aligned(ctx, gate);
            let extended = le.extend_little_endian(ctx, out_len);
            let shifted = extended.right_shift(ctx, gate, offset);
            for i in 0..out_len {
                acc[i] = gate.add(ctx, acc[i], shifted.slice[i]);
            }
            offset = gate.add(ctx, offset, le.padding);
        }
        let result = Self {
            slice: acc,
            padding: offset,
            is_little_endian: true,
        };
        if out_little_endian {
            result
        } else {
            result.reverse(ctx, gate)
        }
    }

    /// `Append`: attaches a fixed-length, zero-padding-free byte-wire
    /// vector `extra` to `self`, on the padding side (logically before,
    /// for a little-endian slice) when `at_padding_side` is set, otherwise
    /// on the content side.
    pub fn append(
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        s: &Self,
        extra: Vec<AssignedValue<F>>,
        at_padding_side: bool,
    ) -> Self {
        let extra_len = ctx.load_constant(F::from(extra.len() as u64));
        let extra_slice = Self {
            slice: extra,
            padding: extra_len,
            is_little_endian: s.is_little_endian,
        };
        let out_le = s.is_little_endian;
        if at_padding_side {
            Self::concat(ctx, gate, &[extra_slice, s.clone()], out_le)
        } else {
            Self::concat(ctx, gate, &[s.clone(), extra_slice], out_le)
        }
    }

    /// `CheckConcat`: the dual of [`Self::concat`] -- asserts that `self`
    /// is a valid concatenation of `slices`, by recomputing the expected
    /// partition boundaries (the running sum of each operand's padding)
    /// and asserting (i) each partition of `self` (left-shifted to the
    /// origin) matches the corresponding operand's logical content, (ii)
    /// the tail past the last partition is zero, and (iii) the total
    /// padding matches.
    pub fn check_concat(&self, ctx: &mut Context<F>, gate: &GateChip<F>, slices: &[Self]) {
        let expected_len: usize = slices.iter().map(Self::len).sum();
        assert_eq!(
            self.len(),
            expected_len,
            "CheckConcat: physical length mismatch is a circuit-shape error"
        );
        let le_self = self.to_left_aligned(ctx, gate);
        let mut offset = ctx.load_zero();
        for s in slices {
            let le = s.to_left_aligned(ctx, gate);
            let extended = le.extend_little_endian(ctx, expected_len);
            // Left-shift `self` to the origin of this partition, then
            // compare its logical content to the operand's own content
            // (also left-aligned, since `extended` only zero-extends at
            // the top).
            let aligned = le_self.left_shift(ctx, gate, offset);
            for i in 0..le.len() {
                ctx.constrain_equal(&aligned.slice[i], &extended.slice[i]);
            }
            offset = gate.add(ctx, offset, le.padding);
        }
        // Tail past the last partition must be zero: `aligned` for the
        // final offset directly reflects `self`'s own trailing padding
        // wire, so this is implied by each operand's own zero-padding
        // invariant plus the sum-of-paddings equality below.
        ctx.constrain_equal(&le_self.padding, &offset);
    }
}

/// A `(variables, isSelected)` pair: one alternative produced by a
/// [`SliceComposer`] generator, exactly one of which is selected for any
/// given witness.
#[derive(Clone, Debug)]
pub struct UndeterminedSlice<F: ScalarField> {
    pub variables: Vec<AssignedValue<F>>,
    pub is_selected: AssignedValue<F>,
}

/// Reduces a predicate over an unknown-length prefix (or other
/// witness-dependent alternative) to a constant-width selector sum.
///
/// Each generator function enumerates the alternatives for one input
/// (e.g. "the RLP length-prefix assuming the string is N bytes long, for
/// every feasible N"), producing a list of [`UndeterminedSlice`]s in which
/// exactly one has `is_selected = 1`. `SliceComposer::process` forms the
/// Cartesian product across generators and accumulates `sum(product(
/// is_selected) * f(chosen variables))`.
///
/// The composer does not itself assert that each generator's selectors are
/// mutually exclusive and exhaustive -- per spec §4.2 this is a proof
/// obligation of the generator's author, not the composer.
pub struct SliceComposer;

impl SliceComposer {
    /// Folds the Cartesian product of `generators` through `f`, returning a
    /// constant-length (`out_len`) wire vector.
    pub fn process<F: ScalarField>(
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        out_len: usize,
        generators: &[Vec<UndeterminedSlice<F>>],
        f: impl Fn(&mut Context<F>, &[&[AssignedValue<F>]]) -> Vec<AssignedValue<F>>,
    ) -> Vec<AssignedValue<F>> {
        let zero = ctx.load_zero();
        let mut acc = vec![zero; out_len];
        let one = ctx.load_constant(F::one());
        Self::recurse(ctx, gate, generators, &mut Vec::new(), one, &f, &mut acc);
        acc
    }

    fn recurse<F: ScalarField>(
        ctx: &mut Context<F>,
        gate: &GateChip<F>,
        generators: &[Vec<UndeterminedSlice<F>>],
        chosen: &mut Vec<Vec<AssignedValue<F>>>,
        selector_so_far: AssignedValue<F>,
        f: &impl Fn(&mut Context<F>, &[&[AssignedValue<F>]]) -> Vec<AssignedValue<F>>,
        acc: &mut [AssignedValue<F>],
    ) {
        match generators.split_first() {
            None => {
                let refs: Vec<&[AssignedValue<F>]> =
                    chosen.iter().map(Vec::as_slice).collect();
                let out = f(ctx, &refs);
                assert_eq!(out.len(), acc.len(), "generator output must be exactly out_len wires");
                for (a, v) in acc.iter_mut().zip(out) {
                    let term = gate.mul(ctx, selector_so_far, v);
                    *a = gate.add(ctx, *a, term);
                }
            }
            Some((alternatives, rest)) => {
                for alt in alternatives {
                    chosen.push(alt.variables.clone());
                    let selector = gate.mul(ctx, selector_so_far, alt.is_selected);
                    Self::recurse(ctx, gate, rest, chosen, selector, f, acc);
                    chosen.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2_base::{
        gates::builder::GateThreadBuilder, halo2_proofs::halo2curves::bn256::Fr,
    };

    fn new_ctx() -> GateThreadBuilder<Fr> {
        GateThreadBuilder::mock()
    }

    #[test]
    fn derives_padding_little_endian() {
        let mut builder = new_ctx();
        let gate = GateChip::default();
        let ctx = builder.main(0);
        let bytes = ctx.assign_witnesses([1u64, 2, 0, 0].map(Fr::from));
        let s = PaddingSlice::from_bytes(ctx, &gate, bytes, true);
        assert_eq!(s.padding().value(), &Fr::from(2u64));
    }

    #[test]
    fn derives_padding_big_endian() {
        let mut builder = new_ctx();
        let gate = GateChip::default();
        let ctx = builder.main(0);
        let bytes = ctx.assign_witnesses([0u64, 0, 1, 2].map(Fr::from));
        let s = PaddingSlice::from_bytes(ctx, &gate, bytes, false);
        assert_eq!(s.padding().value(), &Fr::from(2u64));
    }

    #[test]
    fn all_zero_gives_zero_padding() {
        let mut builder = new_ctx();
        let gate = GateChip::default();
        let ctx = builder.main(0);
        let bytes = ctx.assign_witnesses([0u64, 0, 0, 0].map(Fr::from));
        let s = PaddingSlice::from_bytes(ctx, &gate, bytes, true);
        assert_eq!(s.padding().value(), &Fr::from(0u64));
    }

    #[test]
    fn reverse_round_trips() {
        let mut builder = new_ctx();
        let gate = GateChip::default();
        let ctx = builder.main(0);
        let bytes = ctx.assign_witnesses([1u64, 2, 0, 0].map(Fr::from));
        let s = PaddingSlice::from_bytes(ctx, &gate, bytes, true);
        let rr = s.reverse(ctx, &gate).reverse(ctx, &gate);
        assert_eq!(rr.padding().value(), s.padding().value());
        assert_eq!(rr.is_little_endian(), s.is_little_endian());
        for (a, b) in rr.slice().iter().zip(s.slice()) {
            assert_eq!(a.value(), b.value());
        }
    }

    #[test]
    fn concat_then_check_concat_is_satisfied() {
        let mut builder = new_ctx();
        let gate = GateChip::default();
        let ctx = builder.main(0);
        let a_bytes = ctx.assign_witnesses([1u64, 2, 0, 0].map(Fr::from));
        let a = PaddingSlice::from_bytes(ctx, &gate, a_bytes, true);
        let b_bytes = ctx.assign_witnesses([3u64, 0].map(Fr::from));
        let b = PaddingSlice::from_bytes(ctx, &gate, b_bytes, true);
        let c = PaddingSlice::concat(ctx, &gate, &[a.clone(), b.clone()], true);
        assert_eq!(c.padding().value(), &Fr::from(3u64));
        c.check_concat(ctx, &gate, &[a, b]);
    }
}
