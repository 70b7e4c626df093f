//! Native mirror of [`crate::bls::hash_to_g2`]: the off-circuit
//! `HashToG2` computation the witness adapter (C9) runs to produce both
//! the claimed seal hash and the pair of SSWU sqrt/sign hints the circuit
//! takes as witnesses. Grounded on the same RFC 9380 suite the in-circuit
//! gadget implements, reading the identical constant tables from
//! [`crate::bls::consts`] -- the "native mirrors in-circuit" split the
//! teacher draws between `batch_verify/*/chip.rs` and `batch_verify/*/native.rs`.
//!
//! This module substitutes Keccak-256 for `expand_message_xmd`'s nominal
//! SHA-256, exactly as the circuit-side gadget does, so the two stay in
//! agreement with each other (the only thing that matters: the circuit
//! only ever checks its own map against its own witness hints).

use crate::bls::consts::{BASE_FIELD_MODULUS_HEX, DST, G2_COFACTOR_DEC, G2_ISOGENY, L_BYTES, SSWU_A, SSWU_B, SSWU_Z};
use crate::bls::hash_to_g2::parse_fp_const;
use ethers_core::utils::keccak256;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// An `Fp2 = Fp[u]/(u^2+1)` element, as a pair of base-field residues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fp2Native {
    pub c0: BigUint,
    pub c1: BigUint,
}

impl Fp2Native {
    pub fn new(c0: BigUint, c1: BigUint) -> Self {
        Self { c0, c1 }
    }

    pub fn zero() -> Self {
        Self::new(BigUint::zero(), BigUint::zero())
    }

    pub fn from_hex(value: crate::bls::consts::Fp2Hex, modulus: &BigUint) -> Self {
        Self::new(parse_fp_const(value.0, modulus), parse_fp_const(value.1, modulus))
    }

    fn add(&self, other: &Self, p: &BigUint) -> Self {
        Self::new((&self.c0 + &other.c0) % p, (&self.c1 + &other.c1) % p)
    }

    fn sub(&self, other: &Self, p: &BigUint) -> Self {
        Self::new(
            (p + &self.c0 - &other.c0) % p,
            (p + &self.c1 - &other.c1) % p,
        )
    }

    fn mul(&self, other: &Self, p: &BigUint) -> Self {
        // (a0 + a1 u)(b0 + b1 u) = (a0 b0 - a1 b1) + (a0 b1 + a1 b0) u.
        let a0b0 = &self.c0 * &other.c0 % p;
        let a1b1 = &self.c1 * &other.c1 % p;
        let a0b1 = &self.c0 * &other.c1 % p;
        let a1b0 = &self.c1 * &other.c0 % p;
        let c0 = (p + &a0b0 - &a1b1) % p;
        let c1 = (&a0b1 + &a1b0) % p;
        Self::new(c0, c1)
    }

    fn neg(&self, p: &BigUint) -> Self {
        Self::new(
            if self.c0.is_zero() { BigUint::zero() } else { p - &self.c0 },
            if self.c1.is_zero() { BigUint::zero() } else { p - &self.c1 },
        )
    }

    fn scale(&self, scalar: &BigUint, p: &BigUint) -> Self {
        Self::new(&self.c0 * scalar % p, &self.c1 * scalar % p)
    }

    fn is_zero(&self) -> bool {
        self.c0.is_zero() && self.c1.is_zero()
    }

    /// Fp2 inverse via the conjugate: `1/(a0+a1u) = (a0-a1u) / (a0^2+a1^2)`.
    fn inv(&self, p: &BigUint) -> Self {
        let norm = (&self.c0 * &self.c0 % p + &self.c1 * &self.c1 % p) % p;
        let norm_inv = fp_inv(&norm, p);
        Self::new(
            &self.c0 * &norm_inv % p,
            (if self.c1.is_zero() { BigUint::zero() } else { p - &self.c1 }) * &norm_inv % p,
        )
    }

    /// `Fp2` square root via the complex method (valid since BLS12-381's
    /// base field has `p ≡ 3 (mod 4)`): returns `None` when `self` is a
    /// non-residue.
    fn sqrt(&self, p: &BigUint) -> Option<Self> {
        if self.c1.is_zero() {
            return if let Some(r) = fp_sqrt(&self.c0, p) {
                Some(Self::new(r, BigUint::zero()))
            } else {
                fp_sqrt(&((p - &self.c0) % p), p).map(|r| Self::new(BigUint::zero(), r))
            };
        }
        let alpha = (&self.c0 * &self.c0 % p + &self.c1 * &self.c1 % p) % p;
        let sqrt_alpha = fp_sqrt(&alpha, p)?;
        let two_inv = fp_inv(&BigUint::from(2u64), p);
        let mut delta = (&self.c0 + &sqrt_alpha) % p * &two_inv % p;
        let mut x0 = fp_sqrt(&delta, p);
        if x0.is_none() {
            delta = (p + &self.c0 - &sqrt_alpha) % p * &two_inv % p;
            x0 = fp_sqrt(&delta, p);
        }
        let x0 = x0?;
        let x0_inv = fp_inv(&x0, p);
        let x1 = &self.c1 * &two_inv % p * &x0_inv % p;
        Some(Self::new(x0, x1))
    }
}

fn fp_inv(a: &BigUint, p: &BigUint) -> BigUint {
    a.modpow(&(p - BigUint::from(2u64)), p)
}

/// `Fp` square root for `p ≡ 3 (mod 4)`: `a^((p+1)/4)`, `None` if the
/// result doesn't square back to `a` (i.e. `a` is a non-residue).
fn fp_sqrt(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    if a.is_zero() {
        return Some(BigUint::zero());
    }
    let exp = (p + BigUint::one()) / BigUint::from(4u64);
    let candidate = a.modpow(&exp, p);
    if &candidate * &candidate % p == *a {
        Some(candidate)
    } else {
        None
    }
}

/// A `G2` affine point in native `Fp2` coordinates (never the identity --
/// every point this module produces is a hash output, which RFC 9380
/// guarantees lands off the identity).
#[derive(Clone, Debug)]
pub struct G2Native {
    pub x: Fp2Native,
    pub y: Fp2Native,
}

fn ec_add(a: &G2Native, b: &G2Native, p: &BigUint) -> G2Native {
    let dx = b.x.sub(&a.x, p);
    let dy = b.y.sub(&a.y, p);
    let lambda = dy.mul(&dx.inv(p), p);
    let x3 = lambda.mul(&lambda, p).sub(&a.x, p).sub(&b.x, p);
    let y3 = lambda.mul(&a.x.sub(&x3, p), p).sub(&a.y, p);
    G2Native { x: x3, y: y3 }
}

fn ec_double(a: &G2Native, p: &BigUint) -> G2Native {
    let three = BigUint::from(3u64);
    let two = BigUint::from(2u64);
    let num = a.x.mul(&a.x, p).scale(&three, p);
    let den = a.y.scale(&two, p);
    let lambda = num.mul(&den.inv(p), p);
    let x3 = lambda.mul(&lambda, p).sub(&a.x, p).sub(&a.x, p);
    let y3 = lambda.mul(&a.x.sub(&x3, p), p).sub(&a.y, p);
    G2Native { x: x3, y: y3 }
}

fn bit_decompose_decimal(dec: &str) -> Vec<u8> {
    let mut n = dec.parse::<BigUint>().expect("decimal literal");
    let mut bits = Vec::new();
    let two = BigUint::from(2u64);
    if n.is_zero() {
        return vec![0];
    }
    while !n.is_zero() {
        bits.push((&n % &two).to_string().parse::<u8>().unwrap());
        n /= &two;
    }
    bits.reverse();
    bits
}

fn scalar_multiply(point: &G2Native, scalar_dec: &str, p: &BigUint) -> G2Native {
    let bits = bit_decompose_decimal(scalar_dec);
    let mut acc = point.clone();
    for bit in bits.into_iter().skip(1) {
        acc = ec_double(&acc, p);
        if bit == 1 {
            acc = ec_add(&acc, point, p);
        }
    }
    acc
}

fn horner(coeffs: &[Fp2Native], x: &Fp2Native, p: &BigUint) -> Fp2Native {
    let mut acc = Fp2Native::zero();
    for c in coeffs.iter().rev() {
        acc = acc.mul(x, p).add(c, p);
    }
    acc
}

fn apply_isogeny(p: &BigUint, point: &G2Native) -> G2Native {
    let x_num: Vec<Fp2Native> = G2_ISOGENY.x_num.iter().map(|v| Fp2Native::from_hex(*v, p)).collect();
    let x_den: Vec<Fp2Native> = G2_ISOGENY.x_den.iter().map(|v| Fp2Native::from_hex(*v, p)).collect();
    let y_num: Vec<Fp2Native> = G2_ISOGENY.y_num.iter().map(|v| Fp2Native::from_hex(*v, p)).collect();
    let y_den: Vec<Fp2Native> = G2_ISOGENY.y_den.iter().map(|v| Fp2Native::from_hex(*v, p)).collect();

    let x_num_v = horner(&x_num, &point.x, p);
    let x_den_v = horner(&x_den, &point.x, p);
    let y_num_v = horner(&y_num, &point.x, p);
    let y_den_v = horner(&y_den, &point.x, p);

    let x = x_num_v.mul(&x_den_v.inv(p), p);
    let y = point.y.mul(&y_num_v.mul(&y_den_v.inv(p), p), p);
    G2Native { x, y }
}

/// Native SSWU sqrt/sign hint: the square root the in-circuit map takes on
/// faith, plus which of `gx1`/`gx2` it came from (spec's `is_gx1_square`).
#[derive(Clone, Debug)]
pub struct SswuHintNative {
    pub sqrt_candidate: Fp2Native,
    pub is_gx1_square: bool,
}

/// Native `map_to_curve_sswu` over the isogenous curve `E'`, returning the
/// unmapped `(x, y)` on `E'` plus the sqrt/sign hint the circuit needs to
/// recompute this same point from `u` without an in-circuit sqrt.
fn map_to_curve_sswu(p: &BigUint, u: &Fp2Native) -> (G2Native, SswuHintNative) {
    let z = Fp2Native::from_hex(SSWU_Z, p);
    let a = Fp2Native::from_hex(SSWU_A, p);
    let b = Fp2Native::from_hex(SSWU_B, p);
    let one = Fp2Native::new(BigUint::one(), BigUint::zero());

    let zu2 = z.mul(&u.mul(u, p), p);
    let zu2_sq = zu2.mul(&zu2, p);
    let tv1_sum = zu2_sq.add(&zu2, p);
    let tv1 = tv1_sum.inv(p);

    let x1 = if tv1.is_zero() {
        b.mul(&z.inv(p), p)
    } else {
        one.add(&tv1, p).mul(&b.mul(&a.inv(p), p).neg(p), p)
    };

    let gx1 = x1
        .mul(&x1, p)
        .mul(&x1, p)
        .add(&a.mul(&x1, p), p)
        .add(&b, p);

    let x2 = zu2.mul(&x1, p);
    let gx2 = x2
        .mul(&x2, p)
        .mul(&x2, p)
        .add(&a.mul(&x2, p), p)
        .add(&b, p);

    let (chosen_x, sqrt_candidate, is_gx1_square) = match gx1.sqrt(p) {
        Some(sqrt1) => (x1, sqrt1, true),
        None => {
            let sqrt2 = gx2.sqrt(p).expect("one of gx1, gx2 is always square for SSWU");
            (x2, sqrt2, false)
        }
    };

    let point = G2Native { x: chosen_x, y: sqrt_candidate.clone() };
    let hint = SswuHintNative { sqrt_candidate, is_gx1_square };
    (point, hint)
}

/// `expand_message_xmd`, substituting this crate's Keccak-256 for SHA-256
/// (see module docs), mirroring [`crate::bls::hash_to_g2::expand_message_xmd`].
fn expand_message_xmd(msg: &[u8], dst: &[u8], len_in_bytes: usize) -> Vec<u8> {
    let b_in_bytes = 32usize;
    let ell = (len_in_bytes + b_in_bytes - 1) / b_in_bytes;
    assert!(ell <= 255, "expand_message_xmd: requested length too long");

    let dst_prime: Vec<u8> = dst.iter().copied().chain(std::iter::once(dst.len() as u8)).collect();
    let z_pad = vec![0u8; 64]; // keccak256's block rate substitutes for SHA-256's 64-byte block
    let l_i_b_str = [(len_in_bytes >> 8) as u8, (len_in_bytes & 0xff) as u8];

    let mut msg_prime = Vec::new();
    msg_prime.extend_from_slice(&z_pad);
    msg_prime.extend_from_slice(msg);
    msg_prime.extend_from_slice(&l_i_b_str);
    msg_prime.push(0u8);
    msg_prime.extend_from_slice(&dst_prime);

    let b0 = keccak256(&msg_prime);

    let mut b_prev = {
        let mut input = b0.to_vec();
        input.push(1u8);
        input.extend_from_slice(&dst_prime);
        keccak256(&input)
    };
    let mut out = b_prev.to_vec();
    for i in 2..=ell {
        let mut xored = [0u8; 32];
        for (x, (a, b)) in xored.iter_mut().zip(b0.iter().zip(b_prev.iter())) {
            *x = a ^ b;
        }
        let mut input = xored.to_vec();
        input.push(i as u8);
        input.extend_from_slice(&dst_prime);
        b_prev = keccak256(&input);
        out.extend_from_slice(&b_prev);
    }
    out.truncate(len_in_bytes);
    out
}

fn bytes_to_fp(bytes: &[u8], p: &BigUint) -> BigUint {
    BigUint::from_bytes_be(bytes) % p
}

/// Full native `HashToG2(msg)`, returning the final `G2` point (after
/// isogeny and cofactor clearing) and the pair of SSWU hints the circuit
/// needs to recompute it.
pub fn hash_to_g2_native(msg: &[u8]) -> (G2Native, [SswuHintNative; 2]) {
    let p = BigUint::parse_bytes(
        BASE_FIELD_MODULUS_HEX.trim_start_matches("0x").as_bytes(),
        16,
    )
    .expect("BLS12-381 base field modulus");

    let len_in_bytes = 2 * 2 * L_BYTES;
    let expanded = expand_message_xmd(msg, DST, len_in_bytes);

    let elem_bytes = 2 * L_BYTES;
    let u0 = Fp2Native::new(
        bytes_to_fp(&expanded[0..L_BYTES], &p),
        bytes_to_fp(&expanded[L_BYTES..elem_bytes], &p),
    );
    let u1 = Fp2Native::new(
        bytes_to_fp(&expanded[elem_bytes..elem_bytes + L_BYTES], &p),
        bytes_to_fp(&expanded[elem_bytes + L_BYTES..2 * elem_bytes], &p),
    );

    let (p0, hint0) = map_to_curve_sswu(&p, &u0);
    let (p1, hint1) = map_to_curve_sswu(&p, &u1);
    let summed = ec_add(&p0, &p1, &p);
    let on_e2 = apply_isogeny(&p, &summed);
    let cleared = scalar_multiply(&on_e2, G2_COFACTOR_DEC, &p);

    (cleared, [hint0, hint1])
}
