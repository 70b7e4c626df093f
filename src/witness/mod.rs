//! Witness adapter (C9): turns a native, off-circuit header/script
//! representation into the wire types the rest of this crate assigns
//! in-circuit -- [`header::HeaderParameters`], [`update::UpdateWitness`] and
//! [`ecdsa_multisig::MultisigWitness`].
//!
//! Grounded on `examples/original_source/neox/circuit/helper.go`'s
//! `GetHeaderParamter`/`encodeHeader`/`encodeSigHeader`: that function
//! flattens a `go-ethereum` header into fixed-width `frontend.Variable`
//! byte arrays the same way [`NativeHeader::pad`] does here, and its two
//! RLP-encoding branches are mirrored by [`encode_header_native`].
//!
//! Witness-dependent cryptographic failures (a forged signature, a
//! mismatched hash) are never reported here -- an adapter fed bad data
//! just produces an unsatisfiable circuit. Only the circuit-construction-
//! time shape checks spec'd by [`crate::HeaderCircuitError`] are this
//! module's concern, the same split `header::HeaderParameters::assert_widths`
//! draws between shape and witness errors.

pub mod hash_to_curve_native;
pub mod rlp_native;

use crate::{
    bls::{
        self,
        consts::BASE_FIELD_MODULUS_HEX,
        hash_to_g2::{SswuHint, G2Point},
        G1Point,
    },
    ecdsa_multisig::{self, AssignedPubKey, AssignedSignature, MultisigWitness},
    header::{self, HeaderParameters},
    update::UpdateWitness,
    EccPrimeField, HeaderCircuitError,
};
use halo2_base::{AssignedValue, Context};
use halo2_ecc::{
    bigint::ProperCrtUint,
    bls12_381::{Fp2Chip, FpChip as Bls12FpChip},
    ecc::EcPoint,
    fields::{vector::FieldVector, FieldChip},
    secp256k1::FpChip as Secp256k1FpChip,
};
use hash_to_curve_native::{Fp2Native, G2Native, SswuHintNative};
use num_bigint::BigUint;

/// Plain-Rust mirror of [`HeaderParameters`]: each field stored at its
/// *logical* length. Numeric fields may be shorter than their physical
/// width (leading zeros are implicit); identifier/hash fields must already
/// be at their full declared width. [`NativeHeader::pad`] reconciles both
/// down to the physical byte vectors the circuit wires carry.
#[derive(Clone, Debug, Default)]
pub struct NativeHeader {
    pub parent_hash: Vec<u8>,
    pub uncle_hash: Vec<u8>,
    pub coinbase: Vec<u8>,
    pub root: Vec<u8>,
    pub tx_hash: Vec<u8>,
    pub receipt_hash: Vec<u8>,
    pub bloom: Vec<u8>,
    pub difficulty: Vec<u8>,
    pub number: Vec<u8>,
    pub gas_limit: Vec<u8>,
    pub gas_used: Vec<u8>,
    pub time: Vec<u8>,
    /// Logical `extra` content (e.g. `[version, scheme, ..commitment, ..pubkey,
    /// ..signature]` for threshold mode); right-padded to
    /// [`header::EXTRA_MAX_LEN`] by [`NativeHeader::pad`], matching the
    /// front-packed layout [`header::hashable_extra`] masks against.
    pub extra: Vec<u8>,
    pub mix_digest: Vec<u8>,
    pub nonce: Vec<u8>,
    pub base_fee: Vec<u8>,
    pub withdrawals_hash: Vec<u8>,
}

/// A [`NativeHeader`] with every field reconciled to its declared physical
/// width, ready to either assign into wires or feed a native RLP encoder.
struct PaddedHeader {
    parent_hash: Vec<u8>,
    uncle_hash: Vec<u8>,
    coinbase: Vec<u8>,
    root: Vec<u8>,
    tx_hash: Vec<u8>,
    receipt_hash: Vec<u8>,
    bloom: Vec<u8>,
    difficulty: Vec<u8>,
    number: Vec<u8>,
    gas_limit: Vec<u8>,
    gas_used: Vec<u8>,
    time: Vec<u8>,
    extra: Vec<u8>,
    mix_digest: Vec<u8>,
    nonce: Vec<u8>,
    base_fee: Vec<u8>,
    withdrawals_hash: Vec<u8>,
}

/// Zero-pads `bytes` on the low-index side up to `width` -- the layout
/// numeric header fields use, mirroring `helper.go`'s
/// `binary.Write(..., binary.BigEndian, ...)` into a fixed-size array.
fn pad_be_bytes(field: &'static str, bytes: &[u8], width: usize) -> Result<Vec<u8>, HeaderCircuitError> {
    if bytes.len() > width {
        return Err(HeaderCircuitError::FieldWidthMismatch { field, expected: width, got: bytes.len() });
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}

/// Zero-pads `bytes` on the high-index side up to `width` -- the layout
/// `extra` uses, since [`header::hashable_extra`] masks a *prefix* of it.
fn pad_right_bytes(field: &'static str, bytes: &[u8], width: usize) -> Result<Vec<u8>, HeaderCircuitError> {
    if bytes.len() > width {
        return Err(HeaderCircuitError::FieldWidthMismatch { field, expected: width, got: bytes.len() });
    }
    let mut out = bytes.to_vec();
    out.resize(width, 0);
    Ok(out)
}

/// Asserts `bytes` is already exactly `width` long -- identifier/hash
/// fields carry no implicit padding.
fn fixed_bytes(field: &'static str, bytes: &[u8], width: usize) -> Result<Vec<u8>, HeaderCircuitError> {
    if bytes.len() != width {
        return Err(HeaderCircuitError::FieldWidthMismatch { field, expected: width, got: bytes.len() });
    }
    Ok(bytes.to_vec())
}

impl NativeHeader {
    fn pad(&self) -> Result<PaddedHeader, HeaderCircuitError> {
        Ok(PaddedHeader {
            parent_hash: fixed_bytes("parent_hash", &self.parent_hash, header::PARENT_HASH_LEN)?,
            uncle_hash: fixed_bytes("uncle_hash", &self.uncle_hash, header::UNCLE_HASH_LEN)?,
            coinbase: fixed_bytes("coinbase", &self.coinbase, header::COINBASE_LEN)?,
            root: fixed_bytes("root", &self.root, header::ROOT_LEN)?,
            tx_hash: fixed_bytes("tx_hash", &self.tx_hash, header::TX_HASH_LEN)?,
            receipt_hash: fixed_bytes("receipt_hash", &self.receipt_hash, header::RECEIPT_HASH_LEN)?,
            bloom: fixed_bytes("bloom", &self.bloom, header::BLOOM_LEN)?,
            difficulty: pad_be_bytes("difficulty", &self.difficulty, header::DIFFICULTY_MAX_LEN)?,
            number: pad_be_bytes("number", &self.number, header::NUMBER_LEN)?,
            gas_limit: pad_be_bytes("gas_limit", &self.gas_limit, header::GAS_LIMIT_LEN)?,
            gas_used: pad_be_bytes("gas_used", &self.gas_used, header::GAS_USED_LEN)?,
            time: pad_be_bytes("time", &self.time, header::TIME_LEN)?,
            extra: pad_right_bytes("extra", &self.extra, header::EXTRA_MAX_LEN)?,
            mix_digest: fixed_bytes("mix_digest", &self.mix_digest, header::MIX_DIGEST_LEN)?,
            nonce: fixed_bytes("nonce", &self.nonce, header::NONCE_LEN)?,
            base_fee: pad_be_bytes("base_fee", &self.base_fee, header::BASE_FEE_MAX_LEN)?,
            withdrawals_hash: fixed_bytes(
                "withdrawals_hash",
                &self.withdrawals_hash,
                header::WITHDRAWALS_HASH_LEN,
            )?,
        })
    }
}

/// Assigns a [`NativeHeader`] into the wires [`header::encode_header`] and
/// [`update::assert_header_update`] consume.
pub fn assign_header_parameters<F: EccPrimeField>(
    ctx: &mut Context<F>,
    native: &NativeHeader,
) -> Result<HeaderParameters<F>, HeaderCircuitError> {
    let padded = native.pad()?;
    let load = |ctx: &mut Context<F>, bytes: &[u8]| -> Vec<AssignedValue<F>> {
        bytes.iter().map(|&b| ctx.load_witness(F::from(b as u64))).collect()
    };
    let params = HeaderParameters {
        parent_hash: load(ctx, &padded.parent_hash),
        uncle_hash: load(ctx, &padded.uncle_hash),
        coinbase: load(ctx, &padded.coinbase),
        root: load(ctx, &padded.root),
        tx_hash: load(ctx, &padded.tx_hash),
        receipt_hash: load(ctx, &padded.receipt_hash),
        bloom: load(ctx, &padded.bloom),
        difficulty: load(ctx, &padded.difficulty),
        number: load(ctx, &padded.number),
        gas_limit: load(ctx, &padded.gas_limit),
        gas_used: load(ctx, &padded.gas_used),
        time: load(ctx, &padded.time),
        extra: load(ctx, &padded.extra),
        mix_digest: load(ctx, &padded.mix_digest),
        nonce: load(ctx, &padded.nonce),
        base_fee: load(ctx, &padded.base_fee),
        withdrawals_hash: load(ctx, &padded.withdrawals_hash),
    };
    params.assert_widths();
    Ok(params)
}

/// Extracts the hashable prefix of a (physically padded) `extra` field,
/// the native mirror of [`header::hashable_extra`]'s masking.
fn hashable_extra_native(padded_extra: &[u8]) -> Result<Vec<u8>, HeaderCircuitError> {
    match padded_extra.first().copied() {
        Some(v) if v as u64 == header::EXTRA_V0 => {
            Ok(padded_extra[..header::HASHABLE_EXTRA_V0_LEN].to_vec())
        }
        Some(v) if v as u64 == header::EXTRA_V1 || v as u64 == header::EXTRA_V2 => {
            Ok(padded_extra[..header::HASHABLE_EXTRA_V1_LEN].to_vec())
        }
        Some(v) => Err(HeaderCircuitError::UnsupportedExtraVersion(v)),
        None => Err(HeaderCircuitError::MalformedHeader("empty extra field".to_string())),
    }
}

/// Native mirror of [`header::encode_header`]: the exact byte string the
/// in-circuit encoder produces for `header`, in the same mode. Used to
/// precompute the linkage keccak preimage (`rlp_full(parent)`) and the
/// `hash_to_g2` message (`rlp_seal(current)`) off-circuit.
pub fn encode_header_native(header: &NativeHeader, seal_mode: bool) -> Result<Vec<u8>, HeaderCircuitError> {
    let padded = header.pad()?;
    let extra_encoded = if seal_mode {
        rlp_native::encode_string(&hashable_extra_native(&padded.extra)?)
    } else {
        rlp_native::encode_string(&padded.extra)
    };

    let members = [
        rlp_native::encode_string(&padded.parent_hash),
        rlp_native::encode_string(&padded.uncle_hash),
        rlp_native::encode_string(&padded.coinbase),
        rlp_native::encode_string(&padded.root),
        rlp_native::encode_string(&padded.tx_hash),
        rlp_native::encode_string(&padded.receipt_hash),
        rlp_native::encode_string(&padded.bloom),
        rlp_native::encode_numeric_field(&padded.difficulty),
        rlp_native::encode_numeric_field(&padded.number),
        rlp_native::encode_numeric_field(&padded.gas_limit),
        rlp_native::encode_numeric_field(&padded.gas_used),
        rlp_native::encode_numeric_field(&padded.time),
        extra_encoded,
        rlp_native::encode_string(&padded.mix_digest),
        rlp_native::encode_string(&padded.nonce),
        rlp_native::encode_numeric_field(&padded.base_fee),
        rlp_native::encode_string(&padded.withdrawals_hash),
    ];
    let payload: Vec<u8> = members.concat();
    Ok(rlp_native::encode_list(&payload))
}

/// Modular square root for a field whose modulus is `3 (mod 4)` (both
/// secp256k1's and BLS12-381's base fields qualify): `sqrt(a) = a^((p+1)/4)`.
fn sqrt_mod_p3mod4(a: &BigUint, p: &BigUint) -> BigUint {
    let exp = (p + BigUint::from(1u64)) / BigUint::from(4u64);
    a.modpow(&exp, p)
}

fn secp256k1_base_field_modulus() -> BigUint {
    BigUint::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
        16,
    )
    .expect("secp256k1 base field modulus")
}

fn bls12_381_base_field_modulus() -> BigUint {
    BigUint::parse_bytes(BASE_FIELD_MODULUS_HEX.trim_start_matches("0x").as_bytes(), 16)
        .expect("bls12-381 base field modulus")
}

/// Decompresses a 33-byte compressed secp256k1 public key (`0x02`/`0x03`
/// prefix plus a big-endian `x`) into affine `(x, y)`, the off-circuit half
/// of [`ecdsa_multisig::Secp256k1MultisigChip`]'s `bind_public_keys` check.
pub fn decompress_secp256k1_point(compressed: &[u8]) -> Result<(BigUint, BigUint), HeaderCircuitError> {
    if compressed.len() != ecdsa_multisig::PUBLIC_KEY_LEN {
        return Err(HeaderCircuitError::MalformedHeader(format!(
            "compressed secp256k1 key must be {} bytes, got {}",
            ecdsa_multisig::PUBLIC_KEY_LEN,
            compressed.len()
        )));
    }
    let parity = compressed[0];
    if parity != 2 && parity != 3 {
        return Err(HeaderCircuitError::MalformedHeader(format!(
            "compressed secp256k1 key has invalid prefix {parity:#x}"
        )));
    }
    let p = secp256k1_base_field_modulus();
    let x = BigUint::from_bytes_be(&compressed[1..]);
    let rhs = (&x * &x * &x + BigUint::from(7u64)) % &p;
    let y = sqrt_mod_p3mod4(&rhs, &p);
    let y_is_odd = &y % BigUint::from(2u64) == BigUint::from(1u64);
    let want_odd = parity == 3;
    let y = if y_is_odd == want_odd { y } else { &p - &y };
    Ok((x, y))
}

/// Decompresses a 48-byte ZCash-style compressed BLS12-381 `G1` point
/// (`y^2 = x^3 + 4`) into affine `(x, y)`, the off-circuit half of
/// [`bls::bind_g1_pubkey_compressed`]'s flag/coordinate binding check.
pub fn decompress_bls12_381_g1(compressed: &[u8]) -> Result<(BigUint, BigUint), HeaderCircuitError> {
    if compressed.len() != 48 {
        return Err(HeaderCircuitError::MalformedHeader(format!(
            "compressed BLS12-381 G1 point must be 48 bytes, got {}",
            compressed.len()
        )));
    }
    let compression_flag = compressed[0] & 0x80 != 0;
    let infinity_flag = compressed[0] & 0x40 != 0;
    let sign_flag = compressed[0] & 0x20 != 0;
    if !compression_flag || infinity_flag {
        return Err(HeaderCircuitError::MalformedHeader(
            "expected a compressed, non-infinity BLS12-381 G1 point".to_string(),
        ));
    }
    let mut x_bytes = compressed.to_vec();
    x_bytes[0] &= 0x1f;
    let p = bls12_381_base_field_modulus();
    let x = BigUint::from_bytes_be(&x_bytes);
    let rhs = (&x * &x * &x + BigUint::from(4u64)) % &p;
    let y = sqrt_mod_p3mod4(&rhs, &p);
    let y_is_lex_largest = y > &p - &y;
    let y = if y_is_lex_largest == sign_flag { y } else { &p - &y };
    Ok((x, y))
}

fn assign_g1_point<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp_chip: &Bls12FpChip<F>,
    compressed: &[u8],
) -> Result<G1Point<F>, HeaderCircuitError> {
    let (x, y) = decompress_bls12_381_g1(compressed)?;
    let x = fp_chip.load_private(ctx, x);
    let y = fp_chip.load_private(ctx, y);
    Ok(EcPoint::new(x, y))
}

fn assign_fp2<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp2_chip: &Fp2Chip<F>,
    value: &Fp2Native,
) -> FieldVector<ProperCrtUint<F>> {
    let c0 = fp2_chip.fp_chip().load_private(ctx, value.c0.clone());
    let c1 = fp2_chip.fp_chip().load_private(ctx, value.c1.clone());
    FieldVector(vec![c0, c1])
}

fn assign_g2_point<F: EccPrimeField>(ctx: &mut Context<F>, fp2_chip: &Fp2Chip<F>, value: &G2Native) -> G2Point<F> {
    let x = assign_fp2(ctx, fp2_chip, &value.x);
    let y = assign_fp2(ctx, fp2_chip, &value.y);
    EcPoint::new(x, y)
}

fn assign_sswu_hint<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp2_chip: &Fp2Chip<F>,
    hint: &SswuHintNative,
) -> SswuHint<F> {
    let sqrt_candidate = assign_fp2(ctx, fp2_chip, &hint.sqrt_candidate);
    let is_gx1_square = ctx.load_witness(F::from(hint.is_gx1_square as u64));
    SswuHint { sqrt_candidate, is_gx1_square }
}

/// Everything [`assign_update_witness`] needs beyond the two native
/// headers: the BLS threshold public key (as the same 48-byte compressed
/// wire encoding embedded in `current.extra[34..82]`) and the claimed
/// signature, as native affine `G2` coordinates. The seal hash and its
/// `hash_to_g2` hints are *derived*, not supplied, by
/// [`hash_to_curve_native::hash_to_g2_native`] -- see spec §4.8 step 6.
pub struct NativeUpdateInput {
    pub parent: NativeHeader,
    pub current: NativeHeader,
    pub public_key_compressed: Vec<u8>,
    pub signature: G2Native,
}

/// Builds an [`UpdateWitness`] from native data: assigns both headers,
/// decompresses and assigns the public key, recomputes `hash_to_g2` over
/// `current`'s seal-mode RLP (deriving the claimed hash and its SSWU
/// hints), and assigns the supplied signature point.
pub fn assign_update_witness<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp_chip: &Bls12FpChip<F>,
    fp2_chip: &Fp2Chip<F>,
    native: &NativeUpdateInput,
) -> Result<UpdateWitness<F>, HeaderCircuitError> {
    let parent = assign_header_parameters(ctx, &native.parent)?;
    let current = assign_header_parameters(ctx, &native.current)?;
    let public_key = assign_g1_point(ctx, fp_chip, &native.public_key_compressed)?;

    let seal_rlp = encode_header_native(&native.current, true)?;
    let (hash_native, hints_native) = hash_to_curve_native::hash_to_g2_native(&seal_rlp);
    let hash = assign_g2_point(ctx, fp2_chip, &hash_native);
    let signature = assign_g2_point(ctx, fp2_chip, &native.signature);
    let sswu_hints = [
        assign_sswu_hint(ctx, fp2_chip, &hints_native[0]),
        assign_sswu_hint(ctx, fp2_chip, &hints_native[1]),
    ];

    Ok(UpdateWitness { parent, current, public_key, hash, signature, sswu_hints })
}

/// Everything [`assign_multisig_witness`] needs: the two raw scripts, the
/// seven compressed public keys in verification-script order, the five
/// `(r, s)` signatures and message hashes, the five mapping-rule indices
/// (each `< NUM_KEYS`), and the little-endian interop id.
pub struct NativeMultisigInput {
    pub verification_script: Vec<u8>,
    pub invocation_script: Vec<u8>,
    pub pub_keys_compressed: Vec<Vec<u8>>,
    pub sigs: Vec<(Vec<u8>, Vec<u8>)>,
    pub data: Vec<Vec<u8>>,
    pub mapping_rules: Vec<u8>,
    pub interop_id: [u8; 4],
}

fn assign_secp256k1_pub_key<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp_chip: &Secp256k1FpChip<F>,
    compressed: &[u8],
) -> Result<AssignedPubKey<F>, HeaderCircuitError> {
    let (x, y) = decompress_secp256k1_point(compressed)?;
    let x = fp_chip.load_private(ctx, x);
    let y = fp_chip.load_private(ctx, y);
    Ok(EcPoint::new(x, y))
}

/// Builds a [`MultisigWitness`] from native script/key/signature data,
/// decompressing each of the seven public keys and assigning the emulated
/// secp256k1 witnesses [`ecdsa_multisig::Secp256k1MultisigChip::verify`]
/// checks structurally and cryptographically.
pub fn assign_multisig_witness<F: EccPrimeField>(
    ctx: &mut Context<F>,
    fp_chip: &Secp256k1FpChip<F>,
    native: &NativeMultisigInput,
) -> Result<MultisigWitness<F>, HeaderCircuitError> {
    if native.pub_keys_compressed.len() != ecdsa_multisig::NUM_KEYS {
        return Err(HeaderCircuitError::MalformedHeader(format!(
            "expected {} public keys, got {}",
            ecdsa_multisig::NUM_KEYS,
            native.pub_keys_compressed.len()
        )));
    }
    if native.sigs.len() != ecdsa_multisig::NUM_SIGS
        || native.data.len() != ecdsa_multisig::NUM_SIGS
        || native.mapping_rules.len() != ecdsa_multisig::NUM_SIGS
    {
        return Err(HeaderCircuitError::MalformedHeader(format!(
            "expected {} signatures/hashes/mapping rules",
            ecdsa_multisig::NUM_SIGS
        )));
    }

    let verification_script = native
        .verification_script
        .iter()
        .map(|&b| ctx.load_witness(F::from(b as u64)))
        .collect();
    let invocation_script = native
        .invocation_script
        .iter()
        .map(|&b| ctx.load_witness(F::from(b as u64)))
        .collect();

    let pub_keys = native
        .pub_keys_compressed
        .iter()
        .map(|compressed| assign_secp256k1_pub_key(ctx, fp_chip, compressed))
        .collect::<Result<Vec<_>, _>>()?;

    let sigs: Vec<AssignedSignature<F>> = native
        .sigs
        .iter()
        .map(|(r, s)| {
            let r = fp_chip.load_private(ctx, BigUint::from_bytes_be(r));
            let s = fp_chip.load_private(ctx, BigUint::from_bytes_be(s));
            (r, s)
        })
        .collect();

    let data = native
        .data
        .iter()
        .map(|d| fp_chip.load_private(ctx, BigUint::from_bytes_be(d)))
        .collect();

    let mapping_rules = native
        .mapping_rules
        .iter()
        .map(|&idx| -> [AssignedValue<F>; ecdsa_multisig::MAPPING_RULE_BITS] {
            std::array::from_fn(|i| {
                let bit = (idx >> (ecdsa_multisig::MAPPING_RULE_BITS - 1 - i)) & 1;
                ctx.load_witness(F::from(bit as u64))
            })
        })
        .collect();

    let interop_id = native.interop_id.map(|b| ctx.load_witness(F::from(b as u64)));

    Ok(MultisigWitness {
        verification_script,
        invocation_script,
        pub_keys,
        sigs,
        data,
        mapping_rules,
        interop_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_native_header(extra: Vec<u8>) -> NativeHeader {
        NativeHeader {
            parent_hash: vec![0u8; header::PARENT_HASH_LEN],
            uncle_hash: vec![0u8; header::UNCLE_HASH_LEN],
            coinbase: vec![0u8; header::COINBASE_LEN],
            root: vec![0u8; header::ROOT_LEN],
            tx_hash: vec![0u8; header::TX_HASH_LEN],
            receipt_hash: vec![0u8; header::RECEIPT_HASH_LEN],
            bloom: vec![0u8; header::BLOOM_LEN],
            difficulty: vec![0x02],
            number: vec![0x29, 0x70, 0xd9],
            gas_limit: vec![0x1c, 0x9c, 0x38],
            gas_used: vec![0x01],
            time: vec![0x68, 0x0b, 0x3b, 0x51],
            extra,
            mix_digest: vec![0u8; header::MIX_DIGEST_LEN],
            nonce: vec![0u8; header::NONCE_LEN],
            base_fee: vec![0x07],
            withdrawals_hash: vec![0u8; header::WITHDRAWALS_HASH_LEN],
        }
    }

    #[test]
    fn pad_rejects_oversized_numeric_field() {
        let mut native = sample_native_header(vec![0x01]);
        native.number = vec![0u8; header::NUMBER_LEN + 1];
        assert!(native.pad().is_err());
    }

    #[test]
    fn pad_rejects_wrong_width_identifier_field() {
        let mut native = sample_native_header(vec![0x01]);
        native.parent_hash = vec![0u8; header::PARENT_HASH_LEN - 1];
        assert!(native.pad().is_err());
    }

    #[test]
    fn hashable_extra_native_matches_v1_length() {
        let mut extra = vec![0x01, 0x01];
        extra.extend_from_slice(&[0u8; 32]);
        extra.resize(header::EXTRA_MAX_LEN, 0);
        let hashable = hashable_extra_native(&extra).unwrap();
        assert_eq!(hashable.len(), header::HASHABLE_EXTRA_V1_LEN);
    }

    #[test]
    fn hashable_extra_native_rejects_unknown_version() {
        let mut extra = vec![0x09];
        extra.resize(header::EXTRA_MAX_LEN, 0);
        assert!(hashable_extra_native(&extra).is_err());
    }

    #[test]
    fn encode_header_native_seal_mode_truncates_extra() {
        let mut extra = vec![0x01, 0x01];
        extra.extend_from_slice(&[0xAB; 32]);
        extra.extend_from_slice(&[0xCD; 48]);
        extra.extend_from_slice(&[0xEF; 96]);
        let header = sample_native_header(extra);
        let seal_rlp = encode_header_native(&header, true).unwrap();
        let full_rlp = encode_header_native(&header, false).unwrap();
        assert_ne!(seal_rlp, full_rlp);
        assert!(seal_rlp.len() < full_rlp.len());
    }

    #[test]
    fn secp256k1_decompression_round_trips_parity() {
        // The generator point `G`, compressed with an even-`y` prefix.
        let gx = BigUint::parse_bytes(
            b"79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798",
            16,
        )
        .unwrap();
        let mut compressed = vec![0x02];
        compressed.extend_from_slice(&gx.to_bytes_be());
        let (x, y) = decompress_secp256k1_point(&compressed).unwrap();
        assert_eq!(x, gx);
        assert_eq!(&y % BigUint::from(2u64), BigUint::from(0u64));
    }

    #[test]
    fn secp256k1_decompression_rejects_bad_prefix() {
        let mut compressed = vec![0x04];
        compressed.extend_from_slice(&[0u8; 32]);
        assert!(decompress_secp256k1_point(&compressed).is_err());
    }

    #[test]
    fn bls_g1_decompression_rejects_wrong_length() {
        assert!(decompress_bls12_381_g1(&[0u8; 40]).is_err());
    }
}
