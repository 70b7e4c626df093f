use serde::{Deserialize, Serialize};
use std::fmt;

// For simplicity, we use this trait even in situations
// where `halo2_base::utils::ScalarField` would suffice.
// (It extends that trait)
pub use halo2_ecc::fields::PrimeField as EccPrimeField;

pub mod bls;
pub mod ecdsa_multisig;
pub mod header;
pub mod keccak;
pub mod rlp;
pub mod slice;
pub mod update;
pub mod utils;
pub mod witness;

const DEFAULT_NUM_LIMBS: usize = 3;

const DEFAULT_LIMB_BITS: usize = 88;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
/// Configuration parameters for a axiom-halo2 circuit (where degree is
/// specified, and numbers of columns are computed).
pub struct CircuitConfig {
    /// Columns have length `2^degree_bits`.  Commonly referred to as `k`.
    pub degree_bits: u32,
    /// Lookup tables have length `2^lookup_bits`
    pub lookup_bits: usize,
}

impl fmt::Display for CircuitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Degree bits: {}", self.degree_bits)?;
        writeln!(f, "Lookup bits: {}", self.lookup_bits)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
/// [`CircuitConfig`] extended with the CRT limb configuration shared by the
/// emulated-field gadgets (secp256k1 for the multisig circuit, BLS12-381
/// for the header-update circuit).
pub struct CircuitWithLimbsConfig {
    /// Columns have length `2^degree_bits`.  Commonly referred to as `k`.
    pub degree_bits: u32,
    /// Lookup tables have length `2^lookup_bits`
    pub lookup_bits: usize,
    /// Size of limbs for CRT arithmetic
    pub limb_bits: usize,
    /// Number of limbs for CRT arithmetic
    pub num_limbs: usize,
}

impl CircuitWithLimbsConfig {
    /// Initialize using default values, given a log-2 degree `k`.  Lookup
    /// bits are set to `k - 1` and the limb configuration uses
    /// DEFAULT_LIMB_BITS and DEFAULT_NUM_LIMBS.
    pub const fn from_degree_bits(k: u32) -> Self {
        Self {
            degree_bits: k,
            lookup_bits: (k - 1) as usize,
            limb_bits: DEFAULT_LIMB_BITS,
            num_limbs: DEFAULT_NUM_LIMBS,
        }
    }
}

impl fmt::Display for CircuitWithLimbsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Degree bits: {}", self.degree_bits)?;
        writeln!(f, "Lookup bits: {}", self.lookup_bits)?;
        writeln!(f, "Limb bits: {}", self.limb_bits)?;
        writeln!(f, "Num limbs: {}", self.num_limbs)
    }
}

pub use utils::circuit_config::HeaderCircuitConfig;

/// Errors surfaced at circuit-*construction* time: a length mismatch
/// between a header-parameters field and its declared physical width, or
/// an extra-field version byte the state machine does not recognize.
/// Witness-dependent failures are never represented here -- every
/// in-circuit predicate is an unconditional assertion that simply fails to
/// be satisfied; only shape errors at the native/off-circuit boundary are
/// `Result`-returning, the same split the teacher draws between
/// `VerificationKey`/`Proof` well-formedness checks and in-circuit gates.
#[derive(Clone, Debug, thiserror::Error)]
pub enum HeaderCircuitError {
    #[error("field `{field}` has physical width {got}, expected {expected}")]
    FieldWidthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("extra-field version byte {0:#x} is not a supported version")]
    UnsupportedExtraVersion(u8),
    #[error("malformed header: {0}")]
    MalformedHeader(String),
}
