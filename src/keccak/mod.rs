//! Keccak-256 gadget.
//!
//! Code derived from [axiom-eth](https://github.com/axiom-crypto/axiom-eth).
//! Licensed under the MIT License.
//!
//! The header-update predicate hashes several variable-length byte strings
//! (the seal fields, the RLP-encoded header) to build the block hash it
//! checks signatures against. [`KeccakChip`] accumulates these queries
//! in-circuit and assigns them into a single shared Keccak-f region once,
//! at the end of the enclosing circuit's own `synthesize` -- there is no
//! separate, recursively-verified Keccak sub-circuit here, since the
//! predicate this crate proves is one monolithic circuit rather than an
//! aggregation pipeline.
//!
//! [`Keccak256Circuit`] is a thin, standalone wrapper around the chip, used
//! only to MockProve the gadget in isolation; the real header-update circuit
//! embeds [`KeccakChip`] directly alongside its own gates.

use chip::{assign_prover, KeccakChip};
use core::cell::RefCell;
use halo2_base::{
    gates::{
        builder::{
            FlexGateConfigParams, GateThreadBuilder, MultiPhaseThreadBreakPoints,
        },
        range::{RangeChip, RangeConfig, RangeStrategy},
    },
    halo2_proofs::{
        circuit::{Layouter, SimpleFloorPlanner},
        plonk::{Circuit, Column, ConstraintSystem, Error, Instance},
    },
    AssignedValue, SKIP_FIRST_PASS,
};
use serde::{Deserialize, Serialize};
use std::env::{set_var, var};
use zkevm_keccak::{util::eth_types::Field, KeccakConfig as KeccakBaseConfig};

pub mod chip;
pub mod utils;
pub mod variable;

/// Bits of the lookup table used by the range chip embedded alongside Keccak.
pub const KECCAK_LOOKUP_BITS: usize = 8;

/// Number of bytes in a Keccak-256 digest.
pub const KECCAK_OUTPUT_BYTES: usize = 32;

/// Max number of Keccak rows per round.
///
/// # Note
///
/// Empirically more than 50 rows per round makes the rotation offsets too large.
pub const MAX_KECCAK_ROWS_PER_ROUND: u32 = 50;

/// Gate configuration needed to reconstruct a circuit's `Config` from
/// `Circuit::configure`, which is not given access to `self`.
///
/// Keygen determines `flex_gate_config_params`/`rows_per_round` once, ahead
/// of time; this struct is threaded through the environment so a later
/// `configure` call (which only sees `&mut ConstraintSystem`) can reproduce
/// the same column layout.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct KeccakGateConfig {
    /// Number of advice/lookup/fixed columns for the base gate.
    pub flex_gate_config_params: FlexGateConfigParams,
    /// Keccak rows allocated per round of the permutation.
    pub rows_per_round: u32,
    /// Lookup bits used by the shared range chip.
    pub lookup_bits: usize,
}

impl KeccakGateConfig {
    /// Number of advice columns used by the base (non-lookup) gate, across
    /// phases.
    pub fn num_flex_cols(&self) -> usize {
        self.flex_gate_config_params
            .num_advice_per_phase
            .iter()
            .sum()
    }
}

/// Configuration of [`Keccak256Circuit`]: a shared range chip, the zkEVM
/// packed-multi Keccak-f permutation columns, and an instance column to
/// expose the digest.
#[derive(Clone, Debug)]
pub struct KeccakCircuitConfig<F: Field> {
    /// Range chip configuration shared with the base gate.
    pub range: RangeConfig<F>,
    /// zkEVM packed-multi Keccak-f permutation configuration.
    pub keccak: KeccakBaseConfig<F>,
    /// Instance column used to expose the digest bytes.
    pub instance: Column<Instance>,
}

impl<F: Field> KeccakCircuitConfig<F> {
    pub fn configure(
        meta: &mut ConstraintSystem<F>,
        degree_bits: u32,
        params: &KeccakGateConfig,
    ) -> Self {
        let mut range = RangeConfig::configure(
            meta,
            RangeStrategy::Vertical,
            &params.flex_gate_config_params.num_advice_per_phase,
            &params.flex_gate_config_params.num_lookup_advice_per_phase,
            params.flex_gate_config_params.num_fixed,
            params.lookup_bits,
            degree_bits,
        );
        let keccak = KeccakBaseConfig::new(meta);
        range.gate.max_rows = (1 << degree_bits) - meta.minimum_rows();
        let instance = meta.instance_column();
        meta.enable_equality(instance);
        Self {
            range,
            keccak,
            instance,
        }
    }
}

/// Environment variable carrying the serialized [`KeccakGateConfig`] between
/// keygen and `Circuit::configure`, which has no access to `self`.
const KECCAK_TEST_GATE_CONFIG_VAR: &str = "KECCAK_TEST_GATE_CONFIG";
const KECCAK_TEST_DEGREE_VAR: &str = "KECCAK_TEST_DEGREE";

/// Makes `gate_config`/`degree_bits` visible to the next `Circuit::configure`
/// call for [`Keccak256Circuit`]. Must be called before key generation or
/// before `MockProver::run`.
pub fn set_keccak_test_env(gate_config: &KeccakGateConfig, degree_bits: u32) {
    set_var(
        KECCAK_TEST_GATE_CONFIG_VAR,
        serde_json::to_string(gate_config).expect("gate config is serializable"),
    );
    set_var(KECCAK_TEST_DEGREE_VAR, degree_bits.to_string());
}

/// Standalone circuit computing the Keccak-256 digest of a variable-length,
/// length-bounded byte string, exposing the digest bytes as public instances.
///
/// Used only to exercise [`KeccakChip::keccak_var_len`] in isolation under
/// `MockProver`; the header-update circuit embeds the chip directly rather
/// than composing with this circuit.
pub struct Keccak256Circuit<F: Field> {
    builder: RefCell<GateThreadBuilder<F>>,
    break_points: RefCell<MultiPhaseThreadBreakPoints>,
    keccak: RefCell<KeccakChip<F>>,
    digest: RefCell<Vec<AssignedValue<F>>>,
    config: KeccakGateConfig,
}

impl<F: Field> Keccak256Circuit<F> {
    /// Builds a mock-mode circuit computing `keccak256(input[..byte_len])`,
    /// where `input` has been padded with zero bytes up to `input.len()`.
    pub fn mock(
        gate_config: &KeccakGateConfig,
        input: &[u8],
        byte_len: usize,
    ) -> Self {
        assert!(byte_len <= input.len(), "byte_len exceeds padded input length");
        let mut builder = GateThreadBuilder::mock();
        let range = RangeChip::default(gate_config.lookup_bits);
        let ctx = builder.main(0);
        let input_bytes_assigned = ctx.assign_witnesses(
            input.iter().map(|b| F::from(*b as u64)),
        );
        let byte_len_assigned =
            ctx.load_witness(F::from(byte_len as u64));
        let mut keccak = KeccakChip::new(gate_config.rows_per_round as usize);
        keccak.keccak_var_len(ctx, &range, input_bytes_assigned, byte_len_assigned);
        let digest = keccak.var_len_queries()[0]
            .output_bytes_assigned()
            .to_vec();
        Self {
            builder: RefCell::new(builder),
            break_points: RefCell::new(vec![]),
            keccak: RefCell::new(keccak),
            digest: RefCell::new(digest),
            config: gate_config.clone(),
        }
    }
}

impl<F: Field> Circuit<F> for Keccak256Circuit<F> {
    type Config = KeccakCircuitConfig<F>;
    type FloorPlanner = SimpleFloorPlanner;

    fn without_witnesses(&self) -> Self {
        unimplemented!("mock-only test circuit")
    }

    fn configure(meta: &mut ConstraintSystem<F>) -> Self::Config {
        let params: KeccakGateConfig = serde_json::from_str(
            &var(KECCAK_TEST_GATE_CONFIG_VAR)
                .expect("KECCAK_TEST_GATE_CONFIG not set; call set_keccak_test_env first"),
        )
        .expect("gate config deserialization error");
        let degree_bits = var(KECCAK_TEST_DEGREE_VAR)
            .expect("KECCAK_TEST_DEGREE not set; call set_keccak_test_env first")
            .parse()
            .expect("KECCAK_TEST_DEGREE is not a valid u32");
        KeccakCircuitConfig::configure(meta, degree_bits, &params)
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
        config
            .keccak
            .load_aux_tables(&mut layouter)
            .expect("load keccak lookup tables");
        let mut first_pass = SKIP_FIRST_PASS;
        let witness_gen_only = self.builder.borrow().witness_gen_only();
        let mut digest_cells = Vec::new();
        layouter.assign_region(
            || "keccak256 gadget",
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
                    self.keccak
                        .borrow()
                        .assign_keccak_cells(&mut region, &config.keccak);
                } else {
                    let builder = self.builder.borrow();
                    let assignments = builder.assign_all(
                        &config.range.gate,
                        &config.range.lookup_advice,
                        &config.range.q_lookup,
                        &mut region,
                        Default::default(),
                    );
                    digest_cells = self
                        .digest
                        .borrow()
                        .iter()
                        .map(|byte| {
                            chip::assigned_cell_from_assigned_value(
                                byte,
                                &assignments,
                            )
                        })
                        .collect();
                    let (fixed_len_cells, var_len_cells) = self
                        .keccak
                        .borrow()
                        .assign_keccak_cells(&mut region, &config.keccak);
                    self.keccak.borrow().constrain_fixed_queries(
                        &mut region,
                        &assignments,
                        &fixed_len_cells,
                    );
                    self.keccak.borrow().constrain_var_queries(
                        &mut region,
                        &assignments,
                        &var_len_cells,
                    );
                    *self.break_points.borrow_mut() = assignments.break_points;
                }
                Ok(())
            },
        )?;
        if !witness_gen_only {
            let mut layouter = layouter.namespace(|| "expose digest");
            for (i, cell) in digest_cells.iter().enumerate() {
                layouter.constrain_instance(*cell, config.instance, i);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo2_base::{
        gates::builder::FlexGateConfigParams,
        halo2_proofs::{dev::MockProver, halo2curves::bn256::Fr},
    };
    use itertools::Itertools;

    fn test_gate_config(lookup_bits: usize) -> KeccakGateConfig {
        KeccakGateConfig {
            flex_gate_config_params: FlexGateConfigParams {
                k: 14,
                num_advice_per_phase: vec![20],
                num_lookup_advice_per_phase: vec![2],
                num_fixed: 1,
            },
            rows_per_round: 25,
            lookup_bits,
        }
    }

    #[test]
    fn keccak_var_len_matches_reference_digest() {
        let gate_config = test_gate_config(KECCAK_LOOKUP_BITS);
        set_keccak_test_env(&gate_config, 14);

        let message = b"the quick brown fox jumps over the lazy dog";
        let max_len = 128;
        let mut padded = message.to_vec();
        padded.resize(max_len, 0);

        let circuit = Keccak256Circuit::<Fr>::mock(&gate_config, &padded, message.len());
        let expected = ethers_core::utils::keccak256(message);
        let instance: Vec<Fr> = expected.iter().map(|b| Fr::from(*b as u64)).collect_vec();

        MockProver::run(14, &circuit, vec![instance])
            .expect("mock proving should not error")
            .assert_satisfied();
    }
}
