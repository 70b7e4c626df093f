use super::file::load_json;
use crate::{CircuitConfig, CircuitWithLimbsConfig};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Parameters for each circuit this crate builds:
/// - the standalone secp256k1 ECDSA multisig circuit (C6)
/// - the BLS12-381 signature check / header-update circuit (C5, C7, C8)
/// - the keccak circuit (C3)
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct HeaderCircuitConfig {
    /// Config for the standalone secp256k1 ECDSA multisig circuit.
    pub ecdsa_config: CircuitWithLimbsConfig,

    /// Config for the BLS12-381 / header-update circuit.
    pub header_update_config: CircuitWithLimbsConfig,

    /// Config for the Keccak circuit.
    pub keccak_config: CircuitConfig,
}

impl HeaderCircuitConfig {
    // Checks that the lookup bits in each sub-config are compatible with
    // its own degree bits.
    pub fn check(&self) -> Result<(), &'static str> {
        // Number of lookup bits should be strictly smaller than the degree
        // for each circuit.
        if self.ecdsa_config.lookup_bits > (self.ecdsa_config.degree_bits - 1) as usize {
            return Err("ECDSA multisig lookup bits greater or equal to degree bits.");
        }

        if self.header_update_config.lookup_bits
            > (self.header_update_config.degree_bits - 1) as usize
        {
            return Err("Header update lookup bits greater or equal to degree bits.");
        }

        if self.keccak_config.lookup_bits > (self.keccak_config.degree_bits - 1) as usize {
            return Err("Keccak lookup bits greater or equal to degree bits.");
        }

        Ok(())
    }

    // Constructor method to load a HeaderCircuitConfig from a JSON file.
    pub fn from_file(config_file: &str) -> Self {
        let config: HeaderCircuitConfig = load_json(config_file);

        // Panic if check fails
        config.check().unwrap_or_else(|e| {
            panic!("Compatibility check for config {config_file} failed: {e:?}")
        });

        config
    }
}

impl fmt::Display for HeaderCircuitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ECDSA multisig config: {}", self.ecdsa_config)?;
        writeln!(f, "Header update config: {}", self.header_update_config)?;
        writeln!(f, "Keccak config: {}", self.keccak_config)
    }
}
