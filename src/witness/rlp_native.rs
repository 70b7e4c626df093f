//! Native mirror of [`crate::rlp`] and [`crate::header`]: plain-Rust RLP
//! encoding used by the witness adapter (C9) to precompute the parent-link
//! keccak preimage and the seal-mode digest input, off-circuit, the same
//! way the circuit itself will recompute them. Grounded on the same rule
//! numbering (`R1`-`R5`) as `crate::rlp`'s in-circuit gates.

/// R1-R3: RLP-encodes a byte string.
pub fn encode_string(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        return vec![bytes[0]];
    }
    let mut out = encode_length(bytes.len(), 0x80, 0xb7);
    out.extend_from_slice(bytes);
    out
}

/// R4-R5: RLP-encodes a list from its already-encoded member payload.
pub fn encode_list(payload: &[u8]) -> Vec<u8> {
    let mut out = encode_length(payload.len(), 0xc0, 0xf7);
    out.extend_from_slice(payload);
    out
}

fn encode_length(len: usize, short_offset: u8, long_offset: u8) -> Vec<u8> {
    if len <= 55 {
        vec![short_offset + len as u8]
    } else {
        let len_bytes = minimal_be_bytes(len as u64);
        let mut out = vec![long_offset + len_bytes.len() as u8];
        out.extend_from_slice(&len_bytes);
        out
    }
}

fn minimal_be_bytes(mut n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }
    let mut bytes = Vec::new();
    while n > 0 {
        bytes.push((n & 0xff) as u8);
        n >>= 8;
    }
    bytes.reverse();
    bytes
}

/// Strips leading zero bytes from a big-endian numeric field before RLP
/// string-encoding it -- mirrors [`crate::slice::PaddingSlice::from_bytes`]'s
/// `big_endian` derivation of a numeric field's logical length.
pub fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let first_nonzero = bytes.iter().position(|&b| b != 0);
    match first_nonzero {
        Some(idx) => bytes[idx..].to_vec(),
        None => vec![],
    }
}

pub fn encode_numeric_field(bytes: &[u8]) -> Vec<u8> {
    encode_string(&trim_leading_zeros(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_byte_is_its_own_encoding() {
        assert_eq!(encode_string(&[0x01]), vec![0x01]);
    }

    #[test]
    fn short_string_gets_length_prefix() {
        assert_eq!(encode_string(&[0xDE, 0xAD, 0xBE, 0xEF]), vec![0x84, 0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn numeric_field_drops_leading_zero_padding() {
        let mut padded = [0u8; 8];
        padded[7] = 0x2a;
        assert_eq!(encode_numeric_field(&padded), vec![0x2a]);
    }

    #[test]
    fn all_zero_numeric_field_is_empty_string() {
        assert_eq!(encode_numeric_field(&[0u8; 8]), vec![0x80]);
    }
}
