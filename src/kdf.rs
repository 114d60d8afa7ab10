//! Passphrase-to-key derivation.
//!
//! Argon2id is the only registered KDF (id 1). The registry is closed: new
//! algorithms are added by extending `KdfId`, not by plugging in dynamically
//! loaded code.

use crate::secure::SecureBytes;
use argon2::{Algorithm, Argon2, Params as Argon2Params, Version};
use thiserror::Error;

/// `mem_cost` encodes memory as `2^(mem_cost+10)` bytes.
pub const DEFAULT_MEM_COST: u8 = 16;
pub const DEFAULT_TIME_COST: u32 = 5;
pub const DEFAULT_THREADS: u32 = 1;

#[derive(Debug, Error)]
pub enum KdfError {
    #[error("unsupported kdf id {0}")]
    UnsupportedId(u8),

    #[error("invalid kdf parameter block (expected 4 bytes, got {0})")]
    InvalidParamBlock(usize),

    #[error("argon2 parameters rejected: {0}")]
    InvalidParams(argon2::Error),

    #[error("argon2 derivation failed: {0}")]
    DerivationFailed(argon2::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2idParams {
    pub version: u8,
    pub mem_cost: u8,
    pub time_cost: u32,
    pub threads: u32,
}

impl Default for Argon2idParams {
    fn default() -> Self {
        Self {
            version: 0x13,
            mem_cost: DEFAULT_MEM_COST,
            time_cost: DEFAULT_TIME_COST,
            threads: DEFAULT_THREADS,
        }
    }
}

impl Argon2idParams {
    /// Low-cost parameters for fast unit/integration tests.
    pub fn for_tests() -> Self {
        Self {
            version: 0x13,
            mem_cost: 10,
            time_cost: 1,
            threads: 1,
        }
    }

    /// Wire layout: four bytes `(version, mem_cost, time_cost, threads)`.
    pub fn encode(self) -> [u8; 4] {
        [
            self.version,
            self.mem_cost,
            self.time_cost as u8,
            self.threads as u8,
        ]
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, KdfError> {
        if bytes.len() != 4 {
            return Err(KdfError::InvalidParamBlock(bytes.len()));
        }
        Ok(Self {
            version: bytes[0],
            mem_cost: bytes[1],
            time_cost: bytes[2] as u32,
            threads: bytes[3] as u32,
        })
    }

    fn mem_cost_kib(self) -> u32 {
        1u32 << self.mem_cost
    }

    fn to_argon2_params(self, out_len: usize) -> Result<Argon2Params, KdfError> {
        Argon2Params::new(self.mem_cost_kib(), self.time_cost, self.threads, Some(out_len))
            .map_err(KdfError::InvalidParams)
    }

    fn version(self) -> Version {
        match self.version {
            0x10 => Version::V0x10,
            _ => Version::V0x13,
        }
    }
}

/// Derive `out_len` key bytes from `passphrase` and `salt` using Argon2id.
pub fn derive(
    passphrase: &[u8],
    salt: &[u8],
    out_len: usize,
    params: Argon2idParams,
) -> Result<SecureBytes, KdfError> {
    let argon2_params = params.to_argon2_params(out_len)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, params.version(), argon2_params);

    let mut out = vec![0u8; out_len];
    argon2
        .hash_password_into(passphrase, salt, &mut out)
        .map_err(KdfError::DerivationFailed)?;
    Ok(SecureBytes::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let params = Argon2idParams {
            version: 0x13,
            mem_cost: 16,
            time_cost: 5,
            threads: 1,
        };
        let encoded = params.encode();
        let decoded = Argon2idParams::decode(&encoded).unwrap();
        assert_eq!(params, decoded);
    }

    #[test]
    fn derive_is_deterministic_for_same_inputs() {
        let salt = [7u8; 16];
        let params = Argon2idParams::for_tests();
        let a = derive(b"hunter2", &salt, 32, params).unwrap();
        let b = derive(b"hunter2", &salt, 32, params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derive_differs_for_different_salts() {
        let params = Argon2idParams::for_tests();
        let a = derive(b"hunter2", &[1u8; 16], 32, params).unwrap();
        let b = derive(b"hunter2", &[2u8; 16], 32, params).unwrap();
        assert_ne!(a, b);
    }
}
