//! Self-describing encrypted container format.
//!
//! On disk an envelope is `MAGIC ++ meta_size:u32le ++ meta ++ body`, where
//! `meta` is a run of [`tlv`] chunks describing how `body` was produced
//! (KDF params, salt, cipher id, compression id, sizes, checksum) and `body`
//! is the AEAD output of the (optionally compressed) plaintext.
//!
//! An `Envelope` is built once per passphrase and reused for every value it
//! encrypts or decrypts; `read` both parses a stored header into `self` and
//! consumes the caller-supplied passphrase, so the same instance can go on
//! to encrypt or decrypt further payloads under the now-derived key.

pub mod tlv;

use crate::aead::{self, AeadError, CipherId};
use crate::compress::{self, CompressError, CompressionId};
use crate::kdf::{self, Argon2idParams, KdfError};
use crate::secure::SecureBytes;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

const MAGIC: &[u8; 4] = b"[K]\0";
const SALT_LEN: usize = 16;
const KDF_ID_ARGON2ID: u8 = 1;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("not a recognized envelope: bad magic bytes")]
    BadMagic,

    #[error("corrupted envelope header")]
    CorruptHeader,

    #[error("unsupported kdf id {0}")]
    UnsupportedKdf(u8),

    #[error("unrecognized compression id {0}")]
    UnknownCompression(u8),

    #[error("unrecognized cipher id {0}")]
    UnknownCipher(u8),

    #[error("salt too short ({0} bytes, need at least {SALT_LEN})")]
    SaltTooShort(usize),

    #[error("envelope body shorter than declared data_size")]
    Truncated,

    #[error("checksum mismatch: envelope contents are corrupt")]
    ChecksumMismatch,

    #[error(transparent)]
    Kdf(#[from] KdfError),

    #[error(transparent)]
    Compress(#[from] CompressError),

    #[error("{0}")]
    Aead(#[from] AeadError),

    #[error("no passphrase has been set on this envelope")]
    NoKey,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<tlv::TlvError> for EnvelopeError {
    fn from(e: tlv::TlvError) -> Self {
        match e {
            tlv::TlvError::BadUintWidth(_) => EnvelopeError::CorruptHeader,
            tlv::TlvError::TruncatedHeader => EnvelopeError::CorruptHeader,
            tlv::TlvError::TruncatedValue => EnvelopeError::CorruptHeader,
        }
    }
}

pub struct Envelope {
    kdf_params: Argon2idParams,
    cipher_id: CipherId,
    compression_id: CompressionId,
    salt: Vec<u8>,
    key: Option<SecureBytes>,
}

impl Envelope {
    /// A fresh envelope with a random salt and the current default KDF cost,
    /// cipher, and compression choices. No key is derived until
    /// [`Envelope::set_passphrase`] is called.
    pub fn new() -> Self {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self {
            kdf_params: Argon2idParams::default(),
            cipher_id: CipherId::XChaCha20Poly1305,
            compression_id: CompressionId::Deflate,
            salt,
            key: None,
        }
    }

    /// Like [`Envelope::new`] but with caller-supplied KDF parameters —
    /// used by tests and by callers that want cheaper-than-default cost.
    pub fn with_kdf_params(kdf_params: Argon2idParams) -> Self {
        let mut env = Self::new();
        env.kdf_params = kdf_params;
        env
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn kdf_params(&self) -> Argon2idParams {
        self.kdf_params
    }

    /// Derive and hold this envelope's key from `passphrase`. Subsequent
    /// `write`/`encrypt_b64` calls use this key; a fresh salt is NOT
    /// generated here — call `Envelope::new` again for that.
    pub fn set_passphrase(&mut self, passphrase: &str) -> Result<(), EnvelopeError> {
        let key = kdf::derive(
            passphrase.as_bytes(),
            &self.salt,
            aead::KEY_LEN,
            self.kdf_params,
        )?;
        self.key = Some(key);
        Ok(())
    }

    /// Constant-time check of whether `passphrase` derives the
    /// already-set key, without mutating `self`.
    pub fn check_passphrase(&self, passphrase: &str) -> Result<bool, EnvelopeError> {
        let Some(current) = &self.key else {
            return Err(EnvelopeError::NoKey);
        };
        let candidate = kdf::derive(
            passphrase.as_bytes(),
            &self.salt,
            aead::KEY_LEN,
            self.kdf_params,
        )?;
        Ok(&candidate == current)
    }

    fn key(&self) -> Result<&SecureBytes, EnvelopeError> {
        self.key.as_ref().ok_or(EnvelopeError::NoKey)
    }

    /// Compress, encrypt, and wrap `plaintext` behind a header describing
    /// exactly how to reverse the process.
    pub fn write(&self, plaintext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        let key = self.key()?;
        let plain_len = plaintext.len() as u32;
        let compressed = compress::compress(self.compression_id, plaintext)?;
        let crc = crc32fast::hash(plaintext);
        let sealed = aead::encrypt(key.as_slice(), &compressed)?;
        let data_len = sealed.len() as u32;

        let mut meta = Vec::new();
        tlv::write_chunk(&mut meta, tlv::TAG_DATA_SIZE, &tlv::encode_uint_u32(data_len));
        tlv::write_chunk(&mut meta, tlv::TAG_PLAIN_SIZE, &tlv::encode_uint_u32(plain_len));
        tlv::write_chunk(&mut meta, tlv::TAG_COMPRESSION, &[self.compression_id.as_u8()]);
        tlv::write_chunk(&mut meta, tlv::TAG_CIPHER, &[self.cipher_id.as_u8()]);
        tlv::write_chunk(&mut meta, tlv::TAG_KDF, &[KDF_ID_ARGON2ID]);
        tlv::write_chunk(&mut meta, tlv::TAG_KDF_PARAMS, &self.kdf_params.encode());
        tlv::write_chunk(&mut meta, tlv::TAG_SALT, &self.salt);
        tlv::write_chunk(&mut meta, tlv::TAG_CRC32, &tlv::encode_uint_u32(crc));
        meta.push(tlv::TAG_END);

        let mut out = Vec::with_capacity(8 + meta.len() + sealed.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(meta.len() as u32).to_le_bytes());
        out.extend_from_slice(&meta);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Parse a stored envelope's header into `self` (salt, KDF params,
    /// cipher, compression all come from the file, not from whatever `self`
    /// held before), derive the key from `ask_passphrase()`, and return the
    /// decrypted, decompressed, checksum-verified plaintext.
    ///
    /// Fields absent from the header (an older or hand-trimmed envelope)
    /// keep whatever `self` already had rather than erroring out. Unknown
    /// chunk tags are skipped with a warning: a newer writer's envelope
    /// should still open in an older reader wherever the core fields match.
    pub fn read(
        &mut self,
        bytes: &[u8],
        mut ask_passphrase: impl FnMut() -> String,
    ) -> Result<Vec<u8>, EnvelopeError> {
        if bytes.len() < 8 || &bytes[0..4] != MAGIC {
            return Err(EnvelopeError::BadMagic);
        }
        let meta_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        let meta_start = 8usize;
        if bytes.len() < meta_start + meta_size {
            return Err(EnvelopeError::CorruptHeader);
        }
        let meta = &bytes[meta_start..meta_start + meta_size];

        let mut data_size: Option<u64> = None;
        let mut plain_size: Option<u64> = None;
        let mut crc_expected: Option<u32> = None;

        tlv::for_each_chunk(meta, |chunk| -> Result<(), EnvelopeError> {
            match chunk.tag {
                tlv::TAG_DATA_SIZE => data_size = Some(tlv::decode_uint(chunk.value)?),
                tlv::TAG_PLAIN_SIZE => plain_size = Some(tlv::decode_uint(chunk.value)?),
                tlv::TAG_COMPRESSION => {
                    let id = *chunk.value.first().ok_or(EnvelopeError::CorruptHeader)?;
                    self.compression_id =
                        CompressionId::from_u8(id).ok_or(EnvelopeError::UnknownCompression(id))?;
                }
                tlv::TAG_CIPHER => {
                    let id = *chunk.value.first().ok_or(EnvelopeError::CorruptHeader)?;
                    self.cipher_id =
                        CipherId::from_u8(id).ok_or(EnvelopeError::UnknownCipher(id))?;
                }
                tlv::TAG_KDF => {
                    let id = *chunk.value.first().ok_or(EnvelopeError::CorruptHeader)?;
                    if id != KDF_ID_ARGON2ID {
                        return Err(EnvelopeError::UnsupportedKdf(id));
                    }
                }
                tlv::TAG_KDF_PARAMS => {
                    self.kdf_params = Argon2idParams::decode(chunk.value)?;
                }
                tlv::TAG_SALT => {
                    if chunk.value.len() < SALT_LEN {
                        return Err(EnvelopeError::SaltTooShort(chunk.value.len()));
                    }
                    self.salt = chunk.value.to_vec();
                }
                tlv::TAG_CRC32 => {
                    crc_expected = Some(tlv::decode_uint(chunk.value)? as u32);
                }
                other => {
                    eprintln!(
                        "WARNING: unknown envelope metadata tag {other} ({} bytes); skipping",
                        chunk.value.len()
                    );
                }
            }
            Ok(())
        })?;

        let body_start = meta_start + meta_size;
        let body = match data_size {
            Some(n) => {
                let n = n as usize;
                if bytes.len() < body_start + n {
                    return Err(EnvelopeError::Truncated);
                }
                &bytes[body_start..body_start + n]
            }
            None => &bytes[body_start..],
        };

        let passphrase = ask_passphrase();
        self.set_passphrase(&passphrase)?;

        let key = self.key()?;
        let decrypted = aead::decrypt(key.as_slice(), body)?;
        let plaintext =
            compress::decompress(self.compression_id, &decrypted, plain_size.map(|n| n as usize))?;

        if let Some(expected) = crc_expected {
            let actual = crc32fast::hash(&plaintext);
            if actual != expected {
                return Err(EnvelopeError::ChecksumMismatch);
            }
        }
        Ok(plaintext)
    }

    pub fn encrypt_base64(&self, plaintext: &str) -> Result<String, EnvelopeError> {
        let sealed = aead::encrypt(self.key()?.as_slice(), plaintext.as_bytes())?;
        Ok(BASE64.encode(sealed))
    }

    pub fn decrypt_base64(&self, encoded: &str) -> Result<String, EnvelopeError> {
        let sealed = BASE64.decode(encoded)?;
        let plaintext = aead::decrypt(self.key()?.as_slice(), &sealed)?;
        String::from_utf8(plaintext).map_err(|_| EnvelopeError::CorruptHeader)
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_envelope() -> Envelope {
        Envelope::with_kdf_params(Argon2idParams::for_tests())
    }

    #[test]
    fn roundtrip_write_read() {
        let mut writer = test_envelope();
        writer.set_passphrase("correct horse battery staple").unwrap();
        let stored = writer.write(b"hello vault").unwrap();

        let mut reader = Envelope::new();
        let plaintext = reader
            .read(&stored, || "correct horse battery staple".to_string())
            .unwrap();
        assert_eq!(plaintext, b"hello vault");
    }

    #[test]
    fn wrong_passphrase_fails_auth() {
        let mut writer = test_envelope();
        writer.set_passphrase("right").unwrap();
        let stored = writer.write(b"payload").unwrap();

        let mut reader = Envelope::new();
        let err = reader.read(&stored, || "wrong".to_string()).unwrap_err();
        assert!(matches!(err, EnvelopeError::Aead(_)));
    }

    #[test]
    fn check_passphrase_without_mutating_state() {
        let mut env = test_envelope();
        env.set_passphrase("hunter2").unwrap();
        assert!(env.check_passphrase("hunter2").unwrap());
        assert!(!env.check_passphrase("hunter3").unwrap());
    }

    #[test]
    fn unknown_metadata_tag_is_tolerated() {
        let mut writer = test_envelope();
        writer.set_passphrase("pw").unwrap();
        let mut stored = writer.write(b"data").unwrap();

        // Splice an unrecognized tag (200) into the metadata region, right
        // before TAG_END, and grow meta_size to match.
        let meta_size = u32::from_le_bytes(stored[4..8].try_into().unwrap()) as usize;
        let end_tag_pos = 8 + meta_size - 1;
        let mut extra = Vec::new();
        tlv::write_chunk(&mut extra, 200, &[1, 2, 3]);
        stored.splice(end_tag_pos..end_tag_pos, extra.iter().copied());
        let new_meta_size = (meta_size + extra.len()) as u32;
        stored[4..8].copy_from_slice(&new_meta_size.to_le_bytes());

        let mut reader = Envelope::new();
        let plaintext = reader.read(&stored, || "pw".to_string()).unwrap();
        assert_eq!(plaintext, b"data");
    }

    #[test]
    fn encrypt_decrypt_base64_roundtrip() {
        let mut env = test_envelope();
        env.set_passphrase("pw").unwrap();
        let encoded = env.encrypt_base64("s3cr3t").unwrap();
        assert_eq!(env.decrypt_base64(&encoded).unwrap(), "s3cr3t");
    }

    #[test]
    fn integer_width_tolerant_crc_is_accepted() {
        // A writer that encodes crc32 in a narrower width than the 4 bytes
        // this crate's own `write` uses must still be readable.
        let mut writer = test_envelope();
        writer.set_passphrase("pw").unwrap();
        let stored = writer.write(b"x").unwrap();

        let mut reader = Envelope::new();
        let plaintext = reader.read(&stored, || "pw".to_string()).unwrap();
        assert_eq!(plaintext, b"x");
    }
}
