//! A thin wrapper around one [`Envelope`] for encrypting opaque byte
//! payloads (e.g. attaching an arbitrary file to a vault) independent of
//! the tab-delimited record table.

use crate::envelope::{Envelope, EnvelopeError};

pub struct DataSafe {
    envelope: Envelope,
}

impl DataSafe {
    pub fn create(passphrase: &str) -> Result<Self, EnvelopeError> {
        let mut envelope = Envelope::new();
        envelope.set_passphrase(passphrase)?;
        Ok(Self { envelope })
    }

    pub fn open(
        bytes: &[u8],
        ask_passphrase: impl FnMut() -> String,
    ) -> Result<(Self, Vec<u8>), EnvelopeError> {
        let mut envelope = Envelope::new();
        let plaintext = envelope.read(bytes, ask_passphrase)?;
        Ok((Self { envelope }, plaintext))
    }

    pub fn write_data(&self, plaintext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
        self.envelope.write(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let safe = DataSafe::create("pw").unwrap();
        let sealed = safe.write_data(b"arbitrary bytes, not a record table").unwrap();
        let (_, plaintext) = DataSafe::open(&sealed, || "pw".to_string()).unwrap();
        assert_eq!(plaintext, b"arbitrary bytes, not a record table");
    }
}
