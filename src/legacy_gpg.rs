//! Import from a legacy GPG-encrypted keybox export.
//!
//! There's no GPG crate in play here — this shells out to the system `gpg`
//! binary rather than vendoring a cryptographic implementation of OpenPGP.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpgError {
    #[error("failed to run gpg: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("gpg exited with an error: {0}")]
    Failed(String),
}

/// Decrypt `ciphertext_path` with `gpg --decrypt`, feeding `passphrase` on
/// a pipe rather than argv (so it doesn't show up in `ps`).
pub fn decrypt_file(ciphertext_path: &Path, passphrase: &str) -> Result<Vec<u8>, GpgError> {
    let mut child = Command::new("gpg")
        .args([
            "--quiet",
            "--batch",
            "--yes",
            "--passphrase-fd",
            "0",
            "--pinentry-mode",
            "loopback",
            "--decrypt",
        ])
        .arg(ciphertext_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin.write_all(passphrase.as_bytes())?;
        stdin.write_all(b"\n")?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(GpgError::Failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(output.stdout)
}
