//! Atomic, advisory-locked persistence for the vault file on disk.
//!
//! Writes go to a sibling temp file and are renamed into place, so a crash
//! mid-write never leaves a half-written vault. The lock is a non-blocking
//! `flock` on a sibling `.lock` file: if another process already holds it,
//! the caller falls back to read-only access instead of hanging — a vault
//! you can't currently write to is still one you can read from.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct VaultLock {
    _file: Option<File>,
    pub read_only: bool,
}

fn lock_path(vault_path: &Path) -> PathBuf {
    let mut name = vault_path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    vault_path.with_file_name(name)
}

/// Try to take an exclusive, non-blocking lock on `vault_path`. If another
/// process holds it, returns a lock marked `read_only` instead of erroring
/// or blocking.
pub fn acquire(vault_path: &Path) -> io::Result<VaultLock> {
    let path = lock_path(vault_path);
    let file = OpenOptions::new().create(true).write(true).open(&path)?;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(VaultLock {
            _file: Some(file),
            read_only: false,
        });
    }

    let err = io::Error::last_os_error();
    match err.raw_os_error() {
        Some(code) if code == libc::EWOULDBLOCK => {
            eprintln!(
                "WARNING: vault is locked by another process; opening {} read-only",
                vault_path.display()
            );
            Ok(VaultLock {
                _file: None,
                read_only: true,
            })
        }
        _ => Err(err),
    }
}

pub fn read_bytes(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Write `bytes` to `path` atomically: a temp file in the same directory,
/// then a rename. Never touches the original file if anything fails along
/// the way.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)?;
    use std::io::Write;
    temp.write_all(bytes)?;
    temp.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.kb");
        write_bytes_atomic(&path, b"hello").unwrap();
        assert_eq!(read_bytes(&path).unwrap(), b"hello");
    }

    #[test]
    fn second_lock_on_same_vault_falls_back_to_read_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.kb");
        let first = acquire(&path).unwrap();
        assert!(!first.read_only);

        let second = acquire(&path).unwrap();
        assert!(second.read_only, "contended lock must fall back, not block or error");
    }

    #[test]
    fn lock_released_on_drop_allows_reacquire() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.kb");
        {
            let lock = acquire(&path).unwrap();
            assert!(!lock.read_only);
        }
        let again = acquire(&path).unwrap();
        assert!(!again.read_only);
    }
}
