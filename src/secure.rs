//! Sensitive in-memory buffers.
//!
//! `SecureBytes` backs derived keys and decrypted passphrases. Construction
//! best-effort pins the backing pages against swap (`mlock`); drop always
//! overwrites the buffer with zeros before releasing it.
//!
//! Per the teardown rule: lock on allocation, never unlock. `mlock`/`munlock`
//! do not nest (a single `munlock` call undoes every overlapping `mlock`), so
//! pairing them correctly across clones and moves is not safely possible
//! without a global refcount on each page. Locking once and only clearing on
//! drop sidesteps that entirely.

use std::fmt;
use zeroize::Zeroize;

pub struct SecureBytes {
    data: Vec<u8>,
}

impl SecureBytes {
    pub fn new(data: Vec<u8>) -> Self {
        mlock_best_effort(&data);
        Self { data }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        Self::new(self.data.clone())
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.data.ct_eq(&other.data).into()
    }
}

impl Eq for SecureBytes {}

#[cfg(unix)]
fn mlock_best_effort(data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let rc = unsafe { libc::mlock(data.as_ptr() as *const libc::c_void, data.len()) };
    if rc != 0 {
        eprintln!(
            "WARNING: unable to lock {} bytes of key material in memory (swap protection disabled)",
            data.len()
        );
    }
}

#[cfg(not(unix))]
fn mlock_best_effort(_data: &[u8]) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_buffers_compare_equal() {
        let a = SecureBytes::new(vec![1, 2, 3]);
        let b = SecureBytes::new(vec![1, 2, 3]);
        assert_eq!(a, b);
    }

    #[test]
    fn different_buffers_compare_unequal() {
        let a = SecureBytes::new(vec![1, 2, 3]);
        let b = SecureBytes::new(vec![1, 2, 4]);
        assert_ne!(a, b);
    }

    #[test]
    fn different_lengths_compare_unequal() {
        let a = SecureBytes::new(vec![1, 2, 3]);
        let b = SecureBytes::new(vec![1, 2]);
        assert_ne!(a, b);
    }
}
