//! The record-management core: an ordered table of [`Record`]s backed by
//! one [`Envelope`], plus the bookkeeping (column widths, the tag index,
//! the dirty flag) that the CLI layer builds on.

pub mod datasafe;
pub mod fileformat;
pub mod import;
pub mod io;

use crate::envelope::{Envelope, EnvelopeError};
use crate::record::{Record, RecordError};
use chrono::Local;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub use import::ImportSummary;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("passphrase is incorrect")]
    AuthFailed,

    #[error("no record at index {0}")]
    ItemNotFound(usize),

    #[error("the 'mtime' column is maintained automatically and cannot be set directly")]
    IllegalField,

    #[error("column {0:?} is not part of this vault's schema")]
    UnknownColumn(String),

    #[error(transparent)]
    IllegalValue(#[from] RecordError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Format(#[from] fileformat::FormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub struct Vault {
    records: Vec<Record>,
    column_widths: HashMap<String, usize>,
    dirty: bool,
    envelope: Envelope,
}

impl Vault {
    /// A brand-new, empty vault protected by `passphrase`.
    pub fn create(passphrase: &str) -> Result<Self, VaultError> {
        let mut envelope = Envelope::new();
        envelope.set_passphrase(passphrase)?;
        Ok(Self {
            records: Vec::new(),
            column_widths: HashMap::new(),
            dirty: true,
            envelope,
        })
    }

    /// Open a previously-written vault, asking for the passphrase via
    /// `ask_passphrase` if the file itself doesn't already pin one down.
    pub fn open(
        bytes: &[u8],
        ask_passphrase: impl FnMut() -> String,
    ) -> Result<Self, VaultError> {
        let mut envelope = Envelope::new();
        let plaintext = envelope.read(bytes, ask_passphrase)?;
        let text = String::from_utf8(plaintext).map_err(|_| fileformat::FormatError::InvalidUtf8)?;
        let records = fileformat::parse_table(&text)?;
        let mut vault = Self {
            records,
            column_widths: HashMap::new(),
            dirty: false,
            envelope,
        };
        vault.recompute_widths();
        Ok(vault)
    }

    /// Serialize this vault's records and seal them behind the envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>, VaultError> {
        let text = fileformat::format_table(&self.records);
        Ok(self.envelope.write(text.as_bytes())?)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, idx: usize) -> Result<&Record, VaultError> {
        self.records.get(idx).ok_or(VaultError::ItemNotFound(idx))
    }

    pub fn check_passphrase(&self, passphrase: &str) -> Result<bool, VaultError> {
        Ok(self.envelope.check_passphrase(passphrase)?)
    }

    /// Add a record whose `password` field, if any, is still plaintext;
    /// it's encrypted in place before the record joins the table.
    pub fn add_record(&mut self, mut record: Record) -> Result<usize, VaultError> {
        if let Some(plain) = record.get("password").map(str::to_string) {
            if !plain.is_empty() {
                let sealed = self.envelope.encrypt_base64(&plain)?;
                record.set("password", &sealed)?;
            }
        }
        touch_mtime(&mut record)?;
        self.update_widths_for(&record);
        self.records.push(record);
        self.dirty = true;
        Ok(self.records.len() - 1)
    }

    pub fn delete_record(&mut self, idx: usize) -> Result<Record, VaultError> {
        if idx >= self.records.len() {
            return Err(VaultError::ItemNotFound(idx));
        }
        self.dirty = true;
        Ok(self.records.remove(idx))
    }

    /// Read a field's plaintext. For `password`, this transparently
    /// decrypts; every other column is returned as stored.
    pub fn get_field(&self, idx: usize, column: &str) -> Result<String, VaultError> {
        let record = self.record(idx)?;
        if column == "password" {
            return match record.get("password") {
                Some(enc) if !enc.is_empty() => Ok(self.envelope.decrypt_base64(enc)?),
                _ => Ok(String::new()),
            };
        }
        Ok(record.get(column).unwrap_or_default().to_string())
    }

    /// Set a field. Direct writes to `mtime` are rejected — it's
    /// recomputed automatically whenever any other field changes. Writes
    /// to `password` are transparently encrypted before storage.
    pub fn set_field(&mut self, idx: usize, column: &str, value: &str) -> Result<(), VaultError> {
        if column == "mtime" {
            return Err(VaultError::IllegalField);
        }
        if idx >= self.records.len() {
            return Err(VaultError::ItemNotFound(idx));
        }

        if column == "password" {
            let sealed = self.envelope.encrypt_base64(value)?;
            self.records[idx].set("password", &sealed)?;
        } else {
            self.records[idx].set(column, value)?;
        }
        touch_mtime(&mut self.records[idx])?;
        self.update_widths_for(&self.records[idx].clone());
        self.dirty = true;
        Ok(())
    }

    /// Recompute every union tag across all records' `tags` column
    /// (whitespace-separated), sorted and deduplicated.
    pub fn tags(&self) -> Vec<String> {
        let mut set: HashSet<String> = HashSet::new();
        for record in &self.records {
            if let Some(tags) = record.get("tags") {
                for tag in tags.split_whitespace() {
                    set.insert(tag.to_string());
                }
            }
        }
        let mut tags: Vec<String> = set.into_iter().collect();
        tags.sort();
        tags
    }

    /// Rotate the passphrase: a fresh envelope (new salt, new derived key)
    /// replaces the current one, and every record's password is decrypted
    /// under the old envelope and re-encrypted under the new one.
    pub fn rotate_passphrase(&mut self, old: &str, new: &str) -> Result<(), VaultError> {
        if !self.envelope.check_passphrase(old)? {
            return Err(VaultError::AuthFailed);
        }

        let mut new_envelope = Envelope::new();
        new_envelope.set_passphrase(new)?;

        for record in &mut self.records {
            if let Some(enc) = record.get("password").map(str::to_string) {
                if !enc.is_empty() {
                    let plain = self.envelope.decrypt_base64(&enc)?;
                    let resealed = new_envelope.encrypt_base64(&plain)?;
                    record.set("password", &resealed)?;
                }
            }
        }

        self.envelope = new_envelope;
        self.dirty = true;
        Ok(())
    }

    /// Column width hints for aligned text display: `max(len(value)) + 2`
    /// per column, across every record.
    pub fn column_width(&self, column: &str) -> usize {
        self.column_widths.get(column).copied().unwrap_or(0)
    }

    pub(crate) fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn recompute_widths(&mut self) {
        self.column_widths.clear();
        let records = self.records.clone();
        for record in &records {
            self.update_widths_for(record);
        }
    }

    fn update_widths_for(&mut self, record: &Record) {
        for (column, value) in record.iter() {
            let width = value.chars().count() + 2;
            let entry = self.column_widths.entry(column.to_string()).or_insert(0);
            if width > *entry {
                *entry = width;
            }
        }
    }
}

fn touch_mtime(record: &mut Record) -> Result<(), VaultError> {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    record.set("mtime", &now)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_open_roundtrip() {
        let mut vault = Vault::create("hunter2").unwrap();
        let mut record = Record::new();
        record.set("site", "example.com").unwrap();
        record.set("user", "alice").unwrap();
        record.set("password", "s3cr3t").unwrap();
        vault.add_record(record).unwrap();

        let bytes = vault.to_bytes().unwrap();
        let reopened = Vault::open(&bytes, || "hunter2".to_string()).unwrap();
        assert_eq!(reopened.records().len(), 1);
        assert_eq!(reopened.get_field(0, "site").unwrap(), "example.com");
        assert_eq!(reopened.get_field(0, "password").unwrap(), "s3cr3t");
    }

    #[test]
    fn wrong_passphrase_fails() {
        let mut vault = Vault::create("right").unwrap();
        vault.add_record(Record::new()).unwrap();
        let bytes = vault.to_bytes().unwrap();
        let err = Vault::open(&bytes, || "wrong".to_string()).unwrap_err();
        assert!(matches!(err, VaultError::Envelope(_)));
    }

    #[test]
    fn direct_mtime_write_is_rejected() {
        let mut vault = Vault::create("pw").unwrap();
        vault.add_record(Record::new()).unwrap();
        let err = vault.set_field(0, "mtime", "123").unwrap_err();
        assert!(matches!(err, VaultError::IllegalField));
    }

    #[test]
    fn setting_any_field_touches_mtime() {
        let mut vault = Vault::create("pw").unwrap();
        vault.add_record(Record::new()).unwrap();
        let before = vault.get_field(0, "mtime").unwrap();
        assert_eq!(before.len(), "2021-11-06 20:23:59".len());
        std::thread::sleep(std::time::Duration::from_millis(1100));
        vault.set_field(0, "note", "hi").unwrap();
        let after = vault.get_field(0, "mtime").unwrap();
        assert!(after > before, "mtime must be non-decreasing across the second boundary");
    }

    #[test]
    fn rotate_passphrase_reencrypts_passwords() {
        let mut vault = Vault::create("old-pass").unwrap();
        let mut record = Record::new();
        record.set("password", "topsecret").unwrap();
        vault.add_record(record).unwrap();

        vault.rotate_passphrase("old-pass", "new-pass").unwrap();
        assert_eq!(vault.get_field(0, "password").unwrap(), "topsecret");

        let bytes = vault.to_bytes().unwrap();
        let reopened = Vault::open(&bytes, || "new-pass".to_string()).unwrap();
        assert_eq!(reopened.get_field(0, "password").unwrap(), "topsecret");
    }

    #[test]
    fn tags_are_deduplicated_and_sorted() {
        let mut vault = Vault::create("pw").unwrap();
        let mut a = Record::new();
        a.set("tags", "work email").unwrap();
        vault.add_record(a).unwrap();
        let mut b = Record::new();
        b.set("tags", "email banking").unwrap();
        vault.add_record(b).unwrap();

        assert_eq!(vault.tags(), vec!["banking", "email", "work"]);
    }
}
