//! Near-duplicate matching for imported records.
//!
//! Imported records carry a plaintext `password` (they come from a plain
//! export, a JSON export, or a legacy GPG blob — nothing that's already
//! encrypted under this vault's key), so matching compares that plaintext
//! against the existing record's password decrypted on the fly.

use crate::record::{Record, CANONICAL_COLUMNS};
use crate::vault::{Vault, VaultError};
use std::collections::HashSet;

/// Below this many matched columns, a candidate is too dissimilar to call
/// a near-duplicate and is imported as a brand-new record instead.
pub const DEFAULT_MIN_SCORE: usize = 3;

pub struct ImportSummary {
    pub n_total: usize,
    pub n_new: usize,
    pub n_updated: usize,
}

enum Classification {
    Exact(usize),
    Near(usize),
    New,
}

/// Import `records` (plaintext passwords) into `vault`, matching each one
/// against the existing table and either updating the best near-duplicate
/// or appending it as new.
pub fn import_records(
    vault: &mut Vault,
    records: Vec<Record>,
    min_score: usize,
) -> Result<ImportSummary, VaultError> {
    let known = known_columns(vault);
    for incoming in &records {
        for column in incoming.columns() {
            if !known.contains(column.as_str()) {
                return Err(VaultError::UnknownColumn(column.clone()));
            }
        }
    }

    let n_total = records.len();
    let mut n_new = 0;
    let mut n_updated = 0;

    for incoming in records {
        match classify(vault, &incoming, min_score)? {
            Classification::Exact(_) => {
                // Already identical in every matched column (including
                // password) — drop it from consideration, nothing to update.
            }
            Classification::Near(idx) => {
                apply_update(vault, idx, &incoming)?;
                n_updated += 1;
            }
            Classification::New => {
                vault.add_record(incoming)?;
                n_new += 1;
            }
        }
    }

    Ok(ImportSummary {
        n_total,
        n_new,
        n_updated,
    })
}

/// The set of columns this vault currently recognizes: every canonical
/// column, plus whatever extra columns its existing records already carry.
/// An import introducing a column outside this set is rejected outright
/// rather than silently growing the schema.
fn known_columns(vault: &Vault) -> HashSet<String> {
    let mut known: HashSet<String> = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    for record in vault.records() {
        for column in record.columns() {
            known.insert(column.clone());
        }
    }
    known
}

fn classify(
    vault: &Vault,
    candidate: &Record,
    min_score: usize,
) -> Result<Classification, VaultError> {
    let non_password_columns: Vec<&str> = candidate
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| *c != "password")
        .collect();
    let candidate_password = candidate.get("password").unwrap_or("");
    // Password always occupies a scoring slot, matching every other column —
    // two records with no password set on either side still count as agreeing.
    let max_score = non_password_columns.len() + 1;

    let mut best_score: i64 = min_score as i64 - 1;
    let mut best_candidates: Vec<usize> = Vec::new();

    for (idx, existing) in vault.records().iter().enumerate() {
        let mut score = 0usize;
        for column in &non_password_columns {
            if existing.get(column).unwrap_or("") == candidate.get(column).unwrap_or("") {
                score += 1;
            }
        }

        // Even a password match couldn't lift this candidate to the
        // current best; skip the (comparatively expensive) decrypt.
        if (score as i64) + 1 < best_score {
            continue;
        }

        let existing_password = existing.get("password").unwrap_or("");
        if candidate_password.is_empty() && existing_password.is_empty() {
            score += 1;
        } else if !candidate_password.is_empty() && !existing_password.is_empty() {
            if let Ok(existing_plain) = vault.envelope().decrypt_base64(existing_password) {
                if existing_plain == candidate_password {
                    score += 1;
                }
            }
        }

        if score == max_score && max_score > 0 {
            return Ok(Classification::Exact(idx));
        }

        let score = score as i64;
        if score > best_score {
            best_score = score;
            best_candidates.clear();
            best_candidates.push(idx);
        } else if score == best_score {
            best_candidates.push(idx);
        }
    }

    if best_score < min_score as i64 {
        return Ok(Classification::New);
    }
    match best_candidates.len() {
        1 => Ok(Classification::Near(best_candidates[0])),
        _ => Ok(Classification::New),
    }
}

fn apply_update(vault: &mut Vault, idx: usize, incoming: &Record) -> Result<(), VaultError> {
    for column in incoming.columns() {
        let value = incoming.get(column).unwrap_or_default();
        if column == "mtime" {
            continue;
        }
        vault.set_field(idx, column, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(site: &str, user: &str, password: &str) -> Record {
        let mut r = Record::new();
        r.set("site", site).unwrap();
        r.set("user", user).unwrap();
        r.set("password", password).unwrap();
        r
    }

    /// A record with every non-password column populated, so similarity
    /// scoring can't be skewed by two sparse records coincidentally sharing
    /// blank `url`/`tags`/`note` fields.
    fn full_record(site: &str, user: &str, url: &str, tags: &str, note: &str, password: &str) -> Record {
        let mut r = record(site, user, password);
        r.set("url", url).unwrap();
        r.set("tags", tags).unwrap();
        r.set("note", note).unwrap();
        r
    }

    #[test]
    fn exact_duplicate_is_skipped_entirely() {
        let mut vault = Vault::create("pw").unwrap();
        vault.add_record(record("example.com", "alice", "old-pass")).unwrap();
        let mtime_before = vault.get_field(0, "mtime").unwrap().to_string();

        // Simulate re-importing the vault's own export: every column,
        // including mtime, carries the value already on disk.
        let mut incoming = record("example.com", "alice", "old-pass");
        incoming.set("mtime", &mtime_before).unwrap();

        let summary = import_records(&mut vault, vec![incoming], 1).unwrap();
        assert_eq!(summary.n_total, 1);
        assert_eq!(summary.n_updated, 0);
        assert_eq!(summary.n_new, 0);
        assert_eq!(vault.records().len(), 1);
        assert_eq!(vault.get_field(0, "mtime").unwrap(), mtime_before);
        assert_eq!(vault.get_field(0, "password").unwrap(), "old-pass");
    }

    #[test]
    fn near_match_updates_password() {
        let mut vault = Vault::create("pw").unwrap();
        vault.add_record(record("example.com", "alice", "old-pass")).unwrap();

        let summary =
            import_records(&mut vault, vec![record("example.com", "alice", "new-pass")], 1).unwrap();
        assert_eq!(summary.n_updated, 1);
        assert_eq!(vault.get_field(0, "password").unwrap(), "new-pass");
    }

    #[test]
    fn dissimilar_record_is_imported_as_new() {
        let mut vault = Vault::create("pw").unwrap();
        vault
            .add_record(full_record(
                "example.com",
                "alice",
                "http://example.com",
                "work",
                "personal",
                "old-pass",
            ))
            .unwrap();

        let summary = import_records(
            &mut vault,
            vec![full_record(
                "unrelated.net",
                "bob",
                "http://unrelated.net",
                "other",
                "misc",
                "other-pass",
            )],
            3,
        )
        .unwrap();
        assert_eq!(summary.n_new, 1);
        assert_eq!(summary.n_updated, 0);
        assert_eq!(vault.records().len(), 2);
    }

    #[test]
    fn unrecognized_column_aborts_the_whole_import() {
        let mut vault = Vault::create("pw").unwrap();
        let mut incoming = record("example.com", "alice", "pw1");
        incoming.set("totally_unknown", "x").unwrap();

        let err = import_records(&mut vault, vec![incoming], 3).unwrap_err();
        assert!(matches!(err, VaultError::UnknownColumn(ref c) if c == "totally_unknown"));
        assert_eq!(vault.records().len(), 0);
    }

    #[test]
    fn empty_vault_imports_everything_as_new() {
        let mut vault = Vault::create("pw").unwrap();
        let summary = import_records(
            &mut vault,
            vec![record("a.com", "x", "1"), record("b.com", "y", "2")],
            3,
        )
        .unwrap();
        assert_eq!(summary.n_total, 2);
        assert_eq!(summary.n_new, 2);
        assert_eq!(summary.n_updated, 0);
    }
}
