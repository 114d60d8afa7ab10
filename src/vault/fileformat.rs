//! Tab-delimited on-disk table format, plus the plain-text and JSON export
//! variants.
//!
//! The internal format (used inside the envelope) stores the `password`
//! column as base64 ciphertext and never escapes anything — [`crate::record::Record::set`]
//! already refuses values that would need escaping. The export formats
//! decrypt passwords and, for plain text, escape the handful of bytes a
//! tab-delimited line can't otherwise carry.
use crate::envelope::Envelope;
use crate::record::{Record, CANONICAL_COLUMNS};
use crate::stringutil::{nt_escape, nt_unescape};
use crate::vault::VaultError;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file is not valid UTF-8")]
    InvalidUtf8,

    #[error("line {line} has {got} fields, expected {expected} (matching the header)")]
    FieldCountMismatch {
        line: usize,
        got: usize,
        expected: usize,
    },

    #[error(transparent)]
    Record(#[from] crate::record::RecordError),
}

/// Parse a tab-delimited table: first line is the header (column names),
/// every following non-empty line is one record.
pub fn parse_table(text: &str) -> Result<Vec<Record>, FormatError> {
    let mut lines = text.lines();
    let header: Vec<&str> = match lines.next() {
        Some(h) if !h.is_empty() => h.split('\t').collect(),
        _ => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != header.len() {
            return Err(FormatError::FieldCountMismatch {
                line: i + 2,
                got: fields.len(),
                expected: header.len(),
            });
        }
        let pairs = header
            .iter()
            .zip(fields.iter())
            .map(|(c, v)| (c.to_string(), v.to_string()));
        records.push(Record::from_pairs(pairs)?);
    }
    Ok(records)
}

/// Format records as a tab-delimited table using the column order of the
/// first record (every record shares the same column set by construction).
/// A table with no records still gets a header line — the canonical columns
/// if there's nothing to take the column order from — so it round-trips to
/// an empty vault rather than to an unparseable empty string.
pub fn format_table(records: &[Record]) -> String {
    let owned_columns: Vec<String>;
    let columns: &[String] = match records.first() {
        Some(first) => first.columns(),
        None => {
            owned_columns = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
            &owned_columns
        }
    };

    let mut out = String::new();
    out.push_str(&columns.join("\t"));
    out.push('\n');
    for record in records {
        let values: Vec<&str> = columns.iter().map(|c| record.get(c).unwrap_or("")).collect();
        out.push_str(&values.join("\t"));
        out.push('\n');
    }
    out
}

/// Parse a plain-text export: same tab-delimited shape as [`parse_table`],
/// but each field is run through [`nt_unescape`] first to reverse
/// [`export_plain`]'s `\`/tab/newline escaping. The internal table format
/// never needs this — [`crate::record::Record::set`] already refuses values
/// that would require it — so this is kept separate from `parse_table`
/// rather than folded into it.
pub fn parse_table_plain(text: &str) -> Result<Vec<Record>, FormatError> {
    let mut lines = text.lines();
    let header: Vec<&str> = match lines.next() {
        Some(h) if !h.is_empty() => h.split('\t').collect(),
        _ => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for (i, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != header.len() {
            return Err(FormatError::FieldCountMismatch {
                line: i + 2,
                got: fields.len(),
                expected: header.len(),
            });
        }
        let pairs = header
            .iter()
            .zip(fields.iter())
            .map(|(c, v)| (c.to_string(), nt_unescape(v)));
        records.push(Record::from_pairs(pairs)?);
    }
    Ok(records)
}

/// Plain-text export: decrypted passwords, C-style escaping of `\`, tab,
/// and newline so a field that contains one of those still fits on one
/// line.
pub fn export_plain(records: &[Record], envelope: &Envelope) -> Result<String, VaultError> {
    let owned_columns: Vec<String>;
    let columns: &[String] = match records.first() {
        Some(first) => first.columns(),
        None => {
            owned_columns = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
            &owned_columns
        }
    };

    let mut out = String::new();
    out.push_str(&columns.join("\t"));
    out.push('\n');
    for record in records {
        let mut values = Vec::with_capacity(columns.len());
        for column in columns {
            let raw = record.get(column).unwrap_or("");
            let value = if column == "password" && !raw.is_empty() {
                envelope.decrypt_base64(raw)?
            } else {
                raw.to_string()
            };
            values.push(nt_escape(&value));
        }
        out.push_str(&values.join("\t"));
        out.push('\n');
    }
    Ok(out)
}

/// JSON export: one array of objects, passwords decrypted to plaintext.
pub fn export_json(records: &[Record], envelope: &Envelope) -> Result<String, VaultError> {
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let mut obj = Map::new();
        for column in record.columns() {
            let raw = record.get(column).unwrap_or("");
            let value = if column == "password" && !raw.is_empty() {
                envelope.decrypt_base64(raw)?
            } else {
                raw.to_string()
            };
            obj.insert(column.clone(), Value::String(value));
        }
        items.push(Value::Object(obj));
    }
    Ok(serde_json::to_string_pretty(&Value::Array(items))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;

    #[test]
    fn parse_then_format_roundtrips() {
        let text = "site\tuser\turl\ttags\tmtime\tnote\tpassword\nexample.com\talice\t\t\t0\t\tabc123\n";
        let records = parse_table(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("site"), Some("example.com"));
        let formatted = format_table(&records);
        assert_eq!(formatted, text);
    }

    #[test]
    fn empty_table_has_a_header_line_and_round_trips_to_no_records() {
        let formatted = format_table(&[]);
        assert_eq!(formatted, format!("{}\n", CANONICAL_COLUMNS.join("\t")));
        assert_eq!(parse_table(&formatted).unwrap().len(), 0);
    }

    #[test]
    fn parse_table_plain_reverses_export_escaping() {
        let text = "site\tuser\turl\ttags\tmtime\tnote\tpassword\nexample.com\talice\t\t\t0\t\tp@ss\\tword\n";
        let records = parse_table_plain(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("password"), Some("p@ss\tword"));
    }

    #[test]
    fn mismatched_field_count_is_rejected() {
        let text = "site\tuser\nexample.com\n";
        let err = parse_table(text).unwrap_err();
        assert!(matches!(err, FormatError::FieldCountMismatch { .. }));
    }

    #[test]
    fn plain_export_decrypts_password_and_escapes_tabs() {
        let mut envelope = Envelope::new();
        envelope.set_passphrase("pw").unwrap();
        let sealed = envelope.encrypt_base64("p@ss\tword").unwrap();

        let mut record = Record::new();
        record.set("password", &sealed).unwrap();
        let exported = export_plain(&[record], &envelope).unwrap();
        assert!(exported.contains("p@ss\\tword"));
    }

    #[test]
    fn json_export_decrypts_password() {
        let mut envelope = Envelope::new();
        envelope.set_passphrase("pw").unwrap();
        let sealed = envelope.encrypt_base64("hunter2").unwrap();

        let mut record = Record::new();
        record.set("site", "example.com").unwrap();
        record.set("password", &sealed).unwrap();
        let json = export_json(&[record], &envelope).unwrap();
        assert!(json.contains("\"hunter2\""));
        assert!(!json.contains(&sealed));
    }
}
