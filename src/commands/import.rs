use crate::app::AppContext;
use crate::cli::{FileFormatArg, ImportArgs};
use crate::commands::{load_vault, save_vault, vault_error};
use crate::exit_codes;
use crate::legacy_gpg;
use crate::prompt;
use crate::record::Record;
use crate::vault::fileformat;
use crate::vault::import::{self, DEFAULT_MIN_SCORE};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::fs;
use std::process::ExitCode;

pub fn run(args: ImportArgs, ctx: &AppContext) -> ExitCode {
    let (mut vault, path, lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let records = match args.format {
        FileFormatArg::Plain => match read_plain(&args.path) {
            Ok(r) => r,
            Err(code) => return code,
        },
        FileFormatArg::Json => match read_json(&args.path) {
            Ok(r) => r,
            Err(code) => return code,
        },
        FileFormatArg::Gpg => match read_gpg(&args.path) {
            Ok(r) => r,
            Err(code) => return code,
        },
        FileFormatArg::Keybox => {
            eprintln!("error: importing another encrypted vault directly is not supported; export it to plain or json first");
            return ExitCode::from(exit_codes::EXIT_USAGE);
        }
    };

    let min_score = args.min_score.unwrap_or(DEFAULT_MIN_SCORE);
    let summary = match import::import_records(&mut vault, records, min_score) {
        Ok(s) => s,
        Err(err) => return vault_error(err),
    };

    if let Err(code) = save_vault(&vault, &path, &lock) {
        return code;
    }

    println!(
        "imported {} record(s): {} new, {} updated",
        summary.n_total, summary.n_new, summary.n_updated
    );
    ExitCode::SUCCESS
}

fn read_plain(path: &std::path::Path) -> Result<Vec<Record>, ExitCode> {
    let text = fs::read_to_string(path).map_err(|err| {
        eprintln!("error: unable to read {}: {err}", path.display());
        ExitCode::from(exit_codes::EXIT_IO)
    })?;
    fileformat::parse_table_plain(&text).map_err(|err| {
        eprintln!("error: {err}");
        exit_codes::exit_code_for_format_error(&err)
    })
}

fn read_json(path: &std::path::Path) -> Result<Vec<Record>, ExitCode> {
    let text = fs::read_to_string(path).map_err(|err| {
        eprintln!("error: unable to read {}: {err}", path.display());
        ExitCode::from(exit_codes::EXIT_IO)
    })?;
    let items: Vec<Value> = serde_json::from_str(&text).map_err(|err| {
        eprintln!("error: invalid json: {err}");
        ExitCode::from(exit_codes::EXIT_USAGE)
    })?;

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(map) = item else {
            eprintln!("error: expected an array of objects");
            return Err(ExitCode::from(exit_codes::EXIT_USAGE));
        };
        let pairs = map.into_iter().filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            _ => None,
        });
        let record = Record::from_pairs(pairs).map_err(|err| {
            eprintln!("error: {err}");
            exit_codes::exit_code_for_record_error(&err)
        })?;
        records.push(record);
    }
    Ok(records)
}

fn read_gpg(path: &std::path::Path) -> Result<Vec<Record>, ExitCode> {
    let passphrase = prompt::prompt_passphrase("gpg passphrase").map_err(|err| {
        eprintln!("error: {err}");
        exit_codes::exit_code_for_prompt_error(&err)
    })?;
    let plaintext = legacy_gpg::decrypt_file(path, passphrase.expose_secret()).map_err(|err| {
        eprintln!("error: {err}");
        exit_codes::exit_code_for_gpg_error(&err)
    })?;
    let text = String::from_utf8(plaintext).map_err(|_| {
        eprintln!("error: decrypted gpg payload is not valid utf-8");
        ExitCode::from(exit_codes::EXIT_USAGE)
    })?;
    fileformat::parse_table_plain(&text).map_err(|err| {
        eprintln!("error: {err}");
        exit_codes::exit_code_for_format_error(&err)
    })
}
