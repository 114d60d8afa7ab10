use crate::app::AppContext;
use crate::cli::{ExportArgs, FileFormatArg};
use crate::commands::{load_vault, vault_error};
use crate::exit_codes;
use crate::vault::fileformat;
use std::fs;
use std::process::ExitCode;

pub fn run(args: ExportArgs, ctx: &AppContext) -> ExitCode {
    let (vault, _path, _lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let contents: Vec<u8> = match args.format {
        FileFormatArg::Plain => match fileformat::export_plain(vault.records(), vault.envelope()) {
            Ok(text) => text.into_bytes(),
            Err(err) => return vault_error(err),
        },
        FileFormatArg::Json => match fileformat::export_json(vault.records(), vault.envelope()) {
            Ok(text) => text.into_bytes(),
            Err(err) => return vault_error(err),
        },
        FileFormatArg::Keybox => match vault.to_bytes() {
            Ok(bytes) => bytes,
            Err(err) => return vault_error(err),
        },
        FileFormatArg::Gpg => {
            eprintln!("error: exporting to the legacy gpg format is not supported; use plain or json");
            return ExitCode::from(exit_codes::EXIT_USAGE);
        }
    };

    if let Err(err) = fs::write(&args.path, contents) {
        eprintln!("error: unable to write {}: {err}", args.path.display());
        return ExitCode::from(exit_codes::EXIT_IO);
    }

    println!("exported {} record(s) to {}", vault.records().len(), args.path.display());
    ExitCode::SUCCESS
}
