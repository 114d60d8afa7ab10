use crate::app::AppContext;
use crate::commands::{resolve_vault_path, save_vault, vault_error};
use crate::exit_codes;
use crate::prompt;
use crate::vault::Vault;
use crate::vault::io as vault_io;
use secrecy::ExposeSecret;
use std::process::ExitCode;

pub fn run(ctx: &AppContext) -> ExitCode {
    let path = match resolve_vault_path(ctx) {
        Ok(p) => p,
        Err(code) => return code,
    };

    if path.exists() {
        eprintln!("error: a vault already exists at {}", path.display());
        return ExitCode::from(exit_codes::EXIT_USAGE);
    }

    let passphrase = match prompt::prompt_new_passphrase("new passphrase") {
        Ok(p) => p,
        Err(err) => {
            eprintln!("error: {err}");
            return exit_codes::exit_code_for_prompt_error(&err);
        }
    };

    let vault = match Vault::create(passphrase.expose_secret()) {
        Ok(v) => v,
        Err(err) => return vault_error(err),
    };

    let lock = match vault_io::acquire(&path) {
        Ok(l) => l,
        Err(err) => {
            eprintln!("error: unable to lock vault: {err}");
            return ExitCode::from(exit_codes::EXIT_IO);
        }
    };

    if let Err(code) = save_vault(&vault, &path, &lock) {
        return code;
    }

    println!("created vault at {}", path.display());
    ExitCode::SUCCESS
}
