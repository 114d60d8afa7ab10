use crate::app::AppContext;
use crate::commands::{load_vault, save_vault, vault_error};
use crate::exit_codes;
use crate::prompt;
use secrecy::ExposeSecret;
use std::process::ExitCode;

pub fn run(ctx: &AppContext) -> ExitCode {
    let (mut vault, path, lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let old = match prompt::prompt_passphrase("current passphrase") {
        Ok(p) => p,
        Err(err) => {
            eprintln!("error: {err}");
            return exit_codes::exit_code_for_prompt_error(&err);
        }
    };
    let new = match prompt::prompt_new_passphrase("new passphrase") {
        Ok(p) => p,
        Err(err) => {
            eprintln!("error: {err}");
            return exit_codes::exit_code_for_prompt_error(&err);
        }
    };

    if let Err(err) = vault.rotate_passphrase(old.expose_secret(), new.expose_secret()) {
        return vault_error(err);
    }

    if let Err(code) = save_vault(&vault, &path, &lock) {
        return code;
    }

    println!("passphrase changed");
    ExitCode::SUCCESS
}
