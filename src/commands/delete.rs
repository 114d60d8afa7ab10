use crate::app::AppContext;
use crate::cli::DeleteArgs;
use crate::commands::{load_vault, save_vault, vault_error};
use std::process::ExitCode;

pub fn run(args: DeleteArgs, ctx: &AppContext) -> ExitCode {
    let (mut vault, path, lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    if let Err(err) = vault.delete_record(args.index) {
        return vault_error(err);
    }

    if let Err(code) = save_vault(&vault, &path, &lock) {
        return code;
    }

    println!("deleted record {}", args.index);
    ExitCode::SUCCESS
}
