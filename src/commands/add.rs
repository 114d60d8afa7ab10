use crate::app::AppContext;
use crate::cli::AddArgs;
use crate::commands::{load_vault, save_vault, vault_error};
use crate::exit_codes;
use crate::prompt;
use crate::record::Record;
use secrecy::ExposeSecret;
use std::process::ExitCode;

pub fn run(args: AddArgs, ctx: &AppContext) -> ExitCode {
    let (mut vault, path, lock) = match load_vault(ctx) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let password = match args.password {
        Some(p) => p,
        None => match prompt::prompt_new_passphrase("password") {
            Ok(p) => p.expose_secret().to_string(),
            Err(err) => {
                eprintln!("error: {err}");
                return exit_codes::exit_code_for_prompt_error(&err);
            }
        },
    };

    let mut record = Record::new();
    let fields = [
        ("site", args.site.as_deref().unwrap_or("")),
        ("user", args.user.as_deref().unwrap_or("")),
        ("url", args.url.as_deref().unwrap_or("")),
        ("tags", args.tags.as_deref().unwrap_or("")),
        ("note", args.note.as_deref().unwrap_or("")),
        ("password", password.as_str()),
    ];
    for (column, value) in fields {
        if let Err(err) = record.set(column, value) {
            eprintln!("error: {err}");
            return exit_codes::exit_code_for_record_error(&err);
        }
    }

    let index = match vault.add_record(record) {
        Ok(i) => i,
        Err(err) => return vault_error(err),
    };

    if let Err(code) = save_vault(&vault, &path, &lock) {
        return code;
    }

    println!("added record {index}");
    ExitCode::SUCCESS
}
