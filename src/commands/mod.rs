mod add;
mod delete;
mod export;
mod import;
mod init;
mod list;
mod passwd;
mod set;
mod show;
mod tags;

use crate::app::AppContext;
use crate::cli;
use crate::config;
use crate::exit_codes;
use crate::prompt;
use crate::vault::io::{self as vault_io, VaultLock};
use crate::vault::{Vault, VaultError};
use std::path::PathBuf;
use std::process::ExitCode;

pub fn dispatch(command: cli::Commands, ctx: &AppContext) -> ExitCode {
    match command {
        cli::Commands::Init => init::run(ctx),
        cli::Commands::Add(args) => add::run(args, ctx),
        cli::Commands::List(args) => list::run(args, ctx),
        cli::Commands::Show(args) => show::run(args, ctx),
        cli::Commands::Set(args) => set::run(args, ctx),
        cli::Commands::Delete(args) => delete::run(args, ctx),
        cli::Commands::Passwd => passwd::run(ctx),
        cli::Commands::Export(args) => export::run(args, ctx),
        cli::Commands::Import(args) => import::run(args, ctx),
        cli::Commands::Tags => tags::run(ctx),
    }
}

pub(crate) fn resolve_vault_path(ctx: &AppContext) -> Result<PathBuf, ExitCode> {
    if let Some(path) = &ctx.vault_override {
        return Ok(path.clone());
    }
    config::vault_path().map_err(|err| {
        eprintln!("error: {err}");
        exit_codes::exit_code_for_config_error(&err)
    })
}

/// Open the configured vault, prompting for its passphrase. Returns the
/// vault, the path it was loaded from, and the lock held on it (read-only
/// if the lock was contended — callers must check `lock.read_only` before
/// attempting to save).
pub(crate) fn load_vault(ctx: &AppContext) -> Result<(Vault, PathBuf, VaultLock), ExitCode> {
    let path = resolve_vault_path(ctx)?;
    let lock = vault_io::acquire(&path).map_err(|err| {
        eprintln!("error: unable to lock vault: {err}");
        ExitCode::from(exit_codes::EXIT_IO)
    })?;

    let bytes = vault_io::read_bytes(&path).map_err(|err| {
        eprintln!("error: unable to read vault at {}: {err}", path.display());
        ExitCode::from(exit_codes::EXIT_IO)
    })?;

    let vault = Vault::open(&bytes, || {
        use secrecy::ExposeSecret;
        prompt::prompt_passphrase("passphrase")
            .map(|s| s.expose_secret().to_string())
            .unwrap_or_default()
    })
    .map_err(|err| {
        eprintln!("error: {err}");
        exit_codes::exit_code_for_vault_error(&err)
    })?;

    Ok((vault, path, lock))
}

/// Persist `vault` to `path`, unless `lock` is read-only (another process
/// is holding the write lock), in which case nothing is written.
pub(crate) fn save_vault(vault: &Vault, path: &PathBuf, lock: &VaultLock) -> Result<(), ExitCode> {
    if lock.read_only {
        eprintln!("warning: vault is locked by another process; changes were not saved");
        return Ok(());
    }
    let bytes = vault.to_bytes().map_err(|err| {
        eprintln!("error: unable to seal vault: {err}");
        exit_codes::exit_code_for_vault_error(&err)
    })?;
    vault_io::write_bytes_atomic(path, &bytes).map_err(|err| {
        eprintln!("error: unable to write vault at {}: {err}", path.display());
        ExitCode::from(exit_codes::EXIT_IO)
    })?;
    Ok(())
}

pub(crate) fn vault_error(err: VaultError) -> ExitCode {
    eprintln!("error: {err}");
    exit_codes::exit_code_for_vault_error(&err)
}
