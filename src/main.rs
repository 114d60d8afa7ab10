mod aead;
mod app;
mod cli;
mod commands;
mod compress;
mod config;
mod envelope;
mod exit_codes;
mod kdf;
mod legacy_gpg;
mod prompt;
mod record;
mod secure;
mod stringutil;
mod vault;

use std::process::ExitCode;

fn main() -> ExitCode {
    app::run()
}
