use crate::{cli, commands, exit_codes};
use clap::{ColorChoice, CommandFactory, FromArgMatches, error::ErrorKind as ClapErrorKind};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

pub struct AppContext {
    pub vault_override: Option<PathBuf>,
    pub json: bool,
}

pub fn run() -> ExitCode {
    let cli = match parse_cli() {
        Ok(cli) => cli,
        Err(code) => return code,
    };

    let Some(command) = cli.command else {
        let mut cmd = configure_command_colors(cli::Cli::command());
        cmd.print_help().expect("help to be printed");
        println!();
        return ExitCode::from(exit_codes::EXIT_USAGE);
    };

    let ctx = AppContext {
        vault_override: cli.vault,
        json: cli.json,
    };

    commands::dispatch(command, &ctx)
}

fn parse_cli() -> Result<cli::Cli, ExitCode> {
    let cmd = configure_command_colors(cli::Cli::command());

    let matches = match cmd.try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let kind = err.kind();
            if matches!(
                kind,
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) {
                let _ = err.print();
                return Err(ExitCode::SUCCESS);
            }

            let _ = err.print();
            return Err(ExitCode::from(exit_codes::EXIT_USAGE));
        }
    };

    match cli::Cli::from_arg_matches(&matches) {
        Ok(cli) => Ok(cli),
        Err(err) => {
            let _ = err.print();
            Err(ExitCode::from(exit_codes::EXIT_USAGE))
        }
    }
}

fn configure_command_colors(mut cmd: clap::Command) -> clap::Command {
    let no_color = std::env::var_os("NO_COLOR").is_some();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let stderr_is_tty = std::io::stderr().is_terminal();

    if no_color || !(stdout_is_tty && stderr_is_tty) {
        cmd = cmd.color(ColorChoice::Never);
    }

    cmd
}
