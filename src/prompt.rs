//! Passphrase prompting with terminal echo disabled.

use secrecy::{ExposeSecret, SecretString};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("passphrase must not be empty")]
    Empty,

    #[error("passphrases do not match")]
    Mismatch,
}

pub fn prompt_passphrase(label: &str) -> Result<SecretString, PromptError> {
    print!("{label}: ");
    io::stdout().flush()?;
    let line = read_line_no_echo()?;
    println!();
    if line.is_empty() {
        return Err(PromptError::Empty);
    }
    Ok(SecretString::from(line))
}

/// Prompt twice and require the two entries to match — used when setting a
/// new passphrase, never when unlocking an existing vault.
pub fn prompt_new_passphrase(label: &str) -> Result<SecretString, PromptError> {
    let first = prompt_passphrase(label)?;
    let second = prompt_passphrase("confirm")?;
    if first.expose_secret() != second.expose_secret() {
        return Err(PromptError::Mismatch);
    }
    Ok(first)
}

#[cfg(unix)]
fn read_line_no_echo() -> io::Result<String> {
    use std::os::unix::io::AsRawFd;

    let stdin_fd = io::stdin().as_raw_fd();
    let mut term = unsafe { std::mem::zeroed::<libc::termios>() };
    let had_termios = unsafe { libc::tcgetattr(stdin_fd, &mut term) } == 0;

    if had_termios {
        let mut no_echo = term;
        no_echo.c_lflag &= !libc::ECHO;
        no_echo.c_lflag |= libc::ECHONL;
        unsafe { libc::tcsetattr(stdin_fd, libc::TCSANOW, &no_echo) };
    }

    let mut line = String::new();
    let result = io::stdin().read_line(&mut line);

    if had_termios {
        unsafe { libc::tcsetattr(stdin_fd, libc::TCSANOW, &term) };
    }

    result?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

#[cfg(not(unix))]
fn read_line_no_echo() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
